mod error;
mod filter;

#[cfg(test)]
mod tests;

pub use error::SessionError;
pub use filter::is_non_entry;

use crate::clock::{Clock, SystemClock};
use crate::config::StyleKind;
use crate::parser::{CompositeParser, DateTimeInterpreter, EntryParser, FileRecord, PatternError};
use std::io::{self, BufRead};
use std::sync::Arc;

/// Turns a whole listing into records.
///
/// Lenient by default: lines no style accepts are logged and skipped. With
/// `strict` set, the first such line ends the sequence with
/// [`SessionError::StrictAbort`].
#[derive(Debug)]
pub struct ListingSession {
    parser: CompositeParser,
    strict: bool,
}

/// A style slot in the builder, kept in insertion order
enum Candidate {
    Builtin(StyleKind),
    Custom(Box<dyn EntryParser>),
}

/// Mutable builder for constructing a session
pub struct SessionBuilder {
    candidates: Vec<Candidate>,
    clock: Arc<dyn Clock>,
    strict: bool,
}

impl SessionBuilder {
    /// Create a builder with the local clock and lenient mode
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
            clock: Arc::new(SystemClock),
            strict: false,
        }
    }

    /// Fail on the first unparseable line instead of skipping it
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Reference clock for date resolution
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Append a built-in style at the lowest priority so far
    pub fn style(mut self, style: StyleKind) -> Self {
        self.candidates.push(Candidate::Builtin(style));
        self
    }

    /// Append a caller-supplied style at the lowest priority so far
    pub fn parser(mut self, parser: impl EntryParser + 'static) -> Self {
        self.candidates.push(Candidate::Custom(Box::new(parser)));
        self
    }

    /// Build the immutable session. Without any styles, all built-in styles
    /// are used in their default order.
    pub fn build(self) -> Result<ListingSession, PatternError> {
        let dates = DateTimeInterpreter::new(self.clock);
        let candidates = if self.candidates.is_empty() {
            StyleKind::ALL.into_iter().map(Candidate::Builtin).collect()
        } else {
            self.candidates
        };

        let parsers = candidates
            .into_iter()
            .map(|candidate| match candidate {
                Candidate::Builtin(style) => style.build(dates.clone()),
                Candidate::Custom(parser) => Ok(parser),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ListingSession {
            parser: CompositeParser::new(parsers),
            strict: self.strict,
        })
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingSession {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Wrap an already assembled composite parser
    pub fn new(parser: CompositeParser, strict: bool) -> Self {
        Self { parser, strict }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn parser(&self) -> &CompositeParser {
        &self.parser
    }

    /// Lazily parse `lines`. Nothing is cached; calling again with the same
    /// source starts over.
    pub fn parse_all<I>(&self, lines: I) -> Entries<'_, PlainLines<I::IntoIter>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Entries::new(self, PlainLines(lines.into_iter()))
    }

    /// Lazily parse the lines of `reader`. A read error ends the sequence.
    pub fn parse_reader<R: BufRead>(&self, reader: R) -> Entries<'_, io::Lines<R>> {
        Entries::new(self, reader.lines())
    }

    /// Parse a complete listing, stopping at the first error
    pub fn collect_all<I>(&self, lines: I) -> Result<Vec<FileRecord>, SessionError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.parse_all(lines).collect()
    }
}

/// Adapts an infallible line source to the shape [`Entries`] consumes
#[derive(Debug)]
pub struct PlainLines<I>(I);

impl<I> Iterator for PlainLines<I>
where
    I: Iterator,
{
    type Item = io::Result<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(Ok)
    }
}

/// Lazy sequence of records produced by [`ListingSession`]
#[derive(Debug)]
pub struct Entries<'s, I> {
    session: &'s ListingSession,
    lines: I,
    line_number: usize,
    done: bool,
}

impl<'s, I> Entries<'s, I> {
    fn new(session: &'s ListingSession, lines: I) -> Self {
        Self {
            session,
            lines,
            line_number: 0,
            done: false,
        }
    }
}

impl<I, L> Iterator for Entries<'_, I>
where
    I: Iterator<Item = io::Result<L>>,
    L: AsRef<str>,
{
    type Item = Result<FileRecord, SessionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        for line in self.lines.by_ref() {
            self.line_number += 1;
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    self.done = true;
                    return Some(Err(SessionError::Io(err)));
                }
            };
            let line = line.as_ref();

            if is_non_entry(line) {
                tracing::debug!(line_number = self.line_number, "skipping non-entry line");
                continue;
            }

            match self.session.parser.parse_line(line) {
                Ok(record) => return Some(Ok(record)),
                Err(failure) if self.session.strict => {
                    tracing::warn!(
                        line_number = self.line_number,
                        %failure,
                        "aborting strict listing"
                    );
                    self.done = true;
                    return Some(Err(SessionError::StrictAbort {
                        line_number: self.line_number,
                        failure,
                    }));
                }
                Err(failure) => {
                    tracing::debug!(
                        line_number = self.line_number,
                        %failure,
                        "skipping unparseable line"
                    );
                }
            }
        }

        self.done = true;
        None
    }
}

impl<I, L> std::iter::FusedIterator for Entries<'_, I>
where
    I: Iterator<Item = io::Result<L>>,
    L: AsRef<str>,
{
}
