use super::{
    DateTimeInterpreter, EntryParser, FileRecord, NtParser, Os400Parser, ParseOutcome,
    PatternError, RejectReason, UnixParser,
};
use std::fmt;
use thiserror::Error;

/// No configured style accepted a line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no listing style matched line {line:?}")]
pub struct ParseFailure {
    /// The offending raw line
    pub line: String,
    /// Each style's reason, in the order the styles were tried
    pub rejections: Vec<(String, RejectReason)>,
}

/// Ordered fallback over several listing styles.
///
/// Styles are tried in exactly the order they were supplied; the first match
/// wins. The list never changes after construction.
pub struct CompositeParser {
    parsers: Vec<Box<dyn EntryParser>>,
}

impl CompositeParser {
    /// Create a composite over `parsers`, in priority order
    pub fn new(parsers: Vec<Box<dyn EntryParser>>) -> Self {
        Self { parsers }
    }

    /// The built-in styles: OS/400 (slash then dotted dates), Unix, NT
    pub fn standard(dates: DateTimeInterpreter) -> Result<Self, PatternError> {
        Ok(Self::new(vec![
            Box::new(Os400Parser::new(dates.clone())?),
            Box::new(Os400Parser::dotted(dates.clone())?),
            Box::new(UnixParser::new(dates.clone())?),
            Box::new(NtParser::new(dates)?),
        ]))
    }

    /// Append a lower-priority style
    ///
    /// # Example
    /// ```ignore
    /// let parser = CompositeParser::new(Vec::new())
    ///     .register(Os400Parser::new(dates.clone())?)
    ///     .register(UnixParser::new(dates)?);
    /// ```
    pub fn register(mut self, parser: impl EntryParser + 'static) -> Self {
        self.parsers.push(Box::new(parser));
        self
    }

    /// Parse one line with the first style that accepts it
    pub fn parse_line(&self, line: &str) -> Result<FileRecord, ParseFailure> {
        let mut rejections = Vec::new();

        for parser in &self.parsers {
            match parser.parse_line(line) {
                ParseOutcome::Matched(record) => return Ok(record),
                ParseOutcome::Rejected(reason) => {
                    tracing::trace!(style = parser.style(), %reason, "style rejected line");
                    rejections.push((parser.style().to_string(), reason));
                }
            }
        }

        tracing::debug!(line, "no listing style matched");
        Err(ParseFailure {
            line: line.to_string(),
            rejections,
        })
    }

    /// Number of configured styles
    pub fn parser_count(&self) -> usize {
        self.parsers.len()
    }

    /// Style names in priority order
    pub fn styles(&self) -> Vec<&str> {
        self.parsers.iter().map(|p| p.style()).collect()
    }
}

impl fmt::Debug for CompositeParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeParser")
            .field("styles", &self.styles())
            .finish()
    }
}
