use super::record::RejectReason;
use regex::{Captures, Regex};
use thiserror::Error;

/// A style's line pattern failed to compile
#[derive(Error, Debug)]
#[error("invalid line pattern for style {style}: {source}")]
pub struct PatternError {
    pub style: String,
    #[source]
    pub source: regex::Error,
}

/// Column layout of one listing style.
///
/// The pattern fixes field order and delimiters through named capture groups.
/// Numeric and type-indicator groups are validated after the structural match.
#[derive(Debug, Clone)]
pub struct FormatDescriptor {
    style: String,
    pattern: Regex,
    numeric_fields: &'static [&'static str],
    type_field: Option<(&'static str, &'static [&'static str])>,
}

impl FormatDescriptor {
    pub fn new(style: impl Into<String>, pattern: &str) -> Result<Self, PatternError> {
        let style = style.into();
        let pattern = Regex::new(pattern).map_err(|source| PatternError {
            style: style.clone(),
            source,
        })?;

        Ok(Self {
            style,
            pattern,
            numeric_fields: &[],
            type_field: None,
        })
    }

    /// Groups that must hold an unsigned 64-bit number whenever they match
    pub fn numeric(mut self, fields: &'static [&'static str]) -> Self {
        self.numeric_fields = fields;
        self
    }

    /// Group holding the type indicator, and the values it may take (compared
    /// case-insensitively)
    pub fn type_indicator(mut self, field: &'static str, allowed: &'static [&'static str]) -> Self {
        self.type_field = Some((field, allowed));
        self
    }

    pub fn style(&self) -> &str {
        &self.style
    }
}

/// Fields pulled out of one structurally matching line
#[derive(Debug)]
pub struct FieldSet<'a> {
    captures: Captures<'a>,
    numbers: Vec<(&'static str, u64)>,
    kind: Option<&'static str>,
}

impl<'a> FieldSet<'a> {
    /// Text of a field, `None` when the optional group did not participate
    pub fn text(&self, name: &str) -> Option<&'a str> {
        self.captures.name(name).map(|m| m.as_str())
    }

    /// Value of a validated numeric field
    pub fn number(&self, name: &str) -> Option<u64> {
        self.numbers
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| *value)
    }

    /// The canonical spelling of the matched type indicator
    pub fn kind(&self) -> Option<&'static str> {
        self.kind
    }
}

/// Matches lines against a single [`FormatDescriptor`]
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    descriptor: FormatDescriptor,
}

impl FieldExtractor {
    pub fn new(descriptor: FormatDescriptor) -> Self {
        Self { descriptor }
    }

    pub fn descriptor(&self) -> &FormatDescriptor {
        &self.descriptor
    }

    /// Structurally match `line` and validate its typed fields.
    pub fn extract<'a>(&self, line: &'a str) -> Result<FieldSet<'a>, RejectReason> {
        let captures = self
            .descriptor
            .pattern
            .captures(line)
            .ok_or(RejectReason::Structure)?;

        let mut numbers = Vec::with_capacity(self.descriptor.numeric_fields.len());
        for &field in self.descriptor.numeric_fields {
            if let Some(m) = captures.name(field) {
                numbers.push((field, parse_unsigned(field, m.as_str())?));
            }
        }

        let kind = match self.descriptor.type_field {
            Some((field, allowed)) => match captures.name(field) {
                Some(m) => Some(
                    allowed
                        .iter()
                        .copied()
                        .find(|candidate| candidate.eq_ignore_ascii_case(m.as_str()))
                        .ok_or_else(|| RejectReason::UnknownType(m.as_str().to_string()))?,
                ),
                None => None,
            },
            None => None,
        };

        Ok(FieldSet {
            captures,
            numbers,
            kind,
        })
    }

    /// Option form of [`FieldExtractor::extract`]
    pub fn matches<'a>(&self, line: &'a str) -> Option<FieldSet<'a>> {
        self.extract(line).ok()
    }
}

/// A contiguous run of ASCII digits that fits in a `u64`
fn parse_unsigned(field: &'static str, value: &str) -> Result<u64, RejectReason> {
    let invalid = || RejectReason::InvalidNumber {
        field,
        value: value.to_string(),
    };

    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    value.parse().map_err(|_| invalid())
}
