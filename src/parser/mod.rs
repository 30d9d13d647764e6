mod composite;
mod datetime;
mod extractor;
mod nt;
mod os400;
mod record;
mod unix;


pub use composite::{CompositeParser, ParseFailure};
pub use datetime::{DateError, DateOrder, DateTimeInterpreter, HourClock, TimestampFormat};
pub use extractor::{FieldExtractor, FieldSet, FormatDescriptor, PatternError};
pub use nt::NtParser;
pub use os400::Os400Parser;
pub use record::{FileRecord, FileType, MemberPath, ParseOutcome, RejectReason};
pub use unix::UnixParser;

/// Core trait that every listing style implements
pub trait EntryParser: Send + Sync {
    /// Short name of the style (e.g. "unix", "os400")
    fn style(&self) -> &str;

    /// Offer one raw listing line to this style
    ///
    /// # Returns
    /// `Matched` with a fully populated record, or `Rejected` when the line is
    /// not of this style. Rejection is the ordinary outcome for foreign lines.
    fn parse_line(&self, line: &str) -> ParseOutcome;
}
