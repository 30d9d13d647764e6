// Public API exports
pub mod clock;
pub mod config;
pub mod parser;
pub mod session;

// Re-export main types for convenience
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, SessionConfig, StyleKind};

pub use parser::{
    CompositeParser, DateError, DateTimeInterpreter, EntryParser, FileRecord, FileType,
    MemberPath, NtParser, Os400Parser, ParseFailure, ParseOutcome, RejectReason, TimestampFormat,
    UnixParser,
};

pub use session::{Entries, ListingSession, SessionBuilder, SessionError};
