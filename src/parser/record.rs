use super::datetime::DateError;
use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

/// Classification of a listed entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    /// Regular file, stream file, save file, or file member
    File,
    /// Directory
    Directory,
    /// Symbolic link
    SymbolicLink,
    /// Recognized by a style but not one of the above (sockets, pipes, ...)
    Unknown,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::SymbolicLink => "symlink",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Both halves of a compound `container/member` name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberPath {
    /// Containing object (e.g. an OS/400 `*FILE`)
    pub container: String,
    /// Member within the container
    pub member: String,
}

/// One parsed directory entry.
///
/// Built once per accepted line and never touched again by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// Entry name as the style encodes it (no leading path for most styles)
    pub name: String,
    /// Entry classification
    #[serde(rename = "type")]
    pub kind: FileType,
    /// Owning user, for styles with an owner column
    pub owner: Option<String>,
    /// Owning group (Unix)
    pub group: Option<String>,
    /// Size in bytes; absent where the style lists none (members, NT directories, devices)
    pub size: Option<u64>,
    /// Last modification time; absent only for OS/400 members
    pub timestamp: Option<NaiveDateTime>,
    /// Mode bits including setuid/setgid/sticky (Unix)
    pub permissions: Option<u32>,
    /// Target of a symbolic link (Unix `name -> target`)
    pub link_target: Option<String>,
    /// Split form of a compound member name (OS/400 `*MEM`)
    pub member: Option<MemberPath>,
    /// Name of the style that accepted the line
    pub style: String,
    /// Original listing text
    pub raw_line: String,
}

impl FileRecord {
    /// Create a record with only the mandatory fields set
    pub fn new(
        name: impl Into<String>,
        kind: FileType,
        style: impl Into<String>,
        raw_line: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            owner: None,
            group: None,
            size: None,
            timestamp: None,
            permissions: None,
            link_target: None,
            member: None,
            style: style.into(),
            raw_line: raw_line.into(),
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == FileType::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == FileType::Directory
    }

    pub fn is_symbolic_link(&self) -> bool {
        self.kind == FileType::SymbolicLink
    }
}

/// Why a single style declined a line.
///
/// Shape mismatches and bad values both mean "not this style"; the variant is
/// kept for diagnostics only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error("line does not have the expected shape")]
    Structure,

    #[error("field `{field}` is not an unsigned number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("unrecognized type indicator: {0}")]
    UnknownType(String),

    #[error("required field `{0}` is missing")]
    MissingField(&'static str),

    #[error("field `{0}` is not allowed for this entry type")]
    UnexpectedField(&'static str),

    #[error("unsupported entry: {0}")]
    Unsupported(String),

    #[error("invalid timestamp: {0}")]
    Date(#[from] DateError),
}

/// Result of offering one line to one style
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Matched(FileRecord),
    Rejected(RejectReason),
}

impl ParseOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched(_))
    }

    /// The record, if the line was accepted
    pub fn into_record(self) -> Option<FileRecord> {
        match self {
            Self::Matched(record) => Some(record),
            Self::Rejected(_) => None,
        }
    }
}

impl From<Result<FileRecord, RejectReason>> for ParseOutcome {
    fn from(result: Result<FileRecord, RejectReason>) -> Self {
        match result {
            Ok(record) => Self::Matched(record),
            Err(reason) => Self::Rejected(reason),
        }
    }
}
