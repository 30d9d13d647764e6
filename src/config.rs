use crate::clock::FixedClock;
use crate::parser::{
    DateTimeInterpreter, EntryParser, NtParser, Os400Parser, PatternError, UnixParser,
};
use crate::session::ListingSession;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{fs, io};
use thiserror::Error;

/// Built-in listing styles, selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum StyleKind {
    /// OS/400 with `yy/MM/dd` dates
    Os400,
    /// OS/400 with `yy.MM.dd` dates
    Os400Dotted,
    /// Unix `ls -l`
    Unix,
    /// Windows NT / DOS
    Nt,
}

impl StyleKind {
    /// Default priority order
    pub const ALL: [StyleKind; 4] = [Self::Os400, Self::Os400Dotted, Self::Unix, Self::Nt];

    /// Build this style's parser around a shared date interpreter
    pub fn build(self, dates: DateTimeInterpreter) -> Result<Box<dyn EntryParser>, PatternError> {
        Ok(match self {
            Self::Os400 => Box::new(Os400Parser::new(dates)?),
            Self::Os400Dotted => Box::new(Os400Parser::dotted(dates)?),
            Self::Unix => Box::new(UnixParser::new(dates)?),
            Self::Nt => Box::new(NtParser::new(dates)?),
        })
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}", .0.display())]
    Io(PathBuf, #[source] io::Error),

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config lists no listing styles")]
    NoStyles,

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// Settings for a [`ListingSession`], loadable from JSON.
///
/// ```json
/// { "strict": true, "styles": ["os400", "unix"], "reference_time": "2024-06-01T00:00:00" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Stop at the first line no style accepts
    pub strict: bool,
    /// Styles to try, highest priority first
    pub styles: Vec<StyleKind>,
    /// Pins "now" for year resolution; the local clock when unset
    pub reference_time: Option<NaiveDateTime>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            strict: false,
            styles: StyleKind::ALL.to_vec(),
            reference_time: None,
        }
    }
}

impl SessionConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_json_str(&json)
    }

    /// Assemble a session with these settings
    pub fn build_session(&self) -> Result<ListingSession, ConfigError> {
        if self.styles.is_empty() {
            return Err(ConfigError::NoStyles);
        }

        let mut builder = ListingSession::builder().strict(self.strict);
        if let Some(now) = self.reference_time {
            builder = builder.clock(FixedClock(now));
        }
        for style in &self.styles {
            builder = builder.style(*style);
        }
        Ok(builder.build()?)
    }
}
