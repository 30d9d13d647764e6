use crate::parser::ParseFailure;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    /// A strict session met a line no style accepts
    #[error("line {line_number}: {failure}")]
    StrictAbort {
        line_number: usize,
        #[source]
        failure: ParseFailure,
    },

    #[error("failed to read listing: {0}")]
    Io(#[from] io::Error),
}
