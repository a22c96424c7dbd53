//! Error handling for `line_progress`.
//!
//! Every fallible operation in the crate returns [`Result`]. Failures are synchronous and
//! surfaced to the direct caller: nothing is retried internally, and the render thread
//! never produces an [`Error`] (rendering problems such as over-long text are resolved by
//! truncation).

use std::io;

use thiserror::Error;

/// Errors that can happen when configuring or probing a progress line.
#[derive(Error, Debug)]
pub enum Error {
    /// The requested width cannot fit the smallest possible progress line.
    ///
    /// Returned by construction and by [`Progress::set_width`](crate::Progress::set_width).
    /// The progress state is left untouched.
    #[error("not enough terminal columns: {width} requested, at least {min} required")]
    InsufficientWidth {
        /// The rejected width.
        width: u16,
        /// The minimal width a progress line needs.
        min: u16,
    },

    /// The terminal could not be queried (e.g. the output is not a terminal).
    #[error("couldn't get terminal width: {0}")]
    Probe(String),

    /// A theme lookup was given a selector outside of the built-in themes.
    #[error("invalid palette index: {0}")]
    InvalidPaletteIndex(usize),

    /// A theme name could not be parsed.
    #[error("unknown theme: {0:?}")]
    UnknownTheme(String),

    /// An indicator must have at least one frame to cycle through.
    #[error("indicator has no frames")]
    EmptyIndicator,

    /// I/O error while writing a result line to the output sink.
    #[error("I/O error")]
    Io {
        /// The underlying I/O failure.
        #[from]
        source: io::Error,
    },
}

/// Result type alias for fallible `line_progress` operations.
pub type Result<T> = std::result::Result<T, Error>;
