//! Terminal capability probing.
//!
//! Two questions are answered here: how many columns the output has, and how many colors
//! the terminal is likely to understand. The latter is a heuristic based on the terminal
//! name (normally `$TERM`), the same way most command-line tools guess it.

use std::{env, io};

use compact_str::CompactString;
use terminal_size::{Width, terminal_size_of};

use crate::{Error, Result};

/// Terminal name prefixes known to understand ANSI colors.
const COLORED_TERMS: [&str; 14] = [
    "ansi", "color", "console", "cygwin", "gnome", "konsole", "kterm", "linux", "msys", "putty",
    "rxvt", "screen", "vt100", "xterm",
];

/// How many colors a terminal can display.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ColorSupport {
    /// The eight basic ANSI colors.
    Ansi8,
    /// The xterm 256-color palette.
    Ansi256,
}

/// Output stream whose terminal is probed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Stream {
    /// Standard output.
    #[default]
    Stdout,
    /// Standard error.
    Stderr,
}

/// A terminal attached to one of the standard streams.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Terminal {
    stream: Stream,
    name: CompactString,
}

impl Terminal {
    /// Creates a probe for `stream` using an explicit terminal name.
    #[must_use]
    pub fn new(stream: Stream, name: impl Into<CompactString>) -> Self {
        Self {
            stream,
            name: name.into(),
        }
    }

    /// Creates a probe for standard output named after `$TERM`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(Stream::Stdout, env::var("TERM").unwrap_or_default())
    }

    /// The probed stream.
    #[must_use]
    pub const fn stream(&self) -> Stream {
        self.stream
    }

    /// The terminal name used for color detection.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Changes the probed stream.
    pub fn set_stream(&mut self, stream: Stream) {
        self.stream = stream;
    }

    /// Changes the terminal name used for color detection.
    pub fn set_name(&mut self, name: impl Into<CompactString>) {
        self.name = name.into();
    }

    /// Queries the number of columns of the terminal behind the stream.
    ///
    /// # Errors
    ///
    /// [`Error::Probe`] when the stream is not attached to a terminal.
    pub fn columns(&self) -> Result<u16> {
        let size = match self.stream {
            Stream::Stdout => terminal_size_of(io::stdout()),
            Stream::Stderr => terminal_size_of(io::stderr()),
        };

        size.map(|(Width(width), _)| width)
            .ok_or_else(|| Error::Probe(format!("{:?} is not a terminal", self.stream)))
    }

    /// Guesses the color support from the terminal name.
    ///
    /// A name starting with a known color-capable terminal means 8 colors; a `-256`
    /// suffix right after that prefix (as in `xterm-256color`) upgrades it to 256 colors.
    ///
    /// # Examples
    ///
    /// ```
    /// use line_progress::{ColorSupport, Stream, Terminal};
    ///
    /// let term = Terminal::new(Stream::Stdout, "xterm-256color");
    /// assert_eq!(term.supported_colors(), Some(ColorSupport::Ansi256));
    /// ```
    #[must_use]
    pub fn supported_colors(&self) -> Option<ColorSupport> {
        let prefix = COLORED_TERMS
            .into_iter()
            .find(|prefix| self.name.starts_with(prefix))?;

        if self.name.as_str()[prefix.len()..].starts_with("-256") {
            Some(ColorSupport::Ansi256)
        } else {
            Some(ColorSupport::Ansi8)
        }
    }
}
