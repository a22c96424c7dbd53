//! Spinner frames and result symbols.

use std::time::Duration;

use compact_str::CompactString;

use crate::{Error, Result};

/// Largest frame size in bytes: one UTF-8 encoded code point.
pub const MAX_FRAME_SIZE: usize = 4;

/// Shortest accepted frame interval.
const MIN_UPDATE_INTERVAL: Duration = Duration::from_millis(1);

/// Animation of an indicator (undetermined) progress line.
///
/// Frames are cycled in order, one every [`update_interval`](Self::update_interval). Each
/// frame occupies exactly one column: frames longer than one code point are cut to their
/// first one, and empty frames are rendered as a space.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Indicator {
    update_interval: Duration,
    frames: Vec<CompactString>,
}

impl Indicator {
    /// Creates an indicator.
    ///
    /// Intervals shorter than a millisecond are raised to one millisecond.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyIndicator`] when `frames` yields nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use line_progress::Indicator;
    ///
    /// let moon = Indicator::new(Duration::from_millis(200), ["◐", "◓", "◑", "◒"]).unwrap();
    /// assert_eq!(moon.frames().len(), 4);
    /// ```
    pub fn new<I, S>(update_interval: Duration, frames: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let frames: Vec<_> = frames
            .into_iter()
            .map(|frame| {
                let frame = frame.as_ref();
                frame.chars().next().map_or_else(
                    || CompactString::const_new(" "),
                    |first| CompactString::new(&frame[..first.len_utf8()]),
                )
            })
            .collect();

        if frames.is_empty() {
            return Err(Error::EmptyIndicator);
        }

        Ok(Self {
            update_interval: update_interval.max(MIN_UPDATE_INTERVAL),
            frames,
        })
    }

    /// Time each frame stays on screen.
    #[must_use]
    pub const fn update_interval(&self) -> Duration {
        self.update_interval
    }

    /// The frames, in display order.
    #[must_use]
    pub fn frames(&self) -> &[CompactString] {
        &self.frames
    }

    /// Returns the frame at `cursor`, wrapping around.
    pub(crate) fn frame(&self, cursor: usize) -> &str {
        &self.frames[cursor % self.frames.len()]
    }
}

impl Default for Indicator {
    fn default() -> Self {
        BuiltInIndicator::default().into()
    }
}

/// Indicators shipped with the crate.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum BuiltInIndicator {
    /// ASCII spinner.
    #[default]
    Spinner,
    /// A bullet blinking twice a second.
    UnicodeFlashingBullet,
}

impl From<BuiltInIndicator> for Indicator {
    fn from(name: BuiltInIndicator) -> Self {
        let (interval, frames): (u64, &[&str]) = match name {
            BuiltInIndicator::Spinner => (125, &["-", "\\", "|", "/", "-", "\\", "|", "/"]),
            BuiltInIndicator::UnicodeFlashingBullet => (500, &["\u{2022}", " "]),
        };

        Self {
            update_interval: Duration::from_millis(interval),
            frames: frames.iter().copied().map(CompactString::const_new).collect(),
        }
    }
}

/// Symbols placed in front of success messages.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SuccessSymbol {
    /// `+`
    #[default]
    Plus,
    /// `•`
    UnicodeBullet,
    /// `✓`
    UnicodeCheckMark,
}

impl SuccessSymbol {
    /// The symbol text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::UnicodeBullet => "\u{2022}",
            Self::UnicodeCheckMark => "\u{2713}",
        }
    }
}

/// Symbols placed in front of failure messages.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FailureSymbol {
    /// `-`
    #[default]
    Minus,
    /// `•`
    UnicodeBullet,
    /// `✖`
    UnicodeHeavyMultiplication,
}

impl FailureSymbol {
    /// The symbol text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minus => "-",
            Self::UnicodeBullet => "\u{2022}",
            Self::UnicodeHeavyMultiplication => "\u{2716}",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{BuiltInIndicator, Indicator, MAX_FRAME_SIZE};
    use crate::Error;

    /// Frame Normalization
    /// Frames are cut to one code point and empty frames become a space.
    #[test]
    fn test_frames_are_single_code_points() {
        let indicator = Indicator::new(Duration::from_millis(50), ["ab", "", "✓✓"]).unwrap();

        assert_eq!(indicator.frames(), ["a", " ", "✓"]);
        assert!(indicator.frames().iter().all(|f| f.len() <= MAX_FRAME_SIZE));
        assert_eq!(indicator.frame(4), " ");
    }

    /// Invalid Indicators
    #[test]
    fn test_empty_and_zero_interval() {
        assert!(matches!(
            Indicator::new(Duration::from_millis(10), Vec::<String>::new()),
            Err(Error::EmptyIndicator)
        ));

        let fast = Indicator::new(Duration::ZERO, ["x"]).unwrap();
        assert_eq!(fast.update_interval(), Duration::from_millis(1));
    }

    /// Built-in Tables
    #[test]
    fn test_builtin_indicators() {
        let spinner = Indicator::from(BuiltInIndicator::Spinner);
        assert_eq!(spinner.update_interval(), Duration::from_millis(125));
        assert_eq!(spinner.frames().len(), 8);
        assert_eq!(spinner, Indicator::default());

        let bullet = Indicator::from(BuiltInIndicator::UnicodeFlashingBullet);
        assert_eq!(bullet.frames(), ["\u{2022}", " "]);
    }
}
