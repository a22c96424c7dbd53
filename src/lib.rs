//! # `line_progress`
//!
//! Single-line progress displays for terminals, refreshed by a background thread.
//!
//! `line_progress` draws one line that is rewritten in place. It is designed to be:
//!
//! * **Self-animating**: A visible [`Progress`] owns a render thread that redraws the
//!   spinner frame, the trailing dots and the loading bar on its own schedule.
//! * **Concurrent**: Every operation takes `&self`. Hot scalars (percentage, width, flags)
//!   live in atomics; text, styles and the sink sit behind one [`parking_lot`] mutex.
//! * **Styled**: A small inline markup (`<b>`, `~g~`, `~B~` ...) is compiled into ANSI
//!   escape sequences according to the detected color support and the active [`Palette`].
//!
//! ## Modules
//!
//! * [`builder`]: Fluent interface for constructing [`Progress`] instances.
//! * [`progress`]: The [`Progress`] handle and its lifecycle.
//! * [`text`]: Markup formatting and message prefixes.
//! * [`terminal`]: Terminal width and color support probing.
//! * [`theme`]: Palettes and built-in themes.
//! * [`indicator`]: Spinner frames and result symbols.
//! * [`style`]: The styleable regions of a line.
//! * [`enum_map`] and [`lazy`]: Small containers used by the configuration tables.
//!
//! ## Example
//!
//! ```no_run
//! use line_progress::Progress;
//!
//! # fn main() -> line_progress::Result<()> {
//! let progress = Progress::stdout("Downloading", true)?;
//! progress.show()?;
//! for _ in 0..100 {
//!     progress.inc();
//! }
//! progress.finish(true, "Downloaded")?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod builder;
pub mod enum_map;
pub mod error;
pub mod indicator;
pub mod lazy;
pub mod progress;
mod render;
pub mod style;
pub mod terminal;
pub mod text;
pub mod theme;

pub use builder::ProgressBuilder;
pub use enum_map::{EnumKey, EnumMap};
pub use error::{Error, Result};
pub use indicator::{BuiltInIndicator, FailureSymbol, Indicator, MAX_FRAME_SIZE, SuccessSymbol};
pub use lazy::LazyInit;
pub use progress::{MAX_DOTS, MAX_WIDTH, MIN_WIDTH, Progress};
pub use style::Style;
pub use terminal::{ColorSupport, Stream, Terminal};
pub use text::{ColorContext, Message, MessagePrefixes};
pub use theme::{Color, Palette, Theme, ThemeName, get_palette};
