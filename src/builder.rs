//! Fluent interface for constructing [`Progress`] instances.
//!
//! While simple progress lines can be created via [`Progress::new`] or
//! [`Progress::stdout`], the [`ProgressBuilder`] sets everything up front, before the line
//! is first shown.
//!
//! # Key Features
//!
//! * **Any Sink:** Output goes to standard output by default; [`ProgressBuilder::sink`]
//!   swaps in any [`Write`] implementation, such as a `Vec<u8>` in tests or a log file.
//! * **Probed Width:** Without an explicit [`width`](ProgressBuilder::width), the line is as
//!   wide as the terminal attached to standard output.
//! * **Colors:** Without explicit [`colors`](ProgressBuilder::colors), support is detected
//!   from the environment once, at build time.

use std::{
    io::{self, Stdout, Write},
    time::Duration,
};

use compact_str::CompactString;

use crate::{
    Result,
    indicator::{FailureSymbol, Indicator, SuccessSymbol},
    progress::{Cold, Progress, validate_width},
    style::{Style, StyleTable},
    terminal::Terminal,
    text::ColorContext,
};

/// A builder pattern for constructing [`Progress`] instances.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use line_progress::{BuiltInIndicator, ColorContext, ProgressBuilder, Style};
///
/// let progress = ProgressBuilder::new("Resolving")
///     .width(60)
///     .indicator(BuiltInIndicator::UnicodeFlashingBullet)
///     .style(Style::Indicator, "<b>~c~")
///     .colors(ColorContext::PLAIN)
///     .info_update_interval(Duration::from_millis(50))
///     .sink(Vec::new())
///     .build()
///     .unwrap();
///
/// assert!(!progress.is_determined());
/// assert_eq!(progress.style(Style::Indicator), "<b>~c~");
/// ```
#[derive(Debug)]
pub struct ProgressBuilder<W = Stdout> {
    text: CompactString,
    determined: bool,
    width: Option<u16>,
    append_dots: bool,
    indicator: Indicator,
    colors: Option<ColorContext>,
    styles: Vec<(Style, CompactString)>,
    success_symbol: CompactString,
    failure_symbol: CompactString,
    info_update_interval: Duration,
    sink: W,
}

impl ProgressBuilder<Stdout> {
    /// Starts building an indicator line with `text`, writing to standard output.
    #[must_use]
    pub fn new(text: impl Into<CompactString>) -> Self {
        Self {
            text: text.into(),
            determined: false,
            width: None,
            append_dots: true,
            indicator: Indicator::default(),
            colors: None,
            styles: Vec::new(),
            success_symbol: SuccessSymbol::default().into(),
            failure_symbol: FailureSymbol::default().into(),
            info_update_interval: Duration::ZERO,
            sink: io::stdout(),
        }
    }
}

impl<W> ProgressBuilder<W> {
    /// Shows a percentage (`true`) or an indicator (`false`, the default).
    #[must_use]
    pub const fn determined(mut self, determined: bool) -> Self {
        self.determined = determined;
        self
    }

    /// Sets the width explicitly instead of probing the terminal.
    #[must_use]
    pub const fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    /// Enables (the default) or disables the trailing dots.
    #[must_use]
    pub const fn append_dots(mut self, enable: bool) -> Self {
        self.append_dots = enable;
        self
    }

    /// Sets the indicator animation.
    #[must_use]
    pub fn indicator(mut self, indicator: impl Into<Indicator>) -> Self {
        self.indicator = indicator.into();
        self
    }

    /// Sets the color context instead of detecting it.
    #[must_use]
    pub const fn colors(mut self, colors: ColorContext) -> Self {
        self.colors = Some(colors);
        self
    }

    /// Overrides the markup of a region.
    #[must_use]
    pub fn style(mut self, style: Style, markup: impl Into<CompactString>) -> Self {
        self.styles.push((style, markup.into()));
        self
    }

    /// Sets the success symbol.
    #[must_use]
    pub fn success_symbol(mut self, symbol: impl Into<CompactString>) -> Self {
        self.success_symbol = symbol.into();
        self
    }

    /// Sets the failure symbol.
    #[must_use]
    pub fn failure_symbol(mut self, symbol: impl Into<CompactString>) -> Self {
        self.failure_symbol = symbol.into();
        self
    }

    /// Sets the minimal time between visible text/percentage changes.
    #[must_use]
    pub const fn info_update_interval(mut self, interval: Duration) -> Self {
        self.info_update_interval = interval;
        self
    }

    /// Redirects the output to `sink`.
    #[must_use]
    pub fn sink<V>(self, sink: V) -> ProgressBuilder<V> {
        ProgressBuilder {
            text: self.text,
            determined: self.determined,
            width: self.width,
            append_dots: self.append_dots,
            indicator: self.indicator,
            colors: self.colors,
            styles: self.styles,
            success_symbol: self.success_symbol,
            failure_symbol: self.failure_symbol,
            info_update_interval: self.info_update_interval,
            sink,
        }
    }
}

impl<W: Write + Send + 'static> ProgressBuilder<W> {
    /// Consumes the builder and returns the hidden [`Progress`] instance.
    ///
    /// # Errors
    ///
    /// * [`Error::Probe`](crate::Error::Probe) when no width was set and standard output
    ///   is not a terminal.
    /// * [`Error::InsufficientWidth`](crate::Error::InsufficientWidth) when the width is
    ///   below [`MIN_WIDTH`](crate::MIN_WIDTH).
    pub fn build(self) -> Result<Progress<W>> {
        let width = match self.width {
            Some(width) => width,
            None => Terminal::from_env().columns()?,
        };
        let width = validate_width(width)?;

        let colors = self.colors.unwrap_or_else(ColorContext::detect);
        let mut styles = StyleTable::new(&colors);
        for (style, markup) in &self.styles {
            styles.set(*style, markup, &colors);
        }

        Ok(Progress::from_parts(
            self.determined,
            width,
            self.append_dots,
            self.info_update_interval,
            Cold {
                text: self.text,
                pending_text: None,
                indicator: self.indicator,
                styles,
                colors,
                success_symbol: self.success_symbol,
                failure_symbol: self.failure_symbol,
                sink: self.sink,
            },
        ))
    }
}
