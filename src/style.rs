//! Per-region styles of a progress line.
//!
//! Each region of the line has a markup string (see [`text`](crate::text)). Rendering
//! happens many times per second, so the markup is compiled to escape sequences once,
//! whenever the markup or the color context changes, and the render loop only concatenates.

use compact_str::CompactString;

use crate::{
    enum_map::{EnumMap, enum_key},
    text::{ColorContext, RESET},
};

/// Regions of a progress line that can be styled.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Style {
    /// Everything outside the other regions; also terminates them.
    Plain,
    /// The filled part of a determined progress line.
    LoadingBar,
    /// The percentage readout.
    Percentage,
    /// The indicator frame.
    Indicator,
    /// The symbol of a success result line.
    SuccessSymbol,
    /// The symbol of a failure result line.
    FailureSymbol,
}

enum_key!(Style => [Plain, LoadingBar, Percentage, Indicator, SuccessSymbol, FailureSymbol]);

impl Style {
    /// Markup used when nothing else was configured.
    #[must_use]
    pub const fn default_markup(self) -> &'static str {
        match self {
            Self::Plain => "<r>",
            Self::LoadingBar => "~B~",
            Self::Percentage => "<b>",
            Self::Indicator => "<b>~y~",
            Self::SuccessSymbol => "<b>~g~",
            Self::FailureSymbol => "<b>~r~",
        }
    }
}

/// Markup and compiled escape sequences for every [`Style`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct StyleTable {
    markup: EnumMap<Style, CompactString>,
    compiled: EnumMap<Style, CompactString>,
    /// Reset followed by the Plain style; closes a styled region.
    closing: CompactString,
}

/// Markup of the Plain style prefixed by a reset, unless it starts with one already.
fn closing_markup(plain: &str) -> String {
    if plain.starts_with(RESET) {
        plain.to_owned()
    } else {
        format!("{RESET}{plain}")
    }
}

impl StyleTable {
    pub(crate) fn new(context: &ColorContext) -> Self {
        let markup =
            EnumMap::from_fn(|style: Style| CompactString::const_new(style.default_markup()));
        let mut table = Self {
            compiled: markup.clone(),
            markup,
            closing: CompactString::default(),
        };
        table.recompile(context);
        table
    }

    /// Markup of a region.
    pub(crate) fn markup(&self, style: Style) -> &str {
        self.markup.get(style)
    }

    /// Ready-to-emit escape sequence of a region.
    pub(crate) fn compiled(&self, style: Style) -> &str {
        self.compiled.get(style)
    }

    /// Compiled reset plus Plain style, emitted wherever a styled region ends.
    pub(crate) fn closing(&self) -> &str {
        &self.closing
    }

    pub(crate) fn set(&mut self, style: Style, markup: &str, context: &ColorContext) {
        self.markup.set(style, markup.into());
        self.compiled.set(style, context.format_copy(markup).into());
        if style == Style::Plain {
            self.closing = context.format_copy(closing_markup(markup)).into();
        }
    }

    /// Recompiles every region, e.g. after the color context changed.
    pub(crate) fn recompile(&mut self, context: &ColorContext) {
        let markup = &self.markup;
        self.compiled.for_each_mut(|style, compiled| {
            *compiled = context.format_copy(markup.get(style).as_str()).into();
        });
        self.closing = context
            .format_copy(closing_markup(self.markup.get(Style::Plain)))
            .into();
    }
}

#[cfg(test)]
mod tests {
    use super::{Style, StyleTable};
    use crate::{ColorContext, ColorSupport, Palette};

    /// Compilation Follows Context
    /// Styles compile to escape sequences and are recompiled when colors change.
    #[test]
    fn test_compile_and_recompile() {
        let colored = ColorContext::new(Some(ColorSupport::Ansi8), Palette::DEFAULT);
        let mut table = StyleTable::new(&colored);

        assert_eq!(table.markup(Style::Indicator), "<b>~y~");
        assert_eq!(table.compiled(Style::Indicator), "\x1b[1m\x1b[33m");
        assert_eq!(table.compiled(Style::LoadingBar), "\x1b[44m");

        assert_eq!(table.closing(), "\x1b[0m");

        table.set(Style::Plain, "<u>", &colored);
        assert_eq!(table.compiled(Style::Plain), "\x1b[4m");
        assert_eq!(table.closing(), "\x1b[0m\x1b[4m");

        table.recompile(&ColorContext::PLAIN);
        assert_eq!(table.markup(Style::Plain), "<u>");
        assert_eq!(table.compiled(Style::Plain), "");
        assert_eq!(table.closing(), "");
        assert_eq!(table.compiled(Style::SuccessSymbol), "");
    }
}
