//! Inline markup for terminal text.
//!
//! Strings may carry small specifiers that expand to ANSI escape sequences:
//!
//! * Styles in angle brackets: `<r>` reset, `<b>` bold, `<u>` underline, `<i>` inverse.
//! * Foreground colors between tildes: `~r~ ~g~ ~y~ ~b~ ~m~ ~c~ ~d~` (red, green, yellow,
//!   blue, magenta, cyan, dim).
//! * Background colors use the uppercase letter: `~R~`. If the palette marks the color as
//!   `invert_text`, this expands to inverse video plus the foreground code so the text stays
//!   readable. `~R!~` always emits a literal background code.
//! * A backslash in front of a specifier (`\<b>`) keeps it literally and is itself removed.
//!
//! Anything else passes through untouched. Without color support every specifier is
//! removed, which makes [`remove_specifiers`] a plain "strip markup" operation.
//!
//! # Examples
//!
//! ```
//! use line_progress::{ColorSupport, Palette, text};
//!
//! let s = text::format_copy("<b>~g~ok<r>", Some(ColorSupport::Ansi8), &Palette::DEFAULT);
//! assert_eq!(s, "\x1b[1m\x1b[32mok\x1b[0m");
//! assert_eq!(text::remove_specifiers_copy("<b>ok\\<r>"), "ok<r>");
//! ```

use std::{convert::Infallible, env};

use compact_str::CompactString;
use parking_lot::RwLock;

use crate::{
    enum_map::{EnumMap, enum_key},
    lazy::LazyInit,
    terminal::{ColorSupport, Terminal},
    theme::Palette,
};

const ESCAPE_CHAR: char = '\\';
/// Markup of the reset style.
pub(crate) const RESET: &str = "<r>";
const INVERSE: u8 = 7;

/// One recognized markup token.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Specifier {
    Style(u8),
    Foreground(char),
    Background { letter: char, literal: bool },
}

impl Specifier {
    /// Tries to read a specifier at the start of `s`, returning it with its byte length.
    fn parse(s: &str) -> Option<(Self, usize)> {
        let mut chars = s.chars();
        match (chars.next()?, chars.next()?, chars.next()?) {
            ('<', letter, '>') => {
                let code = match letter {
                    'r' => 0,
                    'b' => 1,
                    'u' => 4,
                    'i' => INVERSE,
                    _ => return None,
                };
                Some((Self::Style(code), 3))
            }
            ('~', letter, '~') if is_color_letter(letter) => Some((Self::Foreground(letter), 3)),
            ('~', letter, '~') if is_color_letter(letter.to_ascii_lowercase()) => Some((
                Self::Background {
                    letter: letter.to_ascii_lowercase(),
                    literal: false,
                },
                3,
            )),
            ('~', letter, '!')
                if letter.is_ascii_uppercase()
                    && is_color_letter(letter.to_ascii_lowercase())
                    && chars.next() == Some('~') =>
            {
                Some((
                    Self::Background {
                        letter: letter.to_ascii_lowercase(),
                        literal: true,
                    },
                    4,
                ))
            }
            _ => None,
        }
    }
}

fn is_color_letter(letter: char) -> bool {
    matches!(letter, 'r' | 'g' | 'y' | 'b' | 'm' | 'c' | 'd')
}

/// Resolved escape-sequence settings for one formatting pass.
struct Codes {
    enabled: bool,
    palette: Palette,
    foreground: &'static str,
    background: &'static str,
}

impl Codes {
    fn new(support: Option<ColorSupport>, palette: &Palette) -> Self {
        // 8-color terminals can't show 256-color codes: fall back to the default palette.
        let palette = match support {
            Some(ColorSupport::Ansi8) if palette.is_256_color() => Palette::DEFAULT,
            _ => *palette,
        };
        let (foreground, background) = if palette.is_256_color() {
            ("38;5;", "48;5;")
        } else {
            ("3", "4")
        };

        Self {
            enabled: support.is_some(),
            palette,
            foreground,
            background,
        }
    }

    fn expand(&self, specifier: Specifier, out: &mut String) {
        if !self.enabled {
            return;
        }

        let (letter, literal_background) = match specifier {
            Specifier::Style(code) => {
                out.push_str(&format!("\x1b[{code}m"));
                return;
            }
            Specifier::Foreground(letter) => {
                return self.expand_color(letter, self.foreground, out);
            }
            Specifier::Background { letter, literal } => (letter, literal),
        };

        let Some(color) = self.palette.by_letter(letter) else {
            return;
        };
        if literal_background || !color.invert_text {
            self.expand_color(letter, self.background, out);
        } else if let Some(code) = color.code {
            out.push_str(&format!("\x1b[{INVERSE};{}{code}m", self.foreground));
        }
    }

    fn expand_color(&self, letter: char, prefix: &str, out: &mut String) {
        if let Some(code) = self.palette.by_letter(letter).and_then(|color| color.code) {
            out.push_str(&format!("\x1b[{prefix}{code}m"));
        }
    }
}

/// Expands every specifier of `s` in place.
///
/// With `support == None`, or for colors the palette lacks, specifiers are removed.
pub fn format(s: &mut String, support: Option<ColorSupport>, palette: &Palette) {
    let codes = Codes::new(support, palette);
    let mut out = String::with_capacity(s.len());
    let mut rest = s.as_str();

    while let Some(c) = rest.chars().next() {
        if c == ESCAPE_CHAR {
            if let Some((_, len)) = Specifier::parse(&rest[1..]) {
                out.push_str(&rest[1..=len]);
                rest = &rest[1 + len..];
                continue;
            }
        } else if let Some((specifier, len)) = Specifier::parse(rest) {
            codes.expand(specifier, &mut out);
            rest = &rest[len..];
            continue;
        }

        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    *s = out;
}

/// Value flavor of [`format`].
#[must_use]
pub fn format_copy(
    s: impl Into<String>,
    support: Option<ColorSupport>,
    palette: &Palette,
) -> String {
    let mut s = s.into();
    format(&mut s, support, palette);
    s
}

/// Removes every specifier, un-escaping escaped ones.
pub fn remove_specifiers(s: &mut String) {
    format(s, None, &Palette::DEFAULT);
}

/// Value flavor of [`remove_specifiers`].
#[must_use]
pub fn remove_specifiers_copy(s: impl Into<String>) -> String {
    format_copy(s, None, &Palette::DEFAULT)
}

/// Color support level and palette used when expanding markup.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ColorContext {
    /// `None` disables escape sequences altogether.
    pub support: Option<ColorSupport>,
    /// Palette that backs the color specifiers.
    pub palette: Palette,
}

impl ColorContext {
    /// Strips all markup.
    pub const PLAIN: Self = Self {
        support: None,
        palette: Palette::DEFAULT,
    };

    /// Bundles a support level with a palette.
    #[must_use]
    pub const fn new(support: Option<ColorSupport>, palette: Palette) -> Self {
        Self { support, palette }
    }

    /// Guesses the context from the environment.
    ///
    /// A non-empty `NO_COLOR` disables colors; otherwise the support level comes from
    /// `$TERM`. The palette is the 8-color default.
    #[must_use]
    pub fn detect() -> Self {
        let no_color = env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        let support = if no_color {
            None
        } else {
            Terminal::from_env().supported_colors()
        };

        log::trace!("detected color support: {support:?}");
        Self::new(support, Palette::DEFAULT)
    }

    /// Expands markup in place with this context.
    pub fn format(&self, s: &mut String) {
        format(s, self.support, &self.palette);
    }

    /// Value flavor of [`ColorContext::format`].
    #[must_use]
    pub fn format_copy(&self, s: impl Into<String>) -> String {
        format_copy(s, self.support, &self.palette)
    }
}

/// Message severities with their own prefix.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Message {
    /// Something failed.
    Error,
    /// Something looks wrong but work continues.
    Warning,
    /// Additional information.
    Note,
}

enum_key!(Message => [Error, Warning, Note]);

type PrefixTable = RwLock<EnumMap<Message, CompactString>>;

#[allow(clippy::unnecessary_wraps)]
fn default_prefixes() -> Result<PrefixTable, Infallible> {
    Ok(RwLock::new(EnumMap::from_fn(|kind| {
        CompactString::const_new(match kind {
            Message::Error => "<b>~r~error:<r> ",
            Message::Warning => "<b>~y~warning:<r> ",
            Message::Note => "<b>~c~note:<r> ",
        })
    })))
}

/// Per-severity prefixes for [`MessagePrefixes::format_message`].
///
/// Prefixes are markup themselves. The table is built on first use, so an unused
/// `MessagePrefixes` costs nothing, and can be modified through a shared reference.
///
/// # Examples
///
/// ```
/// use line_progress::{ColorContext, Message, MessagePrefixes};
///
/// let prefixes = MessagePrefixes::new();
/// prefixes.set(Message::Error, "prefix ");
/// assert_eq!(
///     prefixes.format_message(Message::Error, "test", &ColorContext::PLAIN),
///     "prefix test"
/// );
/// ```
#[derive(Debug)]
pub struct MessagePrefixes {
    table: LazyInit<PrefixTable, Infallible>,
}

impl Default for MessagePrefixes {
    fn default() -> Self {
        Self::new()
    }
}

impl MessagePrefixes {
    /// Creates the prefixes; the table itself is built lazily.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            table: LazyInit::new(default_prefixes),
        }
    }

    fn table(&self) -> &PrefixTable {
        match self.table.get() {
            Ok(table) => table,
            Err(never) => match never {},
        }
    }

    /// Returns the prefix of a severity.
    #[must_use]
    pub fn get(&self, kind: Message) -> CompactString {
        self.table().read().get(kind).clone()
    }

    /// Replaces the prefix of a severity.
    pub fn set(&self, kind: Message, prefix: impl Into<CompactString>) {
        self.table().write().set(kind, prefix.into());
    }

    /// Restores the built-in prefixes.
    pub fn reset(&mut self) {
        self.table.reset();
    }

    /// Prepends the severity prefix to `message` and expands the markup of both.
    #[must_use]
    pub fn format_message(&self, kind: Message, message: &str, context: &ColorContext) -> String {
        let mut s = self.get(kind).into_string();
        s.push_str(message);
        context.format(&mut s);
        s
    }

    /// Formats an error message; shorthand for [`format_message`](Self::format_message).
    #[must_use]
    pub fn error(&self, message: &str, context: &ColorContext) -> String {
        self.format_message(Message::Error, message, context)
    }

    /// Formats a warning message.
    #[must_use]
    pub fn warning(&self, message: &str, context: &ColorContext) -> String {
        self.format_message(Message::Warning, message, context)
    }

    /// Formats a note.
    #[must_use]
    pub fn note(&self, message: &str, context: &ColorContext) -> String {
        self.format_message(Message::Note, message, context)
    }
}

#[cfg(test)]
mod tests {
    use super::{ColorContext, Message, MessagePrefixes, format_copy, remove_specifiers_copy};
    use crate::{
        ColorSupport,
        theme::{Color, Palette, ThemeName, get_palette},
    };

    /// Stripping Markup
    /// Known specifiers vanish, escaped ones are kept literally, unknown casing passes through.
    #[test]
    fn test_remove_specifiers() {
        assert_eq!(
            remove_specifiers_copy("<r>\\<b><U>~r~~g!~~Y~~B!~~!M~"),
            "<b><U>~g!~~!M~"
        );
        assert_eq!(remove_specifiers_copy("plain text"), "plain text");
        assert_eq!(remove_specifiers_copy("a\\b ~x~ <z>"), "a\\b ~x~ <z>");
    }

    /// Palette Downgrade
    /// A 256-color palette on an 8-color terminal falls back to the default palette.
    #[test]
    fn test_downgrade_to_8_colors() {
        let palette = get_palette(ThemeName::MaterialLight).unwrap();
        assert_eq!(
            format_copy("<i>t~c~e~D~s~R~t~G!~", Some(ColorSupport::Ansi8), &palette),
            "\x1b[7mt\x1b[36mes\x1b[41mt\x1b[42m"
        );
    }

    /// 256-color Codes
    /// Inverted backgrounds use inverse video with the foreground code.
    #[test]
    fn test_256_color_codes() {
        let palette = get_palette(ThemeName::MaterialLight).unwrap();
        let support = Some(ColorSupport::Ansi256);

        assert_eq!(format_copy("~r~", support, &palette), "\x1b[38;5;196m");
        assert_eq!(format_copy("~R~", support, &palette), "\x1b[7;38;5;196m");
        assert_eq!(format_copy("~R!~", support, &palette), "\x1b[48;5;196m");
        // Yellow isn't inverted in this palette.
        assert_eq!(format_copy("~Y~", support, &palette), "\x1b[48;5;214m");
        assert_eq!(format_copy("~d~", support, &palette), "\x1b[38;5;249m");
    }

    /// 8-color Palette on a 256-color Terminal
    /// The palette decides the code family, missing colors are dropped.
    #[test]
    fn test_8_color_palette_on_256_terminal() {
        let support = Some(ColorSupport::Ansi256);
        assert_eq!(
            format_copy("~b~x~B~~d~", support, &Palette::DEFAULT),
            "\x1b[34mx\x1b[44m"
        );

        let mut palette = Palette::DEFAULT;
        palette.green = Color::new(2, true);
        assert_eq!(format_copy("~G~", support, &palette), "\x1b[7;32m");
    }

    /// Escapes and Multi-byte Text
    #[test]
    fn test_escapes_and_unicode() {
        let ctx = ColorContext::new(Some(ColorSupport::Ansi8), Palette::DEFAULT);
        assert_eq!(ctx.format_copy("✓ \\~g~ <u>é"), "✓ ~g~ \x1b[4mé");
        assert_eq!(ctx.format_copy("\\"), "\\");
        assert_eq!(ctx.format_copy("~"), "~");
    }

    /// Message Prefixes
    /// Prefixes are configurable, formatted with the message, and resettable.
    #[test]
    fn test_message_prefixes() {
        let mut prefixes = MessagePrefixes::new();
        assert_eq!(
            prefixes.format_message(Message::Warning, "careful", &ColorContext::PLAIN),
            "warning: careful"
        );

        prefixes.set(Message::Error, "prefix ");
        assert_eq!(
            prefixes.format_message(Message::Error, "test", &ColorContext::PLAIN),
            "prefix test"
        );

        prefixes.reset();
        assert_eq!(prefixes.get(Message::Error), "<b>~r~error:<r> ");

        let ctx = ColorContext::new(Some(ColorSupport::Ansi8), Palette::DEFAULT);
        assert_eq!(
            prefixes.error("failed", &ctx),
            "\x1b[1m\x1b[31merror:\x1b[0m failed"
        );
        assert_eq!(
            prefixes.warning("careful", &ColorContext::PLAIN),
            "warning: careful"
        );
        assert_eq!(prefixes.note("fyi", &ColorContext::PLAIN), "note: fyi");
    }
}
