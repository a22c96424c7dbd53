//! Color palettes and the built-in themes.
//!
//! A [`Palette`] maps the seven markup colors (`r g y b m c d`) to terminal color codes.
//! The [`ThemeName::Default`] palette targets terminals that only know the eight basic
//! colors; every other built-in theme uses 256-color codes.

use std::{fmt, str::FromStr};

use crate::{
    Error, Result,
    enum_map::{EnumMap, enum_key},
};

/// A single palette entry.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    /// Terminal color code, or `None` when the palette has no such color.
    pub code: Option<u8>,
    /// Whether text should be inverted when the color is used as a background.
    pub invert_text: bool,
}

impl Color {
    /// Marks a color that the palette cannot express.
    pub const ABSENT: Self = Self {
        code: None,
        invert_text: false,
    };

    /// Creates a palette entry.
    #[must_use]
    pub const fn new(code: u8, invert_text: bool) -> Self {
        Self {
            code: Some(code),
            invert_text,
        }
    }

    /// Returns `true` when the color has a code.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        self.code.is_some()
    }
}

/// The seven colors addressable from markup.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Palette {
    /// `~r~`
    pub red: Color,
    /// `~g~`
    pub green: Color,
    /// `~y~`
    pub yellow: Color,
    /// `~b~`
    pub blue: Color,
    /// `~m~`
    pub magenta: Color,
    /// `~c~`
    pub cyan: Color,
    /// `~d~`
    pub dim: Color,
}

impl Palette {
    /// The 8-color palette. Dim has no 8-color analog and is therefore absent.
    pub const DEFAULT: Self = Self {
        red: Color::new(1, false),
        green: Color::new(2, false),
        yellow: Color::new(3, false),
        blue: Color::new(4, false),
        magenta: Color::new(5, false),
        cyan: Color::new(6, false),
        dim: Color::ABSENT,
    };

    /// Returns the color bound to a lowercase markup letter.
    #[must_use]
    pub const fn by_letter(&self, letter: char) -> Option<&Color> {
        match letter {
            'r' => Some(&self.red),
            'g' => Some(&self.green),
            'y' => Some(&self.yellow),
            'b' => Some(&self.blue),
            'm' => Some(&self.magenta),
            'c' => Some(&self.cyan),
            'd' => Some(&self.dim),
            _ => None,
        }
    }

    /// Whether this palette uses 256-color codes.
    ///
    /// Only 256-color palettes define dim, so its presence tells the two kinds apart.
    #[must_use]
    pub const fn is_256_color(&self) -> bool {
        self.dim.is_present()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Built-in themes plus the marker for a user-supplied palette.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ThemeName {
    /// For terminals that only support 8 colors. Dark background implied.
    #[default]
    Default,
    /// For light backgrounds.
    MaterialLight,
    /// For dark backgrounds.
    MaterialDark,
    /// For dark backgrounds, muted tones.
    ArcticDark,
    /// A palette installed with [`Theme::set_palette`]; has no built-in table entry.
    User,
}

/// The subset of [`ThemeName`] that has a built-in palette.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum BuiltIn {
    Default,
    MaterialLight,
    MaterialDark,
    ArcticDark,
}

enum_key!(BuiltIn => [Default, MaterialLight, MaterialDark, ArcticDark]);

fn builtin_palettes() -> EnumMap<BuiltIn, Palette> {
    EnumMap::from_fn(|theme| match theme {
        BuiltIn::Default => Palette::DEFAULT,
        BuiltIn::MaterialLight => Palette {
            red: Color::new(196, true),
            green: Color::new(35, true),
            yellow: Color::new(214, false),
            blue: Color::new(33, true),
            magenta: Color::new(207, true),
            cyan: Color::new(45, false),
            dim: Color::new(249, false),
        },
        BuiltIn::MaterialDark => Palette {
            red: Color::new(202, false),
            green: Color::new(41, true),
            yellow: Color::new(220, true),
            blue: Color::new(75, false),
            magenta: Color::new(207, true),
            cyan: Color::new(51, true),
            dim: Color::new(246, false),
        },
        BuiltIn::ArcticDark => Palette {
            red: Color::new(167, false),
            green: Color::new(150, true),
            yellow: Color::new(222, true),
            blue: Color::new(110, true),
            magenta: Color::new(182, true),
            cyan: Color::new(116, true),
            dim: Color::new(249, true),
        },
    })
}

impl ThemeName {
    /// Every selectable theme, in index order.
    pub const ALL: [Self; 5] = [
        Self::Default,
        Self::MaterialLight,
        Self::MaterialDark,
        Self::ArcticDark,
        Self::User,
    ];

    /// Position of the theme in [`ThemeName::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Kebab-case name used by [`FromStr`] and [`Display`](fmt::Display).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::MaterialLight => "material-light",
            Self::MaterialDark => "material-dark",
            Self::ArcticDark => "arctic-dark",
            Self::User => "user",
        }
    }
}

impl TryFrom<usize> for ThemeName {
    type Error = Error;

    fn try_from(index: usize) -> Result<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(Error::InvalidPaletteIndex(index))
    }
}

impl FromStr for ThemeName {
    type Err = Error;

    /// Parses a kebab-case theme name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|theme| theme.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownTheme(s.to_owned()))
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the palette of a built-in theme.
///
/// # Errors
///
/// [`Error::InvalidPaletteIndex`] for [`ThemeName::User`], which has no built-in table entry.
///
/// # Examples
///
/// ```
/// use line_progress::{ThemeName, get_palette};
///
/// let palette = get_palette(ThemeName::MaterialDark).unwrap();
/// assert!(palette.is_256_color());
/// assert!(get_palette(ThemeName::User).is_err());
/// ```
pub fn get_palette(name: ThemeName) -> Result<Palette> {
    builtin_palettes()
        .get_index(name.index())
        .copied()
        .ok_or(Error::InvalidPaletteIndex(name.index()))
}

/// The selected theme together with its palette.
///
/// This is an ordinary value, not process-wide state: applications keep one around (or
/// several) and hand its palette to whatever renders text.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Theme {
    name: ThemeName,
    palette: Palette,
}

impl Theme {
    /// Creates a theme from a built-in name.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPaletteIndex`] for [`ThemeName::User`].
    pub fn new(name: ThemeName) -> Result<Self> {
        Ok(Self {
            name,
            palette: get_palette(name)?,
        })
    }

    /// Wraps a user-supplied palette.
    #[must_use]
    pub const fn custom(palette: Palette) -> Self {
        Self {
            name: ThemeName::User,
            palette,
        }
    }

    /// The theme name ([`ThemeName::User`] for custom palettes).
    #[must_use]
    pub const fn name(&self) -> ThemeName {
        self.name
    }

    /// The active palette.
    #[must_use]
    pub const fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Switches to a built-in theme. On error the current theme is kept.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPaletteIndex`] for [`ThemeName::User`].
    pub fn set_theme(&mut self, name: ThemeName) -> Result<()> {
        *self = Self::new(name)?;
        Ok(())
    }

    /// Installs a user palette.
    pub fn set_palette(&mut self, palette: Palette) {
        *self = Self::custom(palette);
    }
}

#[cfg(test)]
mod tests {
    use super::{Color, Palette, Theme, ThemeName, get_palette};
    use crate::Error;

    /// Built-in Tables
    /// Only the default palette lacks dim; all others are 256-color palettes.
    #[test]
    fn test_builtin_palettes() {
        assert_eq!(get_palette(ThemeName::Default).unwrap(), Palette::DEFAULT);
        assert!(!Palette::DEFAULT.is_256_color());

        let light = get_palette(ThemeName::MaterialLight).unwrap();
        assert!(light.is_256_color());
        assert_eq!(light.red, Color::new(196, true));

        for name in [ThemeName::MaterialDark, ThemeName::ArcticDark] {
            assert!(get_palette(name).unwrap().is_256_color());
        }
    }

    /// Invalid Selectors
    #[test]
    fn test_invalid_palette_index() {
        assert!(matches!(
            get_palette(ThemeName::User),
            Err(Error::InvalidPaletteIndex(4))
        ));
        assert!(matches!(
            ThemeName::try_from(9_usize),
            Err(Error::InvalidPaletteIndex(9))
        ));
        assert_eq!(ThemeName::try_from(1_usize).unwrap(), ThemeName::MaterialLight);
    }

    /// Name Parsing
    #[test]
    fn test_theme_names_round_trip_through_strings() {
        for name in ThemeName::ALL {
            assert_eq!(name.to_string().parse::<ThemeName>().unwrap(), name);
        }
        assert_eq!(
            "Arctic-Dark".parse::<ThemeName>().unwrap(),
            ThemeName::ArcticDark
        );
        assert!(matches!(
            "solarized".parse::<ThemeName>(),
            Err(Error::UnknownTheme(name)) if name == "solarized"
        ));
    }

    /// Theme Switching
    /// A failed switch keeps the previous palette; custom palettes are tagged as user themes.
    #[test]
    fn test_theme_switching() {
        let mut theme = Theme::new(ThemeName::MaterialDark).unwrap();
        assert!(theme.set_theme(ThemeName::User).is_err());
        assert_eq!(theme.name(), ThemeName::MaterialDark);

        let mut custom = Palette::DEFAULT;
        custom.dim = Color::new(8, false);
        theme.set_palette(custom);
        assert_eq!(theme.name(), ThemeName::User);
        assert_eq!(theme.palette(), &custom);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_palette_serde() {
        let json = serde_json::to_string(&Palette::DEFAULT).unwrap();
        let back: Palette = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Palette::DEFAULT);

        let name: ThemeName = serde_json::from_str("\"material-light\"").unwrap();
        assert_eq!(name, ThemeName::MaterialLight);
    }
}
