//! Presentation model: inline style objects, their resolved forms, and the
//! channels (classes, theme) that feed them.

pub mod classes;
pub mod resolve;
pub mod theme;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::palette::Rgba;

pub use classes::{ClassNames, Stylesheet};
pub use resolve::{StyleInputs, StyleResolution, resolve};
pub use theme::Theme;

/// Tab stop distance used when nothing overrides it.
pub const DEFAULT_TAB_WIDTH: u16 = 8;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BorderKind {
    #[default]
    None,
    Plain,
    Double,
    Thick,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WrapMode {
    /// Break between words, falling back to characters for overlong words.
    #[default]
    Word,
    /// Break at any character.
    Char,
    /// Only explicit newlines start a line; long lines scroll horizontally.
    None,
}

/// Per-side spacing in cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Edges {
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
    pub left: u16,
}

impl Edges {
    pub const ZERO: Self = Self::all(0);

    pub const fn all(value: u16) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub const fn symmetric(vertical: u16, horizontal: u16) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(self) -> usize {
        usize::from(self.left) + usize::from(self.right)
    }

    pub fn vertical(self) -> usize {
        usize::from(self.top) + usize::from(self.bottom)
    }
}

/// Accepts `2`, `[1, 2]`, `[1, 2, 3, 4]` or `{ "top": 1, ... }`.
impl<'de> Deserialize<'de> for Edges {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Uniform(u16),
            List(Vec<u16>),
            Sides {
                #[serde(default)]
                top: u16,
                #[serde(default)]
                right: u16,
                #[serde(default)]
                bottom: u16,
                #[serde(default)]
                left: u16,
            },
        }

        match Raw::deserialize(deserializer)? {
            Raw::Uniform(value) => Ok(Edges::all(value)),
            Raw::List(values) => match values.as_slice() {
                [all] => Ok(Edges::all(*all)),
                [vertical, horizontal] => Ok(Edges::symmetric(*vertical, *horizontal)),
                [top, right, bottom, left] => Ok(Edges {
                    top: *top,
                    right: *right,
                    bottom: *bottom,
                    left: *left,
                }),
                other => Err(de::Error::invalid_length(
                    other.len(),
                    &"one, two or four edge values",
                )),
            },
            Raw::Sides {
                top,
                right,
                bottom,
                left,
            } => Ok(Edges {
                top,
                right,
                bottom,
                left,
            }),
        }
    }
}

/// Inline style object. Unset fields defer to lower-precedence channels.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Style {
    pub fg: Option<Rgba>,
    pub bg: Option<Rgba>,
    pub bold: Option<bool>,
    pub dim: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub opacity: Option<f32>,
    pub border: Option<BorderKind>,
    pub border_color: Option<Rgba>,
    pub rounded: Option<bool>,
    pub padding: Option<Edges>,
    pub line_height: Option<u16>,
    pub letter_spacing: Option<u16>,
    pub word_spacing: Option<u16>,
    pub tab_width: Option<u16>,
    pub wrap: Option<WrapMode>,
}

macro_rules! take_set_fields {
    ($target:expr, $source:expr; $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $source.$field {
                $target.$field = Some(value);
            }
        )+
    };
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fg(color: Rgba) -> Self {
        Self::new().with_fg(color)
    }

    pub fn bg(color: Rgba) -> Self {
        Self::new().with_bg(color)
    }

    pub fn with_fg(mut self, color: Rgba) -> Self {
        self.fg = Some(color);
        self
    }

    pub fn with_bg(mut self, color: Rgba) -> Self {
        self.bg = Some(color);
        self
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn with_border(mut self, border: BorderKind) -> Self {
        self.border = Some(border);
        self
    }

    pub fn with_border_color(mut self, color: Rgba) -> Self {
        self.border_color = Some(color);
        self
    }

    pub fn with_padding(mut self, padding: Edges) -> Self {
        self.padding = Some(padding);
        self
    }

    pub fn with_line_height(mut self, rows: u16) -> Self {
        self.line_height = Some(rows);
        self
    }

    pub fn with_letter_spacing(mut self, cells: u16) -> Self {
        self.letter_spacing = Some(cells);
        self
    }

    pub fn with_word_spacing(mut self, cells: u16) -> Self {
        self.word_spacing = Some(cells);
        self
    }

    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap = Some(wrap);
        self
    }

    /// Overwrites every field that `higher` sets.
    pub fn merge(&mut self, higher: &Style) {
        take_set_fields!(self, higher;
            fg, bg, bold, dim, italic, underline, opacity,
            border, border_color, rounded,
            padding, line_height, letter_spacing, word_spacing, tab_width, wrap,
        );
    }

    /// Folds layers given from lowest to highest precedence.
    pub fn layered<'a>(layers: impl IntoIterator<Item = &'a Style>) -> Style {
        let mut merged = Style::default();
        for layer in layers {
            merged.merge(layer);
        }
        merged
    }

    pub fn appearance(&self) -> Appearance {
        Appearance {
            fg: self.fg,
            bg: self.bg,
            bold: self.bold.unwrap_or(false),
            dim: self.dim.unwrap_or(false),
            italic: self.italic.unwrap_or(false),
            underline: self.underline.unwrap_or(false),
            opacity: self.opacity.map_or(1.0, |value| value.clamp(0.0, 1.0)),
            border: self.border.unwrap_or_default(),
            border_color: self.border_color,
            rounded: self.rounded.unwrap_or(false),
        }
    }

    pub fn typography(&self) -> Typography {
        let defaults = Typography::default();
        Typography {
            padding: self.padding.unwrap_or(defaults.padding),
            line_height: self.line_height.unwrap_or(defaults.line_height).max(1),
            letter_spacing: self.letter_spacing.unwrap_or(defaults.letter_spacing),
            word_spacing: self.word_spacing.unwrap_or(defaults.word_spacing),
            tab_width: self.tab_width.unwrap_or(defaults.tab_width).max(1),
            wrap: self.wrap.unwrap_or(defaults.wrap),
        }
    }
}

/// Resolved presentation attributes of one painted part.
#[derive(Clone, Debug, PartialEq)]
pub struct Appearance {
    pub fg: Option<Rgba>,
    pub bg: Option<Rgba>,
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
    pub opacity: f32,
    pub border: BorderKind,
    pub border_color: Option<Rgba>,
    pub rounded: bool,
}

impl Default for Appearance {
    fn default() -> Self {
        Style::default().appearance()
    }
}

impl Appearance {
    pub fn has_border(&self) -> bool {
        self.border != BorderKind::None
    }
}

/// Everything that influences where glyphs land.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Typography {
    pub padding: Edges,
    /// Rows occupied by one line of text.
    pub line_height: u16,
    /// Extra columns after every glyph.
    pub letter_spacing: u16,
    /// Extra columns after every space.
    pub word_spacing: u16,
    pub tab_width: u16,
    pub wrap: WrapMode,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            padding: Edges::ZERO,
            line_height: 1,
            letter_spacing: 0,
            word_spacing: 0,
            tab_width: DEFAULT_TAB_WIDTH,
            wrap: WrapMode::Word,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_only_overwrites_set_fields() {
        let mut base = Style::fg(Rgba::opaque(1, 1, 1)).with_bold(true);

        base.merge(&Style::bg(Rgba::opaque(2, 2, 2)));

        assert_eq!(base.fg, Some(Rgba::opaque(1, 1, 1)));
        assert_eq!(base.bg, Some(Rgba::opaque(2, 2, 2)));
        assert_eq!(base.bold, Some(true));
    }

    #[test]
    fn layered_gives_last_layer_priority() {
        let low = Style::fg(Rgba::opaque(1, 1, 1)).with_line_height(2);
        let high = Style::fg(Rgba::opaque(9, 9, 9));

        let merged = Style::layered([&low, &high]);

        assert_eq!(merged.fg, Some(Rgba::opaque(9, 9, 9)));
        assert_eq!(merged.line_height, Some(2));
    }

    #[test]
    fn typography_clamps_degenerate_values() {
        let style = Style {
            line_height: Some(0),
            tab_width: Some(0),
            ..Style::default()
        };

        let typography = style.typography();

        assert_eq!(typography.line_height, 1);
        assert_eq!(typography.tab_width, 1);
    }

    #[test]
    fn appearance_clamps_opacity() {
        assert_eq!(Style::new().with_opacity(3.0).appearance().opacity, 1.0);
        assert_eq!(Style::new().appearance().opacity, 1.0);
    }

    #[test]
    fn edges_deserialize_from_shorthands() {
        let uniform: Edges = serde_json::from_str("2").unwrap();
        let pair: Edges = serde_json::from_str("[1, 3]").unwrap();
        let sides: Edges = serde_json::from_str(r#"{ "left": 4 }"#).unwrap();

        assert_eq!(uniform, Edges::all(2));
        assert_eq!(pair, Edges::symmetric(1, 3));
        assert_eq!(sides.left, 4);
        assert_eq!(sides.top, 0);
        assert!(serde_json::from_str::<Edges>("[1, 2, 3]").is_err());
    }

    #[test]
    fn builder_spacing_reaches_typography() {
        let typography = Style::new()
            .with_word_spacing(2)
            .with_letter_spacing(1)
            .typography();

        assert_eq!(typography.word_spacing, 2);
        assert_eq!(typography.letter_spacing, 1);
        assert_eq!(typography.tab_width, DEFAULT_TAB_WIDTH);
    }

    #[test]
    fn style_deserializes_camel_case_keys() {
        let style: Style =
            serde_json::from_str(r##"{ "fg": "#222", "lineHeight": 2, "wrap": "char" }"##).unwrap();

        assert_eq!(style.fg, Some(Rgba::opaque(0x22, 0x22, 0x22)));
        assert_eq!(style.line_height, Some(2));
        assert_eq!(style.wrap, Some(WrapMode::Char));
    }
}
