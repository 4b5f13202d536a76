use std::time::Instant;

use crate::buffer::{CellAttributes, CursorShape, DoubleBuffer};
use crate::geometry::{Point, Rect};
use crate::palette::{Palette, Rgba};
use crate::scroll::ScrollOffset;
use crate::style::{Appearance, BorderKind};
use crate::text_layout::{Glyph, TextLayout, char_width};

/// Drawing surface handed to views. All writes are clipped to [`RenderContext::area`].
pub struct RenderContext<'a> {
    buffer: &'a mut DoubleBuffer,
    palette: &'a Palette,
    area: Rect,
    frame_time: Instant,
}

impl<'a> RenderContext<'a> {
    pub fn new(buffer: &'a mut DoubleBuffer, palette: &'a Palette, frame_time: Instant) -> Self {
        let (width, height) = buffer.dimensions();
        buffer.set_base_background(palette.background);
        Self {
            buffer,
            palette,
            area: Rect::new(0, 0, width, height),
            frame_time,
        }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn palette(&self) -> &Palette {
        self.palette
    }

    /// The instant this frame is drawn for. Animations read time from here.
    pub fn frame_time(&self) -> Instant {
        self.frame_time
    }

    /// A context restricted to `area` (intersected with the current one).
    pub fn with_area(&mut self, area: Rect) -> RenderContext<'_> {
        RenderContext {
            buffer: self.buffer,
            palette: self.palette,
            area: self.area.intersection(area),
            frame_time: self.frame_time,
        }
    }

    pub fn write_char(&mut self, x: usize, y: usize, ch: char, attrs: &CellAttributes) -> usize {
        if !self.area.contains(Point::new(x, y)) {
            return 0;
        }
        let width = char_width(ch).max(1);
        if x + width > self.area.right() {
            return 0;
        }
        self.buffer.write_char(x, y, ch, attrs)
    }

    pub fn write_text(&mut self, x: usize, y: usize, text: &str, attrs: &CellAttributes) -> usize {
        let mut col = x;
        for ch in text.chars() {
            let written = self.write_char(col, y, ch, attrs);
            if written == 0 {
                break;
            }
            col += written;
        }
        col - x
    }

    pub fn fill(&mut self, rect: Rect, attrs: &CellAttributes) {
        let rect = self.area.intersection(rect);
        self.buffer.fill_rect(rect, ' ', attrs);
    }

    pub fn set_background(&mut self, x: usize, y: usize, color: Rgba) {
        if self.area.contains(Point::new(x, y)) {
            self.buffer.set_background(x, y, color);
        }
    }

    pub fn set_cursor(&mut self, x: usize, y: usize, shape: CursorShape) {
        if self.area.contains(Point::new(x, y)) {
            self.buffer.set_cursor(x, y, shape);
        }
    }

    pub fn draw_border(&mut self, rect: Rect, kind: BorderKind, rounded: bool, attrs: &CellAttributes) {
        let Some(glyphs) = BorderGlyphs::for_kind(kind, rounded) else {
            return;
        };
        if !rect.has_area() {
            return;
        }

        let right = rect.right() - 1;
        let bottom = rect.bottom() - 1;

        for x in rect.x..=right {
            self.write_char(x, rect.y, glyphs.horizontal, attrs);
            self.write_char(x, bottom, glyphs.horizontal, attrs);
        }
        for y in rect.y..=bottom {
            self.write_char(rect.x, y, glyphs.vertical, attrs);
            self.write_char(right, y, glyphs.vertical, attrs);
        }
        self.write_char(rect.x, rect.y, glyphs.top_left, attrs);
        self.write_char(right, rect.y, glyphs.top_right, attrs);
        self.write_char(rect.x, bottom, glyphs.bottom_left, attrs);
        self.write_char(right, bottom, glyphs.bottom_right, attrs);
    }

    /// Paints laid out glyphs into `area`, shifted by `scroll`. The text starts
    /// inside the layout's padding. `attrs` picks each glyph's attributes, or
    /// skips it with `None`.
    pub fn draw_glyphs(
        &mut self,
        area: Rect,
        layout: &TextLayout,
        scroll: ScrollOffset,
        mut attrs: impl FnMut(&Glyph) -> Option<CellAttributes>,
    ) {
        let padding = layout.typography().padding;
        let mut ctx = self.with_area(area);
        for glyph in layout.glyphs() {
            if glyph.width == 0 {
                continue;
            }
            let content_x = usize::from(padding.left) + glyph.column;
            let content_y = usize::from(padding.top) + layout.row_of_line(glyph.line);
            let (Some(x), Some(y)) = (
                (area.x + content_x).checked_sub(scroll.x),
                (area.y + content_y).checked_sub(scroll.y),
            ) else {
                continue;
            };
            if x < area.x || y < area.y {
                continue;
            }
            let Some(glyph_attrs) = attrs(glyph) else {
                continue;
            };
            if glyph.ch == '\t' {
                for column in 0..glyph.width {
                    ctx.write_char(x + column, y, ' ', &glyph_attrs);
                }
            } else {
                ctx.write_char(x, y, glyph.ch, &glyph_attrs);
            }
        }
    }

    pub fn buffer(&self) -> &DoubleBuffer {
        self.buffer
    }
}

struct BorderGlyphs {
    horizontal: char,
    vertical: char,
    top_left: char,
    top_right: char,
    bottom_left: char,
    bottom_right: char,
}

impl BorderGlyphs {
    fn for_kind(kind: BorderKind, rounded: bool) -> Option<Self> {
        let glyphs = match (kind, rounded) {
            (BorderKind::None, _) => return None,
            (BorderKind::Plain, false) => ['─', '│', '┌', '┐', '└', '┘'],
            (BorderKind::Plain, true) => ['─', '│', '╭', '╮', '╰', '╯'],
            (BorderKind::Double, _) => ['═', '║', '╔', '╗', '╚', '╝'],
            (BorderKind::Thick, _) => ['━', '┃', '┏', '┓', '┗', '┛'],
        };
        let [horizontal, vertical, top_left, top_right, bottom_left, bottom_right] = glyphs;
        Some(Self {
            horizontal,
            vertical,
            top_left,
            top_right,
            bottom_left,
            bottom_right,
        })
    }
}

/// Cell attributes for an appearance, with its opacity applied to the foreground.
///
/// A translucent appearance without its own color dims `inherited_fg` instead.
pub fn appearance_to_attributes(appearance: &Appearance, inherited_fg: Rgba) -> CellAttributes {
    let foreground = match appearance.fg {
        Some(color) => Some(color.with_opacity(appearance.opacity)),
        None if appearance.opacity < 1.0 => Some(inherited_fg.with_opacity(appearance.opacity)),
        None => None,
    };
    CellAttributes {
        foreground,
        background: appearance.bg,
        bold: appearance.bold,
        dim: appearance.dim,
        italic: appearance.italic,
        underline: appearance.underline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context_test(width: usize, height: usize, paint: impl FnOnce(&mut RenderContext<'_>)) -> Vec<String> {
        let mut buffer = DoubleBuffer::new(width, height);
        let palette = Palette::default();
        let mut ctx = RenderContext::new(&mut buffer, &palette, Instant::now());
        paint(&mut ctx);
        buffer.lines()
    }

    #[test]
    fn draws_plain_border() {
        let lines = context_test(4, 3, |ctx| {
            ctx.draw_border(Rect::new(0, 0, 4, 3), BorderKind::Plain, false, &CellAttributes::default());
        });

        assert_eq!(lines, vec!["┌──┐", "│  │", "└──┘"]);
    }

    #[test]
    fn rounded_corners_only_change_corners() {
        let lines = context_test(3, 2, |ctx| {
            ctx.draw_border(Rect::new(0, 0, 3, 2), BorderKind::Plain, true, &CellAttributes::default());
        });

        assert_eq!(lines, vec!["╭─╮", "╰─╯"]);
    }

    #[test]
    fn sub_area_clips_writes() {
        let lines = context_test(6, 2, |ctx| {
            let mut inner = ctx.with_area(Rect::new(1, 0, 3, 1));
            inner.write_text(1, 0, "abcdef", &CellAttributes::default());
            inner.write_text(1, 1, "zz", &CellAttributes::default());
        });

        assert_eq!(lines, vec![" abc  ", "      "]);
    }

    #[test]
    fn glyphs_are_shifted_by_scroll_and_clipped() {
        use crate::style::{Typography, WrapMode};

        let typography = Typography {
            wrap: WrapMode::None,
            ..Typography::default()
        };
        let layout = TextLayout::new("abc\ndef\nghi", typography, 10);
        let lines = context_test(4, 3, |ctx| {
            ctx.draw_glyphs(
                Rect::new(1, 0, 2, 2),
                &layout,
                ScrollOffset::new(1, 1),
                |_| Some(CellAttributes::default()),
            );
        });

        assert_eq!(lines, vec![" ef ", " hi ", "    "]);
    }

    #[test]
    fn appearance_opacity_lowers_foreground_alpha() {
        let appearance = Appearance {
            fg: Some(Rgba::opaque(100, 100, 100)),
            opacity: 0.5,
            ..Appearance::default()
        };

        let attrs = appearance_to_attributes(&appearance, Rgba::opaque(1, 1, 1));

        assert_eq!(attrs.foreground.map(|color| color.a), Some(128));
    }

    #[test]
    fn opacity_without_color_dims_the_inherited_foreground() {
        let translucent = Appearance {
            opacity: 0.5,
            ..Appearance::default()
        };
        let inherited = Rgba::opaque(200, 200, 200);

        let attrs = appearance_to_attributes(&translucent, inherited);
        let plain = appearance_to_attributes(&Appearance::default(), inherited);

        assert_eq!(attrs.foreground, Some(inherited.with_opacity(0.5)));
        assert_eq!(plain.foreground, None);
    }
}
