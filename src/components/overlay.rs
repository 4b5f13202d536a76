//! The ghost text layer drawn underneath the live input.
//!
//! It lays out `value + completion` with the input's typography in the
//! input's box and copies the input's scroll position verbatim, so every
//! typed glyph sits exactly where the input draws it. Only the completion
//! segment shows through as ghost text; the typed segment is painted as
//! background so the live input's glyphs stay on top.

use crate::buffer::CellAttributes;
use crate::geometry::Rect;
use crate::render::RenderContext;
use crate::scroll::ScrollOffset;
use crate::style::Typography;
use crate::text_layout::{Layouter, Segment, TextLayout};

#[derive(Clone, Debug)]
pub struct OverlayState {
    scroll: ScrollOffset,
    area: Rect,
    layout: TextLayout,
}

impl Default for OverlayState {
    fn default() -> Self {
        Self {
            scroll: ScrollOffset::ZERO,
            area: Rect::default(),
            layout: TextLayout::new("", Typography::default(), 0),
        }
    }
}

impl OverlayState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layout_text(&mut self, value: &str, completion: &str, area: Rect, typography: Typography) {
        let width = area.width.saturating_sub(typography.padding.horizontal());
        let mut layouter = Layouter::new(typography, width);
        layouter.push(value, Segment::Typed);
        layouter.push(completion, Segment::Completion);
        self.layout = layouter.finish();
        self.area = area;
    }

    /// Mirrors the input's scroll position. Never clamped: the overlay's own
    /// content may be taller than the input's.
    pub fn sync_scroll(&mut self, input: ScrollOffset) {
        self.scroll = input;
    }

    pub fn scroll(&self) -> ScrollOffset {
        self.scroll
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn layout(&self) -> &TextLayout {
        &self.layout
    }

    pub fn text(&self) -> String {
        self.layout.text()
    }

    pub fn completion_text(&self) -> String {
        self.layout.segment_text(Segment::Completion)
    }

    /// The overlay never receives pointer or keyboard input.
    pub fn is_interactive(&self) -> bool {
        false
    }

    /// The overlay duplicates visible text and is hidden from assistive technology.
    pub fn is_aria_hidden(&self) -> bool {
        true
    }

    /// Paints the overlay. `visibility` scales the completion's alpha during
    /// the accept fade; at zero the ghost text is not drawn at all.
    pub fn paint(
        &self,
        ctx: &mut RenderContext<'_>,
        typed: &CellAttributes,
        completion: &CellAttributes,
        visibility: f32,
    ) {
        let fallback_fg = ctx.palette().foreground;
        let mut ghost = completion.clone();
        if visibility < 1.0 {
            let fg = ghost.foreground.unwrap_or(fallback_fg);
            ghost.foreground = Some(fg.with_opacity(visibility));
        }

        let typed_bg = typed.background;
        ctx.draw_glyphs(self.area, &self.layout, self.scroll, |glyph| match glyph.segment {
            Segment::Typed => typed_bg.map(|bg| CellAttributes {
                background: Some(bg),
                ..CellAttributes::default()
            }),
            Segment::Completion if visibility > 0.0 => Some(ghost.clone()),
            Segment::Completion => None,
        });
    }
}
