//! Rope backed multi-line text area: the live, editable half of the widget.
//!
//! The area is controlled. Edits are applied locally so the caret stays put,
//! and the proposed value is handed back to the caller, who echoes it (or
//! something else) through [`TextAreaState::sync_value`].

use ropey::Rope;
use tracing::trace;

use crate::buffer::{CellAttributes, CursorShape};
use crate::event::{Key, KeyCode};
use crate::geometry::Rect;
use crate::render::RenderContext;
use crate::scroll::{self, ScrollDelta, ScrollOffset};
use crate::style::{Typography, WrapMode};
use crate::text_layout::{Caret, TextLayout};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextAreaMsg {
    Insert(String),
    DeleteBackward,
    DeleteForward,
    DeleteWordBackward,
    DeleteToLineStart,
    Move(Motion),
    /// Click at a screen cell.
    PlaceCaret { x: usize, y: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
    DocumentStart,
    DocumentEnd,
    WordLeft,
    WordRight,
    PageUp,
    PageDown,
}

/// Which edits the area accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EditPolicy {
    pub editable: bool,
    /// Maximum length in chars. Inserts are truncated to fit.
    pub max_length: Option<usize>,
}

impl Default for EditPolicy {
    fn default() -> Self {
        Self {
            editable: true,
            max_length: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TextAreaState {
    rope: Rope,
    cursor: usize,
    preferred_column: Option<usize>,
    scroll: ScrollOffset,
    reveal_cursor: bool,
    focused: bool,
    area: Rect,
    typography: Typography,
    layout: TextLayout,
}

impl Default for TextAreaState {
    fn default() -> Self {
        Self::new("")
    }
}

impl TextAreaState {
    pub fn new(value: &str) -> Self {
        let typography = Typography::default();
        let rope = Rope::from_str(value);
        let cursor = rope.len_chars();
        Self {
            layout: layout_for(value, typography, 0),
            rope,
            cursor,
            preferred_column: None,
            scroll: ScrollOffset::ZERO,
            reveal_cursor: true,
            focused: false,
            area: Rect::default(),
            typography,
        }
    }

    pub fn value(&self) -> String {
        self.rope.to_string()
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn scroll(&self) -> ScrollOffset {
        self.scroll
    }

    pub fn layout(&self) -> &TextLayout {
        &self.layout
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        if focused {
            self.reveal_cursor = true;
        }
    }

    /// Adopts the caller's value. A value other than the one shown replaces
    /// the document and moves the caret to the end.
    pub fn sync_value(&mut self, value: &str) -> bool {
        if self.rope == value {
            return false;
        }
        trace!(len = value.len(), "text area value replaced");
        self.rope = Rope::from_str(value);
        self.cursor = self.rope.len_chars();
        self.preferred_column = None;
        self.reveal_cursor = true;
        self.relayout();
        true
    }

    pub fn move_cursor_to(&mut self, index: usize) {
        self.cursor = index.min(self.len_chars());
        self.preferred_column = None;
        self.reveal_cursor = true;
    }

    /// Applies a message. Returns the new value when the text changed.
    pub fn update(&mut self, msg: TextAreaMsg, policy: EditPolicy) -> Option<String> {
        match msg {
            TextAreaMsg::Insert(text) => self.insert(&text, policy),
            TextAreaMsg::DeleteBackward => {
                let start = self.cursor.saturating_sub(1);
                self.delete(start..self.cursor, policy)
            }
            TextAreaMsg::DeleteForward => {
                let end = (self.cursor + 1).min(self.len_chars());
                self.delete(self.cursor..end, policy)
            }
            TextAreaMsg::DeleteWordBackward => {
                let start = self.word_start_before(self.cursor);
                self.delete(start..self.cursor, policy)
            }
            TextAreaMsg::DeleteToLineStart => {
                let line = self.rope.char_to_line(self.cursor);
                let start = self.rope.line_to_char(line);
                self.delete(start..self.cursor, policy)
            }
            TextAreaMsg::Move(motion) => {
                self.apply_motion(motion);
                None
            }
            TextAreaMsg::PlaceCaret { x, y } => {
                if let Some(index) = self.index_at_screen(x, y) {
                    self.move_cursor_to(index);
                }
                None
            }
        }
    }

    fn insert(&mut self, text: &str, policy: EditPolicy) -> Option<String> {
        if !policy.editable {
            return None;
        }
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        let room = policy
            .max_length
            .map_or(usize::MAX, |max| max.saturating_sub(self.len_chars()));
        let accepted: String = normalized.chars().take(room).collect();
        if accepted.is_empty() {
            return None;
        }

        let count = accepted.chars().count();
        self.rope.insert(self.cursor, &accepted);
        self.cursor += count;
        self.edited()
    }

    fn delete(&mut self, range: std::ops::Range<usize>, policy: EditPolicy) -> Option<String> {
        if !policy.editable || range.is_empty() {
            return None;
        }
        let start = range.start;
        self.rope.remove(range);
        self.cursor = start;
        self.edited()
    }

    fn edited(&mut self) -> Option<String> {
        self.preferred_column = None;
        self.reveal_cursor = true;
        self.relayout();
        Some(self.value())
    }

    fn apply_motion(&mut self, motion: Motion) {
        let len = self.len_chars();
        let caret = self.layout.caret_at(self.cursor);
        let page = self.visible_lines().max(1);

        let (target, keep_column) = match motion {
            Motion::Left => (self.cursor.saturating_sub(1), false),
            Motion::Right => ((self.cursor + 1).min(len), false),
            Motion::Up => (self.vertical_target(caret, -1), true),
            Motion::Down => (self.vertical_target(caret, 1), true),
            Motion::PageUp => (self.vertical_target(caret, -(page as isize)), true),
            Motion::PageDown => (self.vertical_target(caret, page as isize), true),
            Motion::LineStart => (self.layout.index_at(caret.line, 0), false),
            Motion::LineEnd => (self.layout.index_at(caret.line, usize::MAX), false),
            Motion::DocumentStart => (0, false),
            Motion::DocumentEnd => (len, false),
            Motion::WordLeft => (self.word_start_before(self.cursor), false),
            Motion::WordRight => (self.next_word_boundary(self.cursor), false),
        };

        self.cursor = target.min(len);
        if !keep_column {
            self.preferred_column = None;
        }
        self.reveal_cursor = true;
    }

    fn vertical_target(&mut self, caret: Caret, lines: isize) -> usize {
        let column = *self.preferred_column.get_or_insert(caret.column);
        let last_line = self.layout.line_count() - 1;
        if lines < 0 && caret.line < lines.unsigned_abs() {
            return 0;
        }
        let target = caret.line.saturating_add_signed(lines);
        if target > last_line {
            return self.len_chars();
        }
        self.layout.index_at(target, column)
    }

    fn word_kind_at(&self, index: usize) -> Option<WordKind> {
        (index < self.len_chars()).then(|| WordKind::classify(self.rope.char(index)))
    }

    fn word_start_before(&self, index: usize) -> usize {
        let mut index = index.min(self.len_chars());
        while index > 0 && self.word_kind_at(index - 1) == Some(WordKind::Whitespace) {
            index -= 1;
        }
        if index == 0 {
            return 0;
        }

        let kind = self.word_kind_at(index - 1);
        while index > 0 && self.word_kind_at(index - 1) == kind {
            index -= 1;
        }
        index
    }

    fn next_word_boundary(&self, index: usize) -> usize {
        let len = self.len_chars();
        let mut index = index.min(len);
        while index < len && self.word_kind_at(index) == Some(WordKind::Whitespace) {
            index += 1;
        }
        let kind = self.word_kind_at(index);
        while index < len && self.word_kind_at(index) == kind {
            index += 1;
        }
        index
    }

    /// Lays the text out for the input box `area`.
    pub fn layout_text(&mut self, area: Rect, typography: Typography) {
        if self.area.width != area.width || self.typography != typography {
            self.reveal_cursor = true;
        }
        self.area = area;
        self.typography = typography;
        self.relayout();
    }

    fn relayout(&mut self) {
        let width = self.area.width.saturating_sub(self.typography.padding.horizontal());
        self.layout = layout_for(&self.value(), self.typography, width);
    }

    /// Brings the caret into view if it moved, then clamps the scroll to the
    /// new content size.
    pub fn after_layout(&mut self) {
        if std::mem::take(&mut self.reveal_cursor) {
            let caret = self.layout.caret_at(self.cursor);
            let padding = self.typography.padding;
            let line_height = usize::from(self.typography.line_height);
            let top = usize::from(padding.top) + caret.line * line_height;
            let left = usize::from(padding.left) + caret.column;
            self.scroll.y = scroll::reveal(self.scroll.y, self.area.height, top, line_height);
            self.scroll.x = scroll::reveal(self.scroll.x, self.area.width, left, 1);
        }
        self.scroll = self.scroll.clamp(self.max_scroll());
    }

    pub fn max_scroll(&self) -> ScrollOffset {
        let (content_width, content_height) = self.layout.content_size();
        let padding = self.typography.padding;
        let x = match self.typography.wrap {
            WrapMode::None => {
                scroll::max_offset(content_width + padding.horizontal(), self.area.width)
            }
            WrapMode::Word | WrapMode::Char => 0,
        };
        ScrollOffset::new(
            scroll::max_offset(content_height + padding.vertical(), self.area.height),
            x,
        )
    }

    /// Where `delta` would take the scroll position.
    pub fn scroll_target(&self, delta: ScrollDelta) -> ScrollOffset {
        self.scroll.offset_by(delta, self.max_scroll())
    }

    pub fn scroll_to(&mut self, offset: ScrollOffset) -> bool {
        let next = offset.clamp(self.max_scroll());
        let changed = next != self.scroll;
        self.scroll = next;
        changed
    }

    pub fn scroll_by(&mut self, delta: ScrollDelta) -> bool {
        if delta.is_zero() {
            return false;
        }
        self.scroll_to(self.scroll_target(delta))
    }

    fn visible_lines(&self) -> usize {
        let text_rows = self.area.height.saturating_sub(self.typography.padding.vertical());
        text_rows / usize::from(self.typography.line_height.max(1))
    }

    /// Screen cell of the caret, if it is scrolled into view.
    pub fn caret_screen_position(&self) -> Option<(usize, usize)> {
        let caret = self.layout.caret_at(self.cursor);
        let padding = self.typography.padding;
        let x = (self.area.x + usize::from(padding.left) + caret.column).checked_sub(self.scroll.x)?;
        let y = (self.area.y + usize::from(padding.top) + self.layout.row_of_line(caret.line))
            .checked_sub(self.scroll.y)?;
        (x >= self.area.x && x < self.area.right() && y >= self.area.y && y < self.area.bottom())
            .then_some((x, y))
    }

    fn index_at_screen(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.area.x || x >= self.area.right() || y < self.area.y || y >= self.area.bottom() {
            return None;
        }
        let padding = self.typography.padding;
        let column = (x - self.area.x + self.scroll.x).saturating_sub(usize::from(padding.left));
        let row = (y - self.area.y + self.scroll.y).saturating_sub(usize::from(padding.top));
        let line = row / usize::from(self.typography.line_height.max(1));
        Some(self.layout.index_at(line, column))
    }

    /// Paints the text and, while focused, places the terminal cursor.
    pub fn paint(&self, ctx: &mut RenderContext<'_>, attrs: &CellAttributes) {
        ctx.draw_glyphs(self.area, &self.layout, self.scroll, |_| Some(attrs.clone()));
        if self.focused
            && let Some((x, y)) = self.caret_screen_position()
        {
            ctx.set_cursor(x, y, CursorShape::BlinkingBar);
        }
    }
}

/// Lays out `text` for a text width of `width`. Without any width (before the
/// first render) lines are left unwrapped.
fn layout_for(text: &str, typography: Typography, width: usize) -> TextLayout {
    if width == 0 {
        let unwrapped = Typography {
            wrap: WrapMode::None,
            ..typography
        };
        return TextLayout::new(text, unwrapped, width);
    }
    TextLayout::new(text, typography, width)
}

/// Classification of characters for word boundary detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WordKind {
    Whitespace,
    Alphanumeric,
    Other,
}

impl WordKind {
    fn classify(ch: char) -> Self {
        if ch.is_whitespace() {
            Self::Whitespace
        } else if ch.is_alphanumeric() || ch == '_' {
            Self::Alphanumeric
        } else {
            Self::Other
        }
    }
}

/// Editing keys. The accept key is handled by the widget before this runs.
pub fn default_keybindings(key: Key) -> Option<TextAreaMsg> {
    let msg = match key.code {
        KeyCode::Char(ch) if !key.ctrl && !key.alt => TextAreaMsg::Insert(ch.to_string()),
        KeyCode::Char('a') if key.ctrl => TextAreaMsg::Move(Motion::LineStart),
        KeyCode::Char('e') if key.ctrl => TextAreaMsg::Move(Motion::LineEnd),
        KeyCode::Char('h') if key.ctrl => TextAreaMsg::DeleteBackward,
        KeyCode::Char('w') if key.ctrl => TextAreaMsg::DeleteWordBackward,
        KeyCode::Char('u') if key.ctrl => TextAreaMsg::DeleteToLineStart,
        KeyCode::Backspace if key.ctrl || key.alt => TextAreaMsg::DeleteWordBackward,
        KeyCode::Backspace => TextAreaMsg::DeleteBackward,
        KeyCode::Delete => TextAreaMsg::DeleteForward,
        KeyCode::Enter if !key.ctrl && !key.alt => TextAreaMsg::Insert("\n".to_owned()),
        KeyCode::Left if key.ctrl || key.alt => TextAreaMsg::Move(Motion::WordLeft),
        KeyCode::Right if key.ctrl || key.alt => TextAreaMsg::Move(Motion::WordRight),
        KeyCode::Left => TextAreaMsg::Move(Motion::Left),
        KeyCode::Right => TextAreaMsg::Move(Motion::Right),
        KeyCode::Up => TextAreaMsg::Move(Motion::Up),
        KeyCode::Down => TextAreaMsg::Move(Motion::Down),
        KeyCode::Home if key.ctrl => TextAreaMsg::Move(Motion::DocumentStart),
        KeyCode::End if key.ctrl => TextAreaMsg::Move(Motion::DocumentEnd),
        KeyCode::Home => TextAreaMsg::Move(Motion::LineStart),
        KeyCode::End => TextAreaMsg::Move(Motion::LineEnd),
        KeyCode::PageUp => TextAreaMsg::Move(Motion::PageUp),
        KeyCode::PageDown => TextAreaMsg::Move(Motion::PageDown),
        KeyCode::Char(_) | KeyCode::Enter | KeyCode::Esc | KeyCode::Tab => return None,
    };
    Some(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Edges;

    fn laid_out(value: &str, area: Rect) -> TextAreaState {
        let mut state = TextAreaState::new(value);
        state.layout_text(area, Typography::default());
        state.after_layout();
        state
    }

    #[test]
    fn insert_and_delete_text() {
        let mut state = laid_out("", Rect::new(0, 0, 20, 3));

        assert_eq!(
            state.update(TextAreaMsg::Insert("abc".into()), EditPolicy::default()),
            Some("abc".to_owned())
        );
        state.update(TextAreaMsg::Move(Motion::Left), EditPolicy::default());
        assert_eq!(
            state.update(TextAreaMsg::DeleteBackward, EditPolicy::default()),
            Some("ac".to_owned())
        );
        assert_eq!(state.cursor(), 1);
    }

    #[test]
    fn read_only_rejects_edits_but_moves() {
        let mut state = laid_out("abc", Rect::new(0, 0, 20, 3));
        let policy = EditPolicy {
            editable: false,
            max_length: None,
        };

        assert_eq!(state.update(TextAreaMsg::Insert("x".into()), policy), None);
        assert_eq!(state.update(TextAreaMsg::DeleteBackward, policy), None);
        state.update(TextAreaMsg::Move(Motion::DocumentStart), policy);

        assert_eq!(state.value(), "abc");
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn max_length_truncates_inserts() {
        let mut state = laid_out("ab", Rect::new(0, 0, 20, 3));
        let policy = EditPolicy {
            editable: true,
            max_length: Some(4),
        };

        assert_eq!(
            state.update(TextAreaMsg::Insert("cdef".into()), policy),
            Some("abcd".to_owned())
        );
        assert_eq!(state.update(TextAreaMsg::Insert("g".into()), policy), None);
    }

    #[test]
    fn pasted_carriage_returns_become_newlines() {
        let mut state = laid_out("", Rect::new(0, 0, 20, 3));

        state.update(TextAreaMsg::Insert("a\r\nb\rc".into()), EditPolicy::default());

        assert_eq!(state.value(), "a\nb\nc");
    }

    #[test]
    fn echoed_value_keeps_the_caret() {
        let mut state = laid_out("hello", Rect::new(0, 0, 20, 3));
        state.update(TextAreaMsg::Move(Motion::DocumentStart), EditPolicy::default());
        let proposed = state
            .update(TextAreaMsg::Insert("x".into()), EditPolicy::default())
            .expect("insert should change the value");

        assert!(!state.sync_value(&proposed));
        assert_eq!(state.cursor(), 1);

        assert!(state.sync_value("something else"));
        assert_eq!(state.cursor(), "something else".len());
    }

    #[test]
    fn word_motions_skip_whitespace() {
        let mut state = laid_out("foo bar_baz, qux", Rect::new(0, 0, 40, 3));

        state.update(TextAreaMsg::Move(Motion::WordLeft), EditPolicy::default());
        assert_eq!(state.cursor(), 13);
        state.update(TextAreaMsg::Move(Motion::WordLeft), EditPolicy::default());
        assert_eq!(state.cursor(), 11);
        state.update(TextAreaMsg::Move(Motion::WordLeft), EditPolicy::default());
        assert_eq!(state.cursor(), 4);

        state.update(TextAreaMsg::Move(Motion::WordRight), EditPolicy::default());
        assert_eq!(state.cursor(), 11);
    }

    #[test]
    fn delete_word_backward_removes_previous_word() {
        let mut state = laid_out("hello there  ", Rect::new(0, 0, 40, 3));

        let value = state.update(TextAreaMsg::DeleteWordBackward, EditPolicy::default());

        assert_eq!(value.as_deref(), Some("hello "));
    }

    #[test]
    fn vertical_motion_keeps_preferred_column() {
        let mut state = laid_out("abcdef\nx\nabcdef", Rect::new(0, 0, 20, 5));
        state.move_cursor_to(5);

        state.update(TextAreaMsg::Move(Motion::Down), EditPolicy::default());
        assert_eq!(state.cursor(), 8);
        state.update(TextAreaMsg::Move(Motion::Down), EditPolicy::default());
        assert_eq!(state.cursor(), 14);
        state.update(TextAreaMsg::Move(Motion::Down), EditPolicy::default());
        assert_eq!(state.cursor(), 15);
    }

    #[test]
    fn caret_is_revealed_by_scrolling() {
        let text = (0..10).map(|n| n.to_string()).collect::<Vec<_>>().join("\n");
        let state = laid_out(&text, Rect::new(0, 0, 10, 3));

        assert_eq!(state.scroll(), ScrollOffset::new(7, 0));
        assert_eq!(state.caret_screen_position(), Some((1, 2)));
    }

    #[test]
    fn scroll_is_clamped_to_content() {
        let text = "a\nb\nc\nd\ne";
        let mut state = laid_out(text, Rect::new(0, 0, 10, 3));

        assert_eq!(state.max_scroll(), ScrollOffset::new(2, 0));
        assert!(state.scroll_to(ScrollOffset::new(0, 0)));
        assert!(!state.scroll_by(ScrollDelta::new(-3, 0)));
        state.scroll_by(ScrollDelta::new(10, 4));
        assert_eq!(state.scroll(), ScrollOffset::new(2, 0));
        assert!(!state.scroll_by(ScrollDelta::new(0, 0)));
    }

    #[test]
    fn padding_scrolls_with_the_content() {
        let mut state = TextAreaState::new("a\nb\nc");
        let typography = Typography {
            padding: Edges::symmetric(1, 1),
            ..Typography::default()
        };
        state.layout_text(Rect::new(0, 0, 10, 3), typography);
        state.after_layout();

        assert_eq!(state.max_scroll(), ScrollOffset::new(2, 0));
        assert_eq!(state.scroll(), ScrollOffset::new(1, 0));
        assert_eq!(state.caret_screen_position(), Some((2, 2)));
    }

    #[test]
    fn click_places_the_caret() {
        let mut state = laid_out("hello\nworld", Rect::new(2, 1, 10, 3));

        state.update(TextAreaMsg::PlaceCaret { x: 4, y: 2 }, EditPolicy::default());
        assert_eq!(state.cursor(), 8);

        state.update(TextAreaMsg::PlaceCaret { x: 30, y: 2 }, EditPolicy::default());
        assert_eq!(state.cursor(), 8);
    }

    #[test]
    fn tab_is_left_to_the_widget() {
        assert_eq!(default_keybindings(Key::new(KeyCode::Tab)), None);
        assert_eq!(
            default_keybindings(Key::new(KeyCode::Enter)),
            Some(TextAreaMsg::Insert("\n".to_owned()))
        );
    }
}
