use std::fmt::Write as _;

use unicode_width::UnicodeWidthChar;

use crate::error::ProgramError;
use crate::palette::Rgba;

pub use crate::geometry::Rect;

/// Cell attributes for styling terminal cells
#[derive(Clone, Debug, PartialEq, Default)]
pub struct CellAttributes {
    pub foreground: Option<Rgba>,
    pub background: Option<Rgba>,
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
}

impl CellAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn foreground(&self) -> Option<Rgba> {
        self.foreground
    }

    pub fn background(&self) -> Option<Rgba> {
        self.background
    }

    pub fn set_foreground(&mut self, color: Rgba) {
        self.foreground = Some(color);
    }

    pub fn set_background(&mut self, color: Rgba) {
        self.background = Some(color);
    }

    fn is_plain(&self) -> bool {
        !(self.bold
            || self.dim
            || self.italic
            || self.underline
            || self.foreground.is_some()
            || self.background.is_some())
    }
}

/// A cell in the buffer. Wide glyphs occupy their own cell plus continuation
/// cells with `width == 0`.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub width: u8,
    pub attrs: CellAttributes,
}

impl Cell {
    pub fn new(ch: char, attrs: CellAttributes) -> Self {
        Self { ch, width: 1, attrs }
    }

    pub fn blank() -> Self {
        Self::new(' ', CellAttributes::default())
    }

    fn continuation(attrs: CellAttributes) -> Self {
        Self {
            ch: ' ',
            width: 0,
            attrs,
        }
    }

    pub fn is_continuation(&self) -> bool {
        self.width == 0
    }
}

/// Cursor render shape options supported by the terminal
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CursorShape {
    BlinkingBlock,
    SteadyBlock,
    BlinkingUnderline,
    SteadyUnderline,
    #[default]
    BlinkingBar,
    SteadyBar,
}

impl CursorShape {
    fn parameter(self) -> u8 {
        match self {
            Self::BlinkingBlock => 1,
            Self::SteadyBlock => 2,
            Self::BlinkingUnderline => 3,
            Self::SteadyUnderline => 4,
            Self::BlinkingBar => 5,
            Self::SteadyBar => 6,
        }
    }
}

/// Cursor state tracked by the double buffer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CursorState {
    #[default]
    Hidden,
    Position {
        x: usize,
        y: usize,
        shape: CursorShape,
    },
}

/// Double-buffered in-memory grid that renders diffs to the terminal
pub struct DoubleBuffer {
    width: usize,
    height: usize,
    /// What was last flushed to the terminal
    front: Vec<Vec<Cell>>,
    /// The terminal state is unknown; the next flush repaints everything
    front_invalid: bool,
    /// What the current frame renders into
    back: Vec<Vec<Cell>>,
    front_cursor: CursorState,
    back_cursor: CursorState,
    /// Color translucent foregrounds blend against when a cell has no background
    base_background: Rgba,
}

impl DoubleBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let blank_row = vec![Cell::blank(); width];
        Self {
            width,
            height,
            front: vec![blank_row.clone(); height],
            front_invalid: true,
            back: vec![blank_row; height],
            front_cursor: CursorState::default(),
            back_cursor: CursorState::default(),
            base_background: Rgba::opaque(0, 0, 0),
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn set_base_background(&mut self, color: Rgba) {
        self.base_background = color;
    }

    /// Resize the buffer, clearing both grids and forcing a full repaint
    pub fn resize(&mut self, width: usize, height: usize) {
        if self.width == width && self.height == height {
            return;
        }

        self.width = width;
        self.height = height;

        let blank_row = vec![Cell::blank(); width];
        self.front = vec![blank_row.clone(); height];
        self.back = vec![blank_row; height];
        self.front_invalid = true;
        self.front_cursor = CursorState::Hidden;
        self.back_cursor = CursorState::Hidden;
    }

    /// Clear the back buffer and the pending cursor
    pub fn clear(&mut self) {
        for row in &mut self.back {
            row.fill(Cell::blank());
        }
        self.back_cursor = CursorState::Hidden;
    }

    /// Write text starting at the given position, clipped at the right edge.
    /// Returns the number of columns consumed.
    pub fn write_text(&mut self, x: usize, y: usize, text: &str, attrs: &CellAttributes) -> usize {
        let mut col = x;
        for ch in text.chars() {
            if col >= self.width {
                break;
            }
            col += self.write_char(col, y, ch, attrs);
        }
        col - x
    }

    /// Write a single glyph. Translucent colors are composited over what the
    /// cell already shows. Returns the glyph's column width (0 when clipped).
    pub fn write_char(&mut self, x: usize, y: usize, ch: char, attrs: &CellAttributes) -> usize {
        if x >= self.width || y >= self.height {
            return 0;
        }
        let width = ch.width().unwrap_or(0).max(1);
        if x + width > self.width {
            return 0;
        }

        let existing = self.back[y][x].attrs.background;
        let underneath = existing.unwrap_or(self.base_background);
        let mut final_attrs = attrs.clone();
        match attrs.background {
            Some(bg) if !bg.is_opaque() => final_attrs.background = Some(bg.over(underneath)),
            Some(_) => {}
            // Glyphs without a background show whatever the cell already had.
            None => final_attrs.background = existing,
        }
        if let Some(fg) = attrs.foreground
            && !fg.is_opaque()
        {
            let backdrop = final_attrs.background.unwrap_or(underneath);
            final_attrs.foreground = Some(fg.over(backdrop));
        }

        self.back[y][x] = Cell {
            ch,
            width: width as u8,
            attrs: final_attrs.clone(),
        };
        for extra in 1..width {
            self.back[y][x + extra] = Cell::continuation(final_attrs.clone());
        }
        width
    }

    /// Replace only the background of a cell, keeping its glyph.
    pub fn set_background(&mut self, x: usize, y: usize, color: Rgba) {
        if let Some(cell) = self.back.get_mut(y).and_then(|row| row.get_mut(x)) {
            let underneath = cell.attrs.background.unwrap_or(self.base_background);
            cell.attrs.background = Some(color.over(underneath));
        }
    }

    pub fn get_cell(&self, x: usize, y: usize) -> Option<&Cell> {
        self.back.get(y).and_then(|row| row.get(x))
    }

    /// Set the desired cursor state for the next flush
    pub fn set_cursor_state(&mut self, state: CursorState) {
        self.back_cursor = match state {
            CursorState::Position { x, y, shape } => {
                if self.width == 0 || self.height == 0 {
                    CursorState::Hidden
                } else {
                    CursorState::Position {
                        x: x.min(self.width - 1),
                        y: y.min(self.height - 1),
                        shape,
                    }
                }
            }
            CursorState::Hidden => CursorState::Hidden,
        };
    }

    pub fn set_cursor(&mut self, x: usize, y: usize, shape: CursorShape) {
        self.set_cursor_state(CursorState::Position { x, y, shape });
    }

    pub fn cursor_state(&self) -> CursorState {
        self.back_cursor
    }

    /// Fill a rectangular area with the given character and attributes
    pub fn fill_rect(&mut self, rect: Rect, ch: char, attrs: &CellAttributes) {
        let end_y = rect.bottom().min(self.height);
        let end_x = rect.right().min(self.width);

        for y in rect.y..end_y {
            for x in rect.x..end_x {
                self.back[y][x] = Cell::new(ch, attrs.clone());
            }
        }
    }

    /// Write the difference between the last flushed frame and the back
    /// buffer as ANSI sequences, then swap.
    pub fn flush<W: std::io::Write>(&mut self, writer: &mut W) -> Result<(), ProgramError> {
        let mut out = String::new();
        let mut current_attrs = CellAttributes::default();
        let mut wrote_anything = false;
        let cursor_changed = self.front_invalid || self.front_cursor != self.back_cursor;

        for y in 0..self.height {
            let mut run: Option<Run> = None;

            for x in 0..self.width {
                let back_cell = &self.back[y][x];
                let unchanged = !self.front_invalid && back_cell == &self.front[y][x];

                if back_cell.is_continuation() {
                    // The terminal advances past wide glyphs on its own.
                    if unchanged && let Some(pending) = run.take() {
                        pending.write(&mut out, y, &mut current_attrs)?;
                        wrote_anything = true;
                    }
                    continue;
                }

                if unchanged {
                    if let Some(pending) = run.take() {
                        pending.write(&mut out, y, &mut current_attrs)?;
                        wrote_anything = true;
                    }
                    continue;
                }

                match run.as_mut() {
                    Some(pending) if pending.attrs == back_cell.attrs => {
                        pending.text.push(back_cell.ch);
                    }
                    _ => {
                        if let Some(pending) = run.take() {
                            pending.write(&mut out, y, &mut current_attrs)?;
                            wrote_anything = true;
                        }
                        run = Some(Run {
                            start: x,
                            text: String::from(back_cell.ch),
                            attrs: back_cell.attrs.clone(),
                        });
                    }
                }
            }

            if let Some(pending) = run.take() {
                pending.write(&mut out, y, &mut current_attrs)?;
                wrote_anything = true;
            }
        }

        if wrote_anything {
            out.push_str("\x1b[0m");
        }

        if cursor_changed || wrote_anything {
            match self.back_cursor {
                CursorState::Hidden => out.push_str("\x1b[?25l"),
                CursorState::Position { x, y, shape } => {
                    write!(out, "\x1b[{} q\x1b[{};{}H\x1b[?25h", shape.parameter(), y + 1, x + 1)?;
                }
            }
        }

        if !out.is_empty() {
            writer.write_all(out.as_bytes())?;
            writer.flush()?;
        }

        self.front.clone_from(&self.back);
        self.front_cursor = self.back_cursor;
        self.front_invalid = false;

        Ok(())
    }

    /// Convert the back buffer to a string for debugging/testing
    #[allow(clippy::inherent_to_string)]
    pub fn to_string(&self) -> String {
        self.lines().join("\n")
    }

    pub fn lines(&self) -> Vec<String> {
        self.back
            .iter()
            .map(|row| {
                row.iter()
                    .filter(|cell| !cell.is_continuation())
                    .map(|cell| cell.ch)
                    .collect()
            })
            .collect()
    }
}

struct Run {
    start: usize,
    text: String,
    attrs: CellAttributes,
}

impl Run {
    fn write(
        self,
        out: &mut String,
        y: usize,
        current: &mut CellAttributes,
    ) -> Result<(), ProgramError> {
        if *current != self.attrs {
            write_sgr(out, &self.attrs)?;
            *current = self.attrs;
        }
        write!(out, "\x1b[{};{}H{}", y + 1, self.start + 1, self.text)?;
        Ok(())
    }
}

fn write_sgr(out: &mut String, attrs: &CellAttributes) -> Result<(), ProgramError> {
    if attrs.is_plain() {
        out.push_str("\x1b[0m");
        return Ok(());
    }

    // Start from a reset so attributes of the previous run never leak.
    out.push_str("\x1b[0");
    if attrs.bold {
        out.push_str(";1");
    } else if attrs.dim {
        out.push_str(";2");
    }
    if attrs.italic {
        out.push_str(";3");
    }
    if attrs.underline {
        out.push_str(";4");
    }
    if let Some(fg) = attrs.foreground {
        write!(out, ";38;2;{};{};{}", fg.r, fg.g, fg.b)?;
    }
    if let Some(bg) = attrs.background {
        write!(out, ";48;2;{};{};{}", bg.r, bg.g, bg.b)?;
    }
    out.push('m');
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flushed(buffer: &mut DoubleBuffer) -> String {
        let mut output = Vec::new();
        buffer.flush(&mut output).expect("flush should succeed");
        String::from_utf8(output).expect("flush output should be utf-8")
    }

    #[test]
    fn new_buffer_is_blank() {
        let buffer = DoubleBuffer::new(10, 5);
        assert_eq!(buffer.dimensions(), (10, 5));

        let lines = buffer.lines();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].chars().all(|c| c == ' '));
    }

    #[test]
    fn write_text_clips_at_boundary() {
        let mut buffer = DoubleBuffer::new(5, 3);

        let written = buffer.write_text(3, 0, "testing", &CellAttributes::default());

        assert_eq!(written, 2);
        assert_eq!(buffer.lines()[0], "   te");
    }

    #[test]
    fn wide_glyph_occupies_continuation_cell() {
        let mut buffer = DoubleBuffer::new(4, 1);

        let width = buffer.write_char(0, 0, '界', &CellAttributes::default());

        assert_eq!(width, 2);
        assert!(buffer.get_cell(1, 0).unwrap().is_continuation());
        assert_eq!(buffer.lines()[0], "界  ");
    }

    #[test]
    fn wide_glyph_is_dropped_when_it_would_straddle_the_edge() {
        let mut buffer = DoubleBuffer::new(3, 1);

        assert_eq!(buffer.write_char(2, 0, '界', &CellAttributes::default()), 0);
        assert_eq!(buffer.lines()[0], "   ");
    }

    #[test]
    fn translucent_foreground_blends_with_cell_background() {
        let mut buffer = DoubleBuffer::new(4, 1);
        let mut backdrop = CellAttributes::default();
        backdrop.set_background(Rgba::opaque(0, 0, 100));
        buffer.fill_rect(Rect::new(0, 0, 4, 1), ' ', &backdrop);

        let mut ghost = backdrop.clone();
        ghost.set_foreground(Rgba::new(200, 200, 200, 128));
        buffer.write_char(1, 0, 'x', &ghost);

        let fg = buffer.get_cell(1, 0).unwrap().attrs.foreground().unwrap();
        assert_eq!(fg, Rgba::opaque(100, 100, 150));
    }

    #[test]
    fn glyph_without_background_keeps_the_cell_background() {
        let mut buffer = DoubleBuffer::new(2, 1);
        let mut backdrop = CellAttributes::default();
        backdrop.set_background(Rgba::opaque(10, 20, 30));
        buffer.fill_rect(Rect::new(0, 0, 2, 1), ' ', &backdrop);

        buffer.write_char(0, 0, 'x', &CellAttributes::default());

        let cell = buffer.get_cell(0, 0).unwrap();
        assert_eq!(cell.ch, 'x');
        assert_eq!(cell.attrs.background(), Some(Rgba::opaque(10, 20, 30)));
    }

    #[test]
    fn translucent_foreground_without_background_uses_base() {
        let mut buffer = DoubleBuffer::new(2, 1);
        buffer.set_base_background(Rgba::opaque(255, 255, 255));
        let mut attrs = CellAttributes::default();
        attrs.set_foreground(Rgba::new(0, 0, 0, 0));

        buffer.write_char(0, 0, 'x', &attrs);

        let fg = buffer.get_cell(0, 0).unwrap().attrs.foreground().unwrap();
        assert_eq!(fg, Rgba::opaque(255, 255, 255));
    }

    #[test]
    fn set_background_keeps_glyph() {
        let mut buffer = DoubleBuffer::new(3, 1);
        buffer.write_char(1, 0, 'Q', &CellAttributes::default());

        buffer.set_background(1, 0, Rgba::opaque(1, 2, 3));

        let cell = buffer.get_cell(1, 0).unwrap();
        assert_eq!(cell.ch, 'Q');
        assert_eq!(cell.attrs.background(), Some(Rgba::opaque(1, 2, 3)));
    }

    #[test]
    fn flush_generates_color_codes() {
        let mut buffer = DoubleBuffer::new(4, 1);
        let mut attrs = CellAttributes::default();
        attrs.set_foreground(Rgba::opaque(34, 34, 34));
        attrs.italic = true;
        buffer.write_text(0, 0, "ab", &attrs);

        let output = flushed(&mut buffer);

        assert!(output.contains("\x1b[0;3;38;2;34;34;34m"));
        assert!(output.contains("\x1b[1;1Hab"));
        assert!(output.ends_with("\x1b[?25l"));
    }

    #[test]
    fn flush_only_updates_changed_cells() {
        let mut buffer = DoubleBuffer::new(6, 1);
        buffer.write_text(0, 0, "hello", &CellAttributes::default());
        flushed(&mut buffer);

        buffer.write_char(4, 0, '!', &CellAttributes::default());
        let output = flushed(&mut buffer);

        assert!(output.contains("\x1b[1;5H!"));
        assert!(!output.contains("hell"));
    }

    #[test]
    fn flush_skips_unchanged_frame() {
        let mut buffer = DoubleBuffer::new(3, 1);
        buffer.write_text(0, 0, "abc", &CellAttributes::default());
        flushed(&mut buffer);

        assert_eq!(flushed(&mut buffer), "");
    }

    #[test]
    fn flush_emits_cursor_position() {
        let mut buffer = DoubleBuffer::new(5, 3);
        buffer.set_cursor(2, 1, CursorShape::SteadyBar);

        let output = flushed(&mut buffer);

        assert!(output.contains("\x1b[6 q\x1b[2;3H\x1b[?25h"));
    }

    #[test]
    fn set_cursor_clamps_to_buffer_bounds() {
        let mut buffer = DoubleBuffer::new(4, 2);

        buffer.set_cursor(10, 10, CursorShape::default());

        assert_eq!(
            buffer.cursor_state(),
            CursorState::Position {
                x: 3,
                y: 1,
                shape: CursorShape::BlinkingBar,
            }
        );
    }

    #[test]
    fn resize_forces_full_repaint() {
        let mut buffer = DoubleBuffer::new(2, 1);
        flushed(&mut buffer);

        buffer.resize(3, 1);
        let output = flushed(&mut buffer);

        assert!(output.contains("\x1b[1;1H   "));
    }
}
