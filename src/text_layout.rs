//! Glyph placement shared by the live input and the completion overlay.
//!
//! Text is laid out segment by segment and a segment never moves glyphs of an
//! earlier one, so the typed prefix lands on identical cells whether or not a
//! completion follows it.

use unicode_width::UnicodeWidthChar;

use crate::style::{Typography, WrapMode};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment {
    Typed,
    Completion,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    /// Char index within the laid out text.
    pub index: usize,
    pub segment: Segment,
    /// Visual line, counting soft wraps.
    pub line: usize,
    pub column: usize,
    /// Columns painted. Zero for newlines and zero-width characters.
    pub width: usize,
}

/// Position between glyphs, where a caret is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Caret {
    pub line: usize,
    pub column: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextLayout {
    glyphs: Vec<Glyph>,
    end: Caret,
    widest: usize,
    wrap_width: Option<usize>,
    typography: Typography,
}

impl TextLayout {
    /// Lays out a single typed segment.
    pub fn new(text: &str, typography: Typography, width: usize) -> Self {
        let mut layouter = Layouter::new(typography, width);
        layouter.push(text, Segment::Typed);
        layouter.finish()
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn typography(&self) -> Typography {
        self.typography
    }

    /// Caret after the last glyph.
    pub fn end(&self) -> Caret {
        self.end
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.end.line + 1
    }

    /// Content extent in cells, padding excluded. The width leaves room for
    /// a caret after the widest line.
    pub fn content_size(&self) -> (usize, usize) {
        let line_height = usize::from(self.typography.line_height);
        (self.widest + 1, self.line_count() * line_height)
    }

    /// Row of the line box a visual line is drawn in, centred like half-leading.
    pub fn row_of_line(&self, line: usize) -> usize {
        let line_height = usize::from(self.typography.line_height);
        line * line_height + (line_height - 1) / 2
    }

    pub fn caret_at(&self, index: usize) -> Caret {
        match self.glyphs.get(index) {
            Some(glyph) => {
                let column = match self.wrap_width {
                    Some(limit) => glyph.column.min(limit.saturating_sub(1)),
                    None => glyph.column,
                };
                Caret {
                    line: glyph.line,
                    column,
                }
            }
            None => self.end,
        }
    }

    /// Char index nearest to a visual position.
    pub fn index_at(&self, line: usize, column: usize) -> usize {
        let mut last_on_line: Option<&Glyph> = None;
        for glyph in &self.glyphs {
            if glyph.line < line {
                continue;
            }
            if glyph.line > line {
                return last_on_line.map_or(glyph.index, line_end_index);
            }
            if glyph.ch != '\n' && column < glyph.column + glyph.width.max(1) {
                return glyph.index;
            }
            last_on_line = Some(glyph);
        }
        last_on_line.map_or(self.glyphs.len(), line_end_index)
    }

    /// Concatenated text of one segment.
    pub fn segment_text(&self, segment: Segment) -> String {
        self.glyphs
            .iter()
            .filter(|glyph| glyph.segment == segment)
            .map(|glyph| glyph.ch)
            .collect()
    }

    pub fn text(&self) -> String {
        self.glyphs.iter().map(|glyph| glyph.ch).collect()
    }
}

fn line_end_index(glyph: &Glyph) -> usize {
    if glyph.ch == '\n' {
        glyph.index
    } else {
        glyph.index + 1
    }
}

/// Incremental layouter. Each [`Layouter::push`] continues from where the
/// previous segment ended.
pub struct Layouter {
    typography: Typography,
    wrap_width: Option<usize>,
    glyphs: Vec<Glyph>,
    line: usize,
    column: usize,
    widest: usize,
    after_whitespace: bool,
}

impl Layouter {
    /// `width` is the text width available inside the padding.
    pub fn new(typography: Typography, width: usize) -> Self {
        let wrap_width = match typography.wrap {
            WrapMode::None => None,
            WrapMode::Word | WrapMode::Char => Some(width.max(1)),
        };
        Self {
            typography,
            wrap_width,
            glyphs: Vec::new(),
            line: 0,
            column: 0,
            widest: 0,
            after_whitespace: true,
        }
    }

    pub fn push(&mut self, text: &str, segment: Segment) {
        let chars: Vec<char> = text.chars().collect();
        for (position, &ch) in chars.iter().enumerate() {
            if ch == '\n' {
                self.overflow_to_next_line();
                self.record(ch, 0, segment);
                self.next_line();
                self.after_whitespace = true;
                continue;
            }

            if self.after_whitespace && !ch.is_whitespace() {
                self.wrap_word(&chars[position..]);
            }

            let mut width = self.glyph_width(ch);
            if let Some(limit) = self.wrap_width
                && width > 0
                && self.column > 0
                && self.column + width > limit
            {
                self.next_line();
                width = self.glyph_width(ch);
            }

            self.record(ch, width, segment);
            self.column += width + self.spacing_after(ch);
            self.widest = self.widest.max(self.column);
            self.after_whitespace = ch.is_whitespace();
        }
    }

    pub fn finish(mut self) -> TextLayout {
        self.overflow_to_next_line();
        TextLayout {
            end: Caret {
                line: self.line,
                column: self.column,
            },
            glyphs: self.glyphs,
            widest: self.widest,
            wrap_width: self.wrap_width,
            typography: self.typography,
        }
    }

    /// Moves a word that would straddle the right edge onto a fresh line.
    fn wrap_word(&mut self, rest: &[char]) {
        if self.typography.wrap != WrapMode::Word || self.column == 0 {
            return;
        }
        let Some(limit) = self.wrap_width else {
            return;
        };
        let word: Vec<char> = rest
            .iter()
            .copied()
            .take_while(|ch| !ch.is_whitespace())
            .collect();
        let letter_spacing = usize::from(self.typography.letter_spacing);
        let glyphs: usize = word.iter().map(|ch| char_width(*ch)).sum();
        let extent = glyphs + letter_spacing * word.len().saturating_sub(1);
        if extent <= limit && self.column + extent > limit {
            self.next_line();
        }
    }

    fn overflow_to_next_line(&mut self) {
        if let Some(limit) = self.wrap_width
            && self.column >= limit
        {
            self.next_line();
        }
    }

    fn next_line(&mut self) {
        self.line += 1;
        self.column = 0;
    }

    fn record(&mut self, ch: char, width: usize, segment: Segment) {
        self.glyphs.push(Glyph {
            ch,
            index: self.glyphs.len(),
            segment,
            line: self.line,
            column: self.column,
            width,
        });
    }

    fn glyph_width(&self, ch: char) -> usize {
        if ch == '\t' {
            let tab = usize::from(self.typography.tab_width);
            tab - self.column % tab
        } else {
            char_width(ch)
        }
    }

    fn spacing_after(&self, ch: char) -> usize {
        let mut spacing = usize::from(self.typography.letter_spacing);
        if ch == ' ' {
            spacing += usize::from(self.typography.word_spacing);
        }
        spacing
    }
}

pub fn char_width(ch: char) -> usize {
    if ch.is_control() {
        0
    } else {
        ch.width().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn typography(wrap: WrapMode) -> Typography {
        Typography {
            wrap,
            ..Typography::default()
        }
    }

    fn positions(layout: &TextLayout) -> Vec<(char, usize, usize)> {
        layout
            .glyphs()
            .iter()
            .map(|glyph| (glyph.ch, glyph.line, glyph.column))
            .collect()
    }

    #[test]
    fn word_wrap_moves_whole_words() {
        let layout = TextLayout::new("hello big world", typography(WrapMode::Word), 10);

        let second_line: String = layout
            .glyphs()
            .iter()
            .filter(|glyph| glyph.line == 1)
            .map(|glyph| glyph.ch)
            .collect();
        assert_eq!(second_line, "world");
        assert_eq!(layout.line_count(), 2);
    }

    #[test]
    fn overlong_words_break_between_characters() {
        let layout = TextLayout::new("abcdefgh", typography(WrapMode::Word), 3);

        assert_eq!(layout.line_count(), 3);
        assert_eq!(layout.caret_at(3), Caret { line: 1, column: 0 });
    }

    #[test]
    fn no_wrap_only_breaks_on_newlines() {
        let layout = TextLayout::new("abcdefgh\nij", typography(WrapMode::None), 3);

        assert_eq!(layout.line_count(), 2);
        assert_eq!(layout.end(), Caret { line: 1, column: 2 });
        assert_eq!(layout.content_size(), (9, 2));
    }

    #[test]
    fn text_filling_the_line_puts_the_caret_on_the_next_line() {
        let layout = TextLayout::new("abcd", typography(WrapMode::Char), 4);

        assert_eq!(layout.end(), Caret { line: 1, column: 0 });
    }

    #[test]
    fn tabs_expand_to_tab_stops() {
        let typography = Typography {
            tab_width: 4,
            wrap: WrapMode::None,
            ..Typography::default()
        };
        let layout = TextLayout::new("a\tb", typography, 20);

        assert_eq!(layout.glyphs()[1].width, 3);
        assert_eq!(layout.glyphs()[2].column, 4);
    }

    #[test]
    fn letter_and_word_spacing_widen_advances() {
        let typography = Typography {
            letter_spacing: 1,
            word_spacing: 2,
            wrap: WrapMode::None,
            ..Typography::default()
        };
        let layout = TextLayout::new("a b", typography, 40);

        assert_eq!(positions(&layout), vec![('a', 0, 0), (' ', 0, 2), ('b', 0, 6)]);
    }

    #[test]
    fn wide_characters_take_two_columns() {
        let layout = TextLayout::new("日本", typography(WrapMode::Char), 3);

        assert_eq!(positions(&layout), vec![('日', 0, 0), ('本', 1, 0)]);
    }

    #[test]
    fn line_height_spreads_rows() {
        let typography = Typography {
            line_height: 3,
            ..Typography::default()
        };
        let layout = TextLayout::new("a\nb", typography, 10);

        assert_eq!(layout.row_of_line(1), 4);
        assert_eq!(layout.content_size().1, 6);
    }

    #[test]
    fn completion_continues_from_the_typed_caret() {
        let mut layouter = Layouter::new(typography(WrapMode::Word), 20);
        layouter.push("Hello", Segment::Typed);
        layouter.push(" there!", Segment::Completion);
        let layout = layouter.finish();

        let first_completion = layout
            .glyphs()
            .iter()
            .find(|glyph| glyph.segment == Segment::Completion)
            .unwrap();
        assert_eq!((first_completion.line, first_completion.column), (0, 5));
        assert_eq!(layout.segment_text(Segment::Completion), " there!");
    }

    #[test]
    fn completion_never_pulls_a_typed_word_to_the_next_line() {
        let mut layouter = Layouter::new(typography(WrapMode::Word), 6);
        layouter.push("ab hel", Segment::Typed);
        layouter.push("lo", Segment::Completion);
        let layout = layouter.finish();

        let typed = TextLayout::new("ab hel", typography(WrapMode::Word), 6);
        assert_eq!(&positions(&layout)[..6], positions(&typed).as_slice());
    }

    #[test]
    fn index_at_maps_positions_back_to_chars() {
        let layout = TextLayout::new("ab\ncdef", typography(WrapMode::Word), 10);

        assert_eq!(layout.index_at(0, 1), 1);
        assert_eq!(layout.index_at(0, 9), 2);
        assert_eq!(layout.index_at(1, 2), 5);
        assert_eq!(layout.index_at(1, 9), 7);
        assert_eq!(layout.index_at(5, 0), 7);
    }

    proptest! {
        #[test]
        fn typed_prefix_lands_on_the_same_cells(
            typed in "[a-z \n]{0,40}",
            completion in "[a-z \n]{0,40}",
            width in 1usize..16,
            wrap in prop_oneof![Just(WrapMode::Word), Just(WrapMode::Char), Just(WrapMode::None)],
        ) {
            let typography = typography(wrap);
            let alone = TextLayout::new(&typed, typography, width);

            let mut layouter = Layouter::new(typography, width);
            layouter.push(&typed, Segment::Typed);
            layouter.push(&completion, Segment::Completion);
            let combined = layouter.finish();

            let prefix = &combined.glyphs()[..alone.len()];
            prop_assert_eq!(prefix, alone.glyphs());
            prop_assert_eq!(combined.text(), format!("{typed}{completion}"));
            // Word wrapping may legitimately push a whole completion word down.
            if wrap != WrapMode::Word
                && let Some(first) = combined.glyphs().get(alone.len())
                && first.width > 0
            {
                prop_assert_eq!(
                    Caret { line: first.line, column: first.column },
                    alone.end()
                );
            }
        }
    }
}
