use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// A single-line text field with a grapheme-aware cursor.
///
/// `cursor` is a byte offset that always sits on a grapheme boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    /// A field holding `value` with the cursor at the end
    pub fn with_value(value: &str) -> Self {
        TextInput {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn insert(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Delete the grapheme before the cursor
    pub fn backspace(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.value.replace_range(prev..self.cursor, "");
            self.cursor = prev;
        }
    }

    /// Delete the grapheme under the cursor
    pub fn delete(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.value.replace_range(self.cursor..next, "");
        }
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.cursor = next;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.len();
    }

    /// Delete from the start of the line to the cursor (Ctrl-U)
    pub fn delete_to_start(&mut self) {
        self.value.replace_range(..self.cursor, "");
        self.cursor = 0;
    }

    /// Terminal column of the cursor
    pub fn cursor_col(&self) -> usize {
        UnicodeWidthStr::width(&self.value[..self.cursor])
    }

    fn next_boundary(&self) -> Option<usize> {
        if self.cursor >= self.value.len() {
            return None;
        }
        let rest = &self.value[self.cursor..];
        Some(
            rest.grapheme_indices(true)
                .nth(1)
                .map_or(self.value.len(), |(i, _)| self.cursor + i),
        )
    }

    fn prev_boundary(&self) -> Option<usize> {
        if self.cursor == 0 {
            return None;
        }
        self.value[..self.cursor]
            .grapheme_indices(true)
            .next_back()
            .map(|(i, _)| i)
    }
}
