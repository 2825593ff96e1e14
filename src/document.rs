/// Text buffer standing in for the embedded code editor widget: owned
/// text plus a char-indexed cursor and optional selection. All indices
/// are char offsets, not bytes, so multi-byte input behaves like it does
/// in the real editor.
#[derive(Debug, Clone, Default)]
pub struct Document {
    text: String,
    cursor: usize,
    selection: Option<(usize, usize)>,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            cursor: 0,
            selection: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = 0;
        self.selection = None;
    }

    pub fn len_chars(&self) -> usize {
        self.text.chars().count()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, at: usize) {
        self.cursor = at.min(self.len_chars());
    }

    /// Selects `[start, end)`; reversed ranges are normalized. The
    /// cursor moves to the selection start.
    pub fn select(&mut self, start: usize, end: usize) {
        let max = self.len_chars();
        let (start, end) = if start <= end {
            (start.min(max), end.min(max))
        } else {
            (end.min(max), start.min(max))
        };
        if start == end {
            self.selection = None;
        } else {
            self.selection = Some((start, end));
        }
        self.cursor = start;
    }

    pub fn selection(&self) -> Option<(usize, usize)> {
        self.selection
    }

    pub fn selected_text(&self) -> Option<&str> {
        let (start, end) = self.selection?;
        Some(&self.text[self.byte_index(start)..self.byte_index(end)])
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Removes the selected range from the buffer and returns its anchor
    /// and text; the cursor lands on the anchor. Returns `None` when
    /// nothing is selected.
    pub fn take_selection(&mut self) -> Option<(usize, String)> {
        let (start, end) = self.selection.take()?;
        let (b0, b1) = (self.byte_index(start), self.byte_index(end));
        let removed = self.text[b0..b1].to_string();
        self.text.replace_range(b0..b1, "");
        self.cursor = start;
        Some((start, removed))
    }

    /// Inserts at the cursor and advances it past the inserted text.
    pub fn insert(&mut self, s: &str) {
        let at = self.cursor;
        self.splice(at, s);
    }

    /// Inserts `s` at char offset `at`; the cursor ends up just after
    /// the inserted text.
    pub fn splice(&mut self, at: usize, s: &str) {
        let at = at.min(self.len_chars());
        let byte_at = self.byte_index(at);
        self.text.insert_str(byte_at, s);
        self.cursor = at + s.chars().count();
        self.selection = None;
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_selection_removes_range() {
        let mut doc = Document::new("hello world");
        doc.select(6, 11);
        let (anchor, removed) = doc.take_selection().expect("selection");
        assert_eq!(anchor, 6);
        assert_eq!(removed, "world");
        assert_eq!(doc.text(), "hello ");
        assert_eq!(doc.cursor(), 6);
    }

    #[test]
    fn test_insert_advances_cursor() {
        let mut doc = Document::new("ab");
        doc.set_cursor(1);
        doc.insert("xy");
        assert_eq!(doc.text(), "axyb");
        assert_eq!(doc.cursor(), 3);
    }

    #[test]
    fn test_splice_multibyte() {
        let mut doc = Document::new("čćž");
        doc.splice(1, "đš");
        assert_eq!(doc.text(), "čđšćž");
        assert_eq!(doc.cursor(), 3);
    }

    #[test]
    fn test_reversed_selection_normalized() {
        let mut doc = Document::new("abcdef");
        doc.select(4, 1);
        assert_eq!(doc.selection(), Some((1, 4)));
        assert_eq!(doc.selected_text(), Some("bcd"));
        assert_eq!(doc.cursor(), 1);
    }

    #[test]
    fn test_empty_selection_is_none() {
        let mut doc = Document::new("abc");
        doc.select(2, 2);
        assert!(doc.selection().is_none());
    }
}
