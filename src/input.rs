/// Single-line text input with a character-indexed cursor.
#[derive(Debug, Default, Clone)]
pub struct InputBuffer {
    content: String,
    cursor: usize,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(value: &str) -> Self {
        let mut buffer = Self::default();
        buffer.set(value);
        buffer
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = self.cursor_byte_position();
        self.content.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn delete_back(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = self.cursor_byte_position();
            let next_byte_pos = self.content[byte_pos..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| byte_pos + i)
                .unwrap_or(self.content.len());
            self.content.drain(byte_pos..next_byte_pos);
            true
        } else {
            false
        }
    }

    pub fn delete_forward(&mut self) -> bool {
        if self.cursor < self.len() {
            let byte_pos = self.cursor_byte_position();
            let next_byte_pos = self.content[byte_pos..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| byte_pos + i)
                .unwrap_or(self.content.len());
            self.content.drain(byte_pos..next_byte_pos);
            true
        } else {
            false
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.len() {
            self.cursor += 1;
        }
    }

    pub fn move_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.len();
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    pub fn set(&mut self, value: &str) {
        self.content = value.to_string();
        self.cursor = self.len();
    }

    fn cursor_byte_position(&self) -> usize {
        self.content
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_delete_track_cursor() {
        let mut buffer = InputBuffer::new();
        buffer.insert('d');
        buffer.insert('a');
        buffer.insert('0');
        assert_eq!(buffer.content(), "da0");
        assert_eq!(buffer.cursor(), 3);

        buffer.move_left();
        assert!(buffer.delete_back());
        assert_eq!(buffer.content(), "d0");
        assert_eq!(buffer.cursor(), 1);
    }

    #[test]
    fn multibyte_editing_is_char_indexed() {
        let mut buffer = InputBuffer::with_content("aé");
        buffer.move_start();
        assert!(buffer.delete_forward());
        assert_eq!(buffer.content(), "é");
        assert!(buffer.delete_forward());
        assert!(buffer.is_empty());
        assert!(!buffer.delete_forward());
    }

    #[test]
    fn set_places_cursor_at_end() {
        let mut buffer = InputBuffer::new();
        buffer.set("2048");
        assert_eq!(buffer.cursor(), 4);
        buffer.insert('0');
        assert_eq!(buffer.content(), "20480");
    }
}
