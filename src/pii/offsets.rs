/// Converts byte offsets into codepoint offsets over one string.
///
/// Queries are cheapest when made in ascending order; a query behind the last
/// one restarts the walk from the beginning.
pub struct CharOffsets<'a> {
    text: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharOffsets<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, byte: 0, chars: 0 }
    }

    /// `byte` must lie on a char boundary of the text.
    pub fn char_index(&mut self, byte: usize) -> usize {
        if byte < self.byte {
            self.byte = 0;
            self.chars = 0;
        }
        self.chars += self.text[self.byte..byte].chars().count();
        self.byte = byte;
        self.chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_offsets_are_identical() {
        let mut offsets = CharOffsets::new("hello world");
        assert_eq!(offsets.char_index(6), 6);
        assert_eq!(offsets.char_index(11), 11);
    }

    #[test]
    fn test_multibyte_offsets() {
        let text = "José Müller <jm@x.io>";
        let start = text.find("jm@").unwrap();
        let end = start + "jm@x.io".len();
        let mut offsets = CharOffsets::new(text);
        assert_eq!(offsets.char_index(start), 13);
        assert_eq!(offsets.char_index(end), 20);
    }

    #[test]
    fn test_backwards_query_restarts() {
        let text = "ñaño ñu";
        let mut offsets = CharOffsets::new(text);
        assert_eq!(offsets.char_index(text.len()), 7);
        assert_eq!(offsets.char_index(2), 1);
    }
}
