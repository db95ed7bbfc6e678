use ropey::Rope;
use std::{fs::File, io, path::PathBuf};

/// Text buffer with Emacs-style 1-based positions.
///
/// Point is always inside `[point_min, point_max]`; the mark is optional.
pub struct Buffer {
    text: Rope,
    filepath: Option<PathBuf>,
    point: usize,
    mark: Option<usize>,
}

impl Buffer {
    pub fn new() -> Self {
        Self {
            text: Rope::new(),
            filepath: None,
            point: 1,
            mark: None,
        }
    }

    pub fn from_file(path: PathBuf) -> io::Result<Self> {
        let text = Rope::from_reader(File::open(&path)?)?;
        Ok(Self {
            text,
            filepath: Some(path),
            point: 1,
            mark: None,
        })
    }

    pub fn from_text(s: &str) -> Self {
        Self {
            text: Rope::from_str(s),
            filepath: None,
            point: 1,
            mark: None,
        }
    }

    pub fn filepath(&self) -> Option<&PathBuf> {
        self.filepath.as_ref()
    }

    pub fn size(&self) -> usize {
        self.text.len_chars()
    }

    pub fn point_min(&self) -> usize {
        1
    }

    pub fn point_max(&self) -> usize {
        self.size() + 1
    }

    pub fn point(&self) -> usize {
        self.point
    }

    pub fn mark(&self) -> Option<usize> {
        self.mark
    }

    fn clamp(&self, pos: i64) -> usize {
        pos.clamp(self.point_min() as i64, self.point_max() as i64) as usize
    }

    /// Move point, clamping to the accessible range. Returns the new point.
    pub fn goto_char(&mut self, pos: i64) -> usize {
        self.point = self.clamp(pos);
        self.point
    }

    /// Set the mark, clamping to the accessible range. Returns the new mark.
    pub fn set_mark(&mut self, pos: i64) -> usize {
        let pos = self.clamp(pos);
        self.mark = Some(pos);
        pos
    }

    pub fn contents(&self) -> String {
        self.text.to_string()
    }

    #[cfg(test)]
    pub fn line_count(&self) -> usize {
        self.text.len_lines()
    }

    /// 1-based line number containing `pos`
    pub fn line_number_at(&self, pos: usize) -> usize {
        let idx = self.clamp(pos as i64) - 1;
        self.text.char_to_line(idx) + 1
    }

    /// Insert text at point and advance point past it
    #[cfg(test)]
    pub fn insert(&mut self, s: &str) {
        let idx = self.point - 1;
        self.text.insert(idx, s);
        let inserted = s.chars().count();
        if let Some(mark) = self.mark.as_mut() {
            if *mark > self.point {
                *mark += inserted;
            }
        }
        self.point += inserted;
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_empty() {
        let buf = Buffer::new();
        assert_eq!(buf.line_count(), 1); // empty rope has 1 line
        assert_eq!(buf.point(), 1);
        assert_eq!(buf.point_max(), 1);
    }

    #[test]
    fn point_max_is_one_past_size() {
        let buf = Buffer::from_text("hello\nworld");
        assert_eq!(buf.size(), 11);
        assert_eq!(buf.point_max(), 12);
    }

    #[test]
    fn goto_char_clamps() {
        let mut buf = Buffer::from_text("abc");
        assert_eq!(buf.goto_char(3), 3);
        assert_eq!(buf.goto_char(100), 4);
        assert_eq!(buf.goto_char(-5), 1);
    }

    #[test]
    fn set_mark_clamps() {
        let mut buf = Buffer::from_text("abc");
        assert_eq!(buf.mark(), None);
        assert_eq!(buf.set_mark(10), 4);
        assert_eq!(buf.mark(), Some(4));
    }

    #[test]
    fn insert_advances_point() {
        let mut buf = Buffer::from_text("world");
        buf.insert("hello ");
        assert_eq!(buf.contents(), "hello world");
        assert_eq!(buf.point(), 7);
    }

    #[test]
    fn insert_before_mark_shifts_mark() {
        let mut buf = Buffer::from_text("ab");
        buf.set_mark(3);
        buf.goto_char(2);
        buf.insert("xx");
        assert_eq!(buf.contents(), "axxb");
        assert_eq!(buf.mark(), Some(5));
    }

    #[test]
    fn line_number_at_counts_from_one() {
        let buf = Buffer::from_text("first\nsecond\nthird");
        assert_eq!(buf.line_number_at(1), 1);
        assert_eq!(buf.line_number_at(7), 2);
        assert_eq!(buf.line_number_at(19), 3);
    }
}
