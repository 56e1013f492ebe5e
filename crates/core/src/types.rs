use serde::Serialize;

// ---------------------------------------------------------------------------
// Word
// ---------------------------------------------------------------------------

/// A recognized token placed on the page in pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Word {
    pub text: String,
    pub x0: f32,
    pub y_top: f32,
    pub y_bottom: f32,
    pub width: f32,
}

impl Word {
    pub fn new(text: impl Into<String>, x0: f32, y_top: f32, x1: f32, y_bottom: f32) -> Self {
        Self {
            text: text.into(),
            x0,
            y_top,
            y_bottom,
            width: x1 - x0,
        }
    }

    /// Right edge of the word.
    pub fn x1(&self) -> f32 {
        self.x0 + self.width
    }

    pub fn height(&self) -> f32 {
        self.y_bottom - self.y_top
    }

    /// A word without positive height cannot be placed on a line.
    pub fn is_degenerate(&self) -> bool {
        self.y_bottom <= self.y_top
    }
}

// ---------------------------------------------------------------------------
// Line
// ---------------------------------------------------------------------------

/// A cluster of words judged to lie on the same visual row.
///
/// Built incrementally: `top`/`bottom` widen as words are merged in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub words: Vec<Word>,
    pub top: f32,
    pub bottom: f32,
}

impl Line {
    /// Start a line from its first word.
    pub fn new(word: Word) -> Self {
        Self {
            top: word.y_top,
            bottom: word.y_bottom,
            words: vec![word],
        }
    }

    /// Merge a word into the line, widening the vertical extent.
    pub fn push(&mut self, word: Word) {
        self.top = self.top.min(word.y_top);
        self.bottom = self.bottom.max(word.y_bottom);
        self.words.push(word);
    }

    /// Vertical overlap between the line band and a word.
    ///
    /// Negative when the two intervals are disjoint.
    pub fn overlap_with(&self, word: &Word) -> f32 {
        self.bottom.min(word.y_bottom) - self.top.max(word.y_top)
    }

    /// Sum of the positive member word widths.
    pub fn width_sum(&self) -> f32 {
        self.words.iter().map(|w| w.width).filter(|w| *w > 0.0).sum()
    }

    /// Order member words left-to-right.
    pub fn sort_words(&mut self) {
        self.words.sort_by(|a, b| a.x0.total_cmp(&b.x0));
    }
}

// ---------------------------------------------------------------------------
// Page geometry
// ---------------------------------------------------------------------------

/// Page-level scale references gathered during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageGeometry {
    /// Leftmost `x0` over all words.
    pub left: f32,
    /// Rightmost `x1` over all words.
    pub right: f32,
    /// Smallest positive word height, or the page height when none exists.
    pub row_height: f32,
}

impl PageGeometry {
    /// Horizontal extent actually covered by text.
    pub fn used_width(&self) -> f32 {
        (self.right - self.left).max(0.0)
    }
}
