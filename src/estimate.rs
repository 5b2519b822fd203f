//! Height estimation for text records.
//!
//! Records arriving from a live source (log lines, chat messages) need an
//! estimated height before they are ever rendered. The estimator predicts
//! how many rows a piece of text occupies at a given wrap width using
//! display-column widths, so wide CJK text and multi-line payloads get
//! sane estimates instead of a flat per-record constant. The measured
//! height from the real renderer supersedes the estimate later.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Text wrapping mode assumed by the estimator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WrapMode {
    /// No wrapping - long lines overflow horizontally.
    None,
    /// Wrap at character boundaries.
    Char,
    /// Wrap at word boundaries, breaking words wider than the wrap width.
    #[default]
    Word,
}

/// Predicts pixel heights for text records at a fixed wrap width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeightEstimator {
    wrap_cols: usize,
    line_height: f64,
    mode: WrapMode,
}

impl HeightEstimator {
    /// Create a word-wrapping estimator for text wrapped at `wrap_cols`
    /// display columns with `line_height` pixels per row.
    ///
    /// A wrap width of 0 disables wrapping.
    #[must_use]
    pub fn new(wrap_cols: usize, line_height: f64) -> Self {
        Self::with_mode(wrap_cols, line_height, WrapMode::default())
    }

    /// Create an estimator with an explicit wrap mode.
    #[must_use]
    pub fn with_mode(wrap_cols: usize, line_height: f64, mode: WrapMode) -> Self {
        Self {
            wrap_cols,
            line_height,
            mode,
        }
    }

    /// Estimated pixel height for `content`. Always positive: empty
    /// content still occupies one row.
    #[must_use]
    pub fn estimate(&self, content: &str) -> f64 {
        let rows: usize = content
            .lines()
            .map(|line| self.rows_for_line(line))
            .sum::<usize>()
            .max(1);
        rows as f64 * self.line_height
    }

    fn rows_for_line(&self, line: &str) -> usize {
        let cols = self.wrap_cols;
        if cols == 0 {
            return 1;
        }
        match self.mode {
            WrapMode::None => 1,
            WrapMode::Char => line.width().div_ceil(cols).max(1),
            WrapMode::Word => {
                let mut rows = 1;
                let mut col = 0;
                for word in line.split_word_bounds() {
                    let width = word.width();
                    if width == 0 {
                        continue;
                    }
                    if col + width <= cols {
                        col += width;
                    } else if width <= cols {
                        rows += 1;
                        col = width;
                    } else {
                        // Word wider than the wrap width breaks mid-word.
                        let remaining = width - (cols - col);
                        rows += remaining.div_ceil(cols);
                        col = remaining % cols;
                        if col == 0 {
                            col = cols;
                        }
                    }
                }
                rows
            }
        }
    }
}
