//! Height ledger: per-record heights with a cumulative offset structure.
//!
//! The ledger is the single source of truth for record heights. Each record
//! carries an estimated height assigned at append time and, once the record
//! has actually been rendered, a measured height that supersedes it. A
//! Fenwick (binary indexed) tree over the effective heights answers offset
//! queries in `O(log n)` and offset-to-index resolution by binary search
//! over those same prefix sums, while appends stay `O(1)` amortized.
//!
//! # Design
//!
//! - Effective height of record `i` is `measured(i)` if present, else
//!   `estimated(i)`.
//! - `offset_of(i)` is the sum of effective heights of all records before
//!   `i`, so `offset_of(0) == 0` and the running total is tracked
//!   separately for `O(1)` access.
//! - A height correction at index `k` shifts offsets of records after `k`
//!   by exactly the delta and never touches offsets at or before `k`. This
//!   is what keeps already-scrolled-past content visually stable.
//!
//! # Usage
//!
//! ```
//! use divvscroll::HeightLedger;
//!
//! let mut ledger = HeightLedger::new();
//! for h in [10.0, 20.0, 30.0, 10.0, 40.0] {
//!     ledger.append(h);
//! }
//!
//! assert_eq!(ledger.offset_of(3).unwrap(), 60.0);
//! assert_eq!(ledger.index_at_offset(65.0), Some(3));
//! assert_eq!(ledger.total_height(), 110.0);
//! ```

use crate::error::{Error, Result};

/// Per-record height storage with cumulative offset queries.
///
/// Records are append-only: no deletion, no reorder. Indices are stable for
/// the lifetime of the ledger.
#[derive(Clone, Debug, Default)]
pub struct HeightLedger {
    estimated: Vec<f64>,
    measured: Vec<Option<f64>>,
    /// Fenwick tree over effective heights, 1-based internally.
    tree: Vec<f64>,
    total: f64,
}

impl HeightLedger {
    /// Create a new empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty ledger with room for `capacity` records.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            estimated: Vec::with_capacity(capacity),
            measured: Vec::with_capacity(capacity),
            tree: Vec::with_capacity(capacity),
            total: 0.0,
        }
    }

    /// Number of records in the ledger.
    #[must_use]
    pub fn len(&self) -> usize {
        self.estimated.len()
    }

    /// Check if the ledger holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.estimated.is_empty()
    }

    /// Append a record with the given estimated height, returning its index.
    ///
    /// Appending never changes the offset of any existing record.
    pub fn append(&mut self, estimated_height: f64) -> usize {
        debug_assert!(
            estimated_height.is_finite() && estimated_height > 0.0,
            "estimated heights must be positive and finite"
        );
        let index = self.estimated.len();
        self.estimated.push(estimated_height);
        self.measured.push(None);
        self.tree_push(estimated_height);
        self.total += estimated_height;
        index
    }

    /// Effective height of the record at `index`.
    pub fn height(&self, index: usize) -> Result<f64> {
        self.check_index(index)?;
        Ok(self.measured[index].unwrap_or(self.estimated[index]))
    }

    /// Check whether the record at `index` has been measured.
    ///
    /// Out-of-range indices read as unmeasured.
    #[must_use]
    pub fn is_measured(&self, index: usize) -> bool {
        self.measured.get(index).is_some_and(Option::is_some)
    }

    /// Replace the effective height of `index` with a measured value.
    ///
    /// Returns the delta applied to the offsets of all records after
    /// `index` (zero when the measurement matches the height already in
    /// effect). Re-measuring is idempotent; the latest value wins.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfRange`] if `index` is past the end of the ledger,
    /// [`Error::MeasurementAnomaly`] if the measurement is non-positive or
    /// non-finite. In both cases the ledger is unchanged.
    pub fn record_measurement(&mut self, index: usize, measured_height: f64) -> Result<f64> {
        self.check_index(index)?;
        if !(measured_height.is_finite() && measured_height > 0.0) {
            return Err(Error::MeasurementAnomaly {
                index,
                height: measured_height,
            });
        }
        let previous = self.measured[index].unwrap_or(self.estimated[index]);
        let delta = measured_height - previous;
        self.measured[index] = Some(measured_height);
        if delta != 0.0 {
            self.tree_add(index, delta);
            self.total += delta;
        }
        Ok(delta)
    }

    /// Pixel offset of the top edge of the record at `index`.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfRange`] if `index` is past the end of the ledger.
    pub fn offset_of(&self, index: usize) -> Result<f64> {
        self.check_index(index)?;
        Ok(self.tree_prefix(index))
    }

    /// Sum of all effective heights.
    #[must_use]
    pub fn total_height(&self) -> f64 {
        self.total
    }

    /// Resolve a pixel offset to the record whose vertical range contains
    /// it, clamped to the ends of the ledger.
    ///
    /// Returns the index `i` with `offset_of(i) <= offset < offset_of(i+1)`
    /// for in-range offsets; offsets at or past the total height clamp to
    /// the last record, negative offsets to the first. An empty ledger
    /// resolves every offset to `None`.
    #[must_use]
    pub fn index_at_offset(&self, offset: f64) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        if offset <= 0.0 {
            return Some(0);
        }
        Some(self.tree_rank(offset).min(self.len() - 1))
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.len() {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange {
                index,
                len: self.len(),
            })
        }
    }

    /// Append a value to the Fenwick tree.
    ///
    /// Node `i` (1-based) covers the range `(i - lowbit(i), i]`, so the new
    /// node's value is the raw height plus the adjacent nodes that cover
    /// the sub-ranges below it. Amortized `O(1)` over a run of appends.
    fn tree_push(&mut self, value: f64) {
        let i = self.tree.len() + 1;
        let lowbit = i & i.wrapping_neg();
        let mut node = value;
        let mut span = 1;
        while span < lowbit {
            node += self.tree[i - span - 1];
            span <<= 1;
        }
        self.tree.push(node);
    }

    /// Add `delta` to the height at 0-based `index`.
    fn tree_add(&mut self, index: usize, delta: f64) {
        let mut i = index + 1;
        while i <= self.tree.len() {
            self.tree[i - 1] += delta;
            i += i & i.wrapping_neg();
        }
    }

    /// Sum of the first `count` heights.
    fn tree_prefix(&self, mut count: usize) -> f64 {
        let mut sum = 0.0;
        while count > 0 {
            sum += self.tree[count - 1];
            count &= count - 1;
        }
        sum
    }

    /// Largest `k` with `tree_prefix(k) <= target`, by binary search over
    /// the prefix sums themselves.
    ///
    /// Ranking must use the very sums `offset_of` returns: a lifting
    /// descent that subtracts node values re-associates the additions and
    /// can disagree with `tree_prefix` at record boundaries once heights
    /// are fractional.
    fn tree_rank(&self, target: f64) -> usize {
        let mut lo = 0;
        let mut hi = self.tree.len();
        while lo < hi {
            let mid = lo + (hi - lo).div_ceil(2);
            if self.tree_prefix(mid) <= target {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        lo
    }
}
