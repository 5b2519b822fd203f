//! Offset-to-index resolution.
//!
//! Two modes back [`IndexResolver::resolve`]:
//!
//! - **Incremental scan**: walk forward or backward from the previously
//!   resolved record, comparing the target against per-record heights.
//!   Natural scrolling moves by at most a viewport per frame while record
//!   heights are roughly uniform, so the walk is amortized `O(1)`.
//! - **Binary search**: partition point over the ledger's cumulative
//!   sums, `O(log n)`. Used when the cache is cold, for programmatic
//!   jumps, and whenever the scan exhausts its step budget.
//!
//! Both modes must resolve any offset to the same index. Debug builds
//! cross-check every incremental result against the binary baseline and
//! panic on divergence, since disagreement means a ledger invariant broke.

#[cfg(debug_assertions)]
use crate::error::Error;
#[cfg(debug_assertions)]
use crate::event::{LogLevel, emit_log};
use crate::ledger::HeightLedger;

/// Adjustments `snap` may make before handing a scan over to binary
/// search. One absorbs a rounding boundary; more means the cache drifted.
const SNAP_LIMIT: usize = 2;

/// A resolved record position: the index and the pixel offset of its top.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedIndex {
    pub index: usize,
    pub offset: f64,
}

/// Stateful offset resolver with a warm-start cache.
///
/// The cache holds the last resolved position so consecutive resolutions
/// for nearby offsets walk a handful of records instead of searching the
/// whole ledger. The owner must keep the cache coherent across height
/// corrections via [`IndexResolver::apply_correction`].
#[derive(Clone, Debug)]
pub struct IndexResolver {
    cached: Option<ResolvedIndex>,
    scan_budget: usize,
}

impl IndexResolver {
    /// Create a resolver with the given incremental-scan step budget.
    ///
    /// A scan that traverses more than `scan_budget` records aborts and
    /// falls back to binary search. Budgets below 1 are clamped to 1.
    #[must_use]
    pub fn new(scan_budget: usize) -> Self {
        Self {
            cached: None,
            scan_budget: scan_budget.max(1),
        }
    }

    /// Resolve `offset` to the record containing it, clamped to the ledger
    /// ends. Returns `None` only for an empty ledger.
    ///
    /// Tries the incremental scan first and falls back to binary search on
    /// a cold cache or an exhausted step budget.
    pub fn resolve(&mut self, ledger: &HeightLedger, offset: f64) -> Option<ResolvedIndex> {
        if ledger.is_empty() {
            self.cached = None;
            return None;
        }
        let resolved = match self.scan(ledger, offset) {
            Some(hit) => {
                self.verify(ledger, offset, hit.index);
                hit
            }
            None => Self::binary(ledger, offset)?,
        };
        self.cached = Some(resolved);
        Some(resolved)
    }

    /// Resolve `offset` via binary search unconditionally.
    ///
    /// Intended for large jumps (scrollbar drags, jump-to-match) where the
    /// previous position carries no useful locality. Re-primes the cache at
    /// the landing position.
    pub fn resolve_jump(&mut self, ledger: &HeightLedger, offset: f64) -> Option<ResolvedIndex> {
        let resolved = Self::binary(ledger, offset)?;
        self.cached = Some(resolved);
        Some(resolved)
    }

    /// Shift the cached position after a height correction at `index` by
    /// `delta` pixels. Corrections at or after the cached record leave its
    /// top offset unchanged.
    pub fn apply_correction(&mut self, index: usize, delta: f64) {
        if let Some(cached) = &mut self.cached {
            if index < cached.index {
                cached.offset += delta;
            }
        }
    }

    /// Drop the cached position.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    fn binary(ledger: &HeightLedger, offset: f64) -> Option<ResolvedIndex> {
        let index = ledger.index_at_offset(offset)?;
        let top = ledger.offset_of(index).ok()?;
        Some(ResolvedIndex { index, offset: top })
    }

    /// Walk from the cached position toward `offset`.
    ///
    /// Returns `None` when the cache is cold or the step budget runs out;
    /// the caller falls back to binary search.
    fn scan(&self, ledger: &HeightLedger, offset: f64) -> Option<ResolvedIndex> {
        let cached = self.cached?;
        if cached.index >= ledger.len() {
            return None;
        }
        let mut index = cached.index;
        let mut top = cached.offset;
        let mut steps = 0_usize;
        if offset >= top {
            // Forward: advance while the target lies below the current
            // record, clamping at the last record.
            loop {
                let height = ledger.height(index).ok()?;
                if offset < top + height || index + 1 == ledger.len() {
                    break;
                }
                top += height;
                index += 1;
                steps += 1;
                if steps > self.scan_budget {
                    return None;
                }
            }
        } else {
            // Backward: retreat until the target falls inside a record,
            // clamping at the first.
            while index > 0 {
                index -= 1;
                top -= ledger.height(index).ok()?;
                if offset >= top {
                    break;
                }
                steps += 1;
                if steps > self.scan_budget {
                    return None;
                }
            }
        }
        Self::snap(ledger, offset, index)
    }

    /// Re-anchor a walk candidate against the ledger's own prefix sums.
    ///
    /// The walk accumulates heights privately; with fractional heights
    /// that running sum can round differently than `offset_of` and land
    /// one record off at a boundary. Ranking against `offset_of` itself
    /// keeps the scan in exact agreement with binary search. More than
    /// `SNAP_LIMIT` adjustments means the cached offset has drifted, so
    /// the caller falls back to binary search.
    fn snap(ledger: &HeightLedger, offset: f64, mut index: usize) -> Option<ResolvedIndex> {
        let len = ledger.len();
        for _ in 0..=SNAP_LIMIT {
            let top = ledger.offset_of(index).ok()?;
            if top > offset && index > 0 {
                index -= 1;
            } else if index + 1 < len && ledger.offset_of(index + 1).ok()? <= offset {
                index += 1;
            } else {
                return Some(ResolvedIndex { index, offset: top });
            }
        }
        None
    }

    /// Debug-only consistency check: the scan result must match the binary
    /// baseline. Fatal here; release builds skip the cross-check and the
    /// budget fallback already guarantees the binary path on pathological
    /// input.
    #[cfg(debug_assertions)]
    fn verify(&self, ledger: &HeightLedger, offset: f64, incremental: usize) {
        if let Some(binary) = ledger.index_at_offset(offset) {
            if binary != incremental {
                let err = Error::SearchDivergence {
                    offset,
                    incremental,
                    binary,
                };
                emit_log(LogLevel::Error, &err.to_string());
                panic!("{err}");
            }
        }
    }

    #[cfg(not(debug_assertions))]
    fn verify(&self, _ledger: &HeightLedger, _offset: f64, _incremental: usize) {}
}

impl Default for IndexResolver {
    fn default() -> Self {
        Self::new(64)
    }
}
