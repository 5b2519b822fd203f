//! Scroller facade: one owned engine instance per scrollable surface.
//!
//! A [`Scroller`] owns the height ledger, resolver, and realized window
//! for a single surface; multiple instances coexist without shared state.
//! External collaborators drive it through discrete inbound messages:
//!
//! - `on_scroll` / `on_resize` — scroll source samples
//! - `on_append` / `on_append_batch` — live-data source
//! - `on_measured` — renderer measurement feedback
//! - `scroll_to_index` — programmatic jumps (search, pagers)
//!
//! Every message is synchronous and runs to completion, returning the
//! [`Plan`] for the new state. Feeding a scripted message sequence is all
//! it takes to exercise the engine, no rendering surface required.

use crate::error::{Error, Result};
use crate::event::{LogLevel, emit_log};
use crate::ledger::HeightLedger;
use crate::resolver::IndexResolver;
use crate::window::{OverscanPolicy, Plan, RenderWindow, ViewportState, plan_window};

/// Scroller configuration, immutable after construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollerOptions {
    /// Overscan sizing for the window planner.
    pub overscan: OverscanPolicy,
    /// Step budget for the incremental resolver before it falls back to
    /// binary search.
    pub scan_budget: usize,
    /// Pixel tolerance for treating "practically at bottom" as at bottom
    /// despite sub-pixel rounding.
    pub bottom_epsilon: f64,
    /// Estimated height substituted when an append supplies an anomalous
    /// estimate (non-positive or non-finite).
    pub fallback_estimate: f64,
}

impl Default for ScrollerOptions {
    fn default() -> Self {
        Self {
            overscan: OverscanPolicy::default(),
            scan_budget: 64,
            bottom_epsilon: 1.0,
            fallback_estimate: 16.0,
        }
    }
}

/// One measured height produced by a render pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    pub index: usize,
    pub height: f64,
}

/// Virtual window engine for one scrollable surface.
#[derive(Debug)]
pub struct Scroller {
    ledger: HeightLedger,
    resolver: IndexResolver,
    options: ScrollerOptions,
    window: Option<RenderWindow>,
    scroll_offset: f64,
    viewport_height: f64,
}

impl Scroller {
    /// Create a scroller for a viewport of the given pixel height.
    #[must_use]
    pub fn new(viewport_height: f64) -> Self {
        Self::new_with_options(viewport_height, ScrollerOptions::default())
    }

    /// Create a scroller with custom options.
    #[must_use]
    pub fn new_with_options(viewport_height: f64, options: ScrollerOptions) -> Self {
        Self {
            ledger: HeightLedger::new(),
            resolver: IndexResolver::new(options.scan_budget),
            options,
            window: None,
            scroll_offset: 0.0,
            viewport_height: viewport_height.max(0.0),
        }
    }

    /// Number of records tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ledger.len()
    }

    /// Check if no records have been appended yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }

    /// Current scroll position in pixels.
    #[must_use]
    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    /// Current viewport height in pixels.
    #[must_use]
    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    /// The currently realized window, if any.
    #[must_use]
    pub fn window(&self) -> Option<RenderWindow> {
        self.window
    }

    /// Total pixel height of all records.
    #[must_use]
    pub fn total_height(&self) -> f64 {
        self.ledger.total_height()
    }

    /// Read-only access to the height ledger.
    #[must_use]
    pub fn ledger(&self) -> &HeightLedger {
        &self.ledger
    }

    /// Pixel offset of a record's top edge. Exposed read-only for search
    /// and highlight consumers.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfRange`] for indices past the end of the ledger.
    pub fn offset_of(&self, index: usize) -> Result<f64> {
        self.ledger.offset_of(index)
    }

    /// Resolve a pixel offset to a record index, `None` while empty.
    /// Exposed read-only for search and highlight consumers.
    #[must_use]
    pub fn index_at_offset(&self, offset: f64) -> Option<usize> {
        self.ledger.index_at_offset(offset)
    }

    /// Whether the viewport is within the bottom tolerance of the list end.
    #[must_use]
    pub fn is_at_bottom(&self) -> bool {
        self.scroll_offset + self.viewport_height
            >= self.ledger.total_height() - self.options.bottom_epsilon
    }

    /// Handle a scroll sample from the scroll source.
    ///
    /// Samples are point-in-time positions, not deltas; the engine is
    /// correct under coalescing (invoked once per frame or less).
    pub fn on_scroll(&mut self, scroll_offset: f64, viewport_height: f64) -> Plan {
        self.viewport_height = viewport_height.max(0.0);
        self.scroll_offset = self.clamp_scroll(scroll_offset);
        self.replan()
    }

    /// Handle a viewport resize. A resize while pinned to the bottom stays
    /// pinned to the bottom.
    pub fn on_resize(&mut self, viewport_height: f64) -> Plan {
        let was_at_bottom = self.is_at_bottom();
        self.viewport_height = viewport_height.max(0.0);
        self.scroll_offset = if was_at_bottom {
            self.max_scroll()
        } else {
            self.clamp_scroll(self.scroll_offset)
        };
        self.replan()
    }

    /// Append one record. If the viewport was at the bottom before the
    /// append, follow mode pins it to the new bottom; otherwise the current
    /// reading position is preserved (appending never perturbs earlier
    /// offsets).
    pub fn on_append(&mut self, estimated_height: f64) -> Plan {
        self.append_all(std::iter::once(estimated_height))
    }

    /// Append a burst of records, evaluating follow mode once for the
    /// whole batch. Live sources that tail files deliver many lines per
    /// change event; this avoids re-planning per line.
    pub fn on_append_batch<I>(&mut self, estimated_heights: I) -> Plan
    where
        I: IntoIterator<Item = f64>,
    {
        self.append_all(estimated_heights)
    }

    /// Apply measured heights from one render pass as a single atomic
    /// update: one pass over the ledger, at most one scroll-offset write.
    /// Corrections to records that lie before the scroll position shift
    /// the offset by the same delta so anchored content does not jump.
    ///
    /// Anomalous measurements (non-positive or non-finite) are logged and
    /// skipped, leaving the prior height in effect.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfRange`] if any measurement references a record
    /// past the end of the ledger. Indices are validated before anything
    /// is applied, so a rejected batch leaves the engine untouched.
    pub fn on_measured(&mut self, measurements: &[Measurement]) -> Result<Plan> {
        let len = self.ledger.len();
        for m in measurements {
            if m.index >= len {
                return Err(Error::IndexOutOfRange { index: m.index, len });
            }
        }
        let mut batch = measurements.to_vec();
        batch.sort_by_key(|m| m.index);

        let mut shift = 0.0;
        for m in &batch {
            let delta = match self.ledger.record_measurement(m.index, m.height) {
                Ok(delta) => delta,
                Err(err @ Error::MeasurementAnomaly { .. }) => {
                    emit_log(LogLevel::Warn, &err.to_string());
                    continue;
                }
                Err(err) => return Err(err),
            };
            if delta != 0.0 {
                self.resolver.apply_correction(m.index, delta);
                if self.ledger.offset_of(m.index)? < self.scroll_offset + shift {
                    shift += delta;
                }
            }
        }
        if shift != 0.0 {
            // Shift by exactly the accumulated delta. The offset may sit
            // past the scrollable range until the next scroll sample
            // re-clamps it; clamping here would break batch atomicity.
            self.scroll_offset = (self.scroll_offset + shift).max(0.0);
        }
        Ok(self.replan())
    }

    /// Reconcile a single measured height. See [`Scroller::on_measured`].
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfRange`] for indices past the end of the ledger.
    pub fn reconcile(&mut self, index: usize, measured_height: f64) -> Result<Plan> {
        self.on_measured(&[Measurement {
            index,
            height: measured_height,
        }])
    }

    /// Jump so the record at `index` sits at the top of the viewport
    /// (clamped to the scrollable range). Resolution takes the binary
    /// path; jumps carry no locality worth scanning from.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfRange`] for indices past the end of the ledger.
    pub fn scroll_to_index(&mut self, index: usize) -> Result<Plan> {
        let top = self.ledger.offset_of(index)?;
        self.scroll_offset = self.clamp_scroll(top);
        self.resolver.resolve_jump(&self.ledger, self.scroll_offset);
        Ok(self.replan())
    }

    fn append_all<I>(&mut self, estimated_heights: I) -> Plan
    where
        I: IntoIterator<Item = f64>,
    {
        let was_at_bottom = self.is_at_bottom();
        for estimate in estimated_heights {
            let sane = if estimate.is_finite() && estimate > 0.0 {
                estimate
            } else {
                let err = Error::MeasurementAnomaly {
                    index: self.ledger.len(),
                    height: estimate,
                };
                emit_log(LogLevel::Warn, &err.to_string());
                self.options.fallback_estimate
            };
            self.ledger.append(sane);
        }
        if was_at_bottom {
            self.scroll_offset = self.max_scroll();
        }
        self.replan()
    }

    fn max_scroll(&self) -> f64 {
        (self.ledger.total_height() - self.viewport_height).max(0.0)
    }

    fn clamp_scroll(&self, offset: f64) -> f64 {
        offset.clamp(0.0, self.max_scroll())
    }

    fn replan(&mut self) -> Plan {
        let viewport = ViewportState::new(self.scroll_offset, self.viewport_height);
        let plan = plan_window(
            &self.ledger,
            &mut self.resolver,
            viewport,
            self.options.overscan,
            self.window,
        );
        if plan.must_rerender {
            self.window = plan.window;
        }
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scroller_with_records(count: usize, height: f64, viewport: f64) -> Scroller {
        let mut scroller = Scroller::new(viewport);
        scroller.on_append_batch(std::iter::repeat_n(height, count));
        scroller
    }

    #[test]
    fn test_follow_mode_at_bottom() {
        let mut scroller = scroller_with_records(100, 20.0, 200.0);
        scroller.on_scroll(1800.0, 200.0);
        assert!(scroller.is_at_bottom());

        scroller.on_append(20.0);
        assert_eq!(scroller.total_height(), 2020.0);
        assert_eq!(scroller.scroll_offset(), 1820.0);
        assert!(scroller.is_at_bottom());
    }

    #[test]
    fn test_append_holds_position_when_not_at_bottom() {
        let mut scroller = scroller_with_records(100, 20.0, 200.0);
        scroller.on_scroll(500.0, 200.0);

        scroller.on_append(20.0);
        assert_eq!(scroller.scroll_offset(), 500.0);
        assert_eq!(scroller.total_height(), 2020.0);
    }

    #[test]
    fn test_batch_append_follows_once() {
        let mut scroller = Scroller::new(200.0);
        // Empty list counts as at-bottom, so the first burst pins.
        scroller.on_append_batch([20.0, 30.0, 40.0]);
        assert_eq!(scroller.scroll_offset(), 0.0);
        assert_eq!(scroller.len(), 3);

        scroller.on_append_batch(std::iter::repeat_n(20.0, 50));
        assert!(scroller.is_at_bottom());
        assert_eq!(
            scroller.scroll_offset(),
            scroller.total_height() - 200.0
        );
    }

    #[test]
    fn test_anomalous_estimate_uses_fallback() {
        let mut scroller = Scroller::new(200.0);
        scroller.on_append(f64::NAN);
        scroller.on_append(-5.0);
        assert_eq!(scroller.len(), 2);
        assert_eq!(scroller.ledger().height(0).unwrap(), 16.0);
        assert_eq!(scroller.ledger().height(1).unwrap(), 16.0);
    }

    #[test]
    fn test_reconcile_before_viewport_anchors_content() {
        let mut scroller = scroller_with_records(100, 20.0, 200.0);
        scroller.on_scroll(1000.0, 200.0);

        // Record 10 is far above the viewport; it grows by 15px.
        scroller.reconcile(10, 35.0).unwrap();
        assert_eq!(scroller.scroll_offset(), 1015.0);
        // The record at the top of the viewport is unchanged.
        assert_eq!(scroller.index_at_offset(1015.0), Some(50));
    }

    #[test]
    fn test_reconcile_after_viewport_leaves_scroll_alone() {
        let mut scroller = scroller_with_records(100, 20.0, 200.0);
        scroller.on_scroll(1000.0, 200.0);

        scroller.reconcile(90, 35.0).unwrap();
        assert_eq!(scroller.scroll_offset(), 1000.0);
        assert_eq!(scroller.total_height(), 2015.0);
    }

    #[test]
    fn test_batched_reconcile_single_offset_write() {
        let mut scroller = scroller_with_records(100, 20.0, 200.0);
        scroller.on_scroll(1000.0, 200.0);

        // Mixed batch: two above the viewport, one inside, one below.
        let plan = scroller
            .on_measured(&[
                Measurement { index: 5, height: 30.0 },
                Measurement { index: 20, height: 10.0 },
                Measurement { index: 51, height: 25.0 },
                Measurement { index: 95, height: 60.0 },
            ])
            .unwrap();
        // +10 - 10 from the two records above the scroll position.
        assert_eq!(scroller.scroll_offset(), 1000.0);
        assert!(plan.window.is_some());
    }

    #[test]
    fn test_measured_anomaly_recovers() {
        let mut scroller = scroller_with_records(10, 20.0, 100.0);
        scroller
            .on_measured(&[Measurement { index: 3, height: f64::NAN }])
            .unwrap();
        assert_eq!(scroller.ledger().height(3).unwrap(), 20.0);
        assert!(!scroller.ledger().is_measured(3));
    }

    #[test]
    fn test_measured_out_of_range_surfaces() {
        let mut scroller = scroller_with_records(10, 20.0, 100.0);
        let err = scroller
            .on_measured(&[Measurement { index: 10, height: 20.0 }])
            .unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { index: 10, len: 10 }));
    }

    #[test]
    fn test_rejected_batch_applies_nothing() {
        let mut scroller = scroller_with_records(10, 20.0, 100.0);
        // A valid measurement sorted ahead of the bad index must not land.
        let err = scroller
            .on_measured(&[
                Measurement { index: 2, height: 50.0 },
                Measurement { index: 10, height: 20.0 },
            ])
            .unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { index: 10, len: 10 }));
        assert_eq!(scroller.ledger().height(2).unwrap(), 20.0);
        assert!(!scroller.ledger().is_measured(2));
        assert_eq!(scroller.total_height(), 200.0);
    }

    #[test]
    fn test_scroll_to_index() {
        let mut scroller = scroller_with_records(200, 20.0, 200.0);
        let plan = scroller.scroll_to_index(150).unwrap();
        assert_eq!(scroller.scroll_offset(), 3000.0);
        let w = plan.window.unwrap();
        assert!(w.contains(150, 155));

        // Jumping to the last record clamps to the scrollable range.
        scroller.scroll_to_index(199).unwrap();
        assert_eq!(scroller.scroll_offset(), 3800.0);
        assert!(scroller.scroll_to_index(200).is_err());
    }

    #[test]
    fn test_resize_stays_pinned_at_bottom() {
        let mut scroller = scroller_with_records(100, 20.0, 200.0);
        scroller.on_scroll(1800.0, 200.0);
        assert!(scroller.is_at_bottom());

        scroller.on_resize(400.0);
        assert_eq!(scroller.scroll_offset(), 1600.0);
        assert!(scroller.is_at_bottom());

        // Not at bottom: resize keeps the reading position.
        scroller.on_scroll(500.0, 400.0);
        scroller.on_resize(300.0);
        assert_eq!(scroller.scroll_offset(), 500.0);
    }

    #[test]
    fn test_independent_instances() {
        let mut a = scroller_with_records(50, 20.0, 100.0);
        let b = scroller_with_records(5, 10.0, 100.0);
        a.on_scroll(400.0, 100.0);
        assert_eq!(b.scroll_offset(), 0.0);
        assert_eq!(b.total_height(), 50.0);
        assert_eq!(a.index_at_offset(400.0), Some(20));
    }

    #[test]
    fn test_empty_scroller_messages_are_safe() {
        let mut scroller = Scroller::new(200.0);
        let plan = scroller.on_scroll(500.0, 200.0);
        assert_eq!(plan.window, None);
        assert!(!plan.must_rerender);
        assert_eq!(scroller.scroll_offset(), 0.0);
        assert!(scroller.scroll_to_index(0).is_err());
    }
}
