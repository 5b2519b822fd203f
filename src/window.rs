//! Render window planning.
//!
//! The planner turns a scroll sample into a contiguous index range to
//! realize, padded by overscan, and decides whether the renderer must do
//! any work at all. The flicker-avoidance rule: a re-render fires only
//! when the viewport (plus a small guard margin) is about to expose a
//! record outside the currently realized window, never on every scroll
//! tick. Small scrolls are absorbed by the overscan margin and handled by
//! native scrolling alone.

use crate::ledger::HeightLedger;
use crate::resolver::IndexResolver;

/// A point-in-time scroll sample supplied by the scroll source.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewportState {
    /// Current scroll position in pixels, `>= 0`.
    pub scroll_offset: f64,
    /// Visible height in pixels, `> 0`.
    pub viewport_height: f64,
}

impl ViewportState {
    /// Create a new viewport state.
    #[must_use]
    pub fn new(scroll_offset: f64, viewport_height: f64) -> Self {
        Self {
            scroll_offset,
            viewport_height,
        }
    }
}

/// Overscan configuration: how far beyond the visible range the realized
/// window extends, and how much of that margin may be consumed before a
/// re-render is scheduled.
///
/// `min_items` is the guard margin: once scrolling brings the viewport
/// within `min_items` records of the window edge, the planner re-renders.
/// `max_items` is the margin actually rendered on each side when it does.
/// Both are record counts; neither scales with the total record count, so
/// render cost stays bounded as the list grows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverscanPolicy {
    /// Guard margin in records, clamped to `>= 1` (zero overscan would
    /// reintroduce flicker).
    pub min_items: usize,
    /// Rendered margin in records on each side, clamped to `>= min_items`.
    pub max_items: usize,
}

impl Default for OverscanPolicy {
    fn default() -> Self {
        Self {
            min_items: 3,
            max_items: 10,
        }
    }
}

impl OverscanPolicy {
    /// Derive an item-count policy from a pixel margin and the expected
    /// average record height.
    #[must_use]
    pub fn from_pixels(min_pixels: f64, avg_record_height: f64) -> Self {
        let guard = (min_pixels / avg_record_height.max(1.0)).ceil();
        let min_items = if guard.is_finite() && guard >= 1.0 {
            guard as usize
        } else {
            1
        };
        Self {
            min_items,
            max_items: min_items.saturating_mul(3),
        }
    }

    fn normalized(self) -> (usize, usize) {
        let min = self.min_items.max(1);
        (min, self.max_items.max(min))
    }
}

/// The contiguous index range currently realized by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderWindow {
    /// First realized index, inclusive.
    pub start: usize,
    /// Last realized index, inclusive.
    pub end: usize,
    /// Records included above the first visible one at plan time.
    pub overscan_top: usize,
    /// Records included below the last visible one at plan time.
    pub overscan_bottom: usize,
}

impl RenderWindow {
    /// Number of realized records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Windows are never empty; present for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check whether `start..=end` of `other` lies within this window.
    #[must_use]
    pub fn contains(&self, start: usize, end: usize) -> bool {
        start >= self.start && end <= self.end
    }
}

/// Outcome of a planning pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plan {
    /// The window to realize; `None` while the ledger is empty.
    pub window: Option<RenderWindow>,
    /// Whether the renderer must realize a new range. When `false` the
    /// previous window stands and native scrolling covers the delta.
    pub must_rerender: bool,
    /// Pixel offset of the window's first record, for positioning the
    /// rendered block.
    pub offset_top: f64,
}

impl Plan {
    const EMPTY: Self = Self {
        window: None,
        must_rerender: false,
        offset_top: 0.0,
    };
}

/// Compute the render plan for a scroll sample.
///
/// Resolves the visible boundary records, applies the overscan policy, and
/// compares against the previously realized window per the
/// flicker-avoidance rule.
pub(crate) fn plan_window(
    ledger: &HeightLedger,
    resolver: &mut IndexResolver,
    viewport: ViewportState,
    overscan: OverscanPolicy,
    previous: Option<RenderWindow>,
) -> Plan {
    let Some(first) = resolver.resolve(ledger, viewport.scroll_offset) else {
        return Plan::EMPTY;
    };
    let len = ledger.len();

    // Walk forward from the first visible record until the viewport bottom
    // is covered. Bounded by the number of records a viewport can show.
    let bottom_target = viewport.scroll_offset + viewport.viewport_height;
    let mut last = first.index;
    let mut bottom = first.offset;
    if let Ok(h) = ledger.height(last) {
        bottom += h;
    }
    while bottom < bottom_target && last + 1 < len {
        last += 1;
        match ledger.height(last) {
            Ok(h) => bottom += h,
            Err(_) => break,
        }
    }

    let (guard, margin) = overscan.normalized();
    let guard_start = first.index.saturating_sub(guard);
    let guard_end = (last + guard).min(len - 1);
    if let Some(prev) = previous {
        if prev.contains(guard_start, guard_end) {
            // The realized window still covers the viewport plus guard
            // margin; leave it untouched and let native scrolling absorb
            // the delta.
            return Plan {
                window: Some(prev),
                must_rerender: false,
                offset_top: ledger.offset_of(prev.start).unwrap_or(0.0),
            };
        }
    }

    let start = first.index.saturating_sub(margin);
    let end = (last + margin).min(len - 1);
    let window = RenderWindow {
        start,
        end,
        overscan_top: first.index - start,
        overscan_bottom: end - last,
    };
    Plan {
        window: Some(window),
        must_rerender: true,
        offset_top: ledger.offset_of(start).unwrap_or(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_ledger(count: usize, height: f64) -> HeightLedger {
        let mut ledger = HeightLedger::new();
        for _ in 0..count {
            ledger.append(height);
        }
        ledger
    }

    fn plan(
        ledger: &HeightLedger,
        resolver: &mut IndexResolver,
        scroll: f64,
        viewport: f64,
        previous: Option<RenderWindow>,
    ) -> Plan {
        plan_window(
            ledger,
            resolver,
            ViewportState::new(scroll, viewport),
            OverscanPolicy::default(),
            previous,
        )
    }

    #[test]
    fn test_empty_ledger_plans_empty_window() {
        let ledger = HeightLedger::new();
        let mut resolver = IndexResolver::default();
        let p = plan(&ledger, &mut resolver, 0.0, 200.0, None);
        assert_eq!(p.window, None);
        assert!(!p.must_rerender);
    }

    #[test]
    fn test_initial_plan_includes_overscan() {
        let ledger = uniform_ledger(100, 20.0);
        let mut resolver = IndexResolver::default();
        // Viewport shows records 25..=34 (500/20 = 25, 10 records visible).
        let p = plan(&ledger, &mut resolver, 500.0, 200.0, None);
        assert!(p.must_rerender);
        let w = p.window.unwrap();
        assert_eq!((w.start, w.end), (15, 44));
        assert_eq!((w.overscan_top, w.overscan_bottom), (10, 10));
        assert_eq!(p.offset_top, 300.0);
    }

    #[test]
    fn test_window_clamps_at_ends() {
        let ledger = uniform_ledger(12, 20.0);
        let mut resolver = IndexResolver::default();
        let p = plan(&ledger, &mut resolver, 0.0, 100.0, None);
        let w = p.window.unwrap();
        assert_eq!((w.start, w.end), (0, 11));
        assert_eq!(w.overscan_top, 0);
    }

    #[test]
    fn test_small_scroll_does_not_rerender() {
        let ledger = uniform_ledger(100, 20.0);
        let mut resolver = IndexResolver::default();
        let first = plan(&ledger, &mut resolver, 500.0, 200.0, None);
        let window = first.window;

        // Well inside the overscan margin: 3 records' worth of scroll.
        let p = plan(&ledger, &mut resolver, 560.0, 200.0, window);
        assert!(!p.must_rerender);
        assert_eq!(p.window, window);
    }

    #[test]
    fn test_scroll_past_guard_rerenders() {
        let ledger = uniform_ledger(100, 20.0);
        let mut resolver = IndexResolver::default();
        let first = plan(&ledger, &mut resolver, 500.0, 200.0, None);
        let window = first.window;

        // 8 records of scroll eats through the 10-record margin minus the
        // 3-record guard.
        let p = plan(&ledger, &mut resolver, 660.0, 200.0, window);
        assert!(p.must_rerender);
        let w = p.window.unwrap();
        assert!(w.start > window.unwrap().start);
    }

    #[test]
    fn test_guard_margin_is_never_zero() {
        let policy = OverscanPolicy {
            min_items: 0,
            max_items: 0,
        };
        assert_eq!(policy.normalized(), (1, 1));
    }

    #[test]
    fn test_pixel_policy_conversion() {
        let policy = OverscanPolicy::from_pixels(100.0, 20.0);
        assert_eq!(policy.min_items, 5);
        assert_eq!(policy.max_items, 15);
        // Degenerate average heights still yield a sane policy.
        let policy = OverscanPolicy::from_pixels(0.0, 0.0);
        assert_eq!(policy.min_items, 1);
    }
}
