//! `divvscroll` - Virtual window engine for unbounded record lists
//!
//! A Rust port of the `divvscroll` virtual-scrolling core, keeping the
//! number of realized records bounded and independent of total record
//! count. The engine tracks per-record heights (estimated until measured),
//! maps scroll offsets to index ranges in amortized O(1), and reconciles
//! measured heights without disturbing content the user has already
//! scrolled past.
//!
//! The rendering surface, search/highlighting, and live-data transport are
//! external collaborators; the engine is pure in-memory state driven by
//! discrete messages (`on_scroll`, `on_resize`, `on_append`, `on_measured`).

// Crate-level lint configuration
#![allow(clippy::cast_possible_truncation)] // Intentional pixel-to-count casts
#![allow(clippy::cast_sign_loss)] // Guarded float-to-count conversions
#![allow(clippy::cast_precision_loss)] // Intentional for row/height math
#![allow(clippy::module_name_repetitions)] // Allow HeightLedger etc
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::use_self)] // Allow explicit type names in impl blocks
#![allow(clippy::float_cmp)] // Exact comparisons are intentional in the ledger
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::semicolon_if_nothing_returned)] // Style preference

pub mod error;
pub mod estimate;
pub mod event;
pub mod ledger;
pub mod resolver;
pub mod scroller;
pub mod window;

// Re-export core types at crate root
pub use error::{Error, Result};
pub use estimate::{HeightEstimator, WrapMode};
pub use event::{LogLevel, emit_log, set_log_callback};
pub use ledger::HeightLedger;
pub use resolver::{IndexResolver, ResolvedIndex};
pub use scroller::{Measurement, Scroller, ScrollerOptions};
pub use window::{OverscanPolicy, Plan, RenderWindow, ViewportState};
