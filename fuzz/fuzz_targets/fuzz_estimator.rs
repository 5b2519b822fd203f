//! Fuzz target for the text height estimator.
//!
//! Arbitrary strings (including control characters, combining marks, and
//! invalid-looking fragments) must estimate without panicking and always
//! yield a positive height.

#![no_main]

use divvscroll::{HeightEstimator, WrapMode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    for mode in [WrapMode::None, WrapMode::Char, WrapMode::Word] {
        for cols in [0, 1, 8, 80] {
            let estimator = HeightEstimator::with_mode(cols, 16.0, mode);
            let height = estimator.estimate(data);
            assert!(height >= 16.0);
            assert!(height.is_finite());
        }
    }
});
