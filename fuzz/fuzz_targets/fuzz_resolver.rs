//! Fuzz target for offset resolution.
//!
//! Builds a ledger from arbitrary height/measurement sequences and checks
//! that resolution never panics and that the incremental scan agrees with
//! the binary baseline at every probed offset.

#![no_main]

use divvscroll::{HeightLedger, IndexResolver};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (Vec<u16>, Vec<(u16, u16)>, Vec<u32>)| {
    let (heights, measurements, probes) = data;

    // Sub-pixel heights make cumulative sums order-dependent, which is
    // exactly what mode equivalence has to survive.
    let mut ledger = HeightLedger::new();
    for h in heights.iter().take(4096) {
        ledger.append(f64::from(*h % 5000 + 1) * 0.1);
    }

    let mut resolver = IndexResolver::new(8);
    for (raw_index, raw_height) in measurements.iter().take(256) {
        if ledger.is_empty() {
            break;
        }
        let index = *raw_index as usize % ledger.len();
        let height = f64::from(*raw_height % 5000 + 1) * 0.1;
        if let Ok(delta) = ledger.record_measurement(index, height) {
            resolver.apply_correction(index, delta);
        }
    }

    for probe in probes.iter().take(512) {
        // Alternate arbitrary pixel offsets with exact record boundaries,
        // the spot where rounding can push a ranking one record off.
        let offset = if probe % 2 == 0 || ledger.is_empty() {
            f64::from(*probe % 2_000_000) * 0.1
        } else {
            let k = *probe as usize % ledger.len();
            ledger.offset_of(k).unwrap()
        };
        let incremental = resolver.resolve(&ledger, offset).map(|hit| hit.index);
        let binary = ledger.index_at_offset(offset);
        assert_eq!(incremental, binary);
        if let Some(hit) = resolver.resolve(&ledger, offset) {
            assert_eq!(hit.offset, ledger.offset_of(hit.index).unwrap());
        }
    }
});
