//! Simulated live log feed driving the engine.
//!
//! Stands in for the real pipeline (file watcher -> SSE stream -> DOM
//! renderer): bursts of log lines are appended with estimated heights,
//! "rendered" by reporting slightly different measured heights back, and
//! the demo prints how rarely the engine actually asks for a re-render.
//!
//! Run with: cargo run --example tail_follow

use divvscroll::{HeightEstimator, Measurement, Scroller};

fn main() {
    let estimator = HeightEstimator::new(100, 16.0);
    let mut scroller = Scroller::new(480.0);

    let mut renders = 0;
    let mut appended = 0;

    for burst in 0..200 {
        // A file modification queues a handful of new lines at once.
        let lines = (0..5).map(|i| {
            let text = format!(
                "[app.log] request {} handled in {}ms with status {}",
                burst * 5 + i,
                3 + (burst + i) % 40,
                if (burst + i) % 17 == 0 { 500 } else { 200 }
            );
            estimator.estimate(&text)
        });
        let plan = scroller.on_append_batch(lines);
        appended += 5;

        if plan.must_rerender {
            renders += 1;
            let window = plan.window.expect("window exists after append");
            // The renderer would paint the range, then report what the
            // lines actually measured.
            let measured: Vec<Measurement> = (window.start..=window.end)
                .map(|index| Measurement {
                    index,
                    height: if index % 7 == 0 { 32.0 } else { 16.0 },
                })
                .collect();
            scroller.on_measured(&measured).expect("window indices are in range");
        }
    }

    println!("appended {appended} records in 200 bursts");
    println!("re-rendered {renders} times while following the tail");
    println!(
        "total height {:.0}px, scrolled to {:.0}px (viewport 480px)",
        scroller.total_height(),
        scroller.scroll_offset()
    );
    assert!(scroller.is_at_bottom());

    // Scroll back into history; appends no longer move the view.
    scroller.on_scroll(1000.0, 480.0);
    let before = scroller.scroll_offset();
    scroller.on_append_batch([16.0, 16.0, 16.0]);
    println!(
        "after scrolling up to {before:.0}px, 3 more appends left the view at {:.0}px",
        scroller.scroll_offset()
    );
}
