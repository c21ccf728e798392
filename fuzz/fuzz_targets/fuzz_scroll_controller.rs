#![no_main]

use aidsec_runtime::{ScrollConfig, ScrollController, WheelOutcome};
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Engage,
    Settle,
    Wheel(i16),
    Reset(u8),
}

#[derive(Debug, Arbitrary)]
struct Input {
    total: u8,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let mut ctl = ScrollController::new(ScrollConfig::default(), usize::from(input.total));
    for op in input.ops {
        match op {
            Op::Engage => {
                ctl.engage();
            }
            Op::Settle => {
                ctl.settle();
            }
            Op::Wheel(delta) => {
                if let WheelOutcome::Redraw(cursor) = ctl.on_wheel(f64::from(delta)) {
                    assert_eq!(cursor, ctl.cursor());
                }
            }
            Op::Reset(total) => ctl.reset_total(usize::from(total)),
        }

        assert!((0.0..=1.0).contains(&ctl.progress()));
        if ctl.total() == 0 {
            assert_eq!(ctl.cursor(), 0);
        } else {
            assert!(ctl.cursor() >= 1 && ctl.cursor() <= ctl.total());
        }
    }
});
