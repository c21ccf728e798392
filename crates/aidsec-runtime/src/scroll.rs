#![forbid(unsafe_code)]

//! Scroll hijacking for progressively revealed time series.
//!
//! While a chart is hijacked, wheel deltas move a progress value in `[0, 1]`
//! instead of scrolling the page. Progress maps to a cursor: how many leading
//! points of the series are visible. Reaching either boundary and continuing
//! in the same direction hands the wheel back to the page.
//!
//! # Design
//!
//! - [`ScrollConfig`] holds tuning parameters (sensitivity, threshold).
//! - [`ScrollController`] is the state machine
//!   `Idle → Hijacked → Releasing → Idle`. It never touches listeners
//!   itself; it returns [`ListenerAction`]s for the host to apply.
//! - `Releasing` exists so a re-engage cannot attach a second listener
//!   before the host has confirmed the detach with [`ScrollController::settle`].

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tuning knobs for scroll hijacking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScrollConfig {
    /// Progress moved per accepted wheel event.
    pub sensitivity: f64,

    /// Wheel deltas with a smaller magnitude are ignored.
    pub min_delta: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            sensitivity: 0.005,
            min_delta: 5.0,
        }
    }
}

impl ScrollConfig {
    /// Human-readable problems with the current values.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !(self.sensitivity > 0.0 && self.sensitivity <= 1.0) {
            errors.push(format!(
                "scroll.sensitivity must be in (0, 1], got {}",
                self.sensitivity
            ));
        }
        if !(self.min_delta >= 0.0 && self.min_delta.is_finite()) {
            errors.push(format!(
                "scroll.min_delta must be a non-negative number, got {}",
                self.min_delta
            ));
        }
        errors
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HijackState {
    #[default]
    Idle,
    Hijacked,
    Releasing,
}

/// Listener change the host must perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerAction {
    Attach,
    Detach,
}

/// Boundary the wheel pushed past when releasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Backward,
    Forward,
}

/// Result of feeding one wheel delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelOutcome {
    /// Not hijacked; the page scrolls normally.
    Inactive,
    /// `|delta| < min_delta`.
    BelowThreshold,
    /// Progress moved but the cursor did not.
    Unchanged,
    /// The cursor moved; redraw with this many points.
    Redraw(usize),
    /// Boundary crossed; detach the listener.
    Release(Direction),
}

#[derive(Debug, Clone)]
pub struct ScrollController {
    config: ScrollConfig,
    state: HijackState,
    progress: f64,
    cursor: usize,
    total: usize,
}

impl ScrollController {
    #[must_use]
    pub fn new(config: ScrollConfig, total: usize) -> Self {
        Self {
            config,
            state: HijackState::Idle,
            progress: 0.0,
            cursor: total.min(1),
            total,
        }
    }

    #[must_use]
    pub fn state(&self) -> HijackState {
        self.state
    }

    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Number of leading points visible; in `[1, total]` when `total > 0`.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Begin hijacking. Only an idle controller engages.
    pub fn engage(&mut self) -> Option<ListenerAction> {
        if self.state != HijackState::Idle {
            tracing::trace!(target: "aidsec.scroll", state = ?self.state, "engage ignored");
            return None;
        }
        self.state = HijackState::Hijacked;
        tracing::debug!(target: "aidsec.scroll", progress = self.progress, "scroll hijacked");
        Some(ListenerAction::Attach)
    }

    /// Host confirmed the detach.
    pub fn settle(&mut self) -> bool {
        if self.state == HijackState::Releasing {
            self.state = HijackState::Idle;
            true
        } else {
            false
        }
    }

    pub fn on_wheel(&mut self, delta_y: f64) -> WheelOutcome {
        if self.state != HijackState::Hijacked {
            return WheelOutcome::Inactive;
        }
        if !(delta_y.abs() >= self.config.min_delta) {
            return WheelOutcome::BelowThreshold;
        }
        if self.progress <= 0.0 && delta_y < 0.0 {
            return self.release(Direction::Backward);
        }
        if self.progress >= 1.0 && delta_y > 0.0 {
            return self.release(Direction::Forward);
        }

        let step = if delta_y > 0.0 {
            self.config.sensitivity
        } else {
            -self.config.sensitivity
        };
        self.progress = (self.progress + step).clamp(0.0, 1.0);
        if self.set_cursor(self.cursor_for(self.progress)) {
            WheelOutcome::Redraw(self.cursor)
        } else {
            WheelOutcome::Unchanged
        }
    }

    /// Move the cursor directly. Returns whether it changed.
    pub fn set_cursor(&mut self, cursor: usize) -> bool {
        let cursor = cursor.clamp(self.total.min(1), self.total);
        if cursor == self.cursor {
            return false;
        }
        self.cursor = cursor;
        true
    }

    /// Change the series length, keeping progress.
    pub fn reset_total(&mut self, total: usize) {
        self.total = total;
        self.cursor = self.cursor_for(self.progress);
    }

    fn cursor_for(&self, progress: f64) -> usize {
        if self.total == 0 {
            return 0;
        }
        let raw = (progress * self.total as f64).ceil() as usize;
        raw.max(1).min(self.total)
    }

    fn release(&mut self, direction: Direction) -> WheelOutcome {
        self.state = HijackState::Releasing;
        tracing::debug!(target: "aidsec.scroll", ?direction, "scroll released");
        WheelOutcome::Release(direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hijacked(total: usize) -> ScrollController {
        let mut ctl = ScrollController::new(ScrollConfig::default(), total);
        assert_eq!(ctl.engage(), Some(ListenerAction::Attach));
        ctl
    }

    #[test]
    fn defaults_match_page_tuning() {
        let cfg = ScrollConfig::default();
        assert_eq!(cfg.sensitivity, 0.005);
        assert_eq!(cfg.min_delta, 5.0);
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn validate_reports_bad_values() {
        let cfg = ScrollConfig {
            sensitivity: 0.0,
            min_delta: -1.0,
        };
        assert_eq!(cfg.validate().len(), 2);
    }

    #[test]
    fn initial_cursor_is_one() {
        let ctl = ScrollController::new(ScrollConfig::default(), 10);
        assert_eq!(ctl.cursor(), 1);
        assert_eq!(ctl.state(), HijackState::Idle);
    }

    #[test]
    fn wheel_ignored_while_idle() {
        let mut ctl = ScrollController::new(ScrollConfig::default(), 10);
        assert_eq!(ctl.on_wheel(100.0), WheelOutcome::Inactive);
    }

    #[test]
    fn small_deltas_are_ignored() {
        let mut ctl = hijacked(10);
        assert_eq!(ctl.on_wheel(4.9), WheelOutcome::BelowThreshold);
        assert_eq!(ctl.on_wheel(-4.9), WheelOutcome::BelowThreshold);
        assert_eq!(ctl.progress(), 0.0);
    }

    #[test]
    fn forward_wheel_reveals_points() {
        let mut ctl = hijacked(10);
        // 0.005 * 10 = 0.05, ceil = 1.
        assert_eq!(ctl.on_wheel(10.0), WheelOutcome::Unchanged);
        for _ in 0..24 {
            ctl.on_wheel(10.0);
        }
        assert_eq!(ctl.cursor(), 2);
        for _ in 0..25 {
            ctl.on_wheel(-10.0);
        }
        assert_eq!(ctl.cursor(), 1);
    }

    #[test]
    fn backward_at_start_releases() {
        let mut ctl = hijacked(10);
        assert_eq!(ctl.on_wheel(-10.0), WheelOutcome::Release(Direction::Backward));
        assert_eq!(ctl.state(), HijackState::Releasing);
        assert_eq!(ctl.engage(), None);
        assert!(ctl.settle());
        assert_eq!(ctl.state(), HijackState::Idle);
        assert_eq!(ctl.engage(), Some(ListenerAction::Attach));
    }

    #[test]
    fn forward_at_end_releases_with_full_cursor() {
        let mut ctl = hijacked(4);
        let mut released = false;
        for _ in 0..1000 {
            if let WheelOutcome::Release(dir) = ctl.on_wheel(10.0) {
                assert_eq!(dir, Direction::Forward);
                released = true;
                break;
            }
        }
        assert!(released);
        assert_eq!(ctl.cursor(), 4);
        assert_eq!(ctl.progress(), 1.0);
    }

    #[test]
    fn set_cursor_twice_changes_once() {
        let mut ctl = hijacked(10);
        assert!(ctl.set_cursor(5));
        assert!(!ctl.set_cursor(5));
    }

    #[test]
    fn set_cursor_clamps() {
        let mut ctl = hijacked(3);
        ctl.set_cursor(99);
        assert_eq!(ctl.cursor(), 3);
        ctl.set_cursor(0);
        assert_eq!(ctl.cursor(), 1);
    }

    #[test]
    fn settle_outside_releasing_is_noop() {
        let mut ctl = hijacked(3);
        assert!(!ctl.settle());
        assert_eq!(ctl.state(), HijackState::Hijacked);
    }

    #[test]
    fn empty_series_keeps_zero_cursor() {
        let mut ctl = hijacked(0);
        assert_eq!(ctl.cursor(), 0);
        for _ in 0..10 {
            ctl.on_wheel(10.0);
        }
        assert_eq!(ctl.cursor(), 0);
    }

    #[test]
    fn reset_total_recomputes_cursor() {
        let mut ctl = hijacked(10);
        ctl.reset_total(2);
        assert_eq!(ctl.cursor(), 1);
        assert_eq!(ctl.total(), 2);
    }

    proptest! {
        #[test]
        fn cursor_stays_in_bounds(
            total in 1usize..60,
            deltas in proptest::collection::vec(-50.0f64..50.0, 0..400),
        ) {
            let mut ctl = hijacked(total);
            for delta in deltas {
                if let WheelOutcome::Release(_) = ctl.on_wheel(delta) {
                    ctl.settle();
                    ctl.engage();
                }
                prop_assert!(ctl.cursor() >= 1 && ctl.cursor() <= total);
                prop_assert!((0.0..=1.0).contains(&ctl.progress()));
            }
        }

        #[test]
        fn forward_deltas_never_shrink_cursor(
            total in 1usize..60,
            steps in 1usize..300,
        ) {
            let mut ctl = hijacked(total);
            let mut last = ctl.cursor();
            for _ in 0..steps {
                match ctl.on_wheel(10.0) {
                    WheelOutcome::Redraw(cursor) => {
                        prop_assert!(cursor > last);
                        last = cursor;
                    }
                    WheelOutcome::Unchanged => prop_assert_eq!(ctl.cursor(), last),
                    WheelOutcome::Release(_) => break,
                    other => prop_assert!(false, "unexpected {:?}", other),
                }
            }
        }
    }
}
