//! Swipe and long-press resolution for task rows.
//!
//! A press on a row resolves to exactly one [`GestureAction`]: a drag past the
//! threshold toggles (positive direction) or deletes (negative direction), a press
//! held still past the delay starts editing, anything else snaps back.

use std::time::{Duration, Instant};

pub const SWIPE_THRESHOLD: f32 = 80.0;
pub const LONG_PRESS_DELAY: Duration = Duration::from_millis(500);
/// Drift allowed before a press stops counting as held still.
pub const MOVE_TOLERANCE: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    pub swipe_threshold: f32,
    pub long_press_delay: Duration,
    pub move_tolerance: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self { swipe_threshold: SWIPE_THRESHOLD, long_press_delay: LONG_PRESS_DELAY, move_tolerance: MOVE_TOLERANCE }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureAction {
    ToggleComplete,
    Delete,
    Edit,
    SnapBack,
}

/// Maps a horizontal displacement to the action it commits. The threshold itself
/// does not fire.
pub fn classify_swipe(dx: f32, threshold: f32) -> GestureAction {
    if dx > threshold {
        GestureAction::ToggleComplete
    } else if dx < -threshold {
        GestureAction::Delete
    } else {
        GestureAction::SnapBack
    }
}

#[derive(Debug, Clone, Copy)]
struct Press {
    index: usize,
    origin_x: f32,
    dx: f32,
    started: Instant,
    long_press_armed: bool,
}

#[derive(Debug, Default)]
pub struct SwipeTracker {
    config: GestureConfig,
    press: Option<Press>,
}

impl SwipeTracker {
    pub fn new(config: GestureConfig) -> Self { Self { config, press: None } }

    pub fn config(&self) -> &GestureConfig { &self.config }

    /// Starts tracking a press on row `index`. An unresolved earlier press is dropped.
    pub fn press(&mut self, index: usize, x: f32, at: Instant) {
        self.press = Some(Press { index, origin_x: x, dx: 0.0, started: at, long_press_armed: true });
    }

    /// Follows the pointer. Moving beyond the tolerance cancels the long press.
    pub fn drag(&mut self, x: f32) {
        let tolerance = self.config.move_tolerance;
        if let Some(press) = self.press.as_mut() {
            press.dx = x - press.origin_x;
            if press.dx.abs() > tolerance {
                press.long_press_armed = false;
            }
        }
    }

    /// Fires the long press once the delay has passed without movement. The
    /// gesture is then finished and the release is ignored.
    pub fn poll(&mut self, now: Instant) -> Option<(usize, GestureAction)> {
        let press = self.press?;
        if press.long_press_armed && now.duration_since(press.started) >= self.config.long_press_delay {
            self.press = None;
            return Some((press.index, GestureAction::Edit));
        }
        None
    }

    pub fn release(&mut self, x: f32) -> Option<(usize, GestureAction)> {
        self.drag(x);
        let press = self.press.take()?;
        Some((press.index, classify_swipe(press.dx, self.config.swipe_threshold)))
    }

    pub fn cancel(&mut self) { self.press = None; }

    /// Row being dragged and its current offset, for drawing.
    pub fn offset(&self) -> Option<(usize, f32)> { self.press.map(|p| (p.index, p.dx)) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> SwipeTracker { SwipeTracker::new(GestureConfig::default()) }

    #[test]
    fn displacement_at_threshold_fires_nothing() {
        assert_eq!(classify_swipe(SWIPE_THRESHOLD, SWIPE_THRESHOLD), GestureAction::SnapBack);
        assert_eq!(classify_swipe(-SWIPE_THRESHOLD, SWIPE_THRESHOLD), GestureAction::SnapBack);
        assert_eq!(classify_swipe(SWIPE_THRESHOLD + 0.5, SWIPE_THRESHOLD), GestureAction::ToggleComplete);
        assert_eq!(classify_swipe(-SWIPE_THRESHOLD - 0.5, SWIPE_THRESHOLD), GestureAction::Delete);
    }

    #[test]
    fn drag_right_toggles_and_left_deletes() {
        let start = Instant::now();
        let mut swipe = tracker();
        swipe.press(2, 100.0, start);
        swipe.drag(150.0);
        assert_eq!(swipe.offset(), Some((2, 50.0)));
        assert_eq!(swipe.release(181.0), Some((2, GestureAction::ToggleComplete)));
        assert_eq!(swipe.offset(), None);

        swipe.press(0, 300.0, start);
        assert_eq!(swipe.release(200.0), Some((0, GestureAction::Delete)));
    }

    #[test]
    fn short_drag_snaps_back() {
        let mut swipe = tracker();
        swipe.press(1, 0.0, Instant::now());
        swipe.drag(60.0);
        assert_eq!(swipe.release(30.0), Some((1, GestureAction::SnapBack)));
    }

    #[test]
    fn long_press_edits_and_swallows_release() {
        let start = Instant::now();
        let mut swipe = tracker();
        swipe.press(4, 10.0, start);
        swipe.drag(14.0);
        assert_eq!(swipe.poll(start + Duration::from_millis(100)), None);
        assert_eq!(swipe.poll(start + LONG_PRESS_DELAY), Some((4, GestureAction::Edit)));
        assert_eq!(swipe.poll(start + LONG_PRESS_DELAY * 2), None);
        assert_eq!(swipe.release(200.0), None);
    }

    #[test]
    fn movement_cancels_long_press() {
        let start = Instant::now();
        let mut swipe = tracker();
        swipe.press(0, 0.0, start);
        swipe.drag(MOVE_TOLERANCE + 1.0);
        swipe.drag(0.0);
        assert_eq!(swipe.poll(start + LONG_PRESS_DELAY * 3), None);
        assert_eq!(swipe.release(0.0), Some((0, GestureAction::SnapBack)));
    }
}
