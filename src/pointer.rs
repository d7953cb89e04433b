// Pointer position plus the throttled scan of interactive elements (links,
// buttons) used for hover detection and the magnetic cursor pull.

use vecmath::Vector2;

/// Where the pointer is parked while it is outside the document.
pub const OFFSCREEN: Vector2<f64> = [-10_000.0, -10_000.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub x: f64,
    pub y: f64,
}

impl PointerState {
    pub fn at(x: f64, y: f64) -> PointerState {
        PointerState { x, y }
    }

    pub fn absent() -> PointerState {
        PointerState {
            x: OFFSCREEN[0],
            y: OFFSCREEN[1],
        }
    }

    pub fn is_present(&self) -> bool {
        [self.x, self.y] != OFFSCREEN
    }

    /// `None` while parked at the sentinel.
    pub fn position(&self) -> Option<Vector2<f64>> {
        if self.is_present() {
            Some([self.x, self.y])
        } else {
            None
        }
    }
}

impl Default for PointerState {
    fn default() -> Self {
        PointerState::absent()
    }
}

/// Viewport-relative bounding box of an interactive element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Rect {
        Rect { x, y, width, height }
    }

    pub fn contains(&self, pos: Vector2<f64>) -> bool {
        pos[0] >= self.x
            && pos[0] <= self.x + self.width
            && pos[1] >= self.y
            && pos[1] <= self.y + self.height
    }

    pub fn center(&self) -> Vector2<f64> {
        [self.x + self.width / 2.0, self.y + self.height / 2.0]
    }
}

/// Lets a caller run something at most once per interval.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval_ms: f64,
    last_ms: Option<f64>,
}

impl Throttle {
    pub fn new(interval_ms: f64) -> Throttle {
        Throttle {
            interval_ms,
            last_ms: None,
        }
    }

    pub fn ready(&mut self, now_ms: f64) -> bool {
        match self.last_ms {
            Some(last) if now_ms - last < self.interval_ms => false,
            _ => {
                self.last_ms = Some(now_ms);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

pub struct PointerTracker {
    state: PointerState,
    targets: Vec<Rect>,
    scan: Throttle,
    scans: usize,
}

impl PointerTracker {
    pub fn new(scan_interval_ms: f64) -> PointerTracker {
        PointerTracker {
            state: PointerState::absent(),
            targets: Vec::new(),
            scan: Throttle::new(scan_interval_ms),
            scans: 0,
        }
    }

    pub fn state(&self) -> PointerState {
        self.state
    }

    pub fn on_move(&mut self, x: f64, y: f64) {
        if x.is_finite() && y.is_finite() {
            self.state = PointerState::at(x, y);
        }
    }

    pub fn on_leave(&mut self) {
        self.state = PointerState::absent();
    }

    /// Refresh the cached interactive rects, at most once per scan interval.
    /// `scan` is only called when the throttle allows it.
    pub fn refresh_targets(&mut self, now_ms: f64, scan: impl FnOnce() -> Vec<Rect>) -> bool {
        if !self.state.is_present() || !self.scan.ready(now_ms) {
            return false;
        }
        self.targets = scan();
        self.scans += 1;
        true
    }

    /// Throw away cached rects, e.g. after a resize moved everything.
    pub fn invalidate_targets(&mut self) {
        self.targets.clear();
        self.scan.reset();
    }

    pub fn scan_count(&self) -> usize {
        self.scans
    }

    pub fn targets(&self) -> &[Rect] {
        &self.targets
    }

    pub fn over_interactive(&self) -> bool {
        match self.state.position() {
            Some(pos) => self.targets.iter().any(|rect| rect.contains(pos)),
            None => false,
        }
    }

    /// Center of the closest interactive element within `radius` of the pointer.
    pub fn nearest_target(&self, radius: f64) -> Option<Vector2<f64>> {
        let pos = self.state.position()?;
        self.targets
            .iter()
            .map(|rect| {
                let center = rect.center();
                (center, vecmath::vec2_len(vecmath::vec2_sub(center, pos)))
            })
            .filter(|(_, dist)| *dist <= radius)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(center, _)| center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_absent_and_leave_resets() {
        let mut tracker = PointerTracker::new(50.0);
        assert!(!tracker.state().is_present());
        tracker.on_move(12.0, 34.0);
        assert_eq!(tracker.state().position(), Some([12.0, 34.0]));
        tracker.on_leave();
        assert_eq!(tracker.state(), PointerState::absent());
        assert_eq!(tracker.state().position(), None);
    }

    #[test]
    fn non_finite_moves_are_ignored() {
        let mut tracker = PointerTracker::new(50.0);
        tracker.on_move(5.0, 5.0);
        tracker.on_move(f64::NAN, 1.0);
        assert_eq!(tracker.state(), PointerState::at(5.0, 5.0));
    }

    #[test]
    fn scan_is_throttled() {
        let mut tracker = PointerTracker::new(50.0);
        tracker.on_move(1.0, 1.0);
        let mut calls = 0;
        for t in 0..100 {
            // a move event every 4 ms
            tracker.refresh_targets(t as f64 * 4.0, || {
                calls += 1;
                Vec::new()
            });
        }
        // 0..396 ms at a 50 ms interval
        assert_eq!(calls, 8);
        assert_eq!(tracker.scan_count(), 8);
    }

    #[test]
    fn no_scan_while_pointer_absent() {
        let mut tracker = PointerTracker::new(0.0);
        assert!(!tracker.refresh_targets(0.0, || panic!("scanned without a pointer")));
    }

    #[test]
    fn hover_detection_uses_cached_rects() {
        let mut tracker = PointerTracker::new(50.0);
        tracker.on_move(15.0, 15.0);
        tracker.refresh_targets(0.0, || vec![Rect::new(10.0, 10.0, 20.0, 20.0)]);
        assert!(tracker.over_interactive());
        tracker.on_move(100.0, 100.0);
        assert!(!tracker.over_interactive());
        tracker.on_leave();
        assert!(!tracker.over_interactive());
    }

    #[test]
    fn nearest_target_picks_closest_within_radius() {
        let mut tracker = PointerTracker::new(0.0);
        tracker.on_move(0.0, 0.0);
        tracker.refresh_targets(0.0, || {
            vec![
                Rect::new(40.0, -10.0, 20.0, 20.0),
                Rect::new(10.0, -10.0, 20.0, 20.0),
                Rect::new(500.0, 500.0, 20.0, 20.0),
            ]
        });
        assert_eq!(tracker.nearest_target(80.0), Some([20.0, 0.0]));
        assert_eq!(tracker.nearest_target(5.0), None);
    }

    #[test]
    fn invalidate_allows_immediate_rescan() {
        let mut tracker = PointerTracker::new(1_000.0);
        tracker.on_move(1.0, 1.0);
        assert!(tracker.refresh_targets(0.0, Vec::new));
        assert!(!tracker.refresh_targets(10.0, Vec::new));
        tracker.invalidate_targets();
        assert!(tracker.refresh_targets(20.0, Vec::new));
    }
}
