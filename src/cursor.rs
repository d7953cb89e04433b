// Custom cursor: a dot pinned to the pointer and a ring that eases after it,
// grows over links and buttons and leans toward a nearby one.

use vecmath::Vector2;

use crate::config::EffectConfig;
use crate::pointer::PointerTracker;

pub const DOT_RADIUS: f64 = 3.0;
pub const RING_RADIUS: f64 = 16.0;
pub const HOVER_SCALE: f64 = 1.6;

#[derive(Debug, Clone)]
pub struct CustomCursor {
    dot: Vector2<f64>,
    ring: Vector2<f64>,
    ring_scale: f64,
    visible: bool,
}

impl CustomCursor {
    pub fn new() -> CustomCursor {
        CustomCursor {
            dot: [0.0, 0.0],
            ring: [0.0, 0.0],
            ring_scale: 1.0,
            visible: false,
        }
    }

    pub fn update(&mut self, tracker: &PointerTracker, config: &EffectConfig, frames: f64) {
        let pos = match tracker.state().position() {
            Some(pos) => pos,
            None => {
                self.visible = false;
                return;
            }
        };
        // Re-entering the page should not animate in from wherever the ring was
        if !self.visible {
            self.ring = pos;
            self.ring_scale = 1.0;
            self.visible = true;
        }
        self.dot = pos;

        let target = match tracker.nearest_target(config.magnet_radius) {
            Some(center) => vecmath::vec2_add(
                pos,
                vecmath::vec2_scale(vecmath::vec2_sub(center, pos), config.magnet_strength),
            ),
            None => pos,
        };
        // Frame-rate independent easing factor
        let t = 1.0 - (1.0 - config.cursor_smoothing).powf(frames.max(0.0));
        self.ring = vecmath::vec2_add(self.ring, vecmath::vec2_scale(vecmath::vec2_sub(target, self.ring), t));

        let target_scale = if tracker.over_interactive() { HOVER_SCALE } else { 1.0 };
        self.ring_scale += (target_scale - self.ring_scale) * t;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn dot(&self) -> Vector2<f64> {
        self.dot
    }

    pub fn ring(&self) -> Vector2<f64> {
        self.ring
    }

    pub fn ring_radius(&self) -> f64 {
        RING_RADIUS * self.ring_scale
    }
}

impl Default for CustomCursor {
    fn default() -> Self {
        CustomCursor::new()
    }
}
