// Drawing surface abstraction. The browser implementation wraps a
// `CanvasRenderingContext2d`; tests use a recorder.

use crate::color::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Viewport {
        Viewport {
            width: if width.is_finite() { width.max(0.0) } else { 0.0 },
            height: if height.is_finite() { height.max(0.0) } else { 0.0 },
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn contains(&self, pos: [f64; 2]) -> bool {
        pos[0] >= 0.0 && pos[0] <= self.width && pos[1] >= 0.0 && pos[1] <= self.height
    }
}

/// The handful of primitives the particle renderer needs.
pub trait Surface {
    /// Match the backing pixel buffer to the viewport.
    fn resize(&mut self, viewport: Viewport);
    fn clear(&mut self);
    fn fill_circle(&mut self, center: [f64; 2], radius: f64, color: Color, opacity: f64);
    /// Radial falloff from `opacity` at the center to transparent at `radius`.
    fn fill_glow(&mut self, center: [f64; 2], radius: f64, color: Color, opacity: f64);
    fn stroke_circle(&mut self, center: [f64; 2], radius: f64, color: Color, opacity: f64, width: f64);
    fn line(&mut self, from: [f64; 2], to: [f64; 2], color: Color, opacity: f64, width: f64);
}

#[cfg(test)]
pub(crate) mod recording {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum DrawCall {
        Resize(Viewport),
        Clear,
        Circle { center: [f64; 2], radius: f64, opacity: f64 },
        Glow { center: [f64; 2], radius: f64 },
        Ring { center: [f64; 2], radius: f64 },
        Line { from: [f64; 2], to: [f64; 2], opacity: f64 },
    }

    impl DrawCall {
        pub fn is_draw(&self) -> bool {
            !matches!(self, DrawCall::Resize(_))
        }
    }

    /// Records every call; clones share the same log.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingSurface {
        pub calls: Rc<RefCell<Vec<DrawCall>>>,
    }

    impl RecordingSurface {
        pub fn new() -> RecordingSurface {
            RecordingSurface::default()
        }

        pub fn draw_count(&self) -> usize {
            self.calls.borrow().iter().filter(|c| c.is_draw()).count()
        }

        pub fn lines(&self) -> Vec<DrawCall> {
            self.calls
                .borrow()
                .iter()
                .filter(|c| matches!(c, DrawCall::Line { .. }))
                .cloned()
                .collect()
        }

        pub fn count(&self, pred: impl Fn(&DrawCall) -> bool) -> usize {
            self.calls.borrow().iter().filter(|c| pred(c)).count()
        }

        pub fn reset(&self) {
            self.calls.borrow_mut().clear();
        }
    }

    impl Surface for RecordingSurface {
        fn resize(&mut self, viewport: Viewport) {
            self.calls.borrow_mut().push(DrawCall::Resize(viewport));
        }

        fn clear(&mut self) {
            self.calls.borrow_mut().push(DrawCall::Clear);
        }

        fn fill_circle(&mut self, center: [f64; 2], radius: f64, _color: Color, opacity: f64) {
            self.calls.borrow_mut().push(DrawCall::Circle { center, radius, opacity });
        }

        fn fill_glow(&mut self, center: [f64; 2], radius: f64, _color: Color, _opacity: f64) {
            self.calls.borrow_mut().push(DrawCall::Glow { center, radius });
        }

        fn stroke_circle(&mut self, center: [f64; 2], radius: f64, _color: Color, _opacity: f64, _width: f64) {
            self.calls.borrow_mut().push(DrawCall::Ring { center, radius });
        }

        fn line(&mut self, from: [f64; 2], to: [f64; 2], _color: Color, opacity: f64, _width: f64) {
            self.calls.borrow_mut().push(DrawCall::Line { from, to, opacity });
        }
    }
}
