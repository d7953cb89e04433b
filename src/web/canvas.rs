// Canvas2D implementation of the drawing surface. The backing store is
// scaled by devicePixelRatio so particles stay crisp on HiDPI screens, while
// all drawing happens in CSS pixels.

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::color::Color;
use crate::error::{js_message, EffectError};
use crate::surface::{Surface, Viewport};

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    viewport: Viewport,
    pixel_ratio: f64,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement, pixel_ratio: f64) -> Result<Self, EffectError> {
        let context = canvas
            .get_context("2d")
            .map_err(|e| EffectError::SurfaceUnavailable(js_message(&e)))?
            .ok_or_else(|| EffectError::SurfaceUnavailable("2d context not supported".to_owned()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| EffectError::SurfaceUnavailable("unexpected context type".to_owned()))?;

        Ok(CanvasSurface {
            canvas,
            context,
            viewport: Viewport::new(0.0, 0.0),
            pixel_ratio: if pixel_ratio.is_finite() && pixel_ratio > 0.0 { pixel_ratio } else { 1.0 },
        })
    }

    fn circle_path(&self, center: [f64; 2], radius: f64) {
        self.context.begin_path();
        let _ = self
            .context
            .arc(center[0], center[1], radius.max(0.0), 0.0, std::f64::consts::TAU);
    }
}

impl Surface for CanvasSurface {
    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.canvas.set_width((viewport.width * self.pixel_ratio) as u32);
        self.canvas.set_height((viewport.height * self.pixel_ratio) as u32);
        let style = self.canvas.style();
        let _ = style.set_property("width", &format!("{}px", viewport.width));
        let _ = style.set_property("height", &format!("{}px", viewport.height));
        // Resetting the size wipes the transform, so set it again
        let _ = self
            .context
            .set_transform(self.pixel_ratio, 0.0, 0.0, self.pixel_ratio, 0.0, 0.0);
    }

    fn clear(&mut self) {
        self.context
            .clear_rect(0.0, 0.0, self.viewport.width, self.viewport.height);
    }

    fn fill_circle(&mut self, center: [f64; 2], radius: f64, color: Color, opacity: f64) {
        self.circle_path(center, radius);
        self.context.set_fill_style_str(&color.to_css(opacity));
        self.context.fill();
    }

    fn fill_glow(&mut self, center: [f64; 2], radius: f64, color: Color, opacity: f64) {
        let gradient = match self.context.create_radial_gradient(
            center[0], center[1], 0.0, center[0], center[1], radius.max(0.0),
        ) {
            Ok(gradient) => gradient,
            Err(_) => return,
        };
        let _ = gradient.add_color_stop(0.0, &color.to_css(opacity));
        let _ = gradient.add_color_stop(1.0, &color.to_css(0.0));
        self.circle_path(center, radius);
        self.context.set_fill_style_canvas_gradient(&gradient);
        self.context.fill();
    }

    fn stroke_circle(&mut self, center: [f64; 2], radius: f64, color: Color, opacity: f64, width: f64) {
        self.circle_path(center, radius);
        self.context.set_stroke_style_str(&color.to_css(opacity));
        self.context.set_line_width(width);
        self.context.stroke();
    }

    fn line(&mut self, from: [f64; 2], to: [f64; 2], color: Color, opacity: f64, width: f64) {
        self.context.begin_path();
        self.context.move_to(from[0], from[1]);
        self.context.line_to(to[0], to[1]);
        self.context.set_stroke_style_str(&color.to_css(opacity));
        self.context.set_line_width(width);
        self.context.stroke();
    }
}
