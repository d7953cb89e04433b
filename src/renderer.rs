// Renderer that turns the particle field and cursor into surface draw calls.
// Connection lines go underneath, then trails, particles and the cursor on top.

use crate::color;
use crate::config::Theme;
use crate::cursor::{CustomCursor, DOT_RADIUS};
use crate::field::ParticleField;
use crate::surface::Surface;

/// What the last frame drew, mostly for profiling output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub particles: usize,
    pub lines: usize,
    pub trail_dots: usize,
}

pub struct Renderer {
    glow_scale: f64,
    glow_opacity: f64,
}

impl Renderer {
    pub const GLOW_SCALE: f64 = 3.0;
    pub const GLOW_OPACITY: f64 = 0.35;

    pub fn new() -> Self {
        Renderer {
            glow_scale: Self::GLOW_SCALE,
            glow_opacity: Self::GLOW_OPACITY,
        }
    }

    pub fn render<S: Surface>(
        &self,
        surface: &mut S,
        field: &ParticleField,
        cursor: Option<&CustomCursor>,
    ) -> FrameStats {
        let mut stats = FrameStats::default();
        let config = field.config();
        let theme = field.theme();
        let particles = field.particles();

        surface.clear();

        let line_color = color::line_color(theme);
        field.for_each_connection(|i, j, opacity| {
            let color = line_color.mixed(particles[i].color).mixed(particles[j].color);
            surface.line(particles[i].pos, particles[j].pos, color, opacity, config.line_width);
            stats.lines += 1;
        });

        for particle in particles {
            let len = particle.trail_len();
            for (age, pos) in particle.trail().enumerate() {
                // Oldest entries are the faintest and smallest
                let fade = (age + 1) as f64 / (len + 1) as f64;
                surface.fill_circle(*pos, particle.radius * fade, particle.color, particle.opacity * fade * 0.5);
                stats.trail_dots += 1;
            }
        }

        for particle in particles {
            if config.glow {
                surface.fill_glow(
                    particle.pos,
                    particle.radius * self.glow_scale,
                    particle.color,
                    particle.opacity * self.glow_opacity,
                );
            }
            surface.fill_circle(particle.pos, particle.radius, particle.color, particle.opacity);
            stats.particles += 1;
        }

        if let Some(cursor) = cursor.filter(|c| c.is_visible()) {
            self.render_cursor(surface, cursor, theme);
        }

        log::trace!("frame: {:?}", stats);
        stats
    }

    fn render_cursor<S: Surface>(&self, surface: &mut S, cursor: &CustomCursor, theme: Theme) {
        let color = color::cursor_color(theme);
        surface.stroke_circle(cursor.ring(), cursor.ring_radius(), color, 0.6, 1.5);
        surface.fill_circle(cursor.dot(), DOT_RADIUS, color, 1.0);
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer::new()
    }
}
