// The particle set and its per-frame physics.
//
// The set is always rebuilt from scratch when the viewport or theme changes;
// particle count is a function of viewport area only.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use vecmath::Vector2;

use crate::color;
use crate::config::{BoundaryMode, EffectConfig, PointerMode, Theme};
use crate::particle::Particle;
use crate::pointer::PointerState;
use crate::surface::Viewport;

/// Largest frame step integrated at once, in 60 Hz frames. A tab coming back
/// from the background reports a huge delta otherwise.
pub const MAX_FRAME_STEP: f64 = 4.0;
/// Hard velocity ceiling as a multiple of the configured cruise maximum.
pub const SPEED_LIMIT_FACTOR: f64 = 10.0;

/// Number of particles for a viewport: one per `density` pixels, clamped.
pub fn particle_count(viewport: Viewport, config: &EffectConfig) -> usize {
    let raw = (viewport.area() / config.density).floor() as usize;
    raw.max(config.min_particles).min(config.max_particles)
}

pub struct ParticleField {
    config: EffectConfig,
    viewport: Viewport,
    theme: Theme,
    particles: Vec<Particle>,
    rng: SmallRng,
}

impl ParticleField {
    pub fn new(viewport: Viewport, config: &EffectConfig) -> ParticleField {
        let config = config.clone().sanitized();
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let mut field = ParticleField {
            theme: config.theme,
            config,
            viewport,
            particles: Vec::new(),
            rng,
        };
        field.initialize();
        field
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.initialize();
    }

    pub fn set_theme(&mut self, theme: Theme) {
        if theme == self.theme {
            return;
        }
        self.theme = theme;
        self.initialize();
    }

    // Throw away the whole set and spawn a fresh batch for the current
    // viewport and palette
    fn initialize(&mut self) {
        let count = particle_count(self.viewport, &self.config);
        let palette = color::palette(self.theme);
        let config = &self.config;
        let rng = &mut self.rng;

        let mut particles = Vec::with_capacity(count);
        for _ in 0..count {
            let pos = [
                rng.gen::<f64>() * self.viewport.width,
                rng.gen::<f64>() * self.viewport.height,
            ];
            let angle = rng.gen::<f64>() * std::f64::consts::TAU;
            let speed = lerp(config.min_speed, config.max_speed, rng.gen::<f64>());
            let vel = [angle.cos() * speed, angle.sin() * speed];
            let radius = lerp(config.min_radius, config.max_radius, rng.gen::<f64>());
            let opacity = lerp(config.min_opacity, config.max_opacity, rng.gen::<f64>());
            let color = palette[rng.gen_range(0, palette.len())];
            particles.push(Particle::new(pos, vel, radius, color, opacity).with_trail(config.trail_length));
        }
        log::debug!(
            "particle field: {} particles for {}x{}",
            count,
            self.viewport.width,
            self.viewport.height
        );
        self.particles = particles;
    }

    /// Advance every particle by `frames` 60 Hz frames.
    pub fn step(&mut self, pointer: &PointerState, frames: f64) {
        let frames = if frames.is_finite() { frames.clamp(0.0, MAX_FRAME_STEP) } else { 0.0 };
        if frames == 0.0 {
            return;
        }
        let config = &self.config;
        let viewport = self.viewport;
        let speed_limit = config.max_speed * SPEED_LIMIT_FACTOR;
        let damping = config.damping.powf(frames);

        for particle in &mut self.particles {
            particle.record_trail();

            particle.pos = vecmath::vec2_add(particle.pos, vecmath::vec2_scale(particle.vel, frames));

            if let Some(push) = pointer_push(particle.pos, pointer, config) {
                particle.vel = vecmath::vec2_add(particle.vel, vecmath::vec2_scale(push, frames));
            }

            // Excess speed above cruise decays, cruise itself is kept
            let speed = particle.speed();
            if speed > particle.cruise_speed {
                let damped = particle.cruise_speed + (speed - particle.cruise_speed) * damping;
                let target = damped.min(speed_limit);
                particle.vel = vecmath::vec2_scale(particle.vel, target / speed);
            }

            match config.boundary {
                BoundaryMode::Bounce => bounce(particle, viewport),
                BoundaryMode::Wrap => wrap(particle, viewport),
            }

            if !(particle.pos[0].is_finite() && particle.pos[1].is_finite()) {
                particle.pos = [viewport.width / 2.0, viewport.height / 2.0];
                particle.vel = [0.0, 0.0];
                particle.clear_trail();
            }
        }
    }

    /// Calls `f(i, j, opacity)` for every unordered pair closer than the
    /// connection distance. Opacity decays linearly to zero at that distance.
    pub fn for_each_connection(&self, mut f: impl FnMut(usize, usize, f64)) {
        let max_dist = self.config.connection_distance;
        if max_dist <= 0.0 {
            return;
        }
        let max_dist_sq = max_dist * max_dist;
        for i in 0..self.particles.len() {
            for j in (i + 1)..self.particles.len() {
                let delta = vecmath::vec2_sub(self.particles[i].pos, self.particles[j].pos);
                let dist_sq = vecmath::vec2_square_len(delta);
                if dist_sq < max_dist_sq {
                    let opacity = self.config.line_opacity * (1.0 - dist_sq.sqrt() / max_dist);
                    f(i, j, opacity);
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn set_particles(&mut self, particles: Vec<Particle>) {
        self.particles = particles;
    }
}

// Velocity change from the pointer, if the particle is inside its radius.
// Magnitude falls off linearly from `pointer_force` at the pointer to zero at
// the radius edge.
fn pointer_push(pos: Vector2<f64>, pointer: &PointerState, config: &EffectConfig) -> Option<Vector2<f64>> {
    let pointer_pos = pointer.position()?;
    let away = vecmath::vec2_sub(pos, pointer_pos);
    let dist = vecmath::vec2_len(away);
    if dist >= config.proximity_radius || dist <= f64::EPSILON {
        return None;
    }
    let strength = config.pointer_force * (1.0 - dist / config.proximity_radius);
    let dir = vecmath::vec2_scale(away, 1.0 / dist);
    let dir = match config.pointer_mode {
        PointerMode::Repel => dir,
        PointerMode::Attract => vecmath::vec2_neg(dir),
    };
    Some(vecmath::vec2_scale(dir, strength))
}

fn bounce(particle: &mut Particle, viewport: Viewport) {
    for axis in 0..2 {
        let max = if axis == 0 { viewport.width } else { viewport.height };
        if particle.pos[axis] < 0.0 {
            particle.pos[axis] = 0.0;
            particle.vel[axis] = particle.vel[axis].abs();
        } else if particle.pos[axis] > max {
            particle.pos[axis] = max;
            particle.vel[axis] = -particle.vel[axis].abs();
        }
    }
}

fn wrap(particle: &mut Particle, viewport: Viewport) {
    let mut wrapped = false;
    for axis in 0..2 {
        let max = if axis == 0 { viewport.width } else { viewport.height };
        let pos = particle.pos[axis];
        if max <= 0.0 {
            particle.pos[axis] = 0.0;
        } else if pos < 0.0 || pos > max {
            particle.pos[axis] = pos.rem_euclid(max);
            wrapped = true;
        }
    }
    // Otherwise the trail would streak across the whole screen
    if wrapped {
        particle.clear_trail();
    }
}

fn lerp(min: f64, max: f64, t: f64) -> f64 {
    min + (max - min) * t
}
