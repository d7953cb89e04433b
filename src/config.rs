// Tunables for the particle background, read from the JSON blob the page
// passes to `ParticleBackground::mount`. Every key is optional.

use serde::Deserialize;

use crate::error::EffectError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn from_name(name: &str) -> Option<Theme> {
        match name {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryMode {
    Bounce,
    Wrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerMode {
    Repel,
    Attract,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    /// Viewport pixels per particle.
    pub density: f64,
    pub min_particles: usize,
    pub max_particles: usize,
    /// Cruise speed range in pixels per 60 Hz frame.
    pub min_speed: f64,
    pub max_speed: f64,
    pub min_radius: f64,
    pub max_radius: f64,
    pub min_opacity: f64,
    pub max_opacity: f64,
    pub proximity_radius: f64,
    pub pointer_force: f64,
    pub pointer_mode: PointerMode,
    pub damping: f64,
    pub boundary: BoundaryMode,
    pub connection_distance: f64,
    pub line_opacity: f64,
    pub line_width: f64,
    pub glow: bool,
    pub trail_length: usize,
    pub cursor: bool,
    pub cursor_smoothing: f64,
    pub magnet_radius: f64,
    pub magnet_strength: f64,
    pub scan_interval_ms: f64,
    pub theme: Theme,
    pub profile: bool,
    pub seed: Option<u64>,
}

impl Default for EffectConfig {
    fn default() -> Self {
        EffectConfig {
            density: 15_000.0,
            min_particles: 20,
            max_particles: 80,
            min_speed: 0.1,
            max_speed: 0.5,
            min_radius: 1.0,
            max_radius: 3.0,
            min_opacity: 0.3,
            max_opacity: 0.8,
            proximity_radius: 120.0,
            pointer_force: 0.6,
            pointer_mode: PointerMode::Repel,
            damping: 0.95,
            boundary: BoundaryMode::Bounce,
            connection_distance: 120.0,
            line_opacity: 0.2,
            line_width: 1.0,
            glow: true,
            trail_length: 0,
            cursor: true,
            cursor_smoothing: 0.15,
            magnet_radius: 80.0,
            magnet_strength: 0.3,
            scan_interval_ms: 50.0,
            theme: Theme::Dark,
            profile: false,
            seed: None,
        }
    }
}

impl EffectConfig {
    /// Hard ceiling regardless of what the page asks for; the pair check is quadratic.
    pub const PARTICLE_CAP: usize = 150;
    pub const TRAIL_CAP: usize = 32;

    pub fn from_json(json: &str) -> Result<EffectConfig, EffectError> {
        if json.trim().is_empty() {
            return Ok(EffectConfig::default());
        }
        let config: EffectConfig = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Clamp every field into a range the simulation can work with.
    pub fn sanitized(mut self) -> EffectConfig {
        let defaults = EffectConfig::default();
        if !(self.density.is_finite() && self.density > 0.0) {
            self.density = defaults.density;
        }
        self.max_particles = self.max_particles.min(Self::PARTICLE_CAP);
        self.min_particles = self.min_particles.min(self.max_particles);

        self.min_speed = finite_or(self.min_speed, defaults.min_speed).max(0.0);
        self.max_speed = finite_or(self.max_speed, defaults.max_speed).max(self.min_speed);
        self.min_radius = finite_or(self.min_radius, defaults.min_radius).max(0.1);
        self.max_radius = finite_or(self.max_radius, defaults.max_radius).max(self.min_radius);
        self.min_opacity = finite_or(self.min_opacity, defaults.min_opacity).clamp(0.0, 1.0);
        self.max_opacity = finite_or(self.max_opacity, defaults.max_opacity).clamp(self.min_opacity, 1.0);

        self.proximity_radius = finite_or(self.proximity_radius, defaults.proximity_radius).max(0.0);
        self.pointer_force = finite_or(self.pointer_force, defaults.pointer_force).max(0.0);
        self.damping = finite_or(self.damping, defaults.damping).clamp(0.0, 1.0);
        self.connection_distance =
            finite_or(self.connection_distance, defaults.connection_distance).max(0.0);
        self.line_opacity = finite_or(self.line_opacity, defaults.line_opacity).clamp(0.0, 1.0);
        self.line_width = finite_or(self.line_width, defaults.line_width).max(0.1);
        self.trail_length = self.trail_length.min(Self::TRAIL_CAP);

        self.cursor_smoothing = finite_or(self.cursor_smoothing, defaults.cursor_smoothing).clamp(0.01, 1.0);
        self.magnet_radius = finite_or(self.magnet_radius, defaults.magnet_radius).max(0.0);
        self.magnet_strength = finite_or(self.magnet_strength, defaults.magnet_strength).clamp(0.0, 1.0);
        self.scan_interval_ms = finite_or(self.scan_interval_ms, defaults.scan_interval_ms).max(0.0);
        self
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}
