// Particle struct to keep track of individual position, velocity and look,
// plus an optional bounded history of past positions for trails

use std::collections::VecDeque;

use crate::color::Color;

#[derive(Clone, Debug)]
pub struct Particle {
    pub pos: [f64; 2],
    pub vel: [f64; 2],
    pub radius: f64,
    pub color: Color,
    pub opacity: f64,
    // Speed the particle drifts at when nothing pushes it; damping only
    // kicks in above this
    pub cruise_speed: f64,
    trail: VecDeque<[f64; 2]>,
    trail_length: usize,
}

impl Particle {
    pub fn new(pos: [f64; 2], vel: [f64; 2], radius: f64, color: Color, opacity: f64) -> Particle {
        let cruise_speed = vecmath::vec2_len(vel);
        Particle {
            pos,
            vel,
            radius,
            color,
            opacity,
            cruise_speed,
            trail: VecDeque::new(),
            trail_length: 0,
        }
    }

    pub fn with_trail(mut self, trail_length: usize) -> Particle {
        self.trail_length = trail_length;
        self.trail = VecDeque::with_capacity(trail_length);
        self
    }

    pub fn speed(&self) -> f64 {
        vecmath::vec2_len(self.vel)
    }

    // Remember the current position before it moves, dropping the oldest
    // entry once the trail is full
    pub fn record_trail(&mut self) {
        if self.trail_length == 0 {
            return;
        }
        if self.trail.len() == self.trail_length {
            self.trail.pop_front();
        }
        self.trail.push_back(self.pos);
    }

    pub fn clear_trail(&mut self) {
        self.trail.clear();
    }

    /// Past positions, oldest first.
    pub fn trail(&self) -> impl Iterator<Item = &[f64; 2]> + '_ {
        self.trail.iter()
    }

    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }
}
