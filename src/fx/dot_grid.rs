//! Ambient dot grid
//!
//! A lattice of dots covering the viewport that lights up near the pointer and
//! gets knocked outward by click shockwaves, then springs back to rest.
//! One `tick` per display frame; all forces are per-tick, not per-second.

use glam::Vec2;

use crate::consts::SHOCKWAVE_LIFETIME_MS;
use crate::settings::DotGridConfig;

/// Per-tick exponential smoothing factor for activation
pub const ACTIVATION_SMOOTHING: f32 = 0.1;
/// Per-tick velocity multiplier
pub const VELOCITY_DAMPING: f32 = 0.95;
/// Dots above this activation draw in the active color with a glow
pub const ACTIVE_THRESHOLD: f32 = 0.1;

/// One lattice point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridDot {
    pub rest: Vec2,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Smoothed activation in [0, 1]
    pub intensity: f32,
}

impl GridDot {
    pub fn new(rest: Vec2) -> Self {
        Self {
            rest,
            pos: rest,
            vel: Vec2::ZERO,
            intensity: 0.0,
        }
    }

    pub fn displacement(&self) -> f32 {
        self.pos.distance(self.rest)
    }

    pub fn is_active(&self) -> bool {
        self.intensity > ACTIVE_THRESHOLD
    }
}

/// A click shockwave
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shockwave {
    pub origin: Vec2,
    pub born_ms: f64,
}

impl Shockwave {
    /// Remaining strength factor in [0, 1]
    pub fn age_factor(&self, now_ms: f64) -> f32 {
        (1.0 - (now_ms - self.born_ms) / SHOCKWAVE_LIFETIME_MS).max(0.0) as f32
    }

    pub fn is_expired(&self, now_ms: f64) -> bool {
        now_ms - self.born_ms >= SHOCKWAVE_LIFETIME_MS
    }
}

/// Visual parameters for one dot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotAppearance {
    pub radius: f32,
    pub alpha: f32,
    /// Active color + glow instead of the base color
    pub active: bool,
}

/// The grid simulation
#[derive(Debug, Clone)]
pub struct DotGrid {
    dots: Vec<GridDot>,
    shocks: Vec<Shockwave>,
    pointer: Option<Vec2>,
    size: Vec2,
    gap: f32,
    impulses: bool,
    config: DotGridConfig,
}

impl DotGrid {
    pub fn new(config: DotGridConfig) -> Self {
        let gap = config.gap;
        Self {
            dots: Vec::new(),
            shocks: Vec::new(),
            pointer: None,
            size: Vec2::ZERO,
            gap,
            impulses: true,
            config,
        }
    }

    pub fn config(&self) -> &DotGridConfig {
        &self.config
    }

    /// Override the lattice spacing (quality presets); takes effect on the next resize
    pub fn set_gap(&mut self, gap: f32) {
        self.gap = gap.max(1.0);
    }

    /// Turn shock impulses on/off (reduced motion keeps the glow only)
    pub fn set_impulses(&mut self, enabled: bool) {
        self.impulses = enabled;
    }

    /// Rebuild the lattice for a new surface size
    pub fn resize(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width.max(0.0), height.max(0.0));
        let cols = (self.size.x / self.gap).floor() as usize;
        let rows = (self.size.y / self.gap).floor() as usize;

        self.dots.clear();
        self.dots.reserve(cols * rows);
        for i in 0..cols {
            for j in 0..rows {
                let rest = Vec2::new(
                    i as f32 * self.gap + self.gap / 2.0,
                    j as f32 * self.gap + self.gap / 2.0,
                );
                self.dots.push(GridDot::new(rest));
            }
        }
        log::debug!("Dot grid rebuilt: {}x{} ({} dots)", cols, rows, self.dots.len());
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn dots(&self) -> &[GridDot] {
        &self.dots
    }

    pub fn shocks(&self) -> &[Shockwave] {
        &self.shocks
    }

    pub fn set_pointer(&mut self, pos: Vec2) {
        self.pointer = Some(pos);
    }

    pub fn clear_pointer(&mut self) {
        self.pointer = None;
    }

    /// Start a shockwave at `pos`
    pub fn click(&mut self, pos: Vec2, now_ms: f64) {
        self.shocks.retain(|s| !s.is_expired(now_ms));
        self.shocks.push(Shockwave {
            origin: pos,
            born_ms: now_ms,
        });
    }

    /// Advance one frame
    pub fn tick(&mut self, now_ms: f64) {
        self.shocks.retain(|s| !s.is_expired(now_ms));

        let proximity = self.config.proximity;
        let shock_radius = self.config.shock_radius;
        let shock_strength = self.config.shock_strength;
        let resistance = self.config.resistance.max(f32::EPSILON);

        for dot in self.dots.iter_mut() {
            let mut target = match self.pointer {
                Some(pointer) if proximity > 0.0 => {
                    (1.0 - pointer.distance(dot.pos) / proximity).max(0.0)
                }
                _ => 0.0,
            };

            for shock in &self.shocks {
                let dist = dot.rest.distance(shock.origin);
                if dist >= shock_radius {
                    continue;
                }
                let age = shock.age_factor(now_ms);
                let effect = (1.0 - dist / shock_radius).max(0.0) * age;
                target = target.max(effect);

                if self.impulses {
                    let dir = (dot.rest - shock.origin).normalize_or_zero();
                    dot.vel += dir * effect * shock_strength * age;
                }
            }

            dot.intensity += (target - dot.intensity) * ACTIVATION_SMOOTHING;

            dot.vel += (dot.rest - dot.pos) / resistance;
            dot.vel *= VELOCITY_DAMPING;
            dot.pos += dot.vel;
        }
    }

    /// Size/opacity/color choice for a dot
    pub fn appearance(&self, dot: &GridDot) -> DotAppearance {
        let diameter = self.config.dot_size * (0.5 + dot.intensity * 0.5);
        DotAppearance {
            radius: diameter / 2.0,
            alpha: 0.3 + dot.intensity * 0.7,
            active: dot.is_active(),
        }
    }
}
