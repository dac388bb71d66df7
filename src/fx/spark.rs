//! Click-spark bursts
//!
//! A burst fires `count` sparks at equal angular steps around the click point.
//! Each travels outward to a random distance in [radius, 1.5 * radius) while
//! shrinking and fading to nothing over the configured duration.
//!
//! Sparks live in a fixed-size arena; expired slots are reused by later bursts.

use glam::Vec2;
use rand::Rng;

use super::easing::circ_out;
use crate::settings::SparkConfig;

/// Maximum concurrent sparks
pub const MAX_SPARKS: usize = 256;

/// One arena slot
#[derive(Debug, Clone, Copy, Default)]
pub struct Spark {
    pub active: bool,
    pub origin: Vec2,
    /// Travel direction (radians)
    pub angle: f32,
    /// Final travel distance (px)
    pub distance: f32,
    pub born_ms: f64,
}

/// Interpolated spark for drawing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SparkSample {
    pub pos: Vec2,
    /// Current diameter (px)
    pub size: f32,
    pub opacity: f32,
}

/// Arena of sparks shared by all bursts
#[derive(Debug, Clone)]
pub struct SparkField {
    slots: Vec<Spark>,
    config: SparkConfig,
}

impl SparkField {
    pub fn new(config: SparkConfig) -> Self {
        Self {
            slots: vec![Spark::default(); MAX_SPARKS],
            config,
        }
    }

    pub fn config(&self) -> &SparkConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SparkConfig) {
        self.config = config;
    }

    /// Fire a burst at `origin`. Returns the number of sparks placed.
    pub fn burst<R: Rng + ?Sized>(&mut self, rng: &mut R, origin: Vec2, now_ms: f64) -> usize {
        let count = (self.config.count as usize).min(MAX_SPARKS);
        if count == 0 {
            return 0;
        }

        self.expire(now_ms);
        let step = std::f32::consts::TAU / count as f32;
        let radius = self.config.radius;

        for i in 0..count {
            let slot = self.free_slot();
            self.slots[slot] = Spark {
                active: true,
                origin,
                angle: step * i as f32,
                distance: radius + rng.random::<f32>() * radius * 0.5,
                born_ms: now_ms,
            };
        }
        count
    }

    /// First inactive slot, or the oldest one when the arena is full
    fn free_slot(&self) -> usize {
        if let Some(i) = self.slots.iter().position(|s| !s.active) {
            return i;
        }
        self.slots
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.born_ms
                    .partial_cmp(&b.born_ms)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// Retire sparks whose animation has finished
    pub fn expire(&mut self, now_ms: f64) {
        let duration = self.config.duration_ms;
        for spark in self.slots.iter_mut().filter(|s| s.active) {
            if now_ms - spark.born_ms >= duration {
                spark.active = false;
            }
        }
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.active).count()
    }

    /// Sample a spark at `now_ms`, None once it has finished
    pub fn sample(&self, spark: &Spark, now_ms: f64) -> Option<SparkSample> {
        let duration = self.config.duration_ms;
        let age = now_ms - spark.born_ms;
        if !spark.active || age >= duration || duration <= 0.0 {
            return None;
        }

        let t = circ_out((age.max(0.0) / duration) as f32);
        let dir = Vec2::new(spark.angle.cos(), spark.angle.sin());
        Some(SparkSample {
            pos: spark.origin + dir * spark.distance * t,
            size: self.config.size * (1.0 - t),
            opacity: 1.0 - t,
        })
    }

    /// All live sparks at `now_ms`
    pub fn samples(&self, now_ms: f64) -> impl Iterator<Item = SparkSample> + '_ {
        self.slots.iter().filter_map(move |s| self.sample(s, now_ms))
    }

    pub fn clear(&mut self) {
        for spark in self.slots.iter_mut() {
            spark.active = false;
        }
    }
}
