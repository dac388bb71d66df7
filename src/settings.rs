//! Game settings and preferences
//!
//! Persisted separately from the leaderboard in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::parse_hex_color;
use crate::persistence::{self, KeyValueStore, PersistenceError};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    /// Next preset in the Low -> Medium -> High cycle
    pub fn next(&self) -> Self {
        match self {
            QualityPreset::Low => QualityPreset::Medium,
            QualityPreset::Medium => QualityPreset::High,
            QualityPreset::High => QualityPreset::Low,
        }
    }

    /// Multiplier on the dot grid spacing (fewer dots on Low)
    pub fn grid_gap_scale(&self) -> f32 {
        match self {
            QualityPreset::Low => 1.6,
            QualityPreset::Medium => 1.0,
            QualityPreset::High => 1.0,
        }
    }

    /// Triangle segments used for round shapes
    pub fn circle_segments(&self) -> u32 {
        match self {
            QualityPreset::Low => 8,
            QualityPreset::Medium => 14,
            QualityPreset::High => 24,
        }
    }

    /// Whether to render glow halos
    pub fn glow_enabled(&self) -> bool {
        match self {
            QualityPreset::Low => false,
            QualityPreset::Medium => true,
            QualityPreset::High => true,
        }
    }
}

/// Ambient dot grid tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DotGridConfig {
    /// Dot diameter at full activation (px)
    pub dot_size: f32,
    /// Grid spacing (px)
    pub gap: f32,
    /// Resting color
    pub base_color: String,
    /// Color for dots above the activation threshold
    pub active_color: String,
    /// Pointer influence radius (px)
    pub proximity: f32,
    /// Click shockwave radius (px)
    pub shock_radius: f32,
    /// Outward impulse scale
    pub shock_strength: f32,
    /// Spring divisor, larger is softer
    pub resistance: f32,
}

impl Default for DotGridConfig {
    fn default() -> Self {
        Self {
            dot_size: 8.0,
            gap: 25.0,
            base_color: "#5227FF".to_string(),
            active_color: "#00ffff".to_string(),
            proximity: 100.0,
            shock_radius: 200.0,
            shock_strength: 3.0,
            resistance: 500.0,
        }
    }
}

impl DotGridConfig {
    pub fn base_rgba(&self) -> [f32; 4] {
        parse_hex_color(&self.base_color).unwrap_or([0.32, 0.15, 1.0, 1.0])
    }

    pub fn active_rgba(&self) -> [f32; 4] {
        parse_hex_color(&self.active_color).unwrap_or([0.0, 1.0, 1.0, 1.0])
    }
}

/// Target click spark tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SparkConfig {
    pub color: String,
    /// Spark diameter at birth (px)
    pub size: f32,
    /// Base travel distance (px), actual is in [radius, 1.5 * radius)
    pub radius: f32,
    /// Sparks per burst
    pub count: u32,
    /// Lifetime (ms)
    pub duration_ms: f64,
}

impl Default for SparkConfig {
    fn default() -> Self {
        Self {
            color: "#fff".to_string(),
            size: 10.0,
            radius: 15.0,
            count: 8,
            duration_ms: 400.0,
        }
    }
}

impl SparkConfig {
    pub fn rgba(&self) -> [f32; 4] {
        parse_hex_color(&self.color).unwrap_or([1.0; 4])
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Spark bursts on target hits
    pub particles: bool,
    /// Animated dot grid background
    pub background_grid: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Accessibility ===
    /// Reduced motion (no shock impulses, no target spin)
    pub reduced_motion: bool,

    // === Effect tuning ===
    pub grid: DotGridConfig,
    pub spark: SparkConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            particles: true,
            background_grid: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            reduced_motion: false,

            grid: DotGridConfig::default(),
            spark: SparkConfig::default(),
        }
    }
}

impl Settings {
    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;

        // Spark bursts only above Low
        self.particles = preset != QualityPreset::Low;
    }

    /// Step to the next quality preset, returning it
    pub fn cycle_quality(&mut self) -> QualityPreset {
        let preset = self.quality.next();
        self.apply_preset(preset);
        preset
    }

    /// Flip mute, returning the new state
    pub fn toggle_muted(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// Grid spacing after the quality preset is applied
    pub fn effective_grid_gap(&self) -> f32 {
        (self.grid.gap * self.quality.grid_gap_scale()).max(4.0)
    }

    /// Effective shock impulses (respects reduced_motion)
    pub fn effective_shock_impulse(&self) -> bool {
        !self.reduced_motion
    }

    /// Effective audio volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "reaction_speed_settings";

    /// Load settings, falling back to defaults when absent or unreadable
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match persistence::load_json(store, Self::STORAGE_KEY) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings from storage");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Settings unreadable, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Save settings
    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), PersistenceError> {
        persistence::save_json(store, Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}
