//! Reaction Speed - click the target before the clock runs out
//!
//! Core modules:
//! - `sim`: Round/session state machine, target generation, timer queue
//! - `fx`: Cosmetic simulations (click sparks, ambient dot grid)
//! - `leaderboard`: Top-10 score list persisted to LocalStorage
//! - `persistence`: Key-value storage abstraction (LocalStorage / in-memory)
//! - `renderer`: WebGPU rendering pipeline
//! - `settings`: Player preferences and effect tuning

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod fx;
pub mod leaderboard;
pub mod persistence;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use leaderboard::{Leaderboard, ScoreRecord};
pub use settings::{QualityPreset, Settings};

/// Game configuration constants
pub mod consts {
    /// Round budget when a session starts (ms)
    pub const INITIAL_ROUND_BUDGET_MS: u32 = 3000;
    /// Budget never drops below this (ms)
    pub const MIN_ROUND_BUDGET_MS: u32 = 800;
    /// Budget lost per point scored (ms)
    pub const BUDGET_DECAY_PER_POINT_MS: u32 = 100;
    /// Countdown step interval (ms)
    pub const COUNTDOWN_TICK_MS: u32 = 50;
    /// Delay between a hit and the next target (ms)
    pub const NEXT_TARGET_DELAY_MS: u32 = 300;
    /// Grid shockwave lifetime (ms)
    pub const SHOCKWAVE_LIFETIME_MS: f64 = 1000.0;

    /// Target size range (px)
    pub const TARGET_MIN_SIZE: f32 = 40.0;
    pub const TARGET_MAX_SIZE: f32 = 80.0;
    /// Extra inset beyond half the target size (px)
    pub const TARGET_MARGIN: f32 = 20.0;

    /// Placement used before the play area has been laid out
    pub const FALLBACK_TARGET_X: f32 = 300.0;
    pub const FALLBACK_TARGET_Y: f32 = 200.0;
    pub const FALLBACK_TARGET_SIZE: f32 = 60.0;

    /// Play area layout (px)
    pub const PLAY_AREA_HEIGHT: f32 = 500.0;
    pub const PLAY_AREA_MAX_WIDTH: f32 = 896.0;
    pub const PLAY_AREA_TOP: f32 = 96.0;
    pub const PLAY_AREA_SIDE_PADDING: f32 = 16.0;

    /// Target spawn / hit animation durations (ms)
    pub const TARGET_SPAWN_ANIM_MS: f64 = 500.0;
    pub const TARGET_HIT_ANIM_MS: f64 = 300.0;
    /// Target glow pulse period (ms)
    pub const TARGET_GLOW_PERIOD_MS: f64 = 1500.0;
}

/// Parse a `#rrggbb` or `#rgb` hex color into RGBA components (0-1).
///
/// Returns `None` for anything else, callers pick their own fallback.
pub fn parse_hex_color(hex: &str) -> Option<[f32; 4]> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if !digits.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0);

    match digits.len() {
        6 => Some([
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
            1.0,
        ]),
        3 => {
            let expand = |i: usize| {
                let c = &digits[i..i + 1];
                channel(&format!("{c}{c}"))
            };
            Some([expand(0)?, expand(1)?, expand(2)?, 1.0])
        }
        _ => None,
    }
}

/// Linear blend between two colors
#[inline]
pub fn mix_color(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    let t = t.clamp(0.0, 1.0);
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

/// Same color with a different alpha
#[inline]
pub fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], alpha]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        let c = parse_hex_color("#5227FF").unwrap();
        assert!((c[0] - 0x52 as f32 / 255.0).abs() < 1e-6);
        assert!((c[1] - 0x27 as f32 / 255.0).abs() < 1e-6);
        assert_eq!(c[2], 1.0);
        assert_eq!(c[3], 1.0);

        assert_eq!(parse_hex_color("#fff"), Some([1.0, 1.0, 1.0, 1.0]));
        assert_eq!(parse_hex_color("#12345"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn test_mix_color_clamps() {
        let black = [0.0, 0.0, 0.0, 1.0];
        let white = [1.0, 1.0, 1.0, 1.0];
        assert_eq!(mix_color(black, white, 2.0), white);
        assert_eq!(mix_color(black, white, -1.0), black);
        assert_eq!(mix_color(black, white, 0.5)[0], 0.5);
    }
}
