//! Session state and round types
//!
//! Everything the round controller mutates lives here.

use glam::Vec2;

use crate::consts::*;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Title screen, waiting for start
    Menu,
    /// Countdown running, target clickable
    Playing,
    /// Countdown suspended
    Paused,
    /// Time ran out
    Ended,
}

/// Target shape variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetShape {
    Circle,
    Square,
}

/// Two-stop gradients a target can be painted with
pub const TARGET_PALETTES: [[&str; 2]; 7] = [
    ["#FF6B6B", "#4ECDC4"], // Red to Cyan
    ["#A8E6CF", "#FFD93D"], // Green to Yellow
    ["#FF8A80", "#82B1FF"], // Pink to Blue
    ["#FFAB40", "#AB47BC"], // Orange to Purple
    ["#26C6DA", "#7C4DFF"], // Cyan to Purple
    ["#66BB6A", "#42A5F5"], // Green to Blue
    ["#FFA726", "#EC407A"], // Orange to Pink
];

/// The thing to click. Position is the center, relative to the play area origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub id: u64,
    pub pos: Vec2,
    /// Edge length / diameter (px)
    pub size: f32,
    pub shape: TargetShape,
    /// Index into `TARGET_PALETTES`
    pub palette: usize,
    /// Session clock time the target appeared (ms)
    pub spawned_at_ms: f64,
}

impl Target {
    /// Whether a point (play area coords) lands on the target
    pub fn contains(&self, point: Vec2) -> bool {
        let half = self.size / 2.0;
        let d = point - self.pos;
        match self.shape {
            TargetShape::Circle => d.length_squared() <= half * half,
            TargetShape::Square => d.x.abs() <= half && d.y.abs() <= half,
        }
    }

    /// Axis-aligned bounds as (min, max)
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let half = Vec2::splat(self.size / 2.0);
        (self.pos - half, self.pos + half)
    }

    pub fn palette_colors(&self) -> [&'static str; 2] {
        TARGET_PALETTES[self.palette % TARGET_PALETTES.len()]
    }
}

/// Measured play area size (px). Absent until laid out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayArea {
    pub width: f32,
    pub height: f32,
}

impl PlayArea {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A zero or negative box means layout hasn't happened yet
    pub fn is_measurable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Time allowed for a round at the given score
pub fn round_budget_ms(score: u32) -> u32 {
    INITIAL_ROUND_BUDGET_MS
        .saturating_sub(score.saturating_mul(BUDGET_DECAY_PER_POINT_MS))
        .max(MIN_ROUND_BUDGET_MS)
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    pub phase: GamePhase,
    pub score: u32,
    /// Countdown remaining for the current round (ms)
    pub time_left_ms: u32,
    /// Budget the current round started with (ms)
    pub max_time_ms: u32,
    pub target: Option<Target>,
    /// Current target already clicked, next one pending
    pub target_hit: bool,
    /// Session clock time of the hit (ms), drives the removal animation
    pub hit_at_ms: Option<f64>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self {
            phase: GamePhase::Menu,
            score: 0,
            time_left_ms: INITIAL_ROUND_BUDGET_MS,
            max_time_ms: INITIAL_ROUND_BUDGET_MS,
            target: None,
            target_hit: false,
            hit_at_ms: None,
        }
    }

    /// Remaining fraction of the round budget (1.0 = full)
    pub fn time_progress(&self) -> f32 {
        if self.max_time_ms == 0 {
            return 0.0;
        }
        self.time_left_ms as f32 / self.max_time_ms as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn target(shape: TargetShape) -> Target {
        Target {
            id: 1,
            pos: Vec2::new(100.0, 100.0),
            size: 60.0,
            shape,
            palette: 0,
            spawned_at_ms: 0.0,
        }
    }

    #[test]
    fn test_round_budget_values() {
        assert_eq!(round_budget_ms(0), 3000);
        assert_eq!(round_budget_ms(1), 2900);
        assert_eq!(round_budget_ms(21), 900);
        assert_eq!(round_budget_ms(22), 800);
        assert_eq!(round_budget_ms(1000), 800);
        assert_eq!(round_budget_ms(u32::MAX), 800);
    }

    #[test]
    fn test_circle_hit_test() {
        let t = target(TargetShape::Circle);
        assert!(t.contains(Vec2::new(100.0, 100.0)));
        assert!(t.contains(Vec2::new(130.0, 100.0)));
        // Corner of the bounding box is outside a circle
        assert!(!t.contains(Vec2::new(128.0, 128.0)));
    }

    #[test]
    fn test_square_hit_test() {
        let t = target(TargetShape::Square);
        assert!(t.contains(Vec2::new(128.0, 128.0)));
        assert!(!t.contains(Vec2::new(131.0, 100.0)));
    }

    #[test]
    fn test_time_progress() {
        let mut s = GameState::new();
        assert_eq!(s.time_progress(), 1.0);
        s.time_left_ms = 1500;
        assert_eq!(s.time_progress(), 0.5);
    }

    proptest! {
        #[test]
        fn prop_budget_non_increasing(score in 0u32..10_000) {
            let now = round_budget_ms(score);
            let next = round_budget_ms(score + 1);
            prop_assert!(next <= now);
            prop_assert!(next >= MIN_ROUND_BUDGET_MS);
            prop_assert_eq!(now, 3000u32.saturating_sub(100 * score).max(800));
        }
    }
}
