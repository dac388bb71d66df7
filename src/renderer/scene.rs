//! Per-frame scene assembly
//!
//! Draw order: dot grid, play area panel, target, sparks. All coordinates are
//! CSS pixels relative to the top-left of the viewport.

use glam::Vec2;

use super::shapes;
use super::vertex::Vertex;
use crate::consts::*;
use crate::fx::easing::{back_out, ease_out, pulse};
use crate::fx::{DotGrid, SparkField};
use crate::settings::Settings;
use crate::sim::{GamePhase, GameState, PlayArea, Target, TargetShape};
use crate::{mix_color, parse_hex_color, with_alpha};

/// Corner radius of square targets at full scale (px)
const SQUARE_CORNER_RADIUS: f32 = 12.0;
/// Inner sheen opacity cycle (ms)
const TARGET_SHEEN_PERIOD_MS: f64 = 2000.0;
/// Glow band width range over one pulse (px)
const TARGET_GLOW_MIN: f32 = 20.0;
const TARGET_GLOW_MAX: f32 = 40.0;

/// Fixed scene colors
pub mod colors {
    /// Page background, hsl(220, 27%, 8%)
    pub const BACKGROUND: [f32; 4] = [0.058, 0.071, 0.102, 1.0];
    pub const PLAY_AREA: [f32; 4] = [0.09, 0.11, 0.16, 0.3];
    pub const PLAY_AREA_BORDER: [f32; 4] = [0.2, 0.23, 0.3, 1.0];
    /// Peak sheen over a target
    pub const TARGET_HIGHLIGHT: [f32; 4] = [1.0, 1.0, 1.0, 0.3];
}

/// Where the play area sits inside the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneLayout {
    pub viewport: Vec2,
    /// Top-left corner of the play area
    pub play_min: Vec2,
    pub play_size: Vec2,
}

impl SceneLayout {
    /// Lay out the play area for a viewport, None while the viewport has no size
    pub fn compute(viewport_width: f32, viewport_height: f32) -> Option<Self> {
        if viewport_width <= 0.0 || viewport_height <= 0.0 {
            return None;
        }
        let width = (viewport_width - 2.0 * PLAY_AREA_SIDE_PADDING).min(PLAY_AREA_MAX_WIDTH);
        if width <= 0.0 {
            return None;
        }
        Some(Self {
            viewport: Vec2::new(viewport_width, viewport_height),
            play_min: Vec2::new((viewport_width - width) / 2.0, PLAY_AREA_TOP),
            play_size: Vec2::new(width, PLAY_AREA_HEIGHT),
        })
    }

    pub fn play_area(&self) -> PlayArea {
        PlayArea::new(self.play_size.x, self.play_size.y)
    }

    pub fn play_max(&self) -> Vec2 {
        self.play_min + self.play_size
    }

    /// Viewport point to play area coordinates
    pub fn to_play_area(&self, point: Vec2) -> Vec2 {
        point - self.play_min
    }

    /// Play area point to viewport coordinates
    pub fn to_viewport(&self, point: Vec2) -> Vec2 {
        point + self.play_min
    }
}

/// How a target looks at a given instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetPose {
    pub scale: f32,
    /// Radians
    pub rotation: f32,
    /// Glow cycle position in [0, 1]
    pub glow: f32,
}

/// Spawn pop-in, hit spin-out and glow pulse. None once the hit animation has finished.
pub fn target_pose(
    target: &Target,
    hit_at_ms: Option<f64>,
    now_ms: f64,
    reduced_motion: bool,
) -> Option<TargetPose> {
    let age = (now_ms - target.spawned_at_ms).max(0.0);
    let glow = pulse(age, TARGET_GLOW_PERIOD_MS);

    if let Some(hit_at) = hit_at_ms {
        let t = ((now_ms - hit_at).max(0.0) / TARGET_HIT_ANIM_MS) as f32;
        if t >= 1.0 {
            return None;
        }
        let e = ease_out(t);
        return Some(TargetPose {
            scale: 1.0 - e,
            rotation: if reduced_motion { 0.0 } else { e * std::f32::consts::TAU },
            glow,
        });
    }

    let scale = if reduced_motion {
        1.0
    } else {
        back_out((age / TARGET_SPAWN_ANIM_MS) as f32)
    };
    Some(TargetPose {
        scale,
        rotation: 0.0,
        glow,
    })
}

/// Build the frame's triangles
pub fn build_scene(
    layout: &SceneLayout,
    state: &GameState,
    session_ms: f64,
    grid: &DotGrid,
    sparks: &SparkField,
    fx_ms: f64,
    settings: &Settings,
) -> Vec<Vertex> {
    let mut vertices = Vec::new();
    let segments = settings.quality.circle_segments();
    let glow = settings.quality.glow_enabled();

    if settings.background_grid {
        push_grid(&mut vertices, grid, (segments / 2).max(6), glow);
    }

    vertices.extend(shapes::rect(layout.play_min, layout.play_max(), colors::PLAY_AREA));
    vertices.extend(shapes::rect_outline(
        layout.play_min,
        layout.play_max(),
        1.0,
        colors::PLAY_AREA_BORDER,
    ));

    if state.phase == GamePhase::Playing {
        if let Some(target) = &state.target {
            let hit_at = if state.target_hit { state.hit_at_ms } else { None };
            if let Some(pose) = target_pose(target, hit_at, session_ms, settings.reduced_motion) {
                push_target(&mut vertices, layout, target, pose, segments, glow, session_ms);
            }
        }
    }

    if settings.particles {
        let color = sparks.config().rgba();
        for s in sparks.samples(fx_ms) {
            let c = with_alpha(color, color[3] * s.opacity);
            let r = s.size / 2.0;
            if glow {
                vertices.extend(shapes::halo(s.pos, r, r + 10.0, with_alpha(c, c[3] * 0.5), 8));
            }
            vertices.extend(shapes::circle(s.pos, r, c, 8));
        }
    }

    vertices
}

fn push_grid(vertices: &mut Vec<Vertex>, grid: &DotGrid, segments: u32, glow: bool) {
    let base = grid.config().base_rgba();
    let active = grid.config().active_rgba();

    for dot in grid.dots() {
        let look = grid.appearance(dot);
        let color = if look.active { active } else { base };
        let color = with_alpha(color, look.alpha);

        if look.active && glow {
            vertices.extend(shapes::halo(
                dot.pos,
                look.radius,
                look.radius * 3.0,
                with_alpha(active, look.alpha * 0.5),
                segments,
            ));
        }
        vertices.extend(shapes::circle(dot.pos, look.radius, color, segments));
    }
}

fn push_target(
    vertices: &mut Vec<Vertex>,
    layout: &SceneLayout,
    target: &Target,
    pose: TargetPose,
    segments: u32,
    glow: bool,
    session_ms: f64,
) {
    if pose.scale <= 0.0 {
        return;
    }
    let [from_hex, to_hex] = target.palette_colors();
    let from = parse_hex_color(from_hex).unwrap_or([1.0; 4]);
    let to = parse_hex_color(to_hex).unwrap_or([1.0; 4]);

    let center = layout.to_viewport(target.pos);
    let half = target.size / 2.0 * pose.scale;
    let outline = match target.shape {
        TargetShape::Circle => shapes::circle_outline(center, half, pose.rotation, segments),
        TargetShape::Square => shapes::rounded_square_outline(
            center,
            half,
            SQUARE_CORNER_RADIUS * pose.scale,
            pose.rotation,
            (segments / 4).max(2),
        ),
    };

    if glow {
        let width = (TARGET_GLOW_MIN + (TARGET_GLOW_MAX - TARGET_GLOW_MIN) * pose.glow) * pose.scale;
        let color = mix_color(with_alpha(from, 0.25), with_alpha(to, 0.375), pose.glow);
        vertices.extend(shapes::glow_band(center, &outline, width, color));
    }

    // 135deg linear gradient, rotating with the target
    let unrotate = glam::Vec2::from_angle(-pose.rotation);
    let diagonal = 2.0 * half.max(f32::EPSILON);
    vertices.extend(shapes::fill_outline(center, &outline, |p| {
        let local = unrotate.rotate(p - center);
        mix_color(from, to, (local.x + local.y) / (2.0 * diagonal) + 0.5)
    }));

    // Sheen toward the top-left
    let sheen_center = center + unrotate.rotate(Vec2::splat(-0.2 * target.size * pose.scale));
    let sheen_radius = 0.22 * target.size * pose.scale;
    let sheen_alpha = colors::TARGET_HIGHLIGHT[3]
        * (1.0 + pulse(session_ms - target.spawned_at_ms, TARGET_SHEEN_PERIOD_MS));
    let sheen = shapes::circle_outline(sheen_center, sheen_radius, 0.0, segments);
    vertices.extend(shapes::fill_outline(sheen_center, &sheen, |p| {
        let fade = 1.0 - (p.distance(sheen_center) / sheen_radius).min(1.0);
        with_alpha(colors::TARGET_HIGHLIGHT, sheen_alpha * fade)
    }));
}
