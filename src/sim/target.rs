//! Random target generation

use glam::Vec2;
use rand::Rng;

use super::state::{PlayArea, TARGET_PALETTES, Target, TargetShape};
use crate::consts::*;

/// Generate a target that fits inside the play area.
///
/// Size is uniform in [TARGET_MIN_SIZE, TARGET_MAX_SIZE), the center is uniform
/// over the area inset by half the size plus `TARGET_MARGIN`, and the shape is a
/// coin flip. Without a measurable area the fixed fallback placement is used.
pub fn generate_target<R: Rng + ?Sized>(
    rng: &mut R,
    area: Option<PlayArea>,
    id: u64,
    now_ms: f64,
) -> Target {
    let palette = rng.random_range(0..TARGET_PALETTES.len());

    let Some(area) = area.filter(PlayArea::is_measurable) else {
        log::debug!("Play area not measurable, using fallback target placement");
        return Target {
            id,
            pos: Vec2::new(FALLBACK_TARGET_X, FALLBACK_TARGET_Y),
            size: FALLBACK_TARGET_SIZE,
            shape: TargetShape::Circle,
            palette,
            spawned_at_ms: now_ms,
        };
    };

    let size = rng.random_range(TARGET_MIN_SIZE..TARGET_MAX_SIZE);
    let margin = size / 2.0 + TARGET_MARGIN;
    let x = place_axis(rng, area.width, margin);
    let y = place_axis(rng, area.height, margin);
    let shape = if rng.random_bool(0.5) {
        TargetShape::Circle
    } else {
        TargetShape::Square
    };

    Target {
        id,
        pos: Vec2::new(x, y),
        size,
        shape,
        palette,
        spawned_at_ms: now_ms,
    }
}

/// Uniform coordinate in [margin, extent - margin]; centered when the area is too small
fn place_axis<R: Rng + ?Sized>(rng: &mut R, extent: f32, margin: f32) -> f32 {
    let span = extent - 2.0 * margin;
    if span <= 0.0 {
        return extent / 2.0;
    }
    margin + rng.random::<f32>() * span
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_fallback_when_unmeasured() {
        let mut rng = Pcg32::seed_from_u64(1);
        for area in [None, Some(PlayArea::new(0.0, 500.0)), Some(PlayArea::new(800.0, -1.0))] {
            let t = generate_target(&mut rng, area, 7, 0.0);
            assert_eq!(t.pos, Vec2::new(300.0, 200.0));
            assert_eq!(t.size, 60.0);
            assert_eq!(t.shape, TargetShape::Circle);
            assert_eq!(t.id, 7);
        }
    }

    #[test]
    fn test_both_shapes_appear() {
        let mut rng = Pcg32::seed_from_u64(42);
        let area = Some(PlayArea::new(800.0, 500.0));
        let shapes: Vec<TargetShape> = (0..64)
            .map(|i| generate_target(&mut rng, area, i, 0.0).shape)
            .collect();
        assert!(shapes.contains(&TargetShape::Circle));
        assert!(shapes.contains(&TargetShape::Square));
    }

    #[test]
    fn test_same_seed_same_targets() {
        let area = Some(PlayArea::new(640.0, 480.0));
        let mut a = Pcg32::seed_from_u64(99);
        let mut b = Pcg32::seed_from_u64(99);
        for i in 0..10 {
            assert_eq!(
                generate_target(&mut a, area, i, 0.0),
                generate_target(&mut b, area, i, 0.0)
            );
        }
    }

    proptest! {
        #[test]
        fn prop_target_inside_play_area(
            seed in any::<u64>(),
            width in 200.0f32..2000.0,
            height in 200.0f32..1200.0,
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let t = generate_target(&mut rng, Some(PlayArea::new(width, height)), 1, 0.0);
            let (min, max) = t.bounds();
            prop_assert!(t.size >= TARGET_MIN_SIZE && t.size < TARGET_MAX_SIZE);
            prop_assert!(min.x >= TARGET_MARGIN - 1e-3);
            prop_assert!(min.y >= TARGET_MARGIN - 1e-3);
            prop_assert!(max.x <= width - TARGET_MARGIN + 1e-3);
            prop_assert!(max.y <= height - TARGET_MARGIN + 1e-3);
            prop_assert!(t.palette < TARGET_PALETTES.len());
        }
    }
}
