//! Shape generation for 2D primitives

use glam::Vec2;
use std::f32::consts::{FRAC_PI_2, PI};

use super::vertex::Vertex;
use crate::with_alpha;

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Circular halo: `color` at `inner_radius` fading to transparent at `outer_radius`
pub fn halo(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let outline: Vec<Vec2> = (0..segments)
        .map(|i| {
            let theta = (i as f32 / segments as f32) * 2.0 * PI;
            center + Vec2::new(theta.cos(), theta.sin()) * inner_radius
        })
        .collect();
    glow_band(center, &outline, outer_radius - inner_radius, color)
}

/// Closed outline of a circle, `segments` points
pub fn circle_outline(center: Vec2, radius: f32, rotation: f32, segments: u32) -> Vec<Vec2> {
    (0..segments)
        .map(|i| {
            let theta = rotation + (i as f32 / segments as f32) * 2.0 * PI;
            center + Vec2::new(theta.cos(), theta.sin()) * radius
        })
        .collect()
}

/// Closed outline of a rounded square with half-extent `half`, rotated about its center
pub fn rounded_square_outline(
    center: Vec2,
    half: f32,
    corner_radius: f32,
    rotation: f32,
    corner_segments: u32,
) -> Vec<Vec2> {
    let r = corner_radius.clamp(0.0, half);
    let inner = half - r;
    let corners = [
        (Vec2::new(inner, inner), 0.0),
        (Vec2::new(-inner, inner), FRAC_PI_2),
        (Vec2::new(-inner, -inner), PI),
        (Vec2::new(inner, -inner), PI + FRAC_PI_2),
    ];
    let steps = corner_segments.max(1);
    let rot = Vec2::from_angle(rotation);

    let mut points = Vec::with_capacity(corners.len() * (steps as usize + 1));
    for (corner, start) in corners {
        for s in 0..=steps {
            let theta = start + (s as f32 / steps as f32) * FRAC_PI_2;
            let local = corner + Vec2::new(theta.cos(), theta.sin()) * r;
            points.push(center + rot.rotate(local));
        }
    }
    points
}

/// Fill a convex outline as a triangle fan around `center`, colored per vertex
pub fn fill_outline(
    center: Vec2,
    outline: &[Vec2],
    color_at: impl Fn(Vec2) -> [f32; 4],
) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(outline.len() * 3);
    let center_color = color_at(center);

    for i in 0..outline.len() {
        let a = outline[i];
        let b = outline[(i + 1) % outline.len()];
        vertices.push(Vertex::new(center.x, center.y, center_color));
        vertices.push(Vertex::new(a.x, a.y, color_at(a)));
        vertices.push(Vertex::new(b.x, b.y, color_at(b)));
    }

    vertices
}

/// Band extending `width` outward from a convex outline, fading from `color` to transparent
pub fn glow_band(center: Vec2, outline: &[Vec2], width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(outline.len() * 6);
    let clear = with_alpha(color, 0.0);
    let outer = |p: Vec2| p + (p - center).normalize_or_zero() * width;

    for i in 0..outline.len() {
        let inner1 = outline[i];
        let inner2 = outline[(i + 1) % outline.len()];
        let outer1 = outer(inner1);
        let outer2 = outer(inner2);

        // Two triangles per segment
        vertices.push(Vertex::new(inner1.x, inner1.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, clear));
        vertices.push(Vertex::new(inner2.x, inner2.y, color));

        vertices.push(Vertex::new(inner2.x, inner2.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, clear));
        vertices.push(Vertex::new(outer2.x, outer2.y, clear));
    }

    vertices
}

/// Axis-aligned filled rectangle
pub fn rect(min: Vec2, max: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    vec![
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
    ]
}

/// Rectangle border drawn inside the bounds
pub fn rect_outline(min: Vec2, max: Vec2, thickness: f32, color: [f32; 4]) -> Vec<Vertex> {
    let t = thickness;
    let mut vertices = Vec::with_capacity(24);
    vertices.extend(rect(min, Vec2::new(max.x, min.y + t), color));
    vertices.extend(rect(Vec2::new(min.x, max.y - t), max, color));
    vertices.extend(rect(Vec2::new(min.x, min.y + t), Vec2::new(min.x + t, max.y - t), color));
    vertices.extend(rect(Vec2::new(max.x - t, min.y + t), Vec2::new(max.x, max.y - t), color));
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_vertex_count() {
        assert_eq!(circle(Vec2::ZERO, 5.0, [1.0; 4], 12).len(), 36);
    }

    #[test]
    fn test_rounded_square_stays_in_bounds() {
        let pts = rounded_square_outline(Vec2::new(50.0, 50.0), 20.0, 6.0, 0.0, 4);
        assert_eq!(pts.len(), 20);
        for p in &pts {
            assert!(p.x >= 30.0 - 1e-4 && p.x <= 70.0 + 1e-4);
            assert!(p.y >= 30.0 - 1e-4 && p.y <= 70.0 + 1e-4);
        }
    }

    #[test]
    fn test_rotation_preserves_distance() {
        let a = rounded_square_outline(Vec2::ZERO, 20.0, 6.0, 0.0, 3);
        let b = rounded_square_outline(Vec2::ZERO, 20.0, 6.0, 1.0, 3);
        for (p, q) in a.iter().zip(&b) {
            assert!((p.length() - q.length()).abs() < 1e-4);
        }
    }

    #[test]
    fn test_glow_band_fades_out() {
        let outline = circle_outline(Vec2::ZERO, 10.0, 0.0, 8);
        let band = glow_band(Vec2::ZERO, &outline, 5.0, [1.0, 0.0, 0.0, 0.5]);
        assert_eq!(band.len(), 48);
        assert_eq!(band[0].color[3], 0.5);
        assert_eq!(band[1].color[3], 0.0);
        let outer = Vec2::from(band[1].position);
        assert!((outer.length() - 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_fill_outline_uses_color_fn() {
        let outline = circle_outline(Vec2::ZERO, 10.0, 0.0, 4);
        let verts = fill_outline(Vec2::ZERO, &outline, |p| [p.x, 0.0, 0.0, 1.0]);
        assert_eq!(verts.len(), 12);
        assert_eq!(verts[0].color[0], 0.0);
        assert!((verts[1].color[0] - 10.0).abs() < 1e-4);
    }
}
