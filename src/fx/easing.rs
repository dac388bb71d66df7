//! Easing curves, all mapping [0, 1] onto roughly [0, 1]

/// Fast start, gentle landing on a circular arc
#[inline]
pub fn circ_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0) - 1.0;
    (1.0 - t * t).sqrt()
}

/// Cubic ease-out
#[inline]
pub fn ease_out(t: f32) -> f32 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

/// Overshoots past 1.0 before settling
#[inline]
pub fn back_out(t: f32) -> f32 {
    const C1: f32 = 1.70158;
    const C3: f32 = C1 + 1.0;
    let t = t.clamp(0.0, 1.0) - 1.0;
    1.0 + C3 * t * t * t + C1 * t * t
}

/// Smooth 0 -> 1 -> 0 wave with the given period
#[inline]
pub fn pulse(time_ms: f64, period_ms: f64) -> f32 {
    if period_ms <= 0.0 {
        return 0.0;
    }
    let phase = (time_ms / period_ms).fract() as f32;
    0.5 - 0.5 * (phase * std::f32::consts::TAU).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        for f in [circ_out, ease_out, back_out] {
            assert!(f(0.0).abs() < 1e-6);
            assert!((f(1.0) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_back_out_overshoots() {
        assert!((0..100).any(|i| back_out(i as f32 / 100.0) > 1.0));
    }

    #[test]
    fn test_pulse_range() {
        assert!(pulse(0.0, 1500.0).abs() < 1e-6);
        assert!((pulse(750.0, 1500.0) - 1.0).abs() < 1e-6);
        assert_eq!(pulse(100.0, 0.0), 0.0);
    }
}
