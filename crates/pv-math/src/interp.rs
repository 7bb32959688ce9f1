//! 1-D linear interpolation and zero-crossing search.

/// x where the line through (x0, y0)–(x1, y1) crosses y = 0.
///
/// Returns `x0` when the segment is flat in y or vertical in x, where the
/// crossing is undefined.
pub fn zero_crossing(x0: f64, y0: f64, x1: f64, y1: f64) -> f64 {
    let dx = x1 - x0;
    let dy = y1 - y0;
    if dx == 0.0 || dy == 0.0 {
        return x0;
    }
    let slope = dy / dx;
    x0 - y0 / slope
}

/// Index of the first adjacent pair `(k, k+1)` satisfying `crosses(y[k], y[k+1])`.
pub fn first_crossing<F>(y: &[f64], crosses: F) -> Option<usize>
where
    F: Fn(f64, f64) -> bool,
{
    y.windows(2).position(|w| crosses(w[0], w[1]))
}

/// Index of the smallest |y| (first occurrence on ties), ignoring NaN.
pub fn argmin_abs(y: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &v) in y.iter().enumerate() {
        let a = v.abs();
        if a.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if a >= b => {}
            _ => best = Some((idx, a)),
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_crossing_midpoint() {
        let x = zero_crossing(0.5, 1.0, 0.6, -1.0);
        assert!((x - 0.55).abs() < 1e-12, "x = {x}");
    }

    #[test]
    fn test_zero_crossing_degenerate_segment() {
        assert_eq!(zero_crossing(0.5, 1.0, 0.5, -1.0), 0.5);
        assert_eq!(zero_crossing(0.5, 1.0, 0.6, 1.0), 0.5);
    }

    #[test]
    fn test_first_crossing_sign_change() {
        let y = [3.0, 2.0, 0.5, -0.2, -1.0];
        assert_eq!(first_crossing(&y, |a, b| a > 0.0 && b <= 0.0), Some(2));
        assert_eq!(first_crossing(&[1.0, 2.0], |a, b| a > 0.0 && b <= 0.0), None);
    }

    #[test]
    fn test_argmin_abs_first_tie() {
        assert_eq!(argmin_abs(&[2.0, -0.5, 0.5, 1.0]), Some(1));
        assert_eq!(argmin_abs(&[f64::NAN, 3.0]), Some(1));
        assert_eq!(argmin_abs(&[]), None);
    }
}
