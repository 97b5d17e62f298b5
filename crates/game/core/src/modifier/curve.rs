//! One-dimensional keyframe curves for `SetByData` modifiers.

/// Piecewise-linear curve over `(time, value)` keys.
///
/// Evaluation clamps to the first/last key outside the key range. An empty
/// curve evaluates to zero.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Curve {
    keys: Vec<(f32, f32)>,
}

impl Curve {
    pub fn new(mut keys: Vec<(f32, f32)>) -> Self {
        keys.retain(|(time, value)| time.is_finite() && value.is_finite());
        keys.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { keys }
    }

    /// Straight line from `(0, from)` to `(1, to)`.
    pub fn linear(from: f32, to: f32) -> Self {
        Self::new(vec![(0.0, from), (1.0, to)])
    }

    pub fn keys(&self) -> &[(f32, f32)] {
        &self.keys
    }

    pub fn evaluate(&self, time: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        if time <= first.0 {
            return first.1;
        }
        if time >= last.0 {
            return last.1;
        }

        // First key strictly after `time`; its predecessor exists because time > first.0.
        let upper = self.keys.partition_point(|(key_time, _)| *key_time <= time);
        let (t0, v0) = self.keys[upper - 1];
        let (t1, v1) = self.keys[upper];
        let span = t1 - t0;
        if span <= f32::EPSILON {
            return v1;
        }
        v0 + (v1 - v0) * ((time - t0) / span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_curve_interpolates() {
        let curve = Curve::linear(0.0, 10.0);
        assert_eq!(curve.evaluate(0.0), 0.0);
        assert!((curve.evaluate(0.25) - 2.5).abs() < 1.0e-6);
        assert_eq!(curve.evaluate(1.0), 10.0);
    }

    #[test]
    fn evaluation_clamps_outside_keys() {
        let curve = Curve::new(vec![(1.0, 4.0), (0.0, 2.0)]);
        assert_eq!(curve.evaluate(-3.0), 2.0);
        assert_eq!(curve.evaluate(9.0), 4.0);
    }

    #[test]
    fn bell_shape_peaks_in_the_middle() {
        let curve = Curve::new(vec![(0.0, 0.0), (0.5, 1.0), (1.0, 0.0)]);
        assert_eq!(curve.evaluate(0.5), 1.0);
        assert!((curve.evaluate(0.75) - 0.5).abs() < 1.0e-6);
    }

    #[test]
    fn empty_curve_is_zero() {
        assert_eq!(Curve::default().evaluate(0.3), 0.0);
    }
}
