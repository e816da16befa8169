pub struct StatsHelper;

impl StatsHelper {
    /// Arithmetic mean, `None` for an empty slice.
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let sum: f64 = values.iter().sum();
        Some(sum / values.len() as f64)
    }

    pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
        from + (to - from) * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_sequence_is_none() {
        assert_eq!(StatsHelper::mean(&[]), None);
    }

    #[test]
    fn mean_of_reference_confidences() {
        let mean = StatsHelper::mean(&[0.86, 0.68, 0.72]).unwrap();
        assert!((mean - 0.753_333).abs() < 1e-6);
    }

    #[test]
    fn lerp_hits_endpoints() {
        assert_eq!(StatsHelper::lerp(0.2, 0.8, 0.0), 0.2);
        assert_eq!(StatsHelper::lerp(0.2, 0.8, 1.0), 0.8);
    }
}
