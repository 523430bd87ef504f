//! Lip-sync loudness

/// Default divisor for byte-scaled spectra
pub const DEFAULT_SENSITIVITY: f32 = 50.0;

/// Mouth-open level from a spectrum: mean bin value over `sensitivity`,
/// clamped to [0, 1]. An empty spectrum is silence.
pub fn loudness(spectrum: &[f32], sensitivity: f32) -> f32 {
    if spectrum.is_empty() || sensitivity <= 0.0 {
        return 0.0;
    }
    let mean = spectrum.iter().sum::<f32>() / spectrum.len() as f32;
    let level = mean / sensitivity;
    if level.is_nan() {
        return 0.0;
    }
    level.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_silence() {
        assert_eq!(loudness(&[], DEFAULT_SENSITIVITY), 0.0);
        assert_eq!(loudness(&[0.0; 32], DEFAULT_SENSITIVITY), 0.0);
    }

    #[test]
    fn test_mean_over_sensitivity() {
        let level = loudness(&[10.0, 20.0, 30.0], 40.0);
        assert!((level - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_loud_clamps() {
        assert_eq!(loudness(&[255.0; 8], DEFAULT_SENSITIVITY), 1.0);
    }

    proptest! {
        #[test]
        fn prop_level_in_unit_range(bins in proptest::collection::vec(0.0f32..=255.0, 0..128)) {
            let level = loudness(&bins, DEFAULT_SENSITIVITY);
            prop_assert!((0.0..=1.0).contains(&level));
        }
    }
}
