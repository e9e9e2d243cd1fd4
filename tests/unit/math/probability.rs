//! Tests for rollback depth clamping

#[cfg(test)]
mod tests {
    use voxsynth::math::probability::normal_rollback_depth;

    // Tests draws inside the stack are rounded to the nearest depth
    // Verified by truncating instead of rounding
    #[test]
    fn test_rollback_depth_rounds_sample() {
        assert_eq!(normal_rollback_depth(9, 6.0), 6);
        assert_eq!(normal_rollback_depth(9, 5.6), 6);
        assert_eq!(normal_rollback_depth(9, 2.4), 2);
    }

    // Tests depth is clamped into the stack
    // Verified by removing the lower clamp
    #[test]
    fn test_rollback_depth_clamped() {
        assert_eq!(normal_rollback_depth(4, -3.0), 1);
        assert_eq!(normal_rollback_depth(4, 40.0), 4);
        assert_eq!(normal_rollback_depth(1, 0.2), 1);
        assert_eq!(normal_rollback_depth(0, 2.0), 0);
        assert_eq!(normal_rollback_depth(5, f64::NAN), 1);
        assert_eq!(normal_rollback_depth(5, f64::INFINITY), 1);
    }
}
