//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the downscaled size of an image bounded by `max_size` on both edges.
///
/// Returns `None` when the image already fits, so callers can skip the resample.
/// Otherwise the longer edge becomes exactly `max_size` and the shorter edge is
/// scaled by the same ratio, rounded, and never drops below 1px.
///
/// # Examples
/// ```
/// # use imgnorm::imaging::calculate_bounded_dimensions;
/// // 4000x3000 landscape → 1000x750
/// assert_eq!(calculate_bounded_dimensions((4000, 3000), 1000), Some((1000, 750)));
///
/// // Already within bounds
/// assert_eq!(calculate_bounded_dimensions((800, 600), 1000), None);
/// ```
pub fn calculate_bounded_dimensions(source: (u32, u32), max_size: u32) -> Option<(u32, u32)> {
    let (src_w, src_h) = source;
    if src_w <= max_size && src_h <= max_size {
        return None;
    }

    let scaled = |edge: u32, longer: u32| -> u32 {
        let ratio = max_size as f64 / longer as f64;
        ((edge as f64 * ratio).round() as u32).clamp(1, max_size)
    };

    if src_w >= src_h {
        // Landscape or square
        Some((max_size, scaled(src_h, src_w)))
    } else {
        // Portrait
        Some((scaled(src_w, src_h), max_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_within_bounds_returns_none() {
        assert_eq!(calculate_bounded_dimensions((1000, 1000), 1000), None);
        assert_eq!(calculate_bounded_dimensions((640, 480), 1000), None);
        assert_eq!(calculate_bounded_dimensions((1, 1), 1000), None);
    }

    #[test]
    fn landscape_longer_edge_matches_max() {
        // 2000x1500 → 1000x750
        assert_eq!(
            calculate_bounded_dimensions((2000, 1500), 1000),
            Some((1000, 750))
        );
    }

    #[test]
    fn portrait_longer_edge_matches_max() {
        // 1500x2000 → 750x1000
        assert_eq!(
            calculate_bounded_dimensions((1500, 2000), 1000),
            Some((750, 1000))
        );
    }

    #[test]
    fn square_source() {
        assert_eq!(
            calculate_bounded_dimensions((3000, 3000), 1000),
            Some((1000, 1000))
        );
    }

    #[test]
    fn only_one_edge_over_the_limit() {
        // 1200x300 → 1000x250
        assert_eq!(
            calculate_bounded_dimensions((1200, 300), 1000),
            Some((1000, 250))
        );
        // 999x1001 → 998x1000 (998.002 rounds down)
        assert_eq!(
            calculate_bounded_dimensions((999, 1001), 1000),
            Some((998, 1000))
        );
    }

    #[test]
    fn shorter_edge_rounds_to_nearest() {
        // 3000x2000 → 1000x667 (666.67)
        assert_eq!(
            calculate_bounded_dimensions((3000, 2000), 1000),
            Some((1000, 667))
        );
    }

    #[test]
    fn extreme_strip_keeps_one_pixel() {
        // 100000x10 would scale to 0.1px tall
        assert_eq!(
            calculate_bounded_dimensions((100_000, 10), 1000),
            Some((1000, 1))
        );
    }

    #[test]
    fn result_is_stable_when_reapplied() {
        let first = calculate_bounded_dimensions((4032, 3024), 1000).unwrap();
        assert_eq!(first, (1000, 750));
        assert_eq!(calculate_bounded_dimensions(first, 1000), None);
    }
}
