// Standard quality ladder

/// Standard video heights, ascending
pub const VIDEO_QUALITIES: [u32; 9] = [144, 240, 360, 480, 720, 1080, 1440, 2160, 4320];

/// Snap a pixel height to the smallest standard tier that is >= height.
/// Heights above the ladder map to the top tier.
pub fn normalize_quality(height: u32) -> u32 {
    VIDEO_QUALITIES
        .iter()
        .copied()
        .find(|&tier| tier >= height)
        .unwrap_or(VIDEO_QUALITIES[VIDEO_QUALITIES.len() - 1])
}

/// Label like "1080p"
pub fn quality_label(height: u32) -> String {
    format!("{}p", normalize_quality(height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_points() {
        assert_eq!(normalize_quality(0), 144);
        assert_eq!(normalize_quality(5000), 4320);
        assert_eq!(normalize_quality(720), 720);
        assert_eq!(normalize_quality(721), 1080);
    }

    #[test]
    fn test_idempotent_and_monotonic() {
        let mut previous = 0;
        for height in (0..=5000).step_by(7) {
            let tier = normalize_quality(height);
            assert_eq!(normalize_quality(tier), tier);
            assert!(tier >= previous);
            previous = tier;
        }
    }

    #[test]
    fn test_label() {
        assert_eq!(quality_label(1080), "1080p");
        assert_eq!(quality_label(608), "720p");
    }
}
