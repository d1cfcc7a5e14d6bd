//! Daily study intensity buckets for heat-map coloring.

/// Highest intensity bucket.
pub const MAX_INTENSITY: u8 = 4;

/// Map minutes studied on a day to a bucket in `0..=4`.
///
/// Total over all integers; zero and negative minutes both land in 0.
pub fn intensity_level(minutes: i64) -> u8 {
    match minutes {
        i64::MIN..=0 => 0,
        1..=29 => 1,
        30..=59 => 2,
        60..=119 => 3,
        _ => MAX_INTENSITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_edges() {
        assert_eq!(intensity_level(-30), 0);
        assert_eq!(intensity_level(0), 0);
        assert_eq!(intensity_level(1), 1);
        assert_eq!(intensity_level(29), 1);
        assert_eq!(intensity_level(30), 2);
        assert_eq!(intensity_level(59), 2);
        assert_eq!(intensity_level(60), 3);
        assert_eq!(intensity_level(119), 3);
        assert_eq!(intensity_level(120), 4);
        assert_eq!(intensity_level(i64::MAX), 4);
    }
}
