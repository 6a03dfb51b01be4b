//! Probe point generation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{BedConfig, Pattern};
use crate::error::{BedLevelError, Result};

/// Distance kept from every bed edge (mm).
pub const EDGE_MARGIN: i64 = 15;

/// Rows and columns of the grid pattern.
pub const GRID_SIZE: usize = 3;

/// Most probe points a single program may contain.
pub const MAX_POINTS: usize = 1_000_000;

/// Where on the bed a probe point sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Site {
    /// Corner at the X and Y origin.
    FrontLeft,
    /// Corner at minimum X, maximum Y.
    BackLeft,
    /// Corner at maximum X, minimum Y.
    BackRight,
    /// Corner at maximum X and Y.
    FrontRight,
    /// Point of the grid pattern.
    Grid,
}

impl Site {
    /// Comment text for the travel move to this site.
    pub fn comment(&self) -> &'static str {
        match self {
            Site::FrontLeft => "front left corner",
            Site::BackLeft => "back left corner",
            Site::BackRight => "back right corner",
            Site::FrontRight => "front right corner",
            Site::Grid => "point in grid.",
        }
    }
}

/// A probe point on the bed, in whole millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate (mm).
    pub x: i64,
    /// Y coordinate (mm).
    pub y: i64,
    /// Which site the point represents.
    pub site: Site,
}

impl Point {
    /// Create a new point.
    pub fn new(x: i64, y: i64, site: Site) -> Self {
        Self { x, y, site }
    }

    /// The `(x, y)` pair.
    pub fn xy(&self) -> (i64, i64) {
        (self.x, self.y)
    }
}

/// Generate the probe points for `config`, in traversal order.
///
/// The pattern is repeated `config.cycles` times; a cycle count of zero or
/// less yields no points. Beds too small to keep [`EDGE_MARGIN`] on both
/// sides of an axis are rejected.
pub fn generate_points(config: &BedConfig) -> Result<Vec<Point>> {
    check_axis("X", config.max_x)?;
    check_axis("Y", config.max_y)?;

    let cycle = match config.pattern {
        Pattern::FourCorners | Pattern::ZPattern => corners(config),
        Pattern::Grid3x3 => grid(config, GRID_SIZE, GRID_SIZE),
    };

    let cycles = usize::try_from(config.cycles).unwrap_or(0);
    let count = cycle
        .len()
        .checked_mul(cycles)
        .filter(|&count| count <= MAX_POINTS)
        .ok_or(BedLevelError::TooManyPoints {
            cycles: config.cycles,
            maximum: MAX_POINTS,
        })?;
    let points: Vec<Point> = cycle.iter().copied().cycle().take(count).collect();

    debug!(
        pattern = %config.pattern,
        cycles = config.cycles,
        count = points.len(),
        "generated probe points"
    );
    Ok(points)
}

/// `count` evenly spaced integers from `start` to `end`, both included.
///
/// Uses integer arithmetic, truncating toward zero, so the result does not
/// depend on floating point rounding. Intermediates are widened to `i128`;
/// every value lies between `start` and `end`, so it fits back in `i64`.
pub fn linspace(start: i64, end: i64, count: usize) -> Vec<i64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let steps = (count - 1) as i128;
            let (start, span) = (start as i128, end as i128 - start as i128);
            (0..count as i128)
                .map(|i| (start + i * span / steps) as i64)
                .collect()
        }
    }
}

fn check_axis(axis: &'static str, size: i64) -> Result<()> {
    let minimum = 2 * EDGE_MARGIN;
    if size <= minimum {
        return Err(BedLevelError::BedTooSmall {
            axis,
            size,
            minimum,
        });
    }
    Ok(())
}

fn corners(config: &BedConfig) -> Vec<Point> {
    let near = EDGE_MARGIN;
    let far_x = config.max_x - EDGE_MARGIN;
    let far_y = config.max_y - EDGE_MARGIN;

    let front_left = Point::new(near, near, Site::FrontLeft);
    let back_left = Point::new(near, far_y, Site::BackLeft);
    let back_right = Point::new(far_x, near, Site::BackRight);
    let front_right = Point::new(far_x, far_y, Site::FrontRight);

    match config.pattern {
        Pattern::ZPattern => vec![front_left, back_left, front_right, back_right],
        _ => vec![front_left, back_left, back_right, front_right],
    }
}

fn grid(config: &BedConfig, columns: usize, rows: usize) -> Vec<Point> {
    let xs = linspace(EDGE_MARGIN, config.max_x - EDGE_MARGIN, columns);
    let ys = linspace(EDGE_MARGIN, config.max_y - EDGE_MARGIN, rows);

    xs.iter()
        .flat_map(|&x| ys.iter().map(move |&y| Point::new(x, y, Site::Grid)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xy(points: &[Point]) -> Vec<(i64, i64)> {
        points.iter().map(Point::xy).collect()
    }

    #[test]
    fn test_four_corners() {
        let config = BedConfig::new(100, 100, Pattern::FourCorners);
        let points = generate_points(&config).unwrap();
        assert_eq!(xy(&points), vec![(15, 15), (15, 85), (85, 15), (85, 85)]);
        assert_eq!(points[2].site, Site::BackRight);
        assert_eq!(points[3].site, Site::FrontRight);
    }

    #[test]
    fn test_z_pattern_swaps_last_two_corners() {
        let config = BedConfig::new(100, 100, Pattern::ZPattern);
        let points = generate_points(&config).unwrap();
        assert_eq!(xy(&points), vec![(15, 15), (15, 85), (85, 85), (85, 15)]);
        assert_eq!(points[2].site, Site::FrontRight);
        assert_eq!(points[3].site, Site::BackRight);
    }

    #[test]
    fn test_grid_is_x_major() {
        let config = BedConfig::new(100, 100, Pattern::Grid3x3);
        let points = generate_points(&config).unwrap();
        assert_eq!(
            xy(&points),
            vec![
                (15, 15),
                (15, 50),
                (15, 85),
                (50, 15),
                (50, 50),
                (50, 85),
                (85, 15),
                (85, 50),
                (85, 85),
            ]
        );
        assert!(points.iter().all(|p| p.site == Site::Grid));
    }

    #[test]
    fn test_grid_truncates_midpoints() {
        let config = BedConfig::new(221, 100, Pattern::Grid3x3);
        let points = generate_points(&config).unwrap();
        // 15 + (206 - 15) / 2 = 110.5
        assert_eq!(points[3].xy(), (110, 15));
        assert_eq!(points[8].xy(), (206, 85));
    }

    #[test]
    fn test_cycles_repeat_the_pattern() {
        for pattern in Pattern::ALL {
            let single = generate_points(&BedConfig::new(200, 180, pattern)).unwrap();
            let config = BedConfig {
                cycles: 3,
                ..BedConfig::new(200, 180, pattern)
            };
            let points = generate_points(&config).unwrap();
            assert_eq!(points.len(), single.len() * 3);
            for chunk in points.chunks(single.len()) {
                assert_eq!(chunk, single.as_slice());
            }
        }
    }

    #[test]
    fn test_non_positive_cycles_yield_nothing() {
        for cycles in [0, -2] {
            let config = BedConfig {
                cycles,
                ..BedConfig::new(200, 200, Pattern::FourCorners)
            };
            assert!(generate_points(&config).unwrap().is_empty());
        }
    }

    #[test]
    fn test_small_bed_is_rejected() {
        let config = BedConfig::new(30, 100, Pattern::Grid3x3);
        assert!(matches!(
            generate_points(&config),
            Err(BedLevelError::BedTooSmall { axis: "X", size: 30, .. })
        ));

        let config = BedConfig::new(100, 12, Pattern::FourCorners);
        assert!(matches!(
            generate_points(&config),
            Err(BedLevelError::BedTooSmall { axis: "Y", .. })
        ));

        assert!(generate_points(&BedConfig::new(31, 31, Pattern::Grid3x3)).is_ok());
    }

    #[test]
    fn test_generation_is_deterministic() {
        let config = BedConfig {
            cycles: 2,
            ..BedConfig::new(235, 235, Pattern::Grid3x3)
        };
        assert_eq!(
            generate_points(&config).unwrap(),
            generate_points(&config).unwrap()
        );
    }

    #[test]
    fn test_huge_bed_does_not_overflow() {
        let config = BedConfig::new(i64::MAX, i64::MAX, Pattern::Grid3x3);
        let points = generate_points(&config).unwrap();
        let far = i64::MAX - EDGE_MARGIN;
        let mid = EDGE_MARGIN + (far - EDGE_MARGIN) / 2;
        assert_eq!(points.len(), 9);
        assert_eq!(points[4].xy(), (mid, mid));
        assert_eq!(points[8].xy(), (far, far));

        let corners = generate_points(&BedConfig::new(i64::MAX, 200, Pattern::ZPattern)).unwrap();
        assert_eq!(corners[2].xy(), (far, 185));
    }

    #[test]
    fn test_huge_cycle_count_is_rejected() {
        for cycles in [i64::MAX, (MAX_POINTS / 4 + 1) as i64] {
            let config = BedConfig {
                cycles,
                ..BedConfig::new(200, 200, Pattern::FourCorners)
            };
            assert!(matches!(
                generate_points(&config),
                Err(BedLevelError::TooManyPoints { .. })
            ));
        }

        let config = BedConfig {
            cycles: (MAX_POINTS / 4) as i64,
            ..BedConfig::new(200, 200, Pattern::FourCorners)
        };
        assert_eq!(generate_points(&config).unwrap().len(), MAX_POINTS);
    }

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(15, 85, 3), vec![15, 50, 85]);
        assert_eq!(linspace(0, 10, 6), vec![0, 2, 4, 6, 8, 10]);
        assert_eq!(linspace(15, 16, 3), vec![15, 15, 16]);
        assert_eq!(linspace(5, 9, 1), vec![5]);
        assert!(linspace(5, 9, 0).is_empty());
        assert_eq!(
            linspace(i64::MIN, i64::MAX, 3),
            vec![i64::MIN, -1, i64::MAX]
        );
    }
}
