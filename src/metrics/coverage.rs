//! Area coverage and route redundancy over a fixed grid.

use crate::simulation::TrajectoryLog;

/// Coverage and redundancy, both in percent.
///
/// Coverage is the share of grid cells visited by any drone. Redundancy is
/// the share of visited cells that more than one drone visited. Degenerate
/// bounds or an empty grid yield zeros.
pub fn area_coverage_and_redundancy(
    trajectories: &TrajectoryLog,
    area_bounds: [f64; 4],
    grid_size: usize,
) -> (f64, f64) {
    let [min_x, max_x, min_y, max_y] = area_bounds;
    let width = max_x - min_x;
    let height = max_y - min_y;
    if grid_size == 0 || width.is_nan() || height.is_nan() || width <= 0.0 || height <= 0.0 {
        return (0.0, 0.0);
    }

    let x_scale = grid_size as f64 / width;
    let y_scale = grid_size as f64 / height;
    let cell = |v: f64, min: f64, scale: f64| -> Option<usize> {
        if !v.is_finite() {
            return None;
        }
        let idx = ((v - min) * scale).floor();
        Some(idx.clamp(0.0, (grid_size - 1) as f64) as usize)
    };

    let mut visits = vec![0u32; grid_size * grid_size];
    for (_, trajectory) in trajectories.iter() {
        let mut seen = vec![false; grid_size * grid_size];
        for p in trajectory {
            if let (Some(i), Some(j)) = (cell(p.x, min_x, x_scale), cell(p.y, min_y, y_scale)) {
                seen[i * grid_size + j] = true;
            }
        }
        for (count, hit) in visits.iter_mut().zip(seen) {
            if hit {
                *count += 1;
            }
        }
    }

    let visited = visits.iter().filter(|&&c| c > 0).count();
    let redundant = visits.iter().filter(|&&c| c > 1).count();
    let total = grid_size * grid_size;

    let coverage = visited as f64 / total as f64 * 100.0;
    let redundancy = if visited == 0 {
        0.0
    } else {
        redundant as f64 / visited as f64 * 100.0
    };
    (coverage, redundancy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::Position;

    #[test]
    fn test_empty_trajectories_give_zero() {
        let log = TrajectoryLog::new();
        assert_eq!(area_coverage_and_redundancy(&log, [0.0, 10.0, 0.0, 10.0], 10), (0.0, 0.0));
    }

    #[test]
    fn test_degenerate_bounds_give_zero() {
        let mut log = TrajectoryLog::new();
        log.record("D1", Position::new(1.0, 1.0));
        assert_eq!(area_coverage_and_redundancy(&log, [0.0, 0.0, 0.0, 10.0], 10), (0.0, 0.0));
        assert_eq!(area_coverage_and_redundancy(&log, [0.0, 10.0, 0.0, 10.0], 0), (0.0, 0.0));
    }

    #[test]
    fn test_coverage_and_redundancy() {
        let mut log = TrajectoryLog::new();
        // D1 visits two cells, one twice
        log.record("D1", Position::new(0.5, 0.5));
        log.record("D1", Position::new(0.6, 0.6));
        log.record("D1", Position::new(5.5, 5.5));
        // D2 shares one of them and adds a third
        log.record("D2", Position::new(5.1, 5.9));
        log.record("D2", Position::new(9.5, 0.5));

        let (coverage, redundancy) = area_coverage_and_redundancy(&log, [0.0, 10.0, 0.0, 10.0], 10);
        assert!((coverage - 3.0).abs() < 1e-9);
        assert!((redundancy - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_bounds_points_are_clamped() {
        let mut log = TrajectoryLog::new();
        log.record("D1", Position::new(-50.0, 50.0));
        let (coverage, _) = area_coverage_and_redundancy(&log, [0.0, 10.0, 0.0, 10.0], 10);
        assert!((coverage - 1.0).abs() < 1e-9);
    }
}
