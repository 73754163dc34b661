//! Price grid generation.
//!
//! The optimizer is a deterministic sweep over an inclusive, evenly spaced
//! grid. Points are computed as `low + i * step` rather than by repeated
//! addition, so the last point lands on `high` without drift. The point count
//! is capped at `MAX_GRID_POINTS`.

use crate::domain::PriceGrid;
use crate::error::ConfigError;

/// All candidate prices of `grid`, ascending.
pub fn price_points(grid: &PriceGrid) -> Result<Vec<f64>, ConfigError> {
    let count = grid.point_count()?;
    Ok((0..count).map(|i| grid.low + grid.step * i as f64).collect())
}
