//! Synthetic bottom-level rasters for demonstration and tests.

use crate::{Exposure, PerMaterial, MAX_INTENSITY};
use rand::Rng;

fn distance(r: f64, c: f64, center_row: f64, center_col: f64) -> f64 {
    (r - center_row).hypot(c - center_col)
}

/// Scale of a quantity that fades linearly to zero at `range` from its source.
fn falloff(distance: f64, range: f64) -> f64 {
    (range - distance).max(0.0) / range
}

/// A single earthquake: intensity fades radially from an epicentre at
/// `(0.3 * rows, 0.6 * cols)` and vanishes at `0.4 * rows`.
///
/// Each cell is drawn uniformly below the local maximum.
pub fn create_intensity_raster(rows: usize, cols: usize, rng: &mut impl Rng) -> Vec<Vec<f64>> {
    let center_row = 0.3 * rows as f64;
    let center_col = 0.6 * cols as f64;
    let range = 0.4 * rows as f64;

    (0..rows)
        .map(|r| {
            (0..cols)
                .map(|c| {
                    let d = distance(r as f64, c as f64, center_row, center_col);
                    let max = MAX_INTENSITY * falloff(d, range);
                    rng.gen::<f64>() * max
                })
                .collect()
        })
        .collect()
}

/// A city around `(0.6 * rows, 0.5 * cols)`: steel in the centre, brick
/// along a ring at `0.2 * rows`, wood along a ring at `0.4 * rows`.
///
/// Counts of up to 30 buildings per material fade over `0.3 * rows` and are
/// drawn uniformly below the local maximum. Every building starts undamaged.
pub fn create_exposure_raster(rows: usize, cols: usize, rng: &mut impl Rng) -> Vec<Vec<Exposure>> {
    let center_row = 0.6 * rows as f64;
    let center_col = 0.5 * cols as f64;
    let first_ring = 0.2 * rows as f64;
    let second_ring = 0.4 * rows as f64;
    let range = 0.3 * rows as f64;
    const MAX_BUILDINGS: f64 = 30.0;

    (0..rows)
        .map(|r| {
            (0..cols)
                .map(|c| {
                    let d = distance(r as f64, c as f64, center_row, center_col);
                    let max = PerMaterial {
                        wood: MAX_BUILDINGS * falloff((d - second_ring).abs(), range),
                        brick: MAX_BUILDINGS * falloff((d - first_ring).abs(), range),
                        steel: MAX_BUILDINGS * falloff(d, range),
                    };
                    Exposure::undamaged(PerMaterial {
                        wood: rng.gen::<f64>() * max.wood,
                        brick: rng.gen::<f64>() * max.brick,
                        steel: rng.gen::<f64>() * max.steel,
                    })
                })
                .collect()
        })
        .collect()
}
