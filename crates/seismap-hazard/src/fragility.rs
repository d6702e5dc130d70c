//! Fragility model: how intensity moves buildings between damage classes.

use crate::{DamageDegrees, Exposure, Material, PerMaterial};
use seismap_grid::Location;
use seismap_pyramid::MapFunction;

/// Intensity at which the expected damage jump equals the material factor.
pub const MAX_INTENSITY: f64 = 30.0;

/// A triangular density with base `[x_min, x_max]` and its apex at `x_peak`.
///
/// The apex height is `2 / (x_max - x_min)`. The density rises linearly from
/// `x_min` to `x_peak` and falls linearly to zero at `x_max`; outside the
/// base it is zero. A zero-width base is a point mass at `x_min` and
/// evaluates to 1 there.
pub fn normalized_triangle(x: f64, x_min: f64, x_peak: f64, x_max: f64) -> f64 {
    let base = x_max - x_min;
    if base <= 0.0 {
        return if x == x_min { 1.0 } else { 0.0 };
    }
    if x < x_min || x > x_max {
        return 0.0;
    }

    let height = 2.0 / base;
    if x < x_peak {
        height * (x - x_min) / (x_peak - x_min)
    } else if x_peak >= x_max {
        height
    } else {
        height * (x_max - x) / (x_max - x_peak)
    }
}

/// Probability that a building in damage class `from` ends in class `to`.
///
/// Damage never decreases. The number of classes jumped follows a
/// [`normalized_triangle`] over the classes still possible, peaking at the
/// normalized intensity times the material factor.
pub fn p_transition(from: usize, to: usize, intensity: f64, material: Material) -> f64 {
    if to < from {
        return 0.0;
    }
    let jumped = (to - from) as f64;
    let possible = (DamageDegrees::CLASSES - 1 - from) as f64;
    let expected = (intensity / MAX_INTENSITY * material.factor()).min(possible);
    normalized_triangle(jumped, 0.0, expected, possible)
}

/// Damage distribution after an event of the given intensity.
///
/// A non-positive intensity leaves the distribution unchanged.
pub fn fragility(intensity: f64, state: &DamageDegrees, material: Material) -> DamageDegrees {
    if intensity <= 0.0 {
        return *state;
    }
    let before = state.to_array();
    let after: [f64; 4] = std::array::from_fn(|to| {
        (0..=to)
            .map(|from| before[from] * p_transition(from, to, intensity, material))
            .sum()
    });
    DamageDegrees::from_array(after)
}

/// Apply [`fragility`] to each material. Building counts are unchanged.
pub fn update_exposure(intensity: f64, exposure: &Exposure) -> Exposure {
    Exposure {
        nr_buildings: exposure.nr_buildings,
        damage: PerMaterial::from_fn(|material| fragility(intensity, exposure.damage.get(material), material)),
    }
}

/// Maps `(intensity, exposure)` at a bottom tile to the damaged exposure.
///
/// Yields no value while either input has none.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateExposureMap;

impl MapFunction<(Option<f64>, Option<Exposure>), Exposure> for UpdateExposureMap {
    fn map(&self, (intensity, exposure): (Option<f64>, Option<Exposure>), _location: Location) -> Option<Exposure> {
        Some(update_exposure(intensity?, &exposure?))
    }
}
