//! Degree-biased choice of the child to refine next.

use seismap_grid::Direction;

/// Pick a direction with probability proportional to `1 - degree`.
///
/// `u` is a uniform draw from `[0, 1)`. Directions that are already complete
/// have weight zero and are never chosen. Returns `None` only when every
/// direction is complete.
pub fn pick_direction(degrees: &[f64; 4], u: f64) -> Option<Direction> {
    let weights = degrees.map(|degree| (1.0 - degree).max(0.0));
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return None;
    }

    // Scaling the draw by the total is the same as normalizing the weights.
    let target = u * total;
    let mut cumulative = 0.0;
    let mut candidate = None;
    for direction in Direction::ALL {
        let weight = weights[direction.index()];
        if weight <= 0.0 {
            continue;
        }
        cumulative += weight;
        candidate = Some(direction);
        if target < cumulative {
            break;
        }
    }
    candidate
}
