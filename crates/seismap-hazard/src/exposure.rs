//! Building exposure: counts and damage distributions per material.

use seismap_grid::Location;
use seismap_pyramid::{DirectionEstimates, ReduceFunction};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Building material. Determines how readily a building is damaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    Wood,
    Brick,
    Steel,
}

impl Material {
    /// All materials, in field order.
    pub const ALL: [Material; 3] = [Material::Wood, Material::Brick, Material::Steel];

    /// How many damage classes a full-scale intensity is expected to
    /// advance a building of this material.
    pub const fn factor(&self) -> f64 {
        match self {
            Material::Wood => 2.0,
            Material::Brick => 1.0,
            Material::Steel => 0.5,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Material::Wood => "wood",
            Material::Brick => "brick",
            Material::Steel => "steel",
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per building material.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerMaterial<T> {
    pub wood: T,
    pub brick: T,
    pub steel: T,
}

impl<T> PerMaterial<T> {
    /// Build by evaluating `f` for each material.
    pub fn from_fn(mut f: impl FnMut(Material) -> T) -> Self {
        Self {
            wood: f(Material::Wood),
            brick: f(Material::Brick),
            steel: f(Material::Steel),
        }
    }

    pub fn get(&self, material: Material) -> &T {
        match material {
            Material::Wood => &self.wood,
            Material::Brick => &self.brick,
            Material::Steel => &self.steel,
        }
    }
}

/// Probability of each of the four damage classes, from undamaged (`d0`)
/// to destroyed (`d3`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DamageDegrees {
    pub d0: f64,
    pub d1: f64,
    pub d2: f64,
    pub d3: f64,
}

impl DamageDegrees {
    /// Every building intact.
    pub const UNDAMAGED: DamageDegrees = DamageDegrees {
        d0: 1.0,
        d1: 0.0,
        d2: 0.0,
        d3: 0.0,
    };

    /// Number of damage classes.
    pub const CLASSES: usize = 4;

    pub const fn from_array([d0, d1, d2, d3]: [f64; 4]) -> Self {
        Self { d0, d1, d2, d3 }
    }

    pub const fn to_array(&self) -> [f64; 4] {
        [self.d0, self.d1, self.d2, self.d3]
    }

    /// Sum over all classes; 1 for a proper distribution.
    pub fn total(&self) -> f64 {
        self.to_array().iter().sum()
    }
}

/// Buildings in a tile and their damage state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exposure {
    /// Building count per material.
    pub nr_buildings: PerMaterial<f64>,
    /// Damage distribution per material.
    pub damage: PerMaterial<DamageDegrees>,
}

impl Exposure {
    /// Undamaged buildings with the given counts.
    pub fn undamaged(nr_buildings: PerMaterial<f64>) -> Self {
        Self {
            nr_buildings,
            damage: PerMaterial::from_fn(|_| DamageDegrees::UNDAMAGED),
        }
    }

    /// Total building count over all materials.
    pub fn total_buildings(&self) -> f64 {
        Material::ALL.iter().map(|m| *self.nr_buildings.get(*m)).sum()
    }
}

impl Default for Exposure {
    fn default() -> Self {
        Self::undamaged(PerMaterial::default())
    }
}

/// Combine the exposures of the children that have a value.
///
/// Building counts add up. Each damage class is the average over children
/// weighted by their building count of the same material; a material with
/// no buildings in any child gets an all-zero distribution.
pub fn aggregate_exposure(children: &DirectionEstimates<Exposure>) -> Exposure {
    let present: Vec<&Exposure> = children.values().collect();

    let nr_buildings = PerMaterial::from_fn(|material| {
        present.iter().map(|e| *e.nr_buildings.get(material)).sum::<f64>()
    });

    let damage = PerMaterial::from_fn(|material| {
        let total = *nr_buildings.get(material);
        if total <= 0.0 {
            return DamageDegrees::default();
        }
        let mut weighted = [0.0; DamageDegrees::CLASSES];
        for exposure in &present {
            let weight = *exposure.nr_buildings.get(material) / total;
            for (sum, p) in weighted.iter_mut().zip(exposure.damage.get(material).to_array()) {
                *sum += p * weight;
            }
        }
        DamageDegrees::from_array(weighted)
    });

    Exposure { nr_buildings, damage }
}

/// [`aggregate_exposure`] as a reduce strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExposureReduce;

impl ReduceFunction<Exposure> for ExposureReduce {
    fn reduce(&self, children: &DirectionEstimates<Exposure>, _location: Location) -> Exposure {
        aggregate_exposure(children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use seismap_grid::Direction;
    use seismap_pyramid::Estimate;

    fn wood(count: f64, d0: f64) -> Exposure {
        let mut exposure = Exposure::undamaged(PerMaterial {
            wood: count,
            brick: 0.0,
            steel: 0.0,
        });
        exposure.damage.wood = DamageDegrees::from_array([d0, 1.0 - d0, 0.0, 0.0]);
        exposure
    }

    #[test]
    fn test_aggregate_weights_damage_by_count() {
        let mut children = DirectionEstimates::empty();
        children.set(Direction::TopLeft, Estimate::complete(wood(10.0, 1.0)));
        children.set(Direction::BottomLeft, Estimate::new(0.5, Some(wood(30.0, 0.0))));

        let combined = aggregate_exposure(&children);
        assert_relative_eq!(combined.nr_buildings.wood, 40.0);
        assert_relative_eq!(combined.damage.wood.d0, 0.25);
        assert_relative_eq!(combined.damage.wood.d1, 0.75);
        assert_relative_eq!(combined.damage.wood.total(), 1.0);
    }

    #[test]
    fn test_aggregate_without_buildings() {
        let mut children = DirectionEstimates::empty();
        assert_eq!(aggregate_exposure(&children), Exposure {
            nr_buildings: PerMaterial::default(),
            damage: PerMaterial::default(),
        });

        children.set(Direction::TopRight, Estimate::complete(wood(5.0, 1.0)));
        let combined = ExposureReduce.reduce(&children, Location::ROOT);
        assert_eq!(combined.damage.brick, DamageDegrees::default());
        assert_eq!(combined.damage.wood, DamageDegrees::UNDAMAGED);
    }

    #[test]
    fn test_exposure_json_shape() {
        let json = serde_json::to_value(wood(10.0, 1.0)).unwrap();
        assert_eq!(json["nrBuildings"]["wood"], 10.0);
        assert_eq!(json["damage"]["steel"]["d0"], 1.0);
        assert_eq!(json["damage"]["wood"]["d3"], 0.0);
    }
}
