//! # Built-in Materials
//!
//! The reference material set, registered in this order:
//!
//! | id | name  | moves (first success wins)                        |
//! |----|-------|---------------------------------------------------|
//! | 0  | air   | none, never rewritten                             |
//! | 1  | wall  | none, rewrites itself                             |
//! | 2  | water | down, diagonal-down, sideways into {air, gas}     |
//! | 3  | sand  | down, diagonal-down into {air, water, gas}        |
//! | 4  | gas   | diagonal-up into {water, sand}, any diagonal into {air} |
//!
//! "Diagonal" and "sideways" use the per-invocation horizontal bias; gas's
//! second move also uses the vertical bias.

use crate::material::{Behavior, Material, Move, Rgba, Step, AIR_NAME};

/// Name of the wall material.
pub const WALL: &str = "wall";
/// Name of the water material.
pub const WATER: &str = "water";
/// Name of the sand material.
pub const SAND: &str = "sand";
/// Name of the gas material.
pub const GAS: &str = "gas";

const DOWN: i32 = 1;
const UP: i32 = -1;

/// Water is blue, brighter with higher aux: `rgb(0, 20, 128 + aux/2)`.
#[must_use]
pub fn water_color(aux: u8) -> Rgba {
    let blue = (128 + (u16::from(aux) + 1) / 2).min(255) as u8;
    Rgba::rgb(0, 20, blue)
}

/// Sand is orange, redder with higher aux: `rgb(200 + aux/4, 100, 20)`.
#[must_use]
pub fn sand_color(aux: u8) -> Rgba {
    let red = (200 + (u16::from(aux) + 2) / 4).min(255) as u8;
    Rgba::rgb(red, 100, 20)
}

/// `air`: background, never updates.
#[must_use]
pub fn air() -> Material {
    Material::new(AIR_NAME, |_| Rgba::SILVER, Behavior::Inert)
}

/// `wall`: never moves.
#[must_use]
pub fn wall() -> Material {
    Material::new(WALL, |_| Rgba::BLACK, Behavior::Moves(Vec::new()))
}

/// `water`: falls, then slides diagonally, then spreads sideways.
#[must_use]
pub fn water() -> Material {
    let into = [AIR_NAME, GAS];
    Material::new(
        WATER,
        water_color,
        Behavior::Moves(vec![
            Move::new(Step::Fixed(0), Step::Fixed(DOWN), &into),
            Move::new(Step::BiasX, Step::Fixed(DOWN), &into),
            Move::new(Step::BiasX, Step::Fixed(0), &into),
        ]),
    )
}

/// `sand`: falls through air, water and gas, piling diagonally.
#[must_use]
pub fn sand() -> Material {
    let into = [AIR_NAME, WATER, GAS];
    Material::new(
        SAND,
        sand_color,
        Behavior::Moves(vec![
            Move::new(Step::Fixed(0), Step::Fixed(DOWN), &into),
            Move::new(Step::BiasX, Step::Fixed(DOWN), &into),
        ]),
    )
}

/// `gas`: rises by displacing denser matter, otherwise drifts through air.
#[must_use]
pub fn gas() -> Material {
    Material::new(
        GAS,
        |_| Rgba::LIME,
        Behavior::Moves(vec![
            Move::new(Step::BiasX, Step::Fixed(UP), &[WATER, SAND]),
            Move::new(Step::BiasX, Step::BiasY, &[AIR_NAME]),
        ]),
    )
}

/// The reference material list: air, wall, water, sand, gas.
#[must_use]
pub fn standard() -> Vec<Material> {
    vec![air(), wall(), water(), sand(), gas()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{MaterialId, Plan, TypeRegistry};

    #[test]
    fn test_standard_ids() {
        let registry = TypeRegistry::register(standard()).unwrap();
        let names: Vec<&str> = registry.iter().map(|(_, m)| m.name()).collect();
        assert_eq!(names, ["air", "wall", "water", "sand", "gas"]);
    }

    #[test]
    fn test_colors() {
        assert_eq!(air().color(7), Rgba::SILVER);
        assert_eq!(wall().color(7), Rgba::BLACK);
        assert_eq!(gas().color(7), Rgba::LIME);
        assert_eq!(water_color(0), Rgba::rgb(0, 20, 128));
        assert_eq!(water_color(100), Rgba::rgb(0, 20, 178));
        assert_eq!(water_color(255), Rgba::rgb(0, 20, 255));
        assert_eq!(sand_color(0), Rgba::rgb(200, 100, 20));
        assert_eq!(sand_color(200), Rgba::rgb(250, 100, 20));
        assert_eq!(sand_color(255), Rgba::rgb(255, 100, 20));
    }

    #[test]
    fn test_candidate_sets() {
        let registry = TypeRegistry::register(standard()).unwrap();
        let air = MaterialId::AIR;
        let (water, sand, gas) = (MaterialId::new(2), MaterialId::new(3), MaterialId::new(4));

        let Some(Plan::Moves { moves, .. }) = registry.plan_of(sand) else {
            panic!("sand should compile to moves");
        };
        assert!(moves.iter().all(|mv| mv.into.contains(air) && mv.into.contains(water)));
        assert!(!moves[0].into.contains(sand));

        let Some(Plan::Moves { moves, .. }) = registry.plan_of(gas) else {
            panic!("gas should compile to moves");
        };
        assert_eq!(moves[0].dy, Step::Fixed(-1));
        assert!(moves[0].into.contains(water) && moves[0].into.contains(sand));
        assert!(!moves[0].into.contains(air));

        assert!(matches!(
            registry.plan_of(MaterialId::new(1)),
            Some(Plan::Moves { moves, biased: false }) if moves.is_empty()
        ));
        assert!(matches!(registry.plan_of(air), Some(Plan::Inert)));
    }
}
