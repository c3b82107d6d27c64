//! Static world geography: planets, commodity price tables, and shop stock.
//!
//! Planets never move and are not entities; they live in the [`Planets`]
//! resource and are referenced everywhere by [`PlanetId`].  Prices are fixed
//! per planet, so the trade loop is "buy low here, fly there, sell high".

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Tradeable commodity classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Commodity {
    Food,
    Ore,
    Tech,
    FuelCells,
    Weapons,
    Luxury,
}

impl Commodity {
    pub const ALL: [Commodity; 6] = [
        Commodity::Food,
        Commodity::Ore,
        Commodity::Tech,
        Commodity::FuelCells,
        Commodity::Weapons,
        Commodity::Luxury,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Commodity::Food => "Food",
            Commodity::Ore => "Ore",
            Commodity::Tech => "Tech",
            Commodity::FuelCells => "Fuel Cells",
            Commodity::Weapons => "Weapons",
            Commodity::Luxury => "Luxury Goods",
        }
    }
}

/// Index into [`Planets::table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanetId(pub usize);

/// One planet: position, landing radius, prices, and shop stock.
#[derive(Debug, Clone)]
pub struct Planet {
    pub name: &'static str,
    pub pos: Vec2,
    pub radius: f32,
    /// Prices indexed in [`Commodity::ALL`] order.
    prices: [u32; 6],
    /// Shop item ids stocked here; see [`crate::trading::SHOP_CATALOG`].
    pub shop_items: &'static [&'static str],
}

impl Planet {
    /// Unit price of a commodity at this planet.
    pub fn price(&self, commodity: Commodity) -> u32 {
        let idx = Commodity::ALL
            .iter()
            .position(|c| *c == commodity)
            .unwrap_or(0);
        self.prices[idx]
    }

    pub fn stocks(&self, item: &str) -> bool {
        self.shop_items.iter().any(|id| *id == item)
    }
}

/// All planets in the sector.
#[derive(Resource, Debug, Clone)]
pub struct Planets {
    pub table: Vec<Planet>,
}

impl Default for Planets {
    fn default() -> Self {
        // Price arrays follow Commodity::ALL order:
        // food, ore, tech, fuel_cells, weapons, luxury.
        Self {
            table: vec![
                Planet {
                    name: "Terra Nova",
                    pos: Vec2::new(500.0, 300.0),
                    radius: 40.0,
                    prices: [15, 70, 120, 85, 250, 280],
                    shop_items: &["weapon1", "shield1", "engine2", "weapon2"],
                },
                Planet {
                    name: "Crimson Moon",
                    pos: Vec2::new(-800.0, -600.0),
                    radius: 60.0,
                    prices: [40, 30, 180, 60, 150, 400],
                    shop_items: &["weapon1", "weapon2", "weapon3", "cargo1"],
                },
                Planet {
                    name: "Ice World",
                    pos: Vec2::new(1200.0, -400.0),
                    radius: 35.0,
                    prices: [35, 90, 100, 100, 300, 200],
                    shop_items: &["shield2", "engine3", "cargo2"],
                },
                Planet {
                    name: "Mining Station",
                    pos: Vec2::new(-400.0, 800.0),
                    radius: 25.0,
                    prices: [50, 25, 200, 70, 180, 350],
                    shop_items: &["weapon1", "cargo1", "cargo2", "engine2"],
                },
            ],
        }
    }
}

impl Planets {
    pub fn get(&self, id: PlanetId) -> &Planet {
        &self.table[id.0]
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// The planet closest to `pos`, with its distance.
    pub fn nearest(&self, pos: Vec2) -> Option<(PlanetId, f32)> {
        self.table
            .iter()
            .enumerate()
            .map(|(i, p)| (PlanetId(i), p.pos.distance(pos)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// A uniformly random planet id, optionally excluding one (used when a
    /// merchant picks its next destination).
    pub fn random_id(&self, exclude: Option<PlanetId>, rng: &mut impl rand::Rng) -> PlanetId {
        loop {
            let id = PlanetId(rng.gen_range(0..self.table.len()));
            if self.table.len() == 1 || Some(id) != exclude {
                return id;
            }
        }
    }
}
