//! Commodity trading and the planet shops.
//!
//! Every planet has a fixed commodity price table (see [`crate::planet`]) and
//! a short list of shop items.  Transactions arrive as [`TradeRequest`]
//! messages from the UI layer and are applied by [`trade_request_system`]
//! while docked; the pure `buy_*`/`sell_*` functions hold the actual rules so
//! they can be tested without a world.
//!
//! ## Shop catalog
//!
//! | id      | item            | cost | effect                         |
//! |---------|-----------------|------|--------------------------------|
//! | weapon1 | Mining Laser    |  150 | mining weapon, 2 dmg / 35 cd   |
//! | weapon2 | Rapid Laser     |  600 | rapid weapon, 5 dmg / 12 cd    |
//! | weapon3 | Plasma Cannon   | 1200 | plasma weapon, 20 dmg / 35 cd  |
//! | shield1 | Shield Booster  |  500 | +25 max shield                 |
//! | shield2 | Heavy Shields   | 1500 | +50 max shield                 |
//! | engine2 | Tuned Engine    |  800 | +50 % thrust, +30 % top speed  |
//! | engine3 | Military Engine | 2000 | +100 % thrust, +60 % top speed |
//! | cargo1  | Cargo Pod       |  400 | +5 cargo capacity              |
//! | cargo2  | Cargo Bay       | 1000 | +10 cargo capacity             |

use crate::constants::{PLAYER_MAX_SPEED, PLAYER_THRUST};
use crate::error::{GameError, GameResult};
use crate::planet::{Commodity, Planet, Planets};
use crate::projectile::{WeaponKind, WeaponProfile};
use crate::session::{GameState, SimSet};
use crate::ship::{CargoHold, DockingStatus, Hull, PlayerShip, PlayerWallet, ShipLoadout, WeaponRack};
use bevy::prelude::*;

// ── Shop catalog ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShopEffect {
    Weapon(WeaponProfile),
    ShieldBoost(f32),
    /// Multipliers over the *base* engine stats; upgrades replace, they do
    /// not compound.
    Engine {
        thrust_mult: f32,
        speed_mult: f32,
    },
    CargoExpansion(u32),
}

#[derive(Debug, Clone, Copy)]
pub struct ShopItem {
    pub id: &'static str,
    pub name: &'static str,
    pub cost: u32,
    pub effect: ShopEffect,
}

pub static SHOP_CATALOG: [ShopItem; 9] = [
    ShopItem {
        id: "weapon1",
        name: "Mining Laser",
        cost: 150,
        effect: ShopEffect::Weapon(WeaponProfile {
            kind: WeaponKind::Mining,
            damage: 2.0,
            cooldown: 35,
        }),
    },
    ShopItem {
        id: "weapon2",
        name: "Rapid Laser",
        cost: 600,
        effect: ShopEffect::Weapon(WeaponProfile {
            kind: WeaponKind::Rapid,
            damage: 5.0,
            cooldown: 12,
        }),
    },
    ShopItem {
        id: "weapon3",
        name: "Plasma Cannon",
        cost: 1200,
        effect: ShopEffect::Weapon(WeaponProfile {
            kind: WeaponKind::Plasma,
            damage: 20.0,
            cooldown: 35,
        }),
    },
    ShopItem {
        id: "shield1",
        name: "Shield Booster",
        cost: 500,
        effect: ShopEffect::ShieldBoost(25.0),
    },
    ShopItem {
        id: "shield2",
        name: "Heavy Shields",
        cost: 1500,
        effect: ShopEffect::ShieldBoost(50.0),
    },
    ShopItem {
        id: "engine2",
        name: "Tuned Engine",
        cost: 800,
        effect: ShopEffect::Engine {
            thrust_mult: 1.5,
            speed_mult: 1.3,
        },
    },
    ShopItem {
        id: "engine3",
        name: "Military Engine",
        cost: 2000,
        effect: ShopEffect::Engine {
            thrust_mult: 2.0,
            speed_mult: 1.6,
        },
    },
    ShopItem {
        id: "cargo1",
        name: "Cargo Pod",
        cost: 400,
        effect: ShopEffect::CargoExpansion(5),
    },
    ShopItem {
        id: "cargo2",
        name: "Cargo Bay",
        cost: 1000,
        effect: ShopEffect::CargoExpansion(10),
    },
];

pub fn catalog_item(id: &str) -> Option<&'static ShopItem> {
    SHOP_CATALOG.iter().find(|item| item.id == id)
}

// ── Transaction rules ─────────────────────────────────────────────────────────

/// Buy `units` of a commodity at this planet's price.  Returns the total
/// cost on success; the wallet and hold are only touched when everything
/// fits.
pub fn buy_commodity(
    planet: &Planet,
    commodity: Commodity,
    units: u32,
    wallet: &mut PlayerWallet,
    cargo: &mut CargoHold,
) -> GameResult<u32> {
    let cost = planet.price(commodity) * units;
    if wallet.credits < cost {
        return Err(GameError::InsufficientCredits {
            need: cost,
            have: wallet.credits,
        });
    }
    if cargo.free_space() < units {
        return Err(GameError::CargoFull {
            free: cargo.free_space(),
            requested: units,
        });
    }
    wallet.credits -= cost;
    cargo.add(commodity, units);
    Ok(cost)
}

/// Sell `units` of a commodity at this planet's price.  Returns the payout.
pub fn sell_commodity(
    planet: &Planet,
    commodity: Commodity,
    units: u32,
    wallet: &mut PlayerWallet,
    cargo: &mut CargoHold,
) -> GameResult<u32> {
    let held = cargo.amount(commodity);
    if held < units {
        return Err(GameError::InsufficientCargo {
            have: held,
            requested: units,
        });
    }
    cargo.remove(commodity, units);
    let payout = planet.price(commodity) * units;
    wallet.credits += payout;
    Ok(payout)
}

/// Buy a shop item by id and apply its effect to the ship.
#[allow(clippy::too_many_arguments)]
pub fn buy_shop_item(
    planet: &Planet,
    item_id: &str,
    wallet: &mut PlayerWallet,
    rack: &mut WeaponRack,
    loadout: &mut ShipLoadout,
    hull: &mut Hull,
    cargo: &mut CargoHold,
) -> GameResult<&'static ShopItem> {
    let item = catalog_item(item_id).ok_or(GameError::ItemNotStocked { item: "unknown" })?;
    if !planet.stocks(item.id) {
        return Err(GameError::ItemNotStocked { item: item.id });
    }
    if let ShopEffect::Weapon(profile) = item.effect {
        if rack.weapons.iter().any(|w| w.kind == profile.kind) {
            return Err(GameError::AlreadyOwned { item: item.id });
        }
    }
    if wallet.credits < item.cost {
        return Err(GameError::InsufficientCredits {
            need: item.cost,
            have: wallet.credits,
        });
    }
    wallet.credits -= item.cost;

    match item.effect {
        ShopEffect::Weapon(profile) => {
            rack.weapons.push(profile);
            rack.current = rack.weapons.len() - 1;
        }
        ShopEffect::ShieldBoost(boost) => {
            hull.max_shield += boost;
            hull.shield = hull.max_shield;
        }
        ShopEffect::Engine {
            thrust_mult,
            speed_mult,
        } => {
            loadout.thrust = PLAYER_THRUST * thrust_mult;
            loadout.max_speed = PLAYER_MAX_SPEED * speed_mult;
        }
        ShopEffect::CargoExpansion(extra) => {
            cargo.capacity += extra;
        }
    }
    Ok(item)
}

// ── Message plumbing ──────────────────────────────────────────────────────────

/// A trade or shop transaction requested by the UI while docked.
#[derive(Message, Debug, Clone)]
pub enum TradeRequest {
    BuyCommodity { commodity: Commodity, units: u32 },
    SellCommodity { commodity: Commodity, units: u32 },
    BuyItem { item: String },
}

/// Apply queued trade requests.  Anything attempted while undocked, and any
/// transaction the rules reject, is logged and dropped.
#[allow(clippy::type_complexity)]
pub fn trade_request_system(
    mut requests: MessageReader<TradeRequest>,
    planets: Res<Planets>,
    docking: Res<DockingStatus>,
    mut wallet: ResMut<PlayerWallet>,
    mut rack: ResMut<WeaponRack>,
    mut loadout: ResMut<ShipLoadout>,
    mut q_player: Query<(&mut Hull, &mut CargoHold), With<PlayerShip>>,
) {
    let Ok((mut hull, mut cargo)) = q_player.single_mut() else {
        return;
    };

    for request in requests.read() {
        let Some(planet_id) = docking.docked_at else {
            warn!("{}", GameError::NotDocked);
            continue;
        };
        let planet = planets.get(planet_id);

        let outcome = match request {
            TradeRequest::BuyCommodity { commodity, units } => {
                buy_commodity(planet, *commodity, *units, &mut wallet, &mut cargo).map(|cost| {
                    format!("bought {} {} for {} cr", units, commodity.label(), cost)
                })
            }
            TradeRequest::SellCommodity { commodity, units } => {
                sell_commodity(planet, *commodity, *units, &mut wallet, &mut cargo).map(|payout| {
                    format!("sold {} {} for {} cr", units, commodity.label(), payout)
                })
            }
            TradeRequest::BuyItem { item } => buy_shop_item(
                planet,
                item,
                &mut wallet,
                &mut rack,
                &mut loadout,
                &mut hull,
                &mut cargo,
            )
            .map(|item| format!("installed {}", item.name)),
        };

        match outcome {
            Ok(message) => info!("{}: {}", planet.name, message),
            Err(e) => warn!("trade refused: {}", e),
        }
    }
}

pub struct TradingPlugin;

impl Plugin for TradingPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<TradeRequest>().add_systems(
            Update,
            trade_request_system
                .in_set(SimSet::Commerce)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planet::PlanetId;

    fn terra() -> Planet {
        Planets::default().get(PlanetId(0)).clone()
    }

    #[test]
    fn commodity_round_trip_moves_credits_and_cargo() {
        let planet = terra();
        let mut wallet = PlayerWallet { credits: 250 };
        let mut cargo = CargoHold::empty(10);

        // Food at Terra Nova costs 15.
        let cost = buy_commodity(&planet, Commodity::Food, 3, &mut wallet, &mut cargo).unwrap();
        assert_eq!(cost, 45);
        assert_eq!(wallet.credits, 205);
        assert_eq!(cargo.amount(Commodity::Food), 3);

        let payout = sell_commodity(&planet, Commodity::Food, 3, &mut wallet, &mut cargo).unwrap();
        assert_eq!(payout, 45);
        assert_eq!(wallet.credits, 250);
        assert_eq!(cargo.total(), 0);
    }

    #[test]
    fn purchases_fail_cleanly_without_side_effects() {
        let planet = terra();
        let mut wallet = PlayerWallet { credits: 20 };
        let mut cargo = CargoHold::empty(2);

        let err = buy_commodity(&planet, Commodity::Tech, 1, &mut wallet, &mut cargo).unwrap_err();
        assert_eq!(err, GameError::InsufficientCredits { need: 120, have: 20 });
        assert_eq!(wallet.credits, 20);

        wallet.credits = 1000;
        let err = buy_commodity(&planet, Commodity::Food, 5, &mut wallet, &mut cargo).unwrap_err();
        assert_eq!(err, GameError::CargoFull { free: 2, requested: 5 });
        assert_eq!(wallet.credits, 1000, "refused trades never charge");

        let err = sell_commodity(&planet, Commodity::Ore, 1, &mut wallet, &mut cargo).unwrap_err();
        assert_eq!(err, GameError::InsufficientCargo { have: 0, requested: 1 });
    }

    #[test]
    fn shop_installs_weapons_and_rejects_duplicates() {
        let planet = terra();
        let mut wallet = PlayerWallet { credits: 1000 };
        let mut rack = WeaponRack::default();
        let mut loadout = ShipLoadout::default();
        let mut hull = Hull {
            hp: 100.0,
            max_hp: 100.0,
            shield: 0.0,
            max_shield: 0.0,
        };
        let mut cargo = CargoHold::empty(10);

        let item = buy_shop_item(
            &planet, "weapon1", &mut wallet, &mut rack, &mut loadout, &mut hull, &mut cargo,
        )
        .unwrap();
        assert_eq!(item.name, "Mining Laser");
        assert_eq!(wallet.credits, 850);
        assert_eq!(rack.weapons.len(), 1);
        assert_eq!(rack.current, 0, "new weapon becomes the selected one");

        let err = buy_shop_item(
            &planet, "weapon1", &mut wallet, &mut rack, &mut loadout, &mut hull, &mut cargo,
        )
        .unwrap_err();
        assert_eq!(err, GameError::AlreadyOwned { item: "weapon1" });
        assert_eq!(wallet.credits, 850);
    }

    #[test]
    fn engine_upgrades_replace_rather_than_compound() {
        let planet = terra();
        let mut wallet = PlayerWallet { credits: 5000 };
        let mut rack = WeaponRack::default();
        let mut loadout = ShipLoadout::default();
        let mut hull = Hull {
            hp: 100.0,
            max_hp: 100.0,
            shield: 0.0,
            max_shield: 0.0,
        };
        let mut cargo = CargoHold::empty(10);

        buy_shop_item(
            &planet, "engine2", &mut wallet, &mut rack, &mut loadout, &mut hull, &mut cargo,
        )
        .unwrap();
        assert!((loadout.thrust - PLAYER_THRUST * 1.5).abs() < 1e-6);
        assert!((loadout.max_speed - PLAYER_MAX_SPEED * 1.3).abs() < 1e-6);

        // Ice World stocks engine3; buying it replaces the multiplier.
        let ice = Planets::default().get(PlanetId(2)).clone();
        buy_shop_item(
            &ice, "engine3", &mut wallet, &mut rack, &mut loadout, &mut hull, &mut cargo,
        )
        .unwrap();
        assert!((loadout.thrust - PLAYER_THRUST * 2.0).abs() < 1e-6);
        assert!((loadout.max_speed - PLAYER_MAX_SPEED * 1.6).abs() < 1e-6);
    }

    #[test]
    fn shield_purchase_raises_the_cap_and_recharges() {
        let planet = terra();
        let mut wallet = PlayerWallet { credits: 600 };
        let mut rack = WeaponRack::default();
        let mut loadout = ShipLoadout::default();
        let mut hull = Hull {
            hp: 80.0,
            max_hp: 100.0,
            shield: 0.0,
            max_shield: 0.0,
        };
        let mut cargo = CargoHold::empty(10);

        buy_shop_item(
            &planet, "shield1", &mut wallet, &mut rack, &mut loadout, &mut hull, &mut cargo,
        )
        .unwrap();
        assert_eq!(hull.max_shield, 25.0);
        assert_eq!(hull.shield, 25.0);
        assert_eq!(hull.hp, 80.0, "shields do not repair the hull");
    }

    #[test]
    fn planets_only_sell_what_they_stock() {
        let planet = terra();
        let mut wallet = PlayerWallet { credits: 5000 };
        let mut rack = WeaponRack::default();
        let mut loadout = ShipLoadout::default();
        let mut hull = Hull {
            hp: 100.0,
            max_hp: 100.0,
            shield: 0.0,
            max_shield: 0.0,
        };
        let mut cargo = CargoHold::empty(10);

        // Terra Nova does not stock the plasma cannon.
        let err = buy_shop_item(
            &planet, "weapon3", &mut wallet, &mut rack, &mut loadout, &mut hull, &mut cargo,
        )
        .unwrap_err();
        assert_eq!(err, GameError::ItemNotStocked { item: "weapon3" });
    }
}
