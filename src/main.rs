use bevy::prelude::*;
use bevy::window::WindowResolution;

use startrader::asteroid::AsteroidPlugin;
use startrader::config::{self, GameConfig};
use startrader::events::GameEventsPlugin;
use startrader::mission::MissionPlugin;
use startrader::npc::NpcPlugin;
use startrader::pickup::PickupPlugin;
use startrader::projectile::ProjectilePlugin;
use startrader::save::SavePlugin;
use startrader::session::SessionPlugin;
use startrader::ship::PlayerPlugin;
use startrader::trading::TradingPlugin;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Star Trader".into(),
                resolution: WindowResolution::new(1280, 720),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::BLACK))
        // Compiled defaults first; load_game_config overwrites them from
        // assets/game.toml (if present) in the Startup schedule.
        .insert_resource(GameConfig::default())
        .add_systems(Startup, config::load_game_config)
        .add_plugins((
            SessionPlugin,
            GameEventsPlugin,
            PlayerPlugin,
            NpcPlugin,
            ProjectilePlugin,
            AsteroidPlugin,
            PickupPlugin,
            TradingPlugin,
            MissionPlugin,
            SavePlugin,
        ))
        .run();
}
