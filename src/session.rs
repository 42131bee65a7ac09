//! One play-through's worth of state, and the gameplay tick that drives it.
//!
//! The session owns the timer, the world, the player and every manager side
//! by side; systems that need each other are handed the pieces explicitly
//! for the duration of a call.

use glam::Vec2;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::camera::Camera;
use crate::config::GameConfig;
use crate::consumable::ConsumableManager;
use crate::enemy::EnemyManager;
use crate::entities::Pickup;
use crate::error::GameError;
use crate::input::{Action, InputSnapshot};
use crate::player::Player;
use crate::render::Canvas;
use crate::shop::Shop;
use crate::timer::{Clock, Timer};
use crate::wave::{WaveManager, WaveStatus};
use crate::weapon::WeaponManager;
use crate::world::World;

#[derive(Clone, Debug, PartialEq)]
pub struct SessionSettings {
    pub world_size: Vec2,
    /// Size of the visible area in world units.
    pub screen_size: Vec2,
    /// Weapon definition equipped at the start of every run.
    pub starting_weapon: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            world_size: Vec2::new(4096.0, 4096.0),
            screen_size: Vec2::new(1600.0, 900.0),
            starting_weapon: "arcane_bolt".to_string(),
        }
    }
}

/// What a gameplay tick reports back to the state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    PlayerDied,
}

pub struct Session {
    pub config: GameConfig,
    pub settings: SessionSettings,
    pub timer: Timer,
    pub world: World,
    pub camera: Camera,
    pub player: Player,
    pub enemies: EnemyManager,
    pub weapons: WeaponManager,
    pub waves: WaveManager,
    pub consumables: ConsumableManager,
    pub shop: Shop,
    pub rng: StdRng,
    pub quit_requested: bool,
}

impl Session {
    pub fn new(
        config: GameConfig,
        settings: SessionSettings,
        clock: Box<dyn Clock>,
        rng: StdRng,
    ) -> Result<Self, GameError> {
        let world = World::new(settings.world_size.x, settings.world_size.y);
        let mut session = Session {
            timer: Timer::new(clock),
            camera: Camera::new(settings.screen_size, settings.world_size),
            player: Player::new(world.size() * 0.5),
            world,
            enemies: EnemyManager::new(),
            weapons: WeaponManager::new(config.weapons.clone()),
            waves: WaveManager::new(config.waves.clone(), config.enemies.clone()),
            consumables: ConsumableManager::new(config.consumables.clone()),
            shop: Shop::new(config.shop.clone()),
            rng,
            quit_requested: false,
            config,
            settings,
        };
        session.reset()?;
        Ok(session)
    }

    /// Current reading of the shared game timer.
    pub fn now(&self) -> f64 {
        self.timer.get_time()
    }

    /// Put every gameplay object back to its starting state.  The timer is
    /// zeroed and left stopped.
    pub fn reset(&mut self) -> Result<(), GameError> {
        self.timer.reset();
        self.world = World::new(self.settings.world_size.x, self.settings.world_size.y);
        self.camera = Camera::new(self.settings.screen_size, self.settings.world_size);
        self.player = Player::new(self.world.size() * 0.5);
        self.enemies.clear();
        self.weapons.clear();
        self.weapons.equip_weapon(&self.settings.starting_weapon)?;
        self.player.inventory.equip_weapon(&self.settings.starting_weapon);
        self.waves.reset();
        self.shop = Shop::new(self.config.shop.clone());
        self.camera.update(self.player.position);
        info!("session reset");
        Ok(())
    }

    /// Start the first wave if no wave has run yet.
    pub fn begin(&mut self) {
        if self.waves.status() == WaveStatus::Idle {
            let now = self.now();
            self.waves.start_wave(0, now);
        }
    }

    pub fn set_screen_size(&mut self, screen_size: Vec2) {
        self.settings.screen_size = screen_size;
        self.camera.screen_size = screen_size;
        self.camera.update(self.player.position);
    }

    /// One gameplay tick.  Input first, then movement and firing, timed
    /// effects, spawns, projectile hits, enemy behaviour and contact damage,
    /// dead-enemy removal, item drops, pickups, and floating text.
    pub fn tick(&mut self, input: &InputSnapshot) -> TickOutcome {
        let now = self.now();

        self.player.move_by(input.movement, self.world.size());
        self.camera.update(self.player.position);

        for action in &input.actions {
            if let Action::UseSlot(slot) = *action {
                self.player
                    .use_consumable(slot, now, &mut self.world, &mut self.rng);
            }
        }
        if input.fire {
            let target = self.camera.to_world(input.pointer);
            self.weapons
                .fire_weapon(self.player.position, target, &self.player.stats, now);
        }

        self.player.update(now);

        self.waves.update(
            now,
            &mut self.enemies,
            &self.camera,
            &self.world,
            &mut self.rng,
        );
        self.weapons.update(
            &mut self.enemies.enemies,
            now,
            &mut self.world,
            &mut self.rng,
        );
        self.enemies
            .update(&mut self.player, now, &mut self.world, &mut self.rng);
        self.drop_loot();

        self.world.check_shard_collection(&mut self.player);
        self.world.check_item_collection(&mut self.player);
        self.world.update(now);

        if self.player.is_dead() {
            TickOutcome::PlayerDied
        } else {
            TickOutcome::Continue
        }
    }

    /// Roll an item drop, weighted by the player's luck, for every enemy that
    /// fell this tick.
    pub fn drop_loot(&mut self) {
        for spot in self.world.take_fallen() {
            if let Some(item) = self.consumables.roll_loot(self.player.stats.luck, &mut self.rng) {
                debug!(name = %item.name, position = ?spot, "item dropped");
                self.world.add_pickup(Pickup::item(spot, item));
            }
        }
    }

    /// Hand the whole scene to `canvas`, back to front.
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        let now = self.now();
        self.world.draw_pickups(canvas, &self.camera);
        self.enemies.draw(canvas, &self.camera, now);
        self.weapons.draw(canvas, &self.camera);
        self.player.draw(canvas, &self.camera);
        self.world.draw_floating_texts(canvas, &self.camera, now);
    }
}
