//! The asteroids game loop

use crate::assets;
use crate::components::{Actor, Asteroid, AsteroidSize, Body, Bullet, Ship};
use crate::config::GameplayConfig;
use crate::get_ready::GetReadyLoop;
use crate::hud::{Hud, Scoreboard, Starfield};
use crate::pilot::Autopilot;
use nalgebra::Rotation2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sprite_engine::prelude::*;
use std::cell::RefCell;
use std::f32::consts::TAU;
use std::rc::Rc;

/// Radians between the two halves of a split asteroid
const SPLIT_SPREAD: f32 = 0.5;
/// Speed multiplier applied to split halves
const SPLIT_SPEEDUP: f32 = 1.4;
/// Asteroids never spawn closer than this to the ship
const SAFE_SPAWN_DISTANCE: f32 = 150.0;
/// Background scroll speed
const STARFIELD_DRIFT: f32 = -12.0;

/// Uniform point inside `field`; a degenerate field yields its corner
fn random_point(rng: &mut StdRng, field: Vec2) -> Vec2 {
    Vec2::new(rng.gen::<f32>() * field.x, rng.gen::<f32>() * field.y)
}

/// Main game loop: one playfield, several waves, a few lives
pub struct AsteroidsLoop {
    world: World,
    gameplay: GameplayConfig,
    field: Vec2,
    rng: StdRng,
    autopilot: Autopilot,
    board: Scoreboard,
    starfield: Rc<OffsetTransform>,
    actors: Rc<Layer>,
    bullet_layer: Rc<Layer>,
    ship: Actor<Ship>,
    asteroids: Vec<Actor<Asteroid>>,
    bullets: Vec<Rc<RefCell<Bullet>>>,
    fire_cooldown: f32,
    countdown_pending: bool,
}

impl AsteroidsLoop {
    /// Set up the playfield for a `field`-sized surface
    pub fn new(gameplay: GameplayConfig, field: Vec2) -> Self {
        let mut rng = match gameplay.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let board = Scoreboard::new(gameplay.starting_lives);

        let world = World::new(field);
        let starfield = Rc::new(OffsetTransform::new(Vec2::zeros()));
        let background = Layer::new("background").with_transform(starfield.clone());
        let stars = (0..96)
            .map(|_| random_point(&mut rng, field))
            .collect();
        background.add(RenderableHandle::new(Starfield::new(stars, field)));
        world.add_layer(Rc::new(background));

        let actors = world.layer("actors");
        let bullet_layer =
            Rc::new(Layer::new("bullets").with_transform(Rc::new(BlendTransform::new(BlendMode::Additive))));
        world.add_layer(Rc::clone(&bullet_layer));
        world.layer("hud").add(RenderableHandle::new(Hud::new(board.clone())));

        let ship = Actor::new(Ship::spawn(field * 0.5, gameplay.respawn_invulnerability));
        actors.add(ship.handle.clone());

        Self {
            world,
            gameplay,
            field,
            rng,
            autopilot: Autopilot::default(),
            board,
            starfield,
            actors,
            bullet_layer,
            ship,
            asteroids: Vec::new(),
            bullets: Vec::new(),
            fire_cooldown: 0.0,
            countdown_pending: true,
        }
    }

    /// Points scored so far
    pub fn score(&self) -> u32 {
        self.board.score.get()
    }

    /// Ships left
    pub fn lives(&self) -> u32 {
        self.board.lives.get()
    }

    /// Current wave
    pub fn wave(&self) -> u32 {
        self.board.wave.get()
    }

    /// Asteroids on the field
    pub fn asteroid_count(&self) -> usize {
        self.asteroids.len()
    }

    /// Bullets in flight
    pub fn bullet_count(&self) -> usize {
        self.bullets.len()
    }

    fn countdown(&self, message: &str) -> LoopControl {
        LoopControl::Push(Box::new(GetReadyLoop::new(
            self.field,
            message,
            self.gameplay.get_ready_seconds,
        )))
    }

    fn spawn_asteroid(
        &mut self,
        resources: &mut Resources,
        size: AsteroidSize,
        position: Vec2,
        velocity: Vec2,
    ) -> Result<(), LoopError> {
        let image = resources.image(size.sprite_reference())?;
        let asteroid = Actor::new(Asteroid::new(size, position, velocity, image));
        self.actors.add(asteroid.handle.clone());
        self.asteroids.push(asteroid);
        Ok(())
    }

    fn spawn_wave(&mut self, resources: &mut Resources) -> Result<(), LoopError> {
        let count = self.gameplay.asteroid_count + self.wave() - 1;
        let ship_position = self.ship.shared.borrow().body.position;
        for _ in 0..count {
            let mut position = random_point(&mut self.rng, self.field);
            if (position - ship_position).norm() < SAFE_SPAWN_DISTANCE {
                position = sprite_engine::foundation::math::utils::wrap(position + self.field * 0.5, self.field);
            }
            let angle = self.rng.gen_range(0.0..TAU);
            let speed = self.rng.gen_range(30.0..80.0) * self.gameplay.difficulty;
            let velocity = Rotation2::new(angle) * Vec2::new(speed, 0.0);
            self.spawn_asteroid(resources, AsteroidSize::Large, position, velocity)?;
        }
        log::info!("Wave {}: {} asteroids", self.wave(), count);
        Ok(())
    }

    fn fire(&mut self, dt: f32, wants_to_fire: bool) {
        self.fire_cooldown = (self.fire_cooldown - dt).max(0.0);
        if !wants_to_fire || self.fire_cooldown > 0.0 || self.bullets.len() >= self.gameplay.max_bullets {
            return;
        }
        let (nose, velocity) = {
            let ship = self.ship.shared.borrow();
            (ship.nose(), ship.body.velocity + ship.forward() * self.gameplay.bullet_speed)
        };
        let bullet = Bullet::fire(&self.bullet_layer, nose, velocity, self.gameplay.bullet_lifetime);
        self.bullets.push(bullet);
        self.fire_cooldown = self.gameplay.fire_cooldown;
    }

    /// Spend bullets that hit something and break the rocks they hit
    fn resolve_hits(&mut self, resources: &mut Resources) -> Result<(), LoopError> {
        let mut destroyed: Vec<usize> = Vec::new();
        for bullet in &self.bullets {
            let mut bullet = bullet.borrow_mut();
            if bullet.is_spent() {
                continue;
            }
            let hit = self
                .asteroids
                .iter()
                .enumerate()
                .find(|(index, asteroid)| {
                    !destroyed.contains(index) && asteroid.shared.borrow().body.overlaps(&bullet.body)
                })
                .map(|(index, _)| index);
            if let Some(index) = hit {
                bullet.spend();
                destroyed.push(index);
            }
        }

        destroyed.sort_unstable_by(|a, b| b.cmp(a));
        for index in destroyed {
            let asteroid = self.asteroids.remove(index);
            self.actors.remove(&asteroid.handle);
            let (size, body) = {
                let rock = asteroid.shared.borrow();
                (rock.size, rock.body.clone())
            };
            self.board.award(size.points());
            if let Some(smaller) = size.split_into() {
                for side in [-1.0, 1.0] {
                    let velocity = Rotation2::new(side * SPLIT_SPREAD) * body.velocity * SPLIT_SPEEDUP;
                    self.spawn_asteroid(resources, smaller, body.position, velocity)?;
                }
            }
        }
        Ok(())
    }

    fn ship_collides(&self) -> bool {
        let ship = self.ship.shared.borrow();
        ship.is_vulnerable()
            && self
                .asteroids
                .iter()
                .any(|asteroid| asteroid.shared.borrow().body.overlaps(&ship.body))
    }

    fn lose_life(&mut self) -> LoopControl {
        let lives = self.lives().saturating_sub(1);
        self.board.lives.set(lives);
        if lives == 0 {
            log::info!("Game over with {} points", self.score());
            return LoopControl::Finish;
        }
        log::info!("Ship destroyed, {} lives left", lives);
        *self.ship.shared.borrow_mut() = Ship::spawn(self.field * 0.5, self.gameplay.respawn_invulnerability);
        self.countdown(&format!("{} SHIPS LEFT", lives))
    }
}

impl GameLoop for AsteroidsLoop {
    fn name(&self) -> &str {
        "asteroids"
    }

    fn world(&self) -> &World {
        &self.world
    }

    fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    fn on_start(&mut self, resources: &mut Resources) -> Result<(), LoopError> {
        assets::register_sprites(resources);
        self.spawn_wave(resources)
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Result<LoopControl, LoopError> {
        if self.countdown_pending {
            self.countdown_pending = false;
            return Ok(self.countdown("GET READY"));
        }

        let dt = ctx.delta_time;
        self.starfield.translate(Vec2::new(STARFIELD_DRIFT * dt, 0.0));
        if self.starfield.offset().x <= -self.field.x {
            self.starfield.translate(Vec2::new(self.field.x, 0.0));
        }

        let targets: Vec<Body> = self.asteroids.iter().map(|a| a.shared.borrow().body.clone()).collect();
        let controls = {
            let mut ship = self.ship.shared.borrow_mut();
            let controls = self.autopilot.decide(&ship, &targets);
            ship.steer(&controls, &self.gameplay, dt);
            ship.body.integrate(dt, self.field);
            controls
        };
        self.fire(dt, controls.fire);

        for asteroid in &self.asteroids {
            asteroid.shared.borrow_mut().body.integrate(dt, self.field);
        }
        for bullet in &self.bullets {
            let mut bullet = bullet.borrow_mut();
            bullet.body.integrate(dt, self.field);
            bullet.ttl -= dt;
        }

        self.resolve_hits(ctx.resources)?;
        // Spent bullets stay on their layer until they remove themselves
        self.bullets.retain(|bullet| !bullet.borrow().is_spent());

        if self.ship_collides() {
            return Ok(self.lose_life());
        }

        if self.asteroids.is_empty() {
            self.board.wave.set(self.wave() + 1);
            self.spawn_wave(ctx.resources)?;
        }
        Ok(LoopControl::Continue)
    }

    fn on_suspend(&mut self) {
        log::debug!("Asteroids paused at score {}", self.score());
    }

    fn on_resume(&mut self) {
        log::debug!("Asteroids resumed");
    }

    fn on_finish(&mut self) {
        log::info!(
            "Final score {} after {} waves ({} lives left)",
            self.score(),
            self.wave(),
            self.lives()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gameplay() -> GameplayConfig {
        GameplayConfig {
            seed: Some(7),
            asteroid_count: 2,
            ..GameplayConfig::default()
        }
    }

    fn tick(game: &mut AsteroidsLoop, resources: &mut Resources, frame: u64) -> LoopControl {
        let mut ctx = TickContext {
            delta_time: 1.0 / 60.0,
            frame,
            resources,
        };
        game.tick(&mut ctx).unwrap()
    }

    #[test]
    fn test_start_spawns_first_wave_and_asks_for_countdown() {
        let mut resources = Resources::default();
        let mut game = AsteroidsLoop::new(gameplay(), Vec2::new(640.0, 480.0));
        game.on_start(&mut resources).unwrap();

        assert_eq!(game.asteroid_count(), 2);
        assert_eq!(game.world().layer_names(), vec!["background", "actors", "bullets", "hud"]);
        assert!(matches!(tick(&mut game, &mut resources, 0), LoopControl::Push(_)));
        assert!(matches!(tick(&mut game, &mut resources, 1), LoopControl::Continue));
    }

    #[test]
    fn test_empty_field_does_not_panic() {
        let mut resources = Resources::default();
        let mut game = AsteroidsLoop::new(gameplay(), Vec2::zeros());
        game.on_start(&mut resources).unwrap();
        assert_eq!(game.asteroid_count(), 2);
    }

    #[test]
    fn test_point_blank_hit_splits_asteroid() {
        let mut resources = Resources::default();
        let mut game = AsteroidsLoop::new(
            GameplayConfig {
                asteroid_count: 0,
                ..gameplay()
            },
            Vec2::new(640.0, 480.0),
        );
        game.on_start(&mut resources).unwrap();
        game.countdown_pending = false;

        // A rock sitting just above the ship's nose
        let ship_position = game.ship.shared.borrow().body.position;
        game.spawn_asteroid(&mut resources, AsteroidSize::Large, ship_position - Vec2::new(0.0, 60.0), Vec2::zeros())
            .unwrap();

        let mut frame = 0;
        while game.score() == 0 && frame < 120 {
            tick(&mut game, &mut resources, frame);
            frame += 1;
        }

        assert_eq!(game.score(), AsteroidSize::Large.points());
        assert_eq!(game.asteroid_count(), 2);
        assert!(game
            .asteroids
            .iter()
            .all(|asteroid| asteroid.shared.borrow().size == AsteroidSize::Medium));
    }

    #[test]
    fn test_collision_costs_a_life_then_ends_game() {
        let mut resources = Resources::default();
        let mut game = AsteroidsLoop::new(
            GameplayConfig {
                starting_lives: 2,
                asteroid_count: 0,
                respawn_invulnerability: 0.0,
                ..gameplay()
            },
            Vec2::new(640.0, 480.0),
        );
        game.on_start(&mut resources).unwrap();
        game.countdown_pending = false;

        let center = game.ship.shared.borrow().body.position;
        game.spawn_asteroid(&mut resources, AsteroidSize::Small, center, Vec2::zeros()).unwrap();

        assert!(matches!(tick(&mut game, &mut resources, 0), LoopControl::Push(_)));
        assert_eq!(game.lives(), 1);
        // Respawned in the same spot, so the next tick ends the game
        assert!(matches!(tick(&mut game, &mut resources, 1), LoopControl::Finish));
        assert_eq!(game.lives(), 0);
    }

    #[test]
    fn test_cleared_field_starts_next_wave() {
        let mut resources = Resources::default();
        let mut game = AsteroidsLoop::new(
            GameplayConfig {
                asteroid_count: 0,
                ..gameplay()
            },
            Vec2::new(640.0, 480.0),
        );
        game.on_start(&mut resources).unwrap();
        game.countdown_pending = false;
        assert_eq!(game.asteroid_count(), 0);

        tick(&mut game, &mut resources, 0);
        assert_eq!(game.wave(), 2);
        // Wave two adds one rock on top of the configured count
        assert_eq!(game.asteroid_count(), 1);
    }
}
