//! Game objects and how they draw themselves

use crate::config::GameplayConfig;
use crate::pilot::Controls;
use nalgebra::Rotation2;
use sprite_engine::foundation::math::utils;
use sprite_engine::prelude::*;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Position and motion of anything on the playfield
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Center
    pub position: Vec2,
    /// Units per second
    pub velocity: Vec2,
    /// Collision radius
    pub radius: f32,
}

impl Body {
    /// Create a body
    pub fn new(position: Vec2, velocity: Vec2, radius: f32) -> Self {
        Self {
            position,
            velocity,
            radius,
        }
    }

    /// Advance one tick, wrapping around the playfield edges
    pub fn integrate(&mut self, dt: f32, field: Vec2) {
        self.position = utils::wrap(self.position + self.velocity * dt, field);
    }

    /// Whether the two circles touch
    pub fn overlaps(&self, other: &Body) -> bool {
        let reach = self.radius + other.radius;
        (self.position - other.position).norm_squared() <= reach * reach
    }

    /// Axis-aligned box around the circle
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x - self.radius,
            self.position.y - self.radius,
            self.radius * 2.0,
            self.radius * 2.0,
        )
    }
}

/// A game object shared between the game logic and a layer
pub struct Actor<T> {
    /// Game-side access
    pub shared: Rc<RefCell<T>>,
    /// Layer-side handle to the same object
    pub handle: RenderableHandle,
}

impl<T: Renderable + 'static> Actor<T> {
    /// Wrap `object` for both sides
    pub fn new(object: T) -> Self {
        let shared = Rc::new(RefCell::new(object));
        let handle = RenderableHandle::from_shared(Rc::clone(&shared));
        Self { shared, handle }
    }
}

/// Player ship
#[derive(Debug, Clone)]
pub struct Ship {
    /// Motion
    pub body: Body,
    /// Radians clockwise from straight up
    pub heading: f32,
    /// Whether the engine fired this tick
    pub thrusting: bool,
    /// Seconds of invulnerability left
    pub invulnerable: f32,
}

impl Ship {
    /// Collision radius
    pub const RADIUS: f32 = 10.0;

    /// Spawn at rest, pointing up
    pub fn spawn(position: Vec2, invulnerable: f32) -> Self {
        Self {
            body: Body::new(position, Vec2::zeros(), Self::RADIUS),
            heading: 0.0,
            thrusting: false,
            invulnerable,
        }
    }

    /// Unit vector the nose points along
    pub fn forward(&self) -> Vec2 {
        Rotation2::new(self.heading) * Vec2::new(0.0, -1.0)
    }

    /// Where bullets leave the ship
    pub fn nose(&self) -> Vec2 {
        self.body.position + self.forward() * Self::RADIUS
    }

    /// Whether asteroids can hurt the ship
    pub fn is_vulnerable(&self) -> bool {
        self.invulnerable <= 0.0
    }

    /// Apply one tick of input
    pub fn steer(&mut self, controls: &Controls, gameplay: &GameplayConfig, dt: f32) {
        self.heading += controls.turn.clamp(-1.0, 1.0) * gameplay.ship_rotation_speed * dt;
        self.thrusting = controls.thrust;
        if controls.thrust {
            self.body.velocity += self.forward() * gameplay.ship_acceleration * dt;
        }
        let speed = self.body.velocity.norm();
        if speed > gameplay.ship_max_speed {
            self.body.velocity *= gameplay.ship_max_speed / speed;
        }
        self.invulnerable = (self.invulnerable - dt).max(0.0);
    }

    fn hull(&self) -> [Vec2; 3] {
        let rotation = Rotation2::new(self.heading);
        let center = self.body.position;
        let r = Self::RADIUS;
        [
            center + rotation * Vec2::new(0.0, -r),
            center + rotation * Vec2::new(-0.7 * r, 0.8 * r),
            center + rotation * Vec2::new(0.7 * r, 0.8 * r),
        ]
    }
}

impl Renderable for Ship {
    fn draw(&mut self, ctx: &mut RenderContext) {
        // Blink while invulnerable
        if !self.is_vulnerable() && ctx.frame() % 8 < 4 {
            return;
        }
        let [nose, left, right] = self.hull();
        ctx.draw_line(nose, left, Color::WHITE);
        ctx.draw_line(left, right, Color::WHITE);
        ctx.draw_line(right, nose, Color::WHITE);
        if self.thrusting {
            let tail = self.body.position - self.forward() * Self::RADIUS * 1.5;
            ctx.draw_line((left + right) * 0.5, tail, Color::rgb(1.0, 0.6, 0.1));
        }
    }
}

/// Asteroid size categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AsteroidSize {
    /// Large asteroid (splits into medium)
    Large,

    /// Medium asteroid (splits into small)
    Medium,

    /// Small asteroid (destroyed completely)
    Small,
}

impl AsteroidSize {
    /// Every size, largest first
    pub const ALL: [Self; 3] = [Self::Large, Self::Medium, Self::Small];

    /// Get the scale factor for this size
    pub fn scale_factor(self) -> f32 {
        match self {
            Self::Large => 2.0,
            Self::Medium => 1.5,
            Self::Small => 1.0,
        }
    }

    /// Collision radius
    pub fn radius(self) -> f32 {
        12.0 * self.scale_factor()
    }

    /// Get the points awarded for destroying this size
    pub fn points(self) -> u32 {
        match self {
            Self::Large => 20,
            Self::Medium => 50,
            Self::Small => 100,
        }
    }

    /// Get the next smaller size when split
    pub fn split_into(self) -> Option<Self> {
        match self {
            Self::Large => Some(Self::Medium),
            Self::Medium => Some(Self::Small),
            Self::Small => None,
        }
    }

    /// Image reference in the resource cache
    pub fn sprite_reference(self) -> &'static str {
        match self {
            Self::Large => "asteroid-large",
            Self::Medium => "asteroid-medium",
            Self::Small => "asteroid-small",
        }
    }
}

/// Drifting rock
#[derive(Debug, Clone)]
pub struct Asteroid {
    /// Motion
    pub body: Body,
    /// Size category
    pub size: AsteroidSize,
    image: Rc<Image>,
}

impl Asteroid {
    /// Create an asteroid drawn with `image`
    pub fn new(size: AsteroidSize, position: Vec2, velocity: Vec2, image: Rc<Image>) -> Self {
        Self {
            body: Body::new(position, velocity, size.radius()),
            size,
            image,
        }
    }
}

impl Renderable for Asteroid {
    fn draw(&mut self, ctx: &mut RenderContext) {
        let flags = if self.body.velocity.x < 0.0 {
            SpriteFlags::FLIP_X
        } else {
            SpriteFlags::empty()
        };
        let top_left = self.body.position - Vec2::repeat(self.body.radius);
        ctx.draw_sprite(&self.image, top_left, flags);
    }
}

/// Projectile that takes itself off its layer once spent
pub struct Bullet {
    /// Motion
    pub body: Body,
    /// Seconds of flight left
    pub ttl: f32,
    me: WeakRenderable,
    layer: Weak<Layer>,
}

impl Bullet {
    /// Collision radius
    pub const RADIUS: f32 = 2.0;

    /// Create a bullet and schedule it on `layer`
    pub fn fire(layer: &Rc<Layer>, position: Vec2, velocity: Vec2, ttl: f32) -> Rc<RefCell<Self>> {
        let shared = Rc::new(RefCell::new(Self {
            body: Body::new(position, velocity, Self::RADIUS),
            ttl,
            me: WeakRenderable::default(),
            layer: Rc::downgrade(layer),
        }));
        let handle = RenderableHandle::from_shared(Rc::clone(&shared));
        shared.borrow_mut().me = handle.downgrade();
        layer.add(handle);
        shared
    }

    /// Whether the bullet has hit something or run out of time
    pub fn is_spent(&self) -> bool {
        self.ttl <= 0.0
    }

    /// Mark the bullet as spent; it leaves its layer on its next draw
    pub fn spend(&mut self) {
        self.ttl = 0.0;
    }
}

impl Renderable for Bullet {
    fn draw(&mut self, ctx: &mut RenderContext) {
        if self.is_spent() {
            if let (Some(me), Some(layer)) = (self.me.upgrade(), self.layer.upgrade()) {
                layer.remove(&me);
            }
            return;
        }
        ctx.fill_rect(self.body.bounds(), Color::rgb(1.0, 1.0, 0.6));
    }
}

impl std::fmt::Debug for Bullet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bullet")
            .field("body", &self.body)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_body_wraps_and_collides() {
        let mut body = Body::new(Vec2::new(95.0, 50.0), Vec2::new(10.0, 0.0), 5.0);
        body.integrate(1.0, Vec2::new(100.0, 100.0));
        assert_relative_eq!(body.position.x, 5.0, epsilon = 1e-4);

        let other = Body::new(Vec2::new(14.0, 50.0), Vec2::zeros(), 4.0);
        assert!(body.overlaps(&other));
        let far = Body::new(Vec2::new(15.0, 50.0), Vec2::zeros(), 4.0);
        assert!(!body.overlaps(&far));
    }

    #[test]
    fn test_ship_heading_turns_clockwise() {
        let mut ship = Ship::spawn(Vec2::zeros(), 0.0);
        assert_relative_eq!(ship.forward().y, -1.0);

        ship.heading = FRAC_PI_2;
        assert_relative_eq!(ship.forward().x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(ship.forward().y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_ship_speed_is_capped() {
        let gameplay = GameplayConfig::default();
        let mut ship = Ship::spawn(Vec2::zeros(), 1.0);
        let controls = Controls {
            thrust: true,
            ..Controls::default()
        };
        for _ in 0..200 {
            ship.steer(&controls, &gameplay, 1.0 / 60.0);
        }
        assert_relative_eq!(ship.body.velocity.norm(), gameplay.ship_max_speed, epsilon = 1e-3);
        assert!(ship.is_vulnerable());
    }

    #[test]
    fn test_asteroids_shrink_then_vanish() {
        let sizes: Vec<_> = std::iter::successors(Some(AsteroidSize::Large), |size| size.split_into()).collect();
        assert_eq!(sizes, AsteroidSize::ALL.to_vec());
        assert!(AsteroidSize::Small.radius() < AsteroidSize::Large.radius());
    }

    #[test]
    fn test_spent_bullet_leaves_layer_on_draw() {
        let layer = Rc::new(Layer::new("bullets"));
        let bullet = Bullet::fire(&layer, Vec2::zeros(), Vec2::new(1.0, 0.0), 1.0);
        assert_eq!(layer.len(), 1);

        let mut ctx = RenderContext::new(Vec2::new(10.0, 10.0));
        layer.render(&mut ctx).unwrap();
        assert_eq!(ctx.commands().len(), 1);

        bullet.borrow_mut().spend();
        drop(bullet);
        ctx.reset(1);
        layer.render(&mut ctx).unwrap();
        assert!(ctx.commands().is_empty());
        assert!(layer.is_empty());
    }
}
