//! Ship input
//!
//! The game runs headless, so the ship is flown by a small autopilot that
//! turns toward the nearest asteroid and fires once it is lined up.

use crate::components::{Body, Ship};
use sprite_engine::foundation::math::Vec2;
use std::f32::consts::{PI, TAU};

/// One tick of ship input
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Controls {
    /// -1.0 (counter-clockwise) to 1.0 (clockwise)
    pub turn: f32,
    /// Fire the engine
    pub thrust: bool,
    /// Pull the trigger
    pub fire: bool,
}

/// Wrap an angle into `(-PI, PI]`
fn normalize_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Heading (clockwise from up) that points along `direction`
fn heading_of(direction: Vec2) -> f32 {
    direction.x.atan2(-direction.y)
}

/// Aim-and-shoot autopilot
#[derive(Debug, Clone)]
pub struct Autopilot {
    aim_tolerance: f32,
    approach_distance: f32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            aim_tolerance: 0.08,
            approach_distance: 250.0,
        }
    }
}

impl Autopilot {
    /// Create an autopilot that fires within `aim_tolerance` radians of target
    pub fn new(aim_tolerance: f32, approach_distance: f32) -> Self {
        Self {
            aim_tolerance,
            approach_distance,
        }
    }

    /// Pick this tick's input
    pub fn decide(&self, ship: &Ship, targets: &[Body]) -> Controls {
        let Some(target) = targets.iter().min_by(|a, b| {
            let da = (a.position - ship.body.position).norm_squared();
            let db = (b.position - ship.body.position).norm_squared();
            da.total_cmp(&db)
        }) else {
            return Controls::default();
        };

        let to_target = target.position - ship.body.position;
        let error = normalize_angle(heading_of(to_target) - ship.heading);
        let aligned = error.abs() <= self.aim_tolerance;

        Controls {
            turn: if aligned { 0.0 } else { error.signum() },
            thrust: error.abs() < 0.5 && to_target.norm() > self.approach_distance,
            fire: aligned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rock(x: f32, y: f32) -> Body {
        Body::new(Vec2::new(x, y), Vec2::zeros(), 10.0)
    }

    #[test]
    fn test_normalize_angle_range() {
        assert_relative_eq!(normalize_angle(3.0 * PI / 2.0), -PI / 2.0, epsilon = 1e-5);
        assert_relative_eq!(normalize_angle(-3.0 * PI / 2.0), PI / 2.0, epsilon = 1e-5);
        assert_relative_eq!(normalize_angle(PI), PI, epsilon = 1e-5);
    }

    #[test]
    fn test_fires_when_lined_up() {
        let ship = Ship::spawn(Vec2::new(100.0, 100.0), 0.0);
        let controls = Autopilot::default().decide(&ship, &[rock(100.0, 50.0)]);
        assert!(controls.fire);
        assert_eq!(controls.turn, 0.0);
        assert!(!controls.thrust);
    }

    #[test]
    fn test_turns_toward_nearest_target() {
        let ship = Ship::spawn(Vec2::new(100.0, 100.0), 0.0);
        // Nearest rock is to the right (clockwise), a far one to the left
        let targets = [rock(-400.0, 100.0), rock(150.0, 100.0)];
        let controls = Autopilot::default().decide(&ship, &targets);
        assert_eq!(controls.turn, 1.0);
        assert!(!controls.fire);
    }

    #[test]
    fn test_no_targets_means_no_input() {
        let ship = Ship::spawn(Vec2::zeros(), 0.0);
        assert_eq!(Autopilot::new(0.1, 100.0).decide(&ship, &[]), Controls::default());
    }
}
