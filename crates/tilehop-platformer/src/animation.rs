use serde::{Deserialize, Serialize};

use tilehop_core::math::Vec2;
use tilehop_core::render::AnimationKey;

/// Horizontal speeds at or below this count as standing still.
pub const WALK_EPSILON: f32 = 0.01;

/// Pick the animation for a body from its floor contact and velocity.
///
/// A grounded body still sliding to a stop after input release walks until
/// the controller snaps its velocity to zero.
pub fn select_animation(grounded: bool, velocity: Vec2) -> AnimationKey {
    if !grounded {
        if velocity.y < 0.0 {
            AnimationKey::Jump
        } else {
            AnimationKey::Fall
        }
    } else if velocity.x.abs() > WALK_EPSILON {
        AnimationKey::Walk
    } else {
        AnimationKey::Idle
    }
}

/// Sprite facing. Flipped iff the last non-zero horizontal motion was leftward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facing {
    pub flipped: bool,
}

impl Facing {
    pub fn observe(&mut self, dx: f32) {
        if dx < -WALK_EPSILON {
            self.flipped = true;
        } else if dx > WALK_EPSILON {
            self.flipped = false;
        }
    }

    pub fn mirror(&mut self) {
        self.flipped = !self.flipped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn airborne_rising_is_jump() {
        assert_eq!(
            select_animation(false, Vec2::new(50.0, -350.0)),
            AnimationKey::Jump
        );
    }

    #[test]
    fn airborne_falling_or_apex_is_fall() {
        assert_eq!(select_animation(false, Vec2::new(0.0, 10.0)), AnimationKey::Fall);
        assert_eq!(select_animation(false, Vec2::ZERO), AnimationKey::Fall);
    }

    #[test]
    fn grounded_moving_is_walk() {
        assert_eq!(select_animation(true, Vec2::new(-80.0, 0.0)), AnimationKey::Walk);
        assert_eq!(select_animation(true, Vec2::new(11.0, 0.0)), AnimationKey::Walk);
    }

    #[test]
    fn grounded_still_is_idle() {
        assert_eq!(select_animation(true, Vec2::ZERO), AnimationKey::Idle);
        assert_eq!(select_animation(true, Vec2::new(0.001, 0.0)), AnimationKey::Idle);
    }

    #[test]
    fn facing_keeps_last_direction_when_stopped() {
        let mut facing = Facing::default();
        facing.observe(-5.0);
        assert!(facing.flipped);
        facing.observe(0.0);
        assert!(facing.flipped);
        facing.observe(3.0);
        assert!(!facing.flipped);
    }

    #[test]
    fn mirror_toggles() {
        let mut facing = Facing::default();
        facing.mirror();
        assert!(facing.flipped);
        facing.mirror();
        assert!(!facing.flipped);
    }
}
