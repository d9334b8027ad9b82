use serde::{Deserialize, Serialize};

use tilehop_core::input::{HorizontalIntent, InputIntent};
use tilehop_core::math::approach;
use tilehop_core::render::ActorId;
use tilehop_core::simulation::FrameEvent;

use crate::animation::Facing;
use crate::body::KinematicBody;
use crate::config::MovementTuning;

/// One tick of input history, used to detect jump press and release edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerState {
    pub was_jump_held: bool,
}

/// Player movement controller. Owns the player's body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerController {
    pub body: KinematicBody,
    pub state: ControllerState,
    pub facing: Facing,
}

impl PlayerController {
    pub fn new(body: KinematicBody) -> Self {
        Self {
            body,
            state: ControllerState::default(),
            facing: Facing::default(),
        }
    }

    /// Update velocity from input. Gravity and integration happen afterwards in
    /// the collision step; this only sets targets.
    pub fn update(
        &mut self,
        input: &InputIntent,
        tuning: &MovementTuning,
        dt: f32,
    ) -> Option<FrameEvent> {
        let grounded = self.body.on_floor();
        let intent = input.horizontal();

        self.body.velocity.x =
            horizontal_velocity(self.body.velocity.x, intent, grounded, tuning, dt);
        if intent != HorizontalIntent::None {
            self.facing.observe(intent.sign());
        } else {
            self.facing.observe(self.body.velocity.x);
        }

        let jump_pressed = input.jump_held && !self.state.was_jump_held;
        let jump_released = !input.jump_held && self.state.was_jump_held;

        let event = if jump_pressed && grounded {
            self.body.velocity.y = tuning.jump_velocity;
            tracing::debug!(vy = self.body.velocity.y, "jump launched");
            Some(FrameEvent::Jumped {
                actor: ActorId::Player,
            })
        } else if jump_released && !grounded && self.body.velocity.y < 0.0 {
            self.body.velocity.y *= tuning.jump_cancel_factor;
            tracing::debug!(vy = self.body.velocity.y, "jump cancelled");
            Some(FrameEvent::JumpCancelled {
                actor: ActorId::Player,
            })
        } else {
            None
        };

        self.state.was_jump_held = input.jump_held;
        event
    }
}

/// Acceleration-based horizontal velocity for one tick.
///
/// With input, velocity approaches `±max_speed * control` by at most
/// `accel * dt`, where air ticks scale both by `air_control`. Without input,
/// grounded bodies decelerate and snap to rest under `stop_threshold`;
/// airborne bodies keep their momentum.
pub fn horizontal_velocity(
    vx: f32,
    intent: HorizontalIntent,
    grounded: bool,
    tuning: &MovementTuning,
    dt: f32,
) -> f32 {
    let control = if grounded { 1.0 } else { tuning.air_control };

    match intent {
        HorizontalIntent::Left | HorizontalIntent::Right => {
            let target = intent.sign() * tuning.max_speed * control;
            let accel = tuning.acceleration * control;
            approach(vx, target, accel * dt)
        },
        HorizontalIntent::None if grounded => {
            let slowed = approach(vx, 0.0, tuning.deceleration * dt);
            if slowed.abs() <= tuning.stop_threshold {
                0.0
            } else {
                slowed
            }
        },
        HorizontalIntent::None => vx,
    }
}
