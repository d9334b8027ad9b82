use serde::{Deserialize, Serialize};

use tilehop_core::math::{Aabb, Vec2};

/// Physical state of one actor: position, velocity, collision box and the
/// contact flags reported by the last collision step.
///
/// Each body is owned by exactly one controller or agent and mutated once per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinematicBody {
    /// Visual origin of the actor (the sprite frame's top-left).
    pub position: Vec2,
    /// `position` as it was before this tick's integration.
    pub previous_position: Vec2,
    pub velocity: Vec2,
    pub aabb: Aabb,
    pub touching_down: bool,
    pub blocked_down: bool,
    pub blocked_up: bool,
    pub blocked_left: bool,
    pub blocked_right: bool,
}

impl KinematicBody {
    pub fn new(position: Vec2, aabb: Aabb) -> Self {
        Self {
            position,
            previous_position: position,
            velocity: Vec2::ZERO,
            aabb,
            touching_down: false,
            blocked_down: false,
            blocked_up: false,
            blocked_left: false,
            blocked_right: false,
        }
    }

    /// Record last tick's position and clear contacts before integration.
    pub fn begin_tick(&mut self) {
        self.previous_position = self.position;
        self.clear_contacts();
    }

    pub fn clear_contacts(&mut self) {
        self.touching_down = false;
        self.blocked_down = false;
        self.blocked_up = false;
        self.blocked_left = false;
        self.blocked_right = false;
    }

    /// Resting on a floor this tick.
    pub fn on_floor(&self) -> bool {
        self.touching_down || self.blocked_down
    }

    pub fn blocked_sideways(&self) -> bool {
        self.blocked_left || self.blocked_right
    }

    pub fn left(&self) -> f32 {
        self.aabb.min_at(self.position).x
    }

    pub fn right(&self) -> f32 {
        self.aabb.max_at(self.position).x
    }

    pub fn top(&self) -> f32 {
        self.aabb.min_at(self.position).y
    }

    pub fn bottom(&self) -> f32 {
        self.aabb.max_at(self.position).y
    }

    /// Box bottom at `previous_position`.
    pub fn previous_bottom(&self) -> f32 {
        self.aabb.max_at(self.previous_position).y
    }

    /// Move the body so its box's left edge sits at `x`.
    pub fn set_left(&mut self, x: f32) {
        self.position.x = x - self.aabb.offset.x;
    }

    /// Move the body so its box's right edge sits at `x`.
    pub fn set_right(&mut self, x: f32) {
        self.position.x = x - self.aabb.offset.x - self.aabb.size.x;
    }

    /// Move the body so its box's top edge sits at `y`.
    pub fn set_top(&mut self, y: f32) {
        self.position.y = y - self.aabb.offset.y;
    }

    /// Move the body so its box's bottom edge sits at `y`.
    pub fn set_bottom(&mut self, y: f32) {
        self.position.y = y - self.aabb.offset.y - self.aabb.size.y;
    }
}
