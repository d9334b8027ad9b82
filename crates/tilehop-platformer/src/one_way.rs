//! One-way platform contact filter.
//!
//! One-way tiles only ever land a body from above. The decision uses last
//! tick's box bottom to tell "fell onto the surface" from "was already below
//! it", with two tolerance bands so a single coarse tick still lands:
//!
//! - the body was resting at or just above the top last tick, or
//! - the body is only shallowly penetrating the tile now.
//!
//! A body falling fast enough to sink deeper than the shallow band in one tick
//! after starting below the upper band falls through. No sweep is performed.

use serde::{Deserialize, Serialize};

use tilehop_core::world::TileCell;

use crate::body::KinematicBody;
use crate::config::OneWayTolerance;

/// Outcome of a contact query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactDecision {
    Collide,
    PassThrough,
}

impl ContactDecision {
    pub fn collides(self) -> bool {
        self == ContactDecision::Collide
    }
}

/// Decide whether `body` collides with `cell` this tick, using default tolerances.
pub fn resolve_one_way(body: &KinematicBody, cell: &TileCell) -> ContactDecision {
    OneWayTolerance::default().resolve(body, cell)
}

impl OneWayTolerance {
    pub fn resolve(&self, body: &KinematicBody, cell: &TileCell) -> ContactDecision {
        if !cell.one_way {
            return if cell.solid {
                ContactDecision::Collide
            } else {
                ContactDecision::PassThrough
            };
        }
        self.decide(
            body.velocity.y,
            body.previous_bottom(),
            body.bottom(),
            cell.top_y,
        )
    }

    /// Pure form of the one-way rule over its four inputs.
    pub fn decide(
        &self,
        velocity_y: f32,
        prev_bottom: f32,
        current_bottom: f32,
        tile_top: f32,
    ) -> ContactDecision {
        if velocity_y < 0.0 {
            return ContactDecision::PassThrough;
        }
        if prev_bottom <= tile_top + self.above_prev || current_bottom <= tile_top + self.shallow_now
        {
            ContactDecision::Collide
        } else {
            ContactDecision::PassThrough
        }
    }
}
