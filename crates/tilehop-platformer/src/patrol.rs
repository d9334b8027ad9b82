use serde::{Deserialize, Serialize};

use tilehop_core::math::{Direction, Vec2};
use tilehop_core::simulation::TurnReason;
use tilehop_core::world::WorldGeometry;

use crate::animation::Facing;
use crate::body::KinematicBody;
use crate::config::PatrolTuning;

/// Enemy that walks back and forth, turning at walls and ledges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatrolAgent {
    pub body: KinematicBody,
    pub direction: Direction,
    pub facing: Facing,
}

impl PatrolAgent {
    pub fn new(body: KinematicBody, direction: Direction) -> Self {
        Self {
            body,
            direction,
            facing: Facing {
                flipped: direction == Direction::Left,
            },
        }
    }

    /// Probe point just past the leading edge and just below the feet.
    pub fn sensor_point(&self, tuning: &PatrolTuning) -> Vec2 {
        let x = match self.direction {
            Direction::Right => self.body.right() + tuning.sensor_ahead,
            Direction::Left => self.body.left() - tuning.sensor_ahead,
        };
        Vec2::new(x, self.body.bottom() + tuning.sensor_below)
    }

    pub fn floor_ahead<W: WorldGeometry + ?Sized>(&self, world: &W, tuning: &PatrolTuning) -> bool {
        let probe = self.sensor_point(tuning);
        world
            .cell_at(probe.x, probe.y)
            .is_some_and(|cell| cell.is_collidable())
    }

    /// Sense, maybe turn, then set this tick's velocity. Returns why the agent
    /// turned, if it did.
    pub fn update<W: WorldGeometry + ?Sized>(
        &mut self,
        world: &W,
        tuning: &PatrolTuning,
    ) -> Option<TurnReason> {
        let reason = if self.body.blocked_sideways() {
            Some(TurnReason::Wall)
        } else if self.body.on_floor() && !self.floor_ahead(world, tuning) {
            Some(TurnReason::Ledge)
        } else {
            None
        };

        if let Some(reason) = reason {
            self.turn_around(tuning);
            tracing::debug!(?reason, direction = ?self.direction, "patrol agent turned");
        }

        self.body.velocity.x = tuning.speed_x * self.direction.sign();
        if !self.body.blocked_down {
            self.body.velocity.y = tuning.fall_speed;
        }
        reason
    }

    fn turn_around(&mut self, tuning: &PatrolTuning) {
        self.direction = self.direction.flipped();
        self.facing.mirror();
        self.body.position.x += tuning.turn_nudge * self.direction.sign();
        self.body.velocity.y = 0.0;
    }
}
