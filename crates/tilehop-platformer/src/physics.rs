//! Reference integration and tile collision step.
//!
//! Axis-separated: X is integrated and resolved against solid tiles first, then
//! Y against solid tiles and (through [`OneWayTolerance::resolve`]) one-way
//! tiles. One-way tiles never block sideways or upward motion.

use std::ops::RangeInclusive;

use tilehop_core::math::Vec2;
use tilehop_core::world::{TileCell, WorldGeometry};

use crate::body::KinematicBody;
use crate::config::WorldPhysics;

/// Slack subtracted from a box's far edge so a body resting exactly on a tile
/// top (or flush against a wall) does not count as overlapping it.
const EDGE_EPSILON: f32 = 0.01;

/// Upper bound on substeps per tick, whatever the speed.
pub const MAX_SUBSTEPS: u32 = 64;

/// Whether the body is subject to world gravity this step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gravity {
    Applied,
    Ignored,
}

/// Integrate `body` over `dt` and resolve it against `world`.
///
/// Gravity is applied once per tick; movement is split into substeps so fast
/// bodies cannot skip over thin tiles. `previous_position` is recorded once,
/// before the first substep, so the one-way resolver always compares against
/// where the body stood at the start of the tick.
pub fn step_body<W: WorldGeometry + ?Sized>(
    body: &mut KinematicBody,
    world: &W,
    physics: &WorldPhysics,
    gravity: Gravity,
    dt: f32,
) {
    body.begin_tick();

    if !body.velocity.is_finite() {
        tracing::warn!("Non-finite body velocity {:?}, zeroing", body.velocity);
        body.velocity = Vec2::ZERO;
    }

    if gravity == Gravity::Applied {
        body.velocity.y = (body.velocity.y + physics.gravity * dt).min(physics.max_fall_speed);
    }

    let tile_size = world.tile_size();
    if !(tile_size.is_finite() && tile_size > 0.0) {
        body.position += body.velocity * dt;
        return;
    }

    let steps = substep_count(body.velocity, dt, tile_size, physics.substeps);
    let sub_dt = dt / steps as f32;
    for _ in 0..steps {
        body.position.x += body.velocity.x * sub_dt;
        resolve_x(body, world);

        body.position.y += body.velocity.y * sub_dt;
        resolve_y(body, world, physics);
    }

    if !body.blocked_down && body.velocity.y >= 0.0 {
        probe_ground(body, world, physics);
    }
}

/// Substeps for one tick: at least `min_steps`, and enough that neither axis
/// moves more than half a tile per substep.
pub fn substep_count(velocity: Vec2, dt: f32, tile_size: f32, min_steps: u32) -> u32 {
    let travel = velocity.x.abs().max(velocity.y.abs()) * dt;
    let needed = (travel / (tile_size * 0.5)).ceil() as u32;
    needed.max(min_steps).clamp(1, MAX_SUBSTEPS)
}

/// Tile indices covered by the half-open world interval `[min, max)`.
fn span(tile_size: f32, min: f32, max: f32) -> RangeInclusive<i32> {
    let lo = (min / tile_size).floor() as i32;
    let hi = ((max - EDGE_EPSILON) / tile_size).floor() as i32;
    lo..=hi
}

fn cell_in<W: WorldGeometry + ?Sized>(world: &W, col: i32, row: i32) -> Option<TileCell> {
    let ts = world.tile_size();
    world.cell_at((col as f32 + 0.5) * ts, (row as f32 + 0.5) * ts)
}

fn resolve_x<W: WorldGeometry + ?Sized>(body: &mut KinematicBody, world: &W) {
    let vx = body.velocity.x;
    if vx == 0.0 {
        return;
    }
    let ts = world.tile_size();
    let mut wall: Option<f32> = None;

    for row in span(ts, body.top(), body.bottom()) {
        for col in span(ts, body.left(), body.right()) {
            if !cell_in(world, col, row).is_some_and(|c| c.solid) {
                continue;
            }
            let tile_left = col as f32 * ts;
            let tile_right = tile_left + ts;
            wall = Some(match wall {
                None if vx > 0.0 => tile_left,
                None => tile_right,
                Some(w) if vx > 0.0 => w.min(tile_left),
                Some(w) => w.max(tile_right),
            });
        }
    }

    if let Some(edge) = wall {
        if vx > 0.0 {
            body.set_right(edge);
            body.blocked_right = true;
        } else {
            body.set_left(edge);
            body.blocked_left = true;
        }
        body.velocity.x = 0.0;
    }
}

fn resolve_y<W: WorldGeometry + ?Sized>(
    body: &mut KinematicBody,
    world: &W,
    physics: &WorldPhysics,
) {
    let vy = body.velocity.y;
    let ts = world.tile_size();
    let mut floor: Option<f32> = None;
    let mut ceiling: Option<f32> = None;

    for row in span(ts, body.top(), body.bottom()) {
        for col in span(ts, body.left(), body.right()) {
            let Some(cell) = cell_in(world, col, row) else {
                continue;
            };
            if !cell.is_collidable() {
                continue;
            }
            if !physics.one_way.resolve(body, &cell).collides() {
                continue;
            }
            if vy >= 0.0 {
                floor = Some(floor.map_or(cell.top_y, |f| f.min(cell.top_y)));
            } else if cell.solid {
                let tile_bottom = cell.top_y + ts;
                ceiling = Some(ceiling.map_or(tile_bottom, |c| c.max(tile_bottom)));
            }
        }
    }

    if let Some(top) = floor {
        body.set_bottom(top);
        body.velocity.y = 0.0;
        body.blocked_down = true;
    } else if let Some(bottom) = ceiling {
        body.set_top(bottom);
        body.velocity.y = 0.0;
        body.blocked_up = true;
    }
}

fn probe_ground<W: WorldGeometry + ?Sized>(
    body: &mut KinematicBody,
    world: &W,
    physics: &WorldPhysics,
) {
    let bottom = body.bottom();
    let probe_y = bottom + physics.ground_probe.max(EDGE_EPSILON);
    let ts = world.tile_size();
    let row = (probe_y / ts).floor() as i32;

    for col in span(ts, body.left(), body.right()) {
        let Some(cell) = cell_in(world, col, row) else {
            continue;
        };
        if cell.is_collidable()
            && cell.top_y >= bottom - EDGE_EPSILON
            && cell.top_y <= probe_y
        {
            body.touching_down = true;
            return;
        }
    }
}
