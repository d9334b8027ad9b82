use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// 2D vector in world units (pixels). +x is right, +y is down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// Collision box of an actor.
///
/// `offset` is the box's top-left relative to the actor's visual origin. Sprite
/// frames are usually larger than the collidable silhouette, so the box sits
/// inside the frame rather than on its corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub size: Vec2,
    pub offset: Vec2,
}

impl Aabb {
    pub const fn new(size: Vec2, offset: Vec2) -> Self {
        Self { size, offset }
    }

    pub const fn width(&self) -> f32 {
        self.size.x
    }

    pub const fn height(&self) -> f32 {
        self.size.y
    }

    /// Top-left corner of the box for an actor at `origin`.
    pub fn min_at(&self, origin: Vec2) -> Vec2 {
        origin + self.offset
    }

    /// Bottom-right corner of the box for an actor at `origin`.
    pub fn max_at(&self, origin: Vec2) -> Vec2 {
        origin + self.offset + self.size
    }
}

/// Horizontal travel direction. Exactly -1 or +1, never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Move `current` toward `target` by at most `max_step`, never overshooting.
pub fn approach(current: f32, target: f32, max_step: f32) -> f32 {
    let step = max_step.max(0.0);
    if current < target {
        (current + step).min(target)
    } else {
        (current - step).max(target)
    }
}
