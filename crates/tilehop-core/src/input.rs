use serde::{Deserialize, Serialize};

/// Player input sampled once per tick. Not retained between ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputIntent {
    pub move_left: bool,
    pub move_right: bool,
    pub jump_held: bool,
}

/// Resolved horizontal direction of an [`InputIntent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalIntent {
    None,
    Left,
    Right,
}

impl HorizontalIntent {
    /// -1, 0 or +1.
    pub fn sign(self) -> f32 {
        match self {
            HorizontalIntent::None => 0.0,
            HorizontalIntent::Left => -1.0,
            HorizontalIntent::Right => 1.0,
        }
    }
}

impl InputIntent {
    pub const IDLE: Self = Self {
        move_left: false,
        move_right: false,
        jump_held: false,
    };

    pub const fn left() -> Self {
        Self {
            move_left: true,
            move_right: false,
            jump_held: false,
        }
    }

    pub const fn right() -> Self {
        Self {
            move_left: false,
            move_right: true,
            jump_held: false,
        }
    }

    pub const fn jump() -> Self {
        Self {
            move_left: false,
            move_right: false,
            jump_held: true,
        }
    }

    pub const fn with_jump(mut self, held: bool) -> Self {
        self.jump_held = held;
        self
    }

    /// Horizontal direction. Left wins when both directions are held.
    pub fn horizontal(&self) -> HorizontalIntent {
        if self.move_left {
            HorizontalIntent::Left
        } else if self.move_right {
            HorizontalIntent::Right
        } else {
            HorizontalIntent::None
        }
    }
}

/// Source of per-tick input, polled once per frame by the host.
pub trait InputSource {
    fn sample(&mut self) -> InputIntent;
}

impl InputSource for InputIntent {
    fn sample(&mut self) -> InputIntent {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_wins_over_right() {
        let both = InputIntent {
            move_left: true,
            move_right: true,
            jump_held: false,
        };
        assert_eq!(both.horizontal(), HorizontalIntent::Left);
    }

    #[test]
    fn horizontal_signs() {
        assert_eq!(InputIntent::IDLE.horizontal().sign(), 0.0);
        assert_eq!(InputIntent::left().horizontal().sign(), -1.0);
        assert_eq!(InputIntent::right().horizontal().sign(), 1.0);
    }

    #[test]
    fn constant_intent_is_its_own_source() {
        let mut held = InputIntent::right().with_jump(true);
        assert_eq!(held.sample(), held);
        assert_eq!(held.sample(), held);
    }
}
