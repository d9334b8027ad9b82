use serde::{Deserialize, Serialize};

use crate::physics::MAX_SUBSTEPS;

/// Maximum horizontal speed on the ground (px/s).
pub const MAX_SPEED: f32 = 160.0;
/// Ground acceleration (px/s^2).
pub const ACCELERATION: f32 = 800.0;
/// Ground deceleration with no input (px/s^2).
pub const DECELERATION: f32 = 1000.0;
/// Fraction of ground acceleration and top speed available mid-air.
pub const AIR_CONTROL: f32 = 0.7;
/// Vertical velocity applied on jump press (negative is up).
pub const JUMP_VELOCITY: f32 = -350.0;
/// Multiplier applied to upward velocity when jump is released mid-rise.
pub const JUMP_CANCEL_FACTOR: f32 = 0.2;
/// Below this horizontal speed a decelerating body snaps to rest.
pub const STOP_THRESHOLD: f32 = 10.0;
/// Gravity (px/s^2, +y is down).
pub const GRAVITY: f32 = 900.0;
/// Terminal fall speed (px/s).
pub const MAX_FALL_SPEED: f32 = 600.0;
/// Minimum collision substeps per tick.
pub const SUBSTEPS: u32 = 4;
/// Enemy patrol speed (px/s).
pub const PATROL_SPEED: f32 = 60.0;
/// Enemy constant fall speed while unsupported (px/s).
pub const PATROL_FALL_SPEED: f32 = 200.0;

/// Error raised by config and level loaders.
#[derive(Debug)]
pub enum LoadError {
    Io(String),
    Parse(String),
    Invalid(String),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(m) => write!(f, "io error: {m}"),
            Self::Parse(m) => write!(f, "parse error: {m}"),
            Self::Invalid(m) => write!(f, "invalid: {m}"),
        }
    }
}

impl std::error::Error for LoadError {}

/// Player movement tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    pub max_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    /// In (0, 1].
    pub air_control: f32,
    pub jump_velocity: f32,
    pub jump_cancel_factor: f32,
    pub stop_threshold: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            max_speed: MAX_SPEED,
            acceleration: ACCELERATION,
            deceleration: DECELERATION,
            air_control: AIR_CONTROL,
            jump_velocity: JUMP_VELOCITY,
            jump_cancel_factor: JUMP_CANCEL_FACTOR,
            stop_threshold: STOP_THRESHOLD,
        }
    }
}

/// Enemy patrol tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolTuning {
    pub speed_x: f32,
    pub fall_speed: f32,
    /// How far beyond the leading edge the floor sensor probes.
    pub sensor_ahead: f32,
    /// How far below the box bottom the floor sensor probes.
    pub sensor_below: f32,
    /// Distance the body is pushed in the new direction after turning.
    pub turn_nudge: f32,
}

impl Default for PatrolTuning {
    fn default() -> Self {
        Self {
            speed_x: PATROL_SPEED,
            fall_speed: PATROL_FALL_SPEED,
            sensor_ahead: 2.0,
            sensor_below: 4.0,
            turn_nudge: 4.0,
        }
    }
}

/// Landing tolerances for one-way platforms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OneWayTolerance {
    /// Land if last tick's bottom was at most this far below the tile top.
    pub above_prev: f32,
    /// Land if this tick's bottom is at most this far below the tile top.
    pub shallow_now: f32,
}

impl Default for OneWayTolerance {
    fn default() -> Self {
        Self {
            above_prev: 2.0,
            shallow_now: 8.0,
        }
    }
}

/// World integration parameters used by the reference collision step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldPhysics {
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub one_way: OneWayTolerance,
    /// A body whose bottom is within this distance above a floor counts as touching it.
    pub ground_probe: f32,
    /// Minimum collision substeps per tick. Fast bodies get more.
    pub substeps: u32,
}

impl Default for WorldPhysics {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            max_fall_speed: MAX_FALL_SPEED,
            one_way: OneWayTolerance::default(),
            ground_probe: 1.0,
            substeps: SUBSTEPS,
        }
    }
}

/// Top-level simulation configuration, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub movement: MovementTuning,
    pub patrol: PatrolTuning,
    pub world: WorldPhysics,
    pub tick_rate_hz: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            movement: MovementTuning::default(),
            patrol: PatrolTuning::default(),
            world: WorldPhysics::default(),
            tick_rate_hz: 60.0,
        }
    }
}

impl SimConfig {
    /// Load config from a TOML file. Falls back to defaults if the file is missing
    /// or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("TILEHOP_CONFIG")
            .unwrap_or_else(|_| "config/tilehop.toml".to_string());
        match Self::from_file(&path) {
            Ok(cfg) => cfg,
            Err(LoadError::Io(_)) => SimConfig::default(),
            Err(e) => {
                tracing::warn!("Failed to load {path}: {e}, using defaults");
                SimConfig::default()
            },
        }
    }

    pub fn from_file(path: &str) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| LoadError::Io(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, LoadError> {
        let cfg: SimConfig =
            toml::from_str(content).map_err(|e| LoadError::Parse(e.to_string()))?;
        Ok(cfg.sanitized())
    }

    /// Clamp out-of-range tunables into their valid domain.
    pub fn sanitized(mut self) -> Self {
        let d = SimConfig::default();
        let m = &mut self.movement;
        let air_ok = m.air_control > 0.0 && m.air_control <= 1.0;
        if !air_ok {
            let clamped = if m.air_control.is_finite() && m.air_control > 1.0 {
                1.0
            } else {
                AIR_CONTROL
            };
            tracing::warn!("air_control {} out of (0, 1], using {clamped}", m.air_control);
            m.air_control = clamped;
        }
        if !(0.0..=1.0).contains(&m.jump_cancel_factor) {
            tracing::warn!(
                "jump_cancel_factor {} out of [0, 1], using {JUMP_CANCEL_FACTOR}",
                m.jump_cancel_factor
            );
            m.jump_cancel_factor = JUMP_CANCEL_FACTOR;
        }
        if !m.jump_velocity.is_finite() || m.jump_velocity == 0.0 {
            tracing::warn!(
                "jump_velocity {} cannot launch, using {JUMP_VELOCITY}",
                m.jump_velocity
            );
            m.jump_velocity = JUMP_VELOCITY;
        } else if m.jump_velocity > 0.0 {
            tracing::warn!("jump_velocity must point up (negative), flipping sign");
            m.jump_velocity = -m.jump_velocity;
        }

        non_negative("max_speed", &mut m.max_speed, d.movement.max_speed);
        non_negative("acceleration", &mut m.acceleration, d.movement.acceleration);
        non_negative("deceleration", &mut m.deceleration, d.movement.deceleration);
        non_negative("stop_threshold", &mut m.stop_threshold, d.movement.stop_threshold);

        let p = &mut self.patrol;
        non_negative("patrol.speed_x", &mut p.speed_x, d.patrol.speed_x);
        non_negative("patrol.fall_speed", &mut p.fall_speed, d.patrol.fall_speed);
        non_negative("patrol.sensor_ahead", &mut p.sensor_ahead, d.patrol.sensor_ahead);
        non_negative("patrol.sensor_below", &mut p.sensor_below, d.patrol.sensor_below);
        non_negative("patrol.turn_nudge", &mut p.turn_nudge, d.patrol.turn_nudge);

        let w = &mut self.world;
        if !w.gravity.is_finite() {
            tracing::warn!("gravity {} is not finite, using {GRAVITY}", w.gravity);
            w.gravity = GRAVITY;
        }
        non_negative("max_fall_speed", &mut w.max_fall_speed, d.world.max_fall_speed);
        non_negative("ground_probe", &mut w.ground_probe, d.world.ground_probe);
        non_negative("one_way.above_prev", &mut w.one_way.above_prev, d.world.one_way.above_prev);
        non_negative("one_way.shallow_now", &mut w.one_way.shallow_now, d.world.one_way.shallow_now);
        if !(1..=MAX_SUBSTEPS).contains(&w.substeps) {
            let clamped = w.substeps.clamp(1, MAX_SUBSTEPS);
            tracing::warn!("substeps {} out of [1, {MAX_SUBSTEPS}], using {clamped}", w.substeps);
            w.substeps = clamped;
        }

        if !self.tick_rate_hz.is_finite() || self.tick_rate_hz <= 0.0 {
            tracing::warn!("tick_rate_hz {} must be positive, using 60", self.tick_rate_hz);
            self.tick_rate_hz = 60.0;
        }
        self
    }
}

/// Replace a non-finite value with `default` and a negative one with its magnitude.
fn non_negative(name: &str, value: &mut f32, default: f32) {
    if !value.is_finite() {
        tracing::warn!("{name} {value} is not finite, using {default}");
        *value = default;
    } else if *value < 0.0 {
        tracing::warn!("{name} {value} is negative, using {}", -*value);
        *value = -*value;
    }
}
