use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::input::{InputIntent, InputSource};
use crate::math::Direction;
use crate::render::{ActorId, RenderSample, RenderSink};

/// Core trait for a tick-driven simulation.
///
/// The host owns the frame loop, input polling and rendering; the simulation
/// only advances physical state and reports what happened.
pub trait Simulation {
    /// Advance one tick. Must be total over its inputs: missing collaborators
    /// turn the tick into a no-op instead of faulting.
    fn update(&mut self, dt: f32, input: &InputIntent) -> Vec<FrameEvent>;

    /// Animation state and facing for every live actor, as of the last tick.
    fn render_samples(&self) -> Vec<RenderSample>;

    /// Serialize the simulation state for snapshots.
    fn serialize_state(&self) -> Vec<u8>;

    /// Restore a snapshot produced by [`Simulation::serialize_state`].
    /// Undecodable payloads are ignored.
    fn apply_state(&mut self, state: &[u8]);

    fn pause(&mut self);

    fn resume(&mut self);

    /// Logical steps per second the simulation is tuned for.
    fn tick_rate(&self) -> f32 {
        60.0
    }
}

/// Why a patrol agent turned around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnReason {
    Wall,
    Ledge,
}

/// Discrete gameplay transitions emitted during a tick (audio, FX, tests).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FrameEvent {
    Jumped { actor: ActorId },
    JumpCancelled { actor: ActorId },
    Landed { actor: ActorId },
    EnemyTurned {
        actor: ActorId,
        reason: TurnReason,
        direction: Direction,
    },
}

/// Run one host frame: sample input exactly once, advance the simulation,
/// then hand every render sample to the sink.
pub fn drive_frame(
    sim: &mut dyn Simulation,
    source: &mut dyn InputSource,
    sink: &mut dyn RenderSink,
    dt: f32,
) -> Vec<FrameEvent> {
    let input = source.sample();
    let events = sim.update(dt, &input);
    for sample in sim.render_samples() {
        sink.present(&sample);
    }
    events
}

/// Encode a state snapshot as MessagePack. Encoding failures yield an empty
/// payload, which [`decode_state`] rejects.
pub fn encode_state<T: Serialize>(state: &T) -> Vec<u8> {
    rmp_serde::to_vec(state).unwrap_or_default()
}

/// Decode a MessagePack state snapshot, logging and discarding bad payloads.
pub fn decode_state<T: DeserializeOwned>(bytes: &[u8]) -> Option<T> {
    match rmp_serde::from_slice(bytes) {
        Ok(state) => Some(state),
        Err(e) => {
            tracing::warn!(len = bytes.len(), "Ignoring undecodable state snapshot: {e}");
            None
        },
    }
}

/// Generates the `Simulation` methods that are identical for every stage:
/// `serialize_state`, `apply_state`, `pause`, `resume`.
///
/// Requires the implementing struct to have `state: $StateType` and
/// `paused: bool` fields.
#[macro_export]
macro_rules! simulation_boilerplate {
    (state_type: $StateType:ty) => {
        fn serialize_state(&self) -> Vec<u8> {
            $crate::simulation::encode_state(&self.state)
        }

        fn apply_state(&mut self, state: &[u8]) {
            if let Some(s) = $crate::simulation::decode_state::<$StateType>(state) {
                self.state = s;
            }
        }

        fn pause(&mut self) {
            self.paused = true;
        }

        fn resume(&mut self) {
            self.paused = false;
        }
    };
}
