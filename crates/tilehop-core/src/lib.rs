pub mod input;
pub mod math;
pub mod render;
pub mod simulation;
pub mod world;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::collections::VecDeque;

    use crate::input::{InputIntent, InputSource};
    use crate::render::{RenderSample, RenderSink};
    use crate::simulation::{FrameEvent, Simulation, drive_frame};

    /// Replays a fixed sequence of intents, then idles.
    #[derive(Debug, Clone, Default)]
    pub struct ScriptedInput {
        frames: VecDeque<InputIntent>,
        pub samples_taken: usize,
    }

    impl ScriptedInput {
        pub fn new(frames: impl IntoIterator<Item = InputIntent>) -> Self {
            Self {
                frames: frames.into_iter().collect(),
                samples_taken: 0,
            }
        }

        /// `count` copies of `intent`.
        pub fn repeat(intent: InputIntent, count: usize) -> Self {
            Self::new(std::iter::repeat_n(intent, count))
        }
    }

    impl InputSource for ScriptedInput {
        fn sample(&mut self) -> InputIntent {
            self.samples_taken += 1;
            self.frames.pop_front().unwrap_or_default()
        }
    }

    /// Render sink that keeps every sample it receives.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingSink {
        pub samples: Vec<RenderSample>,
    }

    impl RenderSink for RecordingSink {
        fn present(&mut self, sample: &RenderSample) {
            self.samples.push(*sample);
        }
    }

    /// Drive `n` frames from `source`, returning all accumulated events.
    pub fn run_frames(
        sim: &mut dyn Simulation,
        source: &mut dyn InputSource,
        n: usize,
        dt: f32,
    ) -> Vec<FrameEvent> {
        let mut sink = RecordingSink::default();
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(drive_frame(sim, source, &mut sink, dt));
        }
        all_events
    }

    /// Run `n` ticks with the same intent held.
    pub fn run_held(
        sim: &mut dyn Simulation,
        intent: InputIntent,
        n: usize,
        dt: f32,
    ) -> Vec<FrameEvent> {
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(sim.update(dt, &intent));
        }
        all_events
    }

    // ================================================================
    // Simulation Trait Contract Tests
    // ================================================================
    // Every Simulation implementation should pass these. Stage crates call
    // them from their own #[cfg(test)] modules with a ready-to-run instance.

    /// update() with dt>0 must advance state.
    pub fn contract_update_advances_state(sim: &mut dyn Simulation) {
        let before = sim.serialize_state();
        sim.update(1.0 / 60.0, &InputIntent::IDLE);
        let after = sim.serialize_state();
        assert_ne!(before, after, "update(dt>0) must advance simulation state");
    }

    /// A non-finite or non-positive dt must leave state untouched.
    pub fn contract_degenerate_dt_is_noop(sim: &mut dyn Simulation) {
        let before = sim.serialize_state();
        for dt in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let events = sim.update(dt, &InputIntent::right().with_jump(true));
            assert!(events.is_empty(), "dt={dt} must not emit events");
        }
        let after = sim.serialize_state();
        assert_eq!(before, after, "degenerate dt must be a no-op");
    }

    /// serialize_state → apply_state must be stable after one roundtrip.
    pub fn contract_state_roundtrip_preserves(sim: &mut dyn Simulation) {
        let state_a = sim.serialize_state();
        sim.apply_state(&state_a);
        let state_b = sim.serialize_state();
        assert_eq!(state_a, state_b, "State must survive serialize→apply");
    }

    /// Garbage snapshots must be ignored.
    pub fn contract_garbage_state_ignored(sim: &mut dyn Simulation) {
        let before = sim.serialize_state();
        sim.apply_state(&[0xc1, 0xff, 0x00]);
        assert_eq!(before, sim.serialize_state(), "Garbage must not apply");
    }

    /// pause() must freeze state, resume() must unfreeze it.
    pub fn contract_pause_stops_updates(sim: &mut dyn Simulation) {
        sim.pause();
        let before = sim.serialize_state();
        sim.update(1.0 / 60.0, &InputIntent::right());
        let during_pause = sim.serialize_state();
        assert_eq!(before, during_pause, "State must not change while paused");

        sim.resume();
        sim.update(1.0 / 60.0, &InputIntent::right());
        let after_resume = sim.serialize_state();
        assert_ne!(during_pause, after_resume, "State must change after resume");
    }

    /// drive_frame() must poll the input source exactly once per frame.
    pub fn contract_input_sampled_once_per_frame(sim: &mut dyn Simulation) {
        let mut source = ScriptedInput::repeat(InputIntent::right(), 10);
        run_frames(sim, &mut source, 4, 1.0 / 60.0);
        assert_eq!(source.samples_taken, 4, "Input must be sampled once per frame");
    }
}
