use serde::{Deserialize, Serialize};

/// Identifies an actor within a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorId {
    Player,
    Enemy(usize),
}

/// Discrete animation derived from physical state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationKey {
    Idle,
    Walk,
    Jump,
    Fall,
}

impl AnimationKey {
    pub fn as_str(self) -> &'static str {
        match self {
            AnimationKey::Idle => "idle",
            AnimationKey::Walk => "walk",
            AnimationKey::Jump => "jump",
            AnimationKey::Fall => "fall",
        }
    }
}

impl std::fmt::Display for AnimationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation output for one actor for one tick. Never fed back into physics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderSample {
    pub actor: ActorId,
    pub animation: AnimationKey,
    pub facing_flipped: bool,
}

/// Downstream consumer of render samples (sprite animator, debug overlay).
pub trait RenderSink {
    fn present(&mut self, sample: &RenderSample);
}

impl RenderSink for Vec<RenderSample> {
    fn present(&mut self, sample: &RenderSample) {
        self.push(*sample);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn animation_keys_serialize_lowercase() {
        let json = serde_json::to_string(&AnimationKey::Fall).unwrap();
        assert_eq!(json, "\"fall\"");
        assert_eq!(AnimationKey::Jump.to_string(), "jump");
    }

    #[test]
    fn vec_sink_collects_samples() {
        let mut sink: Vec<RenderSample> = Vec::new();
        let sample = RenderSample {
            actor: ActorId::Enemy(2),
            animation: AnimationKey::Walk,
            facing_flipped: true,
        };
        sink.present(&sample);
        assert_eq!(sink, vec![sample]);
    }
}
