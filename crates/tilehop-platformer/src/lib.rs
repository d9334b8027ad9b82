pub mod animation;
pub mod body;
pub mod config;
pub mod controller;
pub mod grid;
pub mod grid_gen;
pub mod one_way;
pub mod patrol;
pub mod physics;

use serde::{Deserialize, Serialize};

use tilehop_core::input::InputIntent;
use tilehop_core::math::{Aabb, Direction, Vec2};
use tilehop_core::render::{ActorId, RenderSample};
use tilehop_core::simulation::{FrameEvent, Simulation};
use tilehop_core::simulation_boilerplate;

use animation::select_animation;
use body::KinematicBody;
use config::SimConfig;
use controller::PlayerController;
use grid::{LevelDef, TileGrid};
use patrol::PatrolAgent;
use physics::{Gravity, step_body};

/// Player collision box: 12x20 inside a 16x24 sprite frame.
pub const PLAYER_BOX: Aabb = Aabb::new(Vec2::new(12.0, 20.0), Vec2::new(2.0, 4.0));
/// Enemy collision box: 14x12 inside a 16x16 sprite frame.
pub const ENEMY_BOX: Aabb = Aabb::new(Vec2::new(14.0, 12.0), Vec2::new(1.0, 4.0));

/// Serializable simulation state for snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageState {
    pub player: Option<PlayerController>,
    pub enemies: Vec<PatrolAgent>,
    pub tick: u64,
}

/// One level's worth of simulation: static geometry, the player and its enemies.
pub struct Stage {
    grid: Option<TileGrid>,
    config: SimConfig,
    state: StageState,
    paused: bool,
}

impl Stage {
    /// An empty stage. Ticks are no-ops until geometry is loaded.
    pub fn new(config: SimConfig) -> Self {
        Self {
            grid: None,
            config,
            state: StageState::default(),
            paused: false,
        }
    }

    pub fn from_level(level: &LevelDef, config: SimConfig) -> Self {
        let mut stage = Self::new(config);
        stage.load_geometry(level.grid());
        if let Some(spawn) = level.player_spawn {
            stage.spawn_player(spawn);
        }
        for enemy in &level.enemies {
            stage.spawn_enemy(Vec2::new(enemy.x, enemy.y), enemy.direction);
        }
        stage
    }

    pub fn load_geometry(&mut self, grid: TileGrid) {
        tracing::debug!(width = grid.width, height = grid.height, "geometry loaded");
        self.grid = Some(grid);
    }

    /// Place (or replace) the player with its sprite origin at `origin`.
    pub fn spawn_player(&mut self, origin: Vec2) {
        self.state.player = Some(PlayerController::new(KinematicBody::new(origin, PLAYER_BOX)));
    }

    /// Add a patrolling enemy and return its index.
    pub fn spawn_enemy(&mut self, origin: Vec2, direction: Direction) -> usize {
        let agent = PatrolAgent::new(KinematicBody::new(origin, ENEMY_BOX), direction);
        self.state.enemies.push(agent);
        self.state.enemies.len() - 1
    }

    pub fn state(&self) -> &StageState {
        &self.state
    }

    pub fn grid(&self) -> Option<&TileGrid> {
        self.grid.as_ref()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn player(&self) -> Option<&PlayerController> {
        self.state.player.as_ref()
    }

    pub fn player_mut(&mut self) -> Option<&mut PlayerController> {
        self.state.player.as_mut()
    }

    pub fn enemies(&self) -> &[PatrolAgent] {
        &self.state.enemies
    }

    pub fn enemies_mut(&mut self) -> &mut [PatrolAgent] {
        &mut self.state.enemies
    }
}

impl Simulation for Stage {
    fn update(&mut self, dt: f32, input: &InputIntent) -> Vec<FrameEvent> {
        if self.paused {
            tracing::trace!("stage paused, skipping tick");
            return Vec::new();
        }
        if !dt.is_finite() || dt <= 0.0 {
            tracing::trace!(dt, "skipping tick with degenerate dt");
            return Vec::new();
        }
        let Some(grid) = self.grid.as_ref() else {
            tracing::trace!("no geometry loaded, skipping tick");
            return Vec::new();
        };

        let mut events = Vec::new();

        if let Some(player) = self.state.player.as_mut() {
            let was_on_floor = player.body.on_floor();
            events.extend(player.update(input, &self.config.movement, dt));
            step_body(
                &mut player.body,
                grid,
                &self.config.world,
                Gravity::Applied,
                dt,
            );
            if !was_on_floor && player.body.on_floor() {
                tracing::debug!(y = player.body.bottom(), "player landed");
                events.push(FrameEvent::Landed {
                    actor: ActorId::Player,
                });
            }
        } else {
            tracing::trace!("no player spawned, skipping player tick");
        }

        for (idx, enemy) in self.state.enemies.iter_mut().enumerate() {
            if let Some(reason) = enemy.update(grid, &self.config.patrol) {
                events.push(FrameEvent::EnemyTurned {
                    actor: ActorId::Enemy(idx),
                    reason,
                    direction: enemy.direction,
                });
            }
            step_body(
                &mut enemy.body,
                grid,
                &self.config.world,
                Gravity::Ignored,
                dt,
            );
        }

        self.state.tick += 1;
        events
    }

    fn render_samples(&self) -> Vec<RenderSample> {
        let player = self.state.player.iter().map(|p| RenderSample {
            actor: ActorId::Player,
            animation: select_animation(p.body.on_floor(), p.body.velocity),
            facing_flipped: p.facing.flipped,
        });
        let enemies = self
            .state
            .enemies
            .iter()
            .enumerate()
            .map(|(idx, e)| RenderSample {
                actor: ActorId::Enemy(idx),
                animation: select_animation(e.body.on_floor(), e.body.velocity),
                facing_flipped: e.facing.flipped,
            });
        player.chain(enemies).collect()
    }

    fn tick_rate(&self) -> f32 {
        self.config.tick_rate_hz
    }

    simulation_boilerplate!(state_type: StageState);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilehop_core::render::AnimationKey;
    use tilehop_core::simulation::TurnReason;
    use tilehop_core::test_helpers::{
        contract_degenerate_dt_is_noop, contract_garbage_state_ignored,
        contract_input_sampled_once_per_frame, contract_pause_stops_updates,
        contract_state_roundtrip_preserves, contract_update_advances_state, run_held,
    };
    use tilehop_core::world::WorldGeometry;

    const DT: f32 = 1.0 / 60.0;

    /// 16px tiles, floor top at y=96 spanning columns 0..=11, with a one-way
    /// ledge (top 48) over columns 3..=6.
    fn test_level() -> LevelDef {
        LevelDef {
            tile_size: 16.0,
            rows: vec![
                "#..............".to_string(),
                "#..............".to_string(),
                "#..............".to_string(),
                "#..====........".to_string(),
                "#..............".to_string(),
                "#..............".to_string(),
                "############...".to_string(),
                "############...".to_string(),
            ],
            player_spawn: Some(Vec2::new(20.0, 72.0)),
            enemies: vec![],
        }
    }

    fn settled_stage() -> Stage {
        let mut stage = Stage::from_level(&test_level(), SimConfig::default());
        run_held(&mut stage, InputIntent::IDLE, 30, DT);
        stage
    }

    #[test]
    fn contract_suite() {
        contract_update_advances_state(&mut settled_stage());
        contract_degenerate_dt_is_noop(&mut settled_stage());
        contract_state_roundtrip_preserves(&mut settled_stage());
        contract_garbage_state_ignored(&mut settled_stage());
        contract_pause_stops_updates(&mut settled_stage());
        contract_input_sampled_once_per_frame(&mut settled_stage());
    }

    #[test]
    fn player_settles_on_floor_idle() {
        let stage = settled_stage();
        let player = stage.player().unwrap();
        assert!(player.body.on_floor());
        assert!((player.body.bottom() - 96.0).abs() < 0.01);
        let samples = stage.render_samples();
        assert_eq!(samples[0].animation, AnimationKey::Idle);
    }

    #[test]
    fn missing_geometry_skips_tick() {
        let mut stage = Stage::new(SimConfig::default());
        stage.spawn_player(Vec2::new(0.0, 0.0));
        let before = stage.serialize_state();
        let events = stage.update(DT, &InputIntent::jump());
        assert!(events.is_empty());
        assert_eq!(before, stage.serialize_state());
    }

    #[test]
    fn missing_player_still_ticks_enemies() {
        let mut level = test_level();
        level.player_spawn = None;
        level.enemies.push(grid::EnemySpawn {
            x: 96.0,
            y: 80.0,
            direction: Direction::Right,
        });
        let mut stage = Stage::from_level(&level, SimConfig::default());
        let x_before = stage.enemies()[0].body.position.x;
        run_held(&mut stage, InputIntent::right(), 10, DT);
        assert!(stage.player().is_none());
        assert!(stage.enemies()[0].body.position.x > x_before);
    }

    #[test]
    fn jump_emits_event_and_jump_animation() {
        let mut stage = settled_stage();
        let events = stage.update(DT, &InputIntent::jump());
        assert!(events.contains(&FrameEvent::Jumped {
            actor: ActorId::Player
        }));
        assert_eq!(stage.render_samples()[0].animation, AnimationKey::Jump);
    }

    #[test]
    fn full_jump_lands_with_event() {
        let mut stage = settled_stage();
        let events = run_held(&mut stage, InputIntent::jump(), 120, DT);
        let landed = events
            .iter()
            .filter(|e| matches!(e, FrameEvent::Landed { .. }))
            .count();
        assert_eq!(landed, 1, "Holding jump launches once and lands once");
    }

    #[test]
    fn cancelled_jump_is_lower_than_full_jump() {
        let apex = |hold_ticks: usize| {
            let mut stage = settled_stage();
            let mut min_top = f32::MAX;
            for tick in 0..90 {
                let input = InputIntent::IDLE.with_jump(tick < hold_ticks);
                stage.update(DT, &input);
                min_top = min_top.min(stage.player().unwrap().body.top());
            }
            min_top
        };
        let full = apex(90);
        let hop = apex(3);
        assert!(hop > full + 20.0, "hop apex {hop} should be well below full apex {full}");
    }

    #[test]
    fn player_lands_on_one_way_ledge_after_jumping_through() {
        let mut level = test_level();
        level.player_spawn = Some(Vec2::new(60.0, 72.0));
        let mut stage = Stage::from_level(&level, SimConfig::default());
        run_held(&mut stage, InputIntent::IDLE, 30, DT);
        run_held(&mut stage, InputIntent::jump(), 90, DT);
        let player = stage.player().unwrap();
        assert!(player.body.on_floor());
        assert!(
            (player.body.bottom() - 48.0).abs() < 0.01,
            "Player should rest on the ledge, bottom={}",
            player.body.bottom()
        );
    }

    #[test]
    fn enemy_turns_at_ledge_and_reports_it() {
        let mut level = test_level();
        level.player_spawn = None;
        // Floor ends at x=192; enemy box spans x+1..x+15.
        level.enemies.push(grid::EnemySpawn {
            x: 160.0,
            y: 80.0,
            direction: Direction::Right,
        });
        let mut stage = Stage::from_level(&level, SimConfig::default());
        let events = run_held(&mut stage, InputIntent::IDLE, 60, DT);
        assert!(events.iter().any(|e| matches!(
            e,
            FrameEvent::EnemyTurned {
                actor: ActorId::Enemy(0),
                reason: TurnReason::Ledge,
                direction: Direction::Left,
            }
        )));
        let enemy = &stage.enemies()[0];
        assert!(enemy.body.right() <= 192.0 + 2.0, "Enemy must not walk off the ledge");
        assert!(enemy.facing.flipped);
    }

    #[test]
    fn enemy_turns_at_wall() {
        let mut level = test_level();
        level.player_spawn = None;
        level.enemies.push(grid::EnemySpawn {
            x: 40.0,
            y: 80.0,
            direction: Direction::Left,
        });
        let mut stage = Stage::from_level(&level, SimConfig::default());
        let events = run_held(&mut stage, InputIntent::IDLE, 60, DT);
        assert!(events.iter().any(|e| matches!(
            e,
            FrameEvent::EnemyTurned {
                reason: TurnReason::Wall,
                direction: Direction::Right,
                ..
            }
        )));
        assert!(stage.enemies()[0].body.left() >= 16.0);
    }

    #[test]
    fn enemies_stay_on_floor_while_patrolling() {
        let mut level = test_level();
        level.player_spawn = None;
        level.enemies.push(grid::EnemySpawn {
            x: 100.0,
            y: 80.0,
            direction: Direction::Right,
        });
        let mut stage = Stage::from_level(&level, SimConfig::default());
        for _ in 0..600 {
            stage.update(DT, &InputIntent::IDLE);
            let enemy = &stage.enemies()[0];
            assert!(enemy.body.bottom() <= 96.0 + 4.0, "bottom={}", enemy.body.bottom());
        }
    }

    #[test]
    fn snapshot_restores_exact_state() {
        let mut stage = settled_stage();
        let snapshot = stage.serialize_state();
        let frozen = stage.state().clone();
        run_held(&mut stage, InputIntent::right(), 20, DT);
        assert_ne!(stage.state(), &frozen);
        stage.apply_state(&snapshot);
        assert_eq!(stage.state(), &frozen);
    }

    #[test]
    fn tick_rate_comes_from_config() {
        let mut config = SimConfig::default();
        config.tick_rate_hz = 30.0;
        assert_eq!(Stage::new(config).tick_rate(), 30.0);
    }

    // ================================================================
    // Property-based tests (proptest)
    // ================================================================

    mod proptests {
        use super::*;
        use crate::grid_gen::generate_level;
        use proptest::prelude::*;

        fn intent_from(code: u8) -> InputIntent {
            InputIntent {
                move_left: code & 1 != 0,
                move_right: code & 2 != 0,
                jump_held: code & 4 != 0,
            }
        }

        proptest! {
            #[test]
            fn grounded_player_rests_on_a_tile_top(
                seed in 0u64..200,
                inputs in proptest::collection::vec(0u8..8, 10..200),
            ) {
                let level = generate_level(seed);
                let mut stage = Stage::from_level(&level, SimConfig::default());
                let grid = level.grid();

                for code in inputs {
                    stage.update(DT, &intent_from(code));
                    let body = &stage.player().unwrap().body;
                    prop_assert!(body.position.is_finite());
                    prop_assert!(body.velocity.x.abs() <= SimConfig::default().movement.max_speed + 1e-3);
                    if body.blocked_down {
                        let row = grid.tile_coord(body.bottom() + 0.5);
                        let cols = grid.tile_coord(body.left())..=grid.tile_coord(body.right() - 0.01);
                        let supported = cols
                            .filter_map(|col| grid.cell_at(grid.tile_origin(col, row).x + 1.0, body.bottom() + 0.5))
                            .any(|c| c.is_collidable() && (c.top_y - body.bottom()).abs() < 0.05);
                        prop_assert!(supported, "Grounded body must sit on a tile top");
                    }
                }
            }

            #[test]
            fn enemy_turns_only_on_triggers(
                seed in 0u64..100,
                ticks in 1usize..300,
            ) {
                let level = generate_level(seed);
                let mut stage = Stage::from_level(&level, SimConfig::default());
                let patrol = SimConfig::default().patrol;

                for _ in 0..ticks {
                    let grid = stage.grid().unwrap();
                    let expected: Vec<bool> = stage
                        .enemies()
                        .iter()
                        .map(|e| {
                            e.body.blocked_sideways()
                                || (e.body.on_floor() && !e.floor_ahead(grid, &patrol))
                        })
                        .collect();
                    let before: Vec<Direction> =
                        stage.enemies().iter().map(|e| e.direction).collect();

                    stage.update(DT, &InputIntent::IDLE);

                    for (idx, enemy) in stage.enemies().iter().enumerate() {
                        prop_assert_eq!(enemy.direction != before[idx], expected[idx]);
                    }
                }
            }
        }
    }
}
