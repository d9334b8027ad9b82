use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tilehop_core::math::{Direction, Vec2};

use crate::grid::{EnemySpawn, LevelDef, TILE_SIZE, Tile, TileGrid};

/// Chunk width in tiles (each procedural section is this wide).
const CHUNK_WIDTH: u32 = 10;
/// Level height in tiles.
pub const LEVEL_HEIGHT: u32 = 15;
/// Number of chunks in a generated level.
const NUM_CHUNKS: u32 = 8;
/// Rows of solid ground at the bottom.
const GROUND_ROWS: u32 = 2;

/// Row index of the topmost ground row.
pub const fn ground_row() -> u32 {
    LEVEL_HEIGHT - GROUND_ROWS
}

/// Generate a deterministic level from a seed.
///
/// The first chunk is flat so the player spawn is always supported.
pub fn generate_level(seed: u64) -> LevelDef {
    let width = CHUNK_WIDTH * NUM_CHUNKS;
    let mut grid = TileGrid::new(width, LEVEL_HEIGHT, TILE_SIZE);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut enemies = Vec::new();

    for x in 0..width {
        for y in ground_row()..LEVEL_HEIGHT {
            grid.set_tile(x, y, Tile::Solid);
        }
    }

    // Boundary walls keep actors inside the level.
    for y in 0..ground_row() {
        grid.set_tile(0, y, Tile::Solid);
        grid.set_tile(width - 1, y, Tile::Solid);
    }

    for chunk_idx in 1..NUM_CHUNKS {
        let base_x = chunk_idx * CHUNK_WIDTH;
        generate_chunk(&mut grid, &mut rng, base_x, &mut enemies);
    }

    let surface = ground_row() as f32 * TILE_SIZE;
    LevelDef {
        tile_size: TILE_SIZE,
        rows: grid.to_rows(),
        player_spawn: Some(Vec2::new(2.0 * TILE_SIZE, surface - 2.0 * TILE_SIZE)),
        enemies,
    }
}

fn generate_chunk(grid: &mut TileGrid, rng: &mut StdRng, base_x: u32, enemies: &mut Vec<EnemySpawn>) {
    let ground = ground_row();
    let pattern = rng.random_range(0u8..5);

    match pattern {
        0 => {
            // Pit
            let pit_start = base_x + rng.random_range(3..6);
            let pit_width = rng.random_range(2..4);
            for x in pit_start..pit_start + pit_width {
                for y in ground..LEVEL_HEIGHT {
                    grid.set_tile(x, y, Tile::Empty);
                }
            }
            // Patroller on the lip before the pit
            enemies.push(spawn_on_ground(base_x + 1, Direction::Right));
        },
        1 => {
            // One-way ledges stacked above the floor
            let ledge_y = ground - rng.random_range(3u32..5);
            let ledge_start = base_x + rng.random_range(1..4);
            let ledge_len = rng.random_range(3..6);
            for x in ledge_start..(ledge_start + ledge_len).min(grid.width - 1) {
                grid.set_tile(x, ledge_y, Tile::OneWay);
            }
            enemies.push(EnemySpawn {
                x: ledge_start as f32 * TILE_SIZE,
                y: (ledge_y - 1) as f32 * TILE_SIZE,
                direction: Direction::Right,
            });
        },
        2 => {
            // Staircase going up
            for i in 0..4u32 {
                let x = base_x + 2 + i * 2;
                let y = ground - 1 - i;
                grid.set_tile(x, y, Tile::Solid);
                grid.set_tile(x + 1, y, Tile::Solid);
            }
        },
        3 => {
            // Wall with a one-way step to climb it
            let wall_x = base_x + CHUNK_WIDTH / 2;
            let wall_h = rng.random_range(2u32..4);
            for y in ground - wall_h..ground {
                grid.set_tile(wall_x, y, Tile::Solid);
            }
            grid.set_tile(wall_x - 2, ground - 2, Tile::OneWay);
            grid.set_tile(wall_x - 1, ground - 2, Tile::OneWay);
            enemies.push(spawn_on_ground(base_x + 1, Direction::Right));
        },
        _ => {
            // Flat run with a patroller
            let dir = if rng.random_bool(0.5) {
                Direction::Left
            } else {
                Direction::Right
            };
            enemies.push(spawn_on_ground(base_x + CHUNK_WIDTH / 2, dir));
        },
    }
}

fn spawn_on_ground(col: u32, direction: Direction) -> EnemySpawn {
    EnemySpawn {
        x: col as f32 * TILE_SIZE,
        y: (ground_row() - 1) as f32 * TILE_SIZE,
        direction,
    }
}
