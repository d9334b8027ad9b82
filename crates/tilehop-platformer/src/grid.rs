use serde::{Deserialize, Serialize};

use tilehop_core::math::{Direction, Vec2};
use tilehop_core::world::{TileCell, WorldGeometry};

use crate::config::LoadError;

/// Default tile edge length in pixels.
pub const TILE_SIZE: f32 = 16.0;

/// Tile types for the level grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    Empty,
    Solid,
    OneWay,
}

impl Tile {
    pub fn from_glyph(glyph: char) -> Option<Tile> {
        match glyph {
            '.' | ' ' => Some(Tile::Empty),
            '#' => Some(Tile::Solid),
            '=' => Some(Tile::OneWay),
            _ => None,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            Tile::Empty => '.',
            Tile::Solid => '#',
            Tile::OneWay => '=',
        }
    }
}

/// Static level geometry, y-down, stored row-major (`row * width + col`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    pub width: u32,
    pub height: u32,
    pub tile_size: f32,
    pub tiles: Vec<Tile>,
}

impl TileGrid {
    pub fn new(width: u32, height: u32, tile_size: f32) -> Self {
        Self {
            width,
            height,
            tile_size,
            tiles: vec![Tile::Empty; (width * height) as usize],
        }
    }

    /// Build a grid from text rows. Unknown glyphs become empty tiles.
    pub fn from_rows<S: AsRef<str>>(tile_size: f32, rows: &[S]) -> Self {
        let height = rows.len() as u32;
        let width = rows
            .iter()
            .map(|r| r.as_ref().chars().count())
            .max()
            .unwrap_or(0) as u32;
        let mut grid = Self::new(width, height, tile_size);
        for (y, row) in rows.iter().enumerate() {
            for (x, glyph) in row.as_ref().chars().enumerate() {
                let tile = Tile::from_glyph(glyph).unwrap_or_else(|| {
                    tracing::warn!("Unknown tile glyph {glyph:?} at ({x}, {y}), treating as empty");
                    Tile::Empty
                });
                grid.set_tile(x as u32, y as u32, tile);
            }
        }
        grid
    }

    pub fn get_tile(&self, col: i32, row: i32) -> Tile {
        if col < 0 || row < 0 || col >= self.width as i32 || row >= self.height as i32 {
            return Tile::Empty;
        }
        self.tiles[row as usize * self.width as usize + col as usize]
    }

    pub fn set_tile(&mut self, col: u32, row: u32, tile: Tile) {
        if col < self.width && row < self.height {
            self.tiles[row as usize * self.width as usize + col as usize] = tile;
        }
    }

    /// Tile index containing a world coordinate.
    pub fn tile_coord(&self, world: f32) -> i32 {
        (world / self.tile_size).floor() as i32
    }

    /// World-space top-left corner of a tile.
    pub fn tile_origin(&self, col: i32, row: i32) -> Vec2 {
        Vec2::new(col as f32 * self.tile_size, row as f32 * self.tile_size)
    }

    pub fn world_width(&self) -> f32 {
        self.width as f32 * self.tile_size
    }

    pub fn world_height(&self) -> f32 {
        self.height as f32 * self.tile_size
    }

    pub fn to_rows(&self) -> Vec<String> {
        (0..self.height as i32)
            .map(|row| {
                (0..self.width as i32)
                    .map(|col| self.get_tile(col, row).glyph())
                    .collect()
            })
            .collect()
    }
}

impl WorldGeometry for TileGrid {
    fn cell_at(&self, world_x: f32, world_y: f32) -> Option<TileCell> {
        if !world_x.is_finite() || !world_y.is_finite() {
            return None;
        }
        let row = self.tile_coord(world_y);
        let top_y = row as f32 * self.tile_size;
        match self.get_tile(self.tile_coord(world_x), row) {
            Tile::Empty => None,
            Tile::Solid => Some(TileCell::solid(top_y)),
            Tile::OneWay => Some(TileCell::one_way(top_y)),
        }
    }

    fn tile_size(&self) -> f32 {
        self.tile_size
    }
}

/// Enemy placement in a level description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_direction")]
    pub direction: Direction,
}

fn default_direction() -> Direction {
    Direction::Right
}

/// Level description: geometry rows plus actor spawns, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDef {
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,
    pub rows: Vec<String>,
    #[serde(default)]
    pub player_spawn: Option<Vec2>,
    #[serde(default)]
    pub enemies: Vec<EnemySpawn>,
}

fn default_tile_size() -> f32 {
    TILE_SIZE
}

impl LevelDef {
    pub fn from_toml_str(content: &str) -> Result<Self, LoadError> {
        let level: LevelDef =
            toml::from_str(content).map_err(|e| LoadError::Parse(e.to_string()))?;
        level.validate()?;
        Ok(level)
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(LoadError::Invalid(format!(
                "tile_size must be positive, got {}",
                self.tile_size
            )));
        }
        if self.rows.is_empty() {
            return Err(LoadError::Invalid("level has no rows".to_string()));
        }
        Ok(())
    }

    pub fn grid(&self) -> TileGrid {
        TileGrid::from_rows(self.tile_size, self.rows.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_grid() -> TileGrid {
        TileGrid::from_rows(16.0, &["....", ".==.", "####"])
    }

    #[test]
    fn cell_at_maps_world_to_tile() {
        let grid = sample_grid();
        assert_eq!(grid.cell_at(5.0, 5.0), None);
        assert_eq!(grid.cell_at(20.0, 17.0), Some(TileCell::one_way(16.0)));
        assert_eq!(grid.cell_at(63.9, 40.0), Some(TileCell::solid(32.0)));
    }

    #[test]
    fn outside_grid_is_empty() {
        let grid = sample_grid();
        assert_eq!(grid.cell_at(-1.0, 40.0), None);
        assert_eq!(grid.cell_at(64.0, 40.0), None);
        assert_eq!(grid.cell_at(10.0, 48.0), None);
        assert_eq!(grid.cell_at(f32::NAN, 40.0), None);
    }

    #[test]
    fn unknown_glyphs_are_empty() {
        let grid = TileGrid::from_rows(16.0, &["#?#"]);
        assert_eq!(grid.get_tile(1, 0), Tile::Empty);
        assert_eq!(grid.get_tile(0, 0), Tile::Solid);
    }

    #[test]
    fn ragged_rows_pad_with_empty() {
        let grid = TileGrid::from_rows(16.0, &["#", "###"]);
        assert_eq!(grid.width, 3);
        assert_eq!(grid.get_tile(2, 0), Tile::Empty);
        assert_eq!(grid.to_rows(), vec!["#..".to_string(), "###".to_string()]);
    }

    #[test]
    fn level_from_toml() {
        let level = LevelDef::from_toml_str(
            r#"
            tile_size = 32.0
            rows = ['....', '#..#', '####']
            player_spawn = { x = 40.0, y = 10.0 }

            [[enemies]]
            x = 64.0
            y = 20.0
            direction = "Left"

            [[enemies]]
            x = 80.0
            y = 20.0
            "#,
        )
        .unwrap();
        assert_eq!(level.tile_size, 32.0);
        assert_eq!(level.player_spawn, Some(Vec2::new(40.0, 10.0)));
        assert_eq!(level.enemies.len(), 2);
        assert_eq!(level.enemies[0].direction, Direction::Left);
        assert_eq!(level.enemies[1].direction, Direction::Right);
        assert_eq!(level.grid().get_tile(3, 1), Tile::Solid);
    }

    #[test]
    fn level_rejects_bad_tile_size() {
        let err = LevelDef::from_toml_str("tile_size = 0.0\nrows = [\"#\"]").unwrap_err();
        assert!(matches!(err, LoadError::Invalid(_)));
        let err = LevelDef::from_toml_str("rows = []").unwrap_err();
        assert!(matches!(err, LoadError::Invalid(_)));
    }
}
