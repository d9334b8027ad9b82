use serde::{Deserialize, Serialize};

/// Collision metadata of a single tile.
///
/// Missing flags deserialize to `false`, so a tile without explicit metadata
/// never collides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileCell {
    pub solid: bool,
    pub one_way: bool,
    /// World-space y of the tile's top edge.
    pub top_y: f32,
}

impl TileCell {
    pub const fn solid(top_y: f32) -> Self {
        Self {
            solid: true,
            one_way: false,
            top_y,
        }
    }

    pub const fn one_way(top_y: f32) -> Self {
        Self {
            solid: false,
            one_way: true,
            top_y,
        }
    }

    /// Whether this cell can support or block a body at all.
    pub const fn is_collidable(&self) -> bool {
        self.solid || self.one_way
    }
}

/// Read-only tile geometry queried by bodies and agents.
///
/// Written once at level load and shared by every actor afterwards.
pub trait WorldGeometry {
    /// Cell covering the world position, or `None` for empty space.
    fn cell_at(&self, world_x: f32, world_y: f32) -> Option<TileCell>;

    /// Edge length of a square tile in world units.
    fn tile_size(&self) -> f32;
}

impl<T: WorldGeometry + ?Sized> WorldGeometry for &T {
    fn cell_at(&self, world_x: f32, world_y: f32) -> Option<TileCell> {
        (**self).cell_at(world_x, world_y)
    }

    fn tile_size(&self) -> f32 {
        (**self).tile_size()
    }
}
