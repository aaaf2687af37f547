//! # World Representation
//!
//! Chunks of tiles and the agents standing in them. Chunks arrive as already-parsed
//! [`ChunkLayout`]s; this module validates and instantiates them but does not read any
//! map file format.

use crate::config::{CHUNK_TILES, TILE_SIZE};
use crate::dialogue::{ContentStore, DialogueCoordinator, DialogueKey};
use crate::{Agent, AgentSpec, ChunkCoord, EntityId, GameEvent, WayfarerError, WayfarerResult};
use log::info;
use macroquad::math::{vec2, Vec2};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Types of tiles that make up a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Floor,
    Wall,
    Furniture,
}

impl TileKind {
    pub fn is_walkable(self) -> bool {
        matches!(self, TileKind::Floor)
    }

    /// Maps a layout symbol: `.` floor, `#` wall, `f` furniture.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '.' => Some(TileKind::Floor),
            '#' => Some(TileKind::Wall),
            'f' => Some(TileKind::Furniture),
            _ => None,
        }
    }
}

/// Already-parsed description of one chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkLayout {
    pub coord: ChunkCoord,
    pub room_identifier: String,
    pub tiles: Vec<Vec<TileKind>>,
    pub agents: Vec<AgentSpec>,
}

impl ChunkLayout {
    pub fn new(coord: ChunkCoord, room_identifier: impl Into<String>, tiles: Vec<Vec<TileKind>>) -> Self {
        Self {
            coord,
            room_identifier: room_identifier.into(),
            tiles,
            agents: Vec::new(),
        }
    }

    /// A chunk with nothing but floor.
    pub fn open(coord: ChunkCoord, room_identifier: impl Into<String>) -> Self {
        Self::new(
            coord,
            room_identifier,
            vec![vec![TileKind::Floor; CHUNK_TILES]; CHUNK_TILES],
        )
    }

    /// Builds the tile grid from rows of layout symbols.
    pub fn from_rows(
        coord: ChunkCoord,
        room_identifier: impl Into<String>,
        rows: &[&str],
    ) -> WayfarerResult<Self> {
        let tiles = rows
            .iter()
            .map(|row| {
                row.chars()
                    .map(|symbol| {
                        TileKind::from_symbol(symbol).ok_or_else(|| {
                            WayfarerError::InvalidWorld(format!(
                                "unknown tile symbol '{}' in chunk {:?}",
                                symbol, coord
                            ))
                        })
                    })
                    .collect::<WayfarerResult<Vec<_>>>()
            })
            .collect::<WayfarerResult<Vec<_>>>()?;
        Ok(Self::new(coord, room_identifier, tiles))
    }

    pub fn with_agent(mut self, agent: AgentSpec) -> Self {
        self.agents.push(agent);
        self
    }

    fn validate(&self) -> WayfarerResult<()> {
        let square = self.tiles.len() == CHUNK_TILES
            && self.tiles.iter().all(|row| row.len() == CHUNK_TILES);
        if !square {
            return Err(WayfarerError::InvalidWorld(format!(
                "chunk {:?} must be {}x{} tiles",
                self.coord, CHUNK_TILES, CHUNK_TILES
            )));
        }

        if let Some(agent) = self
            .agents
            .iter()
            .find(|agent| agent.tile.0 >= CHUNK_TILES || agent.tile.1 >= CHUNK_TILES)
        {
            return Err(WayfarerError::InvalidWorld(format!(
                "agent {} in chunk {:?} stands outside the chunk at tile {:?}",
                agent.name, self.coord, agent.tile
            )));
        }
        Ok(())
    }
}

/// A loaded chunk with live agents.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub coord: ChunkCoord,
    pub room_identifier: String,
    pub tiles: Vec<Vec<TileKind>>,
    pub agents: Vec<Agent>,
}

impl Chunk {
    fn from_layout(layout: ChunkLayout, content: &Rc<ContentStore>) -> WayfarerResult<Self> {
        layout.validate()?;
        let origin = layout.coord.origin();
        let agents = layout
            .agents
            .iter()
            .map(|spec| Agent::from_spec(spec, origin, Rc::clone(content)))
            .collect();

        Ok(Self {
            coord: layout.coord,
            room_identifier: layout.room_identifier,
            tiles: layout.tiles,
            agents,
        })
    }

    pub fn origin(&self) -> Vec2 {
        self.coord.origin()
    }

    /// Tile under a world point, if the point lies in this chunk.
    pub fn tile_at(&self, point: Vec2) -> Option<TileKind> {
        let local = point - self.origin();
        if local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        let column = (local.x / TILE_SIZE) as usize;
        let row = (local.y / TILE_SIZE) as usize;
        self.tiles.get(row).and_then(|tiles| tiles.get(column)).copied()
    }

    /// Every tile with the world position of its top-left corner.
    pub fn tiles_with_positions(&self) -> impl Iterator<Item = (Vec2, TileKind)> + '_ {
        let origin = self.origin();
        self.tiles.iter().enumerate().flat_map(move |(row, tiles)| {
            tiles.iter().enumerate().map(move |(column, tile)| {
                (
                    origin + vec2(column as f32 * TILE_SIZE, row as f32 * TILE_SIZE),
                    *tile,
                )
            })
        })
    }
}

/// All loaded chunks.
#[derive(Debug, Clone)]
pub struct World {
    chunks: Vec<Chunk>,
    pub render_distance: i32,
}

impl World {
    /// Instantiates chunks and their agents. Every agent shares `content`.
    pub fn from_layouts(
        layouts: Vec<ChunkLayout>,
        content: &Rc<ContentStore>,
        render_distance: i32,
    ) -> WayfarerResult<Self> {
        let mut world = Self {
            chunks: Vec::with_capacity(layouts.len()),
            render_distance,
        };
        for layout in layouts {
            world.load_chunk(layout, content)?;
        }
        Ok(world)
    }

    /// Adds a chunk. Fails if a chunk already occupies the coordinate.
    pub fn load_chunk(&mut self, layout: ChunkLayout, content: &Rc<ContentStore>) -> WayfarerResult<()> {
        if self.chunk(layout.coord).is_some() {
            return Err(WayfarerError::InvalidWorld(format!(
                "chunk {:?} is already loaded",
                layout.coord
            )));
        }
        let chunk = Chunk::from_layout(layout, content)?;
        info!(
            "Loaded chunk {:?} \"{}\" with {} agents",
            chunk.coord,
            chunk.room_identifier,
            chunk.agents.len()
        );
        self.chunks.push(chunk);
        Ok(())
    }

    /// Removes a chunk, closing any conversation its agents hold.
    ///
    /// Returns `None` if no chunk was loaded at `coord`.
    pub fn unload_chunk(
        &mut self,
        coord: ChunkCoord,
        coordinator: &mut DialogueCoordinator,
    ) -> Option<Vec<GameEvent>> {
        let index = self.chunks.iter().position(|chunk| chunk.coord == coord)?;
        let mut chunk = self.chunks.remove(index);
        let events = chunk
            .agents
            .iter_mut()
            .filter_map(|agent| agent.end_dialogue(coordinator))
            .collect();
        info!("Unloaded chunk {:?}", coord);
        Some(events)
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.iter().find(|chunk| chunk.coord == coord)
    }

    /// Chunks within render distance of the chunk containing `point`.
    pub fn visible_chunks(&self, point: Vec2) -> impl Iterator<Item = &Chunk> + '_ {
        let center = ChunkCoord::containing(point);
        let reach = self.render_distance.max(0) as u32;
        self.chunks
            .iter()
            .filter(move |chunk| chunk.coord.chebyshev_distance(center) <= reach)
    }

    pub fn tile_at(&self, point: Vec2) -> Option<TileKind> {
        self.chunk(ChunkCoord::containing(point))
            .and_then(|chunk| chunk.tile_at(point))
    }

    /// Unloaded space is never walkable.
    pub fn is_walkable(&self, point: Vec2) -> bool {
        self.tile_at(point).map_or(false, TileKind::is_walkable)
    }

    pub fn agents(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.chunks.iter().flat_map(|chunk| chunk.agents.iter())
    }

    pub fn agents_mut(&mut self) -> impl Iterator<Item = &mut Agent> + '_ {
        self.chunks.iter_mut().flat_map(|chunk| chunk.agents.iter_mut())
    }

    pub fn agent(&self, id: EntityId) -> Option<&Agent> {
        self.agents().find(|agent| agent.id() == id)
    }

    pub fn agent_named(&self, name: &str) -> Option<&Agent> {
        self.agents().find(|agent| agent.name == name)
    }
}

/// Player spawn point of the starter village.
pub fn starter_spawn() -> Vec2 {
    vec2(275.0, 275.0)
}

/// The built-in village: a market square and the road leading east out of it.
pub fn starter_layouts() -> WayfarerResult<Vec<ChunkLayout>> {
    let centre = vec2(TILE_SIZE / 2.0, TILE_SIZE / 2.0);

    let market = ChunkLayout::from_rows(
        ChunkCoord::new(0, 0),
        "Market Square",
        &[
            "##########",
            "#........#",
            "#.ff.....#",
            "#........#",
            "#.........",
            "#.........",
            "#........#",
            "#....ff..#",
            "#........#",
            "##########",
        ],
    )?
    .with_agent(
        AgentSpec::new("Greta", DialogueKey::entry("shopkeeper"))
            .at_tile(6, 2)
            .with_offset(centre)
            .with_profession("shopkeeper")
            .with_detection(80.0),
    )
    .with_agent(
        AgentSpec::new("Old Tom", DialogueKey::entry("beggar"))
            .at_tile(2, 6)
            .with_offset(centre)
            .with_profession("beggar"),
    )
    .with_agent(
        AgentSpec::new("Hanne", DialogueKey::entry("greeting"))
            .at_tile(7, 8)
            .with_offset(centre)
            .ambient(),
    );

    let road = ChunkLayout::from_rows(
        ChunkCoord::new(1, 0),
        "Old Road",
        &[
            "##########",
            "#........#",
            "#........#",
            "#...f....#",
            "..........",
            "..........",
            "#........#",
            "#........#",
            "#........#",
            "##########",
        ],
    )?
    .with_agent(
        AgentSpec::new("Sentry", DialogueKey::entry("guard"))
            .at_tile(8, 4)
            .with_offset(centre)
            .with_profession("guard")
            .with_detection(70.0),
    )
    .with_agent(
        AgentSpec::new("Ilse", DialogueKey::entry("scholar"))
            .at_tile(3, 7)
            .with_offset(centre)
            .with_profession("scholar"),
    )
    .with_agent(
        AgentSpec::new("Wanderer", DialogueKey::entry("road"))
            .at_tile(6, 2)
            .with_offset(centre)
            .ambient(),
    );

    Ok(vec![market, road])
}
