//! Board settings and draw log storage.
//!
//! The renderer only needs the two lookups of [BoardStore]. [MemoryStore]
//! implements them and also carries the draw-log operations used by the
//! game itself (placing pixels, statistics, ...).

pub mod snapshot;

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use log::debug;
use pixelboard_common::{BoardConfig, BoardId, DrawEvent, PixelColor};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No settings are stored for the board
    #[error("board {0} not found")]
    BoardNotFound(BoardId),
    /// The pixel lies outside of the board
    #[error("({x}, {y}) is outside of board {board}")]
    OutOfBounds { board: BoardId, x: i64, y: i64 },
    /// The author placed a pixel too recently
    #[error("author {author} must wait {retry_after_secs}s before drawing on board {board}")]
    Cooldown {
        board: BoardId,
        author: i64,
        retry_after_secs: u64,
    },
    /// Two events of a draw log share a sequence index
    #[error("board {board} has more than one event #{sequence}")]
    DuplicateSequence { board: BoardId, sequence: u64 },
    /// No sequence index is left for a new event
    #[error("board {0} has no sequence index left")]
    SequenceExhausted(BoardId),
    /// A writer panicked while holding the store lock
    #[error("store lock poisoned")]
    Poisoned,
}

/// Lookups the renderer performs for a board.
pub trait BoardStore: Send + Sync {
    /// Board settings, or None if the board is unknown.
    fn board_config(&self, id: BoardId) -> Result<Option<BoardConfig>, StoreError>;

    /// Draw log of the board, ascending by sequence index.
    ///
    /// An unknown board has an empty log.
    fn draw_log(&self, id: BoardId) -> Result<Vec<DrawEvent>, StoreError>;
}

/// Number of pixels placed by one author.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AuthorStat {
    pub author: i64,
    pub placements: usize,
}

#[derive(Clone, Debug)]
struct BoardEntry {
    config: BoardConfig,
    events: Vec<DrawEvent>,
    next_sequence: u64,
    /// Minimum delay between two placements of the same author
    cooldown: Duration,
    last_placed: HashMap<i64, Instant>,
}

impl BoardEntry {
    fn new(config: BoardConfig, events: Vec<DrawEvent>, next_sequence: u64) -> Self {
        BoardEntry {
            config,
            events,
            next_sequence,
            cooldown: Duration::ZERO,
            last_placed: HashMap::new(),
        }
    }

    fn clear(&mut self) {
        self.events.clear();
        self.last_placed.clear();
    }
}

/// In-memory [BoardStore].
#[derive(Debug, Default)]
pub struct MemoryStore {
    boards: RwLock<HashMap<BoardId, BoardEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a board, or resize an existing one.
    ///
    /// The draw log of the board is cleared: a resized board starts over.
    pub fn set_board(&self, id: BoardId, config: BoardConfig) -> Result<(), StoreError> {
        let mut boards = self.boards.write().map_err(|_| StoreError::Poisoned)?;
        let entry = boards
            .entry(id)
            .or_insert_with(|| BoardEntry::new(config, Vec::new(), 0));
        entry.config = config;
        entry.clear();
        debug!("Board {} set to {}", id, config);
        Ok(())
    }

    /// Insert a board with an existing draw log.
    ///
    /// Events are kept in sequence order, the next placement continues
    /// after the highest sequence index. Sequence indices must be unique.
    pub fn insert_board(
        &self,
        id: BoardId,
        config: BoardConfig,
        mut events: Vec<DrawEvent>,
    ) -> Result<(), StoreError> {
        events.sort_by_key(|event| event.sequence);
        if let Some(pair) = events.windows(2).find(|pair| pair[0].sequence == pair[1].sequence) {
            return Err(StoreError::DuplicateSequence {
                board: id,
                sequence: pair[0].sequence,
            });
        }
        let next_sequence = match events.last() {
            Some(event) => event
                .sequence
                .checked_add(1)
                .ok_or(StoreError::SequenceExhausted(id))?,
            None => 0,
        };

        let mut boards = self.boards.write().map_err(|_| StoreError::Poisoned)?;
        boards.insert(id, BoardEntry::new(config, events, next_sequence));
        Ok(())
    }

    /// Set the minimum delay between two placements of an author on the board.
    pub fn set_cooldown(&self, id: BoardId, cooldown: Duration) -> Result<(), StoreError> {
        let mut boards = self.boards.write().map_err(|_| StoreError::Poisoned)?;
        let entry = boards.get_mut(&id).ok_or(StoreError::BoardNotFound(id))?;
        entry.cooldown = cooldown;
        Ok(())
    }

    /// Record a pixel placement and return the stored event.
    ///
    /// The author must have waited the board cooldown since their last
    /// placement.
    pub fn place_pixel(
        &self,
        id: BoardId,
        author: i64,
        x: i64,
        y: i64,
        color: PixelColor,
    ) -> Result<DrawEvent, StoreError> {
        self.place_pixel_at(id, author, x, y, color, Instant::now())
    }

    fn place_pixel_at(
        &self,
        id: BoardId,
        author: i64,
        x: i64,
        y: i64,
        color: PixelColor,
        now: Instant,
    ) -> Result<DrawEvent, StoreError> {
        let mut boards = self.boards.write().map_err(|_| StoreError::Poisoned)?;
        let entry = boards.get_mut(&id).ok_or(StoreError::BoardNotFound(id))?;
        if let Some(last) = entry.last_placed.get(&author) {
            let elapsed = now.saturating_duration_since(*last);
            if elapsed < entry.cooldown {
                let wait = entry.cooldown - elapsed;
                return Err(StoreError::Cooldown {
                    board: id,
                    author,
                    retry_after_secs: wait.as_secs() + u64::from(wait.subsec_nanos() > 0),
                });
            }
        }
        if !entry.config.is_valid() || !entry.config.grid_range().contains(x, y) {
            return Err(StoreError::OutOfBounds { board: id, x, y });
        }
        let next_sequence = entry
            .next_sequence
            .checked_add(1)
            .ok_or(StoreError::SequenceExhausted(id))?;

        let event = DrawEvent::new(entry.next_sequence, author, x, y, color);
        entry.next_sequence = next_sequence;
        entry.events.push(event);
        entry.last_placed.insert(author, now);
        debug!(
            "Board {}: #{} ({}, {}) {} by {}",
            id, event.sequence, x, y, color, author
        );
        Ok(event)
    }

    /// Remove every event of the board's draw log.
    ///
    /// Sequence indices keep increasing across clears, cooldowns start over.
    pub fn clear_log(&self, id: BoardId) -> Result<(), StoreError> {
        let mut boards = self.boards.write().map_err(|_| StoreError::Poisoned)?;
        let entry = boards.get_mut(&id).ok_or(StoreError::BoardNotFound(id))?;
        entry.clear();
        Ok(())
    }

    /// Number of events in the board's draw log.
    pub fn count_events(&self, id: BoardId) -> Result<usize, StoreError> {
        let boards = self.boards.read().map_err(|_| StoreError::Poisoned)?;
        Ok(boards.get(&id).map_or(0, |entry| entry.events.len()))
    }

    /// Placements per author, most active first (ties by author id).
    pub fn author_stats(&self, id: BoardId) -> Result<Vec<AuthorStat>, StoreError> {
        let boards = self.boards.read().map_err(|_| StoreError::Poisoned)?;
        let mut counts: HashMap<i64, usize> = HashMap::new();
        if let Some(entry) = boards.get(&id) {
            for event in &entry.events {
                *counts.entry(event.author).or_default() += 1;
            }
        }

        let mut stats: Vec<AuthorStat> = counts
            .into_iter()
            .map(|(author, placements)| AuthorStat { author, placements })
            .collect();
        stats.sort_by(|a, b| {
            b.placements
                .cmp(&a.placements)
                .then_with(|| a.author.cmp(&b.author))
        });
        Ok(stats)
    }

    /// Check if every cell of the board has been painted at least once.
    pub fn is_filled(&self, id: BoardId) -> Result<bool, StoreError> {
        let boards = self.boards.read().map_err(|_| StoreError::Poisoned)?;
        let entry = boards.get(&id).ok_or(StoreError::BoardNotFound(id))?;
        if !entry.config.is_valid() {
            return Ok(false);
        }
        let range = entry.config.grid_range();
        let painted: HashSet<(i64, i64)> =
            entry.events.iter().map(|event| (event.x, event.y)).collect();
        Ok(range.cells().all(|cell| painted.contains(&cell)))
    }
}

impl BoardStore for MemoryStore {
    fn board_config(&self, id: BoardId) -> Result<Option<BoardConfig>, StoreError> {
        let boards = self.boards.read().map_err(|_| StoreError::Poisoned)?;
        Ok(boards.get(&id).map(|entry| entry.config))
    }

    fn draw_log(&self, id: BoardId) -> Result<Vec<DrawEvent>, StoreError> {
        let boards = self.boards.read().map_err(|_| StoreError::Poisoned)?;
        Ok(boards
            .get(&id)
            .map(|entry| entry.events.clone())
            .unwrap_or_default())
    }
}
