//! JSON snapshot used to seed a [MemoryStore].
//!
//! ```json
//! { "boards": [ { "id": 1, "width": 10, "height": 10, "cooldown_secs": 60,
//!     "events": [ { "sequence": 0, "author": 7, "x": 0, "y": 0, "color": 16711680 } ] } ] }
//! ```

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Duration;

use log::info;
use pixelboard_common::{BoardConfig, BoardId, DrawEvent};
use serde::Deserialize;
use thiserror::Error;

use crate::store::{MemoryStore, StoreError};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("cannot read snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("board {0} appears more than once")]
    DuplicateBoard(BoardId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Deserialize)]
struct Snapshot {
    #[serde(default)]
    boards: Vec<BoardSnapshot>,
}

#[derive(Debug, Deserialize)]
struct BoardSnapshot {
    id: BoardId,
    width: i32,
    height: i32,
    #[serde(default)]
    cooldown_secs: u64,
    #[serde(default)]
    events: Vec<DrawEvent>,
}

/// Load the snapshot file at `path`.
pub fn load(path: &Path) -> Result<MemoryStore, SnapshotError> {
    let file = File::open(path)?;
    let store = from_reader(BufReader::new(file))?;
    info!("Loaded snapshot from {}", path.display());
    Ok(store)
}

/// Load a snapshot from any reader.
pub fn from_reader<R: Read>(reader: R) -> Result<MemoryStore, SnapshotError> {
    let snapshot: Snapshot = serde_json::from_reader(reader)?;
    let store = MemoryStore::new();
    let mut seen = HashSet::new();

    for board in snapshot.boards {
        if !seen.insert(board.id) {
            return Err(SnapshotError::DuplicateBoard(board.id));
        }
        info!(
            "Board {}: {}x{}, {} events",
            board.id,
            board.width,
            board.height,
            board.events.len()
        );
        store.insert_board(
            board.id,
            BoardConfig::new(board.width, board.height),
            board.events,
        )?;
        store.set_cooldown(board.id, Duration::from_secs(board.cooldown_secs))?;
    }

    Ok(store)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::store::BoardStore;
    use pixelboard_common::colors;

    #[test]
    fn test_snapshot_from_reader() {
        let json = r#"{
            "boards": [
                { "id": 1, "width": 10, "height": 8, "events": [
                    { "sequence": 3, "author": 7, "x": 1, "y": 1, "color": 255 },
                    { "sequence": 1, "author": 8, "x": 0, "y": 0, "color": 16711680 }
                ] },
                { "id": -42, "width": -1, "height": 5 }
            ]
        }"#;
        let store = from_reader(json.as_bytes()).unwrap();

        assert_eq!(store.board_config(1).unwrap(), Some(BoardConfig::new(10, 8)));
        let log = store.draw_log(1).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0], DrawEvent::new(1, 8, 0, 0, colors::RED));
        assert_eq!(log[1], DrawEvent::new(3, 7, 1, 1, colors::BLUE));

        assert_eq!(store.board_config(-42).unwrap(), Some(BoardConfig::new(-1, 5)));
        assert!(store.draw_log(-42).unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_empty_document() {
        let store = from_reader("{}".as_bytes()).unwrap();
        assert_eq!(store.board_config(0).unwrap(), None);
    }

    #[test]
    fn test_snapshot_rejects_duplicates() {
        let json = r#"{ "boards": [
            { "id": 5, "width": 1, "height": 1 },
            { "id": 5, "width": 2, "height": 2 }
        ] }"#;
        assert!(matches!(
            from_reader(json.as_bytes()),
            Err(SnapshotError::DuplicateBoard(5))
        ));
    }

    #[test]
    fn test_snapshot_rejects_bad_sequences() {
        let json = r#"{ "boards": [ { "id": 1, "width": 2, "height": 2, "events": [
            { "sequence": 18446744073709551615, "author": 7, "x": 0, "y": 0, "color": 0 }
        ] } ] }"#;
        assert!(matches!(
            from_reader(json.as_bytes()),
            Err(SnapshotError::Store(StoreError::SequenceExhausted(1)))
        ));

        let json = r#"{ "boards": [ { "id": 2, "width": 2, "height": 2, "events": [
            { "sequence": 4, "author": 7, "x": 0, "y": 0, "color": 0 },
            { "sequence": 4, "author": 8, "x": 1, "y": 1, "color": 0 }
        ] } ] }"#;
        assert!(matches!(
            from_reader(json.as_bytes()),
            Err(SnapshotError::Store(StoreError::DuplicateSequence {
                board: 2,
                sequence: 4
            }))
        ));
    }

    #[test]
    fn test_snapshot_cooldown() {
        let json = r#"{ "boards": [ { "id": 1, "width": 4, "height": 4, "cooldown_secs": 30 } ] }"#;
        let store = from_reader(json.as_bytes()).unwrap();
        store.place_pixel(1, 7, 0, 0, colors::RED).unwrap();
        assert!(matches!(
            store.place_pixel(1, 7, 1, 1, colors::RED),
            Err(StoreError::Cooldown { retry_after_secs: 30, .. })
        ));
    }

    #[test]
    fn test_snapshot_rejects_malformed_json() {
        assert!(matches!(
            from_reader("{ \"boards\": [ { \"id\": ".as_bytes()),
            Err(SnapshotError::Json(_))
        ));
    }

    #[test]
    fn test_snapshot_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "boards": [ {{ "id": 9, "width": 3, "height": 3 }} ] }}"#
        )
        .unwrap();
        let store = load(file.path()).unwrap();
        assert_eq!(store.board_config(9).unwrap(), Some(BoardConfig::new(3, 3)));

        let missing = file.path().with_extension("missing");
        assert!(matches!(load(&missing), Err(SnapshotError::Io(_))));
    }
}
