//! Wire encoding of [`RemoteGameRecord`].
//!
//! The store is schemaless, so decoding never fails: anything malformed is
//! replaced with a safe default and reported in [`DecodedRecord::defects`].
//!
//! ```text
//! {
//!   "board":       [[["A","-","B"], ...], ...],   // 3x3x3, "-" for empty
//!   "activeMark":  "A" | "B",
//!   "playerAName": "...",
//!   "playerBName": "...",
//!   "peerJoined":  bool,
//!   "outcome":     null | "DRAW" | {"winnerName": "...", "line": [[l,r,c] x3]},
//!   "lastMove":    null | [l,r,c]
//! }
//! ```

use super::record::{RecordOutcome, RemoteGameRecord};
use cube_tictactoe::{Board, CELL_COUNT, Cell, Coord, Mark, WinLine};
use serde_json::{Map, Value, json};
use tracing::{instrument, warn};

/// Placeholder for an empty cell. Never encode empties as `null`: the store
/// drops nulls from arrays.
pub const EMPTY_TOKEN: &str = "-";

/// Wire value of a drawn outcome.
pub const DRAW_TOKEN: &str = "DRAW";

static NULL: Value = Value::Null;

/// A decoded record and the fields that had to be defaulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord {
    /// Best-effort record.
    pub record: RemoteGameRecord,
    /// Paths of fields that were malformed and replaced by defaults.
    pub defects: Vec<String>,
}

impl DecodedRecord {
    /// Returns true if nothing had to be defaulted.
    pub fn is_clean(&self) -> bool {
        self.defects.is_empty()
    }
}

/// Encodes a record for publishing.
#[instrument(skip(record))]
pub fn encode(record: &RemoteGameRecord) -> Value {
    json!({
        "board": encode_board(&record.board),
        "activeMark": record.active_mark.token(),
        "playerAName": record.player_a_name,
        "playerBName": record.player_b_name,
        "peerJoined": record.peer_joined,
        "outcome": encode_outcome(record.outcome.as_ref()),
        "lastMove": record.last_move.map(Coord::to_array),
    })
}

/// Encodes a board as nested `[layer][row][col]` arrays of tokens.
pub fn encode_board(board: &Board) -> Value {
    let layers: Vec<Value> = (0..3u8)
        .map(|layer| {
            let rows: Vec<Value> = (0..3u8)
                .map(|row| {
                    let cells: Vec<Value> = (0..3u8)
                        .filter_map(|col| Coord::new(layer, row, col))
                        .map(|coord| match board.get(coord) {
                            Cell::Empty => Value::from(EMPTY_TOKEN),
                            Cell::Occupied(mark) => Value::from(mark.token()),
                        })
                        .collect();
                    Value::Array(cells)
                })
                .collect();
            Value::Array(rows)
        })
        .collect();
    Value::Array(layers)
}

fn encode_outcome(outcome: Option<&RecordOutcome>) -> Value {
    match outcome {
        None => Value::Null,
        Some(RecordOutcome::Draw) => Value::from(DRAW_TOKEN),
        Some(RecordOutcome::Win { winner_name, line }) => json!({
            "winnerName": winner_name,
            "line": line.to_arrays(),
        }),
    }
}

/// Decodes a snapshot, defaulting anything malformed.
#[instrument(skip(value))]
pub fn decode(value: &Value) -> DecodedRecord {
    let mut defects = Vec::new();
    if !value.is_object() {
        defects.push("record".to_string());
    }
    let board = decode_board(field(value, "board"), &mut defects);

    let active_mark = match field(value, "activeMark").as_str().and_then(Mark::from_token) {
        Some(mark) => mark,
        None => {
            defects.push("activeMark".to_string());
            Mark::A
        }
    };

    let player_a_name = decode_name(field(value, "playerAName"), "playerAName", &mut defects);
    let player_b_name = decode_name(field(value, "playerBName"), "playerBName", &mut defects);

    let peer_joined = match field(value, "peerJoined") {
        Value::Bool(joined) => *joined,
        Value::Null => false,
        _ => {
            defects.push("peerJoined".to_string());
            false
        }
    };

    let outcome = decode_outcome(field(value, "outcome"), &mut defects);

    let last_move = match field(value, "lastMove") {
        Value::Null => None,
        other => {
            let coord = decode_coord(other);
            if coord.is_none() {
                defects.push("lastMove".to_string());
            }
            coord
        }
    };

    if !defects.is_empty() {
        warn!(?defects, "Defaulted malformed fields in remote snapshot");
    }

    DecodedRecord {
        record: RemoteGameRecord {
            board,
            active_mark,
            player_a_name,
            player_b_name,
            peer_joined,
            outcome,
            last_move,
        },
        defects,
    }
}

fn field<'a>(record: &'a Value, key: &str) -> &'a Value {
    record.get(key).unwrap_or(&NULL)
}

/// Decodes a board. Layers or rows that are not exactly three entries long
/// come back empty; unknown cell values come back empty.
pub fn decode_board(value: &Value, defects: &mut Vec<String>) -> Board {
    let mut cells = [Cell::Empty; CELL_COUNT];

    let layers: [&Value; 3] = match value {
        Value::Array(items) => {
            if items.len() != 3 {
                defects.push("board".to_string());
            }
            [0, 1, 2].map(|i| items.get(i).unwrap_or(&NULL))
        }
        Value::Object(map) => sparse(map).unwrap_or_else(|| {
            defects.push("board".to_string());
            [&NULL; 3]
        }),
        _ => {
            defects.push("board".to_string());
            return Board::new();
        }
    };

    for (l, layer) in layers.into_iter().enumerate() {
        let Some(rows) = triple(layer) else {
            defects.push(format!("board[{l}]"));
            continue;
        };
        for (r, row) in rows.into_iter().enumerate() {
            let Some(row_cells) = triple(row) else {
                defects.push(format!("board[{l}][{r}]"));
                continue;
            };
            for (c, cell) in row_cells.into_iter().enumerate() {
                cells[l * 9 + r * 3 + c] = match cell {
                    Value::Null => Cell::Empty,
                    Value::String(token) if token == EMPTY_TOKEN => Cell::Empty,
                    other => match other.as_str().and_then(Mark::from_token) {
                        Some(mark) => Cell::Occupied(mark),
                        None => {
                            defects.push(format!("board[{l}][{r}][{c}]"));
                            Cell::Empty
                        }
                    },
                };
            }
        }
    }

    Board::from_cells(cells)
}

fn decode_name(value: &Value, key: &str, defects: &mut Vec<String>) -> String {
    match value {
        Value::String(name) => name.clone(),
        Value::Null => String::new(),
        _ => {
            defects.push(key.to_string());
            String::new()
        }
    }
}

fn decode_outcome(value: &Value, defects: &mut Vec<String>) -> Option<RecordOutcome> {
    match value {
        Value::Null => None,
        Value::String(token) if token == DRAW_TOKEN => Some(RecordOutcome::Draw),
        Value::Object(map) => {
            let winner_name = map.get("winnerName").and_then(Value::as_str);
            let line = map.get("line").and_then(decode_line);
            match (winner_name, line) {
                (Some(name), Some(line)) => Some(RecordOutcome::Win {
                    winner_name: name.to_string(),
                    line,
                }),
                _ => {
                    defects.push("outcome".to_string());
                    None
                }
            }
        }
        _ => {
            defects.push("outcome".to_string());
            None
        }
    }
}

fn decode_line(value: &Value) -> Option<WinLine> {
    let [a, b, c] = triple(value)?;
    WinLine::new([decode_coord(a)?, decode_coord(b)?, decode_coord(c)?])
}

fn decode_coord(value: &Value) -> Option<Coord> {
    let parts = triple(value)?;
    let mut out = [0u8; 3];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = u8::try_from(part.as_u64()?).ok()?;
    }
    Coord::try_from(out).ok()
}

/// Exactly three entries, as an array or as an index-keyed object.
fn triple(value: &Value) -> Option<[&Value; 3]> {
    match value {
        Value::Array(items) if items.len() == 3 => Some([&items[0], &items[1], &items[2]]),
        Value::Object(map) => sparse(map),
        _ => None,
    }
}

/// Arrays with holes come back from the store as objects keyed "0".."2".
fn sparse(map: &Map<String, Value>) -> Option<[&Value; 3]> {
    let keys_ok = !map.is_empty() && map.keys().all(|k| matches!(k.as_str(), "0" | "1" | "2"));
    keys_ok.then(|| ["0", "1", "2"].map(|k| map.get(k).unwrap_or(&NULL)))
}
