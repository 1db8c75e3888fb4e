use crate::constants::*;
use crate::geometry::*;
use crate::world::*;
use itertools::Itertools;
use std::collections::VecDeque;
use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("engine closed the stream while {0} was expected")]
    UnexpectedEof(&'static str),
    #[error("expected {expected}, found {found:?}")]
    InvalidToken { expected: &'static str, found: String },
    #[error("bad constants line: {0}")]
    Constants(#[from] serde_json::Error),
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything the engine sends before the first turn.
#[derive(Clone, Debug, PartialEq)]
pub struct InitData {
    pub constants: GameConstants,
    pub my_id: PlayerId,
    pub shipyards: Vec<(PlayerId, Position)>,
    pub width: i32,
    pub height: i32,
    /// Row-major halite per cell.
    pub halite: Vec<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShipFrame {
    pub id: ShipId,
    pub position: Position,
    pub cargo: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DropoffFrame {
    pub id: u32,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerFrame {
    pub id: PlayerId,
    pub halite: u32,
    pub ships: Vec<ShipFrame>,
    pub dropoffs: Vec<DropoffFrame>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CellUpdate {
    pub position: Position,
    pub halite: u32,
}

/// One turn's world snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub turn: u32,
    pub players: Vec<PlayerFrame>,
    pub updates: Vec<CellUpdate>,
}

pub struct EngineReader<R> {
    reader: R,
    tokens: VecDeque<String>,
}

impl<R: BufRead> EngineReader<R> {
    pub fn new(reader: R) -> EngineReader<R> {
        EngineReader {
            reader,
            tokens: VecDeque::new(),
        }
    }

    fn fill(&mut self) -> Result<bool, ProtocolError> {
        while self.tokens.is_empty() {
            let mut line = String::new();

            if self.reader.read_line(&mut line)? == 0 {
                return Ok(false);
            }

            self.tokens.extend(line.split_whitespace().map(str::to_owned));
        }

        Ok(true)
    }

    fn next<T: FromStr>(&mut self, expected: &'static str) -> Result<T, ProtocolError> {
        if !self.fill()? {
            return Err(ProtocolError::UnexpectedEof(expected));
        }

        let token = self.tokens.pop_front().unwrap_or_default();

        token.parse().map_err(|_| ProtocolError::InvalidToken { expected, found: token })
    }

    fn next_position(&mut self) -> Result<Position, ProtocolError> {
        let x = self.next("x coordinate")?;
        let y = self.next("y coordinate")?;

        Ok(Position::new(x, y))
    }

    /// The constants line is JSON and is consumed as a whole line.
    fn next_line(&mut self, expected: &'static str) -> Result<String, ProtocolError> {
        if !self.tokens.is_empty() {
            return Ok(self.tokens.drain(..).join(" "));
        }

        let mut line = String::new();

        if self.reader.read_line(&mut line)? == 0 {
            return Err(ProtocolError::UnexpectedEof(expected));
        }

        Ok(line)
    }

    pub fn read_init(&mut self) -> Result<InitData, ProtocolError> {
        let constants = GameConstants::from_json(self.next_line("constants")?.trim())?;
        let player_count: usize = self.next("player count")?;
        let my_id: PlayerId = self.next("player id")?;

        let shipyards = (0..player_count)
            .map(|_| {
                let id = self.next("player id")?;
                let shipyard = self.next_position()?;

                Ok((id, shipyard))
            })
            .collect::<Result<Vec<_>, ProtocolError>>()?;

        if !shipyards.iter().any(|(id, _)| *id == my_id) {
            return Err(ProtocolError::InvalidToken {
                expected: "a shipyard line for our player id",
                found: my_id.to_string(),
            });
        }

        let width: i32 = self.next("map width")?;
        let height: i32 = self.next("map height")?;

        if width <= 0 || height <= 0 {
            return Err(ProtocolError::InvalidToken {
                expected: "positive map dimensions",
                found: format!("{} {}", width, height),
            });
        }

        let halite = (0..width * height)
            .map(|_| self.next("cell halite"))
            .collect::<Result<Vec<u32>, ProtocolError>>()?;

        Ok(InitData {
            constants,
            my_id,
            shipyards,
            width,
            height,
            halite,
        })
    }

    /// Reads the next turn. A stream that ends cleanly before a turn starts yields `None`.
    pub fn read_frame(&mut self, player_count: usize) -> Result<Option<Frame>, ProtocolError> {
        if !self.fill()? {
            return Ok(None);
        }

        let turn = self.next("turn number")?;
        let mut players = Vec::with_capacity(player_count);

        for _ in 0..player_count {
            let id = self.next("player id")?;
            let ship_count: usize = self.next("ship count")?;
            let dropoff_count: usize = self.next("dropoff count")?;
            let halite = self.next("player halite")?;

            let ships = (0..ship_count)
                .map(|_| {
                    let id = ShipId(self.next("ship id")?);
                    let position = self.next_position()?;
                    let cargo = self.next("ship halite")?;

                    Ok(ShipFrame { id, position, cargo })
                })
                .collect::<Result<Vec<_>, ProtocolError>>()?;

            let dropoffs = (0..dropoff_count)
                .map(|_| {
                    let id = self.next("dropoff id")?;
                    let position = self.next_position()?;

                    Ok(DropoffFrame { id, position })
                })
                .collect::<Result<Vec<_>, ProtocolError>>()?;

            players.push(PlayerFrame {
                id,
                halite,
                ships,
                dropoffs,
            });
        }

        let update_count: usize = self.next("update count")?;
        let updates = (0..update_count)
            .map(|_| {
                let position = self.next_position()?;
                let halite = self.next("cell halite")?;

                Ok(CellUpdate { position, halite })
            })
            .collect::<Result<Vec<_>, ProtocolError>>()?;

        Ok(Some(Frame { turn, players, updates }))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Move(ShipId, Direction),
    Construct(ShipId),
    Spawn,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Move(id, direction) => write!(f, "m {} {}", id, direction.as_char()),
            Command::Construct(id) => write!(f, "c {}", id),
            Command::Spawn => write!(f, "g"),
        }
    }
}

pub fn write_commands<W: Write>(writer: &mut W, commands: &[Command]) -> std::io::Result<()> {
    writeln!(writer, "{}", commands.iter().join(" "))?;
    writer.flush()
}

pub fn write_name<W: Write>(writer: &mut W, name: &str) -> std::io::Result<()> {
    writeln!(writer, "{}", name)?;
    writer.flush()
}
