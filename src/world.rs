use crate::constants::*;
use crate::geometry::*;
use crate::objective::*;
use crate::protocol::*;
use itertools::Itertools;
use log::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub type PlayerId = usize;

/// Engine entity id of a ship. Stable for the life of the ship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShipId(pub u32);

impl fmt::Display for ShipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of a ship in the current turn's arena. Only valid until the next frame is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShipKey(usize);

impl ShipKey {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructureKind {
    Shipyard,
    Dropoff,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    pub owner: PlayerId,
    pub kind: StructureKind,
}

#[derive(Clone, Debug, Default)]
pub struct Cell {
    pub halite: u32,
    pub ship: Option<ShipKey>,
    pub structure: Option<Structure>,
}

pub struct GameMap {
    pub torus: Torus,
    cells: Grid<Cell>,
}

impl GameMap {
    pub fn new(torus: Torus, halite: &[u32]) -> GameMap {
        let mut cells = Grid::new(torus, Cell::default());

        for (cell, amount) in cells.values_mut().zip(halite.iter()) {
            cell.halite = *amount;
        }

        GameMap { torus, cells }
    }

    pub fn cell(&self, pos: Position) -> &Cell {
        &self.cells[pos]
    }

    pub fn cell_mut(&mut self, pos: Position) -> &mut Cell {
        &mut self.cells[pos]
    }

    pub fn halite(&self, pos: Position) -> u32 {
        self.cells[pos].halite
    }

    pub fn cells(&self) -> impl Iterator<Item = (Position, &Cell)> + '_ {
        self.cells.iter()
    }

    pub fn total_halite(&self) -> u64 {
        self.cells.values().map(|cell| cell.halite as u64).sum()
    }

    fn clear_ships(&mut self) {
        self.cells.values_mut().for_each(|cell| cell.ship = None);
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Ship {
    pub id: ShipId,
    pub owner: PlayerId,
    pub position: Position,
    pub cargo: u32,
    pub objective: Option<Objective>,
    /// Has been given a destination this turn.
    pub assigned: bool,
    /// Claimed as a combat target by one of our ships this turn.
    pub targeted: bool,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub shipyard: Position,
    pub halite: u32,
    pub ships: Vec<ShipKey>,
    pub dropoffs: Vec<Position>,
}

impl Player {
    /// Shipyard first, then dropoffs in the order the engine reported them.
    pub fn bases(&self) -> impl Iterator<Item = Position> + '_ {
        std::iter::once(self.shipyard).chain(self.dropoffs.iter().copied())
    }
}

pub struct World {
    pub constants: GameConstants,
    pub my_id: PlayerId,
    pub turn: u32,
    pub map: GameMap,
    pub players: Vec<Player>,
    pub initial_halite: u64,
    ships: Vec<Ship>,
}

#[cfg_attr(feature = "profile", timing_annotate::timing)]
impl World {
    pub fn from_init(init: InitData) -> World {
        let torus = Torus::new(init.width, init.height);
        let mut map = GameMap::new(torus, &init.halite);

        let players = init
            .shipyards
            .iter()
            .sorted_by_key(|(id, _)| *id)
            .map(|(id, shipyard)| {
                map.cell_mut(*shipyard).structure = Some(Structure {
                    owner: *id,
                    kind: StructureKind::Shipyard,
                });

                Player {
                    id: *id,
                    shipyard: *shipyard,
                    halite: 0,
                    ships: Vec::new(),
                    dropoffs: Vec::new(),
                }
            })
            .collect();

        let initial_halite = map.total_halite();

        World {
            constants: init.constants,
            my_id: init.my_id,
            turn: 0,
            map,
            players,
            initial_halite,
            ships: Vec::new(),
        }
    }

    /// Replaces the ship arena with the frame's ship list. Our surviving ships keep the objective they had last
    /// turn, everything else about them is refreshed.
    pub fn apply_frame(&mut self, frame: Frame) {
        let my_id = self.my_id;
        let carried: HashMap<ShipId, Objective> = self
            .ships
            .drain(..)
            .filter(|ship| ship.owner == my_id)
            .filter_map(|ship| ship.objective.map(|objective| (ship.id, objective)))
            .collect();

        self.turn = frame.turn;
        self.map.clear_ships();

        for update in frame.updates {
            self.map.cell_mut(update.position).halite = update.halite;
        }

        for player_frame in frame.players {
            let Some(player) = self.players.iter_mut().find(|player| player.id == player_frame.id) else {
                warn!("Frame references unknown player {}", player_frame.id);
                continue;
            };

            player.halite = player_frame.halite;
            player.ships.clear();
            player.dropoffs.clear();

            for dropoff in player_frame.dropoffs {
                let position = self.map.torus.normalize(dropoff.position);

                self.map.cell_mut(position).structure = Some(Structure {
                    owner: player.id,
                    kind: StructureKind::Dropoff,
                });

                player.dropoffs.push(position);
            }

            for ship_frame in player_frame.ships {
                let key = ShipKey(self.ships.len());
                let position = self.map.torus.normalize(ship_frame.position);
                let objective = if player.id == my_id {
                    carried.get(&ship_frame.id).copied()
                } else {
                    None
                };

                self.ships.push(Ship {
                    id: ship_frame.id,
                    owner: player.id,
                    position,
                    cargo: ship_frame.cargo,
                    objective,
                    assigned: false,
                    targeted: false,
                });

                self.map.cell_mut(position).ship = Some(key);
                player.ships.push(key);
            }
        }
    }

    pub fn torus(&self) -> Torus {
        self.map.torus
    }

    pub fn ship(&self, key: ShipKey) -> &Ship {
        &self.ships[key.0]
    }

    pub fn ship_mut(&mut self, key: ShipKey) -> &mut Ship {
        &mut self.ships[key.0]
    }

    pub fn ships(&self) -> impl Iterator<Item = (ShipKey, &Ship)> + '_ {
        self.ships.iter().enumerate().map(|(index, ship)| (ShipKey(index), ship))
    }

    pub fn ship_at(&self, pos: Position) -> Option<ShipKey> {
        self.map.cell(pos).ship
    }

    pub fn find_ship(&self, id: ShipId) -> Option<ShipKey> {
        self.ships().find(|(_, ship)| ship.id == id).map(|(key, _)| key)
    }

    pub fn me(&self) -> &Player {
        &self.players[self.my_index()]
    }

    fn my_index(&self) -> usize {
        self.players.iter().position(|player| player.id == self.my_id).unwrap_or(0)
    }

    pub fn my_ships(&self) -> Vec<ShipKey> {
        self.me().ships.clone()
    }

    pub fn enemy_ships(&self) -> impl Iterator<Item = (ShipKey, &Ship)> + '_ {
        self.ships().filter(move |(_, ship)| ship.owner != self.my_id)
    }

    pub fn opponents(&self) -> impl Iterator<Item = &Player> + '_ {
        self.players.iter().filter(move |player| player.id != self.my_id)
    }

    pub fn my_bases(&self) -> Vec<Position> {
        self.me().bases().collect()
    }

    pub fn is_my_base(&self, pos: Position) -> bool {
        matches!(self.map.cell(pos).structure, Some(structure) if structure.owner == self.my_id)
    }

    pub fn is_enemy_base(&self, pos: Position) -> bool {
        matches!(self.map.cell(pos).structure, Some(structure) if structure.owner != self.my_id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn turns_remaining(&self) -> u32 {
        self.constants.max_turns.saturating_sub(self.turn)
    }

    pub fn is_mine(&self, key: ShipKey) -> bool {
        self.ship(key).owner == self.my_id
    }
}
