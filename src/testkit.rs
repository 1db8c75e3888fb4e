//! Builders for assembling small worlds in unit and integration tests.

use crate::constants::*;
use crate::geometry::*;
use crate::protocol::*;
use crate::world::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Where a player's shipyard goes unless overridden: the four quarter points of the map.
pub fn default_shipyard(player: PlayerId, width: i32, height: i32) -> Position {
    let (qx, qy) = (width / 4, height / 4);

    match player {
        0 => Position::new(qx, qy),
        1 => Position::new(3 * qx, 3 * qy),
        2 => Position::new(3 * qx, qy),
        _ => Position::new(qx, 3 * qy),
    }
}

pub fn seeded_rng() -> SmallRng {
    SmallRng::seed_from_u64(0x1b1e)
}

#[derive(Clone)]
pub struct WorldBuilder {
    width: i32,
    height: i32,
    players: usize,
    my_id: PlayerId,
    turn: u32,
    constants: GameConstants,
    halite: Vec<u32>,
    shipyards: Vec<Position>,
    player_halite: Vec<u32>,
    ships: Vec<(PlayerId, ShipFrame)>,
    dropoffs: Vec<(PlayerId, Position)>,
}

impl WorldBuilder {
    pub fn new(width: i32, height: i32) -> WorldBuilder {
        WorldBuilder {
            width,
            height,
            players: 2,
            my_id: 0,
            turn: 1,
            constants: GameConstants::default(),
            halite: vec![0; (width * height) as usize],
            shipyards: (0..4).map(|player| default_shipyard(player, width, height)).collect(),
            player_halite: vec![0; 4],
            ships: Vec::new(),
            dropoffs: Vec::new(),
        }
    }

    pub fn players(mut self, players: usize) -> WorldBuilder {
        self.players = players.clamp(1, 4);
        self
    }

    pub fn shipyard(mut self, player: PlayerId, pos: Position) -> WorldBuilder {
        self.shipyards[player] = pos;
        self
    }

    fn index(&self, pos: Position) -> usize {
        let pos = Torus::new(self.width, self.height).normalize(pos);

        (pos.y * self.width + pos.x) as usize
    }

    pub fn halite(mut self, pos: Position, amount: u32) -> WorldBuilder {
        let index = self.index(pos);
        self.halite[index] = amount;
        self
    }

    pub fn halite_everywhere(mut self, amount: u32) -> WorldBuilder {
        self.halite.iter_mut().for_each(|cell| *cell = amount);
        self
    }

    pub fn ship(mut self, owner: PlayerId, id: u32, pos: Position, cargo: u32) -> WorldBuilder {
        self.ships.push((
            owner,
            ShipFrame {
                id: ShipId(id),
                position: pos,
                cargo,
            },
        ));
        self
    }

    pub fn dropoff(mut self, owner: PlayerId, pos: Position) -> WorldBuilder {
        self.dropoffs.push((owner, pos));
        self
    }

    pub fn player_halite(mut self, owner: PlayerId, amount: u32) -> WorldBuilder {
        self.player_halite[owner] = amount;
        self
    }

    pub fn turn(mut self, turn: u32) -> WorldBuilder {
        self.turn = turn;
        self
    }

    pub fn max_turns(mut self, max_turns: u32) -> WorldBuilder {
        self.constants.max_turns = max_turns;
        self
    }

    pub fn constants(mut self, constants: GameConstants) -> WorldBuilder {
        self.constants = constants;
        self
    }

    pub fn init_data(&self) -> InitData {
        InitData {
            constants: self.constants.clone(),
            my_id: self.my_id,
            shipyards: (0..self.players).map(|player| (player, self.shipyards[player])).collect(),
            width: self.width,
            height: self.height,
            halite: self.halite.clone(),
        }
    }

    pub fn frame(&self) -> Frame {
        let players = (0..self.players)
            .map(|player| PlayerFrame {
                id: player,
                halite: self.player_halite[player],
                ships: self
                    .ships
                    .iter()
                    .filter(|(owner, _)| *owner == player)
                    .map(|(_, ship)| ship.clone())
                    .collect(),
                dropoffs: self
                    .dropoffs
                    .iter()
                    .enumerate()
                    .filter(|(_, (owner, _))| *owner == player)
                    .map(|(index, (_, position))| DropoffFrame {
                        id: index as u32,
                        position: *position,
                    })
                    .collect(),
            })
            .collect();

        Frame {
            turn: self.turn,
            players,
            updates: Vec::new(),
        }
    }

    pub fn build(self) -> World {
        let mut world = World::from_init(self.init_data());

        world.apply_frame(self.frame());

        world
    }
}
