use crate::config::*;
use crate::geometry::*;
use crate::world::*;

/// A cell next to an opponent base that we could sit on to intercept ships coming home.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockadeCell {
    pub cell: Position,
    pub base: Position,
    pub owner: PlayerId,
    pub side: Direction,
    pub score: f64,
}

/// Scores every side of every opponent base. A side is worth the cargo of the base owner's ships approaching
/// from that side, minus a fixed weight per ship of ours already there.
pub struct BlockadeScores {
    pub cells: Vec<BlockadeCell>,
}

/// Signed torus offset from `from` to `to` along one axis, in (-size/2, size/2].
fn signed_delta(from: i32, to: i32, size: i32) -> i32 {
    let delta = (to - from).rem_euclid(size);

    if delta > size / 2 {
        delta - size
    } else {
        delta
    }
}

/// Weight of a ship displaced by (dx, dy) from a base for the base side facing `side`: full when the ship lies
/// in that side's quadrant, reduced when it is on that side but closer to a neighboring axis.
fn side_weight(dx: i32, dy: i32, side: Direction, offaxis_weight: f64) -> f64 {
    let (along, across) = match side {
        Direction::North => (-dy, dx),
        Direction::South => (dy, dx),
        Direction::East => (dx, dy),
        Direction::West => (-dx, dy),
        Direction::Still => return 0.0,
    };

    if along <= 0 {
        0.0
    } else if along >= across.abs() {
        1.0
    } else {
        offaxis_weight
    }
}

#[cfg_attr(feature = "profile", timing_annotate::timing)]
impl BlockadeScores {
    pub fn compute(world: &World, config: &ObjectiveConfig) -> BlockadeScores {
        let torus = world.torus();
        let mut cells = Vec::new();

        for player in world.opponents() {
            for base in player.bases() {
                let nearby: Vec<&Ship> = world
                    .ships()
                    .map(|(_, ship)| ship)
                    .filter(|ship| ship.position != base && torus.distance(ship.position, base) <= config.blockade_range)
                    .collect();

                for side in Direction::CARDINALS {
                    let cell = torus.offset(base, side);

                    if world.map.cell(cell).structure.is_some() {
                        continue;
                    }

                    let score = nearby
                        .iter()
                        .map(|ship| {
                            let dx = signed_delta(base.x, ship.position.x, torus.width);
                            let dy = signed_delta(base.y, ship.position.y, torus.height);
                            let weight = side_weight(dx, dy, side, config.blockade_offaxis_weight);

                            let value = if ship.owner == player.id {
                                ship.cargo as f64
                            } else if ship.owner == world.my_id {
                                -config.blockade_ally_weight
                            } else {
                                0.0
                            };

                            weight * value
                        })
                        .sum();

                    cells.push(BlockadeCell {
                        cell,
                        base,
                        owner: player.id,
                        side,
                        score,
                    });
                }
            }
        }

        BlockadeScores { cells }
    }

    /// Lowers a claimed cell so later claimants in the same pass spread over other sides.
    pub fn claim(&mut self, cell: Position, decrement: f64) {
        for candidate in self.cells.iter_mut().filter(|candidate| candidate.cell == cell) {
            candidate.score -= decrement;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::*;

    fn score(scores: &BlockadeScores, cell: Position) -> Option<f64> {
        scores.cells.iter().find(|candidate| candidate.cell == cell).map(|candidate| candidate.score)
    }

    #[test]
    fn side_weights_follow_quadrants() {
        assert_eq!(side_weight(0, -3, Direction::North, 0.5), 1.0);
        assert_eq!(side_weight(2, -1, Direction::North, 0.5), 0.5);
        assert_eq!(side_weight(0, 3, Direction::North, 0.5), 0.0);
        assert_eq!(side_weight(3, 1, Direction::East, 0.5), 1.0);
    }

    #[test]
    fn signed_delta_wraps() {
        assert_eq!(signed_delta(1, 15, 16), -2);
        assert_eq!(signed_delta(15, 1, 16), 2);
        assert_eq!(signed_delta(4, 4, 16), 0);
    }

    #[test]
    fn loaded_enemies_make_their_side_valuable() {
        let world = WorldBuilder::new(32, 32)
            .ship(1, 5, Position::new(24, 20), 900)
            .ship(0, 1, Position::new(27, 24), 0)
            .build();
        let config = ObjectiveConfig::default();
        let mut scores = BlockadeScores::compute(&world, &config);
        let enemy_yard = world.players[1].shipyard;
        let north = world.torus().offset(enemy_yard, Direction::North);
        let east = world.torus().offset(enemy_yard, Direction::East);

        assert_eq!(enemy_yard, Position::new(24, 24));
        assert_eq!(score(&scores, north), Some(900.0));
        assert_eq!(score(&scores, east), Some(-500.0));

        scores.claim(north, 500.0);

        assert_eq!(score(&scores, north), Some(400.0));
    }
}
