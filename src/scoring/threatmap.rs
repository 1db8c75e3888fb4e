use crate::config::*;
use crate::geometry::*;
use crate::world::*;

/// Number of enemy ships within inspiration range of each cell.
pub struct InspirationGrid {
    counts: Grid<u8>,
}

impl InspirationGrid {
    pub fn compute(world: &World) -> InspirationGrid {
        let torus = world.torus();
        let mut counts = Grid::new(torus, 0u8);

        for (_, ship) in world.enemy_ships() {
            for cell in torus.within_radius(ship.position, world.constants.inspiration_radius) {
                counts[cell] = counts[cell].saturating_add(1);
            }
        }

        InspirationGrid { counts }
    }

    pub fn count(&self, pos: Position) -> u32 {
        self.counts[pos] as u32
    }

    pub fn is_inspired(&self, pos: Position, ship_count: usize) -> bool {
        self.count(pos) as usize >= ship_count
    }

    /// Progress toward inspiration at `pos`, from 0 (no enemies near) to 1 (inspired).
    pub fn fraction(&self, pos: Position, ship_count: usize) -> f64 {
        if ship_count == 0 {
            return 1.0;
        }

        (self.count(pos) as f64 / ship_count as f64).min(1.0)
    }
}

/// Enemy cargo value around each cell, per opposing player.
pub struct PlayerThreat {
    pub player: PlayerId,
    pub cargo: Grid<f64>,
}

/// Combat intelligence for one turn: decayed enemy cargo per opponent, and ship presence counts for both sides.
pub struct ThreatMap {
    pub players: Vec<PlayerThreat>,
    enemy_presence: Grid<u16>,
    ally_presence: Grid<u16>,
}

#[cfg_attr(feature = "profile", timing_annotate::timing)]
impl ThreatMap {
    pub fn compute(world: &World, config: &ScoringConfig) -> ThreatMap {
        let torus = world.torus();

        let players = world
            .opponents()
            .map(|player| {
                let mut cargo = Grid::new(torus, 0.0);

                for key in player.ships.iter() {
                    let ship = world.ship(*key);

                    for cell in torus.within_radius(ship.position, config.threat_radius) {
                        let distance = torus.distance(ship.position, cell);

                        cargo[cell] += ship.cargo as f64 * config.threat_decay.powi(distance);
                    }
                }

                PlayerThreat { player: player.id, cargo }
            })
            .collect();

        let mut enemy_presence = Grid::new(torus, 0u16);
        let mut ally_presence = Grid::new(torus, 0u16);

        for (_, ship) in world.ships() {
            let presence = if ship.owner == world.my_id {
                &mut ally_presence
            } else {
                &mut enemy_presence
            };

            for cell in torus.within_radius(ship.position, config.presence_radius) {
                presence[cell] = presence[cell].saturating_add(1);
            }
        }

        ThreatMap {
            players,
            enemy_presence,
            ally_presence,
        }
    }

    pub fn enemy_presence(&self, pos: Position) -> u32 {
        self.enemy_presence[pos] as u32
    }

    pub fn ally_presence(&self, pos: Position) -> u32 {
        self.ally_presence[pos] as u32
    }

    /// Enemy ships near `pos` beyond the allies there.
    pub fn contest(&self, pos: Position) -> u32 {
        self.enemy_presence(pos).saturating_sub(self.ally_presence(pos))
    }

    pub fn threat(&self, player: PlayerId, pos: Position) -> f64 {
        self.players
            .iter()
            .find(|threat| threat.player == player)
            .map(|threat| threat.cargo[pos])
            .unwrap_or(0.0)
    }

    /// Chance that our side picks up the wreck of a fight at `pos`, from local presence. `exclude_ally` removes
    /// the attacker itself from the count.
    pub fn recovery_probability(&self, pos: Position, exclude_ally: bool) -> f64 {
        let allies = self.ally_presence(pos).saturating_sub(exclude_ally as u32) as f64;
        let enemies = self.enemy_presence(pos).saturating_sub(1) as f64;

        if allies + enemies <= 0.0 {
            0.0
        } else {
            allies / (allies + enemies)
        }
    }
}
