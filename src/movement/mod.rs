pub mod evaluator;
pub mod resolver;

pub use self::evaluator::*;
pub use self::resolver::*;

use crate::config::*;
use crate::economy::*;
use crate::geometry::*;
use crate::objectives::*;
use crate::protocol::*;
use crate::world::*;
use log::*;
use shrinkwraprs::*;
use std::collections::BTreeMap;

/// Next-turn destination of each of our ships. Keyed by arena index so iteration order is stable.
#[derive(Shrinkwrap, Clone, Debug, Default, PartialEq, Eq)]
#[shrinkwrap(mutable)]
pub struct Proposals(pub BTreeMap<ShipKey, Position>);

impl Proposals {
    pub fn new() -> Proposals {
        Proposals::default()
    }

    /// Ships heading for each destination, destinations in position order.
    pub fn arrivals(&self) -> BTreeMap<Position, Vec<ShipKey>> {
        let mut arrivals: BTreeMap<Position, Vec<ShipKey>> = BTreeMap::new();

        for (key, destination) in self.iter() {
            arrivals.entry(*destination).or_default().push(*key);
        }

        arrivals
    }

    pub fn is_destination(&self, pos: Position) -> bool {
        self.values().any(|destination| *destination == pos)
    }
}

/// Turns final proposals into engine commands. A dropoff builder that stays where it can build converts instead
/// of moving, paying from the treasury.
pub fn emit_commands(world: &World, proposals: &Proposals, treasury: &mut Treasury, config: &ObjectiveConfig) -> Vec<Command> {
    let torus = world.torus();
    let mut commands = Vec::with_capacity(proposals.len());

    for (key, destination) in proposals.iter() {
        let ship = world.ship(*key);

        if *destination == ship.position && can_construct(world, *key, treasury, config) {
            let cost = world
                .constants
                .dropoff_cost
                .saturating_sub(ship.cargo + world.map.halite(ship.position));

            info!("Ship {} converts to a dropoff at {} for {}", ship.id, ship.position, cost);

            treasury.spend_reserved(cost);
            commands.push(Command::Construct(ship.id));

            continue;
        }

        let direction = torus.direction_to(ship.position, *destination).unwrap_or(Direction::Still);

        commands.push(Command::Move(ship.id, direction));
    }

    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::*;
    use crate::testkit::*;

    #[test]
    fn builder_in_range_constructs() {
        let mut world = WorldBuilder::new(32, 32)
            .ship(0, 1, Position::new(20, 8), 1000)
            .ship(0, 2, Position::new(12, 12), 0)
            .build();
        let keys = world.my_ships();

        world.ship_mut(keys[0]).objective = Some(Objective::BuildDropoff { site: Position::new(20, 9) });

        let mut proposals = Proposals::new();
        proposals.insert(keys[0], Position::new(20, 8));
        proposals.insert(keys[1], Position::new(12, 11));

        let mut treasury = Treasury::new(3500);
        treasury.reserve(3000);

        let commands = emit_commands(&world, &proposals, &mut treasury, &ObjectiveConfig::default());

        assert_eq!(commands, vec![Command::Construct(ShipId(1)), Command::Move(ShipId(2), Direction::North)]);
        assert_eq!(treasury.halite, 500);
        assert_eq!(treasury.reserved, 0);
    }
}
