use crate::context::*;
use crate::economy::*;
use crate::movement::*;
use crate::world::*;
use log::*;

const SHIP_CAP_WIDTHS: [i32; 5] = [32, 40, 48, 56, 64];

/// Fleet size past which new ships stop paying for themselves. Smaller maps and more players both shrink it.
pub fn max_ships(width: i32, players: usize) -> usize {
    let nearest_width = SHIP_CAP_WIDTHS
        .iter()
        .copied()
        .min_by_key(|table_width| (table_width - width).abs())
        .unwrap_or(32);

    match nearest_width {
        32 => 24,
        40 => 28usize.saturating_sub(players),
        48 => 32usize.saturating_sub(players),
        56 => 36usize.saturating_sub(players),
        _ => 40usize.saturating_sub(players),
    }
}

/// Whether the shipyard builds a ship this turn. The cost comes out of the treasury when it does.
pub fn should_spawn(world: &World, proposals: &Proposals, treasury: &mut Treasury, ctx: &TurnContext) -> bool {
    let me = world.me();
    let cap = max_ships(world.torus().width, world.player_count());

    if ctx.turn_fraction_remaining() <= ctx.config.spawn.min_turn_fraction {
        return false;
    }

    if me.ships.len() >= cap {
        return false;
    }

    if proposals.is_destination(me.shipyard) {
        debug!("Shipyard {} is taken next turn, not spawning", me.shipyard);

        return false;
    }

    if !treasury.spend(ctx.constants.ship_cost) {
        return false;
    }

    debug!("Spawning ship {} of {} ({} halite left)", me.ships.len() + 1, cap, treasury.available());

    true
}
