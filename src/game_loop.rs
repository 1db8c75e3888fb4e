use crate::config::*;
use crate::context::*;
use crate::error::*;
use crate::movement::*;
use crate::objectives::*;
use crate::protocol::*;
use crate::scoring::*;
use crate::spawnsystem::*;
use crate::world::*;
use log::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::io::{BufRead, Write};
use std::time::Instant;

/// Everything that survives from one turn to the next.
pub struct Bot {
    world: World,
    config: StrategyConfig,
    objectives: ObjectiveManager,
    rng: SmallRng,
}

impl Bot {
    /// `seed` overrides the game seed for tie breaking.
    pub fn new(init: InitData, config: StrategyConfig, seed: Option<u64>) -> Bot {
        let world = World::from_init(init);
        let seed = seed.unwrap_or(world.constants.game_seed);

        info!(
            "Player {} of {} on {}x{}, seed {}",
            world.my_id,
            world.player_count(),
            world.torus().width,
            world.torus().height,
            seed
        );

        Bot {
            world,
            config,
            objectives: ObjectiveManager::new(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Runs one turn: snapshot, scoring, objectives, moves, collision repair, commands.
    pub fn tick(&mut self, frame: Frame) -> Result<Vec<Command>, BotError> {
        let Bot {
            world,
            config,
            objectives,
            rng,
        } = self;

        {
            let _guard = timing::start_guard("apply_frame");

            world.apply_frame(frame);
        }

        let mut grids = {
            let _guard = timing::start_guard("scoring");

            TurnGrids::compute(world, config)
        };

        let ctx = TurnContext::for_world(world, config, rng);

        let mut plan = {
            let _guard = timing::start_guard("objectives");

            objectives.assign(world, &mut grids, &ctx)?
        };

        let proposals = {
            let _guard = timing::start_guard("movement");

            let TurnGrids {
                safety,
                threats,
                inspiration,
                ..
            } = &mut grids;

            let evaluator = MoveEvaluator::new(world, threats, inspiration, &plan.treasury, config);
            let mut proposals = evaluator.plan(safety, ctx.rng);

            CollisionResolver::new(&evaluator, &config.movement).resolve(&mut proposals, safety)?;

            proposals
        };

        let mut commands = emit_commands(world, &proposals, &mut plan.treasury, &config.objectives);

        if should_spawn(world, &proposals, &mut plan.treasury, &ctx) {
            commands.push(Command::Spawn);
        }

        Ok(commands)
    }

    /// Plays turns until the engine closes its end of the pipe.
    pub fn play<R: BufRead, W: Write>(&mut self, reader: &mut EngineReader<R>, writer: &mut W) -> Result<(), BotError> {
        let player_count = self.world.player_count();

        while let Some(frame) = reader.read_frame(player_count)? {
            let turn = frame.turn;
            let started = Instant::now();

            #[cfg(feature = "profile")]
            {
                let origin = Instant::now();

                timing::start_trace(Box::new(move || origin.elapsed().as_micros() as u64));
            }

            let commands = self.tick(frame)?;

            write_commands(writer, &commands)?;

            #[cfg(feature = "profile")]
            let trace = timing::stop_trace();

            let elapsed = started.elapsed().as_millis() as u64;

            if elapsed >= self.config.long_turn_warn_ms {
                warn!("Long turn {}: {} ms", turn, elapsed);

                #[cfg(feature = "profile")]
                {
                    if let Some(trace_output) = trace.and_then(|trace| serde_json::to_string(&trace).ok()) {
                        info!("{}", trace_output);
                    }
                }
            } else {
                debug!("Turn {} took {} ms, {} commands", turn, elapsed, commands.len());
            }
        }

        info!("Engine closed the game after turn {}", self.world.turn);

        Ok(())
    }
}

/// Reads the game header, answers with our name and plays the whole game.
pub fn run<R: BufRead, W: Write>(reader: R, mut writer: W, config: StrategyConfig, seed: Option<u64>, name: &str) -> Result<(), BotError> {
    let mut reader = EngineReader::new(reader);
    let init = reader.read_init()?;
    let mut bot = Bot::new(init, config, seed);

    write_name(&mut writer, name)?;

    bot.play(&mut reader, &mut writer)
}
