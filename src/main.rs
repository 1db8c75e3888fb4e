use clap::Parser;
use halite_ibex::config::*;
use halite_ibex::error::*;
use halite_ibex::game_loop::*;
use halite_ibex::logging;
use halite_ibex::panic;
use halite_ibex::protocol::*;
use log::*;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(version, about = "Halite III fleet bot speaking the engine protocol on stdin/stdout")]
struct Args {
    /// JSON file overriding strategy tuning.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for tie breaking. Defaults to the game seed.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value = "ibex")]
    name: String,

    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

fn play(args: Args) -> Result<(), BotError> {
    let config = StrategyConfig::load(args.config.as_deref())?;

    let stdin = io::stdin();
    let mut reader = EngineReader::new(stdin.lock());
    let init = reader.read_init()?;

    if let Err(error) = logging::setup_logging(args.log_level, init.my_id) {
        eprintln!("Logging disabled: {}", error);
    }

    let mut bot = Bot::new(init, config, args.seed);

    let stdout = io::stdout();
    let mut writer = stdout.lock();

    write_name(&mut writer, &args.name)?;

    bot.play(&mut reader, &mut writer)
}

fn main() -> ExitCode {
    panic::setup_panic_hook();

    match play(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if error.is_fatal() {
                error!("Invariant violated, aborting without sending commands: {}", error);
            } else {
                error!("Game ended with error: {}", error);
            }

            eprintln!("{}", error);

            ExitCode::FAILURE
        }
    }
}
