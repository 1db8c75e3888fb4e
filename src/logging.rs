use crate::world::PlayerId;

/// Routes the `log` facade to `bot-<player>.log`. Standard output carries the engine protocol, so nothing is
/// ever logged there.
pub fn setup_logging(verbosity: log::LevelFilter, player: PlayerId) -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .level(verbosity)
        .format(|out, message, record| out.finish(format_args!("[{}] {}: {}", record.level(), record.target(), message)))
        .chain(fern::log_file(format!("bot-{}.log", player))?)
        .apply()?;

    Ok(())
}
