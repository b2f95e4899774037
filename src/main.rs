mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use keyplay::commands::CommandContext;
use keyplay::config::AppConfig;
use keyplay::input::{InjectorFactory, KeyRecorder, OsKeyboard};
use keyplay::library::SongLibrary;
use keyplay::logging::init_logging;
use keyplay::repl::Repl;
use keyplay::session::SessionController;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let saved = AppConfig::load_from(&cli.config)?;
    let mut config = saved.clone();
    cli.apply(&mut config);

    let factory: Arc<dyn InjectorFactory> = if cli.dry_run {
        tracing::info!("dry run: keys are logged, not sent");
        Arc::new(KeyRecorder::new().with_echo())
    } else {
        Arc::new(OsKeyboard::new())
    };

    let mut controller = SessionController::new(config.engine_config(), factory);
    controller.set_speed(config.speed)?;

    let library = SongLibrary::scan(&config.songs_dir).unwrap_or_else(|e| {
        tracing::warn!("{:#}", e);
        SongLibrary::empty(&config.songs_dir)
    });

    let ctx = CommandContext::new(
        controller,
        library,
        config.game_mode,
        config.playback_mode(),
    )
    .with_config_file(saved, cli.config);
    Repl::new(ctx).run()
}
