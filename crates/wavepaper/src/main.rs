mod cli;
mod paths;
mod run;

use anyhow::Result;
use cli::{Command, ConfigAction};

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Snapshot(args)) => run::snapshot(args),
        Some(Command::Config(config_cmd)) => match config_cmd.action {
            ConfigAction::Where => run::config_where(),
        },
        None => run::run(cli.run),
    }
}
