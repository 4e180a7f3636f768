use std::path::PathBuf;

use clap::Parser;
use eyre::WrapErr;
use gator::{
	Error,
	commands::Commands,
	config::{Config, State},
};
use itertools::Itertools;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

/// Follow RSS feeds from the command line
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
	/// Path of the JSON config file, defaults to `~/.gatorconfig.json`
	#[arg(long, env = "GATOR_CONFIG")]
	config: Option<PathBuf>,

	/// Command to run (register, login, reset, users, agg, addfeed, feeds,
	/// follow, following, unfollow, browse)
	command: String,

	/// Arguments of the command
	#[arg(trailing_var_arg = true, allow_hyphen_values = true)]
	args: Vec<String>,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
	let cli = Cli::parse();
	setup_tracing();

	let config_path = match cli.config {
		Some(path) => path,
		None => Config::default_path()?,
	};
	let config = Config::load(&config_path).wrap_err("could not load the config")?;
	let mut state = State::init(config, config_path).wrap_err("could not init state")?;

	let commands = Commands::default_set();
	if let Err(err) = commands.run(&mut state, &cli.command, &cli.args).await {
		tracing::error!(command = %cli.command, err = %err, "command failed");

		if matches!(err, Error::UnknownCommand(_)) {
			eprintln!("available commands: {}", commands.names().join(", "));
		}

		return Err(err).wrap_err_with(|| format!("`{}` failed", cli.command));
	}

	Ok(())
}

fn setup_tracing() {
	Registry::default()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,gator=debug".into()))
		.with(
			tracing_subscriber::fmt::layer()
				.with_writer(std::io::stderr)
				.with_file(true)
				.with_line_number(true),
		)
		.init();
}
