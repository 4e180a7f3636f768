use std::{
	fs,
	path::{Path, PathBuf},
	time::Duration,
};

use eyre::{WrapErr, eyre};
use serde::{Deserialize, Serialize};

use crate::{database::Database, error::Result, fetcher::Fetcher};

pub const CONFIG_FILE_NAME: &str = ".gatorconfig.json";

/// Persisted JSON config, read at startup and written back on login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
	pub db_url: String,

	/// Empty when nobody is logged in
	#[serde(default)]
	pub current_user_name: String,

	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub poll_interval_secs: Option<u64>,
}

impl Config {
	/// `~/.gatorconfig.json`
	pub fn default_path() -> eyre::Result<PathBuf> {
		let home = dirs::home_dir().ok_or_else(|| eyre!("could not locate the home directory"))?;
		Ok(home.join(CONFIG_FILE_NAME))
	}

	pub fn load(path: &Path) -> eyre::Result<Self> {
		let content = fs::read_to_string(path)
			.wrap_err_with(|| format!("could not read the config file at {}", path.display()))?;

		serde_json::from_str::<Self>(&content)
			.wrap_err("config file does not match the expected structure")
	}

	pub fn save(&self, path: &Path) -> eyre::Result<()> {
		let content = serde_json::to_string_pretty(self).wrap_err("could not serialize config")?;

		fs::write(path, content)
			.wrap_err_with(|| format!("could not write the config file at {}", path.display()))
	}

	#[must_use]
	pub fn current_user(&self) -> Option<&str> {
		Some(self.current_user_name.as_str()).filter(|name| !name.is_empty())
	}

	#[must_use]
	pub fn poll_interval(&self) -> Option<Duration> {
		self.poll_interval_secs.map(Duration::from_secs)
	}
}

/// Everything a command needs, passed along to every handler
#[derive(Debug)]
pub struct State {
	pub db: Database,
	pub fetcher: Fetcher,
	pub config: Config,
	config_path: PathBuf,
}

impl State {
	#[must_use]
	pub const fn new(db: Database, fetcher: Fetcher, config: Config, config_path: PathBuf) -> Self {
		Self {
			db,
			fetcher,
			config,
			config_path,
		}
	}

	/// Open the database named in `config` and build the http client
	pub fn init(config: Config, config_path: PathBuf) -> eyre::Result<Self> {
		let db = Database::connect(&config.db_url)
			.wrap_err_with(|| format!("could not open the database at {:?}", config.db_url))?;
		let fetcher = Fetcher::new()?;

		Ok(Self::new(db, fetcher, config, config_path))
	}

	/// Change the logged-in user and persist the config
	pub fn set_current_user(&mut self, name: &str) -> Result<()> {
		self.config.current_user_name = name.to_owned();
		self.config.save(&self.config_path)?;

		tracing::debug!(user = %name, path = %self.config_path.display(), "saved current user");
		Ok(())
	}
}
