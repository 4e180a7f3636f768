//! Name to handler registry behind the command line.

use std::collections::HashMap;

use async_trait::async_trait;
use itertools::Itertools;

use crate::{
	auth::RequireAuth,
	config::State,
	error::{Error, Result},
};

mod aggregate;
mod browse;
mod feeds;
mod users;

pub use self::aggregate::{Aggregate, shutdown_signal};
pub use self::browse::{Browse, DEFAULT_BROWSE_LIMIT};
pub use self::feeds::{AddFeed, Follow, Following, ListFeeds, Unfollow};
pub use self::users::{Login, Register, Reset, Users};

#[async_trait]
pub trait Handler: Send + Sync {
	async fn run(&self, state: &mut State, args: &[String]) -> Result<()>;
}

#[derive(Default)]
pub struct Commands {
	handlers: HashMap<String, Box<dyn Handler>>,
}

impl Commands {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Every command of the cli
	#[must_use]
	pub fn default_set() -> Self {
		let mut commands = Self::new();

		commands.register("register", Register);
		commands.register("login", Login);
		commands.register("reset", Reset);
		commands.register("users", Users);
		commands.register("agg", Aggregate);
		commands.register("feeds", ListFeeds);

		commands.register("addfeed", RequireAuth(AddFeed));
		commands.register("follow", RequireAuth(Follow));
		commands.register("following", RequireAuth(Following));
		commands.register("unfollow", RequireAuth(Unfollow));
		commands.register("browse", RequireAuth(Browse));

		commands
	}

	/// Registering a name twice replaces the previous handler
	pub fn register(&mut self, name: impl Into<String>, handler: impl Handler + 'static) {
		self.handlers.insert(name.into(), Box::new(handler));
	}

	pub async fn run(&self, state: &mut State, name: &str, args: &[String]) -> Result<()> {
		let handler = self
			.handlers
			.get(name)
			.ok_or_else(|| Error::UnknownCommand(name.to_owned()))?;

		tracing::debug!(command = %name, args = ?args, "running command");
		handler.run(state, args).await
	}

	/// Registered command names, sorted
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.handlers.keys().map(String::as_str).sorted_unstable()
	}
}

/// Exactly `N` arguments or a usage error
fn exact_args<'a, const N: usize>(args: &'a [String], usage: &str) -> Result<[&'a str; N]> {
	<&[String; N]>::try_from(args)
		.map(|args| args.each_ref().map(String::as_str))
		.map_err(|_| Error::Validation(format!("usage: {usage}")))
}

/// Zero or one argument
fn optional_arg<'a>(args: &'a [String], usage: &str) -> Result<Option<&'a str>> {
	match args {
		[] => Ok(None),
		[arg] => Ok(Some(arg.as_str())),
		_ => Err(Error::Validation(format!("usage: {usage}"))),
	}
}

/// Parses a strictly positive integer argument
fn positive<T>(raw: &str, what: &str) -> Result<T>
where
	T: std::str::FromStr + Default + PartialOrd,
{
	raw.parse::<T>()
		.ok()
		.filter(|value| *value > T::default())
		.ok_or_else(|| Error::Validation(format!("{what} must be a positive integer, got {raw:?}")))
}
