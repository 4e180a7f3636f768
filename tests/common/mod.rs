#![allow(dead_code)]

use gator::{
	commands::Commands,
	config::{Config, State},
	database::Database,
	fetcher::Fetcher,
};
use tempfile::TempDir;

/// A state backed by an in-memory database, the config lives in `dir`
pub struct TestState {
	pub state: State,
	pub commands: Commands,
	pub dir: TempDir,
}

impl TestState {
	pub fn new() -> Self {
		let dir = tempfile::tempdir().unwrap();
		let config = Config {
			db_url: ":memory:".into(),
			current_user_name: String::new(),
			poll_interval_secs: None,
		};
		let state = State::new(
			Database::in_memory().unwrap(),
			Fetcher::new().unwrap(),
			config,
			dir.path().join(".gatorconfig.json"),
		);

		Self {
			state,
			commands: Commands::default_set(),
			dir,
		}
	}

	pub async fn run(&mut self, line: &str) -> gator::Result<()> {
		let mut words = line.split_whitespace().map(str::to_owned);
		let name = words.next().unwrap();
		let args = words.collect::<Vec<_>>();
		self.commands.run(&mut self.state, &name, &args).await
	}
}

pub fn rss(items: &[(&str, &str, &str)]) -> String {
	let items = items
		.iter()
		.map(|(title, link, date)| {
			format!(
				"<item><title>{title}</title><link>{link}</link>\
				<description>about {title}</description><pubDate>{date}</pubDate></item>"
			)
		})
		.collect::<String>();

	format!(
		"<?xml version=\"1.0\"?><rss version=\"2.0\"><channel>\
		<title>Test feed</title><link>https://example.com/</link>\
		<description>for tests</description>{items}</channel></rss>"
	)
}
