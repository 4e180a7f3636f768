//! Periodic polling of feeds, one feed per tick.

use std::time::Duration;

use eyre::WrapErr;
use time::OffsetDateTime;
use tokio::{
	task,
	time::{self as tokio_time, MissedTickBehavior},
};

use crate::{
	database::{Database, models::Feed},
	error::{Error, Result},
	fetcher::Fetcher,
	ingest::{self, DatePolicy, IngestReport},
};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// What the polling loop does with a failed cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
	/// Log the failure and wait for the next tick
	#[default]
	Continue,
	/// Stop polling and return the error
	Halt,
}

#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
	pub interval: Duration,
	pub failure_policy: FailurePolicy,
	pub date_policy: DatePolicy,
}

impl Default for SchedulerConfig {
	fn default() -> Self {
		Self {
			interval: DEFAULT_INTERVAL,
			failure_policy: FailurePolicy::default(),
			date_policy: DatePolicy::default(),
		}
	}
}

#[derive(Debug)]
pub enum CycleOutcome {
	/// There is no feed to fetch
	Idle,
	Ingested {
		feed: Feed,
		report: IngestReport,
	},
	Failed {
		/// `None` when no feed could be selected
		feed: Option<Feed>,
		error: Error,
	},
}

#[derive(Debug, Clone)]
pub struct Scheduler {
	db: Database,
	fetcher: Fetcher,
	config: SchedulerConfig,
}

impl Scheduler {
	#[must_use]
	pub const fn new(db: Database, fetcher: Fetcher, config: SchedulerConfig) -> Self {
		Self {
			db,
			fetcher,
			config,
		}
	}

	/// Poll feeds until `shutdown` resolves.
	///
	/// The first cycle runs immediately. A cycle still running when `shutdown`
	/// resolves is dropped.
	pub async fn run(&self, shutdown: impl Future<Output = ()>) -> Result<()> {
		if self.config.interval.is_zero() {
			return Err(Error::Validation("polling interval must not be zero".into()));
		}

		let mut shutdown = std::pin::pin!(shutdown);

		let mut ticker = tokio_time::interval(self.config.interval);
		ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

		tracing::info!(interval = ?self.config.interval, "collecting feeds");

		loop {
			tokio::select! {
				biased;
				() = &mut shutdown => break,
				_ = ticker.tick() => {}
			}

			let outcome = tokio::select! {
				biased;
				() = &mut shutdown => break,
				outcome = self.cycle() => outcome,
			};

			match outcome {
				CycleOutcome::Idle => tracing::debug!("no feed to fetch"),
				CycleOutcome::Ingested { feed, report } => {
					tracing::debug!(feed_id = ?feed.id, saved = report.saved(), "cycle done");
				}
				CycleOutcome::Failed { feed, error } => {
					let feed_id = feed.as_ref().map(|feed| feed.id);
					match self.config.failure_policy {
						FailurePolicy::Continue => {
							tracing::warn!(feed_id = ?feed_id, err = %error, "could not refresh feed");
						}
						FailurePolicy::Halt => {
							tracing::error!(feed_id = ?feed_id, err = %error, "stopping collection");
							return Err(error);
						}
					}
				}
			}
		}

		tracing::info!("stopped collecting feeds");
		Ok(())
	}

	/// Refresh the feed that was fetched the longest time ago.
	pub async fn cycle(&self) -> CycleOutcome {
		let feed = match self.with_db(|db| db.get_next_feed_to_fetch()).await {
			Ok(Some(feed)) => feed,
			Ok(None) => return CycleOutcome::Idle,
			Err(error) => return CycleOutcome::Failed { feed: None, error },
		};

		match self.refresh(&feed).await {
			Ok(report) => CycleOutcome::Ingested { feed, report },
			Err(error) => CycleOutcome::Failed {
				feed: Some(feed),
				error,
			},
		}
	}

	async fn refresh(&self, feed: &Feed) -> Result<IngestReport> {
		// Marked before fetching, a failing feed goes to the back of the queue
		let feed_id = feed.id;
		self.with_db(move |db| db.mark_feed_fetched(feed_id, OffsetDateTime::now_utc()))
			.await?;

		tracing::debug!(feed_id = ?feed.id, url = %feed.url, "fetching feed");
		let raw = self.fetcher.fetch(&feed.url).await?;

		let feed = feed.clone();
		let policy = self.config.date_policy;
		self.with_db(move |db| ingest::save_posts(db, &feed, &raw.items, policy))
			.await
	}

	/// Run a blocking database call on the blocking pool
	async fn with_db<T, F>(&self, query: F) -> Result<T>
	where
		T: Send + 'static,
		F: FnOnce(&Database) -> Result<T> + Send + 'static,
	{
		let db = self.db.clone();
		task::spawn_blocking(move || query(&db))
			.await
			.wrap_err("database task failed")?
	}
}
