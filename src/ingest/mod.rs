//! Turns fetched feed items into stored posts.

use crate::{
	database::{
		Database, to_utc, utc_now,
		models::{Feed, NewPost, PostId},
	},
	error::{Error, Result},
	fetcher::RawItem,
};

mod date;

pub use self::date::parse_pub_date;

/// What to do with an item whose publish date cannot be parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DatePolicy {
	/// Record the item as skipped and keep going
	#[default]
	Skip,
	/// Stop the batch at the first bad item, items before it stay saved
	Abort,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
	/// A post with the same url already exists for this feed
	Duplicate,
	InvalidDate(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
	Saved(PostId),
	Skipped(SkipReason),
	Failed(String),
}

/// One outcome per item, in feed order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
	pub outcomes: Vec<ItemOutcome>,
}

impl IngestReport {
	#[must_use]
	pub fn saved(&self) -> usize {
		self.count(|outcome| matches!(outcome, ItemOutcome::Saved(_)))
	}

	#[must_use]
	pub fn skipped(&self) -> usize {
		self.count(|outcome| matches!(outcome, ItemOutcome::Skipped(_)))
	}

	#[must_use]
	pub fn duplicates(&self) -> usize {
		self.count(|outcome| matches!(outcome, ItemOutcome::Skipped(SkipReason::Duplicate)))
	}

	#[must_use]
	pub fn failed(&self) -> usize {
		self.count(|outcome| matches!(outcome, ItemOutcome::Failed(_)))
	}

	fn count(&self, predicate: impl Fn(&ItemOutcome) -> bool) -> usize {
		self.outcomes.iter().filter(|outcome| predicate(outcome)).count()
	}
}

/// Store every item of a freshly fetched feed as a post of `feed`.
///
/// Items already stored (same feed and url) are reported as duplicates.
pub fn save_posts(
	db: &Database,
	feed: &Feed,
	items: &[RawItem],
	policy: DatePolicy,
) -> Result<IngestReport> {
	let mut report = IngestReport::default();

	for item in items {
		let outcome = match save_post(db, feed, item) {
			Ok(outcome) => outcome,
			Err(err) if policy == DatePolicy::Abort => {
				tracing::warn!(
					feed_id = ?feed.id,
					feed = %feed.name,
					items = items.len(),
					saved = report.saved(),
					skipped = report.skipped(),
					err = %err,
					"aborted feed ingestion"
				);
				return Err(err);
			}
			Err(Error::DateParse(raw)) => {
				tracing::debug!(feed_id = ?feed.id, url = %item.link, raw = %raw, "skipping item with unparsable date");
				ItemOutcome::Skipped(SkipReason::InvalidDate(raw))
			}
			Err(err) => {
				tracing::warn!(feed_id = ?feed.id, url = %item.link, err = %err, "could not save post");
				ItemOutcome::Failed(err.to_string())
			}
		};

		report.outcomes.push(outcome);
	}

	tracing::info!(
		feed_id = ?feed.id,
		feed = %feed.name,
		items = items.len(),
		saved = report.saved(),
		skipped = report.skipped(),
		failed = report.failed(),
		"ingested feed items"
	);

	Ok(report)
}

fn save_post(db: &Database, feed: &Feed, item: &RawItem) -> Result<ItemOutcome> {
	let published_at = parse_pub_date(&item.pub_date)?;

	let now = utc_now();
	let post = NewPost {
		created_at: now,
		updated_at: now,
		title: &item.title,
		url: &item.link,
		description: Some(item.description.as_str()).filter(|desc| !desc.is_empty()),
		published_at: to_utc(published_at),
		feed_id: feed.id,
	};

	Ok(match db.create_post(&post)? {
		Some(post_id) => ItemOutcome::Saved(post_id),
		None => ItemOutcome::Skipped(SkipReason::Duplicate),
	})
}
