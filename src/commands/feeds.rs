use async_trait::async_trait;
use url::Url;

use super::{Handler, exact_args};
use crate::{
	auth::AuthedHandler,
	config::State,
	database::models::{Feed, User},
	error::{Error, Result},
	fetcher,
};

fn existing_feed(state: &State, url: &Url) -> Result<Feed> {
	state
		.db
		.get_feed_by_url(url)?
		.ok_or_else(|| Error::NotFound(format!("feed {url}")))
}

/// `addfeed <name> <url>`, the creator automatically follows the new feed
#[derive(Debug, Clone, Copy)]
pub struct AddFeed;

#[async_trait]
impl AuthedHandler for AddFeed {
	async fn run(&self, state: &mut State, user: &User, args: &[String]) -> Result<()> {
		let [name, url] = exact_args::<2>(args, "addfeed <name> <url>")?;
		let name = name.trim();
		if name.is_empty() {
			return Err(Error::Validation("feed name must not be empty".into()));
		}
		let url = fetcher::validate_url(url)?;

		let feed = state.db.create_feed(name, &url, user.id)?;
		state.db.create_feed_follow(user.id, feed.id)?;

		tracing::info!(feed_id = ?feed.id, url = %feed.url, user = %user.name, "added feed");
		println!("Feed {} ({}) added, {} now follows it", feed.name, feed.url, user.name);
		Ok(())
	}
}

/// `feeds`
#[derive(Debug, Clone, Copy)]
pub struct ListFeeds;

#[async_trait]
impl Handler for ListFeeds {
	async fn run(&self, state: &mut State, args: &[String]) -> Result<()> {
		let [] = exact_args::<0>(args, "feeds")?;

		for resolved in state.db.get_feeds()? {
			println!(
				"* {} ({}) added by {}",
				resolved.feed.name, resolved.feed.url, resolved.user_name
			);
		}

		Ok(())
	}
}

/// `follow <url>`
#[derive(Debug, Clone, Copy)]
pub struct Follow;

#[async_trait]
impl AuthedHandler for Follow {
	async fn run(&self, state: &mut State, user: &User, args: &[String]) -> Result<()> {
		let [url] = exact_args::<1>(args, "follow <url>")?;
		let url = fetcher::validate_url(url)?;

		let feed = existing_feed(state, &url)?;
		state.db.create_feed_follow(user.id, feed.id)?;

		println!("{} now follows {}", user.name, feed.name);
		Ok(())
	}
}

/// `following`
#[derive(Debug, Clone, Copy)]
pub struct Following;

#[async_trait]
impl AuthedHandler for Following {
	async fn run(&self, state: &mut State, user: &User, args: &[String]) -> Result<()> {
		let [] = exact_args::<0>(args, "following")?;

		for feed in state.db.get_feed_follows_for_user(user.id)? {
			println!("* {}", feed.name);
		}

		Ok(())
	}
}

/// `unfollow <url>`
#[derive(Debug, Clone, Copy)]
pub struct Unfollow;

#[async_trait]
impl AuthedHandler for Unfollow {
	async fn run(&self, state: &mut State, user: &User, args: &[String]) -> Result<()> {
		let [url] = exact_args::<1>(args, "unfollow <url>")?;
		let url = fetcher::validate_url(url)?;

		let feed = existing_feed(state, &url)?;
		if !state.db.delete_feed_follow(user.id, feed.id)? {
			return Err(Error::NotFound(format!("follow of feed {url}")));
		}

		println!("{} unfollowed {}", user.name, feed.name);
		Ok(())
	}
}
