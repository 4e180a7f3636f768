use async_trait::async_trait;
use time::{PrimitiveDateTime, format_description::BorrowedFormatItem, macros::format_description};

use super::{optional_arg, positive};
use crate::{
	auth::AuthedHandler,
	config::State,
	database::models::{ResolvedPost, User},
	error::Result,
};

pub const DEFAULT_BROWSE_LIMIT: i64 = 2;

/// Only date and time components, always formattable from a `PrimitiveDateTime`
const PUBLISHED_FORMAT: &[BorrowedFormatItem<'static>] =
	format_description!("[year]-[month]-[day] [hour]:[minute] UTC");

/// `browse [limit]`, newest posts of the feeds the user follows
#[derive(Debug, Clone, Copy)]
pub struct Browse;

#[async_trait]
impl AuthedHandler for Browse {
	async fn run(&self, state: &mut State, user: &User, args: &[String]) -> Result<()> {
		let limit = match optional_arg(args, "browse [limit]")? {
			Some(raw) => positive::<i64>(raw, "limit")?,
			None => DEFAULT_BROWSE_LIMIT,
		};

		let posts = state.db.get_posts_for_user(user.id, limit)?;
		if posts.is_empty() {
			println!("No posts yet, follow a feed and run `agg`");
		}

		for post in &posts {
			print_post(post);
		}

		Ok(())
	}
}

fn print_post(resolved: &ResolvedPost) {
	let post = &resolved.post;
	println!("{} from {}", format_published(post.published_at), resolved.feed_name);
	println!("--- {} ---", post.title);
	if let Some(description) = &post.description {
		println!("    {description}");
	}
	println!("Link: {}", post.url);
	println!("=====================================");
}

fn format_published(at: PrimitiveDateTime) -> String {
	at.format(PUBLISHED_FORMAT).unwrap_or_default()
}
