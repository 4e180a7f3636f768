use std::fmt;

use diesel::prelude::*;
use diesel_derive_newtype::DieselNewType;
use time::PrimitiveDateTime;

use crate::database::schema::*;

macro_rules! id_newtype {
	($($name:ident),* $(,)?) => {
		$(
			#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, DieselNewType)]
			pub struct $name(i32);

			impl fmt::Display for $name {
				fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
					self.0.fmt(f)
				}
			}
		)*
	};
}

id_newtype!(UserId, FeedId, FeedFollowId, PostId);

// All timestamps are stored as UTC.

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = users, check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
	pub id: UserId,
	pub created_at: PrimitiveDateTime,
	pub updated_at: PrimitiveDateTime,

	pub name: String,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
	pub created_at: PrimitiveDateTime,
	pub updated_at: PrimitiveDateTime,

	pub name: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = feeds, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Feed {
	pub id: FeedId,
	pub created_at: PrimitiveDateTime,
	pub updated_at: PrimitiveDateTime,

	pub name: String,
	pub url: String,
	pub user_id: UserId,

	/// `None` until the scheduler picks the feed for the first time
	pub last_fetched_at: Option<PrimitiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = feeds)]
pub struct NewFeed<'a> {
	pub created_at: PrimitiveDateTime,
	pub updated_at: PrimitiveDateTime,

	pub name: &'a str,
	pub url: &'a str,
	pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = feed_follows, check_for_backend(diesel::sqlite::Sqlite))]
pub struct FeedFollow {
	pub id: FeedFollowId,
	pub created_at: PrimitiveDateTime,
	pub updated_at: PrimitiveDateTime,

	pub user_id: UserId,
	pub feed_id: FeedId,
}

#[derive(Insertable)]
#[diesel(table_name = feed_follows)]
pub struct NewFeedFollow {
	pub created_at: PrimitiveDateTime,
	pub updated_at: PrimitiveDateTime,

	pub user_id: UserId,
	pub feed_id: FeedId,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = posts, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Post {
	pub id: PostId,
	pub created_at: PrimitiveDateTime,
	pub updated_at: PrimitiveDateTime,

	pub title: String,
	pub url: String,
	pub description: Option<String>,
	pub published_at: PrimitiveDateTime,

	pub feed_id: FeedId,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = posts)]
pub struct NewPost<'a> {
	pub created_at: PrimitiveDateTime,
	pub updated_at: PrimitiveDateTime,

	pub title: &'a str,
	pub url: &'a str,
	pub description: Option<&'a str>,
	pub published_at: PrimitiveDateTime,

	pub feed_id: FeedId,
}

/// A feed with its creator's name resolved
#[derive(Debug, Clone)]
pub struct ResolvedFeed {
	pub feed: Feed,
	pub user_name: String,
}

/// A post with the name of the feed it belongs to
#[derive(Debug, Clone)]
pub struct ResolvedPost {
	pub post: Post,
	pub feed_name: String,
}
