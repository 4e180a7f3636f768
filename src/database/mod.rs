use diesel::{
	connection::SimpleConnection,
	dsl,
	prelude::*,
	r2d2::{self, ConnectionManager, CustomizeConnection, Pool},
	result::{DatabaseErrorKind, Error as DieselError},
};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use eyre::{WrapErr, eyre};
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};
use url::Url;

use self::models::{
	Feed, FeedFollow, FeedId, NewFeed, NewFeedFollow, NewPost, NewUser, Post, PostId,
	ResolvedFeed, ResolvedPost, User, UserId,
};
use crate::error::{Error, Result};

#[rustfmt::skip]
pub mod schema;
pub mod models;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type PoolConnection = r2d2::Pool<ConnectionManager<SqliteConnection>>;
pub type PooledConnection = r2d2::PooledConnection<ConnectionManager<SqliteConnection>>;

const DEFAULT_POOL_SIZE: u32 = 8;

/// Current instant, in the UTC representation stored by the database
#[must_use]
pub fn utc_now() -> PrimitiveDateTime {
	to_utc(OffsetDateTime::now_utc())
}

#[must_use]
pub fn to_utc(at: OffsetDateTime) -> PrimitiveDateTime {
	let at = at.to_offset(UtcOffset::UTC);
	PrimitiveDateTime::new(at.date(), at.time())
}

#[derive(Debug, Clone, Copy)]
struct ConnectionOptions;

impl CustomizeConnection<SqliteConnection, r2d2::Error> for ConnectionOptions {
	fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), r2d2::Error> {
		conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
			.map_err(r2d2::Error::QueryError)
	}
}

/// Persistence gateway, every operation checks out its own pooled connection
#[derive(Debug, Clone)]
pub struct Database {
	pool: PoolConnection,
}

impl Database {
	pub fn connect(database_url: &str) -> Result<Self> {
		let manager = ConnectionManager::<SqliteConnection>::new(database_url);
		let pool = Pool::builder()
			.max_size(DEFAULT_POOL_SIZE)
			.connection_customizer(Box::new(ConnectionOptions))
			.build(manager)
			.wrap_err("could not build database connection pool")?;

		let database = Self { pool };
		database.migrate()?;
		Ok(database)
	}

	/// Every connection to `:memory:` opens a distinct database, so the pool keeps
	/// exactly one connection alive for its whole lifetime.
	pub fn in_memory() -> Result<Self> {
		let manager = ConnectionManager::<SqliteConnection>::new(":memory:");
		let pool = Pool::builder()
			.max_size(1)
			.idle_timeout(None)
			.max_lifetime(None)
			.connection_customizer(Box::new(ConnectionOptions))
			.build(manager)
			.wrap_err("could not build in-memory database")?;

		let database = Self { pool };
		database.migrate()?;
		Ok(database)
	}

	fn migrate(&self) -> Result<()> {
		let mut conn = self.conn()?;
		let applied = conn
			.run_pending_migrations(MIGRATIONS)
			.map_err(|err| eyre!("could not run database migrations: {err}"))?;

		tracing::debug!(count = applied.len(), "applied pending migrations");
		Ok(())
	}

	pub fn conn(&self) -> Result<PooledConnection> {
		Ok(self.pool.get()?)
	}
}

// --- users

impl Database {
	pub fn create_user(&self, name: &str) -> Result<User> {
		use crate::database::schema::*;

		let now = utc_now();
		let mut conn = self.conn()?;
		NewUser {
			created_at: now,
			updated_at: now,
			name,
		}
		.insert_into(users::table)
		.returning(User::as_returning())
		.get_result(&mut conn)
		.map_err(|err| conflict(err, || format!("user {name:?}")))
	}

	pub fn get_user(&self, name: &str) -> Result<Option<User>> {
		use crate::database::schema::*;

		let mut conn = self.conn()?;
		let user = users::table
			.select(User::as_select())
			.filter(users::name.eq(name))
			.first(&mut conn)
			.optional()?;

		Ok(user)
	}

	pub fn get_users(&self) -> Result<Vec<User>> {
		use crate::database::schema::*;

		let mut conn = self.conn()?;
		let users = users::table
			.select(User::as_select())
			.order(users::name.asc())
			.load(&mut conn)?;

		Ok(users)
	}

	/// Removes every user, their feeds, follows and posts go with them
	pub fn delete_users(&self) -> Result<usize> {
		use crate::database::schema::*;

		let mut conn = self.conn()?;
		Ok(dsl::delete(users::table).execute(&mut conn)?)
	}
}

// --- feeds

impl Database {
	pub fn create_feed(&self, name: &str, url: &Url, user_id: UserId) -> Result<Feed> {
		use crate::database::schema::*;

		let now = utc_now();
		let mut conn = self.conn()?;
		NewFeed {
			created_at: now,
			updated_at: now,
			name,
			url: url.as_str(),
			user_id,
		}
		.insert_into(feeds::table)
		.returning(Feed::as_returning())
		.get_result(&mut conn)
		.map_err(|err| conflict(err, || format!("feed with url {url}")))
	}

	pub fn get_feed_by_url(&self, url: &Url) -> Result<Option<Feed>> {
		use crate::database::schema::*;

		let mut conn = self.conn()?;
		let feed = feeds::table
			.select(Feed::as_select())
			.filter(feeds::url.eq(url.as_str()))
			.first(&mut conn)
			.optional()?;

		Ok(feed)
	}

	pub fn get_feeds(&self) -> Result<Vec<ResolvedFeed>> {
		use crate::database::schema::*;

		let mut conn = self.conn()?;
		let feeds = feeds::table
			.inner_join(users::table)
			.select((Feed::as_select(), users::name))
			.order(feeds::id.asc())
			.load::<(Feed, String)>(&mut conn)?
			.into_iter()
			.map(|(feed, user_name)| ResolvedFeed { feed, user_name })
			.collect();

		Ok(feeds)
	}

	/// The feed whose last fetch is the oldest, feeds never fetched come first
	pub fn get_next_feed_to_fetch(&self) -> Result<Option<Feed>> {
		use crate::database::schema::*;

		let mut conn = self.conn()?;
		// SQLite sorts NULL before any other value in ascending order
		let feed = feeds::table
			.select(Feed::as_select())
			.order((feeds::last_fetched_at.asc(), feeds::id.asc()))
			.first(&mut conn)
			.optional()?;

		Ok(feed)
	}

	/// Returns `false` when the feed does not exist or already carries a more
	/// recent fetch time, `last_fetched_at` never goes backwards.
	pub fn mark_feed_fetched(&self, feed_id: FeedId, at: OffsetDateTime) -> Result<bool> {
		use crate::database::schema::*;

		let at = to_utc(at);
		let mut conn = self.conn()?;
		let updated = dsl::update(feeds::table)
			.filter(feeds::id.eq(feed_id))
			.filter(
				feeds::last_fetched_at
					.is_null()
					.or(feeds::last_fetched_at.le(at)),
			)
			.set((
				feeds::last_fetched_at.eq(at),
				feeds::updated_at.eq(at),
			))
			.execute(&mut conn)?;

		Ok(updated > 0)
	}
}

// --- follows

impl Database {
	pub fn create_feed_follow(&self, user_id: UserId, feed_id: FeedId) -> Result<FeedFollow> {
		use crate::database::schema::*;

		let now = utc_now();
		let mut conn = self.conn()?;
		NewFeedFollow {
			created_at: now,
			updated_at: now,
			user_id,
			feed_id,
		}
		.insert_into(feed_follows::table)
		.returning(FeedFollow::as_returning())
		.get_result(&mut conn)
		.map_err(|err| conflict(err, || format!("follow of feed {feed_id} by user {user_id}")))
	}

	/// Returns whether a follow was actually removed
	pub fn delete_feed_follow(&self, user_id: UserId, feed_id: FeedId) -> Result<bool> {
		use crate::database::schema::*;

		let mut conn = self.conn()?;
		let deleted = dsl::delete(
			feed_follows::table.filter(
				feed_follows::user_id
					.eq(user_id)
					.and(feed_follows::feed_id.eq(feed_id)),
			),
		)
		.execute(&mut conn)?;

		Ok(deleted > 0)
	}

	pub fn get_feed_follows_for_user(&self, user_id: UserId) -> Result<Vec<Feed>> {
		use crate::database::schema::*;

		let mut conn = self.conn()?;
		let feeds = feed_follows::table
			.inner_join(feeds::table)
			.filter(feed_follows::user_id.eq(user_id))
			.select(Feed::as_select())
			.order(feed_follows::id.asc())
			.load(&mut conn)?;

		Ok(feeds)
	}
}

// --- posts

impl Database {
	/// Inserts the post unless the feed already has one with the same url, in
	/// which case `None` is returned.
	pub fn create_post(&self, post: &NewPost<'_>) -> Result<Option<PostId>> {
		use crate::database::schema::*;

		let mut conn = self.conn()?;
		let id = post
			.insert_into(posts::table)
			.on_conflict_do_nothing()
			.returning(posts::id)
			.get_result::<PostId>(&mut conn)
			.optional()?;

		Ok(id)
	}

	/// Most recently published posts of the feeds followed by `user_id`
	pub fn get_posts_for_user(&self, user_id: UserId, limit: i64) -> Result<Vec<ResolvedPost>> {
		use crate::database::schema::*;

		let mut conn = self.conn()?;
		let posts = posts::table
			.inner_join(feeds::table.inner_join(feed_follows::table))
			.filter(feed_follows::user_id.eq(user_id))
			.select((Post::as_select(), feeds::name))
			.order((posts::published_at.desc(), posts::id.desc()))
			.limit(limit)
			.load::<(Post, String)>(&mut conn)?
			.into_iter()
			.map(|(post, feed_name)| ResolvedPost { post, feed_name })
			.collect();

		Ok(posts)
	}
}

fn conflict(err: DieselError, what: impl FnOnce() -> String) -> Error {
	match err {
		DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
			Error::AlreadyExists(what())
		}
		err => Error::Database(err),
	}
}
