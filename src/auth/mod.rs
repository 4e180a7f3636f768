//! Gate for commands that act on behalf of the logged-in user.

use async_trait::async_trait;

use crate::{
	commands::Handler,
	config::State,
	database::models::User,
	error::{Error, Result},
};

/// A command that needs to know who is running it
#[async_trait]
pub trait AuthedHandler: Send + Sync {
	async fn run(&self, state: &mut State, user: &User, args: &[String]) -> Result<()>;
}

/// Resolve the user named in the config.
///
/// An empty name or a name with no matching user is [`Error::Unauthenticated`].
pub fn current_user(state: &State) -> Result<User> {
	let name = state.config.current_user().ok_or(Error::Unauthenticated)?;

	match state.db.get_user(name)? {
		Some(user) => Ok(user),
		None => {
			tracing::debug!(user = %name, "current user does not exist");
			Err(Error::Unauthenticated)
		}
	}
}

/// Wraps an [`AuthedHandler`] so it can be registered as a plain [`Handler`],
/// the inner handler only runs once a user is resolved.
#[derive(Debug, Clone, Copy)]
pub struct RequireAuth<H>(pub H);

#[async_trait]
impl<H: AuthedHandler> Handler for RequireAuth<H> {
	async fn run(&self, state: &mut State, args: &[String]) -> Result<()> {
		let user = current_user(state)?;
		self.0.run(state, &user, args).await
	}
}
