use async_trait::async_trait;

use super::{Handler, exact_args};
use crate::{
	config::State,
	error::{Error, Result},
};

fn user_name(name: &str) -> Result<&str> {
	let name = name.trim();
	if name.is_empty() {
		return Err(Error::Validation("user name must not be empty".into()));
	}
	Ok(name)
}

/// `register <name>`, creates the user and logs in as them
#[derive(Debug, Clone, Copy)]
pub struct Register;

#[async_trait]
impl Handler for Register {
	async fn run(&self, state: &mut State, args: &[String]) -> Result<()> {
		let [name] = exact_args::<1>(args, "register <name>")?;
		let name = user_name(name)?;

		let user = state.db.create_user(name)?;
		state.set_current_user(&user.name)?;

		tracing::info!(user_id = ?user.id, user = %user.name, "registered user");
		println!("User {} has been created", user.name);
		Ok(())
	}
}

/// `login <name>`
#[derive(Debug, Clone, Copy)]
pub struct Login;

#[async_trait]
impl Handler for Login {
	async fn run(&self, state: &mut State, args: &[String]) -> Result<()> {
		let [name] = exact_args::<1>(args, "login <name>")?;
		let name = user_name(name)?;

		let user = state
			.db
			.get_user(name)?
			.ok_or_else(|| Error::NotFound(format!("user {name:?}")))?;
		state.set_current_user(&user.name)?;

		println!("Logged in as {}", user.name);
		Ok(())
	}
}

/// `reset`, deletes every user along with their feeds, follows and posts
#[derive(Debug, Clone, Copy)]
pub struct Reset;

#[async_trait]
impl Handler for Reset {
	async fn run(&self, state: &mut State, args: &[String]) -> Result<()> {
		let [] = exact_args::<0>(args, "reset")?;

		let deleted = state.db.delete_users()?;

		tracing::info!(deleted, "reset database");
		println!("Deleted {deleted} users");
		Ok(())
	}
}

/// `users`
#[derive(Debug, Clone, Copy)]
pub struct Users;

#[async_trait]
impl Handler for Users {
	async fn run(&self, state: &mut State, args: &[String]) -> Result<()> {
		let [] = exact_args::<0>(args, "users")?;

		let current = state.config.current_user();
		for user in state.db.get_users()? {
			if Some(user.name.as_str()) == current {
				println!("* {} (current)", user.name);
			} else {
				println!("* {}", user.name);
			}
		}

		Ok(())
	}
}
