use diesel::r2d2::PoolError;

use crate::fetcher::FetchError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("validation: {0}")]
	Validation(String),

	#[error("{0} not found")]
	NotFound(String),

	#[error("{0} already exists")]
	AlreadyExists(String),

	#[error("fetch: {0}")]
	Fetch(FetchError),

	#[error("could not parse date {0:?}")]
	DateParse(String),

	#[error("no user is logged in, use `register` or `login` first")]
	Unauthenticated,

	#[error("unknown command: {0}")]
	UnknownCommand(String),

	#[error("database: {0}")]
	Database(#[from] diesel::result::Error),

	#[error("pool: {0}")]
	DbPool(#[from] PoolError),

	#[error("other: {0}")]
	Other(#[from] eyre::Report),
}

impl From<FetchError> for Error {
	fn from(value: FetchError) -> Self {
		match value {
			FetchError::InvalidUrl(reason) => Self::Validation(reason),
			err => Self::Fetch(err),
		}
	}
}
