pub type Result<T> = std::result::Result<T, FetchError>;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
	#[error("invalid feed url: {0}")]
	InvalidUrl(String),

	#[error("request: {0}")]
	Request(#[from] reqwest::Error),

	#[error("parse: {0}")]
	Parse(#[from] rss::Error),
}
