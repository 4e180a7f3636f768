use std::{io::BufRead, time::Duration};

use bytes::Buf;
use eyre::WrapErr;
use reqwest::Client;
use rss::Channel;
use url::Url;

mod entities;
mod error;

pub use self::entities::unescape;
pub use self::error::{FetchError, Result};

pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A parsed channel, text fields already HTML-unescaped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFeed {
	pub title: String,
	pub link: String,
	pub description: String,
	pub items: Vec<RawItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
	pub title: String,
	pub link: String,
	pub description: String,
	/// Kept exactly as found in `<pubDate>`, see [`crate::ingest::parse_pub_date`]
	pub pub_date: String,
}

#[derive(Debug, Clone)]
pub struct Fetcher {
	client: Client,
}

impl Fetcher {
	pub fn new() -> eyre::Result<Self> {
		Self::with_timeout(DEFAULT_TIMEOUT)
	}

	pub fn with_timeout(timeout: Duration) -> eyre::Result<Self> {
		let client = Client::builder()
			.user_agent(USER_AGENT)
			.timeout(timeout)
			.build()
			.wrap_err("could not build client")?;

		Ok(Self { client })
	}

	/// Issue a single GET and parse the body as an RSS 2.0 channel.
	pub async fn fetch(&self, url: &str) -> Result<RawFeed> {
		let url = validate_url(url)?;

		let body = self
			.client
			.get(url.clone())
			.send()
			.await?
			.error_for_status()?
			.bytes()
			.await?;

		let feed = parse_feed(body.reader())?;

		tracing::debug!(url = %url, items = feed.items.len(), "successfully fetched feed");

		Ok(feed)
	}
}

/// Only absolute `http` and `https` urls are fetched
pub fn validate_url(url: &str) -> Result<Url> {
	let parsed = Url::parse(url).map_err(|err| FetchError::InvalidUrl(format!("{url:?}: {err}")))?;

	match parsed.scheme() {
		"http" | "https" => Ok(parsed),
		scheme => Err(FetchError::InvalidUrl(format!(
			"{url:?}: unsupported scheme {scheme}"
		))),
	}
}

pub fn parse_feed<R: BufRead>(reader: R) -> Result<RawFeed> {
	let channel = Channel::read_from(reader)?;

	let items = channel
		.items()
		.iter()
		.map(|item| RawItem {
			title: unescape(item.title().unwrap_or_default()).into_owned(),
			link: item.link().unwrap_or_default().to_owned(),
			description: unescape(item.description().unwrap_or_default()).into_owned(),
			pub_date: item.pub_date().unwrap_or_default().to_owned(),
		})
		.collect();

	Ok(RawFeed {
		title: unescape(channel.title()).into_owned(),
		link: channel.link().to_owned(),
		description: unescape(channel.description()).into_owned(),
		items,
	})
}

#[cfg(test)]
mod tests {
	use wiremock::{
		Mock, MockServer, ResponseTemplate,
		matchers::{header, method, path},
	};

	use super::*;

	const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
<channel>
	<title>Foo &amp;amp; Bar</title>
	<link>https://example.com/</link>
	<description>Posts about &lt;b&gt;things&lt;/b&gt;</description>
	<item>
		<title>First &amp;#8217;post</title>
		<link>https://example.com/first</link>
		<description><![CDATA[<p>Fish &amp; chips</p>]]></description>
		<pubDate>Mon, 02 Jan 2006 15:04:05 -0700</pubDate>
	</item>
	<item>
		<title>Second</title>
		<link>https://example.com/second?a=1&amp;b=2</link>
	</item>
</channel>
</rss>"#;

	#[test]
	fn parses_channel_and_items() {
		let feed = parse_feed(FEED.as_bytes()).unwrap();

		assert_eq!(feed.title, "Foo & Bar");
		assert_eq!(feed.link, "https://example.com/");
		assert_eq!(feed.description, "Posts about <b>things</b>");
		assert_eq!(feed.items.len(), 2);

		let first = &feed.items[0];
		assert_eq!(first.title, "First ’post");
		assert_eq!(first.link, "https://example.com/first");
		assert_eq!(first.description, "<p>Fish & chips</p>");
		assert_eq!(first.pub_date, "Mon, 02 Jan 2006 15:04:05 -0700");

		let second = &feed.items[1];
		assert_eq!(second.link, "https://example.com/second?a=1&b=2");
		assert_eq!(second.description, "");
		assert_eq!(second.pub_date, "");
	}

	#[test]
	fn singly_escaped_title() {
		let xml = "<rss version=\"2.0\"><channel><title>Foo &amp; Bar</title>\
			<link>https://example.com/</link><description></description></channel></rss>";
		let feed = parse_feed(xml.as_bytes()).unwrap();
		assert_eq!(feed.title, "Foo & Bar");
		assert!(feed.items.is_empty());
	}

	#[test]
	fn rejects_non_rss_documents() {
		let err = parse_feed("this is not xml".as_bytes()).unwrap_err();
		assert!(matches!(err, FetchError::Parse(_)));

		let err = parse_feed("<html><body>nope</body></html>".as_bytes()).unwrap_err();
		assert!(matches!(err, FetchError::Parse(_)));
	}

	#[test]
	fn validates_urls() {
		assert!(validate_url("https://example.com/feed.xml").is_ok());
		assert!(validate_url("http://localhost:8080/rss").is_ok());

		assert!(matches!(
			validate_url("ftp://example.com/feed.xml"),
			Err(FetchError::InvalidUrl(_))
		));
		assert!(matches!(
			validate_url("example.com/feed.xml"),
			Err(FetchError::InvalidUrl(_))
		));
		assert!(matches!(validate_url(""), Err(FetchError::InvalidUrl(_))));
	}

	#[tokio::test]
	async fn fetches_over_http() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/feed.xml"))
			.and(header("user-agent", USER_AGENT))
			.respond_with(ResponseTemplate::new(200).set_body_string(FEED))
			.expect(1)
			.mount(&server)
			.await;

		let fetcher = Fetcher::new().unwrap();
		let feed = fetcher
			.fetch(&format!("{}/feed.xml", server.uri()))
			.await
			.unwrap();

		assert_eq!(feed.title, "Foo & Bar");
		assert_eq!(feed.items.len(), 2);
	}

	#[tokio::test]
	async fn error_status_is_a_request_error() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.respond_with(ResponseTemplate::new(404))
			.mount(&server)
			.await;

		let fetcher = Fetcher::new().unwrap();
		let err = fetcher
			.fetch(&format!("{}/missing.xml", server.uri()))
			.await
			.unwrap_err();

		assert!(matches!(err, FetchError::Request(_)));
	}

	#[tokio::test]
	async fn invalid_url_is_not_requested() {
		let fetcher = Fetcher::new().unwrap();
		let err = fetcher.fetch("file:///etc/passwd").await.unwrap_err();
		assert!(matches!(err, FetchError::InvalidUrl(_)));
	}
}
