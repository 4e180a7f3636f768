mod common;

use std::time::Duration;

use gator::{
	database::Database,
	fetcher::Fetcher,
	ingest::{ItemOutcome, SkipReason},
	scheduler::{CycleOutcome, FailurePolicy, Scheduler, SchedulerConfig},
};
use wiremock::{
	Mock, MockServer, ResponseTemplate,
	matchers::{method, path},
};

use crate::common::{TestState, rss};

async fn serve(server: &MockServer, at: &str, body: String) {
	Mock::given(method("GET"))
		.and(path(at))
		.respond_with(ResponseTemplate::new(200).set_body_string(body))
		.mount(server)
		.await;
}

fn scheduler(db: &Database, config: SchedulerConfig) -> Scheduler {
	Scheduler::new(db.clone(), Fetcher::new().unwrap(), config)
}

#[tokio::test]
async fn followed_feed_is_ingested_and_browsable() {
	let server = MockServer::start().await;
	let body = rss(&[
		("Oldest", "https://example.com/1", "Mon, 02 Jan 2006 15:04:05 -0700"),
		("Newest", "https://example.com/3", "Wed, 04 Jan 2006 15:04:05 -0700"),
		("Middle &amp;amp; more", "https://example.com/2", "03 Jan 06 15:04 MST"),
	]);
	serve(&server, "/feed.xml", body).await;

	let mut test = TestState::new();
	test.run("register alice").await.unwrap();
	test.run(&format!("addfeed blog {}/feed.xml", server.uri()))
		.await
		.unwrap();

	let outcome = scheduler(&test.state.db, SchedulerConfig::default())
		.cycle()
		.await;
	let (feed, report) = match outcome {
		CycleOutcome::Ingested { feed, report } => (feed, report),
		other => panic!("expected the feed to be ingested, got {other:?}"),
	};
	assert_eq!(feed.name, "blog");
	assert_eq!(report.saved(), 3);

	let alice = test.state.db.get_user("alice").unwrap().unwrap();
	let posts = test.state.db.get_posts_for_user(alice.id, 2).unwrap();
	let titles = posts
		.iter()
		.map(|post| post.post.title.as_str())
		.collect::<Vec<_>>();
	assert_eq!(titles, ["Newest", "Middle & more"]);
	assert!(posts.iter().all(|post| post.feed_name == "blog"));

	test.run("browse").await.unwrap();
	test.run("browse 10").await.unwrap();

	let feed = test.state.db.get_feed_by_url(&feed.url.parse().unwrap()).unwrap().unwrap();
	assert!(feed.last_fetched_at.is_some());
}

#[tokio::test]
async fn second_cycle_only_finds_duplicates() {
	let server = MockServer::start().await;
	let body = rss(&[
		("One", "https://example.com/1", "Mon, 02 Jan 2006 15:04:05 -0700"),
		("Two", "https://example.com/2", "Tue, 03 Jan 2006 15:04:05 -0700"),
		("Broken", "https://example.com/3", "someday"),
	]);
	serve(&server, "/feed.xml", body).await;

	let mut test = TestState::new();
	test.run("register alice").await.unwrap();
	test.run(&format!("addfeed blog {}/feed.xml", server.uri()))
		.await
		.unwrap();

	let scheduler = scheduler(&test.state.db, SchedulerConfig::default());

	let CycleOutcome::Ingested { report, .. } = scheduler.cycle().await else {
		panic!("first cycle failed");
	};
	assert_eq!(report.saved(), 2);
	assert_eq!(
		report.outcomes[2],
		ItemOutcome::Skipped(SkipReason::InvalidDate("someday".into()))
	);

	let CycleOutcome::Ingested { report, .. } = scheduler.cycle().await else {
		panic!("second cycle failed");
	};
	assert_eq!(report.saved(), 0);
	assert_eq!(report.duplicates(), 2);
}

#[tokio::test]
async fn feeds_are_visited_round_robin() {
	let server = MockServer::start().await;
	for name in ["a", "b", "c"] {
		let link = format!("https://example.com/{name}");
		let body = rss(&[(name, link.as_str(), "02 Jan 06 15:04 UT")]);
		serve(&server, &format!("/{name}.xml"), body).await;
	}

	let mut test = TestState::new();
	test.run("register alice").await.unwrap();
	for name in ["a", "b", "c"] {
		test.run(&format!("addfeed {name} {}/{name}.xml", server.uri()))
			.await
			.unwrap();
	}

	let scheduler = scheduler(&test.state.db, SchedulerConfig::default());
	let mut visited = Vec::new();
	for _ in 0..6 {
		match scheduler.cycle().await {
			CycleOutcome::Ingested { feed, .. } => visited.push(feed.name),
			other => panic!("unexpected outcome {other:?}"),
		}
		// keep fetch timestamps distinct
		tokio::time::sleep(Duration::from_millis(5)).await;
	}

	assert_eq!(visited, ["a", "b", "c", "a", "b", "c"]);
}

#[tokio::test]
async fn failing_feed_does_not_stop_polling() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/broken.xml"))
		.respond_with(ResponseTemplate::new(500))
		.mount(&server)
		.await;
	serve(
		&server,
		"/feed.xml",
		rss(&[("Hello", "https://example.com/hello", "02 Jan 06 15:04 UT")]),
	)
	.await;

	let mut test = TestState::new();
	test.run("register alice").await.unwrap();
	test.run(&format!("addfeed broken {}/broken.xml", server.uri()))
		.await
		.unwrap();
	test.run(&format!("addfeed working {}/feed.xml", server.uri()))
		.await
		.unwrap();

	let db = test.state.db.clone();
	let alice = db.get_user("alice").unwrap().unwrap().id;
	let config = SchedulerConfig {
		interval: Duration::from_millis(20),
		failure_policy: FailurePolicy::Continue,
		..SchedulerConfig::default()
	};

	let posts_arrived = {
		let db = db.clone();
		async move {
			while db.get_posts_for_user(alice, 10).unwrap().is_empty() {
				tokio::time::sleep(Duration::from_millis(10)).await;
			}
		}
	};

	tokio::time::timeout(Duration::from_secs(10), scheduler(&db, config).run(posts_arrived))
		.await
		.expect("scheduler never ingested the working feed")
		.unwrap();

	let posts = db.get_posts_for_user(alice, 10).unwrap();
	assert_eq!(posts.len(), 1);
	assert_eq!(posts[0].feed_name, "working");
}
