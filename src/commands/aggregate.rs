use std::time::Duration;

use async_trait::async_trait;
use tokio::signal;

use super::{Handler, optional_arg, positive};
use crate::{
	config::State,
	error::Result,
	scheduler::{DEFAULT_INTERVAL, Scheduler, SchedulerConfig},
};

/// `agg [interval_secs]`, polls feeds until interrupted
#[derive(Debug, Clone, Copy)]
pub struct Aggregate;

#[async_trait]
impl Handler for Aggregate {
	async fn run(&self, state: &mut State, args: &[String]) -> Result<()> {
		let interval = match optional_arg(args, "agg [interval_secs]")? {
			Some(raw) => Duration::from_secs(positive::<u64>(raw, "interval")?),
			None => state.config.poll_interval().unwrap_or(DEFAULT_INTERVAL),
		};

		let config = SchedulerConfig {
			interval,
			..SchedulerConfig::default()
		};
		let scheduler = Scheduler::new(state.db.clone(), state.fetcher.clone(), config);

		println!("Collecting feeds every {}s", interval.as_secs());
		scheduler.run(shutdown_signal()).await
	}
}

/// Resolves on Ctrl+C or, on unix, SIGTERM
pub async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(err) = signal::ctrl_c().await {
			tracing::error!(err = %err, "failed to install Ctrl+C handler");
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut terminate) => {
				terminate.recv().await;
			}
			Err(err) => {
				tracing::error!(err = %err, "failed to install signal handler");
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		() = ctrl_c => {},
		() = terminate => {},
	}

	tracing::info!("received shutdown signal");
}
