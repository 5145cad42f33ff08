//! Generic polling of long-running remote tasks.
//!
//! Research discovery and studio generation both start a task, then expose
//! its progress through a status RPC. [`poll`] turns a status check into a
//! stream of snapshots:
//!
//! ```text
//! check -> classify -> yield snapshot
//!   terminal phase          -> end
//!   elapsed >= max_wait     -> yield PollTimeout, end
//!   otherwise               -> sleep min(interval, max_wait - elapsed), check again
//! ```
//!
//! Status encodings differ per task kind and are supplied by the caller as a
//! [`StatusStrategy`]. Dropping the stream cancels polling.

use std::future::Future;
use std::time::Duration;

use futures_util::{Stream, StreamExt, stream};
use tokio::time::Instant;
use tracing::debug;

use crate::error::{Error, Result};

/// Where a task stands after one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
	Pending,
	InProgress,
	Completed,
	Failed,
}

impl Phase {
	pub fn is_terminal(self) -> bool {
		matches!(self, Phase::Completed | Phase::Failed)
	}
}

/// Maps a task-specific status to a [`Phase`].
pub trait StatusStrategy<T> {
	fn classify(&self, status: &T) -> Phase;
}

/// Closure-backed [`StatusStrategy`].
pub struct StatusMap<T> {
	classify: Box<dyn Fn(&T) -> Phase + Send + Sync>,
}

impl<T> StatusMap<T> {
	pub fn new(classify: impl Fn(&T) -> Phase + Send + Sync + 'static) -> Self {
		Self {
			classify: Box::new(classify),
		}
	}
}

impl<T> StatusStrategy<T> for StatusMap<T> {
	fn classify(&self, status: &T) -> Phase {
		(self.classify)(status)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
	pub interval: Duration,
	pub max_wait: Duration,
}

impl Default for PollOptions {
	fn default() -> Self {
		Self {
			interval: Duration::from_secs(30),
			max_wait: Duration::from_secs(300),
		}
	}
}

impl PollOptions {
	pub fn new(interval: Duration, max_wait: Duration) -> Self {
		Self { interval, max_wait }
	}

	/// Single check, no waiting.
	pub fn once() -> Self {
		Self::new(Duration::ZERO, Duration::ZERO)
	}

	/// A zero interval is only valid together with a zero `max_wait`.
	pub fn validate(&self) -> Result<()> {
		if self.interval.is_zero() && !self.max_wait.is_zero() {
			return Err(Error::InvalidArgument("poll interval must be greater than zero".into()));
		}
		Ok(())
	}
}

/// Result of one status check.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
	pub status: T,
	pub phase: Phase,
	/// 1-based number of the check that produced this snapshot.
	pub attempt: u32,
	pub elapsed: Duration,
}

struct PollState<F, S> {
	check: F,
	strategy: S,
	options: PollOptions,
	started: Instant,
	attempts: u32,
	waiting: bool,
	done: bool,
}

/// Polls `check` until the strategy reports a terminal phase, the check
/// fails, or `max_wait` elapses.
///
/// At most `ceil(max_wait / interval) + 1` checks are made. A failing check
/// ends the stream with its error. Options rejected by
/// [`PollOptions::validate`] yield that error without any check.
pub fn poll<T, F, Fut, S>(check: F, strategy: S, options: PollOptions) -> impl Stream<Item = Result<Snapshot<T>>>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T>>,
	S: StatusStrategy<T>,
{
	let state = PollState {
		check,
		strategy,
		options,
		started: Instant::now(),
		attempts: 0,
		waiting: false,
		done: false,
	};

	stream::unfold(state, |mut st| async move {
		if st.done {
			return None;
		}
		if let Err(err) = st.options.validate() {
			st.done = true;
			return Some((Err(err), st));
		}

		if st.waiting {
			let elapsed = st.started.elapsed();
			if elapsed >= st.options.max_wait {
				st.done = true;
				debug!(target = "nlm", attempts = st.attempts, elapsed_ms = elapsed.as_millis() as u64, "poll timed out");
				let timeout = Error::PollTimeout {
					elapsed,
					attempts: st.attempts,
				};
				return Some((Err(timeout), st));
			}
			tokio::time::sleep(st.options.interval.min(st.options.max_wait - elapsed)).await;
		}

		st.attempts += 1;
		let status = match (st.check)().await {
			Ok(status) => status,
			Err(err) => {
				st.done = true;
				return Some((Err(err), st));
			}
		};

		let phase = st.strategy.classify(&status);
		let elapsed = st.started.elapsed();
		debug!(target = "nlm", attempt = st.attempts, ?phase, elapsed_ms = elapsed.as_millis() as u64, "poll check");
		st.done = phase.is_terminal();
		st.waiting = true;

		let snapshot = Snapshot {
			status,
			phase,
			attempt: st.attempts,
			elapsed,
		};
		Some((Ok(snapshot), st))
	})
}

/// Drains a poll stream and returns the terminal snapshot.
pub async fn wait_for_terminal<T>(stream: impl Stream<Item = Result<Snapshot<T>>>) -> Result<Snapshot<T>> {
	let mut stream = std::pin::pin!(stream);
	let mut last = None;
	while let Some(item) = stream.next().await {
		last = Some(item?);
	}
	last.ok_or_else(|| Error::Protocol("poll ended without any status".into()))
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use std::sync::atomic::{AtomicU32, Ordering};

	use futures_util::TryStreamExt;

	use super::*;

	/// Check that reports `1` for the first `pending` calls, then `done`.
	fn scripted(pending: u32, done: i64) -> (Arc<AtomicU32>, impl FnMut() -> std::future::Ready<Result<i64>>) {
		let calls = Arc::new(AtomicU32::new(0));
		let counter = calls.clone();
		let check = move || {
			let n = counter.fetch_add(1, Ordering::SeqCst);
			std::future::ready(Ok(if n < pending { 1 } else { done }))
		};
		(calls, check)
	}

	fn research_like() -> StatusMap<i64> {
		StatusMap::new(|code: &i64| match code {
			1 => Phase::InProgress,
			2 => Phase::Completed,
			_ => Phase::Failed,
		})
	}

	#[tokio::test(start_paused = true)]
	async fn nine_pending_then_complete_takes_ten_checks() {
		let (calls, check) = scripted(9, 2);
		let started = Instant::now();
		let snapshots: Vec<_> = poll(check, research_like(), PollOptions::default())
			.try_collect()
			.await
			.unwrap();

		assert_eq!(calls.load(Ordering::SeqCst), 10);
		assert_eq!(snapshots.len(), 10);
		let last = snapshots.last().unwrap();
		assert_eq!(last.phase, Phase::Completed);
		assert_eq!(last.attempt, 10);
		assert_eq!(last.elapsed, Duration::from_secs(270));
		assert_eq!(started.elapsed(), Duration::from_secs(270));
	}

	#[tokio::test(start_paused = true)]
	async fn terminal_first_status_checks_once() {
		let (calls, check) = scripted(0, 7);
		let last = wait_for_terminal(poll(check, research_like(), PollOptions::default())).await.unwrap();
		assert_eq!(last.phase, Phase::Failed);
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn never_finishing_task_times_out_within_bound() {
		let (calls, check) = scripted(u32::MAX, 2);
		let err = wait_for_terminal(poll(check, research_like(), PollOptions::default()))
			.await
			.unwrap_err();

		match err {
			Error::PollTimeout { elapsed, attempts } => {
				assert_eq!(elapsed, Duration::from_secs(300));
				assert_eq!(attempts, 11);
			}
			other => panic!("expected timeout, got {other:?}"),
		}
		assert_eq!(calls.load(Ordering::SeqCst), 11);
	}

	#[tokio::test(start_paused = true)]
	async fn last_sleep_is_clamped_to_remaining_wait() {
		let (calls, check) = scripted(u32::MAX, 2);
		let options = PollOptions::new(Duration::from_secs(40), Duration::from_secs(100));
		let started = Instant::now();
		let results: Vec<_> = poll(check, research_like(), options).collect().await;

		// Checks at 0, 40, 80 and 100 seconds, then the timeout.
		assert_eq!(calls.load(Ordering::SeqCst), 4);
		assert_eq!(results.len(), 5);
		assert!(matches!(results.last(), Some(Err(Error::PollTimeout { .. }))));
		assert_eq!(started.elapsed(), Duration::from_secs(100));
	}

	#[tokio::test(start_paused = true)]
	async fn zero_wait_is_a_single_check() {
		let (calls, check) = scripted(u32::MAX, 2);
		let results: Vec<_> = poll(check, research_like(), PollOptions::once()).collect().await;
		assert_eq!(calls.load(Ordering::SeqCst), 1);
		assert!(matches!(results[0], Ok(Snapshot { phase: Phase::InProgress, .. })));
		assert!(matches!(results[1], Err(Error::PollTimeout { attempts: 1, .. })));
	}

	#[tokio::test(start_paused = true)]
	async fn zero_interval_with_wait_is_rejected_before_checking() {
		let (calls, check) = scripted(u32::MAX, 2);
		let options = PollOptions::new(Duration::ZERO, Duration::from_secs(300));
		let results: Vec<_> = poll(check, research_like(), options).collect().await;

		assert_eq!(results.len(), 1);
		assert!(matches!(results[0], Err(Error::InvalidArgument(_))));
		assert_eq!(calls.load(Ordering::SeqCst), 0);
		assert!(PollOptions::once().validate().is_ok());
	}

	#[tokio::test(start_paused = true)]
	async fn failing_check_ends_the_stream() {
		let mut n = 0;
		let check = move || {
			n += 1;
			std::future::ready(if n == 1 {
				Ok(1)
			} else {
				Err(Error::Transport("reset".into()))
			})
		};
		let results: Vec<_> = poll(check, research_like(), PollOptions::default()).collect().await;
		assert_eq!(results.len(), 2);
		assert!(matches!(results[1], Err(Error::Transport(_))));
	}

	#[tokio::test(start_paused = true)]
	async fn dropping_the_stream_stops_polling() {
		let (calls, check) = scripted(u32::MAX, 2);
		let mut stream = Box::pin(poll(check, research_like(), PollOptions::default()));
		stream.next().await.unwrap().unwrap();
		stream.next().await.unwrap().unwrap();
		drop(stream);
		tokio::time::sleep(Duration::from_secs(600)).await;
		assert_eq!(calls.load(Ordering::SeqCst), 2);
	}

	#[test]
	fn pending_is_not_terminal() {
		assert!(!Phase::Pending.is_terminal());
		assert!(!Phase::InProgress.is_terminal());
		assert!(Phase::Completed.is_terminal() && Phase::Failed.is_terminal());
	}
}
