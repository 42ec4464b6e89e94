//! Supervisors that run a check under a wall-clock deadline.
//!
//! A supervisor hands the worker a fresh [`CancelFlag`], waits for it up to the
//! deadline, sets the flag if the deadline passes first, and then waits for the
//! worker to return. Workers are never detached or killed, so once a
//! supervisor returns nothing is left running.

use std::time::Duration;

use crate::{cancel::CancelFlag, subtyping::Algorithm, ty::Type};

/// What a supervised worker returned, and whether it got there in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Supervised<T> {
    pub value: T,
    /// `false` when the deadline passed and the flag was set.
    pub completed: bool,
    /// How long the worker itself ran.
    pub elapsed: Duration,
}

impl Supervised<bool> {
    /// The verdict if it can be trusted, `None` if the check was cut short.
    ///
    /// A cancelled check only ever produces `false`, so a `true` is a real
    /// answer even when the deadline fired at the same moment.
    pub fn verdict(&self) -> Option<bool> {
        (self.completed || self.value).then_some(self.value)
    }
}

pub mod thread {
    use std::{
        panic::resume_unwind,
        sync::mpsc::{self, RecvTimeoutError},
        thread::{self, Builder},
        time::{Duration, Instant},
    };

    use tracing::{debug, warn};

    use super::Supervised;
    use crate::cancel::CancelFlag;

    /// Runs `work` on a scoped worker thread, cancelling it after `deadline`.
    ///
    /// `work` may borrow from the caller, the thread is joined before this
    /// returns. A panic in the worker is resumed on the calling thread.
    pub fn run_with_deadline<T, F>(deadline: Duration, work: F) -> Supervised<T>
    where
        T: Send,
        F: FnOnce(&CancelFlag) -> T + Send,
    {
        let cancel = CancelFlag::new();
        let (done, finished) = mpsc::channel();

        thread::scope(|scope| {
            let worker = Builder::new()
                .name("subtyping-worker".into())
                .spawn_scoped(scope, || {
                    let done = done;
                    let start = Instant::now();
                    let value = work(&cancel);
                    let elapsed = start.elapsed();
                    let _ = done.send(());
                    (value, elapsed)
                })
                .expect("spawn failed");

            let completed = match finished.recv_timeout(deadline) {
                Ok(()) => true,
                Err(RecvTimeoutError::Timeout) => {
                    cancel.cancel();
                    warn!(?deadline, "deadline passed, cancelling worker");
                    false
                }
                // the worker panicked before signalling, joining re-raises it
                Err(RecvTimeoutError::Disconnected) => true,
            };

            match worker.join() {
                Ok((value, elapsed)) => {
                    debug!(completed, ?elapsed, "worker joined");
                    Supervised { value, completed, elapsed }
                }
                Err(panic) => resume_unwind(panic),
            }
        })
    }
}

#[cfg(feature = "runtime-tokio")]
pub mod tokio {
    use std::{
        panic::resume_unwind,
        pin::pin,
        time::{Duration, Instant},
    };

    use futures::future::{select, Either};
    use tracing::{debug, warn};

    use super::Supervised;
    use crate::cancel::CancelFlag;

    /// Sets the flag when the supervising future goes away, so a worker is
    /// never left running after its caller stopped waiting.
    struct CancelOnDrop(CancelFlag);

    impl Drop for CancelOnDrop {
        fn drop(&mut self) {
            self.0.cancel();
        }
    }

    /// Runs `work` on Tokio's blocking pool, cancelling it after `deadline`.
    ///
    /// Dropping the future before it resolves cancels the worker too. The
    /// blocking task itself is then left to return on its own.
    pub async fn run_with_deadline<T, F>(deadline: Duration, work: F) -> Supervised<T>
    where
        T: Send + 'static,
        F: FnOnce(&CancelFlag) -> T + Send + 'static,
    {
        let cancel = CancelOnDrop(CancelFlag::new());
        let flag = cancel.0.clone();
        let mut worker = ::tokio::task::spawn_blocking(move || {
            let start = Instant::now();
            let value = work(&flag);
            (value, start.elapsed())
        });

        let in_time = {
            let sleep = pin!(::tokio::time::sleep(deadline));
            match select(&mut worker, sleep).await {
                Either::Left((joined, _)) => Some(joined),
                Either::Right(((), _)) => None,
            }
        };

        let (joined, completed) = match in_time {
            Some(joined) => (joined, true),
            None => {
                cancel.0.cancel();
                warn!(?deadline, "deadline passed, cancelling worker");
                (worker.await, false)
            }
        };

        match joined {
            Ok((value, elapsed)) => {
                debug!(completed, ?elapsed, "worker joined");
                Supervised { value, completed, elapsed }
            }
            Err(error) if error.is_panic() => resume_unwind(error.into_panic()),
            Err(error) => panic!("worker task failed: {error}"),
        }
    }
}

/// Convenience for the common case of one timed subtype check.
pub fn check_with_deadline(
    algorithm: Algorithm,
    left: &Type,
    right: &Type,
    deadline: Duration,
) -> Supervised<bool> {
    thread::run_with_deadline(deadline, |cancel: &CancelFlag| algorithm.subtype(left, right, cancel))
}

#[cfg(test)]
mod tests {
    use std::{hint::spin_loop, time::Duration};

    use super::{check_with_deadline, thread, Supervised};
    use crate::{
        cancel::CancelFlag,
        graph::Node,
        subtyping::{coinductive, Algorithm},
        ty::Type,
    };

    fn spin_until_cancelled(cancel: &CancelFlag) -> u32 {
        while !cancel.is_cancelled() {
            spin_loop();
        }
        7
    }

    fn looping() -> Type {
        let mut ty = Type::new();
        let root = ty.push(Node::End);
        *ty.node_mut(root) = Node::Branch { participant: 0, branches: vec![(0, root), (1, root)] };
        ty.set_root(root);
        ty
    }

    #[test]
    fn quick_work_completes() {
        let ty = looping();
        let run = thread::run_with_deadline(Duration::from_secs(10), |cancel| {
            coinductive::subtype(&ty, &ty, cancel)
        });
        assert!(run.completed);
        assert_eq!(run.verdict(), Some(true));
    }

    #[test]
    fn slow_work_is_cancelled_and_joined() {
        let run = thread::run_with_deadline(Duration::from_millis(20), spin_until_cancelled);
        assert!(!run.completed);
        assert_eq!(run.value, 7);
    }

    #[test]
    #[should_panic(expected = "boom")]
    fn worker_panics_reach_the_caller() {
        thread::run_with_deadline(Duration::from_secs(10), |_: &CancelFlag| -> u32 { panic!("boom") });
    }

    #[test]
    fn cut_short_false_is_unknown() {
        let unknown = Supervised { value: false, completed: false, elapsed: Duration::ZERO };
        assert_eq!(unknown.verdict(), None);
        let late_true = Supervised { value: true, ..unknown };
        assert_eq!(late_true.verdict(), Some(true));
        let refuted = Supervised { completed: true, ..unknown };
        assert_eq!(refuted.verdict(), Some(false));
    }

    #[test]
    fn check_with_deadline_runs_the_algorithm() {
        let ty = looping();
        for algorithm in Algorithm::ALL {
            let run = check_with_deadline(algorithm, &ty, &ty, Duration::from_secs(10));
            assert_eq!(run.verdict(), Some(true), "{algorithm}");
        }
    }

    #[cfg(feature = "runtime-tokio")]
    #[::tokio::test]
    async fn async_supervisor_completes() {
        let ty = looping();
        let run = super::tokio::run_with_deadline(Duration::from_secs(10), move |cancel| {
            coinductive::subtype(&ty, &ty, cancel)
        })
        .await;
        assert_eq!(run.verdict(), Some(true));
    }

    #[cfg(feature = "runtime-tokio")]
    #[::tokio::test]
    async fn async_supervisor_cancels_on_deadline() {
        let run =
            super::tokio::run_with_deadline(Duration::from_millis(20), spin_until_cancelled).await;
        assert!(!run.completed);
        assert_eq!(run.value, 7);
    }

    #[cfg(feature = "runtime-tokio")]
    #[::tokio::test]
    async fn dropping_the_async_supervisor_cancels_its_worker() {
        let (observed, cancelled) = ::tokio::sync::oneshot::channel();
        let supervised = super::tokio::run_with_deadline(Duration::from_secs(3600), move |cancel| {
            spin_until_cancelled(cancel);
            let _ = observed.send(());
        });

        let outcome = ::tokio::time::timeout(Duration::from_millis(50), supervised).await;
        assert!(outcome.is_err(), "the worker only returns once cancelled");

        let seen = ::tokio::time::timeout(Duration::from_secs(5), cancelled).await;
        assert!(matches!(seen, Ok(Ok(()))), "worker kept running after the drop");
    }
}
