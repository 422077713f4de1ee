//! # Gate: admission exchange and job submission.
//!
//! A [`Gate`] guards a closable resource. Callers run short jobs through it; once the
//! shutdown token fires, no new job is admitted, every admitted job finishes, and
//! only then does the closer release the resource.
//!
//! ## Admission exchange
//! ```text
//! submit() ── oneshot::Sender<Permit> ──► [request queue] ──► controller loop
//!    ▲                                      (mpsc, backlog)        │
//!    └──────────────── Permit (counted in tracker) ◄───────────────┘
//!
//! shutdown: controller closes + drops the queue
//!   ├─ queued requests are dropped  → waiting callers get GateError::Closed
//!   └─ later send() fails           → new callers get GateError::Closed
//! ```
//!
//! The controller serves requests one at a time, so issuing a permit and closing the
//! queue never interleave: after the close no permit is issued.
//!
//! ## Job protocol
//! acquire → run work → release. The permit is a drop guard, so release happens on
//! every exit path. Work output is returned untouched.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use tokio::sync::{Mutex, broadcast, mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::closers::CloserRef;
use crate::error::GateError;
use crate::events::{Bus, Event, EventKind};

use super::builder::GateBuilder;
use super::config::GateConfig;
use super::permit::Permit;
use super::tracker::PendingTracker;

/// A caller waiting for the handoff; the controller answers with a permit.
pub(crate) type Request = oneshot::Sender<Permit>;

/// Parts consumed by the single controller run.
pub(crate) struct Inbox {
    pub(crate) requests: mpsc::Receiver<Request>,
    pub(crate) closer: Option<CloserRef>,
}

/// Lifecycle state of a gate.
///
/// ```text
/// Open ──(shutdown token fired)──► Draining ──(tracker at zero, closer ran)──► Closed
/// ```
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Admitting jobs (also before the controller starts).
    Open = 0,
    /// Admission closed; waiting for admitted jobs to finish.
    Draining = 1,
    /// Closer has run. Terminal.
    Closed = 2,
}

impl GateState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => GateState::Open,
            1 => GateState::Draining,
            _ => GateState::Closed,
        }
    }
}

/// Admission gate protecting a closable resource.
///
/// Share it as `Arc<Gate>`: one task runs [`Gate::run`], any number of tasks submit.
///
/// ## Example
/// ```rust
/// use drainkeeper::{CloseError, CloserFn, Gate, GateError};
/// use tokio_util::sync::CancellationToken;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let gate = Gate::with_closer(CloserFn::boxed("resource", || async {
///         Ok::<(), CloseError>(())
///     }));
///     let token = CancellationToken::new();
///
///     let controller = tokio::spawn({
///         let gate = gate.clone();
///         let token = token.clone();
///         async move { gate.run(token).await }
///     });
///
///     let sum = gate.submit(|| async { 2 + 2 }).await;
///     assert_eq!(sum, Ok(4));
///
///     token.cancel();
///     controller.await.unwrap().unwrap();
///     assert_eq!(gate.submit(|| async { 0 }).await, Err(GateError::Closed));
/// }
/// ```
pub struct Gate {
    pub(crate) cfg: GateConfig,
    pub(crate) bus: Bus,
    pub(crate) requests: mpsc::Sender<Request>,
    pub(crate) inbox: Mutex<Option<Inbox>>,
    pub(crate) tracker: Arc<PendingTracker>,
    state: AtomicU8,
}

impl Gate {
    /// Creates a gate without a closer and with default configuration.
    ///
    /// The controller is not started; call [`Gate::run`].
    pub fn new() -> Arc<Self> {
        Self::builder(GateConfig::default()).build()
    }

    /// Creates a gate that calls `closer` once draining completes.
    pub fn with_closer(closer: CloserRef) -> Arc<Self> {
        Self::builder(GateConfig::default())
            .with_closer(closer)
            .build()
    }

    /// Returns a builder for a configured gate (closer, subscribers).
    pub fn builder(cfg: GateConfig) -> GateBuilder {
        GateBuilder::new(cfg)
    }

    pub(crate) fn new_internal(cfg: GateConfig, bus: Bus, closer: Option<CloserRef>) -> Self {
        let (tx, rx) = mpsc::channel(cfg.backlog_clamped());
        Self {
            cfg,
            bus,
            requests: tx,
            inbox: Mutex::new(Some(Inbox {
                requests: rx,
                closer,
            })),
            tracker: Arc::new(PendingTracker::new()),
            state: AtomicU8::new(GateState::Open as u8),
        }
    }

    /// Waits for a permit from the controller.
    ///
    /// Suspends until the controller hands over a permit or admission closes.
    /// Hold the permit for as long as the resource is in use; dropping it releases it.
    ///
    /// ### Errors
    /// [`GateError::Closed`] if admission is (or becomes) closed before a permit is issued.
    pub async fn acquire(&self) -> Result<Permit, GateError> {
        let (reply, permit) = oneshot::channel();
        self.requests
            .send(reply)
            .await
            .map_err(|_| GateError::Closed)?;
        permit.await.map_err(|_| GateError::Closed)
    }

    /// Runs `work` as an admitted job.
    ///
    /// `work` is not called when admission is closed. Its output (including any
    /// `Result` it returns) is passed back untouched. The permit is released after
    /// `work` completes, panics, or this future is dropped.
    pub async fn submit<F, Fut>(&self, work: F) -> Result<Fut::Output, GateError>
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        let permit = self.acquire().await?;
        let out = work().await;
        drop(permit);
        Ok(out)
    }

    /// Runs `work` as an admitted job, handing it the shared shutdown token.
    ///
    /// The job stays counted as in flight until `work` returns, even after the token
    /// fires: observing cancellation and stopping early is up to `work`.
    pub async fn submit_with_token<F, Fut>(&self, work: F) -> Result<Fut::Output, GateError>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future,
    {
        let permit = self.acquire().await?;
        let out = work(permit.token().clone()).await;
        drop(permit);
        Ok(out)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> GateState {
        GateState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Snapshot of admitted jobs that have not released their permit yet.
    pub fn in_flight(&self) -> usize {
        self.tracker.jobs()
    }

    /// Returns `true` once admission is closed.
    pub fn is_closed(&self) -> bool {
        self.requests.is_closed()
    }

    /// Gate name from the configuration.
    pub fn name(&self) -> &str {
        &self.cfg.name
    }

    /// Creates a receiver of this gate's lifecycle events.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    pub(crate) fn set_state(&self, state: GateState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub(crate) fn event(&self, kind: EventKind) -> Event {
        Event::new(kind).with_gate(self.name())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use tokio::task::JoinHandle;

    use super::*;

    fn start(gate: &Arc<Gate>, token: &CancellationToken) -> JoinHandle<Result<(), GateError>> {
        let gate = Arc::clone(gate);
        let token = token.clone();
        tokio::spawn(async move { gate.run(token).await })
    }

    #[tokio::test]
    async fn test_submit_returns_work_output() {
        let gate = Gate::new();
        let token = CancellationToken::new();
        let ctl = start(&gate, &token);

        assert_eq!(gate.submit(|| async { "done" }).await, Ok("done"));

        token.cancel();
        ctl.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_work_error_is_propagated_verbatim() {
        let gate = Gate::new();
        let token = CancellationToken::new();
        let ctl = start(&gate, &token);

        let res = gate
            .submit(|| async { Err::<(), _>(std::io::Error::other("disk full")) })
            .await
            .expect("admitted");
        assert_eq!(res.unwrap_err().to_string(), "disk full");

        token.cancel();
        ctl.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_rejected_work_is_never_called() {
        let gate = Gate::new();
        let token = CancellationToken::new();
        let ctl = start(&gate, &token);
        token.cancel();
        ctl.await.unwrap().unwrap();

        let calls = AtomicUsize::new(0);
        let res = gate
            .submit(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
            })
            .await;
        assert_eq!(res, Err(GateError::Closed));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(gate.is_closed());
    }

    #[tokio::test]
    async fn test_waiting_caller_is_rejected_on_close() {
        // No controller yet: the caller queues and waits for the handoff.
        let gate = Gate::new();
        let waiting = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.submit(|| async {}).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiting.is_finished());

        let token = CancellationToken::new();
        token.cancel();
        gate.run(token).await.unwrap();

        assert_eq!(waiting.await.unwrap(), Err(GateError::Closed));
    }

    #[tokio::test]
    async fn test_token_is_the_shutdown_token() {
        let gate = Gate::new();
        let token = CancellationToken::new();
        let ctl = start(&gate, &token);

        let seen = gate
            .submit_with_token(|ctx| async move { ctx.is_cancelled() })
            .await;
        assert_eq!(seen, Ok(false));

        let job = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move {
                gate.submit_with_token(|ctx| async move {
                    ctx.cancelled().await;
                    "observed"
                })
                .await
            })
        };
        while gate.in_flight() == 0 {
            tokio::task::yield_now().await;
        }

        token.cancel();
        assert_eq!(job.await.unwrap(), Ok("observed"));
        ctl.await.unwrap().unwrap();
    }

    async fn explode() {
        panic!("work blew up");
    }

    #[tokio::test]
    async fn test_permit_released_when_work_panics() {
        let gate = Gate::new();
        let token = CancellationToken::new();
        let ctl = start(&gate, &token);

        let job = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move {
                gate.submit(explode).await
            })
        };
        assert!(job.await.unwrap_err().is_panic());
        assert_eq!(gate.in_flight(), 0);

        token.cancel();
        tokio::time::timeout(Duration::from_secs(5), ctl)
            .await
            .expect("drained despite panic")
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_dropped_submission_releases_permit() {
        let gate = Gate::new();
        let token = CancellationToken::new();
        let ctl = start(&gate, &token);

        let job = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.submit(std::future::pending::<()>).await })
        };
        while gate.in_flight() == 0 {
            tokio::task::yield_now().await;
        }
        job.abort();
        let _ = job.await;
        assert_eq!(gate.in_flight(), 0);

        token.cancel();
        tokio::time::timeout(Duration::from_secs(5), ctl)
            .await
            .expect("drained after abort")
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_held_permit_counts_in_flight() {
        let gate = Gate::new();
        let token = CancellationToken::new();
        let ctl = start(&gate, &token);

        let a = gate.acquire().await.unwrap();
        let b = gate.acquire().await.unwrap();
        assert_eq!(gate.in_flight(), 2);
        drop(a);
        assert_eq!(gate.in_flight(), 1);
        drop(b);
        assert_eq!(gate.in_flight(), 0);

        token.cancel();
        ctl.await.unwrap().unwrap();
    }

    #[test]
    fn test_state_round_trips_through_u8() {
        for s in [GateState::Open, GateState::Draining, GateState::Closed] {
            assert_eq!(GateState::from_u8(s as u8), s);
        }
    }
}
