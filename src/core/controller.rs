//! # Lifecycle controller: the single loop that owns a gate's state.
//!
//! ## State machine
//! ```text
//! Open ── shutdown token fired ──► Draining ── tracker reaches zero ──► Closed
//!  │                                  │                                   │
//!  │ serve request:                   │ close + drop request queue        │ closer runs once
//!  │   issue Permit (tracker += 1)    │ release controller unit           │ publish GateClosed
//!  │   hand it to the caller          │ wait for tracker == 0             │ return
//! ```
//!
//! ## Rules
//! - Exactly one `run` per gate; the inbox is taken once, later calls get `AlreadyRunning`.
//! - The loop is `biased` towards the shutdown token: once it has fired, no request is served.
//! - A closer failure is reported as `CloserFailed` and otherwise discarded; the gate still ends `Closed`.
//! - No timeout: if the token never fires, `run` never returns.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::closers::CloserRef;
use crate::error::GateError;
use crate::events::EventKind;

use super::gate::{Gate, GateState, Inbox, Request};
use super::permit::Permit;
use super::shutdown;

impl Gate {
    /// Runs the lifecycle controller until the gate is closed.
    ///
    /// Offers permits until `shutdown` fires, then closes admission, waits for every
    /// admitted job to release its permit, and calls the closer. Run it on its own task.
    ///
    /// ### Errors
    /// [`GateError::AlreadyRunning`] if the controller of this gate was already started.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<(), GateError> {
        let Inbox {
            mut requests,
            closer,
        } = self
            .inbox
            .lock()
            .await
            .take()
            .ok_or(GateError::AlreadyRunning)?;

        self.bus.publish(self.event(EventKind::ControllerStarted));
        let issued = self.offer(&mut requests, &shutdown).await;

        // Open → Draining
        requests.close();
        drop(requests);
        self.set_state(GateState::Draining);
        self.bus.publish(
            self.event(EventKind::ShutdownRequested)
                .with_issued(issued)
                .with_in_flight(self.tracker.jobs() as u64),
        );

        let started = Instant::now();
        self.tracker.release_unit();
        self.tracker.drained().await;
        self.bus.publish(
            self.event(EventKind::Drained)
                .with_issued(issued)
                .with_drain(started.elapsed()),
        );

        // Draining → Closed
        let closer_name = self.close(closer).await;
        self.set_state(GateState::Closed);

        let mut ev = self.event(EventKind::GateClosed);
        if let Some(name) = closer_name {
            ev = ev.with_reason(name);
        }
        self.bus.publish(ev);
        Ok(())
    }

    /// Runs the controller with OS termination signals as the shutdown source.
    ///
    /// If the signal listeners cannot be installed, the gate is shut down right away
    /// and [`GateError::Signal`] is returned once it is closed.
    pub async fn run_until_signal(&self) -> Result<(), GateError> {
        let token = CancellationToken::new();
        let run = self.run(token.clone());
        tokio::pin!(run);

        let signal = tokio::select! {
            res = &mut run => return res,
            sig = shutdown::wait_for_shutdown_signal() => sig,
        };
        token.cancel();
        run.await?;
        signal.map_err(|e| GateError::Signal {
            error: e.to_string(),
        })
    }

    /// Serves admission requests until `shutdown` fires; returns the number of permits issued.
    async fn offer(
        &self,
        requests: &mut mpsc::Receiver<Request>,
        shutdown: &CancellationToken,
    ) -> u64 {
        let mut issued = 0u64;
        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => return issued,

                Some(reply) = requests.recv() => {
                    let permit = Permit::issue(Arc::clone(&self.tracker), shutdown.clone());
                    // Caller gone: the permit comes back and its drop releases it.
                    if reply.send(permit).is_ok() {
                        issued += 1;
                    }
                }
            }
        }
    }

    /// Calls the closer, if any; returns its name.
    async fn close(&self, closer: Option<CloserRef>) -> Option<String> {
        let mut closer = closer?;
        if let Err(e) = closer.close().await {
            self.bus.publish(
                self.event(EventKind::CloserFailed)
                    .with_reason(e.to_string()),
            );
        }
        Some(closer.name().to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::sync::broadcast;

    use super::*;
    use crate::{CloseError, CloserFn, Event, GateConfig};

    async fn next_kind(rx: &mut broadcast::Receiver<Event>) -> EventKind {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("event in time")
            .expect("bus open")
            .kind
    }

    #[tokio::test]
    async fn test_no_closer_immediate_shutdown() {
        let gate = Gate::new();
        let token = CancellationToken::new();
        token.cancel();

        gate.run(token).await.unwrap();
        assert_eq!(gate.state(), GateState::Closed);
        assert_eq!(gate.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_second_run_is_rejected() {
        let gate = Gate::new();
        let token = CancellationToken::new();
        token.cancel();

        gate.run(token.clone()).await.unwrap();
        assert_eq!(gate.run(token).await, Err(GateError::AlreadyRunning));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_closer_runs_once_after_jobs_finish() {
        let log = Arc::new(Mutex::new(Vec::<&'static str>::new()));
        let closes = Arc::new(AtomicUsize::new(0));

        let closer = {
            let log = Arc::clone(&log);
            let closes = Arc::clone(&closes);
            CloserFn::boxed("log", move || async move {
                closes.fetch_add(1, Ordering::SeqCst);
                log.lock().unwrap().push("close");
                Ok::<(), CloseError>(())
            })
        };
        let gate = Gate::with_closer(closer);
        let token = CancellationToken::new();
        let ctl = {
            let gate = Arc::clone(&gate);
            let token = token.clone();
            tokio::spawn(async move { gate.run(token).await })
        };

        let mut jobs = Vec::new();
        for _ in 0..16 {
            let gate = Arc::clone(&gate);
            let log = Arc::clone(&log);
            jobs.push(tokio::spawn(async move {
                gate.submit_with_token(|ctx| async move {
                    ctx.cancelled().await;
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    log.lock().unwrap().push("job");
                })
                .await
            }));
        }
        while gate.in_flight() < 16 {
            tokio::task::yield_now().await;
        }

        token.cancel();
        for j in jobs {
            assert_eq!(j.await.unwrap(), Ok(()));
        }
        ctl.await.unwrap().unwrap();

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 17);
        assert_eq!(log.last(), Some(&"close"));
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_state_transitions() {
        let gate = Gate::new();
        let token = CancellationToken::new();
        assert_eq!(gate.state(), GateState::Open);

        let ctl = {
            let gate = Arc::clone(&gate);
            let token = token.clone();
            tokio::spawn(async move { gate.run(token).await })
        };
        let permit = gate.acquire().await.unwrap();

        token.cancel();
        while gate.state() == GateState::Open {
            tokio::task::yield_now().await;
        }
        assert_eq!(gate.state(), GateState::Draining);
        assert!(gate.is_closed());
        assert_eq!(gate.in_flight(), 1);
        assert_eq!(gate.acquire().await.unwrap_err(), GateError::Closed);

        drop(permit);
        ctl.await.unwrap().unwrap();
        assert_eq!(gate.state(), GateState::Closed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_in_flight_never_counts_controller_unit() {
        let gate = Gate::new();
        let token = CancellationToken::new();
        let ctl = {
            let gate = Arc::clone(&gate);
            let token = token.clone();
            tokio::spawn(async move { gate.run(token).await })
        };
        let permit = gate.acquire().await.unwrap();

        let watcher = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move {
                let mut max = 0;
                while gate.state() != GateState::Closed {
                    max = max.max(gate.in_flight());
                    tokio::task::yield_now().await;
                }
                max
            })
        };

        token.cancel();
        while gate.state() == GateState::Open {
            tokio::task::yield_now().await;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(permit);

        ctl.await.unwrap().unwrap();
        assert_eq!(watcher.await.unwrap(), 1);
        assert_eq!(gate.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_lifecycle_events_in_order() {
        let gate = Gate::builder(GateConfig::named("storage"))
            .with_closer(CloserFn::boxed("queue", || async {
                Ok::<(), CloseError>(())
            }))
            .build();
        let mut rx = gate.events();
        let token = CancellationToken::new();
        let ctl = {
            let gate = Arc::clone(&gate);
            let token = token.clone();
            tokio::spawn(async move { gate.run(token).await })
        };

        assert_eq!(next_kind(&mut rx).await, EventKind::ControllerStarted);
        gate.submit(|| async {}).await.unwrap();
        gate.submit(|| async {}).await.unwrap();
        token.cancel();
        ctl.await.unwrap().unwrap();

        let shutdown = rx.recv().await.unwrap();
        assert_eq!(shutdown.kind, EventKind::ShutdownRequested);
        assert_eq!(shutdown.gate.as_deref(), Some("storage"));
        assert_eq!(shutdown.issued, Some(2));
        assert_eq!(shutdown.in_flight, Some(0));

        let drained = rx.recv().await.unwrap();
        assert_eq!(drained.kind, EventKind::Drained);
        assert_eq!(drained.issued, Some(2));
        assert!(drained.drain_ms.is_some());

        let closed = rx.recv().await.unwrap();
        assert_eq!(closed.kind, EventKind::GateClosed);
        assert_eq!(closed.reason.as_deref(), Some("queue"));
    }

    #[tokio::test]
    async fn test_closer_failure_is_reported_not_returned() {
        let gate = Gate::with_closer(CloserFn::boxed("flaky", || async {
            Err(CloseError::failed("fsync failed"))
        }));
        let mut rx = gate.events();
        let token = CancellationToken::new();
        token.cancel();

        assert_eq!(gate.run(token).await, Ok(()));
        assert_eq!(gate.state(), GateState::Closed);

        let kinds: Vec<EventKind> =
            std::iter::from_fn(|| rx.try_recv().ok().map(|e| e.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::ControllerStarted,
                EventKind::ShutdownRequested,
                EventKind::Drained,
                EventKind::CloserFailed,
                EventKind::GateClosed,
            ]
        );
    }

    #[tokio::test]
    async fn test_no_permit_after_cancel_even_with_queued_callers() {
        let gate = Gate::new();
        let mut waiting = Vec::new();
        for _ in 0..32 {
            let gate = Arc::clone(&gate);
            waiting.push(tokio::spawn(async move { gate.submit(|| async {}).await }));
        }
        tokio::time::sleep(Duration::from_millis(20)).await;

        let mut rx = gate.events();
        let token = CancellationToken::new();
        token.cancel();
        gate.run(token).await.unwrap();

        for w in waiting {
            assert_eq!(w.await.unwrap(), Err(GateError::Closed));
        }
        let issued: Vec<Option<u64>> = std::iter::from_fn(|| rx.try_recv().ok())
            .filter(|e| e.kind == EventKind::Drained)
            .map(|e| e.issued)
            .collect();
        assert_eq!(issued, vec![Some(0)]);
    }
}
