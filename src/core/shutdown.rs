//! # OS termination signals as a shutdown source.
//!
//! [`wait_for_shutdown_signal`] completes when the process receives a termination
//! signal. [`Gate::run_until_signal`](crate::Gate::run_until_signal) turns it into the
//! cancellation of the gate's shutdown token.
//!
//! **Unix:** `SIGINT`, `SIGTERM`, `SIGQUIT` (and Ctrl-C).
//! **Other platforms:** Ctrl-C via [`tokio::signal::ctrl_c`].

/// Waits for a termination signal.
///
/// Returns `Err` if the listeners cannot be registered.
pub(crate) async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigquit = signal(SignalKind::quit())?;

        tokio::select! {
            res = tokio::signal::ctrl_c() => res,
            _ = sigint.recv()  => Ok(()),
            _ = sigterm.recv() => Ok(()),
            _ = sigquit.recv() => Ok(()),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}
