//! Async driver - runs a session on a single task
//!
//! Engine callbacks, application commands and the watchdog deadline are
//! multiplexed with `tokio::select!`, so the session is only ever touched from
//! this one loop.

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::debug;

use crate::session::RecognitionSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Start,
    Stop,
    /// Start if inactive, stop if active
    Toggle,
    /// Stop and leave the loop
    Shutdown,
}

/// Drive `session` until `Shutdown` or until every command sender is dropped.
/// Returns the session so callers can inspect its final state.
pub async fn run_session(
    mut session: RecognitionSession,
    mut cmd_rx: mpsc::UnboundedReceiver<SessionCommand>,
) -> RecognitionSession {
    let engine_rx = session.engine_events();

    loop {
        let deadline = session.watchdog_deadline().map(Instant::from_std);
        let watchdog = async {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;

            cmd = cmd_rx.recv() => match cmd {
                Some(SessionCommand::Start) => session.start(),
                Some(SessionCommand::Stop) => session.stop(),
                Some(SessionCommand::Toggle) => {
                    if session.is_active() {
                        session.stop();
                    } else {
                        session.start();
                    }
                }
                Some(SessionCommand::Shutdown) | None => {
                    session.stop();
                    break;
                }
            },

            msg = engine_rx.recv_async() => {
                // The session holds a sender itself, so this never disconnects
                if let Ok(msg) = msg {
                    session.handle_at(msg, Instant::now().into_std());
                }
            }

            _ = watchdog => {
                session.check_watchdog(Instant::now().into_std());
            }
        }
    }

    // Let the aborted engine report back before handing the session over
    let drained = session.drain_pending();
    debug!(drained, "session driver finished");
    session
}
