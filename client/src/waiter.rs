use std::future::Future;

use hatvenn_shared::{Cursor, ProtocolError, WaitEntry};
use leptos::prelude::{RwSignal, Update};

use crate::config::JITTER_WINDOW_MS;
use crate::log;
use crate::session::ClientSession;

/// Outcome of one long-poll request.
#[derive(Debug, Clone, PartialEq)]
pub enum WaitResponse {
    Batch(Vec<WaitEntry>),
    /// Network failure or unexpected status. Retried with the same cursor.
    Retry(String),
    /// The session is gone. Polling stops for good.
    Expired,
    Protocol(ProtocolError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitStep {
    /// Re-poll after a short random delay.
    Jitter,
    Backoff {
        delay_ms: u32,
        attempt: u32,
        reason: String,
    },
    Stop(StopReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    SessionExpired,
    Protocol(ProtocolError),
    /// The page tore down the session while a wait was in flight.
    Detached,
}

pub trait WaitApi {
    fn wait(&self, cursor: Cursor) -> impl Future<Output = WaitResponse>;
}

pub trait Timer {
    fn sleep(&self, ms: u32) -> impl Future<Output = ()>;

    /// Delay in `[0, JITTER_WINDOW_MS)` before re-polling after a success.
    fn jitter_ms(&self) -> u32;
}

/// Shared access to the session from the waiter. Returns `None` once the session is gone.
pub trait SessionHandle {
    fn with_session<R>(&self, f: impl FnOnce(&mut ClientSession) -> R) -> Option<R>;
}

impl SessionHandle for RwSignal<ClientSession> {
    fn with_session<R>(&self, f: impl FnOnce(&mut ClientSession) -> R) -> Option<R> {
        self.try_update(f)
    }
}

/// Browser timer: `setTimeout` for sleeps, `Math.random` for jitter.
pub struct BrowserTimer;

impl Timer for BrowserTimer {
    fn sleep(&self, ms: u32) -> impl Future<Output = ()> {
        gloo_timers::future::TimeoutFuture::new(ms)
    }

    fn jitter_ms(&self) -> u32 {
        let jitter = (js_sys::Math::random() * JITTER_WINDOW_MS as f64).floor() as u32;
        jitter.min(JITTER_WINDOW_MS - 1)
    }
}

/// Long-poll until the session expires or the server speaks a protocol we don't know.
/// Only one wait is ever in flight: the next one is issued after the previous response
/// has been fully applied.
pub async fn run<A, T, S>(api: &A, timer: &T, session: &S) -> StopReason
where
    A: WaitApi,
    T: Timer,
    S: SessionHandle,
{
    loop {
        let Some(cursor) = session.with_session(|s| s.cursor()) else {
            return StopReason::Detached;
        };
        let response = api.wait(cursor).await;
        let Some(step) = session.with_session(|s| s.apply_wait_response(response)) else {
            return StopReason::Detached;
        };

        match step {
            WaitStep::Jitter => timer.sleep(timer.jitter_ms()).await,
            WaitStep::Backoff {
                delay_ms,
                attempt,
                reason,
            } => {
                log::warn(&format!(
                    "wait failed (attempt {attempt}): {reason}; retrying in {delay_ms}ms"
                ));
                timer.sleep(delay_ms).await;
            }
            WaitStep::Stop(reason) => {
                match &reason {
                    StopReason::SessionExpired => log::info("session expired; waiter stopped"),
                    StopReason::Protocol(error) => {
                        log::error(&format!("protocol error, waiter stopped: {error}"))
                    }
                    StopReason::Detached => {}
                }
                return reason;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use futures::executor::block_on;
    use hatvenn_shared::{Message, OwnerTag};

    use super::*;
    use crate::config::MAX_BACKOFF_MS;

    impl SessionHandle for RefCell<ClientSession> {
        fn with_session<R>(&self, f: impl FnOnce(&mut ClientSession) -> R) -> Option<R> {
            Some(f(&mut self.borrow_mut()))
        }
    }

    /// Replays canned responses and records the cursor of each request.
    /// Answers `Expired` once the script runs out.
    struct ScriptedApi {
        script: RefCell<VecDeque<WaitResponse>>,
        requested: RefCell<Vec<Cursor>>,
    }

    impl ScriptedApi {
        fn new(script: Vec<WaitResponse>) -> Self {
            Self {
                script: RefCell::new(script.into()),
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl WaitApi for ScriptedApi {
        async fn wait(&self, cursor: Cursor) -> WaitResponse {
            self.requested.borrow_mut().push(cursor);
            self.script
                .borrow_mut()
                .pop_front()
                .unwrap_or(WaitResponse::Expired)
        }
    }

    #[derive(Default)]
    struct RecordingTimer {
        sleeps: RefCell<Vec<u32>>,
    }

    impl Timer for RecordingTimer {
        async fn sleep(&self, ms: u32) {
            self.sleeps.borrow_mut().push(ms);
        }

        fn jitter_ms(&self) -> u32 {
            42
        }
    }

    fn chat(cursor: Cursor, text: &str) -> WaitEntry {
        WaitEntry {
            cursor,
            message: Message::AddChat {
                text: text.to_string(),
            },
        }
    }

    fn session() -> RefCell<ClientSession> {
        RefCell::new(ClientSession::new(OwnerTag::for_waiter(1), 0))
    }

    #[test]
    fn retries_reuse_cursor_and_success_advances_it() {
        let api = ScriptedApi::new(vec![
            WaitResponse::Retry("HTTP 502".to_string()),
            WaitResponse::Batch(vec![chat(1, "a"), chat(2, "b")]),
            WaitResponse::Retry("fetch error".to_string()),
            WaitResponse::Batch(vec![chat(5, "c")]),
        ]);
        let timer = RecordingTimer::default();
        let session = session();

        let reason = block_on(run(&api, &timer, &session));

        assert_eq!(reason, StopReason::SessionExpired);
        assert_eq!(*api.requested.borrow(), vec![0, 0, 2, 2, 5]);
        assert_eq!(*timer.sleeps.borrow(), vec![150, 42, 150, 42]);
        assert_eq!(session.borrow().cursor(), 5);
        assert_eq!(
            session.borrow().chat().lines().collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn long_outage_backoff_is_capped() {
        let script = (0..25)
            .map(|_| WaitResponse::Retry("HTTP 503".to_string()))
            .collect();
        let api = ScriptedApi::new(script);
        let timer = RecordingTimer::default();

        block_on(run(&api, &timer, &session()));

        let sleeps = timer.sleeps.borrow();
        assert_eq!(sleeps.len(), 25);
        assert!(sleeps.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(sleeps.last().copied(), Some(MAX_BACKOFF_MS));
    }

    #[test]
    fn expiry_stops_polling_for_good() {
        let api = ScriptedApi::new(vec![
            WaitResponse::Expired,
            WaitResponse::Batch(vec![chat(1, "never")]),
        ]);
        let timer = RecordingTimer::default();

        let reason = block_on(run(&api, &timer, &session()));

        assert_eq!(reason, StopReason::SessionExpired);
        assert_eq!(api.requested.borrow().len(), 1);
        assert_eq!(api.script.borrow().len(), 1);
        assert!(timer.sleeps.borrow().is_empty());
    }

    #[test]
    fn protocol_error_stops_without_applying_or_advancing() {
        let error = ProtocolError::UnknownMethod("players".to_string());
        let api = ScriptedApi::new(vec![
            WaitResponse::Batch(vec![chat(3, "hi")]),
            WaitResponse::Protocol(error.clone()),
            WaitResponse::Batch(vec![chat(9, "never")]),
        ]);
        let timer = RecordingTimer::default();
        let session = session();

        let reason = block_on(run(&api, &timer, &session));

        assert_eq!(reason, StopReason::Protocol(error));
        assert_eq!(session.borrow().cursor(), 3);
        assert_eq!(api.requested.borrow().len(), 2);
    }

    #[test]
    fn messages_are_dispatched_once_in_cursor_order() {
        let api = ScriptedApi::new(vec![
            WaitResponse::Batch(vec![chat(1, "1"), chat(2, "2")]),
            WaitResponse::Batch(Vec::new()),
            WaitResponse::Batch(vec![chat(3, "3"), chat(4, "4")]),
        ]);
        let timer = RecordingTimer::default();
        let session = session();

        block_on(run(&api, &timer, &session));

        assert_eq!(session.borrow().cursor(), 4);
        assert_eq!(
            session.borrow().chat().lines().collect::<Vec<_>>(),
            vec!["1", "2", "3", "4"]
        );
    }
}
