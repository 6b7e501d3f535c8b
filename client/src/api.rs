use gloo_net::http::Request;
use hatvenn_shared::endpoints::{
    STATUS_NO_CONTENT, STATUS_OK, STATUS_SESSION_EXPIRED, wait_url,
};
use hatvenn_shared::{BatchError, Cursor, SubmitRequest, decode_batch};

use crate::transfer::PlaceRequest;
use crate::waiter::{WaitApi, WaitResponse};

/// Long-poll endpoint for one waiter id.
pub struct HttpWaitApi {
    base: String,
    wid: u64,
}

impl HttpWaitApi {
    pub fn new(base: impl Into<String>, wid: u64) -> Self {
        Self {
            base: base.into(),
            wid,
        }
    }
}

impl WaitApi for HttpWaitApi {
    async fn wait(&self, cursor: Cursor) -> WaitResponse {
        let url = wait_url(&self.base, self.wid, cursor);
        let resp = match Request::get(&url).send().await {
            Ok(resp) => resp,
            Err(e) => return WaitResponse::Retry(format!("fetch error: {e}")),
        };

        let status = resp.status();
        if status != STATUS_OK {
            return classify(status, None);
        }
        match resp.text().await {
            Ok(body) => classify(status, Some(&body)),
            Err(e) => WaitResponse::Retry(format!("read error: {e}")),
        }
    }
}

/// Map a wait response's status and body onto what the waiter does next. Only 401 and
/// messages the client cannot understand end polling; everything else is retried.
pub fn classify(status: u16, body: Option<&str>) -> WaitResponse {
    match status {
        STATUS_OK => {}
        STATUS_SESSION_EXPIRED => return WaitResponse::Expired,
        status => return WaitResponse::Retry(format!("HTTP {status}")),
    }
    let Some(body) = body else {
        return WaitResponse::Retry("read error: no body".to_string());
    };
    match decode_batch(body) {
        Ok(batch) => WaitResponse::Batch(batch),
        Err(BatchError::Unreadable(e)) => WaitResponse::Retry(format!("parse error: {e}")),
        Err(BatchError::Protocol(e)) => WaitResponse::Protocol(e),
    }
}

/// Ask the server to move a chunk. `Err` carries the server's explanation.
pub async fn place_chunk(base: &str, request: &PlaceRequest) -> Result<(), String> {
    let resp = Request::get(&request.url(base))
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;
    expect_no_content(resp).await
}

pub async fn submit_answer(url: &str, request: &SubmitRequest) -> Result<(), String> {
    let resp = Request::post(url)
        .json(request)
        .map_err(|e| format!("encode error: {e}"))?
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;
    expect_no_content(resp).await
}

async fn expect_no_content(resp: gloo_net::http::Response) -> Result<(), String> {
    if resp.status() == STATUS_NO_CONTENT {
        return Ok(());
    }
    match resp.text().await {
        Ok(body) if !body.is_empty() => Err(body),
        _ => Err(format!("HTTP {}", resp.status())),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use futures::executor::block_on;
    use hatvenn_shared::{Message, OwnerTag, ProtocolError};

    use super::*;
    use crate::session::ClientSession;
    use crate::waiter::{self, SessionHandle, StopReason, Timer, WaitStep};

    #[test]
    fn ok_body_decodes_into_a_batch() {
        let response = classify(200, Some(r#"[[3, {"method": "add_chat", "text": "hi"}]]"#));
        let WaitResponse::Batch(entries) = response else {
            panic!("expected batch, got {response:?}");
        };
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].cursor, 3);
        assert_eq!(
            entries[0].message,
            Message::AddChat {
                text: "hi".to_string()
            }
        );
    }

    #[test]
    fn expired_session_is_terminal() {
        assert_eq!(classify(401, None), WaitResponse::Expired);
        assert_eq!(classify(401, Some("gone")), WaitResponse::Expired);
    }

    #[test]
    fn other_statuses_are_retried() {
        for status in [204, 500, 502, 503, 404] {
            assert_eq!(
                classify(status, None),
                WaitResponse::Retry(format!("HTTP {status}"))
            );
        }
    }

    #[test]
    fn garbled_ok_body_backs_off_instead_of_stopping() {
        let mut session = ClientSession::new(OwnerTag::for_waiter(1), 4);
        for body in ["<html>gateway</html>", r#"[[1, {"method": "add_ch"#] {
            let response = classify(200, Some(body));
            assert!(
                matches!(&response, WaitResponse::Retry(reason) if reason.starts_with("parse error:")),
                "{response:?}"
            );
            assert!(matches!(
                session.apply_wait_response(response),
                WaitStep::Backoff { .. }
            ));
        }
        assert_eq!(session.cursor(), 4);
    }

    #[test]
    fn unknown_method_in_ok_body_is_a_protocol_error() {
        assert_eq!(
            classify(200, Some(r#"[[1, {"method": "players"}]]"#)),
            WaitResponse::Protocol(ProtocolError::UnknownMethod("players".to_string()))
        );
    }

    /// Replies with canned `(status, body)` pairs run through `classify`.
    struct StatusScript {
        replies: RefCell<VecDeque<(u16, Option<&'static str>)>>,
        polls: RefCell<usize>,
    }

    impl WaitApi for StatusScript {
        async fn wait(&self, _cursor: Cursor) -> WaitResponse {
            *self.polls.borrow_mut() += 1;
            match self.replies.borrow_mut().pop_front() {
                Some((status, body)) => classify(status, body),
                None => panic!("polled after the script ended"),
            }
        }
    }

    struct InstantTimer;

    impl Timer for InstantTimer {
        async fn sleep(&self, _ms: u32) {}

        fn jitter_ms(&self) -> u32 {
            0
        }
    }

    struct Shared(RefCell<ClientSession>);

    impl SessionHandle for Shared {
        fn with_session<R>(&self, f: impl FnOnce(&mut ClientSession) -> R) -> Option<R> {
            Some(f(&mut self.0.borrow_mut()))
        }
    }

    #[test]
    fn unauthorized_status_issues_no_further_polls() {
        let api = StatusScript {
            replies: RefCell::new(
                vec![
                    (502, None),
                    (200, Some("<html>oops</html>")),
                    (200, Some(r#"[[2, {"method": "add_chat", "text": "a"}]]"#)),
                    (401, None),
                ]
                .into(),
            ),
            polls: RefCell::new(0),
        };
        let session = Shared(RefCell::new(ClientSession::new(OwnerTag::for_waiter(1), 0)));

        let reason = block_on(waiter::run(&api, &InstantTimer, &session));

        assert_eq!(reason, StopReason::SessionExpired);
        assert_eq!(*api.polls.borrow(), 4);
        assert!(api.replies.borrow().is_empty());
        assert_eq!(session.0.borrow().cursor(), 2);
    }
}
