//! Scripted transport for exercising store clients without a network.
//!
//! A `MockTransport` is built from an ordered script of responses (or
//! transport errors), each paired with a matcher for the request the client
//! is expected to send at that position. Calls consume the script strictly in
//! order; `verify` at the end of a test asserts that every scripted
//! interaction was used. The mock is meant to be driven sequentially.

use std::collections::VecDeque;
use std::io::{self, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::TransportError;
use crate::http::{Body, HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;

/// One scripted outcome: a canned response or a transport failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    Error(String),
    Response {
        status: u16,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
        /// When set, reading the body fails with this message once the
        /// bytes above have been read.
        body_error: Option<String>,
    },
}

impl MockResponse {
    pub fn new(status: u16, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        MockResponse::Response {
            status,
            headers: vec![("content-type".to_string(), content_type.to_string())],
            body: body.into(),
            body_error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        MockResponse::Error(message.into())
    }

    /// Adds a response header. No effect on error outcomes.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let MockResponse::Response { headers, .. } = &mut self {
            headers.push((name.to_string(), value.to_string()));
        }
        self
    }

    /// Makes the body fail with `message` after its bytes are read. No
    /// effect on error outcomes.
    pub fn with_body_error(mut self, message: &str) -> Self {
        if let MockResponse::Response { body_error, .. } = &mut self {
            *body_error = Some(message.to_string());
        }
        self
    }
}

/// The request a scripted position expects to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedRequest {
    pub method: HttpMethod,
    pub url: String,
    /// Headers that must be present; others are allowed.
    pub headers: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestMatcher {
    /// Accepts any request.
    Any,
    Exact(ExpectedRequest),
}

impl RequestMatcher {
    pub fn get(url: &str) -> Self {
        RequestMatcher::Exact(ExpectedRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: Vec::new(),
        })
    }

    #[track_caller]
    fn check(&self, call: usize, request: &HttpRequest) {
        let RequestMatcher::Exact(expected) = self else {
            return;
        };
        assert_eq!(request.method, expected.method, "mock transport: call {call}: method");
        assert_eq!(request.url, expected.url, "mock transport: call {call}: url");
        for header in &expected.headers {
            assert!(
                request
                    .headers
                    .iter()
                    .any(|(k, v)| k.eq_ignore_ascii_case(&header.0) && *v == header.1),
                "mock transport: call {call}: missing header {}: {}",
                header.0,
                header.1
            );
        }
    }
}

#[derive(Debug, Default)]
struct Script {
    pending: VecDeque<(MockResponse, RequestMatcher)>,
    calls: usize,
    requests: Vec<HttpRequest>,
}

/// A transport that plays back a fixed script of interactions.
#[derive(Debug)]
pub struct MockTransport {
    script: Mutex<Script>,
    open_bodies: Arc<AtomicUsize>,
}

impl MockTransport {
    /// Zips `responses` with `requests` by position.
    ///
    /// # Panics
    /// If the two sequences differ in length.
    #[track_caller]
    pub fn new(responses: Vec<MockResponse>, requests: Vec<RequestMatcher>) -> Self {
        assert_eq!(
            responses.len(),
            requests.len(),
            "mock transport: every scripted response needs a request matcher"
        );
        Self {
            script: Mutex::new(Script {
                pending: responses.into_iter().zip(requests).collect(),
                ..Script::default()
            }),
            open_bodies: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        // A failed assertion inside `execute` poisons the lock; the script is
        // still usable for reporting.
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of scripted interactions not consumed yet.
    pub fn remaining(&self) -> usize {
        self.script().pending.len()
    }

    /// Every request seen so far, in call order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.script().requests.clone()
    }

    /// Response bodies handed out and not dropped yet.
    pub fn open_bodies(&self) -> usize {
        self.open_bodies.load(Ordering::SeqCst)
    }

    /// Fails the test unless every scripted interaction was consumed.
    #[track_caller]
    pub fn verify(&self) {
        let script = self.script();
        let remaining = script.pending.len();
        if remaining > 0 {
            panic!(
                "mock transport: {remaining} more call(s) expected but not made ({} made)",
                script.calls
            );
        }
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut script = self.script();
        script.calls += 1;
        let call = script.calls;
        script.requests.push(request.clone());

        let Some((outcome, matcher)) = script.pending.pop_front() else {
            drop(script);
            panic!(
                "mock transport: unexpected call {call}: {} {}",
                request.method, request.url
            );
        };
        drop(script);
        matcher.check(call, &request);

        match outcome {
            MockResponse::Error(message) => Err(TransportError::new(message)),
            MockResponse::Response {
                status,
                headers,
                body,
                body_error,
            } => Ok(HttpResponse {
                status,
                headers,
                body: Body::new(TrackedBody::new(body, body_error, self.open_bodies.clone())),
            }),
        }
    }
}

/// In-memory body that counts itself open until dropped.
struct TrackedBody {
    inner: io::Cursor<Vec<u8>>,
    error: Option<String>,
    open: Arc<AtomicUsize>,
}

impl TrackedBody {
    fn new(bytes: Vec<u8>, error: Option<String>, open: Arc<AtomicUsize>) -> Self {
        open.fetch_add(1, Ordering::SeqCst);
        Self {
            inner: io::Cursor::new(bytes),
            error,
            open,
        }
    }
}

impl Read for TrackedBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        match &self.error {
            Some(message) if n == 0 && !buf.is_empty() => Err(io::Error::other(message.clone())),
            _ => Ok(n),
        }
    }
}

impl Drop for TrackedBody {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(url: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[test]
    fn plays_back_script_in_order() {
        let mock = MockTransport::new(
            vec![
                MockResponse::new(200, "binary", "first"),
                MockResponse::error("boom"),
                MockResponse::new(404, "text/plain", "second"),
            ],
            vec![RequestMatcher::Any, RequestMatcher::Any, RequestMatcher::Any],
        );

        let mut first = mock.execute(get("a")).unwrap();
        let mut body = String::new();
        first.body.read_to_string(&mut body).unwrap();
        assert_eq!(first.status, 200);
        assert_eq!(first.header("Content-Type"), Some("binary"));
        assert_eq!(body, "first");

        let err = mock.execute(get("b")).unwrap_err();
        assert_eq!(err.to_string(), "boom");

        let third = mock.execute(get("c")).unwrap();
        assert_eq!(third.status, 404);

        assert_eq!(mock.remaining(), 0);
        mock.verify();
        let urls: Vec<_> = mock.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(urls, vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_script_verifies() {
        MockTransport::new(vec![], vec![]).verify();
    }

    #[test]
    #[should_panic(expected = "1 more call(s) expected but not made")]
    fn verify_reports_missing_calls() {
        let mock = MockTransport::new(
            vec![MockResponse::new(200, "binary", ""), MockResponse::new(200, "binary", "")],
            vec![RequestMatcher::Any, RequestMatcher::Any],
        );
        let _ = mock.execute(get("a"));
        mock.verify();
    }

    #[test]
    fn verify_does_not_consume() {
        let mock = MockTransport::new(
            vec![MockResponse::new(200, "binary", "")],
            vec![RequestMatcher::Any],
        );
        assert_eq!(mock.remaining(), 1);
        let _ = mock.execute(get("a"));
        mock.verify();
        mock.verify();
        assert_eq!(mock.remaining(), 0);
    }

    #[test]
    #[should_panic(expected = "unexpected call 1")]
    fn call_past_end_of_script_panics() {
        let mock = MockTransport::new(vec![], vec![]);
        let _ = mock.execute(get("a"));
    }

    #[test]
    #[should_panic(expected = "call 1: url")]
    fn mismatched_url_fails() {
        let mock = MockTransport::new(
            vec![MockResponse::new(200, "binary", "")],
            vec![RequestMatcher::get("https://expected.example/x")],
        );
        let _ = mock.execute(get("https://other.example/x"));
    }

    #[test]
    #[should_panic(expected = "missing header accept")]
    fn missing_expected_header_fails() {
        let mock = MockTransport::new(
            vec![MockResponse::new(200, "binary", "")],
            vec![RequestMatcher::Exact(ExpectedRequest {
                method: HttpMethod::Get,
                url: "a".to_string(),
                headers: vec![("accept".to_string(), "*/*".to_string())],
            })],
        );
        let _ = mock.execute(get("a"));
    }

    #[test]
    #[should_panic(expected = "every scripted response needs a request matcher")]
    fn mismatched_script_lengths_panic() {
        MockTransport::new(vec![MockResponse::error("x")], vec![]);
    }

    #[test]
    fn bodies_are_tracked_until_dropped() {
        let mock = MockTransport::new(
            vec![MockResponse::new(200, "binary", "x")],
            vec![RequestMatcher::Any],
        );
        let response = mock.execute(get("a")).unwrap();
        assert_eq!(mock.open_bodies(), 1);
        drop(response);
        assert_eq!(mock.open_bodies(), 0);
    }

    #[test]
    fn body_error_after_bytes() {
        let mock = MockTransport::new(
            vec![MockResponse::new(200, "binary", "abc").with_body_error("connection reset")],
            vec![RequestMatcher::Any],
        );
        let mut response = mock.execute(get("a")).unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(response.body.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"abc");
        let err = response.body.read(&mut buf).unwrap_err();
        assert_eq!(err.to_string(), "connection reset");
        drop(response);
        assert_eq!(mock.open_bodies(), 0);
    }

    #[test]
    fn extra_headers() {
        let mock = MockTransport::new(
            vec![MockResponse::new(200, "binary", "").with_header("Link", "<m>; rel=duplicate")],
            vec![RequestMatcher::Any],
        );
        let response = mock.execute(get("a")).unwrap();
        assert_eq!(response.header("link"), Some("<m>; rel=duplicate"));
    }
}
