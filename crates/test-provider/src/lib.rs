//! Local fake providers for testing purpose.
//!
//! [`TestModelProvider`] replays scripted streaming responses and
//! [`TestSearchProvider`] returns canned search results. Both record what
//! they were asked so tests can assert on the outgoing requests.

mod preset;
mod search;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, ready};
use std::time::Duration;

use scout_model::{
    ErrorKind, ModelFinishReason, ModelProvider, ModelProviderError,
    ModelRequest, ModelResponse, ModelResponseEvent,
};
use tokio::time::{Sleep, sleep};

pub use preset::*;
pub use search::*;

#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

pub struct TestModelResponse {
    events: VecDeque<PresetEvent>,
    delay: Duration,
    completed: bool,
    fused: bool,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl ModelResponse for TestModelResponse {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        let this = self.get_mut();
        if this.fused {
            return Poll::Ready(Ok(None));
        }

        if let Some(sleep) = &mut this.sleep {
            ready!(sleep.as_mut().poll(cx));
            this.sleep = None;

            return Poll::Ready(match this.events.pop_front() {
                Some(PresetEvent::MessageDelta(delta)) => {
                    Ok(Some(ModelResponseEvent::MessageDelta(delta)))
                }
                Some(PresetEvent::Error(message)) => {
                    this.fused = true;
                    Err(Error {
                        message,
                        kind: ErrorKind::Other,
                    })
                }
                None if !this.completed => {
                    this.completed = true;
                    Ok(Some(ModelResponseEvent::Completed(
                        ModelFinishReason::Stop,
                    )))
                }
                None => {
                    this.fused = true;
                    Ok(None)
                }
            });
        }
        this.sleep = Some(Box::pin(sleep(this.delay)));
        Pin::new(this).poll_next_event(cx)
    }
}

#[derive(Default)]
struct ModelScript {
    responses: VecDeque<PresetResponse>,
    requests: Vec<ModelRequest>,
}

/// A local fake model for testing purpose.
///
/// Before sending requests, you need to setup the script, which is how the
/// model should respond to each request, in order. If there are no enough
/// responses in the script, opening the stream fails.
///
/// Clones share the same script and request log.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    script: Arc<Mutex<ModelScript>>,
    delay: Option<Duration>,
}

impl TestModelProvider {
    #[inline]
    pub fn add_response(&mut self, preset: PresetResponse) {
        self.lock().responses.push_back(preset);
    }

    /// Sets how long the response waits before each event. Defaults to 1ms.
    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns every request received so far.
    #[inline]
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ModelScript> {
        // A panicking test may poison the lock, the script is still usable.
        self.script.lock().unwrap_or_else(|err| err.into_inner())
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;
    type Response = TestModelResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let mut script = self.lock();
        script.requests.push(req.clone());
        let result = match script.responses.pop_front() {
            None => Err(Error {
                message: "no enough responses".to_owned(),
                kind: ErrorKind::RateLimitExceeded,
            }),
            Some(PresetResponse {
                open_error: Some(message),
                ..
            }) => Err(Error {
                message,
                kind: ErrorKind::Other,
            }),
            Some(preset) => Ok(TestModelResponse {
                events: preset.events.into(),
                delay: self.delay.unwrap_or(Duration::from_millis(1)),
                completed: false,
                fused: false,
                sleep: None,
            }),
        };
        ready(result)
    }
}

impl Debug for TestModelProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestModelProvider")
            .field("pending", &self.lock().responses.len())
            .field("delay", &self.delay)
            .finish()
    }
}
