use std::error::Error as StdError;
use std::fmt::{self, Debug, Display};
use std::future::poll_fn;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use scout_model::{
    ErrorKind, ModelFinishReason, ModelProvider, ModelProviderError,
    ModelRequest, ModelResponse, ModelResponseEvent,
};
use tracing::Instrument;

type BoxedResponse = Pin<Box<dyn ErasedResponse>>;
type BoxedOpenFuture =
    Pin<Box<dyn Future<Output = Result<BoxedResponse, StreamError>> + Send>>;
type HandlerFn = Arc<dyn Fn(ModelRequest) -> BoxedOpenFuture + Send + Sync>;

/// An error raised while opening or reading an answer stream.
pub struct StreamError(Box<dyn ModelProviderError>);

impl StreamError {
    /// Returns the kind of the underlying provider error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.0.kind()
    }
}

impl Debug for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamError")
            .field("kind", &self.kind())
            .field("message", &self.0.to_string())
            .finish()
    }
}

impl Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl StdError for StreamError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.0)
    }
}

/// Object-safe view of a [`ModelResponse`] with the error type erased.
trait ErasedResponse: Send {
    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, StreamError>>;
}

impl<R: ModelResponse> ErasedResponse for R {
    #[inline]
    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, StreamError>> {
        ModelResponse::poll_next_event(self, cx)
            .map_err(|err| StreamError(Box::new(err)))
    }
}

/// A wrapper around a model provider that turns a composed instruction
/// into a stream of growing partial answers.
///
/// Each call is stateless from the model's point of view: the request
/// carries the instruction as its only message, no earlier turns.
#[derive(Clone)]
pub struct ResponseStreamer {
    handler_fn: HandlerFn,
}

impl ResponseStreamer {
    /// Creates a streamer answering with `provider`.
    #[inline]
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        // We have to erase the type `P`, since `ResponseStreamer` doesn't
        // have a generic parameter and we don't want it either.
        let handler_fn: HandlerFn = Arc::new(move |req| {
            trace!("opening a stream: {req:?}");
            let fut = provider.send_request(&req);
            Box::pin(async move {
                match fut.await {
                    Ok(resp) => Ok(Box::pin(resp) as BoxedResponse),
                    Err(err) => Err(StreamError(Box::new(err))),
                }
            })
        });
        Self { handler_fn }
    }

    /// Starts answering `instruction`.
    ///
    /// Nothing is sent until the returned stream is first polled.
    #[inline]
    pub fn stream_answer(&self, instruction: &str) -> AnswerStream {
        let req = ModelRequest::with_user_message(instruction);
        let handler_fn = Arc::clone(&self.handler_fn);
        let open_fut = async move { handler_fn(req).await }
            .instrument(trace_span!("open answer stream"));
        AnswerStream {
            state: StreamState::Opening(Box::pin(open_fut)),
            answer: String::new(),
            finish_reason: None,
        }
    }
}

enum StreamState {
    Opening(BoxedOpenFuture),
    Streaming(BoxedResponse),
    Done,
}

/// The answer to one instruction, pulled fragment by fragment.
///
/// Every successful [`next`](Self::next) yields the whole answer so far, so
/// the yielded texts only ever grow. Fragments with no text are skipped.
/// After the stream ends or fails it stays ended, the answer accumulated
/// up to that point remains available via [`answer`](Self::answer).
pub struct AnswerStream {
    state: StreamState,
    answer: String,
    finish_reason: Option<ModelFinishReason>,
}

impl AnswerStream {
    /// Waits for the next non-empty fragment and returns the accumulated
    /// answer, or `None` once the stream has ended.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe, a cancelled call loses no fragment.
    pub async fn next(&mut self) -> Result<Option<&str>, StreamError> {
        loop {
            match &mut self.state {
                StreamState::Opening(open_fut) => match open_fut.await {
                    Ok(resp) => {
                        debug!("answer stream opened");
                        self.state = StreamState::Streaming(resp);
                    }
                    Err(err) => {
                        error!("failed to open answer stream: {err}");
                        self.state = StreamState::Done;
                        return Err(err);
                    }
                },
                StreamState::Streaming(resp) => {
                    let event =
                        poll_fn(|cx| resp.as_mut().poll_next_event(cx)).await;
                    match event {
                        Ok(Some(ModelResponseEvent::MessageDelta(delta))) => {
                            if delta.is_empty() {
                                continue;
                            }
                            self.answer.push_str(&delta);
                            return Ok(Some(self.answer.as_str()));
                        }
                        Ok(Some(ModelResponseEvent::Completed(reason))) => {
                            trace!("stream completed: {reason:?}");
                            self.finish_reason = Some(reason);
                        }
                        Ok(None) => {
                            self.state = StreamState::Done;
                            return Ok(None);
                        }
                        Err(err) => {
                            error!(
                                "answer stream broke after {} byte(s): {err}",
                                self.answer.len()
                            );
                            self.state = StreamState::Done;
                            return Err(err);
                        }
                    }
                }
                StreamState::Done => return Ok(None),
            }
        }
    }

    /// Returns the answer accumulated so far.
    #[inline]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Returns why the model stopped, if it said so.
    #[inline]
    pub fn finish_reason(&self) -> Option<ModelFinishReason> {
        self.finish_reason
    }

    /// Consumes the stream, returning the accumulated answer.
    #[inline]
    pub fn into_answer(self) -> String {
        self.answer
    }
}

#[cfg(test)]
mod tests {
    use scout_model::ModelMessage;
    use scout_test_provider::{PresetEvent, PresetResponse, TestModelProvider};

    use super::*;

    #[tokio::test]
    async fn test_prefix_growing_snapshots() {
        let mut model_provider = TestModelProvider::default();
        model_provider.add_response(PresetResponse::with_deltas([
            "The capital ",
            "",
            "of France ",
            "is Paris.",
        ]));
        let streamer = ResponseStreamer::new(model_provider.clone());

        let mut stream = streamer.stream_answer("instruction");
        let mut snapshots: Vec<String> = vec![];
        while let Some(partial) = stream.next().await.unwrap() {
            snapshots.push(partial.to_owned());
        }

        assert_eq!(
            snapshots,
            [
                "The capital ",
                "The capital of France ",
                "The capital of France is Paris.",
            ]
        );
        for pair in snapshots.windows(2) {
            assert!(pair[1].starts_with(&pair[0]));
            assert!(pair[1].len() > pair[0].len());
        }
        assert_eq!(stream.answer(), "The capital of France is Paris.");
        assert_eq!(stream.finish_reason(), Some(ModelFinishReason::Stop));

        // Ended streams stay ended.
        assert!(stream.next().await.unwrap().is_none());

        let requests = model_provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].messages,
            vec![ModelMessage::User("instruction".to_owned())]
        );
    }

    #[tokio::test]
    async fn test_lazy_open() {
        let mut model_provider = TestModelProvider::default();
        model_provider.add_response(PresetResponse::with_deltas(["ok"]));
        let streamer = ResponseStreamer::new(model_provider.clone());

        // Nothing is sent for a stream that is never read.
        let stream = streamer.stream_answer("never polled");
        drop(stream);
        assert!(model_provider.requests().is_empty());

        let mut stream = streamer.stream_answer("second");
        assert_eq!(stream.next().await.unwrap(), Some("ok"));
        assert_eq!(model_provider.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_keeps_partial_answer_on_error() {
        let mut model_provider = TestModelProvider::default();
        model_provider.add_response(PresetResponse::with_events([
            PresetEvent::MessageDelta("Par".to_owned()),
            PresetEvent::Error("connection reset".to_owned()),
        ]));
        let streamer = ResponseStreamer::new(model_provider);

        let mut stream = streamer.stream_answer("capital of France");
        assert_eq!(stream.next().await.unwrap(), Some("Par"));
        let err = stream.next().await.unwrap_err();
        assert_eq!(err.to_string(), "connection reset");
        assert_eq!(stream.answer(), "Par");
        assert!(stream.next().await.unwrap().is_none());
        assert_eq!(stream.into_answer(), "Par");
    }

    #[tokio::test]
    async fn test_open_error() {
        let mut model_provider = TestModelProvider::default();
        model_provider
            .add_response(PresetResponse::failing_to_open("invalid api key"));
        let streamer = ResponseStreamer::new(model_provider);

        let mut stream = streamer.stream_answer("anything");
        let err = stream.next().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
        assert_eq!(err.to_string(), "invalid api key");
        assert_eq!(stream.answer(), "");
    }
}
