use std::pin::Pin;
use std::task::{Context, Poll, ready};

use pin_project_lite::pin_project;
use scout_model::{
    ErrorKind, ModelFinishReason, ModelResponse, ModelResponseEvent,
};

use crate::Error;
use crate::io::{Sse, SseError};
use crate::proto::{ApiError, ChatCompletionChunk};

struct PartialState {
    sse: Sse,
    id: Option<String>,
    // This field will be cleared after the response returns the complete event.
    pending_finish_reason: Option<ModelFinishReason>,
}

type PinnedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type NextEvent = Result<(Option<ModelResponseEvent>, PartialState), Error>;

pin_project! {
    /// A streaming chat completion.
    pub struct OpenAIResponse {
        next_event_fut: Option<PinnedFuture<NextEvent>>,
    }
}

impl OpenAIResponse {
    #[inline]
    pub(crate) fn from_sse(sse: Sse) -> Self {
        let partial_state = PartialState {
            sse,
            id: None,
            pending_finish_reason: None,
        };
        let next_event_fut = async move { next_event(partial_state).await };
        Self {
            next_event_fut: Some(Box::pin(next_event_fut)),
        }
    }
}

impl ModelResponse for OpenAIResponse {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        let this = self.project();
        let Some(next_event_fut) = this.next_event_fut else {
            return Poll::Ready(Ok(None));
        };
        let (event, partial_state) =
            match ready!(next_event_fut.as_mut().poll(cx)) {
                Ok((Some(event), partial_state)) => (event, partial_state),
                Ok((None, _)) => {
                    *this.next_event_fut = None;
                    return Poll::Ready(Ok(None));
                }
                Err(err) => {
                    *this.next_event_fut = None;
                    return Poll::Ready(Err(err));
                }
            };

        // The stream may still have more data to pull, create a new future for
        // the next event.
        let next_event_fut = async move { next_event(partial_state).await };
        *this.next_event_fut = Some(Box::pin(next_event_fut));

        Poll::Ready(Ok(Some(event)))
    }
}

async fn next_event(
    mut partial_state: PartialState,
) -> Result<(Option<ModelResponseEvent>, PartialState), Error> {
    // A finish reason is only emitted after the delta that came with it.
    if let Some(finish_reason) = partial_state.pending_finish_reason.take() {
        return Ok((
            Some(ModelResponseEvent::Completed(finish_reason)),
            partial_state,
        ));
    }

    loop {
        let sse_event = match partial_state.sse.next_event().await {
            Ok(Some(event)) => event,
            Ok(None) => return Ok((None, partial_state)),
            Err(SseError::ChunksError(err)) => {
                return Err(Error::new(
                    format!("stream interrupted: {}", err.0),
                    ErrorKind::Other,
                ));
            }
            Err(SseError::InvalidPayload) => {
                return Err(Error::new(
                    "malformed event stream",
                    ErrorKind::Protocol,
                ));
            }
        };
        trace!("got sse event: {sse_event}");
        if sse_event == "[DONE]" {
            return Ok((None, partial_state));
        }

        let chunk = serde_json::from_str::<ChatCompletionChunk>(&sse_event)
            .map_err(|err| Error::new(format!("{err}"), ErrorKind::Protocol))?;
        if let Some(err) = chunk.error {
            return Err(api_error(err));
        }
        if let Some(chunk_id) = chunk.id {
            if partial_state.id.get_or_insert_with(|| chunk_id.clone())
                != &chunk_id
            {
                return Err(Error::new(
                    "chunk id mismatch",
                    ErrorKind::Protocol,
                ));
            }
        }

        // Only the first choice is followed. Usage-only chunks carry none.
        let Some(choice) = chunk.choices.into_iter().next() else {
            continue;
        };

        if let Some(finish_reason) = choice.finish_reason.as_deref() {
            partial_state.pending_finish_reason =
                Some(finish_reason_from_str(finish_reason));
        }

        let content = choice.delta.and_then(|delta| delta.content);
        match content {
            Some(content) => {
                return Ok((
                    Some(ModelResponseEvent::MessageDelta(content)),
                    partial_state,
                ));
            }
            None => {
                if let Some(finish_reason) =
                    partial_state.pending_finish_reason.take()
                {
                    return Ok((
                        Some(ModelResponseEvent::Completed(finish_reason)),
                        partial_state,
                    ));
                }
            }
        }
    }
}

fn finish_reason_from_str(reason: &str) -> ModelFinishReason {
    match reason {
        "length" => ModelFinishReason::Length,
        "content_filter" => ModelFinishReason::ContentFilter,
        _ => ModelFinishReason::Stop,
    }
}

fn api_error(err: ApiError) -> Error {
    let kind = match err.r#type.as_deref() {
        Some("rate_limit_exceeded" | "tokens") => ErrorKind::RateLimitExceeded,
        _ => ErrorKind::Other,
    };
    Error::new(err.message, kind)
}
