mod builder;
#[cfg(test)]
mod tests;

use scout_model::ModelFinishReason;

use crate::context::ContextFetcher;
use crate::conversation::{Conversation, Turn};
use crate::prompt::compose;
use crate::streamer::{ResponseStreamer, StreamError};
pub use builder::SessionBuilder;

/// Receives progress notifications while a query is being answered.
///
/// Every method has an empty default, implementors pick what they render.
pub trait TurnObserver {
    /// The user's turn has been recorded.
    fn on_user_turn(&mut self, _turn: &Turn) {}

    /// The web search for the query has started.
    fn on_search_started(&mut self, _query: &str) {}

    /// The web search is over, `context` is what the model will see (it may
    /// be the fallback text).
    fn on_search_finished(&mut self, _context: &str) {}

    /// The answer grew, `answer` is everything received so far.
    fn on_partial_answer(&mut self, _answer: &str) {}

    /// The model call failed. The partial answer is still recorded.
    fn on_inference_error(&mut self, _err: &StreamError) {}

    /// The assistant's turn has been recorded.
    fn on_assistant_turn(&mut self, _turn: &Turn) {}
}

impl TurnObserver for () {}

/// How a submitted query ended.
#[derive(Debug)]
pub struct TurnOutcome {
    /// The error that cut the answer short, if any.
    pub error: Option<StreamError>,
    /// Why the model stopped, if it said so.
    pub finish_reason: Option<ModelFinishReason>,
}

impl TurnOutcome {
    /// Returns `true` if the answer streamed to the end.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// A chat session: one conversation plus the providers answering it.
///
/// Queries are handled one at a time: the search finishes before the model
/// is called, and the stream is read to its end before `submit` returns.
/// Each submitted query adds exactly two turns, the user's and the
/// assistant's, even when the model call fails.
pub struct Session {
    context_fetcher: ContextFetcher,
    streamer: ResponseStreamer,
    conversation: Conversation,
}

impl Session {
    /// Answers `query`, reporting progress to `observer`.
    pub async fn submit<O>(&mut self, query: &str, observer: &mut O) -> TurnOutcome
    where
        O: TurnObserver + ?Sized,
    {
        let user_turn = Turn::user(query);
        observer.on_user_turn(&user_turn);
        self.conversation.append(user_turn);

        observer.on_search_started(query);
        let context = self.context_fetcher.fetch_context(query).await;
        observer.on_search_finished(&context);

        let instruction = compose(&context, query);
        let mut stream = self.streamer.stream_answer(&instruction);
        let error = loop {
            match stream.next().await {
                Ok(Some(partial)) => observer.on_partial_answer(partial),
                Ok(None) => break None,
                Err(err) => {
                    observer.on_inference_error(&err);
                    break Some(err);
                }
            }
        };

        let finish_reason = stream.finish_reason();
        let assistant_turn = Turn::assistant(stream.into_answer());
        observer.on_assistant_turn(&assistant_turn);
        self.conversation.append(assistant_turn);

        debug!(
            turns = self.conversation.len(),
            failed = error.is_some(),
            "query answered"
        );
        TurnOutcome {
            error,
            finish_reason,
        }
    }

    /// Returns the conversation so far.
    #[inline]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }
}
