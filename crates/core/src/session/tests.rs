use scout_model::ModelMessage;
use scout_search::ErrorKind as SearchErrorKind;
use scout_test_provider::{
    PresetEvent, PresetResponse, TestModelProvider, TestSearchProvider,
};

use super::*;
use crate::FALLBACK_CONTEXT;
use crate::conversation::Role;

#[derive(Debug, PartialEq, Eq)]
enum Event {
    UserTurn(String),
    SearchStarted(String),
    SearchFinished(String),
    Partial(String),
    InferenceError(String),
    AssistantTurn(String),
}

#[derive(Default)]
struct Recorder {
    events: Vec<Event>,
}

impl Recorder {
    fn partials(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Partial(partial) => Some(partial.as_str()),
                _ => None,
            })
            .collect()
    }

    fn errors(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::InferenceError(err) => Some(err.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl TurnObserver for Recorder {
    fn on_user_turn(&mut self, turn: &Turn) {
        self.events.push(Event::UserTurn(turn.content().to_owned()));
    }

    fn on_search_started(&mut self, query: &str) {
        self.events.push(Event::SearchStarted(query.to_owned()));
    }

    fn on_search_finished(&mut self, context: &str) {
        self.events.push(Event::SearchFinished(context.to_owned()));
    }

    fn on_partial_answer(&mut self, answer: &str) {
        self.events.push(Event::Partial(answer.to_owned()));
    }

    fn on_inference_error(&mut self, err: &StreamError) {
        self.events.push(Event::InferenceError(err.to_string()));
    }

    fn on_assistant_turn(&mut self, turn: &Turn) {
        self.events.push(Event::AssistantTurn(turn.content().to_owned()));
    }
}

fn paris_search() -> TestSearchProvider {
    TestSearchProvider::with_bodies([
        "Paris is the capital and largest city of France.",
        "The capital of France is Paris.",
        "Paris has been the French capital since 987.",
    ])
}

#[tokio::test]
async fn test_capital_of_france() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_response(PresetResponse::with_deltas([
        "The capital ",
        "of France ",
        "is Paris.",
    ]));
    let search_provider = paris_search();

    let mut session = SessionBuilder::with_model_provider(model_provider.clone())
        .with_search_provider(search_provider.clone())
        .build();
    assert!(session.conversation().is_empty());

    let mut recorder = Recorder::default();
    let outcome = session.submit("capital of France", &mut recorder).await;
    assert!(outcome.is_complete());
    assert_eq!(outcome.finish_reason, Some(ModelFinishReason::Stop));

    // The instruction carries the Paris-bearing context before the query,
    // and nothing else.
    let requests = model_provider.requests();
    assert_eq!(requests.len(), 1);
    let [ModelMessage::User(instruction)] = requests[0].messages.as_slice()
    else {
        panic!("unexpected messages: {:?}", requests[0].messages);
    };
    let context_at = instruction.find("Paris is the capital").unwrap();
    let query_at = instruction.find("Answer the user query: capital of France").unwrap();
    assert!(context_at < query_at);
    assert_eq!(search_provider.calls()[0].query, "capital of France");

    let turns = session.conversation().all();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0], Turn::user("capital of France"));
    assert_eq!(turns[1].role(), Role::Assistant);
    assert_eq!(turns[1].content(), "The capital of France is Paris.");

    assert_eq!(
        recorder.partials(),
        [
            "The capital ",
            "The capital of France ",
            "The capital of France is Paris.",
        ]
    );
    assert_eq!(
        recorder.events.first(),
        Some(&Event::UserTurn("capital of France".to_owned()))
    );
    assert_eq!(
        recorder.events.last(),
        Some(&Event::AssistantTurn("The capital of France is Paris.".to_owned()))
    );
}

#[tokio::test]
async fn test_search_failure_is_invisible() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_response(PresetResponse::with_deltas(["Paris."]));

    let mut session = SessionBuilder::with_model_provider(model_provider.clone())
        .with_search_provider(TestSearchProvider::failing(
            SearchErrorKind::Network,
            "dns failure",
        ))
        .build();

    let mut recorder = Recorder::default();
    let outcome = session.submit("capital of France", &mut recorder).await;
    assert!(outcome.is_complete());
    assert!(recorder.errors().is_empty());
    assert!(
        recorder
            .events
            .contains(&Event::SearchFinished(FALLBACK_CONTEXT.to_owned()))
    );

    let requests = model_provider.requests();
    assert_eq!(
        requests[0].messages,
        vec![ModelMessage::User(compose(
            FALLBACK_CONTEXT,
            "capital of France"
        ))]
    );
    assert_eq!(session.conversation().all()[1].content(), "Paris.");
}

#[tokio::test]
async fn test_mid_stream_failure_keeps_partial() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_response(PresetResponse::with_events([
        PresetEvent::MessageDelta("Par".to_owned()),
        PresetEvent::Error("connection reset".to_owned()),
    ]));

    let mut session = SessionBuilder::with_model_provider(model_provider)
        .with_search_provider(paris_search())
        .build();

    let mut recorder = Recorder::default();
    let outcome = session.submit("capital of France", &mut recorder).await;
    assert!(!outcome.is_complete());
    assert_eq!(outcome.error.unwrap().to_string(), "connection reset");
    assert_eq!(recorder.errors(), ["connection reset"]);

    let turns = session.conversation().all();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[1], Turn::assistant("Par"));
}

#[tokio::test]
async fn test_open_failure_records_empty_answer() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_response(PresetResponse::failing_to_open("HTTP 401"));

    let mut session = SessionBuilder::with_model_provider(model_provider)
        .with_search_provider(paris_search())
        .build();

    let outcome = session.submit("capital of France", &mut ()).await;
    assert!(!outcome.is_complete());
    assert_eq!(outcome.finish_reason, None);

    let turns = session.conversation().all();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[1], Turn::assistant(""));
}

#[tokio::test]
async fn test_each_query_adds_two_turns() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_response(PresetResponse::with_deltas(["Paris."]));
    model_provider.add_response(PresetResponse::with_events([
        PresetEvent::Error("overloaded".to_owned()),
    ]));
    model_provider.add_response(PresetResponse::with_deltas(["Rome."]));

    let mut session = SessionBuilder::with_model_provider(model_provider.clone())
        .with_search_provider(paris_search())
        .build();

    for (idx, query) in ["France?", "Spain?", "Italy?"].into_iter().enumerate() {
        let before = session.conversation().len();
        session.submit(query, &mut ()).await;
        assert_eq!(session.conversation().len(), before + 2, "query {idx}");
    }

    let roles: Vec<_> = session
        .conversation()
        .all()
        .iter()
        .map(Turn::role)
        .collect();
    assert_eq!(
        roles,
        [
            Role::User,
            Role::Assistant,
            Role::User,
            Role::Assistant,
            Role::User,
            Role::Assistant,
        ]
    );
    let answers: Vec<_> = session
        .conversation()
        .all()
        .iter()
        .filter(|turn| turn.role() == Role::Assistant)
        .map(Turn::content)
        .collect();
    assert_eq!(answers, ["Paris.", "", "Rome."]);

    // Earlier turns are never sent back to the model.
    for request in model_provider.requests() {
        assert_eq!(request.messages.len(), 1);
    }
}
