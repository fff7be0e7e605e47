/// A request to be sent to the model provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModelRequest {
    /// The input messages.
    pub messages: Vec<ModelMessage>,
}

impl ModelRequest {
    /// Creates a request that carries a single user message.
    #[inline]
    pub fn with_user_message<S: Into<String>>(content: S) -> Self {
        Self {
            messages: vec![ModelMessage::User(content.into())],
        }
    }
}

/// A complete message.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ModelMessage {
    /// The system instructions.
    System(String),
    /// A user input text.
    User(String),
    /// An assistant text.
    Assistant(String),
}
