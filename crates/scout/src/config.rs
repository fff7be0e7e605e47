use std::env;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display};

use scout_openai_model::{OpenAIConfigBuilder, OpenAIProvider};

/// Environment variable holding the inference API key.
pub const API_KEY_VAR: &str = "GROQ_API_KEY";

/// Environment variable overriding the inference API base URL.
pub const BASE_URL_VAR: &str = "GROQ_BASE_URL";

/// The credential is missing, nothing can be answered without it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetupError {
    var: &'static str,
}

impl Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "⚠️ Setup Error: '{}' not found in the environment.",
            self.var
        )
    }
}

impl StdError for SetupError {}

/// Startup configuration, read once when the process starts.
#[derive(Clone)]
pub struct Config {
    api_key: String,
    base_url: Option<String>,
}

impl Config {
    /// Reads the configuration from the process environment.
    #[inline]
    pub fn from_env() -> Result<Self, SetupError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable
    /// name to its value.
    ///
    /// Blank values count as missing.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, SetupError> {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let api_key = non_blank(API_KEY_VAR).ok_or(SetupError {
            var: API_KEY_VAR,
        })?;
        Ok(Self {
            api_key,
            base_url: non_blank(BASE_URL_VAR),
        })
    }

    /// Creates the inference provider described by this configuration.
    pub fn model_provider(&self) -> OpenAIProvider {
        let mut builder = OpenAIConfigBuilder::with_api_key(&self.api_key);
        if let Some(base_url) = &self.base_url {
            builder = builder.with_base_url(base_url);
        }
        OpenAIProvider::new(builder.build())
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}
