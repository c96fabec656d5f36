//! Configuration for an analysis run.
//!
//! All behaviour is controlled through [`AnalysisConfig`], built via its
//! [`AnalysisConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share a config across requests and to diff two runs.
//!
//! # Design choice: builder over constructor
//! Most callers only want to change the model or the API key; the builder
//! lets them set exactly that and rely on documented defaults for the rest.

use crate::error::InsightError;
use std::fmt;

/// Default chat-completions endpoint (OpenRouter).
pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "openai/gpt-oss-20b:free";

/// Configuration for one analysis exchange.
///
/// # Example
/// ```rust
/// use insighthub::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .model("openai/gpt-oss-120b")
///     .max_output_tokens(1024)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct AnalysisConfig {
    /// Chat-completions endpoint URL. Default: OpenRouter.
    pub api_url: String,

    /// Model identifier sent with both round trips.
    pub model: String,

    /// Explicit API key. When `None`, the `OPENROUTER_API_KEY` environment
    /// variable is consulted at submission time; if that is also unset the
    /// request fails with [`InsightError::MissingCredential`] before any
    /// network activity.
    pub api_key: Option<String>,

    /// Generation-length cap for each round trip. Default: 2048.
    ///
    /// Both calls carry the same cap. The refine call produces compact JSON,
    /// so 2048 leaves ample headroom without letting a rambling draft run up
    /// cost.
    pub max_output_tokens: usize,

    /// Character budget for extracted document text. Default: 40 000.
    ///
    /// Document text is raw extraction output, so it gets the larger budget;
    /// anything over is middle-out clamped (head-weighted, explicit elision
    /// marker) before entering the context bundle.
    pub context_budget: usize,

    /// Character budget for free-text notes. Default: 20 000.
    ///
    /// Notes are user-curated and denser than raw extraction, so they get
    /// half the document budget.
    pub notes_budget: usize,

    /// Custom system prompt. If None, uses the built-in default.
    pub system_prompt: Option<String>,

    /// Per-round-trip HTTP timeout in seconds. Default: 60.
    ///
    /// The pipeline itself imposes no timeout contract; this is a
    /// pass-through property of the HTTP client.
    pub api_timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            max_output_tokens: 2048,
            context_budget: 40_000,
            notes_budget: 20_000,
            system_prompt: None,
            api_timeout_secs: 60,
        }
    }
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("max_output_tokens", &self.max_output_tokens)
            .field("context_budget", &self.context_budget)
            .field("notes_budget", &self.notes_budget)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .finish()
    }
}

impl AnalysisConfig {
    /// Create a new builder for `AnalysisConfig`.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn max_output_tokens(mut self, n: usize) -> Self {
        self.config.max_output_tokens = n.max(1);
        self
    }

    pub fn context_budget(mut self, chars: usize) -> Self {
        self.config.context_budget = chars;
        self
    }

    pub fn notes_budget(mut self, chars: usize) -> Self {
        self.config.notes_budget = chars;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalysisConfig, InsightError> {
        let c = &self.config;
        if !c.api_url.starts_with("http://") && !c.api_url.starts_with("https://") {
            return Err(InsightError::InvalidConfig(format!(
                "api_url must be an HTTP(S) URL, got '{}'",
                c.api_url
            )));
        }
        if c.model.trim().is_empty() {
            return Err(InsightError::InvalidConfig("model must not be empty".into()));
        }
        if c.max_output_tokens == 0 {
            return Err(InsightError::InvalidConfig(
                "max_output_tokens must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
