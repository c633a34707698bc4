//! LLM Provider Port
//!
//! Abstract interface for chat completion invocations.
//! The orchestrator only sees this trait; the HTTP client that talks to
//! the hosted completion API lives in the server crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::CompletionError;
use crate::domain::{Turn, TurnRole};

/// Role of a message in a completion request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl From<TurnRole> for MessageRole {
    fn from(role: TurnRole) -> Self {
        match role {
            TurnRole::User => MessageRole::User,
            TurnRole::Assistant => MessageRole::Assistant,
        }
    }
}

/// A message in a completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

impl From<&Turn> for ChatMessage {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role.into(),
            content: turn.content.clone(),
        }
    }
}

/// Generation parameters for a completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Temperature (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Penalise tokens that already appeared at all (-2.0 - 2.0)
    pub presence_penalty: Option<f32>,
    /// Penalise tokens proportionally to how often they appeared (-2.0 - 2.0)
    pub frequency_penalty: Option<f32>,
}

impl CompletionOptions {
    /// Short, varied, mildly non-repetitive replies
    pub fn persona_chat() -> Self {
        Self {
            max_tokens: Some(100),
            temperature: Some(0.7),
            presence_penalty: Some(0.3),
            frequency_penalty: Some(0.3),
        }
    }
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self::persona_chat()
    }
}

/// Response from a completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Text of the first candidate
    pub content: String,
    /// Model that generated the response
    pub model: String,
    /// Token usage statistics
    pub usage: TokenUsage,
    /// Finish reason
    pub finish_reason: Option<String>,
}

/// Token usage statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Completion capability
///
/// One implementation per hosted provider. A single instance is built at
/// startup and shared by every session.
///
/// # Example
///
/// ```rust,ignore
/// use meowchat::ports::CompletionProvider;
///
/// struct OpenAiProvider { /* ... */ }
///
/// #[async_trait]
/// impl CompletionProvider for OpenAiProvider {
///     async fn complete(&self, messages: &[ChatMessage], options: &CompletionOptions)
///         -> Result<CompletionResponse, CompletionError> {
///         // POST /chat/completions
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate a completion from messages
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse, CompletionError>;

    /// Get the provider name (e.g., "openai")
    fn provider_name(&self) -> &str;

    /// Get the model ID being used
    fn model_id(&self) -> &str;
}
