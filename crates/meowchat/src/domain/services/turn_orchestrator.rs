//! Turn Orchestrator
//!
//! Turns a user utterance into a persona reply: builds the bounded prompt,
//! calls the completion provider and records both turns on the conversation.
//! Upstream failures never escape `produce_reply`; they become an
//! in-character apology carrying the error description.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::domain::errors::CompletionError;
use crate::domain::{Conversation, DomainError, Persona, PersonaCatalog, Turn};
use crate::ports::{ChatMessage, CompletionOptions, CompletionProvider, CompletionResponse};

/// Most recent turns carried into a request (two user/assistant exchanges)
pub const HISTORY_WINDOW: usize = 4;

/// Retry behaviour for transient upstream failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each further retry
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Single attempt, no retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Backoff before retry number `retry` (1-based), with up to 50% jitter
    fn delay_for(&self, retry: u32) -> Duration {
        let base = self.base_delay.saturating_mul(1 << (retry - 1).min(16));
        let jitter_ms = (base.as_millis() / 2) as u64;
        if jitter_ms == 0 {
            return base;
        }
        base + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(1, Duration::from_millis(500))
    }
}

/// Produces persona replies through a shared completion provider
pub struct TurnOrchestrator<P: CompletionProvider + ?Sized> {
    provider: Arc<P>,
    options: CompletionOptions,
    retry: RetryPolicy,
}

impl<P: CompletionProvider + ?Sized> TurnOrchestrator<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            options: CompletionOptions::persona_chat(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Instruction turn, trailing window of `history`, then the new utterance
    pub fn build_request(
        persona: &Persona,
        new_utterance: &str,
        history: &[Turn],
    ) -> Vec<ChatMessage> {
        let window_start = history.len().saturating_sub(HISTORY_WINDOW);
        let window = &history[window_start..];

        let mut messages = Vec::with_capacity(window.len() + 2);
        messages.push(ChatMessage::system(persona.instruction()));
        messages.extend(window.iter().map(ChatMessage::from));
        messages.push(ChatMessage::user(new_utterance));
        messages
    }

    /// Reply text for `new_utterance`; falls back to an apology on upstream failure
    pub async fn produce_reply(
        &self,
        persona: &Persona,
        new_utterance: &str,
        history: &[Turn],
    ) -> String {
        let messages = Self::build_request(persona, new_utterance, history);

        tracing::debug!(
            persona = %persona.id,
            history_len = history.len(),
            request_len = messages.len(),
            model = %self.provider.model_id(),
            "Requesting completion"
        );

        match self.complete_with_retry(&messages).await {
            Ok(response) => {
                tracing::debug!(
                    persona = %persona.id,
                    completion_tokens = response.usage.completion_tokens,
                    finish_reason = ?response.finish_reason,
                    "Completion received"
                );
                response.content
            }
            Err(e) => {
                tracing::warn!(
                    persona = %persona.id,
                    provider = %self.provider.provider_name(),
                    "Completion failed, replying with fallback: {}",
                    e
                );
                fallback_reply(persona, &e)
            }
        }
    }

    /// Record a user turn and the persona's reply on `conversation`.
    ///
    /// Returns the assistant turn. Both turns are appended together once the
    /// reply is ready, so a cancelled call leaves the conversation untouched.
    /// Blank utterances are rejected the same way.
    pub async fn submit(
        &self,
        catalog: &PersonaCatalog,
        conversation: &mut Conversation,
        utterance: &str,
    ) -> Result<Turn, DomainError> {
        if utterance.trim().is_empty() {
            return Err(DomainError::Validation(
                "Message must not be empty".to_string(),
            ));
        }

        let persona = catalog.lookup(conversation.active_persona_id())?;
        let user_turn = Turn::user(utterance);

        let reply = self
            .produce_reply(persona, utterance, conversation.turns())
            .await;

        let turn = Turn::assistant(reply);
        conversation.append(user_turn);
        conversation.append(turn.clone());
        Ok(turn)
    }

    async fn complete_with_retry(
        &self,
        messages: &[ChatMessage],
    ) -> Result<CompletionResponse, CompletionError> {
        let mut retry = 0;
        loop {
            match self.provider.complete(messages, &self.options).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && retry < self.retry.max_retries => {
                    retry += 1;
                    let delay = self.retry.delay_for(retry);
                    tracing::info!(
                        retry,
                        delay_ms = delay.as_millis() as u64,
                        "Transient completion failure, retrying: {}",
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn fallback_reply(persona: &Persona, error: &CompletionError) -> String {
    format!("{}: {}", persona.apology(), error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConversationPhase, Household, TurnRole};
    use crate::ports::{MessageRole, TokenUsage};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Provider returning scripted results and recording every request
    struct MockProvider {
        script: Mutex<VecDeque<Result<String, CompletionError>>>,
        requests: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl MockProvider {
        fn new(script: Vec<Result<String, CompletionError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn replying(text: &str) -> Arc<Self> {
            Self::new(vec![Ok(text.to_string())])
        }

        fn requests(&self) -> Vec<Vec<ChatMessage>> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionProvider for MockProvider {
        async fn complete(
            &self,
            messages: &[ChatMessage],
            _options: &CompletionOptions,
        ) -> Result<CompletionResponse, CompletionError> {
            self.requests.lock().unwrap().push(messages.to_vec());
            let next = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("Meow.".to_string()));
            next.map(|content| CompletionResponse {
                content,
                model: "mock".to_string(),
                usage: TokenUsage::default(),
                finish_reason: Some("stop".to_string()),
            })
        }

        fn provider_name(&self) -> &str {
            "mock"
        }

        fn model_id(&self) -> &str {
            "mock-model"
        }
    }

    fn catalog() -> PersonaCatalog {
        PersonaCatalog::new(
            vec![
                Persona::new("Molly", "The smallest cat in the house.", 10, 56),
                Persona::new("Kuni", "The biggest cat, a gentle giant.", 11, 60),
            ],
            "Molly",
            Household::default(),
        )
        .unwrap()
    }

    fn history(len: usize) -> Vec<Turn> {
        (0..len)
            .map(|i| {
                if i % 2 == 0 {
                    Turn::user(format!("user {i}"))
                } else {
                    Turn::assistant(format!("cat {i}"))
                }
            })
            .collect()
    }

    fn contents(messages: &[ChatMessage]) -> Vec<&str> {
        messages.iter().map(|m| m.content.as_str()).collect()
    }

    #[test]
    fn test_request_without_history() {
        let catalog = catalog();
        let molly = catalog.lookup("Molly").unwrap();
        let messages = TurnOrchestrator::<MockProvider>::build_request(molly, "Hi", &[]);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(messages[0].content, molly.instruction());
        assert_eq!(messages[1], ChatMessage::user("Hi"));
    }

    #[test]
    fn test_request_history_window_boundaries() {
        let catalog = catalog();
        let molly = catalog.lookup("Molly").unwrap();

        let exactly_four = history(4);
        let messages = TurnOrchestrator::<MockProvider>::build_request(molly, "x", &exactly_four);
        assert_eq!(
            contents(&messages[1..5]),
            vec!["user 0", "cat 1", "user 2", "cat 3"]
        );
        assert_eq!(messages.len(), 6);

        let five = history(5);
        let messages = TurnOrchestrator::<MockProvider>::build_request(molly, "x", &five);
        assert_eq!(messages.len(), 6);
        assert_eq!(
            contents(&messages[1..5]),
            vec!["cat 1", "user 2", "cat 3", "user 4"]
        );
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(messages.last().unwrap(), &ChatMessage::user("x"));
    }

    #[test]
    fn test_request_long_history_keeps_last_four_in_order() {
        let catalog = catalog();
        let molly = catalog.lookup("Molly").unwrap();
        let long = history(12);
        let messages = TurnOrchestrator::<MockProvider>::build_request(molly, "x", &long);
        assert_eq!(
            contents(&messages[1..5]),
            vec!["user 8", "cat 9", "user 10", "cat 11"]
        );
    }

    #[tokio::test]
    async fn test_submit_from_idle() {
        let provider = MockProvider::replying("Mrrp! *happy tail sounds*");
        let orchestrator = TurnOrchestrator::new(provider.clone());
        let catalog = catalog();
        let mut conversation = Conversation::new(catalog.default_persona());

        let reply = orchestrator
            .submit(&catalog, &mut conversation, "Hi")
            .await
            .unwrap();

        assert_eq!(reply.role, TurnRole::Assistant);
        assert_eq!(reply.content, "Mrrp! *happy tail sounds*");
        assert_eq!(conversation.phase(), ConversationPhase::Active);

        let turns = conversation.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, TurnRole::User);
        assert_eq!(turns[0].content, "Hi");
        assert_eq!(turns[1].role, TurnRole::Assistant);
        assert!(!turns[1].content.is_empty());

        // Request carried only the instruction and the new utterance
        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].len(), 2);
    }

    #[tokio::test]
    async fn test_submit_with_five_prior_turns() {
        let provider = MockProvider::new(vec![
            Ok("one".into()),
            Ok("two".into()),
            Ok("three".into()),
        ]);
        let orchestrator = TurnOrchestrator::new(provider.clone());
        let catalog = catalog();
        let mut conversation = Conversation::new(catalog.default_persona());

        for utterance in ["a", "b"] {
            orchestrator
                .submit(&catalog, &mut conversation, utterance)
                .await
                .unwrap();
        }
        // Five prior turns: a, one, b, two, c
        conversation.append(Turn::user("c"));
        assert_eq!(conversation.turns().len(), 5);

        orchestrator
            .submit(&catalog, &mut conversation, "Hello again")
            .await
            .unwrap();

        let last = provider.requests().pop().unwrap();
        assert_eq!(last.len(), 6);
        assert_eq!(contents(&last[1..5]), vec!["one", "b", "two", "c"]);
        assert_eq!(last[5], ChatMessage::user("Hello again"));
        assert_eq!(conversation.turns().len(), 7);
    }

    #[tokio::test]
    async fn test_upstream_error_becomes_fallback() {
        let provider = MockProvider::new(vec![Err(CompletionError::Auth(
            "Incorrect API key provided".into(),
        ))]);
        let orchestrator = TurnOrchestrator::new(provider.clone()).with_retry(RetryPolicy::none());
        let catalog = catalog();
        let molly = catalog.lookup("Molly").unwrap();

        let reply = orchestrator.produce_reply(molly, "Hi", &[]).await;

        assert!(reply.starts_with("Meow! Sorry, I'm having trouble right now"));
        assert!(reply.contains("Incorrect API key provided"));
        assert_eq!(provider.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_fallback_is_recorded_as_assistant_turn() {
        let provider = MockProvider::new(vec![Err(CompletionError::Malformed(
            "no choices".into(),
        ))]);
        let orchestrator = TurnOrchestrator::new(provider).with_retry(RetryPolicy::none());
        let catalog = catalog();
        let mut conversation = Conversation::new(catalog.default_persona());

        let reply = orchestrator
            .submit(&catalog, &mut conversation, "Hi")
            .await
            .unwrap();

        assert!(reply.content.contains("no choices"));
        assert_eq!(conversation.turns().len(), 2);
    }

    #[tokio::test]
    async fn test_no_retry_policy_makes_single_attempt() {
        let provider = MockProvider::new(vec![
            Err(CompletionError::RateLimited("too many requests".into())),
            Ok("unused".into()),
        ]);
        let orchestrator = TurnOrchestrator::new(provider.clone()).with_retry(RetryPolicy::none());
        let catalog = catalog();

        let reply = orchestrator
            .produce_reply(catalog.lookup("Molly").unwrap(), "Hi", &[])
            .await;

        assert!(reply.contains("too many requests"));
        assert_eq!(provider.requests().len(), 1);
    }

    /// Provider that never answers within a test's patience
    struct StalledProvider;

    #[async_trait]
    impl CompletionProvider for StalledProvider {
        async fn complete(
            &self,
            _messages: &[ChatMessage],
            _options: &CompletionOptions,
        ) -> Result<CompletionResponse, CompletionError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Err(CompletionError::Timeout(5))
        }

        fn provider_name(&self) -> &str {
            "stalled"
        }

        fn model_id(&self) -> &str {
            "stalled-model"
        }
    }

    #[tokio::test]
    async fn test_cancelled_submit_leaves_conversation_untouched() {
        let orchestrator =
            TurnOrchestrator::new(Arc::new(StalledProvider)).with_retry(RetryPolicy::none());
        let catalog = catalog();
        let mut conversation = Conversation::new(catalog.default_persona());

        let result = tokio::time::timeout(
            Duration::from_millis(50),
            orchestrator.submit(&catalog, &mut conversation, "Hi"),
        )
        .await;

        assert!(result.is_err());
        assert!(conversation.turns().is_empty());
        assert_eq!(conversation.phase(), ConversationPhase::Idle);
    }

    #[tokio::test]
    async fn test_transient_error_is_retried() {
        let provider = MockProvider::new(vec![
            Err(CompletionError::RateLimited("too many requests".into())),
            Ok("Purr.".into()),
        ]);
        let orchestrator = TurnOrchestrator::new(provider.clone())
            .with_retry(RetryPolicy::new(1, Duration::ZERO));
        let catalog = catalog();

        let reply = orchestrator
            .produce_reply(catalog.lookup("Kuni").unwrap(), "Hi", &[])
            .await;

        assert_eq!(reply, "Purr.");
        assert_eq!(provider.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let provider = MockProvider::new(vec![
            Err(CompletionError::Timeout(30)),
            Err(CompletionError::Timeout(30)),
            Err(CompletionError::Timeout(30)),
            Ok("too late".into()),
        ]);
        let orchestrator = TurnOrchestrator::new(provider.clone())
            .with_retry(RetryPolicy::new(2, Duration::ZERO));
        let catalog = catalog();

        let reply = orchestrator
            .produce_reply(catalog.lookup("Kuni").unwrap(), "Hi", &[])
            .await;

        assert!(reply.contains("timed out"));
        assert_eq!(provider.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_non_transient_error_is_not_retried() {
        let provider = MockProvider::new(vec![
            Err(CompletionError::Api {
                status: 400,
                message: "bad request".into(),
            }),
            Ok("unused".into()),
        ]);
        let orchestrator = TurnOrchestrator::new(provider.clone())
            .with_retry(RetryPolicy::new(3, Duration::ZERO));
        let catalog = catalog();

        orchestrator
            .produce_reply(catalog.lookup("Molly").unwrap(), "Hi", &[])
            .await;

        assert_eq!(provider.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_utterance_rejected() {
        let provider = MockProvider::replying("unused");
        let orchestrator = TurnOrchestrator::new(provider.clone());
        let catalog = catalog();
        let mut conversation = Conversation::new(catalog.default_persona());

        let err = orchestrator
            .submit(&catalog, &mut conversation, "   ")
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert!(conversation.turns().is_empty());
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_switch_then_submit_uses_new_persona() {
        let provider = MockProvider::new(vec![Ok("a".into()), Ok("b".into())]);
        let orchestrator = TurnOrchestrator::new(provider.clone());
        let catalog = catalog();
        let mut conversation = Conversation::new(catalog.default_persona());

        orchestrator
            .submit(&catalog, &mut conversation, "Hi Molly")
            .await
            .unwrap();
        assert!(conversation.switch_persona(catalog.lookup("Kuni").unwrap()));
        assert!(conversation.turns().is_empty());
        assert_eq!(conversation.active_persona_id(), "Kuni");

        orchestrator
            .submit(&catalog, &mut conversation, "Hi Kuni")
            .await
            .unwrap();

        let last = provider.requests().pop().unwrap();
        assert!(last[0].content.starts_with("You are Kuni"));
        // Nothing from Molly's thread leaks into Kuni's request
        assert_eq!(last.len(), 2);
    }

    #[test]
    fn test_retry_delay_grows_with_jitter_bound() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        let first = policy.delay_for(1);
        let second = policy.delay_for(2);
        assert!(first >= Duration::from_millis(100) && first <= Duration::from_millis(150));
        assert!(second >= Duration::from_millis(200) && second <= Duration::from_millis(300));
    }
}
