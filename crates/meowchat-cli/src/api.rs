//! Meowchat API Client

use anyhow::{bail, Context, Result};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// API Client for Meowchat
pub struct MeowchatClient {
    client: Client,
    base_url: String,
}

// ============================================
// API Response Types
// ============================================

#[derive(Debug, Deserialize)]
pub struct PersonaResponse {
    pub id: String,
    pub label: String,
    pub age_summary: String,
    #[serde(default)]
    pub display_facts: Vec<PersonaFact>,
}

#[derive(Debug, Deserialize)]
pub struct PersonaFact {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct PersonaSummary {
    pub id: String,
    pub label: String,
    pub age_summary: String,
}

#[derive(Debug, Deserialize)]
pub struct HouseholdResponse {
    pub owners_display: String,
    pub location: String,
}

#[derive(Debug, Deserialize)]
pub struct TurnResponse {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub persona: PersonaSummary,
    pub turns: Vec<TurnResponse>,
    #[serde(default)]
    pub conversation_starters: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitMessageResponse {
    pub reply: TurnResponse,
    pub session: SessionResponse,
}

#[derive(Debug, Deserialize)]
pub struct SwitchPersonaResponse {
    pub switched: bool,
    pub session: SessionResponse,
}

#[derive(Debug, Serialize)]
struct CreateSessionRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    persona_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct SubmitMessageRequest<'a> {
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct SwitchPersonaRequest<'a> {
    persona_id: &'a str,
}

/// Fail with the server's message on a non-success status
async fn ensure_success(resp: Response) -> Result<Response> {
    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        bail!("API error ({}): {}", status, body);
    }
    Ok(resp)
}

impl MeowchatClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Test connection with health check
    pub async fn health(&self) -> Result<bool> {
        let resp = self.client.get(self.url("/health")).send().await?;
        Ok(resp.status().is_success())
    }

    /// List personas, eldest first
    pub async fn list_personas(&self) -> Result<Vec<PersonaResponse>> {
        let resp = self
            .client
            .get(self.url("/meow/personas"))
            .send()
            .await
            .context("Failed to connect to Meowchat API")?;

        ensure_success(resp)
            .await?
            .json()
            .await
            .context("Failed to parse response")
    }

    pub async fn get_persona(&self, persona_id: &str) -> Result<PersonaResponse> {
        let path = format!("/meow/personas/{}", urlencoding::encode(persona_id));
        let resp = self
            .client
            .get(self.url(&path))
            .send()
            .await
            .context("Failed to connect to Meowchat API")?;

        ensure_success(resp)
            .await?
            .json()
            .await
            .context("Failed to parse response")
    }

    pub async fn household(&self) -> Result<HouseholdResponse> {
        let resp = self
            .client
            .get(self.url("/meow/household"))
            .send()
            .await
            .context("Failed to connect to Meowchat API")?;

        ensure_success(resp)
            .await?
            .json()
            .await
            .context("Failed to parse response")
    }

    /// Start a session with `persona_id`, or the server default
    pub async fn create_session(&self, persona_id: Option<&str>) -> Result<SessionResponse> {
        let resp = self
            .client
            .post(self.url("/meow/sessions"))
            .json(&CreateSessionRequest { persona_id })
            .send()
            .await
            .context("Failed to connect to Meowchat API")?;

        ensure_success(resp)
            .await?
            .json()
            .await
            .context("Failed to parse response")
    }

    pub async fn send_message(&self, session_id: Uuid, content: &str) -> Result<SubmitMessageResponse> {
        let resp = self
            .client
            .post(self.url(&format!("/meow/sessions/{}/messages", session_id)))
            .json(&SubmitMessageRequest { content })
            .send()
            .await
            .context("Failed to connect to Meowchat API")?;

        ensure_success(resp)
            .await?
            .json()
            .await
            .context("Failed to parse response")
    }

    pub async fn switch_persona(
        &self,
        session_id: Uuid,
        persona_id: &str,
    ) -> Result<SwitchPersonaResponse> {
        let resp = self
            .client
            .post(self.url(&format!("/meow/sessions/{}/persona", session_id)))
            .json(&SwitchPersonaRequest { persona_id })
            .send()
            .await
            .context("Failed to connect to Meowchat API")?;

        ensure_success(resp)
            .await?
            .json()
            .await
            .context("Failed to parse response")
    }

    pub async fn clear(&self, session_id: Uuid) -> Result<SessionResponse> {
        let resp = self
            .client
            .post(self.url(&format!("/meow/sessions/{}/clear", session_id)))
            .send()
            .await
            .context("Failed to connect to Meowchat API")?;

        ensure_success(resp)
            .await?
            .json()
            .await
            .context("Failed to parse response")
    }

    pub async fn end_session(&self, session_id: Uuid) -> Result<()> {
        let resp = self
            .client
            .delete(self.url(&format!("/meow/sessions/{}", session_id)))
            .send()
            .await
            .context("Failed to connect to Meowchat API")?;

        ensure_success(resp).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trimmed() {
        let client = MeowchatClient::new("http://127.0.0.1:3000/");
        assert_eq!(client.url("/health"), "http://127.0.0.1:3000/health");
    }

    #[test]
    fn test_session_response_parses() {
        let body = serde_json::json!({
            "id": "6f1c1b9e-3f57-4c1e-9d8a-3a1c2f3e4d5b",
            "persona": {
                "id": "Molly",
                "label": "Molly (10 years old)",
                "age_summary": "Age: 10 years old (≈ 56 in human years)"
            },
            "phase": "idle",
            "turns": [],
            "conversation_starters": ["What's your favorite food?"],
            "created_at": "2024-01-01T00:00:00Z"
        });

        let session: SessionResponse = serde_json::from_value(body).unwrap();
        assert_eq!(session.persona.id, "Molly");
        assert!(session.turns.is_empty());
        assert_eq!(session.conversation_starters.len(), 1);
    }

    #[test]
    fn test_create_request_omits_missing_persona() {
        let body = serde_json::to_string(&CreateSessionRequest { persona_id: None }).unwrap();
        assert_eq!(body, "{}");
    }
}
