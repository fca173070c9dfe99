//! Conversational dispatch loop.
//!
//! A single turn is a bounded reason/act/observe cycle: the decision
//! provider looks at the conversation plus the declared tool catalogue and
//! either requests tool invocations or produces the final answer. Tool
//! results (and typed tool failures) are appended to the context keyed by
//! the provider's call id, so attribution is independent of execution
//! order. The loop carries a hard round bound; exhausting it yields a
//! fixed fallback answer instead of hanging.
//!
//! The provider is a pure decision function over the supplied context —
//! the engine holds no conversation state between calls, and identical
//! tool invocations within one turn see identical store contents.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{AgentConfig, OwnerConfig};
use crate::error::Error;
use crate::tools::{dispatch, ToolContext, ToolRegistry};

/// Answer returned when the round budget runs out without a final answer.
pub const FALLBACK_ANSWER: &str =
    "I wasn't able to complete that request. Please rephrase or ask something \
     more specific about the portfolio.";

/// Upper bound on a single tool invocation's wall time. A tool that blows
/// this budget is reported as a tool failure, not a fatal fault.
const TOOL_TIMEOUT_SECS: u64 = 10;

// ═══════════════════════════════════════════════════════════════════════
// Wire types
// ═══════════════════════════════════════════════════════════════════════

/// One message in the reasoning context, in chat-completions shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallRequest>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn assistant_tool_calls(calls: Vec<ToolCallRequest>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: None,
            tool_calls: Some(calls),
            tool_call_id: None,
        }
    }

    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(call_id.into()),
        }
    }
}

/// One requested tool invocation from the decision provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object, as delivered on the wire.
    #[serde(default)]
    pub arguments: String,
}

fn function_kind() -> String {
    "function".to_string()
}

/// A prior turn supplied by the caller. The engine never persists these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: String,
    pub content: String,
}

/// The closed command set a reasoning step may emit: invoke declared tools
/// or finish with an answer. Nothing else.
#[derive(Debug, Clone)]
pub enum Decision {
    ToolCalls(Vec<ToolCallRequest>),
    Final(String),
}

// ═══════════════════════════════════════════════════════════════════════
// Decision provider
// ═══════════════════════════════════════════════════════════════════════

/// Pure decision function: `(context, tools) -> tool calls | final answer`.
/// The provider has no authority beyond selecting from the declared tools.
#[async_trait]
pub trait DecisionProvider: Send + Sync {
    async fn decide(&self, messages: &[ChatMessage], tools: &[Value]) -> Result<Decision, Error>;
}

/// Provider used when no API key is configured. Always fails with a
/// provider error so the conversational surface degrades cleanly while
/// the query API keeps working.
pub struct DisabledProvider;

#[async_trait]
impl DecisionProvider for DisabledProvider {
    async fn decide(&self, _messages: &[ChatMessage], _tools: &[Value]) -> Result<Decision, Error> {
        Err(Error::Provider(
            "no API key configured for the decision provider".to_string(),
        ))
    }
}

/// Decision provider backed by an OpenAI-compatible chat completions
/// endpoint (works against Gemini's compatibility surface, among others).
///
/// Retry strategy mirrors the rest of the crate's outbound HTTP: 429 and
/// 5xx retried with exponential backoff, other 4xx fail immediately,
/// network errors retried.
pub struct ChatCompletionsProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    max_retries: u32,
}

impl ChatCompletionsProvider {
    pub fn new(config: &AgentConfig, api_key: String) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Provider(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            max_retries: config.max_retries,
        })
    }
}

/// Build the provider from config, falling back to [`DisabledProvider`]
/// when the API key environment variable is unset.
pub fn create_provider(config: &AgentConfig) -> Arc<dyn DecisionProvider> {
    match std::env::var(&config.api_key_env) {
        Ok(key) if !key.trim().is_empty() => match ChatCompletionsProvider::new(config, key) {
            Ok(provider) => Arc::new(provider),
            Err(e) => {
                tracing::warn!(%e, "failed to build chat provider, chat disabled");
                Arc::new(DisabledProvider)
            }
        },
        _ => {
            tracing::warn!(
                env = %config.api_key_env,
                "API key not set, conversational endpoint disabled"
            );
            Arc::new(DisabledProvider)
        }
    }
}

#[async_trait]
impl DecisionProvider for ChatCompletionsProvider {
    async fn decide(&self, messages: &[ChatMessage], tools: &[Value]) -> Result<Decision, Error> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": messages,
            "tools": tools,
            "tool_choice": "auto",
        });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s, ...
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(&url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let payload: Value = response
                            .json()
                            .await
                            .map_err(|e| Error::Provider(e.to_string()))?;
                        return parse_completion(&payload);
                    }

                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err = Some(Error::Provider(format!(
                            "chat API error {}: {}",
                            status, body_text
                        )));
                        continue;
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    return Err(Error::Provider(format!(
                        "chat API error {}: {}",
                        status, body_text
                    )));
                }
                Err(e) => {
                    last_err = Some(Error::Provider(e.to_string()));
                    continue;
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| Error::Provider("chat request failed after retries".to_string())))
    }
}

/// Extract the decision from a chat-completions response body.
fn parse_completion(payload: &Value) -> Result<Decision, Error> {
    let message = payload
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .ok_or_else(|| Error::Provider("completion has no choices".to_string()))?;

    if let Some(calls) = message.get("tool_calls").and_then(|v| v.as_array()) {
        if !calls.is_empty() {
            let parsed: Vec<ToolCallRequest> =
                serde_json::from_value(Value::Array(calls.clone()))
                    .map_err(|e| Error::Provider(format!("malformed tool_calls: {}", e)))?;
            return Ok(Decision::ToolCalls(parsed));
        }
    }

    match message.get("content").and_then(|v| v.as_str()) {
        Some(content) => Ok(Decision::Final(content.to_string())),
        None => Err(Error::Provider(
            "completion has neither tool calls nor content".to_string(),
        )),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Persona
// ═══════════════════════════════════════════════════════════════════════

/// The fixed persona seeding every turn's reasoning context.
pub fn instructions(owner: &OwnerConfig) -> String {
    format!(
        "You are {name}'s AI portfolio assistant.\n\
         \n\
         ## Your Role\n\
         You represent {name}, {headline}. You answer questions about the \
         portfolio: profile, skills, projects, work experience, education, \
         certifications, open source contributions, and contact details.\n\
         \n\
         ## Personality\n\
         - Professional but friendly and approachable\n\
         - Speak in FIRST PERSON, as {name}\n\
         - Confident yet humble about achievements\n\
         - Recruiter-focused: highlight concrete value\n\
         \n\
         ## How to Respond\n\
         1. ALWAYS use tools before making claims about portfolio data\n\
         2. Be specific about projects, skills, and experience\n\
         3. Include links when the data provides them\n\
         4. Offer to elaborate or provide more details\n\
         \n\
         ## Tool Guidance\n\
         - Projects: use get_projects or search_projects\n\
         - Skills and stack questions: use get_skills or get_tech_stack\n\
         - Work history: use get_experience\n\
         - Hiring questions: use get_availability, then schedule_meeting \
         if the visitor wants to connect\n\
         - Broad questions: use search_portfolio\n\
         \n\
         ## Off-Topic Handling\n\
         If a question is unrelated to {name}'s portfolio or professional \
         life, briefly acknowledge it and redirect to portfolio topics.",
        name = owner.name,
        headline = owner.headline,
    )
}

// ═══════════════════════════════════════════════════════════════════════
// Dispatch loop
// ═══════════════════════════════════════════════════════════════════════

/// Run one conversational turn and always produce a coherent answer:
/// tool failures are recoverable inside the loop, and a blown round
/// budget resolves to the fixed fallback answer.
pub async fn respond(
    provider: &dyn DecisionProvider,
    registry: &ToolRegistry,
    ctx: &ToolContext,
    config: &AgentConfig,
    owner: &OwnerConfig,
    message: &str,
    history: &[HistoryTurn],
) -> Result<String, Error> {
    if message.trim().is_empty() {
        return Err(Error::Validation("message is required".to_string()));
    }

    match run_rounds(provider, registry, ctx, config, owner, message, history).await {
        Err(Error::LoopBound(rounds)) => {
            tracing::warn!(rounds, "dispatch loop exhausted its round budget");
            Ok(FALLBACK_ANSWER.to_string())
        }
        other => other,
    }
}

async fn run_rounds(
    provider: &dyn DecisionProvider,
    registry: &ToolRegistry,
    ctx: &ToolContext,
    config: &AgentConfig,
    owner: &OwnerConfig,
    message: &str,
    history: &[HistoryTurn],
) -> Result<String, Error> {
    let specs = registry.specs();

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(instructions(owner)));
    for turn in history {
        messages.push(ChatMessage {
            role: turn.role.clone(),
            content: Some(turn.content.clone()),
            tool_calls: None,
            tool_call_id: None,
        });
    }
    messages.push(ChatMessage::user(message));

    for round in 0..config.max_rounds {
        match provider.decide(&messages, &specs).await? {
            Decision::Final(answer) => return Ok(answer),
            Decision::ToolCalls(calls) => {
                tracing::debug!(round, count = calls.len(), "tool calls requested");
                messages.push(ChatMessage::assistant_tool_calls(calls.clone()));
                for call in &calls {
                    let payload = execute_call(registry, ctx, call).await;
                    messages.push(ChatMessage::tool_result(
                        call.id.clone(),
                        payload.to_string(),
                    ));
                }
            }
        }
    }

    Err(Error::LoopBound(config.max_rounds))
}

/// Execute one requested invocation, converting every failure mode into a
/// payload the model can observe and recover from.
async fn execute_call(registry: &ToolRegistry, ctx: &ToolContext, call: &ToolCallRequest) -> Value {
    let args: Value = if call.function.arguments.trim().is_empty() {
        json!({})
    } else {
        match serde_json::from_str(&call.function.arguments) {
            Ok(value) => value,
            Err(e) => {
                return json!({ "error": format!("invalid tool arguments: {}", e) });
            }
        }
    };

    let execution = tokio::time::timeout(
        Duration::from_secs(TOOL_TIMEOUT_SECS),
        dispatch(registry, ctx, &call.function.name, &args),
    )
    .await;

    match execution {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => {
            tracing::debug!(tool = %call.function.name, %e, "tool invocation failed");
            json!({ "error": e.to_string() })
        }
        Err(_) => {
            tracing::warn!(tool = %call.function.name, "tool invocation timed out");
            json!({ "error": format!("tool timed out after {} seconds", TOOL_TIMEOUT_SECS) })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instructions_are_owner_specific() {
        let owner = OwnerConfig {
            name: "Jordan Reyes".to_string(),
            email: "jordan@example.com".to_string(),
            headline: "an AI-first full-stack engineer".to_string(),
        };
        let text = instructions(&owner);
        assert!(text.contains("Jordan Reyes"));
        assert!(text.contains("an AI-first full-stack engineer"));
        assert!(text.contains("get_projects"));
    }

    #[test]
    fn plain_messages_serialize_without_tool_fields() {
        let msg = ChatMessage::user("hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "hello");
        assert!(json.get("tool_calls").is_none());
        assert!(json.get("tool_call_id").is_none());
    }

    #[test]
    fn parse_completion_final_answer() {
        let payload = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "All done." } }]
        });
        match parse_completion(&payload).unwrap() {
            Decision::Final(answer) => assert_eq!(answer, "All done."),
            Decision::ToolCalls(_) => panic!("expected final answer"),
        }
    }

    #[test]
    fn parse_completion_tool_calls() {
        let payload = serde_json::json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": { "name": "get_skills", "arguments": "{\"category\":\"Frontend\"}" }
                    }]
                }
            }]
        });
        match parse_completion(&payload).unwrap() {
            Decision::ToolCalls(calls) => {
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].function.name, "get_skills");
                assert_eq!(calls[0].id, "call_1");
            }
            Decision::Final(_) => panic!("expected tool calls"),
        }
    }

    #[test]
    fn parse_completion_rejects_empty_payload() {
        assert!(parse_completion(&serde_json::json!({})).is_err());
        let no_content = serde_json::json!({
            "choices": [{ "message": { "role": "assistant" } }]
        });
        assert!(parse_completion(&no_content).is_err());
    }
}
