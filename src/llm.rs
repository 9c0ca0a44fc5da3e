use anyhow::{Context, Result, anyhow};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;
use crate::http_client::http_client;

const TEMPERATURE: f64 = 0.4;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f64,
    response_format: ResponseFormat,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Sends one system+user exchange and returns the reply parsed as JSON.
pub fn complete_json(cfg: &Config, system: &str, user: &str) -> Result<Value> {
    let key = cfg
        .llm_api_key
        .as_deref()
        .ok_or_else(|| anyhow!("LLM_API_KEY is not set"))?;
    let client = http_client(cfg.http_timeout)?;
    let url = format!("{}/chat/completions", cfg.llm_base_url);
    let request = ChatRequest {
        model: &cfg.llm_model,
        temperature: TEMPERATURE,
        response_format: ResponseFormat {
            kind: "json_object",
        },
        messages: vec![
            ChatMessage {
                role: "system",
                content: system,
            },
            ChatMessage {
                role: "user",
                content: user,
            },
        ],
    };

    debug!("POST {url} model={}", cfg.llm_model);
    let resp = client
        .post(&url)
        .bearer_auth(key)
        .json(&request)
        .send()
        .context("llm request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading llm body")?;
    if !status.is_success() {
        let preview: String = body.chars().take(200).collect();
        return Err(anyhow!("llm http {status}: {preview}"));
    }
    parse_chat_response(&body)
}

pub fn parse_chat_response(raw: &str) -> Result<Value> {
    let resp: ChatResponse = serde_json::from_str(raw).context("invalid llm response json")?;
    let content = resp
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| anyhow!("llm reply had no content"))?;
    serde_json::from_str(strip_code_fence(&content)).context("llm content is not json")
}

/// Models sometimes wrap JSON in ```json fences despite the response format.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_first_choice_content() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"{\"signals\":[]}"}}]}"#;
        let value = parse_chat_response(raw).unwrap();
        assert!(value["signals"].as_array().is_some_and(|a| a.is_empty()));
    }

    #[test]
    fn fenced_content_is_unwrapped() {
        let raw = r#"{"choices":[{"message":{"content":"```json\n{\"ok\":true}\n```"}}]}"#;
        let value = parse_chat_response(raw).unwrap();
        assert_eq!(value["ok"], true);
    }

    #[test]
    fn empty_choices_is_an_error() {
        assert!(parse_chat_response(r#"{"choices":[]}"#).is_err());
        let not_json = r#"{"choices":[{"message":{"content":"not json"}}]}"#;
        assert!(parse_chat_response(not_json).is_err());
    }
}
