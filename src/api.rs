use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::message::{HistoryRecord, Message};

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    response: String,
}

/// HTTP client for the Neura assistant service.
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Send one message and return the assistant's reply text. Any non-2xx
    /// status is a generic failure; the body is not inspected further.
    pub async fn send_message(&self, message: &str) -> Result<String> {
        let url = format!("{}/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { message })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("chat request failed with status: {}", response.status()));
        }

        let chat_response: ChatResponse = response.json().await?;
        Ok(chat_response.response)
    }

    /// Fetch the full message history, already mapped into the shared
    /// message shape. No pagination; the server returns everything.
    pub async fn fetch_history(&self) -> Result<Vec<Message>> {
        let url = format!("{}/api/chat/history", self.base_url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("history request failed with status: {}", response.status()));
        }

        let records: Vec<HistoryRecord> = response.json().await?;
        Ok(records.into_iter().map(HistoryRecord::into_message).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_wire_shape() {
        let body = serde_json::to_string(&ChatRequest { message: "hello" }).unwrap();
        assert_eq!(body, r#"{"message":"hello"}"#);
    }

    #[test]
    fn test_chat_response_wire_shape() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"response":"hi there"}"#).unwrap();
        assert_eq!(parsed.response, "hi there");
    }

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = ChatClient::new("http://127.0.0.1:5000/");
        assert_eq!(client.base_url, "http://127.0.0.1:5000");
    }
}
