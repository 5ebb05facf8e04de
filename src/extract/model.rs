// src/extract/model.rs
// Model-based extraction strategy: one structured OpenAI request constrained
// to the `business_events` schema. Any failure here (auth, transport,
// unparseable payload) is an ExtractionFailure the caller recovers from by
// falling back to the keyword strategy.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::types::CandidateEvent;

const ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-4o-mini";

#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Run one structured-extraction request; returns the parsed events.
    async fn extract_events(&self, prompt: &str) -> Result<Vec<CandidateEvent>>;
    fn name(&self) -> &'static str;
}

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("shopwatch/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(20))
            .build()
            .context("building openai client")?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
            model: MODEL.to_string(),
        })
    }
}

/// Response shape pinned by `response_format`: an object with an `events`
/// array of CandidateEvent-shaped records.
fn response_schema() -> serde_json::Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "business_events",
            "schema": {
                "type": "object",
                "properties": {
                    "events": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "eventType": {"enum": ["opening", "closure", "reopening", "relocation"]},
                                "businessName": {"type": "string"},
                                "location": {"type": "string"},
                                "headline": {"type": "string"},
                                "date": {"type": "string"},
                                "sourceUrl": {"type": "string"},
                                "sourceOutlet": {"type": "string"},
                                "confidence": {"type": "number"}
                            },
                            "required": ["eventType", "businessName", "sourceUrl", "sourceOutlet", "confidence"]
                        }
                    }
                },
                "required": ["events"]
            }
        }
    })
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn extract_events(&self, prompt: &str) -> Result<Vec<CandidateEvent>> {
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let req = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": 0.1,
            "response_format": response_schema(),
        });

        let resp = self
            .http
            .post(ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("sending extraction request")?;

        if !resp.status().is_success() {
            bail!("extraction request failed with status {}", resp.status());
        }

        let body: Resp = resp.json().await.context("parsing extraction response")?;
        let content = body
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or_default();
        parse_events_payload(content)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Parse the model content into events. A payload that is not JSON matching
/// the `{events: [...]}` shape is an extraction failure; individual records
/// that cannot populate the required fields are dropped, not the whole
/// payload.
pub fn parse_events_payload(content: &str) -> Result<Vec<CandidateEvent>> {
    let value: serde_json::Value =
        serde_json::from_str(content).context("model payload is not valid json")?;
    let Some(events) = value.get("events").and_then(|e| e.as_array()) else {
        bail!("model payload has no events array");
    };
    Ok(events.iter().filter_map(CandidateEvent::from_value).collect())
}
