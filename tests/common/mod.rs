#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use serde_json::{Value, json};

use sommelier::{
    core::normalize::{NoteOrigin, normalize},
    synth::{SynthesisError, client::WineSynthesizer, transport::GenAiTransport},
    types::WineStyle,
    wine::{WineAnalysis, WineNote},
};

/// One recorded `generate_content` call.
#[derive(Debug, Clone)]
pub struct Call {
    pub api_key: String,
    pub model: String,
    pub body: Value,
}

/// Transport that replays queued replies and records every call.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<Value, SynthesisError>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, reply: Result<Value, SynthesisError>) {
        self.replies.lock().expect("lock").push_back(reply);
    }

    pub fn reply_text(&self, text: &str) {
        self.push(Ok(gemini_reply(text)));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("lock").len()
    }
}

#[async_trait]
impl GenAiTransport for ScriptedTransport {
    async fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        body: Value,
    ) -> Result<Value, SynthesisError> {
        self.calls.lock().expect("lock").push(Call {
            api_key: api_key.to_string(),
            model: model.to_string(),
            body,
        });
        self.replies
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| {
                Err(SynthesisError::Service {
                    status: None,
                    message: "no scripted reply".to_string(),
                })
            })
    }
}

pub fn synthesizer(transport: &Arc<ScriptedTransport>, api_key: Option<&str>) -> WineSynthesizer {
    WineSynthesizer::new(transport.clone(), api_key.map(str::to_string))
}

pub fn gemini_reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] }
        }]
    })
}

pub fn grounded_reply(text: &str, sources: &[(&str, &str)]) -> Value {
    let chunks: Vec<Value> = sources
        .iter()
        .map(|(title, uri)| json!({ "web": { "title": title, "uri": uri } }))
        .collect();
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "groundingMetadata": { "groundingChunks": chunks }
        }]
    })
}

pub const MONTE_BELLO: &str = r#"{
    "name": "Monte Bello",
    "winery": "Ridge Vineyards",
    "varietal": "Cabernet Sauvignon blend",
    "region": "Santa Cruz Mountains",
    "vintage": "2019",
    "style": "Red",
    "summary": "Cassis, graphite and cedar with firm structure.",
    "characteristics": { "body": 5, "acidity": 4, "tannin": 5, "sweetness": 1 }
}"#;

/// Search-origin record with the given fields and everything else defaulted.
pub fn note(id: &str, created_at: u64, rating: Option<u8>, vintage: &str, region: &str) -> WineNote {
    let mut n = normalize(
        WineAnalysis {
            name: Some(format!("Wine {id}")),
            vintage: Some(vintage.to_string()),
            region: Some(region.to_string()),
            style: Some(WineStyle::White),
            ..WineAnalysis::default()
        },
        NoteOrigin::Search { sources: vec![] },
        created_at,
    );
    n.id = id.to_string();
    n.rating = rating;
    n
}
