//! Optional retrieval/embedding capability. When configured, lets the
//! Director ground creative actions and content generation against a corpus
//! of prior events and lore; when absent, every call degrades to an empty
//! result and the caller proceeds without retrieval context.

use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct RetrievedDocument {
    pub text: String,
    pub score: f32,
    pub source: String,
}

#[async_trait]
pub trait RetrievalStore: Send + Sync {
    async fn add_documents(&self, texts: Vec<String>, source: &str) -> usize;

    async fn query(&self, text: &str, top_k: usize) -> Vec<RetrievedDocument>;

    fn is_available(&self) -> bool;
}

/// HTTP-backed store speaking a minimal `/embed` + `/query` protocol. Falls
/// back to an empty result set on any transport error.
pub struct HttpRetrievalStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRetrievalStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl RetrievalStore for HttpRetrievalStore {
    async fn add_documents(&self, texts: Vec<String>, source: &str) -> usize {
        let body = serde_json::json!({ "documents": texts, "source": source });
        match self.client.post(format!("{}/add", self.base_url)).json(&body).send().await {
            Ok(_) => texts_len_placeholder(&body),
            Err(_) => {
                crate::error::log_external_unavailable("retrieval", "add_documents call failed");
                0
            }
        }
    }

    async fn query(&self, text: &str, top_k: usize) -> Vec<RetrievedDocument> {
        let body = serde_json::json!({ "query": text, "top_k": top_k });
        let resp = match self.client.post(format!("{}/query", self.base_url)).json(&body).send().await {
            Ok(r) => r,
            Err(_) => {
                crate::error::log_external_unavailable("retrieval", "query call failed");
                return Vec::new();
            }
        };
        #[derive(serde::Deserialize)]
        struct Hit {
            text: String,
            score: f32,
            source: String,
        }
        #[derive(serde::Deserialize)]
        struct Response {
            results: Vec<Hit>,
        }
        match resp.json::<Response>().await {
            Ok(parsed) => parsed
                .results
                .into_iter()
                .map(|h| RetrievedDocument {
                    text: h.text,
                    score: h.score,
                    source: h.source,
                })
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    fn is_available(&self) -> bool {
        true
    }
}

fn texts_len_placeholder(body: &serde_json::Value) -> usize {
    body.get("documents").and_then(|v| v.as_array()).map(|a| a.len()).unwrap_or(0)
}

/// No retrieval backend configured. Every query returns empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRetrievalStore;

#[async_trait]
impl RetrievalStore for NullRetrievalStore {
    async fn add_documents(&self, _texts: Vec<String>, _source: &str) -> usize {
        0
    }

    async fn query(&self, _text: &str, _top_k: usize) -> Vec<RetrievedDocument> {
        Vec::new()
    }

    fn is_available(&self) -> bool {
        false
    }
}
