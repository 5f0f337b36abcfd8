//! Semantic recall boundary.
//!
//! Best-effort retrieval of historically similar snippets from an external
//! embedding index. Recall must never block or fail a generation request:
//! the [`similar_snippets`] wrapper maps every failure to "no snippets".

use rp_domain::{Error, Result, Settings, SimilarMessageSnippet};
use serde_json::Value;

const EMBEDDING_MODEL: &str = "text-embedding-3-small";
const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

/// External collaborator returning top-K similar historical snippets.
#[async_trait::async_trait]
pub trait SemanticRecall: Send + Sync {
    async fn find_similar(
        &self,
        query: &str,
        thread_id: &str,
        k: usize,
    ) -> Result<Vec<SimilarMessageSnippet>>;
}

/// Recall implementation that always returns nothing.
pub struct NoRecall;

#[async_trait::async_trait]
impl SemanticRecall for NoRecall {
    async fn find_similar(
        &self,
        _query: &str,
        _thread_id: &str,
        _k: usize,
    ) -> Result<Vec<SimilarMessageSnippet>> {
        Ok(Vec::new())
    }
}

/// Map any recall failure to an empty snippet list.
pub async fn similar_snippets(
    recall: &dyn SemanticRecall,
    query: &str,
    thread_id: &str,
    k: usize,
) -> Vec<SimilarMessageSnippet> {
    match recall.find_similar(query, thread_id, k).await {
        Ok(snippets) => snippets,
        Err(e) => {
            tracing::error!(error = %e, "semantic recall lookup failed");
            Vec::new()
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// REST recall client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Recall client that embeds the query via the OpenAI embeddings API and
/// posts the vector to a configurable match endpoint.
///
/// The match endpoint takes `{query_embedding, thread_filter, match_count}`
/// and returns rows of `{text, ts, sender}`. When either the embeddings key
/// or the match URL is unconfigured, lookups quietly return nothing.
pub struct EmbeddingRecall {
    embeddings_api_key: String,
    match_url: String,
    match_key: String,
    client: reqwest::Client,
}

impl EmbeddingRecall {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            embeddings_api_key: settings.openai_api_key.clone(),
            match_url: settings.recall_match_url.clone(),
            match_key: settings.recall_match_key.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn is_configured(&self) -> bool {
        !self.embeddings_api_key.is_empty() && !self.match_url.is_empty()
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f64>> {
        let body = serde_json::json!({
            "model": EMBEDDING_MODEL,
            "input": query,
        });

        let resp = self
            .client
            .post(OPENAI_EMBEDDINGS_URL)
            .bearer_auth(&self.embeddings_api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::ProviderHttp {
                provider: "embeddings".into(),
                status: status.as_u16(),
            });
        }

        let json: Value = resp.json().await.map_err(|e| Error::Http(e.to_string()))?;
        let embedding = json
            .get("data")
            .and_then(|d| d.get(0))
            .and_then(|row| row.get("embedding"))
            .and_then(|e| e.as_array())
            .ok_or_else(|| Error::ProviderParse {
                provider: "embeddings".into(),
                message: "no embedding in response".into(),
            })?
            .iter()
            .filter_map(|v| v.as_f64())
            .collect();

        Ok(embedding)
    }
}

#[async_trait::async_trait]
impl SemanticRecall for EmbeddingRecall {
    async fn find_similar(
        &self,
        query: &str,
        thread_id: &str,
        k: usize,
    ) -> Result<Vec<SimilarMessageSnippet>> {
        let trimmed = query.trim();
        if trimmed.is_empty() || thread_id.is_empty() {
            return Ok(Vec::new());
        }
        if !self.is_configured() {
            tracing::debug!("recall index unconfigured; skipping semantic recall lookup");
            return Ok(Vec::new());
        }

        let embedding = self.embed_query(trimmed).await?;

        let body = serde_json::json!({
            "query_embedding": embedding,
            "thread_filter": thread_id,
            "match_count": k,
        });

        let resp = self
            .client
            .post(&self.match_url)
            .bearer_auth(&self.match_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::ProviderHttp {
                provider: "recall".into(),
                status: status.as_u16(),
            });
        }

        let rows: Vec<SimilarMessageSnippet> =
            resp.json().await.map_err(|e| Error::Http(e.to_string()))?;
        Ok(rows)
    }
}
