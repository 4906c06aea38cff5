//! HTTP client for the facts and reputation endpoints

use auth::api::{ApiError, ApiResult, check_status};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use tracing::debug;

use crate::models::{BookmarkResponse, Fact, FactId, FeedKind, NewFact, Page, Vote, VoteResponse};

#[derive(Serialize)]
struct CastVoteRequest {
    vote_type: Vote,
}

/// Client for the feed API
///
/// Every call takes the `Authorization` header value explicitly. Callers read
/// it from the session right before the call, so no credential is cached here.
#[derive(Debug, Clone)]
pub struct FeedApi {
    client: Client,
    base_url: String,
}

impl FeedApi {
    /// Create a new feed API client
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(builder: RequestBuilder, bearer: Option<&str>) -> RequestBuilder {
        match bearer {
            Some(value) => builder.header(AUTHORIZATION, value),
            None => builder,
        }
    }

    /// Record a vote on a fact
    pub async fn cast_vote(
        &self,
        bearer: &str,
        fact_id: FactId,
        vote: Vote,
    ) -> ApiResult<VoteResponse> {
        debug!("Casting {} vote on fact {}", vote, fact_id);

        let request = self
            .client
            .post(self.url(&format!("/api/reputation/votes/{fact_id}/cast_vote/")))
            .json(&CastVoteRequest { vote_type: vote });
        let response = Self::authorized(request, Some(bearer)).send().await?;
        let response = check_status(response).await?;

        response.json().await.map_err(ApiError::Decode)
    }

    /// Toggle the acting user's bookmark on a fact
    pub async fn toggle_bookmark(
        &self,
        bearer: &str,
        fact_id: FactId,
    ) -> ApiResult<BookmarkResponse> {
        debug!("Toggling bookmark on fact {}", fact_id);

        let request = self
            .client
            .post(self.url(&format!("/api/facts/feed/{fact_id}/bookmark/")));
        let response = Self::authorized(request, Some(bearer)).send().await?;
        let response = check_status(response).await?;

        response.json().await.map_err(ApiError::Decode)
    }

    /// Load the first page of a listing
    ///
    /// Anonymous requests are allowed for the public listings; with a bearer
    /// the server fills in `user_vote` and `is_bookmarked`.
    pub async fn list_facts(&self, bearer: Option<&str>, kind: FeedKind) -> ApiResult<Vec<Fact>> {
        debug!("Loading {:?} feed", kind);

        let request = match kind {
            FeedKind::Latest => self
                .client
                .get(self.url("/api/facts/feed/"))
                .query(&[("ordering", "-created_at")]),
            FeedKind::Popular => self
                .client
                .get(self.url("/api/facts/feed/"))
                .query(&[("ordering", "-upvotes_count")]),
            FeedKind::Bookmarks => self.client.get(self.url("/api/facts/feed/bookmarks/")),
        };
        let response = Self::authorized(request, bearer).send().await?;
        let response = check_status(response).await?;

        let page: Page<Fact> = response.json().await.map_err(ApiError::Decode)?;
        Ok(page.results)
    }

    /// Post a new fact
    pub async fn create_fact(&self, bearer: &str, fact: &NewFact) -> ApiResult<Fact> {
        debug!("Posting new fact: {}", fact.title);

        let request = self.client.post(self.url("/api/facts/feed/")).json(fact);
        let response = Self::authorized(request, Some(bearer)).send().await?;
        let response = check_status(response).await?;

        response.json().await.map_err(ApiError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth::api::http_client;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_api(base_url: &str) -> FeedApi {
        FeedApi::new(http_client(Duration::from_secs(5)).unwrap(), base_url)
    }

    fn fact_json(id: i64, score: i64) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "title": format!("Fact {id}"),
            "content": "Octopuses have three hearts.",
            "score": score,
            "user_vote": null,
            "created_at": "2024-05-01T12:30:00Z"
        })
    }

    #[tokio::test]
    async fn cast_vote_sends_bearer_and_direction() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/reputation/votes/7/cast_vote/"))
            .and(header("authorization", "Bearer tok"))
            .and(body_json(serde_json::json!({"vote_type": "DOWN"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"status": "vote recorded", "type": "DOWN"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let response = test_api(&server.uri())
            .cast_vote("Bearer tok", 7, Vote::Down)
            .await
            .unwrap();
        assert_eq!(response.vote_type, Some(Vote::Down));
    }

    #[tokio::test]
    async fn list_popular_uses_ordering_and_reads_results() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/facts/feed/"))
            .and(query_param("ordering", "-upvotes_count"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "count": 2,
                "next": null,
                "previous": null,
                "results": [fact_json(1, 5), fact_json(2, 3)]
            })))
            .mount(&server)
            .await;

        let facts = test_api(&server.uri())
            .list_facts(None, FeedKind::Popular)
            .await
            .unwrap();
        assert_eq!(facts.len(), 2);
        assert_eq!(facts[0].score, 5);
    }

    #[tokio::test]
    async fn create_fact_rejected_carries_server_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/facts/feed/"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"title": ["This field is required."]})),
            )
            .mount(&server)
            .await;

        let fact = NewFact {
            title: String::new(),
            content: "text".to_string(),
            category_id: 1,
        };
        let err = test_api(&server.uri())
            .create_fact("Bearer tok", &fact)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Status { ref body, .. } if body.contains("required")));
    }
}
