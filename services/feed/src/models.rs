//! API models for request and response payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fact identifier
pub type FactId = i64;

/// Vote direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vote {
    #[serde(rename = "UP")]
    Up,
    #[serde(rename = "DOWN")]
    Down,
}

impl Vote {
    /// Score contribution of a single vote in this direction
    pub fn weight(self) -> i64 {
        match self {
            Vote::Up => 1,
            Vote::Down => -1,
        }
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Vote::Up => "UP",
            Vote::Down => "DOWN",
        })
    }
}

/// Author summary shown next to a fact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub username: String,
    #[serde(default)]
    pub is_verified: bool,
}

/// Category summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub icon_name: Option<String>,
}

/// Fact as returned by the feed endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub id: FactId,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub score: i64,
    /// The acting user's vote, `None` when anonymous or not voted
    #[serde(default)]
    pub user_vote: Option<Vote>,
    #[serde(default)]
    pub is_bookmarked: bool,
    pub created_at: DateTime<Utc>,
}

/// One page of a listing. Only `results` is consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// Request for posting a new fact
#[derive(Debug, Clone, Serialize)]
pub struct NewFact {
    pub title: String,
    pub content: String,
    pub category_id: i64,
}

/// Response for a cast vote
#[derive(Debug, Clone, Deserialize)]
pub struct VoteResponse {
    #[serde(default)]
    pub status: Option<String>,
    /// Vote recorded by the server
    #[serde(rename = "type", default)]
    pub vote_type: Option<Vote>,
    /// Resulting tally, when the server reports it
    #[serde(default)]
    pub score: Option<i64>,
}

/// Response for a bookmark toggle
#[derive(Debug, Clone, Deserialize)]
pub struct BookmarkResponse {
    #[serde(default)]
    pub status: Option<String>,
    pub is_bookmarked: bool,
}

/// Which listing to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedKind {
    /// Newest first
    #[default]
    Latest,
    /// Most upvoted first
    Popular,
    /// The acting user's bookmarks, requires a session
    Bookmarks,
}

impl FeedKind {
    pub fn requires_session(self) -> bool {
        self == FeedKind::Bookmarks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fact_from_listing_payload() {
        let payload = serde_json::json!({
            "id": 12,
            "title": "Honey never spoils",
            "slug": "honey-never-spoils",
            "content": "Archaeologists found edible honey in ancient tombs.",
            "image": null,
            "author": {"id": 3, "username": "ada", "is_verified": true},
            "category": {"id": 1, "name": "Science", "slug": "science", "icon_name": "flask"},
            "sources": [],
            "score": 10,
            "user_vote": "UP",
            "created_at": "2024-05-01T12:30:00.123456Z",
            "status": "APPROVED"
        });

        let fact: Fact = serde_json::from_value(payload).unwrap();
        assert_eq!(fact.id, 12);
        assert_eq!(fact.score, 10);
        assert_eq!(fact.user_vote, Some(Vote::Up));
        assert!(!fact.is_bookmarked);
        assert_eq!(fact.author.unwrap().username, "ada");
    }

    #[test]
    fn test_vote_response_without_type() {
        let response: VoteResponse =
            serde_json::from_value(serde_json::json!({"status": "vote recorded"})).unwrap();
        assert_eq!(response.vote_type, None);
        assert_eq!(response.score, None);

        let response: VoteResponse = serde_json::from_value(
            serde_json::json!({"status": "vote recorded", "type": "DOWN"}),
        )
        .unwrap();
        assert_eq!(response.vote_type, Some(Vote::Down));
    }
}
