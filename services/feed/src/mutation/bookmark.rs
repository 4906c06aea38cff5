//! Bookmark toggling

use async_trait::async_trait;
use auth::{ApiResult, SessionManager};

use super::{Interaction, MutationController, Outcome};
use crate::api::FeedApi;
use crate::error::FeedResult;
use crate::models::{BookmarkResponse, Fact, FactId, FeedKind};

/// Bookmark rules
///
/// The intent is the desired bookmark value. The server endpoint is a plain
/// toggle, so its answer is adopted as ground truth even when it disagrees
/// with the optimistic value (another surface may have toggled meanwhile).
#[derive(Debug, Clone, Copy, Default)]
pub struct BookmarkRule;

#[async_trait]
impl Interaction for BookmarkRule {
    type State = bool;
    type Intent = bool;
    type Confirmed = BookmarkResponse;

    const ACTION: &'static str = "bookmark";

    fn plan(&self, current: &bool, intent: bool) -> Option<bool> {
        (*current != intent).then_some(intent)
    }

    fn reconcile(&self, _optimistic: &bool, _before: &bool, confirmed: BookmarkResponse) -> bool {
        confirmed.is_bookmarked
    }

    fn rollback(&self, _current: &bool, before: &bool, _applied: &bool) -> bool {
        *before
    }

    async fn submit(
        &self,
        api: &FeedApi,
        bearer: &str,
        fact_id: FactId,
        _intent: bool,
    ) -> ApiResult<BookmarkResponse> {
        api.toggle_bookmark(bearer, fact_id).await
    }
}

/// Bookmark toggle of one fact
pub type BookmarkController = MutationController<BookmarkRule>;

impl MutationController<BookmarkRule> {
    /// Hydrate the bookmark toggle from a fact loaded from the `kind` listing
    ///
    /// The listing payload does not always carry `is_bookmarked`; every fact
    /// in the bookmarks listing is bookmarked.
    pub fn for_fact(fact: &Fact, kind: FeedKind, api: FeedApi, session: SessionManager) -> Self {
        let bookmarked = fact.is_bookmarked || kind == FeedKind::Bookmarks;
        Self::new(fact.id, BookmarkRule, bookmarked, api, session)
    }

    /// Flip the displayed bookmark value
    pub async fn toggle(&self) -> FeedResult<Outcome<bool>> {
        let desired = !self.value();
        self.apply(desired).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use crate::testing::{anonymous_session, feed_api, signed_in_session};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BOOKMARK_PATH: &str = "/api/facts/feed/9/bookmark/";

    async fn controller(server: &MockServer, initial: bool) -> BookmarkController {
        let session = signed_in_session(server).await;
        MutationController::new(9, BookmarkRule, initial, feed_api(server), session)
    }

    #[tokio::test]
    async fn failed_bookmark_reverts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(BOOKMARK_PATH))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let bookmark = controller(&server, false).await;
        let err = bookmark.toggle().await.unwrap_err();

        assert!(matches!(err, FeedError::Rejected { action: "bookmark", .. }));
        assert!(!bookmark.value());
    }

    #[tokio::test]
    async fn server_value_wins_over_optimistic_guess() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(BOOKMARK_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "status": "bookmarked",
                    "is_bookmarked": true
                })),
            )
            .expect(1)
            .mount(&server)
            .await;

        // Displayed as bookmarked, the user un-bookmarks, but the server had
        // already been toggled elsewhere and reports the fact as bookmarked.
        let bookmark = controller(&server, true).await;
        let outcome = bookmark.toggle().await.unwrap();

        assert_eq!(outcome, Outcome::Confirmed(true));
        assert!(bookmark.value());
    }

    #[tokio::test]
    async fn toggle_on_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(BOOKMARK_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "status": "bookmarked",
                    "is_bookmarked": true
                })),
            )
            .mount(&server)
            .await;

        let bookmark = controller(&server, false).await;
        assert_eq!(bookmark.toggle().await.unwrap(), Outcome::Confirmed(true));
    }

    #[tokio::test]
    async fn setting_the_current_value_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let bookmark = controller(&server, true).await;
        assert_eq!(bookmark.apply(true).await.unwrap(), Outcome::NoChange(true));
    }

    #[tokio::test]
    async fn anonymous_bookmark_is_refused_locally() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let session = anonymous_session(&server).await;
        let bookmark =
            MutationController::new(9, BookmarkRule, false, feed_api(&server), session);

        let err = bookmark.toggle().await.unwrap_err();
        assert_eq!(err.to_string(), "Please log in to bookmark!");
        assert!(!bookmark.value());
    }
}
