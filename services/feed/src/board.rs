//! Loaded feed with one set of controllers per fact
//!
//! Controllers are hydrated from the listing each time it is loaded and are
//! never persisted; a reload throws the previous ones away. Requests still in
//! flight on a discarded controller settle into its own state only.

use auth::SessionManager;
use tracing::info;

use crate::api::FeedApi;
use crate::error::{FeedResult, require_bearer};
use crate::models::{Fact, FactId, FeedKind, NewFact};
use crate::mutation::{BookmarkController, VoteController};

/// One fact with its interactive widgets
///
/// `fact` is the listing payload as loaded; the live score, vote and bookmark
/// values are read from the controllers.
#[derive(Debug, Clone)]
pub struct FactCard {
    pub fact: Fact,
    pub vote: VoteController,
    pub bookmark: BookmarkController,
}

impl FactCard {
    fn hydrate(fact: Fact, kind: FeedKind, api: &FeedApi, session: &SessionManager) -> Self {
        let vote = VoteController::for_fact(&fact, api.clone(), session.clone());
        let bookmark = BookmarkController::for_fact(&fact, kind, api.clone(), session.clone());
        Self {
            fact,
            vote,
            bookmark,
        }
    }
}

/// The currently displayed listing
pub struct FactBoard {
    api: FeedApi,
    session: SessionManager,
    cards: Vec<FactCard>,
}

impl FactBoard {
    pub fn new(api: FeedApi, session: SessionManager) -> Self {
        Self {
            api,
            session,
            cards: Vec::new(),
        }
    }

    /// Load a listing and hydrate fresh controllers for it
    pub async fn load(&mut self, kind: FeedKind) -> FeedResult<&[FactCard]> {
        let bearer = if kind.requires_session() {
            Some(require_bearer(&self.session, "view bookmarks")?)
        } else {
            self.session.authorization_header_value()
        };

        let facts = self.api.list_facts(bearer.as_deref(), kind).await?;
        info!("Loaded {} facts for {:?} feed", facts.len(), kind);

        self.hydrate(kind, facts);
        Ok(&self.cards)
    }

    /// Replace the displayed listing
    pub fn hydrate(&mut self, kind: FeedKind, facts: Vec<Fact>) {
        self.cards = facts
            .into_iter()
            .map(|fact| FactCard::hydrate(fact, kind, &self.api, &self.session))
            .collect();
    }

    pub fn card(&self, id: FactId) -> Option<&FactCard> {
        self.cards.iter().find(|card| card.fact.id == id)
    }

    /// Post a new fact. The listing is not reloaded.
    pub async fn post(&self, fact: &NewFact) -> FeedResult<Fact> {
        let bearer = require_bearer(&self.session, "post a fact")?;
        let created = self.api.create_fact(&bearer, fact).await?;
        info!("Posted fact {}", created.id);
        Ok(created)
    }
}
