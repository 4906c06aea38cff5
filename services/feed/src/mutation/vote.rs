//! Vote casting
//!
//! Score delta for a requested vote `r` given the current vote `c`:
//!
//! | current | requested | delta |
//! |---------|-----------|-------|
//! | none    | up / down | +1 / -1 |
//! | down    | up        | +2    |
//! | up      | down      | -2    |
//! | same as requested | | no-op, nothing is sent |

use async_trait::async_trait;
use auth::{ApiResult, SessionManager};

use super::{Interaction, MutationController, Outcome};
use crate::api::FeedApi;
use crate::error::FeedResult;
use crate::models::{Fact, FactId, Vote, VoteResponse};

/// Displayed tally and the acting user's vote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteState {
    pub score: i64,
    pub user_vote: Option<Vote>,
}

impl From<&Fact> for VoteState {
    fn from(fact: &Fact) -> Self {
        Self {
            score: fact.score,
            user_vote: fact.user_vote,
        }
    }
}

/// Score change for moving from `current` to `requested`, `None` if unchanged
pub fn vote_delta(current: Option<Vote>, requested: Vote) -> Option<i64> {
    match current {
        Some(current) if current == requested => None,
        None => Some(requested.weight()),
        // Flip: drop the old vote and add the new one
        Some(_) => Some(2 * requested.weight()),
    }
}

/// Vote rules
#[derive(Debug, Clone, Copy, Default)]
pub struct VoteRule;

#[async_trait]
impl Interaction for VoteRule {
    type State = VoteState;
    type Intent = Vote;
    type Confirmed = VoteResponse;

    const ACTION: &'static str = "vote";

    fn plan(&self, current: &VoteState, intent: Vote) -> Option<VoteState> {
        vote_delta(current.user_vote, intent).map(|delta| VoteState {
            score: current.score + delta,
            user_vote: Some(intent),
        })
    }

    fn reconcile(
        &self,
        optimistic: &VoteState,
        before: &VoteState,
        confirmed: VoteResponse,
    ) -> VoteState {
        match (confirmed.score, confirmed.vote_type) {
            (Some(score), vote_type) => VoteState {
                score,
                user_vote: vote_type.or(optimistic.user_vote),
            },
            // The server recorded another direction without a tally: derive
            // the score from the pre-apply state
            (None, Some(recorded)) if Some(recorded) != optimistic.user_vote => VoteState {
                score: before.score + vote_delta(before.user_vote, recorded).unwrap_or(0),
                user_vote: Some(recorded),
            },
            (None, _) => *optimistic,
        }
    }

    fn rollback(&self, current: &VoteState, before: &VoteState, applied: &VoteState) -> VoteState {
        VoteState {
            score: current.score - (applied.score - before.score),
            user_vote: before.user_vote,
        }
    }

    async fn submit(
        &self,
        api: &FeedApi,
        bearer: &str,
        fact_id: FactId,
        intent: Vote,
    ) -> ApiResult<VoteResponse> {
        api.cast_vote(bearer, fact_id, intent).await
    }
}

/// Vote widget of one fact
pub type VoteController = MutationController<VoteRule>;

impl MutationController<VoteRule> {
    /// Hydrate the vote widget from a loaded fact
    pub fn for_fact(fact: &Fact, api: FeedApi, session: SessionManager) -> Self {
        Self::new(fact.id, VoteRule, VoteState::from(fact), api, session)
    }

    /// Cast `vote`
    pub async fn vote(&self, vote: Vote) -> FeedResult<Outcome<VoteState>> {
        self.apply(vote).await
    }
}
