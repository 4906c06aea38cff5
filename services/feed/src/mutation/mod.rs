//! Optimistic mutations of server state
//!
//! A [`MutationController`] drives one interactive entity (the vote widget or
//! the bookmark toggle of one fact) through `Idle -> Pending -> Idle`:
//!
//! 1. the new value is computed and shown before the request leaves,
//! 2. exactly one request is sent,
//! 3. on success the server's answer is adopted, on failure the value is
//!    rolled back relative to its own pre-state.
//!
//! While `Pending`, further applies are ignored, so requests for one
//! entity and interaction kind never overlap. The request and its settlement
//! run on a spawned task: dropping the future returned by `apply` does not
//! cancel them, and the entity always returns to `Idle`. The per-kind rules live in
//! [`vote`] and [`bookmark`].

pub mod bookmark;
pub mod vote;

use async_trait::async_trait;
use auth::{ApiResult, SessionManager};
use std::fmt::{self, Debug};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::FeedApi;
use crate::error::{FeedError, FeedResult, require_bearer};
use crate::models::FactId;

pub use bookmark::{BookmarkController, BookmarkRule};
pub use vote::{VoteController, VoteRule, VoteState};

/// Rules of one interaction kind
#[async_trait]
pub trait Interaction: Send + Sync + 'static {
    /// Displayed value
    type State: Clone + PartialEq + Debug + Send + Sync + 'static;
    /// What the user asked for
    type Intent: Copy + Debug + Send + Sync + 'static;
    /// Successful server response
    type Confirmed: Send + 'static;

    /// Verb used in user-facing notices, e.g. "vote"
    const ACTION: &'static str;

    /// Optimistic value for `intent`, or `None` when it changes nothing
    fn plan(&self, current: &Self::State, intent: Self::Intent) -> Option<Self::State>;

    /// Value to show once the server confirmed the change
    ///
    /// `before` is the value the optimistic step started from.
    fn reconcile(
        &self,
        optimistic: &Self::State,
        before: &Self::State,
        confirmed: Self::Confirmed,
    ) -> Self::State;

    /// Undo the optimistic step `before -> applied` on top of `current`
    fn rollback(
        &self,
        current: &Self::State,
        before: &Self::State,
        applied: &Self::State,
    ) -> Self::State;

    /// Send the change to the server
    async fn submit(
        &self,
        api: &FeedApi,
        bearer: &str,
        fact_id: FactId,
        intent: Self::Intent,
    ) -> ApiResult<Self::Confirmed>;
}

/// Whether a request is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Pending,
}

/// Displayed value plus its phase
#[derive(Debug, Clone, PartialEq)]
pub struct Entity<S> {
    pub value: S,
    pub phase: Phase,
}

/// Result of an apply that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<S> {
    /// The server accepted the change; carries the settled value
    Confirmed(S),
    /// The intent matches what is already shown; nothing was sent
    NoChange(S),
    /// A request for this entity is already in flight; nothing was sent
    Busy,
}

enum Decision<S> {
    Busy,
    NoChange(S),
    Started { before: S, applied: S },
}

/// Optimistic state machine for one entity and interaction kind
///
/// Clones share state. The displayed value is published on a `watch` channel
/// for the presentation layer; settling after every receiver is gone is fine.
pub struct MutationController<I: Interaction> {
    fact_id: FactId,
    rule: Arc<I>,
    api: FeedApi,
    session: SessionManager,
    state: Arc<watch::Sender<Entity<I::State>>>,
}

impl<I: Interaction> Clone for MutationController<I> {
    fn clone(&self) -> Self {
        Self {
            fact_id: self.fact_id,
            rule: Arc::clone(&self.rule),
            api: self.api.clone(),
            session: self.session.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<I: Interaction> Debug for MutationController<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationController")
            .field("fact_id", &self.fact_id)
            .field("entity", &*self.state.borrow())
            .finish()
    }
}

impl<I: Interaction> MutationController<I> {
    /// Hydrate a controller from a server-confirmed value
    pub fn new(
        fact_id: FactId,
        rule: I,
        initial: I::State,
        api: FeedApi,
        session: SessionManager,
    ) -> Self {
        Self {
            fact_id,
            rule: Arc::new(rule),
            api,
            session,
            state: Arc::new(watch::Sender::new(Entity {
                value: initial,
                phase: Phase::Idle,
            })),
        }
    }

    /// Currently displayed value
    pub fn value(&self) -> I::State {
        self.state.borrow().value.clone()
    }

    pub fn phase(&self) -> Phase {
        self.state.borrow().phase
    }

    /// Watch the displayed value
    pub fn subscribe(&self) -> watch::Receiver<Entity<I::State>> {
        self.state.subscribe()
    }

    /// Apply `intent` optimistically, submit it, then reconcile or roll back
    pub async fn apply(&self, intent: I::Intent) -> FeedResult<Outcome<I::State>> {
        let bearer = require_bearer(&self.session, I::ACTION)?;

        let mut decision = Decision::Busy;
        self.state.send_if_modified(|entity| {
            if entity.phase == Phase::Pending {
                return false;
            }
            match self.rule.plan(&entity.value, intent) {
                None => {
                    decision = Decision::NoChange(entity.value.clone());
                    false
                }
                Some(applied) => {
                    decision = Decision::Started {
                        before: entity.value.clone(),
                        applied: applied.clone(),
                    };
                    entity.value = applied;
                    entity.phase = Phase::Pending;
                    true
                }
            }
        });

        let (before, applied) = match decision {
            Decision::Busy => {
                debug!("{} on fact {} already pending, ignoring", I::ACTION, self.fact_id);
                return Ok(Outcome::Busy);
            }
            Decision::NoChange(value) => return Ok(Outcome::NoChange(value)),
            Decision::Started { before, applied } => (before, applied),
        };
        debug!(
            "Optimistic {} on fact {}: {:?} -> {:?}",
            I::ACTION,
            self.fact_id,
            before,
            applied
        );

        let settle = self
            .clone()
            .settle(bearer, intent, before.clone(), applied.clone());
        let task = tokio::spawn(settle);
        match task.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                // Runtime shutting down
                warn!("{} on fact {} interrupted: {}", I::ACTION, self.fact_id, e);
                self.state.send_modify(|entity| {
                    if entity.phase == Phase::Pending {
                        entity.value = self.rule.rollback(&entity.value, &before, &applied);
                        entity.phase = Phase::Idle;
                    }
                });
                Err(FeedError::Interrupted { action: I::ACTION })
            }
        }
    }

    /// Submit the change and settle the entity with the outcome
    async fn settle(
        self,
        bearer: String,
        intent: I::Intent,
        before: I::State,
        applied: I::State,
    ) -> FeedResult<Outcome<I::State>> {
        let result = self
            .rule
            .submit(&self.api, &bearer, self.fact_id, intent)
            .await;

        match result {
            Ok(confirmed) => {
                self.state.send_modify(|entity| {
                    entity.value = self.rule.reconcile(&entity.value, &before, confirmed);
                    entity.phase = Phase::Idle;
                });
                info!("{} on fact {} confirmed", I::ACTION, self.fact_id);
                Ok(Outcome::Confirmed(self.value()))
            }
            Err(source) => {
                self.state.send_modify(|entity| {
                    entity.value = self.rule.rollback(&entity.value, &before, &applied);
                    entity.phase = Phase::Idle;
                });
                warn!("{} on fact {} failed, rolled back: {}", I::ACTION, self.fact_id, source);
                Err(FeedError::Rejected {
                    action: I::ACTION,
                    source,
                })
            }
        }
    }
}
