//! Feed client for the Facts application
//!
//! Loads fact listings and drives the optimistic vote and bookmark widgets of
//! every fact. Credentials come from an [`auth::SessionManager`] owned by the
//! caller.

pub mod api;
pub mod board;
pub mod error;
pub mod models;
pub mod mutation;

#[cfg(test)]
mod testing;

pub use api::FeedApi;
pub use board::{FactBoard, FactCard};
pub use error::{FeedError, FeedResult};
pub use models::{Fact, FactId, FeedKind, NewFact, Vote};
pub use mutation::{
    BookmarkController, Entity, Interaction, MutationController, Outcome, Phase, VoteController,
    VoteState,
};
