use std::collections::HashMap;

use civic_types::{reconcile, ContentKind, VoteDirection, VoteTally};
use thiserror::Error;

use crate::api::{ApiError, VoteApi};
use crate::auth::AuthState;

#[derive(Error, Debug)]
pub enum VoteError {
    #[error("You must be signed in to vote")]
    NotAuthenticated,

    #[error(transparent)]
    Api(#[from] ApiError),
}

type ItemKey = (ContentKind, String);

/// Casts votes and keeps the tallies this client has seen.
///
/// Cached tallies are moved only by the server-reported transition; a
/// failed request leaves them as they were.
pub struct VoteController<A: VoteApi> {
    api: A,
    tallies: HashMap<ItemKey, VoteTally>,
}

impl<A: VoteApi> VoteController<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            tallies: HashMap::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Cached tally for an item, if it has been loaded or voted on
    pub fn tally(&self, kind: ContentKind, item_id: &str) -> Option<VoteTally> {
        self.tallies.get(&(kind, item_id.to_string())).copied()
    }

    /// Fetch the current tally from the server and cache it
    pub async fn load(
        &mut self,
        auth: &AuthState,
        kind: ContentKind,
        item_id: &str,
    ) -> Result<VoteTally, VoteError> {
        let response = self.api.fetch_tally(auth.token(), kind, item_id).await?;
        let tally = VoteTally::from(&response);
        self.tallies.insert((kind, item_id.to_string()), tally);
        Ok(tally)
    }

    /// Send a vote and apply the reported transition to the cached tally
    pub async fn vote(
        &mut self,
        auth: &AuthState,
        kind: ContentKind,
        item_id: &str,
        direction: VoteDirection,
    ) -> Result<VoteTally, VoteError> {
        let token = auth.token().ok_or(VoteError::NotAuthenticated)?;

        log::debug!("Voting {} on {}/{}", direction.as_str(), kind.as_str(), item_id);
        let response = self.api.submit_vote(token, kind, item_id, direction).await?;
        log::debug!("Server reported {}", response.transition.as_str());

        let key = (kind, item_id.to_string());
        let tally = match self.tallies.get(&key) {
            Some(cached) => reconcile(*cached, response.transition, response.direction),
            // Nothing cached: take the server's counts as they are
            None => VoteTally::from(&response),
        };
        self.tallies.insert(key, tally);
        Ok(tally)
    }
}
