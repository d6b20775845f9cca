use serde::{Deserialize, Serialize};

use crate::enums::{VoteDirection, VoteTransition};
use crate::models::{TallyResponse, VoteResponse};

/// Client-held vote counters for one content item, plus the caller's own vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoteTally {
    pub upvotes: i64,
    pub downvotes: i64,
    pub own: Option<VoteDirection>,
}

impl VoteTally {
    pub fn new(upvotes: i64, downvotes: i64, own: Option<VoteDirection>) -> Self {
        Self {
            upvotes,
            downvotes,
            own,
        }
    }

    pub fn score(&self) -> i64 {
        self.upvotes - self.downvotes
    }

    /// Apply a server-acknowledged transition. See [`reconcile`].
    pub fn apply(self, transition: VoteTransition, requested: VoteDirection) -> Self {
        reconcile(self, transition, requested)
    }
}

impl From<&TallyResponse> for VoteTally {
    fn from(resp: &TallyResponse) -> Self {
        Self::new(resp.upvotes, resp.downvotes, resp.user_vote)
    }
}

impl From<&VoteResponse> for VoteTally {
    fn from(resp: &VoteResponse) -> Self {
        let own = match resp.transition {
            VoteTransition::Removed => None,
            VoteTransition::Added | VoteTransition::Changed => Some(resp.direction),
        };
        Self::new(resp.upvotes, resp.downvotes, own)
    }
}

/// Counter deltas `(up, down)` and the resulting own direction for a transition.
///
/// Total over every `(transition, requested)` pair. Consistency with the
/// current own direction is not checked; the server decides the transition.
pub fn transition_effect(
    transition: VoteTransition,
    requested: VoteDirection,
) -> (i64, i64, Option<VoteDirection>) {
    use VoteDirection::{Down, Up};
    use VoteTransition::{Added, Changed, Removed};

    match (transition, requested) {
        (Added, Up) => (1, 0, Some(Up)),
        (Added, Down) => (0, 1, Some(Down)),
        (Removed, Up) => (-1, 0, None),
        (Removed, Down) => (0, -1, None),
        (Changed, Up) => (1, -1, Some(Up)),
        (Changed, Down) => (-1, 1, Some(Down)),
    }
}

/// Translate a server-reported vote transition into the new local tally.
pub fn reconcile(
    tally: VoteTally,
    transition: VoteTransition,
    requested: VoteDirection,
) -> VoteTally {
    let (up, down, own) = transition_effect(transition, requested);
    VoteTally {
        upvotes: tally.upvotes + up,
        downvotes: tally.downvotes + down,
        own,
    }
}
