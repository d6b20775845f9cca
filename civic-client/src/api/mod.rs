mod client;
mod error;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult};

use async_trait::async_trait;
use civic_types::{ContentKind, TallyResponse, VoteDirection, VoteResponse};

/// Voting endpoints, split out so the vote controller can run against a fake
#[async_trait]
pub trait VoteApi: Send + Sync {
    async fn submit_vote(
        &self,
        token: &str,
        kind: ContentKind,
        item_id: &str,
        direction: VoteDirection,
    ) -> ApiResult<VoteResponse>;

    async fn fetch_tally(
        &self,
        token: Option<&str>,
        kind: ContentKind,
        item_id: &str,
    ) -> ApiResult<TallyResponse>;
}
