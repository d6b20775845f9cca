use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, TransactionBehavior};
use uuid::Uuid;

use civic_types::{ContentKind, TallyResponse, Vote, VoteDirection, VoteTransition};

use super::{enum_column, timestamp_column, uuid_column};
use crate::db::DbPool;

pub struct VoteRepository {
    pool: DbPool,
}

impl VoteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Apply a vote request and report how it changed the stored vote.
    ///
    /// No prior vote adds one, the same direction again removes it, and the
    /// opposite direction flips it. Runs in a single immediate transaction.
    pub fn cast(
        &self,
        user_id: &Uuid,
        kind: ContentKind,
        item_id: &str,
        direction: VoteDirection,
    ) -> Result<VoteTransition> {
        let mut conn = self.pool.get()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("Failed to start vote transaction")?;

        let previous = tx
            .query_row(
                "SELECT direction FROM votes WHERE user_id = ?1 AND item_kind = ?2 AND item_id = ?3",
                params![user_id.to_string(), kind.as_str(), item_id],
                |row| enum_column(row, 0, VoteDirection::parse),
            )
            .optional()?;

        let transition = VoteTransition::between(previous, direction);
        match transition {
            VoteTransition::Added => {
                tx.execute(
                    "INSERT INTO votes (user_id, item_kind, item_id, direction, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        user_id.to_string(),
                        kind.as_str(),
                        item_id,
                        direction.as_str(),
                        Utc::now().to_rfc3339()
                    ],
                )
                .context("Failed to insert vote")?;
            }
            VoteTransition::Removed => {
                tx.execute(
                    "DELETE FROM votes WHERE user_id = ?1 AND item_kind = ?2 AND item_id = ?3",
                    params![user_id.to_string(), kind.as_str(), item_id],
                )
                .context("Failed to delete vote")?;
            }
            VoteTransition::Changed => {
                tx.execute(
                    "UPDATE votes SET direction = ?4, created_at = ?5
                     WHERE user_id = ?1 AND item_kind = ?2 AND item_id = ?3",
                    params![
                        user_id.to_string(),
                        kind.as_str(),
                        item_id,
                        direction.as_str(),
                        Utc::now().to_rfc3339()
                    ],
                )
                .context("Failed to change vote")?;
            }
        }

        tx.commit().context("Failed to commit vote")?;
        Ok(transition)
    }

    /// Get a user's vote on an item
    pub fn get_vote(&self, user_id: &Uuid, kind: ContentKind, item_id: &str) -> Result<Option<Vote>> {
        let conn = self.pool.get()?;
        let vote = conn
            .query_row(
                "SELECT user_id, item_kind, item_id, direction, created_at
                 FROM votes
                 WHERE user_id = ?1 AND item_kind = ?2 AND item_id = ?3",
                params![user_id.to_string(), kind.as_str(), item_id],
                |row| {
                    Ok(Vote {
                        user_id: uuid_column(row, 0)?,
                        item_kind: enum_column(row, 1, ContentKind::parse)?,
                        item_id: row.get(2)?,
                        direction: enum_column(row, 3, VoteDirection::parse)?,
                        created_at: timestamp_column(row, 4)?,
                    })
                },
            )
            .optional()?;
        Ok(vote)
    }

    /// Count votes on an item, including the viewer's own vote when given
    pub fn tally(&self, kind: ContentKind, item_id: &str, viewer: Option<&Uuid>) -> Result<TallyResponse> {
        let (upvotes, downvotes) = {
            let conn = self.pool.get()?;
            conn.query_row(
                "SELECT
                    COALESCE(SUM(CASE WHEN direction = 'up' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN direction = 'down' THEN 1 ELSE 0 END), 0)
                 FROM votes
                 WHERE item_kind = ?1 AND item_id = ?2",
                params![kind.as_str(), item_id],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
            )
            .context("Failed to count votes")?
        };

        let user_vote = match viewer {
            Some(user_id) => self.get_vote(user_id, kind, item_id)?.map(|v| v.direction),
            None => None,
        };

        Ok(TallyResponse {
            item_kind: kind,
            item_id: item_id.to_string(),
            upvotes,
            downvotes,
            user_vote,
        })
    }
}
