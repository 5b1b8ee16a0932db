use super::ICinemaVoteRepo;
use kinobot_domain::{ChatId, CinemaVote, UserId};
use sqlx::{FromRow, PgPool};

pub struct PostgresCinemaVoteRepo {
    pool: PgPool,
}

impl PostgresCinemaVoteRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CinemaVoteRaw {
    chat_id: i64,
    film_id: i64,
    deadline: i64,
    message_ref: i64,
    yes_voters: Vec<i64>,
    no_voters: Vec<i64>,
}

impl From<CinemaVoteRaw> for CinemaVote {
    fn from(raw: CinemaVoteRaw) -> Self {
        Self {
            chat_id: ChatId(raw.chat_id),
            film_id: raw.film_id,
            deadline: raw.deadline,
            message_ref: raw.message_ref,
            yes_voters: raw.yes_voters.into_iter().map(UserId).collect(),
            no_voters: raw.no_voters.into_iter().map(UserId).collect(),
        }
    }
}

fn voter_ids(voters: &[UserId]) -> Vec<i64> {
    voters.iter().map(|voter| voter.0).collect()
}

#[async_trait::async_trait]
impl ICinemaVoteRepo for PostgresCinemaVoteRepo {
    async fn insert(&self, vote: &CinemaVote) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO cinema_votes
            (chat_id, film_id, deadline, message_ref, yes_voters, no_voters)
            VALUES($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(vote.chat_id.0)
        .bind(vote.film_id)
        .bind(vote.deadline)
        .bind(vote.message_ref)
        .bind(voter_ids(&vote.yes_voters))
        .bind(voter_ids(&vote.no_voters))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save(&self, vote: &CinemaVote) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE cinema_votes SET
                deadline = $3,
                message_ref = $4,
                yes_voters = $5,
                no_voters = $6
            WHERE chat_id = $1 AND film_id = $2
            "#,
        )
        .bind(vote.chat_id.0)
        .bind(vote.film_id)
        .bind(vote.deadline)
        .bind(vote.message_ref)
        .bind(voter_ids(&vote.yes_voters))
        .bind(voter_ids(&vote.no_voters))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, chat_id: ChatId, film_id: i64) -> Option<CinemaVote> {
        sqlx::query_as::<_, CinemaVoteRaw>(
            r#"
            SELECT * FROM cinema_votes
            WHERE chat_id = $1 AND film_id = $2
            "#,
        )
        .bind(chat_id.0)
        .bind(film_id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or(None)
        .map(|vote| vote.into())
    }

    async fn find_past_deadline(&self, before: i64) -> Vec<CinemaVote> {
        sqlx::query_as::<_, CinemaVoteRaw>(
            r#"
            SELECT * FROM cinema_votes
            WHERE deadline <= $1
            "#,
        )
        .bind(before)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|vote| vote.into())
        .collect()
    }

    async fn delete(&self, chat_id: ChatId, film_id: i64) -> Option<CinemaVote> {
        sqlx::query_as::<_, CinemaVoteRaw>(
            r#"
            DELETE FROM cinema_votes
            WHERE chat_id = $1 AND film_id = $2
            RETURNING *
            "#,
        )
        .bind(chat_id.0)
        .bind(film_id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or(None)
        .map(|vote| vote.into())
    }
}
