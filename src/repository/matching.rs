use chrono::Utc;
use diesel::prelude::*;

use crate::domain::matching::{Match, RankedMatch};
use crate::models::matching::{Match as DbMatch, NewMatch};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, MatchReader, MatchWriter};

impl MatchReader for DieselRepository {
    fn list_matches(&self, user_id: i32) -> RepositoryResult<Vec<Match>> {
        use crate::schema::matches;

        let mut conn = self.conn()?;

        let rows = matches::table
            .filter(matches::user_id.eq(user_id))
            .order(matches::rank.asc())
            .select(DbMatch::as_select())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(Match::from).collect())
    }
}

impl MatchWriter for DieselRepository {
    fn replace_matches(&self, user_id: i32, ranked: &[RankedMatch]) -> RepositoryResult<usize> {
        use crate::schema::matches;

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        let inserted = conn.transaction(|conn| {
            diesel::delete(matches::table.filter(matches::user_id.eq(user_id))).execute(conn)?;

            let mut inserted_rows = 0;
            for entry in ranked {
                let row = NewMatch {
                    user_id,
                    posting_id: entry.posting_id,
                    rank: entry.rank,
                    score: entry.score,
                    created_at: now,
                };
                inserted_rows += diesel::insert_into(matches::table)
                    .values(&row)
                    .execute(conn)?;
            }
            Ok::<usize, RepositoryError>(inserted_rows)
        })?;

        Ok(inserted)
    }
}
