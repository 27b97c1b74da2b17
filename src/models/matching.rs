use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::matching::Match as DomainMatch;
use crate::schema::matches;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = matches)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Match {
    pub id: i32,
    pub user_id: i32,
    pub posting_id: i32,
    pub rank: i32,
    pub score: Option<f32>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = matches)]
pub struct NewMatch {
    pub user_id: i32,
    pub posting_id: i32,
    pub rank: i32,
    pub score: Option<f32>,
    pub created_at: NaiveDateTime,
}

impl From<Match> for DomainMatch {
    fn from(row: Match) -> Self {
        Self {
            user_id: row.user_id,
            posting_id: row.posting_id,
            rank: row.rank,
            score: row.score,
        }
    }
}
