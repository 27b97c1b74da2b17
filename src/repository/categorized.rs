use chrono::Utc;
use diesel::prelude::*;
use diesel::upsert::excluded;

use crate::domain::posting::{CategorizedPosting, NewCategorizedPosting};
use crate::models::posting::{
    CategorizedPosting as DbCategorizedPosting, NewCategorizedPosting as DbNewCategorizedPosting,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{CategorizedPostingReader, CategorizedPostingWriter, DieselRepository};

impl CategorizedPostingReader for DieselRepository {
    fn list_categorized_postings(&self) -> RepositoryResult<Vec<CategorizedPosting>> {
        use crate::schema::categorized_postings;

        let mut conn = self.conn()?;

        let rows = categorized_postings::table
            .order(categorized_postings::id.asc())
            .select(DbCategorizedPosting::as_select())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(CategorizedPosting::from).collect())
    }
}

impl CategorizedPostingWriter for DieselRepository {
    fn upsert_categorized(&self, rows: &[NewCategorizedPosting]) -> RepositoryResult<usize> {
        use crate::schema::categorized_postings as cp;

        if rows.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        let affected = conn.transaction(|conn| {
            let mut affected_rows = 0;
            for row in rows {
                let db_row = DbNewCategorizedPosting::from_domain(row, now);
                affected_rows += diesel::insert_into(cp::table)
                    .values(&db_row)
                    .on_conflict((
                        cp::title,
                        cp::company,
                        cp::location,
                        cp::job_type,
                        cp::date_posted,
                        cp::url,
                        cp::source,
                        cp::description,
                    ))
                    .do_update()
                    .set(cp::category.eq(excluded(cp::category)))
                    .execute(conn)?;
            }
            Ok::<usize, RepositoryError>(affected_rows)
        })?;

        Ok(affected)
    }
}
