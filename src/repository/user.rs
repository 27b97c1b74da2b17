use diesel::prelude::*;

use crate::domain::user::UserProfile;
use crate::models::user::UserProfile as DbUserProfile;
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, UserProfileReader};

impl UserProfileReader for DieselRepository {
    fn list_user_profiles(&self) -> RepositoryResult<Vec<UserProfile>> {
        use crate::schema::user_profiles;

        let mut conn = self.conn()?;

        let rows = user_profiles::table
            .order(user_profiles::id.asc())
            .select(DbUserProfile::as_select())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(UserProfile::from).collect())
    }
}
