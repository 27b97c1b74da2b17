use diesel::prelude::*;

use crate::domain::user::UserProfile as DomainUserProfile;
use crate::schema::user_profiles;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = user_profiles)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserProfile {
    pub id: i32,
    pub qualifications: String,
    pub skills: String,
    pub about: String,
    pub experience_years: i32,
}

impl From<UserProfile> for DomainUserProfile {
    fn from(row: UserProfile) -> Self {
        Self {
            id: row.id,
            qualifications: row.qualifications,
            skills: row.skills,
            about: row.about,
            experience_years: row.experience_years,
        }
    }
}
