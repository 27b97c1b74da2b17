/// Profile of a job seeker. Owned by the account service, read-only here.
#[derive(Clone, Debug, PartialEq)]
pub struct UserProfile {
    pub id: i32,
    pub qualifications: String,
    pub skills: String,
    pub about: String,
    pub experience_years: i32,
}

impl UserProfile {
    /// Text submitted to the scorer on the user side of each pair.
    pub fn match_text(&self) -> String {
        format!(
            "{}, {}, {}, {} years experience",
            self.qualifications, self.skills, self.about, self.experience_years
        )
    }
}
