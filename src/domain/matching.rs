/// Decision returned by a scorer for one (user, posting) pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreDecision {
    pub matched: bool,
    /// Confidence of the decision; `None` when the scorer only decides.
    pub score: Option<f32>,
}

/// One entry of a user's ranked match list, before it is persisted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RankedMatch {
    pub posting_id: i32,
    /// 1-based position in the user's list.
    pub rank: i32,
    pub score: Option<f32>,
}

/// A persisted match.
#[derive(Clone, Debug, PartialEq)]
pub struct Match {
    pub user_id: i32,
    pub posting_id: i32,
    pub rank: i32,
    pub score: Option<f32>,
}
