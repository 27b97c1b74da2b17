use std::collections::HashSet;

use crate::domain::matching::{RankedMatch, ScoreDecision};
use crate::inference::{ModelError, Scorer};
use crate::processing::{Deadline, StageError};
use crate::repository::{CategorizedPostingReader, MatchWriter, UserProfileReader};

/// Default number of matches kept per user.
pub const DEFAULT_TOP_N: usize = 6;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub users: usize,
    pub postings: usize,
    pub pairs_scored: usize,
    pub matches_saved: usize,
    pub users_failed: usize,
}

/// Rank scored candidates, given in scan order.
///
/// Only positive decisions are kept, and a posting is kept at most once.
/// When every kept candidate carries a finite score the list is sorted by
/// descending score with ascending posting id breaking ties; otherwise scan
/// order is preserved. The result holds at most `top_n` entries with 1-based
/// ranks.
pub fn rank_candidates(candidates: &[(i32, ScoreDecision)], top_n: usize) -> Vec<RankedMatch> {
    let mut seen = HashSet::new();
    let mut kept = candidates
        .iter()
        .filter(|(posting_id, decision)| decision.matched && seen.insert(*posting_id))
        .map(|(posting_id, decision)| (*posting_id, decision.score))
        .collect::<Vec<_>>();

    let all_scored = kept
        .iter()
        .all(|(_, score)| score.is_some_and(f32::is_finite));
    if all_scored {
        kept.sort_by(|(a_id, a_score), (b_id, b_score)| {
            let a = a_score.unwrap_or_default();
            let b = b_score.unwrap_or_default();
            b.total_cmp(&a).then(a_id.cmp(b_id))
        });
    }

    kept.into_iter()
        .take(top_n)
        .zip(1..)
        .map(|((posting_id, score), rank)| RankedMatch {
            posting_id,
            rank,
            score,
        })
        .collect()
}

/// Score one user against every posting and rank the positives.
pub fn match_user(
    scorer: &dyn Scorer,
    user_text: &str,
    postings: &[(i32, String)],
    top_n: usize,
) -> Result<Vec<RankedMatch>, ModelError> {
    let candidates = postings
        .iter()
        .map(|(posting_id, job_text)| {
            scorer
                .score(user_text, job_text)
                .map(|decision| (*posting_id, decision))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rank_candidates(&candidates, top_n))
}

/// Recompute and persist the top `top_n` matches of every user.
///
/// A scorer failure aborts the stage. A failure to persist one user's
/// matches is logged and the remaining users are still processed; all such
/// failures are reported together once every user has been handled.
pub fn batch_save_all_matches<R>(
    repo: &R,
    scorer: &dyn Scorer,
    top_n: usize,
) -> Result<MatchStats, StageError>
where
    R: UserProfileReader + CategorizedPostingReader + MatchWriter,
{
    save_matches_within(repo, scorer, top_n, Deadline::unbounded())
}

/// [`batch_save_all_matches`] bounded by `deadline`.
///
/// The deadline is checked once the corpus is embedded and before every
/// user's matches are replaced. Users written before the deadline keep
/// their new matches; nobody is written after it.
pub fn save_matches_within<R>(
    repo: &R,
    scorer: &dyn Scorer,
    top_n: usize,
    deadline: Deadline,
) -> Result<MatchStats, StageError>
where
    R: UserProfileReader + CategorizedPostingReader + MatchWriter,
{
    let mut stats = MatchStats::default();

    let postings = repo
        .list_categorized_postings()?
        .into_iter()
        .map(|posting| (posting.id, posting.description))
        .collect::<Vec<_>>();
    if postings.is_empty() {
        log::warn!("No categorized postings to match against");
        return Err(StageError::DataAbsent(
            "no categorized postings to match against".to_string(),
        ));
    }
    stats.postings = postings.len();

    let users = repo.list_user_profiles()?;
    stats.users = users.len();
    if users.is_empty() {
        log::warn!("No user profiles found; nothing to match");
        return Ok(stats);
    }

    let job_texts = postings
        .iter()
        .map(|(_, text)| text.clone())
        .collect::<Vec<_>>();
    scorer.prime(&job_texts)?;
    deadline.check()?;

    let mut failures = Vec::new();
    for user in users {
        let ranked = match_user(scorer, &user.match_text(), &postings, top_n)?;
        stats.pairs_scored += postings.len();
        deadline.check()?;

        match repo.replace_matches(user.id, &ranked) {
            Ok(saved) => {
                log::debug!("Saved {saved} matches for user {}", user.id);
                stats.matches_saved += saved;
            }
            Err(error) => {
                log::error!("Failed to save matches for user {}: {error}", user.id);
                failures.push((user.id, error));
            }
        }
    }

    stats.users_failed = failures.len();
    if !failures.is_empty() {
        return Err(StageError::MatchPersistence {
            total: stats.users,
            failures,
        });
    }

    Ok(stats)
}
