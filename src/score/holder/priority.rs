//! Priority ordering for the holder analyzer's work queue (spec §4.5.2):
//! milestone crossings first, then instant-analysis candidates, then stale
//! scores, then progress descending.

use chrono::{DateTime, Utc};

const MILESTONES: [f64; 8] = [10.0, 15.0, 25.0, 50.0, 75.0, 90.0, 95.0, 100.0];
const INSTANT_ANALYSIS_TECHNICAL_SCORE: u32 = 180;
const STALE_AFTER_SECS: i64 = 30 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    /// Lowest `Ord` rank sorts first; `Milestone` is the highest priority.
    ProgressOnly(i64),
    Stale,
    InstantAnalysis,
    Milestone,
}

pub struct Candidate {
    pub progress_pct: f64,
    pub technical_score: u32,
    pub has_holder_score: bool,
    pub last_scored_at: Option<DateTime<Utc>>,
}

/// Returns `true` if `progress` just crossed one of the fixed milestones
/// (i.e. `previous < milestone <= progress`).
pub fn crossed_milestone(previous_progress: f64, progress: f64) -> bool {
    MILESTONES.iter().any(|&m| previous_progress < m && progress >= m)
}

pub fn priority_of(candidate: &Candidate, previous_progress: f64, now: DateTime<Utc>) -> Priority {
    if crossed_milestone(previous_progress, candidate.progress_pct) {
        return Priority::Milestone;
    }
    if candidate.technical_score >= INSTANT_ANALYSIS_TECHNICAL_SCORE && !candidate.has_holder_score {
        return Priority::InstantAnalysis;
    }
    let stale = match candidate.last_scored_at {
        Some(at) => now.signed_duration_since(at).num_seconds() > STALE_AFTER_SECS,
        None => true,
    };
    if stale {
        return Priority::Stale;
    }
    // Progress-descending tiebreak within "otherwise": a max-heap pops the
    // largest `Ord` value first, so higher progress needs a larger number.
    Priority::ProgressOnly((candidate.progress_pct * 100.0) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milestone_crossing_outranks_everything() {
        let candidate = Candidate {
            progress_pct: 50.0,
            technical_score: 0,
            has_holder_score: true,
            last_scored_at: Some(Utc::now()),
        };
        assert_eq!(priority_of(&candidate, 49.0, Utc::now()), Priority::Milestone);
    }

    #[test]
    fn instant_analysis_for_high_score_without_holder_score() {
        let candidate = Candidate {
            progress_pct: 40.0,
            technical_score: 200,
            has_holder_score: false,
            last_scored_at: None,
        };
        assert_eq!(priority_of(&candidate, 40.0, Utc::now()), Priority::InstantAnalysis);
    }

    #[test]
    fn stale_when_never_scored() {
        let candidate = Candidate {
            progress_pct: 40.0,
            technical_score: 0,
            has_holder_score: false,
            last_scored_at: None,
        };
        assert_eq!(priority_of(&candidate, 40.0, Utc::now()), Priority::Stale);
    }

    #[test]
    fn higher_progress_outranks_lower_otherwise() {
        let now = Utc::now();
        let high = Candidate { progress_pct: 80.0, technical_score: 0, has_holder_score: true, last_scored_at: Some(now) };
        let low = Candidate { progress_pct: 20.0, technical_score: 0, has_holder_score: true, last_scored_at: Some(now) };
        assert!(priority_of(&high, 80.0, now) > priority_of(&low, 20.0, now));
    }
}
