use crate::error::{AppError, RowError};
use crate::models::leaderboard::LeaderboardEntry;
use regex::Regex;
use std::sync::LazyLock;

static COMPETITION_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}$").expect("competition id pattern is valid"));

const MAX_LEADERBOARD_LIMIT: usize = 500;

pub fn is_competition_id(id: &str) -> bool {
    COMPETITION_ID.is_match(id)
}

pub fn validate_entry(entry: &LeaderboardEntry) -> Result<(), RowError> {
    if !is_competition_id(&entry.competition_id) {
        return Err(RowError::BadCompetitionId(entry.competition_id.clone()));
    }
    if entry.participant_name.trim().is_empty() {
        return Err(RowError::BlankName);
    }
    if !entry.score.is_finite() {
        return Err(RowError::NonFinite("score"));
    }
    if !entry.time_seconds.is_finite() {
        return Err(RowError::NonFinite("time_seconds"));
    }
    Ok(())
}

pub fn validate_competition_id(id: &str) -> Result<(), AppError> {
    if is_competition_id(id) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Invalid competition id: {} (expected YYYY-MM)",
            id
        )))
    }
}

pub fn validate_limit(limit: Option<usize>) -> Result<Option<usize>, AppError> {
    match limit {
        Some(0) => Err(AppError::BadRequest("Limit must be at least 1".into())),
        Some(n) => Ok(Some(n.min(MAX_LEADERBOARD_LIMIT))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, name: &str) -> LeaderboardEntry {
        LeaderboardEntry {
            competition_id: id.into(),
            participant_name: name.into(),
            score: 10.0,
            time_seconds: 60.0,
            time_formatted: None,
            results_published: true,
            submitted_at: None,
            notes: None,
        }
    }

    #[test]
    fn accepts_well_formed_entry() {
        assert_eq!(validate_entry(&entry("2026-01", "Ada")), Ok(()));
    }

    #[test]
    fn rejects_bad_competition_ids() {
        for id in ["2026-1", "26-01", "2026/01", "2026-01-15", " 2026-01", "January"] {
            assert_eq!(
                validate_entry(&entry(id, "Ada")),
                Err(RowError::BadCompetitionId(id.into())),
                "{id}"
            );
        }
    }

    #[test]
    fn competition_ids_are_ascii_digits_only() {
        for id in ["٢٠٢٦-٠١", "２０２６-０１", "2026-٠١"] {
            assert!(!is_competition_id(id), "{id}");
            assert_eq!(
                validate_entry(&entry(id, "Ada")),
                Err(RowError::BadCompetitionId(id.into()))
            );
            assert!(validate_competition_id(id).is_err());
        }
        assert!(validate_competition_id("2026-01").is_ok());
    }

    #[test]
    fn rejects_blank_name_and_non_finite_numbers() {
        assert_eq!(validate_entry(&entry("2026-01", "  ")), Err(RowError::BlankName));

        let mut e = entry("2026-01", "Ada");
        e.time_seconds = f64::NAN;
        assert_eq!(validate_entry(&e), Err(RowError::NonFinite("time_seconds")));
    }

    #[test]
    fn limit_is_capped_and_zero_rejected() {
        assert!(validate_limit(Some(0)).is_err());
        assert_eq!(validate_limit(Some(10_000)).unwrap(), Some(500));
        assert_eq!(validate_limit(None).unwrap(), None);
    }
}
