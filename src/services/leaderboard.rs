use crate::models::leaderboard::*;
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

pub fn filter_published(entries: &[LeaderboardEntry]) -> Vec<LeaderboardEntry> {
    entries.iter().filter(|e| e.results_published).cloned().collect()
}

/// Partition by competition id, keeping first-seen group order.
pub fn group_by_competition(entries: &[LeaderboardEntry]) -> Vec<GroupedLeaderboard> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<GroupedLeaderboard> = Vec::new();

    for entry in entries {
        let slot = *index.entry(entry.competition_id.as_str()).or_insert_with(|| {
            groups.push(GroupedLeaderboard {
                competition_id: entry.competition_id.clone(),
                entries: Vec::new(),
                published: false,
            });
            groups.len() - 1
        });
        let group = &mut groups[slot];
        group.published |= entry.results_published;
        group.entries.push(entry.clone());
    }
    groups
}

/// Score descending, then time ascending.
fn leaderboard_order(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.time_seconds.total_cmp(&b.time_seconds))
}

fn is_tie(a: &LeaderboardEntry, b: &LeaderboardEntry) -> bool {
    a.score == b.score && a.time_seconds == b.time_seconds
}

/// Sort and assign competition ranks: exact ties share the rank of the first
/// tied entry and the next distinct entry takes its own position (1, 1, 3).
pub fn rank_entries(entries: &[LeaderboardEntry]) -> Vec<SortedLeaderboardEntry> {
    let mut sorted: Vec<&LeaderboardEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| leaderboard_order(a, b));

    let mut ranked: Vec<SortedLeaderboardEntry> = Vec::with_capacity(sorted.len());
    for (position, entry) in sorted.into_iter().enumerate() {
        let rank = match ranked.last() {
            Some(prev) if is_tie(&prev.entry, entry) => prev.rank,
            _ => position + 1,
        };
        ranked.push(SortedLeaderboardEntry {
            time_display: display_time(entry),
            entry: entry.clone(),
            rank,
        });
    }
    ranked
}

pub fn leaderboard_for(
    entries: &[LeaderboardEntry],
    competition_id: &str,
) -> Vec<SortedLeaderboardEntry> {
    let competition: Vec<LeaderboardEntry> = entries
        .iter()
        .filter(|e| e.competition_id == competition_id)
        .cloned()
        .collect();
    rank_entries(&filter_published(&competition))
}

/// Distinct published competition ids, newest first.
pub fn available_competition_ids(entries: &[LeaderboardEntry]) -> Vec<String> {
    let ids: BTreeSet<&str> = entries
        .iter()
        .filter(|e| e.results_published)
        .map(|e| e.competition_id.as_str())
        .collect();
    ids.into_iter().rev().map(str::to_string).collect()
}

pub fn available_competitions(entries: &[LeaderboardEntry]) -> Vec<CompetitionSummary> {
    available_competition_ids(entries)
        .into_iter()
        .map(|id| CompetitionSummary {
            label: competition_label(&id),
            id,
        })
        .collect()
}

/// `M:SS` below an hour, `H:MM:SS` otherwise. Fractions are dropped.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

fn display_time(entry: &LeaderboardEntry) -> String {
    match &entry.time_formatted {
        Some(t) => t.clone(),
        None => format_time(entry.time_seconds),
    }
}

/// "2026-01" -> "January 2026"; anything unparseable is returned as is.
pub fn competition_label(competition_id: &str) -> String {
    NaiveDate::parse_from_str(&format!("{}-01", competition_id), "%Y-%m-%d")
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_else(|_| competition_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, name: &str, score: f64, time: f64, published: bool) -> LeaderboardEntry {
        LeaderboardEntry {
            competition_id: id.into(),
            participant_name: name.into(),
            score,
            time_seconds: time,
            time_formatted: None,
            results_published: published,
            submitted_at: None,
            notes: None,
        }
    }

    fn ranks(ranked: &[SortedLeaderboardEntry]) -> Vec<usize> {
        ranked.iter().map(|e| e.rank).collect()
    }

    fn names(ranked: &[SortedLeaderboardEntry]) -> Vec<&str> {
        ranked.iter().map(|e| e.entry.participant_name.as_str()).collect()
    }

    #[test]
    fn exact_ties_share_rank_and_leave_a_gap() {
        let ranked = rank_entries(&[
            entry("2026-01", "c", 90.0, 40.0, true),
            entry("2026-01", "a", 100.0, 50.0, true),
            entry("2026-01", "b", 100.0, 50.0, true),
        ]);
        assert_eq!(ranks(&ranked), vec![1, 1, 3]);
        assert_eq!(names(&ranked), vec!["a", "b", "c"]);
    }

    #[test]
    fn two_way_tie_at_top_then_positions_continue() {
        let ranked = rank_entries(&[
            entry("2026-01", "a", 100.0, 50.0, true),
            entry("2026-01", "b", 100.0, 50.0, true),
            entry("2026-01", "c", 90.0, 40.0, true),
            entry("2026-01", "d", 80.0, 40.0, true),
        ]);
        assert_eq!(ranks(&ranked), vec![1, 1, 3, 4]);
    }

    #[test]
    fn score_desc_then_time_asc() {
        let ranked = rank_entries(&[
            entry("2026-01", "x", 90.0, 60.0, true),
            entry("2026-01", "y", 95.0, 40.0, true),
            entry("2026-01", "z", 80.0, 70.0, true),
        ]);
        assert_eq!(names(&ranked), vec!["y", "x", "z"]);
        assert_eq!(ranks(&ranked), vec![1, 2, 3]);
    }

    #[test]
    fn equal_score_faster_time_wins_without_tie() {
        let ranked = rank_entries(&[
            entry("2026-01", "slow", 100.0, 90.0, true),
            entry("2026-01", "fast", 100.0, 30.0, true),
        ]);
        assert_eq!(names(&ranked), vec!["fast", "slow"]);
        assert_eq!(ranks(&ranked), vec![1, 2]);
    }

    #[test]
    fn ranking_ignores_input_order_and_is_idempotent() {
        let input = vec![
            entry("2026-01", "a", 70.0, 10.0, true),
            entry("2026-01", "b", 90.0, 20.0, true),
            entry("2026-01", "c", 90.0, 20.0, true),
            entry("2026-01", "d", 90.0, 5.0, true),
            entry("2026-01", "e", 10.0, 1.0, true),
        ];
        let forward = rank_entries(&input);
        let mut reversed_input = input.clone();
        reversed_input.reverse();
        let reversed = rank_entries(&reversed_input);

        let key = |r: &[SortedLeaderboardEntry]| -> Vec<(f64, f64, usize)> {
            r.iter()
                .map(|e| (e.entry.score, e.entry.time_seconds, e.rank))
                .collect()
        };
        assert_eq!(key(&forward), key(&reversed));

        let again: Vec<LeaderboardEntry> = forward.iter().map(|e| e.entry.clone()).collect();
        assert_eq!(key(&rank_entries(&again)), key(&forward));
        assert_eq!(ranks(&forward), vec![1, 2, 2, 4, 5]);
    }

    #[test]
    fn unpublished_never_shown() {
        let entries = vec![
            entry("2026-01", "hidden", 1000.0, 1.0, false),
            entry("2026-01", "shown", 10.0, 100.0, true),
            entry("2026-02", "draft", 99.0, 1.0, false),
        ];
        let board = leaderboard_for(&entries, "2026-01");
        assert_eq!(names(&board), vec!["shown"]);
        assert_eq!(board[0].rank, 1);
        assert_eq!(available_competition_ids(&entries), vec!["2026-01"]);
    }

    #[test]
    fn leaderboard_for_only_includes_requested_period() {
        let entries = vec![
            entry("2025-12", "old", 100.0, 10.0, true),
            entry("2026-01", "a", 50.0, 10.0, true),
            entry("2026-01", "b", 60.0, 10.0, true),
        ];
        let board = leaderboard_for(&entries, "2026-01");
        assert!(board.iter().all(|e| e.entry.competition_id == "2026-01"));
        assert_eq!(names(&board), vec!["b", "a"]);
        assert!(leaderboard_for(&entries, "2024-05").is_empty());
    }

    #[test]
    fn available_ids_are_distinct_and_newest_first() {
        let entries = vec![
            entry("2025-11", "a", 1.0, 1.0, true),
            entry("2026-02", "b", 1.0, 1.0, true),
            entry("2025-11", "c", 1.0, 1.0, true),
            entry("2026-01", "d", 1.0, 1.0, true),
        ];
        assert_eq!(
            available_competition_ids(&entries),
            vec!["2026-02", "2026-01", "2025-11"]
        );
        let summaries = available_competitions(&entries);
        assert_eq!(summaries[0].label, "February 2026");
    }

    #[test]
    fn groups_keep_first_seen_order_and_flag_publication() {
        let entries = vec![
            entry("2026-02", "a", 1.0, 1.0, false),
            entry("2026-01", "b", 1.0, 1.0, true),
            entry("2026-02", "c", 1.0, 1.0, true),
            entry("2025-12", "d", 1.0, 1.0, false),
        ];
        let groups = group_by_competition(&entries);
        let ids: Vec<&str> = groups.iter().map(|g| g.competition_id.as_str()).collect();
        assert_eq!(ids, vec!["2026-02", "2026-01", "2025-12"]);
        assert_eq!(groups[0].entries.len(), 2);
        assert!(groups[0].published);
        assert!(!groups[2].published);

        let published = group_by_competition(&filter_published(&entries));
        assert_eq!(published.len(), 2);
        assert!(published.iter().all(|g| g.published));
    }

    #[test]
    fn time_display_prefers_sheet_value() {
        let mut e = entry("2026-01", "a", 1.0, 3725.0, true);
        assert_eq!(rank_entries(&[e.clone()])[0].time_display, "1:02:05");
        e.time_formatted = Some("62 min".into());
        assert_eq!(rank_entries(&[e])[0].time_display, "62 min");
    }

    #[test]
    fn formats_times() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(65.0), "1:05");
        assert_eq!(format_time(65.9), "1:05");
        assert_eq!(format_time(3600.0), "1:00:00");
        assert_eq!(format_time(-5.0), "0:00");
    }

    #[test]
    fn labels_periods() {
        assert_eq!(competition_label("2026-01"), "January 2026");
        assert_eq!(competition_label("2025-12"), "December 2025");
        assert_eq!(competition_label("2026-13"), "2026-13");
    }
}
