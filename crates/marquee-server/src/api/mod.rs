pub mod artists;
pub mod shows;
pub mod venues;

use chrono::{DateTime, FixedOffset};
use marquee_db::entities::show;
use serde::{Deserialize, Serialize};

/// Flash-style confirmation returned by the write endpoints.
#[derive(Debug, Serialize)]
pub struct Flash {
    pub message: String,
}

impl Flash {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// POST body of the search endpoints.
#[derive(Debug, Deserialize)]
pub struct SearchForm {
    pub search_term: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResults<T: Serialize> {
    pub count: usize,
    pub data: Vec<T>,
}

/// Build an ILIKE pattern for a substring search.
///
/// LIKE wildcards in the term are escaped so user input cannot widen
/// the match.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term.trim().replace('%', "\\%").replace('_', "\\_");
    format!("%{escaped}%")
}

/// Display format for a show's start time, e.g. `Wed 05, 21, 2025 9:30PM`.
pub(crate) fn format_start_time(start: DateTime<FixedOffset>) -> String {
    start.format("%a %m, %d, %Y %-I:%M%p").to_string()
}

/// Split shows into (past, upcoming) relative to `now`.
///
/// A show is upcoming when its start time is strictly greater than
/// `now`; everything else is past.
pub(crate) fn split_past_upcoming(
    shows: Vec<show::Model>,
    now: DateTime<FixedOffset>,
) -> (Vec<show::Model>, Vec<show::Model>) {
    shows.into_iter().partition(|s| s.start_time <= now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn show_at(start: DateTime<FixedOffset>) -> show::Model {
        show::Model {
            id: Uuid::new_v4(),
            venue_id: Some(Uuid::new_v4()),
            artist_id: Some(Uuid::new_v4()),
            start_time: start,
            created_at: start,
        }
    }

    // ── like_pattern ──────────────────────────────────────────────────

    #[test]
    fn test_like_pattern_wraps_term() {
        assert_eq!(like_pattern("band"), "%band%");
    }

    #[test]
    fn test_like_pattern_trims_whitespace() {
        assert_eq!(like_pattern("  sax  "), "%sax%");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("100%_pure"), "%100\\%\\_pure%");
    }

    // ── format_start_time ─────────────────────────────────────────────

    #[test]
    fn test_format_start_time_medium_format() {
        let start = DateTime::parse_from_rfc3339("2035-04-01T20:00:00+00:00").unwrap();
        assert_eq!(format_start_time(start), "Sun 04, 01, 2035 8:00PM");
    }

    #[test]
    fn test_format_start_time_morning_has_no_hour_padding() {
        let start = DateTime::parse_from_rfc3339("2035-04-08T09:30:00+00:00").unwrap();
        assert_eq!(format_start_time(start), "Sun 04, 08, 2035 9:30AM");
    }

    // ── split_past_upcoming ───────────────────────────────────────────

    #[test]
    fn test_split_past_upcoming_partitions_on_now() {
        let now = Utc::now().fixed_offset();
        let past = show_at(now - Duration::days(30));
        let upcoming = show_at(now + Duration::days(30));
        let (past_shows, upcoming_shows) =
            split_past_upcoming(vec![past.clone(), upcoming.clone()], now);
        assert_eq!(past_shows, vec![past]);
        assert_eq!(upcoming_shows, vec![upcoming]);
    }

    #[test]
    fn test_show_starting_exactly_now_is_past() {
        let now = Utc::now().fixed_offset();
        let (past_shows, upcoming_shows) = split_past_upcoming(vec![show_at(now)], now);
        assert_eq!(past_shows.len(), 1);
        assert!(upcoming_shows.is_empty());
    }
}
