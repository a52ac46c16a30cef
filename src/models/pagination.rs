//! Cursor pagination over a (date desc, id desc) ordered collection.
//!
//! A cursor is the `"<date>|<id>"` of the last row a client has seen. The next
//! page holds rows strictly after it in that order, so rows inserted between
//! fetches can neither be skipped nor repeated.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

pub const DEFAULT_PAGE_LIMIT: u32 = 500;
pub const MAX_PAGE_LIMIT: u32 = 2000;

const CURSOR_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid cursor: {0}")]
pub struct InvalidCursor(pub String);

/// Position of the last row returned to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub date: NaiveDate,
    pub id: Uuid,
}

impl Cursor {
    pub fn new(date: NaiveDate, id: Uuid) -> Self {
        Self { date, id }
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Whether a row at `(date, id)` comes strictly after this cursor in
    /// (date desc, id desc) order
    pub fn precedes(&self, date: NaiveDate, id: Uuid) -> bool {
        date < self.date || (date == self.date && id < self.id)
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.date.format(CURSOR_DATE_FORMAT), self.id)
    }
}

impl FromStr for Cursor {
    type Err = InvalidCursor;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (date, id) = raw
            .split_once('|')
            .ok_or_else(|| InvalidCursor("missing '|' separator".to_string()))?;

        if date.is_empty() || id.is_empty() {
            return Err(InvalidCursor("empty component".to_string()));
        }

        let date = NaiveDate::parse_from_str(date, CURSOR_DATE_FORMAT)
            .map_err(|_| InvalidCursor(format!("'{}' is not a YYYY-MM-DD date", date)))?;
        let id = Uuid::parse_str(id)
            .map_err(|_| InvalidCursor(format!("'{}' is not a transaction id", id)))?;

        Ok(Self { date, id })
    }
}

/// Query string of a paginated listing
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page size, clamped to 1..=2000 (default 500)
    pub limit: Option<u32>,
    /// Opaque cursor from a previous page's `next_cursor`
    pub cursor: Option<String>,
}

impl PageQuery {
    pub fn effective_limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT)
    }

    /// Blank cursors are treated as "first page"
    pub fn decoded_cursor(&self) -> Result<Option<Cursor>, InvalidCursor> {
        match self.cursor.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some),
        }
    }
}

/// One page of results
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
    /// `None` once the stream is exhausted
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Build a page from rows fetched with `limit + 1`. The extra row only
    /// signals that more data exists and is never returned.
    pub fn from_lookahead<F>(mut rows: Vec<T>, limit: usize, cursor_of: F) -> Self
    where
        F: Fn(&T) -> Cursor,
    {
        let has_more = rows.len() > limit;
        rows.truncate(limit);

        let next_cursor = if has_more {
            rows.last().map(|row| cursor_of(row).encode())
        } else {
            None
        };

        Self {
            items: rows,
            has_more,
            next_cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn test_cursor_encode_decode() {
        let id = Uuid::new_v4();
        let cursor = Cursor::new(date(4), id);

        let encoded = cursor.encode();
        assert_eq!(encoded, format!("2024-03-04|{}", id));
        assert_eq!(encoded.parse::<Cursor>().unwrap(), cursor);
    }

    #[test]
    fn test_cursor_missing_separator_rejected() {
        assert!("2024-03-04".parse::<Cursor>().is_err());
        assert!("".parse::<Cursor>().is_err());
    }

    #[test]
    fn test_cursor_empty_components_rejected() {
        let id = Uuid::new_v4();
        assert!(format!("|{}", id).parse::<Cursor>().is_err());
        assert!("2024-03-04|".parse::<Cursor>().is_err());
        assert!("|".parse::<Cursor>().is_err());
    }

    #[test]
    fn test_cursor_garbage_components_rejected() {
        assert!("yesterday|abc".parse::<Cursor>().is_err());
        assert!(format!("2024-03-04|{}|x", Uuid::new_v4()).parse::<Cursor>().is_err());
    }

    #[test]
    fn test_precedes_breaks_ties_on_id() {
        let low = Uuid::from_u128(1);
        let high = Uuid::from_u128(2);
        let cursor = Cursor::new(date(4), high);

        assert!(cursor.precedes(date(3), Uuid::from_u128(99)));
        assert!(cursor.precedes(date(4), low));
        assert!(!cursor.precedes(date(4), high));
        assert!(!cursor.precedes(date(5), low));
    }

    #[test]
    fn test_effective_limit_clamped() {
        let query = |limit| PageQuery {
            limit,
            cursor: None,
        };
        assert_eq!(query(None).effective_limit(), 500);
        assert_eq!(query(Some(0)).effective_limit(), 1);
        assert_eq!(query(Some(25)).effective_limit(), 25);
        assert_eq!(query(Some(10_000)).effective_limit(), 2000);
    }

    #[test]
    fn test_blank_cursor_means_first_page() {
        let query = PageQuery {
            limit: None,
            cursor: Some(String::new()),
        };
        assert_eq!(query.decoded_cursor().unwrap(), None);
    }

    #[test]
    fn test_from_lookahead_drops_extra_row() {
        let rows: Vec<(NaiveDate, Uuid)> = (1..=3)
            .rev()
            .map(|d| (date(d), Uuid::from_u128(d as u128)))
            .collect();

        let page = Page::from_lookahead(rows, 2, |(d, id)| Cursor::new(*d, *id));

        assert_eq!(page.items.len(), 2);
        assert!(page.has_more);
        assert_eq!(
            page.next_cursor,
            Some(format!("2024-03-02|{}", Uuid::from_u128(2)))
        );
    }

    #[test]
    fn test_from_lookahead_last_page_has_no_cursor() {
        let rows = vec![(date(1), Uuid::from_u128(1))];

        let page = Page::from_lookahead(rows, 2, |(d, id)| Cursor::new(*d, *id));

        assert_eq!(page.items.len(), 1);
        assert!(!page.has_more);
        assert_eq!(page.next_cursor, None);
    }
}
