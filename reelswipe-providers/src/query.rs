//! Query sanitizing shared by all routes: trim terms, default empties, and
//! clamp result counts into `[1, ceiling]`.
use reelswipe_common::{DEFAULT_RESULT_COUNT, MIN_RESULT_COUNT, ProviderKind};

/// Normalized input for [`VideoProvider::search`](crate::VideoProvider::search).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Free-text term, or the subreddit name for Reddit.
    pub term: String,
    pub count: u32,
    /// Opaque page token; only YouTube uses it.
    pub cursor: Option<String>,
}

impl SearchQuery {
    /// Build a query from raw request parameters.
    ///
    /// ```
    /// use reelswipe_common::ProviderKind;
    /// use reelswipe_providers::SearchQuery;
    ///
    /// let q = SearchQuery::from_params(ProviderKind::Pexels, Some("  cats "), Some("50"), None);
    /// assert_eq!(q.term, "cats");
    /// assert_eq!(q.count, 20);
    ///
    /// let q = SearchQuery::from_params(ProviderKind::YouTube, None, None, Some(" "));
    /// assert_eq!(q.term, "trending shorts");
    /// assert_eq!(q.count, 10);
    /// assert_eq!(q.cursor, None);
    /// ```
    pub fn from_params(
        kind: ProviderKind,
        term: Option<&str>,
        count: Option<&str>,
        cursor: Option<&str>,
    ) -> Self {
        Self {
            term: sanitize_term(term, kind.default_query()),
            count: clamp_count(count, kind.ceiling()),
            cursor: cursor
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        }
    }
}

/// Trimmed term, or `default` when absent or blank.
pub fn sanitize_term(raw: Option<&str>, default: &str) -> String {
    match raw.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => default.to_string(),
    }
}

/// Parse a requested count and clamp it into `[1, ceiling]`.
///
/// Leading integer digits are honoured (`"12abc"` is 12). Absent or
/// unparseable input yields [`DEFAULT_RESULT_COUNT`].
pub fn clamp_count(raw: Option<&str>, ceiling: u32) -> u32 {
    let requested = raw
        .and_then(parse_leading_int)
        .unwrap_or(i64::from(DEFAULT_RESULT_COUNT));
    requested.clamp(i64::from(MIN_RESULT_COUNT), i64::from(ceiling)) as u32
}

fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim();
    let (negative, digits) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Too many digits for i64 still means "a lot" (or "very negative").
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}
