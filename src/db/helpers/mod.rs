use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Lowercase ASCII slug: word characters kept, runs of spaces and hyphens collapsed to one hyphen.
pub fn slugify(raw: &str) -> String {
    let mut out = String::new();
    let mut pending_dash = false;
    for ch in raw.trim().chars() {
        let lc = ch.to_ascii_lowercase();
        if lc.is_ascii_alphanumeric() || lc == '_' {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(lc);
        } else if lc.is_whitespace() || lc == '-' {
            pending_dash = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_matches_label_conventions() {
        assert_eq!(slugify("My New UIForm"), "my-new-uiform");
        assert_eq!(slugify("  Survey -- 2024 "), "survey-2024");
        assert_eq!(slugify("What's up?"), "whats-up");
        assert_eq!(slugify("snake_case label"), "snake_case-label");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn parse_datetime_round_trips_rfc3339() {
        let now = Utc::now();
        let parsed = parse_datetime(&now.to_rfc3339(), "updated_at").unwrap();
        assert_eq!(parsed, now);
    }
}
