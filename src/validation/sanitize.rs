//! Value sanitizers shared by every rule set

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::RawValue;

/// Replace markup-significant characters with HTML entities
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '/' => escaped.push_str("&#x2F;"),
            '\\' => escaped.push_str("&#x5C;"),
            '`' => escaped.push_str("&#96;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Parse an ISO-8601 calendar date, accepting a date-time and keeping its date
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|datetime| datetime.date())
}

/// Absent -> empty, scalar -> one element, list -> as submitted
pub fn normalize_multi(raw: Option<&RawValue>) -> Vec<String> {
    match raw {
        None => Vec::new(),
        Some(RawValue::Single(value)) => vec![value.clone()],
        Some(RawValue::Many(values)) => values.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("Dune"), "Dune");
        assert_eq!(
            escape(r#"<a href="x">'Tom' & `Jerry`\</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#x27;Tom&#x27; &amp; &#96;Jerry&#96;&#x5C;&lt;&#x2F;a&gt;"
        );
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_iso_date("1990-05-14"), NaiveDate::from_ymd_opt(1990, 5, 14));
        assert_eq!(
            parse_iso_date("1990-05-14T10:30:00Z"),
            NaiveDate::from_ymd_opt(1990, 5, 14)
        );
        assert_eq!(
            parse_iso_date("1990-05-14T10:30"),
            NaiveDate::from_ymd_opt(1990, 5, 14)
        );
        assert_eq!(parse_iso_date("2020-02-30"), None);
        assert_eq!(parse_iso_date("not-a-date"), None);
        assert_eq!(parse_iso_date(""), None);
    }

    #[test]
    fn test_normalize_multi() {
        assert!(normalize_multi(None).is_empty());
        assert_eq!(
            normalize_multi(Some(&RawValue::Single("g1".into()))),
            vec!["g1".to_string()]
        );
        assert_eq!(
            normalize_multi(Some(&RawValue::Many(vec!["g1".into(), "g2".into()]))),
            vec!["g1".to_string(), "g2".to_string()]
        );
    }
}
