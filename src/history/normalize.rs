use chrono::{DateTime, SecondsFormat, Utc};

/// Strip trailing slashes from `url`, keeping the single slash of a bare root
/// such as `https://example.com/`. Idempotent.
pub fn normalize_url(url: &str) -> String {
    if !url.ends_with('/') {
        return url.to_string();
    }
    let trimmed = url.trim_end_matches('/');
    match trimmed.find("://") {
        Some(idx) => {
            let rest = &trimmed[idx + 3..];
            if rest.is_empty() {
                url.to_string()
            } else if rest.contains('/') {
                trimmed.to_string()
            } else {
                format!("{trimmed}/")
            }
        }
        None => trimmed.to_string(),
    }
}

/// `YYYY-MM-DDTHH:MM:SSZ`, truncated to whole seconds.
pub fn utc_stamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// `YYYY-MM` prefix of a stamp produced by [`utc_stamp`].
pub fn month_key(stamp: &str) -> &str {
    stamp.get(..7).unwrap_or(stamp)
}
