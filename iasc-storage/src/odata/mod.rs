mod group;
mod group_member;
mod user;

pub use group::GroupImpl;
pub use group_member::GroupMemberImpl;
pub use user::UserImpl;

use http::StatusCode;
use serde::Deserialize;

use iasc_slo::{errors, Result};

/// OData collection envelope.
#[derive(Debug, Deserialize)]
struct Collection<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
}

async fn ensure_success(
    url: &str,
    resp: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = resp.status();
    if status == StatusCode::NOT_FOUND {
        return Err(errors::not_found(url));
    }
    if !status.is_success() {
        let message = resp.text().await.unwrap_or_default();
        return Err(errors::bad_request(&format!(
            "status: {status}, message: {message}"
        )));
    }
    Ok(resp)
}

/// Bare `YYYY-MM-DD` becomes a UTC midnight timestamp; full
/// timestamps and anything unparseable pass through untouched.
fn date_time_utc(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.contains('T') {
        return Some(trimmed.to_owned());
    }
    match chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(date) => Some(format!("{}T00:00:00Z", date.format("%Y-%m-%d"))),
        Err(_) => Some(trimmed.to_owned()),
    }
}

fn normalize_date(value: Option<&str>) -> Option<String> {
    value.and_then(date_time_utc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_date_gets_utc_midnight() {
        assert_eq!(
            date_time_utc("2024-03-01"),
            Some("2024-03-01T00:00:00Z".to_owned())
        );
    }

    #[test]
    fn full_timestamp_passes_through() {
        assert_eq!(
            date_time_utc("2024-03-01T12:30:00Z"),
            Some("2024-03-01T12:30:00Z".to_owned())
        );
    }

    #[test]
    fn blank_dates_are_dropped() {
        assert_eq!(date_time_utc("  "), None);
        assert_eq!(normalize_date(None), None);
    }
}
