//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::Error;

/// Parse the `assigned_only` query parameter.
///
/// The parameter is an integer flag: absent or `0` means off, any other
/// integer means on. Non-integer input is a validation error.
pub(crate) fn parse_assigned_only(raw: Option<&str>) -> Result<bool, Error> {
    let Some(raw) = raw else {
        return Ok(false);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(false);
    }
    trimmed
        .parse::<i64>()
        .map(|flag| flag != 0)
        .map_err(|_| {
            Error::invalid_request("assigned_only must be an integer flag").with_details(json!({
                "field": "assigned_only",
                "value": trimmed,
                "code": "invalid_flag",
            }))
        })
}
