//! Relational filter parameters for book listings.

use std::collections::BTreeSet;

use crate::domain::error::Error;

/// Optional relation filters applied to a book listing.
///
/// `None` means the caller did not filter on that relation at all; `Some`
/// with an id set selects books linked to at least one of those ids. The
/// distinction matters: an absent parameter must not behave like an empty
/// id set, which would match nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub tag_ids: Option<BTreeSet<i64>>,
    pub author_ids: Option<BTreeSet<i64>>,
}

impl BookFilter {
    /// True when no relational predicate applies.
    pub fn is_unfiltered(&self) -> bool {
        self.tag_ids.is_none() && self.author_ids.is_none()
    }
}

/// Parse a comma-separated id list from a query parameter.
///
/// Absent or empty input yields `None` (unfiltered); whitespace around
/// tokens is tolerated; any non-integer token fails the whole parameter,
/// naming the offending token.
pub fn parse_id_filter(field: &str, raw: Option<&str>) -> Result<Option<BTreeSet<i64>>, Error> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }

    raw.split(',')
        .map(|token| {
            let token = token.trim();
            token.parse::<i64>().map_err(|_| {
                Error::invalid_request(format!("{field} must be a comma-separated list of ids"))
                    .with_details(serde_json::json!({
                        "field": field,
                        "value": token,
                        "code": "invalid_id_list",
                    }))
            })
        })
        .collect::<Result<BTreeSet<i64>, Error>>()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn absent_parameter_is_unfiltered() {
        assert_eq!(parse_id_filter("tags", None).expect("valid"), None);
        assert!(BookFilter::default().is_unfiltered());
    }

    #[rstest]
    fn any_predicate_marks_the_filter() {
        let filter = BookFilter {
            tag_ids: Some(BTreeSet::from([1])),
            author_ids: None,
        };
        assert!(!filter.is_unfiltered());
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn empty_parameter_is_unfiltered(#[case] raw: &str) {
        assert_eq!(parse_id_filter("tags", Some(raw)).expect("valid"), None);
    }

    #[rstest]
    fn parses_and_deduplicates_ids() {
        let ids = parse_id_filter("tags", Some("3,1, 2 ,3"))
            .expect("valid")
            .expect("filtered");
        assert_eq!(ids, BTreeSet::from([1, 2, 3]));
    }

    #[rstest]
    fn single_id_restricts_the_filter() {
        let ids = parse_id_filter("authors", Some("5"))
            .expect("valid")
            .expect("filtered");
        assert_eq!(ids, BTreeSet::from([5]));
    }

    #[rstest]
    #[case("1,x")]
    #[case("1,,2")]
    #[case("1.5")]
    fn non_integer_tokens_are_rejected(#[case] raw: &str) {
        let err = parse_id_filter("tags", Some(raw)).expect_err("invalid");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        let details = err.details().expect("details");
        assert_eq!(
            details.get("code").and_then(|v| v.as_str()),
            Some("invalid_id_list")
        );
    }
}
