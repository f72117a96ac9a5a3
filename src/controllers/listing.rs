use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Query string accepted by every list resource
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub stage: Option<String>,
    pub order: Option<String>,
}

/// Filtered records plus aggregates computed over everything loaded
#[derive(Debug, Clone, Serialize)]
pub struct Listing<T, S> {
    pub records: Vec<T>,
    pub summary: S,
}

/// Case-insensitive substring match against any of `fields`; a blank search matches everything
pub fn text_matches(search: Option<&str>, fields: &[Option<&str>]) -> bool {
    let needle = match search.map(str::trim) {
        None | Some("") => return true,
        Some(s) => s.to_lowercase(),
    };
    fields
        .iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Exact match; "all" or no filter matches everything
pub fn filter_matches(filter: Option<&str>, value: &str) -> bool {
    match filter.map(str::trim) {
        None | Some("") | Some("all") => true,
        Some(expected) => expected == value,
    }
}

/// Sum of present amounts; missing amounts count as zero
pub fn total_amount<'a>(amounts: impl IntoIterator<Item = Option<&'a Decimal>>) -> Decimal {
    amounts.into_iter().flatten().copied().sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_search_matches_everything() {
        assert!(text_matches(None, &[Some("Ana")]));
        assert!(text_matches(Some("  "), &[None]));
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        assert!(text_matches(Some("ACME"), &[Some("Ana"), None, Some("acme corp")]));
        assert!(!text_matches(Some("zed"), &[Some("Ana"), None]));
    }

    #[test]
    fn all_matches_every_value() {
        assert!(filter_matches(Some("all"), "inactive"));
        assert!(filter_matches(None, "inactive"));
        assert!(filter_matches(Some("inactive"), "inactive"));
        assert!(!filter_matches(Some("active"), "inactive"));
    }

    #[test]
    fn null_amounts_count_as_zero() {
        let amounts = [Some(Decimal::from(100)), None, Some(Decimal::from(250))];
        assert_eq!(total_amount(amounts.iter().map(Option::as_ref)), Decimal::from(350));
        assert_eq!(total_amount(std::iter::empty()), Decimal::ZERO);
    }
}
