//! Property-based tests using proptest
//!
//! These tests verify that filters survive the trip to a query string and
//! back, and that endpoint construction keeps ids inside one path segment.

use cdx::resource::endpoint;
use cdx::resource::filter::{from_query_key, to_query_key, Filter, Matcher};
use proptest::prelude::*;
use url::Url;

/// camelCase filter names such as `nextPageToken`
fn arb_name() -> impl Strategy<Value = String> {
    "[a-z]{1,8}([A-Z][a-z]{1,6}){0,3}"
}

/// List items: non-empty and free of the ',' separator
fn arb_items() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-zA-Z0-9_.-]{1,12}", 1..6)
}

/// Plain values that do not look like a composite matcher
fn arb_value() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_ ./+=-]{0,24}".prop_filter("composite prefix", |v| {
        !v.starts_with("any:") && !v.starts_with("all:")
    })
}

fn arb_matcher() -> impl Strategy<Value = Matcher> {
    prop_oneof![
        arb_value().prop_map(Matcher::Eq),
        arb_items().prop_map(|items| Matcher::any_of(items).unwrap()),
        arb_items().prop_map(|items| Matcher::all_of(items).unwrap()),
    ]
}

fn arb_filter() -> impl Strategy<Value = Filter> {
    prop::collection::btree_map(arb_name(), arb_matcher(), 0..6).prop_map(|matchers| {
        matchers
            .into_iter()
            .fold(Filter::new(), |filter, (name, matcher)| filter.with(&name, matcher))
    })
}

proptest! {
    /// Hyphenated query keys map back to the original camelCase name
    #[test]
    fn query_key_round_trip(name in arb_name()) {
        let key = to_query_key(&name);
        prop_assert_eq!(key.to_lowercase(), key.clone());
        prop_assert_eq!(from_query_key(&key), name);
    }

    /// Each matcher decodes to itself
    #[test]
    fn matcher_round_trip(matcher in arb_matcher()) {
        prop_assert_eq!(Matcher::decode(&matcher.encode()), matcher);
    }

    /// Equality values are sent untouched
    #[test]
    fn equality_is_verbatim(value in arb_value()) {
        prop_assert_eq!(Matcher::equals(&value).encode(), value);
    }

    /// Composite matchers keep item order
    #[test]
    fn composite_keeps_order(items in arb_items()) {
        let encoded = Matcher::any_of(items.clone()).unwrap().encode();
        prop_assert_eq!(encoded, format!("any:{}", items.join(",")));
    }

    /// A whole filter survives the percent-encoded query string
    #[test]
    fn filter_round_trip(filter in arb_filter()) {
        let query = filter.to_query_string();
        prop_assert_eq!(Filter::parse_query_string(&query), filter);
    }

    /// Items containing the separator are refused instead of silently split
    #[test]
    fn separator_in_item_is_rejected(left in "[a-z]{1,5}", right in "[a-z]{1,5}") {
        let joined = format!("{},{}", left, right);
        prop_assert!(Matcher::all_of([joined]).is_err());
    }

    /// Ids never leak into neighbouring path segments
    #[test]
    fn item_path_has_fixed_segment_count(id in "[a-zA-Z0-9/?#% ._-]{1,20}") {
        match endpoint::nested_item("apps", &id, "jobs", &id) {
            Ok(path) => {
                prop_assert_eq!(path.split('/').count(), 5);
                prop_assert!(!path.contains('?'));
                prop_assert!(!path.contains('#'));

                // the path as it goes on the wire, after URL normalization
                let mut url = Url::parse("http://gw.example/").unwrap();
                url.set_path(&path);
                prop_assert_eq!(url.path(), path.as_str());
                prop_assert_eq!(url.path_segments().unwrap().count(), 4);
            }
            Err(_) => prop_assert!(id == "." || id == ".."),
        }
    }
}

/// Fixed cases documenting the wire format
mod wire_format_tests {
    use super::*;

    #[test]
    fn test_pagination_keys() {
        let filter = Filter::new().page_size(25).next_page_token("abc");
        assert_eq!(
            filter.to_query(),
            vec![
                ("next-page-token".to_string(), "abc".to_string()),
                ("page-size".to_string(), "25".to_string()),
            ]
        );
    }

    #[test]
    fn test_dot_and_empty_ids_are_refused() {
        for id in ["", ".", ".."] {
            assert!(matches!(
                endpoint::nested_item("apps", "app_1", "jobs", id),
                Err(cdx::Error::InvalidId(_))
            ));
        }
    }

    #[test]
    fn test_composite_prefixes() {
        let filter = Filter::new()
            .with("tags", Matcher::all_of(["eu", "health"]).unwrap())
            .with("datasets", Matcher::any_of(["ds_1", "ds_2"]).unwrap());
        assert_eq!(
            filter.to_query_string(),
            "datasets=any%3Ads_1%2Cds_2&tags=all%3Aeu%2Chealth"
        );
    }
}
