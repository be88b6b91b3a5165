use std::cmp::Ordering;

use etag::{compare, Etag};
use proptest::prelude::*;

fn any_etag() -> impl Strategy<Value = Etag> {
    (any::<i64>(), any::<i64>()).prop_map(|(restarts, changes)| Etag::from_parts(restarts, changes))
}

proptest! {
    #[test]
    fn prop_bytes_round_trip(bytes in any::<[u8; 16]>()) {
        let etag = Etag::from_bytes(&bytes).unwrap();
        prop_assert_eq!(etag.to_bytes(), bytes);
    }

    #[test]
    fn prop_text_round_trip(etag in any_etag()) {
        let text = etag.to_string();
        prop_assert_eq!(text.len(), 36);
        prop_assert_eq!(Etag::parse(&text).unwrap(), etag);
    }

    #[test]
    fn prop_canonical_text_round_trip(s in "[0-9A-F]{8}-[0-9A-F]{4}-[0-9A-F]{4}-[0-9A-F]{4}-[0-9A-F]{12}") {
        prop_assert_eq!(Etag::parse(&s).unwrap().to_string(), s);
    }

    #[test]
    fn prop_text_order_tracks_bytes(etag in any_etag()) {
        let from_text = hex_digits(&etag.to_string());
        let from_bytes: String = etag.to_bytes().iter().map(|b| format!("{:02X}", b)).collect();
        prop_assert_eq!(from_text, from_bytes);
    }

    #[test]
    fn prop_ordering_is_antisymmetric(a in any_etag(), b in any_etag()) {
        prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
        prop_assert_eq!(a == b, a.cmp(&b) == Ordering::Equal);
    }

    #[test]
    fn prop_ordering_is_transitive(a in any_etag(), b in any_etag(), c in any_etag()) {
        let mut sorted = [a, b, c];
        sorted.sort();
        prop_assert!(sorted[0] <= sorted[1]);
        prop_assert!(sorted[1] <= sorted[2]);
        prop_assert!(sorted[0] <= sorted[2]);
    }

    #[test]
    fn prop_ordering_is_lexicographic(a in any_etag(), b in any_etag()) {
        let expected = (a.restarts(), a.changes()).cmp(&(b.restarts(), b.changes()));
        prop_assert_eq!(a.cmp(&b), expected);
        prop_assert_eq!(compare(Some(&a), Some(&b)), expected);
        prop_assert_eq!(compare(None, Some(&a)), Ordering::Less);
    }

    #[test]
    fn prop_increment_is_monotonic(restarts in any::<i64>(), changes in any::<i64>(), amount in 1i64..1_000_000) {
        prop_assume!(changes.checked_add(amount).is_some());
        let etag = Etag::from_parts(restarts, changes);
        let next = etag.increment_by(amount);
        prop_assert!(next > etag);
        prop_assert_eq!(next.restarts(), restarts);
    }

    #[test]
    fn prop_hash_with_is_deterministic(a in any_etag(), b in any_etag()) {
        prop_assert_eq!(a.hash_with(&b), a.hash_with(&b));
        prop_assert_eq!(a.hash_with(&b), a.hash_with_bytes(&b.to_bytes()));
    }

    #[test]
    fn prop_try_parse_rejects_wrong_lengths(s in "[0-9A-F-]{0,35}") {
        prop_assert!(Etag::try_parse(&s).is_none());
        prop_assert!(Etag::parse(&s).is_err());
    }
}

fn hex_digits(text: &str) -> String {
    text.chars().filter(|c| *c != '-').collect()
}
