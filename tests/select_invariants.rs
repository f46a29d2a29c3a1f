//! Select Invariant Tests
//!
//! End-to-end behaviour of flat selects against the in-memory store:
//! - Operator semantics as seen through the store
//! - Short-circuit on empty search terms
//! - Limit, first and projection modifiers
//! - Failure propagation

use std::sync::Arc;

use nestsel::store::{InMemoryCollection, InMemoryFactory, RequestContext, StoreError};
use nestsel::{Modifier, ResultNode, SelectConfig, SelectErrorCode, SelectQuery, Selector, TermNode};
use serde_json::{json, Value};

fn product(id: &str, left: i64, name: &str, price: f64, tags: &str) -> Value {
    json!({
        "name": name,
        "price": price,
        "tags": tags,
        "_digger": {"diggerid": id, "left": left, "right": left + 1}
    })
}

fn catalogue() -> Arc<InMemoryCollection> {
    Arc::new(InMemoryCollection::with_documents(vec![
        product("p1", 1, "Oak Table", 120.0, "wood furniture large"),
        product("p2", 3, "oak chair", 45.5, "wood furniture"),
        product("p3", 5, "Steel Lamp", 30.0, "metal lighting"),
        product("p4", 7, "a.b*c (special)", 9.99, "misc"),
        product("p5", 9, "Table-Runner", 12.0, "textile"),
    ]))
}

fn setup() -> (Selector, InMemoryFactory) {
    let factory = InMemoryFactory::new(catalogue());
    let selector = Selector::new(Arc::new(factory.clone()), SelectConfig::default());
    (selector, factory)
}

async fn names(selector: &Selector, query: SelectQuery) -> Vec<String> {
    selector
        .select(&RequestContext::new(), &query.with_modifier(Modifier::laststep()))
        .await
        .unwrap()
        .iter()
        .map(|node| node.document["name"].as_str().unwrap().to_string())
        .collect()
}

fn one(field: &str, op: &str, value: &str) -> SelectQuery {
    SelectQuery::new([TermNode::leaf(field, op, value)])
}

// =============================================================================
// Operator Semantics
// =============================================================================

/// Numeric operators compare the parsed value against stored numbers.
#[tokio::test]
async fn test_numeric_operators_parse_value() {
    let (selector, _) = setup();

    assert_eq!(names(&selector, one("price", ">", "40")).await, vec!["Oak Table", "oak chair"]);
    assert_eq!(names(&selector, one("price", "<=", "12")).await, vec!["a.b*c (special)", "Table-Runner"]);
    assert_eq!(names(&selector, one("price", ">=", "45.5 EUR")).await, vec!["Oak Table", "oak chair"]);
}

/// A value that does not parse as a number matches nothing.
#[tokio::test]
async fn test_unparseable_numeric_value_matches_nothing() {
    let (selector, _) = setup();
    assert!(names(&selector, one("price", ">", "cheap")).await.is_empty());
}

/// Equality and inequality compare the value as given.
#[tokio::test]
async fn test_equality_operators() {
    let (selector, _) = setup();

    assert_eq!(names(&selector, one("name", "=", "Steel Lamp")).await, vec!["Steel Lamp"]);
    assert_eq!(names(&selector, one("name", "!=", "Steel Lamp")).await.len(), 4);
}

/// String-match operators ignore case.
#[tokio::test]
async fn test_string_operators_case_insensitive() {
    let (selector, _) = setup();

    assert_eq!(names(&selector, one("name", "^=", "OAK")).await, vec!["Oak Table", "oak chair"]);
    assert_eq!(names(&selector, one("name", "$=", "LAMP")).await, vec!["Steel Lamp"]);
    assert_eq!(names(&selector, one("name", "*=", "tAbLe")).await, vec!["Oak Table", "Table-Runner"]);
    assert_eq!(names(&selector, one("name", "|=", "table")).await, vec!["Table-Runner"]);
}

/// The whole-word operator needs a non-word character on both sides.
#[tokio::test]
async fn test_word_operator_bounded() {
    let (selector, _) = setup();

    assert_eq!(names(&selector, one("tags", "~=", "furniture")).await, vec!["Oak Table"]);
    assert!(names(&selector, one("tags", "~=", "wood")).await.is_empty());
}

/// Regex metacharacters in the value are literal text.
#[tokio::test]
async fn test_string_operators_escape_metacharacters() {
    let (selector, _) = setup();

    assert_eq!(names(&selector, one("name", "^=", "a.b*c")).await, vec!["a.b*c (special)"]);
    assert_eq!(names(&selector, one("name", "*=", "(special)")).await, vec!["a.b*c (special)"]);
    assert!(names(&selector, one("name", "*=", ".*")).await.is_empty());
}

/// Infinite bounds compare as unbounded.
#[tokio::test]
async fn test_infinite_numeric_bounds() {
    let (selector, _) = setup();

    assert_eq!(names(&selector, one("price", "<", "Infinity")).await.len(), 5);
    assert_eq!(names(&selector, one("price", ">", "-Infinity")).await.len(), 5);
    assert!(names(&selector, one("price", ">", "Infinity")).await.is_empty());
}

/// A string-match value too large to compile locally still constrains the
/// query instead of being dropped.
#[tokio::test]
async fn test_oversized_string_match_narrows() {
    let (selector, _) = setup();
    let query = SelectQuery::new([
        TermNode::leaf("name", "^=", "oak"),
        TermNode::leaf("name", "*=", "k".repeat(2_000_000)),
    ]);

    let plan = selector
        .plan(&query.clone().with_modifier(Modifier::laststep()))
        .unwrap();
    assert_eq!(plan.filter.condition_count(), 2);

    assert!(names(&selector, query).await.is_empty());
    assert_eq!(selector.metrics().snapshot().terms_dropped, 0);
}

/// Grouped terms must all hold.
#[tokio::test]
async fn test_group_is_conjunction() {
    let (selector, _) = setup();
    let query = SelectQuery::new([TermNode::group([
        TermNode::leaf("tags", "*=", "wood"),
        TermNode::leaf("price", "<", "100"),
    ])]);

    assert_eq!(names(&selector, query).await, vec!["oak chair"]);
}

/// Skeleton terms narrow the search as one alternative set.
#[tokio::test]
async fn test_skeleton_terms_are_alternatives() {
    let (selector, _) = setup();
    let query = SelectQuery::new([TermNode::leaf("price", ">", "10")]).with_skeleton([
        TermNode::leaf("_digger.diggerid", "=", "p1"),
        TermNode::leaf("_digger.diggerid", "=", "p3"),
        TermNode::leaf("_digger.diggerid", "=", "p4"),
    ]);

    assert_eq!(names(&selector, query).await, vec!["Oak Table", "Steel Lamp"]);
}

// =============================================================================
// Short-Circuit Tests
// =============================================================================

/// No search terms at all: empty result, no store contact.
#[tokio::test]
async fn test_empty_search_resolves_empty() {
    let (selector, factory) = setup();

    let result = selector
        .select(&RequestContext::new(), &SelectQuery::default())
        .await
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(factory.acquisition_count(), 0);
    assert_eq!(factory.inner().find_count(), 0);
}

/// Only unregistered operators: same as no terms, even with skeleton terms.
#[tokio::test]
async fn test_unregistered_operators_dropped() {
    let (selector, factory) = setup();
    let query = SelectQuery::new([TermNode::leaf("name", "==", "Oak Table")])
        .with_skeleton([TermNode::leaf("_digger.diggerid", "=", "p1")]);

    let result = selector.select(&RequestContext::new(), &query).await.unwrap();

    assert!(result.is_empty());
    assert_eq!(factory.inner().find_count(), 0);
    assert_eq!(selector.metrics().snapshot().terms_dropped, 1);
}

/// An unregistered term next to a usable one is ignored.
#[tokio::test]
async fn test_unregistered_term_ignored_beside_usable_term() {
    let (selector, _) = setup();
    let query = SelectQuery::new([
        TermNode::leaf("name", "=~", "anything"),
        TermNode::leaf("name", "^=", "steel"),
    ]);

    assert_eq!(names(&selector, query).await, vec!["Steel Lamp"]);
}

// =============================================================================
// Modifier Tests
// =============================================================================

/// `first` caps the result at one even with a larger limit.
#[tokio::test]
async fn test_first_overrides_limit() {
    let (selector, _) = setup();
    let query = one("price", ">", "0")
        .with_modifier(Modifier::laststep().with_limit(3).with_first());

    let result = selector.select(&RequestContext::new(), &query).await.unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].document["name"], "Oak Table");
}

/// An explicit limit caps the result; zero means no limit.
#[tokio::test]
async fn test_limit() {
    let (selector, _) = setup();
    let ctx = RequestContext::new();

    let capped = one("price", ">", "0").with_modifier(Modifier::laststep().with_limit(2));
    assert_eq!(selector.select(&ctx, &capped).await.unwrap().len(), 2);

    let zero = one("price", ">", "0").with_modifier(Modifier::laststep().with_limit(0));
    assert_eq!(selector.select(&ctx, &zero).await.unwrap().len(), 5);
}

/// Without `laststep` only the skeleton sub-object comes back.
#[tokio::test]
async fn test_reference_mode_returns_skeletons_only() {
    let (selector, _) = setup();

    let result = selector
        .select(&RequestContext::new(), &one("name", "^=", "oak"))
        .await
        .unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(
        result[0].document,
        json!({"_digger": {"diggerid": "p1", "left": 1, "right": 2}})
    );
    assert!(result.iter().all(|node| node.document.get("name").is_none()));
}

/// `tree` without `laststep` never loads descendants.
#[tokio::test]
async fn test_tree_needs_laststep() {
    let (selector, factory) = setup();
    let modifier = Modifier {
        tree: true,
        ..Modifier::default()
    };

    let result = selector
        .select(&RequestContext::new(), &one("name", "^=", "oak").with_modifier(modifier))
        .await
        .unwrap();

    assert_eq!(result.len(), 2);
    assert!(result.iter().all(ResultNode::is_leaf));
    assert_eq!(factory.inner().find_count(), 1);
}

// =============================================================================
// Failure Tests
// =============================================================================

/// The store handle could not be obtained.
#[tokio::test]
async fn test_acquisition_failure_propagates() {
    let selector = Selector::new(
        Arc::new(InMemoryFactory::unavailable("pool exhausted")),
        SelectConfig::default(),
    );

    let err = selector
        .select(&RequestContext::new(), &one("name", "=", "x"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), SelectErrorCode::AcquisitionFailed);
    assert_eq!(
        err.store_error(),
        Some(&StoreError::Unavailable("pool exhausted".into()))
    );
}

/// The primary query fails: error, no records.
#[tokio::test]
async fn test_primary_failure_propagates() {
    let collection = catalogue();
    collection.fail_find(0).unwrap();
    let selector = Selector::new(
        Arc::new(InMemoryFactory::new(collection)),
        SelectConfig::default(),
    );

    let err = selector
        .select(&RequestContext::new(), &one("price", ">", "0"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), SelectErrorCode::PrimaryQueryFailed);
    assert!(err.to_string().contains("SELECT_PRIMARY_QUERY_FAILED"));
    assert_eq!(selector.metrics().snapshot().selects_failed, 1);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

/// Concurrent calls on one selector do not interfere.
#[tokio::test]
async fn test_concurrent_selects_independent() {
    let (selector, _) = setup();
    let selector = Arc::new(selector);

    let handles: Vec<_> = ["oak", "steel", "table"]
        .into_iter()
        .map(|prefix| {
            let selector = Arc::clone(&selector);
            tokio::spawn(async move {
                let query = one("name", "^=", prefix).with_modifier(Modifier::laststep());
                selector
                    .select(&RequestContext::new(), &query)
                    .await
                    .map(|r| r.len())
            })
        })
        .collect();

    let mut counts = Vec::new();
    for handle in handles {
        counts.push(handle.await.unwrap().unwrap());
    }
    assert_eq!(counts, vec![2, 1, 1]);
    assert_eq!(selector.metrics().snapshot().selects_executed, 3);
}
