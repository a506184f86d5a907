use chrono::{DateTime, FixedOffset};
use quarry::common::Value;
use quarry::criteria::{field, CriteriaDocument, ObjectId};
use quarry::options::OptionsDocument;
use quarry::{criteria, options, to_object_id};

#[ctor::ctor]
fn init() {
    colog::init();
}

#[test]
fn test_full_query_compilation() {
    // the builder layer feeds loose fragments; the engine compiles the
    // canonical (filter, options) pair
    let mut criteria = CriteriaDocument::new();
    criteria
        .set_object_ids(Value::Array(vec![Value::from("author_id")]))
        .unwrap();
    criteria.set("title", "No Country for Old Men");
    criteria.set("author_id", "4f8d8c66e5a4e45396000009");
    criteria.set(field("year").gte(), 2000);
    criteria.set(field("year").lt(), 2010);
    criteria.set("tags", vec!["western", "novel"]);

    let mut options = OptionsDocument::new();
    options.set("order", "year desc, title");
    options.set("select", "title, year");
    options.set("offset", "20");
    options.set("limit", 10);

    let filter = criteria.to_map();
    assert_eq!(
        filter.get("author_id"),
        Some(&Value::ObjectId(
            ObjectId::parse_str("4f8d8c66e5a4e45396000009").unwrap()
        ))
    );
    match filter.get("year") {
        Some(Value::Modifiers(map)) => {
            assert_eq!(map.get("$gte"), Some(&Value::I32(2000)));
            assert_eq!(map.get("$lt"), Some(&Value::I32(2010)));
        }
        other => panic!("expected modifiers for year, got {:?}", other),
    }
    match filter.get("tags") {
        Some(Value::Modifiers(map)) => assert!(map.contains_key("$in")),
        other => panic!("expected $in wrap for tags, got {:?}", other),
    }

    assert_eq!(
        options.sort_pairs(),
        Some(vec![("year".to_string(), -1), ("title".to_string(), 1)])
    );
    assert_eq!(options.skip(), Some(20));
    assert_eq!(options.limit(), Some(10));
    assert!(options.has_fields());
}

#[test]
fn test_merge_chain_preserves_boolean_semantics() {
    let published = criteria! { "$or": [{ status: "published" }, { legacy: true }] };
    let visible = criteria! { "$or": [{ hidden: false }, { owner: "admin" }] };
    let recent = criteria! { year: { "$gte": 2020 } };

    let combined = published
        .merge(&visible)
        .unwrap()
        .merge(&recent)
        .unwrap();

    // the two disjunctions stay conjoined under $and, never unioned
    assert!(combined.get("$or").is_none());
    match combined.get("$and") {
        Some(Value::Documents(clauses)) => {
            assert_eq!(clauses.len(), 2);
            assert!(clauses.iter().all(|clause| clause.contains_key("$or")));
        }
        other => panic!("expected $and clause list, got {:?}", other),
    }
    assert!(combined.contains_key("year"));
}

#[test]
fn test_repeated_narrowing_accumulates_in_lists() {
    let mut narrowed = criteria! { category: "fiction" };
    for author in ["cormac", "toni", "ursula"] {
        narrowed.merge_in_place(&criteria! { author: author }).unwrap();
    }

    match narrowed.get("author") {
        Some(Value::Modifiers(map)) => {
            assert_eq!(
                map.get("$in"),
                Some(&Value::Array(vec![
                    Value::from("cormac"),
                    Value::from("toni"),
                    Value::from("ursula")
                ]))
            );
        }
        other => panic!("expected $in union, got {:?}", other),
    }
    assert_eq!(narrowed.get("category"), Some(&Value::from("fiction")));
}

#[test]
fn test_identity_map_fast_path_signal() {
    let mut by_id = CriteriaDocument::new();
    by_id.set("id", 42);
    assert!(by_id.is_simple());

    by_id.set("_type", "Post");
    assert!(by_id.is_simple());

    by_id.set("title", "x");
    assert!(!by_id.is_simple());
}

#[test]
fn test_timestamps_compile_to_utc() {
    let eastern: DateTime<FixedOffset> = "2013-01-02T05:04:05+05:00".parse().unwrap();
    let mut criteria = CriteriaDocument::new();
    criteria.set(field("created_at").lte(), eastern);

    match criteria.get("created_at") {
        Some(Value::Modifiers(map)) => match map.get("$lte") {
            Some(Value::DateTime(stamp)) => {
                assert_eq!(stamp.offset().local_minus_utc(), 0);
                assert_eq!(stamp, &eastern);
            }
            other => panic!("expected datetime operand, got {:?}", other),
        },
        other => panic!("expected modifiers, got {:?}", other),
    }
}

#[test]
fn test_object_id_conversion_is_lenient_end_to_end() {
    let legal = to_object_id(Value::from("4f8d8c66e5a4e45396000009"));
    assert!(matches!(legal, Value::ObjectId(_)));

    let illegal = to_object_id(Value::from("slug-not-an-id"));
    assert_eq!(illegal, Value::from("slug-not-an-id"));
}

#[test]
fn test_macros_compose_with_documents() {
    let from_macro = criteria! {
        author: "cormac",
        age: { "$gt": 20, "$lt": 60 },
        "$nor": [{ banned: true }]
    };

    let mut by_hand = CriteriaDocument::new();
    by_hand.set("author", "cormac");
    by_hand.set(field("age").gt(), 20);
    by_hand.set(field("age").lt(), 60);
    by_hand.set("$nor", vec![criteria! { banned: true }]);

    assert_eq!(from_macro, by_hand);

    let options = options! { order: "age desc", limit: 50, batch_size: 100 };
    assert_eq!(options.sort_pairs(), Some(vec![("age".to_string(), -1)]));
    assert_eq!(options.limit(), Some(50));
    assert_eq!(options.get("batch_size"), Some(&Value::I32(100)));
}

#[test]
fn test_patterns_pass_through_to_the_filter() {
    let mut criteria = CriteriaDocument::new();
    criteria.set("title", regex::Regex::new("^No Country").unwrap());

    match criteria.get("title") {
        Some(Value::Pattern(pattern)) => assert_eq!(pattern.as_str(), "^No Country"),
        other => panic!("expected pattern, got {:?}", other),
    }
}

#[test]
fn test_merge_failure_surfaces_instead_of_dropping() {
    let clause_list = criteria! { "$nor": [{ a: 1 }] };
    let scalar_nor = criteria! { "$nor": "not-a-clause-list" };

    let result = clause_list.merge(&scalar_nor);
    assert!(result.is_err());
}
