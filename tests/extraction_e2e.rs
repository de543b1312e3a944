use groundcheck::normalize::normalize_value;
use groundcheck::{GroundCheck, GroundCheckOptions, VerbCategory};

fn verifier() -> GroundCheck {
    GroundCheck::new(GroundCheckOptions::default()).unwrap()
}

#[test]
fn adoption_and_deprecation_from_sentiment() {
    let gc = verifier();
    let facts =
        gc.extract_knowledge_facts("we ended up going with Postgres after the whole MySQL disaster");

    assert_eq!(facts.len(), 2);

    let adopted = facts
        .iter()
        .find(|f| f.verb_category == VerbCategory::Adoption)
        .expect("adoption fact");
    assert_eq!(adopted.entity, "PostgreSQL");
    assert_eq!(adopted.category, "database");

    let deprecated = facts
        .iter()
        .find(|f| f.verb_category == VerbCategory::Deprecation)
        .expect("deprecation fact");
    assert_eq!(deprecated.entity, "MySQL");

    // No from/to cue, so no migration fact.
    assert!(facts
        .iter()
        .all(|f| f.verb_category != VerbCategory::Migration));
}

#[test]
fn migration_fuses_into_single_fact() {
    let gc = verifier();
    let facts = gc.extract_knowledge_facts("we migrated from MySQL to PostgreSQL");

    assert_eq!(facts.len(), 1);
    assert_eq!(facts[0].verb_category, VerbCategory::Migration);
    assert_eq!(facts[0].entity, "PostgreSQL");
    assert_eq!(facts[0].migrated_from.as_deref(), Some("MySQL"));
}

#[test]
fn tentative_migration_stays_tentative_but_keeps_route() {
    let gc = verifier();
    let facts = gc.extract_knowledge_facts("considering migrating from MySQL to PostgreSQL");

    assert_eq!(facts.len(), 1);
    assert_eq!(facts[0].verb_category, VerbCategory::Tentative);
    assert!((facts[0].confidence - 0.5).abs() < f64::EPSILON);
    assert_eq!(facts[0].entity, "PostgreSQL");
    assert_eq!(facts[0].migrated_from.as_deref(), Some("MySQL"));
}

#[test]
fn clause_splitting_yields_both_copular_facts() {
    let gc = verifier();
    let claims = gc.extract_claims("frontend is React, backend is FastAPI");

    assert_eq!(claims["frontend"].value, "React");
    assert_eq!(claims["backend"].value, "FastAPI");
}

#[test]
fn single_digit_config_value_survives() {
    let gc = verifier();
    let claims = gc.extract_claims("Max retries should be 5");
    assert_eq!(claims["max_retries"].value, "5");
}

#[test]
fn normalize_round_trip_holds_for_all_claims() {
    let gc = verifier();
    let claims = gc.extract_claims(
        "You work at Amazon and live in Seattle. Your favorite color is blue. \
         frontend is React, backend is FastAPI. Max retries should be 5",
    );
    assert!(!claims.is_empty());
    for fact in claims.values() {
        assert_eq!(fact.normalized, normalize_value(&fact.value));
    }
}

#[test]
fn knowledge_facts_fill_pattern_gaps_in_claims() {
    let gc = verifier();
    let claims = gc.extract_claims("we migrated from MySQL to PostgreSQL");
    assert_eq!(claims["database"].normalized, "postgresql");
}

#[test]
fn questions_produce_no_claims() {
    let gc = verifier();
    assert!(gc.extract_claims("Where do you work these days?").is_empty());
    assert!(gc.extract_claims("What is your favorite color").is_empty());
}

#[test]
fn spans_allow_slicing_the_original_draft() {
    let gc = verifier();
    let draft = "You work at Amazon and live in Seattle";
    let claims = gc.extract_claims(draft);
    let span = claims["employer"].source_span;
    assert_eq!(&draft[span.start..span.end], "Amazon");
}

#[test]
fn arrow_cue_reads_as_migration() {
    let gc = verifier();
    let facts = gc.extract_knowledge_facts("we switched MySQL -> PostgreSQL last sprint");
    let migration = facts
        .iter()
        .find(|f| f.verb_category == VerbCategory::Migration)
        .expect("migration fact");
    assert_eq!(migration.entity, "PostgreSQL");
    assert_eq!(migration.migrated_from.as_deref(), Some("MySQL"));
}
