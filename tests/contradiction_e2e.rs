use groundcheck::{
    GroundCheck, GroundCheckOptions, LexicalMatcher, Memory, VerifyMode,
};

fn verifier() -> GroundCheck {
    GroundCheck::new(GroundCheckOptions::default()).unwrap()
}

#[test]
fn exclusive_slot_conflict_is_reported() {
    let gc = verifier();
    let memories = vec![
        Memory::with_trust("m1", "User works at Microsoft", 0.9),
        Memory::with_trust("m2", "User works at Amazon", 0.8),
    ];

    let report = gc
        .verify("You work at Microsoft", &memories, VerifyMode::Strict)
        .unwrap();

    assert_eq!(report.contradiction_details.len(), 1);
    let detail = &report.contradiction_details[0];
    assert_eq!(detail.slot, "employer");
    assert_eq!(detail.most_trusted_value, "microsoft");
    // The draft claim sits on a contradicted slot.
    assert!(!report.passed);
}

#[test]
fn additive_slots_coexist() {
    let gc = verifier();
    let memories = vec![
        Memory::new("My hobby is hiking"),
        Memory::new("My hobby is cooking"),
    ];

    let report = gc
        .verify("Your hobby is hiking", &memories, VerifyMode::Strict)
        .unwrap();

    assert!(report.contradiction_details.is_empty());
    assert!(report.passed);
}

#[test]
fn small_trust_gap_needs_no_disclosure() {
    let gc = verifier();
    let memories = vec![
        Memory::with_trust("m1", "User works at Microsoft", 0.85),
        Memory::with_trust("m2", "User works at Amazon", 0.80),
    ];

    let report = gc
        .verify("You work at Microsoft", &memories, VerifyMode::Permissive)
        .unwrap();

    assert_eq!(report.contradiction_details.len(), 1);
    assert!(!report.requires_disclosure);
}

#[test]
fn large_trust_gap_requires_disclosure() {
    let gc = verifier();
    let memories = vec![
        Memory::with_trust("m1", "User works at Microsoft", 0.95),
        Memory::with_trust("m2", "User works at Amazon", 0.40),
    ];

    let report = gc
        .verify("You work at Microsoft", &memories, VerifyMode::Permissive)
        .unwrap();

    assert!(report.requires_disclosure);
}

#[test]
fn disclosure_language_in_draft_suppresses_flag() {
    let gc = verifier();
    let memories = vec![
        Memory::with_trust("m1", "User works at Microsoft", 0.95),
        Memory::with_trust("m2", "User works at Amazon", 0.40),
    ];

    let report = gc
        .verify(
            "You work at Microsoft, previously Amazon",
            &memories,
            VerifyMode::Permissive,
        )
        .unwrap();

    assert!(!report.requires_disclosure);
}

#[test]
fn recency_and_trust_policies_resolve_independently() {
    let gc = verifier();
    let memories = vec![
        Memory::with_trust("m1", "User lives in Seattle", 0.9).at(10),
        Memory::with_trust("m2", "User lives in Portland", 0.5).at(20),
    ];

    let report = gc
        .verify("You live in Seattle", &memories, VerifyMode::Permissive)
        .unwrap();

    let detail = &report.contradiction_details[0];
    assert_eq!(detail.most_trusted_value, "seattle");
    assert_eq!(detail.most_recent_value, "portland");
}

#[test]
fn timestamp_ties_fall_back_to_trust_then_order() {
    let gc = verifier();
    let memories = vec![
        Memory::with_trust("m1", "User lives in Seattle", 0.6),
        Memory::with_trust("m2", "User lives in Portland", 0.6),
    ];

    let report = gc
        .verify("You live in Seattle", &memories, VerifyMode::Permissive)
        .unwrap();

    let detail = &report.contradiction_details[0];
    // Full tie on trust and (absent) timestamps: first in list wins both.
    assert_eq!(detail.most_trusted_value, "seattle");
    assert_eq!(detail.most_recent_value, "seattle");
}

#[test]
fn dynamic_slot_conflicts_without_matcher() {
    let gc = verifier();
    let memories = vec![
        Memory::new("deploy cadence is weekly"),
        Memory::new("deploy cadence is daily"),
    ];

    let report = gc
        .verify("deploy cadence is weekly", &memories, VerifyMode::Permissive)
        .unwrap();

    assert_eq!(report.contradiction_details.len(), 1);
    assert_eq!(report.contradiction_details[0].slot, "deploy_cadence");
}

#[test]
fn dynamic_slot_with_matcher_uses_entailment() {
    let gc = GroundCheck::with_matcher(
        GroundCheckOptions {
            neural: true,
            ..GroundCheckOptions::default()
        },
        Box::new(LexicalMatcher::new()),
    )
    .unwrap();

    // Near-identical memory texts: the lexical matcher does not read
    // them as contradicting, so the dynamic slot stays quiet.
    let memories = vec![
        Memory::new("the deploy cadence is weekly for services"),
        Memory::new("the deploy cadence is weekly for jobs"),
    ];

    let report = gc
        .verify("Your editor is Vim", &memories, VerifyMode::Permissive)
        .unwrap();

    assert!(report.contradiction_details.is_empty());
}

#[test]
fn memory_contradicting_itself_is_flagged() {
    let gc = verifier();
    // The copular claim and the adoption in the second clause disagree;
    // the memory is asserting both values.
    let memories = vec![Memory::with_trust(
        "m1",
        "the database is SQLite, but we adopted PostgreSQL",
        0.9,
    )];

    let report = gc
        .verify("Your database is SQLite", &memories, VerifyMode::Permissive)
        .unwrap();

    assert_eq!(report.contradiction_details.len(), 1);
    let detail = &report.contradiction_details[0];
    assert_eq!(detail.slot, "database");
    assert!(detail.values.contains(&"sqlite".to_string()));
    assert!(detail.values.contains(&"postgresql".to_string()));
}

#[test]
fn contradiction_on_unclaimed_slot_does_not_fail_draft() {
    let gc = verifier();
    let memories = vec![
        Memory::with_trust("m1", "User works at Microsoft", 0.9),
        Memory::with_trust("m2", "User works at Amazon", 0.85),
        Memory::with_trust("m3", "User lives in Seattle", 0.8),
    ];

    let report = gc
        .verify("You live in Seattle", &memories, VerifyMode::Strict)
        .unwrap();

    // The employer conflict exists but the draft never claims employer.
    assert_eq!(report.contradiction_details.len(), 1);
    assert!(report.passed);
}
