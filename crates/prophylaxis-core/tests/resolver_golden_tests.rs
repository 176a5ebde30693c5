//! Golden tests for dose-event resolution.
//!
//! Each case feeds raw upstream rows through the full analyzer and checks the
//! resulting dose days, confidences and dominant sources.

use chrono::{DateTime, TimeZone, Utc};

use prophylaxis_core::models::{CompletionRow, DiaryRow, IntakeRow, ReminderRow};
use prophylaxis_core::{
    DayRange, DrugRegistry, EvidenceSourceKind, ProphylaxisAnalyzer, RecordBundle,
};

/// Test case with its expected events in date order.
struct GoldenCase {
    id: &'static str,
    drug_id: &'static str,
    bundle: RecordBundle,
    expected_days: Vec<&'static str>,
    expected_confidence: Vec<f64>,
    expected_sources: Vec<EvidenceSourceKind>,
}

fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn now() -> DateTime<Utc> {
    utc(2024, 6, 30, 12)
}

fn intake(id: &str, date: &str, name: &str) -> IntakeRow {
    IntakeRow {
        id: id.into(),
        medication_name: name.into(),
        date: Some(date.into()),
        taken_at: None,
    }
}

fn diary(id: &str, date: &str, meds: &[&str], notes: Option<&str>) -> DiaryRow {
    DiaryRow {
        id: id.into(),
        medications: Some(meds.iter().map(|m| m.to_string()).collect()),
        date: Some(date.into()),
        notes: notes.map(|n| n.into()),
        pain_level: "3".into(),
        ..Default::default()
    }
}

fn reminder(id: &str, title: &str, scheduled_at: DateTime<Utc>) -> ReminderRow {
    ReminderRow {
        id: id.into(),
        title: title.into(),
        medications: None,
        scheduled_at,
        kind: "medication".into(),
    }
}

fn completion(reminder_id: &str, completed_at: DateTime<Utc>) -> CompletionRow {
    CompletionRow {
        reminder_id: reminder_id.into(),
        completed_at,
    }
}

fn get_golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "explicit-intake",
            drug_id: "erenumab",
            bundle: RecordBundle {
                intakes: vec![intake("i1", "2024-02-01", "Aimovig 140 mg")],
                ..Default::default()
            },
            expected_days: vec!["2024-02-01"],
            expected_confidence: vec![1.0],
            expected_sources: vec![EvidenceSourceKind::ExplicitRecord],
        },
        GoldenCase {
            id: "explicit-diary-medication",
            drug_id: "fremanezumab",
            bundle: RecordBundle {
                diary: vec![diary("d1", "2024-02-01", &["Ibuprofen", "Ajovy 225mg"], None)],
                ..Default::default()
            },
            expected_days: vec!["2024-02-01"],
            expected_confidence: vec![1.0],
            expected_sources: vec![EvidenceSourceKind::ExplicitRecord],
        },
        GoldenCase {
            id: "completed-on-time",
            drug_id: "erenumab",
            bundle: RecordBundle {
                reminders: vec![reminder("r1", "Aimovig Spritze", utc(2024, 2, 1, 8))],
                completions: vec![completion("r1", utc(2024, 2, 1, 9))],
                ..Default::default()
            },
            expected_days: vec!["2024-02-01"],
            expected_confidence: vec![0.9],
            expected_sources: vec![EvidenceSourceKind::CompletedReminder],
        },
        GoldenCase {
            id: "completed-two-days-late",
            drug_id: "erenumab",
            bundle: RecordBundle {
                reminders: vec![reminder("r1", "Aimovig", utc(2024, 2, 1, 8))],
                completions: vec![completion("r1", utc(2024, 2, 3, 8))],
                ..Default::default()
            },
            expected_days: vec!["2024-02-03"],
            expected_confidence: vec![0.8],
            expected_sources: vec![EvidenceSourceKind::CompletedReminder],
        },
        GoldenCase {
            id: "completed-beyond-72h",
            drug_id: "erenumab",
            bundle: RecordBundle {
                reminders: vec![reminder("r1", "Aimovig", utc(2024, 2, 1, 8))],
                completions: vec![completion("r1", utc(2024, 2, 5, 8))],
                ..Default::default()
            },
            expected_days: vec!["2024-02-05"],
            expected_confidence: vec![0.6],
            expected_sources: vec![EvidenceSourceKind::CompletedReminder],
        },
        GoldenCase {
            id: "scheduled-only",
            drug_id: "galcanezumab",
            bundle: RecordBundle {
                reminders: vec![reminder("r1", "Emgality", utc(2024, 3, 1, 8))],
                ..Default::default()
            },
            expected_days: vec!["2024-03-01"],
            expected_confidence: vec![0.6],
            expected_sources: vec![EvidenceSourceKind::ScheduledReminder],
        },
        GoldenCase {
            id: "reminder-not-yet-due",
            drug_id: "galcanezumab",
            bundle: RecordBundle {
                reminders: vec![reminder("r1", "Emgality", utc(2024, 9, 1, 8))],
                ..Default::default()
            },
            expected_days: vec![],
            expected_confidence: vec![],
            expected_sources: vec![],
        },
        GoldenCase {
            id: "free-text-administration",
            drug_id: "erenumab",
            bundle: RecordBundle {
                diary: vec![diary("d1", "2024-04-02", &[], Some("Heute Aimovig gespritzt"))],
                ..Default::default()
            },
            expected_days: vec!["2024-04-02"],
            expected_confidence: vec![0.6],
            expected_sources: vec![EvidenceSourceKind::FreeTextMention],
        },
        GoldenCase {
            id: "free-text-incidental",
            drug_id: "erenumab",
            bundle: RecordBundle {
                diary: vec![diary("d1", "2024-04-02", &[], Some("Rezept für Aimovig abgeholt"))],
                ..Default::default()
            },
            expected_days: vec!["2024-04-02"],
            expected_confidence: vec![0.4],
            expected_sources: vec![EvidenceSourceKind::FreeTextMention],
        },
        GoldenCase {
            id: "explicit-day-wins-in-cluster",
            drug_id: "erenumab",
            bundle: RecordBundle {
                intakes: vec![intake("i1", "2024-01-10", "Aimovig")],
                reminders: vec![reminder("r1", "Aimovig", utc(2024, 1, 12, 8))],
                completions: vec![completion("r1", utc(2024, 1, 12, 10))],
                ..Default::default()
            },
            expected_days: vec!["2024-01-10"],
            expected_confidence: vec![1.0],
            expected_sources: vec![EvidenceSourceKind::ExplicitRecord],
        },
        GoldenCase {
            id: "far-apart-doses",
            drug_id: "erenumab",
            bundle: RecordBundle {
                intakes: vec![
                    intake("i2", "2024-03-15", "Aimovig"),
                    intake("i1", "2024-01-05", "Aimovig"),
                ],
                ..Default::default()
            },
            expected_days: vec!["2024-01-05", "2024-03-15"],
            expected_confidence: vec![1.0, 1.0],
            expected_sources: vec![
                EvidenceSourceKind::ExplicitRecord,
                EvidenceSourceKind::ExplicitRecord,
            ],
        },
        GoldenCase {
            id: "unrelated-medications",
            drug_id: "erenumab",
            bundle: RecordBundle {
                intakes: vec![
                    intake("i1", "2024-02-01", "Ibuprofen 400"),
                    intake("i2", "2024-02-02", "Sumatriptan"),
                ],
                diary: vec![diary("d1", "2024-02-03", &["Topiramat"], Some("Kopfschmerz"))],
                ..Default::default()
            },
            expected_days: vec![],
            expected_confidence: vec![],
            expected_sources: vec![],
        },
    ]
}

#[test]
fn test_golden_cases() {
    let registry = DrugRegistry::new();
    let analyzer = ProphylaxisAnalyzer::new(&registry);
    let range = DayRange::parse("2024-01-01", "2024-12-31").unwrap();

    for case in get_golden_cases() {
        let analysis = analyzer
            .analyze(case.drug_id, &case.bundle, range, now())
            .unwrap();

        let days: Vec<String> = analysis.events.iter().map(|e| e.day.to_string()).collect();
        assert_eq!(days, case.expected_days, "Case {}: day mismatch", case.id);

        let confidence: Vec<f64> = analysis.events.iter().map(|e| e.confidence.value()).collect();
        assert_eq!(
            confidence, case.expected_confidence,
            "Case {}: confidence mismatch",
            case.id
        );

        let sources: Vec<EvidenceSourceKind> =
            analysis.events.iter().map(|e| e.dominant_source).collect();
        assert_eq!(sources, case.expected_sources, "Case {}: source mismatch", case.id);
    }
}

#[test]
fn test_any_evidence_yields_an_event() {
    let registry = DrugRegistry::new();
    let analyzer = ProphylaxisAnalyzer::new(&registry);
    let range = DayRange::parse("2024-01-01", "2024-12-31").unwrap();

    for case in get_golden_cases() {
        let profile = registry.get(case.drug_id).unwrap();
        let records = prophylaxis_core::adapter::adapt_records(&case.bundle).unwrap();
        let evidence = prophylaxis_core::EvidenceResolver::new(profile, now())
            .collect_evidence(&records, &range);

        let analysis = analyzer
            .analyze(case.drug_id, &case.bundle, range, now())
            .unwrap();
        assert_eq!(
            evidence.is_empty(),
            analysis.events.is_empty(),
            "Case {}: evidence and events disagree",
            case.id
        );
    }
}

#[test]
fn test_all_brand_names_resolve() {
    let registry = DrugRegistry::new();

    let alias_tests = vec![
        ("Aimovig", "erenumab"),
        ("ajovy", "fremanezumab"),
        ("EMGALITY", "galcanezumab"),
        ("Vyepti", "eptinezumab"),
        ("Botox", "onabotulinumtoxina"),
        ("aimovic", "erenumab"),
    ];

    for (name, expected) in alias_tests {
        let result = registry.suggest(name).map(|p| p.id.as_str());
        assert_eq!(
            result,
            Some(expected),
            "Name {} should resolve to {}, got {:?}",
            name, expected, result
        );
    }
}

#[test]
fn test_dose_spacing_matches_typical_interval() {
    let registry = DrugRegistry::new();
    let analyzer = ProphylaxisAnalyzer::new(&registry);
    let range = DayRange::parse("2024-01-01", "2024-12-31").unwrap();

    let bundle = RecordBundle {
        intakes: ["2024-01-04", "2024-02-01", "2024-02-29", "2024-03-28"]
            .iter()
            .enumerate()
            .map(|(i, d)| intake(&format!("i{}", i), d, "Aimovig"))
            .collect(),
        ..Default::default()
    };

    let analysis = analyzer.analyze("erenumab", &bundle, range, now()).unwrap();
    assert_eq!(analysis.typical_interval_days, Some(28));

    let spacing: Vec<i64> = analysis
        .events
        .windows(2)
        .map(|pair| pair[0].day.days_until(pair[1].day))
        .collect();
    assert_eq!(spacing, vec![28, 28, 28]);
}
