//! Matching engine behaviour over realistic pools

use jiff::{Timestamp, ToSpan};
use shortlist::prelude::*;
use testresult::TestResult;
use uuid::Uuid;

fn senior_go_request() -> HiringCriteria {
    HiringCriteria {
        role_title: "Senior Go Engineer".to_string(),
        tech_stack: vec!["Go".to_string(), "Kubernetes".to_string()],
        seniority: Some(Seniority::Senior),
        location: HiringLocation {
            remote: true,
            ..HiringLocation::default()
        },
    }
}

fn profile(id: u128) -> CandidateProfile {
    CandidateProfile {
        uuid: Uuid::from_u128(id),
        desired_role: None,
        seniority: None,
        skills: Vec::new(),
        recommendation_count: 0,
        last_active_at: None,
        availability: Availability::Passive,
        location: CandidateLocation::default(),
        visible: true,
        open_to_opportunities: true,
    }
}

fn skills(names: &[&str]) -> Vec<CandidateSkill> {
    names
        .iter()
        .map(|name| CandidateSkill {
            name: (*name).to_string(),
            confidence: 0.9,
        })
        .collect()
}

#[test]
fn ideal_candidate_ranks_first() -> TestResult {
    let now: Timestamp = "2026-05-04T09:00:00Z".parse()?;

    let ideal = CandidateProfile {
        desired_role: Some("Senior Go Engineer".to_string()),
        seniority: Some(Seniority::Senior),
        skills: vec![
            CandidateSkill {
                name: "Go".to_string(),
                confidence: 1.0,
            },
            CandidateSkill {
                name: "Kubernetes".to_string(),
                confidence: 1.0,
            },
        ],
        recommendation_count: 5,
        last_active_at: Some(now),
        availability: Availability::ActivelyOpen,
        location: CandidateLocation {
            work_preference: WorkPreference::Remote,
            ..CandidateLocation::default()
        },
        ..profile(0xff)
    };

    let decent = CandidateProfile {
        desired_role: Some("Backend Engineer".to_string()),
        seniority: Some(Seniority::Mid),
        skills: skills(&["Go"]),
        recommendation_count: 1,
        last_active_at: Some(now.checked_sub(200.hours())?),
        ..profile(0x01)
    };

    let pool = [decent, ideal];
    let matches = MatchingEngine::default().find_matches(
        &senior_go_request(),
        &pool,
        &MatchOptions::default(),
        now,
    );

    let first = matches.first().ok_or("expected matches")?;

    assert_eq!(first.candidate, Uuid::from_u128(0xff));
    assert!(first.score >= 90.0, "score was {}", first.score);
    assert!(first.is_new);
    assert!(first.reason.contains("Go, Kubernetes"));

    Ok(())
}

#[test]
fn results_are_bounded_sorted_and_above_cutoff() -> TestResult {
    let now: Timestamp = "2026-05-04T09:00:00Z".parse()?;
    let stacks: [&[&str]; 4] = [&["Go", "Kubernetes"], &["Go"], &["Java"], &[]];
    let seniorities = [
        Some(Seniority::Junior),
        Some(Seniority::Senior),
        Some(Seniority::Principal),
        None,
    ];
    let availabilities = [
        Availability::ActivelyOpen,
        Availability::Passive,
        Availability::NotNow,
    ];

    let mut pool = Vec::new();
    let mut id = 0_u128;

    for stack in stacks {
        for seniority in seniorities {
            for availability in availabilities {
                for days in [0_i64, 10, 90] {
                    id += 1;

                    pool.push(CandidateProfile {
                        seniority,
                        skills: skills(stack),
                        availability,
                        recommendation_count: u32::try_from(id % 6)?,
                        last_active_at: Some(now.checked_sub((days * 24).hours())?),
                        ..profile(id)
                    });
                }
            }
        }
    }

    let options = MatchOptions {
        max_results: Some(10),
        ..MatchOptions::default()
    };
    let matches = MatchingEngine::default().find_matches(&senior_go_request(), &pool, &options, now);

    assert!(matches.len() <= 10);
    assert!(!matches.is_empty());

    for found in &matches {
        assert!(found.score > 20.0 && found.score <= 100.0);
    }

    for pair in matches.windows(2) {
        if let [a, b] = pair {
            assert!(a.score >= b.score);
        }
    }

    Ok(())
}

#[test]
fn every_score_stays_within_bounds() -> TestResult {
    let now: Timestamp = "2026-05-04T09:00:00Z".parse()?;
    let engine = MatchingEngine::new(MatchingConfig {
        min_score: -1.0,
        follow_up_freshness_boost: 50.0,
        ..MatchingConfig::default()
    });

    let pool: Vec<_> = (1..=20)
        .map(|id| CandidateProfile {
            skills: skills(&["Go", "Kubernetes", "Terraform"]),
            seniority: Some(Seniority::Senior),
            recommendation_count: 9,
            last_active_at: Some(now),
            availability: Availability::ActivelyOpen,
            ..profile(id)
        })
        .collect();

    let options = MatchOptions {
        is_follow_up: true,
        previous_created_at: Some(now.checked_sub(100.hours())?),
        max_results: Some(100),
        ..MatchOptions::default()
    };

    for found in engine.find_matches(&senior_go_request(), &pool, &options, now) {
        assert!((0.0..=100.0).contains(&found.score));
    }

    Ok(())
}
