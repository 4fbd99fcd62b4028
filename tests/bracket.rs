//! Integration tests for the bracket state machine: skeleton construction,
//! knockout seeding, and end-to-end progression to a final ranking.

use pingpong_club_web::{
    apply_round_completion, build_bracket_skeleton, Bracket, BracketError, BracketFormat,
    BracketStage, PlayerRef, RoundStage, RoundStatus,
};
use std::collections::HashSet;
use uuid::Uuid;

fn players(n: usize) -> Vec<PlayerRef> {
    (1..=n)
        .map(|i| PlayerRef::new(Uuid::new_v4(), format!("P{i}")))
        .collect()
}

/// Numeric rank from a "P{i}" test name.
fn rank(p: &PlayerRef) -> usize {
    p.name.trim_start_matches('P').parse().unwrap()
}

/// Score every match of the current round with the given policy.
fn score_current_round<F>(bracket: &mut Bracket, score: F)
where
    F: Fn(&PlayerRef, &PlayerRef) -> (u32, u32),
{
    let idx = bracket.current_round;
    let round = bracket.round_mut(idx).unwrap();
    for m in &mut round.matches {
        let p1 = m.player1.clone().unwrap();
        let p2 = m.player2.clone().unwrap();
        let (s1, s2) = score(&p1, &p2);
        m.set_score(s1, s2);
    }
}

/// The lower-numbered player always wins 11-5.
fn lower_rank_wins(p1: &PlayerRef, p2: &PlayerRef) -> (u32, u32) {
    if rank(p1) < rank(p2) {
        (11, 5)
    } else {
        (5, 11)
    }
}

fn finish(bracket: &Bracket) -> Bracket {
    apply_round_completion(bracket, bracket.current_round).unwrap()
}

/// Play a whole bracket to completion with the lower-numbered player always
/// winning.
fn play_out(mut bracket: Bracket) -> Bracket {
    while bracket.stage != BracketStage::Completed {
        score_current_round(&mut bracket, lower_rank_wins);
        bracket = finish(&bracket);
    }
    bracket
}

#[test]
fn skeleton_has_full_pairing_set() {
    for n in [4, 6, 8, 12] {
        let b = build_bracket_skeleton(&players(n), BracketFormat::Standard).unwrap();
        let rr = &b.rounds[0];
        assert_eq!(rr.stage, RoundStage::RoundRobin);
        assert_eq!(rr.status, RoundStatus::Ongoing);
        assert_eq!(rr.matches.len(), n * (n - 1) / 2);

        let mut pairs = HashSet::new();
        for m in &rr.matches {
            let p = m.player1.as_ref().unwrap().user_id;
            let q = m.player2.as_ref().unwrap().user_id;
            assert_ne!(p, q, "a match must not pair a player with themselves");
            let key = if p < q { (p, q) } else { (q, p) };
            assert!(pairs.insert(key), "duplicate pairing for {n} players");
        }
    }
}

#[test]
fn skeleton_pre_creates_knockout_rounds() {
    let b = build_bracket_skeleton(&players(4), BracketFormat::Standard).unwrap();
    let stages: Vec<_> = b.rounds.iter().map(|r| r.stage).collect();
    assert_eq!(
        stages,
        vec![
            RoundStage::RoundRobin,
            RoundStage::KnockoutSemis,
            RoundStage::KnockoutFinal
        ]
    );

    let b = build_bracket_skeleton(&players(8), BracketFormat::Standard).unwrap();
    let stages: Vec<_> = b.rounds.iter().map(|r| r.stage).collect();
    assert_eq!(
        stages,
        vec![
            RoundStage::RoundRobin,
            RoundStage::KnockoutQuarters,
            RoundStage::KnockoutSemis,
            RoundStage::KnockoutFinal
        ]
    );
    assert_eq!(b.rounds[1].matches.len(), 4);
    // Knockout slots stay empty until seeded.
    assert!(b.rounds[1].matches.iter().all(|m| m.player1.is_none()));

    let b = build_bracket_skeleton(&players(6), BracketFormat::Standard).unwrap();
    assert_eq!(b.rounds[1].matches.len(), 3);
}

#[test]
fn skeleton_rejects_unsupported_counts() {
    for n in [0, 1, 2, 3, 5, 7, 9, 10, 11, 13] {
        assert!(matches!(
            build_bracket_skeleton(&players(n), BracketFormat::Standard),
            Err(BracketError::UnsupportedPlayerCount(_))
        ));
    }
}

#[test]
fn skeleton_rejects_duplicate_participants() {
    let mut ps = players(4);
    ps[3] = ps[0].clone();
    assert!(matches!(
        build_bracket_skeleton(&ps, BracketFormat::Standard),
        Err(BracketError::DuplicateParticipant(_))
    ));
}

#[test]
fn finishing_with_a_drawn_match_is_rejected_and_changes_nothing() {
    let mut b = build_bracket_skeleton(&players(4), BracketFormat::Standard).unwrap();
    score_current_round(&mut b, lower_rank_wins);
    // Spoil one match with equal scores.
    let round = b.round_mut(0).unwrap();
    let spoiled = round.matches[0].match_id;
    round.matches[0].set_score(7, 7);

    let before = b.clone();
    match apply_round_completion(&b, 0) {
        Err(BracketError::UndecidedMatch(id)) => assert_eq!(id, spoiled),
        other => panic!("expected UndecidedMatch, got {:?}", other),
    }
    // Input untouched: no winner finalized, round pointer unchanged.
    assert_eq!(b, before);
    assert_eq!(b.current_round, 0);
    assert_eq!(b.round(0).unwrap().status, RoundStatus::Ongoing);
}

#[test]
fn finishing_a_non_current_round_is_rejected() {
    let mut b = build_bracket_skeleton(&players(4), BracketFormat::Standard).unwrap();
    score_current_round(&mut b, lower_rank_wins);
    assert!(matches!(
        apply_round_completion(&b, 1),
        Err(BracketError::NotCurrentRound { .. })
    ));
    assert!(matches!(
        apply_round_completion(&b, 99),
        Err(BracketError::NotCurrentRound { .. })
    ));
}

#[test]
fn eight_player_quarterfinal_seeding_is_deterministic() {
    let mut b = build_bracket_skeleton(&players(8), BracketFormat::Standard).unwrap();
    score_current_round(&mut b, lower_rank_wins);
    let b = finish(&b);

    assert_eq!(b.current_round, 1);
    let quarters = b.round(1).unwrap();
    assert_eq!(quarters.status, RoundStatus::Ongoing);
    let pairs: Vec<(usize, usize)> = quarters
        .matches
        .iter()
        .map(|m| {
            (
                rank(m.player1.as_ref().unwrap()),
                rank(m.player2.as_ref().unwrap()),
            )
        })
        .collect();
    assert_eq!(pairs, vec![(1, 8), (2, 7), (3, 6), (4, 5)]);
}

#[test]
fn six_player_bye_readmits_best_seeded_loser() {
    let mut b = build_bracket_skeleton(&players(6), BracketFormat::Standard).unwrap();
    score_current_round(&mut b, lower_rank_wins);
    let b = finish(&b);

    let quarters = b.round(1).unwrap();
    let pairs: Vec<(usize, usize)> = quarters
        .matches
        .iter()
        .map(|m| {
            (
                rank(m.player1.as_ref().unwrap()),
                rank(m.player2.as_ref().unwrap()),
            )
        })
        .collect();
    assert_eq!(pairs, vec![(1, 6), (2, 5), (3, 4)]);

    let mut b = b;
    score_current_round(&mut b, lower_rank_wins);
    let b = finish(&b);

    // Winners P1, P2, P3 plus P4, the quarterfinal loser with the best
    // round-robin seed.
    let semis = b.round(2).unwrap();
    let names: Vec<usize> = semis.participants.iter().map(rank).collect();
    assert_eq!(names, vec![1, 2, 3, 4]);
    let pairs: Vec<(usize, usize)> = semis
        .matches
        .iter()
        .map(|m| {
            (
                rank(m.player1.as_ref().unwrap()),
                rank(m.player2.as_ref().unwrap()),
            )
        })
        .collect();
    assert_eq!(pairs, vec![(1, 4), (2, 3)]);
}

#[test]
fn twelve_player_group_cuts_to_top_eight() {
    let mut b = build_bracket_skeleton(&players(12), BracketFormat::Standard).unwrap();
    assert_eq!(b.rounds[0].matches.len(), 66);
    score_current_round(&mut b, lower_rank_wins);
    let b = finish(&b);

    let quarters = b.round(1).unwrap();
    let pairs: Vec<(usize, usize)> = quarters
        .matches
        .iter()
        .map(|m| {
            (
                rank(m.player1.as_ref().unwrap()),
                rank(m.player2.as_ref().unwrap()),
            )
        })
        .collect();
    assert_eq!(pairs, vec![(1, 8), (2, 7), (3, 6), (4, 5)]);

    let done = play_out(b);
    let stats = done.final_stats.unwrap();
    assert_eq!(stats.len(), 12);
    let places: Vec<u32> = stats.iter().map(|s| s.place).collect();
    assert_eq!(places, (1..=12).collect::<Vec<u32>>());
    // Quarterfinal losers rank 5-8 in seed order, the round-robin cut 9-12.
    let names: Vec<&str> = stats.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["P1", "P2", "P3", "P4", "P5", "P6", "P7", "P8", "P9", "P10", "P11", "P12"]
    );
}

#[test]
fn four_player_bracket_end_to_end() {
    // Round-robin results: A beats B and C, D beats A, B beats C and D,
    // C beats D. Standings: A (2 wins, 31 pf), B (2, 27), C (1, 25),
    // D (1, 19).
    let refs = vec![
        PlayerRef::new(Uuid::new_v4(), "A"),
        PlayerRef::new(Uuid::new_v4(), "B"),
        PlayerRef::new(Uuid::new_v4(), "C"),
        PlayerRef::new(Uuid::new_v4(), "D"),
    ];
    let mut b = build_bracket_skeleton(&refs, BracketFormat::Standard).unwrap();

    let rr_score = |p1: &PlayerRef, p2: &PlayerRef| -> (u32, u32) {
        let scores = |a: &str, x: u32, b: &str, y: u32| {
            if p1.name == a && p2.name == b {
                Some((x, y))
            } else if p1.name == b && p2.name == a {
                Some((y, x))
            } else {
                None
            }
        };
        scores("A", 11, "B", 5)
            .or_else(|| scores("A", 11, "C", 5))
            .or_else(|| scores("A", 9, "D", 11))
            .or_else(|| scores("B", 11, "C", 9))
            .or_else(|| scores("B", 11, "D", 5))
            .or_else(|| scores("C", 11, "D", 3))
            .unwrap()
    };
    score_current_round(&mut b, rr_score);
    let mut b = finish(&b);

    // Semis: seed1 vs seed4, seed2 vs seed3.
    let semis = b.round(1).unwrap();
    let pairing: Vec<(String, String)> = semis
        .matches
        .iter()
        .map(|m| {
            (
                m.player1.as_ref().unwrap().name.clone(),
                m.player2.as_ref().unwrap().name.clone(),
            )
        })
        .collect();
    assert_eq!(
        pairing,
        vec![
            ("A".to_string(), "D".to_string()),
            ("B".to_string(), "C".to_string())
        ]
    );

    score_current_round(&mut b, |p1, _| {
        if p1.name == "A" {
            (11, 5)
        } else {
            (11, 9)
        }
    });
    let mut b = finish(&b);

    // Finals: 3rd place between the semi losers, Grand Final between the
    // winners.
    let finals = b.round(2).unwrap();
    assert_eq!(finals.matches[0].name.as_deref(), Some("3rd Place"));
    assert_eq!(finals.matches[1].name.as_deref(), Some("Grand Final"));
    assert_eq!(finals.matches[0].player1.as_ref().unwrap().name, "D");
    assert_eq!(finals.matches[0].player2.as_ref().unwrap().name, "C");
    assert_eq!(finals.matches[1].player1.as_ref().unwrap().name, "A");
    assert_eq!(finals.matches[1].player2.as_ref().unwrap().name, "B");

    score_current_round(&mut b, |p1, _| {
        if p1.name == "A" {
            (11, 7)
        } else {
            (11, 9)
        }
    });
    let b = finish(&b);

    assert_eq!(b.stage, BracketStage::Completed);
    assert_eq!(b.champion.as_ref().unwrap().name, "A");
    let stats = b.final_stats.as_ref().unwrap();
    assert_eq!(stats.len(), 4);
    let order: Vec<&str> = stats.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(order, vec!["A", "B", "D", "C"]);
    assert_eq!(stats[0].place, 1);
    let places: HashSet<u32> = stats.iter().map(|s| s.place).collect();
    assert_eq!(places, (1..=4).collect::<HashSet<u32>>());
    // Aggregates cover all bracket matches: A won both round-robin wins,
    // the semi, and the Grand Final.
    assert_eq!(stats[0].wins, 4);
    assert_eq!(stats[0].losses, 1);

    // A completed bracket accepts no further transitions or edits.
    assert!(matches!(
        apply_round_completion(&b, b.current_round),
        Err(BracketError::BracketCompleted)
    ));
    let mut frozen = b.clone();
    let some_match = frozen.rounds[0].matches[0].match_id;
    assert!(matches!(
        frozen.set_match_score(some_match, 1, 0),
        Err(BracketError::BracketCompleted)
    ));
}

#[test]
fn iterative_elimination_drops_the_tail_each_round() {
    let mut b = build_bracket_skeleton(&players(7), BracketFormat::IterativeElimination).unwrap();
    assert_eq!(b.rounds.len(), 1);
    score_current_round(&mut b, lower_rank_wins);
    let b = finish(&b);

    // P7 is out; the survivors play another full round robin.
    let next = b.round(1).unwrap();
    assert_eq!(next.stage, RoundStage::RoundRobin);
    let names: Vec<usize> = next.participants.iter().map(rank).collect();
    assert_eq!(names, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(next.matches.len(), 15);
}

#[test]
fn iterative_elimination_hands_off_to_semis_at_four() {
    let mut b = build_bracket_skeleton(&players(5), BracketFormat::IterativeElimination).unwrap();
    score_current_round(&mut b, lower_rank_wins);
    let b = finish(&b);

    let semis = b.round(1).unwrap();
    assert_eq!(semis.stage, RoundStage::KnockoutSemis);
    let pairs: Vec<(usize, usize)> = semis
        .matches
        .iter()
        .map(|m| {
            (
                rank(m.player1.as_ref().unwrap()),
                rank(m.player2.as_ref().unwrap()),
            )
        })
        .collect();
    assert_eq!(pairs, vec![(1, 4), (2, 3)]);

    let done = play_out(b);
    assert_eq!(done.stage, BracketStage::Completed);
    assert_eq!(done.champion.as_ref().unwrap().name, "P1");
    let stats = done.final_stats.unwrap();
    assert_eq!(stats.len(), 5);
    assert_eq!(stats[4].name, "P5");
    assert_eq!(stats[4].place, 5);
}

#[test]
fn iterative_elimination_degenerate_field_declares_leader() {
    let mut b = build_bracket_skeleton(&players(3), BracketFormat::IterativeElimination).unwrap();
    score_current_round(&mut b, lower_rank_wins);
    let b = finish(&b);

    assert_eq!(b.stage, BracketStage::Completed);
    assert_eq!(b.champion.as_ref().unwrap().name, "P1");
    let stats = b.final_stats.unwrap();
    assert_eq!(stats.len(), 3);
}

#[test]
fn iterative_elimination_rejects_tiny_fields() {
    assert!(matches!(
        build_bracket_skeleton(&players(2), BracketFormat::IterativeElimination),
        Err(BracketError::NotEnoughPlayers(2))
    ));
}
