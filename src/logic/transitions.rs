//! Bracket state machine: skeleton construction and round-completion
//! transitions.
//!
//! Every transition is a pure function over a bracket snapshot: it either
//! returns a fully advanced copy or an error with the input untouched. There
//! is no long-running process; the whole progression is re-derivable from
//! the last persisted bracket plus the edited scores.

use crate::logic::round_robin::round_robin_matches;
use crate::logic::seeding;
use crate::logic::standings::compute_table;
use crate::models::{
    Bracket, BracketError, BracketFormat, BracketStage, FinalStanding, MatchRecord, PlayerRef,
    Round, RoundStage, RoundStatus,
};
use std::collections::HashSet;

/// Build a complete bracket from a fixed participant list.
///
/// Standard format accepts exactly 4, 6, 8 or 12 distinct players and
/// pre-creates every round up front: the round robin starts ongoing, the
/// knockout rounds wait unseeded. Iterative format accepts any N >= 3 and
/// creates only the first round-robin round; later rounds are appended as
/// players are eliminated.
pub fn build_bracket_skeleton(
    participants: &[PlayerRef],
    format: BracketFormat,
) -> Result<Bracket, BracketError> {
    let mut seen = HashSet::new();
    for p in participants {
        if !seen.insert(p.user_id) {
            return Err(BracketError::DuplicateParticipant(p.user_id));
        }
    }

    let n = participants.len();
    match format {
        BracketFormat::Standard => {
            if !matches!(n, 4 | 6 | 8 | 12) {
                return Err(BracketError::UnsupportedPlayerCount(n));
            }
        }
        BracketFormat::IterativeElimination => {
            if n < 3 {
                return Err(BracketError::NotEnoughPlayers(n));
            }
        }
    }

    let mut rounds = Vec::new();
    let mut group = Round::new(0, "Round Robin", RoundStage::RoundRobin);
    group.participants = participants.to_vec();
    group.matches = round_robin_matches(participants);
    group.status = RoundStatus::Ongoing;
    rounds.push(group);

    if format == BracketFormat::Standard {
        let mut idx = 1;
        if n >= 6 {
            // 6 players: 3 quarterfinals; 8 and 12: 4 (a 12-player round
            // robin sends only its top 8 seeds into the knockout stage).
            let q = if n == 6 { 3 } else { 4 };
            let mut quarters = Round::new(idx, "Quarterfinals", RoundStage::KnockoutQuarters);
            quarters.matches = (0..q).map(|_| MatchRecord::unseeded()).collect();
            rounds.push(quarters);
            idx += 1;
        }
        let mut semis = Round::new(idx, "Semifinals", RoundStage::KnockoutSemis);
        semis.matches = vec![MatchRecord::unseeded(), MatchRecord::unseeded()];
        rounds.push(semis);
        let mut finals = Round::new(idx + 1, "Finals", RoundStage::KnockoutFinal);
        finals.matches = vec![
            MatchRecord::unseeded().named("3rd Place"),
            MatchRecord::unseeded().named("Grand Final"),
        ];
        rounds.push(finals);
    }

    Ok(Bracket {
        stage: BracketStage::RoundRobinThenKo,
        format,
        current_round: 0,
        champion: None,
        final_stats: None,
        rounds,
    })
}

/// Finish `round_index` and advance the bracket.
///
/// Preconditions (all rejected without touching the input): the bracket is
/// not completed, the round is the current one and not yet finished, every
/// match is seeded and has unequal scores. On success the returned bracket
/// has the round's winners finalized, the next round seeded per the
/// transition policy, and `current_round` advanced; finishing the final
/// round completes the bracket with `champion` and `final_stats` set.
pub fn apply_round_completion(bracket: &Bracket, round_index: u32) -> Result<Bracket, BracketError> {
    if bracket.stage == BracketStage::Completed {
        return Err(BracketError::BracketCompleted);
    }
    if round_index != bracket.current_round {
        return Err(BracketError::NotCurrentRound {
            requested: round_index,
            current: bracket.current_round,
        });
    }
    let round = bracket
        .round(round_index)
        .ok_or(BracketError::RoundNotFound(round_index))?;
    if round.status == RoundStatus::Finished {
        return Err(BracketError::RoundAlreadyFinished(round_index));
    }
    for m in &round.matches {
        if m.player1.is_none() || m.player2.is_none() {
            return Err(BracketError::UnseededMatch(m.match_id));
        }
        if !m.is_decided() {
            return Err(BracketError::UndecidedMatch(m.match_id));
        }
    }

    let mut next = bracket.clone();
    let finished = {
        let r = next
            .round_mut(round_index)
            .ok_or(BracketError::RoundNotFound(round_index))?;
        for m in &mut r.matches {
            m.finalize();
        }
        r.status = RoundStatus::Finished;
        r.clone()
    };

    match finished.stage {
        RoundStage::RoundRobin => match next.format {
            BracketFormat::Standard => advance_from_group(&mut next, &finished)?,
            BracketFormat::IterativeElimination => advance_iterative(&mut next, &finished)?,
        },
        RoundStage::KnockoutQuarters => {
            let semis = next
                .round_mut(round_index + 1)
                .ok_or(BracketError::RoundNotFound(round_index + 1))?;
            seeding::seed_semis_from_quarters(semis, &finished)?;
            next.current_round = round_index + 1;
        }
        RoundStage::KnockoutSemis => {
            let finals = next
                .round_mut(round_index + 1)
                .ok_or(BracketError::RoundNotFound(round_index + 1))?;
            seeding::seed_final_from_semis(finals, &finished)?;
            next.current_round = round_index + 1;
        }
        RoundStage::KnockoutFinal => complete_bracket(&mut next, &finished)?,
    }

    log::info!(
        "round {} ({}) finished, bracket now at round {} (stage {:?})",
        round_index,
        finished.label,
        next.current_round,
        next.stage
    );
    Ok(next)
}

/// Standard format: seed the knockout stage from the round-robin standings.
/// 4 players go straight to semifinals (seed1 vs seed4, seed2 vs seed3);
/// 6, 8 and 12 players fill the quarterfinals best-against-worst, a
/// 12-player field cutting to its top 8 seeds.
fn advance_from_group(next: &mut Bracket, finished: &Round) -> Result<(), BracketError> {
    let standings = compute_table(&finished.matches);
    let target = next
        .round_mut(finished.round_index + 1)
        .ok_or(BracketError::RoundNotFound(finished.round_index + 1))?;
    seeding::seed_from_standings(target, &standings);
    next.current_round = finished.round_index + 1;
    Ok(())
}

/// Iterative elimination: drop the lowest-ranked player and play another
/// round robin among the rest, handing off to the standard knockout tail
/// once exactly 4 remain. A round with 3 or fewer participants only happens
/// when the configured thresholds are wrong; the standings leader is then
/// declared champion directly.
fn advance_iterative(next: &mut Bracket, finished: &Round) -> Result<(), BracketError> {
    let standings = compute_table(&finished.matches);
    let remaining = finished.participants.len();
    let next_index = finished.round_index + 1;

    if remaining <= 3 {
        log::warn!(
            "elimination bracket finished a round with only {} players; declaring the standings leader champion",
            remaining
        );
        let mut ranking: Vec<PlayerRef> = standings.iter().map(|r| r.player.clone()).collect();
        for group in eliminated_groups(next).into_iter().rev() {
            ranking.extend(group);
        }
        finish_with_ranking(next, ranking);
        return Ok(());
    }

    if remaining == 4 {
        // Hand off to the knockout tail, seeded by this round's standings.
        let seeds: Vec<PlayerRef> = standings.iter().map(|r| r.player.clone()).collect();
        push_knockout_tail(next, next_index, seeds);
        next.current_round = next_index;
        return Ok(());
    }

    // Standings tail is the lowest-ranked player of this round; everyone
    // else plays another round robin (or the semifinals once 4 remain).
    let survivors: Vec<PlayerRef> = standings
        .iter()
        .take(remaining - 1)
        .map(|r| r.player.clone())
        .collect();

    if survivors.len() == 4 {
        push_knockout_tail(next, next_index, survivors);
    } else {
        let mut group = Round::new(
            next_index,
            format!("Round Robin {}", next_index + 1),
            RoundStage::RoundRobin,
        );
        group.matches = round_robin_matches(&survivors);
        group.participants = survivors;
        group.status = RoundStatus::Ongoing;
        next.rounds.push(group);
    }

    next.current_round = next_index;
    Ok(())
}

/// Append a seeded semifinal round and an unseeded final round (3rd-place
/// match plus Grand Final) for the four given seeds.
fn push_knockout_tail(next: &mut Bracket, next_index: u32, seeds: Vec<PlayerRef>) {
    let mut semis = Round::new(next_index, "Semifinals", RoundStage::KnockoutSemis);
    semis.matches = vec![MatchRecord::unseeded(), MatchRecord::unseeded()];
    let pairs = seeding::pair_by_seed(&seeds);
    seeding::assign_round(&mut semis, seeds, &pairs);
    next.rounds.push(semis);

    let mut finals = Round::new(next_index + 1, "Finals", RoundStage::KnockoutFinal);
    finals.matches = vec![
        MatchRecord::unseeded().named("3rd Place"),
        MatchRecord::unseeded().named("Grand Final"),
    ];
    next.rounds.push(finals);
}

/// The final round finished: crown the champion and build the final ranking.
fn complete_bracket(next: &mut Bracket, finals: &Round) -> Result<(), BracketError> {
    let third = finals
        .matches
        .first()
        .ok_or(BracketError::RoundNotFound(finals.round_index))?;
    let grand = finals
        .matches
        .get(1)
        .ok_or(BracketError::RoundNotFound(finals.round_index))?;

    // [Grand Final winner, Grand Final loser, 3rd-place winner, 3rd-place loser]
    let mut ranking: Vec<PlayerRef> = Vec::new();
    for m in [grand, third] {
        ranking.push(
            m.winning_player()
                .ok_or(BracketError::UndecidedMatch(m.match_id))?
                .clone(),
        );
        ranking.push(
            m.losing_player()
                .ok_or(BracketError::UndecidedMatch(m.match_id))?
                .clone(),
        );
    }

    // Eliminated players rank below the knockout placings, grouped by the
    // stage they went out at, earliest-eliminated last.
    for group in eliminated_groups(next).into_iter().rev() {
        ranking.extend(group);
    }

    finish_with_ranking(next, ranking);
    Ok(())
}

/// Players dropped between consecutive rounds, in chronological group order.
/// Within a round-robin group players keep that round's standings order;
/// within a knockout group, the seed (participants) order.
fn eliminated_groups(bracket: &Bracket) -> Vec<Vec<PlayerRef>> {
    let mut groups = Vec::new();
    for pair in bracket.rounds.windows(2) {
        let (round, following) = (&pair[0], &pair[1]);
        if following.participants.is_empty() {
            continue;
        }
        let surviving: HashSet<_> = following.participants.iter().map(|p| p.user_id).collect();
        let dropped: Vec<PlayerRef> = match round.stage {
            RoundStage::RoundRobin => compute_table(&round.matches)
                .into_iter()
                .map(|r| r.player)
                .filter(|p| !surviving.contains(&p.user_id))
                .collect(),
            _ => round
                .participants
                .iter()
                .filter(|p| !surviving.contains(&p.user_id))
                .cloned()
                .collect(),
        };
        if !dropped.is_empty() {
            groups.push(dropped);
        }
    }
    groups
}

/// Mark the bracket completed with the given ranking order, attaching each
/// player's aggregate stats over every bracket match.
fn finish_with_ranking(next: &mut Bracket, ranking: Vec<PlayerRef>) {
    let all: Vec<MatchRecord> = next.all_matches().cloned().collect();
    let totals = compute_table(&all);

    let stats: Vec<FinalStanding> = ranking
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let row = totals.iter().find(|r| r.player.user_id == p.user_id);
            FinalStanding {
                place: i as u32 + 1,
                user_id: p.user_id,
                name: p.name.clone(),
                wins: row.map_or(0, |r| r.wins),
                losses: row.map_or(0, |r| r.losses),
                pf: row.map_or(0, |r| r.pf),
                pa: row.map_or(0, |r| r.pa),
            }
        })
        .collect();

    next.champion = ranking.first().cloned();
    next.final_stats = Some(stats);
    next.stage = BracketStage::Completed;
}
