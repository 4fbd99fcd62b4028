//! Knockout seeding: fill the player slots of the next round from standings
//! or from the previous round's winners and losers.

use crate::logic::standings::StandingsRow;
use crate::models::{BracketError, PlayerRef, Round, RoundStatus};

/// Pair seeds best-against-worst: (1,k), (2,k-1), ... `seeds.len()` must be
/// even; callers pass 4 or 8.
pub fn pair_by_seed(seeds: &[PlayerRef]) -> Vec<(PlayerRef, PlayerRef)> {
    let k = seeds.len();
    (0..k / 2)
        .map(|i| (seeds[i].clone(), seeds[k - 1 - i].clone()))
        .collect()
}

/// Semifinal pairing from four advancers listed in quarterfinal match order:
/// first against last, the middle two against each other.
pub fn pair_advancers(advancers: &[PlayerRef]) -> Vec<(PlayerRef, PlayerRef)> {
    debug_assert_eq!(advancers.len(), 4);
    vec![
        (advancers[0].clone(), advancers[3].clone()),
        (advancers[1].clone(), advancers[2].clone()),
    ]
}

/// Fill a pre-built knockout round: assign `pairs` into its unseeded matches
/// in order, set its participants, and mark it ongoing.
pub fn assign_round(round: &mut Round, participants: Vec<PlayerRef>, pairs: &[(PlayerRef, PlayerRef)]) {
    debug_assert_eq!(round.matches.len(), pairs.len());
    for (m, (p1, p2)) in round.matches.iter_mut().zip(pairs) {
        m.seed(p1.clone(), p2.clone());
    }
    round.participants = participants;
    round.status = RoundStatus::Ongoing;
}

/// Seed a knockout round from standings order: the top `2 * matches` seeds
/// fill the round with the (1,k)(2,k-1)... pairing. Standings order is the
/// canonical seed order, so the result is deterministic.
pub fn seed_from_standings(round: &mut Round, standings: &[StandingsRow]) {
    let take = round.matches.len() * 2;
    let seeds: Vec<PlayerRef> = standings.iter().take(take).map(|r| r.player.clone()).collect();
    let pairs = pair_by_seed(&seeds);
    assign_round(round, seeds, &pairs);
}

/// Seed the semifinals from a finished quarterfinal round.
///
/// Four matches: the four winners advance in match order. Three matches
/// (6-player bracket): the three winners advance, plus the eliminated loser
/// with the best original round-robin seed — earliest position in the
/// quarterfinal participants list — as the fourth semifinalist.
pub fn seed_semis_from_quarters(semis: &mut Round, quarters: &Round) -> Result<(), BracketError> {
    let mut advancers: Vec<PlayerRef> = Vec::with_capacity(4);
    for m in &quarters.matches {
        let w = m
            .winning_player()
            .ok_or(BracketError::UndecidedMatch(m.match_id))?;
        advancers.push(w.clone());
    }

    if quarters.matches.len() == 3 {
        let mut losers: Vec<PlayerRef> = Vec::with_capacity(3);
        for m in &quarters.matches {
            let l = m
                .losing_player()
                .ok_or(BracketError::UndecidedMatch(m.match_id))?;
            losers.push(l.clone());
        }
        let bye = losers
            .into_iter()
            .min_by_key(|l| {
                quarters
                    .participants
                    .iter()
                    .position(|p| p.user_id == l.user_id)
                    .unwrap_or(usize::MAX)
            })
            .ok_or(BracketError::RoundNotFound(quarters.round_index))?;
        advancers.push(bye);
    }

    let pairs = pair_advancers(&advancers);
    assign_round(semis, advancers, &pairs);
    Ok(())
}

/// Seed the final round from a finished semifinal round: match 0 is the
/// 3rd-place match between the two losers, match 1 the Grand Final between
/// the two winners.
pub fn seed_final_from_semis(final_round: &mut Round, semis: &Round) -> Result<(), BracketError> {
    let mut winners: Vec<PlayerRef> = Vec::with_capacity(2);
    let mut losers: Vec<PlayerRef> = Vec::with_capacity(2);
    for m in &semis.matches {
        winners.push(
            m.winning_player()
                .ok_or(BracketError::UndecidedMatch(m.match_id))?
                .clone(),
        );
        losers.push(
            m.losing_player()
                .ok_or(BracketError::UndecidedMatch(m.match_id))?
                .clone(),
        );
    }
    let pairs = vec![
        (losers[0].clone(), losers[1].clone()),
        (winners[0].clone(), winners[1].clone()),
    ];
    assign_round(final_round, semis.participants.clone(), &pairs);
    Ok(())
}
