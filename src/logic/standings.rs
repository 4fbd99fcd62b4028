//! Standings: reduce a set of matches into a ranked per-player table.

use crate::models::{MatchRecord, PlayerRef};

/// One row of a standings table.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StandingsRow {
    pub player: PlayerRef,
    pub wins: u32,
    pub losses: u32,
    pub pf: u32,
    pub pa: u32,
}

/// Compute the standings table for a cohort of matches.
///
/// One row per distinct player seen in a seeded slot. `pf`/`pa` accumulate
/// over every match (including unfinished ones, so partial standings can be
/// queried mid-round); `wins`/`losses` count only matches with a non-null
/// winner. Rows are sorted by wins descending, ties broken by `pf`
/// descending; the sort is stable, so equal rows keep first-encounter order.
/// This ordering is the canonical seeding order.
pub fn compute_table(matches: &[MatchRecord]) -> Vec<StandingsRow> {
    let mut rows: Vec<StandingsRow> = Vec::new();

    let row_mut = |rows: &mut Vec<StandingsRow>, p: &PlayerRef| -> usize {
        if let Some(i) = rows.iter().position(|r| r.player.user_id == p.user_id) {
            return i;
        }
        rows.push(StandingsRow {
            player: p.clone(),
            wins: 0,
            losses: 0,
            pf: 0,
            pa: 0,
        });
        rows.len() - 1
    };

    for m in matches {
        let (p1, p2) = match (&m.player1, &m.player2) {
            (Some(p1), Some(p2)) => (p1, p2),
            _ => continue, // unseeded knockout slot, nothing to count
        };
        let i1 = row_mut(&mut rows, p1);
        rows[i1].pf += m.score_player1;
        rows[i1].pa += m.score_player2;
        let i2 = row_mut(&mut rows, p2);
        rows[i2].pf += m.score_player2;
        rows[i2].pa += m.score_player1;

        if let Some(winner) = m.winner {
            let (wi, li) = if winner == p1.user_id { (i1, i2) } else { (i2, i1) };
            rows[wi].wins += 1;
            rows[li].losses += 1;
        }
    }

    rows.sort_by(|a, b| b.wins.cmp(&a.wins).then(b.pf.cmp(&a.pf)));
    rows
}
