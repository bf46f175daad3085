use std::cmp::Ordering;

use crate::format::locale_compare;
use crate::model::{PlayerRecord, RosterStore};

/// Display order for a team: goals desc, assists desc, then name.
pub fn sorted_rows(store: &RosterStore, team_id: &str) -> Vec<PlayerRecord> {
    let mut rows = store.get(team_id).map(<[_]>::to_vec).unwrap_or_default();
    sort_players(&mut rows);
    rows
}

pub fn sort_players(rows: &mut [PlayerRecord]) {
    rows.sort_by(compare_players);
}

pub fn compare_players(a: &PlayerRecord, b: &PlayerRecord) -> Ordering {
    b.goals()
        .partial_cmp(&a.goals())
        .unwrap_or(Ordering::Equal)
        .then_with(|| {
            b.assists()
                .partial_cmp(&a.assists())
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| locale_compare(a.sort_name(), b.sort_name()))
}
