use serde_json::json;

use player_stats_widget::model::{InitPayload, PlayerRecord, RosterStore};
use player_stats_widget::sorter::{sort_players, sorted_rows};

fn store_from(payload: serde_json::Value) -> RosterStore {
    InitPayload::from_value(&payload).players_by_team
}

fn names(rows: &[PlayerRecord]) -> Vec<&str> {
    rows.iter().map(PlayerRecord::sort_name).collect()
}

#[test]
fn assists_break_goal_ties() {
    let store = store_from(json!({
        "teams": [{"id": "T1", "name": "X"}],
        "playersByTeam": {"T1": [
            {"nom": "B", "but": 1, "passes": 0},
            {"nom": "A", "but": 1, "passes": 2}
        ]}
    }));
    assert_eq!(names(&sorted_rows(&store, "T1")), vec!["A", "B"]);
}

#[test]
fn full_key_order_with_loose_values() {
    let store = store_from(json!({
        "playersByTeam": {"T1": [
            {"nom": "zed", "but": "2", "passes": 1},
            {"nom": "Ann", "but": 0},
            {"nom": "Bob", "but": 2, "passes": "1"},
            {"nom": "Carl", "but": "abc", "passes": null},
            {"nom": "Dee", "but": 5}
        ]}
    }));
    assert_eq!(
        names(&sorted_rows(&store, "T1")),
        vec!["Dee", "Bob", "zed", "Ann", "Carl"]
    );
}

#[test]
fn sorting_leaves_store_untouched() {
    let store = store_from(json!({
        "playersByTeam": {"T1": [
            {"nom": "Low", "but": 0, "extra": {"k": 1}},
            {"nom": "High", "but": 9}
        ]}
    }));
    let before = store.clone();
    let rows = sorted_rows(&store, "T1");
    assert_eq!(names(&rows), vec!["High", "Low"]);
    assert_eq!(store, before);
    assert_eq!(names(store.get("T1").expect("roster")), vec!["Low", "High"]);
    // Unknown fields travel with the copy.
    assert_eq!(rows[1].extra.get("extra"), Some(&json!({"k": 1})));
}

#[test]
fn resorting_is_idempotent() {
    let store = store_from(json!({
        "playersByTeam": {"T1": [
            {"nom": "c", "but": 1, "passes": 1},
            {"nom": "B", "but": 1, "passes": 1},
            {"nom": "a", "but": 1, "passes": 1},
            {"nom": "D", "but": 4}
        ]}
    }));
    let once = sorted_rows(&store, "T1");
    let mut twice = once.clone();
    sort_players(&mut twice);
    assert_eq!(once, twice);
    assert_eq!(names(&once), vec!["D", "a", "B", "c"]);
}

#[test]
fn unknown_team_yields_empty() {
    let store = RosterStore::new();
    assert!(sorted_rows(&store, "missing").is_empty());
}

#[test]
fn records_without_stats_are_kept() {
    let store = store_from(json!({"playersByTeam": {"T1": [{"nom": "Solo"}, 17, {"but": 1}]}}));
    let rows = sorted_rows(&store, "T1");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].goals(), 1.0);
    assert_eq!(rows[0].sort_name(), "");
}

#[test]
fn accented_names_sort_among_their_base_letters() {
    let store = store_from(json!({
        "playersByTeam": {"T1": [
            {"nom": "Zola", "but": 1, "passes": 1},
            {"nom": "Šimić", "but": 1, "passes": 1},
            {"nom": "Tadić", "but": 1, "passes": 1},
            {"nom": "Čech", "but": 1, "passes": 1},
            {"nom": "Łukasz", "but": 1, "passes": 1}
        ]}
    }));
    assert_eq!(
        names(&sorted_rows(&store, "T1")),
        vec!["Čech", "Łukasz", "Šimić", "Tadić", "Zola"]
    );
}

#[test]
fn unaccented_name_precedes_accented_regardless_of_case() {
    let store = store_from(json!({
        "playersByTeam": {"T1": [
            {"nom": "é", "but": 0},
            {"nom": "E", "but": 0},
            {"nom": "É", "but": 0},
            {"nom": "e", "but": 0}
        ]}
    }));
    assert_eq!(names(&sorted_rows(&store, "T1")), vec!["e", "E", "é", "É"]);
}

#[test]
fn radix_and_wrapped_goal_values_count() {
    let store = store_from(json!({
        "playersByTeam": {"T1": [
            {"nom": "Plain", "but": 3},
            {"nom": "Hex", "but": "0x1A"},
            {"nom": "Wrapped", "but": [4]}
        ]}
    }));
    let rows = sorted_rows(&store, "T1");
    assert_eq!(names(&rows), vec!["Hex", "Wrapped", "Plain"]);
    assert_eq!(rows[0].goals(), 26.0);
}
