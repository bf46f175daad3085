use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use serde_json::{Value, json};

use player_stats_widget::columns::{CellView, ColumnId, cell_view};
use player_stats_widget::config::WidgetConfig;
use player_stats_widget::protocol::{
    INIT_WIDGET, OutboundMessage, PlayerClick, UPDATE_TABLE, envelope,
};
use player_stats_widget::surface::{MemoryHost, MemorySurface};
use player_stats_widget::widget::{Phase, Widget};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn built_widget(payload: Value) -> Widget<MemorySurface, MemoryHost> {
    let mut w = Widget::new(
        WidgetConfig::default(),
        MemorySurface::new(),
        MemoryHost::new(),
        1200,
    );
    w.on_dom_ready(Instant::now());
    w.on_message(&envelope(INIT_WIDGET, payload));
    w
}

fn fixture_widget() -> Widget<MemorySurface, MemoryHost> {
    let payload: Value =
        serde_json::from_str(&read_fixture("init_two_teams.json")).expect("fixture should parse");
    built_widget(payload)
}

#[test]
fn fixture_renders_sorted_active_team() {
    let w = fixture_widget();
    assert_eq!(w.phase(), Phase::Built);
    assert_eq!(w.active_team(), Some("T1"));
    assert_eq!(w.teams().len(), 2);
    assert_eq!(
        w.surface().row_names(),
        vec!["Ana Silva", "Bruno Petit", "Éric Moreau", "eva Roux"]
    );
    assert_eq!(w.surface().spec().map(|s| s.index_field), Some("nom"));
}

#[test]
fn non_numeric_goals_render_as_zero() {
    let w = fixture_widget();
    let eric = &w.surface().rows()[2];
    assert_eq!(eric.goals, Some(json!("abc")));
    assert_eq!(cell_view(ColumnId::Goals, eric).plain_text(), "0");
    assert_eq!(
        cell_view(ColumnId::Goals, eric).to_html(),
        r#"<div class="stats-cell">0</div>"#
    );
}

#[test]
fn missing_photo_renders_initials_badge() {
    let w = built_widget(json!({
        "teams": [{"id": "T1", "name": "X"}],
        "playersByTeam": {"T1": [{"nom": "Alex Johnson", "but": 1}]}
    }));
    let row = &w.surface().rows()[0];
    match cell_view(ColumnId::Player, row) {
        CellView::Player(cell) => assert_eq!(cell.initials.as_deref(), Some("AL")),
        other => panic!("unexpected cell: {other:?}"),
    }
}

#[test]
fn update_for_active_team_replaces_rows_without_rebuild() {
    let mut w = fixture_widget();
    w.on_message(&envelope(
        UPDATE_TABLE,
        json!({"teamId": "T1", "players": [
            {"nom": "Late", "but": 1},
            {"nom": "Star", "but": 7}
        ]}),
    ));
    assert_eq!(w.surface().build_count(), 1);
    assert_eq!(w.surface().replace_count(), 1);
    assert_eq!(w.surface().row_names(), vec!["Star", "Late"]);
    // The store keeps the host's order; only the rendered copy is sorted.
    let stored: Vec<&str> = w
        .store()
        .get("T1")
        .expect("roster")
        .iter()
        .map(|p| p.sort_name())
        .collect();
    assert_eq!(stored, vec!["Late", "Star"]);
}

#[test]
fn update_for_inactive_team_only_touches_store() {
    let mut w = fixture_widget();
    let before = w.surface().rows().to_vec();
    w.on_message(&envelope(
        UPDATE_TABLE,
        json!({"teamId": "T2", "players": [{"nom": "New", "but": 2}]}),
    ));
    assert_eq!(w.surface().replace_count(), 0);
    assert_eq!(w.surface().rows(), before.as_slice());
    assert_eq!(
        w.store().get("T2").map(|p| p[0].sort_name().to_string()),
        Some("New".to_string())
    );

    w.on_message(&envelope(
        UPDATE_TABLE,
        json!({"teamId": "T3", "players": []}),
    ));
    assert_eq!(w.store().len(), 3);
    assert_eq!(w.active_team(), Some("T1"));
}

#[test]
fn malformed_updates_change_nothing() {
    let mut w = fixture_widget();
    let store_before = w.store().clone();
    let rows_before = w.surface().rows().to_vec();

    for payload in [
        json!({"players": []}),
        json!({"teamId": "", "players": []}),
        json!({"teamId": "T1", "players": {"nom": "x"}}),
        json!({"teamId": "T1"}),
        json!(null),
    ] {
        w.on_message(&envelope(UPDATE_TABLE, payload));
    }
    w.on_message(&json!({"type": "SELECT_TEAM", "payload": {"teamId": "T2"}}));
    w.on_message(&json!({"payload": {}}));
    w.on_message(&json!("hello"));

    assert_eq!(w.store(), &store_before);
    assert_eq!(w.surface().rows(), rows_before.as_slice());
    assert_eq!(w.surface().replace_count(), 0);
    assert_eq!(w.active_team(), Some("T1"));
    assert!(w.diagnostics().contains("dropped host message"));
    assert_eq!(w.diagnostics().warning_count(), 0);
}

#[test]
fn click_with_profile_url_posts_once() {
    let mut w = built_widget(json!({
        "teams": [{"id": "T1", "name": "X"}],
        "playersByTeam": {"T1": [{"nom": "Alex Johnson", "playerUrl": "http://x"}]}
    }));
    let row = w.surface().rows()[0].clone();
    assert!(w.on_cell_click(ColumnId::Player, &row));
    assert_eq!(
        w.host().sent,
        vec![OutboundMessage::PlayerClick(PlayerClick {
            team_id: "T1".to_string(),
            player_name: "Alex Johnson".to_string(),
            url: "http://x".to_string(),
        })]
    );

    assert!(!w.on_cell_click(ColumnId::Goals, &row));
    assert_eq!(w.host().sent.len(), 1);
}

#[test]
fn click_falls_back_to_alternate_link_and_skips_plain_rows() {
    let mut w = fixture_widget();
    assert!(w.click_player("Ana Silva"));
    assert!(!w.click_player("Éric Moreau"));
    assert!(!w.click_player("Nobody"));
    assert_eq!(w.host().sent.len(), 1);
    let OutboundMessage::PlayerClick(click) = &w.host().sent[0];
    assert_eq!(click.url, "http://x/ana");
    assert_eq!(click.team_id, "T1");
}

#[test]
fn click_before_build_is_ignored() {
    let mut w = Widget::new(
        WidgetConfig::default(),
        MemorySurface::new(),
        MemoryHost::new(),
        1200,
    );
    let row = player_stats_widget::model::PlayerRecord::from_value(&json!({
        "nom": "A", "playerUrl": "http://x"
    }));
    assert!(!w.on_cell_click(ColumnId::Player, &row));
    assert!(w.host().sent.is_empty());
}

#[test]
fn host_post_failure_is_non_fatal() {
    let payload: Value =
        serde_json::from_str(&read_fixture("init_two_teams.json")).expect("fixture should parse");
    let failing_host = MemoryHost {
        sent: Vec::new(),
        fail: true,
    };
    let mut w = Widget::new(WidgetConfig::default(), MemorySurface::new(), failing_host, 1200);
    w.on_dom_ready(Instant::now());
    w.on_message(&envelope(INIT_WIDGET, payload));

    assert!(!w.click_player("Bruno Petit"));
    assert!(w.diagnostics().contains("posting PLAYER_CLICK failed"));
    assert_eq!(w.phase(), Phase::Built);
    assert!(w.host().sent.is_empty());
}

#[test]
fn teams_are_derived_from_roster_keys() {
    let w = built_widget(json!({
        "playersByTeam": {"Blue": [{"nom": "A"}], "Red": [{"nom": "B"}]}
    }));
    assert_eq!(w.active_team(), Some("Blue"));
    assert_eq!(w.teams()[1].id, "Red");
    assert_eq!(w.teams()[1].name, "Red");
}

#[test]
fn bare_rosters_without_players_by_team_are_accepted() {
    let w = built_widget(json!({
        "Green": [{"nom": "G1", "but": 1}, {"nom": "G2", "but": 4}],
        "note": "ignored"
    }));
    assert_eq!(w.active_team(), Some("Green"));
    assert_eq!(w.surface().row_names(), vec!["G2", "G1"]);
    assert_eq!(w.store().len(), 1);
}

#[test]
fn later_init_refreshes_rows_but_keeps_table_and_team() {
    let mut w = fixture_widget();
    w.on_message(&envelope(
        INIT_WIDGET,
        json!({
            "teams": [{"id": "T2", "name": "Other"}, {"id": "T1", "name": "Les Lions"}],
            "playersByTeam": {"T1": [{"nom": "Only", "but": 1}], "T2": []}
        }),
    ));
    assert_eq!(w.surface().build_count(), 1);
    assert_eq!(w.active_team(), Some("T1"));
    assert_eq!(w.surface().row_names(), vec!["Only"]);
}

#[test]
fn bare_rosters_next_to_a_team_list_leave_teams_out_of_the_store() {
    let w = built_widget(json!({
        "teams": [{"id": "Green", "name": "Les Verts"}],
        "Green": [{"nom": "G1", "but": 2}]
    }));
    assert_eq!(w.store().len(), 1);
    assert!(w.store().get("teams").is_none());
    assert_eq!(w.teams()[0].name, "Les Verts");
    assert_eq!(w.surface().row_names(), vec!["G1"]);
}
