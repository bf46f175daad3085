use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::{Value, json};
use std::hint::black_box;

use player_stats_widget::model::InitPayload;
use player_stats_widget::protocol::{HostMessage, INIT_WIDGET, envelope};
use player_stats_widget::sorter::sorted_rows;

fn roster_payload(teams: usize, players: usize) -> Value {
    let team_list: Vec<Value> = (0..teams)
        .map(|t| json!({"id": format!("T{t}"), "name": format!("Team {t}")}))
        .collect();
    let mut by_team = serde_json::Map::new();
    for t in 0..teams {
        let roster: Vec<Value> = (0..players)
            .map(|p| {
                json!({
                    "nom": format!("Player {p}"),
                    "numero": (p % 99).to_string(),
                    "but": (p * 7) % 13,
                    "passes": if p % 5 == 0 { json!("n/a") } else { json!((p * 3) % 11) },
                    "jaune": p % 3,
                    "rouge": p % 7 / 6,
                    "playerUrl": format!("https://example.test/p/{p}")
                })
            })
            .collect();
        by_team.insert(format!("T{t}"), Value::Array(roster));
    }
    json!({"teams": team_list, "playersByTeam": by_team})
}

fn bench_decode_init(c: &mut Criterion) {
    let msg = envelope(INIT_WIDGET, roster_payload(4, 40));
    c.bench_function("decode_init_4x40", |b| {
        b.iter(|| {
            let decoded = HostMessage::decode(black_box(&msg)).unwrap();
            black_box(decoded);
        })
    });
}

fn bench_sorted_rows(c: &mut Criterion) {
    let payload = InitPayload::from_value(&roster_payload(1, 200));
    let store = payload.players_by_team;
    c.bench_function("sorted_rows_200", |b| {
        b.iter(|| {
            let rows = sorted_rows(black_box(&store), "T0");
            black_box(rows.len());
        })
    });
}

criterion_group!(benches, bench_decode_init, bench_sorted_rows);
criterion_main!(benches);
