use std::fs;
use std::path::Path;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use rand::Rng;
use serde_json::Value;

use crate::format::to_num;
use crate::model::InitPayload;
use crate::protocol::{INIT_WIDGET, OutboundMessage, UPDATE_TABLE, envelope};
use crate::surface::HostChannel;

/// Loads an INIT payload from disk. Accepts either the bare payload or a full
/// `{ type, payload }` envelope.
pub fn load_init_file(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading INIT payload {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("parsing INIT payload {}", path.display()))?;
    Ok(match value.get("payload") {
        Some(payload) if value.get("type").is_some() => payload.clone(),
        _ => value,
    })
}

/// Spawns the host thread. With `init == None` the host stays silent, leaving the
/// widget to its own fallback data.
pub fn spawn_demo_host(
    tx: Sender<Value>,
    init: Option<Value>,
    update_every: Duration,
    stop_rx: Receiver<()>,
) {
    thread::spawn(move || {
        let Some(init) = init else {
            return;
        };
        if tx.send(envelope(INIT_WIDGET, init.clone())).is_err() {
            return;
        }

        let decoded = InitPayload::from_value(&init);
        let Some(team_id) = decoded.effective_teams().first().map(|t| t.id.clone()) else {
            return;
        };
        let mut players: Vec<Value> = init
            .get("playersByTeam")
            .and_then(|by_team| by_team.get(&team_id))
            .or_else(|| init.get(&team_id))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        if players.is_empty() {
            return;
        }

        let mut rng = rand::thread_rng();
        let mut last_update = Instant::now();
        loop {
            thread::sleep(Duration::from_millis(200));
            if stop_rx.try_recv().is_ok() {
                return;
            }
            if last_update.elapsed() < update_every {
                continue;
            }
            last_update = Instant::now();

            let idx = rng.gen_range(0..players.len());
            let field = match rng.gen_range(0..10) {
                0..=4 => "but",
                5..=7 => "passes",
                8 => "jaune",
                _ => "rouge",
            };
            bump_stat(&mut players[idx], field);

            let payload = serde_json::json!({ "teamId": team_id, "players": players });
            if tx.send(envelope(UPDATE_TABLE, payload)).is_err() {
                return;
            }
        }
    });
}

fn bump_stat(player: &mut Value, field: &str) {
    let Some(obj) = player.as_object_mut() else {
        return;
    };
    let next = to_num(obj.get(field)) + 1.0;
    obj.insert(field.to_string(), Value::from(next as i64));
}

#[derive(Debug, Clone)]
pub struct ChannelHost {
    tx: Sender<OutboundMessage>,
}

impl ChannelHost {
    pub fn new(tx: Sender<OutboundMessage>) -> Self {
        Self { tx }
    }
}

impl HostChannel for ChannelHost {
    fn post_to_parent(&mut self, msg: &OutboundMessage) -> Result<()> {
        self.tx
            .send(msg.clone())
            .context("parent frame is gone")?;
        Ok(())
    }
}
