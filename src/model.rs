use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value, json};

use crate::format::to_num;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
}

impl Team {
    pub fn from_value(value: &Value) -> Option<Team> {
        let id = loose_string(value.get("id")?)?;
        if id.is_empty() {
            return None;
        }
        let name = value
            .get("name")
            .and_then(loose_string)
            .unwrap_or_else(|| id.clone());
        Some(Team { id, name })
    }
}

/// Stats keep the raw wire value; coercion happens only when sorting or displaying.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    #[serde(
        rename = "nom",
        default,
        deserialize_with = "de_loose_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(
        rename = "numero",
        default,
        deserialize_with = "de_loose_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub jersey_number: Option<String>,
    #[serde(rename = "but", default, skip_serializing_if = "Option::is_none")]
    pub goals: Option<Value>,
    #[serde(rename = "passes", default, skip_serializing_if = "Option::is_none")]
    pub assists: Option<Value>,
    #[serde(rename = "jaune", default, skip_serializing_if = "Option::is_none")]
    pub yellow_cards: Option<Value>,
    #[serde(rename = "rouge", default, skip_serializing_if = "Option::is_none")]
    pub red_cards: Option<Value>,
    #[serde(
        rename = "photo",
        default,
        deserialize_with = "de_loose_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub photo_url: Option<String>,
    #[serde(
        rename = "playerUrl",
        default,
        deserialize_with = "de_loose_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub profile_url: Option<String>,
    #[serde(
        rename = "dPLink",
        default,
        deserialize_with = "de_loose_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub alt_profile_url: Option<String>,
    #[serde(
        rename = "commentaires",
        default,
        deserialize_with = "de_loose_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub comments: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_loose_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlayerRecord {
    /// Never fails: non-object entries decode to an empty record.
    pub fn from_value(value: &Value) -> PlayerRecord {
        if !value.is_object() {
            return PlayerRecord::default();
        }
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    pub fn goals(&self) -> f64 {
        to_num(self.goals.as_ref())
    }

    pub fn assists(&self) -> f64 {
        to_num(self.assists.as_ref())
    }

    pub fn yellow_cards(&self) -> f64 {
        to_num(self.yellow_cards.as_ref())
    }

    pub fn red_cards(&self) -> f64 {
        to_num(self.red_cards.as_ref())
    }

    pub fn sort_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn photo(&self) -> Option<&str> {
        non_empty(self.photo_url.as_deref())
    }

    pub fn jersey(&self) -> Option<&str> {
        non_empty(self.jersey_number.as_deref())
    }

    pub fn link(&self) -> Option<&str> {
        non_empty(self.profile_url.as_deref()).or_else(|| non_empty(self.alt_profile_url.as_deref()))
    }

    pub fn click_name(&self) -> String {
        non_empty(self.name.as_deref())
            .or_else(|| non_empty(self.title.as_deref()))
            .unwrap_or("")
            .to_string()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

fn loose_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn de_loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(loose_string(&value))
}

/// Team id → roster. Keeps first-insertion order of team ids so teams derived from the
/// store come out in the order the host listed them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterStore {
    order: Vec<String>,
    rosters: HashMap<String, Vec<PlayerRecord>>,
}

impl RosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, team_id: &str, players: Vec<PlayerRecord>) {
        if !self.rosters.contains_key(team_id) {
            self.order.push(team_id.to_string());
        }
        self.rosters.insert(team_id.to_string(), players);
    }

    pub fn get(&self, team_id: &str) -> Option<&[PlayerRecord]> {
        self.rosters.get(team_id).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.rosters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rosters.len()
    }

    pub fn team_ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn derived_teams(&self) -> Vec<Team> {
        self.team_ids()
            .map(|id| Team {
                id: id.to_string(),
                name: id.to_string(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitPayload {
    pub teams: Vec<Team>,
    pub players_by_team: RosterStore,
}

impl InitPayload {
    /// Without a `playersByTeam` object, every top-level list other than `teams` is read
    /// as a roster keyed by its field name.
    pub fn from_value(payload: &Value) -> InitPayload {
        let Some(obj) = payload.as_object() else {
            return InitPayload::default();
        };

        let teams = obj
            .get("teams")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Team::from_value).collect())
            .unwrap_or_default();

        let mut players_by_team = RosterStore::new();
        match obj.get("playersByTeam").and_then(Value::as_object) {
            Some(rosters) => {
                for (team_id, players) in rosters {
                    players_by_team.replace(team_id, decode_players(players).unwrap_or_default());
                }
            }
            None => {
                for (key, value) in obj {
                    if key == "teams" || key == "playersByTeam" {
                        continue;
                    }
                    if let Some(players) = decode_players(value) {
                        players_by_team.replace(key, players);
                    }
                }
            }
        }

        InitPayload {
            teams,
            players_by_team,
        }
    }

    pub fn effective_teams(&self) -> Vec<Team> {
        if self.teams.is_empty() {
            self.players_by_team.derived_teams()
        } else {
            self.teams.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePayload {
    pub team_id: String,
    pub players: Vec<PlayerRecord>,
}

impl UpdatePayload {
    pub fn from_value(payload: &Value) -> Option<UpdatePayload> {
        let team_id = payload.get("teamId").and_then(loose_string)?;
        if team_id.is_empty() {
            return None;
        }
        let players = decode_players(payload.get("players")?)?;
        Some(UpdatePayload { team_id, players })
    }
}

pub fn decode_players(value: &Value) -> Option<Vec<PlayerRecord>> {
    value
        .as_array()
        .map(|items| items.iter().map(PlayerRecord::from_value).collect())
}

pub const SAMPLE_TEAM_ID: &str = "Terrain1Eq1";
pub const SAMPLE_TEAM_NAME: &str = "CHAKS";

pub fn sample_payload() -> Value {
    json!({
        "teams": [{ "id": SAMPLE_TEAM_ID, "name": SAMPLE_TEAM_NAME }],
        "playersByTeam": {
            SAMPLE_TEAM_ID: [
                { "nom": "Alex Johnson", "numero": "9",  "but": 12, "passes": 3,  "jaune": 0, "rouge": 1, "photo": "", "playerUrl": "#" },
                { "nom": "John Doe",     "numero": "10", "but": 8,  "passes": 5,  "jaune": 1, "rouge": 0, "photo": "", "playerUrl": "#" },
                { "nom": "Mike Smith",   "numero": "7",  "but": 6,  "passes": 8,  "jaune": 2, "rouge": 0, "photo": "", "playerUrl": "#" },
                { "nom": "Chris Wilson", "numero": "4",  "but": 2,  "passes": 12, "jaune": 3, "rouge": 0, "photo": "", "playerUrl": "#" },
                { "nom": "David Brown",  "numero": "1",  "but": 0,  "passes": 1,  "jaune": 1, "rouge": 0, "photo": "", "playerUrl": "#" }
            ]
        }
    })
}
