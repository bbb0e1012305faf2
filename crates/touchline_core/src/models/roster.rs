//! Roster file loading.
//!
//! JSON layout: `{ "home": {...}, "away": {...} }`, each section holding
//! `id`, `name`, `players` and an optional `formation`. Missing attribute
//! ratings default to 50, a missing role falls back to the legacy
//! `position` key and then to CM.

use super::player::{Player, PlayerAttributes, Role};
use super::team::{Formation, Team};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RosterFile {
    home: TeamEntry,
    away: TeamEntry,
}

#[derive(Debug, Deserialize)]
struct TeamEntry {
    #[serde(default)]
    id: u32,
    name: Option<String>,
    #[serde(default)]
    players: Vec<PlayerEntry>,
    #[serde(default)]
    formation: Option<FormationEntry>,
}

#[derive(Debug, Deserialize)]
struct PlayerEntry {
    #[serde(default)]
    id: u32,
    name: Option<String>,
    #[serde(default = "default_age")]
    age: u8,
    role: Option<String>,
    position: Option<String>,
    #[serde(default)]
    attributes: PlayerAttributes,
}

#[derive(Debug, Deserialize)]
struct FormationEntry {
    name: Option<String>,
    roles: Option<BTreeMap<String, u32>>,
    positions: Option<BTreeMap<String, u32>>,
}

fn default_age() -> u8 {
    25
}

impl PlayerEntry {
    fn into_player(self) -> Result<Player> {
        let code = self.role.or(self.position).unwrap_or_else(|| "CM".to_string());
        let role: Role = code.parse()?;
        let name = self.name.unwrap_or_else(|| format!("player_{}", self.id));
        Player::new(self.id, name, self.age, role, self.attributes)
    }
}

impl TeamEntry {
    fn into_team(self, section: &str) -> Result<Team> {
        let players =
            self.players.into_iter().map(PlayerEntry::into_player).collect::<Result<Vec<_>>>()?;

        let formation = match self.formation {
            Some(entry) => {
                let name = entry.name.unwrap_or_else(|| "custom".to_string());
                match entry.roles.or(entry.positions) {
                    Some(raw) => {
                        let mut counts = BTreeMap::new();
                        for (code, count) in raw {
                            counts.insert(code.parse::<Role>()?, count);
                        }
                        Formation::new(name, counts)?
                    }
                    None => Formation::four_four_two(),
                }
            }
            None => Formation::four_four_two(),
        };

        let name = self.name.unwrap_or_else(|| format!("Team_{}", section));
        Team::new(self.id, name, players, formation)
    }
}

/// Parse a roster document into `(home, away)`.
pub fn teams_from_json_str(json: &str) -> Result<(Team, Team)> {
    let file: RosterFile = serde_json::from_str(json)?;
    let home = file.home.into_team("home")?;
    let away = file.away.into_team("away")?;
    Ok((home, away))
}

pub fn load_teams_from_json(path: impl AsRef<Path>) -> Result<(Team, Team)> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let teams = teams_from_json_str(&text)?;
    log::info!(
        "loaded roster {}: {} ({} players) vs {} ({} players)",
        path.as_ref().display(),
        teams.0.name,
        teams.0.players.len(),
        teams.1.name,
        teams.1.players.len()
    );
    Ok(teams)
}

#[derive(Serialize)]
struct RosterOut<'a> {
    home: &'a Team,
    away: &'a Team,
}

/// Write both teams in the same layout `load_teams_from_json` reads.
pub fn save_teams_to_json(path: impl AsRef<Path>, home: &Team, away: &Team) -> Result<()> {
    let json = teams_to_json_string(home, away)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn teams_to_json_string(home: &Team, away: &Team) -> Result<String> {
    // Formation serialises as role_counts; the reader accepts that under `roles`.
    let mut value = serde_json::to_value(RosterOut { home, away })?;
    for side in ["home", "away"] {
        if let Some(formation) = value.get_mut(side).and_then(|t| t.get_mut("formation")) {
            if let Some(obj) = formation.as_object_mut() {
                if let Some(counts) = obj.remove("role_counts") {
                    obj.insert("roles".to_string(), counts);
                }
            }
        }
    }
    Ok(serde_json::to_string_pretty(&value)?)
}
