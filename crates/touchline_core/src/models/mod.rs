//! Roster-side domain models: players, roles, formations and teams, plus
//! the JSON roster loader and the seeded random generator.

pub mod generator;
pub mod player;
pub mod roster;
pub mod team;

pub use generator::{formation_by_name, generate_player, generate_team};
pub use player::{ratio, Player, PlayerAttributes, Role};
pub use roster::{
    load_teams_from_json, save_teams_to_json, teams_from_json_str, teams_to_json_string,
};
pub use team::{Formation, Team};
