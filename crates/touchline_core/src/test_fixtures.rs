//! Shared builders for unit tests.

use crate::models::{Formation, Player, PlayerAttributes, Role, Team};

/// 4-4-2 starting order: GK, back four, midfield four, two forwards.
pub const LINE_UP_442: [Role; 11] = [
    Role::GK,
    Role::RD,
    Role::CD,
    Role::CD,
    Role::LD,
    Role::RM,
    Role::CM,
    Role::CM,
    Role::LM,
    Role::RCF,
    Role::LCF,
];

pub fn sample_player(id: u32, role: Role, rating: u8) -> Player {
    Player {
        id,
        name: format!("Player {}", id),
        age: 25,
        role,
        attributes: PlayerAttributes::uniform(rating),
    }
}

/// Eleven players with consecutive ids starting at `first_id`, all attributes `rating`.
pub fn sample_team(id: u32, name: &str, first_id: u32, rating: u8) -> Team {
    let players = LINE_UP_442
        .iter()
        .enumerate()
        .map(|(i, &role)| sample_player(first_id + i as u32, role, rating))
        .collect();
    Team { id, name: name.to_string(), players, formation: Formation::four_four_two() }
}
