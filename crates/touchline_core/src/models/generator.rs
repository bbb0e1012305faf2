//! Seeded random squad generation.
//!
//! ## Usage
//! ```rust
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use touchline_core::models::generator::generate_team;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(7);
//! let team = generate_team(&mut rng, 1, None, "4-3-3", 1).unwrap();
//! assert_eq!(team.players.len(), 18);
//! ```

use super::player::{Player, PlayerAttributes, Role};
use super::team::{Formation, Team};
use crate::error::{Result, TouchlineError};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

const FIRST_NAMES: [&str; 8] =
    ["John", "James", "David", "Michael", "Robert", "Carlos", "Juan", "Luis"];
const LAST_NAMES: [&str; 7] =
    ["Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Rodriguez"];
const CITIES: [&str; 5] = ["London", "Madrid", "Paris", "Milan", "Munich"];
const SUFFIXES: [&str; 5] = ["FC", "United", "City", "Athletic", "Sporting"];

const SUBSTITUTES: usize = 7;

/// Attributes that receive the boosted range for each role.
fn important_attributes(role: Role) -> &'static [&'static str] {
    match role {
        Role::GK => &["positioning", "decisions", "strength"],
        Role::RD | Role::LD => &["tackling", "speed", "stamina", "passing"],
        Role::CD => &["tackling", "heading", "strength", "positioning"],
        Role::RM | Role::LM => &["dribbling", "speed", "passing", "vision"],
        Role::CM => &["passing", "vision", "decisions", "stamina"],
        Role::CF => &["shooting", "positioning", "strength", "dribbling"],
        Role::RCF | Role::LCF => &["shooting", "dribbling", "speed", "vision"],
    }
}

/// Outfield role counts for the supported formation names.
pub fn formation_by_name(name: &str) -> Result<Formation> {
    let counts: &[(Role, u32)] = match name {
        "4-4-2" => &[
            (Role::RD, 1),
            (Role::CD, 2),
            (Role::LD, 1),
            (Role::RM, 1),
            (Role::CM, 2),
            (Role::LM, 1),
            (Role::RCF, 1),
            (Role::LCF, 1),
        ],
        "4-3-3" => &[
            (Role::RD, 1),
            (Role::CD, 2),
            (Role::LD, 1),
            (Role::RM, 1),
            (Role::CM, 1),
            (Role::LM, 1),
            (Role::RCF, 1),
            (Role::CF, 1),
            (Role::LCF, 1),
        ],
        "3-5-2" => &[
            (Role::RD, 1),
            (Role::CD, 1),
            (Role::LD, 1),
            (Role::RM, 1),
            (Role::CM, 3),
            (Role::LM, 1),
            (Role::RCF, 1),
            (Role::LCF, 1),
        ],
        other => return Err(TouchlineError::UnsupportedFormation(other.to_string())),
    };
    let role_counts: BTreeMap<Role, u32> = counts.iter().copied().collect();
    Formation::new(name, role_counts)
}

pub fn generate_player<R: Rng + ?Sized>(
    rng: &mut R,
    id: u32,
    name: Option<String>,
    role: Option<Role>,
) -> Player {
    let name = name.unwrap_or_else(|| {
        let first = FIRST_NAMES.choose(rng).copied().unwrap_or("John");
        let last = LAST_NAMES.choose(rng).copied().unwrap_or("Smith");
        format!("{} {}", first, last)
    });
    let role = role.unwrap_or_else(|| Role::ALL.choose(rng).copied().unwrap_or(Role::CM));
    let important = important_attributes(role);
    let mut roll = |attr: &str| -> u8 {
        if important.contains(&attr) {
            rng.gen_range(60..=90)
        } else {
            rng.gen_range(40..=80)
        }
    };

    let attributes = PlayerAttributes {
        passing: roll("passing"),
        shooting: roll("shooting"),
        dribbling: roll("dribbling"),
        tackling: roll("tackling"),
        heading: roll("heading"),
        speed: roll("speed"),
        stamina: roll("stamina"),
        strength: roll("strength"),
        vision: roll("vision"),
        positioning: roll("positioning"),
        decisions: roll("decisions"),
    };
    let age = rng.gen_range(18..=35);

    Player { id, name, age, role, attributes }
}

/// Goalkeeper, the formation's ten outfield starters, then seven substitutes.
pub fn generate_team<R: Rng + ?Sized>(
    rng: &mut R,
    id: u32,
    name: Option<String>,
    formation_name: &str,
    starting_player_id: u32,
) -> Result<Team> {
    let formation = formation_by_name(formation_name)?;
    let name = name.unwrap_or_else(|| {
        let city = CITIES.choose(rng).copied().unwrap_or("London");
        let suffix = SUFFIXES.choose(rng).copied().unwrap_or("FC");
        format!("{} {}", city, suffix)
    });

    let mut players = Vec::with_capacity(Team::STARTERS + SUBSTITUTES);
    let mut next_id = starting_player_id;
    players.push(generate_player(rng, next_id, None, Some(Role::GK)));
    next_id += 1;

    for (&role, &count) in &formation.role_counts {
        for _ in 0..count {
            players.push(generate_player(rng, next_id, None, Some(role)));
            next_id += 1;
        }
    }
    for _ in 0..SUBSTITUTES {
        players.push(generate_player(rng, next_id, None, None));
        next_id += 1;
    }

    Team::new(id, name, players, formation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_generated_team_shape() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let team = generate_team(&mut rng, 3, None, "3-5-2", 100).unwrap();
        assert_eq!(team.players.len(), 18);
        assert_eq!(team.players[0].role, Role::GK);
        assert_eq!(team.players[0].id, 100);
        assert_eq!(team.players[17].id, 117);
        let cms = team.starters().iter().filter(|p| p.role == Role::CM).count();
        assert_eq!(cms, 3);
        for p in &team.players {
            assert!(p.attributes.validate().is_ok());
            assert!((18..=35).contains(&p.age));
        }
    }

    #[test]
    fn test_important_attributes_are_boosted() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for i in 0..50 {
            let p = generate_player(&mut rng, i, None, Some(Role::CF));
            assert!(p.attributes.shooting >= 60);
            assert!(p.attributes.positioning >= 60);
            assert!(p.attributes.tackling <= 80);
        }
    }

    #[test]
    fn test_same_seed_same_team() {
        let a = generate_team(&mut ChaCha8Rng::seed_from_u64(9), 1, None, "4-4-2", 1).unwrap();
        let b = generate_team(&mut ChaCha8Rng::seed_from_u64(9), 1, None, "4-4-2", 1).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unsupported_formation() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = generate_team(&mut rng, 1, None, "5-4-1", 1).unwrap_err();
        assert!(matches!(err, TouchlineError::UnsupportedFormation(ref f) if f == "5-4-1"));
    }
}
