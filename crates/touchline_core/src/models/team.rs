use super::player::{Player, Role};
use crate::error::{Result, TouchlineError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outfield shape, goalkeeper excluded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Formation {
    pub name: String,
    pub role_counts: BTreeMap<Role, u32>,
}

impl Formation {
    pub fn new(name: impl Into<String>, role_counts: BTreeMap<Role, u32>) -> Result<Self> {
        let name = name.into();
        let outfield: u32 = role_counts.values().sum();
        if outfield != 10 {
            return Err(TouchlineError::InvalidFormation { name, outfield });
        }
        Ok(Self { name, role_counts })
    }

    /// 4-4-2 used when a roster omits its formation.
    pub fn four_four_two() -> Self {
        let role_counts = [
            (Role::RD, 1),
            (Role::CD, 2),
            (Role::LD, 1),
            (Role::RM, 1),
            (Role::CM, 2),
            (Role::LM, 1),
            (Role::RCF, 1),
            (Role::LCF, 1),
        ]
        .into_iter()
        .collect();
        Self { name: "4-4-2".to_string(), role_counts }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Team {
    pub id: u32,
    pub name: String,
    /// Full squad. The first eleven entries start the match.
    pub players: Vec<Player>,
    pub formation: Formation,
}

impl Team {
    pub const STARTERS: usize = 11;

    pub fn new(
        id: u32,
        name: impl Into<String>,
        players: Vec<Player>,
        formation: Formation,
    ) -> Result<Self> {
        if players.len() < Self::STARTERS {
            return Err(TouchlineError::InvalidTeamSize {
                expected: Self::STARTERS,
                found: players.len(),
            });
        }
        for p in &players {
            p.attributes.validate()?;
        }
        Ok(Self { id, name: name.into(), players, formation })
    }

    pub fn starters(&self) -> &[Player] {
        let n = self.players.len().min(Self::STARTERS);
        &self.players[..n]
    }

    pub fn players_by_role(&self, role: Role) -> Vec<&Player> {
        self.players.iter().filter(|p| p.role == role).collect()
    }

    /// Average suitability of the best available eleven for the formation.
    pub fn rating(&self) -> Result<f32> {
        let goalkeepers = self.players_by_role(Role::GK);
        let gk_rating = goalkeepers
            .iter()
            .map(|p| p.role_rating(Role::GK))
            .fold(None, |best: Option<f32>, r| Some(best.map_or(r, |b| b.max(r))))
            .ok_or_else(|| TouchlineError::RoleShortage {
                role: Role::GK.to_string(),
                formation: self.formation.name.clone(),
            })?;

        let mut total = 0.0;
        for (&role, &count) in &self.formation.role_counts {
            let mut ratings: Vec<f32> =
                self.players_by_role(role).iter().map(|p| p.role_rating(role)).collect();
            if ratings.len() < count as usize {
                return Err(TouchlineError::RoleShortage {
                    role: role.to_string(),
                    formation: self.formation.name.clone(),
                });
            }
            ratings.sort_by(|a, b| b.total_cmp(a));
            total += ratings.iter().take(count as usize).sum::<f32>();
        }
        total += gk_rating;
        Ok(total / Self::STARTERS as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::sample_team;

    #[test]
    fn test_formation_requires_ten_outfield_players() {
        let mut counts = Formation::four_four_two().role_counts;
        counts.insert(Role::CM, 3);
        let err = Formation::new("4-5-2", counts).unwrap_err();
        assert!(matches!(err, TouchlineError::InvalidFormation { outfield: 11, .. }));

        assert!(Formation::new("4-4-2", Formation::four_four_two().role_counts).is_ok());
    }

    #[test]
    fn test_team_requires_eleven_players() {
        let team = sample_team(1, "Short", 1, 60);
        let players = team.players[..10].to_vec();
        let err = Team::new(1, "Short", players, team.formation.clone()).unwrap_err();
        assert!(matches!(err, TouchlineError::InvalidTeamSize { expected: 11, found: 10 }));
    }

    #[test]
    fn test_team_rating_uniform_squad() {
        let team = sample_team(1, "Uniform", 1, 70);
        let rating = team.rating().unwrap();
        assert!((rating - 0.7).abs() < 1e-3);
    }

    #[test]
    fn test_team_rating_needs_goalkeeper() {
        let mut team = sample_team(1, "NoKeeper", 1, 70);
        team.players.retain(|p| p.role != Role::GK);
        assert!(matches!(team.rating(), Err(TouchlineError::RoleShortage { .. })));
    }
}
