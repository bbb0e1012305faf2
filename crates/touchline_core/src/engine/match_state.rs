//! # Match State
//!
//! 경기 한 판의 aggregate root: 두 팀, 경기장, 공, 22명의 선수 상태, 이벤트 로그,
//! 시계와 스코어.
//!
//! ## 선수 순서
//! `players` 는 홈 선발 11명 다음 원정 선발 11명 순서로 고정된다.
//! 가능한 모든 반복(AI, possession)은 이 순서를 따른다; id → index 는
//! `FxHashMap` 으로 조회만 한다.
//!
//! ## 좌표
//! Formation slots are defined in away orientation (own goal at +x).
//! Home slots mirror x, so the home side starts in the negative half.

use super::ball::BallState;
use super::behaviors::RoleBehaviour;
use super::config::{EngineConfig, FormationConfig};
use super::events::EventLog;
use super::pitch::{Pitch, Side};
use super::player_state::PlayerMatchState;
use super::vector::Vector2D;
use crate::error::{Result, TouchlineError};
use crate::models::{Role, Team};
use fxhash::FxHashMap;
use std::sync::Arc;

/// Nominal slot for the `index`-th player of `role`, away orientation.
pub fn role_slot_offset(role: Role, index: usize, formation: &FormationConfig) -> Vector2D {
    let i = index as f32;
    let listed = |offsets: &[f32]| offsets.get(index).copied().unwrap_or(0.0);
    match role {
        Role::GK => Vector2D::new(formation.goalkeeper_x, 0.0),
        Role::RD => Vector2D::new(
            formation.fullback_x,
            -formation.fullback_base_offset - i * formation.fullback_stagger,
        ),
        Role::LD => Vector2D::new(
            formation.fullback_x,
            formation.fullback_base_offset + i * formation.fullback_stagger,
        ),
        Role::CD => Vector2D::new(formation.centreback_x, listed(&formation.centreback_offsets)),
        Role::RM => Vector2D::new(
            formation.wide_midfielder_x,
            -formation.wide_midfielder_base_offset - i * formation.wide_midfielder_stagger,
        ),
        Role::LM => Vector2D::new(
            formation.wide_midfielder_x,
            formation.wide_midfielder_base_offset + i * formation.wide_midfielder_stagger,
        ),
        Role::CM => Vector2D::new(
            formation.central_midfielder_x,
            listed(&formation.central_midfielder_offsets),
        ),
        Role::RCF => Vector2D::new(
            formation.centre_forward_x,
            -formation.wide_forward_base_offset - i * formation.wide_forward_stagger,
        ),
        Role::LCF => Vector2D::new(
            formation.centre_forward_x,
            formation.wide_forward_base_offset + i * formation.wide_forward_stagger,
        ),
        Role::CF => {
            Vector2D::new(formation.centre_forward_x, listed(&formation.centre_forward_offsets))
        }
    }
}

/// Build the starting eleven of one side at their formation slots.
fn line_up(team: &Team, side: Side, formation: &FormationConfig) -> Vec<PlayerMatchState> {
    let team_name: Arc<str> = Arc::from(team.name.as_str());
    let mirror = match side {
        Side::Home => -1.0,
        Side::Away => 1.0,
    };
    let mut role_counts: FxHashMap<Role, usize> = FxHashMap::default();
    team.starters()
        .iter()
        .map(|player| {
            let slot_index = role_counts.entry(player.role).or_insert(0);
            let base = role_slot_offset(player.role, *slot_index, formation);
            *slot_index += 1;
            let position = Vector2D::new(mirror * base.x, base.y);
            let behaviour = RoleBehaviour::from_role(player.role);
            PlayerMatchState::new(player, side, Arc::clone(&team_name), position, behaviour)
        })
        .collect()
}

fn check_team(team: &Team) -> Result<()> {
    if team.players.len() < Team::STARTERS {
        return Err(TouchlineError::InvalidTeamSize {
            expected: Team::STARTERS,
            found: team.players.len(),
        });
    }
    let outfield: u32 = team.formation.role_counts.values().sum();
    if outfield != 10 {
        return Err(TouchlineError::InvalidFormation {
            name: team.formation.name.clone(),
            outfield,
        });
    }
    for p in team.starters() {
        p.attributes.validate()?;
    }
    Ok(())
}

#[derive(Debug)]
pub struct MatchState {
    pub home_team: Team,
    pub away_team: Team,
    pub pitch: Pitch,
    pub ball: BallState,
    /// Home starters then away starters
    pub players: Vec<PlayerMatchState>,
    index: FxHashMap<u32, usize>,
    pub events: EventLog,
    pub match_time: f32,
    pub home_score: u32,
    pub away_score: u32,
    pub current_half: u8,
    pub halftime_triggered: bool,
    pub fulltime_recorded: bool,
    pub starting_kickoff_side: Side,
    pub current_kickoff_side: Side,
    pub team_in_possession: Option<Side>,
    pub last_possession_player_id: Option<u32>,
}

impl MatchState {
    /// Validate both teams and place the starters. Player ids must be unique
    /// across the two line-ups.
    pub fn new(home_team: Team, away_team: Team, cfg: &EngineConfig) -> Result<Self> {
        check_team(&home_team)?;
        check_team(&away_team)?;

        let mut players = line_up(&home_team, Side::Home, &cfg.formation);
        players.extend(line_up(&away_team, Side::Away, &cfg.formation));

        let mut index = FxHashMap::default();
        for (i, p) in players.iter().enumerate() {
            if index.insert(p.player_id, i).is_some() {
                return Err(TouchlineError::DuplicatePlayerId { id: p.player_id });
            }
        }

        Ok(Self {
            home_team,
            away_team,
            pitch: Pitch::new(&cfg.pitch),
            ball: BallState::new(Vector2D::ZERO, cfg.ball_physics),
            players,
            index,
            events: EventLog::new(),
            match_time: 0.0,
            home_score: 0,
            away_score: 0,
            current_half: 1,
            halftime_triggered: false,
            fulltime_recorded: false,
            starting_kickoff_side: Side::Home,
            current_kickoff_side: Side::Home,
            team_in_possession: None,
            last_possession_player_id: None,
        })
    }

    pub fn index_of(&self, player_id: u32) -> Option<usize> {
        self.index.get(&player_id).copied()
    }

    pub fn player(&self, player_id: u32) -> Option<&PlayerMatchState> {
        self.index_of(player_id).map(|i| &self.players[i])
    }

    pub fn player_mut(&mut self, player_id: u32) -> Option<&mut PlayerMatchState> {
        match self.index_of(player_id) {
            Some(i) => Some(&mut self.players[i]),
            None => None,
        }
    }

    /// Side of a player id; `None` for unknown or absent ids.
    pub fn side_of(&self, player_id: Option<u32>) -> Option<Side> {
        player_id.and_then(|id| self.player(id)).map(|p| p.side)
    }

    pub fn team(&self, side: Side) -> &Team {
        match side {
            Side::Home => &self.home_team,
            Side::Away => &self.away_team,
        }
    }

    /// Slot indices of one side, in line-up order.
    pub fn indices_of(&self, side: Side) -> Vec<usize> {
        self.players.iter().enumerate().filter(|(_, p)| p.side == side).map(|(i, _)| i).collect()
    }

    pub fn holder_index(&self) -> Option<usize> {
        self.players.iter().position(|p| p.state.has_ball)
    }

    pub fn holder(&self) -> Option<&PlayerMatchState> {
        self.holder_index().map(|i| &self.players[i])
    }

    pub fn holders_count(&self) -> usize {
        self.players.iter().filter(|p| p.state.has_ball).count()
    }

    pub fn clear_possession_flags(&mut self) {
        for p in &mut self.players {
            p.state.has_ball = false;
        }
    }

    /// Everyone back to their slot with a fresh physical state.
    pub fn reset_players(&mut self) {
        let time = self.match_time;
        for p in &mut self.players {
            p.reset_to_slot();
            p.match_time = time;
        }
    }

    pub fn score(&self) -> (u32, u32) {
        (self.home_score, self.away_score)
    }

    pub fn add_goal(&mut self, side: Side) {
        match side {
            Side::Home => self.home_score += 1,
            Side::Away => self.away_score += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::sample_team;

    fn state() -> MatchState {
        let home = sample_team(1, "Reds", 1, 60);
        let away = sample_team(2, "Blues", 100, 65);
        MatchState::new(home, away, &EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_slot_offsets_follow_role_side() {
        let f = FormationConfig::default();
        assert_eq!(role_slot_offset(Role::GK, 0, &f), Vector2D::new(45.0, 0.0));
        assert_eq!(role_slot_offset(Role::RD, 0, &f), Vector2D::new(35.0, -12.0));
        assert_eq!(role_slot_offset(Role::LD, 1, &f), Vector2D::new(35.0, 14.0));
        assert_eq!(role_slot_offset(Role::CD, 1, &f), Vector2D::new(35.0, 6.0));
        assert_eq!(role_slot_offset(Role::CD, 9, &f), Vector2D::new(35.0, 0.0));
        assert_eq!(role_slot_offset(Role::RM, 0, &f), Vector2D::new(20.0, -15.0));
        assert_eq!(role_slot_offset(Role::CM, 2, &f), Vector2D::new(18.0, 0.0));
        assert_eq!(role_slot_offset(Role::RCF, 0, &f), Vector2D::new(8.0, -10.0));
        assert_eq!(role_slot_offset(Role::CF, 1, &f), Vector2D::new(8.0, -6.0));
    }

    #[test]
    fn test_home_starts_in_negative_half() {
        let s = state();
        assert_eq!(s.players.len(), 22);
        for p in &s.players {
            match p.side {
                Side::Home => assert!(p.position().x < 0.0, "{} at {}", p, p.position()),
                Side::Away => assert!(p.position().x > 0.0, "{} at {}", p, p.position()),
            }
            assert_eq!(p.role_position, p.position());
            assert_eq!(p.behaviour.role(), p.role);
        }
        assert_eq!(s.players[0].side, Side::Home);
        assert_eq!(s.players[11].side, Side::Away);
    }

    #[test]
    fn test_lookup_by_id() {
        let s = state();
        assert_eq!(s.index_of(100), Some(11));
        assert_eq!(s.player(1).map(|p| p.role), Some(Role::GK));
        assert_eq!(s.side_of(Some(105)), Some(Side::Away));
        assert_eq!(s.side_of(Some(9999)), None);
        assert_eq!(s.side_of(None), None);
        assert_eq!(s.indices_of(Side::Away).len(), 11);
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let home = sample_team(1, "Reds", 1, 60);
        let away = sample_team(2, "Blues", 5, 60);
        let err = MatchState::new(home, away, &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, TouchlineError::DuplicatePlayerId { id: 5 }));
    }

    #[test]
    fn test_short_squad_is_rejected() {
        let mut home = sample_team(1, "Reds", 1, 60);
        home.players.truncate(9);
        let away = sample_team(2, "Blues", 100, 60);
        let err = MatchState::new(home, away, &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, TouchlineError::InvalidTeamSize { expected: 11, found: 9 }));
    }

    #[test]
    fn test_reset_players_returns_to_slots() {
        let mut s = state();
        s.match_time = 30.0;
        s.players[3].state.position = Vector2D::new(10.0, 10.0);
        s.players[3].state.has_ball = true;
        s.players[3].state.stamina = 40.0;
        s.reset_players();
        assert_eq!(s.players[3].position(), s.players[3].role_position);
        assert_eq!(s.holders_count(), 0);
        assert_eq!(s.players[3].state.stamina, 100.0);
        assert_eq!(s.players[3].match_time, 30.0);
    }
}
