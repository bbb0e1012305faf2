//! Match events and the sink interface.
//!
//! The engine always keeps an in-memory [`EventLog`]; an optional
//! [`EventSink`] additionally receives every event plus per-tick ball and
//! player snapshots.

use super::pitch::Side;
use super::vector::Vector2D;
use crate::models::Role;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Kickoff,
    Goal,
    Shot,
    Pass,
    Tackle,
    /// Goalkeeper save attempt
    SaveAttempt,
    Possession,
    GoalKick,
    ThrowIn,
    Corner,
    HalfTime,
    FullTime,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Kickoff => "kickoff",
            EventKind::Goal => "goal",
            EventKind::Shot => "shot",
            EventKind::Pass => "pass",
            EventKind::Tackle => "tackle",
            EventKind::SaveAttempt => "save_attempt",
            EventKind::Possession => "possession",
            EventKind::GoalKick => "goal_kick",
            EventKind::ThrowIn => "throw_in",
            EventKind::Corner => "corner",
            EventKind::HalfTime => "half_time",
            EventKind::FullTime => "full_time",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchEvent {
    /// Seconds from kickoff
    pub timestamp: f32,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    pub team_name: String,
    pub description: String,
}

impl fmt::Display for MatchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let minutes = (self.timestamp / 60.0) as u32;
        let seconds = (self.timestamp % 60.0) as u32;
        write!(f, "{:02}:{:02} [{}] {}", minutes, seconds, self.kind, self.description)
    }
}

/// Per-tick player snapshot handed to sinks.
#[derive(Debug, Clone, Copy)]
pub struct PlayerTrace<'a> {
    pub player_id: u32,
    pub team_name: &'a str,
    pub role: Role,
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub has_ball: bool,
    pub stamina: f32,
    pub target: Option<Vector2D>,
}

/// Receiver for events and state snapshots. Only `record_event` is required.
pub trait EventSink: Send {
    fn record_event(&mut self, event: &MatchEvent);

    fn ball_state(
        &mut self,
        _match_time: f32,
        _position: Vector2D,
        _velocity: Vector2D,
        _possession: Option<&str>,
    ) {
    }

    fn player_state(&mut self, _match_time: f32, _player: &PlayerTrace<'_>) {}

    /// Free-form diagnostic line (ball write traces, AI notes).
    fn note(&mut self, _match_time: f32, _kind: &str, _details: &str) {}

    /// Flush and release resources. Called once from `MatchEngine::stop`.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// In-memory, append-only event list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventLog {
    events: Vec<MatchEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: MatchEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchEvent> {
        self.events.iter()
    }

    pub fn last(&self) -> Option<&MatchEvent> {
        self.events.last()
    }

    pub fn of_kind(&self, kind: EventKind) -> impl Iterator<Item = &MatchEvent> {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.of_kind(kind).count()
    }

    pub fn as_slice(&self) -> &[MatchEvent] {
        &self.events
    }
}

impl EventSink for EventLog {
    fn record_event(&mut self, event: &MatchEvent) {
        self.push(event.clone());
    }
}
