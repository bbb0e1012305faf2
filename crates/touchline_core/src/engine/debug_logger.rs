//! # Match Debugger
//!
//! 경기 진행을 사람이 읽을 수 있는 텍스트 로그로 남긴다.
//!
//! ## 형식
//! `[HH:MM:SS] KIND: details` (KIND = BALL_STATE | PLAYER_STATE | MATCH_EVENT | ERROR)
//!
//! ## 사용법
//! ```rust,ignore
//! let debugger = MatchDebugger::create_in_dir("debug_logs")?;
//! engine.attach_sink(Box::new(debugger));
//! ```

use super::events::{EventSink, MatchEvent, PlayerTrace};
use super::vector::Vector2D;
use crate::error::Result;
use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Lines kept in memory for `recent_events`.
pub const RECENT_CAPACITY: usize = 200;

pub struct MatchDebugger<W: Write> {
    writer: Option<W>,
    line_number: u64,
    recent: VecDeque<(u64, String)>,
    write_failed: bool,
}

impl MatchDebugger<BufWriter<File>> {
    /// Open `match_debug_<YYYYmmdd_HHMMSS>.txt` inside `dir`, creating the directory.
    pub fn create_in_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = dir.join(format!("match_debug_{}.txt", stamp));
        let file = File::create(&path)?;
        log::info!("match debug log: {}", path.display());
        Ok(Self::new(BufWriter::new(file))?)
    }
}

impl<W: Write> MatchDebugger<W> {
    pub fn new(mut writer: W) -> io::Result<Self> {
        let started = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(writer, "=== Match Debug Session: {} ===\n", started)?;
        Ok(Self {
            writer: Some(writer),
            line_number: 1,
            recent: VecDeque::with_capacity(RECENT_CAPACITY),
            write_failed: false,
        })
    }

    pub fn log_ball_state(
        &mut self,
        match_time: f32,
        position: Vector2D,
        velocity: Vector2D,
        possession: Option<&str>,
    ) {
        let possession = possession.map(|p| format!(" | Possession: {}", p)).unwrap_or_default();
        self.write_line(
            "BALL_STATE",
            &format!(
                "Time: {:.1}s | Pos: ({:.1}, {:.1}) | Vel: ({:.1}, {:.1}){}",
                match_time, position.x, position.y, velocity.x, velocity.y, possession
            ),
        );
    }

    pub fn log_player_state(&mut self, match_time: f32, p: &PlayerTrace<'_>) {
        let target =
            p.target.map(|t| format!(" | Target: ({:.1}, {:.1})", t.x, t.y)).unwrap_or_default();
        self.write_line(
            "PLAYER_STATE",
            &format!(
                concat!(
                    "Time: {:.1}s | Player {} ({}) | Role: {} | Pos: ({:.1}, {:.1}) | ",
                    "Has Ball: {} | Stamina: {:.1} | Vel: ({:.2}, {:.2}) m/s | Speed: {:.2} m/s{}"
                ),
                match_time,
                p.player_id,
                p.team_name,
                p.role,
                p.position.x,
                p.position.y,
                p.has_ball,
                p.stamina,
                p.velocity.x,
                p.velocity.y,
                p.velocity.magnitude(),
                target
            ),
        );
    }

    pub fn log_match_event(&mut self, match_time: f32, kind: &str, description: &str) {
        self.write_line(
            "MATCH_EVENT",
            &format!("Time: {:.1}s | Event: {} | Details: {}", match_time, kind, description),
        );
    }

    pub fn log_error(&mut self, error_type: &str, description: &str) {
        self.write_line("ERROR", &format!("Type: {} | Details: {}", error_type, description));
    }

    /// Last `limit` lines, prefixed with their 5-digit line number.
    pub fn recent_events(&self, limit: usize) -> Vec<String> {
        let skip = self.recent.len().saturating_sub(limit);
        self.recent.iter().skip(skip).map(|(n, entry)| format!("{:05} {}", n, entry)).collect()
    }

    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }

    /// Flush and drop the writer. Later writes only update the recent buffer.
    pub fn close(&mut self) -> io::Result<()> {
        match self.writer.take() {
            Some(mut w) => w.flush(),
            None => Ok(()),
        }
    }

    /// Hand back the writer (flushed), e.g. to inspect an in-memory buffer.
    pub fn into_inner(mut self) -> Option<W> {
        if let Some(w) = self.writer.as_mut() {
            let _ = w.flush();
        }
        self.writer.take()
    }

    fn write_line(&mut self, kind: &str, details: &str) {
        let entry = format!("[{}] {}: {}", chrono::Local::now().format("%H:%M:%S"), kind, details);
        let line_no = self.line_number;
        self.line_number += 1;
        if self.recent.len() == RECENT_CAPACITY {
            self.recent.pop_front();
        }
        if let Some(w) = self.writer.as_mut() {
            if let Err(e) = writeln!(w, "{}", entry) {
                // never let the debug log interrupt a match
                if !self.write_failed {
                    log::warn!("match debugger write failed: {}", e);
                    self.write_failed = true;
                }
            }
        }
        self.recent.push_back((line_no, entry));
    }
}

impl<W: Write + Send> EventSink for MatchDebugger<W> {
    fn record_event(&mut self, event: &MatchEvent) {
        let description = format!("{} ({})", event.description, event.team_name);
        self.log_match_event(event.timestamp, event.kind.as_str(), &description);
    }

    fn ball_state(
        &mut self,
        match_time: f32,
        position: Vector2D,
        velocity: Vector2D,
        possession: Option<&str>,
    ) {
        self.log_ball_state(match_time, position, velocity, possession);
    }

    fn player_state(&mut self, match_time: f32, player: &PlayerTrace<'_>) {
        self.log_player_state(match_time, player);
    }

    fn note(&mut self, match_time: f32, kind: &str, details: &str) {
        self.log_match_event(match_time, kind, details);
    }

    fn close(&mut self) -> io::Result<()> {
        MatchDebugger::close(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::events::EventKind;
    use crate::engine::pitch::Side;
    use crate::models::Role;
    use tempfile::TempDir;

    #[test]
    fn test_lines_have_kind_prefix() {
        let mut dbg = MatchDebugger::new(Vec::new()).unwrap();
        dbg.log_ball_state(1.3, Vector2D::new(3.0, -4.0), Vector2D::ZERO, Some("home"));
        dbg.log_error("stale_target", "player 99 missing");
        let recent = dbg.recent_events(10);
        assert_eq!(recent.len(), 2);
        assert!(recent[0].starts_with("00001 ["));
        assert!(recent[0].contains("BALL_STATE: Time: 1.3s | Pos: (3.0, -4.0)"));
        assert!(recent[0].ends_with("| Possession: home"));
        assert!(recent[1].contains("ERROR: Type: stale_target"));

        let text = String::from_utf8(dbg.into_inner().unwrap()).unwrap();
        assert!(text.starts_with("=== Match Debug Session: "));
        assert_eq!(text.lines().filter(|l| l.starts_with('[')).count(), 2);
    }

    #[test]
    fn test_recent_buffer_is_bounded() {
        let mut dbg = MatchDebugger::new(io::sink()).unwrap();
        for i in 0..(RECENT_CAPACITY + 50) {
            dbg.log_match_event(i as f32, "pass", "x");
        }
        let all = dbg.recent_events(usize::MAX);
        assert_eq!(all.len(), RECENT_CAPACITY);
        assert!(all[0].starts_with("00051 "));
        assert_eq!(dbg.recent_events(3).len(), 3);
    }

    #[test]
    fn test_sink_writes_events_and_player_lines() {
        let mut dbg = MatchDebugger::new(Vec::new()).unwrap();
        let event = MatchEvent {
            timestamp: 12.0,
            kind: EventKind::ThrowIn,
            side: Some(Side::Away),
            team_name: "Blues".into(),
            description: "Throw-in".into(),
        };
        EventSink::record_event(&mut dbg, &event);
        let trace = PlayerTrace {
            player_id: 7,
            team_name: "Blues",
            role: Role::CM,
            position: Vector2D::new(1.0, 1.0),
            velocity: Vector2D::new(3.0, 4.0),
            has_ball: true,
            stamina: 88.0,
            target: Some(Vector2D::new(10.0, 0.0)),
        };
        EventSink::player_state(&mut dbg, 12.0, &trace);
        let recent = dbg.recent_events(2);
        assert!(recent[0]
            .contains("MATCH_EVENT: Time: 12.0s | Event: throw_in | Details: Throw-in (Blues)"));
        assert!(recent[1].contains("Player 7 (Blues) | Role: CM"));
        assert!(recent[1].contains("Speed: 5.00 m/s | Target: (10.0, 0.0)"));
    }

    #[test]
    fn test_file_log_closes_cleanly() {
        let dir = TempDir::new().unwrap();
        let mut dbg = MatchDebugger::create_in_dir(dir.path().join("logs")).unwrap();
        dbg.log_match_event(0.0, "kickoff", "home kicks off");
        EventSink::close(&mut dbg).unwrap();
        assert!(dbg.is_closed());
        dbg.log_match_event(1.0, "pass", "after close");

        let entries: Vec<_> = fs::read_dir(dir.path().join("logs")).unwrap().collect();
        assert_eq!(entries.len(), 1);
        let path = entries[0].as_ref().unwrap().path();
        let text = fs::read_to_string(path).unwrap();
        assert!(text.contains("home kicks off"));
        assert!(!text.contains("after close"));
    }
}
