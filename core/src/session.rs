use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::*;

/// Session lifecycle phase.
///
/// Valid transitions:
/// - AwaitingName -> AwaitingFirstClick, on a non-blank name
/// - AwaitingFirstClick -> Playing, on the first reveal (mines get placed)
/// - Playing <-> Paused
/// - Playing -> LevelComplete, on either win path below the last level
/// - Playing -> GameOver, on a mine hit or on clearing the last level
/// - LevelComplete -> AwaitingFirstClick, on resume
/// - anything -> AwaitingName, on restart
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    AwaitingName,
    AwaitingFirstClick,
    Playing,
    Paused,
    LevelComplete,
    GameOver,
}

impl SessionPhase {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver)
    }

    const fn accepts_board_actions(self) -> bool {
        matches!(self, Self::AwaitingFirstClick | Self::Playing)
    }
}

/// Pause-aware per-level stopwatch.
#[derive(Clone, Debug, Default)]
struct LevelClock {
    accrued: Duration,
    resumed_at: Option<Instant>,
}

impl LevelClock {
    fn start(&mut self) {
        self.resumed_at = Some(Instant::now());
    }

    fn pause(&mut self) {
        if let Some(resumed_at) = self.resumed_at.take() {
            self.accrued += resumed_at.elapsed();
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn elapsed(&self) -> Duration {
        self.accrued
            + self
                .resumed_at
                .map(|resumed_at| resumed_at.elapsed())
                .unwrap_or_default()
    }
}

/// Bonus for clearing a level under its time budget.
fn time_bonus(budget_secs: u32, elapsed_secs: f32) -> i32 {
    (2.0 * (budget_secs as f32 - elapsed_secs).max(0.0)) as i32
}

/// One play-through: level progression, scoring, timing, and the player's
/// provisional slot in the high-score table. Drives a [`Board`] per level and
/// persists the table on every qualifying score change.
#[derive(Debug)]
pub struct GameSession {
    phase: SessionPhase,
    level: u8,
    score: i32,
    won: bool,
    player_name: String,
    provisional_rank: Option<usize>,
    revealed_baseline: CellCount,
    board: Board,
    scores: HighScoreTable,
    score_path: Option<PathBuf>,
    generator: RandomMineGenerator,
    clock: LevelClock,
}

impl GameSession {
    /// Slots kept in the session score table.
    pub const SCORE_CAPACITY: usize = 20;

    pub fn new(seed: u64) -> Self {
        Self::with_table(
            HighScoreTable::new(HighScoreTable::DEFAULT_TITLE, Self::SCORE_CAPACITY, true),
            seed,
        )
    }

    pub fn with_table(scores: HighScoreTable, seed: u64) -> Self {
        let params = LevelParams::first();
        Self {
            phase: SessionPhase::AwaitingName,
            level: 1,
            score: 0,
            won: false,
            player_name: String::new(),
            provisional_rank: None,
            revealed_baseline: 0,
            board: Board::new(params.dim, params.mines),
            scores,
            score_path: None,
            generator: RandomMineGenerator::new(seed),
            clock: LevelClock::default(),
        }
    }

    /// Loads the score table from `path`. A missing or malformed file is a
    /// recovered condition: the session starts from a fresh default table and
    /// persists it immediately.
    pub fn with_score_file(path: impl Into<PathBuf>, seed: u64) -> Self {
        let path = path.into();
        let scores = match HighScoreTable::load(&path) {
            Ok(table) => table,
            Err(err) => {
                log::warn!(
                    "score file {} unusable ({err}), starting from an empty table",
                    path.display()
                );
                let table =
                    HighScoreTable::new(HighScoreTable::DEFAULT_TITLE, Self::SCORE_CAPACITY, true);
                if let Err(err) = table.save(&path) {
                    log::warn!("could not write fresh score file {}: {err}", path.display());
                }
                table
            }
        };
        let mut session = Self::with_table(scores, seed);
        session.score_path = Some(path);
        session
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    /// Whether a finished session ended on clearing the last level.
    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    /// Rank of the in-play score in the table, `None` while unranked.
    pub fn provisional_rank(&self) -> Option<usize> {
        self.provisional_rank
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn scores(&self) -> &HighScoreTable {
        &self.scores
    }

    /// Play time accrued on the current level; frozen while paused.
    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    pub fn elapsed_secs_f32(&self) -> f32 {
        self.clock.elapsed().as_secs_f32()
    }

    fn current_params(&self) -> LevelParams {
        LevelParams::for_level(self.level).unwrap_or(LevelParams::first())
    }

    /// Accepts the player's name, trimmed. Blank names are rejected.
    pub fn on_name_entered(&mut self, name: &str) -> Result<()> {
        if self.phase != SessionPhase::AwaitingName {
            return Err(GameError::WrongPhase);
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::BlankName);
        }
        self.player_name = name.to_owned();
        self.phase = SessionPhase::AwaitingFirstClick;
        Ok(())
    }

    /// Reveals a cell. The first reveal of a level places the mines (never on
    /// the clicked cell) and starts the clock.
    pub fn on_reveal(&mut self, pos: Coord2) -> Result<RevealOutcome> {
        if !self.phase.accepts_board_actions() {
            return Err(GameError::WrongPhase);
        }
        if !self.board.is_generated() {
            self.board.generate(&mut self.generator, pos)?;
            self.clock.start();
            self.phase = SessionPhase::Playing;
            log::debug!("level {} field generated, first click at {pos:?}", self.level);
        }

        let outcome = self.board.reveal(pos)?;
        if outcome.is_mine_hit() {
            self.end_in_loss(pos);
            return Ok(outcome);
        }

        let newly_revealed = self.board.count_revealed() - self.revealed_baseline;
        if newly_revealed > 0 {
            self.revealed_baseline = self.board.count_revealed();
            self.score += self.current_params().points_per_reveal * newly_revealed as i32;
            self.refresh_rank();
        }
        self.check_level_cleared();
        Ok(outcome)
    }

    /// Toggles a flag. Flagging the last unflagged mine completes the level.
    pub fn on_flag(&mut self, pos: Coord2) -> Result<FlagOutcome> {
        if !self.phase.accepts_board_actions() {
            return Err(GameError::WrongPhase);
        }
        let outcome = self.board.toggle_flag(pos)?;
        self.check_level_cleared();
        Ok(outcome)
    }

    pub fn on_pause(&mut self) -> Result<()> {
        if self.phase != SessionPhase::Playing {
            return Err(GameError::WrongPhase);
        }
        self.clock.pause();
        self.phase = SessionPhase::Paused;
        Ok(())
    }

    /// Resumes a paused level, or leaves the level-complete screen for the
    /// next level's first click.
    pub fn on_resume(&mut self) -> Result<()> {
        match self.phase {
            SessionPhase::Paused => {
                self.clock.start();
                self.phase = SessionPhase::Playing;
                Ok(())
            }
            SessionPhase::LevelComplete => {
                self.phase = SessionPhase::AwaitingFirstClick;
                Ok(())
            }
            _ => Err(GameError::WrongPhase),
        }
    }

    /// Back to a fresh session at level 1. The score table keeps any entry
    /// already earned; the provisional slot simply stops being revised.
    pub fn on_restart(&mut self) {
        let params = LevelParams::first();
        self.phase = SessionPhase::AwaitingName;
        self.level = 1;
        self.score = 0;
        self.won = false;
        self.player_name.clear();
        self.provisional_rank = None;
        self.revealed_baseline = 0;
        self.board = Board::new(params.dim, params.mines);
        self.clock.reset();
        log::info!("session restarted");
    }

    /// Wipes the stored scores and persists the empty table. A non-zero
    /// in-play score immediately re-enters the fresh table.
    pub fn on_reset_scores(&mut self) {
        self.scores.clear();
        self.provisional_rank = None;
        self.persist_scores();
        if self.score != 0 {
            self.refresh_rank();
        }
    }

    fn check_level_cleared(&mut self) {
        if self.phase != SessionPhase::Playing || !self.board.is_cleared() {
            return;
        }
        self.clock.pause();

        if self.level < MAX_LEVEL {
            let params = self.current_params();
            let bonus = time_bonus(params.bonus_budget_secs, self.elapsed_secs_f32());
            if bonus > 0 {
                self.score += bonus;
                self.refresh_rank();
            }
            self.level += 1;
            let next = self.current_params();
            self.board = Board::new(next.dim, next.mines);
            self.revealed_baseline = 0;
            self.clock.reset();
            self.phase = SessionPhase::LevelComplete;
            log::info!("level cleared, advancing to level {}", self.level);
        } else {
            self.won = true;
            self.phase = SessionPhase::GameOver;
            log::info!("final level cleared, session won with score {}", self.score);
        }
    }

    fn end_in_loss(&mut self, pos: Coord2) {
        self.clock.pause();
        self.board.reveal_all_mines();
        self.won = false;
        self.phase = SessionPhase::GameOver;
        log::info!("mine hit at {pos:?}, game over with score {}", self.score);
    }

    /// Enters or revises the player's slot in the table after a score change.
    fn refresh_rank(&mut self) {
        match self.provisional_rank {
            None => {
                if let Some(rank) = self.scores.rank_if_inserted(self.score) {
                    self.scores.insert(self.player_name.clone(), self.score);
                    self.provisional_rank = Some(rank);
                    self.persist_scores();
                }
            }
            Some(rank) => {
                self.provisional_rank =
                    self.scores.update(rank, self.player_name.clone(), self.score);
                self.persist_scores();
            }
        }
    }

    fn persist_scores(&self) {
        if let Some(path) = &self.score_path {
            if let Err(err) = self.scores.save(path) {
                log::warn!("could not persist scores to {}: {err}", path.display());
            }
        }
    }
}
