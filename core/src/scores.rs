use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure while loading or saving the persisted score file.
#[derive(Error, Debug)]
pub enum ScoreFileError {
    #[error("score file i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("malformed score file: {0}")]
    Malformed(&'static str),
}

/// One ranked entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: i32,
}

/// Ranked, size-bounded score list with a configurable ordering direction.
/// Entries stay sorted best-first at all times; ties keep insertion order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HighScoreTable {
    title: String,
    capacity: usize,
    best_is_highest: bool,
    entries: Vec<ScoreEntry>,
}

impl Default for HighScoreTable {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TITLE, Self::DEFAULT_CAPACITY, true)
    }
}

impl HighScoreTable {
    pub const DEFAULT_TITLE: &'static str = "High Scores";
    pub const DEFAULT_CAPACITY: usize = 10;

    pub fn new(title: impl Into<String>, capacity: usize, best_is_highest: bool) -> Self {
        Self {
            title: title.into(),
            capacity,
            best_is_highest,
            entries: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn best_is_highest(&self) -> bool {
        self.best_is_highest
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `rank`, 0 being the best stored score.
    pub fn entry(&self, rank: usize) -> Option<&ScoreEntry> {
        self.entries.get(rank)
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Best stored score, `None` on an empty table.
    pub fn best_score(&self) -> Option<i32> {
        self.entries.first().map(|entry| entry.score)
    }

    fn beats(&self, a: i32, b: i32) -> bool {
        if self.best_is_highest { a > b } else { a < b }
    }

    /// Whether `score` merits a slot: the table still has room, or the score
    /// strictly beats the worst stored entry.
    pub fn is_qualifying(&self, score: i32) -> bool {
        if self.capacity == 0 {
            return false;
        }
        match self.entries.get(self.capacity - 1) {
            Some(worst) => self.beats(score, worst.score),
            None => true,
        }
    }

    /// Adds a qualifying score, evicting the worst entry when at capacity.
    /// Returns whether the score made the list.
    pub fn insert(&mut self, name: impl Into<String>, score: i32) -> bool {
        if !self.is_qualifying(score) {
            return false;
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop();
        }
        self.entries.push(ScoreEntry {
            name: name.into(),
            score,
        });
        self.sort_entries();
        true
    }

    /// 0-based rank `score` would take if inserted, without mutating the
    /// table. An equal score ranks below the entries already stored. `None`
    /// when the score would miss the capacity cutoff.
    pub fn rank_if_inserted(&self, score: i32) -> Option<usize> {
        if !self.is_qualifying(score) {
            return None;
        }
        let rank = self
            .entries
            .iter()
            .take_while(|entry| !self.beats(score, entry.score))
            .count();
        (rank < self.capacity).then_some(rank)
    }

    /// Replaces the entry at `index` with a revised name and score, returning
    /// the slot's new rank. Used for the in-play provisional entry, which is
    /// revised as the score grows rather than re-inserted.
    pub fn update(&mut self, index: usize, name: impl Into<String>, score: i32) -> Option<usize> {
        if index >= self.entries.len() {
            return None;
        }
        self.entries.remove(index);
        let rank = self.rank_if_inserted(score);
        self.insert(name, score);
        rank
    }

    /// Changes the capacity. Shrinking evicts the lowest-ranked excess entries
    /// immediately.
    pub fn resize(&mut self, capacity: usize) {
        self.entries.truncate(capacity);
        self.capacity = capacity;
    }

    /// Shifts every stored score by `delta`, which may be negative. Relative
    /// order is unchanged.
    pub fn increment_all(&mut self, delta: i32) {
        for entry in &mut self.entries {
            entry.score = entry.score.saturating_add(delta);
        }
    }

    fn sort_entries(&mut self) {
        if self.best_is_highest {
            self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        } else {
            self.entries.sort_by(|a, b| a.score.cmp(&b.score));
        }
    }

    /// Writes the table in its line-oriented form: title, capacity, ordering
    /// flag, entry count, then (name, score) line pairs.
    pub fn to_writer(&self, mut out: impl Write) -> Result<(), ScoreFileError> {
        writeln!(out, "{}", self.title)?;
        writeln!(out, "{}", self.capacity)?;
        writeln!(out, "{}", if self.best_is_highest { 1 } else { 0 })?;
        writeln!(out, "{}", self.entries.len())?;
        for entry in &self.entries {
            writeln!(out, "{}", entry.name)?;
            writeln!(out, "{}", entry.score)?;
        }
        Ok(())
    }

    /// Reads a table previously written by [`to_writer`](Self::to_writer).
    /// Any missing or non-numeric field is malformed; callers fall back to an
    /// empty table instead of keeping a partial parse.
    pub fn from_reader(input: impl BufRead) -> Result<Self, ScoreFileError> {
        let mut lines = input.lines();
        let mut next_line = |missing: &'static str| -> Result<String, ScoreFileError> {
            match lines.next() {
                Some(line) => Ok(line?),
                None => Err(ScoreFileError::Malformed(missing)),
            }
        };

        let title = next_line("missing title")?;
        let capacity: usize = next_line("missing capacity")?
            .trim()
            .parse()
            .map_err(|_| ScoreFileError::Malformed("capacity is not a number"))?;
        let best_is_highest = match next_line("missing ordering flag")?.trim() {
            "1" => true,
            "0" => false,
            _ => return Err(ScoreFileError::Malformed("ordering flag is not 0 or 1")),
        };
        let count: usize = next_line("missing entry count")?
            .trim()
            .parse()
            .map_err(|_| ScoreFileError::Malformed("entry count is not a number"))?;

        let mut entries = Vec::new();
        for _ in 0..count {
            let name = next_line("missing entry name")?;
            let score: i32 = next_line("missing entry score")?
                .trim()
                .parse()
                .map_err(|_| ScoreFileError::Malformed("entry score is not a number"))?;
            entries.push(ScoreEntry { name, score });
        }

        let mut table = Self {
            title,
            capacity,
            best_is_highest,
            entries,
        };
        table.sort_entries();
        table.entries.truncate(table.capacity);
        Ok(table)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ScoreFileError> {
        let mut out = BufWriter::new(File::create(path)?);
        self.to_writer(&mut out)?;
        out.flush()?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScoreFileError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

impl fmt::Display for HighScoreTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, " ________________________________")?;
        writeln!(f, "| {:<30} |", self.title)?;
        writeln!(f, "|--------------------------------|")?;
        if self.entries.is_empty() {
            writeln!(f, "| {:<30} |", "no scores recorded")?;
        } else {
            for (rank, entry) in self.entries.iter().enumerate() {
                writeln!(f, "| {:>2}. {:<17} {:>8} |", rank + 1, entry.name, entry.score)?;
            }
        }
        write!(f, "|________________________________|")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn table_with(scores: &[(&str, i32)], capacity: usize, best_is_highest: bool) -> HighScoreTable {
        let mut table = HighScoreTable::new("Test", capacity, best_is_highest);
        for &(name, score) in scores {
            table.insert(name, score);
        }
        table
    }

    fn ranked_scores(table: &HighScoreTable) -> Vec<i32> {
        table.entries().iter().map(|entry| entry.score).collect()
    }

    #[test]
    fn keeps_the_best_three_and_rejects_the_rest() {
        let mut table = table_with(&[("a", 50), ("b", 30), ("c", 80)], 3, true);
        assert!(!table.insert("d", 10));
        assert_eq!(ranked_scores(&table), vec![80, 50, 30]);
    }

    #[test]
    fn equal_scores_keep_insertion_order() {
        let table = table_with(&[("first", 50), ("second", 50), ("third", 70)], 5, true);
        let names: Vec<&str> = table.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["third", "first", "second"]);
    }

    #[test]
    fn lowest_is_best_orders_ascending() {
        let table = table_with(&[("a", 50), ("b", 30), ("c", 80), ("d", 10)], 3, false);
        assert_eq!(ranked_scores(&table), vec![10, 30, 50]);
    }

    #[test]
    fn equal_score_does_not_qualify_when_full() {
        let table = table_with(&[("a", 50), ("b", 40), ("c", 30)], 3, true);
        assert!(!table.is_qualifying(30));
        assert!(table.is_qualifying(31));
    }

    #[test]
    fn zero_capacity_never_qualifies() {
        let mut table = HighScoreTable::new("Test", 0, true);
        assert!(!table.is_qualifying(100));
        assert!(!table.insert("a", 100));
        assert_eq!(table.rank_if_inserted(100), None);
    }

    #[test]
    fn rank_projection_counts_entries_at_least_as_good() {
        let table = table_with(&[("a", 80), ("b", 50), ("c", 30)], 3, true);
        assert_eq!(table.rank_if_inserted(90), Some(0));
        assert_eq!(table.rank_if_inserted(80), Some(1));
        assert_eq!(table.rank_if_inserted(40), Some(2));
        assert_eq!(table.rank_if_inserted(10), None);
        // projection never mutates
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn rank_projection_on_an_empty_table() {
        let table = HighScoreTable::new("Test", 3, true);
        assert_eq!(table.rank_if_inserted(1), Some(0));
    }

    #[test]
    fn update_revises_a_slot_in_place() {
        let mut table = table_with(&[("a", 80), ("b", 50), ("c", 30)], 3, true);
        assert_eq!(table.update(2, "c", 70), Some(1));
        assert_eq!(ranked_scores(&table), vec![80, 70, 50]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.update(9, "x", 1), None);
    }

    #[test]
    fn shrinking_evicts_the_lowest_ranked() {
        let mut table = table_with(&[("a", 80), ("b", 50), ("c", 30)], 5, true);
        table.resize(2);
        assert_eq!(table.capacity(), 2);
        assert_eq!(ranked_scores(&table), vec![80, 50]);
    }

    #[test]
    fn increment_shifts_every_score() {
        let mut table = table_with(&[("a", 80), ("b", 50)], 3, true);
        table.increment_all(-10);
        assert_eq!(ranked_scores(&table), vec![70, 40]);
    }

    #[test]
    fn best_score_tracks_the_top_slot() {
        let mut table = HighScoreTable::new("Test", 3, true);
        assert_eq!(table.best_score(), None);
        table.insert("a", 12);
        table.insert("b", 90);
        assert_eq!(table.best_score(), Some(90));
    }

    #[test]
    fn file_format_round_trips_exactly() {
        let table = table_with(&[("Ada Lovelace", 80), ("Grace Hopper", 50)], 5, true);
        let mut buffer = Vec::new();
        table.to_writer(&mut buffer).unwrap();

        let back = HighScoreTable::from_reader(Cursor::new(&buffer)).unwrap();
        assert_eq!(back, table);
        assert_eq!(back.title(), "Test");
        assert_eq!(back.capacity(), 5);
        assert!(back.best_is_highest());
    }

    #[test]
    fn written_format_is_line_oriented() {
        let table = table_with(&[("ada", 12)], 3, false);
        let mut buffer = Vec::new();
        table.to_writer(&mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "Test\n3\n0\n1\nada\n12\n");
    }

    #[test]
    fn truncated_files_are_malformed() {
        // claims two entries, holds one
        let input = "Title\n3\n1\n2\nada\n40\n";
        assert!(matches!(
            HighScoreTable::from_reader(Cursor::new(input)),
            Err(ScoreFileError::Malformed(_))
        ));
    }

    #[test]
    fn non_numeric_fields_are_malformed() {
        for input in ["", "Title\nlots\n1\n0\n", "Title\n3\nmaybe\n0\n", "Title\n3\n1\nsome\n"] {
            assert!(
                matches!(
                    HighScoreTable::from_reader(Cursor::new(input)),
                    Err(ScoreFileError::Malformed(_))
                ),
                "input {input:?}"
            );
        }
    }

    #[test]
    fn display_renders_the_table_box() {
        let table = table_with(&[("ada", 42)], 3, true);
        let rendered = table.to_string();
        assert!(rendered.contains("Test"));
        assert!(rendered.contains("ada"));
        assert!(rendered.contains("42"));

        let empty = HighScoreTable::default();
        assert!(empty.to_string().contains("no scores recorded"));
    }
}
