use chrono::NaiveDate;

use crate::models::ScheduleEntry;

/// In-memory schedule grid keyed by cycle, week and group. The view is
/// a local prototype; nothing here talks to the backend.
#[derive(Default)]
pub struct ScheduleBoard {
    entries: Vec<ScheduleEntry>,
}

impl ScheduleBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn entry(&self, cycle: u32, week: u32, group: &str) -> Option<&ScheduleEntry> {
        self.entries
            .iter()
            .find(|e| e.cycle == cycle && e.week == week && e.group == group)
    }

    /// Inserts or overwrites the cell at (cycle, week, group).
    pub fn upsert(&mut self, entry: ScheduleEntry) {
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|e| e.cycle == entry.cycle && e.week == entry.week && e.group == entry.group)
        {
            *existing = entry;
        } else {
            self.entries.push(entry);
        }
    }

    pub fn set_date(&mut self, cycle: u32, week: u32, group: &str, date: NaiveDate) -> bool {
        match self.entry_mut(cycle, week, group) {
            Some(e) => {
                e.date = Some(date);
                true
            }
            None => false,
        }
    }

    pub fn add_comment(&mut self, cycle: u32, week: u32, group: &str, comment: &str) -> bool {
        match self.entry_mut(cycle, week, group) {
            Some(e) => {
                e.comments.push(comment.to_string());
                true
            }
            None => false,
        }
    }

    /// Points a cell at the problemset backing that lecture.
    pub fn link_problemset(
        &mut self,
        cycle: u32,
        week: u32,
        group: &str,
        problemset_id: i64,
    ) -> bool {
        match self.entry_mut(cycle, week, group) {
            Some(e) => {
                e.problemset_id = Some(problemset_id);
                true
            }
            None => false,
        }
    }

    /// All cells of one cycle, ordered by week then group.
    pub fn cycle(&self, cycle: u32) -> Vec<&ScheduleEntry> {
        let mut out: Vec<&ScheduleEntry> =
            self.entries.iter().filter(|e| e.cycle == cycle).collect();
        out.sort_by(|a, b| a.week.cmp(&b.week).then_with(|| a.group.cmp(&b.group)));
        out
    }

    fn entry_mut(&mut self, cycle: u32, week: u32, group: &str) -> Option<&mut ScheduleEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.cycle == cycle && e.week == week && e.group == group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(cycle: u32, week: u32, group: &str, topic: &str) -> ScheduleEntry {
        ScheduleEntry {
            cycle,
            week,
            group: group.to_string(),
            topic: topic.to_string(),
            date: None,
            lecturer: None,
            comments: Vec::new(),
            problemset_id: None,
        }
    }

    #[test]
    fn test_upsert_overwrites_same_cell() {
        let mut board = ScheduleBoard::new();
        board.upsert(entry(1, 1, "Napredna", "Limesi"));
        board.upsert(entry(1, 1, "Napredna", "Derivacije"));

        assert_eq!(board.entries().len(), 1);
        assert_eq!(board.entry(1, 1, "Napredna").map(|e| e.topic.as_str()), Some("Derivacije"));
    }

    #[test]
    fn test_comments_accumulate() {
        let mut board = ScheduleBoard::new();
        board.upsert(entry(1, 2, "Početna", "Nizovi"));
        assert!(board.add_comment(1, 2, "Početna", "ponijeti kalkulator"));
        assert!(board.add_comment(1, 2, "Početna", "dvorana B"));
        assert!(!board.add_comment(1, 3, "Početna", "nema ćelije"));

        let e = board.entry(1, 2, "Početna").expect("entry");
        assert_eq!(e.comments.len(), 2);
    }

    #[test]
    fn test_cycle_ordering() {
        let mut board = ScheduleBoard::new();
        board.upsert(entry(1, 2, "B", "t3"));
        board.upsert(entry(1, 1, "B", "t2"));
        board.upsert(entry(1, 1, "A", "t1"));
        board.upsert(entry(2, 1, "A", "drugi ciklus"));

        let cells: Vec<&str> = board.cycle(1).iter().map(|e| e.topic.as_str()).collect();
        assert_eq!(cells, vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn test_link_problemset() {
        let mut board = ScheduleBoard::new();
        board.upsert(entry(1, 1, "A", "Limesi"));
        assert!(board.link_problemset(1, 1, "A", 42));
        assert_eq!(
            board.entry(1, 1, "A").and_then(|e| e.problemset_id),
            Some(42)
        );
    }
}
