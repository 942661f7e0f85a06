// Chapter-navigation state machine.
//
// Every transition is total: boundaries (first/last page of the first/last
// chapter, dangling links, out-of-range pages) are silent no-ops that return
// `Transition::None`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::chapter::{Chapter, ReaderPosition};

/// Page entered when `previous_page` crosses into the previous chapter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackwardEntry {
    /// Every chapter load starts at page 0
    #[default]
    FirstPage,
    /// Stepping back lands on the last page of the previous chapter
    LastPage,
}

/// Result of a navigation command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    None,
    Page { chapter_id: String, page_index: u32 },
    Chapter { chapter_id: String, page_index: u32 },
}

impl Transition {
    pub fn is_none(&self) -> bool {
        matches!(self, Transition::None)
    }

    pub fn changed_chapter(&self) -> bool {
        matches!(self, Transition::Chapter { .. })
    }
}

/// The linked chapters of one manga
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChapterSequence {
    chapters: Vec<Chapter>,
    index: HashMap<String, usize>,
}

impl ChapterSequence {
    /// Build a sequence. When none of the chapters carries a link, they are
    /// ordered by chapter number and linked to their neighbours.
    pub fn new(mut chapters: Vec<Chapter>) -> Self {
        if chapters.len() > 1 && chapters.iter().all(|c| !c.is_linked()) {
            chapters.sort_by(|a, b| a.chapter_number.total_cmp(&b.chapter_number));
            let ids: Vec<String> = chapters.iter().map(|c| c.id.clone()).collect();
            for (i, chapter) in chapters.iter_mut().enumerate() {
                chapter.previous_chapter_id = i.checked_sub(1).map(|p| ids[p].clone());
                chapter.next_chapter_id = ids.get(i + 1).cloned();
            }
        }

        let index = chapters
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();

        Self { chapters, index }
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn get(&self, chapter_id: &str) -> Option<&Chapter> {
        self.position_of(chapter_id).map(|i| &self.chapters[i])
    }

    fn position_of(&self, chapter_id: &str) -> Option<usize> {
        self.index.get(chapter_id).copied()
    }
}

/// Reader position over a chapter sequence
#[derive(Debug, Clone, PartialEq)]
pub struct ReaderState {
    sequence: ChapterSequence,
    current: usize,
    page_index: u32,
    backward_entry: BackwardEntry,
}

impl ReaderState {
    /// Start at `chapter_id`, or at the first chapter when it is absent or
    /// unknown. `None` for an empty sequence.
    pub fn open(
        sequence: ChapterSequence,
        chapter_id: Option<&str>,
        backward_entry: BackwardEntry,
    ) -> Option<Self> {
        if sequence.is_empty() {
            return None;
        }
        let current = chapter_id
            .and_then(|id| sequence.position_of(id))
            .unwrap_or(0);

        Some(Self {
            sequence,
            current,
            page_index: 0,
            backward_entry,
        })
    }

    pub fn sequence(&self) -> &ChapterSequence {
        &self.sequence
    }

    pub fn current_chapter(&self) -> &Chapter {
        &self.sequence.chapters[self.current]
    }

    pub fn position(&self) -> ReaderPosition {
        ReaderPosition {
            chapter_id: self.current_chapter().id.clone(),
            page_index: self.page_index,
        }
    }

    pub fn total_pages(&self) -> u32 {
        self.current_chapter().page_count
    }

    pub fn has_next_page(&self) -> bool {
        self.page_index + 1 < self.total_pages()
    }

    pub fn has_previous_page(&self) -> bool {
        self.page_index > 0
    }

    pub fn has_next_chapter(&self) -> bool {
        self.linked(self.current_chapter().next_chapter_id.as_deref())
            .is_some()
    }

    pub fn has_previous_chapter(&self) -> bool {
        self.linked(self.current_chapter().previous_chapter_id.as_deref())
            .is_some()
    }

    pub fn next_page(&mut self) -> Transition {
        if self.has_next_page() {
            self.page_index += 1;
            return self.page_transition();
        }
        self.next_chapter()
    }

    pub fn previous_page(&mut self) -> Transition {
        if self.has_previous_page() {
            self.page_index -= 1;
            return self.page_transition();
        }
        match self.linked(self.current_chapter().previous_chapter_id.as_deref()) {
            Some(target) => {
                let page = match self.backward_entry {
                    BackwardEntry::FirstPage => 0,
                    BackwardEntry::LastPage => self.sequence.chapters[target].last_page(),
                };
                self.enter(target, page)
            }
            None => Transition::None,
        }
    }

    pub fn next_chapter(&mut self) -> Transition {
        match self.linked(self.current_chapter().next_chapter_id.as_deref()) {
            Some(target) => self.enter(target, 0),
            None => Transition::None,
        }
    }

    pub fn previous_chapter(&mut self) -> Transition {
        match self.linked(self.current_chapter().previous_chapter_id.as_deref()) {
            Some(target) => self.enter(target, 0),
            None => Transition::None,
        }
    }

    /// Out-of-range indices are ignored
    pub fn go_to_page(&mut self, index: u32) -> Transition {
        if index >= self.total_pages() || index == self.page_index {
            return Transition::None;
        }
        self.page_index = index;
        self.page_transition()
    }

    /// Jump to any chapter of the sequence, at its first page
    pub fn select_chapter(&mut self, chapter_id: &str) -> Transition {
        match self.sequence.position_of(chapter_id) {
            Some(target) => self.enter(target, 0),
            None => Transition::None,
        }
    }

    fn linked(&self, chapter_id: Option<&str>) -> Option<usize> {
        chapter_id.and_then(|id| self.sequence.position_of(id))
    }

    fn enter(&mut self, target: usize, page_index: u32) -> Transition {
        self.current = target;
        self.page_index = page_index;
        Transition::Chapter {
            chapter_id: self.current_chapter().id.clone(),
            page_index,
        }
    }

    fn page_transition(&self) -> Transition {
        Transition::Page {
            chapter_id: self.current_chapter().id.clone(),
            page_index: self.page_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A(3 pages) -> B(2 pages) -> C(4 pages)
    fn sequence() -> ChapterSequence {
        ChapterSequence::new(vec![
            Chapter::new("C", 3.0, 4),
            Chapter::new("A", 1.0, 3),
            Chapter::new("B", 2.0, 2),
        ])
    }

    fn reader(at: &str, entry: BackwardEntry) -> ReaderState {
        ReaderState::open(sequence(), Some(at), entry).unwrap()
    }

    #[test]
    fn test_unlinked_chapters_are_linked_by_number() {
        let seq = sequence();
        let ids: Vec<&str> = seq.chapters().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(seq.get("A").unwrap().previous_chapter_id, None);
        assert_eq!(seq.get("B").unwrap().next_chapter_id.as_deref(), Some("C"));
        assert_eq!(seq.get("C").unwrap().next_chapter_id, None);
    }

    #[test]
    fn test_explicit_links_are_kept() {
        let mut first = Chapter::new("x", 9.0, 1);
        first.next_chapter_id = Some("y".to_string());
        let mut second = Chapter::new("y", 1.0, 1);
        second.previous_chapter_id = Some("x".to_string());

        let seq = ChapterSequence::new(vec![first, second]);
        assert_eq!(seq.chapters()[0].id, "x");
        assert_eq!(seq.get("x").unwrap().next_chapter_id.as_deref(), Some("y"));
    }

    #[test]
    fn test_open_defaults_to_first_chapter() {
        let state = ReaderState::open(sequence(), None, BackwardEntry::FirstPage).unwrap();
        assert_eq!(state.position().chapter_id, "A");

        let state = ReaderState::open(sequence(), Some("nope"), BackwardEntry::FirstPage).unwrap();
        assert_eq!(state.position().chapter_id, "A");

        assert!(ReaderState::open(ChapterSequence::default(), None, BackwardEntry::FirstPage)
            .is_none());
    }

    #[test]
    fn test_next_page_walks_pages_then_chapters() {
        let mut state = reader("A", BackwardEntry::FirstPage);
        assert!(matches!(state.next_page(), Transition::Page { page_index: 1, .. }));
        assert!(matches!(state.next_page(), Transition::Page { page_index: 2, .. }));

        let t = state.next_page();
        assert!(t.changed_chapter());
        assert_eq!(
            state.position(),
            ReaderPosition {
                chapter_id: "B".to_string(),
                page_index: 0
            }
        );
    }

    #[test]
    fn test_next_page_on_last_page_of_last_chapter_is_noop() {
        let mut state = reader("C", BackwardEntry::FirstPage);
        state.go_to_page(3);
        let before = state.position();

        assert_eq!(state.next_page(), Transition::None);
        assert_eq!(state.position(), before);
        assert!(!state.has_next_page());
        assert!(!state.has_next_chapter());
    }

    #[test]
    fn test_previous_page_default_enters_first_page() {
        let mut state = reader("B", BackwardEntry::FirstPage);
        let t = state.previous_page();
        assert_eq!(
            t,
            Transition::Chapter {
                chapter_id: "A".to_string(),
                page_index: 0
            }
        );
    }

    #[test]
    fn test_previous_page_can_enter_last_page() {
        let mut state = reader("B", BackwardEntry::LastPage);
        state.previous_page();
        assert_eq!(state.position().chapter_id, "A");
        assert_eq!(state.position().page_index, 2);
    }

    #[test]
    fn test_previous_page_at_start_is_noop() {
        let mut state = reader("A", BackwardEntry::LastPage);
        assert!(state.previous_page().is_none());
        assert!(state.previous_chapter().is_none());
        assert_eq!(state.position().page_index, 0);
    }

    #[test]
    fn test_chapter_jumps_ignore_page_position() {
        let mut state = reader("B", BackwardEntry::LastPage);
        state.go_to_page(1);

        state.next_chapter();
        assert_eq!(state.position().chapter_id, "C");
        assert_eq!(state.position().page_index, 0);

        state.go_to_page(2);
        state.previous_chapter();
        assert_eq!(state.position().chapter_id, "B");
        assert_eq!(state.position().page_index, 0);
    }

    #[test]
    fn test_go_to_page_ignores_out_of_range() {
        let mut state = reader("A", BackwardEntry::FirstPage);
        assert!(state.go_to_page(3).is_none());
        assert_eq!(state.position().page_index, 0);
        assert!(!state.go_to_page(2).is_none());
        assert_eq!(state.position().page_index, 2);
    }

    #[test]
    fn test_select_chapter_resets_page() {
        let mut state = reader("A", BackwardEntry::FirstPage);
        state.go_to_page(2);
        assert!(state.select_chapter("C").changed_chapter());
        assert_eq!(state.position().page_index, 0);
        assert!(state.select_chapter("Z").is_none());
        assert_eq!(state.position().chapter_id, "C");
    }

    #[test]
    fn test_dangling_link_is_a_boundary() {
        let mut only = Chapter::new("solo", 1.0, 1);
        only.next_chapter_id = Some("missing".to_string());
        let mut state = ReaderState::open(
            ChapterSequence::new(vec![only]),
            None,
            BackwardEntry::FirstPage,
        )
        .unwrap();

        assert!(!state.has_next_chapter());
        assert!(state.next_page().is_none());
    }
}
