pub mod chapter;
pub mod navigation;

pub use chapter::{Chapter, ReaderPosition};
pub use navigation::{BackwardEntry, ChapterSequence, ReaderState, Transition};
