pub mod enums;
pub mod selection;
pub mod session;

pub use enums::{SessionKind, Subject, TimerStatus, UiMode};
pub use selection::SubjectSelection;
pub use session::{SessionEdit, StudySession};
