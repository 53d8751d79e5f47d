use serde::{Deserialize, Serialize};

/// Subjects a study session can be filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Physics,
    Chemistry,
    Maths,
}

impl Subject {
    /// Parse subject from a user-supplied name like "physics" or "Maths"
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "physics" | "phy" => Some(Self::Physics),
            "chemistry" | "chem" => Some(Self::Chemistry),
            "maths" | "math" | "mathematics" => Some(Self::Maths),
            _ => None,
        }
    }

    /// Storage key, matches the serde representation
    pub fn key(&self) -> &'static str {
        match self {
            Self::Physics => "physics",
            Self::Chemistry => "chemistry",
            Self::Maths => "maths",
        }
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Physics => "Physics",
            Self::Chemistry => "Chemistry",
            Self::Maths => "Maths",
        }
    }

    /// Get all subjects as a list
    pub fn all() -> &'static [Subject] {
        &[Subject::Physics, Subject::Chemistry, Subject::Maths]
    }

    /// Next subject in display order, wrapping around
    pub fn next(&self) -> Self {
        match self {
            Self::Physics => Self::Chemistry,
            Self::Chemistry => Self::Maths,
            Self::Maths => Self::Physics,
        }
    }
}

/// Lifecycle status of the study timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
}

impl TimerStatus {
    /// Status tag like "RUNNING"
    pub fn to_tag(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Running => "RUNNING",
            Self::Paused => "PAUSED",
        }
    }

    /// Whether a run is in progress (running or paused)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }
}

/// What a study session was linked to when it was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Chapter,
    Custom,
    Task,
}

impl SessionKind {
    /// Short tag for list displays
    pub fn to_tag(&self) -> &'static str {
        match self {
            Self::Chapter => "CHAPTER",
            Self::Custom => "CUSTOM",
            Self::Task => "TASK",
        }
    }
}

/// UI mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    Normal,
    EditingTitle,   // Custom title for the next run
    EditingSession, // Editing a recorded session
    ConfirmDiscard,
}
