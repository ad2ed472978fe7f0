use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub assignment_id: i64,
    #[serde(default)]
    pub is_graded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Class,
    Webinar,
    WeeklyTest,
    #[serde(other)]
    Other,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Class => "class",
            EventType::Webinar => "webinar",
            EventType::WeeklyTest => "weekly_test",
            EventType::Other => "other",
        }
    }

    /// Lenient parse used for database and CSV rows; unknown values become `Other`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "class" => EventType::Class,
            "webinar" => EventType::Webinar,
            "weekly_test" => EventType::WeeklyTest,
            _ => EventType::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_datetime: DateTime<Utc>,
    pub event_type: EventType,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Graded,
    Submitted,
    Overdue,
    DueSoon,
    Pending,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Graded => "graded",
            AssignmentStatus::Submitted => "submitted",
            AssignmentStatus::Overdue => "overdue",
            AssignmentStatus::DueSoon => "due_soon",
            AssignmentStatus::Pending => "pending",
        }
    }
}

/// One row of the student's todo list, derived on every aggregation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeadlineItem {
    Assignment {
        id: String,
        title: String,
        date: DateTime<Utc>,
        description: String,
        assignment_id: i64,
        status: AssignmentStatus,
        icon_class: String,
    },
    Event {
        id: String,
        title: String,
        date: DateTime<Utc>,
        description: String,
        event_id: i64,
        event_type: EventType,
        is_online: bool,
        location: Option<String>,
    },
}

impl DeadlineItem {
    pub fn id(&self) -> &str {
        match self {
            DeadlineItem::Assignment { id, .. } | DeadlineItem::Event { id, .. } => id,
        }
    }

    pub fn date(&self) -> DateTime<Utc> {
        match self {
            DeadlineItem::Assignment { date, .. } | DeadlineItem::Event { date, .. } => *date,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            DeadlineItem::Assignment { description, .. }
            | DeadlineItem::Event { description, .. } => description,
        }
    }

    pub fn status(&self) -> Option<AssignmentStatus> {
        match self {
            DeadlineItem::Assignment { status, .. } => Some(*status),
            DeadlineItem::Event { .. } => None,
        }
    }
}

/// Counts per status for the report header.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSummary {
    pub status: AssignmentStatus,
    pub count: usize,
}
