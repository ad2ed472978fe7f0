use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::models::{Assignment, Event, Submission};

/// The three dashboard inputs captured as one JSON document.
#[derive(Debug, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub submissions: Vec<Submission>,
}

pub fn parse_snapshot(contents: &str) -> anyhow::Result<Snapshot> {
    serde_json::from_str(contents).context("snapshot is not valid deadline JSON")
}

pub fn load_snapshot(path: &Path) -> anyhow::Result<Snapshot> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    parse_snapshot(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventType;

    #[test]
    fn missing_sections_load_as_empty() {
        let snapshot = parse_snapshot(r#"{ "events": [] }"#).unwrap();
        assert!(snapshot.assignments.is_empty());
        assert!(snapshot.events.is_empty());
        assert!(snapshot.submissions.is_empty());
    }

    #[test]
    fn parses_api_shaped_records() {
        let snapshot = parse_snapshot(
            r#"{
                "assignments": [
                    {
                        "id": 12,
                        "title": "Lab report",
                        "description": "Titration lab",
                        "due_date": null,
                        "created_at": "2026-02-27T09:00:00Z"
                    }
                ],
                "events": [
                    {
                        "id": 3,
                        "title": "Quiz 2",
                        "description": "",
                        "start_datetime": "2026-03-04T14:00:00Z",
                        "event_type": "weekly_test",
                        "is_online": false,
                        "location": "Hall B"
                    }
                ],
                "submissions": [{ "assignment_id": 12, "is_graded": false }]
            }"#,
        )
        .unwrap();

        assert_eq!(snapshot.assignments[0].due_date, None);
        assert_eq!(snapshot.events[0].event_type, EventType::WeeklyTest);
        assert_eq!(snapshot.events[0].location.as_deref(), Some("Hall B"));
        assert_eq!(snapshot.submissions[0].assignment_id, 12);
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(parse_snapshot("[1, 2, 3]").is_err());
    }
}
