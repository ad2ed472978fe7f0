use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::models::{AssignmentStatus, DeadlineItem, StatusSummary};
use crate::presentation;

pub fn summarize_by_status(items: &[DeadlineItem]) -> Vec<StatusSummary> {
    let mut map: std::collections::HashMap<AssignmentStatus, usize> =
        std::collections::HashMap::new();

    for status in items.iter().filter_map(DeadlineItem::status) {
        *map.entry(status).or_insert(0) += 1;
    }

    let mut summaries: Vec<StatusSummary> = map
        .into_iter()
        .map(|(status, count)| StatusSummary { status, count })
        .collect();

    summaries.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.status.as_str().cmp(b.status.as_str()))
    });
    summaries
}

/// One human-readable line per item, shared by the CLI listing and the report.
pub fn format_item(item: &DeadlineItem) -> String {
    let when = item.date().format("%a %b %-d, %H:%M");
    match item {
        DeadlineItem::Assignment { title, status, .. } => format!(
            "[{}] {} due {}",
            presentation::status_label(*status),
            title,
            when
        ),
        DeadlineItem::Event {
            title,
            event_type,
            is_online,
            location,
            ..
        } => {
            let place = match (is_online, location.as_deref()) {
                (true, _) => "online".to_string(),
                (false, Some(location)) => location.to_string(),
                (false, None) => "location TBA".to_string(),
            };
            format!(
                "[{}] {} at {} ({})",
                presentation::event_badge(*event_type).icon,
                title,
                when,
                place
            )
        }
    }
}

pub fn build_report(
    student: Option<&str>,
    show_completed: bool,
    now: DateTime<Utc>,
    items: &[DeadlineItem],
) -> String {
    let summaries = summarize_by_status(items);

    let mut output = String::new();
    let student_label = student.unwrap_or("snapshot");
    let view_label = if show_completed {
        "including completed"
    } else {
        "current only"
    };

    let _ = writeln!(output, "# Student Deadlines Report");
    let _ = writeln!(
        output,
        "Generated for {} at {} ({})",
        student_label,
        now.format("%Y-%m-%d %H:%M UTC"),
        view_label
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Assignment Status");

    if summaries.is_empty() {
        let _ = writeln!(output, "No assignments in this window.");
    } else {
        for summary in summaries.iter() {
            let _ = writeln!(
                output,
                "- {}: {}",
                presentation::status_label(summary.status),
                summary.count
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Worklist");

    if items.is_empty() {
        let _ = writeln!(output, "Nothing due in this window.");
    } else {
        for item in items {
            let _ = writeln!(output, "- {}", format_item(item));
            if !item.description().is_empty() {
                let _ = writeln!(output, "  {}", item.description());
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventType;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()
    }

    fn assignment_item(id: i64, status: AssignmentStatus) -> DeadlineItem {
        DeadlineItem::Assignment {
            id: format!("assignment-{id}"),
            title: format!("Essay {id}"),
            date: now(),
            description: String::new(),
            assignment_id: id,
            status,
            icon_class: presentation::status_badge(status).class_name(),
        }
    }

    #[test]
    fn summaries_count_assignments_only() {
        let items = vec![
            assignment_item(1, AssignmentStatus::Pending),
            assignment_item(2, AssignmentStatus::Pending),
            assignment_item(3, AssignmentStatus::Graded),
            DeadlineItem::Event {
                id: "event-1".to_string(),
                title: "Webinar".to_string(),
                date: now(),
                description: String::new(),
                event_id: 1,
                event_type: EventType::Webinar,
                is_online: true,
                location: None,
            },
        ];

        let summaries = summarize_by_status(&items);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].status, AssignmentStatus::Pending);
        assert_eq!(summaries[0].count, 2);
        assert_eq!(summaries[1].count, 1);
    }

    #[test]
    fn events_show_where_they_happen() {
        let item = DeadlineItem::Event {
            id: "event-2".to_string(),
            title: "Study hall".to_string(),
            date: now(),
            description: String::new(),
            event_id: 2,
            event_type: EventType::Class,
            is_online: false,
            location: Some("Library 3F".to_string()),
        };
        assert_eq!(
            format_item(&item),
            "[graduation] Study hall at Mon Mar 2, 12:00 (Library 3F)"
        );
    }

    #[test]
    fn empty_report_says_so() {
        let report = build_report(None, false, now(), &[]);
        assert!(report.contains("Generated for snapshot at 2026-03-02 12:00 UTC (current only)"));
        assert!(report.contains("No assignments in this window."));
        assert!(report.contains("Nothing due in this window."));
    }

    #[test]
    fn report_lists_items_in_order() {
        let items = vec![
            assignment_item(1, AssignmentStatus::Overdue),
            assignment_item(2, AssignmentStatus::DueSoon),
        ];
        let report = build_report(Some("avery.lee@groupscholar.com"), true, now(), &items);
        let overdue = report.find("[Overdue] Essay 1").unwrap();
        let due_soon = report.find("[Due soon] Essay 2").unwrap();
        assert!(overdue < due_soon);
        assert!(report.contains("(including completed)"));
    }
}
