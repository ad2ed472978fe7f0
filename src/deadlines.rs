use chrono::{DateTime, Duration, Utc};

use crate::models::{Assignment, AssignmentStatus, DeadlineItem, Event, Submission};
use crate::presentation;

/// How the "show completed" view treats past-due assignments that have no submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletedView {
    /// Past-due work only surfaces through the recent-creation clause.
    #[default]
    Reference,
    /// Every past-due assignment is admitted while completed items are shown.
    AdmitAllPast,
}

#[derive(Debug, Clone)]
pub struct AggregatorOptions {
    pub completed_view: CompletedView,
    pub assignment_window: Duration,
    pub creation_lookback: Duration,
    pub event_window: Duration,
    pub due_soon_threshold: Duration,
}

impl Default for AggregatorOptions {
    fn default() -> Self {
        Self {
            completed_view: CompletedView::Reference,
            assignment_window: Duration::days(3),
            creation_lookback: Duration::days(7),
            event_window: Duration::days(7),
            due_soon_threshold: Duration::hours(24),
        }
    }
}

pub fn find_submission<'a>(
    assignment: &Assignment,
    submissions: &'a [Submission],
) -> Option<&'a Submission> {
    submissions
        .iter()
        .find(|submission| submission.assignment_id == assignment.id)
}

pub fn classify_assignment(
    assignment: &Assignment,
    submissions: &[Submission],
    now: DateTime<Utc>,
) -> AssignmentStatus {
    let threshold = AggregatorOptions::default().due_soon_threshold;
    classify(assignment, find_submission(assignment, submissions), now, threshold)
}

fn classify(
    assignment: &Assignment,
    submission: Option<&Submission>,
    now: DateTime<Utc>,
    due_soon_threshold: Duration,
) -> AssignmentStatus {
    match (submission, assignment.due_date) {
        (Some(submission), _) if submission.is_graded => AssignmentStatus::Graded,
        (Some(_), _) => AssignmentStatus::Submitted,
        (None, Some(due)) if due < now => AssignmentStatus::Overdue,
        (None, Some(due)) if due - now < due_soon_threshold => AssignmentStatus::DueSoon,
        _ => AssignmentStatus::Pending,
    }
}

pub fn is_relevant_assignment(
    assignment: &Assignment,
    submission: Option<&Submission>,
    show_completed: bool,
    now: DateTime<Utc>,
    options: &AggregatorOptions,
) -> bool {
    let Some(due) = assignment.due_date else {
        return false;
    };

    if due < now {
        // Finished work stays visible for as long as new work would.
        if submission.is_some() && due >= now - options.creation_lookback {
            return true;
        }
        if !show_completed {
            return false;
        }
        if options.completed_view == CompletedView::AdmitAllPast {
            return true;
        }
    }

    let due_in_window = due >= now && due <= now + options.assignment_window;
    let recently_created = assignment.created_at >= now - options.creation_lookback;
    due_in_window || recently_created
}

pub fn is_relevant_event(
    event: &Event,
    show_completed: bool,
    now: DateTime<Utc>,
    options: &AggregatorOptions,
) -> bool {
    if event.start_datetime > now + options.event_window {
        return false;
    }
    show_completed || event.start_datetime >= now
}

pub fn compute_deadlines(
    assignments: &[Assignment],
    events: &[Event],
    submissions: &[Submission],
    show_completed: bool,
    now: DateTime<Utc>,
) -> Vec<DeadlineItem> {
    compute_deadlines_with(
        assignments,
        events,
        submissions,
        show_completed,
        now,
        &AggregatorOptions::default(),
    )
}

pub fn compute_deadlines_with(
    assignments: &[Assignment],
    events: &[Event],
    submissions: &[Submission],
    show_completed: bool,
    now: DateTime<Utc>,
    options: &AggregatorOptions,
) -> Vec<DeadlineItem> {
    let mut assignment_items: Vec<DeadlineItem> = assignments
        .iter()
        .filter_map(|assignment| {
            let submission = find_submission(assignment, submissions);
            if !is_relevant_assignment(assignment, submission, show_completed, now, options) {
                return None;
            }
            let status = classify(assignment, submission, now, options.due_soon_threshold);
            assignment_item(assignment, status)
        })
        .collect();

    let mut event_items: Vec<DeadlineItem> = events
        .iter()
        .filter(|event| is_relevant_event(event, show_completed, now, options))
        .map(event_item)
        .collect();

    order_current_first(&mut assignment_items, show_completed, now);
    order_current_first(&mut event_items, show_completed, now);

    let mut items = assignment_items;
    items.append(&mut event_items);
    // Stable, so equal dates keep assignments ahead of events.
    items.sort_by_key(DeadlineItem::date);
    items
}

fn order_current_first(items: &mut [DeadlineItem], show_completed: bool, now: DateTime<Utc>) {
    items.sort_by(|a, b| {
        let by_date = a.date().cmp(&b.date());
        if !show_completed {
            return by_date;
        }
        let a_past = a.date() < now;
        let b_past = b.date() < now;
        a_past.cmp(&b_past).then(by_date)
    });
}

fn assignment_item(assignment: &Assignment, status: AssignmentStatus) -> Option<DeadlineItem> {
    let date = assignment.due_date?;
    Some(DeadlineItem::Assignment {
        id: format!("assignment-{}", assignment.id),
        title: assignment.title.clone(),
        date,
        description: assignment.description.clone(),
        assignment_id: assignment.id,
        status,
        icon_class: presentation::status_badge(status).class_name(),
    })
}

fn event_item(event: &Event) -> DeadlineItem {
    DeadlineItem::Event {
        id: format!("event-{}", event.id),
        title: event.title.clone(),
        date: event.start_datetime,
        description: event.description.clone(),
        event_id: event.id,
        event_type: event.event_type,
        is_online: event.is_online,
        location: event.location.clone(),
    }
}
