use crate::models::{AssignmentStatus, EventType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub icon: &'static str,
    pub color: &'static str,
}

impl Badge {
    pub fn class_name(&self) -> String {
        format!("{}-{}", self.icon, self.color)
    }
}

pub fn event_badge(event_type: EventType) -> Badge {
    match event_type {
        EventType::Class => Badge {
            icon: "graduation",
            color: "blue",
        },
        EventType::Webinar => Badge {
            icon: "video",
            color: "purple",
        },
        EventType::WeeklyTest => Badge {
            icon: "document",
            color: "orange",
        },
        EventType::Other => Badge {
            icon: "calendar",
            color: "gray",
        },
    }
}

pub fn status_badge(status: AssignmentStatus) -> Badge {
    match status {
        AssignmentStatus::Graded => Badge {
            icon: "check-circle",
            color: "green",
        },
        AssignmentStatus::Submitted => Badge {
            icon: "check",
            color: "blue",
        },
        AssignmentStatus::Overdue => Badge {
            icon: "alert",
            color: "red",
        },
        AssignmentStatus::DueSoon => Badge {
            icon: "clock",
            color: "orange",
        },
        AssignmentStatus::Pending => Badge {
            icon: "circle",
            color: "gray",
        },
    }
}

pub fn status_label(status: AssignmentStatus) -> &'static str {
    match status {
        AssignmentStatus::Graded => "Graded",
        AssignmentStatus::Submitted => "Submitted",
        AssignmentStatus::Overdue => "Overdue",
        AssignmentStatus::DueSoon => "Due soon",
        AssignmentStatus::Pending => "Pending",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_badges_follow_expected_mapping() {
        assert_eq!(event_badge(EventType::Class).class_name(), "graduation-blue");
        assert_eq!(event_badge(EventType::Webinar).class_name(), "video-purple");
        assert_eq!(
            event_badge(EventType::WeeklyTest).class_name(),
            "document-orange"
        );
        assert_eq!(event_badge(EventType::Other).class_name(), "calendar-gray");
    }

    #[test]
    fn unknown_event_types_fall_back_to_calendar() {
        let badge = event_badge(EventType::parse("hackathon"));
        assert_eq!(badge.icon, "calendar");
        assert_eq!(badge.color, "gray");
    }

    #[test]
    fn overdue_is_red() {
        assert_eq!(status_badge(AssignmentStatus::Overdue).color, "red");
        assert_eq!(status_label(AssignmentStatus::DueSoon), "Due soon");
    }
}
