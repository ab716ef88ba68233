use crate::model::Project;
use chrono::NaiveDate;

pub const URGENT_WINDOW_DAYS: i64 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Countdown {
    pub label: String,
    pub urgent: bool,
}

pub fn countdown(project: &Project, today: NaiveDate) -> Countdown {
    let raw = project.preview_date.trim();
    if raw.is_empty() {
        return Countdown::default();
    }
    let date = match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => return Countdown::default(),
    };
    let days_left = (date - today).num_days();
    let (label, urgent) = if days_left < 0 {
        (format!("overdue by {} days", -days_left), false)
    } else if days_left == 0 {
        ("due today".to_string(), true)
    } else {
        (
            format!("due in {days_left} days"),
            days_left <= URGENT_WINDOW_DAYS,
        )
    };
    Countdown {
        label,
        // A finished project is never flagged, whatever the date says.
        urgent: urgent && !project.status.is_done(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{generate_id, Stages, Status};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
    }

    fn project(preview_date: &str, status: Status) -> Project {
        Project {
            id: generate_id(),
            year: 2026,
            month: 8,
            name: "Teaser".to_string(),
            description: String::new(),
            status,
            owner: String::new(),
            stages: Stages::default(),
            preview_date: preview_date.to_string(),
        }
    }

    #[test]
    fn blank_or_garbage_dates_yield_nothing() {
        let empty = countdown(&project("", Status::Shooting), today());
        assert_eq!(empty, Countdown::default());
        let garbage = countdown(&project("next tuesday", Status::Shooting), today());
        assert_eq!(garbage, Countdown::default());
    }

    #[test]
    fn due_today_is_urgent() {
        let c = countdown(&project("2026-08-07", Status::Shooting), today());
        assert_eq!(c.label, "due today");
        assert!(c.urgent);
    }

    #[test]
    fn urgency_starts_three_days_out() {
        let far = countdown(&project("2026-08-12", Status::Shooting), today());
        assert_eq!(far.label, "due in 5 days");
        assert!(!far.urgent);
        let near = countdown(&project("2026-08-09", Status::Shooting), today());
        assert_eq!(near.label, "due in 2 days");
        assert!(near.urgent);
    }

    #[test]
    fn overdue_is_labelled_but_not_urgent() {
        let c = countdown(&project("2026-08-03", Status::Revision), today());
        assert_eq!(c.label, "overdue by 4 days");
        assert!(!c.urgent);
    }

    #[test]
    fn done_projects_are_never_urgent() {
        let c = countdown(&project("2026-08-07", Status::Done), today());
        assert_eq!(c.label, "due today");
        assert!(!c.urgent);
    }
}
