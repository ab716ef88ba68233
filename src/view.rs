use crate::model::{Project, Sheet};
use chrono::{Datelike, NaiveDate};

pub const ALL_OWNERS: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OwnerFilter {
    #[default]
    All,
    Name(String),
}

impl OwnerFilter {
    pub fn parse(raw: &str) -> OwnerFilter {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == ALL_OWNERS {
            OwnerFilter::All
        } else {
            OwnerFilter::Name(trimmed.to_string())
        }
    }

    pub fn matches(&self, owner: &str) -> bool {
        match self {
            OwnerFilter::All => true,
            OwnerFilter::Name(name) => owner == name,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            OwnerFilter::All => ALL_OWNERS,
            OwnerFilter::Name(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub year: i32,
    pub month: u32,
    pub owner: OwnerFilter,
}

impl Selection {
    pub fn default_for(sheet: &Sheet, today: NaiveDate) -> Selection {
        let year = year_options(sheet, today)[0];
        let month = month_options(sheet, year, today)[0];
        Selection {
            year,
            month,
            owner: OwnerFilter::All,
        }
    }
}

#[derive(Debug, Default)]
pub struct ScopedView<'a> {
    pub active: Vec<&'a Project>,
    pub completed: Vec<&'a Project>,
}

impl ScopedView<'_> {
    pub fn len(&self) -> usize {
        self.active.len() + self.completed.len()
    }
}

pub fn scoped<'a>(sheet: &'a Sheet, selection: &Selection) -> ScopedView<'a> {
    let mut view = ScopedView::default();
    for project in sheet.projects() {
        if project.year != selection.year || project.month != selection.month {
            continue;
        }
        if !selection.owner.matches(&project.owner) {
            continue;
        }
        if project.status.is_done() {
            view.completed.push(project);
        } else {
            view.active.push(project);
        }
    }
    view
}

pub fn year_options(sheet: &Sheet, today: NaiveDate) -> Vec<i32> {
    let mut years: Vec<i32> = sheet.projects().iter().map(|p| p.year).collect();
    years.sort_unstable();
    years.dedup();
    years.reverse();
    if years.is_empty() {
        years.push(today.year());
    }
    years
}

pub fn month_options(sheet: &Sheet, year: i32, today: NaiveDate) -> Vec<u32> {
    let mut months: Vec<u32> = sheet
        .projects()
        .iter()
        .filter(|p| p.year == year)
        .map(|p| p.month)
        .collect();
    months.sort_unstable();
    months.dedup();
    if months.is_empty() {
        months.push(today.month());
    }
    months
}

pub fn owner_options(sheet: &Sheet) -> Vec<String> {
    let mut owners: Vec<String> = sheet
        .projects()
        .iter()
        .map(|p| p.owner.trim())
        .filter(|o| !o.is_empty())
        .map(|o| o.to_string())
        .collect();
    owners.sort();
    owners.dedup();
    owners
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{generate_id, Project, Stages, Status};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
    }

    fn project(name: &str, year: i32, month: u32, owner: &str, status: Status) -> Project {
        Project {
            id: generate_id(),
            year,
            month,
            name: name.to_string(),
            description: String::new(),
            status,
            owner: owner.to_string(),
            stages: Stages::default(),
            preview_date: String::new(),
        }
    }

    fn sample_sheet() -> Sheet {
        let mut projects = Vec::new();
        for i in 0..5 {
            projects.push(project(&format!("a{i}"), 2024, 6, "kim", Status::Planning));
        }
        for i in 0..5 {
            let status = if i % 2 == 0 {
                Status::Done
            } else {
                Status::Shooting
            };
            projects.push(project(&format!("b{i}"), 2025, 6, "lee", status));
        }
        Sheet::new(projects)
    }

    #[test]
    fn year_filter_returns_exact_matches_in_order() {
        let sheet = sample_sheet();
        let selection = Selection {
            year: 2024,
            month: 6,
            owner: OwnerFilter::All,
        };
        let view = scoped(&sheet, &selection);
        assert_eq!(view.len(), 5);
        let names: Vec<_> = view.active.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["a0", "a1", "a2", "a3", "a4"]);
    }

    #[test]
    fn active_and_completed_partition_the_scope() {
        let sheet = sample_sheet();
        let selection = Selection {
            year: 2025,
            month: 6,
            owner: OwnerFilter::All,
        };
        let view = scoped(&sheet, &selection);
        assert_eq!(view.active.len(), 2);
        assert_eq!(view.completed.len(), 3);
        assert!(view.active.iter().all(|p| !p.status.is_done()));
        assert!(view.completed.iter().all(|p| p.status.is_done()));
    }

    #[test]
    fn owner_filter_is_exact_and_case_sensitive() {
        let mut sheet = sample_sheet();
        let first = sheet.projects()[0].id.clone();
        sheet.update(&first, |p| p.owner = "Kim".into()).unwrap();
        let selection = Selection {
            year: 2024,
            month: 6,
            owner: OwnerFilter::parse("kim"),
        };
        let view = scoped(&sheet, &selection);
        assert_eq!(view.len(), 4);
    }

    #[test]
    fn selector_options_derive_from_the_sheet() {
        let sheet = sample_sheet();
        assert_eq!(year_options(&sheet, today()), [2025, 2024]);
        assert_eq!(month_options(&sheet, 2024, today()), [6]);
        assert_eq!(owner_options(&sheet), ["kim", "lee"]);
    }

    #[test]
    fn empty_sheet_falls_back_to_current_date() {
        let sheet = Sheet::default();
        assert_eq!(year_options(&sheet, today()), [2026]);
        assert_eq!(month_options(&sheet, 2026, today()), [8]);
        assert!(owner_options(&sheet).is_empty());
        let selection = Selection::default_for(&sheet, today());
        assert_eq!(selection.year, 2026);
        assert_eq!(selection.month, 8);
        assert_eq!(selection.owner, OwnerFilter::All);
    }

    #[test]
    fn default_selection_prefers_latest_year() {
        let sheet = sample_sheet();
        let selection = Selection::default_for(&sheet, today());
        assert_eq!(selection.year, 2025);
        assert_eq!(selection.month, 6);
    }

    #[test]
    fn owner_sentinel_parses_to_all() {
        assert_eq!(OwnerFilter::parse("all"), OwnerFilter::All);
        assert_eq!(OwnerFilter::parse("  "), OwnerFilter::All);
        assert_eq!(
            OwnerFilter::parse(" kim "),
            OwnerFilter::Name("kim".into())
        );
    }
}
