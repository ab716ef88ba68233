use crate::model::{generate_id, Project, Stages, Status};
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};

pub type RawRow = BTreeMap<String, String>;

// Persisted layout: one header row of these columns, one row per project.
pub const COLUMNS: [&str; 15] = [
    "year",
    "month",
    "name",
    "description",
    "status",
    "owner",
    "planning",
    "shooting",
    "editing",
    "design",
    "cg",
    "color_grade",
    "sound",
    "music",
    "preview_date",
];

pub fn normalize(rows: Vec<RawRow>, today: NaiveDate) -> Vec<Project> {
    scrub(rows)
        .iter()
        .map(|row| project_from_row(row, today))
        .collect()
}

// Noise removal, applied once before normalization: rows blank across
// all columns and columns blank across all rows are dropped.
pub fn scrub(rows: Vec<RawRow>) -> Vec<RawRow> {
    let mut rows: Vec<RawRow> = rows
        .into_iter()
        .filter(|row| row.values().any(|v| !v.trim().is_empty()))
        .collect();
    let mut live: BTreeSet<String> = BTreeSet::new();
    for row in &rows {
        for (key, value) in row {
            if !value.trim().is_empty() {
                live.insert(key.clone());
            }
        }
    }
    for row in &mut rows {
        row.retain(|key, _| live.contains(key));
    }
    rows
}

pub fn to_rows(projects: &[Project]) -> Vec<RawRow> {
    projects.iter().map(project_to_row).collect()
}

fn project_from_row(row: &RawRow, today: NaiveDate) -> Project {
    Project {
        id: generate_id(),
        year: parse_year(&cell(row, "year"), today),
        month: parse_month(&cell(row, "month"), today),
        name: cell(row, "name"),
        description: cell(row, "description"),
        status: Status::parse_or_default(&cell(row, "status")),
        owner: cell(row, "owner"),
        stages: Stages {
            planning: cell(row, "planning"),
            shooting: cell(row, "shooting"),
            editing: cell(row, "editing"),
            design: cell(row, "design"),
            cg: cell(row, "cg"),
            color_grade: cell(row, "color_grade"),
            sound: cell(row, "sound"),
            music: cell(row, "music"),
        },
        preview_date: cell(row, "preview_date"),
    }
}

fn project_to_row(project: &Project) -> RawRow {
    let mut row = RawRow::new();
    row.insert("year".into(), project.year.to_string());
    row.insert("month".into(), project.month.to_string());
    row.insert("name".into(), project.name.clone());
    row.insert("description".into(), project.description.clone());
    row.insert("status".into(), project.status.label().to_string());
    row.insert("owner".into(), project.owner.clone());
    for (key, value) in project.stages.fields() {
        row.insert(key.to_string(), value.to_string());
    }
    row.insert("preview_date".into(), project.preview_date.clone());
    row
}

fn cell(row: &RawRow, key: &str) -> String {
    match row.get(key) {
        Some(value) if !value.trim().is_empty() => value.clone(),
        _ => String::new(),
    }
}

// Sheets hand back numbers in odd shapes ("2024.0"), so fall through a
// float parse before giving up on the current date parts.
fn parse_year(raw: &str, today: NaiveDate) -> i32 {
    let trimmed = raw.trim();
    trimmed
        .parse::<i32>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().map(|v| v as i32))
        .unwrap_or_else(|| today.year())
}

fn parse_month(raw: &str, today: NaiveDate) -> u32 {
    let trimmed = raw.trim();
    let parsed = trimmed
        .parse::<u32>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().map(|v| v as u32));
    match parsed {
        Some(month) if (1..=12).contains(&month) => month,
        _ => today.month(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
    }

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn missing_columns_become_empty_fields() {
        let projects = normalize(vec![row(&[("name", "Teaser")])], today());
        assert_eq!(projects.len(), 1);
        let p = &projects[0];
        assert_eq!(p.name, "Teaser");
        assert_eq!(p.description, "");
        assert_eq!(p.owner, "");
        assert_eq!(p.preview_date, "");
        assert_eq!(p.stages.music, "");
    }

    #[test]
    fn blank_rows_and_columns_are_scrubbed() {
        let rows = vec![
            row(&[("name", "Teaser"), ("memo", " ")]),
            row(&[("name", ""), ("memo", "")]),
            row(&[("name", "Recap"), ("memo", "")]),
        ];
        let scrubbed = scrub(rows);
        assert_eq!(scrubbed.len(), 2);
        assert!(scrubbed.iter().all(|r| !r.contains_key("memo")));
    }

    #[test]
    fn year_and_month_fall_back_to_current() {
        let projects = normalize(
            vec![
                row(&[("name", "a"), ("year", "n/a"), ("month", "13")]),
                row(&[("name", "b"), ("year", "2024.0"), ("month", "3")]),
            ],
            today(),
        );
        assert_eq!(projects[0].year, 2026);
        assert_eq!(projects[0].month, 8);
        assert_eq!(projects[1].year, 2024);
        assert_eq!(projects[1].month, 3);
    }

    #[test]
    fn status_is_always_in_vocabulary() {
        let projects = normalize(
            vec![
                row(&[("name", "a"), ("status", "")]),
                row(&[("name", "b"), ("status", "완료")]),
                row(&[("name", "c"), ("status", "shooting")]),
            ],
            today(),
        );
        assert_eq!(projects[0].status, Status::Planning);
        assert_eq!(projects[1].status, Status::Planning);
        assert_eq!(projects[2].status, Status::Shooting);
    }

    #[test]
    fn emitted_rows_carry_all_columns() {
        let projects = normalize(vec![row(&[("name", "Teaser")])], today());
        let rows = to_rows(&projects);
        for column in COLUMNS {
            assert!(rows[0].contains_key(column), "missing column {column}");
        }
    }

    #[test]
    fn load_then_emit_is_idempotent() {
        let rows = vec![
            row(&[
                ("name", "Teaser"),
                ("year", "oops"),
                ("status", "mystery"),
                ("preview_date", "not-a-date"),
                ("cg", "storyboard locked"),
            ]),
            row(&[("name", "Recap"), ("year", "2024"), ("month", "12")]),
        ];
        let first = normalize(rows, today());
        let second = normalize(to_rows(&first), today());
        assert_eq!(to_rows(&first), to_rows(&second));
    }

    #[test]
    fn order_is_preserved() {
        let rows = (0..6)
            .map(|i| {
                let name = format!("p{i}");
                row(&[("name", name.as_str()), ("year", "2025")])
            })
            .collect();
        let projects = normalize(rows, today());
        let names: Vec<_> = projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["p0", "p1", "p2", "p3", "p4", "p5"]);
    }
}
