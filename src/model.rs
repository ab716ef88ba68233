use rand::{distributions::Alphanumeric, Rng};
use std::fmt;

pub type ProjectId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Planning,
    Shooting,
    CutEdit,
    Graphics,
    Sound,
    Revision,
    Screening,
    Done,
    OnHold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTag {
    Blue,
    Red,
    Orange,
    Violet,
    Green,
    Grey,
}

impl Status {
    pub const ALL: [Status; 9] = [
        Status::Planning,
        Status::Shooting,
        Status::CutEdit,
        Status::Graphics,
        Status::Sound,
        Status::Revision,
        Status::Screening,
        Status::Done,
        Status::OnHold,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Status::Planning => "planning",
            Status::Shooting => "shooting",
            Status::CutEdit => "cut-edit",
            Status::Graphics => "graphics",
            Status::Sound => "sound",
            Status::Revision => "revision",
            Status::Screening => "screening",
            Status::Done => "done",
            Status::OnHold => "on-hold",
        }
    }

    pub fn parse(raw: &str) -> Option<Status> {
        let trimmed = raw.trim();
        Status::ALL.into_iter().find(|s| s.label() == trimmed)
    }

    // Blank and legacy values both land on the default.
    pub fn parse_or_default(raw: &str) -> Status {
        Status::parse(raw).unwrap_or_default()
    }

    pub fn color(self) -> ColorTag {
        match self {
            Status::Planning | Status::Screening => ColorTag::Blue,
            Status::Shooting | Status::Revision => ColorTag::Red,
            Status::CutEdit => ColorTag::Orange,
            Status::Graphics => ColorTag::Violet,
            Status::Sound => ColorTag::Green,
            Status::Done | Status::OnHold => ColorTag::Grey,
        }
    }

    pub fn is_done(self) -> bool {
        self == Status::Done
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stages {
    pub planning: String,
    pub shooting: String,
    pub editing: String,
    pub design: String,
    pub cg: String,
    pub color_grade: String,
    pub sound: String,
    pub music: String,
}

impl Stages {
    pub fn fields(&self) -> [(&'static str, &str); 8] {
        [
            ("planning", &self.planning),
            ("shooting", &self.shooting),
            ("editing", &self.editing),
            ("design", &self.design),
            ("cg", &self.cg),
            ("color_grade", &self.color_grade),
            ("sound", &self.sound),
            ("music", &self.music),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: ProjectId,
    pub year: i32,
    pub month: u32,
    pub name: String,
    pub description: String,
    pub status: Status,
    pub owner: String,
    pub stages: Stages,
    pub preview_date: String,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectDraft {
    pub year: i32,
    pub month: u32,
    pub name: String,
    pub description: String,
    pub status: Status,
    pub owner: String,
    pub preview_date: String,
}

#[derive(thiserror::Error, Debug)]
pub enum SheetError {
    #[error("project name is required")]
    NameRequired,
    #[error("project not found: {0}")]
    ProjectNotFound(String),
}

#[derive(Debug, Clone, Default)]
pub struct Sheet {
    projects: Vec<Project>,
}

impl Sheet {
    pub fn new(projects: Vec<Project>) -> Self {
        Sheet { projects }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn create(&mut self, draft: ProjectDraft) -> Result<ProjectId, SheetError> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(SheetError::NameRequired);
        }
        let id = generate_id();
        self.projects.push(Project {
            id: id.clone(),
            year: draft.year,
            month: draft.month,
            name: name.to_string(),
            description: draft.description,
            status: draft.status,
            owner: draft.owner,
            stages: Stages::default(),
            preview_date: draft.preview_date,
        });
        Ok(id)
    }

    pub fn update<F>(&mut self, id: &str, mut f: F) -> Result<(), SheetError>
    where
        F: FnMut(&mut Project),
    {
        let project = self
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| SheetError::ProjectNotFound(id.to_string()))?;
        f(project);
        Ok(())
    }

    pub fn delete(&mut self, id: &str) -> Result<Project, SheetError> {
        let idx = self
            .projects
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| SheetError::ProjectNotFound(id.to_string()))?;
        Ok(self.projects.remove(idx))
    }
}

pub fn generate_id() -> ProjectId {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str) -> ProjectDraft {
        ProjectDraft {
            year: 2026,
            month: 8,
            name: name.to_string(),
            ..ProjectDraft::default()
        }
    }

    #[test]
    fn create_rejects_blank_name() {
        let mut sheet = Sheet::default();
        assert!(matches!(
            sheet.create(draft("   ")),
            Err(SheetError::NameRequired)
        ));
        assert!(sheet.is_empty());
    }

    #[test]
    fn create_appends_with_empty_stages() {
        let mut sheet = Sheet::default();
        let id = sheet.create(draft("  Launch film  ")).unwrap();
        assert_eq!(sheet.len(), 1);
        let project = sheet.get(&id).unwrap();
        assert_eq!(project.name, "Launch film");
        assert_eq!(project.stages, Stages::default());
        assert_eq!(project.preview_date, "");
    }

    #[test]
    fn delete_shifts_later_records_down() {
        let mut sheet = Sheet::default();
        let ids: Vec<_> = (0..5)
            .map(|i| sheet.create(draft(&format!("p{i}"))).unwrap())
            .collect();
        let removed = sheet.delete(&ids[2]).unwrap();
        assert_eq!(removed.name, "p2");
        assert_eq!(sheet.len(), 4);
        assert_eq!(sheet.projects()[2].name, "p3");
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let mut sheet = Sheet::default();
        let err = sheet.update("zzzzzz", |p| p.owner = "kim".into());
        assert!(matches!(err, Err(SheetError::ProjectNotFound(_))));
        assert!(matches!(
            sheet.delete("zzzzzz"),
            Err(SheetError::ProjectNotFound(_))
        ));
    }

    #[test]
    fn status_parse_falls_back_to_planning() {
        assert_eq!(Status::parse("cut-edit"), Some(Status::CutEdit));
        assert_eq!(Status::parse_or_default(""), Status::Planning);
        assert_eq!(Status::parse_or_default("in-review"), Status::Planning);
        assert_eq!(Status::Done.color(), ColorTag::Grey);
        assert_eq!(Status::OnHold.color(), ColorTag::Grey);
    }
}
