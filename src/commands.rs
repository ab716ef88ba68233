use crate::cli::{AddArgs, EditArgs};
use crate::deadline;
use crate::model::{Project, ProjectDraft, Status};
use crate::storage::{self, LoadedSheet, SheetLocation, SheetScope, YamlStore};
use crate::ui;
use crate::view::{self, OwnerFilter, Selection};
use anyhow::{anyhow, bail, Result};
use chrono::{Local, NaiveDate};
use std::env;

pub fn init() -> Result<()> {
    let location = storage::init_project_sheet()?;
    println!("Initialized sheet at {}", location.path.display());
    Ok(())
}

pub fn list(year: Option<i32>, month: Option<u32>, owner: Option<String>) -> Result<()> {
    let (loaded, _, location) = load_current_sheet()?;
    if let Some(fault) = &loaded.fault {
        eprintln!("warning: could not read sheet ({fault}); showing an empty list");
    }
    let today = Local::now().date_naive();
    let sheet = &loaded.sheet;
    let defaults = Selection::default_for(sheet, today);
    let selection = Selection {
        year: year.unwrap_or(defaults.year),
        month: month.unwrap_or(defaults.month),
        owner: owner
            .as_deref()
            .map(OwnerFilter::parse)
            .unwrap_or_default(),
    };
    let scoped = view::scoped(sheet, &selection);

    println!(
        "Sheet: {} ({})",
        location.path.display(),
        match location.scope {
            SheetScope::Project => "project",
            SheetScope::Global => "global",
        }
    );
    println!(
        "{}-{:02}, owner: {}",
        selection.year,
        selection.month,
        selection.owner.label()
    );
    println!();
    println!("Active ({})", scoped.active.len());
    if scoped.active.is_empty() {
        println!("  (none)");
    }
    for &project in &scoped.active {
        print_project(project, today);
    }
    println!();
    println!("Completed ({})", scoped.completed.len());
    if scoped.completed.is_empty() {
        println!("  (none)");
    }
    for &project in &scoped.completed {
        print_project(project, today);
    }
    Ok(())
}

pub fn add(args: AddArgs) -> Result<()> {
    let (mut loaded, store, _) = load_current_sheet()?;
    refuse_stale_write(&loaded)?;
    let today = Local::now().date_naive();
    let defaults = Selection::default_for(&loaded.sheet, today);
    let status = match args.status.as_deref() {
        Some(raw) => parse_status_arg(raw)?,
        None => Status::default(),
    };
    let preview_date = match args.preview.as_deref() {
        Some(raw) => parse_preview_arg(raw)?,
        None => String::new(),
    };
    let draft = ProjectDraft {
        year: args.year.unwrap_or(defaults.year),
        month: args.month.unwrap_or(defaults.month),
        name: args.name,
        description: args.description.unwrap_or_default(),
        status,
        owner: args.owner.unwrap_or_default(),
        preview_date,
    };
    let id = loaded.sheet.create(draft)?;
    storage::save_sheet(&store, &loaded.sheet)?;
    println!("Added project {id}");
    Ok(())
}

pub fn edit(args: EditArgs) -> Result<()> {
    let (mut loaded, store, _) = load_current_sheet()?;
    refuse_stale_write(&loaded)?;
    let status = match args.status.as_deref() {
        Some(raw) => Some(parse_status_arg(raw)?),
        None => None,
    };
    let preview_date = match args.preview.as_deref() {
        Some(raw) => Some(parse_preview_arg(raw)?),
        None => None,
    };
    if let Some(name) = &args.name {
        if name.trim().is_empty() {
            bail!("project name is required");
        }
    }
    loaded.sheet.update(&args.id, |project| {
        if let Some(name) = &args.name {
            project.name = name.trim().to_string();
        }
        if let Some(year) = args.year {
            project.year = year;
        }
        if let Some(month) = args.month {
            project.month = month;
        }
        if let Some(description) = &args.description {
            project.description = description.clone();
        }
        if let Some(status) = status {
            project.status = status;
        }
        if let Some(owner) = &args.owner {
            project.owner = owner.clone();
        }
        if args.clear_preview {
            project.preview_date.clear();
        }
        if let Some(preview) = &preview_date {
            project.preview_date = preview.clone();
        }
        if let Some(planning) = &args.planning {
            project.stages.planning = planning.clone();
        }
        if let Some(shooting) = &args.shooting {
            project.stages.shooting = shooting.clone();
        }
        if let Some(editing) = &args.editing {
            project.stages.editing = editing.clone();
        }
        if let Some(design) = &args.design {
            project.stages.design = design.clone();
        }
        if let Some(cg) = &args.cg {
            project.stages.cg = cg.clone();
        }
        if let Some(color_grade) = &args.color_grade {
            project.stages.color_grade = color_grade.clone();
        }
        if let Some(sound) = &args.sound {
            project.stages.sound = sound.clone();
        }
        if let Some(music) = &args.music {
            project.stages.music = music.clone();
        }
    })?;
    storage::save_sheet(&store, &loaded.sheet)?;
    println!("Updated project {}", args.id);
    Ok(())
}

pub fn delete(id: String) -> Result<()> {
    let (mut loaded, store, _) = load_current_sheet()?;
    refuse_stale_write(&loaded)?;
    let removed = loaded.sheet.delete(&id)?;
    storage::save_sheet(&store, &loaded.sheet)?;
    println!("Deleted project {} ({})", id, removed.name);
    Ok(())
}

pub fn tui() -> Result<()> {
    let (loaded, store, location) = load_current_sheet()?;
    ui::run(loaded, store, location)
}

fn load_current_sheet() -> Result<(LoadedSheet, YamlStore, SheetLocation)> {
    let cwd = env::current_dir()?;
    let location = storage::locate_sheet(&cwd)?;
    let store = YamlStore::new(location.path.clone());
    let loaded = storage::load_sheet(&store, Local::now().date_naive());
    Ok((loaded, store, location))
}

// A mutation on top of a failed read would clobber the stored table with
// the empty fallback set.
fn refuse_stale_write(loaded: &LoadedSheet) -> Result<()> {
    if let Some(fault) = &loaded.fault {
        bail!("refusing to write over an unreadable sheet: {fault}");
    }
    Ok(())
}

fn parse_status_arg(raw: &str) -> Result<Status> {
    Status::parse(raw).ok_or_else(|| {
        let labels: Vec<_> = Status::ALL.iter().map(|s| s.label()).collect();
        anyhow!("unknown status: {} (expected one of: {})", raw, labels.join(", "))
    })
}

fn parse_preview_arg(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(|date| date.format("%Y-%m-%d").to_string())
        .map_err(|_| anyhow!("invalid preview date (use YYYY-MM-DD): {trimmed}"))
}

fn print_project(project: &Project, today: NaiveDate) {
    let countdown = deadline::countdown(project, today);
    let mut line = format!("  - {} [{}] {}", project.id, project.status, project.name);
    if !project.owner.is_empty() {
        line.push_str(&format!(" (owner: {})", project.owner));
    }
    if !countdown.label.is_empty() {
        if countdown.urgent {
            line.push_str(&format!(" !! {}", countdown.label));
        } else {
            line.push_str(&format!(" ({})", countdown.label));
        }
    }
    println!("{line}");
    if !project.description.is_empty() {
        println!("      {}", project.description);
    }
    for (stage, note) in project.stages.fields() {
        if !note.is_empty() {
            println!("      {stage}: {note}");
        }
    }
}
