use crate::model::Sheet;
use crate::table::{self, RawRow, COLUMNS};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetScope {
    Project,
    Global,
}

#[derive(Debug, Clone)]
pub struct SheetLocation {
    pub path: PathBuf,
    pub scope: SheetScope,
}

// Full-overwrite tabular store: reads hand back loosely-typed rows,
// writes replace the whole table.
pub trait TableStore {
    fn read_table(&self) -> Result<Vec<RawRow>>;
    fn write_table(&self, rows: &[RawRow]) -> Result<()>;
}

#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct TableFile {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct YamlStore {
    path: PathBuf,
}

impl YamlStore {
    pub fn new(path: PathBuf) -> Self {
        YamlStore { path }
    }
}

impl TableStore for YamlStore {
    fn read_table(&self) -> Result<Vec<RawRow>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("reading {:?}", self.path))?;
        let file: TableFile = serde_yaml::from_str(&data).context("parsing sheet file")?;
        let rows = file
            .rows
            .iter()
            .map(|cells| {
                file.columns
                    .iter()
                    .zip(cells.iter())
                    .map(|(column, cell)| (column.clone(), cell.clone()))
                    .collect()
            })
            .collect();
        Ok(rows)
    }

    fn write_table(&self, rows: &[RawRow]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
        }
        let file = TableFile {
            columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| {
                    COLUMNS
                        .iter()
                        .map(|column| row.get(*column).cloned().unwrap_or_default())
                        .collect()
                })
                .collect(),
        };
        let serialized = serde_yaml::to_string(&file).context("serializing sheet")?;
        fs::write(&self.path, serialized).with_context(|| format!("writing {:?}", self.path))?;
        Ok(())
    }
}

pub fn init_project_sheet() -> Result<SheetLocation> {
    let cwd = std::env::current_dir()?;
    let dir = cwd.join(".callsheet");
    fs::create_dir_all(&dir).context("failed to create .callsheet directory")?;
    let path = dir.join("sheet.yml");
    let location = SheetLocation {
        path: path.clone(),
        scope: SheetScope::Project,
    };
    if !path.exists() {
        YamlStore::new(path).write_table(&[])?;
    }
    Ok(location)
}

pub fn locate_sheet(start: &Path) -> Result<SheetLocation> {
    if let Some(project_path) = find_project_sheet(start) {
        return Ok(SheetLocation {
            path: project_path,
            scope: SheetScope::Project,
        });
    }
    let global_path = global_sheet_path()?;
    Ok(SheetLocation {
        path: global_path,
        scope: SheetScope::Global,
    })
}

#[derive(Debug, Clone)]
pub struct LoadedSheet {
    pub sheet: Sheet,
    pub fault: Option<String>,
}

// Loading never errors: an unreadable store becomes an empty sheet with
// the failure carried alongside for the surface to show.
pub fn load_sheet(store: &dyn TableStore, today: NaiveDate) -> LoadedSheet {
    match store.read_table() {
        Ok(rows) => LoadedSheet {
            sheet: Sheet::new(table::normalize(rows, today)),
            fault: None,
        },
        Err(err) => LoadedSheet {
            sheet: Sheet::default(),
            fault: Some(format!("{err:#}")),
        },
    }
}

pub fn save_sheet(store: &dyn TableStore, sheet: &Sheet) -> Result<()> {
    store
        .write_table(&table::to_rows(sheet.projects()))
        .context("saving sheet")
}

fn find_project_sheet(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        let candidate = current.join(".callsheet/sheet.yml");
        if candidate.exists() {
            return Some(candidate);
        }
        dir = current.parent();
    }
    None
}

fn global_sheet_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "callsheet").context("locating data directory")?;
    Ok(dirs.data_dir().join("sheet.yml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::cell::RefCell;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
    }

    struct BrokenStore;

    impl TableStore for BrokenStore {
        fn read_table(&self) -> Result<Vec<RawRow>> {
            Err(anyhow!("store unreachable"))
        }

        fn write_table(&self, _rows: &[RawRow]) -> Result<()> {
            Err(anyhow!("store unreachable"))
        }
    }

    #[derive(Default)]
    struct MemStore {
        rows: RefCell<Vec<RawRow>>,
        writes: RefCell<usize>,
    }

    impl TableStore for MemStore {
        fn read_table(&self) -> Result<Vec<RawRow>> {
            Ok(self.rows.borrow().clone())
        }

        fn write_table(&self, rows: &[RawRow]) -> Result<()> {
            *self.rows.borrow_mut() = rows.to_vec();
            *self.writes.borrow_mut() += 1;
            Ok(())
        }
    }

    #[test]
    fn unreadable_store_loads_empty_with_fault() {
        let loaded = load_sheet(&BrokenStore, today());
        assert!(loaded.sheet.is_empty());
        assert!(loaded.fault.unwrap().contains("store unreachable"));
    }

    #[test]
    fn readable_store_loads_without_fault() {
        let loaded = load_sheet(&MemStore::default(), today());
        assert!(loaded.sheet.is_empty());
        assert!(loaded.fault.is_none());
    }

    #[test]
    fn save_then_load_round_trips_the_sheet() {
        let store = MemStore::default();
        let mut loaded = load_sheet(&store, today());
        loaded
            .sheet
            .create(crate::model::ProjectDraft {
                year: 2026,
                month: 8,
                name: "Teaser".into(),
                owner: "kim".into(),
                preview_date: "2026-08-20".into(),
                ..Default::default()
            })
            .unwrap();
        save_sheet(&store, &loaded.sheet).unwrap();
        assert_eq!(*store.writes.borrow(), 1);

        let reloaded = load_sheet(&store, today());
        assert_eq!(
            table::to_rows(reloaded.sheet.projects()),
            table::to_rows(loaded.sheet.projects())
        );
    }

    #[test]
    fn yaml_store_round_trips_table_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = YamlStore::new(dir.path().join("sheet.yml"));
        assert!(store.read_table().unwrap().is_empty());

        let mut row = RawRow::new();
        row.insert("name".into(), "Teaser".into());
        row.insert("year".into(), "2026".into());
        store.write_table(&[row]).unwrap();

        let rows = store.read_table().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name").unwrap(), "Teaser");
        assert_eq!(rows[0].get("owner").unwrap(), "");
        assert_eq!(rows[0].len(), COLUMNS.len());
    }

    #[test]
    fn yaml_store_tolerates_short_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.yml");
        fs::write(
            &path,
            "columns:\n- year\n- name\nrows:\n- - '2026'\n",
        )
        .unwrap();
        let rows = YamlStore::new(path).read_table().unwrap();
        assert_eq!(rows[0].get("year").unwrap(), "2026");
        assert!(rows[0].get("name").is_none());
    }
}
