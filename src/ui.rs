use crate::deadline::{self, Countdown};
use crate::model::{ColorTag, Project, ProjectDraft, ProjectId, Sheet, Stages, Status};
use crate::storage::{self, LoadedSheet, SheetLocation, SheetScope, YamlStore};
use crate::view::{self, OwnerFilter, Selection};
use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};

pub fn run(loaded: LoadedSheet, store: YamlStore, location: SheetLocation) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(loaded, store, location);
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result
}

struct App {
    sheet: Sheet,
    store: YamlStore,
    location: SheetLocation,
    selection: Selection,
    tab: Tab,
    selected: usize,
    offset: usize,
    last_save: Option<Instant>,
    status: String,
    mode: Mode,
    today: NaiveDate,
    write_blocked: bool,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Tab {
    Active,
    Completed,
}

impl Tab {
    fn label(self) -> &'static str {
        match self {
            Tab::Active => "Active",
            Tab::Completed => "Completed",
        }
    }
}

enum Mode {
    Normal,
    Creating(ProjectForm),
    Editing { id: ProjectId, form: ProjectForm },
    ConfirmDelete { id: ProjectId },
}

impl App {
    fn new(loaded: LoadedSheet, store: YamlStore, location: SheetLocation) -> Self {
        let today = Local::now().date_naive();
        let selection = Selection::default_for(&loaded.sheet, today);
        let write_blocked = loaded.fault.is_some();
        let status = match &loaded.fault {
            Some(fault) => format!("Could not read sheet ({fault}); press r to retry"),
            None => format!(
                "Loaded {} project(s) from {}",
                loaded.sheet.len(),
                location.path.display()
            ),
        };
        App {
            sheet: loaded.sheet,
            store,
            location,
            selection,
            tab: Tab::Active,
            selected: 0,
            offset: 0,
            last_save: None,
            status,
            mode: Mode::Normal,
            today,
            write_blocked,
        }
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;
            if event::poll(Duration::from_millis(200))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key) {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Creating(_) | Mode::Editing { .. } => {
                self.handle_form_key(key);
                false
            }
            Mode::ConfirmDelete { .. } => {
                self.handle_confirm_key(key);
                false
            }
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('1') => self.set_tab(Tab::Active),
            KeyCode::Char('2') => self.set_tab(Tab::Completed),
            KeyCode::Tab => self.set_tab(match self.tab {
                Tab::Active => Tab::Completed,
                Tab::Completed => Tab::Active,
            }),
            KeyCode::Up | KeyCode::Char('k') => {
                if self.selected > 0 {
                    self.selected -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.visible_ids().len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char('y') => self.cycle_year(1),
            KeyCode::Char('Y') => self.cycle_year(-1),
            KeyCode::Char('m') => self.cycle_month(1),
            KeyCode::Char('M') => self.cycle_month(-1),
            KeyCode::Char('o') => self.cycle_owner(1),
            KeyCode::Char('O') => self.cycle_owner(-1),
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('w') => {
                if self.writes_allowed() {
                    self.persist("Saved");
                }
            }
            KeyCode::Char('n') => {
                if self.writes_allowed() {
                    self.mode = Mode::Creating(ProjectForm::new(&self.selection));
                    self.status =
                        "Creating project (Tab moves, Enter saves, Esc cancels)".into();
                }
            }
            KeyCode::Char('e') => {
                if !self.writes_allowed() {
                    return false;
                }
                match self.current_project() {
                    Some(project) => {
                        let id = project.id.clone();
                        let form = ProjectForm::from_project(project);
                        self.mode = Mode::Editing { id: id.clone(), form };
                        self.status = format!("Editing {id}");
                    }
                    None => self.status = "No project selected to edit".into(),
                }
            }
            KeyCode::Char('d') => {
                if !self.writes_allowed() {
                    return false;
                }
                match self.current_project() {
                    Some(project) => {
                        let id = project.id.clone();
                        self.status =
                            format!("Delete {id}? (y to confirm, n/Esc to cancel)");
                        self.mode = Mode::ConfirmDelete { id };
                    }
                    None => self.status = "No project selected to delete".into(),
                }
            }
            _ => {}
        }
        self.ensure_bounds();
        false
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let mut close_form = false;
        let mut mode = std::mem::replace(&mut self.mode, Mode::Normal);
        match &mut mode {
            Mode::Creating(form) => {
                close_form = self.process_form_key(None, form, key);
            }
            Mode::Editing { id, form } => {
                let id = id.clone();
                close_form = self.process_form_key(Some(id), form, key);
            }
            _ => {}
        }
        self.mode = if close_form { Mode::Normal } else { mode };
    }

    fn process_form_key(
        &mut self,
        edit_id: Option<ProjectId>,
        form: &mut ProjectForm,
        key: KeyEvent,
    ) -> bool {
        match key.code {
            KeyCode::Esc => {
                self.status = "Canceled".into();
                return true;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Left => form.active_field_mut().move_left(),
            KeyCode::Right => form.active_field_mut().move_right(),
            KeyCode::Backspace => form.active_field_mut().backspace(),
            KeyCode::Enter => {
                let submitted = match edit_id {
                    None => self.create_from_form(form),
                    Some(id) => self.edit_from_form(&id, form),
                };
                match submitted {
                    Ok(message) => {
                        self.persist(message);
                        return true;
                    }
                    Err(err) => {
                        self.status = format!("Could not save: {err}");
                        return false;
                    }
                }
            }
            KeyCode::Char(c) => {
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                {
                    form.active_field_mut().insert_char(c);
                }
            }
            _ => {}
        }
        false
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        let id = match &self.mode {
            Mode::ConfirmDelete { id } => id.clone(),
            _ => return,
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                match self.sheet.delete(&id) {
                    Ok(removed) => self.persist(format!("Deleted {} ({})", id, removed.name)),
                    Err(err) => self.status = format!("Delete failed: {err}"),
                }
                self.mode = Mode::Normal;
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.status = "Delete canceled".into();
                self.mode = Mode::Normal;
            }
            _ => {}
        }
        self.ensure_bounds();
    }

    fn set_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            self.tab = tab;
            self.selected = 0;
            self.offset = 0;
        }
    }

    fn cycle_year(&mut self, delta: isize) {
        let options = view::year_options(&self.sheet, self.today);
        self.selection.year = cycle(&options, &self.selection.year, delta);
        let months = view::month_options(&self.sheet, self.selection.year, self.today);
        if !months.contains(&self.selection.month) {
            self.selection.month = months[0];
        }
        self.selected = 0;
        self.status = format!("Showing {}-{:02}", self.selection.year, self.selection.month);
    }

    fn cycle_month(&mut self, delta: isize) {
        let options = view::month_options(&self.sheet, self.selection.year, self.today);
        self.selection.month = cycle(&options, &self.selection.month, delta);
        self.selected = 0;
        self.status = format!("Showing {}-{:02}", self.selection.year, self.selection.month);
    }

    fn cycle_owner(&mut self, delta: isize) {
        let mut options = vec![OwnerFilter::All];
        options.extend(
            view::owner_options(&self.sheet)
                .into_iter()
                .map(OwnerFilter::Name),
        );
        self.selection.owner = cycle(&options, &self.selection.owner, delta);
        self.selected = 0;
        self.status = format!("Owner filter: {}", self.selection.owner.label());
    }

    fn reload(&mut self) {
        self.today = Local::now().date_naive();
        let loaded = storage::load_sheet(&self.store, self.today);
        self.write_blocked = loaded.fault.is_some();
        self.sheet = loaded.sheet;
        self.status = match loaded.fault {
            Some(fault) => format!("Reload failed ({fault}); press r to retry"),
            None => format!("Reloaded {} project(s)", self.sheet.len()),
        };
        self.ensure_bounds();
    }

    fn writes_allowed(&mut self) -> bool {
        if self.write_blocked {
            self.status = "Sheet could not be read; press r to reload before editing".into();
            return false;
        }
        true
    }

    fn create_from_form(&mut self, form: &ProjectForm) -> Result<String> {
        let parsed = form.parse()?;
        let id = self.sheet.create(parsed.draft)?;
        if parsed.stages != Stages::default() {
            let stages = parsed.stages;
            self.sheet.update(&id, |p| p.stages = stages.clone())?;
        }
        Ok(format!("Created {id}"))
    }

    fn edit_from_form(&mut self, id: &str, form: &ProjectForm) -> Result<String> {
        let parsed = form.parse()?;
        let draft = parsed.draft;
        let stages = parsed.stages;
        self.sheet.update(id, |p| {
            p.year = draft.year;
            p.month = draft.month;
            p.name = draft.name.trim().to_string();
            p.description = draft.description.clone();
            p.status = draft.status;
            p.owner = draft.owner.clone();
            p.preview_date = draft.preview_date.clone();
            p.stages = stages.clone();
        })?;
        Ok(format!("Updated {id}"))
    }

    // Save failures stay on the status line; the edited sheet is kept so
    // the next successful save carries it.
    fn persist(&mut self, message: impl Into<String>) {
        match storage::save_sheet(&self.store, &self.sheet) {
            Ok(()) => {
                self.last_save = Some(Instant::now());
                self.status = message.into();
            }
            Err(err) => {
                self.status = format!("Save failed: {err:#}; changes kept in memory");
            }
        }
        self.ensure_bounds();
    }

    fn visible_ids(&self) -> Vec<ProjectId> {
        let scoped = view::scoped(&self.sheet, &self.selection);
        let list = match self.tab {
            Tab::Active => scoped.active,
            Tab::Completed => scoped.completed,
        };
        list.into_iter().map(|p| p.id.clone()).collect()
    }

    fn current_project(&self) -> Option<&Project> {
        let ids = self.visible_ids();
        let id = ids.get(self.selected)?;
        self.sheet.get(id)
    }

    fn ensure_bounds(&mut self) {
        let len = self.visible_ids().len();
        if len == 0 {
            self.selected = 0;
            self.offset = 0;
        } else {
            self.selected = self.selected.min(len - 1);
            self.offset = self.offset.min(len - 1);
        }
    }

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(8),
                Constraint::Length(4),
            ])
            .split(f.size());

        self.draw_header(f, layout[0]);
        self.draw_tabs(f, layout[1]);
        self.draw_main(f, layout[2]);
        self.draw_footer(f, layout[3]);

        match &self.mode {
            Mode::Creating(form) => self.draw_form(f, "New Project", form),
            Mode::Editing { form, .. } => self.draw_form(f, "Edit Project", form),
            Mode::ConfirmDelete { id } => self.draw_confirm(f, id),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let scope = match self.location.scope {
            SheetScope::Project => "project",
            SheetScope::Global => "global",
        };
        let saved = match self.last_save {
            Some(last) => format!("saved {}", format_elapsed(last)),
            None => "no saves yet".to_string(),
        };
        let title = Line::from(vec![
            Span::styled(
                "callsheet ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("{}-{:02}", self.selection.year, self.selection.month),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  |  "),
            Span::styled(
                format!("owner {}", self.selection.owner.label()),
                Style::default().fg(Color::Magenta),
            ),
            Span::raw("  |  "),
            Span::styled(scope, Style::default().fg(Color::Green)),
            Span::raw("  |  "),
            Span::styled(
                format!("{}", self.location.path.display()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw("  |  "),
            Span::styled(saved, Style::default().fg(Color::Gray)),
        ]);
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(title)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_tabs(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let scoped = view::scoped(&self.sheet, &self.selection);
        let mut spans = Vec::new();
        for (tab, count) in [
            (Tab::Active, scoped.active.len()),
            (Tab::Completed, scoped.completed.len()),
        ] {
            let style = if tab == self.tab {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(format!("{} ({})", tab.label(), count), style));
            spans.push(Span::raw("   "));
        }
        if self.write_blocked {
            spans.push(Span::styled(
                "read failed, press r",
                Style::default().fg(Color::LightRed),
            ));
        }
        f.render_widget(Paragraph::new(Line::from(spans)).alignment(Alignment::Center), area);
    }

    fn draw_main(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(area);
        self.draw_list(f, chunks[0]);
        self.draw_detail(f, chunks[1]);
    }

    fn draw_list(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let scoped = view::scoped(&self.sheet, &self.selection);
        let projects = match self.tab {
            Tab::Active => &scoped.active,
            Tab::Completed => &scoped.completed,
        };
        let items: Vec<ListItem<'static>> = if projects.is_empty() {
            vec![ListItem::new("No projects for this selection")]
        } else {
            projects
                .iter()
                .map(|&p| project_item(p, deadline::countdown(p, self.today)))
                .collect()
        };

        let mut state = ListState::default();
        let viewport = area.height.saturating_sub(2) as usize;
        if !projects.is_empty() {
            let selected = self.selected.min(projects.len() - 1);
            self.offset = adjust_offset(selected, self.offset, viewport, 1, projects.len());
            state.select(Some(selected));
            *state.offset_mut() = self.offset;
        }

        let block = Block::default()
            .title(Span::styled(
                format!("{} projects", self.tab.label()),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .bg(Color::LightCyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        );
        f.render_stateful_widget(list, area, &mut state);
    }

    fn draw_detail(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let lines = match self.current_project() {
            Some(project) => self.detail_lines(project),
            None => vec![Line::from("No project selected")],
        };
        let block = Block::default()
            .title(Span::styled(
                "Detail",
                Style::default()
                    .fg(Color::Gray)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true }).block(block);
        f.render_widget(paragraph, area);
    }

    fn detail_lines(&self, project: &Project) -> Vec<Line<'static>> {
        let countdown = deadline::countdown(project, self.today);
        let mut lines = vec![Line::from(vec![
            Span::styled(
                project.name.clone(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format!("[{}]", project.status),
                Style::default().fg(status_color(project.status)),
            ),
        ])];
        lines.push(Line::from(format!(
            "{}-{:02}  owner: {}",
            project.year,
            project.month,
            if project.owner.is_empty() {
                "(unassigned)"
            } else {
                project.owner.as_str()
            }
        )));
        if !project.preview_date.is_empty() {
            let mut spans = vec![Span::raw(format!("preview {}", project.preview_date))];
            if !countdown.label.is_empty() {
                spans.push(Span::raw("  "));
                spans.push(Span::styled(
                    countdown.label.clone(),
                    if countdown.urgent {
                        Style::default()
                            .fg(Color::LightRed)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(Color::LightYellow)
                    },
                ));
            }
            lines.push(Line::from(spans));
        }
        if !project.description.is_empty() {
            lines.push(Line::from(Span::styled(
                project.description.clone(),
                Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
            )));
        }
        lines.push(Line::from(""));
        let mut any_stage = false;
        for (stage, note) in project.stages.fields() {
            if note.is_empty() {
                continue;
            }
            any_stage = true;
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{stage:<12}"),
                    Style::default().fg(Color::LightMagenta),
                ),
                Span::raw(note.to_string()),
            ]));
        }
        if !any_stage {
            lines.push(Line::from(Span::styled(
                "(no stage notes)",
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(2)])
            .split(area);

        let help = Line::from(vec![
            Span::styled("j/k", Style::default().fg(Color::Cyan)),
            Span::raw(" select  "),
            Span::styled("Tab/1/2", Style::default().fg(Color::Cyan)),
            Span::raw(" active/completed  "),
            Span::styled("y/m/o", Style::default().fg(Color::Cyan)),
            Span::raw(" filters  "),
            Span::styled("n", Style::default().fg(Color::Cyan)),
            Span::raw(" new  "),
            Span::styled("e", Style::default().fg(Color::Cyan)),
            Span::raw(" edit  "),
            Span::styled("d", Style::default().fg(Color::Cyan)),
            Span::raw(" delete  "),
            Span::styled("r", Style::default().fg(Color::Cyan)),
            Span::raw(" reload  "),
            Span::styled("w", Style::default().fg(Color::Cyan)),
            Span::raw(" save  "),
            Span::styled("q", Style::default().fg(Color::Cyan)),
            Span::raw(" quit"),
        ]);
        let help_bar = Paragraph::new(help).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        f.render_widget(help_bar, rows[0]);

        let status = Paragraph::new(self.status.clone())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(status, rows[1]);
    }

    fn draw_form(&self, f: &mut ratatui::Frame<'_>, title: &str, form: &ProjectForm) {
        let area = centered_rect(72, 86, f.size());
        let mut lines = Vec::new();
        for (label, value, field) in form.fields() {
            lines.push(field_line(label, value, field == form.field));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter saves  Esc cancels  Tab/Shift-Tab move  status: planning shooting cut-edit graphics sound revision screening done on-hold",
            Style::default().fg(Color::Gray),
        )));
        let dialog = Paragraph::new(lines)
            .block(
                Block::default()
                    .title(Span::styled(
                        title.to_string(),
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }

    fn draw_confirm(&self, f: &mut ratatui::Frame<'_>, id: &str) {
        let area = centered_rect(50, 30, f.size());
        let name = self
            .sheet
            .get(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.to_string());
        let body = vec![
            Line::from(Span::styled(
                format!("Delete \"{}\"?", name),
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Press y to confirm, n or Esc to cancel"),
        ];
        let dialog = Paragraph::new(body).alignment(Alignment::Center).block(
            Block::default()
                .title(Span::styled(
                    "Confirm Delete",
                    Style::default()
                        .fg(Color::LightRed)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::LightRed)),
        );
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }
}

struct ProjectForm {
    name: FieldValue,
    year: FieldValue,
    month: FieldValue,
    owner: FieldValue,
    status: FieldValue,
    preview: FieldValue,
    description: FieldValue,
    planning: FieldValue,
    shooting: FieldValue,
    editing: FieldValue,
    design: FieldValue,
    cg: FieldValue,
    color_grade: FieldValue,
    sound: FieldValue,
    music: FieldValue,
    field: FormField,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum FormField {
    Name,
    Year,
    Month,
    Owner,
    Status,
    Preview,
    Description,
    Planning,
    Shooting,
    Editing,
    Design,
    Cg,
    ColorGrade,
    Sound,
    Music,
}

const FIELD_ORDER: [FormField; 15] = [
    FormField::Name,
    FormField::Year,
    FormField::Month,
    FormField::Owner,
    FormField::Status,
    FormField::Preview,
    FormField::Description,
    FormField::Planning,
    FormField::Shooting,
    FormField::Editing,
    FormField::Design,
    FormField::Cg,
    FormField::ColorGrade,
    FormField::Sound,
    FormField::Music,
];

struct ParsedForm {
    draft: ProjectDraft,
    stages: Stages,
}

impl ProjectForm {
    fn new(selection: &Selection) -> Self {
        let owner = match &selection.owner {
            OwnerFilter::All => String::new(),
            OwnerFilter::Name(name) => name.clone(),
        };
        ProjectForm {
            name: FieldValue::new(""),
            year: FieldValue::new(&selection.year.to_string()),
            month: FieldValue::new(&selection.month.to_string()),
            owner: FieldValue::new(&owner),
            status: FieldValue::new(Status::default().label()),
            preview: FieldValue::new(""),
            description: FieldValue::new(""),
            planning: FieldValue::new(""),
            shooting: FieldValue::new(""),
            editing: FieldValue::new(""),
            design: FieldValue::new(""),
            cg: FieldValue::new(""),
            color_grade: FieldValue::new(""),
            sound: FieldValue::new(""),
            music: FieldValue::new(""),
            field: FormField::Name,
        }
    }

    fn from_project(project: &Project) -> Self {
        ProjectForm {
            name: FieldValue::new(&project.name),
            year: FieldValue::new(&project.year.to_string()),
            month: FieldValue::new(&project.month.to_string()),
            owner: FieldValue::new(&project.owner),
            status: FieldValue::new(project.status.label()),
            preview: FieldValue::new(&project.preview_date),
            description: FieldValue::new(&project.description),
            planning: FieldValue::new(&project.stages.planning),
            shooting: FieldValue::new(&project.stages.shooting),
            editing: FieldValue::new(&project.stages.editing),
            design: FieldValue::new(&project.stages.design),
            cg: FieldValue::new(&project.stages.cg),
            color_grade: FieldValue::new(&project.stages.color_grade),
            sound: FieldValue::new(&project.stages.sound),
            music: FieldValue::new(&project.stages.music),
            field: FormField::Name,
        }
    }

    fn fields(&self) -> [(&'static str, &FieldValue, FormField); 15] {
        [
            ("Name", &self.name, FormField::Name),
            ("Year", &self.year, FormField::Year),
            ("Month", &self.month, FormField::Month),
            ("Owner", &self.owner, FormField::Owner),
            ("Status", &self.status, FormField::Status),
            ("Preview (YYYY-MM-DD)", &self.preview, FormField::Preview),
            ("Description", &self.description, FormField::Description),
            ("Planning", &self.planning, FormField::Planning),
            ("Shooting", &self.shooting, FormField::Shooting),
            ("Editing", &self.editing, FormField::Editing),
            ("Design", &self.design, FormField::Design),
            ("CG", &self.cg, FormField::Cg),
            ("Color grade", &self.color_grade, FormField::ColorGrade),
            ("Sound", &self.sound, FormField::Sound),
            ("Music", &self.music, FormField::Music),
        ]
    }

    fn next_field(&mut self) {
        let idx = FIELD_ORDER.iter().position(|f| *f == self.field).unwrap_or(0);
        self.field = FIELD_ORDER[(idx + 1) % FIELD_ORDER.len()];
    }

    fn prev_field(&mut self) {
        let idx = FIELD_ORDER.iter().position(|f| *f == self.field).unwrap_or(0);
        self.field = FIELD_ORDER[(idx + FIELD_ORDER.len() - 1) % FIELD_ORDER.len()];
    }

    fn active_field_mut(&mut self) -> &mut FieldValue {
        match self.field {
            FormField::Name => &mut self.name,
            FormField::Year => &mut self.year,
            FormField::Month => &mut self.month,
            FormField::Owner => &mut self.owner,
            FormField::Status => &mut self.status,
            FormField::Preview => &mut self.preview,
            FormField::Description => &mut self.description,
            FormField::Planning => &mut self.planning,
            FormField::Shooting => &mut self.shooting,
            FormField::Editing => &mut self.editing,
            FormField::Design => &mut self.design,
            FormField::Cg => &mut self.cg,
            FormField::ColorGrade => &mut self.color_grade,
            FormField::Sound => &mut self.sound,
            FormField::Music => &mut self.music,
        }
    }

    fn parse(&self) -> Result<ParsedForm> {
        if self.name.value.trim().is_empty() {
            return Err(anyhow!("name is required"));
        }
        let year = self
            .year
            .value
            .trim()
            .parse::<i32>()
            .map_err(|_| anyhow!("year must be a number"))?;
        let month = self
            .month
            .value
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|m| (1..=12).contains(m))
            .ok_or_else(|| anyhow!("month must be 1-12"))?;
        let status = Status::parse(&self.status.value)
            .ok_or_else(|| anyhow!("unknown status: {}", self.status.value.trim()))?;
        let preview = self.preview.value.trim();
        let preview_date = if preview.is_empty() {
            String::new()
        } else {
            NaiveDate::parse_from_str(preview, "%Y-%m-%d")
                .map(|d| d.format("%Y-%m-%d").to_string())
                .map_err(|_| anyhow!("preview date must be YYYY-MM-DD"))?
        };
        Ok(ParsedForm {
            draft: ProjectDraft {
                year,
                month,
                name: self.name.value.clone(),
                description: self.description.value.clone(),
                status,
                owner: self.owner.value.trim().to_string(),
                preview_date,
            },
            stages: Stages {
                planning: self.planning.value.clone(),
                shooting: self.shooting.value.clone(),
                editing: self.editing.value.clone(),
                design: self.design.value.clone(),
                cg: self.cg.value.clone(),
                color_grade: self.color_grade.value.clone(),
                sound: self.sound.value.clone(),
                music: self.music.value.clone(),
            },
        })
    }
}

#[derive(Clone)]
struct FieldValue {
    value: String,
    cursor: usize,
}

impl FieldValue {
    fn new(value: &str) -> Self {
        FieldValue {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    fn move_left(&mut self) {
        if let Some(ch) = self.value[..self.cursor].chars().next_back() {
            self.cursor -= ch.len_utf8();
        }
    }

    fn move_right(&mut self) {
        if let Some(ch) = self.value[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }

    fn backspace(&mut self) {
        if let Some(ch) = self.value[..self.cursor].chars().next_back() {
            let start = self.cursor - ch.len_utf8();
            self.value.drain(start..self.cursor);
            self.cursor = start;
        }
    }

    fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert_str(self.cursor, "▌");
        text
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}

fn cycle<T: PartialEq + Clone>(options: &[T], current: &T, delta: isize) -> T {
    if options.is_empty() {
        return current.clone();
    }
    let len = options.len() as isize;
    let idx = options.iter().position(|o| o == current).unwrap_or(0) as isize;
    let next = ((idx + delta) % len + len) % len;
    options[next as usize].clone()
}

fn adjust_offset(
    selected: usize,
    current_offset: usize,
    viewport: usize,
    scrolloff: usize,
    len: usize,
) -> usize {
    if viewport == 0 || len == 0 {
        return 0;
    }
    let max_offset = len.saturating_sub(viewport);
    let margin = scrolloff.min(viewport.saturating_sub(1));
    let mut offset = current_offset.min(max_offset);
    if selected < offset.saturating_add(margin) {
        offset = selected.saturating_sub(margin);
    } else {
        let upper = offset
            .saturating_add(viewport.saturating_sub(1))
            .saturating_sub(margin);
        if selected > upper {
            offset = selected.saturating_add(margin + 1).saturating_sub(viewport);
        }
    }
    offset.min(max_offset)
}

fn status_color(status: Status) -> Color {
    match status.color() {
        ColorTag::Blue => Color::Blue,
        ColorTag::Red => Color::Red,
        ColorTag::Orange => Color::Yellow,
        ColorTag::Violet => Color::Magenta,
        ColorTag::Green => Color::Green,
        ColorTag::Grey => Color::DarkGray,
    }
}

fn project_item(project: &Project, countdown: Countdown) -> ListItem<'static> {
    let mut spans = Vec::new();
    spans.push(Span::styled(
        format!("[{}]", project.id),
        Style::default().fg(Color::DarkGray),
    ));
    spans.push(Span::raw(" "));
    spans.push(Span::styled(
        format!("[{}]", project.status),
        Style::default().fg(status_color(project.status)),
    ));
    spans.push(Span::raw(" "));
    spans.push(Span::styled(
        truncate_text(&project.name, 40),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ));
    if !project.owner.is_empty() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            project.owner.clone(),
            Style::default().fg(Color::LightMagenta),
        ));
    }
    if !countdown.label.is_empty() {
        spans.push(Span::raw("  "));
        if countdown.urgent {
            spans.push(Span::styled(
                format!("!! {}", countdown.label),
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(
                countdown.label.clone(),
                Style::default().fg(Color::LightYellow),
            ));
        }
    }
    ListItem::new(Line::from(spans)).style(Style::default().fg(Color::Gray))
}

fn field_line(label: &str, field: &FieldValue, active: bool) -> Line<'static> {
    let label_style = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::BOLD | Modifier::DIM);
    let value_style = Style::default().fg(if active { Color::Cyan } else { Color::White });
    let text = if active {
        field.with_caret()
    } else {
        field.value.clone()
    };
    Line::from(vec![
        Span::styled(format!("{label:<22}"), label_style),
        Span::styled(text, value_style),
    ])
}

fn truncate_text(text: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    for ch in text.chars() {
        if out.chars().count() >= max.saturating_sub(3) {
            out.push_str("...");
            break;
        }
        out.push(ch);
    }
    if out.chars().count() > max {
        out.truncate(max);
    }
    out
}

fn format_elapsed(last: Instant) -> String {
    let secs = last.elapsed().as_secs();
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}
