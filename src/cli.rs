use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "callsheet",
    version,
    about = "Terminal production tracker for video projects"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a project-local sheet in the current directory
    Init,
    /// List projects for a year/month, split into active and completed
    List {
        /// Year to show (defaults to the latest on the sheet)
        #[arg(long)]
        year: Option<i32>,
        /// Month to show (defaults to the first month with projects)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
        /// Owner to show, or "all"
        #[arg(long)]
        owner: Option<String>,
    },
    /// Add a new project
    Add(AddArgs),
    /// Edit an existing project
    Edit(EditArgs),
    /// Delete a project
    Delete {
        /// Project id (shown by list)
        id: String,
    },
    /// Launch the interactive TUI
    Tui,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Project name
    pub name: String,
    /// Year (defaults to the latest on the sheet)
    #[arg(long)]
    pub year: Option<i32>,
    /// Month 1-12 (defaults to the first month with projects)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,
    /// Free-text description
    #[arg(long)]
    pub description: Option<String>,
    /// Initial status (planning, shooting, cut-edit, graphics, sound,
    /// revision, screening, done, on-hold)
    #[arg(long)]
    pub status: Option<String>,
    /// Owner name (empty means unassigned)
    #[arg(long)]
    pub owner: Option<String>,
    /// Preview/screening date (YYYY-MM-DD)
    #[arg(long)]
    pub preview: Option<String>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Project id (shown by list)
    pub id: String,
    /// New name
    #[arg(long)]
    pub name: Option<String>,
    /// New year
    #[arg(long)]
    pub year: Option<i32>,
    /// New month 1-12
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,
    /// New description
    #[arg(long)]
    pub description: Option<String>,
    /// New status
    #[arg(long)]
    pub status: Option<String>,
    /// New owner
    #[arg(long)]
    pub owner: Option<String>,
    /// Set the preview date (YYYY-MM-DD)
    #[arg(long)]
    pub preview: Option<String>,
    /// Clear the preview date
    #[arg(long)]
    pub clear_preview: bool,
    /// Planning stage note
    #[arg(long)]
    pub planning: Option<String>,
    /// Shooting stage note
    #[arg(long)]
    pub shooting: Option<String>,
    /// Editing stage note
    #[arg(long)]
    pub editing: Option<String>,
    /// Design stage note
    #[arg(long)]
    pub design: Option<String>,
    /// CG stage note
    #[arg(long)]
    pub cg: Option<String>,
    /// Color-grade stage note
    #[arg(long)]
    pub color_grade: Option<String>,
    /// Sound stage note
    #[arg(long)]
    pub sound: Option<String>,
    /// Music stage note
    #[arg(long)]
    pub music: Option<String>,
}
