mod cli;
mod commands;
mod deadline;
mod model;
mod storage;
mod table;
mod ui;
mod view;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let command = args.command.unwrap_or(cli::Command::Tui);
    match command {
        cli::Command::Init => commands::init(),
        cli::Command::List { year, month, owner } => commands::list(year, month, owner),
        cli::Command::Add(args) => commands::add(args),
        cli::Command::Edit(args) => commands::edit(args),
        cli::Command::Delete { id } => commands::delete(id),
        cli::Command::Tui => commands::tui(),
    }
}
