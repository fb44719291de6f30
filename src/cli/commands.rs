use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dg", about = concat!("dayglow v", env!("CARGO_PKG_VERSION"), " - your tasks, by day and by night"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory
    #[arg(short = 'D', long = "data-dir", global = true)]
    pub data_dir: Option<String>,

    /// Read configuration from this file
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a task to the top of the list
    Add(AddArgs),
    /// List tasks
    List(ListArgs),
    /// Mark a task done, or not done again
    Toggle(IdArgs),
    /// Change a task's text and description
    Edit(EditArgs),
    /// Delete a task
    #[command(alias = "delete")]
    Rm(IdArgs),
    /// Show the time, date and day/night greeting
    Clock,
    /// View or clear the recovery log
    Recovery(RecoveryArgs),
}

#[derive(Args)]
pub struct AddArgs {
    /// Task text
    pub text: String,
    /// Optional longer description
    #[arg(short, long, default_value = "")]
    pub description: String,
}

#[derive(Args)]
pub struct ListArgs {
    /// Which tasks to show (all, active, done)
    #[arg(long, default_value = "all")]
    pub filter: String,
}

#[derive(Args)]
pub struct IdArgs {
    /// Task ID
    pub id: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID
    pub id: String,
    /// New text
    pub text: String,
    /// New description (default: keep the current one)
    #[arg(short, long)]
    pub description: Option<String>,
}

#[derive(Args)]
pub struct RecoveryArgs {
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
    /// Remove all entries
    #[arg(long)]
    pub clear: bool,
}
