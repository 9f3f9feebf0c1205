use clap::{Parser, Subcommand};

use crate::models::JobStatus;

/// JobDeck — terminal client for the JobDeck task-tracking service
#[derive(Parser)]
#[command(name = "jobdeck", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        mobile: Option<String>,
        #[arg(long)]
        password: String,
    },

    /// Sign in and persist the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Sign out and clear the persisted session
    Logout,

    /// Show the signed-in profile
    Whoami,

    /// Manage tasks
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },

    /// Manage the signed-in profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
}

#[derive(Subcommand)]
pub enum JobCommands {
    /// List all tasks, newest first
    List,

    /// Per-status totals
    Summary,

    /// Add a new task
    Add {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Edit a task's title and description
    Edit {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    /// Move a task to another status (todo, in-progress, done)
    Status { id: u64, status: JobStatus },

    /// Delete a task
    Rm {
        id: u64,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show profile fields
    Show,

    /// Update profile fields; omitted flags keep their current value
    Update {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        mobile: Option<String>,
    },

    /// Change the account password
    Passwd {
        #[arg(long)]
        old: String,
        #[arg(long)]
        new: String,
    },
}
