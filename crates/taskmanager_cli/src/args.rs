use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "taskmanager", version)]
#[command(about = "Manage users, projects and tasks in a local database", long_about = None)]
pub struct Cli {
    /// JSON config file (defaults to ./config.json when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommand,
    },
    /// Manage tasks
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },
    /// Manage projects
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Register a user
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// admin, manager or member
        #[arg(long, default_value = "member")]
        role: String,
    },
    /// List users
    List {
        #[arg(long)]
        role: Option<String>,
    },
    /// Change a user's name, email or role
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        role: Option<String>,
    },
    /// Delete a user no task or project references
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Create a task
    Add(TaskAddArgs),
    /// List tasks matching every given filter
    List {
        /// Assignee email
        #[arg(long)]
        user: Option<String>,
        /// Project id
        #[arg(long)]
        project: Option<i64>,
        /// pending, in_progress or completed
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<i64>,
    },
    /// Change status, assignee or other task fields
    Update(TaskUpdateArgs),
    /// Mark a task completed
    Complete {
        #[arg(long)]
        id: i64,
    },
    /// Delete a task
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// List open tasks past their due date
    Overdue,
    /// List open tasks due within the next days
    Upcoming {
        #[arg(long, default_value_t = 7)]
        days: u32,
    },
}

#[derive(Args, Debug)]
pub struct TaskAddArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub due_date: String,
    /// Lower is more urgent (default 2)
    #[arg(long)]
    pub priority: Option<i64>,
    /// Assignee email
    #[arg(long)]
    pub assigned_to: String,
    /// Project id
    #[arg(long)]
    pub project: i64,
}

#[derive(Args, Debug)]
pub struct TaskUpdateArgs {
    #[arg(long)]
    pub id: i64,
    #[arg(long)]
    pub status: Option<String>,
    /// New assignee email
    #[arg(long)]
    pub assigned_to: Option<String>,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub due_date: Option<String>,
    #[arg(long)]
    pub priority: Option<i64>,
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// Create a project
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        start_date: String,
        /// YYYY-MM-DD
        #[arg(long)]
        end_date: String,
        /// Manager email (role admin or manager)
        #[arg(long)]
        manager: String,
    },
    /// List projects
    List {
        /// active, completed or upcoming
        #[arg(long)]
        state: Option<String>,
    },
    /// Change project fields or extend its end date
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        end_date: Option<String>,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// New manager email
        #[arg(long)]
        manager: Option<String>,
    },
    /// Delete a project no task references
    Delete {
        #[arg(long)]
        id: i64,
    },
}

impl Command {
    /// `<group> <action>` label used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::User { command } => match command {
                UserCommand::Add { .. } => "user add",
                UserCommand::List { .. } => "user list",
                UserCommand::Update { .. } => "user update",
                UserCommand::Delete { .. } => "user delete",
            },
            Self::Task { command } => match command {
                TaskCommand::Add(_) => "task add",
                TaskCommand::List { .. } => "task list",
                TaskCommand::Update(_) => "task update",
                TaskCommand::Complete { .. } => "task complete",
                TaskCommand::Delete { .. } => "task delete",
                TaskCommand::Overdue => "task overdue",
                TaskCommand::Upcoming { .. } => "task upcoming",
            },
            Self::Project { command } => match command {
                ProjectCommand::Add { .. } => "project add",
                ProjectCommand::List { .. } => "project list",
                ProjectCommand::Update { .. } => "project update",
                ProjectCommand::Delete { .. } => "project delete",
            },
        }
    }
}
