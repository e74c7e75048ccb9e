//! `taskshare` command-line entry point.
//!
//! # Responsibility
//! - Drive the sharing workflows against a SQLite database file.
//! - Print one plain line per result; expected failures exit non-zero with
//!   their user-facing message.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use taskshare_core::db::open_db;
use taskshare_core::{
    default_log_level, init_logging, AccessQueryService, AuthorizationGuard, GrantWorkflow,
    PageRequest, RevocationWorkflow, SqliteStores, SqliteTaskRepository, SqliteUnitOfWork,
    SqliteUserRepository,
};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "taskshare")]
#[command(about = "Share tasks with other users and check access", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite database file
    #[arg(long, global = true, default_value = "taskshare.db")]
    db: PathBuf,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, global = true)]
    log_dir: Option<String>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register a user
    AddUser { email: String },
    /// Create a task owned by a user
    AddTask {
        #[arg(long)]
        owner: Uuid,
        title: String,
    },
    /// Delete a task together with its grants
    DeleteTask {
        #[arg(long)]
        task: Uuid,
    },
    /// Share a task with the user registered under an email
    Share {
        #[arg(long)]
        task: Uuid,
        #[arg(long)]
        owner: Uuid,
        #[arg(long)]
        email: String,
    },
    /// Remove one grant addressed by task and grantee
    Unshare {
        #[arg(long)]
        task: Uuid,
        #[arg(long)]
        grantee: Uuid,
        #[arg(long)]
        requester: Uuid,
    },
    /// Remove one grant addressed by the grantee's email
    UnshareEmail {
        #[arg(long)]
        task: Uuid,
        #[arg(long)]
        owner: Uuid,
        #[arg(long)]
        email: String,
    },
    /// Remove every grant on a task
    UnshareTask {
        #[arg(long)]
        task: Uuid,
        #[arg(long)]
        owner: Uuid,
    },
    /// Remove every grant held by a user
    LeaveAll {
        #[arg(long)]
        user: Uuid,
    },
    /// Report whether a user may act on a task
    Check {
        #[arg(long)]
        task: Uuid,
        #[arg(long)]
        user: Uuid,
    },
    /// List tasks shared with a user
    SharedWith {
        #[arg(long)]
        user: Uuid,
        #[command(flatten)]
        paging: PagingArgs,
    },
    /// List users holding a grant on a task
    Grantees {
        #[arg(long)]
        task: Uuid,
        #[arg(long)]
        owner: Uuid,
        #[command(flatten)]
        paging: PagingArgs,
    },
}

#[derive(clap::Args, Debug, Clone, Copy)]
struct PagingArgs {
    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Items per page (default 10, max 50)
    #[arg(long)]
    page_size: Option<u32>,
}

impl From<PagingArgs> for PageRequest {
    fn from(value: PagingArgs) -> Self {
        PageRequest::new(value.page, value.page_size)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).map_err(anyhow::Error::msg)?;
    }

    let mut conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    info!("event=cli_command module=cli status=start");

    match cli.command {
        Commands::AddUser { email } => {
            let user = SqliteUserRepository::new(&conn).create_user(&email)?;
            println!("user {} {}", user.id, user.email);
        }
        Commands::AddTask { owner, title } => {
            let task = SqliteTaskRepository::new(&conn).create_task(owner, &title)?;
            println!("task {} owner={} {}", task.id, task.owner_id, task.title);
        }
        Commands::DeleteTask { task } => {
            let deleted = SqliteTaskRepository::new(&conn).delete_task(task)?;
            println!("deleted={deleted}");
        }
        Commands::Share { task, owner, email } => {
            let grantee = GrantWorkflow::new(SqliteUnitOfWork::new(&mut conn))
                .create(task, owner, &email)?;
            println!("shared task {task} with {} {}", grantee.id, grantee.email);
        }
        Commands::Unshare {
            task,
            grantee,
            requester,
        } => {
            RevocationWorkflow::new(SqliteUnitOfWork::new(&mut conn))
                .revoke(task, grantee, requester)?;
            println!("revoked");
        }
        Commands::UnshareEmail { task, owner, email } => {
            RevocationWorkflow::new(SqliteUnitOfWork::new(&mut conn))
                .revoke_by_email(task, owner, &email)?;
            println!("revoked");
        }
        Commands::UnshareTask { task, owner } => {
            let removed = RevocationWorkflow::new(SqliteUnitOfWork::new(&mut conn))
                .revoke_all_for_task(task, owner)?;
            println!("revoked {removed}");
        }
        Commands::LeaveAll { user } => {
            let removed = RevocationWorkflow::new(SqliteUnitOfWork::new(&mut conn))
                .revoke_all_for_user(user)?;
            println!("revoked {removed}");
        }
        Commands::Check { task, user } => {
            let allowed =
                AuthorizationGuard::new(SqliteStores::new(&conn)).has_access(task, user)?;
            println!("access={allowed}");
        }
        Commands::SharedWith { user, paging } => {
            let page = AccessQueryService::new(SqliteStores::new(&conn))
                .list_shared_tasks(user, paging.into())?;
            println!(
                "page {} size {} total {}",
                page.page, page.page_size, page.total_count
            );
            for item in page.items {
                println!(
                    "{} owner={} shared_at={} {}",
                    item.task.id, item.task.owner_id, item.shared_at, item.task.title
                );
            }
        }
        Commands::Grantees {
            task,
            owner,
            paging,
        } => {
            let page = AccessQueryService::new(SqliteStores::new(&conn))
                .list_task_grantees(task, owner, paging.into())?;
            println!(
                "page {} size {} total {}",
                page.page, page.page_size, page.total_count
            );
            for grantee in page.items {
                println!("{} {} granted_at={}", grantee.id, grantee.email, grantee.granted_at);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands};
    use clap::{CommandFactory, Parser};
    use uuid::Uuid;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn share_arguments_parse_into_ids() {
        let task = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "taskshare",
            "--db",
            "/tmp/share.db",
            "share",
            "--task",
            &task.to_string(),
            "--owner",
            &owner.to_string(),
            "--email",
            "grantee@x.com",
        ])
        .unwrap();

        match cli.command {
            Commands::Share {
                task: parsed_task,
                owner: parsed_owner,
                email,
            } => {
                assert_eq!(parsed_task, task);
                assert_eq!(parsed_owner, owner);
                assert_eq!(email, "grantee@x.com");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn paging_defaults_to_first_page() {
        let user = Uuid::new_v4();
        let cli = Cli::try_parse_from(["taskshare", "shared-with", "--user", &user.to_string()])
            .unwrap();

        match cli.command {
            Commands::SharedWith { paging, .. } => {
                assert_eq!(paging.page, 1);
                assert_eq!(paging.page_size, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
