use std::sync::Arc;

use clap::{Parser, Subcommand};
use time::macros::format_description;
use time::OffsetDateTime;
use uuid::Uuid;

use duemind::assignments::dto::parse_due_date;
use duemind::assignments::repo_types::Assignment;
use duemind::dashboard::client::{
    AssignmentChanges, AssignmentsApi, ClientError, Dashboard, HttpApi, NewAssignment,
};
use duemind::dashboard::view::{self, Filter};

#[derive(Parser)]
#[command(name = "dashboard")]
#[command(about = "Terminal dashboard for the assignment tracker", long_about = None)]
struct Cli {
    /// Server base URL (falls back to DUEMIND_SERVER)
    #[arg(long)]
    server: Option<String>,

    /// Bearer token from `login` (falls back to DUEMIND_TOKEN)
    #[arg(long)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Log in and print the bearer token
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Show assignments with derived status and an urgency marker
    List {
        /// all, pending, completed or overdue
        #[arg(short, long, default_value = "all")]
        filter: Filter,

        /// Case-insensitive text match on title and description
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Add an assignment
    Add {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        description: Option<String>,

        /// Due date, RFC 3339 or YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
    },

    /// Mark an assignment completed
    Complete { id: Uuid },

    /// Put a completed assignment back to pending
    Reopen { id: Uuid },

    /// Delete an assignment
    Delete { id: Uuid },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let server = cli
        .server
        .or_else(|| std::env::var("DUEMIND_SERVER").ok())
        .unwrap_or_else(|| "http://localhost:8080".into());
    let token = cli.token.or_else(|| std::env::var("DUEMIND_TOKEN").ok());

    let api = match token.as_deref() {
        Some(t) => HttpApi::new(server.as_str()).with_token(t),
        None => HttpApi::new(server.as_str()),
    };

    match cli.command {
        Commands::Register { email, password } => match api.register(&email, &password).await {
            Ok(response) => {
                println!("✅ {} ({})", response.message, response.user.email);
            }
            Err(err) => bail("Registration failed", err),
        },

        Commands::Login { email, password } => match api.login(&email, &password).await {
            Ok(response) => {
                println!("✅ Logged in as {}", response.user.email);
                println!("export DUEMIND_TOKEN={}", response.token);
            }
            Err(err) => bail("Login failed", err),
        },

        Commands::List { filter, search } => {
            let mut dashboard = authed_dashboard(api, &token);
            dashboard.filter = filter;
            dashboard.search = search;
            if let Err(err) = dashboard.refresh().await {
                bail("Failed to fetch assignments", err);
            }

            let now = OffsetDateTime::now_utc();
            print_rows(&dashboard.visible(now), now);

            let stats = dashboard.stats(now);
            println!(
                "\nTotal: {}  Pending: {}  Completed: {}  Overdue: {}",
                stats.total, stats.pending, stats.completed, stats.overdue
            );
        }

        Commands::Add {
            title,
            description,
            due,
        } => {
            let due_date = match due.as_deref().map(parse_due_date).transpose() {
                Ok(parsed) => parsed,
                Err(message) => {
                    eprintln!("❌ {message}");
                    std::process::exit(1);
                }
            };

            let mut dashboard = authed_dashboard(api, &token);
            match dashboard
                .add(NewAssignment {
                    title,
                    description,
                    due_date,
                })
                .await
            {
                Ok(created) => {
                    println!("✅ Added '{}' ({})", created.title, created.id);
                }
                Err(err) => bail("Failed to add assignment", err),
            }
        }

        Commands::Complete { id } => set_completed(api, &token, id, true).await,

        Commands::Reopen { id } => set_completed(api, &token, id, false).await,

        Commands::Delete { id } => {
            let mut dashboard = authed_dashboard(api, &token);
            match dashboard.remove(id).await {
                Ok(()) => println!("✅ Deleted {id}"),
                Err(err) => bail("Failed to delete assignment", err),
            }
        }
    }

    Ok(())
}

fn authed_dashboard(api: HttpApi, token: &Option<String>) -> Dashboard {
    if token.is_none() {
        eprintln!("❌ No token; run `dashboard login` and export DUEMIND_TOKEN");
        std::process::exit(1);
    }
    Dashboard::new(Arc::new(api))
}

/// Completion is set absolutely, so repeating the command is harmless.
async fn set_completed(api: HttpApi, token: &Option<String>, id: Uuid, completed: bool) {
    if token.is_none() {
        eprintln!("❌ No token; run `dashboard login` and export DUEMIND_TOKEN");
        std::process::exit(1);
    }

    let changes = AssignmentChanges {
        is_completed: Some(completed),
        ..AssignmentChanges::default()
    };
    match api.update(id, changes).await {
        Ok(updated) => {
            let verb = if completed { "Completed" } else { "Reopened" };
            println!("✅ {verb} '{}'", updated.title);
        }
        Err(err) => bail("Failed to update assignment", err),
    }
}

fn bail(context: &str, err: ClientError) -> ! {
    eprintln!("❌ {context}: {err}");
    std::process::exit(1);
}

fn print_rows(rows: &[Assignment], now: OffsetDateTime) {
    if rows.is_empty() {
        println!("No assignments found.");
        return;
    }

    println!("{:<36}  {:<11}  {:<16}  {}", "ID", "Status", "Due", "Title");
    println!("{}", "-".repeat(80));
    for assignment in rows {
        let status = view::status_of(assignment, now);
        let marker = if view::is_urgent(assignment, now) {
            " !"
        } else {
            ""
        };
        println!(
            "{:<36}  {:<11}  {:<16}  {}",
            assignment.id,
            format!("{}{marker}", status.label()),
            fmt_due(assignment.due_date),
            assignment.title
        );
    }
}

fn fmt_due(due: Option<OffsetDateTime>) -> String {
    match due {
        Some(ts) => {
            let fmt = format_description!("[year]-[month]-[day] [hour]:[minute]");
            ts.format(&fmt).unwrap_or_else(|_| ts.to_string())
        }
        None => "-".into(),
    }
}
