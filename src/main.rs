//! Ticket Desk - command line front end
//!
//! Connects to Neo4j, loads the ticket list and runs one command against it.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use ticket_desk::events::{DeskEvent, EventBus, ViewChange};
use ticket_desk::neo4j::{ConnectionManager, NewTicket, TicketPriority, TicketStatus};
use ticket_desk::presentation::TicketRow;
use ticket_desk::tickets::{TicketDesk, TicketFilter, TicketRepository};
use ticket_desk::users::{UserDirectory, UserFilter, UserRole, UserStatus};
use ticket_desk::{Config, TicketError};
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ticket-desk")]
#[command(about = "Ticket tracking backed by Neo4j")]
struct Cli {
    /// Path to the YAML config file (default: ./config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the ticket store is reachable
    Check,

    /// List tickets, optionally filtered
    List {
        #[arg(long)]
        status: Option<TicketStatus>,
        #[arg(long)]
        priority: Option<TicketPriority>,
        /// Case-insensitive text to look for
        #[arg(long)]
        search: Option<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the five newest tickets
    Recent,

    /// Show ticket counts by status
    Stats,

    /// Create a ticket
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        category: String,
        #[arg(long, default_value = "Medium")]
        priority: TicketPriority,
        #[arg(long, default_value = "Open")]
        status: TicketStatus,
        #[arg(long, default_value = "")]
        assigned_to: String,
    },

    /// Change fields of an existing ticket
    Update {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        status: Option<TicketStatus>,
        #[arg(long)]
        priority: Option<TicketPriority>,
        #[arg(long)]
        category: Option<String>,
        /// Pass an empty string to unassign
        #[arg(long)]
        assigned_to: Option<String>,
    },

    /// Delete a ticket
    Delete {
        #[arg(long)]
        id: String,
    },

    /// List users
    Users {
        #[arg(long)]
        role: Option<UserRole>,
        #[arg(long)]
        status: Option<UserStatus>,
        #[arg(long)]
        search: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = Config::from_yaml_and_env(cli.config.as_deref())?;

    if let Commands::Users {
        role,
        status,
        search,
    } = &cli.command
    {
        list_users(UserFilter {
            role: *role,
            status: *status,
            search: search.clone(),
        });
        return Ok(());
    }

    let manager = ConnectionManager::install(config.connection_settings());
    if !manager.test_connection().await {
        bail!(
            "Cannot connect to Neo4j at {}. Please check your configuration.",
            config.neo4j.uri
        );
    }
    tracing::info!("Neo4j connected successfully");

    let result = run(manager, &config, cli.command).await;
    manager.close().await;
    result
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,ticket_desk=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(manager: &ConnectionManager, config: &Config, command: Commands) -> Result<()> {
    if let Commands::Check = command {
        println!("Neo4j at {} is reachable", config.neo4j.uri);
        return Ok(());
    }

    let store = manager.store().await?;
    let repo = TicketRepository::new(store, config.query_timeout);
    let bus = EventBus::default();
    let mut events = bus.subscribe();
    let mut desk = TicketDesk::new(repo, Arc::new(bus));

    let loaded = desk.refresh().await;
    report(&mut events);
    let loaded = loaded.context("Failed to load tickets")?;
    tracing::debug!("{} tickets in view", loaded);

    let result = execute(&mut desk, command).await;
    report(&mut events);
    result
}

async fn execute(desk: &mut TicketDesk, command: Commands) -> Result<()> {
    match command {
        Commands::List {
            status,
            priority,
            search,
            json,
        } => {
            let filter = TicketFilter {
                status,
                priority,
                search,
            };
            let rows: Vec<TicketRow> = desk.view().filtered(&filter).map(TicketRow::from).collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print_rows(&rows);
            }
        }
        Commands::Recent => {
            let rows: Vec<TicketRow> = desk.recent().iter().map(TicketRow::from).collect();
            print_rows(&rows);
        }
        Commands::Stats => {
            let stats = desk.stats();
            println!("Total:        {}", stats.total);
            println!("Open:         {}", stats.open);
            println!("In Progress:  {}", stats.in_progress);
            println!("Resolved:     {}", stats.resolved);
            println!("Closed:       {}", stats.closed);
        }
        Commands::Create {
            title,
            category,
            priority,
            status,
            assigned_to,
        } => {
            let ticket = NewTicket::new(title, category)
                .with_priority(priority)
                .with_status(status)
                .assigned_to(assigned_to);
            let created = desk.create(ticket).await?;
            println!("Created ticket {}", created.id);
        }
        Commands::Update {
            id,
            title,
            status,
            priority,
            category,
            assigned_to,
        } => {
            let mut ticket = desk
                .view()
                .get(&id)
                .cloned()
                .ok_or_else(|| TicketError::NotFound(id.clone()))?;
            if let Some(title) = title {
                ticket.title = title;
            }
            if let Some(status) = status {
                ticket.status = status;
            }
            if let Some(priority) = priority {
                ticket.priority = priority;
            }
            if let Some(category) = category {
                ticket.category = category;
            }
            if let Some(assigned_to) = assigned_to {
                ticket.assigned_to = assigned_to;
            }
            let updated = desk.update(ticket).await?;
            println!("Updated ticket {}", updated.id);
        }
        Commands::Delete { id } => {
            if !desk.delete(id.clone()).await? {
                bail!("Failed to delete ticket {}", id);
            }
            println!("Ticket {} deleted", id);
        }
        Commands::Check | Commands::Users { .. } => {}
    }
    Ok(())
}

fn print_rows(rows: &[TicketRow]) {
    if rows.is_empty() {
        println!("No tickets");
        return;
    }
    for row in rows {
        println!("{}", row.to_line());
    }
}

fn list_users(filter: UserFilter) {
    let directory = UserDirectory::with_sample_users();
    for user in directory.filtered(&filter) {
        println!(
            "{:<5} {:<14} {:<22} {:<14} {:<10} {}",
            user.user_id, user.username, user.email, user.role, user.status, user.joined_date
        );
    }
}

/// Surface failure notifications that the desk emitted
fn report(events: &mut broadcast::Receiver<DeskEvent>) {
    while let Ok(event) = events.try_recv() {
        match (event.change, event.error.as_deref()) {
            (ViewChange::Cleared, Some(err)) => {
                eprintln!("Ticket list cleared, reload failed: {}", err)
            }
            (ViewChange::Unchanged, Some(err)) => {
                eprintln!("Nothing changed: {}", err)
            }
            _ => tracing::debug!(action = ?event.action, "Applied"),
        }
    }
}
