use clap::{Arg, Command};
use color_eyre::Result;
use std::sync::Arc;

mod adapters;
mod application;
mod domain;
mod ports;

use adapters::{
    api::{ApiClient, HttpBoardRepository},
    config::FileConfigStore,
    tui::{run_tui, App},
};
use application::Board;
use domain::Filter;
use ports::{BoardRepository, ConfigStore};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // Log to a file; stdout belongs to the TUI.
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("todo-board.log")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let matches = Command::new("todo-board")
        .version("0.1.0")
        .about("A terminal client for the todo-list service")
        .long_about(
            "A keyboard-driven terminal interface for a todo-list service.\n\n\
             Compose tasks with a deadline and assignee, toggle completion,\n\
             move tasks to and from the trash, and empty the trash.",
        )
        .arg(
            Arg::new("server")
                .long("server")
                .value_name("URL")
                .help(
                    "Backend base URL, saved to the config file as the new default \
                     (can also be set via TODO_SERVER env var)",
                )
                .global(true),
        )
        .subcommand(
            Command::new("tasks").about("Task operations").subcommand(
                Command::new("list").about("List tasks as JSON").arg(
                    Arg::new("filter")
                        .long("filter")
                        .value_name("FILTER")
                        .help("View mode: all, uncompleted, completed or trashed")
                        .default_value("all"),
                ),
            ),
        )
        .subcommand(
            Command::new("users")
                .about("User operations")
                .subcommand(Command::new("list").about("List assignable users as JSON")),
        )
        .get_matches();

    // Load configuration; flag wins over env var wins over file.
    let config_store = Arc::new(FileConfigStore::new()?);
    let mut config = config_store.load_config().await?;

    if let Some(server) = matches.get_one::<String>("server") {
        config.server_url = server.clone();
    } else if let Ok(server) = std::env::var("TODO_SERVER") {
        config.server_url = server;
    }

    config_store.save_config(&config).await?;

    let api_client = ApiClient::new(config.server_url.clone());
    let repo = Arc::new(HttpBoardRepository::new(api_client));

    match matches.subcommand() {
        Some(("tasks", tasks_matches)) => match tasks_matches.subcommand() {
            Some(("list", list_matches)) => {
                let filter: Filter = list_matches
                    .get_one::<String>("filter")
                    .map(String::as_str)
                    .unwrap_or("all")
                    .parse()
                    .map_err(color_eyre::eyre::Report::msg)?;

                match repo.list_tasks(filter).await {
                    Ok(tasks) => {
                        let json = serde_json::to_string_pretty(&tasks)?;
                        println!("{json}");
                    }
                    Err(e) => {
                        eprintln!("Failed to list tasks: {e}");
                        std::process::exit(1);
                    }
                }
            }
            _ => {
                eprintln!("Unknown tasks subcommand");
                std::process::exit(1);
            }
        },
        Some(("users", users_matches)) => match users_matches.subcommand() {
            Some(("list", _)) => match repo.list_users().await {
                Ok(users) => {
                    let json = serde_json::to_string_pretty(&users)?;
                    println!("{json}");
                }
                Err(e) => {
                    eprintln!("Failed to list users: {e}");
                    std::process::exit(1);
                }
            },
            _ => {
                eprintln!("Unknown users subcommand");
                std::process::exit(1);
            }
        },
        None => {
            let board = Board::new(repo);
            let app = App::new(board, config.page_size);

            if let Err(e) = run_tui(app).await {
                eprintln!("Application error: {e}");
                std::process::exit(1);
            }
        }
        _ => {
            eprintln!("Unknown command");
            std::process::exit(1);
        }
    }

    Ok(())
}
