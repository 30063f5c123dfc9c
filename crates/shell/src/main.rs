//! `cinedex` -- interactive terminal client for a remote catalog service.
//!
//! Wires the session store, HTTP clients, and list controller together and
//! drives them from line-oriented commands. On session invalidation the
//! shell drops back to the unauthenticated prompt.
//!
//! # Environment variables
//!
//! | Variable       | Required | Default                     | Description             |
//! |----------------|----------|-----------------------------|-------------------------|
//! | `API_BASE_URL` | no       | `http://localhost:8080/api` | Remote service root URL |
//! | `RUST_LOG`     | no       | `cinedex=info`              | Log filter              |

mod commands;
mod config;
mod render;

use std::sync::Arc;

use tokio::io::AsyncBufReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinedex_client::{AuthClient, CollectionClient};
use cinedex_core::api::CollectionApi;
use cinedex_core::error::ApiError;
use cinedex_core::session::SessionStore;
use cinedex_sync::ListController;

use commands::Command;
use config::ShellConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinedex=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ShellConfig::from_env();
    tracing::info!(api_base_url = %config.api_base_url, "starting cinedex shell");

    let session = Arc::new(SessionStore::new());
    let http = reqwest::Client::new();
    let auth = AuthClient::with_client(http.clone(), &config.api_base_url, Arc::clone(&session));
    let collection: Arc<dyn CollectionApi> = Arc::new(CollectionClient::with_client(
        http,
        &config.api_base_url,
        Arc::clone(&session),
    ));
    let controller = Arc::new(ListController::new(collection, Arc::clone(&session)));

    // The "redirect on 401": the invalidation broadcast drops the shell
    // back to the login prompt.
    let mut invalidations = controller.subscribe_invalidations();
    tokio::spawn(async move {
        while invalidations.recv().await.is_ok() {
            println!("\nsession expired -- sign in again with: login <username> <password>");
        }
    });

    println!("cinedex shell -- type `help` for commands");

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match commands::parse(line) {
            Ok(Command::Quit) => break,
            Ok(command) => run_command(&controller, &auth, command).await,
            Err(message) => println!("{message}"),
        }
    }

    Ok(())
}

async fn run_command(controller: &Arc<ListController>, auth: &AuthClient, command: Command) {
    match command {
        Command::Register { username, password } => {
            match auth.register(&username, &password).await {
                Ok(()) => {
                    println!("registered and signed in as {username}");
                    show_after(controller.initialize().await, controller).await;
                }
                Err(err) => println!("registration failed: {err}"),
            }
        }
        Command::Login { username, password } => match auth.login(&username, &password).await {
            Ok(()) => {
                println!("signed in as {username}");
                show_after(controller.initialize().await, controller).await;
            }
            Err(err) => println!("login failed: {err}"),
        },
        Command::Logout => {
            controller.logout().await;
            println!("signed out");
        }
        Command::List => show_after(controller.refresh().await, controller).await,
        Command::Filter(filter) => {
            show_after(controller.apply_filters(filter).await, controller).await;
        }
        Command::Reset => show_after(controller.reset_filters().await, controller).await,
        Command::Next => match controller.next_page().await {
            Ok(true) => show(controller).await,
            Ok(false) => println!("already at the last page"),
            Err(err) => println!("{err}"),
        },
        Command::Prev => match controller.prev_page().await {
            Ok(true) => show(controller).await,
            Ok(false) => println!("already at the first page"),
            Err(err) => println!("{err}"),
        },
        Command::PageSize(size) => {
            show_after(controller.set_page_size(size).await, controller).await;
        }
        Command::Show(id) => match controller.get(id).await {
            Ok(record) => println!("{}", render::record_details(&record)),
            Err(err) => println!("{err}"),
        },
        Command::Add(draft) => match controller.create(draft).await {
            Ok(record) => {
                println!("created #{}", record.id);
                show(controller).await;
            }
            Err(err) => println!("create failed: {err}"),
        },
        Command::Edit(record) => match controller.update(record).await {
            Ok(record) => {
                println!("updated #{}", record.id);
                show(controller).await;
            }
            Err(err) => println!("update failed: {err}"),
        },
        Command::Rm(id) => match controller.delete(id).await {
            Ok(()) => {
                println!("deleted #{id}");
                show(controller).await;
            }
            Err(err) => println!("delete failed: {err}"),
        },
        Command::Fav(id) => match controller.toggle_favorite(id).await {
            Ok(true) => println!("added #{id} to favorites"),
            Ok(false) => println!("removed #{id} from favorites"),
            Err(err) => println!("favorite toggle failed: {err}"),
        },
        Command::Favs => {
            let mut ids: Vec<_> = controller.favorites().ids().await.into_iter().collect();
            ids.sort_unstable();
            if ids.is_empty() {
                println!("no favorites yet");
            } else {
                let ids: Vec<String> = ids.iter().map(|id| format!("#{id}")).collect();
                println!("favorites: {}", ids.join(", "));
            }
        }
        Command::Export(path) => match controller.export().await {
            Ok(payload) => match tokio::fs::write(&path, &payload).await {
                Ok(()) => println!("exported collection to {path}"),
                Err(err) => println!("could not write {path}: {err}"),
            },
            Err(err) => println!("export failed: {err}"),
        },
        Command::Import(path) => match tokio::fs::read(&path).await {
            Ok(payload) => match controller.import(&payload).await {
                Ok(receipt) => {
                    println!("imported {} records", receipt.count);
                    show(controller).await;
                }
                Err(err) => println!("import failed: {err}"),
            },
            Err(err) => println!("could not read {path}: {err}"),
        },
        Command::Help => println!("{}", commands::HELP),
        Command::Quit => unreachable!("handled by the input loop"),
    }
}

/// Print the current view.
async fn show(controller: &ListController) {
    let view = controller.view().await;
    let favorites = controller.favorites().ids().await;
    let query = controller.query().await;
    println!("{}", render::view_table(&view, &favorites, &query));
}

/// Print the view on success, the classified failure otherwise.
async fn show_after(result: Result<(), ApiError>, controller: &ListController) {
    match result {
        Ok(()) => show(controller).await,
        Err(err) => println!("{err}"),
    }
}
