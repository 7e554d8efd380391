use std::io::Write as _;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ticket_dashboard::{
    api_client::EventApiClient,
    config::Config,
    services::poller,
    services::session::{ConfirmPrompt, Dashboard, Level, Notifier, Toggle},
    ui,
};

/// Toast sink printing to the terminal.
struct Toast;

impl Notifier for Toast {
    fn notify(&self, level: Level, message: &str) {
        let tag = match level {
            Level::Info => "--",
            Level::Success => "ok",
            Level::Error => "!!",
        };
        println!("[{}] {}", tag, message);
    }
}

/// Confirmation prompt reading y/N from the terminal.
struct StdinConfirm;

impl ConfirmPrompt for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        let _ = std::io::stdout().flush();
        let mut answer = String::new();
        if std::io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes")
    }
}

fn print_help() {
    println!("Commands:");
    println!("  seat <id>   toggle a seat selection");
    println!("  name <name> set the booking name");
    println!("  book        submit the current selection");
    println!("  refresh     refetch the seat map now");
    println!("  reset       initialize the event (clears all bookings)");
    println!("  help        show this help");
    println!("  quit        exit");
}

fn print_prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ticket dashboard against {}", config.api.base_url);

    let api = Arc::new(EventApiClient::from_config(&config.api));
    let dashboard = Dashboard::new(api, Arc::new(Toast));

    // Initial fetch, then keep the seat map fresh in the background. The
    // poll handle aborts its task when main returns, on any exit path.
    dashboard.refresh().await;
    let _poll = poller::start(
        dashboard.clone(),
        Duration::from_secs(config.api.poll_interval_secs),
    );

    println!("{}", ui::render(&dashboard.snapshot()));
    print_help();
    print_prompt();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (cmd, arg) = line.split_once(' ').unwrap_or((line, ""));
        match cmd {
            "" => {}
            "seat" => match arg.trim().parse::<i64>() {
                Ok(id) => {
                    if dashboard.toggle_seat(id) == Toggle::Ignored {
                        println!("Seat {} is not available", id);
                    }
                }
                Err(_) => println!("usage: seat <id>"),
            },
            "name" => dashboard.set_user_name(arg.trim()),
            "book" => dashboard.book().await,
            "refresh" => dashboard.refresh().await,
            "reset" => dashboard.reset(&StdinConfirm).await,
            "help" => print_help(),
            "quit" | "exit" => break,
            _ => println!("Unknown command '{}', try 'help'", cmd),
        }
        println!("{}", ui::render(&dashboard.snapshot()));
        print_prompt();
    }

    info!("Shutting down");
    Ok(())
}
