use app::backend::BackendClient;
use app::clock::SystemClock;
use app::config::Config;
use client_lib::shell::Shell;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

fn prompt() -> std::io::Result<()> {
    print!("> ");
    std::io::stdout().flush()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they don't interleave with the screens.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    info!("Using backend at {}", config.backend_url);

    let backend = BackendClient::from_config(&config)?;
    let mut shell = Shell::new(
        backend,
        SystemClock,
        config.display_offset,
        config.login_email_domain.clone(),
    );

    print_lines(&shell.start().await.lines);
    prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let reply = shell.handle(&line).await;
        print_lines(&reply.lines);
        if reply.quit {
            break;
        }
        prompt()?;
    }

    info!("Bye");
    Ok(())
}
