// Entrypoint for the CLI application.
// - Without a subcommand, runs the fixed smoke script against the server.
// - `menu` starts the interactive menu instead.

use clap::{Parser, Subcommand};
use library_smoke::api::ApiClient;
use library_smoke::smoke::{ScriptOptions, SmokeClient};
use library_smoke::ui::main_menu;

#[derive(Parser)]
#[command(name = "library-smoke", version, about = "Smoke-test client for the library API")]
struct Cli {
    /// Server base URL. Defaults to $LIBRARY_API_URL, then http://localhost:3000.
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Register the test user before logging in.
    #[arg(long)]
    register: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive menu over all endpoints.
    Menu,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let api = match &cli.base_url {
        Some(url) => ApiClient::new(url)?,
        None => ApiClient::from_env()?,
    };
    log::debug!("using {}", api.base_url());

    match cli.command {
        Some(Command::Menu) => main_menu(api)?,
        None => {
            SmokeClient::stdout(api).run_script(ScriptOptions { register: cli.register })?;
        }
    }
    Ok(())
}
