mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod services;
#[cfg(test)]
mod testing;
mod workflow;

use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use crate::config::SettingsStore;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::jira::JiraClient;
use crate::infra::speech::VoiceRecognizer;
use crate::infra::terminal::StdConsole;

#[derive(Parser)]
#[command(
    name = "voxticket",
    author,
    version,
    about = "Create Jira tickets by voice or keyboard",
    after_help = "`voxticket setup` runs the settings wizard. Any other invocation creates a ticket."
)]
struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long)]
    verbose: bool,

    /// `setup` to configure credentials; anything else is ignored.
    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    args: Vec<String>,
}

#[derive(Debug, PartialEq, Eq)]
enum Invocation {
    Setup,
    CreateTicket,
}

impl Cli {
    fn invocation(&self) -> Invocation {
        match self.args.first().map(String::as_str) {
            Some("setup") => Invocation::Setup,
            _ => Invocation::CreateTicket,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(error) = run(cli.invocation()).await {
        tracing::debug!(?error, "fatal error");
        eprintln!("{} {}", "✘".red(), error.user_message());
        std::process::exit(error.exit_code());
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

async fn run(invocation: Invocation) -> AppResult<()> {
    let mut store = SettingsStore::open_default()?;
    let mut console = StdConsole;

    match invocation {
        Invocation::Setup => cmd::setup::run_setup(&mut store, &mut console),
        Invocation::CreateTicket => {
            store.load()?;
            let settings = store.get()?.clone();
            let issue_tracker = Arc::new(JiraClient::connect(&settings));
            let speech = Arc::new(VoiceRecognizer::new(
                std::env::temp_dir().join("voxticket"),
                &settings.speech,
            ));
            let context =
                AppContext::new(settings, issue_tracker, speech, std::env::temp_dir());
            cmd::ticket::run(&context, &mut console).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation_of(args: &[&str]) -> Invocation {
        Cli::try_parse_from(args).unwrap().invocation()
    }

    #[test]
    fn setup_argument_runs_the_wizard() {
        assert_eq!(invocation_of(&["voxticket", "setup"]), Invocation::Setup);
        assert_eq!(invocation_of(&["voxticket", "setup", "now"]), Invocation::Setup);

        let cli = Cli::try_parse_from(["voxticket", "-v", "setup"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.invocation(), Invocation::Setup);
    }

    #[test]
    fn any_other_invocation_creates_a_ticket() {
        assert_eq!(invocation_of(&["voxticket"]), Invocation::CreateTicket);
        assert_eq!(invocation_of(&["voxticket", "create"]), Invocation::CreateTicket);
        assert_eq!(invocation_of(&["voxticket", "settings"]), Invocation::CreateTicket);
        assert_eq!(
            invocation_of(&["voxticket", "create", "--now", "x"]),
            Invocation::CreateTicket
        );
    }
}
