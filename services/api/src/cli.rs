use crate::demo::{run_catalogue, run_demo, CatalogueArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use homeloan_onboarding::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Home-Loan Onboarding",
    about = "Host adaptive onboarding questionnaire sessions and walk through them from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Walk one scripted applicant through the questionnaire, printing progress
    Demo(DemoArgs),
    /// Summarise branches, expected counts, and question order
    Catalogue(CatalogueArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args),
        Command::Catalogue(args) => run_catalogue(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve_without_subcommand() {
        let cli = Cli::try_parse_from(["homeloan-onboarding"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn demo_accepts_branch_and_rewind() {
        let cli = Cli::try_parse_from([
            "homeloan-onboarding",
            "demo",
            "--branch",
            "co_applicant",
            "--rewind-at",
            "101:2",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Demo(args)) => {
                assert_eq!(args.branch, "co-applicant");
                assert_eq!(args.rewind_at, Some((101, 2)));
            }
            other => panic!("expected demo command, got {other:?}"),
        }
    }

    #[test]
    fn demo_rejects_unknown_branch() {
        assert!(Cli::try_parse_from(["homeloan-onboarding", "demo", "--branch", "lodger"]).is_err());
    }
}
