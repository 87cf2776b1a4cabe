use crate::demo::{run_classify, run_score, ClassifyArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use intake_assist::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Intake Assist",
    about = "Serve the intake assistant endpoints or run its scorers from the command line",
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
    /// Score a JSON object of intake answers without starting the server
    Score(ScoreArgs),
    /// Print the risk flag for a set of moderation category flags
    Classify(ClassifyArgs),
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
        Command::Score(args) => run_score(args),
        Command::Classify(args) => {
            run_classify(args);
            Ok(())
        }
    }
}
