use crate::demo::{
    run_availability, run_demo, run_due_reports, run_report, AvailabilityArgs, DemoArgs,
    ReportArgs, RunDueArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use edulink::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "EduLink",
    about = "Run the EduLink education platform and explore it from the command line",
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
    /// Print the demo advisor's bookable increments for a date
    Availability(AvailabilityArgs),
    /// Render an analytics report over the demo data set
    Report(ReportCommandArgs),
    /// Run an end-to-end walkthrough of every component
    Demo(DemoArgs),
}

#[derive(Args, Debug)]
#[command(args_conflicts_with_subcommands = true)]
struct ReportCommandArgs {
    #[command(subcommand)]
    command: Option<ReportCommand>,
    #[command(flatten)]
    report: ReportArgs,
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Generate every scheduled report that is due
    RunDue(RunDueArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Seed the in-memory store with the demo data set
    #[arg(long)]
    pub(crate) demo: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Availability(args) => run_availability(args),
        Command::Report(ReportCommandArgs {
            command: Some(ReportCommand::RunDue(args)),
            ..
        }) => run_due_reports(args),
        Command::Report(ReportCommandArgs { report, .. }) => run_report(report),
        Command::Demo(args) => run_demo(args),
    }
}
