use clap::{Args, Subcommand};

mod work;

#[derive(Debug, Args)]
pub(crate) struct NotificationsCommand {
    #[command(subcommand)]
    command: NotificationsSubcommand,
}

#[derive(Debug, Subcommand)]
enum NotificationsSubcommand {
    /// Deliver queued notifications
    Work(work::WorkArgs),
}

pub(crate) async fn run(command: NotificationsCommand) -> Result<(), String> {
    match command.command {
        NotificationsSubcommand::Work(args) => work::run(args).await,
    }
}
