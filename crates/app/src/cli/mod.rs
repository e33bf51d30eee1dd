use clap::{Parser, Subcommand};

mod db;
mod notifications;
mod payments;

#[derive(Debug, Parser)]
#[command(name = "shortlist-app", about = "Shortlist maintenance CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Payments(payments::PaymentsCommand),
    Notifications(notifications::NotificationsCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::Payments(command) => payments::run(command).await,
            Commands::Notifications(command) => notifications::run(command).await,
        }
    }
}
