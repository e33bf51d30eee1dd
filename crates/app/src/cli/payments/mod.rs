use clap::{Args, Subcommand};

mod expire;

#[derive(Debug, Args)]
pub(crate) struct PaymentsCommand {
    #[command(subcommand)]
    command: PaymentsSubcommand,
}

#[derive(Debug, Subcommand)]
enum PaymentsSubcommand {
    /// Expire authorization holds older than a cutoff
    Expire(expire::ExpireArgs),
}

pub(crate) async fn run(command: PaymentsCommand) -> Result<(), String> {
    match command.command {
        PaymentsSubcommand::Expire(args) => expire::run(args).await,
    }
}
