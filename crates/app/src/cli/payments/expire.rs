use clap::Args;
use jiff::{SignedDuration, Timestamp};
use shortlist_app::{
    database::{self, Db},
    domain::payments::{PaymentsService, PgPaymentsService, providers::ProviderRegistry},
};

#[derive(Debug, Args)]
pub(crate) struct ExpireArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Holds authorized longer ago than this are expired
    #[arg(long, default_value_t = 168)]
    older_than_hours: u32,
}

pub(crate) async fn run(args: ExpireArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let cutoff = Timestamp::now()
        .checked_sub(SignedDuration::from_hours(i64::from(args.older_than_hours)))
        .map_err(|error| format!("invalid cutoff: {error}"))?;

    // Expiring never calls a provider.
    let service = PgPaymentsService::new(Db::new(pool), ProviderRegistry::new("none"));

    let expired = service
        .expire_stale(cutoff)
        .await
        .map_err(|error| format!("failed to expire payments: {error}"))?;

    for payment in &expired {
        println!("expired: {payment}");
    }

    println!("expired_count: {}", expired.len());

    Ok(())
}
