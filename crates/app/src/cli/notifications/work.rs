use std::{sync::Arc, time::Duration};

use clap::Args;
use jiff::Timestamp;
use shortlist_app::{
    database::{self, Db},
    domain::notifications::{HttpNotificationGateway, NotificationWorker, WorkerConfig},
};

#[derive(Debug, Args)]
pub(crate) struct WorkArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Endpoint notifications are posted to
    #[arg(long, env = "NOTIFICATION_GATEWAY_URL")]
    gateway_url: String,

    /// Process one batch and exit
    #[arg(long)]
    once: bool,

    /// Seconds to wait when the outbox is empty
    #[arg(long, default_value_t = 5)]
    poll_interval_secs: u64,

    /// Messages claimed per batch
    #[arg(long, default_value_t = 50)]
    batch_size: u32,

    /// Attempts before a message is left for manual follow-up
    #[arg(long, default_value_t = 10)]
    max_attempts: u32,
}

pub(crate) async fn run(args: WorkArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let worker = NotificationWorker::new(
        Db::new(pool),
        Arc::new(HttpNotificationGateway::new(args.gateway_url)),
        WorkerConfig {
            batch_size: args.batch_size,
            max_attempts: args.max_attempts,
            ..WorkerConfig::default()
        },
    );

    if args.once {
        let report = worker
            .run_once(Timestamp::now())
            .await
            .map_err(|error| format!("failed to deliver notifications: {error}"))?;

        println!("claimed: {}", report.claimed);
        println!("delivered: {}", report.delivered);
        println!("failed: {}", report.failed);

        return Ok(());
    }

    worker
        .run_until(Duration::from_secs(args.poll_interval_secs), async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    Ok(())
}
