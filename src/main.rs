use anyhow::Context;
use direct_leads::{configuration::get_configuration, logger, startup::run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let configuration = get_configuration().context("Failed to read configuration.")?;
    logger::init(&configuration.logging)?;

    let report = run(configuration).await.map_err(|e| {
        log::error!("Run aborted: {:#}", e);
        e
    })?;

    log::info!("Wrote {} unique firms", report.rows_written);
    Ok(())
}
