use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler};

use crate::reel::service::ReelService;
use crate::social::service::SocialService;

/// Daily analytics refresh at 02:00 server time.
pub async fn start_scheduler(
    social_service: Arc<SocialService>,
    reel_service: Arc<ReelService>,
) -> Result<JobScheduler, Box<dyn std::error::Error>> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async("0 0 2 * * *", move |_uuid, _lock| {
        let social_service = social_service.clone();
        let reel_service = reel_service.clone();
        Box::pin(async move {
            log::info!("Starting daily analytics refresh");
            social_service.refresh_all(&reel_service).await;
            log::info!("Daily analytics refresh finished");
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    log::info!("Scheduled daily analytics refresh (02:00)");
    Ok(scheduler)
}
