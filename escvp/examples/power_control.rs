//! Power on, switch to HDMI1, nudge the volume, and report errors

use std::sync::Arc;
use std::time::Duration;

use escvp::{CommandId, CommandQueue, Error, PowerStatus, Projector, Source};
use tokio::time::sleep;

#[tokio::main]
async fn main() -> escvp::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let target = std::env::var("PROJECTOR_TARGET").unwrap_or_else(|_| "192.168.0.150".to_string());

    let projector = Arc::new(Projector::new(target.parse()?).with_read_timeout(Duration::from_secs(3)));
    projector.connect().await?;

    if projector.power_status().await? != PowerStatus::On {
        println!("Powering on...");
        projector.power_on().await?;

        // Lamp warm-up
        while projector.power_status().await? == PowerStatus::Booting {
            sleep(Duration::from_secs(2)).await;
        }
    }

    println!("Selecting {}...", Source::Hdmi1);
    if let Err(Error::Device { .. }) = projector.select_source(Source::Hdmi1).await {
        println!("Source rejected, error code {:02X}", projector.error_query().await?);
    }

    // Queue volume steps from a background worker
    let queue = CommandQueue::spawn(Arc::clone(&projector));
    let up = queue.enqueue(CommandId::VolumeUp).await?;
    let query = queue.enqueue(CommandId::VolumeQuery).await?;

    if let Ok(result) = up.await {
        result?;
    }
    if let Ok(Ok(response)) = query.await {
        println!("Volume now: {:?}", response.status);
    }

    queue.shutdown().await;
    projector.close().await?;

    println!("Done!");
    Ok(())
}
