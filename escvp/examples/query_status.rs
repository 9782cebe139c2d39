//! Connect and print what the projector reports about itself

use escvp::{Projector, Target};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> escvp::Result<()> {
    // Initialize logging (RUST_LOG=escvp=trace to see raw bytes)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // tcp://host[:port] or serial://PATH[@BAUD]
    let target: Target = std::env::var("PROJECTOR_TARGET")
        .unwrap_or_else(|_| "192.168.0.150".to_string())
        .parse()?;

    println!("Connecting to {}...", target);

    let projector = Projector::new(target);
    projector.connect().await?;
    println!("✓ Connected!");

    println!("✓ Power: {}", projector.power_status().await?);

    match projector.info().await {
        Ok(info) => println!("✓ {}", info),
        Err(e) if e.is_recoverable() => println!("✗ Info unavailable: {}", e),
        Err(e) => return Err(e),
    }

    projector.close().await?;
    println!("✓ Disconnected");

    Ok(())
}
