mod common;

use tickerboard::{Aggregator, presets::backend};
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Suggested: RUST_LOG=info,tickerboard=debug,tickerboard_cache=debug
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
        .try_init();

    let agg = Aggregator::builder()
        .transport(common::get_transport())
        .build()?;

    // Second run is served from the cache.
    let specs = backend::analysis(backend::DEFAULT_BASE, "AAPL", 30);
    let _ = agg.run("AAPL", &specs).await?;
    let _ = agg.run("AAPL", &specs).await?;

    Ok(())
}
