mod common;

use std::time::Duration;

use tickerboard::{Aggregator, presets::alpha_vantage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let agg = Aggregator::builder()
        .transport(common::get_transport())
        .build()?;

    let key = common::api_key();
    let specs = vec![
        alpha_vantage::intraday("NIFTY", "5min", &key).renamed("nifty"),
        alpha_vantage::intraday("SENSEX", "5min", &key).renamed("sensex"),
    ];
    let (handle, mut reports) = agg.refresh_every("market", specs, Duration::from_secs(5))?;

    for _ in 0..3 {
        let Some(report) = reports.recv().await else {
            break;
        };
        for index in ["nifty", "sensex"] {
            match report.summary(index) {
                Some(s) => println!("{index}: {:.2} on {}", s.latest, s.date),
                None => println!("{index}: unavailable ({:?})", report.failure(index)),
            }
        }
        println!("cached: {:?}\n", report.cached);
    }

    handle.stop().await;
    Ok(())
}
