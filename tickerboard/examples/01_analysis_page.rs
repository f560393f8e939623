mod common;

use tickerboard::{Aggregator, presets::backend};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let agg = Aggregator::builder()
        .transport(common::get_transport())
        .build()?;

    let symbol = std::env::args().nth(1).unwrap_or_else(|| "AAPL".to_string());
    let specs = backend::analysis(backend::DEFAULT_BASE, &symbol, 30);
    let report = agg.run(&symbol, &specs).await?;

    println!("## {} ({} days on the axis)", report.subject, report.series.len());
    for point in report.series.iter().rev().take(10) {
        let close = point.get("close").map_or("-".to_string(), |v| format!("{v:.2}"));
        let yhat = point.get("yhat").map_or("-".to_string(), |v| format!("{v:.2}"));
        println!(" - {}  close {close:>10}  forecast {yhat:>10}", point.date);
    }
    if let Some(summary) = report.summary("close") {
        match summary.change_pct {
            Some(pct) => println!("\nLast close {:.2} ({pct:+.2}%)", summary.latest),
            None => println!("\nLast close {:.2}", summary.latest),
        }
    }
    if let Some(rec) = report.extra("recommendation") {
        println!("Recommendation: {rec}");
    }

    if !report.failures.is_empty() {
        println!("\n## Unavailable sources");
        for (source, kind) in &report.failures {
            let msg = report.messages.get(source).map_or("", String::as_str);
            let stale = if report.stale.contains(source) { " (showing cached data)" } else { "" };
            println!(" - {source}: {kind} {msg}{stale}");
        }
    }

    Ok(())
}
