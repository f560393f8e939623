mod common;

use tickerboard::{Aggregator, SelectionSources};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let agg = Aggregator::builder()
        .transport(common::get_transport())
        .build()?;

    let text = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "NVDA beats estimates on record data-center demand".to_string());
    let insight = agg
        .insight_for_selection(&text, &SelectionSources::new(common::api_key()))
        .await?;

    println!("Selection: {text}");
    println!("Symbol:    {}", insight.symbol.as_deref().unwrap_or("-"));
    println!("Sentiment: {}", insight.sentiment.as_deref().unwrap_or("unavailable"));
    match insight.price {
        Some(price) => println!("Price:     {price:.2}"),
        None => println!("Price:     unavailable"),
    }
    for (date, close) in &insight.chart {
        println!(" - {date}: {close:.2}");
    }
    for (source, kind) in &insight.report.failures {
        println!("({source} failed: {kind})");
    }

    Ok(())
}
