use tickerboard::ErrorKind;
use tickerboard::presets::{alpha_vantage, backend};

use crate::helpers::*;

#[tokio::test]
async fn history_and_forecast_align_on_one_axis() {
    let clock = clock();
    let agg = fixture_aggregator(&clock);
    let specs = [
        backend::stock_data(BASE, AAPL),
        backend::forecast(BASE, AAPL, 3),
    ];

    let report = agg.run(AAPL, &specs).await.unwrap();

    assert!(report.is_complete());
    assert_eq!(report.series.len(), 8);
    assert!(report.series.windows(2).all(|w| w[0].date < w[1].date));
    assert_eq!(report.series[0].date, day(2024, 1, 1));
    assert_eq!(report.series[7].date, day(2024, 1, 8));

    let (history, forecast) = report.series.split_at(5);
    assert!(history.iter().all(|p| p.has("close") && !p.has("yhat")));
    assert!(history.iter().all(|p| p.has("bb_lower") && p.has("sma_50")));
    assert!(forecast.iter().all(|p| p.has("yhat") && !p.has("close")));
    assert_eq!(report.values("sma_200").count(), 0);
    assert_eq!(report.series[0].get("close"), Some(185.0));
}

#[tokio::test]
async fn analysis_page_sources_split_into_series_and_extras() {
    let clock = clock();
    let agg = fixture_aggregator(&clock);
    let specs = backend::analysis(BASE, AAPL, 3);

    let report = agg.run(AAPL, &specs).await.unwrap();

    assert!(report.is_complete(), "failures: {:?}", report.messages);
    assert_eq!(report.series.len(), 8);
    let extras: Vec<_> = report.extras.keys().map(String::as_str).collect();
    assert_eq!(extras, vec!["news", "predictions", "recommendation"]);
    assert_eq!(
        report.extra("predictions").and_then(|p| p.get("symbol")),
        Some(&serde_json::json!(AAPL))
    );
}

#[tokio::test]
async fn unknown_symbol_fails_every_backend_source() {
    let clock = clock();
    let agg = fixture_aggregator(&clock);
    let report = agg
        .run("ZZZZ", &backend::analysis(BASE, "ZZZZ", 3))
        .await
        .unwrap();

    assert_eq!(report.failures.len(), 5);
    assert!(report.failures.values().all(|k| *k == ErrorKind::HttpError));
    assert!(report.messages["stock_data"].contains("No data available for ZZZZ"));
    assert!(report.series.is_empty());
}

#[tokio::test]
async fn alpha_vantage_daily_and_intraday_closes() {
    let clock = clock();
    let agg = fixture_aggregator(&clock);
    let specs = [
        alpha_vantage::daily(AAPL, "demo"),
        alpha_vantage::intraday(AAPL, "5min", "demo"),
        alpha_vantage::global_quote(AAPL, "demo"),
    ];

    let report = agg.run(AAPL, &specs).await.unwrap();

    assert!(report.is_complete(), "failures: {:?}", report.messages);
    assert_eq!(report.values("daily").count(), 7);
    let intraday: Vec<_> = report.values("intraday").collect();
    assert_eq!(
        intraday,
        vec![(day(2024, 1, 1), 185.5), (day(2024, 1, 2), 186.75)]
    );
    let price = report.extra("quote").and_then(alpha_vantage::quote_price);
    assert_eq!(price, Some(192.5));
    let summary = report.summary("daily").unwrap();
    assert_eq!(summary.latest, 192.5);
    assert_eq!(summary.previous, Some(191.25));
}

#[tokio::test]
async fn alpha_vantage_body_signals_map_to_failure_kinds() {
    let clock = clock();
    let agg = fixture_aggregator(&clock);

    let throttled = agg
        .run("THROTTLE", &[alpha_vantage::daily("THROTTLE", "demo")])
        .await
        .unwrap();
    assert_eq!(throttled.failure("daily"), Some(ErrorKind::RateLimited));

    let garbage = agg
        .run("GARBAGE", &[alpha_vantage::daily("GARBAGE", "demo")])
        .await
        .unwrap();
    assert_eq!(garbage.failure("daily"), Some(ErrorKind::MalformedPayload));

    let invalid = agg
        .run("ZZZZ", &[alpha_vantage::daily("ZZZZ", "demo")])
        .await
        .unwrap();
    assert_eq!(invalid.failure("daily"), Some(ErrorKind::MalformedPayload));
    assert!(invalid.messages["daily"].contains("Invalid API call"));

    let failed = agg
        .run("FAIL", &[alpha_vantage::daily("FAIL", "demo")])
        .await
        .unwrap();
    assert_eq!(failed.failure("daily"), Some(ErrorKind::HttpError));
}
