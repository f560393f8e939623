use serde_json::json;
use tickerboard::{ErrorKind, SourceFailure};
use tickerboard_mock::MockBehavior;

use crate::helpers::*;

#[tokio::test]
async fn one_failing_source_does_not_fail_the_run() {
    let clock = clock();
    let (agg, ctrl) = dynamic_aggregator(&clock);
    ctrl.set_behavior(
        url("/prices"),
        MockBehavior::Return(series_body(&[("2024-01-01", 10.0), ("2024-01-02", 11.0)])),
    )
    .await;
    ctrl.set_behavior(
        url("/forecast"),
        MockBehavior::Status(500, json!({"error": "model crashed"})),
    )
    .await;
    ctrl.set_behavior(url("/news"), MockBehavior::Return(json!([{"title": "hi"}])))
        .await;

    let specs = [
        series_spec("prices", "/prices", AAPL),
        series_spec("forecast", "/forecast", AAPL),
        extra_spec("news", "/news", AAPL),
    ];
    let report = agg.run(AAPL, &specs).await.unwrap();

    assert!(!report.is_complete());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failure("forecast"), Some(ErrorKind::HttpError));
    assert_eq!(report.messages["forecast"], "status 500: model crashed");
    assert_eq!(report.series.len(), 2);
    assert_eq!(report.values("prices").count(), 2);
    assert_eq!(report.values("forecast").count(), 0);
    assert_eq!(report.extra("news"), Some(&json!([{"title": "hi"}])));
    assert!(!report.superseded);
    assert_eq!(report.completed_at_epoch_millis, T0);
}

#[tokio::test]
async fn every_source_failing_still_yields_a_report() {
    let clock = clock();
    let (agg, ctrl) = dynamic_aggregator(&clock);
    ctrl.set_behavior(
        url("/prices"),
        MockBehavior::Fail(SourceFailure::network("connection refused")),
    )
    .await;
    ctrl.set_behavior(url("/news"), MockBehavior::Status(429, json!({})))
        .await;

    let specs = [
        series_spec("prices", "/prices", AAPL),
        extra_spec("news", "/news", AAPL),
    ];
    let report = agg.run(AAPL, &specs).await.unwrap();

    assert_eq!(report.failure("prices"), Some(ErrorKind::Network));
    assert_eq!(report.failure("news"), Some(ErrorKind::RateLimited));
    assert!(report.series.is_empty());
    assert!(report.extras.is_empty());
}

#[tokio::test]
async fn empty_spec_list_yields_empty_report() {
    let clock = clock();
    let (agg, ctrl) = dynamic_aggregator(&clock);
    let report = agg.run(AAPL, &[]).await.unwrap();
    assert_eq!(report.subject, AAPL);
    assert!(report.is_complete());
    assert!(report.series.is_empty());
    assert_eq!(ctrl.total_calls().await, 0);
}

#[tokio::test]
async fn shape_violations_are_malformed() {
    let clock = clock();
    let (agg, ctrl) = dynamic_aggregator(&clock);
    ctrl.set_behavior(url("/prices"), MockBehavior::Return(json!({"rows": []})))
        .await;
    ctrl.set_behavior(
        url("/news"),
        MockBehavior::Return(json!({"error": "No data available for AAPL"})),
    )
    .await;

    let specs = [
        series_spec("prices", "/prices", AAPL),
        extra_spec("news", "/news", AAPL),
    ];
    let report = agg.run(AAPL, &specs).await.unwrap();

    assert_eq!(report.failure("prices"), Some(ErrorKind::MalformedPayload));
    assert_eq!(report.failure("news"), Some(ErrorKind::MalformedPayload));
    assert!(report.messages["news"].contains("No data available"));
}

#[tokio::test]
async fn unparseable_dates_are_malformed_but_null_values_are_gaps() {
    let clock = clock();
    let (agg, ctrl) = dynamic_aggregator(&clock);
    ctrl.set_behavior(
        url("/prices"),
        MockBehavior::Return(json!({"data": {
            "2024-01-01": {"v": 1.0},
            "2024-01-02": {"v": null},
            "2024-01-03": {"v": "3.5"}
        }})),
    )
    .await;
    ctrl.set_behavior(
        url("/bad"),
        MockBehavior::Return(json!({"data": {"yesterday": {"v": 1.0}}})),
    )
    .await;

    let specs = [
        series_spec("prices", "/prices", AAPL),
        series_spec("bad", "/bad", AAPL),
    ];
    let report = agg.run(AAPL, &specs).await.unwrap();

    let prices: Vec<_> = report.values("prices").collect();
    assert_eq!(
        prices,
        vec![(day(2024, 1, 1), 1.0), (day(2024, 1, 3), 3.5)]
    );
    assert_eq!(report.series.len(), 2);
    assert_eq!(report.failure("bad"), Some(ErrorKind::MalformedPayload));
}

#[tokio::test]
async fn later_source_wins_same_named_series() {
    let clock = clock();
    let (agg, ctrl) = dynamic_aggregator(&clock);
    ctrl.set_behavior(
        url("/a"),
        MockBehavior::Return(series_body(&[("2024-01-01", 1.0), ("2024-01-02", 2.0)])),
    )
    .await;
    ctrl.set_behavior(
        url("/b"),
        MockBehavior::Return(series_body(&[("2024-01-02", 20.0)])),
    )
    .await;

    let mut first = series_spec("a", "/a", AAPL);
    first.extract = tickerboard::Extract::DateMap {
        path: vec!["data".into()],
        field: Some("v".into()),
        series: Some("close".into()),
    };
    let mut second = series_spec("b", "/b", AAPL);
    second.extract = tickerboard::Extract::DateMap {
        path: vec!["data".into()],
        field: Some("v".into()),
        series: Some("close".into()),
    };
    let report = agg.run(AAPL, &[first, second]).await.unwrap();

    let close: Vec<_> = report.values("close").collect();
    assert_eq!(close, vec![(day(2024, 1, 1), 1.0), (day(2024, 1, 2), 20.0)]);
}
