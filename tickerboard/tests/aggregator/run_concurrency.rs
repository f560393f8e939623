use std::sync::Arc;
use std::time::Duration;

use tickerboard::{Aggregator, ErrorKind};
use tickerboard_mock::{DynamicMockTransport, MockBehavior};
use tokio::time::Instant;

use crate::helpers::*;

#[tokio::test(start_paused = true)]
async fn misses_are_fetched_concurrently() {
    let clock = clock();
    let (agg, ctrl) = dynamic_aggregator(&clock);
    for path in ["/a", "/b", "/c"] {
        ctrl.set_behavior(
            url(path),
            MockBehavior::delayed(Duration::from_secs(1), series_body(&[("2024-01-01", 1.0)])),
        )
        .await;
    }
    let specs = [
        series_spec("a", "/a", AAPL),
        series_spec("b", "/b", AAPL),
        series_spec("c", "/c", AAPL),
    ];

    let started = Instant::now();
    let report = agg.run(AAPL, &specs).await.unwrap();

    assert!(report.is_complete());
    assert!(started.elapsed() < Duration::from_millis(1_500));
}

#[tokio::test(start_paused = true)]
async fn stalled_source_times_out_without_holding_the_others() {
    let clock = clock();
    let (agg, ctrl) = dynamic_aggregator(&clock);
    ctrl.set_behavior(
        url("/prices"),
        MockBehavior::delayed(
            Duration::from_millis(100),
            series_body(&[("2024-01-01", 10.0), ("2024-01-02", 11.0)]),
        ),
    )
    .await;
    ctrl.set_behavior(url("/news"), MockBehavior::Hang).await;
    let specs = [
        series_spec("prices", "/prices", AAPL),
        extra_spec("news", "/news", AAPL).timeout(Duration::from_millis(500)),
    ];

    let started = Instant::now();
    let report = agg.run(AAPL, &specs).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(report.failure("news"), Some(ErrorKind::Network));
    assert!(report.messages["news"].contains("timed out"));
    assert_eq!(report.values("prices").count(), 2);
    assert!(elapsed >= Duration::from_millis(500));
    assert!(elapsed < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn default_timeout_bounds_sources_without_their_own() {
    let clock = clock();
    let (transport, ctrl) = DynamicMockTransport::new_with_controller("dynamic");
    let agg = Aggregator::builder()
        .transport(transport)
        .clock(Arc::new(clock.clone()))
        .default_timeout(Duration::from_secs(2))
        .build()
        .unwrap();
    ctrl.set_behavior(url("/news"), MockBehavior::Hang).await;

    let started = Instant::now();
    let report = agg
        .run(AAPL, &[extra_spec("news", "/news", AAPL)])
        .await
        .unwrap();

    assert_eq!(report.failure("news"), Some(ErrorKind::Network));
    assert!(started.elapsed() >= Duration::from_secs(2));
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn concurrent_runs_for_different_subjects_stay_separate() {
    let clock = clock();
    let (agg, ctrl) = dynamic_aggregator(&clock);
    ctrl.set_symbol_behavior(
        url("/prices"),
        AAPL,
        MockBehavior::delayed(Duration::from_millis(300), series_body(&[("2024-01-01", 185.0)])),
    )
    .await;
    ctrl.set_symbol_behavior(
        url("/prices"),
        MSFT,
        MockBehavior::delayed(Duration::from_millis(50), series_body(&[("2024-01-01", 370.0)])),
    )
    .await;

    let aapl_specs = [series_spec("prices", "/prices", AAPL)];
    let msft_specs = [series_spec("prices", "/prices", MSFT)];
    let (aapl, msft) = tokio::join!(agg.run(AAPL, &aapl_specs), agg.run(MSFT, &msft_specs));
    let (aapl, msft) = (aapl.unwrap(), msft.unwrap());

    assert_eq!(aapl.subject, AAPL);
    assert_eq!(msft.subject, MSFT);
    assert_eq!(aapl.values("prices").collect::<Vec<_>>(), vec![(day(2024, 1, 1), 185.0)]);
    assert_eq!(msft.values("prices").collect::<Vec<_>>(), vec![(day(2024, 1, 1), 370.0)]);

    // Each subject now has its own fresh entry.
    let again = agg.run(MSFT, &msft_specs).await.unwrap();
    assert!(again.cached.contains("prices"));
    assert_eq!(again.values("prices").next(), Some((day(2024, 1, 1), 370.0)));
    assert_eq!(ctrl.calls(&url("/prices")).await, 2);
}
