use std::time::Duration;

use tickerboard::TickerboardError;
use tickerboard_mock::MockBehavior;

use crate::helpers::*;

#[tokio::test(start_paused = true)]
async fn refresh_delivers_a_report_per_tick() {
    let clock = clock();
    let (agg, ctrl) = dynamic_aggregator(&clock);
    ctrl.set_behavior(url("/prices"), MockBehavior::Return(series_body(&[("2024-01-01", 1.0)])))
        .await;

    let (handle, mut reports) = agg
        .refresh_every(
            AAPL,
            vec![series_spec("prices", "/prices", AAPL)],
            Duration::from_secs(60),
        )
        .unwrap();

    let first = reports.recv().await.unwrap();
    assert!(first.cached.is_empty());
    let second = reports.recv().await.unwrap();
    assert!(second.cached.contains("prices"));
    assert_eq!(ctrl.calls(&url("/prices")).await, 1);

    clock.advance(TWO_HOURS_MS);
    let third = reports.recv().await.unwrap();
    assert!(third.cached.is_empty());
    assert_eq!(ctrl.calls(&url("/prices")).await, 2);

    handle.stop().await;
    assert!(reports.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn stopping_mid_run_drops_the_run() {
    let clock = clock();
    let (agg, ctrl) = dynamic_aggregator(&clock);
    ctrl.set_behavior(url("/news"), MockBehavior::Hang).await;

    let (handle, mut reports) = agg
        .refresh_every(
            AAPL,
            vec![extra_spec("news", "/news", AAPL)],
            Duration::from_secs(60),
        )
        .unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(ctrl.calls(&url("/news")).await, 1);
    assert!(!handle.is_finished());

    handle.stop().await;
    assert!(reports.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_ends_the_loop() {
    let clock = clock();
    let (agg, ctrl) = dynamic_aggregator(&clock);
    ctrl.set_behavior(url("/news"), MockBehavior::Return(serde_json::json!([])))
        .await;

    let (handle, mut reports) = agg
        .refresh_every(
            AAPL,
            vec![extra_spec("news", "/news", AAPL)],
            Duration::from_secs(60),
        )
        .unwrap();
    assert!(reports.recv().await.is_some());

    drop(handle);
    assert!(reports.recv().await.is_none());
}

#[tokio::test]
async fn refresh_rejects_bad_arguments_up_front() {
    let clock = clock();
    let (agg, ctrl) = dynamic_aggregator(&clock);

    let zero = agg.refresh_every(
        AAPL,
        vec![extra_spec("news", "/news", AAPL)],
        Duration::ZERO,
    );
    assert!(matches!(zero, Err(TickerboardError::InvalidArg(_))));

    let dup = agg.refresh_every(
        AAPL,
        vec![
            extra_spec("news", "/news", AAPL),
            extra_spec("news", "/other", AAPL),
        ],
        Duration::from_secs(1),
    );
    assert!(matches!(dup, Err(TickerboardError::DuplicateSource { .. })));
    assert_eq!(ctrl.total_calls().await, 0);
}
