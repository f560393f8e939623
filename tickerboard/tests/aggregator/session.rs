use std::time::Duration;

use tickerboard::ErrorKind;
use tickerboard_mock::MockBehavior;
use tokio::time::Instant;

use crate::helpers::*;

#[tokio::test(start_paused = true)]
async fn newer_run_supersedes_the_one_in_flight() {
    let clock = clock();
    let (agg, ctrl) = dynamic_aggregator(&clock);
    ctrl.set_symbol_behavior(
        url("/prices"),
        AAPL,
        MockBehavior::delayed(Duration::from_secs(5), series_body(&[("2024-01-01", 185.0)])),
    )
    .await;
    ctrl.set_symbol_behavior(
        url("/prices"),
        MSFT,
        MockBehavior::Return(series_body(&[("2024-01-01", 370.0)])),
    )
    .await;

    let session = agg.session();
    let older = {
        let session = session.clone();
        tokio::spawn(async move {
            session
                .run(AAPL, &[series_spec("prices", "/prices", AAPL)])
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let started = Instant::now();
    let newer = session
        .run(MSFT, &[series_spec("prices", "/prices", MSFT)])
        .await
        .unwrap();
    let older = older.await.unwrap().unwrap();

    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(!newer.superseded);
    assert_eq!(newer.values("prices").next(), Some((day(2024, 1, 1), 370.0)));

    assert!(older.superseded);
    assert_eq!(older.failure("prices"), Some(ErrorKind::Network));
    assert!(older.messages["prices"].contains("superseded"));
    assert!(older.series.is_empty());

    // The dropped fetch never reached the cache.
    let later = agg
        .run(AAPL, &[series_spec("prices", "/prices", AAPL)])
        .await
        .unwrap();
    assert!(later.cached.is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancel_releases_a_stalled_run() {
    let clock = clock();
    let (agg, ctrl) = dynamic_aggregator(&clock);
    ctrl.set_behavior(url("/news"), MockBehavior::Hang).await;
    ctrl.set_behavior(url("/prices"), MockBehavior::Return(series_body(&[("2024-01-01", 1.0)])))
        .await;

    let session = agg.session();
    let run = {
        let session = session.clone();
        tokio::spawn(async move {
            session
                .run(
                    AAPL,
                    &[
                        series_spec("prices", "/prices", AAPL),
                        extra_spec("news", "/news", AAPL),
                    ],
                )
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    let before = session.generation();
    session.cancel();
    assert_eq!(session.generation(), before + 1);

    let started = Instant::now();
    let report = run.await.unwrap().unwrap();

    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(report.superseded);
    assert_eq!(report.failure("news"), Some(ErrorKind::Network));
    // Settled before the cancel, so its data is kept.
    assert_eq!(report.values("prices").count(), 1);
}

#[tokio::test]
async fn guards_track_the_session_generation() {
    let clock = clock();
    let (agg, _ctrl) = dynamic_aggregator(&clock);
    let session = agg.session();

    let first = session.begin();
    assert!(first.is_current());
    let second = session.begin();
    assert!(!first.is_current());
    assert!(second.is_current());
    assert_eq!(second.token(), session.generation());

    session.cancel();
    assert!(!second.is_current());
    first.superseded().await;
    second.superseded().await;

    assert!(tickerboard::RunGuard::detached().is_current());
}

#[test]
fn racing_begins_get_distinct_tokens() {
    let clock = clock();
    let (agg, _ctrl) = dynamic_aggregator(&clock);
    let session = agg.session();

    for _ in 0..2_000 {
        let (a, b) = std::thread::scope(|s| {
            let a = s.spawn(|| session.begin());
            let b = s.spawn(|| session.begin());
            (a.join().unwrap(), b.join().unwrap())
        });
        assert_ne!(a.token(), b.token());
        assert_eq!(
            usize::from(a.is_current()) + usize::from(b.is_current()),
            1,
            "exactly one of two racing runs stays current"
        );
        assert_eq!(a.token().max(b.token()), session.generation());
    }
}
