use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use tickerboard::{Aggregator, ErrorKind, RequestSpec, SourceSpec, TickerboardError};
use tickerboard_mock::{DynamicMockTransport, MockBehavior};

use crate::helpers::*;

#[tokio::test]
async fn programmer_errors_fail_before_any_fetch() {
    let clock = clock();
    let (agg, ctrl) = dynamic_aggregator(&clock);

    let blank_subject = agg.run("  ", &[extra_spec("news", "/news", AAPL)]).await;
    assert!(matches!(blank_subject, Err(TickerboardError::InvalidArg(_))));

    let dup = agg
        .run(
            AAPL,
            &[
                extra_spec("news", "/news", AAPL),
                series_spec("news", "/prices", AAPL),
            ],
        )
        .await;
    assert_eq!(dup.unwrap_err(), TickerboardError::duplicate_source("news"));

    let relative = agg
        .run(AAPL, &[SourceSpec::new("news", RequestSpec::get("/api/news"))])
        .await;
    assert!(matches!(relative, Err(TickerboardError::InvalidUrl { .. })));

    let ftp = agg
        .run(AAPL, &[SourceSpec::new("news", RequestSpec::get("ftp://host/news"))])
        .await;
    assert!(matches!(ftp, Err(TickerboardError::InvalidUrl { .. })));

    assert_eq!(ctrl.total_calls().await, 0);
}

#[test]
fn builder_requires_a_transport_and_a_timeout() {
    assert!(matches!(
        Aggregator::builder().build(),
        Err(TickerboardError::InvalidArg(_))
    ));

    let (transport, _ctrl) = DynamicMockTransport::new_with_controller("dynamic");
    let zero = Aggregator::builder()
        .transport(transport)
        .default_timeout(Duration::ZERO)
        .build();
    assert!(matches!(zero, Err(TickerboardError::InvalidArg(_))));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn every_source_either_contributes_or_is_reported(failing in prop::collection::vec(any::<bool>(), 1..6)) {
        tokio_test::block_on(async move {
            let clock = clock();
            let (transport, ctrl) = DynamicMockTransport::new_with_controller("dynamic");
            let agg = Aggregator::builder()
                .transport(transport)
                .clock(Arc::new(clock))
                .build()
                .unwrap();

            let mut specs = Vec::new();
            for (i, fails) in failing.iter().enumerate() {
                let path = format!("/s{i}");
                let behavior = if *fails {
                    MockBehavior::Status(500, serde_json::json!({"error": "down"}))
                } else {
                    MockBehavior::Return(series_body(&[("2024-01-01", i as f64)]))
                };
                ctrl.set_behavior(url(&path), behavior).await;
                specs.push(series_spec(&format!("s{i}"), &path, AAPL));
            }

            let report = agg.run(AAPL, &specs).await.unwrap();

            let expected: BTreeSet<String> = failing
                .iter()
                .enumerate()
                .filter(|(_, f)| **f)
                .map(|(i, _)| format!("s{i}"))
                .collect();
            let failed: BTreeSet<String> = report.failures.keys().cloned().collect();
            assert_eq!(failed, expected);
            assert!(report.failures.values().all(|k| *k == ErrorKind::HttpError));
            for (i, fails) in failing.iter().enumerate() {
                let name = format!("s{i}");
                assert_eq!(report.values(&name).count(), usize::from(!*fails));
            }
        });
    }
}
