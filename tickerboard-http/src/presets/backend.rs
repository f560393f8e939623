use serde_json::json;
use tickerboard_core::{Extract, RequestSpec, Shape, SourceSpec};

/// Where the backend listens by default.
pub const DEFAULT_BASE: &str = "http://localhost:5000";
/// History window requested by the analysis page.
pub const DISPLAY_DAYS: u32 = 600;

fn endpoint(base: &str, path: &str) -> String {
    format!("{}{path}", base.trim_end_matches('/'))
}

fn backend_shape() -> Shape {
    Shape::any().error_on("error")
}

/// `GET /api/stock_data`: closes, Bollinger bands and moving averages.
///
/// Series: `close`, `bb_lower`, `bb_upper`, `sma_50`, `sma_200`.
pub fn stock_data(base: &str, symbol: &str) -> SourceSpec {
    let column = |name: &str| format!("('{name}', '{symbol}')");
    let request = RequestSpec::get(endpoint(base, "/api/stock_data"))
        .query("symbol", symbol)
        .query("display_days", DISPLAY_DAYS);
    SourceSpec::new("stock_data", request)
        .shape(backend_shape().requires("historical_data"))
        .extract(Extract::Columns {
            path: vec!["historical_data".into()],
            columns: vec![
                (column("Close"), "close".into()),
                (column("BB Lower"), "bb_lower".into()),
                (column("BB Upper"), "bb_upper".into()),
                (column("50 Day SMA"), "sma_50".into()),
                (column("200 Day SMA"), "sma_200".into()),
            ],
        })
}

/// `GET /api/forecast`: model output as `yhat`, `yhat_lower`, `yhat_upper`.
pub fn forecast(base: &str, symbol: &str, forecast_days: u32) -> SourceSpec {
    let request = RequestSpec::get(endpoint(base, "/api/forecast"))
        .query("symbol", symbol)
        .query("display_days", DISPLAY_DAYS)
        .query("forecast_days", forecast_days);
    SourceSpec::new("forecast", request)
        .shape(backend_shape().requires("forecast"))
        .extract(Extract::Records {
            path: vec!["forecast".into()],
            date_field: "ds".into(),
            fields: vec![
                ("yhat".into(), "yhat".into()),
                ("yhat_lower".into(), "yhat_lower".into()),
                ("yhat_upper".into(), "yhat_upper".into()),
            ],
        })
}

/// `POST /api/predictions`, passed through.
pub fn predictions(base: &str, symbol: &str) -> SourceSpec {
    let request = RequestSpec::post(endpoint(base, "/api/predictions"), json!({"symbol": symbol}));
    SourceSpec::new("predictions", request).shape(backend_shape())
}

/// `GET /api/news`, passed through.
pub fn news(base: &str, symbol: &str) -> SourceSpec {
    let request = RequestSpec::get(endpoint(base, "/api/news")).query("symbol", symbol);
    SourceSpec::new("news", request).shape(backend_shape())
}

/// `GET /api/recommendation`, passed through.
pub fn recommendation(base: &str, symbol: &str) -> SourceSpec {
    let request = RequestSpec::get(endpoint(base, "/api/recommendation"))
        .query("symbol", symbol)
        .query("display_days", DISPLAY_DAYS);
    SourceSpec::new("recommendation", request).shape(backend_shape())
}

/// All five sources behind the analysis page.
pub fn analysis(base: &str, symbol: &str, forecast_days: u32) -> Vec<SourceSpec> {
    vec![
        stock_data(base, symbol),
        forecast(base, symbol, forecast_days),
        predictions(base, symbol),
        news(base, symbol),
        recommendation(base, symbol),
    ]
}
