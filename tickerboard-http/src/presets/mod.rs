/// Alpha Vantage `query` endpoints.
pub mod alpha_vantage;
/// The local analytics and forecast backend.
pub mod backend;
/// Text sentiment classifier.
pub mod sentiment;
