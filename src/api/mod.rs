pub mod lifi;

pub use lifi::{
    AggregatorApi, LifiApiClient, LifiError, QuoteRequest, QuoteResponse, QuoteResponsePayload,
    RetryPolicy, TokenRequest, TokenResponse,
};
