pub mod citations;
pub mod dispatcher;
pub mod fetcher;
pub mod pipeline;
pub mod synthesizer;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;
