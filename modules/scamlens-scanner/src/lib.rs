pub mod areas;
pub mod detection;
pub mod details;
pub mod discovery;
pub mod report;
pub mod scanner;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;
