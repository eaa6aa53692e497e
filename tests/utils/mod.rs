pub mod builders;
pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use builders::{submission, StatsBuilder, TEST_IMAGE};
#[allow(unused_imports)]
pub use mocks::{FailingNarrator, FixedExtractor};
#[allow(unused_imports)]
pub use setup::{eventually, TestSetup, TestSetupBuilder};
