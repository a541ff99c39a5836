//! Miscellaneous components used in the library.

mod cancellation;
pub use cancellation::CancellationToken;

mod config;
pub use config::LearnerConfig;
pub use config::LocalSearch;
