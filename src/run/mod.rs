//! Agent runs: ledger, record, driver and executor.

pub mod detector;
pub mod driver;
pub mod executor;
pub mod ledger;
pub mod prompt;
pub mod publisher;
pub mod state;

pub use detector::Completion;
pub use driver::RunDriver;
pub use executor::AgentRunExecutor;
pub use ledger::StepLedger;
pub use publisher::ProgressPublisher;
pub use state::RunState;
