//! # listpipe: start/stop worker modules over named bounded queues
//!
//! A small data-acquisition style pipeline. Each module runs one worker loop
//! on its own thread and talks to its neighbours only through named,
//! bounded queues. The standard topology checks a list reverser end to end:
//!
//! - **Generator**: builds a list of random integers every interval and
//!   sends a copy to each of its output queues
//! - **Transformer**: reverses every list it receives
//! - **Validator**: pairs each reversed list with an untouched copy of its
//!   original and reports mismatches
//!
//! ## Architecture
//!
//! - **Queues** ([`queue`]): crossbeam bounded channels wrapped in named
//!   endpoints; every push and pop is bounded by a timeout
//! - **Workers** ([`worker`]): a thread plus an atomic running flag; stopping
//!   clears the flag and joins, and the loop hands back its counters
//! - **Protocols** ([`protocol`]): retry-push and poll-pop, the only way loops
//!   touch queues
//! - **Issues** ([`issue`]): everything noteworthy becomes a typed [`Issue`]
//!   with a severity, fanned out to `tracing` and any registered sink
//! - **Host** ([`host`]): owns queues and modules and dispatches the
//!   `configure`/`start`/`stop` commands
//!
//! ## Example
//!
//! ```ignore
//! use listpipe::{AppConfig, Command, ModuleHost, Reporter};
//!
//! fn main() -> listpipe::Result<()> {
//!     let mut host = ModuleHost::from_config(&AppConfig::default(), Reporter::new())?;
//!     host.execute(Command::Configure, &[])?;
//!     host.execute(Command::Start, &[])?;
//!     std::thread::sleep(std::time::Duration::from_secs(5));
//!     for (module, summary) in host.execute(Command::Stop, &[])? {
//!         println!("{}: {}", module, summary);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod host;
pub mod issue;
pub mod modules;
pub mod payload;
pub mod protocol;
pub mod queue;
pub mod worker;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{PipelineError, Result};
pub use host::{Command, ModuleHost};
pub use issue::{ChannelSink, Issue, IssueRecord, IssueSink, Reporter, Severity};
pub use modules::{DaqModule, RunSummary};
pub use payload::Payload;
pub use queue::QueueRegistry;
pub use worker::WorkerState;
