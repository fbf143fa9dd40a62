//! # ATO Engine
//!
//! Waits on the orchestration service's long-running plan operations.
//!
//! Creating a test plan starts server-side *discovery*; starting a run starts
//! *execution*. Both report progress through the plan's `status` tag, but the
//! two phases read that tag differently. This crate owns:
//!
//! - **`policy`**: [`classify`] maps `(phase, status tag)` to
//!   continue / success / failure / unexpected
//! - **`poller`**: [`PlanPoller`] repeatedly fetches the plan, applies the
//!   policy, and sleeps between transient observations
//! - **`error`**: [`PollError`], the closed set of non-success outcomes
//!
//! ## Usage
//!
//! ```ignore
//! use ato_api::{ClientConfig, OrchestratorClient};
//! use ato_engine::{Phase, PlanPoller, PollSettings};
//!
//! let client = OrchestratorClient::new(ClientConfig::new("http://localhost:3001/api/v1")?)?;
//! let plan = PlanPoller::new(&client)
//!     .poll(Phase::Discovery, &plan_id, &PollSettings::discovery())
//!     .await?;
//! ```

pub mod error;
pub mod policy;
pub mod poller;
pub mod source;

pub use error::PollError;
pub use policy::{Phase, PhaseClassification, classify};
pub use poller::{DEFAULT_DISCOVERY_INTERVAL, DEFAULT_EXECUTION_INTERVAL, PlanPoller, PollProgress, PollSettings};
pub use source::{PlanStatusSource, Sleeper, TokioSleeper};
