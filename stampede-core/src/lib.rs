//! Stampede load-test engine
//!
//! Simulated users walk the workflow of a weighted random action through a
//! [`stampede_http::RequestClient`]. Each answered step is then judged by a
//! load-dependent [`SuccessModel`]. The [`BatchScheduler`] runs them in
//! bounded-concurrency groups separated by hard barriers, and [`reduce`]
//! folds the immutable results into a [`RunSummary`].

pub mod aggregate;
pub mod error;
pub mod form;
pub mod load_shape;
pub mod pool;
pub mod result;
pub mod runner;
pub mod scheduler;
pub mod simulator;
pub mod sink;
pub mod success;
pub mod workflow;

// Re-export main types
pub use aggregate::{reduce, FailureBreakdown, PeriodStat, RunSummary, Stats};
pub use error::LoadTestError;
pub use form::{Form, FormGenerator, FormPool, Willingness};
pub use load_shape::LoadShape;
pub use pool::{TaskOutcome, WorkerPool};
pub use result::{StepFailure, StepResult, UserContext, UserResult};
pub use runner::{LoadTest, RunReport, Schedule};
pub use scheduler::{BatchScheduler, CohortPlan};
pub use simulator::UserSimulator;
pub use sink::{GroupInfo, GroupKind, ResultSink, TracingSink};
pub use success::SuccessModel;
pub use workflow::{ActionTable, Workflow, WorkflowSet, WorkflowStep};
