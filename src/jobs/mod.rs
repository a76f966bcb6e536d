pub mod error;
pub mod scheduler;
pub mod tasks;
pub mod types;

pub use error::{JobError, JobResult};
pub use scheduler::{DEFAULT_JOB_TIMEOUT, JobScheduler, run_task};
pub use tasks::{DailyReportTask, SendMenuTask};
pub use types::{JobContext, JobTask};
