/*!
 * Caption translation jobs.
 *
 * - `models`: Job record, status state machine and snapshots
 * - `manager`: In-memory registry, worker scheduling and observation
 * - `pipeline`: Stages run by a worker
 */

pub mod manager;
pub mod models;
pub mod pipeline;

pub use self::manager::{JobHandle, JobManager, JobReporter};
pub use self::models::{Job, JobSnapshot, JobStatus};
pub use self::pipeline::PipelineContext;
