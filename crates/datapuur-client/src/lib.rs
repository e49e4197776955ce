//! DataPuur client runtime
//!
//! State that the DataPuur console keeps on the client side, independent of
//! any UI toolkit:
//!
//! - **Jobs**: background processing jobs (load, clean, transform, graph
//!   generation) tracked by [`JobStore`], polled while any job is active and
//!   persisted as a versioned [`JobSnapshot`]
//! - **Job card**: the [`JobCard`] view model rendered from the store
//! - **Admin**: users and roles behind [`AdminStore`], validated locally
//!   before each request
//! - **Storage**: a small key/value [`ClientStorage`] for the auth token,
//!   sidebar state and the snapshot itself
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use datapuur_client::{
//!     ApiConfig, ClientStorage, HttpJobsApi, JobStore, RestClient, StorageSnapshotStore,
//!     SystemClock, TracingNotifier,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let storage = Arc::new(ClientStorage::open("datapuur.json").await?);
//!     let rest = RestClient::new(ApiConfig::default(), storage.clone())?;
//!
//!     let store = Arc::new(
//!         JobStore::new(
//!             Arc::new(HttpJobsApi::new(rest)),
//!             Arc::new(SystemClock),
//!             Arc::new(TracingNotifier),
//!         )
//!         .with_snapshots(Arc::new(StorageSnapshotStore::new(storage))),
//!     );
//!     store.restore().await?;
//!
//!     store.start_load_data_job("42").await?;
//!     Ok(())
//! }
//! ```

pub mod admin;
pub mod card;
pub mod clock;
pub mod error;
pub mod job;
pub mod job_api;
pub mod job_store;
pub mod notice;
pub mod poller;
pub mod rest;
pub mod snapshot;
pub mod storage;

pub use admin::{
    AdminApi, AdminError, AdminResult, AdminStore, HttpAdminApi, NewRole, NewUser, Role,
    RoleUpdate, User, UserUpdate,
};
pub use card::{JobCard, JobCardEntry};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ClientError, ClientResult};
pub use job::{Job, JobId, JobStatus, JobType, StartJobOptions};
pub use job_api::{HttpJobsApi, JobsApi};
pub use job_store::{JobStore, JobStoreConfig, RefreshOutcome};
pub use notice::{Notice, NoticeLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use poller::{PollControl, Poller};
pub use rest::{ApiConfig, RestClient, StaticToken, TokenSource};
pub use snapshot::{JobSnapshot, SnapshotStore, StorageSnapshotStore};
pub use storage::ClientStorage;
