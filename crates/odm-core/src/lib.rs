pub mod error;
pub use error::{MonitorError, ProbeError, RetrieveError, SelectError, SubmitError};

pub mod node;
pub use node::{NodeError, NodeProvider, NodeRef, RemoteNode, TaskHandle};

pub mod observer;
pub use observer::{Event, EventKind, NoopObserver, Observer, RecordingObserver};

pub mod registry;
pub use registry::{DEFAULT_HOST, HOSTS_ENV, resolve, resolve_from_env};

pub mod probe;
pub use probe::probe;

pub mod selector;
pub use selector::{connect, select};

pub mod submit;
pub use submit::{Submitter, collect_images};

pub mod monitor;
pub use monitor::{DEFAULT_MAX_CONNECTION_ERRORS, Monitor};

pub mod retrieve;
pub use retrieve::retrieve;

#[cfg(test)]
pub(crate) mod testing;
