mod address;
pub use address::{DEFAULT_NODE_PORT, Endpoint, NodeAddress};

mod load_sample;
pub use load_sample::LoadSample;

mod node_info;
pub use node_info::NodeInfo;

mod options;
pub use options::{OptionValue, ProcessingOptions};

mod task_id;
pub use task_id::TaskId;

mod task_status;
pub use task_status::TaskStatus;

mod task_snapshot;
pub use task_snapshot::TaskSnapshot;
