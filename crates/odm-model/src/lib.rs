mod domain;
pub use domain::{
    DEFAULT_NODE_PORT, Endpoint, LoadSample, NodeAddress, NodeInfo, OptionValue, ProcessingOptions, TaskId,
    TaskSnapshot, TaskStatus,
};

mod error;
pub use error::{ModelError, ModelResult};

mod spec;
pub use spec::{FrameExtractParams, FrameOverrides};
