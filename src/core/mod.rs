pub mod error;
pub mod types;
pub mod value;

pub use error::{ErrorKind, Result, RuleError};
pub use types::{AlgorithmConfiguration, DataNode, Properties};
pub use value::ShardingValue;
