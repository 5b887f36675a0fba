mod node_index;
pub use node_index::*;

mod bounds_policy;
pub use bounds_policy::*;

mod r_tree;
pub use r_tree::*;

mod tree_pool;
pub use tree_pool::*;

mod config;
pub use config::*;
