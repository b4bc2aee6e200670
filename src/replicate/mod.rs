//! Source-tree replication: fan out every leaf directory N times.
//!
//! Enumeration ([`plan`]) is separated from the copy action ([`copy`]) so
//! traversal and copying can be tested independently. Only leaf
//! directories (no subdirectories) are copy targets, so the fan-out is
//! proportional to the number of leaves, not the number of tree nodes.

pub mod copy;
pub mod plan;

pub use copy::{CopyFailure, ReplicaReport, copy_tree, execute_plan, replicate_run};
pub use plan::{CopySpec, LeafDir, build_plan, copy_dir_name, find_leaf_dirs};
