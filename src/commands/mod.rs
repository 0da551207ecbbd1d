//! CLI 命令实现

pub mod edge;
pub mod serve;

pub use edge::edge_command;
pub use serve::serve_command;
pub use test::test_command;
