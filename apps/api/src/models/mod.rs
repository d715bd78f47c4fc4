pub mod logs;
pub mod usage;
