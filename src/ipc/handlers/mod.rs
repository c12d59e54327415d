pub mod attendance;
pub mod core;
pub mod import;
pub mod results;
