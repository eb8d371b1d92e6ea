//! Section module: turns agent output into parsed sections.
//!
//! Supports `runmqsc` DISPLAY output, `dspmq` output and the plugin's own
//! status lines.

mod agent;
mod dspmq;
mod models;
mod plugin_info;
mod runmqsc;

pub use agent::*;
pub use dspmq::*;
pub use models::*;
pub use plugin_info::*;
pub use runmqsc::*;
