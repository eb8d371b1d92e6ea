//! mqcheck - IBM MQ monitoring checks
//!
//! Parses the IBM MQ sections of a monitoring agent's output and evaluates
//! channels, queues, queue managers and the agent plugin itself.

pub mod check;
pub mod config;
pub mod plugins;
pub mod section;
