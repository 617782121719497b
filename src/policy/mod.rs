pub mod config;

pub use config::{ApplyFlow, Durability, Policy};
