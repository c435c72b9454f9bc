//! Scripted driver for exercising the loader without a database.

mod scripted;

pub use scripted::{DriverEvent, ScriptedConnection};
