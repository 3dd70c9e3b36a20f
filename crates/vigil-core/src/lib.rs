pub mod assignment;
pub mod checkin;
pub mod clock;
pub mod config;
pub mod detector;
pub mod error;
pub mod escalate;
pub mod io;
pub mod orchestrator;
pub mod paths;
pub mod recorder;
pub mod schedule;
pub mod store;

pub use error::{Result, VigilError};
