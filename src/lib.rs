#![warn(unreachable_pub)]
#![warn(dead_code)]

pub mod api;
pub mod cache;
pub mod config;
pub mod corpus;
pub mod error;
pub mod hash;
pub mod index;
pub mod normalize;
pub mod providers;
pub mod search;
pub mod telemetry;

pub use config::AppConfig;
pub use error::{CoreError, Result};
