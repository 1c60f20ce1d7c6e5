pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod util;

pub use error::{Error, Result};
