pub mod cli;
pub mod error;
pub mod errorbar;
pub mod logging;
pub mod output;
pub mod posterior;
pub mod render;
pub mod table;

pub use error::{Error, Result};
