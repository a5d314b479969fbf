use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to parse input: {0}")]
    Parse(String),

    #[error("cannot reshape table: {0}")]
    Shape(String),

    #[error("parameter '{name}' not found, available: {available}")]
    UnknownParameter { name: String, available: String },

    #[error("burn-in of {burn_in} steps leaves nothing of a chain with {nsteps} steps")]
    BurnIn { burn_in: usize, nsteps: usize },

    #[error("{} already exists, refusing to overwrite", .0.display())]
    OutputExists(PathBuf),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("plotting failed: {0}")]
    Plot(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
