use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstallerError {
    #[error("Disk confirmation failed; aborting before any destructive action")]
    Aborted,

    #[error("{0} is not a block device")]
    NotABlockDevice(String),

    #[error("Command failed: {0}")]
    CommandFailed(String),
}
