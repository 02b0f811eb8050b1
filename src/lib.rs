pub mod bootstrap;
pub mod chroot;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod crypt;
pub mod disk;
pub mod errors;
pub mod format;
pub mod logging;
pub mod lvm;
pub mod mount;
pub mod partition;
pub mod pipeline;
pub mod preflight;
