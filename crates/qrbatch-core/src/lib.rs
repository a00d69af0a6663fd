pub mod config;
pub mod error;
pub mod logging;

pub mod archive;
pub mod batch;
pub mod digest;
pub mod encoder;
pub mod input;
pub mod run;
