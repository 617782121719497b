pub mod atomic;
pub mod materialize;
pub mod meta;
pub mod mkdir;
pub mod staging;

pub use atomic::open_dir;
pub use materialize::{preflight, write_file_atomic, StepError, WriteOptions, WriteOutcome};
pub use meta::{kind_of, sha256_hex, sha256_hex_of};
pub use mkdir::create_dir_chain;
pub use staging::StagingFile;
