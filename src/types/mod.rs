pub mod errors;
pub mod file;
pub mod ids;
pub mod plan;
pub mod report;
pub mod safepath;

pub use errors::*;
pub use file::*;
pub use ids::*;
pub use plan::*;
pub use report::*;
pub use safepath::*;
