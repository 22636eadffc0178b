pub mod aggregate;
pub mod api;
pub mod config;
pub mod error;
pub mod inference;
pub mod model;
pub mod resolver;
pub mod scan;
pub mod store;
pub mod utils;
mod serialization;

pub use api::SchemaService;
pub use config::SchemaConfig;
pub use error::SchemaError;
pub use model::{EntryKind, FunctionEntry, MemberView, Members, SchemaDocument};
pub use resolver::ChainResolution;
pub use store::Schema;
