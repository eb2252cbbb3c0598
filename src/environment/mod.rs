pub mod catalog;
pub mod resolver;
pub mod trigger;

pub use catalog::ProfileCatalog;
pub use resolver::EnvironmentResolver;
pub use trigger::{EventKind, Trigger};
