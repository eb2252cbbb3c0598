pub mod environment;
pub mod finding;
pub mod cost;
pub mod policy;
pub mod gate;

pub use environment::*;
pub use finding::*;
pub use cost::*;
pub use policy::*;
pub use gate::*;
