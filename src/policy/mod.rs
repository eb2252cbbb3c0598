pub mod plan;
pub mod predicate;
pub mod rules;
pub mod validator;

pub use plan::{load_plan, parse_plan, PlanSnapshot};
pub use predicate::Predicate;
pub use rules::{default_rules, PolicyRule};
pub use validator::PolicyValidator;
