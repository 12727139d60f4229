pub mod eligibility;

pub use eligibility::evaluate;
