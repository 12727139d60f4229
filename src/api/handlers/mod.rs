pub mod health;
pub mod metrics;
pub mod requirements;
pub mod wallet;
