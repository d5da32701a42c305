pub mod policy;

pub use policy::LockoutOutcome;
pub use policy::LockoutPolicy;
pub use policy::LockoutState;
