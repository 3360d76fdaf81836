pub mod common;
pub mod mc_methods;
pub mod policy_iteration;
pub mod q_learning;
pub mod value_iteration;
