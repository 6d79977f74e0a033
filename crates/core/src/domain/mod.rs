pub mod actions;
pub mod ratings;
