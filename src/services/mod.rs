pub mod end_condition;
pub mod interpreter;
pub mod lifecycle;
pub mod occurrence;
