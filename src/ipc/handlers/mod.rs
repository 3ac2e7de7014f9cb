pub mod core;
pub mod gradebook;
pub mod reports;
pub mod scales;
