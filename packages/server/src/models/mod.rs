pub mod analyze;
pub mod egg;
pub mod shared;
