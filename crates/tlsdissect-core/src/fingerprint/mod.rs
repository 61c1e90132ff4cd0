pub mod ja3;
pub mod types;
