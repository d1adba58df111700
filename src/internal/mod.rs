// Internal utilities shared across nestype modules

pub mod error;
