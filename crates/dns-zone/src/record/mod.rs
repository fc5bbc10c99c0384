pub mod deserialise;
pub mod duration;
pub mod serialise;
pub mod types;
