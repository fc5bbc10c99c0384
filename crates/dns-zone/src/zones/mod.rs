pub mod deserialise;
pub mod entries;
pub mod serialise;
pub mod types;
