pub mod record;
pub mod zones;
