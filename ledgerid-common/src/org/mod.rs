pub mod profile;
pub mod registry;
