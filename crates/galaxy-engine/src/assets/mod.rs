pub mod manifest;
pub mod palette;
pub mod registry;
