pub mod bodies;
pub mod session;
pub mod solar_system;
pub mod star_field;

pub use bodies::{create_random_solar_systems, create_solar_system, Blueprint, SunLight};
pub use session::{GalaxyView, LifecycleState};
pub use solar_system::{Mesh, Orbit, Planet, SolarSystem, Sun};
pub use star_field::{StarField, StarFieldParams};
