use crate::core::scene::SceneRoot;
use crate::galaxy::solar_system::SolarSystem;
use crate::renderer::instance::RenderBuffer;
use crate::systems::lighting::LightState;

/// Build the frame's mesh instances and point lights from the solar systems
/// currently attached to `scene`. Detached or disposed systems are skipped.
/// Directional and ambient lights in `lights` are left as they are.
pub fn build_render_buffer<'a>(
    systems: impl Iterator<Item = &'a SolarSystem>,
    scene: &SceneRoot,
    buffer: &mut RenderBuffer,
    lights: &mut LightState,
) {
    buffer.clear();
    lights.clear_points();

    for system in systems {
        if system.is_disposed() || !scene.contains(system.id()) {
            continue;
        }
        system.write_frame(buffer, lights);
    }
}
