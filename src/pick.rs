//! Pointer picking of GUI elements.
//!
//! GUI quads are flat and axis aligned in normalized device coordinates, so
//! picking them needs no offscreen pass: the cursor is converted to NDC and
//! tested against every [`Flat`](crate::render::Flat) the flows render. The
//! flow drawn last wins, matching what is visible on screen.

use std::collections::HashSet;

use winit::dpi::PhysicalPosition;

use crate::{context::MouseState, flow::GraphicsFlow};

/// Window pixel coordinates (origin top left) to NDC (origin centre, y up).
pub fn to_ndc(position: PhysicalPosition<f64>, width: u32, height: u32) -> [f32; 2] {
    let width = f64::from(width.max(1));
    let height = f64::from(height.max(1));
    [
        (position.x / width * 2.0 - 1.0) as f32,
        (1.0 - position.y / height * 2.0) as f32,
    ]
}

/// Find the GUI element under the cursor.
///
/// # Returns
///
/// `Some((id, flow_ids))` with the element's ID and the flows rendering it,
/// `None` if the cursor is over the 3D scene.
pub fn pick_gui<State, Event>(
    flows: &[Box<dyn GraphicsFlow<State, Event>>],
    mouse_state: &MouseState,
    width: u32,
    height: u32,
) -> Option<(u32, HashSet<usize>)> {
    let ndc = to_ndc(mouse_state.coords, width, height);
    let mut flats = Vec::new();
    flows
        .iter()
        .enumerate()
        .for_each(|(flow_id, flow)| flow.on_render().collect_flats(flow_id, &mut flats));

    let (_, hit) = flats.iter().rev().find(|(_, flat)| flat.contains(ndc))?;
    let flow_ids = flats
        .iter()
        .filter(|(_, flat)| flat.id == hit.id)
        .map(|(flow_id, _)| *flow_id)
        .collect();
    Some((hit.id, flow_ids))
}
