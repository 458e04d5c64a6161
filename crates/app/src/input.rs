//! Mouse events to orbit controls.

use corelib::controls::OrbitControls;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Pixels of touchpad scroll that count as one wheel line.
const PIXELS_PER_LINE: f32 = 40.0;

/// Forward a window event to `controls`. `viewport_height` is in physical
/// pixels, matching cursor positions.
pub fn drive_controls(controls: &mut OrbitControls, event: &WindowEvent, viewport_height: f32) {
    match event {
        WindowEvent::MouseInput {
            state,
            button: MouseButton::Left,
            ..
        } => controls.set_dragging(*state == ElementState::Pressed),
        WindowEvent::CursorMoved { position, .. } => {
            controls.cursor_moved(position.x as f32, position.y as f32, viewport_height)
        }
        WindowEvent::CursorLeft { .. } => controls.set_dragging(false),
        WindowEvent::MouseWheel { delta, .. } => {
            let lines = match delta {
                MouseScrollDelta::LineDelta(_, y) => *y,
                MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
            };
            controls.scroll(lines);
        }
        _ => {}
    }
}
