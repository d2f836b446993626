//! Input abstraction layer.
//!
//! Normalizes mouse and touch events into a unified `InputEvent` consumed
//! by the scene tool and the mask brush.

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Click with this held toggles group membership instead of replacing
    /// the selection.
    pub fn toggles_selection(&self) -> bool {
        self.shift || self.ctrl || self.meta
    }
}

/// A normalized input event from any pointing device.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed (mouse down, touch start).
    PointerDown { x: f32, y: f32, modifiers: Modifiers },

    /// Pointer moved (mouse move, touch move).
    PointerMove { x: f32, y: f32 },

    /// Pointer released (mouse up, touch end).
    PointerUp { x: f32, y: f32 },

    /// Wheel / pinch. Positive `delta` zooms in.
    Zoom { delta: f32 },

    /// Keyboard shortcut.
    Key { key: String, modifiers: Modifiers },
}

impl InputEvent {
    pub fn from_pointer_down(x: f32, y: f32, modifiers: Modifiers) -> Self {
        Self::PointerDown { x, y, modifiers }
    }

    pub fn from_pointer_move(x: f32, y: f32) -> Self {
        Self::PointerMove { x, y }
    }

    pub fn from_pointer_up(x: f32, y: f32) -> Self {
        Self::PointerUp { x, y }
    }

    /// Touch start carries no modifiers.
    pub fn from_touch_start(x: f32, y: f32) -> Self {
        Self::PointerDown {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    /// Extract position if this is a pointer event.
    pub fn position(&self) -> Option<(f32, f32)> {
        match self {
            Self::PointerDown { x, y, .. } | Self::PointerMove { x, y } | Self::PointerUp { x, y } => {
                Some((*x, *y))
            }
            _ => None,
        }
    }
}

/// On-screen rectangle of a canvas element, in client pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClientRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ClientRect {
    /// Map a client position to bitmap pixels of a `bitmap_w × bitmap_h`
    /// canvas displayed in this rectangle (`canvas.width / rect.width`).
    pub fn to_bitmap(&self, client_x: f32, client_y: f32, bitmap_w: u32, bitmap_h: u32) -> (f32, f32) {
        let sx = if self.width > 0.0 {
            bitmap_w as f32 / self.width
        } else {
            1.0
        };
        let sy = if self.height > 0.0 {
            bitmap_h as f32 / self.height
        } else {
            1.0
        };
        ((client_x - self.left) * sx, (client_y - self.top) * sy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_to_bitmap_scales_per_axis() {
        let rect = ClientRect {
            left: 100.0,
            top: 50.0,
            width: 200.0,
            height: 100.0,
        };
        assert_eq!(rect.to_bitmap(200.0, 100.0, 400, 400), (200.0, 200.0));
        assert_eq!(rect.to_bitmap(100.0, 50.0, 400, 400), (0.0, 0.0));
    }

    #[test]
    fn collapsed_rect_does_not_divide_by_zero() {
        let rect = ClientRect {
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
        };
        assert_eq!(rect.to_bitmap(5.0, 6.0, 10, 10), (5.0, 6.0));
    }

    #[test]
    fn touch_and_mouse_share_positions() {
        let touch = InputEvent::from_touch_start(3.0, 4.0);
        let mouse = InputEvent::from_pointer_down(3.0, 4.0, Modifiers::NONE);
        assert_eq!(touch, mouse);
        assert_eq!(InputEvent::from_pointer_up(1.0, 2.0).position(), Some((1.0, 2.0)));
        assert_eq!(InputEvent::Zoom { delta: 0.1 }.position(), None);
    }

    #[test]
    fn modifier_click_toggles() {
        assert!(!Modifiers::NONE.toggles_selection());
        let shift = Modifiers {
            shift: true,
            ..Modifiers::NONE
        };
        assert!(shift.toggles_selection());
        let alt = Modifiers {
            alt: true,
            ..Modifiers::NONE
        };
        assert!(!alt.toggles_selection());
    }
}
