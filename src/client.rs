use crate::layout::WindowGeometry;
use crate::size_hints::SizeHints;
use x11rb::protocol::xproto::Window;

pub type TagMask = u32;

pub fn tag_mask(tag: usize) -> TagMask {
    1 << tag
}

/// Bits of the user visible tags.
pub fn all_tags_mask(tag_count: usize) -> TagMask {
    (1 << tag_count) - 1
}

/// The pseudo tag carried by scratchpads, one past the last real tag.
pub fn scratch_tag(tag_count: usize) -> TagMask {
    1 << tag_count
}

/// A managed top-level window.
///
/// The `old_*` fields hold one saved level of state: whatever the client
/// looked like before it went fullscreen (or was last resized). Nesting two
/// save operations overwrites the first.
#[derive(Debug, Clone)]
pub struct Client {
    pub name: String,
    pub x_position: i32,
    pub y_position: i32,
    pub width: i32,
    pub height: i32,
    pub old_x_position: i32,
    pub old_y_position: i32,
    pub old_width: i32,
    pub old_height: i32,
    pub border_width: i32,
    pub old_border_width: i32,
    pub hints: SizeHints,
    pub hints_valid: bool,
    pub tags: TagMask,
    pub is_fixed: bool,
    pub is_floating: bool,
    pub is_urgent: bool,
    pub never_focus: bool,
    pub old_state: bool,
    pub is_fullscreen: bool,
    pub window: Window,
    pub monitor_index: usize,
    pub next: Option<Window>,
    pub stack_next: Option<Window>,
}

impl Client {
    pub fn new(window: Window, monitor_index: usize, geometry: WindowGeometry) -> Self {
        Self {
            name: String::new(),
            x_position: geometry.x_coordinate,
            y_position: geometry.y_coordinate,
            width: geometry.width,
            height: geometry.height,
            old_x_position: geometry.x_coordinate,
            old_y_position: geometry.y_coordinate,
            old_width: geometry.width,
            old_height: geometry.height,
            border_width: 0,
            old_border_width: 0,
            hints: SizeHints::default(),
            hints_valid: false,
            tags: 0,
            is_fixed: false,
            is_floating: false,
            is_urgent: false,
            never_focus: false,
            old_state: false,
            is_fullscreen: false,
            window,
            monitor_index,
            next: None,
            stack_next: None,
        }
    }

    pub fn geometry(&self) -> WindowGeometry {
        WindowGeometry {
            x_coordinate: self.x_position,
            y_coordinate: self.y_position,
            width: self.width,
            height: self.height,
        }
    }

    pub fn old_geometry(&self) -> WindowGeometry {
        WindowGeometry {
            x_coordinate: self.old_x_position,
            y_coordinate: self.old_y_position,
            width: self.old_width,
            height: self.old_height,
        }
    }

    /// Moves the current geometry into the saved slot and takes `geometry`.
    pub fn set_geometry(&mut self, geometry: WindowGeometry) {
        self.old_x_position = self.x_position;
        self.old_y_position = self.y_position;
        self.old_width = self.width;
        self.old_height = self.height;
        self.x_position = geometry.x_coordinate;
        self.y_position = geometry.y_coordinate;
        self.width = geometry.width;
        self.height = geometry.height;
    }

    /// Saves the geometry, border and floating state, then covers `screen`
    /// borderless.
    pub fn enter_fullscreen(&mut self, screen: WindowGeometry) {
        if self.is_fullscreen {
            return;
        }
        self.is_fullscreen = true;
        self.old_state = self.is_floating;
        self.old_border_width = self.border_width;
        self.border_width = 0;
        self.is_floating = true;
        self.set_geometry(screen);
    }

    /// Puts back what `enter_fullscreen` saved and returns the restored
    /// geometry.
    pub fn leave_fullscreen(&mut self) -> Option<WindowGeometry> {
        if !self.is_fullscreen {
            return None;
        }
        self.is_fullscreen = false;
        self.is_floating = self.old_state;
        self.border_width = self.old_border_width;
        let restored = self.old_geometry();
        self.set_geometry(restored);
        Some(restored)
    }

    pub fn width_with_border(&self) -> i32 {
        self.width + 2 * self.border_width
    }

    pub fn height_with_border(&self) -> i32 {
        self.height + 2 * self.border_width
    }

    pub fn set_size_hints(&mut self, hints: SizeHints) {
        self.is_fixed = hints.is_fixed();
        self.hints = hints;
        self.hints_valid = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scratch_tag_sits_above_the_real_tags() {
        assert_eq!(all_tags_mask(9), 0x1ff);
        assert_eq!(scratch_tag(9), 0x200);
        assert_eq!(scratch_tag(9) & all_tags_mask(9), 0);
    }

    #[test]
    fn set_geometry_saves_the_previous_one() {
        let first = WindowGeometry {
            x_coordinate: 10,
            y_coordinate: 20,
            width: 300,
            height: 200,
        };
        let mut client = Client::new(1, 0, first);
        client.set_geometry(WindowGeometry::default());
        assert_eq!(client.old_geometry(), first);
        assert_eq!(client.geometry(), WindowGeometry::default());
    }

    #[test]
    fn fullscreen_round_trip_restores_the_client() {
        let tiled = WindowGeometry {
            x_coordinate: 0,
            y_coordinate: 20,
            width: 1054,
            height: 1058,
        };
        let screen = WindowGeometry {
            x_coordinate: 0,
            y_coordinate: 0,
            width: 1920,
            height: 1080,
        };
        let mut client = Client::new(7, 0, tiled);
        client.border_width = 1;

        client.enter_fullscreen(screen);
        assert!(client.is_fullscreen);
        assert!(client.is_floating);
        assert_eq!(client.border_width, 0);
        assert_eq!(client.geometry(), screen);

        client.enter_fullscreen(screen);
        assert_eq!(client.old_geometry(), tiled);

        assert_eq!(client.leave_fullscreen(), Some(tiled));
        assert!(!client.is_fullscreen);
        assert!(!client.is_floating);
        assert_eq!(client.border_width, 1);
        assert_eq!(client.geometry(), tiled);
        assert_eq!(client.leave_fullscreen(), None);
    }

    #[test]
    fn floating_client_stays_floating_after_fullscreen() {
        let mut client = Client::new(7, 0, WindowGeometry::default());
        client.is_floating = true;
        client.enter_fullscreen(WindowGeometry {
            width: 800,
            height: 600,
            ..WindowGeometry::default()
        });
        client.leave_fullscreen();
        assert!(client.is_floating);
    }
}
