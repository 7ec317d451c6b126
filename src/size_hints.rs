//! ICCCM `WM_NORMAL_HINTS` decoding and the size constraint resolver.

use crate::layout::WindowGeometry;

pub mod flags {
    pub const P_MIN_SIZE: u32 = 1 << 4;
    pub const P_MAX_SIZE: u32 = 1 << 5;
    pub const P_RESIZE_INC: u32 = 1 << 6;
    pub const P_ASPECT: u32 = 1 << 7;
    pub const P_BASE_SIZE: u32 = 1 << 8;
}

/// Word offsets into the 18-word property.
pub mod offset {
    pub const FLAGS: usize = 0;
    pub const MIN_WIDTH: usize = 5;
    pub const MIN_HEIGHT: usize = 6;
    pub const MAX_WIDTH: usize = 7;
    pub const MAX_HEIGHT: usize = 8;
    pub const WIDTH_INC: usize = 9;
    pub const HEIGHT_INC: usize = 10;
    pub const MIN_ASPECT_X: usize = 11;
    pub const MIN_ASPECT_Y: usize = 12;
    pub const MAX_ASPECT_X: usize = 13;
    pub const MAX_ASPECT_Y: usize = 14;
    pub const BASE_WIDTH: usize = 15;
    pub const BASE_HEIGHT: usize = 16;
}

pub const WM_NORMAL_HINTS_WORDS: u32 = 18;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SizeHints {
    pub base_width: i32,
    pub base_height: i32,
    pub increment_width: i32,
    pub increment_height: i32,
    pub max_width: i32,
    pub max_height: i32,
    pub min_width: i32,
    pub min_height: i32,
    pub min_aspect: f32,
    pub max_aspect: f32,
}

impl SizeHints {
    /// Decodes the property words. Missing words read as zero, so a short or
    /// absent property yields unconstrained hints.
    pub fn from_wm_normal_hints(words: &[u32]) -> Self {
        use flags::*;
        use offset::*;

        let read = |index: usize| words.get(index).copied().unwrap_or(0) as i32;
        let hint_flags = words.get(FLAGS).copied().unwrap_or(0);

        let (base_width, base_height) = if hint_flags & P_BASE_SIZE != 0 {
            (read(BASE_WIDTH), read(BASE_HEIGHT))
        } else if hint_flags & P_MIN_SIZE != 0 {
            (read(MIN_WIDTH), read(MIN_HEIGHT))
        } else {
            (0, 0)
        };

        let (increment_width, increment_height) = if hint_flags & P_RESIZE_INC != 0 {
            (read(WIDTH_INC), read(HEIGHT_INC))
        } else {
            (0, 0)
        };

        let (max_width, max_height) = if hint_flags & P_MAX_SIZE != 0 {
            (read(MAX_WIDTH), read(MAX_HEIGHT))
        } else {
            (0, 0)
        };

        let (min_width, min_height) = if hint_flags & P_MIN_SIZE != 0 {
            (read(MIN_WIDTH), read(MIN_HEIGHT))
        } else if hint_flags & P_BASE_SIZE != 0 {
            (read(BASE_WIDTH), read(BASE_HEIGHT))
        } else {
            (0, 0)
        };

        let (min_aspect, max_aspect) = if hint_flags & P_ASPECT != 0 {
            let ratio = |numerator: usize, denominator: usize| match read(denominator) {
                0 => 0.0,
                d => read(numerator) as f32 / d as f32,
            };
            (ratio(MIN_ASPECT_Y, MIN_ASPECT_X), ratio(MAX_ASPECT_X, MAX_ASPECT_Y))
        } else {
            (0.0, 0.0)
        };

        Self {
            base_width,
            base_height,
            increment_width,
            increment_height,
            max_width,
            max_height,
            min_width,
            min_height,
            min_aspect,
            max_aspect,
        }
    }

    /// Max equals min on both axes, and both are set.
    pub fn is_fixed(&self) -> bool {
        self.max_width > 0
            && self.max_height > 0
            && self.max_width == self.min_width
            && self.max_height == self.min_height
    }
}

/// Environment the resolver clamps against.
#[derive(Debug, Clone, Copy)]
pub struct HintBounds {
    pub bar_height: i32,
    pub screen: WindowGeometry,
    pub window_area: WindowGeometry,
    /// Honour the client's hints: resize hints are enabled, the client
    /// floats, or the layout leaves geometry alone.
    pub respect_hints: bool,
}

/// Constrains `proposed` for a client currently at `current` with border
/// `border_width`. The flag is true when the result differs from `current`.
pub fn apply_size_hints(
    hints: &SizeHints,
    current: WindowGeometry,
    border_width: i32,
    proposed: WindowGeometry,
    interactive: bool,
    bounds: &HintBounds,
) -> (WindowGeometry, bool) {
    let WindowGeometry {
        x_coordinate: mut x,
        y_coordinate: mut y,
        mut width,
        mut height,
    } = proposed;

    width = width.max(1);
    height = height.max(1);

    let outer_width = current.width + 2 * border_width;
    let outer_height = current.height + 2 * border_width;

    let area = if interactive {
        bounds.screen
    } else {
        bounds.window_area
    };
    let area_right = area.x_coordinate + area.width;
    let area_bottom = area.y_coordinate + area.height;

    if interactive {
        if x > area_right {
            x = area_right - outer_width;
        }
        if y > area_bottom {
            y = area_bottom - outer_height;
        }
        if x + width + 2 * border_width < area.x_coordinate {
            x = area.x_coordinate;
        }
        if y + height + 2 * border_width < area.y_coordinate {
            y = area.y_coordinate;
        }
    } else {
        if x >= area_right {
            x = area_right - outer_width;
        }
        if y >= area_bottom {
            y = area_bottom - outer_height;
        }
        if x + width + 2 * border_width <= area.x_coordinate {
            x = area.x_coordinate;
        }
        if y + height + 2 * border_width <= area.y_coordinate {
            y = area.y_coordinate;
        }
    }

    height = height.max(bounds.bar_height);
    width = width.max(bounds.bar_height);

    if bounds.respect_hints {
        // ICCCM 4.1.2.3: base size only takes part in the aspect
        // computation when it is not also the minimum size.
        let base_is_min =
            hints.base_width == hints.min_width && hints.base_height == hints.min_height;

        if !base_is_min {
            width -= hints.base_width;
            height -= hints.base_height;
        }

        if hints.min_aspect > 0.0 && hints.max_aspect > 0.0 && width > 0 && height > 0 {
            if hints.max_aspect < width as f32 / height as f32 {
                width = (height as f32 * hints.max_aspect + 0.5) as i32;
            } else if hints.min_aspect < height as f32 / width as f32 {
                height = (width as f32 * hints.min_aspect + 0.5) as i32;
            }
        }

        if base_is_min {
            width -= hints.base_width;
            height -= hints.base_height;
        }

        if hints.increment_width > 0 {
            width -= width % hints.increment_width;
        }
        if hints.increment_height > 0 {
            height -= height % hints.increment_height;
        }

        width = (width + hints.base_width).max(hints.min_width);
        height = (height + hints.base_height).max(hints.min_height);

        if hints.max_width > 0 {
            width = width.min(hints.max_width);
        }
        if hints.max_height > 0 {
            height = height.min(hints.max_height);
        }
    }

    let resolved = WindowGeometry {
        x_coordinate: x,
        y_coordinate: y,
        width,
        height,
    };
    (resolved, resolved != current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rect(x: i32, y: i32, width: i32, height: i32) -> WindowGeometry {
        WindowGeometry {
            x_coordinate: x,
            y_coordinate: y,
            width,
            height,
        }
    }

    fn bounds(respect_hints: bool) -> HintBounds {
        HintBounds {
            bar_height: 20,
            screen: rect(0, 0, 1920, 1080),
            window_area: rect(0, 20, 1920, 1060),
            respect_hints,
        }
    }

    fn words(pairs: &[(usize, u32)]) -> Vec<u32> {
        let mut words = vec![0; WM_NORMAL_HINTS_WORDS as usize];
        for &(index, value) in pairs {
            words[index] = value;
        }
        words
    }

    #[test]
    fn short_property_is_unconstrained() {
        assert_eq!(SizeHints::from_wm_normal_hints(&[]), SizeHints::default());
    }

    #[test]
    fn min_size_doubles_as_base_size() {
        let hints = SizeHints::from_wm_normal_hints(&words(&[
            (offset::FLAGS, flags::P_MIN_SIZE),
            (offset::MIN_WIDTH, 100),
            (offset::MIN_HEIGHT, 50),
        ]));
        assert_eq!((hints.base_width, hints.base_height), (100, 50));
        assert_eq!((hints.min_width, hints.min_height), (100, 50));
    }

    #[test]
    fn equal_min_and_max_is_fixed() {
        let hints = SizeHints::from_wm_normal_hints(&words(&[
            (offset::FLAGS, flags::P_MIN_SIZE | flags::P_MAX_SIZE),
            (offset::MIN_WIDTH, 300),
            (offset::MIN_HEIGHT, 200),
            (offset::MAX_WIDTH, 300),
            (offset::MAX_HEIGHT, 200),
        ]));
        assert!(hints.is_fixed());

        let (resolved, _) = apply_size_hints(
            &hints,
            rect(0, 20, 300, 200),
            1,
            rect(10, 30, 800, 600),
            false,
            &bounds(true),
        );
        assert_eq!((resolved.width, resolved.height), (300, 200));
    }

    #[test]
    fn zero_sizes_are_raised_to_bar_height() {
        let (resolved, changed) = apply_size_hints(
            &SizeHints::default(),
            rect(0, 20, 100, 100),
            1,
            rect(0, 20, 0, -5),
            false,
            &bounds(false),
        );
        assert_eq!((resolved.width, resolved.height), (20, 20));
        assert!(changed);
    }

    #[test]
    fn increments_snap_down_from_base() {
        let hints = SizeHints::from_wm_normal_hints(&words(&[
            (offset::FLAGS, flags::P_BASE_SIZE | flags::P_RESIZE_INC),
            (offset::BASE_WIDTH, 4),
            (offset::BASE_HEIGHT, 4),
            (offset::WIDTH_INC, 10),
            (offset::HEIGHT_INC, 20),
        ]));
        let (resolved, _) = apply_size_hints(
            &hints,
            rect(0, 20, 100, 100),
            1,
            rect(0, 20, 457, 333),
            false,
            &bounds(true),
        );
        assert_eq!((resolved.width, resolved.height), (454, 324));
    }

    #[test]
    fn hints_are_ignored_unless_respected() {
        let hints = SizeHints {
            increment_width: 10,
            increment_height: 10,
            ..SizeHints::default()
        };
        let (resolved, _) = apply_size_hints(
            &hints,
            rect(0, 20, 100, 100),
            1,
            rect(0, 20, 457, 333),
            false,
            &bounds(false),
        );
        assert_eq!((resolved.width, resolved.height), (457, 333));
    }

    #[test]
    fn resolution_is_idempotent() {
        let hints = SizeHints {
            base_width: 2,
            base_height: 3,
            increment_width: 7,
            increment_height: 9,
            min_width: 30,
            min_height: 30,
            max_width: 900,
            max_height: 700,
            min_aspect: 0.5,
            max_aspect: 2.0,
        };
        let current = rect(50, 50, 200, 200);
        let proposed = rect(-4000, 5000, 1234, 81);
        let once = apply_size_hints(&hints, current, 2, proposed, true, &bounds(true));
        let twice = apply_size_hints(&hints, current, 2, proposed, true, &bounds(true));
        assert_eq!(once, twice);
    }

    #[test]
    fn resolved_geometry_is_a_fixed_point() {
        let hints = SizeHints {
            base_width: 2,
            base_height: 3,
            increment_width: 7,
            increment_height: 9,
            min_width: 30,
            min_height: 30,
            ..SizeHints::default()
        };
        let (once, _) = apply_size_hints(
            &hints,
            rect(50, 50, 200, 200),
            2,
            rect(-4000, 5000, 1234, 81),
            true,
            &bounds(true),
        );
        assert_eq!(once, rect(0, 876, 1234, 75));

        let settled = apply_size_hints(&hints, once, 2, once, true, &bounds(true));
        assert_eq!(settled, (once, false));
    }

    #[test]
    fn windows_past_the_area_are_pulled_back() {
        let (resolved, _) = apply_size_hints(
            &SizeHints::default(),
            rect(0, 20, 100, 100),
            1,
            rect(1920, 1080, 100, 100),
            false,
            &bounds(false),
        );
        assert_eq!(
            (resolved.x_coordinate, resolved.y_coordinate),
            (1920 - 102, 1080 - 102)
        );
    }
}
