//! Pointer driven move and resize.
//!
//! A drag is a mode of the main event loop rather than a loop of its own:
//! while one is active the manager feeds motion into it, still serves
//! configure, map and expose events, and holds every other event back until
//! the button is released.

use crate::layout::WindowGeometry;
use std::collections::VecDeque;
use x11rb::protocol::Event;
use x11rb::protocol::xproto::{Timestamp, Window};

/// Motion events closer together than this are dropped (about 60Hz).
pub const MOTION_INTERVAL_MS: u32 = 1000 / 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveDrag {
    pub window: Window,
    /// Client position when the drag started.
    pub client_x: i32,
    pub client_y: i32,
    /// Pointer position when the drag started.
    pub pointer_x: i32,
    pub pointer_y: i32,
    pub last_motion: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeDrag {
    pub window: Window,
    pub client_x: i32,
    pub client_y: i32,
    pub last_motion: Timestamp,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Moving(MoveDrag),
    Resizing(ResizeDrag),
}

/// What the loop does with an event while a drag is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragDisposition {
    /// Handled as usual.
    Dispatch,
    Motion,
    Finish,
    /// Held back until the drag ends.
    Defer,
}

impl DragState {
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    pub fn window(&self) -> Option<Window> {
        match self {
            Self::Idle => None,
            Self::Moving(drag) => Some(drag.window),
            Self::Resizing(drag) => Some(drag.window),
        }
    }

    pub fn disposition(event: &Event) -> DragDisposition {
        match event {
            Event::ConfigureRequest(_) | Event::Expose(_) | Event::MapRequest(_) => {
                DragDisposition::Dispatch
            }
            Event::MotionNotify(_) => DragDisposition::Motion,
            Event::ButtonRelease(_) => DragDisposition::Finish,
            Event::Error(_) => DragDisposition::Dispatch,
            _ => DragDisposition::Defer,
        }
    }

    /// Records a motion at `time`. False when it came too soon after the
    /// last accepted one.
    pub fn accept_motion(&mut self, time: Timestamp) -> bool {
        let last_motion = match self {
            Self::Idle => return false,
            Self::Moving(drag) => &mut drag.last_motion,
            Self::Resizing(drag) => &mut drag.last_motion,
        };
        if time.wrapping_sub(*last_motion) <= MOTION_INTERVAL_MS {
            return false;
        }
        *last_motion = time;
        true
    }
}

/// Puts the events held back during a drag in front of `pending`, keeping
/// their order. After a resize the EnterNotify events are dropped, so the
/// pointer warp cannot move focus.
pub fn release_deferred(
    deferred: &mut VecDeque<Event>,
    pending: &mut VecDeque<Event>,
    drop_enter: bool,
) {
    if drop_enter {
        deferred.retain(|event| !matches!(event, Event::EnterNotify(_)));
    }
    while let Some(event) = deferred.pop_back() {
        pending.push_front(event);
    }
}

/// Pulls a window whose outer size is `outer_width`×`outer_height` onto the
/// edges of `area` when it comes within `snap` pixels of them.
pub fn snap_position(
    x: i32,
    y: i32,
    outer_width: i32,
    outer_height: i32,
    area: WindowGeometry,
    snap: i32,
) -> (i32, i32) {
    let right = area.x_coordinate + area.width;
    let bottom = area.y_coordinate + area.height;

    let x = if (area.x_coordinate - x).abs() < snap {
        area.x_coordinate
    } else if (right - (x + outer_width)).abs() < snap {
        right - outer_width
    } else {
        x
    };

    let y = if (area.y_coordinate - y).abs() < snap {
        area.y_coordinate
    } else if (bottom - (y + outer_height)).abs() < snap {
        bottom - outer_height
    } else {
        y
    };

    (x, y)
}

/// Size for a resize drag with the pointer at `pointer_x`, `pointer_y`.
pub fn resize_size(
    pointer_x: i32,
    pointer_y: i32,
    client_x: i32,
    client_y: i32,
    border_width: i32,
) -> (i32, i32) {
    (
        (pointer_x - client_x - 2 * border_width + 1).max(1),
        (pointer_y - client_y - 2 * border_width + 1).max(1),
    )
}

/// Whether a resize to `width`×`height`, measured from the client's home
/// area, still ends inside the selected monitor's `area`. Only inside
/// resizes may promote a tiled client to floating; the resize itself is
/// applied either way.
pub fn resize_stays_inside(
    home: WindowGeometry,
    area: WindowGeometry,
    width: i32,
    height: i32,
) -> bool {
    let right = home.x_coordinate + width;
    let bottom = home.y_coordinate + height;
    right >= area.x_coordinate
        && right <= area.x_coordinate + area.width
        && bottom >= area.y_coordinate
        && bottom <= area.y_coordinate + area.height
}

/// A tiled client dragged further than `snap` becomes floating.
pub fn should_float(
    is_floating: bool,
    layout_arranges: bool,
    current: WindowGeometry,
    proposed: WindowGeometry,
    snap: i32,
    resizing: bool,
) -> bool {
    if is_floating || !layout_arranges {
        return false;
    }
    if resizing {
        (proposed.width - current.width).abs() > snap
            || (proposed.height - current.height).abs() > snap
    } else {
        (proposed.x_coordinate - current.x_coordinate).abs() > snap
            || (proposed.y_coordinate - current.y_coordinate).abs() > snap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const AREA: WindowGeometry = WindowGeometry {
        x_coordinate: 0,
        y_coordinate: 20,
        width: 1920,
        height: 1060,
    };

    #[test]
    fn near_an_edge_snaps_exactly_onto_it() {
        assert_eq!(snap_position(10, 300, 402, 302, AREA, 32), (0, 300));
        assert_eq!(snap_position(1500, 45, 402, 302, AREA, 32), (1518, 20));
        assert_eq!(snap_position(700, 770, 402, 302, AREA, 32), (700, 778));
    }

    #[test]
    fn far_from_edges_is_left_alone() {
        assert_eq!(snap_position(500, 400, 402, 302, AREA, 32), (500, 400));
    }

    #[test]
    fn resize_never_collapses() {
        assert_eq!(resize_size(100, 100, 400, 400, 1), (1, 1));
        assert_eq!(resize_size(899, 599, 100, 100, 1), (798, 498));
    }

    #[test]
    fn tiled_client_floats_once_past_the_threshold() {
        let current = WindowGeometry {
            x_coordinate: 0,
            y_coordinate: 20,
            width: 800,
            height: 600,
        };
        let nudged = WindowGeometry {
            x_coordinate: 20,
            ..current
        };
        let dragged = WindowGeometry {
            x_coordinate: 40,
            ..current
        };
        assert!(!should_float(false, true, current, nudged, 32, false));
        assert!(should_float(false, true, current, dragged, 32, false));
        assert!(!should_float(true, true, current, dragged, 32, false));
        assert!(!should_float(false, false, current, dragged, 32, false));
    }

    #[test]
    fn motion_is_rate_limited() {
        let mut state = DragState::Moving(MoveDrag {
            window: 1,
            client_x: 0,
            client_y: 0,
            pointer_x: 0,
            pointer_y: 0,
            last_motion: 1000,
        });
        assert!(!state.accept_motion(1010));
        assert!(state.accept_motion(1017));
        assert!(!state.accept_motion(1020));
        assert!(!DragState::Idle.accept_motion(5000));
    }

    #[test]
    fn only_the_loop_relevant_events_pass_through() {
        let release = Event::ButtonRelease(Default::default());
        let key = Event::KeyPress(Default::default());
        let map = Event::MapRequest(Default::default());
        assert_eq!(DragState::disposition(&release), DragDisposition::Finish);
        assert_eq!(DragState::disposition(&key), DragDisposition::Defer);
        assert_eq!(DragState::disposition(&map), DragDisposition::Dispatch);
    }

    #[test]
    fn resize_past_the_monitor_edge_is_outside() {
        let area = WindowGeometry {
            x_coordinate: 0,
            y_coordinate: 0,
            width: 1000,
            height: 800,
        };
        let (width, height) = resize_size(1200, 599, 0, 0, 1);
        assert_eq!((width, height), (1199, 598));
        assert!(!resize_stays_inside(area, area, width, height));
        assert!(resize_stays_inside(area, area, 900, 598));
    }

    #[test]
    fn resized_tiled_client_floats_past_the_threshold() {
        let current = WindowGeometry {
            x_coordinate: 0,
            y_coordinate: 20,
            width: 800,
            height: 600,
        };
        let wider = WindowGeometry {
            width: 900,
            ..current
        };
        let nudged = WindowGeometry {
            width: 810,
            ..current
        };
        assert!(should_float(false, true, current, wider, 32, true));
        assert!(!should_float(false, true, current, nudged, 32, true));
    }

    #[test]
    fn deferred_events_replay_before_pending_ones() {
        let mut deferred: VecDeque<Event> = VecDeque::from([
            Event::KeyPress(Default::default()),
            Event::EnterNotify(Default::default()),
        ]);
        let mut pending = VecDeque::from([Event::MapRequest(Default::default())]);
        release_deferred(&mut deferred, &mut pending, false);
        assert!(deferred.is_empty());
        assert_eq!(pending.len(), 3);
        assert!(matches!(pending[0], Event::KeyPress(_)));
        assert!(matches!(pending[1], Event::EnterNotify(_)));
        assert!(matches!(pending[2], Event::MapRequest(_)));
    }

    #[test]
    fn a_finished_resize_drops_deferred_enter_events() {
        let mut deferred: VecDeque<Event> = VecDeque::from([
            Event::EnterNotify(Default::default()),
            Event::KeyPress(Default::default()),
            Event::EnterNotify(Default::default()),
        ]);
        let mut pending = VecDeque::new();
        release_deferred(&mut deferred, &mut pending, true);
        assert_eq!(pending.len(), 1);
        assert!(matches!(pending[0], Event::KeyPress(_)));
    }
}
