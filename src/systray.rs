//! System tray: a container window on one bar that docks XEmbed icons.
//!
//! Icons are kept as [`Client`] records. Their `tags` field is reused as the
//! mapped flag: 1 while the icon wants to be shown, 0 otherwise.

use crate::client::Client;
use crate::errors::WmError;
use crate::layout::WindowGeometry;
use crate::size_hints::{HintBounds, apply_size_hints};
use crate::x11::atom::AtomCache;
use tracing::{debug, warn};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

type WmResult<T> = Result<T, WmError>;

pub const SYSTEM_TRAY_REQUEST_DOCK: u32 = 0;

pub const XEMBED_EMBEDDED_NOTIFY: u32 = 0;
pub const XEMBED_WINDOW_ACTIVATE: u32 = 1;
pub const XEMBED_WINDOW_DEACTIVATE: u32 = 2;
pub const XEMBED_FOCUS_IN: u32 = 4;
pub const XEMBED_MODALITY_ON: u32 = 10;
pub const XEMBED_MAPPED: u32 = 1 << 0;
pub const XEMBED_EMBEDDED_VERSION: u32 = 0;

const ORIENTATION_HORIZONTAL: u32 = 0;

/// Icon size for a natural `width`×`height` squeezed into a bar of
/// `bar_height`, before size hints are applied.
pub fn icon_size(width: i32, height: i32, bar_height: i32) -> (i32, i32) {
    let scaled_width = if width == height {
        bar_height
    } else if height == bar_height {
        width
    } else {
        (bar_height as f32 * (width as f32 / height.max(1) as f32)) as i32
    };
    (scaled_width, bar_height)
}

/// Fits `icon` into the bar: aspect preserving scale, then the icon's own
/// size hints, then a final clamp should the hints push it taller than the
/// bar.
pub fn fit_icon(icon: &mut Client, width: i32, height: i32, bounds: &HintBounds) {
    let bar_height = bounds.bar_height;
    let (scaled_width, scaled_height) = icon_size(width, height, bar_height);
    let proposed = WindowGeometry {
        x_coordinate: icon.x_position,
        y_coordinate: icon.y_position,
        width: scaled_width,
        height: scaled_height,
    };
    let (resolved, _) = apply_size_hints(
        &icon.hints,
        icon.geometry(),
        icon.border_width,
        proposed,
        false,
        bounds,
    );

    icon.x_position = resolved.x_coordinate;
    icon.y_position = resolved.y_coordinate;
    icon.width = resolved.width;
    icon.height = resolved.height;

    if icon.height > bar_height {
        icon.width = if icon.width == icon.height {
            bar_height
        } else {
            (bar_height as f32 * (icon.width as f32 / icon.height as f32)) as i32
        };
        icon.height = bar_height;
    }
}

/// Pixels the tray takes out of its bar. Never zero.
pub fn tray_width<'a>(icons: impl IntoIterator<Item = &'a Client>, spacing: i32) -> i32 {
    let width: i32 = icons.into_iter().map(|icon| icon.width + spacing).sum();
    if width > 0 { width + spacing } else { 1 }
}

/// Width left for the bar of `monitor_index` once the tray, hosted on
/// `tray_monitor`, takes its share.
pub fn bar_width(area_width: i32, monitor_index: usize, tray_monitor: usize, tray_width: i32) -> i32 {
    if monitor_index == tray_monitor {
        area_width - tray_width
    } else {
        area_width
    }
}

/// Monitor hosting the tray. Pinning 0 follows the selected monitor;
/// otherwise it is a 1-based monitor number clamped to the last monitor,
/// or the first monitor when `fail_first` is set and it does not exist.
pub fn pinned_monitor(pinning: usize, fail_first: bool, count: usize, selected: usize) -> usize {
    if pinning == 0 {
        return selected;
    }
    if fail_first && count < pinning {
        return 0;
    }
    pinning.min(count).saturating_sub(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconTransition {
    Show,
    Hide,
}

/// Reaction to a new `_XEMBED_INFO` flags word for an icon currently
/// `mapped` or not. `None` when the mapped bit did not change.
pub fn mapped_transition(flags: u32, mapped: bool) -> Option<IconTransition> {
    let wants_mapped = flags & XEMBED_MAPPED != 0;
    match (wants_mapped, mapped) {
        (true, false) => Some(IconTransition::Show),
        (false, true) => Some(IconTransition::Hide),
        _ => None,
    }
}

pub struct Systray {
    pub window: Window,
    /// Newest first.
    pub icons: Vec<Client>,
}

impl Systray {
    /// Creates the container and claims the tray selection. `None` when
    /// another tray already owns it.
    pub fn create(
        connection: &RustConnection,
        root: Window,
        atoms: &AtomCache,
        geometry: (i32, i32),
        bar_height: i32,
        background: u32,
    ) -> WmResult<Option<Self>> {
        let (x, y) = geometry;
        let window = connection.generate_id()?;
        connection.create_window(
            x11rb::COPY_DEPTH_FROM_PARENT,
            window,
            root,
            x as i16,
            y as i16,
            1,
            bar_height as u16,
            0,
            WindowClass::COPY_FROM_PARENT,
            x11rb::COPY_FROM_PARENT,
            &CreateWindowAux::new()
                .background_pixel(background)
                .override_redirect(1)
                .event_mask(EventMask::SUBSTRUCTURE_NOTIFY),
        )?;
        connection.change_property32(
            PropMode::REPLACE,
            window,
            atoms.net_system_tray_orientation,
            AtomEnum::CARDINAL,
            &[ORIENTATION_HORIZONTAL],
        )?;
        connection.map_window(window)?;
        connection.configure_window(
            window,
            &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE),
        )?;
        connection.set_selection_owner(window, atoms.net_system_tray, x11rb::CURRENT_TIME)?;

        let owner = connection
            .get_selection_owner(atoms.net_system_tray)?
            .reply()?
            .owner;
        if owner != window {
            warn!("unable to obtain system tray");
            connection.destroy_window(window)?;
            return Ok(None);
        }

        let event = ClientMessageEvent::new(
            32,
            root,
            atoms.manager,
            [x11rb::CURRENT_TIME, atoms.net_system_tray, window, 0, 0],
        );
        connection.send_event(false, root, EventMask::STRUCTURE_NOTIFY, event)?;
        connection.sync()?;
        debug!(window, "system tray created");

        Ok(Some(Self {
            window,
            icons: Vec::new(),
        }))
    }

    pub fn icon(&self, window: Window) -> Option<&Client> {
        self.icons.iter().find(|icon| icon.window == window)
    }

    pub fn icon_mut(&mut self, window: Window) -> Option<&mut Client> {
        self.icons.iter_mut().find(|icon| icon.window == window)
    }

    pub fn add_icon(&mut self, icon: Client) {
        self.icons.insert(0, icon);
    }

    pub fn remove_icon(&mut self, window: Window) -> Option<Client> {
        let index = self.icons.iter().position(|icon| icon.window == window)?;
        Some(self.icons.remove(index))
    }

    pub fn width(&self, spacing: i32) -> i32 {
        tray_width(&self.icons, spacing)
    }

    /// Lays the icons out left to right, one spacing apart, and returns the
    /// tray width.
    pub fn layout_icons(&mut self, spacing: i32) -> i32 {
        let mut x = 0;
        for icon in &mut self.icons {
            x += spacing;
            icon.x_position = x;
            icon.y_position = 0;
            x += icon.width;
        }
        if x > 0 { x + spacing } else { 1 }
    }

    pub fn send_xembed(
        &self,
        connection: &RustConnection,
        atoms: &AtomCache,
        icon: Window,
        code: u32,
    ) -> WmResult<()> {
        let event = ClientMessageEvent::new(
            32,
            icon,
            atoms.xembed,
            [
                x11rb::CURRENT_TIME,
                code,
                0,
                self.window,
                XEMBED_EMBEDDED_VERSION,
            ],
        );
        connection.send_event(false, icon, EventMask::STRUCTURE_NOTIFY, event)?;
        Ok(())
    }

    pub fn destroy(&self, connection: &RustConnection) -> WmResult<()> {
        connection.unmap_window(self.window)?;
        connection.destroy_window(self.window)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::size_hints::SizeHints;
    use pretty_assertions::assert_eq;

    fn bounds(bar_height: i32) -> HintBounds {
        let area = WindowGeometry {
            x_coordinate: 0,
            y_coordinate: bar_height,
            width: 1920,
            height: 1080 - bar_height,
        };
        HintBounds {
            bar_height,
            screen: WindowGeometry {
                y_coordinate: 0,
                height: 1080,
                ..area
            },
            window_area: area,
            respect_hints: true,
        }
    }

    fn icon(window: Window, width: i32) -> Client {
        let mut icon = Client::new(
            window,
            0,
            WindowGeometry {
                width,
                height: 20,
                ..WindowGeometry::default()
            },
        );
        icon.tags = 1;
        icon
    }

    #[test]
    fn square_icon_takes_the_bar_height() {
        let mut square = Client::new(1, 0, WindowGeometry::default());
        fit_icon(&mut square, 32, 32, &bounds(20));
        assert_eq!((square.width, square.height), (20, 20));
    }

    #[test]
    fn wide_icon_keeps_its_aspect_ratio() {
        assert_eq!(icon_size(64, 32, 20), (40, 20));
        assert_eq!(icon_size(50, 20, 20), (50, 20));
    }

    #[test]
    fn hints_cannot_push_an_icon_past_the_bar() {
        let mut tall = Client::new(1, 0, WindowGeometry::default());
        tall.set_size_hints(SizeHints {
            min_width: 24,
            min_height: 48,
            ..SizeHints::default()
        });
        fit_icon(&mut tall, 24, 48, &bounds(20));
        assert_eq!(tall.height, 20);
        assert_eq!(tall.width, 10);
    }

    #[test]
    fn width_sums_icons_and_spacing() {
        let icons = [icon(1, 20), icon(2, 30)];
        assert_eq!(tray_width(&icons, 2), 20 + 2 + 30 + 2 + 2);
        assert_eq!(tray_width(&[], 2), 1);
    }

    #[test]
    fn layout_matches_the_reserved_width() {
        let mut tray = Systray {
            window: 99,
            icons: vec![icon(1, 20), icon(2, 30)],
        };
        let reserved = tray.width(2);
        assert_eq!(tray.layout_icons(2), reserved);
        assert_eq!(tray.icons[0].x_position, 2);
        assert_eq!(tray.icons[1].x_position, 24);
    }

    #[test]
    fn new_icons_go_first() {
        let mut tray = Systray {
            window: 99,
            icons: vec![icon(1, 20)],
        };
        tray.add_icon(icon(2, 20));
        assert_eq!(tray.icons[0].window, 2);
        assert!(tray.remove_icon(1).is_some());
        assert!(tray.remove_icon(1).is_none());
        assert!(tray.icon(2).is_some());
    }

    #[test]
    fn pinning_zero_follows_the_selection() {
        assert_eq!(pinned_monitor(0, true, 3, 2), 2);
    }

    #[test]
    fn pinning_counts_from_one_and_clamps() {
        assert_eq!(pinned_monitor(1, false, 3, 2), 0);
        assert_eq!(pinned_monitor(2, false, 3, 0), 1);
        assert_eq!(pinned_monitor(5, false, 3, 0), 2);
        assert_eq!(pinned_monitor(5, true, 3, 2), 0);
    }

    #[test]
    fn mapped_bit_drives_visibility() {
        assert_eq!(mapped_transition(XEMBED_MAPPED, false), Some(IconTransition::Show));
        assert_eq!(mapped_transition(0, true), Some(IconTransition::Hide));
        assert_eq!(mapped_transition(XEMBED_MAPPED, true), None);
        assert_eq!(mapped_transition(0, false), None);
    }

    #[test]
    fn only_the_hosting_bar_gives_up_room_for_the_tray() {
        assert_eq!(bar_width(1920, 0, 0, 61), 1859);
        assert_eq!(bar_width(1280, 1, 0, 61), 1280);

        // The tray follows focus to the second monitor.
        assert_eq!(bar_width(1920, 0, 1, 61), 1920);
        assert_eq!(bar_width(1280, 1, 1, 61), 1219);
    }
}
