use crate::Config;
use crate::client::TagMask;
use crate::errors::WmError;
use crate::layout::WindowGeometry;
use x11rb::protocol::xinerama::ConnectionExt as _;
use x11rb::protocol::xproto::{Screen, Window};
use x11rb::rust_connection::RustConnection;

type WmResult<T> = Result<T, WmError>;

#[derive(Debug, Clone)]
pub struct Monitor {
    pub layout_symbol: String,
    pub master_factor: f32,
    pub num_master: i32,
    pub monitor_number: usize,
    pub bar_y_position: i32,
    pub screen_x: i32,
    pub screen_y: i32,
    pub screen_width: i32,
    pub screen_height: i32,
    pub window_area_x: i32,
    pub window_area_y: i32,
    pub window_area_width: i32,
    pub window_area_height: i32,
    pub selected_tags_index: usize,
    pub selected_layout_index: usize,
    pub tagset: [TagMask; 2],
    /// Indices into the configured layout table.
    pub layout_indices: [usize; 2],
    pub show_bar: bool,
    pub top_bar: bool,
    pub clients_head: Option<Window>,
    pub selected_client: Option<Window>,
    pub stack_head: Option<Window>,
    pub bar_window: Option<Window>,
    pub scratchpad: Option<Window>,
    /// Pid of a scratchpad command whose window has not shown up yet.
    pub scratchpad_pid: Option<u32>,
}

impl Monitor {
    pub fn new(config: &Config) -> Self {
        let symbol = config
            .layouts
            .first()
            .map(|entry| entry.symbol.clone())
            .unwrap_or_default();

        Self {
            layout_symbol: symbol,
            master_factor: config.master_factor,
            num_master: config.num_master,
            monitor_number: 0,
            bar_y_position: 0,
            screen_x: 0,
            screen_y: 0,
            screen_width: 0,
            screen_height: 0,
            window_area_x: 0,
            window_area_y: 0,
            window_area_width: 0,
            window_area_height: 0,
            selected_tags_index: 0,
            selected_layout_index: 0,
            tagset: [1, 1],
            layout_indices: [0, 1 % config.layouts.len().max(1)],
            show_bar: config.show_bar,
            top_bar: config.top_bar,
            clients_head: None,
            selected_client: None,
            stack_head: None,
            bar_window: None,
            scratchpad: None,
            scratchpad_pid: None,
        }
    }

    pub fn get_selected_tag(&self) -> TagMask {
        self.tagset[self.selected_tags_index]
    }

    pub fn selected_layout(&self) -> usize {
        self.layout_indices[self.selected_layout_index]
    }

    pub fn screen_geometry(&self) -> WindowGeometry {
        WindowGeometry {
            x_coordinate: self.screen_x,
            y_coordinate: self.screen_y,
            width: self.screen_width,
            height: self.screen_height,
        }
    }

    pub fn window_area(&self) -> WindowGeometry {
        WindowGeometry {
            x_coordinate: self.window_area_x,
            y_coordinate: self.window_area_y,
            width: self.window_area_width,
            height: self.window_area_height,
        }
    }

    pub fn set_screen_geometry(&mut self, geometry: WindowGeometry, bar_height: i32) {
        self.screen_x = geometry.x_coordinate;
        self.screen_y = geometry.y_coordinate;
        self.screen_width = geometry.width;
        self.screen_height = geometry.height;
        self.window_area_x = geometry.x_coordinate;
        self.window_area_width = geometry.width;
        self.update_bar_position(bar_height);
    }

    /// Carves the bar out of the monitor rectangle. A hidden bar is parked
    /// just above the top edge of the screen.
    pub fn update_bar_position(&mut self, bar_height: i32) {
        self.window_area_y = self.screen_y;
        self.window_area_height = self.screen_height;
        if self.show_bar {
            self.window_area_height -= bar_height;
            if self.top_bar {
                self.bar_y_position = self.window_area_y;
                self.window_area_y += bar_height;
            } else {
                self.bar_y_position = self.window_area_y + self.window_area_height;
            }
        } else {
            self.bar_y_position = -bar_height;
        }
    }
}

/// Geometry of every physical screen, one per unique rectangle.
pub fn query_screens(connection: &RustConnection, screen: &Screen) -> WmResult<Vec<WindowGeometry>> {
    let fallback = || {
        vec![WindowGeometry {
            x_coordinate: 0,
            y_coordinate: 0,
            width: screen.width_in_pixels as i32,
            height: screen.height_in_pixels as i32,
        }]
    };

    let xinerama_active = connection
        .xinerama_is_active()
        .ok()
        .and_then(|cookie| cookie.reply().ok())
        .is_some_and(|reply| reply.state != 0);

    if !xinerama_active {
        return Ok(fallback());
    }

    let Ok(xinerama_cookie) = connection.xinerama_query_screens() else {
        return Ok(fallback());
    };
    let Ok(xinerama_reply) = xinerama_cookie.reply() else {
        return Ok(fallback());
    };

    let mut screens = Vec::<WindowGeometry>::new();
    for screen_info in &xinerama_reply.screen_info {
        if screen_info.width == 0 || screen_info.height == 0 {
            continue;
        }

        let geometry = WindowGeometry {
            x_coordinate: screen_info.x_org as i32,
            y_coordinate: screen_info.y_org as i32,
            width: screen_info.width as i32,
            height: screen_info.height as i32,
        };

        if !screens.contains(&geometry) {
            screens.push(geometry);
        }
    }

    if screens.is_empty() {
        return Ok(fallback());
    }

    screens.sort_by(|a, b| match a.y_coordinate.cmp(&b.y_coordinate) {
        std::cmp::Ordering::Equal => a.x_coordinate.cmp(&b.x_coordinate),
        other => other,
    });

    Ok(screens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> Monitor {
        let mut monitor = Monitor::new(&Config::default());
        monitor.set_screen_geometry(
            WindowGeometry {
                x_coordinate: 0,
                y_coordinate: 0,
                width: 1920,
                height: 1080,
            },
            20,
        );
        monitor
    }

    #[test]
    fn top_bar_pushes_the_window_area_down() {
        let monitor = monitor();
        assert_eq!(monitor.bar_y_position, 0);
        assert_eq!(monitor.window_area_y, 20);
        assert_eq!(monitor.window_area_height, 1060);
    }

    #[test]
    fn bottom_bar_sits_under_the_window_area() {
        let mut monitor = monitor();
        monitor.top_bar = false;
        monitor.update_bar_position(20);
        assert_eq!(monitor.window_area_y, 0);
        assert_eq!(monitor.bar_y_position, 1060);
    }

    #[test]
    fn hidden_bar_gives_back_the_whole_screen() {
        let mut monitor = monitor();
        monitor.show_bar = false;
        monitor.update_bar_position(20);
        assert_eq!(monitor.window_area(), monitor.screen_geometry());
        assert_eq!(monitor.bar_y_position, -20);
    }

    #[test]
    fn new_monitor_uses_configured_defaults() {
        let monitor = Monitor::new(&Config::default());
        assert_eq!(monitor.tagset, [1, 1]);
        assert_eq!(monitor.layout_indices, [0, 1]);
        assert_eq!(monitor.layout_symbol, "#");
        assert!((monitor.master_factor - 0.55).abs() < f32::EPSILON);
    }
}
