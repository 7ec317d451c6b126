use super::font::{DrawingSurface, Font};
use crate::ColorScheme;
use crate::client::{TagMask, tag_mask};
use crate::errors::X11Error;
use crate::x11::X11Display;
use crate::x11::xlib_graphic_context::XLibGC;
use x11rb::COPY_DEPTH_FROM_PARENT;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

pub struct TitleContent<'a> {
    pub name: &'a str,
    pub is_floating: bool,
    pub is_fixed: bool,
}

/// Everything one bar shows.
pub struct BarContent<'a> {
    pub tagset: TagMask,
    pub occupied: TagMask,
    pub urgent: TagMask,
    /// Tags of the focused client, only on the selected monitor.
    pub focused_tags: TagMask,
    pub layout_symbol: &'a str,
    /// Status text, only on the selected monitor.
    pub status: Option<&'a str>,
    pub title: Option<TitleContent<'a>>,
    pub is_selected_monitor: bool,
    /// Window area width minus the tray.
    pub width: i32,
}

pub struct Bar {
    window: Window,
    height: i32,
    surface: DrawingSurface,
    gc: XLibGC,
    tags: Vec<String>,
    tag_widths: Vec<i32>,
    symbol_width: i32,
    status_width: i32,
}

impl Bar {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        connection: &RustConnection,
        screen: &Screen,
        screen_number: usize,
        display: X11Display,
        font: &Font,
        tags: &[String],
        geometry: (i32, i32, i32),
        height: i32,
        cursor: Cursor,
    ) -> Result<Self, X11Error> {
        let (x, y, width) = geometry;
        let window = connection.generate_id()?;

        connection.create_window(
            COPY_DEPTH_FROM_PARENT,
            window,
            screen.root,
            x as i16,
            y as i16,
            width.max(1) as u16,
            height as u16,
            0,
            WindowClass::COPY_FROM_PARENT,
            screen.root_visual,
            &CreateWindowAux::new()
                .override_redirect(1)
                .background_pixmap(BackPixmap::PARENT_RELATIVE)
                .event_mask(EventMask::EXPOSURE | EventMask::BUTTON_PRESS)
                .cursor(cursor),
        )?;
        connection.change_property8(
            PropMode::REPLACE,
            window,
            AtomEnum::WM_CLASS,
            AtomEnum::STRING,
            b"tagwm\0tagwm\0",
        )?;
        connection.configure_window(
            window,
            &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE),
        )?;
        connection.map_window(window)?;
        connection.flush()?;

        // Sized to the whole screen so geometry changes never need a new one.
        let surface = DrawingSurface::new(
            display,
            screen_number as i32,
            window as x11::xlib::Drawable,
            screen.width_in_pixels as u32,
            height as u32,
        )?;
        let gc = XLibGC::new(display, surface.pixmap());

        let padding = font.height();
        let tag_widths = tags
            .iter()
            .map(|tag| font.text_width(tag) + padding)
            .collect();

        Ok(Bar {
            window,
            height,
            surface,
            gc,
            tags: tags.to_vec(),
            tag_widths,
            symbol_width: 0,
            status_width: 0,
        })
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn tag_widths(&self) -> &[i32] {
        &self.tag_widths
    }

    /// Width of the layout symbol as last drawn.
    pub fn symbol_width(&self) -> i32 {
        self.symbol_width
    }

    pub fn status_width(&self) -> i32 {
        self.status_width
    }

    pub fn move_resize(
        &self,
        connection: &RustConnection,
        x: i32,
        y: i32,
        width: i32,
    ) -> Result<(), X11Error> {
        connection.configure_window(
            self.window,
            &ConfigureWindowAux::new()
                .x(x)
                .y(y)
                .width(width.max(1) as u32)
                .height(self.height as u32),
        )?;
        Ok(())
    }

    pub fn destroy(&self, connection: &RustConnection) -> Result<(), X11Error> {
        connection.unmap_window(self.window)?;
        connection.destroy_window(self.window)?;
        Ok(())
    }

    fn text(
        &self,
        font: &Font,
        scheme: &ColorScheme,
        x: i32,
        width: i32,
        text: &str,
        invert: bool,
    ) -> i32 {
        let (foreground, background) = if invert {
            (scheme.background, scheme.foreground)
        } else {
            (scheme.foreground, scheme.background)
        };
        let drawable = self.surface.pixmap();
        self.gc
            .fill_rectangle(drawable, background, x, 0, width.max(0) as u32, self.height as u32, true);

        let padding = font.height() / 2;
        let text = font.truncate(text, width - 2 * padding);
        let text_y = (self.height - font.height()) / 2 + font.ascent();
        self.surface.draw_text(font, foreground, x + padding, text_y, text);
        x + width
    }

    /// Small square in the top left corner of a cell.
    fn box_marker(&self, scheme: &ColorScheme, x: i32, offset: i32, size: i32, filled: bool, invert: bool) {
        let color = if invert {
            scheme.background
        } else {
            scheme.foreground
        };
        self.gc.fill_rectangle(
            self.surface.pixmap(),
            color,
            x + offset,
            offset,
            size as u32,
            size as u32,
            filled,
        );
    }

    pub fn draw(
        &mut self,
        font: &Font,
        normal: &ColorScheme,
        selected: &ColorScheme,
        content: &BarContent,
    ) {
        let padding = font.height();
        let box_offset = font.height() / 9;
        let box_size = font.height() / 6 + 2;

        let mut x = 0;
        for (index, (label, &width)) in self.tags.iter().zip(&self.tag_widths).enumerate() {
            let mask = tag_mask(index);
            let scheme = if content.tagset & mask != 0 {
                selected
            } else {
                normal
            };
            let urgent = content.urgent & mask != 0;
            self.text(font, scheme, x, width, label, urgent);
            if content.occupied & mask != 0 {
                let filled = content.is_selected_monitor && content.focused_tags & mask != 0;
                self.box_marker(scheme, x, box_offset, box_size, filled, urgent);
            }
            x += width;
        }

        self.symbol_width = font.text_width(content.layout_symbol) + padding;
        x = self.text(font, normal, x, self.symbol_width, content.layout_symbol, false);

        let mut right = content.width;
        self.status_width = 0;
        if let Some(status) = content.status {
            self.status_width = font.text_width(status) + padding;
            let status_x = (content.width - self.status_width).max(x);
            right = status_x;
            self.text(font, normal, status_x, content.width - status_x, status, false);
        }

        let title_width = right - x;
        if title_width > self.height {
            match &content.title {
                Some(title) => {
                    let scheme = if content.is_selected_monitor {
                        selected
                    } else {
                        normal
                    };
                    self.text(font, scheme, x, title_width, title.name, false);
                    if title.is_floating {
                        self.box_marker(scheme, x, box_offset, box_size, title.is_fixed, false);
                    }
                }
                None => {
                    self.gc.fill_rectangle(
                        self.surface.pixmap(),
                        normal.background,
                        x,
                        0,
                        title_width as u32,
                        self.height as u32,
                        true,
                    );
                }
            }
        }

        self.surface.copy_to(
            self.window as x11::xlib::Drawable,
            content.width.max(1) as u32,
            self.height as u32,
        );
    }
}
