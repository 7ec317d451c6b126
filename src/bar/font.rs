use std::ffi::CString;
use x11::xft::{XftColor, XftDraw, XftDrawStringUtf8, XftFont, XftFontOpenName};
use x11::xlib::Drawable;
use x11::xrender::XRenderColor;

use crate::errors::X11Error;
use crate::x11::X11Display;

pub struct Font {
    xft_font: *mut XftFont,
    display: X11Display,
}

impl Font {
    pub fn new(display: X11Display, screen: i32, font_name: &str) -> Result<Self, X11Error> {
        let font_name_cstr =
            CString::new(font_name).map_err(|_| X11Error::FontLoadFailed(font_name.to_string()))?;

        let xft_font =
            unsafe { XftFontOpenName(display.as_ptr(), screen, font_name_cstr.as_ptr()) };

        if xft_font.is_null() {
            return Err(X11Error::FontLoadFailed(font_name.to_string()));
        }

        Ok(Font { xft_font, display })
    }

    pub fn height(&self) -> i32 {
        unsafe { (*self.xft_font).height }
    }

    pub fn ascent(&self) -> i32 {
        unsafe { (*self.xft_font).ascent }
    }

    pub fn text_width(&self, text: &str) -> i32 {
        unsafe {
            let mut extents = std::mem::zeroed();
            x11::xft::XftTextExtentsUtf8(
                self.display.as_ptr(),
                self.xft_font,
                text.as_ptr(),
                text.len() as i32,
                &mut extents,
            );
            extents.xOff as i32
        }
    }

    /// Longest prefix of `text` (on a char boundary) that fits in `width`.
    pub fn truncate<'a>(&self, text: &'a str, width: i32) -> &'a str {
        if self.text_width(text) <= width {
            return text;
        }
        let mut end = text.len();
        while end > 0 {
            end -= 1;
            while end > 0 && !text.is_char_boundary(end) {
                end -= 1;
            }
            if self.text_width(&text[..end]) <= width {
                break;
            }
        }
        &text[..end]
    }
}

impl Drop for Font {
    fn drop(&mut self) {
        unsafe {
            x11::xft::XftFontClose(self.display.as_ptr(), self.xft_font);
        }
    }
}

/// Off-screen pixmap the bar is painted into before being copied to its
/// window.
pub struct DrawingSurface {
    xft_draw: *mut XftDraw,
    pixmap: x11::xlib::Pixmap,
    display: X11Display,
}

impl DrawingSurface {
    pub fn new(
        display: X11Display,
        screen_number: i32,
        window: Drawable,
        width: u32,
        height: u32,
    ) -> Result<Self, X11Error> {
        let visual = display
            .default_visual(screen_number)
            .ok_or(X11Error::DrawCreateFailed)?;
        let colormap = display.default_colormap(screen_number);
        let depth = display.default_depth(screen_number);

        let pixmap = unsafe {
            x11::xlib::XCreatePixmap(display.as_ptr(), window, width.max(1), height.max(1), depth)
        };

        let xft_draw =
            unsafe { x11::xft::XftDrawCreate(display.as_ptr(), pixmap, visual.as_ptr(), colormap) };
        if xft_draw.is_null() {
            unsafe { x11::xlib::XFreePixmap(display.as_ptr(), pixmap) };
            return Err(X11Error::DrawCreateFailed);
        }

        Ok(Self {
            xft_draw,
            pixmap,
            display,
        })
    }

    pub fn pixmap(&self) -> x11::xlib::Pixmap {
        self.pixmap
    }

    pub fn draw_text(&self, font: &Font, color: u32, x: i32, y: i32, text: &str) {
        let red = ((color >> 16) & 0xFF) as u16;
        let green = ((color >> 8) & 0xFF) as u16;
        let blue = (color & 0xFF) as u16;

        let render_color = XRenderColor {
            red: red << 8 | red,
            green: green << 8 | green,
            blue: blue << 8 | blue,
            alpha: 0xFFFF,
        };

        let mut xft_color: XftColor = unsafe { std::mem::zeroed() };

        unsafe {
            x11::xft::XftColorAllocValue(
                x11::xft::XftDrawDisplay(self.xft_draw),
                x11::xft::XftDrawVisual(self.xft_draw),
                x11::xft::XftDrawColormap(self.xft_draw),
                &render_color,
                &mut xft_color,
            );

            XftDrawStringUtf8(
                self.xft_draw,
                &xft_color,
                font.xft_font,
                x,
                y,
                text.as_ptr(),
                text.len() as i32,
            );

            x11::xft::XftColorFree(
                x11::xft::XftDrawDisplay(self.xft_draw),
                x11::xft::XftDrawVisual(self.xft_draw),
                x11::xft::XftDrawColormap(self.xft_draw),
                &mut xft_color,
            );
        }
    }

    /// Copies `width` columns of the pixmap onto `window`.
    pub fn copy_to(&self, window: Drawable, width: u32, height: u32) {
        let gc = crate::x11::xlib_graphic_context::XLibGC::new(self.display, window);
        unsafe {
            x11::xlib::XCopyArea(
                self.display.as_ptr(),
                self.pixmap,
                window,
                gc.ptr(),
                0,
                0,
                width,
                height,
                0,
                0,
            );
        }
        self.display.sync();
    }
}

impl Drop for DrawingSurface {
    fn drop(&mut self) {
        unsafe {
            x11::xft::XftDrawDestroy(self.xft_draw);
            x11::xlib::XFreePixmap(self.display.as_ptr(), self.pixmap);
        }
    }
}
