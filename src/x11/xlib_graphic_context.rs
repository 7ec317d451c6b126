use crate::x11::X11Display;
use x11::xlib::{Drawable, GC, XCreateGC, XFillRectangle, XFreeGC, XSetForeground};

/// Xlib GC bound to a drawable, freed on drop.
#[derive(Debug)]
pub struct XLibGC {
    gc: GC,
    display: X11Display,
}

impl XLibGC {
    pub fn new(display: X11Display, drawable: Drawable) -> XLibGC {
        XLibGC {
            gc: unsafe { XCreateGC(display.as_ptr(), drawable, 0, std::ptr::null_mut()) },
            display,
        }
    }

    pub fn ptr(&self) -> GC {
        self.gc
    }

    pub fn fill_rectangle(
        &self,
        drawable: Drawable,
        color: u32,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        filled: bool,
    ) {
        unsafe {
            XSetForeground(self.display.as_ptr(), self.gc, color as u64);
            if filled {
                XFillRectangle(self.display.as_ptr(), drawable, self.gc, x, y, width, height);
            } else {
                x11::xlib::XDrawRectangle(
                    self.display.as_ptr(),
                    drawable,
                    self.gc,
                    x,
                    y,
                    width.saturating_sub(1),
                    height.saturating_sub(1),
                );
            }
        }
    }
}

impl Drop for XLibGC {
    fn drop(&mut self) {
        unsafe { XFreeGC(self.display.as_ptr(), self.gc) };
    }
}
