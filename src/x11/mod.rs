use crate::errors::X11Error;
use crate::x11::atom::AtomCache;
use std::ptr::NonNull;
use x11::xlib::{Display, Visual};
use x11rb::protocol::ErrorKind;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;

pub mod atom;
pub mod xlib_graphic_context;

pub type X11Result<T> = Result<T, X11Error>;

/// The Xlib side of the display, used only for Xft text and pixmaps.
#[derive(Debug, Copy, Clone)]
pub struct X11Display(NonNull<Display>);

impl X11Display {
    pub fn open() -> X11Result<Self> {
        let display = unsafe { x11::xlib::XOpenDisplay(std::ptr::null()) };
        NonNull::new(display)
            .map(Self)
            .ok_or(X11Error::DisplayOpenFailed)
    }

    pub fn as_ptr(&self) -> *mut Display {
        self.0.as_ptr()
    }

    pub fn default_visual(&self, screen_number: i32) -> Option<XVisual> {
        XVisual::from_raw(unsafe { x11::xlib::XDefaultVisual(self.as_ptr(), screen_number) })
    }

    pub fn default_colormap(&self, screen_number: i32) -> x11::xlib::Colormap {
        unsafe { x11::xlib::XDefaultColormap(self.as_ptr(), screen_number) }
    }

    pub fn default_depth(&self, screen_number: i32) -> u32 {
        unsafe { x11::xlib::XDefaultDepth(self.as_ptr(), screen_number) as u32 }
    }

    pub fn sync(&self) {
        unsafe { x11::xlib::XSync(self.as_ptr(), 0) };
    }
}

#[derive(Debug, Clone, Copy)]
pub struct XVisual(NonNull<Visual>);

impl XVisual {
    fn from_raw(ptr: *mut Visual) -> Option<XVisual> {
        NonNull::new(ptr).map(XVisual)
    }

    pub fn as_ptr(&self) -> *mut Visual {
        self.0.as_ptr()
    }
}

/// Errors caused by racing a client that already went away. Everything else
/// is a bug and stops the manager.
pub fn is_ignorable(major_opcode: u8, kind: ErrorKind) -> bool {
    matches!(
        (major_opcode, kind),
        (_, ErrorKind::Window)
            | (SET_INPUT_FOCUS_REQUEST, ErrorKind::Match)
            | (POLY_TEXT8_REQUEST, ErrorKind::Drawable)
            | (POLY_FILL_RECTANGLE_REQUEST, ErrorKind::Drawable)
            | (POLY_SEGMENT_REQUEST, ErrorKind::Drawable)
            | (CONFIGURE_WINDOW_REQUEST, ErrorKind::Match)
            | (GRAB_BUTTON_REQUEST, ErrorKind::Access)
            | (GRAB_KEY_REQUEST, ErrorKind::Access)
            | (COPY_AREA_REQUEST, ErrorKind::Drawable)
    )
}

fn property_words(
    connection: &RustConnection,
    window: Window,
    property: Atom,
    property_type: impl Into<Atom>,
    length: u32,
) -> Option<(Atom, Vec<u32>)> {
    let reply = connection
        .get_property(false, window, property, property_type, 0, length)
        .ok()?
        .reply()
        .ok()?;
    let words = reply.value32()?.collect();
    Some((reply.type_, words))
}

pub fn atom_property(connection: &RustConnection, window: Window, property: Atom) -> Option<Atom> {
    property_words(connection, window, property, AtomEnum::ATOM, 1)?
        .1
        .first()
        .copied()
}

pub fn atom_list_property(
    connection: &RustConnection,
    window: Window,
    property: Atom,
) -> Vec<Atom> {
    property_words(connection, window, property, AtomEnum::ATOM, 64)
        .map(|(_, words)| words)
        .unwrap_or_default()
}

pub fn cardinal_property(
    connection: &RustConnection,
    window: Window,
    property: Atom,
) -> Option<u32> {
    property_words(connection, window, property, AtomEnum::CARDINAL, 1)?
        .1
        .first()
        .copied()
}

/// Flags word of `_XEMBED_INFO` (`[version, flags]`).
pub fn xembed_flags(connection: &RustConnection, atoms: &AtomCache, window: Window) -> Option<u32> {
    let (property_type, words) =
        property_words(connection, window, atoms.xembed_info, atoms.xembed_info, 2)?;
    (property_type == atoms.xembed_info && words.len() == 2).then(|| words[1])
}

pub fn text_property(connection: &RustConnection, window: Window, property: Atom) -> Option<String> {
    let reply = connection
        .get_property(false, window, property, AtomEnum::ANY, 0, 256)
        .ok()?
        .reply()
        .ok()?;
    if reply.value.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(&reply.value);
    Some(text.trim_end_matches('\0').to_string())
}

/// `_NET_WM_NAME`, then `WM_NAME`.
pub fn window_title(connection: &RustConnection, atoms: &AtomCache, window: Window) -> Option<String> {
    text_property(connection, window, atoms.net_wm_name)
        .or_else(|| text_property(connection, window, AtomEnum::WM_NAME.into()))
}

pub fn transient_for(connection: &RustConnection, window: Window) -> Option<Window> {
    property_words(
        connection,
        window,
        AtomEnum::WM_TRANSIENT_FOR.into(),
        AtomEnum::WINDOW,
        1,
    )?
    .1
    .first()
    .copied()
    .filter(|&parent| parent != x11rb::NONE)
}

/// `(class, instance)` from `WM_CLASS`, empty when unset.
pub fn wm_class(connection: &RustConnection, window: Window) -> (String, String) {
    let Some(raw) = text_property(connection, window, AtomEnum::WM_CLASS.into()) else {
        return (String::new(), String::new());
    };
    let mut parts = raw.split('\0');
    let instance = parts.next().unwrap_or_default().to_string();
    let class = parts.next().unwrap_or_default().to_string();
    (class, instance)
}

pub fn wm_state(connection: &RustConnection, atoms: &AtomCache, window: Window) -> Option<u32> {
    property_words(connection, window, atoms.wm_state, atoms.wm_state, 2)?
        .1
        .first()
        .copied()
}

pub fn wm_protocols(connection: &RustConnection, atoms: &AtomCache, window: Window) -> Vec<Atom> {
    atom_list_property(connection, window, atoms.wm_protocols)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_window_is_always_ignored() {
        assert!(is_ignorable(MAP_WINDOW_REQUEST, ErrorKind::Window));
        assert!(is_ignorable(CHANGE_PROPERTY_REQUEST, ErrorKind::Window));
    }

    #[test]
    fn allow_list_pairs_are_ignored() {
        assert!(is_ignorable(SET_INPUT_FOCUS_REQUEST, ErrorKind::Match));
        assert!(is_ignorable(CONFIGURE_WINDOW_REQUEST, ErrorKind::Match));
        assert!(is_ignorable(GRAB_KEY_REQUEST, ErrorKind::Access));
        assert!(is_ignorable(COPY_AREA_REQUEST, ErrorKind::Drawable));
    }

    #[test]
    fn anything_else_is_fatal() {
        assert!(!is_ignorable(CHANGE_WINDOW_ATTRIBUTES_REQUEST, ErrorKind::Access));
        assert!(!is_ignorable(SET_INPUT_FOCUS_REQUEST, ErrorKind::Drawable));
        assert!(!is_ignorable(CREATE_WINDOW_REQUEST, ErrorKind::Alloc));
    }
}
