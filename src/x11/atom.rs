use x11rb::cookie::Cookie;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;

use crate::x11::X11Result;

pub struct AtomCache {
    pub utf8_string: Atom,
    pub wm_protocols: Atom,
    pub wm_delete_window: Atom,
    pub wm_state: Atom,
    pub wm_take_focus: Atom,
    pub net_active_window: Atom,
    pub net_supported: Atom,
    pub net_system_tray: Atom,
    pub net_system_tray_opcode: Atom,
    pub net_system_tray_orientation: Atom,
    pub net_system_tray_orientation_horz: Atom,
    pub net_wm_name: Atom,
    pub net_wm_state: Atom,
    pub net_wm_check: Atom,
    pub net_wm_fullscreen: Atom,
    pub net_wm_window_type: Atom,
    pub net_wm_window_type_dialog: Atom,
    pub net_wm_pid: Atom,
    pub net_client_list: Atom,
    pub manager: Atom,
    pub xembed: Atom,
    pub xembed_info: Atom,
}

fn request<'c>(
    connection: &'c RustConnection,
    name: &[u8],
) -> X11Result<Cookie<'c, RustConnection, InternAtomReply>> {
    Ok(connection.intern_atom(false, name)?)
}

impl AtomCache {
    pub fn new(connection: &RustConnection) -> X11Result<Self> {
        // Every request goes out before the first reply is awaited.
        let utf8_string = request(connection, b"UTF8_STRING")?;
        let wm_protocols = request(connection, b"WM_PROTOCOLS")?;
        let wm_delete_window = request(connection, b"WM_DELETE_WINDOW")?;
        let wm_state = request(connection, b"WM_STATE")?;
        let wm_take_focus = request(connection, b"WM_TAKE_FOCUS")?;
        let net_active_window = request(connection, b"_NET_ACTIVE_WINDOW")?;
        let net_supported = request(connection, b"_NET_SUPPORTED")?;
        let net_system_tray = request(connection, b"_NET_SYSTEM_TRAY_S0")?;
        let net_system_tray_opcode = request(connection, b"_NET_SYSTEM_TRAY_OPCODE")?;
        let net_system_tray_orientation = request(connection, b"_NET_SYSTEM_TRAY_ORIENTATION")?;
        let net_system_tray_orientation_horz =
            request(connection, b"_NET_SYSTEM_TRAY_ORIENTATION_HORZ")?;
        let net_wm_name = request(connection, b"_NET_WM_NAME")?;
        let net_wm_state = request(connection, b"_NET_WM_STATE")?;
        let net_wm_check = request(connection, b"_NET_SUPPORTING_WM_CHECK")?;
        let net_wm_fullscreen = request(connection, b"_NET_WM_STATE_FULLSCREEN")?;
        let net_wm_window_type = request(connection, b"_NET_WM_WINDOW_TYPE")?;
        let net_wm_window_type_dialog = request(connection, b"_NET_WM_WINDOW_TYPE_DIALOG")?;
        let net_wm_pid = request(connection, b"_NET_WM_PID")?;
        let net_client_list = request(connection, b"_NET_CLIENT_LIST")?;
        let manager = request(connection, b"MANAGER")?;
        let xembed = request(connection, b"_XEMBED")?;
        let xembed_info = request(connection, b"_XEMBED_INFO")?;

        Ok(Self {
            utf8_string: utf8_string.reply()?.atom,
            wm_protocols: wm_protocols.reply()?.atom,
            wm_delete_window: wm_delete_window.reply()?.atom,
            wm_state: wm_state.reply()?.atom,
            wm_take_focus: wm_take_focus.reply()?.atom,
            net_active_window: net_active_window.reply()?.atom,
            net_supported: net_supported.reply()?.atom,
            net_system_tray: net_system_tray.reply()?.atom,
            net_system_tray_opcode: net_system_tray_opcode.reply()?.atom,
            net_system_tray_orientation: net_system_tray_orientation.reply()?.atom,
            net_system_tray_orientation_horz: net_system_tray_orientation_horz.reply()?.atom,
            net_wm_name: net_wm_name.reply()?.atom,
            net_wm_state: net_wm_state.reply()?.atom,
            net_wm_check: net_wm_check.reply()?.atom,
            net_wm_fullscreen: net_wm_fullscreen.reply()?.atom,
            net_wm_window_type: net_wm_window_type.reply()?.atom,
            net_wm_window_type_dialog: net_wm_window_type_dialog.reply()?.atom,
            net_wm_pid: net_wm_pid.reply()?.atom,
            net_client_list: net_client_list.reply()?.atom,
            manager: manager.reply()?.atom,
            xembed: xembed.reply()?.atom,
            xembed_info: xembed_info.reply()?.atom,
        })
    }

    /// Atoms advertised through `_NET_SUPPORTED`.
    pub fn supported(&self) -> [Atom; 14] {
        [
            self.net_active_window,
            self.net_supported,
            self.net_system_tray,
            self.net_system_tray_opcode,
            self.net_system_tray_orientation,
            self.net_system_tray_orientation_horz,
            self.net_wm_name,
            self.net_wm_state,
            self.net_wm_check,
            self.net_wm_fullscreen,
            self.net_wm_window_type,
            self.net_wm_window_type_dialog,
            self.net_wm_pid,
            self.net_client_list,
        ]
    }
}
