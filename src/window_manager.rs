use crate::Config;
use crate::bar::font::Font;
use crate::bar::{Bar, BarContent, ClickRegion, TitleContent, resolve_click};
use crate::client::{Client, TagMask, all_tags_mask, scratch_tag};
use crate::drag::{self, DragDisposition, DragState, MoveDrag, ResizeDrag};
use crate::errors::{WmError, X11Error};
use crate::keyboard::{self, Arg, KeyAction, KeyboardMapping};
use crate::layout::{ArrangeContext, LayoutType, WindowGeometry};
use crate::monitor::query_screens;
use crate::registry::Registry;
use crate::size_hints::{HintBounds, SizeHints, WM_NORMAL_HINTS_WORDS, apply_size_hints};
use crate::systray::{self, IconTransition, Systray};
use crate::x11::atom::AtomCache;
use crate::x11::{self as xprops, X11Display};
use std::collections::VecDeque;
use tracing::{debug, error, info, warn};
use x11rb::connection::Connection;
use x11rb::cursor::Handle as CursorHandle;
use x11rb::protocol::ErrorKind;
use x11rb::protocol::Event;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

type WmResult<T> = Result<T, WmError>;

enum Control {
    Continue,
    Quit,
}

const WM_STATE_WITHDRAWN: u32 = 0;
const WM_STATE_NORMAL: u32 = 1;
const WM_STATE_ICONIC: u32 = 3;

const WM_HINTS_INPUT: u32 = 1 << 0;
const WM_HINTS_URGENCY: u32 = 1 << 8;

const NET_WM_STATE_ADD: u32 = 1;
const NET_WM_STATE_TOGGLE: u32 = 2;

/// Set on events delivered through SendEvent.
const SEND_EVENT_FLAG: u8 = 0x80;

struct Cursors {
    normal: Cursor,
    resize: Cursor,
    moving: Cursor,
}

pub struct WindowManager {
    config: Config,
    connection: RustConnection,
    screen_number: usize,
    root: Window,
    screen: Screen,
    display: X11Display,
    font: Font,
    cursors: Cursors,
    atoms: AtomCache,
    registry: Registry,
    /// One per monitor, same order.
    bars: Vec<Bar>,
    systray: Option<Systray>,
    wm_check_window: Window,
    keyboard_mapping: Option<KeyboardMapping>,
    numlock: u16,
    bar_height: i32,
    status_text: String,
    drag: DragState,
    /// Fetched from the server but not yet handled.
    pending: VecDeque<Event>,
    /// Held back while a drag owns the pointer.
    deferred: VecDeque<Event>,
    motion_monitor: Option<usize>,
}

fn default_status() -> String {
    format!("tagwm-{}", env!("CARGO_PKG_VERSION"))
}

impl WindowManager {
    pub fn new(config: Config) -> WmResult<Self> {
        let (connection, screen_number) = x11rb::connect(None)?;
        let screen = connection.setup().roots[screen_number].clone();
        let root = screen.root;

        let redirect = connection
            .change_window_attributes(
                root,
                &ChangeWindowAttributesAux::new().event_mask(
                    EventMask::SUBSTRUCTURE_REDIRECT
                        | EventMask::SUBSTRUCTURE_NOTIFY
                        | EventMask::BUTTON_PRESS
                        | EventMask::POINTER_MOTION
                        | EventMask::ENTER_WINDOW
                        | EventMask::LEAVE_WINDOW
                        | EventMask::STRUCTURE_NOTIFY
                        | EventMask::PROPERTY_CHANGE,
                ),
            )?
            .check();
        if let Err(x11rb::errors::ReplyError::X11Error(error)) = &redirect
            && error.error_kind == ErrorKind::Access
        {
            return Err(X11Error::AnotherWmRunning.into());
        }
        redirect?;

        crate::signal::ignore_child_exits().map_err(std::io::Error::from)?;

        let display = X11Display::open()?;
        let font = Font::new(display, screen_number as i32, &config.font)?;
        let bar_height = font.height() + 2;

        let resource_database = x11rb::resource_manager::new_from_default(&connection)?;
        let cursor_handle = CursorHandle::new(&connection, screen_number, &resource_database)?.reply()?;
        let cursors = Cursors {
            normal: cursor_handle.load_cursor(&connection, "left_ptr")?,
            resize: cursor_handle.load_cursor(&connection, "sizing")?,
            moving: cursor_handle.load_cursor(&connection, "fleur")?,
        };
        connection.change_window_attributes(
            root,
            &ChangeWindowAttributesAux::new().cursor(cursors.normal),
        )?;

        let atoms = AtomCache::new(&connection)?;
        let wm_check_window = connection.generate_id()?;
        connection.create_window(
            x11rb::COPY_DEPTH_FROM_PARENT,
            wm_check_window,
            root,
            0,
            0,
            1,
            1,
            0,
            WindowClass::COPY_FROM_PARENT,
            x11rb::COPY_FROM_PARENT,
            &CreateWindowAux::new(),
        )?;
        for window in [wm_check_window, root] {
            connection.change_property32(
                PropMode::REPLACE,
                window,
                atoms.net_wm_check,
                AtomEnum::WINDOW,
                &[wm_check_window],
            )?;
        }
        connection.change_property8(
            PropMode::REPLACE,
            wm_check_window,
            atoms.net_wm_name,
            atoms.utf8_string,
            b"tagwm",
        )?;
        connection.change_property32(
            PropMode::REPLACE,
            root,
            atoms.net_supported,
            AtomEnum::ATOM,
            &atoms.supported(),
        )?;
        connection.delete_property(root, atoms.net_client_list)?;

        let mut registry = Registry::new();
        let screens = query_screens(&connection, &screen)?;
        let pointer = connection.query_pointer(root)?.reply()?;
        registry.update_geometry(
            &screens,
            &config,
            bar_height,
            Some((i32::from(pointer.root_x), i32::from(pointer.root_y))),
        );

        let mut window_manager = Self {
            config,
            connection,
            screen_number,
            root,
            screen,
            display,
            font,
            cursors,
            atoms,
            registry,
            bars: Vec::new(),
            systray: None,
            wm_check_window,
            keyboard_mapping: None,
            numlock: 0,
            bar_height,
            status_text: default_status(),
            drag: DragState::Idle,
            pending: VecDeque::new(),
            deferred: VecDeque::new(),
            motion_monitor: None,
        };

        window_manager.update_status();
        window_manager.update_bars()?;
        window_manager.update_systray()?;
        window_manager.grab_keys()?;
        window_manager.focus(None)?;
        window_manager.connection.flush()?;

        info!(
            monitors = window_manager.registry.monitors.len(),
            "tagwm started"
        );
        Ok(window_manager)
    }

    pub fn run(&mut self) -> WmResult<()> {
        self.scan()?;
        if let Some(dir) = dirs::config_dir() {
            crate::signal::run_startup_script(&dir.join("tagwm").join("startup.sh"));
        }
        self.connection.flush()?;

        loop {
            let event = self.next_event()?;
            match self.dispatch(event) {
                Ok(Control::Continue) => {}
                Ok(Control::Quit) => break,
                Err(WmError::X11(X11Error::Reply(error)))
                    if xprops::is_ignorable(error.major_opcode, error.error_kind) =>
                {
                    debug!("ignoring {:?} from request {}", error.error_kind, error.major_opcode);
                }
                Err(error) => return Err(error),
            }
            self.connection.flush()?;
        }

        info!("shutting down");
        self.cleanup()
    }

    fn next_event(&mut self) -> WmResult<Event> {
        if let Some(event) = self.pending.pop_front() {
            return Ok(event);
        }
        Ok(self.connection.wait_for_event()?)
    }

    fn dispatch(&mut self, event: Event) -> WmResult<Control> {
        if !self.drag.is_active() {
            return self.handle_event(event);
        }
        match DragState::disposition(&event) {
            DragDisposition::Dispatch => self.handle_event(event),
            DragDisposition::Motion => {
                if let Event::MotionNotify(motion) = event {
                    self.drag_motion(&motion)?;
                }
                Ok(Control::Continue)
            }
            DragDisposition::Finish => {
                self.finish_drag()?;
                Ok(Control::Continue)
            }
            DragDisposition::Defer => {
                self.deferred.push_back(event);
                Ok(Control::Continue)
            }
        }
    }

    /// Syncs with the server and drops every EnterNotify generated so far.
    fn discard_enter_events(&mut self) -> WmResult<()> {
        self.connection.sync()?;
        while let Some(event) = self.connection.poll_for_event()? {
            self.pending.push_back(event);
        }
        self.pending
            .retain(|event| !matches!(event, Event::EnterNotify(_)));
        Ok(())
    }

    fn scan(&mut self) -> WmResult<()> {
        let tree = self.connection.query_tree(self.root)?.reply()?;
        let mut transients = Vec::new();

        for &window in &tree.children {
            let Some(attributes) = self.window_attributes(window) else {
                continue;
            };
            if attributes.override_redirect {
                continue;
            }
            if xprops::transient_for(&self.connection, window).is_some() {
                transients.push((window, attributes));
                continue;
            }
            if self.is_manageable_on_scan(window, &attributes) {
                self.manage(window)?;
            }
        }

        for (window, attributes) in transients {
            if self.is_manageable_on_scan(window, &attributes) {
                self.manage(window)?;
            }
        }
        debug!(clients = self.registry.clients.len(), "scan complete");
        Ok(())
    }

    fn is_manageable_on_scan(&self, window: Window, attributes: &GetWindowAttributesReply) -> bool {
        attributes.map_state == MapState::VIEWABLE
            || xprops::wm_state(&self.connection, &self.atoms, window) == Some(WM_STATE_ICONIC)
    }

    fn window_attributes(&self, window: Window) -> Option<GetWindowAttributesReply> {
        self.connection
            .get_window_attributes(window)
            .ok()?
            .reply()
            .ok()
    }

    fn grab_keys(&mut self) -> WmResult<()> {
        let (mapping, numlock) =
            keyboard::grab_keys(&self.connection, self.root, &self.config.keybindings)?;
        self.keyboard_mapping = Some(mapping);
        self.numlock = numlock;
        Ok(())
    }

    fn grab_buttons(&self, window: Window, focused: bool) -> WmResult<()> {
        keyboard::grab_buttons(
            &self.connection,
            window,
            &self.config.buttons,
            focused,
            self.numlock,
        )?;
        Ok(())
    }

    fn update_status(&mut self) {
        self.status_text = xprops::text_property(&self.connection, self.root, AtomEnum::WM_NAME.into())
            .filter(|text| !text.is_empty())
            .unwrap_or_else(default_status);
    }

    fn tag_count(&self) -> usize {
        self.config.tags.len()
    }

    fn layout_arranges(&self, monitor_index: usize) -> bool {
        let monitor = &self.registry.monitors[monitor_index];
        self.config
            .layouts
            .get(monitor.selected_layout())
            .is_some_and(|entry| entry.kind.arranges())
    }

    fn hint_bounds(&self, monitor_index: usize, respect_hints: bool) -> HintBounds {
        HintBounds {
            bar_height: self.bar_height,
            screen: WindowGeometry {
                x_coordinate: 0,
                y_coordinate: 0,
                width: i32::from(self.screen.width_in_pixels),
                height: i32::from(self.screen.height_in_pixels),
            },
            window_area: self.registry.monitors[monitor_index].window_area(),
            respect_hints,
        }
    }

    fn monitor_for_window(&self, window: Window) -> WmResult<usize> {
        if window == self.root {
            let pointer = self.connection.query_pointer(self.root)?.reply()?;
            return Ok(self.registry.rect_to_monitor(WindowGeometry {
                x_coordinate: i32::from(pointer.root_x),
                y_coordinate: i32::from(pointer.root_y),
                width: 1,
                height: 1,
            }));
        }
        Ok(self.registry.monitor_for_window(window))
    }

    // --- managing windows ---

    fn manage(&mut self, window: Window) -> WmResult<()> {
        let Some(geometry) = self
            .connection
            .get_geometry(window)
            .ok()
            .and_then(|cookie| cookie.reply().ok())
        else {
            return Ok(());
        };

        let mut client = Client::new(
            window,
            self.registry.selected_monitor,
            WindowGeometry {
                x_coordinate: i32::from(geometry.x),
                y_coordinate: i32::from(geometry.y),
                width: i32::from(geometry.width),
                height: i32::from(geometry.height),
            },
        );
        client.old_border_width = i32::from(geometry.border_width);
        client.name = xprops::window_title(&self.connection, &self.atoms, window)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "broken".to_string());

        let tag_count = self.tag_count();
        let transient = xprops::transient_for(&self.connection, window);
        let mut is_scratchpad = false;

        if let Some(parent) = transient.and_then(|parent| self.registry.client(parent)) {
            client.monitor_index = parent.monitor_index;
            client.tags = parent.tags;
        } else if let Some(monitor_index) = xprops::cardinal_property(&self.connection, window, self.atoms.net_wm_pid)
            .and_then(|pid| self.registry.scratchpad_monitor_for_pid(pid))
        {
            client.monitor_index = monitor_index;
            self.registry.monitors[monitor_index].scratchpad_pid = None;
            is_scratchpad = true;
        } else {
            let wants_scratchpad = self.apply_rules(&mut client);
            is_scratchpad =
                wants_scratchpad && self.registry.monitors[client.monitor_index].scratchpad.is_none();
        }

        let border_width = self.config.border_width as i32;
        let monitor = &mut self.registry.monitors[client.monitor_index];
        if is_scratchpad {
            let area = monitor.window_area();
            let scratch = scratch_tag(tag_count);
            monitor.tagset[monitor.selected_tags_index] |= scratch;
            monitor.scratchpad = Some(window);
            client.tags = scratch;
            client.is_floating = true;
            client.width = area.width / 2 + 1;
            client.height = area.height / 2 + 1;
            client.x_position = area.x_coordinate + (area.width / 2 - client.width / 2 - border_width);
            client.y_position = area.y_coordinate + (area.height / 2 - client.height / 2 - border_width);
        } else {
            let screen = monitor.screen_geometry();
            let area = monitor.window_area();
            if client.x_position + client.width_with_border() > screen.x_coordinate + screen.width {
                client.x_position = screen.x_coordinate + screen.width - client.width_with_border();
            }
            if client.y_position + client.height_with_border() > screen.y_coordinate + screen.height {
                client.y_position = screen.y_coordinate + screen.height - client.height_with_border();
            }
            client.x_position = client.x_position.max(screen.x_coordinate);

            let centre = client.x_position + client.width / 2;
            let under_top_bar = monitor.bar_y_position == monitor.screen_y
                && centre >= area.x_coordinate
                && centre < area.x_coordinate + area.width;
            let top = if under_top_bar {
                self.bar_height
            } else {
                screen.y_coordinate
            };
            client.y_position = client.y_position.max(top);
        }
        client.border_width = border_width;
        let monitor_index = client.monitor_index;
        self.registry.insert(client);

        self.connection.configure_window(
            window,
            &ConfigureWindowAux::new().border_width(border_width as u32),
        )?;
        self.connection.change_window_attributes(
            window,
            &ChangeWindowAttributesAux::new().border_pixel(self.config.scheme_normal.border),
        )?;
        self.send_configure_notify(window)?;
        self.update_window_type(window)?;
        self.update_size_hints(window);
        self.update_wm_hints(window)?;
        self.connection.change_window_attributes(
            window,
            &ChangeWindowAttributesAux::new().event_mask(
                EventMask::ENTER_WINDOW
                    | EventMask::FOCUS_CHANGE
                    | EventMask::PROPERTY_CHANGE
                    | EventMask::STRUCTURE_NOTIFY,
            ),
        )?;
        self.grab_buttons(window, false)?;

        let mut raise = false;
        if let Some(client) = self.registry.client_mut(window) {
            if !client.is_floating {
                client.is_floating = transient.is_some() || client.is_fixed;
                client.old_state = client.is_floating;
            }
            raise = client.is_floating;
        }
        if raise {
            self.raise(window)?;
        }

        self.registry.attach(window);
        self.registry.attach_stack(window);
        self.connection.change_property32(
            PropMode::APPEND,
            self.root,
            self.atoms.net_client_list,
            AtomEnum::WINDOW,
            &[window],
        )?;

        // Off screen until the first arrange places it.
        if let Some(client) = self.registry.client(window) {
            self.connection.configure_window(
                window,
                &ConfigureWindowAux::new()
                    .x(client.x_position + 2 * i32::from(self.screen.width_in_pixels))
                    .y(client.y_position)
                    .width(client.width.max(1) as u32)
                    .height(client.height.max(1) as u32),
            )?;
        }
        self.set_wm_state(window, WM_STATE_NORMAL)?;

        if monitor_index == self.registry.selected_monitor
            && let Some(selected) = self.registry.selected_client()
        {
            self.unfocus(selected, false)?;
        }
        self.registry.monitors[monitor_index].selected_client = Some(window);
        self.arrange(Some(monitor_index))?;
        self.connection.map_window(window)?;
        self.focus(None)?;

        debug!(window, monitor = monitor_index, scratchpad = is_scratchpad, "managed");
        Ok(())
    }

    /// Applies the first matching rules. Returns whether a rule asked for the
    /// window to become the scratchpad.
    fn apply_rules(&self, client: &mut Client) -> bool {
        let (class, instance) = xprops::wm_class(&self.connection, client.window);
        let mut scratchpad = false;
        client.is_floating = false;
        client.tags = 0;

        for rule in &self.config.window_rules {
            if !rule.matches(&class, &instance, &client.name) {
                continue;
            }
            if let Some(is_floating) = rule.is_floating {
                client.is_floating = is_floating;
            }
            if let Some(tags) = rule.tags {
                client.tags |= tags;
            }
            if let Some(number) = rule.monitor
                && let Some(index) = self
                    .registry
                    .monitors
                    .iter()
                    .position(|monitor| monitor.monitor_number as i32 == number)
            {
                client.monitor_index = index;
            }
            scratchpad |= rule.scratchpad;
        }

        client.tags = self
            .registry
            .resolve_tags(client.tags, self.tag_count(), client.monitor_index);
        scratchpad
    }

    fn unmanage(&mut self, window: Window, destroyed: bool) -> WmResult<()> {
        let Some(monitor_index) = self.registry.client(window).map(|c| c.monitor_index) else {
            return Ok(());
        };
        self.release_client(window, destroyed)?;
        self.focus(None)?;
        self.update_client_list()?;
        self.arrange(Some(monitor_index))?;
        debug!(window, destroyed, "unmanaged");
        Ok(())
    }

    /// Drops a client from the registry, handing a live window back in its
    /// original state.
    fn release_client(&mut self, window: Window, destroyed: bool) -> WmResult<()> {
        let Some(client) = self.registry.remove(window) else {
            return Ok(());
        };
        if !destroyed {
            self.connection.grab_server()?;
            self.connection.configure_window(
                window,
                &ConfigureWindowAux::new().border_width(client.old_border_width as u32),
            )?;
            self.connection
                .ungrab_button(ButtonIndex::ANY, window, ModMask::ANY)?;
            self.set_wm_state(window, WM_STATE_WITHDRAWN)?;
            self.connection.sync()?;
            self.connection.ungrab_server()?;
        }
        Ok(())
    }

    fn update_client_list(&self) -> WmResult<()> {
        self.connection.change_property32(
            PropMode::REPLACE,
            self.root,
            self.atoms.net_client_list,
            AtomEnum::WINDOW,
            &self.registry.client_windows(),
        )?;
        Ok(())
    }

    fn set_wm_state(&self, window: Window, state: u32) -> WmResult<()> {
        self.connection.change_property32(
            PropMode::REPLACE,
            window,
            self.atoms.wm_state,
            self.atoms.wm_state,
            &[state, 0],
        )?;
        Ok(())
    }

    fn send_configure_notify(&self, window: Window) -> WmResult<()> {
        let Some(client) = self.registry.client(window) else {
            return Ok(());
        };
        let event = ConfigureNotifyEvent {
            response_type: CONFIGURE_NOTIFY_EVENT,
            sequence: 0,
            event: window,
            window,
            above_sibling: x11rb::NONE,
            x: client.x_position as i16,
            y: client.y_position as i16,
            width: client.width as u16,
            height: client.height as u16,
            border_width: client.border_width as u16,
            override_redirect: false,
        };
        self.connection
            .send_event(false, window, EventMask::STRUCTURE_NOTIFY, event)?;
        Ok(())
    }

    /// Sends `protocol` through WM_PROTOCOLS when the client takes it.
    fn send_protocol(&self, window: Window, protocol: Atom) -> WmResult<bool> {
        let supported =
            xprops::wm_protocols(&self.connection, &self.atoms, window).contains(&protocol);
        if supported {
            let event = ClientMessageEvent::new(
                32,
                window,
                self.atoms.wm_protocols,
                [protocol, x11rb::CURRENT_TIME, 0, 0, 0],
            );
            self.connection
                .send_event(false, window, EventMask::NO_EVENT, event)?;
        }
        Ok(supported)
    }

    // --- client properties ---

    fn read_size_hints(&self, window: Window) -> SizeHints {
        let words: Vec<u32> = self
            .connection
            .get_property(
                false,
                window,
                AtomEnum::WM_NORMAL_HINTS,
                AtomEnum::WM_SIZE_HINTS,
                0,
                WM_NORMAL_HINTS_WORDS,
            )
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .and_then(|reply| reply.value32().map(Iterator::collect))
            .unwrap_or_default();
        SizeHints::from_wm_normal_hints(&words)
    }

    fn update_size_hints(&mut self, window: Window) {
        let hints = self.read_size_hints(window);
        if let Some(client) = self.registry.client_mut(window) {
            client.set_size_hints(hints);
        }
    }

    fn read_wm_hints(&self, window: Window) -> Option<Vec<u32>> {
        let reply = self
            .connection
            .get_property(false, window, AtomEnum::WM_HINTS, AtomEnum::WM_HINTS, 0, 9)
            .ok()?
            .reply()
            .ok()?;
        let words: Vec<u32> = reply.value32()?.collect();
        (!words.is_empty()).then_some(words)
    }

    fn update_wm_hints(&mut self, window: Window) -> WmResult<()> {
        let Some(mut words) = self.read_wm_hints(window) else {
            return Ok(());
        };
        let flags = words[0];
        let is_selected = self.registry.selected_client() == Some(window);

        if is_selected && flags & WM_HINTS_URGENCY != 0 {
            words[0] = flags & !WM_HINTS_URGENCY;
            self.connection.change_property32(
                PropMode::REPLACE,
                window,
                AtomEnum::WM_HINTS,
                AtomEnum::WM_HINTS,
                &words,
            )?;
        }
        if let Some(client) = self.registry.client_mut(window) {
            if !is_selected {
                client.is_urgent = flags & WM_HINTS_URGENCY != 0;
            }
            client.never_focus = flags & WM_HINTS_INPUT != 0 && words.get(1) == Some(&0);
        }
        Ok(())
    }

    fn set_urgent(&mut self, window: Window, urgent: bool) -> WmResult<()> {
        if let Some(client) = self.registry.client_mut(window) {
            client.is_urgent = urgent;
        }
        let Some(mut words) = self.read_wm_hints(window) else {
            return Ok(());
        };
        words[0] = if urgent {
            words[0] | WM_HINTS_URGENCY
        } else {
            words[0] & !WM_HINTS_URGENCY
        };
        self.connection.change_property32(
            PropMode::REPLACE,
            window,
            AtomEnum::WM_HINTS,
            AtomEnum::WM_HINTS,
            &words,
        )?;
        Ok(())
    }

    fn update_title(&mut self, window: Window) {
        let name = xprops::window_title(&self.connection, &self.atoms, window)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "broken".to_string());
        if let Some(client) = self.registry.client_mut(window) {
            client.name = name;
        }
    }

    fn update_window_type(&mut self, window: Window) -> WmResult<()> {
        let state = xprops::atom_property(&self.connection, window, self.atoms.net_wm_state);
        let window_type =
            xprops::atom_property(&self.connection, window, self.atoms.net_wm_window_type);

        if state == Some(self.atoms.net_wm_fullscreen) {
            self.set_fullscreen(window, true)?;
        }
        if window_type == Some(self.atoms.net_wm_window_type_dialog)
            && let Some(client) = self.registry.client_mut(window)
        {
            client.is_floating = true;
        }
        Ok(())
    }

    fn set_fullscreen(&mut self, window: Window, fullscreen: bool) -> WmResult<()> {
        let Some(client) = self.registry.client(window) else {
            return Ok(());
        };
        let monitor_index = client.monitor_index;

        if fullscreen && !client.is_fullscreen {
            self.connection.change_property32(
                PropMode::REPLACE,
                window,
                self.atoms.net_wm_state,
                AtomEnum::ATOM,
                &[self.atoms.net_wm_fullscreen],
            )?;
            let screen = self.registry.monitors[monitor_index].screen_geometry();
            if let Some(client) = self.registry.client_mut(window) {
                client.enter_fullscreen(screen);
            }
            self.configure_client(window)?;
            self.raise(window)?;
        } else if !fullscreen && client.is_fullscreen {
            self.connection.change_property32(
                PropMode::REPLACE,
                window,
                self.atoms.net_wm_state,
                AtomEnum::ATOM,
                &[],
            )?;
            if self
                .registry
                .client_mut(window)
                .and_then(Client::leave_fullscreen)
                .is_some()
            {
                self.configure_client(window)?;
            }
            self.arrange(Some(monitor_index))?;
        }
        Ok(())
    }

    // --- geometry ---

    fn raise(&self, window: Window) -> WmResult<()> {
        self.connection.configure_window(
            window,
            &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE),
        )?;
        Ok(())
    }

    /// Resizes through the size hints; nothing is sent when they leave the
    /// geometry unchanged.
    fn resize(&mut self, window: Window, proposed: WindowGeometry, interactive: bool) -> WmResult<()> {
        let Some(client) = self.registry.client(window) else {
            return Ok(());
        };
        let respect_hints = self.config.resize_hints
            || client.is_floating
            || !self.layout_arranges(client.monitor_index);
        let bounds = self.hint_bounds(client.monitor_index, respect_hints);
        let (geometry, changed) = apply_size_hints(
            &client.hints,
            client.geometry(),
            client.border_width,
            proposed,
            interactive,
            &bounds,
        );
        if changed {
            self.resize_client(window, geometry)?;
        }
        Ok(())
    }

    fn resize_client(&mut self, window: Window, geometry: WindowGeometry) -> WmResult<()> {
        let Some(client) = self.registry.client_mut(window) else {
            return Ok(());
        };
        client.set_geometry(geometry);
        self.configure_client(window)
    }

    /// Pushes the client's recorded geometry and border to the server.
    fn configure_client(&self, window: Window) -> WmResult<()> {
        let Some(client) = self.registry.client(window) else {
            return Ok(());
        };
        let geometry = client.geometry();
        let border_width = client.border_width;
        self.connection.configure_window(
            window,
            &ConfigureWindowAux::new()
                .x(geometry.x_coordinate)
                .y(geometry.y_coordinate)
                .width(geometry.width.max(1) as u32)
                .height(geometry.height.max(1) as u32)
                .border_width(border_width as u32),
        )?;
        self.send_configure_notify(window)
    }

    fn arrange(&mut self, monitor: Option<usize>) -> WmResult<()> {
        match monitor {
            Some(index) => {
                self.show_hide(index)?;
                self.arrange_monitor(index)?;
                self.restack(index)?;
            }
            None => {
                for index in 0..self.registry.monitors.len() {
                    self.show_hide(index)?;
                }
                for index in 0..self.registry.monitors.len() {
                    self.arrange_monitor(index)?;
                }
            }
        }
        Ok(())
    }

    fn arrange_monitor(&mut self, monitor_index: usize) -> WmResult<()> {
        let monitor = &self.registry.monitors[monitor_index];
        let Some(entry) = self.config.layouts.get(monitor.selected_layout()).cloned() else {
            return Ok(());
        };
        self.registry.monitors[monitor_index].layout_symbol = entry.symbol.clone();
        let Some(layout) = entry.kind.arranger() else {
            return Ok(());
        };

        let tiled = self.registry.tiled_clients(monitor_index);
        let border_widths: Vec<i32> = tiled
            .iter()
            .filter_map(|&window| self.registry.client(window))
            .map(|client| client.border_width)
            .collect();
        let monitor = &self.registry.monitors[monitor_index];
        let context = ArrangeContext {
            area: monitor.window_area(),
            master_factor: monitor.master_factor,
            num_master: monitor.num_master,
            visible_count: self.registry.visible_count(monitor_index),
            border_widths: &border_widths,
        };

        let mut result = Ok(());
        let symbol = {
            let mut place = |index: usize, geometry: WindowGeometry| -> WindowGeometry {
                let Some(&window) = tiled.get(index) else {
                    return geometry;
                };
                if let Err(error) = self.resize(window, geometry, false)
                    && result.is_ok()
                {
                    result = Err(error);
                }
                self.registry
                    .client(window)
                    .map_or(geometry, Client::geometry)
            };
            layout.arrange(&context, &mut place)
        };
        result?;

        if let Some(symbol) = symbol {
            self.registry.monitors[monitor_index].layout_symbol = symbol;
        }
        Ok(())
    }

    /// Moves visible clients into place top down and hidden ones off screen
    /// bottom up.
    fn show_hide(&mut self, monitor_index: usize) -> WmResult<()> {
        let arranges = self.layout_arranges(monitor_index);
        let stack: Vec<(Window, bool)> = self
            .registry
            .stack_of(monitor_index)
            .map(|client| (client.window, self.registry.is_visible(client)))
            .collect();

        for &(window, _) in stack.iter().filter(|(_, visible)| *visible) {
            let Some(client) = self.registry.client(window) else {
                continue;
            };
            let geometry = client.geometry();
            let free = (!arranges || client.is_floating) && !client.is_fullscreen;
            self.connection.configure_window(
                window,
                &ConfigureWindowAux::new()
                    .x(geometry.x_coordinate)
                    .y(geometry.y_coordinate),
            )?;
            if free {
                self.resize(window, geometry, false)?;
            }
        }

        for &(window, _) in stack.iter().rev().filter(|(_, visible)| !*visible) {
            let Some(client) = self.registry.client(window) else {
                continue;
            };
            self.connection.configure_window(
                window,
                &ConfigureWindowAux::new()
                    .x(-2 * client.width_with_border())
                    .y(client.y_position),
            )?;
        }
        Ok(())
    }

    /// Raises the selection when it floats and stacks tiled clients under the
    /// bar in focus order.
    fn restack(&mut self, monitor_index: usize) -> WmResult<()> {
        self.draw_bar(monitor_index)?;
        let monitor = &self.registry.monitors[monitor_index];
        let Some(selected) = monitor.selected_client else {
            return Ok(());
        };
        let arranges = self.layout_arranges(monitor_index);
        let selected_floats = self
            .registry
            .client(selected)
            .is_some_and(|client| client.is_floating);
        if selected_floats || !arranges {
            self.raise(selected)?;
        }

        if arranges {
            let mut sibling = monitor.bar_window;
            let tiled: Vec<Window> = self
                .registry
                .stack_of(monitor_index)
                .filter(|client| !client.is_floating && self.registry.is_visible(client))
                .map(|client| client.window)
                .collect();
            for window in tiled {
                let mut aux = ConfigureWindowAux::new().stack_mode(StackMode::BELOW);
                if let Some(sibling) = sibling {
                    aux = aux.sibling(sibling);
                }
                self.connection.configure_window(window, &aux)?;
                sibling = Some(window);
            }
        }
        self.discard_enter_events()
    }

    // --- focus ---

    fn focus(&mut self, candidate: Option<Window>) -> WmResult<()> {
        let change = self.registry.focus(candidate);
        if let Some(previous) = change.unfocused {
            self.unfocus(previous, false)?;
        }

        match change.focused {
            Some(window) => {
                if change.cleared_urgency {
                    self.set_urgent(window, false)?;
                }
                self.grab_buttons(window, true)?;
                self.connection.change_window_attributes(
                    window,
                    &ChangeWindowAttributesAux::new()
                        .border_pixel(self.config.scheme_selected.border),
                )?;
                self.set_focus(window)?;
            }
            None => {
                self.connection.set_input_focus(
                    InputFocus::POINTER_ROOT,
                    self.root,
                    x11rb::CURRENT_TIME,
                )?;
                self.connection
                    .delete_property(self.root, self.atoms.net_active_window)?;
            }
        }
        self.draw_bars()
    }

    fn unfocus(&mut self, window: Window, reset_focus: bool) -> WmResult<()> {
        if self.registry.client(window).is_none() {
            return Ok(());
        }
        self.grab_buttons(window, false)?;
        self.connection.change_window_attributes(
            window,
            &ChangeWindowAttributesAux::new().border_pixel(self.config.scheme_normal.border),
        )?;
        if reset_focus {
            self.connection.set_input_focus(
                InputFocus::POINTER_ROOT,
                self.root,
                x11rb::CURRENT_TIME,
            )?;
            self.connection
                .delete_property(self.root, self.atoms.net_active_window)?;
        }
        Ok(())
    }

    fn set_focus(&self, window: Window) -> WmResult<()> {
        let never_focus = self
            .registry
            .client(window)
            .is_some_and(|client| client.never_focus);
        if !never_focus {
            self.connection.set_input_focus(
                InputFocus::POINTER_ROOT,
                window,
                x11rb::CURRENT_TIME,
            )?;
            self.connection.change_property32(
                PropMode::REPLACE,
                self.root,
                self.atoms.net_active_window,
                AtomEnum::WINDOW,
                &[window],
            )?;
        }
        self.send_protocol(window, self.atoms.wm_take_focus)?;
        Ok(())
    }

    // --- bars and tray ---

    fn update_bars(&mut self) -> WmResult<()> {
        for index in self.bars.len()..self.registry.monitors.len() {
            let width = self.bar_width_on(index);
            let monitor = &self.registry.monitors[index];
            let bar = Bar::new(
                &self.connection,
                &self.screen,
                self.screen_number,
                self.display,
                &self.font,
                &self.config.tags,
                (monitor.window_area_x, monitor.bar_y_position, width),
                self.bar_height,
                self.cursors.normal,
            )?;
            self.registry.monitors[index].bar_window = Some(bar.window());
            self.bars.push(bar);
        }
        Ok(())
    }

    fn tray_monitor(&self) -> usize {
        systray::pinned_monitor(
            self.config.systray_pinning,
            self.config.systray_pinning_fail_first,
            self.registry.monitors.len(),
            self.registry.selected_monitor,
        )
    }

    fn bar_width_on(&self, monitor_index: usize) -> i32 {
        let tray_width = self
            .systray
            .as_ref()
            .map_or(0, |systray| systray.width(self.config.systray_spacing));
        systray::bar_width(
            self.registry.monitors[monitor_index].window_area_width,
            monitor_index,
            self.tray_monitor(),
            tray_width,
        )
    }

    fn move_resize_bar(&self, monitor_index: usize) -> WmResult<()> {
        let monitor = &self.registry.monitors[monitor_index];
        if let Some(bar) = self.bars.get(monitor_index) {
            bar.move_resize(
                &self.connection,
                monitor.window_area_x,
                monitor.bar_y_position,
                self.bar_width_on(monitor_index),
            )?;
        }
        Ok(())
    }

    fn draw_bar(&mut self, monitor_index: usize) -> WmResult<()> {
        self.move_resize_bar(monitor_index)?;
        let bar_width = self.bar_width_on(monitor_index);
        let is_selected_monitor = monitor_index == self.registry.selected_monitor;
        let monitor = &self.registry.monitors[monitor_index];
        let (occupied, urgent) = self.registry.occupied_and_urgent(monitor_index);
        let selected = monitor
            .selected_client
            .and_then(|window| self.registry.client(window));

        let content = BarContent {
            tagset: monitor.get_selected_tag(),
            occupied,
            urgent,
            focused_tags: selected.map_or(0, |client| client.tags),
            layout_symbol: &monitor.layout_symbol,
            status: is_selected_monitor.then_some(self.status_text.as_str()),
            title: selected.map(|client| TitleContent {
                name: &client.name,
                is_floating: client.is_floating,
                is_fixed: client.is_fixed,
            }),
            is_selected_monitor,
            width: bar_width,
        };

        if let Some(bar) = self.bars.get_mut(monitor_index) {
            bar.draw(
                &self.font,
                &self.config.scheme_normal,
                &self.config.scheme_selected,
                &content,
            );
        }
        Ok(())
    }

    fn draw_bars(&mut self) -> WmResult<()> {
        for index in 0..self.registry.monitors.len() {
            self.draw_bar(index)?;
        }
        self.update_systray()
    }

    fn update_systray(&mut self) -> WmResult<()> {
        if !self.config.systray_enabled {
            return Ok(());
        }
        let monitor_index = self.tray_monitor();
        let monitor = &self.registry.monitors[monitor_index];
        let right = monitor.screen_x + monitor.screen_width;
        let bar_y = monitor.bar_y_position;
        let bar_window = monitor.bar_window;

        if self.systray.is_none() {
            self.systray = Systray::create(
                &self.connection,
                self.root,
                &self.atoms,
                (right, bar_y),
                self.bar_height,
                self.config.scheme_normal.background,
            )?;
            if self.systray.is_none() {
                self.config.systray_enabled = false;
                return Ok(());
            }
        }
        let Some(systray) = self.systray.as_mut() else {
            return Ok(());
        };

        let width = systray.layout_icons(self.config.systray_spacing);
        let background = self.config.scheme_normal.background;
        for icon in &systray.icons {
            self.connection.change_window_attributes(
                icon.window,
                &ChangeWindowAttributesAux::new().background_pixel(background),
            )?;
            self.connection.map_window(icon.window)?;
            self.connection.configure_window(
                icon.window,
                &ConfigureWindowAux::new()
                    .x(icon.x_position)
                    .y(0)
                    .width(icon.width.max(1) as u32)
                    .height(icon.height.max(1) as u32)
                    .stack_mode(StackMode::ABOVE),
            )?;
        }

        let mut aux = ConfigureWindowAux::new()
            .x(right - width)
            .y(bar_y)
            .width(width as u32)
            .height(self.bar_height as u32)
            .stack_mode(StackMode::ABOVE);
        if let Some(bar_window) = bar_window {
            aux = aux.sibling(bar_window);
        }
        self.connection.configure_window(systray.window, &aux)?;
        self.connection.map_window(systray.window)?;
        self.connection.map_subwindows(systray.window)?;
        self.connection.change_window_attributes(
            systray.window,
            &ChangeWindowAttributesAux::new().background_pixel(background),
        )?;
        self.connection
            .clear_area(false, systray.window, 0, 0, 0, 0)?;
        Ok(())
    }

    fn refresh_tray(&mut self) -> WmResult<()> {
        self.move_resize_bar(self.tray_monitor())?;
        self.update_systray()
    }

    fn is_tray_icon(&self, window: Window) -> bool {
        self.systray
            .as_ref()
            .is_some_and(|systray| systray.icon(window).is_some())
    }

    fn dock_icon(&mut self, window: Window) -> WmResult<()> {
        let Some(tray_window) = self.systray.as_ref().map(|systray| systray.window) else {
            return Ok(());
        };
        let Some(geometry) = self
            .connection
            .get_geometry(window)
            .ok()
            .and_then(|cookie| cookie.reply().ok())
        else {
            return Ok(());
        };

        let mut icon = Client::new(
            window,
            self.registry.selected_monitor,
            WindowGeometry {
                x_coordinate: 0,
                y_coordinate: 0,
                width: i32::from(geometry.width),
                height: i32::from(geometry.height),
            },
        );
        icon.old_border_width = i32::from(geometry.border_width);
        icon.border_width = 0;
        icon.is_floating = true;
        icon.tags = 1;
        icon.set_size_hints(self.read_size_hints(window));
        let bounds = self.hint_bounds(self.registry.selected_monitor, true);
        let (width, height) = (icon.width, icon.height);
        systray::fit_icon(&mut icon, width, height, &bounds);

        self.connection.change_save_set(SetMode::INSERT, window)?;
        self.connection.change_window_attributes(
            window,
            &ChangeWindowAttributesAux::new().event_mask(
                EventMask::STRUCTURE_NOTIFY | EventMask::PROPERTY_CHANGE | EventMask::RESIZE_REDIRECT,
            ),
        )?;
        self.connection.reparent_window(window, tray_window, 0, 0)?;
        self.connection.change_window_attributes(
            window,
            &ChangeWindowAttributesAux::new().background_pixel(self.config.scheme_normal.background),
        )?;

        if let Some(systray) = self.systray.as_mut() {
            for code in [
                systray::XEMBED_EMBEDDED_NOTIFY,
                systray::XEMBED_FOCUS_IN,
                systray::XEMBED_WINDOW_ACTIVATE,
                systray::XEMBED_MODALITY_ON,
            ] {
                systray.send_xembed(&self.connection, &self.atoms, window, code)?;
            }
            systray.add_icon(icon);
        }
        self.connection.sync()?;
        self.refresh_tray()?;
        self.set_wm_state(window, WM_STATE_NORMAL)?;
        info!(window, "tray icon docked");
        Ok(())
    }

    fn remove_icon(&mut self, window: Window) -> WmResult<()> {
        if let Some(systray) = self.systray.as_mut() {
            systray.remove_icon(window);
        }
        debug!(window, "tray icon removed");
        self.refresh_tray()
    }

    /// Follows the mapped bit of `_XEMBED_INFO`.
    fn update_icon_state(&mut self, window: Window, atom: Atom) -> WmResult<()> {
        if atom != self.atoms.xembed_info {
            return Ok(());
        }
        let Some(flags) = xprops::xembed_flags(&self.connection, &self.atoms, window) else {
            return Ok(());
        };
        let Some(mapped) = self
            .systray
            .as_ref()
            .and_then(|systray| systray.icon(window))
            .map(|icon| icon.tags != 0)
        else {
            return Ok(());
        };

        let (tags, code) = match systray::mapped_transition(flags, mapped) {
            Some(IconTransition::Show) => {
                self.connection.map_window(window)?;
                self.raise(window)?;
                self.set_wm_state(window, WM_STATE_NORMAL)?;
                (1, systray::XEMBED_WINDOW_ACTIVATE)
            }
            Some(IconTransition::Hide) => {
                self.connection.unmap_window(window)?;
                self.set_wm_state(window, WM_STATE_WITHDRAWN)?;
                (0, systray::XEMBED_WINDOW_DEACTIVATE)
            }
            None => return Ok(()),
        };

        if let Some(systray) = self.systray.as_mut() {
            if let Some(icon) = systray.icon_mut(window) {
                icon.tags = tags;
            }
            systray.send_xembed(&self.connection, &self.atoms, window, code)?;
        }
        Ok(())
    }

    // --- events ---

    fn handle_event(&mut self, event: Event) -> WmResult<Control> {
        match event {
            Event::ButtonPress(event) => return self.handle_button_press(&event),
            Event::KeyPress(event) => return self.handle_key_press(&event),
            Event::ClientMessage(event) => self.handle_client_message(&event)?,
            Event::ConfigureRequest(event) => self.handle_configure_request(&event)?,
            Event::ConfigureNotify(event) => self.handle_configure_notify(&event)?,
            Event::DestroyNotify(event) => {
                if self.registry.client(event.window).is_some() {
                    self.unmanage(event.window, true)?;
                } else if self.is_tray_icon(event.window) {
                    self.remove_icon(event.window)?;
                }
            }
            Event::EnterNotify(event) => self.handle_enter_notify(&event)?,
            Event::Expose(event) => {
                if event.count == 0 {
                    let monitor_index = self.registry.monitor_for_window(event.window);
                    self.draw_bar(monitor_index)?;
                    if monitor_index == self.registry.selected_monitor {
                        self.update_systray()?;
                    }
                }
            }
            Event::FocusIn(event) => {
                if let Some(selected) = self.registry.selected_client()
                    && event.event != selected
                {
                    self.set_focus(selected)?;
                }
            }
            Event::MappingNotify(event) => {
                if event.request == Mapping::KEYBOARD {
                    self.grab_keys()?;
                }
            }
            Event::MapRequest(event) => self.handle_map_request(&event)?,
            Event::MotionNotify(event) => self.handle_motion_notify(&event)?,
            Event::PropertyNotify(event) => self.handle_property_notify(&event)?,
            Event::ResizeRequest(event) => {
                if self.is_tray_icon(event.window) {
                    let bounds = self.hint_bounds(self.registry.selected_monitor, true);
                    if let Some(icon) = self
                        .systray
                        .as_mut()
                        .and_then(|systray| systray.icon_mut(event.window))
                    {
                        systray::fit_icon(
                            icon,
                            i32::from(event.width),
                            i32::from(event.height),
                            &bounds,
                        );
                    }
                    self.refresh_tray()?;
                }
            }
            Event::UnmapNotify(event) => {
                if self.registry.client(event.window).is_some() {
                    if event.response_type & SEND_EVENT_FLAG != 0 {
                        self.set_wm_state(event.window, WM_STATE_WITHDRAWN)?;
                    } else {
                        self.unmanage(event.window, false)?;
                    }
                } else if self.is_tray_icon(event.window) {
                    self.remove_icon(event.window)?;
                }
            }
            Event::Error(error) => {
                if xprops::is_ignorable(error.major_opcode, error.error_kind) {
                    debug!("ignoring {:?} from request {}", error.error_kind, error.major_opcode);
                } else {
                    error!(
                        request_code = error.major_opcode,
                        error_code = error.error_code,
                        "fatal X11 error"
                    );
                    return Err(WmError::Protocol {
                        request_code: error.major_opcode,
                        error_code: error.error_code,
                    });
                }
            }
            _ => {}
        }
        Ok(Control::Continue)
    }

    fn handle_button_press(&mut self, event: &ButtonPressEvent) -> WmResult<Control> {
        let monitor_index = self.monitor_for_window(event.event)?;
        if monitor_index != self.registry.selected_monitor {
            if let Some(selected) = self.registry.selected_client() {
                self.unfocus(selected, true)?;
            }
            self.registry.selected_monitor = monitor_index;
            self.focus(None)?;
        }

        let selected_monitor = self.registry.selected_monitor;
        let mut click = ClickRegion::RootWindow;
        let mut clicked_tag = None;
        if Some(event.event) == self.registry.selected().bar_window {
            let bar_width = self.bar_width_on(selected_monitor);
            if let Some(bar) = self.bars.get(selected_monitor) {
                (click, clicked_tag) = resolve_click(
                    i32::from(event.event_x),
                    bar.tag_widths(),
                    bar.symbol_width(),
                    bar.status_width(),
                    bar_width,
                );
            }
        } else if self.registry.client(event.event).is_some() {
            self.focus(Some(event.event))?;
            self.restack(self.registry.selected_monitor)?;
            self.connection
                .allow_events(Allow::REPLAY_POINTER, x11rb::CURRENT_TIME)?;
            click = ClickRegion::ClientWindow;
        }

        let actions: Vec<(KeyAction, Arg)> = keyboard::find_button_actions(
            click,
            event.detail,
            u16::from(event.state),
            self.numlock,
            &self.config.buttons,
        )
        .map(|binding| {
            let arg = match (&binding.arg, clicked_tag) {
                (Arg::None, Some(tag)) if click == ClickRegion::TagBar => Arg::Int(tag as i32),
                _ => binding.arg.clone(),
            };
            (binding.func, arg)
        })
        .collect();

        for (action, arg) in actions {
            if let Control::Quit = self.handle_action(action, &arg)? {
                return Ok(Control::Quit);
            }
        }
        Ok(Control::Continue)
    }

    fn handle_key_press(&mut self, event: &KeyPressEvent) -> WmResult<Control> {
        let Some(mapping) = &self.keyboard_mapping else {
            return Ok(Control::Continue);
        };
        let keysym = mapping.keycode_to_keysym(event.detail);
        match keyboard::find_key_action(
            keysym,
            u16::from(event.state),
            self.numlock,
            &self.config.keybindings,
        ) {
            Some((action, arg)) => self.handle_action(action, &arg),
            None => Ok(Control::Continue),
        }
    }

    fn handle_client_message(&mut self, event: &ClientMessageEvent) -> WmResult<()> {
        let data = event.data.as_data32();

        if let Some(systray) = &self.systray
            && event.window == systray.window
            && event.type_ == self.atoms.net_system_tray_opcode
        {
            if data[1] == systray::SYSTEM_TRAY_REQUEST_DOCK {
                self.dock_icon(data[2])?;
            }
            return Ok(());
        }

        let Some(client) = self.registry.client(event.window) else {
            return Ok(());
        };
        if event.type_ == self.atoms.net_wm_state {
            let fullscreen = self.atoms.net_wm_fullscreen;
            if data[1] == fullscreen || data[2] == fullscreen {
                let wanted = data[0] == NET_WM_STATE_ADD
                    || (data[0] == NET_WM_STATE_TOGGLE && !client.is_fullscreen);
                self.set_fullscreen(event.window, wanted)?;
            }
        } else if event.type_ == self.atoms.net_active_window
            && self.registry.selected_client() != Some(event.window)
            && !client.is_urgent
        {
            self.set_urgent(event.window, true)?;
        }
        Ok(())
    }

    fn handle_configure_request(&mut self, event: &ConfigureRequestEvent) -> WmResult<()> {
        let Some(client) = self.registry.client(event.window) else {
            let mut aux = ConfigureWindowAux::new();
            if event.value_mask.contains(ConfigWindow::X) {
                aux = aux.x(i32::from(event.x));
            }
            if event.value_mask.contains(ConfigWindow::Y) {
                aux = aux.y(i32::from(event.y));
            }
            if event.value_mask.contains(ConfigWindow::WIDTH) {
                aux = aux.width(u32::from(event.width));
            }
            if event.value_mask.contains(ConfigWindow::HEIGHT) {
                aux = aux.height(u32::from(event.height));
            }
            if event.value_mask.contains(ConfigWindow::BORDER_WIDTH) {
                aux = aux.border_width(u32::from(event.border_width));
            }
            if event.value_mask.contains(ConfigWindow::SIBLING) {
                aux = aux.sibling(event.sibling);
            }
            if event.value_mask.contains(ConfigWindow::STACK_MODE) {
                aux = aux.stack_mode(event.stack_mode);
            }
            self.connection.configure_window(event.window, &aux)?;
            return Ok(());
        };

        let window = event.window;
        let monitor_index = client.monitor_index;
        let free = client.is_floating || !self.layout_arranges(monitor_index);

        if event.value_mask.contains(ConfigWindow::BORDER_WIDTH) {
            if let Some(client) = self.registry.client_mut(window) {
                client.border_width = i32::from(event.border_width);
            }
        } else if free {
            let monitor = &self.registry.monitors[monitor_index];
            let screen = monitor.screen_geometry();
            let visible = self.registry.is_visible(client);
            let mut geometry = client.geometry();

            if event.value_mask.contains(ConfigWindow::X) {
                geometry.x_coordinate = screen.x_coordinate + i32::from(event.x);
            }
            if event.value_mask.contains(ConfigWindow::Y) {
                geometry.y_coordinate = screen.y_coordinate + i32::from(event.y);
            }
            if event.value_mask.contains(ConfigWindow::WIDTH) {
                geometry.width = i32::from(event.width);
            }
            if event.value_mask.contains(ConfigWindow::HEIGHT) {
                geometry.height = i32::from(event.height);
            }

            let outer_width = geometry.width + 2 * client.border_width;
            let outer_height = geometry.height + 2 * client.border_width;
            if client.is_floating && geometry.x_coordinate + geometry.width > screen.x_coordinate + screen.width {
                geometry.x_coordinate = screen.x_coordinate + (screen.width / 2 - outer_width / 2);
            }
            if client.is_floating && geometry.y_coordinate + geometry.height > screen.y_coordinate + screen.height {
                geometry.y_coordinate = screen.y_coordinate + (screen.height / 2 - outer_height / 2);
            }

            let mask = event.value_mask;
            let moved_only = (mask.contains(ConfigWindow::X) || mask.contains(ConfigWindow::Y))
                && !mask.contains(ConfigWindow::WIDTH)
                && !mask.contains(ConfigWindow::HEIGHT);

            if let Some(client) = self.registry.client_mut(window) {
                client.set_geometry(geometry);
            }
            if moved_only {
                self.send_configure_notify(window)?;
            }
            if visible {
                self.connection.configure_window(
                    window,
                    &ConfigureWindowAux::new()
                        .x(geometry.x_coordinate)
                        .y(geometry.y_coordinate)
                        .width(geometry.width.max(1) as u32)
                        .height(geometry.height.max(1) as u32),
                )?;
            }
        } else {
            self.send_configure_notify(window)?;
        }
        Ok(())
    }

    fn handle_configure_notify(&mut self, event: &ConfigureNotifyEvent) -> WmResult<()> {
        if event.window != self.root {
            return Ok(());
        }
        let resized = self.screen.width_in_pixels != event.width
            || self.screen.height_in_pixels != event.height;
        self.screen.width_in_pixels = event.width;
        self.screen.height_in_pixels = event.height;

        let screens = query_screens(&self.connection, &self.screen)?;
        let pointer = self.connection.query_pointer(self.root)?.reply()?;
        let update = self.registry.update_geometry(
            &screens,
            &self.config,
            self.bar_height,
            Some((i32::from(pointer.root_x), i32::from(pointer.root_y))),
        );
        for window in &update.removed_bars {
            if let Some(position) = self.bars.iter().position(|bar| bar.window() == *window) {
                self.bars.remove(position).destroy(&self.connection)?;
            }
        }
        if !update.dirty && !resized {
            return Ok(());
        }

        // Bar surfaces are sized to the screen.
        if resized {
            for bar in self.bars.drain(..) {
                bar.destroy(&self.connection)?;
            }
            for monitor in &mut self.registry.monitors {
                monitor.bar_window = None;
            }
        }
        self.update_bars()?;

        for monitor_index in 0..self.registry.monitors.len() {
            let screen = self.registry.monitors[monitor_index].screen_geometry();
            let fullscreen: Vec<Window> = self
                .registry
                .clients_of(monitor_index)
                .filter(|client| client.is_fullscreen)
                .map(|client| client.window)
                .collect();
            for window in fullscreen {
                self.resize_client(window, screen)?;
            }
            self.move_resize_bar(monitor_index)?;
        }
        info!(monitors = self.registry.monitors.len(), "screen layout changed");
        self.focus(None)?;
        self.arrange(None)
    }

    fn handle_enter_notify(&mut self, event: &EnterNotifyEvent) -> WmResult<()> {
        if (event.mode != NotifyMode::NORMAL || event.detail == NotifyDetail::INFERIOR)
            && event.event != self.root
        {
            return Ok(());
        }
        let client = self.registry.client(event.event).map(|client| client.window);
        let monitor_index = match client.and_then(|window| self.registry.client(window)) {
            Some(client) => client.monitor_index,
            None => self.monitor_for_window(event.event)?,
        };

        if monitor_index != self.registry.selected_monitor {
            if let Some(selected) = self.registry.selected_client() {
                self.unfocus(selected, true)?;
            }
            self.registry.selected_monitor = monitor_index;
        } else if client.is_none() || client == self.registry.selected_client() {
            return Ok(());
        }
        self.focus(client)
    }

    fn handle_map_request(&mut self, event: &MapRequestEvent) -> WmResult<()> {
        if self.is_tray_icon(event.window) {
            if let Some(systray) = &self.systray {
                systray.send_xembed(
                    &self.connection,
                    &self.atoms,
                    event.window,
                    systray::XEMBED_WINDOW_ACTIVATE,
                )?;
            }
            return self.refresh_tray();
        }

        let Some(attributes) = self.window_attributes(event.window) else {
            return Ok(());
        };
        if attributes.override_redirect || self.registry.client(event.window).is_some() {
            return Ok(());
        }
        self.manage(event.window)
    }

    fn handle_motion_notify(&mut self, event: &MotionNotifyEvent) -> WmResult<()> {
        if event.event != self.root {
            return Ok(());
        }
        let monitor_index = self.registry.rect_to_monitor(WindowGeometry {
            x_coordinate: i32::from(event.root_x),
            y_coordinate: i32::from(event.root_y),
            width: 1,
            height: 1,
        });
        if let Some(previous) = self.motion_monitor
            && previous != monitor_index
        {
            if let Some(selected) = self.registry.selected_client() {
                self.unfocus(selected, true)?;
            }
            self.registry.selected_monitor = monitor_index;
            self.focus(None)?;
        }
        self.motion_monitor = Some(monitor_index);
        Ok(())
    }

    fn handle_property_notify(&mut self, event: &PropertyNotifyEvent) -> WmResult<()> {
        let window = event.window;
        let atom = event.atom;

        if self.is_tray_icon(window) {
            if atom == u32::from(AtomEnum::WM_NORMAL_HINTS) {
                let hints = self.read_size_hints(window);
                let bounds = self.hint_bounds(self.registry.selected_monitor, true);
                if let Some(icon) = self
                    .systray
                    .as_mut()
                    .and_then(|systray| systray.icon_mut(window))
                {
                    icon.set_size_hints(hints);
                    let (width, height) = (icon.width, icon.height);
                    systray::fit_icon(icon, width, height, &bounds);
                }
            } else {
                self.update_icon_state(window, atom)?;
            }
            return self.refresh_tray();
        }

        if window == self.root && atom == u32::from(AtomEnum::WM_NAME) {
            self.update_status();
            return self.draw_bar(self.registry.selected_monitor);
        }
        if event.state == Property::DELETE {
            return Ok(());
        }
        let Some(client) = self.registry.client(window) else {
            return Ok(());
        };
        let monitor_index = client.monitor_index;

        if atom == u32::from(AtomEnum::WM_TRANSIENT_FOR) {
            let parent_managed = xprops::transient_for(&self.connection, window)
                .is_some_and(|parent| self.registry.client(parent).is_some());
            if !client.is_floating && parent_managed {
                if let Some(client) = self.registry.client_mut(window) {
                    client.is_floating = true;
                }
                self.arrange(Some(monitor_index))?;
            }
        } else if atom == u32::from(AtomEnum::WM_NORMAL_HINTS) {
            self.update_size_hints(window);
        } else if atom == u32::from(AtomEnum::WM_HINTS) {
            self.update_wm_hints(window)?;
            self.draw_bars()?;
        }

        if atom == u32::from(AtomEnum::WM_NAME) || atom == self.atoms.net_wm_name {
            self.update_title(window);
            if self.registry.monitors[monitor_index].selected_client == Some(window) {
                self.draw_bar(monitor_index)?;
            }
        }
        if atom == self.atoms.net_wm_window_type {
            self.update_window_type(window)?;
        }
        Ok(())
    }

    // --- actions ---

    fn handle_action(&mut self, action: KeyAction, arg: &Arg) -> WmResult<Control> {
        debug!(?action, ?arg, "action");
        match action {
            KeyAction::Spawn => {
                keyboard::handle_spawn_action(arg, self.registry.selected().monitor_number);
            }
            KeyAction::KillClient => self.kill_client()?,
            KeyAction::FocusStack => {
                if let Some(window) = self.registry.focus_stack_target(arg.int()) {
                    self.focus(Some(window))?;
                    self.restack(self.registry.selected_monitor)?;
                }
            }
            KeyAction::MoveStack => {
                if self.registry.move_stack(arg.int()) {
                    self.arrange(Some(self.registry.selected_monitor))?;
                }
            }
            KeyAction::Quit => return Ok(Control::Quit),
            KeyAction::ViewTag => self.view(arg.tags())?,
            KeyAction::ToggleView => {
                if self.registry.toggle_view(arg.tags(), self.tag_count()) {
                    self.focus(None)?;
                    self.arrange(Some(self.registry.selected_monitor))?;
                }
            }
            KeyAction::MoveToTag => self.tag(arg.tags())?,
            KeyAction::ToggleTag => self.toggle_tag(arg.tags())?,
            KeyAction::ToggleFloating => self.toggle_floating()?,
            KeyAction::ToggleBar => self.toggle_bar()?,
            KeyAction::ToggleScratch => self.toggle_scratch(arg)?,
            KeyAction::SetLayout => self.set_layout(arg)?,
            KeyAction::Zoom => self.zoom()?,
            KeyAction::FocusMonitor => self.focus_monitor(arg.int())?,
            KeyAction::TagMonitor => {
                if let Some(window) = self.registry.selected_client()
                    && self.registry.monitors.len() > 1
                {
                    let target = self.registry.dir_to_monitor(arg.int());
                    self.send_to_monitor(window, target)?;
                }
            }
            KeyAction::SetMasterFactor => self.set_master_factor(arg.float())?,
            KeyAction::IncNumMaster => {
                let monitor = self.registry.selected_mut();
                monitor.num_master = (monitor.num_master + arg.int()).max(0);
                self.arrange(Some(self.registry.selected_monitor))?;
            }
            KeyAction::MoveMouse => self.start_move()?,
            KeyAction::ResizeMouse => self.start_resize()?,
            KeyAction::None => {}
        }
        Ok(Control::Continue)
    }

    fn kill_client(&mut self) -> WmResult<()> {
        let Some(window) = self.registry.selected_client() else {
            return Ok(());
        };
        if !self.send_protocol(window, self.atoms.wm_delete_window)? {
            self.connection.grab_server()?;
            self.connection.set_close_down_mode(CloseDown::DESTROY_ALL)?;
            self.connection.kill_client(window)?;
            self.connection.sync()?;
            self.connection.ungrab_server()?;
            info!(window, "killed client without WM_DELETE_WINDOW");
        }
        Ok(())
    }

    fn view(&mut self, tags: TagMask) -> WmResult<()> {
        if self.registry.view(tags, self.tag_count()) {
            self.focus(None)?;
            self.arrange(Some(self.registry.selected_monitor))?;
        }
        Ok(())
    }

    fn tag(&mut self, tags: TagMask) -> WmResult<()> {
        let masked = tags & all_tags_mask(self.tag_count());
        let Some(window) = self.registry.selected_client() else {
            return Ok(());
        };
        if masked == 0 {
            return Ok(());
        }
        if let Some(client) = self.registry.client_mut(window) {
            client.tags = masked;
        }
        self.focus(None)?;
        self.arrange(Some(self.registry.selected_monitor))
    }

    fn toggle_tag(&mut self, tags: TagMask) -> WmResult<()> {
        let masked = tags & all_tags_mask(self.tag_count());
        let Some(client) = self
            .registry
            .selected_client()
            .and_then(|window| self.registry.client(window))
        else {
            return Ok(());
        };
        let new_tags = client.tags ^ masked;
        if new_tags == 0 {
            return Ok(());
        }
        let window = client.window;
        if let Some(client) = self.registry.client_mut(window) {
            client.tags = new_tags;
        }
        self.focus(None)?;
        self.arrange(Some(self.registry.selected_monitor))
    }

    fn toggle_floating(&mut self) -> WmResult<()> {
        let Some(window) = self.registry.selected_client() else {
            return Ok(());
        };
        let Some(client) = self.registry.client_mut(window) else {
            return Ok(());
        };
        if client.is_fullscreen {
            return Ok(());
        }
        client.is_floating = !client.is_floating || client.is_fixed;
        if client.is_floating {
            let geometry = client.geometry();
            self.resize(window, geometry, false)?;
        }
        self.arrange(Some(self.registry.selected_monitor))
    }

    fn toggle_bar(&mut self) -> WmResult<()> {
        let bar_height = self.bar_height;
        let monitor_index = self.registry.selected_monitor;
        let monitor = self.registry.selected_mut();
        monitor.show_bar = !monitor.show_bar;
        monitor.update_bar_position(bar_height);
        let bar_y = monitor.bar_y_position;

        self.move_resize_bar(monitor_index)?;
        if let Some(systray) = &self.systray
            && self.tray_monitor() == monitor_index
        {
            self.connection
                .configure_window(systray.window, &ConfigureWindowAux::new().y(bar_y))?;
        }
        self.arrange(Some(monitor_index))
    }

    fn set_layout(&mut self, arg: &Arg) -> WmResult<()> {
        let requested = match arg {
            Arg::Int(index) => usize::try_from(*index)
                .ok()
                .filter(|&index| index < self.config.layouts.len()),
            Arg::Str(name) => {
                let kind = name.parse::<LayoutType>().ok();
                self.config
                    .layouts
                    .iter()
                    .position(|entry| entry.symbol == *name || Some(entry.kind) == kind)
            }
            _ => None,
        };

        let monitor_index = self.registry.selected_monitor;
        let monitor = self.registry.selected_mut();
        if requested.is_none_or(|index| index != monitor.selected_layout()) {
            monitor.selected_layout_index ^= 1;
        }
        if let Some(index) = requested {
            monitor.layout_indices[monitor.selected_layout_index] = index;
        }
        if let Some(entry) = self.config.layouts.get(monitor.selected_layout()) {
            monitor.layout_symbol = entry.symbol.clone();
        }

        if self.registry.selected_client().is_some() {
            self.arrange(Some(monitor_index))
        } else {
            self.draw_bar(monitor_index)
        }
    }

    fn set_master_factor(&mut self, value: f32) -> WmResult<()> {
        let monitor_index = self.registry.selected_monitor;
        if !self.layout_arranges(monitor_index) {
            return Ok(());
        }
        let monitor = self.registry.selected_mut();
        let factor = if value < 1.0 {
            value + monitor.master_factor
        } else {
            value - 1.0
        };
        if !(0.1..=0.9).contains(&factor) {
            return Ok(());
        }
        monitor.master_factor = factor;
        self.arrange(Some(monitor_index))
    }

    fn zoom(&mut self) -> WmResult<()> {
        let monitor_index = self.registry.selected_monitor;
        let selected = self.registry.selected_client();
        let floating = selected
            .and_then(|window| self.registry.client(window))
            .is_some_and(|client| client.is_floating);
        if !self.layout_arranges(monitor_index) || floating {
            return Ok(());
        }

        let head = self.registry.monitors[monitor_index].clients_head;
        let mut target = selected;
        if target == self.registry.next_tiled(head) {
            let after = target
                .and_then(|window| self.registry.client(window))
                .and_then(|client| client.next);
            target = self.registry.next_tiled(after);
        }
        let Some(window) = target else {
            return Ok(());
        };
        self.registry.pop(window);
        self.focus(Some(window))?;
        self.arrange(Some(monitor_index))
    }

    fn focus_monitor(&mut self, direction: i32) -> WmResult<()> {
        if self.registry.monitors.len() < 2 {
            return Ok(());
        }
        let target = self.registry.dir_to_monitor(direction);
        if target == self.registry.selected_monitor {
            return Ok(());
        }
        if let Some(selected) = self.registry.selected_client() {
            self.unfocus(selected, false)?;
        }
        self.registry.selected_monitor = target;
        self.focus(None)
    }

    fn send_to_monitor(&mut self, window: Window, target: usize) -> WmResult<()> {
        if self.registry.client(window).map(|c| c.monitor_index) == Some(target) {
            return Ok(());
        }
        self.unfocus(window, true)?;
        if self.registry.send_to_monitor(window, target) {
            debug!(window, monitor = target, "sent to monitor");
        }
        self.focus(None)?;
        self.arrange(None)
    }

    fn toggle_scratch(&mut self, arg: &Arg) -> WmResult<()> {
        let monitor_index = self.registry.selected_monitor;
        let scratch = scratch_tag(self.tag_count());
        let monitor = self.registry.selected();
        if monitor.scratchpad_pid.is_some() {
            return Ok(());
        }

        let Some(scratchpad) = monitor.scratchpad else {
            let pid = keyboard::spawn_scratchpad(arg, monitor.monitor_number);
            if pid.is_none() {
                warn!("scratchpad command did not start");
            }
            self.registry.selected_mut().scratchpad_pid = pid;
            return Ok(());
        };

        let new_tagset = monitor.get_selected_tag() ^ scratch;
        if new_tagset != 0 {
            let monitor = self.registry.selected_mut();
            monitor.tagset[monitor.selected_tags_index] = new_tagset;
            self.focus(None)?;
            self.arrange(Some(monitor_index))?;
        }
        if self.registry.is_window_visible(scratchpad) {
            self.focus(Some(scratchpad))?;
            self.restack(monitor_index)?;
        }
        Ok(())
    }

    // --- pointer drags ---

    fn grab_pointer(&self, cursor: Cursor) -> WmResult<bool> {
        let reply = self
            .connection
            .grab_pointer(
                false,
                self.root,
                EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE | EventMask::POINTER_MOTION,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
                x11rb::NONE,
                cursor,
                x11rb::CURRENT_TIME,
            )?
            .reply()?;
        Ok(reply.status == GrabStatus::SUCCESS)
    }

    fn drag_candidate(&mut self) -> WmResult<Option<Client>> {
        let Some(client) = self
            .registry
            .selected_client()
            .and_then(|window| self.registry.client(window))
        else {
            return Ok(None);
        };
        if client.is_fullscreen {
            return Ok(None);
        }
        let client = client.clone();
        self.restack(self.registry.selected_monitor)?;
        Ok(Some(client))
    }

    fn start_move(&mut self) -> WmResult<()> {
        let Some(client) = self.drag_candidate()? else {
            return Ok(());
        };
        if !self.grab_pointer(self.cursors.moving)? {
            return Ok(());
        }
        let pointer = self.connection.query_pointer(self.root)?.reply()?;
        self.drag = DragState::Moving(MoveDrag {
            window: client.window,
            client_x: client.x_position,
            client_y: client.y_position,
            pointer_x: i32::from(pointer.root_x),
            pointer_y: i32::from(pointer.root_y),
            last_motion: 0,
        });
        Ok(())
    }

    fn start_resize(&mut self) -> WmResult<()> {
        let Some(client) = self.drag_candidate()? else {
            return Ok(());
        };
        if !self.grab_pointer(self.cursors.resize)? {
            return Ok(());
        }
        self.warp_to_corner(&client)?;
        self.drag = DragState::Resizing(ResizeDrag {
            window: client.window,
            client_x: client.x_position,
            client_y: client.y_position,
            last_motion: 0,
        });
        Ok(())
    }

    fn warp_to_corner(&self, client: &Client) -> WmResult<()> {
        self.connection.warp_pointer(
            x11rb::NONE,
            client.window,
            0,
            0,
            0,
            0,
            (client.width + client.border_width - 1) as i16,
            (client.height + client.border_width - 1) as i16,
        )?;
        Ok(())
    }

    fn drag_motion(&mut self, event: &MotionNotifyEvent) -> WmResult<()> {
        if !self.drag.accept_motion(event.time) {
            return Ok(());
        }
        let Some(client) = self
            .drag
            .window()
            .and_then(|window| self.registry.client(window))
        else {
            return Ok(());
        };
        let window = client.window;
        let selected_monitor = self.registry.selected_monitor;
        let arranges = self.layout_arranges(selected_monitor);
        let area = self.registry.monitors[selected_monitor].window_area();
        let pointer_x = i32::from(event.root_x);
        let pointer_y = i32::from(event.root_y);

        let (proposed, may_promote) = match &self.drag {
            DragState::Moving(drag) => {
                let (x, y) = drag::snap_position(
                    drag.client_x + (pointer_x - drag.pointer_x),
                    drag.client_y + (pointer_y - drag.pointer_y),
                    client.width_with_border(),
                    client.height_with_border(),
                    area,
                    self.config.snap,
                );
                let proposed = WindowGeometry {
                    x_coordinate: x,
                    y_coordinate: y,
                    width: client.width,
                    height: client.height,
                };
                (proposed, true)
            }
            DragState::Resizing(drag) => {
                let (width, height) = drag::resize_size(
                    pointer_x,
                    pointer_y,
                    drag.client_x,
                    drag.client_y,
                    client.border_width,
                );
                let home = self.registry.monitors[client.monitor_index].window_area();
                let proposed = WindowGeometry {
                    x_coordinate: client.x_position,
                    y_coordinate: client.y_position,
                    width,
                    height,
                };
                (proposed, drag::resize_stays_inside(home, area, width, height))
            }
            DragState::Idle => return Ok(()),
        };
        let resizing = matches!(self.drag, DragState::Resizing(_));

        if may_promote
            && drag::should_float(
                client.is_floating,
                arranges,
                client.geometry(),
                proposed,
                self.config.snap,
                resizing,
            )
        {
            self.toggle_floating()?;
        }
        let floating = self
            .registry
            .client(window)
            .is_some_and(|client| client.is_floating);
        if !arranges || floating {
            self.resize(window, proposed, true)?;
        }
        Ok(())
    }

    fn finish_drag(&mut self) -> WmResult<()> {
        let drag = std::mem::take(&mut self.drag);
        let resizing = matches!(drag, DragState::Resizing(_));
        let client = drag
            .window()
            .and_then(|window| self.registry.client(window))
            .cloned();

        if resizing && let Some(client) = &client {
            self.warp_to_corner(client)?;
        }
        self.connection.ungrab_pointer(x11rb::CURRENT_TIME)?;
        if resizing {
            self.discard_enter_events()?;
        }
        drag::release_deferred(&mut self.deferred, &mut self.pending, resizing);

        let Some(client) = client else {
            return Ok(());
        };
        let target = self.registry.rect_to_monitor(client.geometry());
        if target != self.registry.selected_monitor {
            self.send_to_monitor(client.window, target)?;
            self.registry.selected_monitor = target;
            self.focus(None)?;
        }
        Ok(())
    }

    // --- shutdown ---

    fn cleanup(&mut self) -> WmResult<()> {
        self.view(!0)?;
        for monitor_index in 0..self.registry.monitors.len() {
            let stack: Vec<Window> = self
                .registry
                .stack_of(monitor_index)
                .map(|client| client.window)
                .collect();
            for window in stack {
                self.release_client(window, false)?;
            }
        }
        self.connection
            .ungrab_key(Grab::ANY, self.root, ModMask::ANY)?;

        for bar in self.bars.drain(..) {
            bar.destroy(&self.connection)?;
        }
        if let Some(systray) = self.systray.take() {
            systray.destroy(&self.connection)?;
        }
        self.connection.destroy_window(self.wm_check_window)?;
        for cursor in [self.cursors.normal, self.cursors.resize, self.cursors.moving] {
            self.connection.free_cursor(cursor)?;
        }

        self.connection.set_input_focus(
            InputFocus::POINTER_ROOT,
            u32::from(InputFocus::POINTER_ROOT),
            x11rb::CURRENT_TIME,
        )?;
        self.connection
            .delete_property(self.root, self.atoms.net_active_window)?;
        self.connection.sync()?;
        self.display.sync();
        Ok(())
    }
}
