use serde::Deserialize;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;

use crate::bar::ClickRegion;
use crate::client::{TagMask, tag_mask};
use crate::errors::X11Error;
use crate::keyboard::keysyms::{self, Keysym, format_keysym};

/// When adding a new action, update:
/// 1. Add variant here
/// 2. lua_api.rs: string_to_action()
/// 3. lua_api.rs: the constructor in register_api()
/// 4. window_manager.rs: handle_action()
/// 5. templates/config.lua
#[derive(Debug, Copy, Clone, Deserialize, PartialEq, Eq)]
pub enum KeyAction {
    Spawn,
    KillClient,
    FocusStack,
    MoveStack,
    Quit,
    ViewTag,
    ToggleView,
    MoveToTag,
    ToggleTag,
    ToggleFloating,
    ToggleBar,
    ToggleScratch,
    SetLayout,
    Zoom,
    FocusMonitor,
    TagMonitor,
    SetMasterFactor,
    IncNumMaster,
    MoveMouse,
    ResizeMouse,
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    None,
    Int(i32),
    Float(f32),
    Str(String),
    Array(Vec<String>),
}

impl Arg {
    /// Tag mask carried by a tag action: a 0-based tag index, `-1` for every
    /// tag, nothing for the empty mask (which `view` reads as "previous").
    pub fn tags(&self) -> TagMask {
        match self {
            Arg::Int(index) if *index < 0 => !0,
            Arg::Int(index) if (*index as u32) < TagMask::BITS => tag_mask(*index as usize),
            _ => 0,
        }
    }

    pub fn int(&self) -> i32 {
        match self {
            Arg::Int(value) => *value,
            Arg::Float(value) => *value as i32,
            _ => 0,
        }
    }

    pub fn float(&self) -> f32 {
        match self {
            Arg::Float(value) => *value,
            Arg::Int(value) => *value as f32,
            _ => 0.0,
        }
    }
}

#[derive(Clone)]
pub struct KeyPress {
    pub(crate) modifiers: Vec<KeyButMask>,
    pub(crate) keysym: Keysym,
}

impl std::fmt::Debug for KeyPress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPress")
            .field("modifiers", &self.modifiers)
            .field("keysym", &format_keysym(self.keysym))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub(crate) key: KeyPress,
    pub(crate) func: KeyAction,
    pub(crate) arg: Arg,
}

impl KeyBinding {
    pub fn new(modifiers: Vec<KeyButMask>, keysym: Keysym, func: KeyAction, arg: Arg) -> Self {
        Self {
            key: KeyPress { modifiers, keysym },
            func,
            arg,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ButtonBinding {
    pub(crate) click: ClickRegion,
    pub(crate) modifiers: Vec<KeyButMask>,
    pub(crate) button: u8,
    pub(crate) func: KeyAction,
    pub(crate) arg: Arg,
}

impl ButtonBinding {
    pub fn new(
        click: ClickRegion,
        modifiers: Vec<KeyButMask>,
        button: u8,
        func: KeyAction,
        arg: Arg,
    ) -> Self {
        Self {
            click,
            modifiers,
            button,
            func,
            arg,
        }
    }
}

pub fn modifiers_to_mask(modifiers: &[KeyButMask]) -> u16 {
    modifiers
        .iter()
        .fold(0u16, |acc, &modifier| acc | u16::from(modifier))
}

/// Drops lock modifiers and everything that is not a keyboard modifier.
pub fn clean_mask(state: u16, numlock_mask: u16) -> u16 {
    let modifiers = u16::from(ModMask::SHIFT)
        | u16::from(ModMask::CONTROL)
        | u16::from(ModMask::M1)
        | u16::from(ModMask::M2)
        | u16::from(ModMask::M3)
        | u16::from(ModMask::M4)
        | u16::from(ModMask::M5);
    state & !(numlock_mask | u16::from(ModMask::LOCK)) & modifiers
}

/// Every lock combination a grab has to be repeated for.
fn lock_combinations(numlock_mask: u16) -> [u16; 4] {
    let lock = u16::from(ModMask::LOCK);
    [0, lock, numlock_mask, numlock_mask | lock]
}

pub struct KeyboardMapping {
    pub syms: Vec<Keysym>,
    pub keysyms_per_keycode: u8,
    pub min_keycode: Keycode,
}

impl KeyboardMapping {
    pub fn keycode_to_keysym(&self, keycode: Keycode) -> Keysym {
        if keycode < self.min_keycode {
            return 0;
        }
        let index = (keycode - self.min_keycode) as usize * self.keysyms_per_keycode as usize;
        self.syms.get(index).copied().unwrap_or(0)
    }

    pub fn find_keycode(&self, keysym: Keysym) -> Option<Keycode> {
        let per_keycode = self.keysyms_per_keycode.max(1) as usize;
        self.syms
            .chunks(per_keycode)
            .position(|syms| syms.first() == Some(&keysym))
            .and_then(|offset| Keycode::try_from(offset + self.min_keycode as usize).ok())
    }
}

pub fn get_keyboard_mapping(connection: &impl Connection) -> Result<KeyboardMapping, X11Error> {
    let setup = connection.setup();
    let min_keycode = setup.min_keycode;
    let max_keycode = setup.max_keycode;

    let mapping = connection
        .get_keyboard_mapping(min_keycode, max_keycode - min_keycode + 1)?
        .reply()?;

    Ok(KeyboardMapping {
        syms: mapping.keysyms,
        keysyms_per_keycode: mapping.keysyms_per_keycode,
        min_keycode,
    })
}

/// Modifier bit Num_Lock is currently bound to, 0 when it is not bound.
pub fn numlock_mask(
    connection: &impl Connection,
    mapping: &KeyboardMapping,
) -> Result<u16, X11Error> {
    let Some(numlock) = mapping.find_keycode(keysyms::XK_NUM_LOCK) else {
        return Ok(0);
    };
    let reply = connection.get_modifier_mapping()?.reply()?;
    Ok(modifier_bit_for(
        &reply.keycodes,
        reply.keycodes_per_modifier() as usize,
        numlock,
    ))
}

fn modifier_bit_for(keycodes: &[Keycode], per_modifier: usize, keycode: Keycode) -> u16 {
    if per_modifier == 0 {
        return 0;
    }
    keycodes
        .chunks(per_modifier)
        .take(8)
        .position(|codes| codes.contains(&keycode))
        .map_or(0, |modifier| 1 << modifier)
}

pub fn grab_keys(
    connection: &impl Connection,
    root: Window,
    keybindings: &[KeyBinding],
) -> Result<(KeyboardMapping, u16), X11Error> {
    let setup = connection.setup();
    let min_keycode = setup.min_keycode;
    let max_keycode = setup.max_keycode;

    let mapping = get_keyboard_mapping(connection)?;
    let numlock = numlock_mask(connection, &mapping)?;

    connection.ungrab_key(Grab::ANY, root, ModMask::ANY)?;

    for keycode in min_keycode..=max_keycode {
        let keysym = mapping.keycode_to_keysym(keycode);
        for keybinding in keybindings.iter().filter(|k| k.key.keysym == keysym) {
            let modifier_mask = modifiers_to_mask(&keybinding.key.modifiers);
            for ignore_mask in lock_combinations(numlock) {
                connection.grab_key(
                    true,
                    root,
                    (modifier_mask | ignore_mask).into(),
                    keycode,
                    GrabMode::ASYNC,
                    GrabMode::ASYNC,
                )?;
            }
        }
    }

    connection.flush()?;
    Ok((mapping, numlock))
}

/// Button grabs on a client. An unfocused client grabs every button so a
/// click focuses it; a focused one only grabs the client bindings.
pub fn grab_buttons(
    connection: &impl Connection,
    window: Window,
    buttons: &[ButtonBinding],
    focused: bool,
    numlock: u16,
) -> Result<(), X11Error> {
    let event_mask = EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE;
    connection.ungrab_button(ButtonIndex::ANY, window, ModMask::ANY)?;

    if !focused {
        connection.grab_button(
            false,
            window,
            event_mask,
            GrabMode::SYNC,
            GrabMode::SYNC,
            x11rb::NONE,
            x11rb::NONE,
            ButtonIndex::ANY,
            ModMask::ANY,
        )?;
    }

    for binding in buttons
        .iter()
        .filter(|b| b.click == ClickRegion::ClientWindow)
    {
        let modifier_mask = modifiers_to_mask(&binding.modifiers);
        for ignore_mask in lock_combinations(numlock) {
            connection.grab_button(
                false,
                window,
                event_mask,
                GrabMode::ASYNC,
                GrabMode::SYNC,
                x11rb::NONE,
                x11rb::NONE,
                ButtonIndex::from(binding.button),
                (modifier_mask | ignore_mask).into(),
            )?;
        }
    }
    Ok(())
}

pub fn find_key_action(
    keysym: Keysym,
    state: u16,
    numlock: u16,
    keybindings: &[KeyBinding],
) -> Option<(KeyAction, Arg)> {
    let clean_state = clean_mask(state, numlock);
    keybindings
        .iter()
        .find(|binding| {
            binding.key.keysym == keysym
                && clean_state == clean_mask(modifiers_to_mask(&binding.key.modifiers), numlock)
        })
        .map(|binding| (binding.func, binding.arg.clone()))
}

/// Every binding for a press of `button` in `click`, in table order.
pub fn find_button_actions<'a>(
    click: ClickRegion,
    button: u8,
    state: u16,
    numlock: u16,
    buttons: &'a [ButtonBinding],
) -> impl Iterator<Item = &'a ButtonBinding> {
    let clean_state = clean_mask(state, numlock);
    buttons.iter().filter(move |binding| {
        binding.click == click
            && binding.button == button
            && clean_state == clean_mask(modifiers_to_mask(&binding.modifiers), numlock)
    })
}

pub fn handle_spawn_action(arg: &Arg, selected_monitor: usize) -> Option<u32> {
    match arg {
        Arg::Str(command) => crate::signal::spawn_detached(command),
        Arg::Array(command) => {
            let args = crate::signal::launcher_args(command, selected_monitor);
            let (program, rest) = args.split_first()?;
            let rest: Vec<&str> = rest.iter().map(String::as_str).collect();
            crate::signal::spawn_detached_with_args(program, &rest)
        }
        _ => None,
    }
}

/// Spawns a scratchpad. A shell command line is exec'd so the pid matches
/// the window's `_NET_WM_PID`.
pub fn spawn_scratchpad(arg: &Arg, selected_monitor: usize) -> Option<u32> {
    match arg {
        Arg::Str(command) => {
            crate::signal::spawn_detached(&crate::signal::exec_command_line(command))
        }
        _ => handle_spawn_action(arg, selected_monitor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NUMLOCK: u16 = 1 << 4;

    fn bindings() -> Vec<KeyBinding> {
        vec![
            KeyBinding::new(
                vec![KeyButMask::MOD4],
                keysyms::XK_J,
                KeyAction::FocusMonitor,
                Arg::Int(1),
            ),
            KeyBinding::new(
                vec![KeyButMask::MOD4, KeyButMask::SHIFT],
                keysyms::XK_J,
                KeyAction::TagMonitor,
                Arg::Int(1),
            ),
        ]
    }

    #[test]
    fn lock_bits_do_not_affect_matching() {
        let mod4 = u16::from(ModMask::M4);
        let lock = u16::from(ModMask::LOCK);
        let found = find_key_action(keysyms::XK_J, mod4 | lock | NUMLOCK, NUMLOCK, &bindings());
        assert_eq!(found, Some((KeyAction::FocusMonitor, Arg::Int(1))));
    }

    #[test]
    fn extra_modifiers_select_another_binding() {
        let state = u16::from(ModMask::M4) | u16::from(ModMask::SHIFT);
        let found = find_key_action(keysyms::XK_J, state, NUMLOCK, &bindings());
        assert_eq!(found.map(|(action, _)| action), Some(KeyAction::TagMonitor));
        assert_eq!(find_key_action(keysyms::XK_K, state, NUMLOCK, &bindings()), None);
    }

    #[test]
    fn pointer_buttons_are_not_modifiers() {
        let state = u16::from(ModMask::M4) | u16::from(KeyButMask::BUTTON1);
        assert_eq!(clean_mask(state, NUMLOCK), u16::from(ModMask::M4));
    }

    #[test]
    fn numlock_bit_comes_from_the_modifier_table() {
        // Two keycodes per modifier; Num_Lock (77) sits on Mod2.
        let keycodes = [50, 62, 66, 0, 37, 105, 64, 0, 77, 0, 0, 0, 133, 134, 92, 0];
        assert_eq!(modifier_bit_for(&keycodes, 2, 77), 1 << 4);
        assert_eq!(modifier_bit_for(&keycodes, 2, 200), 0);
    }

    #[test]
    fn keycodes_resolve_both_ways() {
        let mapping = KeyboardMapping {
            syms: vec![keysyms::XK_Q, 0x51, keysyms::XK_W, 0x57],
            keysyms_per_keycode: 2,
            min_keycode: 24,
        };
        assert_eq!(mapping.keycode_to_keysym(25), keysyms::XK_W);
        assert_eq!(mapping.find_keycode(keysyms::XK_W), Some(25));
        assert_eq!(mapping.find_keycode(keysyms::XK_E), None);
    }

    #[test]
    fn tag_arguments_become_masks() {
        assert_eq!(Arg::Int(0).tags(), 1);
        assert_eq!(Arg::Int(3).tags(), 1 << 3);
        assert_eq!(Arg::Int(-1).tags(), !0);
        assert_eq!(Arg::None.tags(), 0);
    }

    #[test]
    fn button_bindings_filter_by_region() {
        let buttons = vec![
            ButtonBinding::new(ClickRegion::TagBar, vec![], 1, KeyAction::ViewTag, Arg::None),
            ButtonBinding::new(
                ClickRegion::ClientWindow,
                vec![KeyButMask::MOD4],
                1,
                KeyAction::MoveMouse,
                Arg::None,
            ),
        ];
        let state = u16::from(ModMask::M4);
        let found: Vec<KeyAction> =
            find_button_actions(ClickRegion::ClientWindow, 1, state, 0, &buttons)
                .map(|b| b.func)
                .collect();
        assert_eq!(found, vec![KeyAction::MoveMouse]);
        assert_eq!(
            find_button_actions(ClickRegion::TagBar, 3, 0, 0, &buttons).count(),
            0
        );
    }
}
