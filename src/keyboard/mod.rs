pub mod handlers;
pub mod keysyms;

pub use handlers::{
    Arg, ButtonBinding, KeyAction, KeyBinding, KeyboardMapping, clean_mask, find_button_actions,
    find_key_action, grab_buttons, grab_keys, handle_spawn_action, spawn_scratchpad,
};
