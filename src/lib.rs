use std::path::PathBuf;

use serde::Deserialize;

use crate::bar::ClickRegion;
use crate::keyboard::keysyms::{self, Keysym};
use crate::keyboard::{Arg, ButtonBinding, KeyAction, KeyBinding};
use crate::layout::{LayoutEntry, LayoutType};
use x11rb::protocol::xproto::KeyButMask;

pub mod bar;
pub mod client;
pub mod config;
pub mod drag;
pub mod errors;
pub mod keyboard;
pub mod layout;
pub mod monitor;
pub mod registry;
pub mod signal;
pub mod size_hints;
pub mod systray;
pub mod window_manager;
pub mod x11;

pub mod prelude {
    pub use crate::ColorScheme;
    pub use crate::WindowRule;
    pub use crate::bar::ClickRegion;
    pub use crate::keyboard::{Arg, ButtonBinding, KeyAction, KeyBinding, keysyms};
    pub use crate::layout::{LayoutEntry, LayoutType};
    pub use x11rb::protocol::xproto::KeyButMask;
}

/// Placement rule for new windows. Empty matchers match anything; the others
/// are substring matches.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct WindowRule {
    pub class: Option<String>,
    pub instance: Option<String>,
    pub title: Option<String>,
    pub tags: Option<u32>,
    #[serde(rename = "floating")]
    pub is_floating: Option<bool>,
    /// Monitor number; negative means "wherever it is created".
    pub monitor: Option<i32>,
    /// The first matching window becomes the monitor's scratchpad.
    #[serde(default)]
    pub scratchpad: bool,
}

impl WindowRule {
    pub fn matches(&self, class: &str, instance: &str, title: &str) -> bool {
        let class_matches = self
            .class
            .as_ref()
            .is_none_or(|c| class.contains(c.as_str()));
        let instance_matches = self
            .instance
            .as_ref()
            .is_none_or(|i| instance.contains(i.as_str()));
        let title_matches = self
            .title
            .as_ref()
            .is_none_or(|t| title.contains(t.as_str()));
        class_matches && instance_matches && title_matches
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    pub foreground: u32,
    pub background: u32,
    pub border: u32,
}

#[derive(Debug, Clone)]
pub struct Config {
    // Meta
    pub path: Option<PathBuf>,

    // Appearance
    pub border_width: u32,
    pub font: String,
    pub scheme_normal: ColorScheme,
    pub scheme_selected: ColorScheme,

    // Bar
    pub show_bar: bool,
    pub top_bar: bool,

    // Layout
    pub layouts: Vec<LayoutEntry>,
    pub master_factor: f32,
    pub num_master: i32,
    pub resize_hints: bool,
    pub snap: i32,

    // Systray
    pub systray_enabled: bool,
    /// 0 follows the selected monitor, otherwise a 1-based monitor number.
    pub systray_pinning: usize,
    pub systray_spacing: i32,
    pub systray_pinning_fail_first: bool,

    // Basics
    pub terminal: String,
    pub modkey: KeyButMask,
    pub tags: Vec<String>,

    // Bindings
    pub keybindings: Vec<KeyBinding>,
    pub buttons: Vec<ButtonBinding>,

    // Window rules
    pub window_rules: Vec<WindowRule>,
}

pub const TERMINAL: &str = "alacritty";

/// Keys for tags 1 through 9, in tag order.
const TAG_KEYS: [Keysym; 9] = [
    keysyms::XK_1,
    keysyms::XK_2,
    keysyms::XK_3,
    keysyms::XK_Q,
    keysyms::XK_W,
    keysyms::XK_E,
    keysyms::XK_A,
    keysyms::XK_S,
    keysyms::XK_D,
];

fn command(args: &[&str]) -> Arg {
    Arg::Array(args.iter().map(|arg| arg.to_string()).collect())
}

impl Config {
    pub fn default_layouts() -> Vec<LayoutEntry> {
        vec![
            LayoutEntry::new("#", LayoutType::Tile),
            LayoutEntry::new("F", LayoutType::Floating),
            LayoutEntry::new("@", LayoutType::Monocle),
        ]
    }

    pub fn default_keybindings(modkey: KeyButMask, terminal: &str) -> Vec<KeyBinding> {
        let shift = KeyButMask::SHIFT;
        let control = KeyButMask::CONTROL;
        let term = command(&[terminal]);

        let mut bindings = vec![
            KeyBinding::new(vec![], keysyms::XK_F1, KeyAction::ToggleScratch, term.clone()),
            KeyBinding::new(
                vec![modkey],
                keysyms::XK_SPACE,
                KeyAction::Spawn,
                command(&["dmenu_run"]),
            ),
            KeyBinding::new(
                vec![modkey],
                keysyms::XK_BRACKETLEFT,
                KeyAction::Spawn,
                command(&["emacs"]),
            ),
            KeyBinding::new(
                vec![modkey],
                keysyms::XK_BRACKETRIGHT,
                KeyAction::Spawn,
                command(&["firefox"]),
            ),
            KeyBinding::new(vec![modkey], keysyms::XK_RETURN, KeyAction::Spawn, term),
            KeyBinding::new(vec![modkey], keysyms::XK_Z, KeyAction::ToggleBar, Arg::None),
            KeyBinding::new(vec![modkey], keysyms::XK_N, KeyAction::FocusStack, Arg::Int(1)),
            KeyBinding::new(vec![modkey], keysyms::XK_P, KeyAction::FocusStack, Arg::Int(-1)),
            KeyBinding::new(vec![modkey], keysyms::XK_L, KeyAction::IncNumMaster, Arg::Int(1)),
            KeyBinding::new(vec![modkey], keysyms::XK_H, KeyAction::IncNumMaster, Arg::Int(-1)),
            KeyBinding::new(
                vec![modkey],
                keysyms::XK_MINUS,
                KeyAction::SetMasterFactor,
                Arg::Float(-0.05),
            ),
            KeyBinding::new(
                vec![modkey],
                keysyms::XK_EQUAL,
                KeyAction::SetMasterFactor,
                Arg::Float(0.05),
            ),
            KeyBinding::new(vec![modkey], keysyms::XK_U, KeyAction::Zoom, Arg::None),
            KeyBinding::new(vec![modkey], keysyms::XK_TAB, KeyAction::ViewTag, Arg::None),
            KeyBinding::new(vec![modkey], keysyms::XK_GRAVE, KeyAction::KillClient, Arg::None),
            KeyBinding::new(vec![modkey], keysyms::XK_T, KeyAction::SetLayout, Arg::Int(0)),
            KeyBinding::new(vec![modkey], keysyms::XK_B, KeyAction::SetLayout, Arg::Int(1)),
            KeyBinding::new(vec![modkey], keysyms::XK_F, KeyAction::SetLayout, Arg::Int(2)),
            KeyBinding::new(vec![modkey], keysyms::XK_C, KeyAction::ToggleFloating, Arg::None),
            KeyBinding::new(vec![modkey], keysyms::XK_0, KeyAction::ViewTag, Arg::Int(-1)),
            KeyBinding::new(vec![modkey, shift], keysyms::XK_0, KeyAction::MoveToTag, Arg::Int(-1)),
            KeyBinding::new(vec![modkey], keysyms::XK_K, KeyAction::FocusMonitor, Arg::Int(-1)),
            KeyBinding::new(vec![modkey], keysyms::XK_J, KeyAction::FocusMonitor, Arg::Int(1)),
            KeyBinding::new(vec![modkey, shift], keysyms::XK_K, KeyAction::TagMonitor, Arg::Int(-1)),
            KeyBinding::new(vec![modkey, shift], keysyms::XK_J, KeyAction::TagMonitor, Arg::Int(1)),
            KeyBinding::new(vec![modkey], keysyms::XK_M, KeyAction::MoveStack, Arg::Int(-1)),
            KeyBinding::new(vec![modkey], keysyms::XK_COMMA, KeyAction::MoveStack, Arg::Int(1)),
        ];

        for (tag, &key) in TAG_KEYS.iter().enumerate() {
            let tag = Arg::Int(tag as i32);
            bindings.extend([
                KeyBinding::new(vec![modkey], key, KeyAction::ViewTag, tag.clone()),
                KeyBinding::new(vec![modkey, control], key, KeyAction::ToggleView, tag.clone()),
                KeyBinding::new(vec![modkey, shift], key, KeyAction::MoveToTag, tag.clone()),
                KeyBinding::new(
                    vec![modkey, control, shift],
                    key,
                    KeyAction::ToggleTag,
                    tag,
                ),
            ]);
        }

        bindings.push(KeyBinding::new(
            vec![modkey, control, shift],
            keysyms::XK_R,
            KeyAction::Quit,
            Arg::None,
        ));
        bindings
    }

    pub fn default_buttons(modkey: KeyButMask, terminal: &str) -> Vec<ButtonBinding> {
        use ClickRegion::*;
        vec![
            ButtonBinding::new(LayoutSymbol, vec![], 1, KeyAction::SetLayout, Arg::None),
            ButtonBinding::new(LayoutSymbol, vec![], 3, KeyAction::SetLayout, Arg::Int(2)),
            ButtonBinding::new(WindowTitle, vec![], 2, KeyAction::Zoom, Arg::None),
            ButtonBinding::new(StatusText, vec![], 2, KeyAction::Spawn, command(&[terminal])),
            ButtonBinding::new(ClientWindow, vec![modkey], 1, KeyAction::MoveMouse, Arg::None),
            ButtonBinding::new(ClientWindow, vec![modkey], 2, KeyAction::ToggleFloating, Arg::None),
            ButtonBinding::new(ClientWindow, vec![modkey], 3, KeyAction::ResizeMouse, Arg::None),
            ButtonBinding::new(TagBar, vec![], 1, KeyAction::ViewTag, Arg::None),
            ButtonBinding::new(TagBar, vec![], 3, KeyAction::ToggleView, Arg::None),
            ButtonBinding::new(TagBar, vec![modkey], 1, KeyAction::MoveToTag, Arg::None),
            ButtonBinding::new(TagBar, vec![modkey], 3, KeyAction::ToggleTag, Arg::None),
        ]
    }
}

impl Default for Config {
    fn default() -> Self {
        let modkey = KeyButMask::MOD4;

        Self {
            path: None,
            border_width: 1,
            font: "monospace:size=10".to_string(),
            scheme_normal: ColorScheme {
                foreground: 0xbbbbbb,
                background: 0x222222,
                border: 0x444444,
            },
            scheme_selected: ColorScheme {
                foreground: 0xeeeeee,
                background: 0x005577,
                border: 0x005577,
            },
            show_bar: true,
            top_bar: true,
            layouts: Self::default_layouts(),
            master_factor: 0.55,
            num_master: 1,
            resize_hints: true,
            snap: 32,
            systray_enabled: true,
            systray_pinning: 0,
            systray_spacing: 2,
            systray_pinning_fail_first: true,
            terminal: TERMINAL.to_string(),
            modkey,
            tags: (1..=9).map(|tag| tag.to_string()).collect(),
            keybindings: Self::default_keybindings(modkey, TERMINAL),
            buttons: Self::default_buttons(modkey, TERMINAL),
            window_rules: vec![
                WindowRule {
                    class: Some("Gimp".to_string()),
                    is_floating: Some(true),
                    monitor: Some(-1),
                    ..WindowRule::default()
                },
                WindowRule {
                    class: Some("telegram-desktop".to_string()),
                    is_floating: Some(true),
                    monitor: Some(-1),
                    ..WindowRule::default()
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rules_match_substrings_and_skip_empty_fields() {
        let rule = WindowRule {
            class: Some("Gimp".to_string()),
            title: Some("Toolbox".to_string()),
            ..WindowRule::default()
        };
        assert!(rule.matches("Gimp-2.10", "gimp", "Toolbox - Tool Options"));
        assert!(!rule.matches("Gimp", "gimp", "Image"));
        assert!(WindowRule::default().matches("anything", "", ""));
    }

    #[test]
    fn defaults_cover_every_tag_key() {
        let config = Config::default();
        assert_eq!(config.tags.len(), TAG_KEYS.len());
        let tag_bindings = config
            .keybindings
            .iter()
            .filter(|b| b.func == KeyAction::ToggleTag)
            .count();
        assert_eq!(tag_bindings, 9);
        assert_eq!(config.layouts[0].symbol, "#");
        assert_eq!(config.layouts[0].kind, LayoutType::Tile);
    }

    #[test]
    fn bindings_follow_the_modkey() {
        let bindings = Config::default_keybindings(KeyButMask::MOD1, "st");
        let quit = bindings
            .iter()
            .find(|b| b.func == KeyAction::Quit)
            .map(|b| b.key.modifiers.clone());
        assert_eq!(
            quit,
            Some(vec![KeyButMask::MOD1, KeyButMask::CONTROL, KeyButMask::SHIFT])
        );
    }
}
