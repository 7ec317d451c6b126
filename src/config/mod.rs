//! Lua configuration.
//!
//! The script talks to a global `tagwm` table; see `templates/config.lua`
//! for the full surface.

mod lua_api;

use std::path::Path;

use mlua::Lua;

use crate::Config;
use crate::errors::ConfigError;

pub use lua_api::ConfigBuilder;

/// Evaluates `input` and returns the resulting configuration.
/// `config_directory` is added to the module search path so the script can
/// `require` its neighbours.
pub fn parse_lua_config(input: &str, config_directory: Option<&Path>) -> Result<Config, ConfigError> {
    let lua = Lua::new();

    if let Some(dir) = config_directory {
        let package: mlua::Table = lua.globals().get("package")?;
        let path: String = package.get("path")?;
        package.set("path", format!("{}/?.lua;{}", dir.display(), path))?;
    }

    let builder = lua_api::register_api(&lua)?;
    lua.load(input).set_name("config.lua").exec()?;

    let builder = builder.borrow().clone();
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bar::ClickRegion;
    use crate::keyboard::keysyms;
    use crate::keyboard::{Arg, KeyAction};
    use pretty_assertions::assert_eq;
    use x11rb::protocol::xproto::KeyButMask;

    #[test]
    fn empty_script_gives_the_defaults() {
        let config = parse_lua_config("", None).unwrap_or_else(|e| panic!("{e}"));
        let defaults = Config::default();
        assert_eq!(config.tags, defaults.tags);
        assert_eq!(config.keybindings.len(), defaults.keybindings.len());
        assert_eq!(config.buttons.len(), defaults.buttons.len());
        assert_eq!(config.snap, 32);
        assert_eq!(config.systray_spacing, 2);
    }

    #[test]
    fn settings_reach_the_config() {
        let config = parse_lua_config(
            r##"
            tagwm.set_tags({ "web", "code", "chat" })
            tagwm.set_terminal("st")
            tagwm.set_font("Iosevka:size=11")
            tagwm.border.set_width(3)
            tagwm.border.set_focused_color("#ff0000")
            tagwm.bar.set_top(false)
            tagwm.bar.set_scheme_normal("#ffffff", 0x000000, "0x333333")
            tagwm.layout.set_master_factor(0.6)
            tagwm.layout.set_num_master(2)
            tagwm.layout.set_snap(10)
            tagwm.layout.set_resize_hints(false)
            tagwm.systray.set_enabled(false)
            tagwm.systray.set_pinning(2)
            tagwm.systray.set_spacing(4)
            tagwm.systray.set_pinning_fail_first(false)
            "##,
            None,
        )
        .unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(config.tags, vec!["web", "code", "chat"]);
        assert_eq!(config.terminal, "st");
        assert_eq!(config.font, "Iosevka:size=11");
        assert_eq!(config.border_width, 3);
        assert_eq!(config.scheme_selected.border, 0xff0000);
        assert!(!config.top_bar);
        assert_eq!(config.scheme_normal.foreground, 0xffffff);
        assert_eq!(config.scheme_normal.border, 0x333333);
        assert!((config.master_factor - 0.6).abs() < f32::EPSILON);
        assert_eq!(config.num_master, 2);
        assert_eq!(config.snap, 10);
        assert!(!config.resize_hints);
        assert!(!config.systray_enabled);
        assert_eq!(config.systray_pinning, 2);
        assert_eq!(config.systray_spacing, 4);
        assert!(!config.systray_pinning_fail_first);
    }

    #[test]
    fn bindings_replace_the_defaults() {
        let config = parse_lua_config(
            r#"
            tagwm.set_modkey("Mod1")
            tagwm.key.bind({ "Mod1" }, "Return", tagwm.spawn({ "st" }))
            tagwm.key.bind({ "Mod1", "Shift" }, "2", tagwm.tag(2))
            tagwm.key.bind({ "Mod1" }, "0", tagwm.view("all"))
            tagwm.key.bind({ "Mod1" }, "minus", tagwm.set_master_factor(-0.05))
            tagwm.button.bind("tagbar", {}, 1, tagwm.view())
            "#,
            None,
        )
        .unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(config.modkey, KeyButMask::MOD1);
        assert_eq!(config.keybindings.len(), 4);

        let spawn = &config.keybindings[0];
        assert_eq!(spawn.key.keysym, keysyms::XK_RETURN);
        assert_eq!(spawn.func, KeyAction::Spawn);
        assert_eq!(spawn.arg, Arg::Array(vec!["st".to_string()]));

        assert_eq!(config.keybindings[1].arg, Arg::Int(1));
        assert_eq!(config.keybindings[2].arg, Arg::Int(-1));
        assert_eq!(config.keybindings[3].arg, Arg::Float(-0.05));

        assert_eq!(config.buttons.len(), 1);
        assert_eq!(config.buttons[0].click, ClickRegion::TagBar);
        assert_eq!(config.buttons[0].arg, Arg::None);
    }

    #[test]
    fn rules_deserialise_from_tables() {
        let config = parse_lua_config(
            r#"
            tagwm.rule.add({ class = "Gimp", floating = true })
            tagwm.rule.add({ instance = "scratch", scratchpad = true, tags = 1 << 3, monitor = 1 })
            "#,
            None,
        )
        .unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(config.window_rules.len(), 2);
        assert_eq!(config.window_rules[0].class.as_deref(), Some("Gimp"));
        assert_eq!(config.window_rules[0].is_floating, Some(true));
        assert!(!config.window_rules[0].scratchpad);
        assert!(config.window_rules[1].scratchpad);
        assert_eq!(config.window_rules[1].tags, Some(8));
        assert_eq!(config.window_rules[1].monitor, Some(1));
    }

    #[test]
    fn bad_input_is_an_error() {
        assert!(parse_lua_config("tagwm.set_modkey('Hyper')", None).is_err());
        assert!(parse_lua_config("tagwm.key.bind({'Mod4'}, 'NoSuchKey', tagwm.quit())", None).is_err());
        assert!(parse_lua_config("tagwm.key.bind({'Mod4'}, 'q', tagwm.quit)", None).is_err());
        assert!(parse_lua_config("tagwm.border.set_focused_color('#zz0000')", None).is_err());
        assert!(parse_lua_config("tagwm.button.bind('nowhere', {}, 1, tagwm.zoom())", None).is_err());
        assert!(parse_lua_config("this is not lua", None).is_err());
    }

    #[test]
    fn shipped_template_parses() {
        let config = parse_lua_config(include_str!("../../templates/config.lua"), None)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(config.tags.len(), 9);
        assert!(
            config
                .keybindings
                .iter()
                .any(|b| b.func == KeyAction::ToggleScratch)
        );
    }
}
