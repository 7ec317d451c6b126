use mlua::{Lua, LuaSerdeExt, Table, Value};
use std::cell::RefCell;
use std::rc::Rc;

use crate::bar::ClickRegion;
use crate::errors::ConfigError;
use crate::keyboard::handlers::{Arg, ButtonBinding, KeyAction, KeyBinding};
use crate::keyboard::keysyms::{self, Keysym};
use crate::{ColorScheme, Config, WindowRule};
use x11rb::protocol::xproto::KeyButMask;

/// Settings collected while the script runs. Bindings left empty fall back
/// to the built-in tables, built for the final modkey and terminal.
#[derive(Clone)]
pub struct ConfigBuilder {
    pub border_width: u32,
    pub font: String,
    pub scheme_normal: ColorScheme,
    pub scheme_selected: ColorScheme,
    pub show_bar: bool,
    pub top_bar: bool,
    pub master_factor: f32,
    pub num_master: i32,
    pub resize_hints: bool,
    pub snap: i32,
    pub systray_enabled: bool,
    pub systray_pinning: usize,
    pub systray_spacing: i32,
    pub systray_pinning_fail_first: bool,
    pub terminal: String,
    pub modkey: KeyButMask,
    pub tags: Vec<String>,
    pub keybindings: Vec<KeyBinding>,
    pub buttons: Vec<ButtonBinding>,
    pub window_rules: Vec<WindowRule>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        let defaults = Config::default();
        Self {
            border_width: defaults.border_width,
            font: defaults.font,
            scheme_normal: defaults.scheme_normal,
            scheme_selected: defaults.scheme_selected,
            show_bar: defaults.show_bar,
            top_bar: defaults.top_bar,
            master_factor: defaults.master_factor,
            num_master: defaults.num_master,
            resize_hints: defaults.resize_hints,
            snap: defaults.snap,
            systray_enabled: defaults.systray_enabled,
            systray_pinning: defaults.systray_pinning,
            systray_spacing: defaults.systray_spacing,
            systray_pinning_fail_first: defaults.systray_pinning_fail_first,
            terminal: defaults.terminal,
            modkey: defaults.modkey,
            tags: defaults.tags,
            keybindings: Vec::new(),
            buttons: Vec::new(),
            window_rules: Vec::new(),
        }
    }
}

impl ConfigBuilder {
    pub fn build(self) -> Config {
        let keybindings = if self.keybindings.is_empty() {
            Config::default_keybindings(self.modkey, &self.terminal)
        } else {
            self.keybindings
        };
        let buttons = if self.buttons.is_empty() {
            Config::default_buttons(self.modkey, &self.terminal)
        } else {
            self.buttons
        };

        Config {
            path: None,
            border_width: self.border_width,
            font: self.font,
            scheme_normal: self.scheme_normal,
            scheme_selected: self.scheme_selected,
            show_bar: self.show_bar,
            top_bar: self.top_bar,
            layouts: Config::default_layouts(),
            master_factor: self.master_factor,
            num_master: self.num_master,
            resize_hints: self.resize_hints,
            snap: self.snap,
            systray_enabled: self.systray_enabled,
            systray_pinning: self.systray_pinning,
            systray_spacing: self.systray_spacing,
            systray_pinning_fail_first: self.systray_pinning_fail_first,
            terminal: self.terminal,
            modkey: self.modkey,
            tags: self.tags,
            keybindings,
            buttons,
            window_rules: self.window_rules,
        }
    }
}

pub type SharedBuilder = Rc<RefCell<ConfigBuilder>>;

pub fn register_api(lua: &Lua) -> Result<SharedBuilder, ConfigError> {
    let builder = Rc::new(RefCell::new(ConfigBuilder::default()));

    let tagwm_table = lua.create_table()?;

    register_actions(lua, &tagwm_table)?;
    register_key_module(lua, &tagwm_table, builder.clone())?;
    register_button_module(lua, &tagwm_table, builder.clone())?;
    register_border_module(lua, &tagwm_table, builder.clone())?;
    register_bar_module(lua, &tagwm_table, builder.clone())?;
    register_layout_module(lua, &tagwm_table, builder.clone())?;
    register_systray_module(lua, &tagwm_table, builder.clone())?;
    register_rule_module(lua, &tagwm_table, builder.clone())?;
    register_misc(lua, &tagwm_table, builder.clone())?;

    lua.globals().set("tagwm", tagwm_table)?;

    Ok(builder)
}

/// Constructors returning action tables for `key.bind` and `button.bind`.
fn register_actions(lua: &Lua, parent: &Table) -> Result<(), ConfigError> {
    let spawn = lua.create_function(|lua, cmd: Value| create_action_table(lua, "Spawn", cmd))?;
    let toggle_scratch = lua.create_function(|lua, cmd: Value| {
        create_action_table(lua, "ToggleScratch", cmd)
    })?;

    for (name, action) in [
        ("view", "ViewTag"),
        ("toggleview", "ToggleView"),
        ("tag", "MoveToTag"),
        ("toggletag", "ToggleTag"),
    ] {
        let constructor = lua.create_function(move |lua, tag: Value| {
            create_action_table(lua, action, tag_index_value(tag)?)
        })?;
        parent.set(name, constructor)?;
    }

    for (name, action) in [
        ("focus_stack", "FocusStack"),
        ("move_stack", "MoveStack"),
        ("inc_num_master", "IncNumMaster"),
        ("focus_monitor", "FocusMonitor"),
        ("tag_monitor", "TagMonitor"),
    ] {
        let constructor = lua.create_function(move |lua, delta: i32| {
            create_action_table(lua, action, Value::Integer(delta as i64))
        })?;
        parent.set(name, constructor)?;
    }

    for (name, action) in [
        ("toggle_floating", "ToggleFloating"),
        ("toggle_bar", "ToggleBar"),
        ("zoom", "Zoom"),
        ("kill", "KillClient"),
        ("move_mouse", "MoveMouse"),
        ("resize_mouse", "ResizeMouse"),
        ("quit", "Quit"),
    ] {
        let constructor =
            lua.create_function(move |lua, ()| create_action_table(lua, action, Value::Nil))?;
        parent.set(name, constructor)?;
    }

    let set_master_factor = lua.create_function(|lua, delta: f64| {
        create_action_table(lua, "SetMasterFactor", Value::Number(delta))
    })?;

    let set_layout = lua.create_function(|lua, layout: Value| {
        let arg = match layout {
            Value::Integer(index) if index >= 1 => Value::Integer(index - 1),
            Value::Integer(index) => {
                return Err(mlua::Error::RuntimeError(format!(
                    "tagwm.set_layout: layout numbers start at 1, got {index}"
                )));
            }
            other => other,
        };
        create_action_table(lua, "SetLayout", arg)
    })?;

    parent.set("spawn", spawn)?;
    parent.set("toggle_scratch", toggle_scratch)?;
    parent.set("set_master_factor", set_master_factor)?;
    parent.set("set_layout", set_layout)?;
    Ok(())
}

/// Lua counts tags from 1; `"all"` is every tag and nil the previous view.
fn tag_index_value(tag: Value) -> mlua::Result<Value> {
    match tag {
        Value::Nil => Ok(Value::Nil),
        Value::Integer(index) if index >= 1 => Ok(Value::Integer(index - 1)),
        Value::String(s) if s.to_string_lossy() == "all" => Ok(Value::Integer(-1)),
        other => Err(mlua::Error::RuntimeError(format!(
            "tag must be a number starting at 1 or \"all\", got {other:?}"
        ))),
    }
}

fn register_key_module(
    lua: &Lua,
    parent: &Table,
    builder: SharedBuilder,
) -> Result<(), ConfigError> {
    let key_table = lua.create_table()?;

    let builder_clone = builder.clone();
    let bind = lua.create_function(move |lua, (mods, key, action): (Value, String, Value)| {
        let modifiers = parse_modifiers_value(lua, mods)?;
        let keysym = parse_keysym(&key)?;
        let (key_action, arg) = parse_action_value(lua, action)?;

        let binding = KeyBinding::new(modifiers, keysym, key_action, arg);
        builder_clone.borrow_mut().keybindings.push(binding);

        Ok(())
    })?;

    key_table.set("bind", bind)?;
    parent.set("key", key_table)?;
    Ok(())
}

fn register_button_module(
    lua: &Lua,
    parent: &Table,
    builder: SharedBuilder,
) -> Result<(), ConfigError> {
    let button_table = lua.create_table()?;

    let bind = lua.create_function(
        move |lua, (click, mods, button, action): (String, Value, u8, Value)| {
            let click: ClickRegion = click
                .parse()
                .map_err(|e: String| mlua::Error::RuntimeError(format!("tagwm.button.bind: {e}")))?;
            let modifiers = parse_modifiers_value(lua, mods)?;
            let (button_action, arg) = parse_action_value(lua, action)?;

            let binding = ButtonBinding::new(click, modifiers, button, button_action, arg);
            builder.borrow_mut().buttons.push(binding);
            Ok(())
        },
    )?;

    button_table.set("bind", bind)?;
    parent.set("button", button_table)?;
    Ok(())
}

fn register_border_module(
    lua: &Lua,
    parent: &Table,
    builder: SharedBuilder,
) -> Result<(), ConfigError> {
    let border_table = lua.create_table()?;

    let builder_clone = builder.clone();
    let set_width = lua.create_function(move |_, width: u32| {
        builder_clone.borrow_mut().border_width = width;
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let set_focused_color = lua.create_function(move |_, color: Value| {
        builder_clone.borrow_mut().scheme_selected.border = parse_color_value(color)?;
        Ok(())
    })?;

    let set_unfocused_color = lua.create_function(move |_, color: Value| {
        builder.borrow_mut().scheme_normal.border = parse_color_value(color)?;
        Ok(())
    })?;

    border_table.set("set_width", set_width)?;
    border_table.set("set_focused_color", set_focused_color)?;
    border_table.set("set_unfocused_color", set_unfocused_color)?;
    parent.set("border", border_table)?;
    Ok(())
}

fn register_bar_module(
    lua: &Lua,
    parent: &Table,
    builder: SharedBuilder,
) -> Result<(), ConfigError> {
    let bar_table = lua.create_table()?;

    let builder_clone = builder.clone();
    let set_show = lua.create_function(move |_, show: bool| {
        builder_clone.borrow_mut().show_bar = show;
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let set_top = lua.create_function(move |_, top: bool| {
        builder_clone.borrow_mut().top_bar = top;
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let set_scheme_normal =
        lua.create_function(move |_, (fg, bg, border): (Value, Value, Value)| {
            builder_clone.borrow_mut().scheme_normal = parse_scheme(fg, bg, border)?;
            Ok(())
        })?;

    let set_scheme_selected =
        lua.create_function(move |_, (fg, bg, border): (Value, Value, Value)| {
            builder.borrow_mut().scheme_selected = parse_scheme(fg, bg, border)?;
            Ok(())
        })?;

    bar_table.set("set_show", set_show)?;
    bar_table.set("set_top", set_top)?;
    bar_table.set("set_scheme_normal", set_scheme_normal)?;
    bar_table.set("set_scheme_selected", set_scheme_selected)?;
    parent.set("bar", bar_table)?;
    Ok(())
}

fn register_layout_module(
    lua: &Lua,
    parent: &Table,
    builder: SharedBuilder,
) -> Result<(), ConfigError> {
    let layout_table = lua.create_table()?;

    let builder_clone = builder.clone();
    let set_master_factor = lua.create_function(move |_, factor: f32| {
        if !(0.05..=0.95).contains(&factor) {
            return Err(mlua::Error::RuntimeError(format!(
                "tagwm.layout.set_master_factor: {factor} is outside 0.05..0.95"
            )));
        }
        builder_clone.borrow_mut().master_factor = factor;
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let set_num_master = lua.create_function(move |_, count: i32| {
        builder_clone.borrow_mut().num_master = count.max(0);
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let set_resize_hints = lua.create_function(move |_, enabled: bool| {
        builder_clone.borrow_mut().resize_hints = enabled;
        Ok(())
    })?;

    let set_snap = lua.create_function(move |_, snap: u32| {
        builder.borrow_mut().snap = snap as i32;
        Ok(())
    })?;

    layout_table.set("set_master_factor", set_master_factor)?;
    layout_table.set("set_num_master", set_num_master)?;
    layout_table.set("set_resize_hints", set_resize_hints)?;
    layout_table.set("set_snap", set_snap)?;
    parent.set("layout", layout_table)?;
    Ok(())
}

fn register_systray_module(
    lua: &Lua,
    parent: &Table,
    builder: SharedBuilder,
) -> Result<(), ConfigError> {
    let systray_table = lua.create_table()?;

    let builder_clone = builder.clone();
    let set_enabled = lua.create_function(move |_, enabled: bool| {
        builder_clone.borrow_mut().systray_enabled = enabled;
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let set_pinning = lua.create_function(move |_, pinning: usize| {
        builder_clone.borrow_mut().systray_pinning = pinning;
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let set_spacing = lua.create_function(move |_, spacing: u32| {
        builder_clone.borrow_mut().systray_spacing = spacing as i32;
        Ok(())
    })?;

    let set_pinning_fail_first = lua.create_function(move |_, enabled: bool| {
        builder.borrow_mut().systray_pinning_fail_first = enabled;
        Ok(())
    })?;

    systray_table.set("set_enabled", set_enabled)?;
    systray_table.set("set_pinning", set_pinning)?;
    systray_table.set("set_spacing", set_spacing)?;
    systray_table.set("set_pinning_fail_first", set_pinning_fail_first)?;
    parent.set("systray", systray_table)?;
    Ok(())
}

fn register_rule_module(
    lua: &Lua,
    parent: &Table,
    builder: SharedBuilder,
) -> Result<(), ConfigError> {
    let rule_table = lua.create_table()?;

    let add = lua.create_function(move |lua, config: Table| {
        let rule: WindowRule = lua.from_value(Value::Table(config))?;
        builder.borrow_mut().window_rules.push(rule);
        Ok(())
    })?;

    rule_table.set("add", add)?;
    parent.set("rule", rule_table)?;
    Ok(())
}

fn register_misc(lua: &Lua, parent: &Table, builder: SharedBuilder) -> Result<(), ConfigError> {
    let builder_clone = builder.clone();
    let set_terminal = lua.create_function(move |_, term: String| {
        builder_clone.borrow_mut().terminal = term;
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let set_modkey = lua.create_function(move |_, modkey_str: String| {
        let modkey = parse_modkey_string(&modkey_str)
            .map_err(|e| mlua::Error::RuntimeError(format!("{}", e)))?;
        builder_clone.borrow_mut().modkey = modkey;
        Ok(())
    })?;

    let builder_clone = builder.clone();
    let set_tags = lua.create_function(move |_, tags: Vec<String>| {
        if tags.is_empty() || tags.len() > 31 {
            return Err(mlua::Error::RuntimeError(format!(
                "tagwm.set_tags: need between 1 and 31 tags, got {}",
                tags.len()
            )));
        }
        builder_clone.borrow_mut().tags = tags;
        Ok(())
    })?;

    let set_font = lua.create_function(move |_, font: String| {
        builder.borrow_mut().font = font;
        Ok(())
    })?;

    parent.set("set_terminal", set_terminal)?;
    parent.set("set_modkey", set_modkey)?;
    parent.set("set_tags", set_tags)?;
    parent.set("set_font", set_font)?;
    Ok(())
}

fn parse_modifiers_value(_lua: &Lua, value: Value) -> mlua::Result<Vec<KeyButMask>> {
    let invalid = |e: ConfigError| mlua::Error::RuntimeError(format!("invalid modifier - {e}"));
    match value {
        Value::Nil => Ok(Vec::new()),
        Value::Table(t) => {
            let mut mods = Vec::new();
            for i in 1..=t.len()? {
                let mod_str: String = t.get(i)?;
                mods.push(parse_modkey_string(&mod_str).map_err(invalid)?);
            }
            Ok(mods)
        }
        Value::String(s) => {
            let s_str = s.to_str()?;
            Ok(vec![parse_modkey_string(&s_str).map_err(invalid)?])
        }
        _ => Err(mlua::Error::RuntimeError(
            "modifiers must be a table like {\"Mod4\"} or {\"Mod4\", \"Shift\"}".into(),
        )),
    }
}

fn parse_modkey_string(s: &str) -> Result<KeyButMask, ConfigError> {
    match s {
        "Mod1" => Ok(KeyButMask::MOD1),
        "Mod2" => Ok(KeyButMask::MOD2),
        "Mod3" => Ok(KeyButMask::MOD3),
        "Mod4" => Ok(KeyButMask::MOD4),
        "Mod5" => Ok(KeyButMask::MOD5),
        "Shift" => Ok(KeyButMask::SHIFT),
        "Control" => Ok(KeyButMask::CONTROL),
        _ => Err(ConfigError::InvalidModkey(s.to_string())),
    }
}

fn parse_keysym(key: &str) -> mlua::Result<Keysym> {
    keysyms::keysym_from_str(key)
        .ok_or_else(|| mlua::Error::RuntimeError(ConfigError::UnknownKey(key.to_string()).to_string()))
}

fn parse_action_value(_lua: &Lua, value: Value) -> mlua::Result<(KeyAction, Arg)> {
    match value {
        Value::Function(_) => Err(mlua::Error::RuntimeError(
            "action must be a function call, not a function reference. did you forget ()? example: tagwm.spawn({'st'}) not tagwm.spawn".into(),
        )),
        Value::Table(t) => {
            if let Ok(action_name) = t.get::<String>("__action") {
                let action = string_to_action(&action_name)?;
                let arg = if let Ok(arg_val) = t.get::<Value>("__arg") {
                    value_to_arg(arg_val)?
                } else {
                    Arg::None
                };
                return Ok((action, arg));
            }

            Err(mlua::Error::RuntimeError(
                "action must be a table returned by tagwm functions like tagwm.spawn(), tagwm.kill(), tagwm.quit(), etc.".into(),
            ))
        }
        _ => Err(mlua::Error::RuntimeError(
            "action must be a table returned by tagwm functions like tagwm.spawn(), tagwm.kill(), tagwm.quit(), etc.".into(),
        )),
    }
}

fn string_to_action(s: &str) -> mlua::Result<KeyAction> {
    match s {
        "Spawn" => Ok(KeyAction::Spawn),
        "KillClient" => Ok(KeyAction::KillClient),
        "FocusStack" => Ok(KeyAction::FocusStack),
        "MoveStack" => Ok(KeyAction::MoveStack),
        "Quit" => Ok(KeyAction::Quit),
        "ViewTag" => Ok(KeyAction::ViewTag),
        "ToggleView" => Ok(KeyAction::ToggleView),
        "MoveToTag" => Ok(KeyAction::MoveToTag),
        "ToggleTag" => Ok(KeyAction::ToggleTag),
        "ToggleFloating" => Ok(KeyAction::ToggleFloating),
        "ToggleBar" => Ok(KeyAction::ToggleBar),
        "ToggleScratch" => Ok(KeyAction::ToggleScratch),
        "SetLayout" => Ok(KeyAction::SetLayout),
        "Zoom" => Ok(KeyAction::Zoom),
        "FocusMonitor" => Ok(KeyAction::FocusMonitor),
        "TagMonitor" => Ok(KeyAction::TagMonitor),
        "SetMasterFactor" => Ok(KeyAction::SetMasterFactor),
        "IncNumMaster" => Ok(KeyAction::IncNumMaster),
        "MoveMouse" => Ok(KeyAction::MoveMouse),
        "ResizeMouse" => Ok(KeyAction::ResizeMouse),
        _ => Err(mlua::Error::RuntimeError(
            ConfigError::UnknownAction(s.to_string()).to_string(),
        )),
    }
}

fn value_to_arg(value: Value) -> mlua::Result<Arg> {
    match value {
        Value::Nil => Ok(Arg::None),
        Value::String(s) => Ok(Arg::Str(s.to_str()?.to_string())),
        Value::Integer(i) => Ok(Arg::Int(i as i32)),
        Value::Number(n) => Ok(Arg::Float(n as f32)),
        Value::Table(t) => {
            let mut arr = Vec::new();
            for i in 1..=t.len()? {
                let item: String = t.get(i)?;
                arr.push(item);
            }
            Ok(Arg::Array(arr))
        }
        _ => Ok(Arg::None),
    }
}

fn create_action_table(lua: &Lua, action_name: &str, arg: Value) -> mlua::Result<Table> {
    let table = lua.create_table()?;
    table.set("__action", action_name)?;
    table.set("__arg", arg)?;
    Ok(table)
}

fn parse_scheme(fg: Value, bg: Value, border: Value) -> mlua::Result<ColorScheme> {
    Ok(ColorScheme {
        foreground: parse_color_value(fg)?,
        background: parse_color_value(bg)?,
        border: parse_color_value(border)?,
    })
}

fn parse_color_value(value: Value) -> mlua::Result<u32> {
    let invalid = |s: &str| mlua::Error::RuntimeError(ConfigError::InvalidColor(s.to_string()).to_string());
    match value {
        Value::Integer(i) => Ok(i as u32),
        Value::Number(n) => Ok(n as u32),
        Value::String(s) => {
            let s = s.to_str()?;
            if let Some(hex) = s.strip_prefix('#') {
                u32::from_str_radix(hex, 16).map_err(|_| invalid(&s))
            } else if let Some(hex) = s.strip_prefix("0x") {
                u32::from_str_radix(hex, 16).map_err(|_| invalid(&s))
            } else {
                s.parse::<u32>().map_err(|_| invalid(&s))
            }
        }
        _ => Err(mlua::Error::RuntimeError(
            "color must be a number (0xff0000) or string ('#ff0000' or '0xff0000')".into(),
        )),
    }
}
