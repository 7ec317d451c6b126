#![allow(dead_code)]

pub type Keysym = u32;

pub const XK_ESCAPE: Keysym = 0xff1b;
pub const XK_RETURN: Keysym = 0xff0d;
pub const XK_TAB: Keysym = 0xff09;
pub const XK_BACKSPACE: Keysym = 0xff08;
pub const XK_DELETE: Keysym = 0xffff;
pub const XK_NUM_LOCK: Keysym = 0xff7f;
pub const XK_PRINT: Keysym = 0xff61;
pub const XK_HOME: Keysym = 0xff50;
pub const XK_LEFT: Keysym = 0xff51;
pub const XK_UP: Keysym = 0xff52;
pub const XK_RIGHT: Keysym = 0xff53;
pub const XK_DOWN: Keysym = 0xff54;
pub const XK_PAGE_UP: Keysym = 0xff55;
pub const XK_PAGE_DOWN: Keysym = 0xff56;
pub const XK_END: Keysym = 0xff57;

pub const XK_F1: Keysym = 0xffbe;
pub const XK_F2: Keysym = 0xffbf;
pub const XK_F3: Keysym = 0xffc0;
pub const XK_F4: Keysym = 0xffc1;
pub const XK_F5: Keysym = 0xffc2;
pub const XK_F6: Keysym = 0xffc3;
pub const XK_F7: Keysym = 0xffc4;
pub const XK_F8: Keysym = 0xffc5;
pub const XK_F9: Keysym = 0xffc6;
pub const XK_F10: Keysym = 0xffc7;
pub const XK_F11: Keysym = 0xffc8;
pub const XK_F12: Keysym = 0xffc9;

pub const XK_SPACE: Keysym = 0x0020;
pub const XK_APOSTROPHE: Keysym = 0x0027;
pub const XK_COMMA: Keysym = 0x002c;
pub const XK_MINUS: Keysym = 0x002d;
pub const XK_PERIOD: Keysym = 0x002e;
pub const XK_SLASH: Keysym = 0x002f;
pub const XK_SEMICOLON: Keysym = 0x003b;
pub const XK_EQUAL: Keysym = 0x003d;
pub const XK_BRACKETLEFT: Keysym = 0x005b;
pub const XK_BACKSLASH: Keysym = 0x005c;
pub const XK_BRACKETRIGHT: Keysym = 0x005d;
pub const XK_GRAVE: Keysym = 0x0060;

pub const XK_0: Keysym = 0x0030;
pub const XK_1: Keysym = 0x0031;
pub const XK_2: Keysym = 0x0032;
pub const XK_3: Keysym = 0x0033;
pub const XK_4: Keysym = 0x0034;
pub const XK_5: Keysym = 0x0035;
pub const XK_6: Keysym = 0x0036;
pub const XK_7: Keysym = 0x0037;
pub const XK_8: Keysym = 0x0038;
pub const XK_9: Keysym = 0x0039;

pub const XK_A: Keysym = 0x0061;
pub const XK_B: Keysym = 0x0062;
pub const XK_C: Keysym = 0x0063;
pub const XK_D: Keysym = 0x0064;
pub const XK_E: Keysym = 0x0065;
pub const XK_F: Keysym = 0x0066;
pub const XK_G: Keysym = 0x0067;
pub const XK_H: Keysym = 0x0068;
pub const XK_I: Keysym = 0x0069;
pub const XK_J: Keysym = 0x006a;
pub const XK_K: Keysym = 0x006b;
pub const XK_L: Keysym = 0x006c;
pub const XK_M: Keysym = 0x006d;
pub const XK_N: Keysym = 0x006e;
pub const XK_O: Keysym = 0x006f;
pub const XK_P: Keysym = 0x0070;
pub const XK_Q: Keysym = 0x0071;
pub const XK_R: Keysym = 0x0072;
pub const XK_S: Keysym = 0x0073;
pub const XK_T: Keysym = 0x0074;
pub const XK_U: Keysym = 0x0075;
pub const XK_V: Keysym = 0x0076;
pub const XK_W: Keysym = 0x0077;
pub const XK_X: Keysym = 0x0078;
pub const XK_Y: Keysym = 0x0079;
pub const XK_Z: Keysym = 0x007a;

const NAMED: &[(&str, Keysym)] = &[
    ("Escape", XK_ESCAPE),
    ("Return", XK_RETURN),
    ("Tab", XK_TAB),
    ("BackSpace", XK_BACKSPACE),
    ("Delete", XK_DELETE),
    ("Num_Lock", XK_NUM_LOCK),
    ("Print", XK_PRINT),
    ("Home", XK_HOME),
    ("Left", XK_LEFT),
    ("Up", XK_UP),
    ("Right", XK_RIGHT),
    ("Down", XK_DOWN),
    ("Page_Up", XK_PAGE_UP),
    ("Prior", XK_PAGE_UP),
    ("Page_Down", XK_PAGE_DOWN),
    ("Next", XK_PAGE_DOWN),
    ("End", XK_END),
    ("space", XK_SPACE),
    ("apostrophe", XK_APOSTROPHE),
    ("comma", XK_COMMA),
    ("minus", XK_MINUS),
    ("period", XK_PERIOD),
    ("slash", XK_SLASH),
    ("semicolon", XK_SEMICOLON),
    ("equal", XK_EQUAL),
    ("bracketleft", XK_BRACKETLEFT),
    ("backslash", XK_BACKSLASH),
    ("bracketright", XK_BRACKETRIGHT),
    ("grave", XK_GRAVE),
];

/// Looks a key up by its X name (`Return`, `bracketleft`, `F5`, `q`, `7`).
/// Single letters are case insensitive.
pub fn keysym_from_str(name: &str) -> Option<Keysym> {
    if let Some(&(_, keysym)) = NAMED.iter().find(|(known, _)| *known == name) {
        return Some(keysym);
    }

    if let Some(number) = name.strip_prefix('F').and_then(|n| n.parse::<u32>().ok())
        && (1..=12).contains(&number)
    {
        return Some(XK_F1 + number - 1);
    }

    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Some(c.to_ascii_lowercase() as Keysym),
        (Some(c), None) if c.is_ascii_digit() => Some(c as Keysym),
        _ => None,
    }
}

pub fn format_keysym(keysym: Keysym) -> String {
    if let Some((name, _)) = NAMED.iter().find(|(_, known)| *known == keysym) {
        return name.to_string();
    }
    if (XK_F1..=XK_F12).contains(&keysym) {
        return format!("F{}", keysym - XK_F1 + 1);
    }
    match char::from_u32(keysym) {
        Some(c) if c.is_ascii_graphic() => c.to_ascii_uppercase().to_string(),
        _ => format!("0x{keysym:x}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn names_resolve() {
        assert_eq!(keysym_from_str("Return"), Some(XK_RETURN));
        assert_eq!(keysym_from_str("bracketleft"), Some(XK_BRACKETLEFT));
        assert_eq!(keysym_from_str("F1"), Some(XK_F1));
        assert_eq!(keysym_from_str("F12"), Some(XK_F12));
        assert_eq!(keysym_from_str("Q"), Some(XK_Q));
        assert_eq!(keysym_from_str("0"), Some(XK_0));
        assert_eq!(keysym_from_str("F13"), None);
        assert_eq!(keysym_from_str("Hyper"), None);
    }

    #[test]
    fn formatting_is_readable() {
        assert_eq!(format_keysym(XK_GRAVE), "grave");
        assert_eq!(format_keysym(XK_F3), "F3");
        assert_eq!(format_keysym(XK_J), "J");
    }
}
