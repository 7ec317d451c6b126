mod bar;
pub mod font;

pub use bar::{Bar, BarContent, TitleContent};

use std::str::FromStr;

/// Where a button press landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickRegion {
    TagBar,
    LayoutSymbol,
    StatusText,
    WindowTitle,
    ClientWindow,
    RootWindow,
}

impl FromStr for ClickRegion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "tagbar" | "tag" => Ok(Self::TagBar),
            "ltsymbol" | "layout" => Ok(Self::LayoutSymbol),
            "statustext" | "status" => Ok(Self::StatusText),
            "wintitle" | "title" => Ok(Self::WindowTitle),
            "clientwin" | "client" => Ok(Self::ClientWindow),
            "rootwin" | "root" => Ok(Self::RootWindow),
            _ => Err(format!("Invalid click region: {}", s)),
        }
    }
}

/// Maps an x offset inside a bar to the region under it. Tag clicks also
/// return the tag index.
pub fn resolve_click(
    click_x: i32,
    tag_widths: &[i32],
    symbol_width: i32,
    status_width: i32,
    bar_area_width: i32,
) -> (ClickRegion, Option<usize>) {
    let mut x = 0;
    for (index, width) in tag_widths.iter().enumerate() {
        x += width;
        if click_x < x {
            return (ClickRegion::TagBar, Some(index));
        }
    }

    if click_x < x + symbol_width {
        (ClickRegion::LayoutSymbol, None)
    } else if click_x > bar_area_width - status_width {
        (ClickRegion::StatusText, None)
    } else {
        (ClickRegion::WindowTitle, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TAGS: [i32; 3] = [20, 20, 30];

    #[test]
    fn tag_clicks_carry_the_index() {
        assert_eq!(resolve_click(0, &TAGS, 25, 100, 1000), (ClickRegion::TagBar, Some(0)));
        assert_eq!(resolve_click(20, &TAGS, 25, 100, 1000), (ClickRegion::TagBar, Some(1)));
        assert_eq!(resolve_click(69, &TAGS, 25, 100, 1000), (ClickRegion::TagBar, Some(2)));
    }

    #[test]
    fn symbol_follows_the_tags() {
        assert_eq!(resolve_click(70, &TAGS, 25, 100, 1000), (ClickRegion::LayoutSymbol, None));
        assert_eq!(resolve_click(94, &TAGS, 25, 100, 1000), (ClickRegion::LayoutSymbol, None));
    }

    #[test]
    fn status_sits_at_the_right_edge() {
        assert_eq!(resolve_click(901, &TAGS, 25, 100, 1000), (ClickRegion::StatusText, None));
        assert_eq!(resolve_click(900, &TAGS, 25, 100, 1000), (ClickRegion::WindowTitle, None));
        assert_eq!(resolve_click(95, &TAGS, 25, 100, 1000), (ClickRegion::WindowTitle, None));
    }

    #[test]
    fn click_regions_parse_from_config_names() {
        assert_eq!("tagbar".parse(), Ok(ClickRegion::TagBar));
        assert_eq!("ClientWin".parse(), Ok(ClickRegion::ClientWindow));
        assert!("nowhere".parse::<ClickRegion>().is_err());
    }
}
