pub mod monocle;
pub mod tile;

use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowGeometry {
    pub x_coordinate: i32,
    pub y_coordinate: i32,
    pub width: i32,
    pub height: i32,
}

impl WindowGeometry {
    pub fn intersection_area(&self, other: &WindowGeometry) -> i32 {
        let overlap_width = (self.x_coordinate + self.width)
            .min(other.x_coordinate + other.width)
            - self.x_coordinate.max(other.x_coordinate);
        let overlap_height = (self.y_coordinate + self.height)
            .min(other.y_coordinate + other.height)
            - self.y_coordinate.max(other.y_coordinate);
        overlap_width.max(0) * overlap_height.max(0)
    }
}

/// What a layout sees of a monitor.
pub struct ArrangeContext<'a> {
    pub area: WindowGeometry,
    pub master_factor: f32,
    pub num_master: i32,
    /// Every visible client, floating ones included.
    pub visible_count: usize,
    /// Border widths of the visible tiled clients, in client list order.
    pub border_widths: &'a [i32],
}

/// Called once per tiled client with the requested geometry (border
/// excluded); returns the geometry the client actually took.
pub type PlaceFn<'a> = dyn FnMut(usize, WindowGeometry) -> WindowGeometry + 'a;

pub trait Layout {
    /// Places every tiled client. Returns a replacement for the layout symbol
    /// when the layout wants to show something dynamic.
    fn arrange(&self, context: &ArrangeContext, place: &mut PlaceFn) -> Option<String>;
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutType {
    Tile,
    Floating,
    Monocle,
}

impl LayoutType {
    /// `None` for the floating layout, which leaves geometry alone.
    pub fn arranger(&self) -> Option<&'static dyn Layout> {
        match self {
            Self::Tile => Some(&tile::TileLayout),
            Self::Monocle => Some(&monocle::MonocleLayout),
            Self::Floating => None,
        }
    }

    pub fn arranges(&self) -> bool {
        self.arranger().is_some()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tile => "tile",
            Self::Floating => "floating",
            Self::Monocle => "monocle",
        }
    }
}

impl FromStr for LayoutType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "tile" | "tiling" => Ok(Self::Tile),
            "floating" | "float" => Ok(Self::Floating),
            "monocle" => Ok(Self::Monocle),
            _ => Err(format!("Invalid Layout Type: {}", s)),
        }
    }
}

/// One entry of the configured layout table.
#[derive(Debug, Clone)]
pub struct LayoutEntry {
    pub symbol: String,
    pub kind: LayoutType,
}

impl LayoutEntry {
    pub fn new(symbol: &str, kind: LayoutType) -> Self {
        Self {
            symbol: symbol.to_string(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floating_has_no_arrange_function() {
        assert!(!LayoutType::Floating.arranges());
        assert!(LayoutType::Tile.arranges());
        assert_eq!("Monocle".parse::<LayoutType>(), Ok(LayoutType::Monocle));
    }

    #[test]
    fn intersection_of_disjoint_rects_is_empty() {
        let left = WindowGeometry {
            x_coordinate: 0,
            y_coordinate: 0,
            width: 100,
            height: 100,
        };
        let right = WindowGeometry {
            x_coordinate: 100,
            ..left
        };
        assert_eq!(left.intersection_area(&right), 0);
        assert_eq!(left.intersection_area(&left), 10_000);
    }
}
