use super::{ArrangeContext, Layout, PlaceFn, WindowGeometry};

pub struct MonocleLayout;

impl Layout for MonocleLayout {
    fn name(&self) -> &'static str {
        super::LayoutType::Monocle.as_str()
    }

    fn arrange(&self, context: &ArrangeContext, place: &mut PlaceFn) -> Option<String> {
        let area = context.area;
        for (index, &border_width) in context.border_widths.iter().enumerate() {
            place(
                index,
                WindowGeometry {
                    x_coordinate: area.x_coordinate,
                    y_coordinate: area.y_coordinate,
                    width: area.width - 2 * border_width,
                    height: area.height - 2 * border_width,
                },
            );
        }

        (context.visible_count > 0).then(|| format!("[{}]", context.visible_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tiled_client_fills_the_area() {
        let area = WindowGeometry {
            x_coordinate: 0,
            y_coordinate: 20,
            width: 1280,
            height: 780,
        };
        let context = ArrangeContext {
            area,
            master_factor: 0.55,
            num_master: 1,
            visible_count: 3,
            border_widths: &[1, 1],
        };
        let mut placed = Vec::new();
        let symbol = MonocleLayout.arrange(&context, &mut |_, geometry| {
            placed.push(geometry);
            geometry
        });

        assert_eq!(symbol.as_deref(), Some("[3]"));
        assert_eq!(placed.len(), 2);
        assert!(placed.iter().all(|g| g.width == 1278 && g.height == 778));
    }

    #[test]
    fn empty_monitor_keeps_the_configured_symbol() {
        let context = ArrangeContext {
            area: WindowGeometry::default(),
            master_factor: 0.55,
            num_master: 1,
            visible_count: 0,
            border_widths: &[],
        };
        assert_eq!(MonocleLayout.arrange(&context, &mut |_, g| g), None);
    }
}
