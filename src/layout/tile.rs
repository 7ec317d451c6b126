use super::{ArrangeContext, Layout, PlaceFn, WindowGeometry};

/// Master column on the left, stack column on the right.
pub struct TileLayout;

impl Layout for TileLayout {
    fn name(&self) -> &'static str {
        super::LayoutType::Tile.as_str()
    }

    fn arrange(&self, context: &ArrangeContext, place: &mut PlaceFn) -> Option<String> {
        let window_count = context.border_widths.len() as i32;
        if window_count == 0 {
            return None;
        }

        let area = context.area;
        let num_master = context.num_master.max(0);

        let master_width = if window_count > num_master {
            if num_master > 0 {
                (area.width as f32 * context.master_factor) as i32
            } else {
                0
            }
        } else {
            area.width
        };

        let mut master_y = 0;
        let mut stack_y = 0;

        // Each step splits what is left, so rounding remainders land on the
        // later clients and the column always sums to the full height.
        for (index, &border_width) in context.border_widths.iter().enumerate() {
            let index = index as i32;
            if index < num_master {
                let height = (area.height - master_y) / (window_count.min(num_master) - index);
                let placed = place(
                    index as usize,
                    WindowGeometry {
                        x_coordinate: area.x_coordinate,
                        y_coordinate: area.y_coordinate + master_y,
                        width: master_width - 2 * border_width,
                        height: height - 2 * border_width,
                    },
                );
                master_y += placed.height + 2 * border_width;
            } else {
                let height = (area.height - stack_y) / (window_count - index);
                let placed = place(
                    index as usize,
                    WindowGeometry {
                        x_coordinate: area.x_coordinate + master_width,
                        y_coordinate: area.y_coordinate + stack_y,
                        width: area.width - master_width - 2 * border_width,
                        height: height - 2 * border_width,
                    },
                );
                stack_y += placed.height + 2 * border_width;
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn area(width: i32, height: i32) -> WindowGeometry {
        WindowGeometry {
            x_coordinate: 0,
            y_coordinate: 20,
            width,
            height,
        }
    }

    fn run(
        window_area: WindowGeometry,
        master_factor: f32,
        num_master: i32,
        border_widths: &[i32],
    ) -> Vec<WindowGeometry> {
        let mut placed = Vec::new();
        let context = ArrangeContext {
            area: window_area,
            master_factor,
            num_master,
            visible_count: border_widths.len(),
            border_widths,
        };
        let symbol = TileLayout.arrange(&context, &mut |_, geometry| {
            placed.push(geometry);
            geometry
        });
        assert_eq!(symbol, None);
        placed
    }

    #[test]
    fn three_clients_split_master_and_stack() {
        let placed = run(area(1000, 780), 0.55, 1, &[0, 0, 0]);
        assert_eq!(
            placed,
            vec![
                WindowGeometry {
                    x_coordinate: 0,
                    y_coordinate: 20,
                    width: 550,
                    height: 780,
                },
                WindowGeometry {
                    x_coordinate: 550,
                    y_coordinate: 20,
                    width: 450,
                    height: 390,
                },
                WindowGeometry {
                    x_coordinate: 550,
                    y_coordinate: 410,
                    width: 450,
                    height: 390,
                },
            ]
        );
    }

    #[test]
    fn column_heights_sum_to_the_window_area() {
        for num_master in 0..4 {
            for count in 1..9 {
                let borders = vec![1; count];
                let placed = run(area(1366, 748), 0.55, num_master, &borders);
                let master_count = count.min(num_master as usize);

                let master_total: i32 = placed[..master_count].iter().map(|g| g.height + 2).sum();
                let stack_total: i32 = placed[master_count..].iter().map(|g| g.height + 2).sum();

                if master_count > 0 {
                    assert_eq!(master_total, 748, "master {num_master}/{count}");
                }
                if count > master_count {
                    assert_eq!(stack_total, 748, "stack {num_master}/{count}");
                }
            }
        }
    }

    #[test]
    fn all_master_when_count_fits() {
        let placed = run(area(800, 600), 0.55, 2, &[0, 0]);
        assert!(placed.iter().all(|g| g.width == 800));
    }

    #[test]
    fn zero_master_gives_stack_the_full_width() {
        let placed = run(area(800, 600), 0.55, 0, &[0, 0]);
        assert!(placed.iter().all(|g| g.x_coordinate == 0 && g.width == 800));
    }
}
