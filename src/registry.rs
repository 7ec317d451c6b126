//! Ownership of clients and monitors.
//!
//! Clients live in one map keyed by their window. Each monitor threads two
//! singly linked lists through them: the client list (`next`, newest first)
//! and the focus stack (`stack_next`, most recently focused first). Every
//! client is on exactly one monitor's pair of lists at a time.

use crate::Config;
use crate::client::{Client, TagMask, all_tags_mask};
use crate::layout::WindowGeometry;
use crate::monitor::Monitor;
use std::collections::HashMap;
use x11rb::protocol::xproto::Window;

#[derive(Debug, Default)]
pub struct Registry {
    pub clients: HashMap<Window, Client>,
    pub monitors: Vec<Monitor>,
    pub selected_monitor: usize,
}

/// Result of a focus decision, for the caller to mirror on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusChange {
    /// Previously selected client that lost the selection.
    pub unfocused: Option<Window>,
    pub focused: Option<Window>,
    /// The new selection had its urgency flag cleared.
    pub cleared_urgency: bool,
}

/// Outcome of reconciling monitors with the reported screens.
#[derive(Debug, Default)]
pub struct GeometryUpdate {
    pub dirty: bool,
    pub removed_bars: Vec<Window>,
}

struct ListIter<'a> {
    clients: &'a HashMap<Window, Client>,
    current: Option<Window>,
    follow_stack: bool,
}

impl<'a> Iterator for ListIter<'a> {
    type Item = &'a Client;

    fn next(&mut self) -> Option<Self::Item> {
        let client = self.clients.get(&self.current?)?;
        self.current = if self.follow_stack {
            client.stack_next
        } else {
            client.next
        };
        Some(client)
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client(&self, window: Window) -> Option<&Client> {
        self.clients.get(&window)
    }

    pub fn client_mut(&mut self, window: Window) -> Option<&mut Client> {
        self.clients.get_mut(&window)
    }

    pub fn selected(&self) -> &Monitor {
        &self.monitors[self.selected_monitor]
    }

    pub fn selected_mut(&mut self) -> &mut Monitor {
        &mut self.monitors[self.selected_monitor]
    }

    pub fn selected_client(&self) -> Option<Window> {
        self.monitors
            .get(self.selected_monitor)
            .and_then(|monitor| monitor.selected_client)
    }

    /// Clients of a monitor in list order.
    pub fn clients_of(&self, monitor_index: usize) -> impl Iterator<Item = &Client> {
        ListIter {
            clients: &self.clients,
            current: self.monitors.get(monitor_index).and_then(|m| m.clients_head),
            follow_stack: false,
        }
    }

    /// Clients of a monitor in focus stack order.
    pub fn stack_of(&self, monitor_index: usize) -> impl Iterator<Item = &Client> {
        ListIter {
            clients: &self.clients,
            current: self.monitors.get(monitor_index).and_then(|m| m.stack_head),
            follow_stack: true,
        }
    }

    fn list_from(&self, start: Option<Window>) -> impl Iterator<Item = &Client> {
        ListIter {
            clients: &self.clients,
            current: start,
            follow_stack: false,
        }
    }

    pub fn is_visible(&self, client: &Client) -> bool {
        self.monitors
            .get(client.monitor_index)
            .is_some_and(|monitor| client.tags & monitor.get_selected_tag() != 0)
    }

    pub fn is_window_visible(&self, window: Window) -> bool {
        self.client(window).is_some_and(|c| self.is_visible(c))
    }

    pub fn insert(&mut self, client: Client) {
        self.clients.insert(client.window, client);
    }

    /// Unlinks a client from both lists and drops it.
    pub fn remove(&mut self, window: Window) -> Option<Client> {
        if !self.clients.contains_key(&window) {
            return None;
        }
        self.detach(window);
        self.detach_stack(window);
        self.clients.remove(&window)
    }

    pub fn attach(&mut self, window: Window) {
        let Some(monitor_index) = self.client(window).map(|c| c.monitor_index) else {
            return;
        };
        let head = self.monitors[monitor_index].clients_head;
        if let Some(client) = self.clients.get_mut(&window) {
            client.next = head;
        }
        self.monitors[monitor_index].clients_head = Some(window);
    }

    pub fn detach(&mut self, window: Window) {
        let Some((monitor_index, next)) = self.client(window).map(|c| (c.monitor_index, c.next))
        else {
            return;
        };

        let monitor = &mut self.monitors[monitor_index];
        if monitor.clients_head == Some(window) {
            monitor.clients_head = next;
        } else {
            let mut current = monitor.clients_head;
            while let Some(previous) = current {
                let Some(client) = self.clients.get_mut(&previous) else {
                    break;
                };
                if client.next == Some(window) {
                    client.next = next;
                    break;
                }
                current = client.next;
            }
        }

        if let Some(client) = self.clients.get_mut(&window) {
            client.next = None;
        }
        let monitor = &mut self.monitors[monitor_index];
        if monitor.scratchpad == Some(window) {
            monitor.scratchpad = None;
        }
    }

    pub fn attach_stack(&mut self, window: Window) {
        let Some(monitor_index) = self.client(window).map(|c| c.monitor_index) else {
            return;
        };
        let head = self.monitors[monitor_index].stack_head;
        if let Some(client) = self.clients.get_mut(&window) {
            client.stack_next = head;
        }
        self.monitors[monitor_index].stack_head = Some(window);
    }

    /// Unlinks from the focus stack. A detached selection passes to the first
    /// visible client left on the stack.
    pub fn detach_stack(&mut self, window: Window) {
        let Some((monitor_index, stack_next)) = self
            .client(window)
            .map(|c| (c.monitor_index, c.stack_next))
        else {
            return;
        };

        let monitor = &mut self.monitors[monitor_index];
        if monitor.stack_head == Some(window) {
            monitor.stack_head = stack_next;
        } else {
            let mut current = monitor.stack_head;
            while let Some(previous) = current {
                let Some(client) = self.clients.get_mut(&previous) else {
                    break;
                };
                if client.stack_next == Some(window) {
                    client.stack_next = stack_next;
                    break;
                }
                current = client.stack_next;
            }
        }

        if let Some(client) = self.clients.get_mut(&window) {
            client.stack_next = None;
        }

        if self.monitors[monitor_index].selected_client == Some(window) {
            let replacement = self
                .stack_of(monitor_index)
                .find(|c| self.is_visible(c))
                .map(|c| c.window);
            self.monitors[monitor_index].selected_client = replacement;
        }
    }

    /// First visible, non-floating client at or after `start` in list order.
    pub fn next_tiled(&self, start: Option<Window>) -> Option<Window> {
        self.list_from(start)
            .find(|c| !c.is_floating && self.is_visible(c))
            .map(|c| c.window)
    }

    pub fn tiled_clients(&self, monitor_index: usize) -> Vec<Window> {
        self.clients_of(monitor_index)
            .filter(|c| !c.is_floating && self.is_visible(c))
            .map(|c| c.window)
            .collect()
    }

    pub fn visible_count(&self, monitor_index: usize) -> usize {
        self.clients_of(monitor_index)
            .filter(|c| self.is_visible(c))
            .count()
    }

    /// Bar windows first, then the owning client's monitor, then the
    /// selected monitor.
    pub fn monitor_for_window(&self, window: Window) -> usize {
        if let Some(index) = self
            .monitors
            .iter()
            .position(|m| m.bar_window == Some(window))
        {
            return index;
        }
        match self.client(window) {
            Some(client) => client.monitor_index,
            None => self.selected_monitor,
        }
    }

    /// Monitor whose window area overlaps `rect` the most. Ties keep the
    /// selected monitor.
    pub fn rect_to_monitor(&self, rect: WindowGeometry) -> usize {
        let mut best = self.selected_monitor;
        let mut best_area = 0;
        for (index, monitor) in self.monitors.iter().enumerate() {
            let area = monitor.window_area().intersection_area(&rect);
            if area > best_area {
                best_area = area;
                best = index;
            }
        }
        best
    }

    /// Neighbour of the selected monitor, wrapping around.
    pub fn dir_to_monitor(&self, direction: i32) -> usize {
        let count = self.monitors.len();
        if count == 0 {
            return 0;
        }
        if direction > 0 {
            (self.selected_monitor + 1) % count
        } else {
            (self.selected_monitor + count - 1) % count
        }
    }

    /// Masks rule-derived tags to the real tags. Nothing left means the
    /// monitor's current view.
    pub fn resolve_tags(&self, tags: TagMask, tag_count: usize, monitor_index: usize) -> TagMask {
        let masked = tags & all_tags_mask(tag_count);
        if masked != 0 {
            masked
        } else {
            self.monitors[monitor_index].get_selected_tag()
        }
    }

    /// The client focus should land on: `candidate` if it is visible,
    /// otherwise the most recently focused visible client of the selected
    /// monitor.
    pub fn focus_target(&self, candidate: Option<Window>) -> Option<Window> {
        if let Some(window) = candidate
            && self.is_window_visible(window)
        {
            return Some(window);
        }
        self.stack_of(self.selected_monitor)
            .find(|c| self.is_visible(c))
            .map(|c| c.window)
    }

    /// Bookkeeping half of giving focus: moves the selection, the selected
    /// monitor and the focus stack.
    pub fn focus(&mut self, candidate: Option<Window>) -> FocusChange {
        let target = self.focus_target(candidate);
        let previous = self.selected_client();
        let unfocused = previous.filter(|&p| Some(p) != target);

        let mut cleared_urgency = false;
        if let Some(window) = target {
            if let Some(client) = self.clients.get_mut(&window) {
                self.selected_monitor = client.monitor_index;
                if client.is_urgent {
                    client.is_urgent = false;
                    cleared_urgency = true;
                }
            }
            self.detach_stack(window);
            self.attach_stack(window);
        }
        self.selected_mut().selected_client = target;

        FocusChange {
            unfocused,
            focused: target,
            cleared_urgency,
        }
    }

    /// Switches the selected monitor's view. Returns false when `tags` is
    /// already the view.
    pub fn view(&mut self, tags: TagMask, tag_count: usize) -> bool {
        let masked = tags & all_tags_mask(tag_count);
        let monitor = self.selected_mut();
        if masked == monitor.get_selected_tag() {
            return false;
        }
        monitor.selected_tags_index ^= 1;
        if masked != 0 {
            monitor.tagset[monitor.selected_tags_index] = masked;
        }
        true
    }

    pub fn toggle_view(&mut self, tags: TagMask, tag_count: usize) -> bool {
        let monitor = self.selected_mut();
        let new_tagset = monitor.get_selected_tag() ^ (tags & all_tags_mask(tag_count));
        if new_tagset == 0 {
            return false;
        }
        monitor.tagset[monitor.selected_tags_index] = new_tagset;
        true
    }

    /// Moves a client to another monitor, taking that monitor's view as its
    /// tags. Returns false when it already lives there.
    pub fn send_to_monitor(&mut self, window: Window, target: usize) -> bool {
        let Some(current) = self.client(window).map(|c| c.monitor_index) else {
            return false;
        };
        if current == target || target >= self.monitors.len() {
            return false;
        }
        self.detach(window);
        self.detach_stack(window);
        let tags = self.monitors[target].get_selected_tag();
        if let Some(client) = self.clients.get_mut(&window) {
            client.monitor_index = target;
            client.tags = tags;
        }
        self.attach(window);
        self.attach_stack(window);
        true
    }

    /// Moves a client to the head of its client list.
    pub fn pop(&mut self, window: Window) {
        self.detach(window);
        self.attach(window);
    }

    /// Neighbouring visible client of the selection in list order, wrapping.
    pub fn focus_stack_target(&self, direction: i32) -> Option<Window> {
        let selected = self.selected_client()?;
        self.neighbour(selected, direction, |_| true)
    }

    fn neighbour(
        &self,
        selected: Window,
        direction: i32,
        accept: impl Fn(&Client) -> bool,
    ) -> Option<Window> {
        let candidates: Vec<Window> = self
            .clients_of(self.selected_monitor)
            .filter(|c| c.window == selected || (self.is_visible(c) && accept(c)))
            .map(|c| c.window)
            .collect();
        let position = candidates.iter().position(|&w| w == selected)?;
        let count = candidates.len();
        let index = if direction > 0 {
            (position + 1) % count
        } else {
            (position + count - 1) % count
        };
        Some(candidates[index]).filter(|&w| w != selected)
    }

    /// Swaps the selection with its next or previous visible tiled
    /// neighbour in the client list.
    pub fn move_stack(&mut self, direction: i32) -> bool {
        let Some(selected) = self.selected_client() else {
            return false;
        };
        let Some(other) = self.neighbour(selected, direction, |c| !c.is_floating) else {
            return false;
        };

        let mut order: Vec<Window> = self
            .clients_of(self.selected_monitor)
            .map(|c| c.window)
            .collect();
        let (Some(a), Some(b)) = (
            order.iter().position(|&w| w == selected),
            order.iter().position(|&w| w == other),
        ) else {
            return false;
        };
        order.swap(a, b);
        self.relink(self.selected_monitor, &order);
        true
    }

    fn relink(&mut self, monitor_index: usize, order: &[Window]) {
        for (index, window) in order.iter().enumerate() {
            if let Some(client) = self.clients.get_mut(window) {
                client.next = order.get(index + 1).copied();
            }
        }
        self.monitors[monitor_index].clients_head = order.first().copied();
    }

    /// Tags with at least one client, and tags with an urgent one.
    pub fn occupied_and_urgent(&self, monitor_index: usize) -> (TagMask, TagMask) {
        self.clients_of(monitor_index)
            .fold((0, 0), |(occupied, urgent), client| {
                let urgent = if client.is_urgent {
                    urgent | client.tags
                } else {
                    urgent
                };
                (occupied | client.tags, urgent)
            })
    }

    /// Every managed window, monitor by monitor in list order.
    pub fn client_windows(&self) -> Vec<Window> {
        (0..self.monitors.len())
            .flat_map(|index| self.clients_of(index).map(|c| c.window))
            .collect()
    }

    /// Monitor that spawned the scratchpad process `pid`.
    pub fn scratchpad_monitor_for_pid(&self, pid: u32) -> Option<usize> {
        self.monitors
            .iter()
            .position(|m| m.scratchpad_pid == Some(pid))
    }

    pub fn create_monitor(&mut self, config: &Config) -> usize {
        self.monitors.push(Monitor::new(config));
        self.monitors.len() - 1
    }

    /// Drops the last monitor, handing its clients to the first one. Returns
    /// the bar window the caller must destroy.
    pub fn destroy_monitor(&mut self) -> Option<Window> {
        if self.monitors.len() < 2 {
            return None;
        }
        let index = self.monitors.len() - 1;

        while let Some(window) = self.monitors[index].clients_head {
            self.detach(window);
            self.detach_stack(window);
            if let Some(client) = self.clients.get_mut(&window) {
                client.monitor_index = 0;
            }
            self.attach(window);
            self.attach_stack(window);
        }

        if self.selected_monitor == index {
            self.selected_monitor = 0;
        }
        self.monitors.pop().and_then(|monitor| monitor.bar_window)
    }

    /// Brings the monitor list in line with the reported screens. When
    /// anything changed, the monitor under `pointer` becomes selected.
    pub fn update_geometry(
        &mut self,
        screens: &[WindowGeometry],
        config: &Config,
        bar_height: i32,
        pointer: Option<(i32, i32)>,
    ) -> GeometryUpdate {
        let mut update = GeometryUpdate::default();

        while self.monitors.len() < screens.len() {
            self.create_monitor(config);
        }
        while self.monitors.len() > screens.len().max(1) {
            update.dirty = true;
            if let Some(bar) = self.destroy_monitor() {
                update.removed_bars.push(bar);
            }
        }

        for (index, (monitor, geometry)) in self.monitors.iter_mut().zip(screens).enumerate() {
            if monitor.screen_geometry() != *geometry || monitor.monitor_number != index {
                update.dirty = true;
                monitor.monitor_number = index;
                monitor.set_screen_geometry(*geometry, bar_height);
            }
        }

        if update.dirty {
            self.selected_monitor = 0;
            if let Some((x, y)) = pointer {
                self.selected_monitor = self.rect_to_monitor(WindowGeometry {
                    x_coordinate: x,
                    y_coordinate: y,
                    width: 1,
                    height: 1,
                });
            }
        }
        update
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn screen(x: i32) -> WindowGeometry {
        WindowGeometry {
            x_coordinate: x,
            y_coordinate: 0,
            width: 1000,
            height: 800,
        }
    }

    fn registry(screens: usize) -> Registry {
        let mut registry = Registry::new();
        let geometries: Vec<_> = (0..screens).map(|i| screen(i as i32 * 1000)).collect();
        registry.update_geometry(&geometries, &Config::default(), 20, None);
        registry
    }

    fn manage(registry: &mut Registry, window: Window, monitor_index: usize, tags: TagMask) {
        let mut client = Client::new(window, monitor_index, WindowGeometry::default());
        client.tags = tags;
        registry.insert(client);
        registry.attach(window);
        registry.attach_stack(window);
    }

    fn list(registry: &Registry, monitor_index: usize) -> Vec<Window> {
        registry.clients_of(monitor_index).map(|c| c.window).collect()
    }

    fn stack(registry: &Registry, monitor_index: usize) -> Vec<Window> {
        registry.stack_of(monitor_index).map(|c| c.window).collect()
    }

    #[test]
    fn attach_prepends_to_both_lists() {
        let mut registry = registry(1);
        for window in 1..=3 {
            manage(&mut registry, window, 0, 1);
        }
        assert_eq!(list(&registry, 0), vec![3, 2, 1]);
        assert_eq!(stack(&registry, 0), vec![3, 2, 1]);
    }

    #[test]
    fn detach_then_attach_keeps_membership() {
        let mut registry = registry(1);
        for window in 1..=4 {
            manage(&mut registry, window, 0, 1);
        }
        registry.detach(2);
        assert_eq!(list(&registry, 0), vec![4, 3, 1]);
        registry.attach(2);

        let windows = list(&registry, 0);
        assert_eq!(windows.len(), 4);
        assert_eq!(windows.iter().filter(|&&w| w == 2).count(), 1);
    }

    #[test]
    fn detaching_the_scratchpad_clears_it() {
        let mut registry = registry(1);
        manage(&mut registry, 7, 0, 1);
        registry.monitors[0].scratchpad = Some(7);
        registry.detach(7);
        assert_eq!(registry.monitors[0].scratchpad, None);
    }

    #[test]
    fn detaching_the_selection_picks_a_visible_one() {
        let mut registry = registry(1);
        manage(&mut registry, 1, 0, 1);
        manage(&mut registry, 2, 0, 2);
        manage(&mut registry, 3, 0, 1);
        registry.monitors[0].selected_client = Some(3);

        registry.detach_stack(3);
        assert_eq!(registry.monitors[0].selected_client, Some(1));
        assert_eq!(stack(&registry, 0), vec![2, 1]);
    }

    #[test]
    fn focus_falls_back_to_most_recent_visible() {
        let mut registry = registry(1);
        manage(&mut registry, 1, 0, 1);
        manage(&mut registry, 2, 0, 1);
        manage(&mut registry, 3, 0, 2);

        let change = registry.focus(Some(3));
        assert_eq!(change.focused, Some(2));

        let selected = registry.monitors[0].selected_client;
        assert!(selected.is_some_and(|w| registry.is_window_visible(w)));
        assert_eq!(stack(&registry, 0).first().copied(), selected);
    }

    #[test]
    fn focus_moves_selection_across_monitors() {
        let mut registry = registry(2);
        manage(&mut registry, 1, 0, 1);
        manage(&mut registry, 2, 1, 1);
        registry.focus(Some(1));

        let change = registry.focus(Some(2));
        assert_eq!(registry.selected_monitor, 1);
        assert_eq!(change.focused, Some(2));
        assert_eq!(change.unfocused, Some(1));
        assert_eq!(registry.monitors[0].selected_client, Some(1));
    }

    #[test]
    fn focus_clears_urgency() {
        let mut registry = registry(1);
        manage(&mut registry, 1, 0, 1);
        if let Some(client) = registry.client_mut(1) {
            client.is_urgent = true;
        }

        let change = registry.focus(Some(1));
        assert!(change.cleared_urgency);
        assert!(!registry.clients[&1].is_urgent);
    }

    #[test]
    fn focus_on_empty_monitor_selects_nothing() {
        let mut registry = registry(1);
        let change = registry.focus(None);
        assert_eq!(change.focused, None);
        assert_eq!(registry.selected().selected_client, None);
    }

    #[test]
    fn viewing_the_current_tags_changes_nothing() {
        let mut registry = registry(1);
        let before = registry.monitors[0].clone();
        assert!(!registry.view(1, 9));
        assert_eq!(registry.monitors[0].tagset, before.tagset);
        assert_eq!(
            registry.monitors[0].selected_tags_index,
            before.selected_tags_index
        );
    }

    #[test]
    fn view_keeps_the_previous_tagset_for_toggling_back() {
        let mut registry = registry(1);
        assert!(registry.view(1 << 3, 9));
        assert_eq!(registry.selected().get_selected_tag(), 1 << 3);
        assert!(registry.view(0, 9));
        assert_eq!(registry.selected().get_selected_tag(), 1);
    }

    #[test]
    fn toggle_view_refuses_an_empty_view() {
        let mut registry = registry(1);
        assert!(!registry.toggle_view(1, 9));
        assert!(registry.toggle_view(2, 9));
        assert_eq!(registry.selected().get_selected_tag(), 3);
    }

    #[test]
    fn out_of_range_tags_fall_back_to_the_view() {
        let mut registry = registry(1);
        registry.view(1 << 4, 9);
        assert_eq!(registry.resolve_tags(1 << 12, 9, 0), 1 << 4);
        assert_eq!(registry.resolve_tags(0, 9, 0), 1 << 4);
        assert_eq!(registry.resolve_tags((1 << 2) | (1 << 12), 9, 0), 1 << 2);
    }

    #[test]
    fn rect_to_monitor_prefers_largest_overlap() {
        let registry = registry(2);
        let rect = WindowGeometry {
            x_coordinate: 900,
            y_coordinate: 100,
            width: 300,
            height: 100,
        };
        assert_eq!(registry.rect_to_monitor(rect), 1);

        let off_screen = WindowGeometry {
            x_coordinate: -500,
            ..rect
        };
        assert_eq!(registry.rect_to_monitor(off_screen), registry.selected_monitor);
    }

    #[test]
    fn monitor_for_window_checks_bars_then_clients() {
        let mut registry = registry(2);
        registry.monitors[1].bar_window = Some(100);
        manage(&mut registry, 5, 1, 1);
        assert_eq!(registry.monitor_for_window(100), 1);
        assert_eq!(registry.monitor_for_window(5), 1);
        assert_eq!(registry.monitor_for_window(999), registry.selected_monitor);
    }

    #[test]
    fn send_to_monitor_retags_and_relinks() {
        let mut registry = registry(2);
        registry.monitors[1].tagset[0] = 1 << 5;
        manage(&mut registry, 1, 0, 1);

        assert!(registry.send_to_monitor(1, 1));
        assert_eq!(list(&registry, 0), Vec::<Window>::new());
        assert_eq!(list(&registry, 1), vec![1]);
        assert_eq!(stack(&registry, 1), vec![1]);
        assert_eq!(registry.clients[&1].tags, 1 << 5);
        assert!(!registry.send_to_monitor(1, 1));
    }

    #[test]
    fn lost_monitor_hands_clients_to_the_first() {
        let mut registry = registry(2);
        registry.monitors[1].bar_window = Some(42);
        manage(&mut registry, 1, 1, 1);
        manage(&mut registry, 2, 1, 1);
        registry.selected_monitor = 1;

        let update = registry.update_geometry(&[screen(0)], &Config::default(), 20, None);
        assert!(update.dirty);
        assert_eq!(update.removed_bars, vec![42]);
        assert_eq!(registry.monitors.len(), 1);
        assert_eq!(registry.selected_monitor, 0);
        let mut windows = list(&registry, 0);
        windows.sort();
        assert_eq!(windows, vec![1, 2]);
        assert!(registry.clients.values().all(|c| c.monitor_index == 0));
    }

    #[test]
    fn new_screens_select_the_monitor_under_the_pointer() {
        let mut registry = registry(1);
        let update = registry.update_geometry(
            &[screen(0), screen(1000)],
            &Config::default(),
            20,
            Some((1500, 400)),
        );
        assert!(update.dirty);
        assert_eq!(registry.selected_monitor, 1);
    }

    #[test]
    fn unchanged_geometry_is_not_dirty() {
        let mut registry = registry(2);
        let update = registry.update_geometry(&[screen(0), screen(1000)], &Config::default(), 20, None);
        assert!(!update.dirty);
    }

    #[test]
    fn move_stack_swaps_with_the_next_tiled() {
        let mut registry = registry(1);
        for window in 1..=3 {
            manage(&mut registry, window, 0, 1);
        }
        registry.focus(Some(3));
        assert!(registry.move_stack(1));
        assert_eq!(list(&registry, 0), vec![2, 3, 1]);
        assert!(registry.move_stack(-1));
        assert_eq!(list(&registry, 0), vec![3, 2, 1]);
    }

    #[test]
    fn focus_stack_wraps_around() {
        let mut registry = registry(1);
        for window in 1..=3 {
            manage(&mut registry, window, 0, 1);
        }
        registry.focus(Some(1));
        assert_eq!(registry.focus_stack_target(1), Some(3));
        assert_eq!(registry.focus_stack_target(-1), Some(2));
    }

    #[test]
    fn next_tiled_skips_floating_and_hidden() {
        let mut registry = registry(1);
        manage(&mut registry, 1, 0, 1);
        manage(&mut registry, 2, 0, 2);
        manage(&mut registry, 3, 0, 1);
        if let Some(client) = registry.client_mut(3) {
            client.is_floating = true;
        }

        let head = registry.monitors[0].clients_head;
        assert_eq!(registry.next_tiled(head), Some(1));
        assert_eq!(registry.tiled_clients(0), vec![1]);
        assert_eq!(registry.visible_count(0), 2);
    }
}
