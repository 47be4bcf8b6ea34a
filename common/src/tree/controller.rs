//! Navigation, toggling and type-to-search over a [`TreeModel`]
//!
//! The controller is the only tree component that talks to a renderer, and
//! only through [`ListSurface`]. It owns the collapse state as a set of
//! paths, so a forest rebuilt from fresh upstream data keeps whatever the
//! user folded.

use std::collections::HashSet;

use super::{Connectors, FlatLine, Forest, Path, TreeModel, TreeNode};

/// What the controller needs from whatever draws the list
pub trait ListSurface {
    fn set_lines(&mut self, lines: Vec<SurfaceLine>);
    fn focus(&mut self, index: usize);
    /// Rows visible at once; used as the page size
    fn viewport_height(&self) -> usize;
    fn repaint(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceLine {
    pub text: String,
    /// Render de-emphasised (e.g. a namespace that is not itself a topic)
    pub muted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavInput {
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Toggle,
    Activate,
    Char(char),
    Backspace,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TreeEvent<P> {
    Activated { path: Path, payload: P },
    Toggled { path: Path, collapsed: bool },
    SearchMatched { index: usize },
}

type Renderer<P> = Box<dyn Fn(&TreeNode<P>) -> String>;
type Muting<P> = Box<dyn Fn(&P) -> bool>;

pub struct TreeController<P> {
    model: Option<TreeModel<P>>,
    connectors: Connectors,
    collapsed: HashSet<Path>,
    lines: Vec<FlatLine<P>>,
    selected: usize,
    needle: String,
    renderer: Option<Renderer<P>>,
    muting: Option<Muting<P>>,
}

impl<P: Clone> Default for TreeController<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Clone> TreeController<P> {
    pub fn new() -> Self {
        Self {
            model: None,
            connectors: Connectors::default(),
            collapsed: HashSet::new(),
            lines: Vec::new(),
            selected: 0,
            needle: String::new(),
            renderer: None,
            muting: None,
        }
    }

    pub fn with_connectors(mut self, connectors: Connectors) -> Self {
        self.connectors = connectors;
        self
    }

    pub fn with_renderer(mut self, renderer: impl Fn(&TreeNode<P>) -> String + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn with_muting(mut self, muting: impl Fn(&P) -> bool + 'static) -> Self {
        self.muting = Some(Box::new(muting));
        self
    }

    /// True once a forest has been set
    pub fn is_ready(&self) -> bool {
        self.model.is_some()
    }

    pub fn model(&self) -> Option<&TreeModel<P>> {
        self.model.as_ref()
    }

    pub fn lines(&self) -> &[FlatLine<P>] {
        &self.lines
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_line(&self) -> Option<&FlatLine<P>> {
        self.lines.get(self.selected)
    }

    pub fn needle(&self) -> &str {
        &self.needle
    }

    pub fn collapsed_paths(&self) -> &HashSet<Path> {
        &self.collapsed
    }

    /// Replace the forest with a freshly built one and re-render.
    ///
    /// Collapse state is merged in by path and pruned to paths that still
    /// exist. The selection stays on the same path when it survives,
    /// otherwise it is clamped to the new line count.
    pub fn set_forest(&mut self, forest: Forest<P>, surface: &mut dyn ListSurface) {
        let selected_path = self.selected_line().map(|line| line.path.clone());

        let mut model = TreeModel::new(forest).with_connectors(self.connectors.clone());
        let existing: HashSet<Path> = model.paths().into_iter().collect();
        self.collapsed.retain(|path| existing.contains(path));
        model.restore_collapsed(&self.collapsed);
        self.model = Some(model);

        self.reflatten();
        self.selected = selected_path
            .and_then(|path| self.index_of(&path))
            .unwrap_or(self.selected)
            .min(self.lines.len().saturating_sub(1));
        self.push(surface);
    }

    /// Toggle a node by path, as requested from outside the key handler.
    /// Stale paths are ignored.
    pub fn toggle_path(&mut self, path: &[String], surface: &mut dyn ListSurface) -> Option<bool> {
        let collapsed = self.model.as_mut()?.toggle(path)?;
        if collapsed {
            self.collapsed.insert(path.to_vec());
        } else {
            self.collapsed.remove(path);
        }

        let selected_path = self.selected_line().map(|line| line.path.clone());
        self.reflatten();
        if let Some(index) = selected_path.and_then(|p| self.index_of(&p)) {
            self.selected = index;
        } else {
            // The selection was inside the folded subtree
            self.selected = self.index_of(path).unwrap_or(0);
        }
        self.push(surface);
        Some(collapsed)
    }

    pub fn handle(&mut self, input: NavInput, surface: &mut dyn ListSurface) -> Option<TreeEvent<P>> {
        match input {
            NavInput::Char(c) => {
                self.needle.push(c);
                let index = self.search()?;
                self.move_to(index, surface);
                Some(TreeEvent::SearchMatched { index })
            }
            NavInput::Backspace => {
                self.needle.clear();
                None
            }
            _ if self.lines.is_empty() => None,
            NavInput::Up => {
                self.move_to(self.selected.saturating_sub(1), surface);
                None
            }
            NavInput::Down => {
                self.move_to(self.selected + 1, surface);
                None
            }
            NavInput::PageUp => {
                let page = surface.viewport_height().max(1);
                self.move_to(self.selected.saturating_sub(page), surface);
                None
            }
            NavInput::PageDown => {
                let page = surface.viewport_height().max(1);
                self.move_to(self.selected + page, surface);
                None
            }
            NavInput::Home => {
                self.move_to(0, surface);
                None
            }
            NavInput::End => {
                self.move_to(self.lines.len() - 1, surface);
                None
            }
            NavInput::Toggle => {
                let path = self.selected_line()?.path.clone();
                let collapsed = self.toggle_path(&path, surface)?;
                Some(TreeEvent::Toggled { path, collapsed })
            }
            NavInput::Activate => {
                let line = self.selected_line()?;
                Some(TreeEvent::Activated {
                    path: line.path.clone(),
                    payload: line.payload.clone(),
                })
            }
        }
    }

    /// First line whose label contains the needle
    fn search(&self) -> Option<usize> {
        if self.needle.is_empty() {
            return None;
        }
        self.lines.iter().position(|line| line.label.contains(&self.needle))
    }

    fn index_of(&self, path: &[String]) -> Option<usize> {
        self.lines.iter().position(|line| line.path == path)
    }

    fn move_to(&mut self, index: usize, surface: &mut dyn ListSurface) {
        self.selected = index.min(self.lines.len().saturating_sub(1));
        surface.focus(self.selected);
        surface.repaint();
    }

    fn reflatten(&mut self) {
        let Some(model) = &self.model else {
            self.lines.clear();
            return;
        };
        self.lines = match &self.renderer {
            Some(render) => model.flatten_with(|node| render(node)),
            None => model.flatten(),
        };
    }

    fn push(&self, surface: &mut dyn ListSurface) {
        let lines = self
            .lines
            .iter()
            .map(|line| SurfaceLine {
                text: line.text(),
                muted: self.muting.as_ref().is_some_and(|muted| muted(&line.payload)),
            })
            .collect();
        surface.set_lines(lines);
        surface.focus(self.selected);
        surface.repaint();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSurface {
        lines: Vec<SurfaceLine>,
        focused: Option<usize>,
        repaints: usize,
        height: usize,
    }

    impl ListSurface for RecordingSurface {
        fn set_lines(&mut self, lines: Vec<SurfaceLine>) {
            self.lines = lines;
        }

        fn focus(&mut self, index: usize) {
            self.focused = Some(index);
        }

        fn viewport_height(&self) -> usize {
            self.height
        }

        fn repaint(&mut self) {
            self.repaints += 1;
        }
    }

    impl RecordingSurface {
        fn texts(&self) -> Vec<&str> {
            self.lines.iter().map(|l| l.text.as_str()).collect()
        }
    }

    fn path(segments: &[&str]) -> Path {
        segments.iter().map(|s| s.to_string()).collect()
    }

    /// `{a: {}, b: {b1: {}, b2: {}}, c: {}}` with payload = is-leaf
    fn forest() -> Forest<bool> {
        [
            TreeNode::new("a", true),
            TreeNode::new("b", false)
                .with_child(TreeNode::new("b1", true))
                .with_child(TreeNode::new("b2", true)),
            TreeNode::new("c", true),
        ]
        .into_iter()
        .collect()
    }

    fn ready() -> (TreeController<bool>, RecordingSurface) {
        let mut controller = TreeController::new();
        let mut surface = RecordingSurface {
            height: 2,
            ..Default::default()
        };
        controller.set_forest(forest(), &mut surface);
        (controller, surface)
    }

    #[test]
    fn starts_without_lines() {
        let mut controller = TreeController::<bool>::new();
        let mut surface = RecordingSurface::default();
        assert!(!controller.is_ready());
        assert_eq!(controller.handle(NavInput::Activate, &mut surface), None);
        assert_eq!(surface.repaints, 0);
    }

    #[test]
    fn set_forest_pushes_lines() {
        let (controller, surface) = ready();
        assert!(controller.is_ready());
        assert_eq!(
            surface.texts(),
            ["├── a", "├── b", "│   ├── b1", "│   └── b2", "└── c"]
        );
        assert_eq!(surface.focused, Some(0));
        assert_eq!(surface.repaints, 1);
    }

    #[test]
    fn movement_is_clamped() {
        let (mut controller, mut surface) = ready();
        controller.handle(NavInput::Up, &mut surface);
        assert_eq!(controller.selected(), 0);

        controller.handle(NavInput::PageDown, &mut surface);
        assert_eq!(controller.selected(), 2);
        controller.handle(NavInput::PageDown, &mut surface);
        controller.handle(NavInput::PageDown, &mut surface);
        assert_eq!(controller.selected(), 4);
        assert_eq!(surface.focused, Some(4));

        controller.handle(NavInput::PageUp, &mut surface);
        assert_eq!(controller.selected(), 2);
        controller.handle(NavInput::Home, &mut surface);
        assert_eq!(controller.selected(), 0);
        controller.handle(NavInput::End, &mut surface);
        assert_eq!(controller.selected(), 4);
    }

    #[test]
    fn activate_reports_path_and_payload() {
        let (mut controller, mut surface) = ready();
        controller.handle(NavInput::Down, &mut surface);
        controller.handle(NavInput::Down, &mut surface);
        assert_eq!(
            controller.handle(NavInput::Activate, &mut surface),
            Some(TreeEvent::Activated {
                path: path(&["b", "b1"]),
                payload: true,
            })
        );
    }

    #[test]
    fn toggle_collapses_selected_node() {
        let (mut controller, mut surface) = ready();
        controller.handle(NavInput::Down, &mut surface);

        let event = controller.handle(NavInput::Toggle, &mut surface);
        assert_eq!(
            event,
            Some(TreeEvent::Toggled {
                path: path(&["b"]),
                collapsed: true,
            })
        );
        assert_eq!(surface.texts(), ["├── a", "├── b", "└── c"]);
        assert_eq!(controller.selected(), 1);

        controller.handle(NavInput::Toggle, &mut surface);
        assert_eq!(surface.lines.len(), 5);
    }

    #[test]
    fn toggle_on_leaf_does_nothing() {
        let (mut controller, mut surface) = ready();
        assert_eq!(controller.handle(NavInput::Toggle, &mut surface), None);
        assert!(controller.collapsed_paths().is_empty());
    }

    #[test]
    fn folding_an_ancestor_moves_selection_to_it() {
        let (mut controller, mut surface) = ready();
        controller.handle(NavInput::End, &mut surface);
        controller.handle(NavInput::Up, &mut surface);
        assert_eq!(controller.selected_line().map(|l| l.label.as_str()), Some("b2"));

        assert_eq!(controller.toggle_path(&path(&["b"]), &mut surface), Some(true));
        assert_eq!(controller.selected_line().map(|l| l.label.as_str()), Some("b"));
    }

    #[test]
    fn stale_toggle_is_ignored() {
        let (mut controller, mut surface) = ready();
        let repaints = surface.repaints;
        assert_eq!(controller.toggle_path(&path(&["gone"]), &mut surface), None);
        assert_eq!(surface.repaints, repaints);
    }

    #[test]
    fn search_moves_to_first_matching_label() {
        let (mut controller, mut surface) = ready();
        assert_eq!(
            controller.handle(NavInput::Char('b'), &mut surface),
            Some(TreeEvent::SearchMatched { index: 1 })
        );
        assert_eq!(
            controller.handle(NavInput::Char('2'), &mut surface),
            Some(TreeEvent::SearchMatched { index: 3 })
        );
        assert_eq!(controller.needle(), "b2");
        assert_eq!(surface.focused, Some(3));
    }

    #[test]
    fn search_without_match_keeps_selection() {
        let (mut controller, mut surface) = ready();
        controller.handle(NavInput::Char('c'), &mut surface);
        assert_eq!(controller.selected(), 4);

        assert_eq!(controller.handle(NavInput::Char('x'), &mut surface), None);
        assert_eq!(controller.selected(), 4);
    }

    #[test]
    fn search_is_case_sensitive_and_ignores_prefixes() {
        let (mut controller, mut surface) = ready();
        assert_eq!(controller.handle(NavInput::Char('B'), &mut surface), None);
        controller.handle(NavInput::Backspace, &mut surface);
        // Connector characters are not part of any label
        assert_eq!(controller.handle(NavInput::Char('─'), &mut surface), None);
    }

    #[test]
    fn backspace_resets_needle() {
        let (mut controller, mut surface) = ready();
        controller.handle(NavInput::Char('b'), &mut surface);
        controller.handle(NavInput::Char('1'), &mut surface);
        controller.handle(NavInput::Backspace, &mut surface);
        assert_eq!(controller.needle(), "");

        assert_eq!(
            controller.handle(NavInput::Char('c'), &mut surface),
            Some(TreeEvent::SearchMatched { index: 4 })
        );
    }

    #[test]
    fn rebuild_preserves_collapse_and_selection() {
        let (mut controller, mut surface) = ready();
        controller.toggle_path(&path(&["b"]), &mut surface);
        controller.handle(NavInput::End, &mut surface);

        // Periodic refresh: a new root appears ahead of the selection
        let mut rebuilt = Forest::new();
        rebuilt.insert(TreeNode::new("0", true));
        for root in forest().roots() {
            rebuilt.insert(root.clone());
        }
        controller.set_forest(rebuilt, &mut surface);

        assert_eq!(surface.texts(), ["├── 0", "├── a", "├── b", "└── c"]);
        assert_eq!(controller.selected_line().map(|l| l.label.as_str()), Some("c"));
    }

    #[test]
    fn rebuild_prunes_vanished_paths() {
        let (mut controller, mut surface) = ready();
        controller.toggle_path(&path(&["b"]), &mut surface);

        controller.set_forest(Forest::from_iter([TreeNode::new("a", true)]), &mut surface);
        assert!(controller.collapsed_paths().is_empty());
        assert_eq!(controller.selected(), 0);

        // `b` coming back later starts expanded again
        controller.set_forest(forest(), &mut surface);
        assert_eq!(surface.lines.len(), 5);
    }

    #[test]
    fn renderer_and_muting_shape_surface_lines() {
        let mut controller = TreeController::new()
            .with_connectors(Connectors::flat())
            .with_renderer(|node: &TreeNode<bool>| format!("{}!", node.name))
            .with_muting(|leaf: &bool| !*leaf);
        let mut surface = RecordingSurface::default();
        controller.set_forest(forest(), &mut surface);

        assert_eq!(surface.lines[0].text, "a!");
        assert!(!surface.lines[0].muted);
        assert!(surface.lines[1].muted);
        assert_eq!(controller.lines()[1].label, "b!");
    }
}
