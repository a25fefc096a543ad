//! Dock icon hit testing against the live Accessibility tree.
//!
//! The dock owns its element tree and changes it whenever icons are added,
//! removed, reordered or magnified. Nothing is cached between calls.

use std::sync::Arc;

use dockpeek_geom::{Point, Rect};
use tracing::{debug, trace};

use crate::{
    Error, Result,
    deps::{AxTree, ProcessLookup},
};

/// Role of the dock element that holds the icons.
pub const LIST_ROLE: &str = "AXList";

/// Resolves a capture-space point to the hovered application, if any.
pub trait IconLocator: Send + Sync {
    /// Title of the running application whose icon contains `point`.
    fn icon_at(&self, point: Point) -> Option<String>;
}

/// One dock icon as read during a single query.
#[derive(Debug, Clone, PartialEq)]
pub struct DockIconRecord {
    /// Icon title; for applications this is the identifier handed downstream.
    pub title: String,
    /// Frame in capture space.
    pub frame: Rect,
    /// Whether the application behind the icon is running.
    pub is_running: bool,
}

/// Hit tester over an [`AxTree`].
pub struct DockHitTester<T: AxTree> {
    tree: T,
    processes: Arc<dyn ProcessLookup>,
    bundle_id: String,
}

impl<T: AxTree> DockHitTester<T> {
    /// Hit tester for the process identified by `bundle_id`.
    pub fn new(tree: T, processes: Arc<dyn ProcessLookup>, bundle_id: impl Into<String>) -> Self {
        Self {
            tree,
            processes,
            bundle_id: bundle_id.into(),
        }
    }

    /// Icon elements in tree order, or `None` when the dock is not running.
    fn icon_nodes(&self) -> Result<Option<Vec<T::Node>>> {
        let Some(pid) = self.processes.pid_for_bundle(&self.bundle_id) else {
            return Ok(None);
        };
        let app = self.tree.application(pid)?;
        let list = self
            .tree
            .children(&app)?
            .into_iter()
            .find(|n| self.tree.role(n).is_ok_and(|r| r == LIST_ROLE))
            .ok_or(Error::Structure("dock icon list"))?;
        Ok(Some(self.tree.children(&list)?))
    }

    /// Like [`IconLocator::icon_at`] but reports structure failures.
    ///
    /// Icons whose own attributes cannot be read are skipped; only failures
    /// reaching the icon list are returned.
    pub fn try_icon_at(&self, point: Point) -> Result<Option<String>> {
        let Some(icons) = self.icon_nodes()? else {
            trace!(bundle = %self.bundle_id, "dock_not_running");
            return Ok(None);
        };
        for icon in &icons {
            let frame = match self.tree.frame(icon) {
                Ok(f) => f,
                Err(e) => {
                    trace!(error = %e, "icon_frame_unreadable");
                    continue;
                }
            };
            if !frame.contains(point) {
                continue;
            }
            if !self.tree.is_running(icon).unwrap_or(false) {
                continue;
            }
            match self.tree.title(icon) {
                Ok(title) => return Ok(Some(title)),
                Err(e) => trace!(error = %e, "icon_title_unreadable"),
            }
        }
        Ok(None)
    }

    /// Snapshot of every readable icon, in tree order.
    pub fn icons(&self) -> Result<Vec<DockIconRecord>> {
        let Some(icons) = self.icon_nodes()? else {
            return Ok(Vec::new());
        };
        let mut out = Vec::with_capacity(icons.len());
        for icon in &icons {
            let (Ok(title), Ok(frame)) = (self.tree.title(icon), self.tree.frame(icon)) else {
                continue;
            };
            out.push(DockIconRecord {
                title,
                frame,
                is_running: self.tree.is_running(icon).unwrap_or(false),
            });
        }
        Ok(out)
    }
}

impl<T: AxTree> IconLocator for DockHitTester<T> {
    fn icon_at(&self, point: Point) -> Option<String> {
        match self.try_icon_at(point) {
            Ok(hit) => hit,
            Err(e) => {
                debug!(error = %e, "dock_lookup_failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockProcesses, MockTree};

    fn sample_icons() -> Vec<DockIconRecord> {
        vec![
            DockIconRecord {
                title: "Finder".into(),
                frame: Rect::new(0.0, 0.0, 50.0, 50.0),
                is_running: true,
            },
            DockIconRecord {
                title: "Mail".into(),
                frame: Rect::new(60.0, 0.0, 50.0, 50.0),
                is_running: false,
            },
        ]
    }

    fn tester(tree: MockTree) -> DockHitTester<MockTree> {
        DockHitTester::new(tree, Arc::new(MockProcesses::dock(42)), "com.apple.dock")
    }

    #[test]
    fn running_icon_under_point_is_hit() {
        let t = tester(MockTree::with_icons(sample_icons()));
        assert_eq!(t.icon_at(Point::new(25.0, 25.0)).as_deref(), Some("Finder"));
    }

    #[test]
    fn non_running_icon_is_never_hit() {
        let t = tester(MockTree::with_icons(sample_icons()));
        assert_eq!(t.icon_at(Point::new(85.0, 25.0)), None);
    }

    #[test]
    fn point_outside_all_icons_is_no_hit() {
        let t = tester(MockTree::with_icons(sample_icons()));
        assert_eq!(t.icon_at(Point::new(200.0, 200.0)), None);
    }

    #[test]
    fn first_match_in_tree_order_wins() {
        let mut icons = sample_icons();
        icons.insert(
            1,
            DockIconRecord {
                title: "Overlap".into(),
                frame: Rect::new(10.0, 10.0, 50.0, 50.0),
                is_running: true,
            },
        );
        let t = tester(MockTree::with_icons(icons));
        assert_eq!(t.icon_at(Point::new(20.0, 20.0)).as_deref(), Some("Finder"));
        assert_eq!(t.icon_at(Point::new(55.0, 20.0)).as_deref(), Some("Overlap"));
    }

    #[test]
    fn shared_edge_resolves_to_the_later_icon() {
        let t = tester(MockTree::with_icons(vec![
            DockIconRecord {
                title: "Left".into(),
                frame: Rect::new(0.0, 0.0, 50.0, 50.0),
                is_running: true,
            },
            DockIconRecord {
                title: "Right".into(),
                frame: Rect::new(50.0, 0.0, 50.0, 50.0),
                is_running: true,
            },
        ]));
        assert_eq!(t.icon_at(Point::new(50.0, 25.0)).as_deref(), Some("Right"));
        assert_eq!(t.icon_at(Point::new(49.9, 25.0)).as_deref(), Some("Left"));
        assert_eq!(t.icon_at(Point::new(100.0, 25.0)), None);
    }

    #[test]
    fn absent_dock_is_no_hit_not_error() {
        let t = DockHitTester::new(
            MockTree::with_icons(sample_icons()),
            Arc::new(MockProcesses::default()),
            "com.apple.dock",
        );
        assert_eq!(t.try_icon_at(Point::new(25.0, 25.0)), Ok(None));
        assert!(t.icons().unwrap().is_empty());
    }

    #[test]
    fn missing_list_is_structure_error_and_no_hit() {
        let tree = MockTree::with_icons(sample_icons());
        tree.set_list_role("AXGroup");
        let t = tester(tree);
        assert_eq!(
            t.try_icon_at(Point::new(25.0, 25.0)),
            Err(Error::Structure("dock icon list"))
        );
        assert_eq!(t.icon_at(Point::new(25.0, 25.0)), None);
    }

    #[test]
    fn unreadable_root_is_no_hit() {
        let tree = MockTree::with_icons(sample_icons());
        tree.fail_root(Error::AxCode(-25204));
        let t = tester(tree);
        assert_eq!(t.icon_at(Point::new(25.0, 25.0)), None);
    }

    #[test]
    fn unreadable_icon_is_skipped() {
        let tree = MockTree::with_icons(vec![
            DockIconRecord {
                title: "Broken".into(),
                frame: Rect::new(0.0, 0.0, 50.0, 50.0),
                is_running: true,
            },
            DockIconRecord {
                title: "Safari".into(),
                frame: Rect::new(0.0, 0.0, 50.0, 50.0),
                is_running: true,
            },
        ]);
        tree.fail_frame("Broken");
        let t = tester(tree);
        assert_eq!(t.icon_at(Point::new(25.0, 25.0)).as_deref(), Some("Safari"));
        assert_eq!(t.icons().unwrap().len(), 1);
    }

    #[test]
    fn tree_changes_between_calls_are_observed() {
        let tree = MockTree::with_icons(sample_icons());
        let t = tester(tree.clone());
        assert_eq!(t.icon_at(Point::new(25.0, 25.0)).as_deref(), Some("Finder"));
        tree.set_icons(vec![DockIconRecord {
            title: "Notes".into(),
            frame: Rect::new(0.0, 0.0, 40.0, 40.0),
            is_running: true,
        }]);
        assert_eq!(t.icon_at(Point::new(25.0, 25.0)).as_deref(), Some("Notes"));
        tree.set_icons(Vec::new());
        assert_eq!(t.icon_at(Point::new(25.0, 25.0)), None);
    }

    #[test]
    fn icons_lists_every_readable_icon() {
        let t = tester(MockTree::with_icons(sample_icons()));
        assert_eq!(t.icons().unwrap(), sample_icons());
    }
}
