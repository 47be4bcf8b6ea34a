//! Non-interactive output of the trees the dashboard would show.

use clap::ValueEnum;
use roswatch_common::{Connectors, Forest, NamespaceBuilder, TreeModel, TreeNode};

use crate::bus::BusSnapshot;
use crate::views::frame_label;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DumpTarget {
    Topics,
    Services,
    Tf,
}

/// Fully expanded tree lines for one menu entry
pub fn dump_lines(target: DumpTarget, snapshot: &BusSnapshot) -> roswatch_common::Result<Vec<String>> {
    let lines = match target {
        DumpTarget::Topics => {
            let forest = NamespaceBuilder::build(snapshot.topic_names())?;
            TreeModel::new(forest).flatten().iter().map(|line| line.text()).collect()
        }
        DumpTarget::Services => {
            let forest: Forest<()> =
                snapshot.service_names().map(|name| TreeNode::new(name, ())).collect();
            TreeModel::new(forest)
                .with_connectors(Connectors::flat())
                .flatten()
                .iter()
                .map(|line| line.text())
                .collect()
        }
        DumpTarget::Tf => TreeModel::new(snapshot.frame_forest())
            .flatten_with(frame_label)
            .iter()
            .map(|line| line.text())
            .collect(),
    };
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot() -> BusSnapshot {
        serde_json::from_value(json!({
            "topics": [
                {"name": "/robot/odom", "type": "nav_msgs/Odometry"},
                {"name": "/robot/scan", "type": "sensor_msgs/LaserScan"},
                {"name": "/rosout", "type": "rosgraph_msgs/Log"}
            ],
            "services": {"/spawn": [], "/clear": []},
            "tf": [{"name": "map", "children": [{"name": "odom"}]}]
        }))
        .unwrap()
    }

    #[test]
    fn topics_as_namespace_tree() {
        let lines = dump_lines(DumpTarget::Topics, &snapshot()).unwrap();
        assert_eq!(
            lines,
            ["├── robot", "│   ├── odom", "│   └── scan", "└── rosout"]
        );
    }

    #[test]
    fn services_without_tree_art() {
        let lines = dump_lines(DumpTarget::Services, &snapshot()).unwrap();
        assert_eq!(lines, ["/clear", "/spawn"]);
    }

    #[test]
    fn tf_frames() {
        let lines = dump_lines(DumpTarget::Tf, &snapshot()).unwrap();
        assert_eq!(lines, ["└── map", "    └── odom"]);
    }

    #[test]
    fn malformed_topic_is_an_error() {
        let mut snapshot = snapshot();
        snapshot.topics[0].name = "/robot//odom".to_string();
        assert!(dump_lines(DumpTarget::Topics, &snapshot).is_err());
    }
}
