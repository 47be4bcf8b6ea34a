//! Rigid transforms between coordinate frames of a frame forest

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::tree::{Forest, TreeNode};

/// Translation plus unit quaternion rotation `[x, y, z, w]`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Transform {
    #[serde(default)]
    pub translation: [f64; 3],
    #[serde(default = "identity_rotation")]
    pub rotation: [f64; 4],
}

fn identity_rotation() -> [f64; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            translation: [0.0; 3],
            rotation: identity_rotation(),
        }
    }

    /// `self` followed by `child`, where `child` is expressed in the frame
    /// that `self` maps into
    pub fn compose(&self, child: &Transform) -> Transform {
        let rotated = rotate(&self.rotation, &child.translation);
        Transform {
            translation: [
                self.translation[0] + rotated[0],
                self.translation[1] + rotated[1],
                self.translation[2] + rotated[2],
            ],
            rotation: normalize(multiply(&self.rotation, &child.rotation)),
        }
    }

    pub fn inverse(&self) -> Transform {
        let [x, y, z, w] = normalize(self.rotation);
        let conjugate = [-x, -y, -z, w];
        let t = rotate(&conjugate, &self.translation);
        Transform {
            translation: [-t[0], -t[1], -t[2]],
            rotation: conjugate,
        }
    }
}

fn multiply(a: &[f64; 4], b: &[f64; 4]) -> [f64; 4] {
    let [ax, ay, az, aw] = *a;
    let [bx, by, bz, bw] = *b;
    [
        aw * bx + ax * bw + ay * bz - az * by,
        aw * by - ax * bz + ay * bw + az * bx,
        aw * bz + ax * by - ay * bx + az * bw,
        aw * bw - ax * bx - ay * by - az * bz,
    ]
}

fn normalize(q: [f64; 4]) -> [f64; 4] {
    let norm = q.iter().map(|c| c * c).sum::<f64>().sqrt();
    if norm == 0.0 {
        return identity_rotation();
    }
    q.map(|c| c / norm)
}

fn cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn rotate(q: &[f64; 4], v: &[f64; 3]) -> [f64; 3] {
    let u = [q[0], q[1], q[2]];
    let w = q[3];
    let uv = cross(&u, v);
    let uuv = cross(&u, &uv);
    [
        v[0] + 2.0 * (w * uv[0] + uuv[0]),
        v[1] + 2.0 * (w * uv[1] + uuv[1]),
        v[2] + 2.0 * (w * uv[2] + uuv[2]),
    ]
}

/// Pose of frame `to` expressed in frame `from`.
///
/// Each node's transform maps its parent frame to itself; roots are their
/// own reference and their transform is ignored. Frame names are looked up
/// anywhere in the forest.
pub fn lookup_transform<P, F>(forest: &Forest<P>, from: &str, to: &str, transform_of: F) -> Result<Transform>
where
    F: Fn(&P) -> Transform,
{
    let from_chain = chain_to(forest, from).ok_or_else(|| Error::UnknownFrame(from.to_string()))?;
    let to_chain = chain_to(forest, to).ok_or_else(|| Error::UnknownFrame(to.to_string()))?;

    if from_chain[0].name != to_chain[0].name {
        return Err(Error::Disconnected {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    let from_root = accumulate(&from_chain, &transform_of);
    let to_root = accumulate(&to_chain, &transform_of);
    Ok(from_root.inverse().compose(&to_root))
}

fn accumulate<P, F>(chain: &[&TreeNode<P>], transform_of: &F) -> Transform
where
    F: Fn(&P) -> Transform,
{
    chain
        .iter()
        .skip(1)
        .fold(Transform::identity(), |acc, node| acc.compose(&transform_of(&node.payload)))
}

/// Nodes from a root down to the frame called `name`
fn chain_to<'a, P>(forest: &'a Forest<P>, name: &str) -> Option<Vec<&'a TreeNode<P>>> {
    fn search<'a, P>(nodes: &'a [TreeNode<P>], name: &str, chain: &mut Vec<&'a TreeNode<P>>) -> bool {
        for node in nodes {
            chain.push(node);
            if node.name == name || search(node.children(), name, chain) {
                return true;
            }
            chain.pop();
        }
        false
    }

    let mut chain = Vec::new();
    search(forest.roots(), name, &mut chain).then_some(chain)
}
