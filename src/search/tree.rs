//! Shared path tree for the work-stealing pool
//!
//! Nodes live in an arena addressed by stable [`NodeId`]s. The arena is split
//! into one segment per worker so that appends never contend: a worker only
//! ever pushes into its own segment. Nodes are never removed while the tree
//! lives; backtracking moves the "current" reference to an ancestor instead.

use crate::maze::{Direction, Point};
use crate::search::path::PathTrace;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

const NO_CHILD: u64 = u64::MAX;

/// Stable address of a node: (segment, index within segment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    segment: u32,
    index: u32,
}

impl NodeId {
    fn pack(self) -> u64 {
        ((self.segment as u64) << 32) | self.index as u64
    }

    fn unpack(raw: u64) -> Option<NodeId> {
        if raw == NO_CHILD {
            None
        } else {
            Some(NodeId {
                segment: (raw >> 32) as u32,
                index: raw as u32,
            })
        }
    }

    pub fn segment(&self) -> usize {
        self.segment as usize
    }
}

#[derive(Debug)]
struct TreeNode {
    point: Point,
    parent: Option<NodeId>,
    /// One slot per direction, indexed by `Direction::index`
    children: [AtomicU64; 4],
}

impl TreeNode {
    fn new(point: Point, parent: Option<NodeId>) -> Self {
        Self {
            point,
            parent,
            children: std::array::from_fn(|_| AtomicU64::new(NO_CHILD)),
        }
    }
}

/// Arena of parent-linked path nodes.
#[derive(Debug)]
pub struct PathTree {
    segments: Vec<RwLock<Vec<TreeNode>>>,
}

impl PathTree {
    pub fn new(segments: usize) -> Self {
        Self {
            segments: (0..segments.max(1)).map(|_| RwLock::new(Vec::new())).collect(),
        }
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Total number of nodes across all segments
    pub fn len(&self) -> usize {
        self.segments.iter().map(|s| s.read().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a node under `parent` in `segment` and link it into the
    /// parent's child slot for the step direction.
    pub fn append(&self, segment: usize, parent: Option<NodeId>, point: Point) -> NodeId {
        let id = {
            let mut nodes = self.segments[segment].write();
            nodes.push(TreeNode::new(point, parent));
            NodeId {
                segment: segment as u32,
                index: (nodes.len() - 1) as u32,
            }
        };

        if let Some(parent) = parent {
            let nodes = self.segments[parent.segment()].read();
            let parent_node = &nodes[parent.index as usize];
            if let Some(dir) = Direction::between(parent_node.point, point) {
                parent_node.children[dir.index()].store(id.pack(), Ordering::Release);
            }
        }
        id
    }

    pub fn point(&self, id: NodeId) -> Point {
        self.segments[id.segment()].read()[id.index as usize].point
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.segments[id.segment()].read()[id.index as usize].parent
    }

    pub fn child(&self, id: NodeId, direction: Direction) -> Option<NodeId> {
        let nodes = self.segments[id.segment()].read();
        NodeId::unpack(nodes[id.index as usize].children[direction.index()].load(Ordering::Acquire))
    }

    /// Walk parent links from `id` to the root and return the points root-first.
    pub fn path_to(&self, id: NodeId) -> Vec<Point> {
        let mut points = Vec::new();
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            let nodes = self.segments[node.segment()].read();
            let entry = &nodes[node.index as usize];
            points.push(entry.point);
            cursor = entry.parent;
        }
        points.reverse();
        points
    }
}

/// A path-so-far inside a [`PathTree`]: forking copies only the node reference.
#[derive(Debug, Clone, Copy)]
pub struct TreePath<'a> {
    tree: &'a PathTree,
    segment: usize,
    current: Option<NodeId>,
}

impl<'a> TreePath<'a> {
    /// A path ending at `current` whose extensions go into `segment`.
    pub fn new(tree: &'a PathTree, segment: usize, current: Option<NodeId>) -> Self {
        Self {
            tree,
            segment,
            current,
        }
    }

    pub fn node(&self) -> Option<NodeId> {
        self.current
    }
}

impl PathTrace for TreePath<'_> {
    fn extend(&mut self, point: Point) {
        self.current = Some(self.tree.append(self.segment, self.current, point));
    }

    fn rewind_to(&mut self, origin: Point) {
        while let Some(node) = self.current {
            if self.tree.point(node) == origin {
                break;
            }
            self.current = self.tree.parent(node);
        }
    }

    fn head(&self) -> Option<Point> {
        self.current.map(|node| self.tree.point(node))
    }

    fn to_points(&self) -> Vec<Point> {
        self.current
            .map(|node| self.tree.path_to(node))
            .unwrap_or_default()
    }
}
