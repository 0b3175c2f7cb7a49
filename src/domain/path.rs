//! Path contexts and the pairwise path merger.
//!
//! Every leaf visited while traversing a function contributes a candidate
//! path (root → leaf). Each new candidate is merged with all earlier ones of
//! the same function; pairs that are too far apart in the tree, or that fork
//! too widely at their common ancestor, are discarded.

use super::error::ExtractError;
use super::token::{clean, unicode_escape};
use super::tree::{Arena, ElementId};

pub const DEFAULT_MAX_PATH_LENGTH: usize = 8;
pub const DEFAULT_MAX_PATH_WIDTH: usize = 2;

/// Ancestor chain from the function root down to one leaf.
pub type CandidatePath = Vec<ElementId>;

/// Filters applied to every candidate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeLimits {
    pub max_path_length: usize,
    pub max_path_width: usize,
}

impl Default for MergeLimits {
    fn default() -> Self {
        Self {
            max_path_length: DEFAULT_MAX_PATH_LENGTH,
            max_path_width: DEFAULT_MAX_PATH_WIDTH,
        }
    }
}

/// `(start token, interior type tags, end token)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathContext {
    pub start: String,
    pub path: Vec<String>,
    pub end: String,
}

impl PathContext {
    /// `start,type1|type2|...,end` with both endpoints cleaned.
    pub fn encode(&self) -> String {
        format!("{},{},{}", clean(&self.start), self.path.join("|"), clean(&self.end))
    }
}

/// All path contexts of one function, keyed by its cleaned name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRecord {
    pub name: String,
    pub contexts: Vec<PathContext>,
}

impl FunctionRecord {
    /// One output line: `name ctx1 ctx2 ...\n`, escaped to printable ASCII.
    pub fn to_line(&self) -> String {
        let payload = self
            .contexts
            .iter()
            .map(PathContext::encode)
            .collect::<Vec<_>>()
            .join(" ");
        format!("{} {}\n", unicode_escape(&self.name), unicode_escape(&payload))
    }
}

/// Where two candidate paths meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fork {
    /// Length of the shared prefix; the vertex sits at `common - 1`.
    pub common: usize,
    pub vertex: ElementId,
    pub left_child: ElementId,
    pub right_child: ElementId,
}

/// Locate the lowest common ancestor of two candidate paths by identity.
pub fn find_fork(left: &[ElementId], right: &[ElementId]) -> Result<Fork, ExtractError> {
    let common = left
        .iter()
        .zip(right.iter())
        .take_while(|(l, r)| l == r)
        .count();
    if common == 0 {
        return Err(ExtractError::NoCommonAncestor);
    }
    if common == left.len() || common == right.len() {
        return Err(ExtractError::DegeneratePath);
    }
    Ok(Fork {
        common,
        vertex: left[common - 1],
        left_child: left[common],
        right_child: right[common],
    })
}

/// Tree distance used by the depth filter: the size of the symmetric
/// difference of both element sets, plus one for the vertex.
///
/// Elements below the fork are unique to their own path, so the symmetric
/// difference is everything outside the shared prefix.
pub fn tree_distance(left: &[ElementId], right: &[ElementId], fork: &Fork) -> usize {
    (left.len() - fork.common) + (right.len() - fork.common) + 1
}

/// Sibling-index span of the fork at the vertex.
pub fn fork_width(arena: &Arena, fork: &Fork) -> Result<usize, ExtractError> {
    let left = arena
        .child_index(fork.vertex, fork.left_child)
        .ok_or(ExtractError::MissingChild)?;
    let right = arena
        .child_index(fork.vertex, fork.right_child)
        .ok_or(ExtractError::MissingChild)?;
    Ok(left.abs_diff(right))
}

/// Accumulates candidate paths and merged contexts for exactly one function.
///
/// Created when a function definition is entered and consumed by
/// [`PathMerger::finish`] when its traversal completes.
#[derive(Debug)]
pub struct PathMerger {
    name: String,
    limits: MergeLimits,
    paths: Vec<CandidatePath>,
    contexts: Vec<PathContext>,
}

impl PathMerger {
    pub fn new(name: impl Into<String>, limits: MergeLimits) -> Self {
        Self {
            name: name.into(),
            limits,
            paths: Vec::new(),
            contexts: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    /// Merge `path` with every earlier candidate, keep what passes the
    /// filters, then remember `path` for later candidates.
    pub fn add_path(&mut self, arena: &Arena, path: CandidatePath) -> Result<(), ExtractError> {
        for prev in &self.paths {
            if let Some(context) = merge(arena, prev, &path, self.limits)? {
                self.contexts.push(context);
            }
        }
        self.paths.push(path);
        Ok(())
    }

    pub fn finish(self) -> FunctionRecord {
        FunctionRecord {
            name: self.name,
            contexts: self.contexts,
        }
    }
}

/// Merge two candidate paths into a context, or `None` when a filter rejects
/// the pair.
pub fn merge(
    arena: &Arena,
    left: &[ElementId],
    right: &[ElementId],
    limits: MergeLimits,
) -> Result<Option<PathContext>, ExtractError> {
    let fork = find_fork(left, right)?;
    if tree_distance(left, right, &fork) > limits.max_path_length {
        return Ok(None);
    }
    if fork_width(arena, &fork)? > limits.max_path_width {
        return Ok(None);
    }

    let (left_leaf, left_inner) = split_leaf(left)?;
    let (right_leaf, right_inner) = split_leaf(right)?;

    let path = left_inner[fork.common..]
        .iter()
        .rev()
        .chain(std::iter::once(&fork.vertex))
        .chain(right_inner[fork.common..].iter())
        .map(|&id| arena.get(id).node_type().to_string())
        .collect();

    Ok(Some(PathContext {
        start: leaf_value(arena, left_leaf)?,
        path,
        end: leaf_value(arena, right_leaf)?,
    }))
}

fn split_leaf(path: &[ElementId]) -> Result<(ElementId, &[ElementId]), ExtractError> {
    path.split_last()
        .map(|(&leaf, inner)| (leaf, inner))
        .ok_or(ExtractError::DegeneratePath)
}

fn leaf_value(arena: &Arena, id: ElementId) -> Result<String, ExtractError> {
    arena
        .get(id)
        .value()
        .map(str::to_string)
        .ok_or(ExtractError::DegeneratePath)
}
