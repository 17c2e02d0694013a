//! Result tree of a path resolution.
//!
//! A path without wildcards resolves to a single [`ResolvedLeaf`]. Every wildcard
//! turns into a [`Resolution::Fanout`] node whose entries mirror the container that
//! was fanned over, so nested wildcards give nested fan-outs. Each leaf carries the
//! capture list (`$N` targets) and the concrete path it was found at.

use super::parser::PathKey;
use crate::value::{Object, Value};

/// Container kind a fan-out was taken over; decides how it is reassembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanKind {
    /// Declared fields; absent results are left out
    Structure,
    /// Runtime keys; every key is kept
    Record,
    /// Runtime indices; every index is kept
    Sequence,
}

/// A resolved value together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLeaf {
    pub value: Value,
    /// Wildcard keys captured on the way, inherited captures first
    pub captures: Vec<PathKey>,
    /// Concrete keys from the root to this value
    pub path: Vec<PathKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Leaf(ResolvedLeaf),
    Fanout {
        kind: FanKind,
        /// Captures in effect before this wildcard
        captures: Vec<PathKey>,
        entries: Vec<(PathKey, Resolution)>,
    },
}

/// Shape of a resolution with the leaves taken out; see [`Resolution::into_leaves`].
#[derive(Debug, Clone, PartialEq)]
pub enum Skeleton {
    Leaf,
    Fanout {
        kind: FanKind,
        captures: Vec<PathKey>,
        entries: Vec<(PathKey, Skeleton)>,
    },
}

impl Resolution {
    pub fn leaf(value: Value, captures: Vec<PathKey>, path: Vec<PathKey>) -> Self {
        Resolution::Leaf(ResolvedLeaf {
            value,
            captures,
            path,
        })
    }

    pub fn is_fanout(&self) -> bool {
        matches!(self, Resolution::Fanout { .. })
    }

    /// Reassembles the resolution into a plain value.
    pub fn into_value(self) -> Value {
        match self {
            Resolution::Leaf(leaf) => leaf.value,
            Resolution::Fanout {
                kind: FanKind::Sequence,
                entries,
                ..
            } => Value::Array(entries.into_iter().map(|(_, r)| r.into_value()).collect()),
            Resolution::Fanout {
                kind: FanKind::Record,
                entries,
                ..
            } => Value::Object(
                entries
                    .into_iter()
                    .map(|(key, r)| (key.to_string(), r.into_value()))
                    .collect::<Object>(),
            ),
            Resolution::Fanout {
                kind: FanKind::Structure,
                entries,
                ..
            } => Value::Object(
                entries
                    .into_iter()
                    .filter_map(|(key, r)| {
                        let value = r.into_value();
                        (!value.is_null()).then(|| (key.to_string(), value))
                    })
                    .collect::<Object>(),
            ),
        }
    }

    /// Leaves in resolution order.
    pub fn leaves(&self) -> Vec<&ResolvedLeaf> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'r>(&'r self, out: &mut Vec<&'r ResolvedLeaf>) {
        match self {
            Resolution::Leaf(leaf) => out.push(leaf),
            Resolution::Fanout { entries, .. } => {
                for (_, entry) in entries {
                    entry.collect_leaves(out);
                }
            }
        }
    }

    /// Splits into the fan-out skeleton and the leaves, in order.
    pub fn into_leaves(self) -> (Skeleton, Vec<ResolvedLeaf>) {
        let mut leaves = Vec::new();
        let skeleton = self.split(&mut leaves);
        (skeleton, leaves)
    }

    fn split(self, leaves: &mut Vec<ResolvedLeaf>) -> Skeleton {
        match self {
            Resolution::Leaf(leaf) => {
                leaves.push(leaf);
                Skeleton::Leaf
            }
            Resolution::Fanout {
                kind,
                captures,
                entries,
            } => Skeleton::Fanout {
                kind,
                captures,
                entries: entries
                    .into_iter()
                    .map(|(key, entry)| (key, entry.split(leaves)))
                    .collect(),
            },
        }
    }

    /// Inverse of [`Resolution::into_leaves`]. Missing leaves become absent values.
    pub fn from_leaves(skeleton: Skeleton, leaves: Vec<ResolvedLeaf>) -> Self {
        let mut leaves = leaves.into_iter();
        Self::fill(skeleton, &mut leaves)
    }

    fn fill(skeleton: Skeleton, leaves: &mut impl Iterator<Item = ResolvedLeaf>) -> Self {
        match skeleton {
            Skeleton::Leaf => Resolution::Leaf(leaves.next().unwrap_or(ResolvedLeaf {
                value: Value::Null,
                captures: Vec::new(),
                path: Vec::new(),
            })),
            Skeleton::Fanout {
                kind,
                captures,
                entries,
            } => Resolution::Fanout {
                kind,
                captures,
                entries: entries
                    .into_iter()
                    .map(|(key, entry)| (key, Self::fill(entry, leaves)))
                    .collect(),
            },
        }
    }

    /// Applies `f` to every leaf value, keeping the shape.
    pub fn map_values<F>(self, mut f: F) -> Self
    where
        F: FnMut(Value) -> Value,
    {
        let (skeleton, leaves) = self.into_leaves();
        let leaves = leaves
            .into_iter()
            .map(|leaf| ResolvedLeaf {
                value: f(leaf.value),
                ..leaf
            })
            .collect();
        Self::from_leaves(skeleton, leaves)
    }
}
