//! Path parser built on PEST.
//!
//! Turns `"items.*.price"` into a list of [`PathSegment`]s.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use std::fmt;

use super::error::{PathError, PathResult};

#[derive(Parser)]
#[grammar = "path/path.pest"]
struct PathGrammar;

/// One segment of a model path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Literal field name, record key or sequence index
    Key(String),
    /// `*`: fan out over the current container
    Wildcard,
    /// `$N`: the Nth captured wildcard key
    BackRef(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Wildcard => f.write_str("*"),
            PathSegment::BackRef(index) => write!(f, "${}", index),
        }
    }
}

/// Concrete key consumed at a position of a resolved path: a structure field or
/// record key, or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathKey {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKey::Key(key) => f.write_str(key),
            PathKey::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Renders a list of keys as a dotted path (`<root>` when empty).
pub fn join_keys(keys: &[PathKey]) -> String {
    if keys.is_empty() {
        return "<root>".to_string();
    }
    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// A parsed model path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPath {
    raw: String,
    segments: Vec<PathSegment>,
}

impl ModelPath {
    pub fn parse(input: &str) -> PathResult<Self> {
        let mut pairs = PathGrammar::parse(Rule::path, input)
            .map_err(|e| PathError::invalid(input, format!("parse error: {}", e)))?;

        let path_pair = pairs
            .next()
            .ok_or_else(|| PathError::invalid(input, "no path found in parse result"))?;

        let segments = path_pair
            .into_inner()
            .filter(|pair| pair.as_rule() != Rule::EOI)
            .map(|pair| build_segment(input, pair))
            .collect::<PathResult<Vec<_>>>()?;

        Ok(Self {
            raw: input.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn has_wildcard(&self) -> bool {
        self.segments.contains(&PathSegment::Wildcard)
    }

    pub fn has_back_reference(&self) -> bool {
        self.segments
            .iter()
            .any(|segment| matches!(segment, PathSegment::BackRef(_)))
    }

    /// This path resolved below `base`: the base keys become literal segments.
    pub fn prefixed(&self, base: &[PathKey]) -> ModelPath {
        if base.is_empty() {
            return self.clone();
        }
        let mut segments: Vec<PathSegment> = base
            .iter()
            .map(|key| PathSegment::Key(key.to_string()))
            .collect();
        segments.extend(self.segments.iter().cloned());
        ModelPath {
            raw: format!("{}.{}", join_keys(base), self.raw),
            segments,
        }
    }
}

impl fmt::Display for ModelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn build_segment(input: &str, pair: Pair<Rule>) -> PathResult<PathSegment> {
    match pair.as_rule() {
        Rule::wildcard => Ok(PathSegment::Wildcard),
        Rule::key => Ok(PathSegment::Key(pair.as_str().to_string())),
        Rule::backref => {
            let index = pair
                .into_inner()
                .next()
                .ok_or_else(|| PathError::invalid(input, "back-reference without index"))?;
            index
                .as_str()
                .parse::<usize>()
                .map(PathSegment::BackRef)
                .map_err(|e| PathError::invalid(input, format!("bad back-reference index: {}", e)))
        }
        other => Err(PathError::invalid(
            input,
            format!("unexpected rule: {:?}", other),
        )),
    }
}

/// Parses a dotted path.
pub fn parse(input: &str) -> PathResult<ModelPath> {
    ModelPath::parse(input)
}
