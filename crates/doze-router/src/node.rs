//! Byte-keyed trie with typed parameter slots.
//!
//! Every literal byte of a template becomes one trie edge. A parameter segment
//! does not consume literal edges; it lives in one of the node's reserved
//! `typed` slots, one per [`ParamKind`]. The tree for
//! `/people/{id:i}` and `/people/{name:a}/jobs` looks like:
//!
//! ```text
//!   (root) -/- p - e - o - p - l - e -/- [Int]  -> route 0
//!                                        [Alpha] -/- j - o - b - s -> route 1
//! ```
//!
//! Matching walks literal edges as far as they go, remembering every node
//! that also carries typed slots. If the literal walk does not end on a
//! route, those forks are retried deepest first, and each typed slot is
//! tried in [`ParamKind::PRIORITY`] order. The first continuation that
//! reaches a route with no input left wins.

use smallvec::SmallVec;

use crate::pattern::{ParamKind, Segment};

/// Byte spans `(start, end)` of captured parameters, in path order.
pub(crate) type Spans = SmallVec<[(usize, usize); 4]>;

const SLOTS: usize = ParamKind::PRIORITY.len();

/// A node in the route trie.
#[derive(Debug, Clone, Default)]
pub struct Node {
    /// Byte on the edge leading into this node (unused for typed nodes).
    key: u8,

    /// Literal children, sorted by key for binary search
    children: Vec<Node>,

    /// Typed parameter children, indexed by [`ParamKind::slot`]
    typed: [Option<Box<Node>>; SLOTS],

    /// Index of the route that terminates here
    route: Option<usize>,
}

impl Node {
    /// Creates a root node for the tree.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    fn with_key(key: u8) -> Self {
        Self {
            key,
            ..Self::default()
        }
    }

    /// Inserts a compiled template, binding its leaf to `route`.
    ///
    /// Returns `Err` with the route index that already owns the leaf when
    /// another template resolves to the same position.
    pub fn insert(&mut self, segments: &[Segment], route: usize) -> Result<(), usize> {
        let mut node = self;
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                node = node.literal_or_insert(b'/');
            }
            match segment {
                Segment::Literal(text) => {
                    for &byte in text.as_bytes() {
                        node = node.literal_or_insert(byte);
                    }
                }
                Segment::Param { kind, .. } => {
                    node = node.typed[kind.slot()]
                        .get_or_insert_with(|| Box::new(Self::default()))
                        .as_mut();
                }
            }
        }

        match node.route {
            Some(existing) => Err(existing),
            None => {
                node.route = Some(route);
                Ok(())
            }
        }
    }

    /// Resolves a concrete path to a route index, recording parameter spans.
    pub(crate) fn find(&self, path: &[u8], spans: &mut Spans) -> Option<usize> {
        self.find_from(path, 0, spans)
    }

    fn find_from(&self, path: &[u8], start: usize, spans: &mut Spans) -> Option<usize> {
        let mut forks: SmallVec<[(&Self, usize); 8]> = SmallVec::new();
        let mut node = self;
        let mut pos = start;

        loop {
            if node.has_typed() {
                forks.push((node, pos));
            }
            if pos == path.len() {
                if node.route.is_some() {
                    return node.route;
                }
                break;
            }
            match node.literal(path[pos]) {
                Some(child) => {
                    node = child;
                    pos += 1;
                }
                None => break,
            }
        }

        while let Some((fork, at)) = forks.pop() {
            if let Some(route) = fork.find_typed(path, at, spans) {
                return Some(route);
            }
        }
        None
    }

    fn find_typed(&self, path: &[u8], at: usize, spans: &mut Spans) -> Option<usize> {
        let rest = &path[at..];
        if rest.is_empty() {
            return None;
        }
        let segment_end = rest.iter().position(|&b| b == b'/').unwrap_or(rest.len());

        for kind in ParamKind::PRIORITY {
            let Some(child) = self.typed[kind.slot()].as_deref() else {
                continue;
            };

            if kind == ParamKind::Wildcard {
                // Longest remainder first, then back off one `/` at a time.
                let mut end = rest.len();
                loop {
                    if let Some(route) = child.try_span(path, at, at + end, spans) {
                        return Some(route);
                    }
                    match rest[..end].iter().rposition(|&b| b == b'/') {
                        Some(slash) if slash > 0 => end = slash,
                        _ => break,
                    }
                }
            } else if kind.accepts(&rest[..segment_end]) {
                if let Some(route) = child.try_span(path, at, at + segment_end, spans) {
                    return Some(route);
                }
            }
        }
        None
    }

    fn try_span(&self, path: &[u8], start: usize, end: usize, spans: &mut Spans) -> Option<usize> {
        spans.push((start, end));
        let found = self.find_from(path, end, spans);
        if found.is_none() {
            spans.pop();
        }
        found
    }

    fn has_typed(&self) -> bool {
        self.typed.iter().any(Option::is_some)
    }

    fn literal(&self, key: u8) -> Option<&Self> {
        self.children
            .binary_search_by_key(&key, |c| c.key)
            .ok()
            .map(|idx| &self.children[idx])
    }

    fn literal_or_insert(&mut self, key: u8) -> &mut Self {
        let idx = match self.children.binary_search_by_key(&key, |c| c.key) {
            Ok(idx) => idx,
            Err(idx) => {
                self.children.insert(idx, Self::with_key(key));
                idx
            }
        };
        &mut self.children[idx]
    }
}
