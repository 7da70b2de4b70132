//! Decode tracing.
//!
//! A [`Tracer`] observes the recursion: every decode step marks its node,
//! and every descent forks a child node. Node identity is a [`TraceId`];
//! id 0 is the root of every sink. Three shapes are provided: a callback
//! (per-mark function, forking is identity), a tree (the primary debugging
//! artifact), and a list combinator so a decoder-configured sink and
//! caller-supplied sinks can run side by side.

use std::fmt::{self, Write};

use crate::error::DecodeInfo;

/// Identity of a trace node within a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceId(pub(crate) usize);

impl TraceId {
    /// The pre-created root node of every sink.
    pub const ROOT: TraceId = TraceId(0);
}

/// A sink observing decode recursion.
pub trait Tracer {
    /// Record the decode step at `node`. Called at most once per node.
    fn mark(&mut self, node: TraceId, info: &DecodeInfo);

    /// Fork a child of `parent` for a nested decode step.
    fn child(&mut self, parent: TraceId) -> TraceId;
}

/// A per-mark callback; forking is identity.
pub struct TraceCallback<F: FnMut(&DecodeInfo)> {
    callback: F,
}

impl<F: FnMut(&DecodeInfo)> TraceCallback<F> {
    pub fn new(callback: F) -> Self {
        TraceCallback { callback }
    }
}

impl<F: FnMut(&DecodeInfo)> Tracer for TraceCallback<F> {
    fn mark(&mut self, _node: TraceId, info: &DecodeInfo) {
        (self.callback)(info);
    }

    fn child(&mut self, parent: TraceId) -> TraceId {
        parent
    }
}

/// An arena rose tree of decode steps.
#[derive(Debug, Default)]
pub struct TraceTree {
    nodes: Vec<TraceNode>,
}

#[derive(Debug, Default)]
struct TraceNode {
    info: Option<DecodeInfo>,
    children: Vec<usize>,
}

impl TraceTree {
    pub fn new() -> Self {
        TraceTree::default()
    }

    /// True when no decode has run against this tree.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn ensure_root(&mut self) {
        if self.nodes.is_empty() {
            self.nodes.push(TraceNode::default());
        }
    }

    /// Render the tree, one node per line, indented two spaces per depth.
    /// Nodes that were forked but never marked render as `no info`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("decode trace\n");
        if !self.nodes.is_empty() {
            self.render_node(&mut out, 0, 1);
        }
        out
    }

    fn render_node(&self, out: &mut String, node: usize, depth: usize) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        match &self.nodes[node].info {
            Some(info) => writeln!(out, "{info}").expect("String write never fails"),
            None => out.push_str("no info\n"),
        }
        for child in &self.nodes[node].children {
            self.render_node(out, *child, depth + 1);
        }
    }
}

impl fmt::Display for TraceTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl Tracer for TraceTree {
    fn mark(&mut self, node: TraceId, info: &DecodeInfo) {
        self.ensure_root();
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.info = Some(info.clone());
        }
    }

    fn child(&mut self, parent: TraceId) -> TraceId {
        self.ensure_root();
        let id = self.nodes.len();
        self.nodes.push(TraceNode::default());
        if let Some(p) = self.nodes.get_mut(parent.0) {
            p.children.push(id);
        }
        TraceId(id)
    }
}

/// Runs several sinks in lockstep. Composite node ids map to one id per
/// sink; with no sinks it is a no-op.
pub struct TraceList<'a> {
    sinks: Vec<&'a mut dyn Tracer>,
    rows: Vec<Vec<TraceId>>,
}

impl<'a> TraceList<'a> {
    pub fn new(sinks: Vec<&'a mut dyn Tracer>) -> Self {
        let root = vec![TraceId::ROOT; sinks.len()];
        TraceList {
            sinks,
            rows: vec![root],
        }
    }
}

impl Tracer for TraceList<'_> {
    fn mark(&mut self, node: TraceId, info: &DecodeInfo) {
        let Some(row) = self.rows.get(node.0) else {
            return;
        };
        let row = row.clone();
        for (sink, id) in self.sinks.iter_mut().zip(row) {
            sink.mark(id, info);
        }
    }

    fn child(&mut self, parent: TraceId) -> TraceId {
        if self.sinks.is_empty() {
            return TraceId::ROOT;
        }
        let Some(parent_row) = self.rows.get(parent.0) else {
            return TraceId::ROOT;
        };
        let parent_row = parent_row.clone();
        let row: Vec<TraceId> = self
            .sinks
            .iter_mut()
            .zip(parent_row)
            .map(|(sink, id)| sink.child(id))
            .collect();
        self.rows.push(row);
        TraceId(self.rows.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::target::Kind;

    fn info(level: Level, input: &str) -> DecodeInfo {
        DecodeInfo {
            level,
            input: input.to_string(),
            type_name: "demo::Target",
            kind: Kind::Text,
        }
    }

    #[test]
    fn tree_collects_marks_per_node() {
        let mut tree = TraceTree::new();
        tree.mark(TraceId::ROOT, &info(Level::Query, "a=1&b=2"));
        let a = tree.child(TraceId::ROOT);
        tree.mark(a, &info(Level::Field, "a=1"));
        let b = tree.child(TraceId::ROOT);
        tree.mark(b, &info(Level::Field, "b=2"));
        let unmarked = tree.child(b);
        let _ = unmarked;

        insta::assert_snapshot!(tree.render(), @r#"
        decode trace
          [query] "a=1&b=2" => demo::Target (text)
            [field] "a=1" => demo::Target (text)
            [field] "b=2" => demo::Target (text)
              no info
        "#);
    }

    #[test]
    fn callback_sees_every_mark_and_ignores_forks() {
        let mut seen = Vec::new();
        {
            let mut cb = TraceCallback::new(|info: &DecodeInfo| seen.push(info.input.clone()));
            let child = cb.child(TraceId::ROOT);
            assert_eq!(child, TraceId::ROOT);
            cb.mark(child, &info(Level::Value, "x"));
            cb.mark(TraceId::ROOT, &info(Level::Value, "y"));
        }
        assert_eq!(seen, ["x", "y"]);
    }

    #[test]
    fn list_fans_out_to_all_sinks() {
        let mut tree_a = TraceTree::new();
        let mut tree_b = TraceTree::new();
        {
            let mut list = TraceList::new(vec![&mut tree_a, &mut tree_b]);
            list.mark(TraceId::ROOT, &info(Level::Query, "q"));
            let child = list.child(TraceId::ROOT);
            list.mark(child, &info(Level::Field, "f"));
        }
        assert_eq!(tree_a.render(), tree_b.render());
        assert!(tree_a.render().contains("[field]"));
    }

    #[test]
    fn empty_list_is_a_noop() {
        let mut list = TraceList::new(Vec::new());
        let child = list.child(TraceId::ROOT);
        assert_eq!(child, TraceId::ROOT);
        list.mark(child, &info(Level::Value, "x"));
    }
}
