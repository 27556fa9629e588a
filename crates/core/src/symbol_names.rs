//! Full symbol names from prefix-compressed segments.
//!
//! Each segment optionally points at a parent segment; a name is the
//! concatenation of segment texts from a root down to a leaf. Only leaves
//! (segments nobody points at) are complete names.

use codenav_api::{CodeNavError, Result, SymbolNameSegment, UploadId};
use petgraph::Direction;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Reconstructs every complete name of one upload, sorted.
pub fn reconstruct_names(upload_id: UploadId, segments: &[SymbolNameSegment]) -> Result<Vec<String>> {
    let malformed = |reason: String| CodeNavError::MalformedSymbolNames { upload_id, reason };

    let mut graph: DiGraph<&str, ()> = DiGraph::with_capacity(segments.len(), segments.len());
    let mut nodes: HashMap<i64, NodeIndex> = HashMap::with_capacity(segments.len());
    for segment in segments {
        let node = graph.add_node(segment.text.as_str());
        if nodes.insert(segment.id, node).is_some() {
            return Err(malformed(format!("duplicate segment id {}", segment.id)));
        }
    }

    let mut roots = Vec::new();
    for segment in segments {
        let node = nodes[&segment.id];
        match segment.parent_id {
            None => roots.push(node),
            Some(parent_id) => {
                let Some(&parent) = nodes.get(&parent_id) else {
                    return Err(malformed(format!(
                        "segment {} points at missing parent {}",
                        segment.id, parent_id
                    )));
                };
                graph.add_edge(parent, node, ());
            }
        }
    }

    if is_cyclic_directed(&graph) {
        return Err(malformed("parent chain contains a cycle".to_string()));
    }

    let mut names = Vec::new();
    let mut stack: Vec<(NodeIndex, String)> = roots
        .into_iter()
        .map(|root| (root, String::new()))
        .collect();
    while let Some((node, prefix)) = stack.pop() {
        let name = format!("{prefix}{}", graph[node]);
        let mut children = graph.neighbors_directed(node, Direction::Outgoing).peekable();
        if children.peek().is_none() {
            names.push(name);
            continue;
        }
        for child in children {
            stack.push((child, name.clone()));
        }
    }

    names.sort();
    Ok(names)
}
