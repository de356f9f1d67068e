//  STRATA.rs
//    by Lut99
//
//  Created:
//    04 Mar 2025, 15:20:12
//  Last edited:
//    12 Mar 2025, 11:03:48
//  Auto updated?
//    Yes
//
//  Description:
//!   Partitions the derived predicates of a schema into strata.
//!
//!   A stratum is a strongly connected component of the dependency graph, where every derived
//!   predicate has an edge to every derived predicate mentioned in its definition. Edges are
//!   labelled with whether the mention is negative (i.e., occurs under an odd number of `not`s).
//!   A negative edge within one component means the predicate is defined in terms of its own
//!   negation, which has no least fixpoint.
//

use std::collections::HashMap;

use indexmap::IndexMap;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef as _;

use super::{PredicateDef, PredicateKind};
use crate::errors::SchemaError;
use crate::formula::Ident;
use crate::ids::PredicateId;
use crate::log::trace;


/***** LIBRARY *****/
/// Computes the strata of the derived predicates in the given table.
///
/// # Arguments
/// - `predicates`: The (already validated) predicate table of the schema.
///
/// # Returns
/// A list of strata in dependency-first order, i.e., every stratum only refers to derived
/// predicates in itself or in strata before it. Within one stratum, predicates are ordered by
/// declaration.
///
/// # Errors
/// This function errors with [`SchemaError::NotStratifiable`] if some stratum depends negatively
/// on itself.
pub(crate) fn stratify(predicates: &IndexMap<Ident, PredicateDef>) -> Result<Vec<Vec<PredicateId>>, SchemaError> {
    // Build the graph of derived predicates only
    let mut graph: DiGraph<PredicateId, bool> = DiGraph::new();
    let mut nodes: HashMap<usize, NodeIndex> = HashMap::new();
    for (i, def) in predicates.values().enumerate() {
        if matches!(def.kind, PredicateKind::Derived(_)) {
            nodes.insert(i, graph.add_node(PredicateId(i)));
        }
    }
    for (i, def) in predicates.values().enumerate() {
        let PredicateKind::Derived(definition) = &def.kind else { continue };
        let src: NodeIndex = nodes[&i];
        definition.visit_atoms(true, &mut |atom, positive| {
            if let Some(dst) = predicates.get_index_of(atom.predicate.as_str()).and_then(|j| nodes.get(&j)) {
                graph.add_edge(src, *dst, !positive);
            }
        });
    }

    // Find the components. `tarjan_scc()` returns them in postorder, which is dependency-first
    // for our edge direction.
    let sccs: Vec<Vec<NodeIndex>> = tarjan_scc(&graph);
    let mut component: HashMap<NodeIndex, usize> = HashMap::with_capacity(graph.node_count());
    for (c, scc) in sccs.iter().enumerate() {
        for node in scc {
            component.insert(*node, c);
        }
    }

    // Reject negative edges within one component
    for edge in graph.edge_references() {
        if *edge.weight() && component[&edge.source()] == component[&edge.target()] {
            let scc: &[NodeIndex] = &sccs[component[&edge.source()]];
            let mut ids: Vec<PredicateId> = scc.iter().map(|n| graph[*n]).collect();
            ids.sort();
            return Err(SchemaError::NotStratifiable {
                predicates: ids.into_iter().map(|id| predicates.get_index(id.0).map(|(name, _)| name.to_string()).unwrap_or_default()).collect(),
            });
        }
    }

    // OK, emit them sorted
    let strata: Vec<Vec<PredicateId>> = sccs
        .into_iter()
        .map(|scc| {
            let mut ids: Vec<PredicateId> = scc.into_iter().map(|n| graph[n]).collect();
            ids.sort();
            ids
        })
        .collect();
    trace!("Computed {} strata for {} derived predicates", strata.len(), nodes.len());
    Ok(strata)
}
