pub mod graph;

pub use graph::DependencyGraph;

use std::collections::BTreeSet;
use thiserror::Error;
use treebank_fields::{parse_deps, FieldError};
use treebank_protocol::{AnnotationRow, TokenId};

/// A structural problem in a fully tagged sentence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreeIssue {
    #[error("no token is attached to the root")]
    NoRoot,
    #[error("several tokens are attached to the root: {}", join(.0))]
    MultipleRoots(Vec<TokenId>),
    #[error("token {id} has DEPREL {deprel} but HEAD {head}")]
    RootHeadMismatch { id: TokenId, head: u32, deprel: &'static str },
    #[error("token {id} has HEAD {head}, which is not a token of this sentence")]
    DanglingHead { id: TokenId, head: u32 },
    #[error("token {0} is its own head")]
    SelfLoop(TokenId),
    #[error("tokens {} form a cycle", join(.0))]
    Cycle(Vec<TokenId>),
    #[error("tokens {} are not connected to the root", join(.0))]
    Detached(Vec<TokenId>),
    #[error("token {id}: {source}")]
    MalformedDeps {
        id: TokenId,
        #[source]
        source: FieldError,
    },
    #[error("token {id} has an enhanced head {head}, which is not a token of this sentence")]
    DanglingEnhancedHead { id: TokenId, head: u32 },
}

fn join(ids: &[TokenId]) -> String {
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
}

/// Reports everything that keeps `rows` from being a single rooted tree.
/// An empty result means the sentence is well formed.
pub fn check_tree(rows: &[AnnotationRow]) -> Vec<TreeIssue> {
    let mut issues = Vec::new();
    let ids: BTreeSet<u32> = rows.iter().map(|row| row.id.get()).collect();

    // 1. Root attachment
    let roots: Vec<TokenId> = rows.iter().filter(|row| row.head == 0).map(|row| row.id).collect();
    match roots.len() {
        0 => issues.push(TreeIssue::NoRoot),
        1 => {}
        _ => issues.push(TreeIssue::MultipleRoots(roots)),
    }

    for row in rows {
        if row.is_root() != (row.head == 0) {
            issues.push(TreeIssue::RootHeadMismatch {
                id: row.id,
                head: row.head,
                deprel: row.deprel.as_str(),
            });
        }
    }

    // 2. Basic tree shape
    let mut graph = DependencyGraph::new();
    for row in rows {
        graph.add_token(row.id);
    }
    for row in rows {
        if row.head == 0 || ids.contains(&row.head) {
            graph.add_relation(row.head, row.id, row.deprel);
        } else {
            issues.push(TreeIssue::DanglingHead { id: row.id, head: row.head });
        }
    }

    let mut in_cycle = BTreeSet::new();
    for cycle in graph.cycles() {
        in_cycle.extend(cycle.iter().copied());
        if cycle.len() == 1 {
            issues.push(TreeIssue::SelfLoop(cycle[0]));
        } else {
            issues.push(TreeIssue::Cycle(cycle));
        }
    }

    let detached: Vec<TokenId> = graph
        .unreachable()
        .into_iter()
        .filter(|id| !in_cycle.contains(id))
        .collect();
    if !detached.is_empty() {
        issues.push(TreeIssue::Detached(detached));
    }

    // 3. Enhanced dependencies
    for row in rows {
        match parse_deps(&row.deps) {
            Ok(deps) => {
                // Empty nodes are not rows, so only word heads are checked
                for dep in deps.into_iter().filter(|dep| dep.node.is_none()) {
                    if dep.head != 0 && !ids.contains(&dep.head) {
                        issues.push(TreeIssue::DanglingEnhancedHead { id: row.id, head: dep.head });
                    }
                }
            }
            Err(source) => issues.push(TreeIssue::MalformedDeps { id: row.id, source }),
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use treebank_protocol::{Deprel, Upos};

    fn row(id: u32, form: &str, head: u32, deprel: Deprel) -> AnnotationRow {
        AnnotationRow::new(id, form, Upos::X, head, deprel)
    }

    #[test]
    fn test_well_formed_sentence() {
        let rows = vec![
            row(1, "I", 2, Deprel::Nsubj),
            row(2, "run", 0, Deprel::Root),
            row(3, ".", 2, Deprel::Punct).with_deps("2:punct"),
        ];
        assert!(check_tree(&rows).is_empty());
    }

    #[test]
    fn test_root_problems() {
        let rows = vec![row(1, "a", 2, Deprel::Dep), row(2, "b", 1, Deprel::Dep)];
        let issues = check_tree(&rows);
        assert!(issues.contains(&TreeIssue::NoRoot));
        assert!(issues.contains(&TreeIssue::Cycle(vec![TokenId::new(1), TokenId::new(2)])));

        let rows = vec![row(1, "a", 0, Deprel::Root), row(2, "b", 0, Deprel::Root)];
        let issues = check_tree(&rows);
        assert_eq!(
            issues,
            vec![TreeIssue::MultipleRoots(vec![TokenId::new(1), TokenId::new(2)])]
        );
        assert_eq!(issues[0].to_string(), "several tokens are attached to the root: 1, 2");
    }

    #[test]
    fn test_self_loop_and_detached() {
        let rows = vec![
            row(1, "a", 0, Deprel::Root),
            row(2, "b", 2, Deprel::Dep),
            row(3, "c", 2, Deprel::Dep),
        ];
        let issues = check_tree(&rows);
        assert!(issues.contains(&TreeIssue::SelfLoop(TokenId::new(2))));
        assert!(issues.contains(&TreeIssue::Detached(vec![TokenId::new(3)])));
    }

    #[test]
    fn test_dangling_heads() {
        let rows = vec![
            row(1, "a", 0, Deprel::Root).with_deps("0:root|9:conj"),
            row(2, "b", 5, Deprel::Dep),
        ];
        let issues = check_tree(&rows);
        assert!(issues.contains(&TreeIssue::DanglingHead { id: TokenId::new(2), head: 5 }));
        assert!(issues.contains(&TreeIssue::DanglingEnhancedHead { id: TokenId::new(1), head: 9 }));
        assert!(issues.contains(&TreeIssue::Detached(vec![TokenId::new(2)])));
    }

    #[test]
    fn test_enhanced_heads_on_empty_nodes() {
        let rows = vec![
            row(1, "left", 0, Deprel::Root).with_deps("0:root"),
            row(2, "we", 1, Deprel::Conj).with_deps("2.1:nsubj"),
        ];
        assert!(check_tree(&rows).is_empty());
    }

    #[test]
    fn test_mismatched_root_label() {
        let rows = vec![row(1, "a", 0, Deprel::Nsubj)];
        let issues = check_tree(&rows);
        assert_eq!(
            issues,
            vec![TreeIssue::RootHeadMismatch { id: TokenId::new(1), head: 0, deprel: "nsubj" }]
        );
    }
}
