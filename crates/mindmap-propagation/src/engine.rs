//! Change impact analysis
//!
//! Given a proposed rename, delete or signature change, walk the dependents
//! of the target node and classify each one as breaking or merely affected.
//! Classification reads the dependents' source text, so it is textual and may
//! both over- and under-report.

use std::collections::{BTreeSet, VecDeque};

use mindmap_core::{
    BreakingChange, ChangeType, CodeNode, DependencyGraph, EdgeKind, ImpactAnalysis, ImpactEntry,
    MindMapConfig, MindMapError, NodeChange, NodeId, NodeKind, Result, SuggestedFix,
};
use tracing::{debug, info};

use crate::references::WordMatcher;
use crate::risk::{self, ImpactSummary};
use crate::signature::{call_sites, parse_params};
use crate::source::{SourceCache, SourceProvider};

/// Dependents above which a breaking node makes a change critical.
pub const DEFAULT_CRITICAL_THRESHOLD: usize = 3;

#[derive(Debug, Clone)]
pub struct PropagationEngine {
    critical_threshold: usize,
}

impl Default for PropagationEngine {
    fn default() -> Self {
        Self::new(DEFAULT_CRITICAL_THRESHOLD)
    }
}

impl PropagationEngine {
    pub fn new(critical_threshold: usize) -> Self {
        PropagationEngine { critical_threshold }
    }

    pub fn from_config(config: &MindMapConfig) -> Self {
        Self::new(config.critical_dependents_threshold)
    }

    /// Compute the impact of `change` on `graph`. Nothing on disk is modified.
    pub fn analyze_impact(
        &self,
        graph: &DependencyGraph,
        change: &NodeChange,
        sources: &dyn SourceProvider,
    ) -> Result<ImpactAnalysis> {
        let target = graph
            .node(&change.node_id)
            .ok_or_else(|| MindMapError::NotFound(change.node_id.clone()))?;
        validate(change)?;

        let direct = graph.dependent_ids(&target.id);
        let transitive = transitive_dependents(graph, &target.id, &direct);
        debug!(
            "{} has {} direct and {} transitive dependent(s)",
            target.id,
            direct.len(),
            transitive.len()
        );

        let mut pass = Pass {
            graph,
            target,
            cache: SourceCache::new(sources),
            breaking: Vec::new(),
            fixes: Vec::new(),
            promoted: BTreeSet::new(),
        };
        match (change.change_type, change.after.as_deref()) {
            (ChangeType::Rename, Some(after)) => pass.rename(&direct, &transitive, old_name(change, target), after.trim()),
            (ChangeType::ModifySignature, Some(after)) => pass.modify_signature(&direct, change.before.trim(), after.trim()),
            (ChangeType::Delete, _) => pass.delete(&direct, &transitive),
            // `validate` rejects a missing `after`
            (_, None) => {}
        }
        let Pass {
            breaking,
            fixes,
            promoted,
            ..
        } = pass;

        let risk_level = risk::assess(
            graph,
            ImpactSummary {
                direct: &direct,
                breaking: &breaking,
                promoted: promoted.len(),
            },
            self.critical_threshold,
        );

        let direct_impact: Vec<ImpactEntry> = direct
            .iter()
            .filter_map(|id| graph.node(id))
            .map(|node| entry(node, describe_direct(graph, node, target)))
            .collect();
        let transitive_impact: Vec<ImpactEntry> = transitive
            .iter()
            .filter(|(id, _)| !promoted.contains(id))
            .filter_map(|(id, via)| Some((graph.node(id)?, graph.node(via)?)))
            .map(|(node, via)| entry(node, format!("depends on {} through {}", target.name, via.name)))
            .collect();

        info!(
            "Impact of {:?} on {}: {} breaking, {} direct, {} transitive, risk {:?}",
            change.change_type,
            target.id,
            breaking.len(),
            direct_impact.len(),
            transitive_impact.len(),
            risk_level
        );

        Ok(ImpactAnalysis {
            target_node: target.clone(),
            change: change.clone(),
            risk_level,
            breaking_changes: breaking,
            direct_impact,
            transitive_impact,
            suggested_fixes: fixes,
        })
    }
}

fn validate(change: &NodeChange) -> Result<()> {
    let after = change.after.as_deref().map(str::trim);
    match change.change_type {
        ChangeType::Delete => Ok(()),
        ChangeType::Rename => match after {
            None | Some("") => Err(MindMapError::InvalidChange("rename needs a new name".to_string())),
            Some(after) if after == change.before.trim() => Err(MindMapError::InvalidChange(format!(
                "new name '{}' is the same as the old one",
                after
            ))),
            Some(after) if !is_identifier(after) => Err(MindMapError::InvalidChange(format!(
                "'{}' is not a valid identifier",
                after
            ))),
            Some(_) => Ok(()),
        },
        ChangeType::ModifySignature => match after {
            None => Err(MindMapError::InvalidChange("signature change needs the new signature".to_string())),
            Some(_) => Ok(()),
        },
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// The identifier being renamed: `before`, or the node's own name when `before` is blank.
fn old_name<'a>(change: &'a NodeChange, target: &'a CodeNode) -> &'a str {
    match change.before.trim() {
        "" => target.declared_name(),
        before => before,
    }
}

/// Breadth-first over dependents beyond the first hop. Each entry records
/// the node it was reached from.
fn transitive_dependents(
    graph: &DependencyGraph,
    target: &NodeId,
    direct: &BTreeSet<NodeId>,
) -> Vec<(NodeId, NodeId)> {
    let mut visited: BTreeSet<NodeId> = direct.clone();
    visited.insert(target.clone());
    let mut queue: VecDeque<NodeId> = direct.iter().cloned().collect();
    let mut found = Vec::new();

    while let Some(current) = queue.pop_front() {
        for dependent in graph.dependent_ids(&current) {
            if visited.insert(dependent.clone()) {
                found.push((dependent.clone(), current.clone()));
                queue.push_back(dependent);
            }
        }
    }
    found
}

fn entry(node: &CodeNode, description: String) -> ImpactEntry {
    ImpactEntry {
        node_id: node.id.clone(),
        node_name: node.name.clone(),
        path: node.path.clone(),
        description,
    }
}

/// `"imports and renders Button"`
fn describe_direct(graph: &DependencyGraph, node: &CodeNode, target: &CodeNode) -> String {
    let kinds: BTreeSet<EdgeKind> = graph
        .edges_from(&node.id)
        .filter(|e| e.target == target.id)
        .map(|e| e.kind)
        .collect();
    let verbs: Vec<&str> = kinds.into_iter().map(EdgeKind::as_str).collect();
    format!("{} {}", verbs.join(" and "), target.name)
}

/// Inclusive line range covered by a declaration.
fn span(node: &CodeNode) -> Option<(u32, u32)> {
    let start = node.line?;
    Some((start, start + node.lines_of_code.max(1) - 1))
}

/// State for one analysis.
struct Pass<'g, 's> {
    graph: &'g DependencyGraph,
    target: &'g CodeNode,
    cache: SourceCache<'s>,
    breaking: Vec<BreakingChange>,
    fixes: Vec<SuggestedFix>,
    promoted: BTreeSet<NodeId>,
}

impl<'g, 's> Pass<'g, 's> {
    /// Source lines attributed to `node`, numbered from 1.
    ///
    /// A declaration owns its own span. A file node owns the lines outside
    /// every declaration in it, which is where imports and re-exports live.
    fn owned_lines(&mut self, node: &CodeNode) -> Vec<(u32, String)> {
        let own = match node.kind {
            NodeKind::File => None,
            _ => span(node),
        };
        let declarations: Vec<(u32, u32)> = match node.kind {
            NodeKind::File => self
                .graph
                .nodes_in_file(&node.path)
                .filter(|n| n.kind != NodeKind::File)
                .filter_map(span)
                .collect(),
            _ => Vec::new(),
        };
        let inside = |n: u32, (start, end): (u32, u32)| n >= start && n <= end;

        self.cache
            .lines(&node.path)
            .iter()
            .enumerate()
            .map(|(i, text)| (i as u32 + 1, text))
            .filter(|&(n, _)| match own {
                Some(range) => inside(n, range),
                None => !declarations.iter().any(|&range| inside(n, range)),
            })
            .map(|(n, text)| (n, text.clone()))
            .collect()
    }

    fn mentions(&mut self, node: &CodeNode, matcher: &WordMatcher) -> Vec<(u32, String)> {
        self.owned_lines(node)
            .into_iter()
            .filter(|(_, text)| matcher.mentions(text))
            .collect()
    }

    fn push_breaking(&mut self, node: &CodeNode, line: u32, code: &str, reason: String) {
        self.breaking.push(BreakingChange {
            node_id: node.id.clone(),
            path: node.path.clone(),
            line,
            current_code: code.trim().to_string(),
            reason,
        });
    }

    /// Line-anchored substitution, skipped when a fix for the same line already exists.
    fn push_fix(&mut self, node_id: &NodeId, path: &str, line: u32, description: String, old: &str, new: String, auto: bool) {
        if auto
            && self
                .fixes
                .iter()
                .any(|f| f.auto_fixable && f.path == path && f.line == line)
        {
            return;
        }
        self.fixes.push(SuggestedFix {
            node_id: node_id.clone(),
            path: path.to_string(),
            line,
            description,
            old_code: old.trim().to_string(),
            new_code: new.trim().to_string(),
            auto_fixable: auto,
        });
    }

    fn rename(&mut self, direct: &BTreeSet<NodeId>, transitive: &[(NodeId, NodeId)], before: &str, after: &str) {
        let Some(matcher) = WordMatcher::new(before) else {
            return;
        };
        let graph = self.graph;
        let target = self.target;

        // The target's own file first, so accepting every fix renames the declaration too
        let mut own_lines = self.owned_lines(target);
        if let Some(file) = graph.node(&NodeId::for_file(&target.path)) {
            own_lines.extend(self.owned_lines(file));
        }
        own_lines.sort();
        for (line, text) in own_lines.iter().filter(|(_, text)| matcher.mentions(text)) {
            self.push_fix(
                &target.id,
                &target.path,
                *line,
                format!("Rename `{}` to `{}` in its declaration", before, after),
                text,
                matcher.replace(text, after),
                true,
            );
        }

        let reason = format!("references `{}`, which will not resolve after the rename to `{}`", before, after);
        let direct_nodes = direct.iter().filter_map(|id| graph.node(id));
        let transitive_nodes = transitive.iter().filter_map(|(id, _)| graph.node(id));
        for (node, is_direct) in direct_nodes.map(|n| (n, true)).chain(transitive_nodes.map(|n| (n, false))) {
            let hits = self.mentions(node, &matcher);
            if hits.is_empty() {
                continue;
            }
            if !is_direct {
                self.promoted.insert(node.id.clone());
            }
            for (line, text) in hits {
                self.push_breaking(node, line, &text, reason.clone());
                self.push_fix(
                    &node.id,
                    &node.path,
                    line,
                    format!("Replace `{}` with `{}`", before, after),
                    &text,
                    matcher.replace(&text, after),
                    true,
                );
            }
        }
    }

    fn delete(&mut self, direct: &BTreeSet<NodeId>, transitive: &[(NodeId, NodeId)]) {
        let graph = self.graph;
        let target = self.target;
        let name = target.declared_name();
        let matcher = WordMatcher::new(name);

        let mut doomed: BTreeSet<NodeId> = direct.clone();
        doomed.insert(target.id.clone());

        let reason = format!("depends on `{}`, which will be deleted", name);
        for node in direct.iter().filter_map(|id| graph.node(id)) {
            let hits = match &matcher {
                Some(matcher) => self.mentions(node, matcher),
                None => Vec::new(),
            };
            self.break_with_guidance(node, hits, reason.clone(), format!("Remove or replace the use of `{}`", name));
        }

        // A transitive dependent breaks when everything it depends on is gone or broken
        loop {
            let newly: Vec<NodeId> = transitive
                .iter()
                .map(|(id, _)| id)
                .filter(|id| !doomed.contains(*id))
                .filter(|id| {
                    let deps = graph.dependency_ids(id);
                    !deps.is_empty() && deps.iter().all(|d| doomed.contains(d))
                })
                .cloned()
                .collect();
            if newly.is_empty() {
                break;
            }
            doomed.extend(newly.iter().cloned());
            self.promoted.extend(newly);
        }

        for (id, _) in transitive {
            if !self.promoted.contains(id) {
                continue;
            }
            let Some(node) = graph.node(id) else {
                continue;
            };
            let lost: Vec<&CodeNode> = graph.dependencies(id);
            let names: Vec<&str> = lost.iter().map(|d| d.declared_name()).collect();
            let matchers: Vec<WordMatcher> = names.iter().filter_map(|n| WordMatcher::new(n)).collect();
            let hits: Vec<(u32, String)> = self
                .owned_lines(node)
                .into_iter()
                .filter(|(_, text)| matchers.iter().any(|m| m.mentions(text)))
                .take(1)
                .collect();
            self.break_with_guidance(
                node,
                hits,
                format!("every dependency it relies on ({}) is deleted or broken", names.join(", ")),
                format!("Find a replacement for {}", names.join(", ")),
            );
        }
    }

    /// Breaking entries for each hit, or one at the declaration line, plus a
    /// single guidance fix for the node.
    fn break_with_guidance(&mut self, node: &CodeNode, hits: Vec<(u32, String)>, reason: String, guidance: String) {
        let hits = if hits.is_empty() {
            let line = node.line.unwrap_or(1);
            let text = self.cache.line(&node.path, line).unwrap_or_default();
            vec![(line, text)]
        } else {
            hits
        };
        for (line, text) in &hits {
            self.push_breaking(node, *line, text, reason.clone());
        }
        if let Some((line, text)) = hits.first() {
            self.push_fix(&node.id, &node.path, *line, guidance, text, String::new(), false);
        }
    }

    fn modify_signature(&mut self, direct: &BTreeSet<NodeId>, before: &str, after: &str) {
        let graph = self.graph;
        let target = self.target;
        let name = target.declared_name();
        let arity = parse_params(after);

        if let Some(line) = target.line {
            let text = self.cache.line(&target.path, line).unwrap_or_default();
            if !before.is_empty() && before != after && text.contains(before) {
                self.push_fix(
                    &target.id,
                    &target.path,
                    line,
                    format!("Update the declaration of `{}`", name),
                    &text,
                    text.replacen(before, after, 1),
                    true,
                );
            }
        }

        for node in direct.iter().filter_map(|id| graph.node(id)) {
            for (line, text) in self.owned_lines(node) {
                let sites = call_sites(&text, name);
                let mut rewritten = text.clone();
                let mut truncations = 0;
                for site in sites.iter().filter(|s| !arity.accepts(s.args.len())) {
                    let passed = site.args.len();
                    if passed < arity.required {
                        self.push_breaking(
                            node,
                            line,
                            &text,
                            format!(
                                "passes {} argument(s) to `{}`; the new signature requires at least {}",
                                passed, name, arity.required
                            ),
                        );
                        self.push_fix(
                            &node.id,
                            &node.path,
                            line,
                            format!("Pass the missing argument(s) to `{}`", name),
                            &site.text,
                            String::new(),
                            false,
                        );
                    } else {
                        self.push_breaking(
                            node,
                            line,
                            &text,
                            format!(
                                "passes {} argument(s) to `{}`; the new signature accepts at most {}",
                                passed, name, arity.total
                            ),
                        );
                        rewritten = rewritten.replacen(&site.text, &site.truncated(name, arity.total), 1);
                        truncations += 1;
                    }
                }
                if truncations > 0 {
                    self.push_fix(
                        &node.id,
                        &node.path,
                        line,
                        format!("Drop the extra argument(s) to `{}`", name),
                        &text,
                        rewritten,
                        true,
                    );
                }
            }
        }
    }
}
