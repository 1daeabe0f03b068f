//! Static ambiguity detection over the product automaton `NFA × NFA`.
//!
//! A product node `(p, q, diverged)` stands for two paths that consumed
//! the same tokens and now sit in `p` and `q`; `diverged` records whether
//! they bound those tokens differently. Two different patterns accepting
//! together, or one pattern accepting on both sides after diverging,
//! means some input has more than one reading. Nodes are explored in
//! layers of consumed tokens, so the witness found first is shortest.

use std::collections::HashMap;

use log::debug;

use super::{AmbiguityPolicy, Edge, Nfa, PatternId, StateId};
use crate::pattern::PatternSymbol;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ambiguity {
    /// Both patterns accept `witness`; `first < second`.
    Cross {
        first: PatternId,
        second: PatternId,
        witness: Vec<PatternSymbol>,
    },
    /// The pattern accepts `witness` with two different slot bindings.
    Internal {
        pattern: PatternId,
        witness: Vec<PatternSymbol>,
    },
}

type Node = (StateId, StateId, bool);
type Parent = Option<(Node, Option<PatternSymbol>)>;

/// First ambiguity not permitted by `policy`, if any.
pub fn find_ambiguity(nfa: &Nfa, policy: AmbiguityPolicy) -> Option<Ambiguity> {
    if policy.allow_cross_pattern && policy.allow_internal {
        return None;
    }

    let start: Node = (nfa.start(), nfa.start(), false);
    let mut parents: HashMap<Node, Parent> = HashMap::from([(start, None)]);
    let mut frontier = vec![start];

    while !frontier.is_empty() {
        let mut layer = Vec::new();
        let mut stack = frontier;
        while let Some(node) = stack.pop() {
            if let Some(found) = classify(nfa, node, policy) {
                let witness = witness(&parents, node);
                debug!("ambiguity found after {} tokens", witness.len());
                return Some(match found {
                    Found::Cross(first, second) => Ambiguity::Cross {
                        first,
                        second,
                        witness,
                    },
                    Found::Internal(pattern) => Ambiguity::Internal { pattern, witness },
                });
            }
            for next in epsilon_moves(nfa, node) {
                if !parents.contains_key(&next) {
                    parents.insert(next, Some((node, None)));
                    stack.push(next);
                }
            }
            layer.push(node);
        }

        let mut next_frontier = Vec::new();
        for node in layer {
            for (next, symbol) in consuming_moves(nfa, node) {
                if !parents.contains_key(&next) {
                    parents.insert(next, Some((node, Some(symbol))));
                    next_frontier.push(next);
                }
            }
        }
        frontier = next_frontier;
    }
    None
}

enum Found {
    Cross(PatternId, PatternId),
    Internal(PatternId),
}

fn classify(nfa: &Nfa, (p, q, diverged): Node, policy: AmbiguityPolicy) -> Option<Found> {
    let left = nfa.state(p).accept?;
    let right = nfa.state(q).accept?;
    if left != right && !policy.allow_cross_pattern {
        return Some(Found::Cross(left.min(right), left.max(right)));
    }
    if left == right && diverged && !policy.allow_internal {
        return Some(Found::Internal(left));
    }
    None
}

fn epsilon_moves(nfa: &Nfa, (p, q, diverged): Node) -> Vec<Node> {
    let left = nfa.state(p).edges.iter().filter_map(|e| match e {
        Edge::Epsilon(t) => Some((*t, q, diverged)),
        Edge::Consume { .. } => None,
    });
    let right = nfa.state(q).edges.iter().filter_map(|e| match e {
        Edge::Epsilon(t) => Some((p, *t, diverged)),
        Edge::Consume { .. } => None,
    });
    left.chain(right).collect()
}

fn consuming_moves(nfa: &Nfa, (p, q, diverged): Node) -> Vec<(Node, PatternSymbol)> {
    let mut moves = Vec::new();
    for left in &nfa.state(p).edges {
        let Edge::Consume {
            symbol: s1,
            slot: slot1,
            target: t1,
        } = left
        else {
            continue;
        };
        for right in &nfa.state(q).edges {
            let Edge::Consume {
                symbol: s2,
                slot: slot2,
                target: t2,
            } = right
            else {
                continue;
            };
            if let Some(symbol) = meet(*s1, *s2) {
                moves.push(((*t1, *t2, diverged || slot1 != slot2), symbol));
            }
        }
    }
    moves
}

/// Symbol describing a token both symbols accept, if one exists.
/// Any keyword text is also a valid positional value.
fn meet(a: PatternSymbol, b: PatternSymbol) -> Option<PatternSymbol> {
    match (a, b) {
        (PatternSymbol::Value, PatternSymbol::Value) => Some(PatternSymbol::Value),
        (PatternSymbol::Keyword(k), PatternSymbol::Value)
        | (PatternSymbol::Value, PatternSymbol::Keyword(k)) => Some(PatternSymbol::Keyword(k)),
        (x, y) if x == y => Some(x),
        _ => None,
    }
}

fn witness(parents: &HashMap<Node, Parent>, mut node: Node) -> Vec<PatternSymbol> {
    let mut symbols = Vec::new();
    while let Some(Some((parent, symbol))) = parents.get(&node) {
        if let Some(symbol) = symbol {
            symbols.push(*symbol);
        }
        node = *parent;
    }
    symbols.reverse();
    symbols
}
