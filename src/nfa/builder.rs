//! Thompson construction from [`PatternNode`] trees.

use log::debug;

use super::{Edge, Nfa, PatternId, State, StateId};
use crate::pattern::PatternNode;

/// Sub-automaton with one entry and one exit. The exit never has
/// outgoing edges until the enclosing construct adds them.
#[derive(Debug, Clone, Copy)]
struct Fragment {
    start: StateId,
    end: StateId,
}

/// Incrementally compiles patterns into one automaton whose start state
/// forks to each pattern in the order they were added.
#[derive(Debug)]
pub struct NfaBuilder {
    states: Vec<State>,
    start: StateId,
}

impl Default for NfaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NfaBuilder {
    pub fn new() -> Self {
        Self {
            states: vec![State::default()],
            start: 0,
        }
    }

    pub fn add_pattern(&mut self, id: PatternId, root: &PatternNode) {
        let fragment = self.compile(root);
        self.epsilon(self.start, fragment.start);
        self.states[fragment.end].accept = Some(id);
    }

    pub fn build(self) -> Nfa {
        debug!("built NFA with {} states", self.states.len());
        Nfa {
            states: self.states,
            start: self.start,
        }
    }

    fn add_state(&mut self) -> StateId {
        self.states.push(State::default());
        self.states.len() - 1
    }

    fn epsilon(&mut self, from: StateId, to: StateId) {
        self.states[from].edges.push(Edge::Epsilon(to));
    }

    fn compile(&mut self, node: &PatternNode) -> Fragment {
        match node {
            PatternNode::Symbol { symbol, slot } => {
                let start = self.add_state();
                let end = self.add_state();
                self.states[start].edges.push(Edge::Consume {
                    symbol: *symbol,
                    slot: *slot,
                    target: end,
                });
                Fragment { start, end }
            }

            PatternNode::Sequence(nodes) => {
                let Some((first, rest)) = nodes.split_first() else {
                    let state = self.add_state();
                    return Fragment {
                        start: state,
                        end: state,
                    };
                };
                let head = self.compile(first);
                let mut end = head.end;
                for node in rest {
                    let next = self.compile(node);
                    self.epsilon(end, next.start);
                    end = next.end;
                }
                Fragment {
                    start: head.start,
                    end,
                }
            }

            PatternNode::Alternation(branches) => {
                let start = self.add_state();
                let fragments: Vec<Fragment> = branches.iter().map(|b| self.compile(b)).collect();
                let end = self.add_state();
                for fragment in fragments {
                    self.epsilon(start, fragment.start);
                    self.epsilon(fragment.end, end);
                }
                Fragment { start, end }
            }

            // Entering the group comes before skipping it, so the greedy
            // reading has priority.
            PatternNode::Optional(inner) => {
                let start = self.add_state();
                let body = self.compile(inner);
                let end = self.add_state();
                self.epsilon(start, body.start);
                self.epsilon(start, end);
                self.epsilon(body.end, end);
                Fragment { start, end }
            }

            // Looping back comes before leaving.
            PatternNode::Repeat(inner) => {
                let start = self.add_state();
                let body = self.compile(inner);
                let end = self.add_state();
                self.epsilon(start, body.start);
                self.epsilon(body.end, body.start);
                self.epsilon(body.end, end);
                Fragment { start, end }
            }
        }
    }
}

/// Compile `(id, root)` pairs, in order, into one automaton.
pub fn build<'n>(patterns: impl IntoIterator<Item = (PatternId, &'n PatternNode)>) -> Nfa {
    let mut builder = NfaBuilder::new();
    for (id, root) in patterns {
        builder.add_pattern(id, root);
    }
    builder.build()
}
