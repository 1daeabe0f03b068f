//! Nondeterministic automaton compiled from all declared patterns.
//!
//! Consuming edges are labeled with [`PatternSymbol`]s; epsilon edges
//! implement grouping. Edge order within a state is match priority.

pub mod ambiguity;
pub mod builder;
pub mod matcher;

use std::fmt::Write as _;

use crate::pattern::{PatternSymbol, SlotId};

pub use builder::{NfaBuilder, build};
pub use matcher::{AmbiguityPolicy, InputToken, MatchOutcome, Matcher, PatternMatch, TokenKind};

pub type StateId = usize;
pub type PatternId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edge {
    Epsilon(StateId),
    Consume {
        symbol: PatternSymbol,
        /// Value slot bound by this step, for `PatternSymbol::Value` edges.
        slot: Option<SlotId>,
        target: StateId,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    pub edges: Vec<Edge>,
    /// Pattern accepted when input ends in this state.
    pub accept: Option<PatternId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nfa {
    states: Vec<State>,
    start: StateId,
}

impl Nfa {
    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id]
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Render as a Graphviz digraph. `label` names consuming symbols.
    pub fn to_dot(&self, label: impl Fn(PatternSymbol, Option<SlotId>) -> String) -> String {
        let mut out = String::from("digraph nfa {\n  rankdir=LR;\n");
        let _ = writeln!(out, "  start [shape=point];");
        let _ = writeln!(out, "  start -> s{};", self.start);
        for (id, state) in self.states.iter().enumerate() {
            match state.accept {
                Some(pattern) => {
                    let _ = writeln!(
                        out,
                        "  s{id} [shape=doublecircle, label=\"{id}\\np{pattern}\"];"
                    );
                }
                None => {
                    let _ = writeln!(out, "  s{id} [shape=circle, label=\"{id}\"];");
                }
            }
            for edge in &state.edges {
                match edge {
                    Edge::Epsilon(target) => {
                        let _ = writeln!(out, "  s{id} -> s{target} [label=\"ε\", style=dashed];");
                    }
                    Edge::Consume {
                        symbol,
                        slot,
                        target,
                    } => {
                        let text = escape_dot(&label(*symbol, *slot));
                        let _ = writeln!(out, "  s{id} -> s{target} [label=\"{text}\"];");
                    }
                }
            }
        }
        out.push_str("}\n");
        out
    }
}

fn escape_dot(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
