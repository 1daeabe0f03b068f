//! Multi-state simulation of the pattern automaton over decoded tokens.
//!
//! Every active state carries the slot bindings of the paths that reached
//! it, at most [`MAX_HISTORIES`] distinct ones in priority order. Paths
//! that meet in one state continue identically, so two histories are
//! enough to tell a unique parse from an ambiguous one.

use log::trace;

use super::{Edge, Nfa, PatternId, StateId};
use crate::pattern::{PatternSymbol, SlotId};

const MAX_HISTORIES: usize = 2;

/// How a decoded argument presents itself to the matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Positional text; `forced` when it follows `--` or a
    /// values-only option and therefore never matches a keyword.
    Positional { forced: bool },
    /// Occurrence of the declared option with this index.
    Option(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputToken {
    pub arg_index: usize,
    pub text: String,
    pub kind: TokenKind,
}

impl InputToken {
    pub fn positional(arg_index: usize, text: impl Into<String>) -> Self {
        Self {
            arg_index,
            text: text.into(),
            kind: TokenKind::Positional { forced: false },
        }
    }
}

/// `(slot, token index)` pairs in consumption order.
pub type History = Vec<(SlotId, usize)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub pattern: PatternId,
    pub bindings: History,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched(PatternMatch),
    /// `arg_index` is the argument the walk got stuck on, or the
    /// argument count when input ran out first.
    NoMatch { arg_index: usize },
    /// Candidates ordered by pattern id, then priority. `internal` is set
    /// when one pattern accepted the input with two different bindings.
    Ambiguous {
        candidates: Vec<PatternMatch>,
        internal: bool,
    },
}

/// Which ambiguities may be settled silently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AmbiguityPolicy {
    /// First-declared pattern wins when several accept.
    pub allow_cross_pattern: bool,
    /// Highest-priority (greedy, leftmost) binding wins within a pattern.
    pub allow_internal: bool,
}

impl MatchOutcome {
    /// Settle an ambiguous outcome when `policy` permits.
    pub fn resolve(self, policy: AmbiguityPolicy) -> Self {
        let Self::Ambiguous {
            mut candidates,
            internal,
        } = self
        else {
            return self;
        };

        let Some(first) = candidates.first().map(|c| c.pattern) else {
            return Self::Ambiguous {
                candidates,
                internal,
            };
        };
        let crosses = candidates.iter().any(|c| c.pattern != first);
        let first_count = candidates.iter().filter(|c| c.pattern == first).count();

        if (crosses && !policy.allow_cross_pattern) || (first_count > 1 && !policy.allow_internal)
        {
            return Self::Ambiguous {
                candidates,
                internal,
            };
        }
        Self::Matched(candidates.swap_remove(0))
    }
}

pub struct Matcher<'a> {
    nfa: &'a Nfa,
    keywords: &'a [String],
}

impl<'a> Matcher<'a> {
    pub fn new(nfa: &'a Nfa, keywords: &'a [String]) -> Self {
        Self { nfa, keywords }
    }

    /// Walk `tokens` through the automaton. `arg_count` is the length of
    /// the raw argument vector.
    pub fn run(&self, tokens: &[InputToken], arg_count: usize) -> MatchOutcome {
        let mut active = ActiveSet::new(self.nfa.len());
        active.add(self.nfa, self.nfa.start(), &Vec::new());

        for (index, token) in tokens.iter().enumerate() {
            let mut next = ActiveSet::new(self.nfa.len());
            for &state in &active.order {
                for history in &active.histories[state] {
                    for edge in &self.nfa.state(state).edges {
                        let Edge::Consume {
                            symbol,
                            slot,
                            target,
                        } = edge
                        else {
                            continue;
                        };
                        if !self.accepts(*symbol, token) {
                            continue;
                        }
                        let mut extended = history.clone();
                        if let Some(slot) = slot {
                            extended.push((*slot, index));
                        }
                        next.add(self.nfa, *target, &extended);
                    }
                }
            }
            trace!(
                "token {:?} (arg {}) leaves {} active states",
                token.text,
                token.arg_index,
                next.order.len()
            );
            if next.order.is_empty() {
                return MatchOutcome::NoMatch {
                    arg_index: token.arg_index,
                };
            }
            active = next;
        }

        let mut candidates: Vec<PatternMatch> = Vec::new();
        let mut internal = false;
        for &state in &active.order {
            let Some(pattern) = self.nfa.state(state).accept else {
                continue;
            };
            let histories = &active.histories[state];
            internal |= histories.len() > 1;
            candidates.extend(histories.iter().map(|h| PatternMatch {
                pattern,
                bindings: h.clone(),
            }));
        }
        // Stable: keeps priority order within a pattern.
        candidates.sort_by_key(|c| c.pattern);

        match candidates.len() {
            0 => MatchOutcome::NoMatch {
                arg_index: arg_count,
            },
            1 => MatchOutcome::Matched(candidates.remove(0)),
            _ => MatchOutcome::Ambiguous {
                candidates,
                internal,
            },
        }
    }

    fn accepts(&self, symbol: PatternSymbol, token: &InputToken) -> bool {
        match (symbol, &token.kind) {
            (PatternSymbol::Option(i), TokenKind::Option(j)) => i == *j,
            (PatternSymbol::Value, TokenKind::Positional { .. }) => true,
            (PatternSymbol::Keyword(i), TokenKind::Positional { forced: false }) => {
                self.keywords.get(i).is_some_and(|k| *k == token.text)
            }
            _ => false,
        }
    }
}

/// States reached after the same number of tokens, each with its histories.
struct ActiveSet {
    histories: Vec<Vec<History>>,
    /// Reached states in priority order.
    order: Vec<StateId>,
}

impl ActiveSet {
    fn new(len: usize) -> Self {
        Self {
            histories: vec![Vec::new(); len],
            order: Vec::new(),
        }
    }

    /// Add `state` and its epsilon closure, all reached with `history`.
    fn add(&mut self, nfa: &Nfa, state: StateId, history: &History) {
        let held = &mut self.histories[state];
        if held.len() >= MAX_HISTORIES || held.contains(history) {
            return;
        }
        if held.is_empty() {
            self.order.push(state);
        }
        held.push(history.clone());

        for edge in &nfa.state(state).edges {
            if let Edge::Epsilon(target) = edge {
                self.add(nfa, *target, history);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nfa::build;
    use crate::pattern::PatternNode;
    use rstest::rstest;

    fn kw(i: usize) -> PatternNode {
        PatternNode::Symbol {
            symbol: PatternSymbol::Keyword(i),
            slot: None,
        }
    }

    fn opt(i: usize) -> PatternNode {
        PatternNode::Symbol {
            symbol: PatternSymbol::Option(i),
            slot: None,
        }
    }

    fn val(slot: usize) -> PatternNode {
        PatternNode::Symbol {
            symbol: PatternSymbol::Value,
            slot: Some(slot),
        }
    }

    fn seq(nodes: Vec<PatternNode>) -> PatternNode {
        PatternNode::Sequence(nodes)
    }

    fn positional(texts: &[&str]) -> Vec<InputToken> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| InputToken::positional(i, *t))
            .collect()
    }

    fn run(patterns: &[PatternNode], keywords: &[&str], tokens: &[InputToken]) -> MatchOutcome {
        let nfa = build(patterns.iter().enumerate());
        let keywords: Vec<String> = keywords.iter().map(|k| k.to_string()).collect();
        let arg_count = tokens.last().map_or(0, |t| t.arg_index + 1);
        Matcher::new(&nfa, &keywords).run(tokens, arg_count)
    }

    fn matched(pattern: PatternId, bindings: History) -> MatchOutcome {
        MatchOutcome::Matched(PatternMatch { pattern, bindings })
    }

    // === Unique matches ===

    #[test]
    fn keyword_sequence_binds_slots() {
        let patterns = [seq(vec![kw(0), val(0), val(1)])];
        let outcome = run(&patterns, &["copy"], &positional(&["copy", "a", "b"]));
        assert_eq!(outcome, matched(0, vec![(0, 1), (1, 2)]));
    }

    #[rstest]
    #[case::empty(&[], vec![])]
    #[case::two(&["a.txt", "b.txt"], vec![(0, 0), (0, 1)])]
    fn optional_repeat_binds_every_value(#[case] args: &[&str], #[case] bindings: History) {
        let patterns = [PatternNode::Optional(Box::new(PatternNode::Repeat(Box::new(val(0)))))];
        assert_eq!(run(&patterns, &[], &positional(args)), matched(0, bindings));
    }

    #[test]
    fn second_pattern_selected_by_keyword() {
        let patterns = [seq(vec![kw(0), val(0)]), seq(vec![kw(1), val(0)])];
        let outcome = run(&patterns, &["start", "stop"], &positional(&["stop", "db"]));
        assert_eq!(outcome, matched(1, vec![(0, 1)]));
    }

    #[test]
    fn option_symbol_only_matches_option_tokens() {
        let patterns = [seq(vec![opt(3), val(0)])];
        let tokens = vec![
            InputToken {
                arg_index: 0,
                text: "-m".into(),
                kind: TokenKind::Option(3),
            },
            InputToken::positional(1, "file"),
        ];
        assert_eq!(run(&patterns, &[], &tokens), matched(0, vec![(0, 1)]));

        let as_text = positional(&["-m", "file"]);
        assert_eq!(
            run(&patterns, &[], &as_text),
            MatchOutcome::NoMatch { arg_index: 0 }
        );
    }

    #[test]
    fn forced_positional_never_matches_keyword() {
        let patterns = [kw(0), val(0)];
        let tokens = vec![InputToken {
            arg_index: 1,
            text: "list".into(),
            kind: TokenKind::Positional { forced: true },
        }];
        let nfa = build(patterns.iter().enumerate());
        let keywords = vec!["list".to_string()];
        let outcome = Matcher::new(&nfa, &keywords).run(&tokens, 2);
        assert_eq!(outcome, matched(1, vec![(0, 0)]));
    }

    #[test]
    fn greedy_repeat_leaves_required_tail() {
        // <src>... <dst>
        let patterns = [seq(vec![PatternNode::Repeat(Box::new(val(0))), val(1)])];
        let outcome = run(&patterns, &[], &positional(&["a", "b", "c"]));
        assert_eq!(outcome, matched(0, vec![(0, 0), (0, 1), (1, 2)]));
    }

    // === Failures ===

    #[test]
    fn stuck_token_reports_its_argument() {
        let patterns = [seq(vec![kw(0), val(0)])];
        let outcome = run(&patterns, &["get"], &positional(&["put", "x"]));
        assert_eq!(outcome, MatchOutcome::NoMatch { arg_index: 0 });
    }

    #[test]
    fn extra_token_reports_its_argument() {
        let patterns = [seq(vec![kw(0), val(0)])];
        let outcome = run(&patterns, &["get"], &positional(&["get", "x", "y"]));
        assert_eq!(outcome, MatchOutcome::NoMatch { arg_index: 2 });
    }

    #[test]
    fn exhausted_input_reports_argument_count() {
        let patterns = [seq(vec![kw(0), val(0)])];
        let outcome = run(&patterns, &["get"], &positional(&["get"]));
        assert_eq!(outcome, MatchOutcome::NoMatch { arg_index: 1 });
    }

    // === Ambiguity ===

    #[test]
    fn overlapping_patterns_are_ambiguous() {
        // "-x <v>" and "-x <v> [<w>]" both accept "-x 1"
        let patterns = [
            seq(vec![opt(0), val(0)]),
            seq(vec![opt(0), val(0), PatternNode::Optional(Box::new(val(1)))]),
        ];
        let tokens = vec![
            InputToken {
                arg_index: 0,
                text: "-x".into(),
                kind: TokenKind::Option(0),
            },
            InputToken::positional(1, "1"),
        ];
        let outcome = run(&patterns, &[], &tokens);
        let MatchOutcome::Ambiguous {
            candidates,
            internal,
        } = &outcome
        else {
            panic!("expected ambiguity, got {outcome:?}");
        };
        assert!(!internal);
        assert_eq!(
            candidates.iter().map(|c| c.pattern).collect::<Vec<_>>(),
            vec![0, 1]
        );

        let strict = outcome.clone().resolve(AmbiguityPolicy::default());
        assert!(matches!(strict, MatchOutcome::Ambiguous { .. }));

        let lenient = outcome.resolve(AmbiguityPolicy {
            allow_cross_pattern: true,
            allow_internal: false,
        });
        assert_eq!(lenient, matched(0, vec![(0, 1)]));
    }

    #[test]
    fn two_optional_slots_are_internally_ambiguous() {
        // [<a>] [<b>] with one argument
        let patterns = [seq(vec![
            PatternNode::Optional(Box::new(val(0))),
            PatternNode::Optional(Box::new(val(1))),
        ])];
        let outcome = run(&patterns, &[], &positional(&["x"]));
        let MatchOutcome::Ambiguous { internal, .. } = &outcome else {
            panic!("expected ambiguity, got {outcome:?}");
        };
        assert!(internal);

        let resolved = outcome.resolve(AmbiguityPolicy {
            allow_cross_pattern: false,
            allow_internal: true,
        });
        // greedy: the first optional takes the argument
        assert_eq!(resolved, matched(0, vec![(0, 0)]));
    }

    #[test]
    fn identical_bindings_through_different_paths_are_not_ambiguous() {
        // (-m | -m) <file>: two paths, same bindings
        let patterns = [seq(vec![PatternNode::Alternation(vec![opt(0), opt(0)]), val(0)])];
        let tokens = vec![
            InputToken {
                arg_index: 0,
                text: "-m".into(),
                kind: TokenKind::Option(0),
            },
            InputToken::positional(1, "f"),
        ];
        assert_eq!(run(&patterns, &[], &tokens), matched(0, vec![(0, 1)]));
    }

    #[test]
    fn epsilon_loops_terminate() {
        // [<a>]... accepts any number of values
        let patterns = [PatternNode::Repeat(Box::new(PatternNode::Optional(Box::new(val(0)))))];
        let outcome = run(&patterns, &[], &positional(&["1", "2"]));
        assert_eq!(outcome, matched(0, vec![(0, 0), (0, 1)]));
    }

    #[test]
    fn resolve_leaves_unique_match_untouched() {
        let outcome = matched(2, vec![]);
        assert_eq!(outcome.clone().resolve(AmbiguityPolicy::default()), outcome);
    }
}
