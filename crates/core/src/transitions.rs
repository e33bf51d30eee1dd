//! Transition graphs
//!
//! A [`TransitionGraph`] maps every state of a closed enumeration to the states it may move to
//! next. Graphs are assembled once (see the `LazyLock` statics next to each state enum) and are
//! never mutated afterwards.

use std::{fmt, hash::Hash};

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use thiserror::Error;

/// Legal next states for a single state.
pub type NextStates<S> = SmallVec<[S; 5]>;

/// An immutable map from each state to the states it may move to.
#[derive(Debug, Clone)]
pub struct TransitionGraph<S> {
    edges: FxHashMap<S, NextStates<S>>,
}

impl<S> TransitionGraph<S>
where
    S: Copy + Eq + Hash,
{
    /// Builds a graph from `(from, [to, ...])` pairs.
    ///
    /// States that never appear as a `from` key are terminal.
    pub fn new<I, N>(edges: I) -> Self
    where
        I: IntoIterator<Item = (S, N)>,
        N: IntoIterator<Item = S>,
    {
        Self {
            edges: edges
                .into_iter()
                .map(|(from, to)| (from, to.into_iter().collect()))
                .collect(),
        }
    }

    /// The states reachable from `from` in one step.
    pub fn allowed(&self, from: S) -> &[S] {
        self.edges.get(&from).map_or(&[], |next| next.as_slice())
    }

    /// Whether `from -> to` is a legal edge.
    pub fn is_allowed(&self, from: S, to: S) -> bool {
        self.allowed(from).contains(&to)
    }

    /// Whether `state` has no outgoing edges.
    pub fn is_terminal(&self, state: S) -> bool {
        self.allowed(state).is_empty()
    }

    /// Validates `from -> to`, reporting the legal set on rejection.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] when the edge is not part of the graph.
    pub fn check(&self, from: S, to: S) -> Result<S, TransitionError<S>> {
        if self.is_allowed(from, to) {
            Ok(to)
        } else {
            Err(TransitionError {
                from,
                to,
                allowed: self.allowed(from).iter().copied().collect(),
            })
        }
    }
}

/// An attempted transition that is not part of the graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot transition from {from} to {to}{}", allowed_suffix(.from, .allowed))]
pub struct TransitionError<S> {
    /// State the transition started from.
    pub from: S,

    /// State the caller tried to reach.
    pub to: S,

    /// States that are legal from `from`.
    pub allowed: NextStates<S>,
}

fn allowed_suffix<S: fmt::Display>(from: &S, allowed: &[S]) -> String {
    if allowed.is_empty() {
        return format!(" ({from} is terminal)");
    }

    let states: Vec<String> = allowed.iter().map(ToString::to_string).collect();

    format!(" (allowed: {})", states.join(", "))
}
