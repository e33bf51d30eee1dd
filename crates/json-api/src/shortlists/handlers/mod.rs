//! Shortlist Handlers

pub(crate) mod approve_pricing;
pub(crate) mod archive;
pub(crate) mod cancel;
pub(crate) mod decline_pricing;
pub(crate) mod deliver;
pub(crate) mod events;
pub(crate) mod extend_search;
pub(crate) mod get;
pub(crate) mod index;
pub(crate) mod list_candidates;
pub(crate) mod mark_paid;
pub(crate) mod no_match;
pub(crate) mod outcome;
pub(crate) mod price_suggestion;
pub(crate) mod process;
pub(crate) mod propose_scope;
pub(crate) mod reinclude_candidate;
pub(crate) mod resolve_settlement;
pub(crate) mod submit;
pub(crate) mod suggest_adjustment;
pub(crate) mod update_candidate;
