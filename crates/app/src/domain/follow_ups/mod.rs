//! Follow-up history lookups backing pricing decisions and candidate exclusion.

pub(crate) mod repository;
