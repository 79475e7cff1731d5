// Resume coaching helpers.
// Implements: STAR rewrite of a single bullet, project idea for a missing skill.
// Both are one provider call each; they share the analysis retry budget and error mapping.

pub mod handlers;
pub mod prompts;
pub mod writer;
