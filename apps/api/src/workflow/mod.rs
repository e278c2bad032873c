// Proposal workflow: the four steps that fill the template, and their HTTP handlers.
// Step 1-3 go through the text generator (with deterministic fallback); Step 4 renders locally.
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod proposal;
pub mod steps;
