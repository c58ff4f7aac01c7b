// Career Pathway Advisor
// Implements: wizard catalogs, quiz scoring, prompt building, response sanitizing,
// and the recommendation requester.
// All LLM calls go through llm_client — no direct provider calls here.

pub mod catalog;
pub mod handlers;
pub mod prompts;
pub mod requester;
pub mod sanitize;
