// Wizard sessions: a per-session draft cache that lives until restart.
// The advisor never reads from here; the client resubmits the essay with the profile.

pub mod handlers;
pub mod store;
