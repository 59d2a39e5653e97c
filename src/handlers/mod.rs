// handlers/mod.rs - Handler tiers
//
// Public (no auth): service description and health
// Protected (bearer token, tenant resolved per request): /api/*
pub mod protected;
pub mod public;
