//! HTTP handlers for the portal surface.

pub mod admin;
pub mod health;
pub mod notes;
pub mod profile;
