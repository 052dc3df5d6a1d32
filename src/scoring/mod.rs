//! Concern scoring for canonical products.
//!
//! - [`rules`]: the ordered, data-driven table of penalty rules.
//! - [`concern`]: entry point that applies a rule table and maps the
//!   clamped score to a [`ConcernLevel`](crate::models::ConcernLevel).
//! - [`nutrition`]: informational nutrient-based health score.

pub mod concern;
pub mod nutrition;
pub mod rules;
