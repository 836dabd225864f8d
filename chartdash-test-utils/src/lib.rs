//! Test utilities for the dashboard analytics core
//!
//! This crate provides record builders and mock collaborators for testing
//! aggregation, caching, and alerting behavior.

pub mod builders;
pub mod mocks;

// Re-export commonly used types
pub use builders::{CampaignBuilder, ContributionBuilder, MembershipBuilder, PledgeBuilder};
pub use mocks::{CapturingTransport, FailingCache};
