//! Client for the repository hosting REST API.
//!
//! Provides token-based authentication, milestone lookup, release creation
//! and asset upload through a common trait, with the HTTP layer behind a
//! mockable transport.

/// Configuration and authentication for the API connection.
pub mod config;

/// GitHub API client implementation for GitHub.com and Enterprise.
pub mod github;

/// Authenticated requests, status validation and response decoding.
pub mod request;

/// Retry policy for transient transport failures.
pub mod retry;

/// Common traits for the repository client.
pub mod traits;

/// Shared data types for milestones, issues, pull requests and releases.
pub mod types;
