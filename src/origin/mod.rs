//! Origin hub access
//!
//! The remote side of the mirror: raw metadata and refs fetches, and
//! resolution of symbolic revisions to commits.

pub mod client;
pub mod resolver;

pub use client::{
    ForwardRequest, HttpOriginClient, OriginClient, OriginError, OriginResponse, extract_headers,
    forwardable_headers,
};
pub use resolver::{CommitResolver, HubCommitResolver, ResolveError, Resolution};
