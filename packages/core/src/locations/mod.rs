//! Location lookups
//!
//! Turns a list of Sierra location codes into labels, URLs, addresses and
//! seven-day opening hours.

pub mod branches;
pub mod providers;
pub mod query;
pub mod resolver;

pub use branches::{Branch, BranchRule, BranchRules};
pub use providers::{
    BranchData, BranchDataProvider, ClosureFeedProvider, ReferenceDataProvider, UrlTableProvider,
};
pub use query::{Fields, LocationParams, LocationQuery};
pub use resolver::{LocationRecord, LocationResolver, LocationsResponse, Providers, ResolverSettings};
