// Whitelist Sync - Core Library
// Builds the server whitelist from a Steam group roster plus manual lists

pub mod config;
pub mod parser;         // Identity Normalizer - line shapes → (id, name)
pub mod steam;          // Member source - roster + profile names
pub mod resolver;       // Name Resolver - "Unknown" on failure
pub mod manual_lists;   // Manual additions / removals
pub mod deduplication;  // One entry per id
pub mod reconciliation; // Reconciliation Engine - drives a run
pub mod writer;         // Whitelist file output

// Re-export commonly used types
pub use config::{WhitelistConfig, UNKNOWN_NAME};
pub use parser::{
    LineForm, ParsedLine,
    is_id_like, is_comment_or_blank, parse_line, parse_pair_line,
};
pub use steam::{FetchError, MemberSource, SteamCommunityClient};
pub use resolver::{NameResolver, strip_prefix_tag};
pub use manual_lists::{
    AdditionEntry, RemovalEntry, RemovalList,
    load_additions, load_removals, render_removals, rewrite_canonical,
};
pub use deduplication::{DeduplicationEngine, DuplicateMatch};
pub use reconciliation::{
    MemberEntry, ReconciliationEngine, ReconciliationOutcome, ReconciliationReport,
    reconcile, resolve_roster,
};
pub use writer::{format_line, render_whitelist, write_whitelist};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
