// ⚖️ Reconciliation Engine - roster + additions - removals = whitelist
//
// Order of a run:
//   1. fetch roster ids (fatal on failure)
//   2. resolve roster names (failures become "Unknown")
//   3. append manual additions not already present
//   4. load removals, rewrite the removals file canonically
//   5. drop removed ids
//   6. sort by lowercase display name
//   7. write the whitelist

use crate::config::WhitelistConfig;
use crate::deduplication::DeduplicationEngine;
use crate::manual_lists::{load_additions, load_removals, rewrite_canonical, AdditionEntry};
use crate::parser::is_id_like;
use crate::resolver::NameResolver;
use crate::steam::MemberSource;
use crate::writer::{format_line, write_whitelist};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

// ============================================================================
// MEMBER ENTRY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberEntry {
    pub id: String,
    pub display_name: String,
}

impl MemberEntry {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        MemberEntry {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

// ============================================================================
// RECONCILIATION OUTCOME (pure part of a run)
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationOutcome {
    /// Final entries, sorted by lowercase display name
    pub entries: Vec<MemberEntry>,

    /// Ids added from the manual additions list
    pub additions_applied: Vec<String>,

    /// Additions ignored because the id was already present
    pub additions_skipped: usize,

    /// Entries dropped by the removal filter
    pub removed: usize,
}

/// Resolve a display name for every roster id
///
/// Ids that fail the id heuristic are skipped; repeated ids keep their first occurrence.
pub fn resolve_roster(ids: Vec<String>, resolver: &NameResolver<'_>) -> Vec<MemberEntry> {
    let valid: Vec<String> = ids
        .into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| {
            let ok = is_id_like(id);
            if !ok {
                log::warn!("⚠️ Ignoring roster entry that is not an id: {:?}", id);
            }
            ok
        })
        .collect();

    DeduplicationEngine::new()
        .dedupe(valid, |id| id.as_str())
        .into_iter()
        .map(|id| {
            let name = resolver.resolve_name(&id);
            MemberEntry::new(id, name)
        })
        .collect()
}

/// Merge roster entries with additions, subtract removals, sort
pub fn reconcile(
    roster: Vec<MemberEntry>,
    additions: &[AdditionEntry],
    removal_ids: &HashSet<String>,
    resolver: &NameResolver<'_>,
) -> ReconciliationOutcome {
    let mut outcome = ReconciliationOutcome::default();

    let mut entries = DeduplicationEngine::new().dedupe(roster, |e| e.id.as_str());
    let mut present: HashSet<String> = entries.iter().map(|e| e.id.clone()).collect();

    for addition in additions {
        if present.contains(&addition.id) {
            log::debug!("Manual entry {} already present, keeping existing name", addition.id);
            outcome.additions_skipped += 1;
            continue;
        }

        let name = match &addition.name {
            Some(name) => name.clone(),
            None => resolver.resolve_name(&addition.id),
        };

        log::info!("✅ Added manual entry {} // {}", addition.id, name);
        present.insert(addition.id.clone());
        outcome.additions_applied.push(addition.id.clone());
        entries.push(MemberEntry::new(addition.id.clone(), name));
    }

    if !removal_ids.is_empty() {
        let before = entries.len();
        entries.retain(|e| !removal_ids.contains(&e.id));
        outcome.removed = before - entries.len();
        log::info!("🚫 Removed {} entries via manual removals", outcome.removed);
    }

    // Whole-name ordering, unlike the bucketed order of the removals file
    entries.sort_by_cached_key(|e| e.display_name.to_lowercase());

    outcome.entries = entries;
    outcome
}

// ============================================================================
// RECONCILIATION REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub roster_members: usize,
    pub additions_applied: usize,
    pub additions_skipped: usize,
    pub removal_entries: usize,
    pub removed: usize,
    pub unknown_names: usize,
    pub written: usize,
    pub output_file: PathBuf,
    /// First line of the written file, if any
    pub sample_line: Option<String>,
    pub reconciled_at: DateTime<Utc>,
}

impl ReconciliationReport {
    pub fn summary(&self) -> String {
        format!(
            "{} entries written to {} (roster {}, +{} manual, -{} removed, {} unknown names)",
            self.written,
            self.output_file.display(),
            self.roster_members,
            self.additions_applied,
            self.removed,
            self.unknown_names
        )
    }
}

// ============================================================================
// RECONCILIATION ENGINE
// ============================================================================

pub struct ReconciliationEngine {
    config: WhitelistConfig,
    source: Box<dyn MemberSource>,
}

impl ReconciliationEngine {
    pub fn new(config: WhitelistConfig, source: Box<dyn MemberSource>) -> Self {
        ReconciliationEngine { config, source }
    }

    pub fn config(&self) -> &WhitelistConfig {
        &self.config
    }

    /// Full run: fetch, merge, filter, sort, write
    pub fn run(&self) -> Result<ReconciliationReport> {
        let resolver = NameResolver::new(self.source.as_ref());
        let prefix = &self.config.prefix;

        log::info!("📡 Fetching group member list...");
        let roster_ids = self
            .source
            .fetch_group_members()
            .context("Failed to fetch group member list")?;
        log::info!("✅ Found {} group members", roster_ids.len());

        let roster = resolve_roster(roster_ids, &resolver);
        let roster_members = roster.len();

        let additions = load_additions(&self.config.additions_file)?;

        let removals = load_removals(&self.config.removals_file, &resolver, prefix)?.unwrap_or_default();
        rewrite_canonical(&self.config.removals_file, &removals, prefix)?;

        let outcome = reconcile(roster, &additions, &removals.ids(), &resolver);

        write_whitelist(&self.config.output_file, &outcome.entries, prefix)?;
        log::info!(
            "✅ {} entries written to {}",
            outcome.entries.len(),
            self.config.output_file.display()
        );

        Ok(ReconciliationReport {
            roster_members,
            additions_applied: outcome.additions_applied.len(),
            additions_skipped: outcome.additions_skipped,
            removal_entries: removals.entries.len(),
            removed: outcome.removed,
            unknown_names: resolver.fallbacks(),
            written: outcome.entries.len(),
            output_file: self.config.output_file.clone(),
            sample_line: outcome.entries.first().map(|e| format_line(e, prefix)),
            reconciled_at: Utc::now(),
        })
    }

    /// Canonicalize the removals file only; returns the number of entries in it
    pub fn tidy_removals(&self) -> Result<usize> {
        let resolver = NameResolver::new(self.source.as_ref());
        let prefix = &self.config.prefix;

        match load_removals(&self.config.removals_file, &resolver, prefix)? {
            Some(list) => {
                rewrite_canonical(&self.config.removals_file, &list, prefix)?;
                Ok(list.entries.len())
            }
            None => {
                log::info!("No removals file at {}", self.config.removals_file.display());
                Ok(0)
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
