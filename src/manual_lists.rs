// 📝 Manual Lists - curated additions and removals
// Additions are read as-is; removals are normalized into canonical whitelist lines
//
// Loading and rewriting the removals file are separate steps: `load_removals`
// only reads (and resolves names), `rewrite_canonical` is the explicit side effect.

use crate::parser::{is_comment_or_blank, parse_line, parse_pair_line};
use crate::resolver::{strip_prefix_tag, NameResolver};
use crate::writer::whitelist_line;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

// ============================================================================
// ADDITIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionEntry {
    pub id: String,
    /// Name as written; resolved later only if the id is actually added
    pub name: Option<String>,
    pub line_number: usize,
}

/// Load `manual_additions.txt`; a missing file means no additions
pub fn load_additions(path: &Path) -> Result<Vec<AdditionEntry>> {
    if !path.exists() {
        log::debug!("No additions file at {:?}", path);
        return Ok(Vec::new());
    }

    log::info!("📝 Loading manual additions from {}", path.display());
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read additions file: {:?}", path))?;

    Ok(parse_additions(&content))
}

pub fn parse_additions(content: &str) -> Vec<AdditionEntry> {
    let mut additions = Vec::new();

    for (index, line) in content.lines().enumerate() {
        if is_comment_or_blank(line) {
            continue;
        }

        match parse_pair_line(line) {
            Some(parsed) => additions.push(AdditionEntry {
                id: parsed.id,
                name: parsed.name,
                line_number: index + 1,
            }),
            None => log::warn!("⚠️ Skipping unparsable addition on line {}: {:?}", index + 1, line.trim()),
        }
    }

    additions
}

// ============================================================================
// REMOVALS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalEntry {
    pub id: String,
    /// Canonical name, keeps the prefix tag if the file carried one
    pub display_name: String,
    /// Name without the prefix tag, used for ordering
    pub sort_name: String,
    /// Line exactly as read
    pub source_line: String,
    pub line_number: usize,
}

impl RemovalEntry {
    /// `Admin=<id>:Whitelist // <PREFIX> <name>`, tag not repeated
    pub fn canonical_line(&self, prefix: &str) -> String {
        if self.display_name.starts_with(prefix) {
            format!("Admin={}:Whitelist // {}", self.id, self.display_name)
        } else {
            whitelist_line(&self.id, &self.display_name, prefix)
        }
    }

    /// (first character, full name, id), all lowercase except the id
    pub fn sort_key(&self) -> (String, String, String) {
        let basis = if self.sort_name.is_empty() {
            &self.id
        } else {
            &self.sort_name
        };

        let first = basis
            .chars()
            .next()
            .map(|c| c.to_lowercase().collect::<String>())
            .unwrap_or_default();

        (first, self.sort_name.to_lowercase(), self.id.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalList {
    /// Blank and `#` lines in file order, verbatim
    pub comments: Vec<String>,
    /// Entries in canonical order
    pub entries: Vec<RemovalEntry>,
}

impl RemovalList {
    /// Membership filter for reconciliation
    pub fn ids(&self) -> HashSet<String> {
        self.entries.iter().map(|e| e.id.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Load `manual_removals.txt`; `None` when the file does not exist
pub fn load_removals(
    path: &Path,
    resolver: &NameResolver<'_>,
    prefix: &str,
) -> Result<Option<RemovalList>> {
    if !path.exists() {
        log::debug!("No removals file at {:?}", path);
        return Ok(None);
    }

    log::info!("🗑️ Loading manual removals from {}", path.display());
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read removals file: {:?}", path))?;

    let list = parse_removals(&content, resolver, prefix);
    log::info!("🗑️ Loaded {} removal entries", list.entries.len());

    Ok(Some(list))
}

pub fn parse_removals(content: &str, resolver: &NameResolver<'_>, prefix: &str) -> RemovalList {
    let mut list = RemovalList::default();

    for (index, line) in content.lines().enumerate() {
        if is_comment_or_blank(line) {
            list.comments.push(line.to_string());
            continue;
        }

        let Some(parsed) = parse_line(line) else {
            log::warn!("⚠️ Skipping unparsable removal on line {}: {:?}", index + 1, line.trim());
            continue;
        };

        log::debug!("Removal line {} parsed as {}", index + 1, parsed.form.name());

        let (display_name, sort_name) = match parsed.name {
            Some(name) => {
                let sort_name = strip_prefix_tag(&name, prefix).to_string();
                (name, sort_name)
            }
            None => {
                let name = resolver.resolve_name(&parsed.id);
                (name.clone(), name)
            }
        };

        list.entries.push(RemovalEntry {
            id: parsed.id,
            display_name,
            sort_name,
            source_line: line.to_string(),
            line_number: index + 1,
        });
    }

    list.entries.sort_by_cached_key(RemovalEntry::sort_key);
    list
}

/// Canonical file body: comment block, separator, one line per entry
pub fn render_removals(list: &RemovalList, prefix: &str) -> String {
    let mut comments = list.comments.as_slice();
    while let Some((last, rest)) = comments.split_last() {
        if !last.trim().is_empty() {
            break;
        }
        comments = rest;
    }

    let mut lines: Vec<String> = comments.to_vec();
    if !lines.is_empty() && !list.entries.is_empty() {
        lines.push(String::new());
    }
    lines.extend(list.entries.iter().map(|e| e.canonical_line(prefix)));

    if lines.is_empty() {
        return String::new();
    }

    let mut body = lines.join("\n");
    body.push('\n');
    body
}

/// Rewrite the removals file in canonical form
///
/// A list without entries leaves the file untouched. Returns whether the
/// file was written.
pub fn rewrite_canonical(path: &Path, list: &RemovalList, prefix: &str) -> Result<bool> {
    if list.is_empty() {
        log::debug!("No removal entries, leaving {:?} untouched", path);
        return Ok(false);
    }

    fs::write(path, render_removals(list, prefix))
        .with_context(|| format!("Failed to rewrite removals file: {:?}", path))?;

    log::info!("🧹 Rewrote {} in canonical order", path.display());
    Ok(true)
}

// ============================================================================
// TESTS
// ============================================================================
