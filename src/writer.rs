// 💾 Whitelist Writer - render and persist the final file

use crate::reconciliation::MemberEntry;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// One admin config line: `Admin=<id>:Whitelist // <PREFIX> <name>`
pub fn whitelist_line(id: &str, name: &str, prefix: &str) -> String {
    format!("Admin={}:Whitelist // {} {}", id, prefix, name)
}

pub fn format_line(entry: &MemberEntry, prefix: &str) -> String {
    whitelist_line(&entry.id, &entry.display_name, prefix)
}

/// Lines joined by `\n` plus one trailing newline; no entries gives `"\n"`
pub fn render_whitelist(entries: &[MemberEntry], prefix: &str) -> String {
    let lines: Vec<String> = entries.iter().map(|e| format_line(e, prefix)).collect();
    let mut body = lines.join("\n");
    body.push('\n');
    body
}

/// Overwrite `path` with the rendered whitelist, creating its directory if needed
pub fn write_whitelist(path: &Path, entries: &[MemberEntry], prefix: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
    }

    fs::write(path, render_whitelist(entries, prefix))
        .with_context(|| format!("Failed to write whitelist: {:?}", path))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(id: &str, name: &str) -> MemberEntry {
        MemberEntry {
            id: id.to_string(),
            display_name: name.to_string(),
        }
    }

    #[test]
    fn test_format_line() {
        assert_eq!(
            format_line(&entry("76561198000000001", "Alice"), "[(JCom)]"),
            "Admin=76561198000000001:Whitelist // [(JCom)] Alice"
        );
    }

    #[test]
    fn test_render_trailing_newline() {
        let body = render_whitelist(&[entry("111", "Alice"), entry("333", "Carol")], "[T]");
        assert_eq!(
            body,
            "Admin=111:Whitelist // [T] Alice\nAdmin=333:Whitelist // [T] Carol\n"
        );
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_whitelist(&[], "[T]"), "\n");
    }

    #[test]
    fn test_write_creates_directory_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/out/whitelist.txt");

        write_whitelist(&path, &[entry("111", "Alice")], "[T]").unwrap();
        write_whitelist(&path, &[entry("222", "bob")], "[T]").unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Admin=222:Whitelist // [T] bob\n"
        );
    }
}
