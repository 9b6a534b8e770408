use std::cell::Cell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tempfile::TempDir;
use whitelist_sync::{FetchError, MemberSource, ReconciliationEngine, WhitelistConfig};

const PREFIX: &str = "[(JCom)]";

/// Roster and profile names served from memory
struct StubSource {
    roster: Option<Vec<&'static str>>,
    names: HashMap<&'static str, &'static str>,
    lookups: Cell<usize>,
}

impl StubSource {
    fn new(roster: &[&'static str], names: &[(&'static str, &'static str)]) -> Self {
        StubSource {
            roster: Some(roster.to_vec()),
            names: names.iter().cloned().collect(),
            lookups: Cell::new(0),
        }
    }

    fn offline() -> Self {
        StubSource {
            roster: None,
            names: HashMap::new(),
            lookups: Cell::new(0),
        }
    }
}

impl MemberSource for StubSource {
    fn fetch_group_members(&self) -> Result<Vec<String>, FetchError> {
        match &self.roster {
            Some(ids) => Ok(ids.iter().map(|s| s.to_string()).collect()),
            None => Err(FetchError::Network("connection refused".to_string())),
        }
    }

    fn fetch_display_name(&self, id: &str) -> Result<String, FetchError> {
        self.lookups.set(self.lookups.get() + 1);
        self.names
            .get(id)
            .map(|n| n.to_string())
            .ok_or_else(|| FetchError::Network(format!("operation timed out ({})", id)))
    }
}

fn config_in(dir: &Path) -> WhitelistConfig {
    WhitelistConfig::default().resolve_paths(dir)
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

#[test]
fn generates_sorted_whitelist_from_all_sources() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());

    fs::write(&config.additions_file, "# manual\n333\n").unwrap();
    fs::write(&config.removals_file, "222\n").unwrap();

    let source = StubSource::new(&["111", "222"], &[("111", "Alice"), ("222", "bob"), ("333", "Carol")]);
    let engine = ReconciliationEngine::new(config.clone(), Box::new(source));

    let report = engine.run().unwrap();

    assert_eq!(
        read(&config.output_file),
        "Admin=111:Whitelist // [(JCom)] Alice\nAdmin=333:Whitelist // [(JCom)] Carol\n"
    );
    assert_eq!(report.roster_members, 2);
    assert_eq!(report.additions_applied, 1);
    assert_eq!(report.removed, 1);
    assert_eq!(report.written, 2);
    assert_eq!(
        report.sample_line.as_deref(),
        Some("Admin=111:Whitelist // [(JCom)] Alice")
    );

    // Removals file was canonicalized as a side effect
    assert_eq!(read(&config.removals_file), "Admin=222:Whitelist // [(JCom)] bob\n");
}

#[test]
fn addition_already_in_roster_is_not_duplicated() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    fs::write(&config.additions_file, "111 // Someone Else\n").unwrap();

    let engine = ReconciliationEngine::new(
        config.clone(),
        Box::new(StubSource::new(&["111"], &[("111", "Alice")])),
    );
    let report = engine.run().unwrap();

    assert_eq!(read(&config.output_file), "Admin=111:Whitelist // [(JCom)] Alice\n");
    assert_eq!(report.additions_skipped, 1);
}

#[test]
fn name_lookup_failure_does_not_abort() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());

    let engine = ReconciliationEngine::new(
        config.clone(),
        Box::new(StubSource::new(&["111", "999"], &[("111", "alice")])),
    );
    let report = engine.run().unwrap();

    assert_eq!(
        read(&config.output_file),
        "Admin=111:Whitelist // [(JCom)] alice\nAdmin=999:Whitelist // [(JCom)] Unknown\n"
    );
    assert_eq!(report.unknown_names, 1);
}

#[test]
fn roster_failure_is_fatal_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    fs::write(&config.removals_file, "222\n").unwrap();

    let engine = ReconciliationEngine::new(config.clone(), Box::new(StubSource::offline()));
    let err = engine.run().unwrap_err();

    assert!(format!("{:#}", err).contains("connection refused"));
    assert!(!config.output_file.exists());
    assert_eq!(read(&config.removals_file), "222\n");
}

#[test]
fn empty_roster_writes_lone_newline() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(dir.path());
    config.output_file = dir.path().join("out/nested/whitelist.txt");

    let engine = ReconciliationEngine::new(config.clone(), Box::new(StubSource::new(&[], &[])));
    engine.run().unwrap();

    assert_eq!(read(&config.output_file), "\n");
    assert!(!config.removals_file.exists());
}

#[test]
fn output_respects_removals_uniqueness_and_order() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());

    fs::write(
        &config.additions_file,
        "500 // erin\n600\n100 // dup of roster\n",
    )
    .unwrap();
    fs::write(
        &config.removals_file,
        "# do not re-add\nAdmin=300:Whitelist // [(JCom)] carl\n",
    )
    .unwrap();

    let source = StubSource::new(
        &["100", "200", "300", "400", "200"],
        &[("100", "Zoe"), ("200", "bea"), ("300", "carl"), ("400", "Adam"), ("600", "Dora")],
    );
    let engine = ReconciliationEngine::new(config.clone(), Box::new(source));
    engine.run().unwrap();

    let output = read(&config.output_file);
    let lines: Vec<&str> = output.lines().collect();
    let ids: Vec<&str> = lines
        .iter()
        .map(|l| l.trim_start_matches("Admin=").split(':').next().unwrap())
        .collect();

    assert_eq!(ids, vec!["400", "200", "600", "500", "100"]);
    assert!(!ids.contains(&"300"));

    let names: Vec<String> = lines
        .iter()
        .map(|l| l.split(PREFIX).nth(1).unwrap().trim().to_lowercase())
        .collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

#[test]
fn second_run_leaves_removals_file_byte_identical() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    fs::write(
        &config.removals_file,
        "# header\n\n300 // carl\n200\nAdmin=100:Whitelist\n",
    )
    .unwrap();

    let names = [("100", "Zoe"), ("200", "bea"), ("300", "carl")];

    ReconciliationEngine::new(config.clone(), Box::new(StubSource::new(&[], &names)))
        .run()
        .unwrap();
    let first = read(&config.removals_file);

    assert_eq!(
        first,
        "# header\n\nAdmin=200:Whitelist // [(JCom)] bea\nAdmin=300:Whitelist // [(JCom)] carl\nAdmin=100:Whitelist // [(JCom)] Zoe\n"
    );

    ReconciliationEngine::new(config.clone(), Box::new(StubSource::new(&[], &[])))
        .run()
        .unwrap();

    assert_eq!(read(&config.removals_file), first);
}

#[test]
fn tidy_removals_only_touches_removals_file() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path());
    fs::write(&config.removals_file, "200 // bea\n100 // Adam\n").unwrap();

    let engine = ReconciliationEngine::new(config.clone(), Box::new(StubSource::offline()));
    assert_eq!(engine.tidy_removals().unwrap(), 2);

    assert_eq!(
        read(&config.removals_file),
        "Admin=100:Whitelist // [(JCom)] Adam\nAdmin=200:Whitelist // [(JCom)] bea\n"
    );
    assert!(!config.output_file.exists());
}
