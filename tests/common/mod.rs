// Shared test helpers for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::{TempDir, tempdir};

use media_regress::compare::{
    ComparatorKind, Comparator, ComparisonStrategy, DiffToolEngine, StructuredDiffEngine,
};
use media_regress::config::RunConfig;
use media_regress::core::orchestrator::ComparatorFactory;
use media_regress::infra::log::{Level, Logger, ProgressReporter};
use media_regress::models::{EntryResult, EntryStatus, TestEntry};

/// Stand-in media tool: copies its input to the `-o` path.
///
/// Flags: `--fail N` exits with N, `--sleep S` sleeps first, `--append TEXT`
/// adds a line to the output, `--skip-output` exits 0 without writing,
/// `--stdout/--stderr TEXT` print a line, `--version` prints a version.
pub const FAKE_TOOL: &str = r#"#!/bin/sh
out=""
in=""
append=""
code=0
skip=0
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift 2 ;;
    --fail) code="$2"; shift 2 ;;
    --sleep) sleep "$2"; shift 2 ;;
    --append) append="$2"; shift 2 ;;
    --stdout) echo "$2"; shift 2 ;;
    --stderr) echo "$2" >&2; shift 2 ;;
    --skip-output) skip=1; shift ;;
    --version) echo "faketool 1.2.3"; exit 0 ;;
    *) in="$1"; shift ;;
  esac
done
if [ "$code" -ne 0 ]; then exit "$code"; fi
if [ "$skip" -eq 1 ]; then exit 0; fi
cat "$in" > "$out" || exit 9
if [ -n "$append" ]; then printf '%s\n' "$append" >> "$out"; fi
exit 0
"#;

/// A scratch tree with a fake tool, a sample root, a reference root and a
/// (not yet created) report folder.
pub struct Workspace {
    pub dir: TempDir,
    pub tool: PathBuf,
    pub samples: PathBuf,
    pub references: PathBuf,
    pub reports: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        media_regress::set_language("en");
        let dir = tempdir().expect("Failed to create temporary directory");
        let tool = dir.path().join("bin").join("faketool");
        write_script(&tool, FAKE_TOOL);
        let samples = dir.path().join("samples");
        let references = dir.path().join("references");
        fs::create_dir_all(&samples).expect("Failed to create sample root");
        fs::create_dir_all(&references).expect("Failed to create reference root");
        let reports = dir.path().join("reports");
        Self {
            dir,
            tool,
            samples,
            references,
            reports,
        }
    }

    pub fn sample(&self, rel: &str, content: &str) -> &Self {
        write_file(&self.samples.join(rel), content);
        self
    }

    pub fn reference(&self, rel: &str, content: &str) -> &Self {
        write_file(&self.references.join(rel), content);
        self
    }

    /// A sample and an identical reference.
    pub fn matching(&self, sample: &str, reference: &str, content: &str) -> TestEntry {
        self.sample(sample, content).reference(reference, content);
        TestEntry::new(sample, "", reference)
    }

    /// Configuration pointing at this workspace. Launch retries absorb the
    /// occasional `ETXTBSY` from executing a freshly written script.
    pub fn config(&self) -> RunConfig {
        let mut config = RunConfig::new(&self.tool, &self.samples, &self.references, &self.reports);
        config.launch_retries = 3;
        config
    }

    /// Writes `settings.toml` for this workspace plus `extra` TOML lines.
    pub fn write_settings(&self, extra: &str) -> PathBuf {
        let path = self.dir.path().join("settings.toml");
        let content = format!(
            "tool_path = {:?}\nsample_root = {:?}\nreference_root = {:?}\nreport_folder = {:?}\nlaunch_retries = 3\n{}\n",
            self.tool.display().to_string(),
            self.samples.display().to_string(),
            self.references.display().to_string(),
            self.reports.display().to_string(),
            extra
        );
        fs::write(&path, content).expect("Failed to write settings");
        path
    }

    pub fn write_catalog(&self, entries: &[TestEntry]) -> PathBuf {
        let path = self.dir.path().join("catalog.toml");
        media_regress::catalog::Catalog::new(entries.to_vec())
            .save(&path)
            .expect("Failed to write catalog");
        path
    }

    /// Report files currently in the report folder, sorted.
    pub fn report_files(&self) -> Vec<PathBuf> {
        let Ok(read) = fs::read_dir(&self.reports) else {
            return Vec::new();
        };
        let mut files: Vec<PathBuf> = read
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("report_"))
            })
            .collect();
        files.sort();
        files
    }
}

pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(path, content).expect("Failed to write file");
}

pub fn write_script(path: &Path, body: &str) {
    write_file(path, body);
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))
            .expect("Failed to make script executable");
    }
}

/// A comparator the test keeps a handle to, plus a factory that hands the
/// same instance to the orchestrator.
pub fn shared_comparator(kind: ComparatorKind) -> (Arc<Comparator>, ComparatorFactory) {
    let comparator = Arc::new(match kind {
        ComparatorKind::DiffTool => {
            Comparator::new(kind, DiffToolEngine::new(&["diff".to_string(), "-u".to_string()]))
        }
        ComparatorKind::Structured => Comparator::new(kind, StructuredDiffEngine::full()),
        ComparatorKind::Reduced => Comparator::new(kind, StructuredDiffEngine::reduced()),
    });
    let handle = Arc::clone(&comparator);
    let factory: ComparatorFactory =
        Arc::new(move |_: &RunConfig| Arc::clone(&handle) as Arc<dyn ComparisonStrategy>);
    (comparator, factory)
}

/// Records every progress notification.
#[derive(Default)]
pub struct RecordingProgress {
    pub started: Mutex<Vec<(usize, usize, String)>>,
    pub finished: Mutex<Vec<(usize, usize, String, EntryStatus)>>,
    pub messages: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn started_count(&self) -> usize {
        self.started.lock().unwrap().len()
    }

    pub fn finished_count(&self) -> usize {
        self.finished.lock().unwrap().len()
    }

    pub fn finished_positions(&self) -> Vec<usize> {
        let mut positions: Vec<usize> = self.finished.lock().unwrap().iter().map(|f| f.0).collect();
        positions.sort_unstable();
        positions
    }
}

impl ProgressReporter for RecordingProgress {
    fn report(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }

    fn entry_started(&self, position: usize, total: usize, entry: &TestEntry) {
        self.started
            .lock()
            .unwrap()
            .push((position, total, entry.sample_file.clone()));
    }

    fn entry_finished(&self, position: usize, total: usize, result: &EntryResult) {
        self.finished.lock().unwrap().push((
            position,
            total,
            result.entry.sample_file.clone(),
            result.status.clone(),
        ));
    }
}

/// Records every log line.
#[derive(Default)]
pub struct RecordingLogger {
    pub lines: Mutex<Vec<(Level, String)>>,
}

impl RecordingLogger {
    pub fn at(&self, level: Level) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl Logger for RecordingLogger {
    fn log(&self, level: Level, message: &str) {
        self.lines.lock().unwrap().push((level, message.to_string()));
    }
}
