//! In-memory host fakes for handler tests.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use oaspages_shared::{OasPagesError, Result};

use crate::host::{BuildUtils, CommandRunner, ToolCache};

/// One command as the runner saw it.
#[derive(Debug, Clone)]
pub struct RecordedCommand {
    pub command: String,
    pub cwd: Option<PathBuf>,
    /// Contents of the `--options` file at the moment the command ran.
    pub options: Option<String>,
}

/// Records commands instead of running them.
#[derive(Default)]
pub struct RecordingRunner {
    commands: Mutex<Vec<RecordedCommand>>,
    fail_on: Option<String>,
}

impl RecordingRunner {
    /// A runner that fails any command containing `needle`.
    pub fn failing_on(needle: &str) -> Self {
        Self {
            fail_on: Some(needle.to_string()),
            ..Self::default()
        }
    }

    pub fn commands(&self) -> Vec<RecordedCommand> {
        self.commands.lock().unwrap().clone()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.commands().into_iter().map(|c| c.command).collect()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, command: &str, cwd: Option<&Path>) -> Result<()> {
        let options = options_arg(command).and_then(|path| std::fs::read_to_string(path).ok());
        self.commands.lock().unwrap().push(RecordedCommand {
            command: command.to_string(),
            cwd: cwd.map(Path::to_path_buf),
            options,
        });

        match &self.fail_on {
            Some(needle) if command.contains(needle.as_str()) => {
                Err(OasPagesError::command(command, "exited with exit status: 1"))
            }
            _ => Ok(()),
        }
    }
}

fn options_arg(command: &str) -> Option<String> {
    let args = shell_words::split(command).ok()?;
    let pos = args.iter().position(|a| a == "--options")?;
    args.get(pos + 1).cloned()
}

/// Cache call log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheCall {
    Has(String),
    Save(String),
    Restore(String),
}

/// Tool cache backed by a set of present keys.
#[derive(Default)]
pub struct MemoryCache {
    keys: Mutex<HashSet<String>>,
    calls: Mutex<Vec<CacheCall>>,
    broken_restore: bool,
}

impl MemoryCache {
    pub fn with_key(key: &str) -> Self {
        let cache = Self::default();
        cache.keys.lock().unwrap().insert(key.to_string());
        cache
    }

    /// Reports `key` as present but fails to restore it.
    pub fn with_stale_key(key: &str) -> Self {
        Self {
            broken_restore: true,
            ..Self::with_key(key)
        }
    }

    pub fn calls(&self) -> Vec<CacheCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn saves(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, CacheCall::Save(_)))
            .count()
    }
}

#[async_trait]
impl ToolCache for MemoryCache {
    async fn has(&self, key: &str) -> Result<bool> {
        self.calls.lock().unwrap().push(CacheCall::Has(key.to_string()));
        Ok(self.keys.lock().unwrap().contains(key))
    }

    async fn save(&self, key: &str) -> Result<bool> {
        self.calls.lock().unwrap().push(CacheCall::Save(key.to_string()));
        self.keys.lock().unwrap().insert(key.to_string());
        Ok(true)
    }

    async fn restore(&self, key: &str) -> Result<bool> {
        self.calls
            .lock()
            .unwrap()
            .push(CacheCall::Restore(key.to_string()));
        Ok(!self.broken_restore && self.keys.lock().unwrap().contains(key))
    }
}

pub fn utils<'a>(run: &'a RecordingRunner, cache: &'a MemoryCache) -> BuildUtils<'a> {
    BuildUtils { run, cache }
}

/// Write `bundle.zip` into `workdir` holding `site.bson` encoded from `doc`.
pub fn write_bundle(workdir: &Path, doc: &bson::Document) {
    let mut bytes = Vec::new();
    doc.to_writer(&mut bytes).unwrap();

    let file = std::fs::File::create(workdir.join("bundle.zip")).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file("site.bson", zip::write::SimpleFileOptions::default())
        .unwrap();
    zip.write_all(&bytes).unwrap();
    zip.finish().unwrap();
}
