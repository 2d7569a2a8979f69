//! Fake remote stores shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{DateTime, FixedOffset};
use synch_core::{FileName, FileRecord};
use synch_sync::{RemoteError, RemoteStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Upload(String),
    Replace(String),
    Delete(String),
}

pub fn ts(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).expect("timestamp")
}

pub fn record(name: &str, modified: &str) -> FileRecord {
    FileRecord::file(name, ts(modified), format!("disk:/backup/{name}"))
}

// ---------------------------------------------------------------------------
// Scripted remote: fixed listing, configurable per-file failures
// ---------------------------------------------------------------------------

pub struct ScriptedRemote {
    listing: Option<Vec<FileRecord>>,
    failing: HashSet<String>,
    conflicting: HashSet<String>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedRemote {
    pub fn with_listing(listing: Vec<FileRecord>) -> Self {
        Self {
            listing: Some(listing),
            failing: HashSet::new(),
            conflicting: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A remote whose listing call always fails.
    pub fn unreachable() -> Self {
        Self {
            listing: None,
            ..Self::with_listing(Vec::new())
        }
    }

    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn conflicting_on(mut self, name: &str) -> Self {
        self.conflicting.insert(name.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than `List`.
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| *c != Call::List)
            .collect()
    }

    fn outcome(&self, name: &FileName) -> Result<(), RemoteError> {
        if self.conflicting.contains(name.as_str()) {
            return Err(RemoteError::Conflict(format!("{name} already exists")));
        }
        if self.failing.contains(name.as_str()) {
            return Err(RemoteError::Transport("connection reset".to_string()));
        }
        Ok(())
    }
}

impl RemoteStore for ScriptedRemote {
    fn list(&self) -> Result<Vec<FileRecord>, RemoteError> {
        self.calls.lock().unwrap().push(Call::List);
        self.listing
            .clone()
            .ok_or_else(|| RemoteError::Transport("timed out".to_string()))
    }

    fn upload(&self, name: &FileName) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(Call::Upload(name.0.clone()));
        self.outcome(name)
    }

    fn replace(&self, name: &FileName) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(Call::Replace(name.0.clone()));
        self.outcome(name)
    }

    fn delete(&self, name: &FileName) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(Call::Delete(name.0.clone()));
        self.outcome(name)
    }
}

// ---------------------------------------------------------------------------
// In-memory remote: deterministic store that stamps writes with server time
// ---------------------------------------------------------------------------

pub struct InMemoryRemote {
    files: Mutex<Vec<FileRecord>>,
    server_time: DateTime<FixedOffset>,
    calls: Mutex<Vec<Call>>,
}

impl InMemoryRemote {
    pub fn new(files: Vec<FileRecord>, server_time: &str) -> Self {
        Self {
            files: Mutex::new(files),
            server_time: ts(server_time),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self
            .files
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.name.0.clone())
            .collect();
        names.sort();
        names
    }

    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }
}

impl RemoteStore for InMemoryRemote {
    fn list(&self) -> Result<Vec<FileRecord>, RemoteError> {
        self.calls.lock().unwrap().push(Call::List);
        Ok(self.files.lock().unwrap().clone())
    }

    fn upload(&self, name: &FileName) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(Call::Upload(name.0.clone()));
        let mut files = self.files.lock().unwrap();
        if files.iter().any(|r| &r.name == name) {
            return Err(RemoteError::Conflict(name.to_string()));
        }
        files.push(FileRecord::file(
            name.clone(),
            self.server_time,
            format!("disk:/backup/{name}"),
        ));
        Ok(())
    }

    fn replace(&self, name: &FileName) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(Call::Replace(name.0.clone()));
        let mut files = self.files.lock().unwrap();
        match files.iter_mut().find(|r| &r.name == name) {
            Some(existing) => existing.modified_at = self.server_time,
            None => files.push(FileRecord::file(
                name.clone(),
                self.server_time,
                format!("disk:/backup/{name}"),
            )),
        }
        Ok(())
    }

    fn delete(&self, name: &FileName) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(Call::Delete(name.0.clone()));
        let mut files = self.files.lock().unwrap();
        let before = files.len();
        files.retain(|r| &r.name != name);
        if files.len() == before {
            return Err(RemoteError::NotFound(name.to_string()));
        }
        Ok(())
    }
}
