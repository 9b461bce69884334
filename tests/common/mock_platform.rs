//! Mock record service for testing
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use moments_relay::error::{Error, Result};
use moments_relay::platform::RecordService;
use moments_relay::types::{Record, RepoConfig};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use super::fixtures::{make_record, make_repo_config};

/// Call record for `create_record`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRecordCall {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

/// Call record for `update_record`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRecordCall {
    pub number: u64,
    pub body: String,
    pub labels: Vec<String>,
}

/// Call record for `upload_file`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCall {
    pub name: String,
    pub size: usize,
    pub message: String,
}

/// Simple mock record service
///
/// Features:
/// - Auto-incrementing record numbers
/// - Seedable remote records and labels
/// - Call tracking for verification
/// - Error injection for failure path testing
pub struct MockRecordService {
    config: RepoConfig,
    next_number: AtomicU64,
    records: Mutex<HashMap<u64, Record>>,
    labels: Mutex<Vec<String>>,
    // Call tracking
    create_calls: Mutex<Vec<CreateRecordCall>>,
    update_calls: Mutex<Vec<UpdateRecordCall>>,
    close_calls: Mutex<Vec<u64>>,
    get_calls: Mutex<Vec<u64>>,
    list_recent_calls: Mutex<Vec<u8>>,
    list_labels_calls: AtomicUsize,
    upload_calls: Mutex<Vec<UploadCall>>,
    // Error injection
    error_on_create: Mutex<Option<String>>,
    error_on_update: Mutex<Option<String>>,
    error_on_close: Mutex<Option<String>>,
    error_on_get: Mutex<Option<String>>,
    error_on_list_labels: Mutex<Option<String>>,
    error_on_upload: Mutex<Option<String>>,
}

impl Default for MockRecordService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRecordService {
    /// Create a mock serving the default label set
    pub fn new() -> Self {
        Self {
            config: make_repo_config(),
            next_number: AtomicU64::new(100),
            records: Mutex::new(HashMap::new()),
            labels: Mutex::new(vec!["moment".into(), "daily".into(), "travel".into()]),
            create_calls: Mutex::new(Vec::new()),
            update_calls: Mutex::new(Vec::new()),
            close_calls: Mutex::new(Vec::new()),
            get_calls: Mutex::new(Vec::new()),
            list_recent_calls: Mutex::new(Vec::new()),
            list_labels_calls: AtomicUsize::new(0),
            upload_calls: Mutex::new(Vec::new()),
            error_on_create: Mutex::new(None),
            error_on_update: Mutex::new(None),
            error_on_close: Mutex::new(None),
            error_on_get: Mutex::new(None),
            error_on_list_labels: Mutex::new(None),
            error_on_upload: Mutex::new(None),
        }
    }

    // === Setup ===

    /// Put a record on the "remote"
    pub fn seed_record(&self, record: Record) {
        self.records.lock().unwrap().insert(record.number, record);
    }

    /// Replace the remote label list
    pub fn set_labels(&self, labels: &[&str]) {
        *self.labels.lock().unwrap() = labels.iter().map(ToString::to_string).collect();
    }

    // === Error injection methods ===

    /// Make `create_record` return an error
    pub fn fail_create(&self, msg: &str) {
        *self.error_on_create.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `update_record` return an error
    pub fn fail_update(&self, msg: &str) {
        *self.error_on_update.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `close_record` return an error
    pub fn fail_close(&self, msg: &str) {
        *self.error_on_close.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `get_record` return an error
    pub fn fail_get(&self, msg: &str) {
        *self.error_on_get.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `list_labels` return an error
    pub fn fail_list_labels(&self, msg: &str) {
        *self.error_on_list_labels.lock().unwrap() = Some(msg.to_string());
    }

    /// Let `list_labels` succeed again
    pub fn clear_list_labels_failure(&self) {
        *self.error_on_list_labels.lock().unwrap() = None;
    }

    /// Make `upload_file` return an error
    pub fn fail_upload(&self, msg: &str) {
        *self.error_on_upload.lock().unwrap() = Some(msg.to_string());
    }

    // === Call verification methods ===

    pub fn get_create_calls(&self) -> Vec<CreateRecordCall> {
        self.create_calls.lock().unwrap().clone()
    }

    pub fn get_update_calls(&self) -> Vec<UpdateRecordCall> {
        self.update_calls.lock().unwrap().clone()
    }

    pub fn get_close_calls(&self) -> Vec<u64> {
        self.close_calls.lock().unwrap().clone()
    }

    pub fn get_get_calls(&self) -> Vec<u64> {
        self.get_calls.lock().unwrap().clone()
    }

    pub fn get_list_recent_calls(&self) -> Vec<u8> {
        self.list_recent_calls.lock().unwrap().clone()
    }

    pub fn list_labels_call_count(&self) -> usize {
        self.list_labels_calls.load(Ordering::SeqCst)
    }

    pub fn get_upload_calls(&self) -> Vec<UploadCall> {
        self.upload_calls.lock().unwrap().clone()
    }

    /// Number of calls that write to the remote
    pub fn write_call_count(&self) -> usize {
        self.get_create_calls().len()
            + self.get_update_calls().len()
            + self.get_close_calls().len()
            + self.get_upload_calls().len()
    }

    fn injected(slot: &Mutex<Option<String>>) -> Result<()> {
        match slot.lock().unwrap().as_ref() {
            Some(msg) => Err(Error::GitHubApi(msg.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RecordService for MockRecordService {
    async fn create_record(&self, title: &str, body: &str, labels: &[String]) -> Result<Record> {
        self.create_calls.lock().unwrap().push(CreateRecordCall {
            title: title.to_string(),
            body: body.to_string(),
            labels: labels.to_vec(),
        });
        Self::injected(&self.error_on_create)?;

        let number = self.next_number.fetch_add(1, Ordering::SeqCst);
        let mut record = make_record(number, body, &[]);
        record.title = title.to_string();
        record.labels = labels.to_vec();
        self.seed_record(record.clone());
        Ok(record)
    }

    async fn update_record(&self, number: u64, body: &str, labels: &[String]) -> Result<Record> {
        self.update_calls.lock().unwrap().push(UpdateRecordCall {
            number,
            body: body.to_string(),
            labels: labels.to_vec(),
        });
        Self::injected(&self.error_on_update)?;

        let mut records = self.records.lock().unwrap();
        let record = records.get_mut(&number).ok_or(Error::RecordNotFound(number))?;
        record.body = body.to_string();
        record.labels = labels.to_vec();
        Ok(record.clone())
    }

    async fn close_record(&self, number: u64) -> Result<()> {
        self.close_calls.lock().unwrap().push(number);
        Self::injected(&self.error_on_close)?;

        if let Some(record) = self.records.lock().unwrap().get_mut(&number) {
            record.open = false;
        }
        Ok(())
    }

    async fn get_record(&self, number: u64) -> Result<Record> {
        self.get_calls.lock().unwrap().push(number);
        Self::injected(&self.error_on_get)?;

        self.records
            .lock()
            .unwrap()
            .get(&number)
            .cloned()
            .ok_or(Error::RecordNotFound(number))
    }

    async fn list_recent_open_records(&self, limit: u8) -> Result<Vec<Record>> {
        self.list_recent_calls.lock().unwrap().push(limit);

        let mut open: Vec<Record> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.open)
            .cloned()
            .collect();
        open.sort_by(|a, b| b.number.cmp(&a.number));
        open.truncate(usize::from(limit));
        Ok(open)
    }

    async fn list_labels(&self) -> Result<Vec<String>> {
        self.list_labels_calls.fetch_add(1, Ordering::SeqCst);
        Self::injected(&self.error_on_list_labels)?;
        Ok(self.labels.lock().unwrap().clone())
    }

    async fn upload_file(&self, name: &str, bytes: &[u8], message: &str) -> Result<String> {
        self.upload_calls.lock().unwrap().push(UploadCall {
            name: name.to_string(),
            size: bytes.len(),
            message: message.to_string(),
        });
        Self::injected(&self.error_on_upload)?;

        Ok(format!(
            "https://raw.githubusercontent.com/{}/{}/main/moments/{name}",
            self.config.owner, self.config.file_repo
        ))
    }
}
