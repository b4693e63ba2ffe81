#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use agrotrace_core::{
    config::ConfigManager,
    errors::SubmissionError,
    form::FormContext,
    services::{MutationClient, Navigator, Notification, Notifier, OutboxClient, Record},
    submission::SubmissionPayload,
};
use chrono::{NaiveDate, Utc};
use once_cell::sync::Lazy;
use tempfile::TempDir;
use uuid::Uuid;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Fresh directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Config manager and outbox backed by a unique directory.
pub fn setup_test_env() -> (ConfigManager, OutboxClient) {
    let base = temp_base();
    let manager = ConfigManager::with_base_dir(base.clone()).expect("create config manager");
    let outbox = OutboxClient::new(base.join("outbox")).expect("create outbox");
    (manager, outbox)
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 14).expect("valid date")
}

pub fn context() -> FormContext {
    FormContext::new(today()).with_company(7).with_establishment(3)
}

/// Mutation client that records payloads and answers with a fixed result.
#[derive(Default)]
pub struct StubClient {
    pub payloads: Vec<SubmissionPayload>,
    pub fail_with: Option<SubmissionError>,
}

impl StubClient {
    pub fn failing(err: SubmissionError) -> Self {
        Self {
            payloads: Vec::new(),
            fail_with: Some(err),
        }
    }
}

impl MutationClient for StubClient {
    fn create(&mut self, payload: &SubmissionPayload) -> Result<Record, SubmissionError> {
        self.payloads.push(payload.clone());
        match &self.fail_with {
            Some(err) => Err(err.clone()),
            None => Ok(Record {
                id: Uuid::new_v4(),
                resource: payload.resource.path(),
                created_at: Utc::now(),
            }),
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub seen: Vec<Notification>,
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, notification: Notification) {
        self.seen.push(notification);
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    pub paths: Vec<String>,
}

impl Navigator for RecordingNavigator {
    fn go_to(&mut self, path: &str) {
        self.paths.push(path.to_string());
    }
}
