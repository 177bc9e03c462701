#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use potluck::SyncError;
use potluck::record::Submission;
use potluck::remote::{SheetBackend, is_acknowledged};
use tokio::sync::Semaphore;

pub const HEADER: &str = "name,item,qty,note,createdAt";

/// In-memory sheet: serves a CSV body and records writes
pub struct FakeSheet {
    csv: Mutex<String>,
    reply: Mutex<String>,
    fail_reads: AtomicBool,
    publish_writes: AtomicBool,
    hold_reads: AtomicBool,
    hold_writes: AtomicBool,
    read_gate: Semaphore,
    write_gate: Semaphore,
    fetches: AtomicUsize,
    writes: Mutex<Vec<Submission>>,
}

impl FakeSheet {
    pub fn new(rows: &[&str]) -> Self {
        let mut csv = String::from(HEADER);
        for row in rows {
            csv.push('\n');
            csv.push_str(row);
        }
        FakeSheet {
            csv: Mutex::new(csv),
            reply: Mutex::new("ok".to_string()),
            fail_reads: AtomicBool::new(false),
            publish_writes: AtomicBool::new(false),
            hold_reads: AtomicBool::new(false),
            hold_writes: AtomicBool::new(false),
            read_gate: Semaphore::new(0),
            write_gate: Semaphore::new(0),
            fetches: AtomicUsize::new(0),
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn push_row(&self, row: &str) {
        let mut csv = self.csv.lock().unwrap();
        csv.push('\n');
        csv.push_str(row);
    }

    pub fn set_reply(&self, body: &str) {
        *self.reply.lock().unwrap() = body.to_string();
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Successful writes show up in later reads, with the sheet's own timestamp.
    pub fn publish_writes(&self, publish: bool) {
        self.publish_writes.store(publish, Ordering::SeqCst);
    }

    /// Reads are counted, then wait until `release_read` lets one through.
    pub fn hold_reads(&self, hold: bool) {
        self.hold_reads.store(hold, Ordering::SeqCst);
    }

    pub fn release_read(&self) {
        self.read_gate.add_permits(1);
    }

    pub fn hold_writes(&self) {
        self.hold_writes.store(true, Ordering::SeqCst);
    }

    /// Let the oldest held write through.
    pub fn release_write(&self) {
        self.write_gate.add_permits(1);
    }

    /// Let every held write through and stop holding new ones.
    pub fn release_writes(&self) {
        self.hold_writes.store(false, Ordering::SeqCst);
        self.write_gate.close();
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> Vec<Submission> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl SheetBackend for FakeSheet {
    async fn fetch_csv(&self) -> Result<String, SyncError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.hold_reads.load(Ordering::SeqCst) {
            if let Ok(permit) = self.read_gate.acquire().await {
                permit.forget();
            }
        }
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(SyncError::Fetch("sheet unreachable".to_string()));
        }
        Ok(self.csv.lock().unwrap().clone())
    }

    async fn append(&self, submission: &Submission) -> Result<(), SyncError> {
        if self.hold_writes.load(Ordering::SeqCst) {
            // Closed gate means released for good
            if let Ok(permit) = self.write_gate.acquire().await {
                permit.forget();
            }
        }
        self.writes.lock().unwrap().push(submission.clone());

        let reply = self.reply.lock().unwrap().clone();
        if !is_acknowledged(&reply) {
            return Err(SyncError::write_rejected(&reply));
        }
        if self.publish_writes.load(Ordering::SeqCst) {
            self.push_row(&format!(
                "{},{},{},{},2099-01-01 00:00:00",
                submission.name.trim(),
                submission.item.trim(),
                submission.qty.trim(),
                submission.note.trim()
            ));
        }
        Ok(())
    }
}
