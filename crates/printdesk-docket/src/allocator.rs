//! Docket sequence allocation.
//!
//! LOCAL numbers come from the LOCAL counter: `current + 1`, stepping past any
//! number a job already holds. The counter row and the job row are written in
//! the same ledger transaction, so a failed insert never burns a number.

use crate::docket::{MAX_DOCKET_LEN, format_local_docket, local_docket_suffix};
use crate::error::DocketError;
use chrono::{DateTime, Utc};
use printdesk_access::{Capability, Grant};
use printdesk_store::{
    Job, JobDraft, JobType, Ledger, LedgerError, LockPolicy, mutate_ledger_jsonl,
    read_ledger_jsonl,
};
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Counter state as shown to operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterView {
    pub job_type: JobType,
    pub current_number: u64,
    pub next_number: u64,
}

fn successor(number: u64, job_type: JobType) -> Result<u64, DocketError> {
    number
        .checked_add(1)
        .ok_or(DocketError::Exhausted { job_type })
}

/// First LOCAL number at or after `start` that no job holds.
fn first_free_local(ledger: &Ledger, start: u64) -> Result<u64, DocketError> {
    let mut candidate = start;
    while ledger.docket_in_use(&format_local_docket(candidate)) {
        tracing::debug!(
            docket = %format_local_docket(candidate),
            "docket number taken; skipping"
        );
        candidate = successor(candidate, JobType::Local)?;
    }
    Ok(candidate)
}

/// The number the next allocation in `job_type` would produce right now.
///
/// An absent counter reads as 0. Nothing is reserved. A counter already at
/// `u64::MAX` has no next number.
pub fn peek_next_in(ledger: &Ledger, job_type: JobType) -> Result<u64, DocketError> {
    let next = successor(ledger.current_number(job_type), job_type)?;
    match job_type {
        JobType::Local => first_free_local(ledger, next),
        JobType::Foreign => Ok(next),
    }
}

pub fn counter_view(ledger: &Ledger, job_type: JobType) -> Result<CounterView, DocketError> {
    Ok(CounterView {
        job_type,
        current_number: ledger.current_number(job_type),
        next_number: peek_next_in(ledger, job_type)?,
    })
}

/// Allocate a docket number for `draft` and insert the job.
///
/// On error the ledger may hold a freshly created counter row but no job and
/// no counter advance; callers discard it by not saving.
pub fn allocate_in(
    ledger: &mut Ledger,
    draft: JobDraft,
    now: DateTime<Utc>,
) -> Result<Job, DocketError> {
    draft.validate()?;
    match draft.job_type {
        JobType::Local => allocate_local(ledger, draft, now),
        JobType::Foreign => allocate_foreign(ledger, draft, now),
    }
}

fn allocate_local(
    ledger: &mut Ledger,
    mut draft: JobDraft,
    now: DateTime<Utc>,
) -> Result<Job, DocketError> {
    if let Some(supplied) = draft.docket_number.take()
        && !supplied.trim().is_empty()
    {
        return Err(DocketError::ValidationFailed(format!(
            "LOCAL docket numbers are generated; drop {supplied:?}"
        )));
    }

    ledger.ensure_counter(JobType::Local, now);
    let number = peek_next_in(ledger, JobType::Local)?;
    let docket_number = format_local_docket(number);
    let job = draft.into_job(ledger.next_job_id(), docket_number, now)?;

    let job = match ledger.insert_job(job) {
        Ok(job) => job.clone(),
        Err(LedgerError::DuplicateDocket(docket_number)) => {
            return Err(DocketError::Conflict {
                docket_number,
                generated: true,
            });
        }
        Err(err) => return Err(err.into()),
    };
    ledger.advance_counter(JobType::Local, number, now);

    tracing::info!(
        docket = %job.docket_number,
        job_id = job.job_id,
        "allocated LOCAL docket"
    );
    Ok(job)
}

fn allocate_foreign(
    ledger: &mut Ledger,
    mut draft: JobDraft,
    now: DateTime<Utc>,
) -> Result<Job, DocketError> {
    let docket_number = draft
        .docket_number
        .take()
        .map(|raw| raw.trim().to_string())
        .unwrap_or_default();
    if docket_number.is_empty() {
        return Err(DocketError::ValidationFailed(
            "FOREIGN jobs require a docket number".to_string(),
        ));
    }
    if docket_number.chars().count() > MAX_DOCKET_LEN {
        return Err(DocketError::ValidationFailed(format!(
            "docket number longer than {MAX_DOCKET_LEN} characters: {docket_number}"
        )));
    }

    let job = draft.into_job(ledger.next_job_id(), docket_number, now)?;
    let job = ledger.insert_job(job)?.clone();
    tracing::info!(
        docket = %job.docket_number,
        job_id = job.job_id,
        "recorded FOREIGN docket"
    );
    Ok(job)
}

/// Realign a counter with the dockets actually in use.
///
/// For LOCAL, the counter moves up to the highest `LOC-<n>` held by a LOCAL
/// job; it never moves down. FOREIGN counters are only created. Returns the
/// resulting view and whether the ledger changed.
pub fn resync_in(
    ledger: &mut Ledger,
    job_type: JobType,
    now: DateTime<Utc>,
) -> Result<(CounterView, bool), DocketError> {
    let created = ledger.ensure_counter(job_type, now);
    let mut advanced = false;

    if job_type == JobType::Local {
        let highest = ledger
            .jobs()
            .filter(|job| job.job_type == JobType::Local)
            .filter_map(|job| local_docket_suffix(&job.docket_number))
            .max();
        if let Some(highest) = highest {
            let stored = ledger.current_number(job_type);
            if highest >= stored {
                advanced = ledger.advance_counter(job_type, highest, now);
            }
            if advanced {
                tracing::info!(from = stored, to = highest, "resynced LOCAL docket counter");
            }
        }
    }

    Ok((counter_view(ledger, job_type)?, created || advanced))
}

/// Run `attempt` until it succeeds, fails for good, or `max_attempts` runs
/// have collided on a generated number.
///
/// `insert_job` is the store's uniqueness backstop behind the pick made by
/// `first_free_local`; a generated collision reruns the whole transaction.
fn retry_generated_conflicts<T>(
    max_attempts: u32,
    mut attempt: impl FnMut() -> Result<T, DocketError>,
) -> Result<T, DocketError> {
    let mut tries = 1;
    loop {
        match attempt() {
            Err(DocketError::Conflict {
                docket_number,
                generated: true,
            }) if tries < max_attempts => {
                tracing::warn!(
                    docket = %docket_number,
                    attempt = tries,
                    max_attempts,
                    "generated docket collided; retrying allocation"
                );
                tries += 1;
            }
            other => return other,
        }
    }
}

/// File-backed allocator over one ledger.
#[derive(Debug, Clone)]
pub struct DocketAllocator {
    ledger_path: PathBuf,
    lock: LockPolicy,
    max_attempts: u32,
}

impl DocketAllocator {
    pub fn new(ledger_path: impl Into<PathBuf>) -> Self {
        Self {
            ledger_path: ledger_path.into(),
            lock: LockPolicy::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_lock_policy(mut self, lock: LockPolicy) -> Self {
        self.lock = lock;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }

    /// Allocate a docket number and persist the job in one transaction.
    ///
    /// A collision on a generated number restarts the whole transaction, up to
    /// `max_attempts` times.
    pub fn allocate(&self, grant: &Grant, draft: JobDraft) -> Result<Job, DocketError> {
        grant.require(Capability::CreateJob)?;

        retry_generated_conflicts(self.max_attempts, || {
            let job = mutate_ledger_jsonl(&self.ledger_path, &self.lock, |ledger| {
                allocate_in(ledger, draft.clone(), Utc::now()).map(|job| (job, true))
            })?;
            Ok(job)
        })
    }

    /// Read-only preview of the next number. Takes no lock.
    pub fn peek_next(&self, grant: &Grant, job_type: JobType) -> Result<u64, DocketError> {
        grant.require(Capability::ViewDocketCounter)?;
        let ledger = read_ledger_jsonl(&self.ledger_path)?;
        peek_next_in(&ledger, job_type)
    }

    pub fn resync(&self, grant: &Grant, job_type: JobType) -> Result<CounterView, DocketError> {
        grant.require(Capability::ViewDocketCounter)?;
        let view = mutate_ledger_jsonl(&self.ledger_path, &self.lock, |ledger| {
            resync_in(ledger, job_type, Utc::now())
        })?;
        Ok(view)
    }
}
