use crate::cli::GlobalArgs;
use crate::config::Config;
use printdesk_access::{Capability, Grant, Principal, authorize};
use printdesk_catalog::CatalogError;
use printdesk_docket::{DocketAllocator, DocketError, JobBook};
use printdesk_store::LockPolicy;
use serde_json::Value;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

/// Exit status for failures a caller may retry unchanged.
pub const EXIT_RETRYABLE: i32 = 2;

/// Per-invocation settings resolved from flags and `printdesk.toml`.
#[derive(Debug, Clone)]
pub struct Context {
    pub ledger: PathBuf,
    pub lock: LockPolicy,
    pub max_attempts: u32,
    pub principal: Principal,
}

impl Context {
    pub fn resolve_or_exit(global: &GlobalArgs, config: &Config) -> Self {
        let ledger = global
            .ledger
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| config.store.ledger.clone());
        let principal = match &global.as_role {
            Some(role) => Principal::new(global.as_user.clone(), parse_or_exit(role)),
            None => Principal::pending(global.as_user.clone()),
        };
        Self {
            ledger,
            lock: config.lock_policy(),
            max_attempts: config.docket.max_attempts,
            principal,
        }
    }

    pub fn grant_or_exit(&self, capability: Capability) -> Grant {
        authorize(&self.principal, capability).unwrap_or_else(|e| fail(e, false))
    }

    pub fn allocator(&self) -> DocketAllocator {
        DocketAllocator::new(&self.ledger)
            .with_lock_policy(self.lock)
            .with_max_attempts(self.max_attempts)
    }

    pub fn job_book(&self) -> JobBook {
        JobBook::new(&self.ledger).with_lock_policy(self.lock)
    }

    pub fn ledger_display(&self) -> String {
        self.ledger.display().to_string()
    }
}

pub fn fail(err: impl Display, retryable: bool) -> ! {
    eprintln!("error: {err}");
    std::process::exit(if retryable { EXIT_RETRYABLE } else { 1 });
}

pub fn parse_or_exit<T>(raw: &str) -> T
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse().unwrap_or_else(|e| fail(e, false))
}

pub fn parse_opt_or_exit<T>(raw: Option<&str>) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.map(parse_or_exit)
}

pub fn docket_or_exit<T>(result: Result<T, DocketError>) -> T {
    result.unwrap_or_else(|e| {
        let retryable = e.is_retryable();
        fail(e, retryable)
    })
}

pub fn catalog_or_exit<T>(result: Result<T, CatalogError>) -> T {
    result.unwrap_or_else(|e| {
        let retryable = e.is_retryable();
        fail(e, retryable)
    })
}

pub fn print_json(payload: &Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(payload).expect("json serialization")
    );
}
