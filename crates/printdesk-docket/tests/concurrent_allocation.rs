use printdesk_access::{Capability, Principal, Role, authorize};
use printdesk_docket::{DocketAllocator, format_local_docket};
use printdesk_store::{Branch, JobDraft, JobType, Ledger, LockPolicy, Money, read_ledger_jsonl};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

fn temp_ledger_path(prefix: &str) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    let root = std::env::temp_dir().join(format!(
        "printdesk-docket-it-{prefix}-{}-{unique}",
        std::process::id()
    ));
    fs::create_dir_all(&root).expect("temp dir should be created");
    root.join("ledger.jsonl")
}

fn seed_ledger(path: &Path, occupied: &[&str]) {
    let mut ledger = Ledger::default();
    ledger
        .add_product_type("Banners", "")
        .expect("product type should add");
    for docket in occupied {
        let job = JobDraft::new(
            JobType::Local,
            Branch::Eastlea,
            "Walk-in",
            1,
            1,
            Money::from_cents(100),
        )
        .into_job(ledger.next_job_id(), docket.to_string(), chrono::Utc::now())
        .expect("job should build");
        ledger.insert_job(job).expect("job should insert");
    }
    ledger.save_jsonl(path).expect("ledger should save");
}

#[test]
fn concurrent_allocations_never_share_a_docket() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 4;

    let path = temp_ledger_path("race");
    seed_ledger(&path, &["LOC-003", "LOC-007"]);

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|worker| {
            let path = path.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let allocator = DocketAllocator::new(&path).with_lock_policy(LockPolicy {
                    timeout: Duration::from_secs(30),
                    poll_interval: Duration::from_millis(5),
                });
                let grant = authorize(
                    &Principal::new(format!("rep-{worker}"), Role::SalesRepresentative),
                    Capability::CreateJob,
                )
                .expect("sales rep may create jobs");
                barrier.wait();
                (0..PER_THREAD)
                    .map(|_| {
                        let mut draft = JobDraft::new(
                            JobType::Local,
                            Branch::Msasa,
                            "Acme Ltd",
                            1,
                            5,
                            Money::from_cents(2500),
                        );
                        draft.sales_rep = grant.name().to_string();
                        draft.order_taken_by = grant.name().to_string();
                        draft.contact_person = "Front desk".to_string();
                        draft.mobile_number = "0242 700 700".to_string();
                        draft.description = "Roll-up banner".to_string();
                        allocator
                            .allocate(&grant, draft)
                            .expect("allocation should succeed")
                            .docket_number
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut issued = BTreeSet::new();
    for handle in handles {
        for docket in handle.join().expect("worker should finish") {
            assert!(issued.insert(docket.clone()), "docket issued twice: {docket}");
        }
    }
    assert_eq!(issued.len(), THREADS * PER_THREAD);
    assert!(!issued.contains("LOC-003"));
    assert!(!issued.contains("LOC-007"));

    let ledger = read_ledger_jsonl(&path).expect("ledger should reload");
    assert_eq!(ledger.jobs().count(), THREADS * PER_THREAD + 2);
    let highest = ledger.current_number(JobType::Local);
    // 32 allocations over 1..=34 with 3 and 7 skipped.
    assert_eq!(highest, 34);
    assert!(issued.contains(&format_local_docket(highest)));
}
