use crate::cli::JobCommands;
use crate::support::{Context, docket_or_exit, fail, parse_opt_or_exit, parse_or_exit, print_json};
use printdesk_access::Capability;
use printdesk_docket::{JobFilter, JobKey};
use printdesk_store::{Job, JobEdit, JobStatus, Money, PaymentStatus};
use serde_json::json;

pub fn run(ctx: &Context, command: JobCommands) {
    match command {
        JobCommands::Show { id, docket, json } => {
            let key = match (id, docket) {
                (Some(id), _) => JobKey::Id(id),
                (None, Some(docket)) => JobKey::Docket(docket),
                (None, None) => fail("a job ID or --docket is required", false),
            };
            run_show(ctx, &key, json);
        }
        JobCommands::Edit {
            id,
            branch,
            customer,
            contact_person,
            mobile,
            email,
            quantity,
            description,
            product_type,
            paper_type,
            paper_weight,
            paper_size,
            notes,
            print_cost,
            design_cost,
            json,
        } => {
            let edit = JobEdit {
                branch: parse_opt_or_exit(branch.as_deref()),
                customer,
                contact_person,
                mobile_number: mobile,
                email_address: email,
                quantity,
                description,
                product_type_id: product_type,
                paper_type_id: paper_type,
                paper_weight_id: paper_weight,
                paper_size_id: paper_size,
                notes,
                print_cost: parse_opt_or_exit::<Money>(print_cost.as_deref()),
                design_cost: parse_opt_or_exit::<Money>(design_cost.as_deref()),
            };
            run_edit(ctx, id, &edit, json);
        }
        JobCommands::List {
            job_type,
            branch,
            status,
            payment_status,
            json,
        } => {
            let filter = JobFilter {
                job_type: parse_opt_or_exit(job_type.as_deref()),
                branch: parse_opt_or_exit(branch.as_deref()),
                status: parse_opt_or_exit(status.as_deref()),
                payment_status: parse_opt_or_exit(payment_status.as_deref()),
            };
            run_list(ctx, &filter, json);
        }
        JobCommands::Status { id, status, json } => {
            run_status(ctx, id, parse_or_exit(&status), json)
        }
        JobCommands::Payment {
            id,
            status,
            reference,
            json,
        } => run_payment(ctx, id, parse_or_exit(&status), &reference, json),
    }
}

fn run_list(ctx: &Context, filter: &JobFilter, json_output: bool) {
    let grant = ctx.grant_or_exit(Capability::ViewJobs);
    let jobs = docket_or_exit(ctx.job_book().list(&grant, filter));

    if json_output {
        print_json(&json!({
            "action": "job.list",
            "ledgerPath": ctx.ledger_display(),
            "role": grant.role().as_str(),
            "count": jobs.len(),
            "items": jobs
        }));
    } else {
        println!(
            "printdesk job list\n  Path: {}\n  Count: {}",
            ctx.ledger_display(),
            jobs.len()
        );
        for job in &jobs {
            println!(
                "  - {} #{} [{} / {}] {} x{}",
                job.docket_number,
                job.job_id,
                job.status,
                job.payment_status,
                job.customer,
                job.quantity
            );
        }
    }
}

fn run_show(ctx: &Context, key: &JobKey, json_output: bool) {
    let grant = ctx.grant_or_exit(Capability::ViewJobs);
    let job = docket_or_exit(ctx.job_book().get(&grant, key));

    if json_output {
        print_json(&json!({
            "action": "job.show",
            "ledgerPath": ctx.ledger_display(),
            "job": job
        }));
    } else {
        println!(
            "printdesk job show\n  Docket: {} (#{}, {}, {})",
            job.docket_number, job.job_id, job.job_type, job.branch
        );
        println!(
            "  Customer: {} ({}, {})",
            job.customer, job.contact_person, job.mobile_number
        );
        println!("  Work: {} x{}", job.description, job.quantity);
        println!("  Taken by: {} for {}", job.order_taken_by, job.sales_rep);
        println!(
            "  Total: {}\n  Status: {} / {}",
            job.total_cost, job.status, job.payment_status
        );
    }
}

fn run_edit(ctx: &Context, job_id: u64, edit: &JobEdit, json_output: bool) {
    let grant = ctx.grant_or_exit(Capability::EditJob);
    let job = docket_or_exit(ctx.job_book().update(&grant, job_id, edit));
    report("job.edit", ctx, &job, json_output);
}

fn run_status(ctx: &Context, job_id: u64, status: JobStatus, json_output: bool) {
    let grant = ctx.grant_or_exit(Capability::UpdateJobStatus);
    let job = docket_or_exit(ctx.job_book().update_status(&grant, job_id, status));
    report("job.status", ctx, &job, json_output);
}

fn run_payment(
    ctx: &Context,
    job_id: u64,
    payment_status: PaymentStatus,
    reference: &str,
    json_output: bool,
) {
    let grant = ctx.grant_or_exit(Capability::UpdatePayment);
    let job = docket_or_exit(ctx.job_book().update_payment(
        &grant,
        job_id,
        payment_status,
        reference,
    ));
    report("job.payment", ctx, &job, json_output);
}

fn report(action: &str, ctx: &Context, job: &Job, json_output: bool) {
    if json_output {
        print_json(&json!({
            "action": action,
            "ledgerPath": ctx.ledger_display(),
            "job": job
        }));
    } else {
        println!(
            "printdesk {}\n  Updated: {} [{} / {}]",
            action.replace('.', " "),
            job.docket_number,
            job.status,
            job.payment_status
        );
    }
}
