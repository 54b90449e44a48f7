use crate::cli::DocketCommands;
use crate::support::{Context, docket_or_exit, parse_or_exit, print_json};
use printdesk_access::Capability;
use printdesk_docket::format_local_docket;
use printdesk_store::{JobDraft, JobType, Money};
use serde_json::json;

pub fn run(ctx: &Context, command: DocketCommands) {
    match command {
        DocketCommands::Allocate {
            job_type,
            docket,
            branch,
            customer,
            product_type,
            quantity,
            print_cost,
            design_cost,
            sales_rep,
            order_taken_by,
            contact_person,
            mobile,
            email,
            description,
            paper_type,
            paper_weight,
            paper_size,
            notes,
            json,
        } => {
            let mut draft = JobDraft::new(
                parse_or_exit(&job_type),
                parse_or_exit(&branch),
                customer,
                product_type,
                quantity,
                parse_or_exit::<Money>(&print_cost),
            );
            draft.docket_number = docket;
            draft.design_cost = parse_or_exit(&design_cost);
            draft.sales_rep = sales_rep.unwrap_or_else(|| ctx.principal.name.clone());
            draft.order_taken_by = order_taken_by.unwrap_or_else(|| ctx.principal.name.clone());
            draft.contact_person = contact_person;
            draft.mobile_number = mobile;
            draft.email_address = email;
            draft.description = description;
            draft.paper_type_id = paper_type;
            draft.paper_weight_id = paper_weight;
            draft.paper_size_id = paper_size;
            draft.notes = notes;
            run_allocate(ctx, draft, json);
        }
        DocketCommands::Peek { job_type, json } => run_peek(ctx, parse_or_exit(&job_type), json),
        DocketCommands::Resync { job_type, json } => {
            run_resync(ctx, parse_or_exit(&job_type), json)
        }
    }
}

fn run_allocate(ctx: &Context, draft: JobDraft, json_output: bool) {
    let grant = ctx.grant_or_exit(Capability::CreateJob);
    let job = docket_or_exit(ctx.allocator().allocate(&grant, draft));

    if json_output {
        print_json(&json!({
            "action": "docket.allocate",
            "ledgerPath": ctx.ledger_display(),
            "job": job
        }));
    } else {
        println!(
            "printdesk docket allocate\n  Docket: {}\n  Job: {} ({}, {})\n  Total: {}\n  Path: {}",
            job.docket_number,
            job.job_id,
            job.job_type,
            job.branch,
            job.total_cost,
            ctx.ledger_display()
        );
    }
}

fn run_peek(ctx: &Context, job_type: JobType, json_output: bool) {
    let grant = ctx.grant_or_exit(Capability::ViewDocketCounter);
    let next = docket_or_exit(ctx.allocator().peek_next(&grant, job_type));
    let docket = match job_type {
        JobType::Local => Some(format_local_docket(next)),
        JobType::Foreign => None,
    };

    if json_output {
        print_json(&json!({
            "action": "docket.peek",
            "ledgerPath": ctx.ledger_display(),
            "jobType": job_type,
            "nextNumber": next,
            "docketNumber": docket
        }));
    } else {
        println!(
            "printdesk docket peek\n  Type: {job_type}\n  Next: {}",
            docket.unwrap_or_else(|| next.to_string())
        );
    }
}

fn run_resync(ctx: &Context, job_type: JobType, json_output: bool) {
    let grant = ctx.grant_or_exit(Capability::ViewDocketCounter);
    let view = docket_or_exit(ctx.allocator().resync(&grant, job_type));

    if json_output {
        print_json(&json!({
            "action": "docket.resync",
            "ledgerPath": ctx.ledger_display(),
            "jobType": view.job_type,
            "currentNumber": view.current_number,
            "nextNumber": view.next_number
        }));
    } else {
        println!(
            "printdesk docket resync\n  Type: {}\n  Current: {}\n  Next: {}",
            view.job_type, view.current_number, view.next_number
        );
    }
}
