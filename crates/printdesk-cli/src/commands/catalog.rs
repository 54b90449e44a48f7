use crate::cli::CatalogCommands;
use crate::support::{Context, catalog_or_exit, parse_or_exit, print_json};
use printdesk_access::Capability;
use printdesk_catalog::{CustomSizeRequest, PaperCatalog};
use printdesk_store::{Millimeters, PaperSize, PaperWeight, ProductTypeSpecification};
use serde::Serialize;
use serde_json::json;

pub fn run(ctx: &Context, command: CatalogCommands) {
    let catalog = PaperCatalog::new(&ctx.ledger).with_lock_policy(ctx.lock);
    match command {
        CatalogCommands::AddProductType {
            name,
            description,
            json,
        } => {
            let grant = ctx.grant_or_exit(Capability::ManageCatalog);
            let item = catalog_or_exit(catalog.add_product_type(&grant, &name, &description));
            report_added(ctx, "catalog.add-product-type", &item, &item.name, json);
        }
        CatalogCommands::AddPaperType {
            name,
            description,
            json,
        } => {
            let grant = ctx.grant_or_exit(Capability::ManageCatalog);
            let item = catalog_or_exit(catalog.add_paper_type(&grant, &name, &description));
            report_added(ctx, "catalog.add-paper-type", &item, &item.name, json);
        }
        CatalogCommands::AddWeight {
            gsm,
            paper_types,
            json,
        } => {
            let grant = ctx.grant_or_exit(Capability::ManageCatalog);
            let item = catalog_or_exit(catalog.add_paper_weight(&grant, gsm, &paper_types));
            report_added(ctx, "catalog.add-weight", &item, &format!("{gsm} GSM"), json);
        }
        CatalogCommands::AddSize {
            name,
            series,
            width,
            height,
            weights,
            json,
        } => {
            let grant = ctx.grant_or_exit(Capability::ManageCatalog);
            let item = catalog_or_exit(catalog.add_paper_size(
                &grant,
                &name,
                parse_or_exit(&series),
                parse_or_exit::<Millimeters>(&width),
                parse_or_exit::<Millimeters>(&height),
                &weights,
            ));
            report_added(ctx, "catalog.add-size", &item, &item.name, json);
        }
        CatalogCommands::LinkWeight {
            weight,
            paper_type,
            json,
        } => {
            let grant = ctx.grant_or_exit(Capability::ManageCatalog);
            let added =
                catalog_or_exit(catalog.link_weight_to_paper_type(&grant, weight, paper_type));
            report_link(ctx, "catalog.link-weight", weight, paper_type, added, json);
        }
        CatalogCommands::LinkSize { size, weight, json } => {
            let grant = ctx.grant_or_exit(Capability::ManageCatalog);
            let added = catalog_or_exit(catalog.link_size_to_weight(&grant, size, weight));
            report_link(ctx, "catalog.link-size", size, weight, added, json);
        }
        CatalogCommands::SetSpec {
            product_type,
            paper_types,
            weights,
            sizes,
            json,
        } => {
            let grant = ctx.grant_or_exit(Capability::ManageCatalog);
            let spec = catalog_or_exit(catalog.set_specification(
                &grant,
                ProductTypeSpecification {
                    product_type_id: product_type,
                    paper_type_ids: paper_types.into_iter().collect(),
                    paper_weight_ids: weights.into_iter().collect(),
                    paper_size_ids: sizes.into_iter().collect(),
                },
            ));
            report_added(
                ctx,
                "catalog.set-spec",
                &spec,
                &format!("product type {product_type}"),
                json,
            );
        }
        CatalogCommands::SeedSizes { json } => {
            let grant = ctx.grant_or_exit(Capability::ManageCatalog);
            let report = catalog_or_exit(catalog.seed_standard_sizes(&grant));
            if json {
                print_json(&json!({
                    "action": "catalog.seed-sizes",
                    "ledgerPath": ctx.ledger_display(),
                    "created": report.created,
                    "updated": report.updated,
                    "linksAdded": report.links_added
                }));
            } else {
                println!(
                    "printdesk catalog seed-sizes\n  Created: {}\n  Updated: {}\n  Links added: {}",
                    report.created, report.updated, report.links_added
                );
            }
        }
        CatalogCommands::Weights { paper_type, json } => {
            let grant = ctx.grant_or_exit(Capability::BrowseCatalog);
            let weights = catalog_or_exit(catalog.compatible_weights(&grant, paper_type));
            report_weights(ctx, &weights, json);
        }
        CatalogCommands::Sizes { weight, json } => {
            let grant = ctx.grant_or_exit(Capability::BrowseCatalog);
            let sizes = catalog_or_exit(catalog.compatible_sizes(&grant, weight));
            report_sizes(ctx, "catalog.sizes", &sizes, json);
        }
        CatalogCommands::Spec { product_type, json } => {
            let grant = ctx.grant_or_exit(Capability::BrowseCatalog);
            let view = catalog_or_exit(catalog.specification_for(&grant, product_type));
            if json {
                print_json(&json!({
                    "action": "catalog.spec",
                    "ledgerPath": ctx.ledger_display(),
                    "productTypeId": view.product_type_id,
                    "paperTypes": view.paper_types,
                    "paperWeights": view.paper_weights,
                    "paperSizes": view.paper_sizes
                }));
            } else {
                println!(
                    "printdesk catalog spec\n  Product type: {}\n  Paper types: {}",
                    view.product_type_id,
                    join(view.paper_types.iter().map(|t| t.name.clone()))
                );
                println!(
                    "  Weights: {}\n  Sizes: {}",
                    join(view.paper_weights.iter().map(|w| format!("{} GSM", w.gsm))),
                    join(view.paper_sizes.iter().map(|s| s.name.clone()))
                );
            }
        }
        CatalogCommands::CustomSize {
            width,
            height,
            weight,
            name,
            json,
        } => {
            let grant = ctx.grant_or_exit(Capability::CreateCustomSize);
            let request = CustomSizeRequest::new(width, height, weight).named(name);
            let resolution = catalog_or_exit(catalog.resolve_or_create_size(&grant, &request));
            if json {
                print_json(&json!({
                    "action": "catalog.custom-size",
                    "ledgerPath": ctx.ledger_display(),
                    "created": resolution.created,
                    "size": resolution.size
                }));
            } else {
                let size = &resolution.size;
                println!(
                    "printdesk catalog custom-size\n  {}: {} ({} x {} mm)",
                    if resolution.created { "Created" } else { "Resolved" },
                    size.name,
                    size.width_mm,
                    size.height_mm
                );
            }
        }
    }
}

fn join(items: impl Iterator<Item = String>) -> String {
    let items: Vec<String> = items.collect();
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

fn report_added<T: Serialize>(
    ctx: &Context,
    action: &str,
    item: &T,
    label: &str,
    json_output: bool,
) {
    if json_output {
        print_json(&json!({
            "action": action,
            "ledgerPath": ctx.ledger_display(),
            "item": item
        }));
    } else {
        println!(
            "printdesk {}\n  Saved: {label}\n  Path: {}",
            action.replacen('.', " ", 1),
            ctx.ledger_display()
        );
    }
}

fn report_link(ctx: &Context, action: &str, from: u64, to: u64, added: bool, json_output: bool) {
    if json_output {
        print_json(&json!({
            "action": action,
            "ledgerPath": ctx.ledger_display(),
            "from": from,
            "to": to,
            "added": added
        }));
    } else {
        println!(
            "printdesk {}\n  {from} -> {to}: {}",
            action.replacen('.', " ", 1),
            if added { "linked" } else { "already linked" }
        );
    }
}

fn report_weights(ctx: &Context, weights: &[PaperWeight], json_output: bool) {
    if json_output {
        print_json(&json!({
            "action": "catalog.weights",
            "ledgerPath": ctx.ledger_display(),
            "count": weights.len(),
            "items": weights
        }));
    } else {
        println!("printdesk catalog weights\n  Count: {}", weights.len());
        for weight in weights {
            println!("  - #{} {} GSM", weight.id, weight.gsm);
        }
    }
}

fn report_sizes(ctx: &Context, action: &str, sizes: &[PaperSize], json_output: bool) {
    if json_output {
        print_json(&json!({
            "action": action,
            "ledgerPath": ctx.ledger_display(),
            "count": sizes.len(),
            "items": sizes
        }));
    } else {
        println!(
            "printdesk {}\n  Count: {}",
            action.replacen('.', " ", 1),
            sizes.len()
        );
        for size in sizes {
            println!(
                "  - #{} {} [{}] {} x {} mm",
                size.id, size.name, size.series, size.width_mm, size.height_mm
            );
        }
    }
}
