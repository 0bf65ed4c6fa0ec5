use super::{colorize_state, json_pretty, short, EXIT_SUCCESS};
use serde::Serialize;
use strata_core::Engine;
use strata_schema::{EnvironmentStatus, RequestContext};

#[derive(Serialize)]
struct EnvironmentSummary {
    id: String,
    name: String,
    tenant_id: String,
    version: u64,
    status: EnvironmentStatus,
}

pub fn run(
    engine: &Engine,
    ctx: &RequestContext,
    all_tenants: bool,
    json: bool,
) -> Result<u8, String> {
    let tenant = (!all_tenants).then_some(&ctx.tenant_id);
    let envs = engine
        .environments()
        .list(tenant)
        .map_err(|e| e.to_string())?;

    let mut rows = Vec::with_capacity(envs.len());
    for env in envs {
        let status = engine
            .environments()
            .status(&env.id)
            .map_err(|e| e.to_string())?;
        rows.push(EnvironmentSummary {
            id: env.id.into_inner(),
            name: env.name,
            tenant_id: env.tenant_id.into_inner(),
            version: env.version,
            status,
        });
    }

    if json {
        println!("{}", json_pretty(&rows)?);
    } else if rows.is_empty() {
        println!("no environments found");
    } else {
        println!(
            "{:<14} {:<20} {:<12} {:<8} STATUS",
            "ID", "NAME", "TENANT", "VERSION"
        );
        for row in &rows {
            println!(
                "{:<14} {:<20} {:<12} {:<8} {}",
                short(&row.id),
                row.name,
                row.tenant_id,
                row.version,
                colorize_state(&row.status.to_string())
            );
        }
    }
    Ok(EXIT_SUCCESS)
}
