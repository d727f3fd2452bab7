// Ticket queue report: recompute contract statuses and print the ranked ticket queue as JSON.
//
// Usage:
//   cargo run --bin ticket_queue_report -- [db_path] [--apply]
//
// db_path defaults to $CRM_DB_PATH or the user data directory.
// --apply writes the status sweep back to the contract tables.
// CRM_LOG_FORMAT=json switches stderr logs to JSON lines.

use anyhow::{bail, Context};
use crm_core::config::{ConfigManager, EngineConfigReader};
use crm_core::db::{get_default_db_path, open_sqlite_connection};
use crm_core::i18n::{set_locale, t_with_args};
use crm_core::repository::CrmSnapshotRepository;
use crm_core::{logging, Clock, StatusResolver, TicketQueue, TicketScorer};
use serde_json::json;
use std::path::Path;
use std::sync::{Arc, Mutex};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_from_env();

    let mut db_path: Option<String> = None;
    let mut apply = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--apply" => apply = true,
            other if db_path.is_none() => db_path = Some(other.to_string()),
            other => bail!("unexpected argument: {}", other),
        }
    }
    let db_path = db_path.unwrap_or_else(get_default_db_path);

    if !Path::new(&db_path).exists() {
        bail!(t_with_args("report.db_not_found", &[("path", &db_path)]));
    }

    let conn = Arc::new(Mutex::new(
        open_sqlite_connection(&db_path).with_context(|| format!("open {}", db_path))?,
    ));

    let config = ConfigManager::from_connection(conn.clone())
        .map_err(|e| anyhow::anyhow!("config init failed: {}", e))?;
    let locale = config
        .get_locale()
        .await
        .map_err(|e| anyhow::anyhow!("read locale failed: {}", e))?;
    set_locale(&locale);
    let clock: Arc<dyn Clock> = Arc::new(
        config
            .build_clock()
            .await
            .map_err(|e| anyhow::anyhow!("read clock config failed: {}", e))?,
    );

    let repo = CrmSnapshotRepository::from_connection(conn);
    let snapshot = repo.load_snapshot().context("load snapshot")?;

    let resolver = StatusResolver::new(clock.clone());
    let sweep = resolver.sweep(&snapshot);
    tracing::info!(
        "{}",
        t_with_args(
            "report.status_sweep",
            &[
                ("changed", &sweep.changes.len().to_string()),
                ("total", &sweep.total().to_string()),
            ],
        )
    );

    let applied = if apply {
        repo.apply_status_changes(&sweep.changes)
            .context("apply status changes")?
    } else {
        0
    };

    let queue = TicketQueue::new(TicketScorer::from_resolver(resolver));
    let ranked = queue.rank_snapshot(&snapshot);

    let tickets: Vec<_> = ranked
        .iter()
        .map(|r| {
            json!({
                "ticket_id": r.ticket.id,
                "title": r.ticket.title,
                "customer_id": r.ticket.customer_id,
                "priority": r.ticket.priority.map(|p| p.label()),
                "score": r.score(),
                "factors": r.breakdown.factors,
            })
        })
        .collect();

    let report = json!({
        "run_id": sweep.run_id,
        "evaluated_at": sweep.evaluated_at.to_string(),
        "today": crm_core::calendar::format_jalali(clock.today()),
        "status_sweep": {
            "total": sweep.total(),
            "sticky": sweep.sticky_count,
            "changed": sweep.changes.len(),
            "applied": applied,
            "changes": sweep.changes,
        },
        "tickets": tickets,
    });

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
