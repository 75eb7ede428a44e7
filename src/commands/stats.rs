use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use livecost::config::Config;
use livecost::ledger::AggregateStats;
use tracing::info;

/// Execute the stats command
pub async fn execute(cfg: &Config) -> Result<()> {
    let storage = super::open_persistent_storage(cfg).await?;

    info!("Reading ledger statistics");
    let stats = storage.ledger.aggregate().await?;

    println!("LiveCost Statistics");
    println!("===================\n");
    println!("  Total queries:     {}", stats.total_queries);
    println!("  Average cost:      ${:.2}", stats.average_cost);
    println!();

    if stats.queries_by_region.is_empty() {
        println!("No queries recorded yet.");
    } else {
        println!("{}", region_table(&stats));
    }

    Ok(())
}

fn region_table(stats: &AggregateStats) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("REGION").fg(Color::Cyan),
        Cell::new("QUERIES").fg(Color::Cyan),
        Cell::new("SHARE").fg(Color::Cyan),
    ]);

    let mut regions: Vec<(&String, &u64)> = stats.queries_by_region.iter().collect();
    regions.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    for (region, count) in regions {
        let share = *count as f64 / stats.total_queries.max(1) as f64 * 100.0;
        table.add_row(vec![
            Cell::new(region),
            Cell::new(count),
            Cell::new(format!("{:.1}%", share)),
        ]);
    }

    table
}
