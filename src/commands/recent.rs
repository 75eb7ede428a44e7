use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Color, ContentArrangement, Table};
use livecost::config::Config;
use livecost::ledger::QueryRecord;

/// Execute the recent command
pub async fn execute(cfg: &Config, limit: usize) -> Result<()> {
    let storage = super::open_persistent_storage(cfg).await?;
    let records = storage.ledger.recent(limit).await?;

    if records.is_empty() {
        println!("No queries recorded yet.");
        return Ok(());
    }

    println!("{}", records_table(&records));
    println!("{} of the most recent queries", records.len());
    Ok(())
}

fn records_table(records: &[QueryRecord]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("ID").fg(Color::Cyan),
        Cell::new("TIME (UTC)").fg(Color::Cyan),
        Cell::new("REGION").fg(Color::Cyan),
        Cell::new("APARTMENT").fg(Color::Cyan),
        Cell::new("DINING").fg(Color::Cyan),
        Cell::new("CAR").fg(Color::Cyan),
        Cell::new("COMMUTE").fg(Color::Cyan),
        Cell::new("TOTAL").fg(Color::Cyan),
    ]);

    for record in records {
        table.add_row(vec![
            Cell::new(record.id),
            Cell::new(record.timestamp.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(&record.inputs.region),
            Cell::new(&record.inputs.apartment_size),
            Cell::new(format!("{}x/week", record.inputs.dining_frequency)),
            Cell::new(&record.inputs.car_type),
            Cell::new(format!("{} mi", record.inputs.commute_miles)),
            Cell::new(format!("${:.2}", record.total_cost)).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}
