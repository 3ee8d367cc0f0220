use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use rust_decimal::Decimal;

use crate::ratecard::RateCatalog;
use crate::types::LineItem;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

fn format_money(amount: Decimal, currency: &str) -> String {
    if currency.is_empty() {
        format!("{amount:.2}")
    } else {
        format!("{amount:.2} {currency}")
    }
}

pub fn print_table(items: &[LineItem], catalog: &RateCatalog) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(
        ["Category", "Name", "Region", "Window", "Quantity", "Price"].map(Cell::new),
    );

    let mut total = Decimal::ZERO;

    for item in items {
        let window = format!(
            "{} .. {}",
            item.usage_start_time.format(TIME_FORMAT),
            item.usage_end_time.format(TIME_FORMAT)
        );
        table.add_row([
            Cell::new(&item.category),
            Cell::new(&item.name),
            Cell::new(&item.region),
            Cell::new(window),
            Cell::new(item.quantity),
            Cell::new(format_money(item.price, &catalog.currency)),
        ]);
        total += item.price;
    }

    table.add_row([
        Cell::new("TOTAL"),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(format_money(total, &catalog.currency)),
    ]);

    println!("{table}");
}

pub fn print_json(items: &[LineItem]) {
    println!(
        "{}",
        serde_json::to_string_pretty(items).expect("JSON serialization failed")
    );
}

/// Indented per-field listing: a title, a rule, then each item's fields
/// indented under it. Mirrors the sample's console dump, but rendered by a
/// statically-typed function over the known output type.
pub fn print_items(items: &[LineItem], catalog: &RateCatalog) {
    println!("Azure utilization line items");
    println!("{}", "-".repeat(90));

    for item in items {
        let fields = [
            ("Category", item.category.clone()),
            ("Subcategory", item.subcategory.clone()),
            ("Id", item.id.clone()),
            ("Name", item.name.clone()),
            ("Region", item.region.clone()),
            ("Quantity", item.quantity.to_string()),
            ("Price", format_money(item.price, &catalog.currency)),
            ("UsageStartTime", item.usage_start_time.to_rfc3339()),
            ("UsageEndTime", item.usage_end_time.to_rfc3339()),
            ("ResourceUri", item.resource_uri.clone()),
        ];
        for (name, value) in fields {
            println!("    {name}: {value}");
        }
        println!("{}", "-".repeat(80));
    }
}
