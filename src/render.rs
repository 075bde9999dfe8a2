use analytics::{
    change_pct, AggregatedMetrics, DayValues, DerivedRatios, GoalProgress, ProductTotal,
    SeriesTable,
};
use anyhow::Result;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use core_types::{Goal, Platform};
use rust_decimal::Decimal;

fn new_table<T: ToString>(header: &[T]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(header.iter().map(|h| h.to_string()).collect::<Vec<_>>());
    table
}

fn money(value: Decimal) -> String {
    value.round_dp(2).to_string()
}

fn percent(value: Decimal) -> String {
    format!("{}%", value.round_dp(1))
}

/// Period figures per platform and field, labelled with how each was aggregated.
pub fn period_table(report: &AggregatedMetrics, platforms: &[Platform]) -> Table {
    let mut table = new_table(&["Platform", "Metric", "Aggregation", "Value"]);
    for platform in platforms {
        for policy in platform.policy().fields {
            table.add_row(vec![
                platform.to_string(),
                policy.field.as_str().to_string(),
                format!("{:?}", policy.semantics).to_lowercase(),
                money(report.figure(*platform, policy.field)),
            ]);
        }
    }
    table
}

pub fn ratios_table(ratios: &DerivedRatios) -> Table {
    let mut table = new_table(&["Ratio", "Value"]);
    table.add_row(vec!["CTR".to_string(), percent(ratios.ctr)]);
    table.add_row(vec!["CPC".to_string(), money(ratios.cpc)]);
    table.add_row(vec!["CPM".to_string(), money(ratios.cpm)]);
    table.add_row(vec!["ROAS".to_string(), format!("{}x", ratios.roas.round_dp(2))]);
    table.add_row(vec!["AOV".to_string(), money(ratios.aov)]);
    table.add_row(vec!["Conversion rate".to_string(), percent(ratios.conversion_rate)]);
    table
}

pub fn products_table(products: &[ProductTotal]) -> Table {
    let mut table = new_table(&["#", "Product", "Quantity", "Revenue"]);
    for (rank, product) in products.iter().enumerate() {
        table.add_row(vec![
            (rank + 1).to_string(),
            product.name.clone(),
            product.quantity.normalize().to_string(),
            money(product.revenue),
        ]);
    }
    table
}

/// Today against yesterday for every tracked field.
pub fn day_over_day_table(
    today: &DayValues,
    yesterday: &DayValues,
    platforms: &[Platform],
) -> Table {
    let mut table = new_table(&[
        "Platform".to_string(),
        "Metric".to_string(),
        yesterday.date.to_string(),
        today.date.to_string(),
        "Change".to_string(),
    ]);
    for platform in platforms {
        for policy in platform.policy().fields {
            let current = today.value(*platform, policy.field);
            let previous = yesterday.value(*platform, policy.field);
            table.add_row(vec![
                platform.to_string(),
                policy.field.as_str().to_string(),
                money(previous),
                money(current),
                percent(change_pct(current, previous)),
            ]);
        }
    }
    table
}

pub fn goals_table(progress: &[(&Goal, GoalProgress)]) -> Table {
    let mut table = new_table(&[
        "Goal", "Window", "Current", "Target", "Progress", "Expected", "On track", "Daily target",
        "Net profit", "Projected",
    ]);
    for (goal, p) in progress {
        let on_track = if p.is_complete {
            "done"
        } else if p.is_on_track {
            "yes"
        } else {
            "no"
        };
        table.add_row(vec![
            goal.display_name(),
            format!("{} .. {}", goal.start_date, goal.end_date),
            money(p.current_value),
            money(p.target_value),
            percent(p.progress_percentage),
            percent(p.expected_progress),
            on_track.to_string(),
            money(p.daily_target),
            money(p.net_profit),
            money(p.projected_value),
        ]);
    }
    table
}

/// Renders a series table as CSV with `\n` line endings.
pub fn csv(table: &SeriesTable) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(&table.header)?;
    for row in &table.rows {
        let mut record = Vec::with_capacity(row.values.len() + 1);
        record.push(row.date.to_string());
        record.extend(row.values.iter().map(|v| v.normalize().to_string()));
        writer.write_record(&record)?;
    }

    let bytes = writer.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::SeriesTableRow;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn csv_has_header_then_one_line_per_day() {
        let table = SeriesTable {
            header: vec!["date".to_string(), "woocommerce_revenue".to_string()],
            rows: vec![
                SeriesTableRow {
                    date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                    values: vec![dec!(120.50)],
                },
                SeriesTableRow {
                    date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
                    values: vec![dec!(0)],
                },
            ],
        };
        assert_eq!(
            csv(&table).unwrap(),
            "date,woocommerce_revenue\n2025-01-01,120.5\n2025-01-02,0\n"
        );
    }

    #[test]
    fn csv_quotes_headers_that_need_it() {
        let table = SeriesTable {
            header: vec!["date".to_string(), "revenue, net".to_string()],
            rows: vec![SeriesTableRow {
                date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                values: vec![dec!(-3.10)],
            }],
        };
        assert_eq!(csv(&table).unwrap(), "date,\"revenue, net\"\n2025-01-01,-3.1\n");
    }

    #[test]
    fn ratios_render_with_units() {
        let ratios = DerivedRatios {
            ctr: dec!(2.5),
            roas: dec!(3.25),
            ..DerivedRatios::default()
        };
        let rendered = ratios_table(&ratios).to_string();
        assert!(rendered.contains("2.5%"));
        assert!(rendered.contains("3.25x"));
    }

    #[test]
    fn products_are_numbered_in_order() {
        let products = vec![
            ProductTotal { name: "Mug".to_string(), quantity: dec!(4), revenue: dec!(80) },
            ProductTotal { name: "Cap".to_string(), quantity: dec!(1), revenue: dec!(20) },
        ];
        let rendered = products_table(&products).to_string();
        let mug = rendered.find("Mug").unwrap();
        let cap = rendered.find("Cap").unwrap();
        assert!(mug < cap);
    }
}
