//! Terminal output: the load spinner and colored result lines.
//!
//! `indicatif` drives the CSV load spinner and `console` styles the text.
//! Logs go to stderr through `tracing`. Everything meant for the operator
//! goes through here to stdout.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::lifecycle::WorkOrder;
use crate::report::{Indicators, LISTED_COMMUNES, ON_TIME_MONTHS};
use crate::store::{GroupSummary, LoadReport};

/// Spinner shown while a CSV export loads.
///
/// Success lines are green, failures red and skipped rows yellow.
pub struct LoadProgress {
    pb: ProgressBar,
    green: Style,
    red: Style,
    yellow: Style,
}

impl LoadProgress {
    /// Starts the spinner with a description of the load.
    pub fn start(description: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("LOAD: {description}"));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Stops the spinner and summarizes loaded and skipped rows.
    pub fn complete(&self, report: &LoadReport) {
        self.pb.finish_and_clear();
        println!(
            "  {} {} work orders loaded",
            self.green.apply_to("✓"),
            report.loaded
        );
        if report.skipped.is_empty() {
            return;
        }
        println!(
            "  {} {} rows skipped",
            self.yellow.apply_to("↷"),
            report.skipped.len()
        );
        for row in &report.skipped {
            let name = if row.name.is_empty() { "(unnamed)" } else { &row.name };
            println!("    row {}: {name}: {}", row.index, row.reason);
        }
    }

    /// Stops the spinner without a summary. The caller reports the error.
    pub fn fail(&self) {
        self.pb.finish_and_clear();
        println!("  {} Load aborted", self.red.apply_to("✗"));
    }
}

pub fn success(message: &str) {
    println!("  {} {message}", Style::new().green().bold().apply_to("✓"));
}

pub fn notice(message: &str) {
    println!("  {} {message}", Style::new().yellow().apply_to("•"));
}

/// Prints a fatal error in red on stderr.
pub fn fatal(error: &anyhow::Error) {
    eprintln!("{} {error:#}", Style::new().red().bold().apply_to("error:"));
}

/// Prints the work order as pretty JSON.
pub fn print_work_order(order: &WorkOrder) {
    let stage = order
        .stage()
        .map(|stage| stage.to_string())
        .unwrap_or_else(|| "UNSET".to_string());
    println!();
    println!(
        "{}",
        Style::new()
            .cyan()
            .bold()
            .apply_to(format!("─── {} [{stage}] ───", order.name()))
    );
    println!("{}", serde_json::to_string_pretty(order).unwrap_or_default());
}

/// Prints the seven indicator sections.
pub fn print_indicators(indicators: &Indicators) {
    let heading = Style::new().cyan().bold();
    let dim = Style::new().dim();

    println!("{}", heading.apply_to("─── Indicators ───"));

    println!("\n{}", heading.apply_to("1. Responsible areas"));
    print_names(&indicators.responsible_areas);

    println!("\n{}", heading.apply_to("2. Work types"));
    print_names(&indicators.work_types);

    println!("\n{}", heading.apply_to("3. Work orders per stage"));
    for group in &indicators.by_stage {
        println!("  - {}: {}", group_label(group), group.count);
    }

    println!("\n{}", heading.apply_to("4. Work orders and investment per work type"));
    for group in &indicators.by_work_type {
        println!(
            "  - {}: {} work orders, {}",
            group_label(group),
            group.count,
            format_amount(group.total_amount)
        );
    }

    let communes: Vec<String> = LISTED_COMMUNES.iter().map(u32::to_string).collect();
    println!(
        "\n{}",
        heading.apply_to(format!("5. Neighborhoods in communes {}", communes.join(", ")))
    );
    if indicators.neighborhoods.is_empty() {
        println!("  {}", dim.apply_to("no neighborhoods loaded for these communes"));
    }
    for (commune, names) in &indicators.neighborhoods {
        println!("  Commune {commune}:");
        for name in names {
            println!("    - {name}");
        }
    }

    println!(
        "\n{}",
        heading.apply_to(format!("6. Finished within {ON_TIME_MONTHS} months"))
    );
    println!("  {}", indicators.finished_on_time);

    println!("\n{}", heading.apply_to("7. Total investment"));
    println!(
        "  {} across {} work orders",
        format_amount(indicators.total_amount),
        indicators.total_work_orders
    );
}

fn print_names(names: &[String]) {
    if names.is_empty() {
        println!("  {}", Style::new().dim().apply_to("none"));
    }
    for name in names {
        println!("  - {name}");
    }
}

fn group_label(group: &GroupSummary) -> &str {
    group.key.as_deref().unwrap_or("(unassigned)")
}

/// `$1,234,567.89`
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_are_grouped_by_thousands() {
        assert_eq!(format_amount(Decimal::ZERO), "$0.00");
        assert_eq!(format_amount(Decimal::new(99999, 2)), "$999.99");
        assert_eq!(format_amount(Decimal::new(123456789, 2)), "$1,234,567.89");
        assert_eq!(format_amount(Decimal::from(1_000_000)), "$1,000,000.00");
        assert_eq!(format_amount(Decimal::new(1005, 3)), "$1.01");
        assert_eq!(format_amount(Decimal::new(-150000, 2)), "-$1,500.00");
    }

    #[test]
    fn unassigned_groups_have_a_label() {
        let group = GroupSummary {
            key: None,
            count: 2,
            total_amount: Decimal::ZERO,
        };
        assert_eq!(group_label(&group), "(unassigned)");
    }
}
