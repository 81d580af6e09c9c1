use super::ui;
use crate::rate_provider::{ConvertError, RateProvider};
use anyhow::{Context, Result};
use comfy_table::Cell;
use console::Term;

/// Converts `amount` into every target and renders the result table.
///
/// Fails when no rates are available at all; unsupported targets are shown
/// as "N/A" rows.
pub fn render_conversions(
    provider: &RateProvider,
    base_currency: &str,
    amount: f64,
    targets: &[String],
) -> Result<String> {
    if provider.rates().is_empty() {
        return Err(ConvertError::RatesUnavailable.into());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Rate (per 1 {base_currency})")),
        ui::header_cell("Amount"),
    ]);

    let mut unsupported = Vec::new();
    for target in targets {
        match provider.convert(target, amount) {
            Ok(converted) => {
                let rate = provider.rates().get(target).unwrap_or_default();
                table.add_row(vec![
                    Cell::new(target),
                    ui::number_cell(rate, 4),
                    ui::number_cell(converted, 2),
                ]);
            }
            Err(e) => {
                tracing::debug!(currency = %target, "{e}");
                unsupported.push(e.to_string());
                table.add_row(vec![Cell::new(target), ui::na_cell(), ui::na_cell()]);
            }
        }
    }

    let title = format!("{amount:.2} {base_currency}");
    let mut output = format!(
        "Converting {} (rates from {})\n\n",
        ui::style_text(&title, ui::StyleType::Title),
        provider.origin()
    );
    output.push_str(&table.to_string());

    for message in unsupported {
        output.push_str(&format!("\n{}", ui::style_text(&message, ui::StyleType::Error)));
    }

    Ok(output)
}

/// Reads an amount in the base currency from the terminal.
pub fn prompt_amount(base_currency: &str) -> Result<f64> {
    let term = Term::stdout();
    term.write_str(&format!("Enter amount in {base_currency}: "))?;
    let line = term.read_line().context("Failed to read amount")?;
    parse_amount(&line)
}

pub fn parse_amount(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    let amount: f64 = trimmed
        .parse()
        .with_context(|| format!("Invalid amount: '{trimmed}'"))?;
    if !amount.is_finite() {
        anyhow::bail!("Invalid amount: '{trimmed}'");
    }
    Ok(amount)
}

pub fn run(
    provider: &RateProvider,
    base_currency: &str,
    amount: Option<f64>,
    targets: &[String],
) -> Result<()> {
    let amount = match amount {
        Some(amount) => amount,
        None => prompt_amount(base_currency)?,
    };

    println!(
        "{}",
        render_conversions(provider, base_currency, amount, targets)?
    );
    Ok(())
}
