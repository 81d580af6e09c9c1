use super::ui;
use crate::rate_provider::{ConvertError, RateProvider};
use anyhow::Result;
use comfy_table::Cell;

pub fn render_rates(provider: &RateProvider, base_currency: &str) -> Result<String> {
    if provider.rates().is_empty() {
        return Err(ConvertError::RatesUnavailable.into());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Rate (per 1 {base_currency})")),
    ]);

    for (code, rate) in provider.rates().iter() {
        table.add_row(vec![Cell::new(code), ui::number_cell(rate, 4)]);
    }

    let mut output = format!(
        "Exchange rates for {}\n\n",
        ui::style_text(base_currency, ui::StyleType::Title)
    );
    output.push_str(&table.to_string());
    output.push_str(&format!(
        "\n\n{} currencies, loaded from {}",
        ui::style_text(&provider.rates().len().to_string(), ui::StyleType::Value),
        ui::style_text(&provider.origin().to_string(), ui::StyleType::Subtle)
    ));

    Ok(output)
}

pub fn run(provider: &RateProvider, base_currency: &str) -> Result<()> {
    println!("{}", render_rates(provider, base_currency)?);
    Ok(())
}
