use std::path::Path;

use crate::billing::{Invoice, Money};

use askama::Template;

struct LineItem {
    label: String,
    hours: String,
    subtotal: Money,
}

#[derive(Template)]
#[template(path = "prompt.txt")]
struct PromptData<'a> {
    invoice: &'a Invoice,
    output_path: String,
    items: Vec<LineItem>,
    total: Money,
}

/// The request handed to the generator: invoice details, one line per
/// week, and instructions to write the document to `output_path`.
pub fn prompt(
    invoice: &Invoice,
    output_path: &Path,
) -> Result<String, askama::Error> {
    let items = invoice
        .weeks
        .iter()
        .map(|week| LineItem {
            label: week.period.label(),
            hours: format!("{:.1}", week.hours.round_dp(1)),
            subtotal: invoice.subtotal(week),
        })
        .collect();

    let data = PromptData {
        invoice,
        output_path: output_path.display().to_string(),
        items,
        total: invoice.total(),
    };

    data.render()
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::billing::weeks_for_month;
    use crate::month::MonthYear;
    use chrono::Month;
    use rust_decimal_macros::dec;

    pub fn sample_invoice() -> Invoice {
        let month = MonthYear::new(2025, Month::January).unwrap();
        Invoice::new(
            month,
            "Jane Contractor".to_string(),
            "Acme Corp".to_string(),
            Money::new(dec!(150)),
            weeks_for_month(month, dec!(40)),
        )
    }

    fn render() -> String {
        prompt(&sample_invoice(), Path::new("/tmp/invoice-acme-corp-2025-01.html"))
            .unwrap()
    }

    #[test]
    fn names_the_parties_and_month() {
        let text = render();
        assert!(text.contains("Jane Contractor"));
        assert!(text.contains("Acme Corp"));
        assert!(text.contains("January 2025"));
        assert!(text.contains("$150.00"));
    }

    #[test]
    fn lists_every_week() {
        let text = render();
        assert!(text.contains("  - Jan 1-5: 24.0 hours @ $150.00/hr = $3600.00\n"));
        assert!(text.contains("  - Jan 6-12: 40.0 hours @ $150.00/hr = $6000.00\n"));
        assert!(text.contains("  - Jan 27-31: 40.0 hours @ $150.00/hr = $6000.00\n"));
        assert_eq!(text.matches(" hours @ ").count(), 5);
    }

    #[test]
    fn shows_the_total() {
        // (24 + 4 * 40) * 150
        assert!(render().contains("Total Amount: $27600.00"));
    }

    #[test]
    fn names_the_output_file() {
        let text = render();
        assert!(text.contains("/tmp/invoice-acme-corp-2025-01.html"));
        assert!(text.contains("write tool"));
        assert!(text.to_lowercase().contains("html"));
        assert!(text.contains("random color"));
        assert!(text.contains("invoice number"));
    }
}
