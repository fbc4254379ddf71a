//! # Sales CSV Export
//!
//! Renders the filtered sales report into a spreadsheet-friendly CSV.
//!
//! ## Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  EF BB BF                      UTF-8 BOM (Excel detects the encoding)  │
//! │  Sale ID;Date;Customer;...     header row                              │
//! │  <one row per line item>       sale columns repeated on every row      │
//! │  <one row per empty sale>      product columns left blank              │
//! │                                                                         │
//! │  delimiter ';'   money "12,50"   dates dd/mm/yyyy HH:MM (shop time)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rendering happens into memory; the HTTP layer streams the bytes.

use thiserror::Error;

use crate::calendar::BusinessCalendar;
use crate::money::Money;
use crate::types::{Sale, SaleItem};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Header row, in column order.
pub const HEADERS: [&str; 14] = [
    "Sale ID",
    "Date",
    "Customer",
    "Product",
    "Quantity",
    "Unit Price",
    "Line Total",
    "Subtotal",
    "Discount",
    "Total",
    "Payment Method",
    "Status",
    "Seller ID",
    "Store ID",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV flush failed: {0}")]
    Io(#[from] std::io::Error),
}

/// One sale as it appears in the export.
#[derive(Debug, Clone)]
pub struct SaleExport {
    pub sale: Sale,
    pub customer_name: Option<String>,
    pub items: Vec<SaleItem>,
}

fn money(cents: i64) -> String {
    Money::from_cents(cents).format_decimal(',')
}

/// Number of data rows `render_sales_csv` produces (header excluded).
pub fn data_row_count(sales: &[SaleExport]) -> usize {
    sales.iter().map(|s| s.items.len().max(1)).sum()
}

/// Renders sales into BOM-prefixed, semicolon-delimited CSV bytes.
pub fn render_sales_csv(
    sales: &[SaleExport],
    calendar: &BusinessCalendar,
) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(UTF8_BOM.to_vec());

    writer.write_record(HEADERS)?;

    for export in sales {
        let sale = &export.sale;
        let date = calendar.format_local(sale.created_at);
        let customer = export.customer_name.clone().unwrap_or_default();
        let tail = [
            money(sale.subtotal_cents),
            money(sale.discount_cents),
            money(sale.total_cents),
            sale.payment_method.as_str().to_string(),
            sale.status.as_str().to_string(),
            sale.seller_id.clone(),
            sale.store_id.clone(),
        ];

        if export.items.is_empty() {
            let mut row = vec![sale.id.clone(), date.clone(), customer.clone()];
            row.extend(std::iter::repeat(String::new()).take(4));
            row.extend(tail.iter().cloned());
            writer.write_record(&row)?;
            continue;
        }

        for item in &export.items {
            let mut row = vec![
                sale.id.clone(),
                date.clone(),
                customer.clone(),
                item.product_name.clone(),
                item.quantity.to_string(),
                money(item.unit_price_cents),
                money(item.line_total_cents),
            ];
            row.extend(tail.iter().cloned());
            writer.write_record(&row)?;
        }
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}
