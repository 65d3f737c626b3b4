//! Sales CSV: `date,product_title,units,revenue,views`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

use crate::exchange::{parse_rows, ExchangeResult, Parsed};
use crate::store::{Product, Sale};

pub const SALES_COLUMNS: [&str; 5] = ["date", "product_title", "units", "revenue", "views"];

#[derive(Debug, Deserialize)]
struct SaleRow {
    date: Option<String>,
    product_title: Option<String>,
    units: Option<String>,
    revenue: Option<String>,
    views: Option<String>,
}

/// `YYYY-MM-DD` or `MM/DD/YYYY`.
pub fn parse_date(cell: &str) -> Result<NaiveDate, String> {
    let cell = cell.trim();
    NaiveDate::parse_from_str(cell, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(cell, "%m/%d/%Y"))
        .map_err(|_| format!("invalid date '{}'", cell))
}

fn parse_count(cell: Option<&str>, column: &str) -> Result<u32, String> {
    match cell.map(str::trim).filter(|c| !c.is_empty()) {
        None => Ok(0),
        Some(c) => c
            .replace(',', "")
            .parse::<u32>()
            .map_err(|_| format!("invalid {} '{}'", column, c)),
    }
}

fn parse_revenue(cell: Option<&str>) -> Result<Decimal, String> {
    let cleaned = cell.unwrap_or_default().trim().trim_start_matches('$').replace(',', "");
    if cleaned.is_empty() {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_str(&cleaned).map_err(|_| format!("invalid revenue '{}'", cleaned))
}

/// Parse a sales CSV, matching `product_title` case-insensitively against
/// `products`. Rows naming an unknown product are reported.
pub fn parse_sales(text: &str, owner_id: Uuid, products: &[Product]) -> ExchangeResult<Parsed<Sale>> {
    let by_title: HashMap<String, Uuid> = products
        .iter()
        .map(|p| (p.title.trim().to_lowercase(), p.id))
        .collect();

    parse_rows(text, &["date", "product_title"], csv::Trim::All, |row: SaleRow| {
        let date = parse_date(row.date.as_deref().unwrap_or_default())?;
        let title = row.product_title.unwrap_or_default();
        let product_id = *by_title
            .get(&title.trim().to_lowercase())
            .ok_or_else(|| format!("unknown product '{}'", title))?;
        Ok(Sale {
            id: Uuid::new_v4(),
            owner_id,
            product_id,
            date,
            units: parse_count(row.units.as_deref(), "units")?,
            revenue: parse_revenue(row.revenue.as_deref())?,
            views: parse_count(row.views.as_deref(), "views")?,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NewProduct;

    fn product(title: &str) -> Product {
        Product::create(
            Uuid::nil(),
            NewProduct {
                title: title.into(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_parse_sales() {
        let products = vec![product("Fraction Worksheets")];
        let csv = "date,product_title,units,revenue,views\n\
                   2024-03-01,fraction worksheets,3,13.50,120\n\
                   03/02/2024,FRACTION WORKSHEETS,1,$4.50,\n\
                   2024-03-03,Unknown Thing,1,1,1\n\
                   March 4,Fraction Worksheets,1,1,1\n";
        let parsed = parse_sales(csv, Uuid::nil(), &products).unwrap();

        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(parsed.records[0].revenue, Decimal::new(1350, 2));
        assert_eq!(parsed.records[1].date, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert_eq!(parsed.records[1].views, 0);
        assert!(parsed.records.iter().all(|s| s.product_id == products[0].id));

        assert_eq!(parsed.errors.len(), 2);
        assert_eq!(parsed.errors[0].line, 4);
        assert!(parsed.errors[0].message.contains("unknown product"));
        assert!(parsed.errors[1].message.contains("invalid date"));
    }

    #[test]
    fn test_rejects_negative_units() {
        let products = vec![product("A")];
        let parsed = parse_sales("date,product_title,units\n2024-01-01,A,-2\n", Uuid::nil(), &products).unwrap();
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.errors[0].message, "invalid units '-2'");
    }
}
