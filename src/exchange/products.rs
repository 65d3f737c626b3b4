//! Product CSV: `title,description,tags,tpt_url,price`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::exchange::{finish, parse_rows, ExchangeResult, Parsed};
use crate::store::{NewProduct, Product};

pub const PRODUCT_COLUMNS: [&str; 5] = ["title", "description", "tags", "tpt_url", "price"];

#[derive(Debug, Deserialize, Serialize)]
struct ProductRow {
    title: Option<String>,
    description: Option<String>,
    tags: Option<String>,
    tpt_url: Option<String>,
    price: Option<String>,
}

/// Split a tag cell on `,`, `;` or `|`.
pub fn split_tags(cell: &str) -> Vec<String> {
    cell.split([',', ';', '|'])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Parse a price cell. Empty means no price.
pub fn parse_price(cell: &str) -> Result<Option<Decimal>, String> {
    let cleaned = cell.trim().trim_start_matches('$').replace(',', "");
    if cleaned.is_empty() {
        return Ok(None);
    }
    match Decimal::from_str(&cleaned) {
        Ok(price) if price.is_sign_negative() => Err(format!("negative price '{}'", cell)),
        Ok(price) => Ok(Some(price)),
        Err(_) => Err(format!("invalid price '{}'", cell)),
    }
}

fn to_new_product(row: ProductRow) -> Result<NewProduct, String> {
    let title = row.title.unwrap_or_default();
    if title.trim().is_empty() {
        return Err("title is required".to_string());
    }
    Ok(NewProduct {
        title,
        description: row.description.unwrap_or_default(),
        tags: split_tags(row.tags.as_deref().unwrap_or_default()),
        price: parse_price(row.price.as_deref().unwrap_or_default())?,
        source_url: row.tpt_url.filter(|u| !u.is_empty()),
    })
}

/// Parse a product CSV. Only `title` is a required column.
pub fn parse_products(text: &str) -> ExchangeResult<Parsed<NewProduct>> {
    parse_rows(text, &["title"], csv::Trim::All, to_new_product)
}

/// Write products in the import schema.
pub fn export_products(products: &[Product]) -> ExchangeResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for product in products {
        writer.serialize(ProductRow {
            title: Some(product.title.clone()),
            description: Some(product.description.clone()),
            tags: Some(product.tags.join(", ")),
            tpt_url: product.source_url.clone(),
            price: product.price.map(|p| p.to_string()),
        })?;
    }
    if products.is_empty() {
        writer.write_record(PRODUCT_COLUMNS)?;
    }
    finish(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_skips_bad_rows_with_line_numbers() {
        let csv = "title,description,tags,tpt_url,price\n\
                   Fraction Worksheets,Practice,math;fractions|grade 3,https://example.com/p/1,4.50\n\
                   ,No title,,,\n\
                   Bad Price,,,,abc\n\
                   Free Sample,,,,\n";
        let parsed = parse_products(csv).unwrap();

        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0].tags, vec!["math", "fractions", "grade 3"]);
        assert_eq!(parsed.records[0].price, Some(Decimal::new(450, 2)));
        assert_eq!(parsed.records[1].price, None);

        let lines: Vec<u64> = parsed.errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4]);
        assert!(parsed.errors[1].message.contains("abc"));
    }

    #[test]
    fn test_headers_are_case_insensitive_and_optional() {
        let csv = "Title,Price\nPlace Value Game,$3\n";
        let parsed = parse_products(csv).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].price, Some(Decimal::new(3, 0)));
        assert!(parsed.records[0].source_url.is_none());
    }

    #[test]
    fn test_missing_title_column() {
        let err = parse_products("name,price\nx,1\n").unwrap_err();
        assert_eq!(err.to_string(), "missing required column 'title'");
    }

    #[test]
    fn test_export_reimports() {
        let product = Product::create(
            Uuid::new_v4(),
            NewProduct {
                title: "Reading Log, Weekly".into(),
                description: "Line one\nline two".into(),
                tags: vec!["reading".into(), "literacy".into()],
                price: Some(Decimal::new(299, 2)),
                source_url: Some("https://example.com/p/9".into()),
            },
        );
        let csv = export_products(std::slice::from_ref(&product)).unwrap();
        assert!(csv.starts_with("title,description,tags,tpt_url,price"));

        let parsed = parse_products(&csv).unwrap();
        assert!(parsed.errors.is_empty());
        let back = &parsed.records[0];
        assert_eq!(back.title, product.title);
        assert_eq!(back.description, product.description);
        assert_eq!(back.tags, product.tags);
        assert_eq!(back.price, product.price);
    }
}
