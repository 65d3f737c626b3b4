//! Sales analytics.
//!
//! Everything here is a pure function of the sales and products passed in;
//! handlers load the data and choose the date range.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::providers::hash::rolling_hash;
use crate::store::{Product, Sale};

/// Inclusive date filter. Missing bounds are open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }

    /// The `days` days ending on `end`, inclusive.
    pub fn last_days(end: NaiveDate, days: u32) -> Self {
        Self {
            from: Some(end - Duration::days(i64::from(days.max(1)) - 1)),
            to: Some(end),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub units: u64,
    pub revenue: Decimal,
    pub views: u64,
    /// Units per view; 0 when there were no views.
    pub conversion_rate: f64,
}

impl Totals {
    fn add(&mut self, sale: &Sale) {
        self.units += u64::from(sale.units);
        self.revenue += sale.revenue;
        self.views += u64::from(sale.views);
    }

    fn finish(mut self) -> Self {
        self.conversion_rate = conversion_rate(self.units, self.views);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductBreakdown {
    pub product_id: Uuid,
    pub title: String,
    #[serde(flatten)]
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub units: u64,
    pub revenue: Decimal,
    pub views: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub range: DateRange,
    pub totals: Totals,
    /// Ordered by revenue, highest first.
    pub products: Vec<ProductBreakdown>,
    /// One point per day with sales, oldest first.
    pub daily: Vec<DailyPoint>,
}

pub fn conversion_rate(units: u64, views: u64) -> f64 {
    if views == 0 {
        0.0
    } else {
        units as f64 / views as f64
    }
}

/// Aggregate `sales` inside `range`.
pub fn summarize(sales: &[Sale], products: &[Product], range: DateRange) -> AnalyticsSummary {
    let titles: HashMap<Uuid, &str> = products.iter().map(|p| (p.id, p.title.as_str())).collect();
    let mut totals = Totals::default();
    let mut per_product: HashMap<Uuid, Totals> = HashMap::new();
    let mut per_day: BTreeMap<NaiveDate, Totals> = BTreeMap::new();

    for sale in sales.iter().filter(|s| range.contains(s.date)) {
        totals.add(sale);
        per_product.entry(sale.product_id).or_default().add(sale);
        per_day.entry(sale.date).or_default().add(sale);
    }

    let mut products: Vec<ProductBreakdown> = per_product
        .into_iter()
        .map(|(product_id, t)| ProductBreakdown {
            product_id,
            title: titles.get(&product_id).copied().unwrap_or("(deleted product)").to_string(),
            totals: t.finish(),
        })
        .collect();
    products.sort_by(|a, b| {
        b.totals
            .revenue
            .cmp(&a.totals.revenue)
            .then_with(|| a.title.cmp(&b.title))
    });

    let daily = per_day
        .into_iter()
        .map(|(date, t)| DailyPoint {
            date,
            units: t.units,
            revenue: t.revenue,
            views: t.views,
        })
        .collect();

    AnalyticsSummary {
        range,
        totals: totals.finish(),
        products,
        daily,
    }
}

/// Deterministic sales for the `days` days ending on `end`.
///
/// Views and units come from the rolling hash of title and date, so the same
/// product always gets the same history. Revenue uses the product price, or
/// 5.00 when it has none.
pub fn demo_sales(product: &Product, days: u32, end: NaiveDate) -> Vec<Sale> {
    let price = product.price.unwrap_or(Decimal::new(500, 2));
    (0..days)
        .map(|offset| {
            let date = end - Duration::days(i64::from(days - 1 - offset));
            let seed = rolling_hash(&format!("{}|{}", product.title.to_lowercase(), date));
            let views = 20 + seed % 180;
            let units = (seed / 180) % (views / 15 + 1);
            Sale {
                id: Uuid::new_v4(),
                owner_id: product.owner_id,
                product_id: product.id,
                date,
                units,
                revenue: price * Decimal::from(units),
                views,
            }
        })
        .collect()
}
