use std::collections::HashMap;

use chrono::{DateTime, Datelike, Months, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

use voltran_inventory::{Category, Material, Transaction, TransactionKind};

use crate::ledger::{OwnerSnapshot, UNKNOWN_MATERIAL, material_names};

/// Months covered by the trend, ending with the current one.
pub const TREND_MONTHS: u32 = 6;
/// Number of entries in the recent-activity list.
pub const RECENT_LIMIT: usize = 10;
/// Chart labels longer than this are cut and marked with an ellipsis.
pub const STOCK_LABEL_CHARS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    pub total_materials: usize,
    pub total_inward: Decimal,
    pub total_outward: Decimal,
    pub low_stock_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: Category,
    pub total_quantity: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyMovement {
    /// `"%b %Y"`, e.g. `"Oct 2026"`.
    pub month: String,
    pub inward: Decimal,
    pub outward: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentTransaction {
    pub transaction: Transaction,
    pub material_name: String,
}

impl RecentTransaction {
    pub fn kind(&self) -> TransactionKind {
        self.transaction.kind()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockLevel {
    pub name: String,
    pub quantity: Decimal,
    pub min_stock: Decimal,
    pub unit: String,
}

/// Aggregate view of one owner's inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub summary: DashboardSummary,
    pub low_stock_items: Vec<Material>,
    pub category_breakdown: Vec<CategoryTotal>,
    pub monthly_trend: Vec<MonthlyMovement>,
    pub recent_transactions: Vec<RecentTransaction>,
    pub stock_levels: Vec<StockLevel>,
}

/// Read-only dashboard projection.
///
/// Recomputed from a snapshot on every call; holds no state of its own.
#[derive(Debug, Default, Clone, Copy)]
pub struct DashboardAggregator;

impl DashboardAggregator {
    pub fn aggregate(snapshot: &OwnerSnapshot, now: DateTime<Utc>) -> Dashboard {
        let OwnerSnapshot {
            materials,
            inward,
            outward,
        } = snapshot;

        let low_stock_items: Vec<Material> =
            materials.iter().filter(|m| m.is_low_stock()).cloned().collect();

        Dashboard {
            summary: DashboardSummary {
                total_materials: materials.len(),
                total_inward: total(inward),
                total_outward: total(outward),
                low_stock_count: low_stock_items.len(),
            },
            low_stock_items,
            category_breakdown: category_breakdown(materials),
            monthly_trend: monthly_trend(inward, outward, now),
            recent_transactions: recent_transactions(materials, inward, outward),
            stock_levels: materials.iter().map(stock_level).collect(),
        }
    }
}

fn total(records: &[Transaction]) -> Decimal {
    saturating_sum(records.iter().map(Transaction::quantity))
}

/// Totals clamp at the decimal bounds instead of overflowing.
fn saturating_sum(values: impl Iterator<Item = Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, Decimal::saturating_add)
}

fn category_breakdown(materials: &[Material]) -> Vec<CategoryTotal> {
    let mut order: Vec<CategoryTotal> = Vec::new();
    let mut index: HashMap<&Category, usize> = HashMap::new();

    for m in materials {
        let slot = *index.entry(m.category()).or_insert_with(|| {
            order.push(CategoryTotal {
                category: m.category().clone(),
                total_quantity: Decimal::ZERO,
                count: 0,
            });
            order.len() - 1
        });
        order[slot].total_quantity = order[slot].total_quantity.saturating_add(m.quantity());
        order[slot].count += 1;
    }
    order
}

/// Start of the calendar month containing `at`, shifted back by `back` months.
fn month_start(at: DateTime<Utc>, back: u32) -> Option<DateTime<Utc>> {
    let first = NaiveDate::from_ymd_opt(at.year(), at.month(), 1)?;
    let shifted = first.checked_sub_months(Months::new(back))?;
    Some(Utc.from_utc_datetime(&shifted.and_hms_opt(0, 0, 0)?))
}

fn monthly_trend(
    inward: &[Transaction],
    outward: &[Transaction],
    now: DateTime<Utc>,
) -> Vec<MonthlyMovement> {
    let sum_between = |records: &[Transaction], from: DateTime<Utc>, until: DateTime<Utc>| -> Decimal {
        saturating_sum(
            records
                .iter()
                .filter(|t| t.date() >= from && t.date() < until)
                .map(Transaction::quantity),
        )
    };

    (0..TREND_MONTHS)
        .rev()
        .filter_map(|back| {
            let from = month_start(now, back)?;
            // Half-open [from, until) covers the whole last day.
            let until = from.checked_add_months(Months::new(1))?;
            Some(MonthlyMovement {
                month: from.format("%b %Y").to_string(),
                inward: sum_between(inward, from, until),
                outward: sum_between(outward, from, until),
            })
        })
        .collect()
}

fn recent_transactions(
    materials: &[Material],
    inward: &[Transaction],
    outward: &[Transaction],
) -> Vec<RecentTransaction> {
    let names = material_names(materials);

    let mut all: Vec<&Transaction> = inward.iter().chain(outward.iter()).collect();
    all.sort_by(|a, b| b.date().cmp(&a.date()));

    all.into_iter()
        .take(RECENT_LIMIT)
        .map(|t| RecentTransaction {
            material_name: names
                .get(&t.material_id())
                .copied()
                .unwrap_or(UNKNOWN_MATERIAL)
                .to_string(),
            transaction: t.clone(),
        })
        .collect()
}

fn stock_level(material: &Material) -> StockLevel {
    StockLevel {
        name: chart_label(material.name()),
        quantity: material.quantity(),
        min_stock: material.min_stock(),
        unit: material.unit().to_string(),
    }
}

fn chart_label(name: &str) -> String {
    if name.chars().count() > STOCK_LABEL_CHARS {
        let mut cut: String = name.chars().take(STOCK_LABEL_CHARS).collect();
        cut.push('…');
        cut
    } else {
        name.to_string()
    }
}
