use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use serde_json::{Value, json};

use voltran_core::entity::Owned;
use voltran_infra::EnrichedTransaction;
use voltran_infra::LedgerError;
use voltran_infra::projections::{Dashboard, RecentTransaction};
use voltran_inventory::{
    Material, MaterialDraft, MaterialPatch, Movement, MovementDetail, MovementRequest, Transaction,
    parse_date,
};

// -------------------------
// Request DTOs
// -------------------------

/// Body of create and update. Numbers may arrive as JSON numbers or numeric strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<Value>,
    pub unit: Option<String>,
    pub min_stock: Option<Value>,
}

impl MaterialRequest {
    pub fn into_draft(self) -> Result<MaterialDraft, LedgerError> {
        Ok(MaterialDraft {
            name: self.name,
            category: self.category,
            quantity: number_field(self.quantity, "quantity")?,
            unit: self.unit,
            // Anything that is not a number counts as "no threshold".
            min_stock: number_field(self.min_stock, "minStock").ok().flatten(),
        })
    }

    pub fn into_patch(self) -> Result<MaterialPatch, LedgerError> {
        Ok(MaterialPatch {
            name: self.name,
            category: self.category,
            quantity: number_field(self.quantity, "quantity")?,
            unit: self.unit,
            min_stock: number_field(self.min_stock, "minStock")?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InwardRequest {
    pub material_id: Option<String>,
    pub quantity: Option<Value>,
    pub supplier: Option<String>,
    pub invoice: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutwardRequest {
    pub material_id: Option<String>,
    pub quantity: Option<Value>,
    pub project: Option<String>,
    pub supervisor: Option<String>,
    pub date: Option<String>,
}

impl InwardRequest {
    pub fn into_movement(self) -> Result<MovementRequest, LedgerError> {
        Ok(MovementRequest {
            material_id: self.material_id,
            quantity: number_field(self.quantity, "quantity")?,
            detail: MovementDetail::Inward {
                supplier: self.supplier,
                invoice: self.invoice,
            },
            date: date_field(self.date)?,
        })
    }
}

impl OutwardRequest {
    pub fn into_movement(self) -> Result<MovementRequest, LedgerError> {
        Ok(MovementRequest {
            material_id: self.material_id,
            quantity: number_field(self.quantity, "quantity")?,
            detail: MovementDetail::Outward {
                project: self.project,
                supervisor: self.supervisor,
            },
            date: date_field(self.date)?,
        })
    }
}

/// Read an optional numeric field. `null` and blank strings count as absent.
pub fn number_field(value: Option<Value>, field: &'static str) -> Result<Option<Decimal>, LedgerError> {
    let not_a_number = || LedgerError::Validation {
        field,
        message: format!("{field} must be a number"),
    };

    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => parse_decimal(&n.to_string()).map(Some).ok_or_else(not_a_number),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => parse_decimal(s.trim()).map(Some).ok_or_else(not_a_number),
        Some(_) => Err(not_a_number()),
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

fn date_field(value: Option<String>) -> Result<Option<chrono::DateTime<chrono::Utc>>, LedgerError> {
    match value {
        Some(raw) if !raw.trim().is_empty() => Ok(Some(parse_date(&raw)?)),
        _ => Ok(None),
    }
}

// -------------------------
// JSON mapping
// -------------------------

/// Decimal as a JSON number; whole values render without a fraction.
pub fn number(value: Decimal) -> Value {
    if value.fract().is_zero() {
        if let Some(i) = value.to_i64() {
            return json!(i);
        }
    }
    value.to_f64().map(|f| json!(f)).unwrap_or(Value::Null)
}

pub fn material_to_json(m: &Material) -> Value {
    json!({
        "id": m.id_typed().to_string(),
        "ownerId": m.owner_id().to_string(),
        "name": m.name(),
        "category": m.category().as_str(),
        "quantity": number(m.quantity()),
        "unit": m.unit(),
        "minStock": number(m.min_stock()),
        "updatedAt": m.updated_at().to_rfc3339(),
        "lowStock": m.is_low_stock(),
    })
}

pub fn transaction_to_json(t: &Transaction) -> Value {
    let mut body = json!({
        "id": t.id_typed().to_string(),
        "ownerId": t.owner_id().to_string(),
        "materialId": t.material_id().to_string(),
        "quantity": number(t.quantity()),
        "date": t.date().to_rfc3339(),
        "type": t.kind().as_str(),
    });

    let detail = match t.movement() {
        Movement::Inward { supplier, invoice } => json!({
            "supplier": supplier,
            "invoice": invoice.as_deref().unwrap_or(""),
        }),
        Movement::Outward {
            project,
            supervisor,
        } => json!({
            "project": project,
            "supervisor": supervisor.as_deref().unwrap_or(""),
        }),
    };
    merge(&mut body, detail);
    body
}

pub fn enriched_to_json(e: &EnrichedTransaction) -> Value {
    let mut body = transaction_to_json(&e.transaction);
    merge(&mut body, json!({ "materialName": e.material_name }));
    if let Some(stock) = e.new_stock {
        merge(&mut body, json!({ "newStock": number(stock) }));
    }
    body
}

fn recent_to_json(r: &RecentTransaction) -> Value {
    let mut body = transaction_to_json(&r.transaction);
    merge(&mut body, json!({ "materialName": r.material_name }));
    body
}

pub fn dashboard_to_json(d: &Dashboard) -> Value {
    json!({
        "summary": {
            "totalMaterials": d.summary.total_materials,
            "totalInward": number(d.summary.total_inward),
            "totalOutward": number(d.summary.total_outward),
            "lowStockCount": d.summary.low_stock_count,
        },
        "lowStockItems": d.low_stock_items.iter().map(material_to_json).collect::<Vec<_>>(),
        "categoryBreakdown": d.category_breakdown.iter().map(|c| json!({
            "category": c.category.as_str(),
            "totalQuantity": number(c.total_quantity),
            "count": c.count,
        })).collect::<Vec<_>>(),
        "monthlyTrend": d.monthly_trend.iter().map(|m| json!({
            "month": m.month,
            "inward": number(m.inward),
            "outward": number(m.outward),
        })).collect::<Vec<_>>(),
        "recentTransactions": d.recent_transactions.iter().map(recent_to_json).collect::<Vec<_>>(),
        "stockLevels": d.stock_levels.iter().map(|s| json!({
            "name": s.name,
            "quantity": number(s.quantity),
            "minStock": number(s.min_stock),
            "unit": s.unit,
        })).collect::<Vec<_>>(),
    })
}

fn merge(target: &mut Value, extra: Value) {
    if let (Value::Object(target), Value::Object(extra)) = (target, extra) {
        target.extend(extra);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use voltran_core::{MaterialId, OwnerId, TransactionId};

    #[test]
    fn numbers_accept_json_numbers_and_numeric_strings() {
        assert_eq!(number_field(Some(json!(12)), "quantity").unwrap(), Some(Decimal::from(12)));
        assert_eq!(number_field(Some(json!(2.5)), "quantity").unwrap(), Some(Decimal::new(25, 1)));
        assert_eq!(number_field(Some(json!(" 40 ")), "quantity").unwrap(), Some(Decimal::from(40)));
        assert_eq!(number_field(Some(json!(1e3)), "quantity").unwrap(), Some(Decimal::from(1000)));
        assert_eq!(number_field(Some(Value::Null), "quantity").unwrap(), None);
        assert_eq!(number_field(Some(json!("")), "quantity").unwrap(), None);

        for bad in [json!("ten"), json!(true), json!([1])] {
            assert!(matches!(
                number_field(Some(bad), "quantity"),
                Err(LedgerError::Validation { field: "quantity", .. })
            ));
        }
    }

    #[test]
    fn non_numeric_min_stock_defaults_on_create_but_fails_on_update() {
        let req = || MaterialRequest {
            name: Some("Bolt".to_string()),
            category: Some("Fasteners".to_string()),
            quantity: Some(json!(5)),
            unit: Some("pcs".to_string()),
            min_stock: Some(json!("lots")),
        };
        assert_eq!(req().into_draft().unwrap().min_stock, None);
        assert!(req().into_patch().is_err());
    }

    #[test]
    fn whole_decimals_render_as_integers() {
        assert_eq!(number(Decimal::from(150)), json!(150));
        assert_eq!(number(Decimal::new(1500, 1)), json!(150));
        assert_eq!(number(Decimal::new(125, 1)), json!(12.5));
    }

    #[test]
    fn transaction_view_renders_missing_optionals_as_empty_strings() {
        let valid = MovementRequest::inward(MaterialId::new().to_string(), Decimal::from(50), "Acme")
            .validate()
            .unwrap();
        let tx = Transaction::record(TransactionId::new(), OwnerId::new(), valid, Utc::now());
        let enriched = EnrichedTransaction {
            transaction: tx,
            material_name: "Bolt".to_string(),
            new_stock: Some(Decimal::from(150)),
        };

        let body = enriched_to_json(&enriched);
        assert_eq!(body["type"], "INWARD");
        assert_eq!(body["supplier"], "Acme");
        assert_eq!(body["invoice"], "");
        assert_eq!(body["materialName"], "Bolt");
        assert_eq!(body["newStock"], 150);
        assert_eq!(body["quantity"], 50);
    }

    #[test]
    fn blank_date_means_now_and_bad_date_is_rejected() {
        let mut req = OutwardRequest {
            material_id: Some(MaterialId::new().to_string()),
            quantity: Some(json!(1)),
            project: Some("SiteA".to_string()),
            date: Some("  ".to_string()),
            ..OutwardRequest::default()
        };
        assert_eq!(req.into_movement().unwrap().date, None);

        req = OutwardRequest {
            date: Some("31/12/2026".to_string()),
            ..OutwardRequest::default()
        };
        assert!(matches!(
            req.into_movement(),
            Err(LedgerError::Validation { field: "date", .. })
        ));
    }
}
