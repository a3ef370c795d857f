use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use voltran_core::entity::Owned;
use voltran_core::{DomainError, DomainResult, Entity, MaterialId, OwnerId};

use crate::category::Category;

/// A stocked construction material.
///
/// `quantity` is never negative. Every constructor and transition below checks
/// this before handing back a new value, so a failed call leaves the original untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    id: MaterialId,
    owner_id: OwnerId,
    name: String,
    category: Category,
    quantity: Decimal,
    unit: String,
    min_stock: Decimal,
    updated_at: DateTime<Utc>,
}

/// Input for creating a material.
///
/// Fields are optional because callers hand over whatever the request carried;
/// `Material::create` decides what is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialDraft {
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<Decimal>,
    pub unit: Option<String>,
    pub min_stock: Option<Decimal>,
}

/// Partial edit of a material. `None` (or a blank string) leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<Decimal>,
    pub unit: Option<String>,
    pub min_stock: Option<Decimal>,
}

impl MaterialPatch {
    /// Whether the patch touches the stock quantity (a manual correction).
    pub fn corrects_quantity(&self) -> bool {
        self.quantity.is_some()
    }
}

fn required_text(value: Option<String>, field: &'static str) -> DomainResult<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DomainError::validation(field, format!("{field} is required"))),
    }
}

fn present_text(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn non_negative(value: Decimal, field: &'static str) -> DomainResult<Decimal> {
    if value < Decimal::ZERO {
        return Err(DomainError::validation(
            field,
            format!("{field} cannot be negative"),
        ));
    }
    Ok(value.normalize())
}

impl Material {
    /// Build a new material from a draft, validating required fields.
    pub fn create(
        id: MaterialId,
        owner_id: OwnerId,
        draft: MaterialDraft,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = required_text(draft.name, "name")?;
        let category: Category = required_text(draft.category, "category")?.parse()?;
        let unit = required_text(draft.unit, "unit")?;
        let quantity = draft
            .quantity
            .ok_or_else(|| DomainError::validation("quantity", "quantity must be a number"))?;
        let quantity = non_negative(quantity, "quantity")?;
        let min_stock = non_negative(draft.min_stock.unwrap_or(Decimal::ZERO), "minStock")?;

        Ok(Self {
            id,
            owner_id,
            name,
            category,
            quantity,
            unit,
            min_stock,
            updated_at: now,
        })
    }

    pub fn id_typed(&self) -> MaterialId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn min_stock(&self) -> Decimal {
        self.min_stock
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// At or below the reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_stock
    }

    /// Apply a partial edit, returning the edited copy.
    pub fn patched(&self, patch: &MaterialPatch, now: DateTime<Utc>) -> DomainResult<Self> {
        let mut next = self.clone();

        if let Some(name) = present_text(patch.name.as_ref()) {
            next.name = name.to_string();
        }
        if let Some(category) = present_text(patch.category.as_ref()) {
            next.category = category.parse()?;
        }
        if let Some(unit) = present_text(patch.unit.as_ref()) {
            next.unit = unit.to_string();
        }
        if let Some(quantity) = patch.quantity {
            next.quantity = non_negative(quantity, "quantity")?;
        }
        if let Some(min_stock) = patch.min_stock {
            next.min_stock = non_negative(min_stock, "minStock")?;
        }

        next.updated_at = now;
        Ok(next)
    }

    /// Add a signed delta to the stock, returning the updated copy.
    ///
    /// Fails with `InsufficientStock` (carrying what is on hand) if the result
    /// would be negative, and with a `quantity` validation error if it does not
    /// fit a decimal.
    pub fn apply_delta(&self, delta: Decimal, now: DateTime<Utc>) -> DomainResult<Self> {
        let quantity = self.quantity.checked_add(delta).ok_or_else(|| {
            DomainError::validation("quantity", "quantity is too large")
        })?;
        if quantity < Decimal::ZERO {
            return Err(DomainError::insufficient_stock(
                self.quantity,
                self.unit.clone(),
            ));
        }

        let mut next = self.clone();
        next.quantity = quantity.normalize();
        next.updated_at = now;
        Ok(next)
    }
}

impl Entity for Material {
    type Id = MaterialId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Owned for Material {
    type Owner = OwnerId;

    fn owner_id(&self) -> OwnerId {
        self.owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
    }

    fn bolt_draft() -> MaterialDraft {
        MaterialDraft {
            name: Some("Bolt".to_string()),
            category: Some("Fasteners".to_string()),
            quantity: Some(Decimal::from(100)),
            unit: Some("pcs".to_string()),
            min_stock: Some(Decimal::from(20)),
        }
    }

    fn bolt() -> Material {
        Material::create(MaterialId::new(), OwnerId::new(), bolt_draft(), test_time()).unwrap()
    }

    #[test]
    fn create_fills_every_field() {
        let m = bolt();
        assert_eq!(m.name(), "Bolt");
        assert_eq!(m.category(), &Category::Fasteners);
        assert_eq!(m.quantity(), Decimal::from(100));
        assert_eq!(m.unit(), "pcs");
        assert_eq!(m.min_stock(), Decimal::from(20));
        assert_eq!(m.updated_at(), test_time());
        assert!(!m.is_low_stock());
    }

    #[test]
    fn create_requires_name_category_unit_and_quantity() {
        let cases: [(&str, fn(&mut MaterialDraft)); 4] = [
            ("name", |d| d.name = Some("   ".to_string())),
            ("category", |d| d.category = None),
            ("unit", |d| d.unit = Some(String::new())),
            ("quantity", |d| d.quantity = None),
        ];

        for (field, mutate) in cases {
            let mut draft = bolt_draft();
            mutate(&mut draft);
            let err = Material::create(MaterialId::new(), OwnerId::new(), draft, test_time())
                .unwrap_err();
            match err {
                DomainError::Validation { field: f, .. } => assert_eq!(f, field),
                other => panic!("expected validation error for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn min_stock_defaults_to_zero() {
        let mut draft = bolt_draft();
        draft.min_stock = None;
        let m = Material::create(MaterialId::new(), OwnerId::new(), draft, test_time()).unwrap();
        assert_eq!(m.min_stock(), Decimal::ZERO);
    }

    #[test]
    fn negative_initial_quantity_is_rejected() {
        let mut draft = bolt_draft();
        draft.quantity = Some(Decimal::from(-1));
        let err = Material::create(MaterialId::new(), OwnerId::new(), draft, test_time()).unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "quantity", .. }));
    }

    #[test]
    fn patch_applies_only_present_fields() {
        let m = bolt();
        let later = test_time() + chrono::Duration::hours(1);
        let patch = MaterialPatch {
            name: Some("Hex Bolt".to_string()),
            unit: Some("  ".to_string()),
            min_stock: Some(Decimal::from(5)),
            ..MaterialPatch::default()
        };

        let edited = m.patched(&patch, later).unwrap();
        assert_eq!(edited.name(), "Hex Bolt");
        assert_eq!(edited.unit(), "pcs");
        assert_eq!(edited.quantity(), Decimal::from(100));
        assert_eq!(edited.min_stock(), Decimal::from(5));
        assert_eq!(edited.updated_at(), later);
        assert_eq!(edited.id_typed(), m.id_typed());
    }

    #[test]
    fn patch_rejects_negative_quantity_correction() {
        let m = bolt();
        let patch = MaterialPatch {
            quantity: Some(Decimal::from(-3)),
            ..MaterialPatch::default()
        };
        assert!(m.patched(&patch, test_time()).is_err());
        assert_eq!(m.quantity(), Decimal::from(100));
    }

    #[test]
    fn delta_below_zero_reports_available_stock() {
        let m = bolt();
        let err = m.apply_delta(Decimal::from(-101), test_time()).unwrap_err();
        assert_eq!(err, DomainError::insufficient_stock(Decimal::from(100), "pcs"));
    }

    #[test]
    fn draining_to_zero_flags_low_stock() {
        let m = bolt().apply_delta(Decimal::from(-100), test_time()).unwrap();
        assert_eq!(m.quantity(), Decimal::ZERO);
        assert!(m.is_low_stock());
    }

    #[test]
    fn delta_past_decimal_max_is_a_quantity_error() {
        let full = Material::create(
            MaterialId::new(),
            OwnerId::new(),
            MaterialDraft {
                quantity: Some(Decimal::MAX),
                ..bolt_draft()
            },
            test_time(),
        )
        .unwrap();

        let err = full.apply_delta(Decimal::ONE, test_time()).unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "quantity", .. }));
        assert_eq!(full.quantity(), Decimal::MAX);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: any sequence of deltas either applies or is refused, and
        /// the resulting stock is never negative.
        #[test]
        fn stock_never_goes_negative(deltas in prop::collection::vec(-500i64..500i64, 1..40)) {
            let mut m = bolt();
            let mut expected = Decimal::from(100);

            for delta in deltas {
                let delta = Decimal::from(delta);
                match m.apply_delta(delta, test_time()) {
                    Ok(next) => {
                        expected += delta;
                        m = next;
                    }
                    Err(DomainError::InsufficientStock { available, .. }) => {
                        prop_assert_eq!(available, m.quantity());
                        prop_assert!(m.quantity() + delta < Decimal::ZERO);
                    }
                    Err(other) => prop_assert!(false, "unexpected error {:?}", other),
                }
                prop_assert!(m.quantity() >= Decimal::ZERO);
            }

            prop_assert_eq!(m.quantity(), expected);
        }
    }
}
