use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use voltran_core::entity::Owned;
use voltran_core::{DomainError, DomainResult, Entity, MaterialId, OwnerId, TransactionId};

/// Direction of a stock movement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Inward,
    Outward,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Inward => "INWARD",
            TransactionKind::Outward => "OUTWARD",
        }
    }
}

/// Kind-specific details of a recorded movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Movement {
    /// Receipt from a supplier.
    Inward {
        supplier: String,
        invoice: Option<String>,
    },
    /// Dispatch to a project.
    Outward {
        project: String,
        supervisor: Option<String>,
    },
}

impl Movement {
    pub fn kind(&self) -> TransactionKind {
        match self {
            Movement::Inward { .. } => TransactionKind::Inward,
            Movement::Outward { .. } => TransactionKind::Outward,
        }
    }
}

/// Immutable record of one movement against one material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    id: TransactionId,
    owner_id: OwnerId,
    material_id: MaterialId,
    quantity: Decimal,
    date: DateTime<Utc>,
    #[serde(flatten)]
    movement: Movement,
}

impl Transaction {
    /// Record a validated movement. `date` falls back to `now` when the request had none.
    pub fn record(
        id: TransactionId,
        owner_id: OwnerId,
        movement: ValidMovement,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            material_id: movement.material_id,
            quantity: movement.quantity,
            date: movement.date.unwrap_or(now),
            movement: movement.movement,
        }
    }

    pub fn id_typed(&self) -> TransactionId {
        self.id
    }

    pub fn material_id(&self) -> MaterialId {
        self.material_id
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn movement(&self) -> &Movement {
        &self.movement
    }

    pub fn kind(&self) -> TransactionKind {
        self.movement.kind()
    }
}

impl Entity for Transaction {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Owned for Transaction {
    type Owner = OwnerId;

    fn owner_id(&self) -> OwnerId {
        self.owner_id
    }
}

/// Kind-specific request fields, still unvalidated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovementDetail {
    Inward {
        supplier: Option<String>,
        invoice: Option<String>,
    },
    Outward {
        project: Option<String>,
        supervisor: Option<String>,
    },
}

/// A movement request as received from a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementRequest {
    pub material_id: Option<String>,
    pub quantity: Option<Decimal>,
    pub detail: MovementDetail,
    pub date: Option<DateTime<Utc>>,
}

/// A movement request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidMovement {
    pub material_id: MaterialId,
    pub quantity: Decimal,
    pub movement: Movement,
    pub date: Option<DateTime<Utc>>,
}

impl ValidMovement {
    pub fn kind(&self) -> TransactionKind {
        self.movement.kind()
    }

    pub fn stock_delta(&self) -> Decimal {
        match self.kind() {
            TransactionKind::Inward => self.quantity,
            TransactionKind::Outward => -self.quantity,
        }
    }
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required_text(value: Option<String>, field: &'static str) -> DomainResult<String> {
    optional_text(value).ok_or_else(|| DomainError::validation(field, format!("{field} is required")))
}

impl MovementRequest {
    pub fn inward(
        material_id: impl Into<String>,
        quantity: Decimal,
        supplier: impl Into<String>,
    ) -> Self {
        Self {
            material_id: Some(material_id.into()),
            quantity: Some(quantity),
            detail: MovementDetail::Inward {
                supplier: Some(supplier.into()),
                invoice: None,
            },
            date: None,
        }
    }

    pub fn outward(
        material_id: impl Into<String>,
        quantity: Decimal,
        project: impl Into<String>,
    ) -> Self {
        Self {
            material_id: Some(material_id.into()),
            quantity: Some(quantity),
            detail: MovementDetail::Outward {
                project: Some(project.into()),
                supervisor: None,
            },
            date: None,
        }
    }

    pub fn dated(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    pub fn kind(&self) -> TransactionKind {
        match self.detail {
            MovementDetail::Inward { .. } => TransactionKind::Inward,
            MovementDetail::Outward { .. } => TransactionKind::Outward,
        }
    }

    /// Check required fields and the quantity sign.
    ///
    /// A material id that is present but not a well-formed id cannot name any
    /// material, so it is reported as `NotFound` rather than a validation error.
    pub fn validate(self) -> DomainResult<ValidMovement> {
        let raw_id = required_text(self.material_id, "materialId")?;

        let quantity = match self.quantity {
            Some(q) if q > Decimal::ZERO => q.normalize(),
            Some(_) => {
                return Err(DomainError::validation(
                    "quantity",
                    "quantity must be greater than zero",
                ));
            }
            None => return Err(DomainError::validation("quantity", "quantity must be a number")),
        };

        let movement = match self.detail {
            MovementDetail::Inward { supplier, invoice } => Movement::Inward {
                supplier: required_text(supplier, "supplier")?,
                invoice: optional_text(invoice),
            },
            MovementDetail::Outward {
                project,
                supervisor,
            } => Movement::Outward {
                project: required_text(project, "project")?,
                supervisor: optional_text(supervisor),
            },
        };

        let material_id = raw_id.parse().map_err(|_| DomainError::not_found())?;

        Ok(ValidMovement {
            material_id,
            quantity,
            movement,
            date: self.date,
        })
    }
}

/// Parse a caller-supplied transaction date.
///
/// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_date(raw: &str) -> DomainResult<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| DomainError::validation("date", format!("invalid date: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 2, 12, 0, 0).unwrap()
    }

    #[test]
    fn inward_request_validates_and_records() {
        let material_id = MaterialId::new();
        let owner_id = OwnerId::new();
        let valid = MovementRequest::inward(material_id.to_string(), Decimal::from(50), "Acme")
            .validate()
            .unwrap();
        assert_eq!(valid.stock_delta(), Decimal::from(50));

        let tx = Transaction::record(TransactionId::new(), owner_id, valid, test_time());
        assert_eq!(tx.material_id(), material_id);
        assert_eq!(tx.owner_id(), owner_id);
        assert_eq!(tx.kind(), TransactionKind::Inward);
        assert_eq!(tx.date(), test_time());
        assert_eq!(
            tx.movement(),
            &Movement::Inward {
                supplier: "Acme".to_string(),
                invoice: None
            }
        );
    }

    #[test]
    fn explicit_date_is_kept() {
        let date = Utc.with_ymd_and_hms(2026, 1, 31, 0, 0, 0).unwrap();
        let valid = MovementRequest::outward(MaterialId::new().to_string(), Decimal::ONE, "SiteA")
            .dated(date)
            .validate()
            .unwrap();
        assert_eq!(valid.stock_delta(), Decimal::NEGATIVE_ONE);
        let tx = Transaction::record(TransactionId::new(), OwnerId::new(), valid, test_time());
        assert_eq!(tx.date(), date);
    }

    #[test]
    fn missing_fields_are_validation_errors() {
        let mut req = MovementRequest::inward(MaterialId::new().to_string(), Decimal::ONE, "  ");
        assert!(matches!(
            req.clone().validate(),
            Err(DomainError::Validation { field: "supplier", .. })
        ));

        req.material_id = None;
        assert!(matches!(
            req.clone().validate(),
            Err(DomainError::Validation { field: "materialId", .. })
        ));

        let mut out = MovementRequest::outward(MaterialId::new().to_string(), Decimal::ONE, "");
        assert!(matches!(
            out.clone().validate(),
            Err(DomainError::Validation { field: "project", .. })
        ));

        out.quantity = None;
        assert!(matches!(
            out.validate(),
            Err(DomainError::Validation { field: "quantity", .. })
        ));
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        for q in [Decimal::ZERO, Decimal::from(-4)] {
            let req = MovementRequest::outward(MaterialId::new().to_string(), q, "SiteA");
            assert!(matches!(
                req.validate(),
                Err(DomainError::Validation { field: "quantity", .. })
            ));
        }
    }

    #[test]
    fn malformed_material_id_is_not_found() {
        let req = MovementRequest::inward("mat-1234", Decimal::ONE, "Acme");
        assert_eq!(req.validate(), Err(DomainError::NotFound));
    }

    #[test]
    fn parse_date_accepts_rfc3339_and_plain_dates() {
        assert_eq!(
            parse_date("2026-02-01").unwrap(),
            Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_date("2026-02-01T10:15:00+02:00").unwrap(),
            Utc.with_ymd_and_hms(2026, 2, 1, 8, 15, 0).unwrap()
        );
        assert!(matches!(
            parse_date("yesterday"),
            Err(DomainError::Validation { field: "date", .. })
        ));
    }

    #[test]
    fn serialized_record_carries_type_tag() {
        let valid = MovementRequest::outward(MaterialId::new().to_string(), Decimal::from(3), "SiteB")
            .validate()
            .unwrap();
        let tx = Transaction::record(TransactionId::new(), OwnerId::new(), valid, test_time());
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "OUTWARD");
        assert_eq!(json["project"], "SiteB");

        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, tx);
    }
}
