use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use voltran_core::DomainError;

/// Material category.
///
/// The known set mirrors what site teams pick from; any other label is kept
/// verbatim so new categories need no migration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Steel,
    Fasteners,
    Concrete,
    Conductor,
    Insulator,
    Foundation,
    Hardware,
    Other,
    Custom(String),
}

impl Category {
    pub const KNOWN: [Category; 8] = [
        Category::Steel,
        Category::Fasteners,
        Category::Concrete,
        Category::Conductor,
        Category::Insulator,
        Category::Foundation,
        Category::Hardware,
        Category::Other,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Category::Steel => "Steel",
            Category::Fasteners => "Fasteners",
            Category::Concrete => "Concrete",
            Category::Conductor => "Conductor",
            Category::Insulator => "Insulator",
            Category::Foundation => "Foundation",
            Category::Hardware => "Hardware",
            Category::Other => "Other",
            Category::Custom(label) => label,
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        if label.is_empty() {
            return Err(DomainError::validation("category", "category is required"));
        }
        let known = Category::KNOWN
            .iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(label))
            .cloned();
        Ok(known.unwrap_or_else(|| Category::Custom(label.to_string())))
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels_parse_case_insensitively() {
        assert_eq!("fasteners".parse::<Category>().unwrap(), Category::Fasteners);
        assert_eq!(" STEEL ".parse::<Category>().unwrap(), Category::Steel);
    }

    #[test]
    fn unknown_labels_are_kept_verbatim() {
        let c: Category = "Scaffolding".parse().unwrap();
        assert_eq!(c, Category::Custom("Scaffolding".to_string()));
        assert_eq!(c.to_string(), "Scaffolding");
    }

    #[test]
    fn blank_label_is_a_validation_error() {
        let err = "  ".parse::<Category>().unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "category", .. }));
    }

    #[test]
    fn serializes_as_plain_label() {
        let json = serde_json::to_string(&Category::Concrete).unwrap();
        assert_eq!(json, "\"Concrete\"");
        let back: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Category::Concrete);
    }
}
