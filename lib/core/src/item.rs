use serde::{Deserialize, Serialize};
use crate::vector::FeatureVector;

/// One labeled row of the reference dataset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReferenceItem {
    pub vector: FeatureVector,
    pub outcome: f64,
    /// Free-form tag, only used when reporting neighbours
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ReferenceItem {
    #[inline]
    #[must_use]
    pub fn new(vector: FeatureVector, outcome: f64) -> Self {
        Self {
            vector,
            outcome,
            label: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.vector.dim()
    }
}

impl From<(Vec<f64>, f64)> for ReferenceItem {
    fn from((vector, outcome): (Vec<f64>, f64)) -> Self {
        ReferenceItem::new(FeatureVector::new(vector), outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_without_label() {
        let item: ReferenceItem =
            serde_json::from_str(r#"{"vector": [1, 2, 3], "outcome": 4.5}"#).unwrap();
        assert_eq!(item.dim(), 3);
        assert_eq!(item.outcome, 4.5);
        assert!(item.label.is_none());
    }

    #[test]
    fn test_with_label() {
        let item = ReferenceItem::from((vec![0.0; 6], 90.0)).with_label("east");
        assert_eq!(item.label.as_deref(), Some("east"));
    }
}
