use crate::{Error, FeatureVector, ReferenceItem, Result};

/// Configuration for a reference dataset
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    pub name: String,
    pub vector_dim: usize,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            vector_dim: 6,
        }
    }
}

/// An ordered, dimension-checked collection of reference items
///
/// Items keep their insertion order, which is the tie-break order used by
/// the estimator when two items are equally far from a query.
#[derive(Debug, Clone)]
pub struct ReferenceDataset {
    config: DatasetConfig,
    items: Vec<ReferenceItem>,
}

impl ReferenceDataset {
    pub fn new(config: DatasetConfig) -> Self {
        Self {
            config,
            items: Vec::new(),
        }
    }

    pub fn with_dimension(vector_dim: usize) -> Self {
        Self::new(DatasetConfig {
            vector_dim,
            ..DatasetConfig::default()
        })
    }

    /// Build a dataset from already loaded items
    pub fn from_items<I>(vector_dim: usize, items: I) -> Result<Self>
    where
        I: IntoIterator<Item = ReferenceItem>,
    {
        let mut dataset = Self::with_dimension(vector_dim);
        for item in items {
            dataset.push(item)?;
        }
        Ok(dataset)
    }

    /// Parse a JSON array of `{"vector": [...], "outcome": x}` objects
    pub fn from_json_str(vector_dim: usize, json: &str) -> Result<Self> {
        let items: Vec<ReferenceItem> = serde_json::from_str(json)?;
        Self::from_items(vector_dim, items)
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn vector_dim(&self) -> usize {
        self.config.vector_dim
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append an item
    pub fn push(&mut self, item: ReferenceItem) -> Result<()> {
        if item.dim() != self.config.vector_dim {
            return Err(Error::DimensionMismatch {
                expected: self.config.vector_dim,
                actual: item.dim(),
            });
        }
        if !item.outcome.is_finite() || item.vector.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "reference item {} contains a non-finite value",
                self.items.len()
            )));
        }

        self.items.push(item);
        Ok(())
    }

    /// Convenience wrapper around [`push`](Self::push)
    pub fn insert(&mut self, vector: FeatureVector, outcome: f64) -> Result<()> {
        self.push(ReferenceItem::new(vector, outcome))
    }

    pub fn get(&self, index: usize) -> Option<&ReferenceItem> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[ReferenceItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReferenceItem> {
        self.items.iter()
    }

    /// Smallest and largest outcome, or `None` when empty
    pub fn outcome_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.items.iter().map(|item| item.outcome);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

impl<'a> IntoIterator for &'a ReferenceDataset {
    type Item = &'a ReferenceItem;
    type IntoIter = std::slice::Iter<'a, ReferenceItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
