//! Investment criteria extracted from a free-text query

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::lenient;

/// Structured investment filters
///
/// Instances are immutable: they are created through [`InvestmentCriteria::builder`]
/// or by deserializing a language-model answer, and are normalized on the way
/// in (tags trimmed and lower-cased, non-finite numbers dropped). Every set is a
/// `BTreeSet`, so two criteria naming the same tags in a different order are
/// equal and serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvestmentCriteria {
    #[serde(default, deserialize_with = "lenient::tag_set")]
    sectors: BTreeSet<String>,
    #[serde(default, deserialize_with = "lenient::finite_number")]
    fees_max: Option<f64>,
    #[serde(default, deserialize_with = "lenient::finite_number")]
    min_performance: Option<f64>,
    #[serde(default, deserialize_with = "lenient::tag_set")]
    region: BTreeSet<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient::tag_set")]
    product_type: BTreeSet<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    replication: Option<String>,
    #[serde(default, deserialize_with = "lenient::tag_set")]
    availability: BTreeSet<String>,
    #[serde(default, deserialize_with = "lenient::finite_number")]
    risk: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    strategy: Option<String>,
    #[serde(default, deserialize_with = "lenient::integer")]
    esg: Option<i64>,
    #[serde(default, deserialize_with = "lenient::tag_set")]
    emetteur: BTreeSet<String>,
}

impl InvestmentCriteria {
    pub fn builder() -> InvestmentCriteriaBuilder {
        InvestmentCriteriaBuilder::default()
    }

    pub fn sectors(&self) -> &BTreeSet<String> {
        &self.sectors
    }

    pub fn fees_max(&self) -> Option<f64> {
        self.fees_max
    }

    pub fn min_performance(&self) -> Option<f64> {
        self.min_performance
    }

    pub fn region(&self) -> &BTreeSet<String> {
        &self.region
    }

    pub fn product_type(&self) -> &BTreeSet<String> {
        &self.product_type
    }

    pub fn replication(&self) -> Option<&str> {
        self.replication.as_deref()
    }

    pub fn availability(&self) -> &BTreeSet<String> {
        &self.availability
    }

    pub fn risk(&self) -> Option<f64> {
        self.risk
    }

    pub fn strategy(&self) -> Option<&str> {
        self.strategy.as_deref()
    }

    pub fn esg(&self) -> Option<i64> {
        self.esg
    }

    pub fn emetteur(&self) -> &BTreeSet<String> {
        &self.emetteur
    }

    /// True when no field carries a constraint
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Builder for [`InvestmentCriteria`]
#[derive(Debug, Default)]
pub struct InvestmentCriteriaBuilder {
    inner: InvestmentCriteria,
}

impl InvestmentCriteriaBuilder {
    pub fn sector(mut self, sector: impl AsRef<str>) -> Self {
        insert_tag(&mut self.inner.sectors, sector.as_ref());
        self
    }

    pub fn sectors<I, S>(mut self, sectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for sector in sectors {
            insert_tag(&mut self.inner.sectors, sector.as_ref());
        }
        self
    }

    pub fn fees_max(mut self, fees_max: f64) -> Self {
        self.inner.fees_max = finite(fees_max);
        self
    }

    pub fn min_performance(mut self, min_performance: f64) -> Self {
        self.inner.min_performance = finite(min_performance);
        self
    }

    pub fn region(mut self, region: impl AsRef<str>) -> Self {
        insert_tag(&mut self.inner.region, region.as_ref());
        self
    }

    pub fn product_type(mut self, product_type: impl AsRef<str>) -> Self {
        insert_tag(&mut self.inner.product_type, product_type.as_ref());
        self
    }

    pub fn replication(mut self, replication: impl AsRef<str>) -> Self {
        self.inner.replication = normalize_text(replication.as_ref());
        self
    }

    pub fn availability(mut self, availability: impl AsRef<str>) -> Self {
        insert_tag(&mut self.inner.availability, availability.as_ref());
        self
    }

    pub fn risk(mut self, risk: f64) -> Self {
        self.inner.risk = finite(risk);
        self
    }

    pub fn strategy(mut self, strategy: impl AsRef<str>) -> Self {
        self.inner.strategy = normalize_text(strategy.as_ref());
        self
    }

    pub fn esg(mut self, esg: i64) -> Self {
        self.inner.esg = Some(esg);
        self
    }

    pub fn emetteur(mut self, emetteur: impl AsRef<str>) -> Self {
        insert_tag(&mut self.inner.emetteur, emetteur.as_ref());
        self
    }

    pub fn build(self) -> InvestmentCriteria {
        self.inner
    }
}

/// Canonical form of a tag: trimmed, lower-cased, `None` when blank
pub(crate) fn normalize_tag(tag: &str) -> Option<String> {
    let tag = tag.trim();

    if tag.is_empty() {
        None
    } else {
        Some(tag.to_lowercase())
    }
}

pub(crate) fn normalize_text(text: &str) -> Option<String> {
    let text = text.trim();

    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Keeps finite values; `-0.0` becomes `0.0`
pub(crate) fn finite(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(if value == 0.0 { 0.0 } else { value })
    } else {
        None
    }
}

fn insert_tag(set: &mut BTreeSet<String>, tag: &str) {
    if let Some(tag) = normalize_tag(tag) {
        set.insert(tag);
    }
}
