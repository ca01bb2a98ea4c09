// src/io/filter.rs

use crate::model::observation::Observation;
use chrono::NaiveDate;

/// Free-text product search over order lines.
///
/// Each field takes comma-separated terms matched case-insensitively as
/// substrings. Terms within a field are alternatives; fields combine with AND.
/// Sales channels are picked from a known list, so they match whole names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilter {
    sku_terms: Vec<String>,
    name_terms: Vec<String>,
    category_terms: Vec<String>,
    channels: Vec<String>,
    date_range: Option<(NaiveDate, NaiveDate)>,
}

/// Splits `"abc, 123,,XYZ "` into `["abc", "123", "xyz"]`.
pub fn parse_terms(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

impl SearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sku(mut self, input: &str) -> Self {
        self.sku_terms = parse_terms(input);
        self
    }

    pub fn name(mut self, input: &str) -> Self {
        self.name_terms = parse_terms(input);
        self
    }

    pub fn category(mut self, input: &str) -> Self {
        self.category_terms = parse_terms(input);
        self
    }

    /// Keeps lines sold through any of `channels`. An empty list keeps all.
    pub fn channels(mut self, channels: &[&str]) -> Self {
        self.channels = channels
            .iter()
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();
        self
    }

    /// Inclusive on both ends.
    pub fn between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = Some((start.min(end), start.max(end)));
        self
    }

    pub fn matches(&self, obs: &Observation) -> bool {
        if let Some((start, end)) = self.date_range {
            if obs.date < start || obs.date > end {
                return false;
            }
        }
        if !self.channels.is_empty() {
            let channel = obs.order_channel.as_deref().map(str::to_lowercase);
            if !channel.is_some_and(|c| self.channels.contains(&c)) {
                return false;
            }
        }
        matches_any(&self.sku_terms, Some(obs.sku.as_str()))
            && matches_any(&self.name_terms, obs.product_name.as_deref())
            && matches_any(&self.category_terms, obs.product_category.as_deref())
    }

    pub fn apply(&self, history: &[Observation]) -> Vec<Observation> {
        history.iter().filter(|o| self.matches(o)).cloned().collect()
    }
}

fn matches_any(terms: &[String], value: Option<&str>) -> bool {
    if terms.is_empty() {
        return true;
    }
    let Some(value) = value else {
        return false;
    };
    let value = value.to_lowercase();
    terms.iter().any(|t| value.contains(t.as_str()))
}
