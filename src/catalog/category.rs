//! Categories of items and the overall catalog

use super::item::Item;
use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A named group of items (e.g. "Medications", "Therapies")
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub name: String,

    /// Inflation rate applied to items that don't declare their own
    pub default_inflation_rate: f64,

    pub items: Vec<Item>,
}

impl Category {
    pub fn new(name: impl Into<String>, default_inflation_rate: f64) -> Self {
        Self {
            name: name.into(),
            default_inflation_rate,
            items: Vec::new(),
        }
    }

    /// Builder-style add
    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Remove the first item with this name; returns whether one was removed
    pub fn remove_item(&mut self, name: &str) -> bool {
        match self.items.iter().position(|i| i.name == name) {
            Some(idx) => {
                self.items.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn get_item(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.name == name)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Pairs of items in this category active in the same year within `[first, last]`
    pub fn overlaps(&self, first: i32, last: i32) -> Vec<ItemOverlap> {
        let active: Vec<_> = self
            .items
            .iter()
            .map(|item| item.timing.years_within(first, last))
            .collect();

        let mut overlaps = Vec::new();
        for i in 0..self.items.len() {
            for j in (i + 1)..self.items.len() {
                let years: Vec<i32> = active[i].intersection(&active[j]).copied().collect();
                if !years.is_empty() {
                    overlaps.push(ItemOverlap {
                        category: self.name.clone(),
                        first: self.items[i].name.clone(),
                        second: self.items[j].name.clone(),
                        years,
                    });
                }
            }
        }
        overlaps
    }
}

/// Two items in one category that share active years
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemOverlap {
    pub category: String,
    pub first: String,
    pub second: String,
    pub years: Vec<i32>,
}

/// Ordered, name-unique set of categories
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Catalog {
    categories: Vec<Category>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate category names
    pub fn new(categories: Vec<Category>) -> Result<Self, ConfigurationError> {
        let mut seen = HashSet::new();
        for category in &categories {
            if !seen.insert(category.name.as_str()) {
                return Err(ConfigurationError::DuplicateCategory(category.name.clone()));
            }
        }
        Ok(Self { categories })
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.categories.iter().map(Category::item_count).sum()
    }

    /// Every item in catalog order, with its category
    pub fn items(&self) -> impl Iterator<Item = (&Category, &Item)> {
        self.categories
            .iter()
            .flat_map(|c| c.items.iter().map(move |i| (c, i)))
    }

    pub fn overlaps(&self, first: i32, last: i32) -> Vec<ItemOverlap> {
        self.categories
            .iter()
            .flat_map(|c| c.overlaps(first, last))
            .collect()
    }
}
