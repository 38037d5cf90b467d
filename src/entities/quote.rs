//! Repair quote - parts and labor cost breakdown with derived total

use serde::{Deserialize, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};

/// A part line on a quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairPart {
    /// Line identifier, unique within the quote
    pub id: EntityId,

    /// Part description, e.g. "Pantalla"
    pub name: String,

    /// Price charged for the part
    pub price: f64,
}

impl RepairPart {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Part),
            name: name.into(),
            price,
        }
    }
}

/// Parts + labor breakdown for a repair
///
/// `total` is derived. Mutate through the methods below so it never drifts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub parts: Vec<RepairPart>,

    #[serde(default)]
    pub labor: f64,

    #[serde(default)]
    pub total: f64,
}

impl Quote {
    /// Sum of part prices plus labor
    pub fn computed_total(&self) -> f64 {
        let parts: f64 = self.parts.iter().map(|p| p.price).sum();
        parts + self.labor
    }

    /// Whether the stored total matches its inputs
    pub fn is_consistent(&self) -> bool {
        self.total == self.computed_total()
    }

    pub fn recompute_total(&mut self) {
        self.total = self.computed_total();
    }

    /// Return the quote with its total recomputed
    pub fn normalized(mut self) -> Self {
        self.recompute_total();
        self
    }

    pub fn add_part(&mut self, part: RepairPart) {
        self.parts.push(part);
        self.recompute_total();
    }

    /// Remove a part by id; returns the removed line
    pub fn remove_part(&mut self, part_id: &EntityId) -> Option<RepairPart> {
        let index = self.parts.iter().position(|p| &p.id == part_id)?;
        let removed = self.parts.remove(index);
        self.recompute_total();
        Some(removed)
    }

    pub fn set_labor(&mut self, labor: f64) {
        self.labor = labor;
        self.recompute_total();
    }
}

/// Check a money amount: finite and not negative
pub fn validate_amount(amount: f64) -> Result<f64, String> {
    if !amount.is_finite() {
        return Err(format!("Amount must be a finite number, got {}", amount));
    }
    if amount < 0.0 {
        return Err(format!("Amount cannot be negative, got {}", amount));
    }
    Ok(amount)
}
