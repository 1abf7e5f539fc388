//! Named, categorized descriptions of optimization dimensions.

use serde::{Deserialize, Serialize};

/// Whether a dimension carries a length unit or is a pure ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintType {
    Dimensional,
    Dimensionless,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub category: String,
    pub name: String,
    pub constraint_type: ConstraintType,
    #[serde(default)]
    pub lower_bound: Option<f64>,
    #[serde(default)]
    pub upper_bound: Option<f64>,
}

impl Constraint {
    pub fn new(
        category: impl Into<String>,
        name: impl Into<String>,
        constraint_type: ConstraintType,
    ) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
            constraint_type,
            lower_bound: None,
            upper_bound: None,
        }
    }

    /// A constraint needs a non-blank name and category.
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && !self.category.trim().is_empty()
    }
}

/// Registry of constraints grouped by category, categories in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    categories: Vec<(String, Vec<Constraint>)>,
    number_of_holes: usize,
    objective_display_name: String,
    objective_function_name: String,
    constraints_name: String,
}

impl Constraints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constraint under its own category. Invalid constraints are ignored.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        if !constraint.is_valid() {
            return;
        }
        let category = constraint.category.clone();
        if let Some(list) = self.constraints_mut(&category) {
            list.push(constraint);
        }
    }

    /// Append every constraint of `other`, category by category.
    pub fn merge(&mut self, other: &Constraints) {
        for (_, list) in &other.categories {
            for constraint in list {
                self.add_constraint(constraint.clone());
            }
        }
    }

    /// Constraints in a category, creating it empty on first use.
    /// Returns `None` for a blank category.
    pub fn constraints_mut(&mut self, category: &str) -> Option<&mut Vec<Constraint>> {
        if category.trim().is_empty() {
            return None;
        }
        let index = match self.categories.iter().position(|(name, _)| name == category) {
            Some(index) => index,
            None => {
                self.categories.push((category.to_string(), Vec::new()));
                self.categories.len() - 1
            }
        };
        Some(&mut self.categories[index].1)
    }

    /// Read-only lookup; unknown categories read as empty.
    pub fn get(&self, category: &str) -> Option<&[Constraint]> {
        if category.trim().is_empty() {
            return None;
        }
        Some(
            self.categories
                .iter()
                .find(|(name, _)| name == category)
                .map_or(&[][..], |(_, list)| list.as_slice()),
        )
    }

    /// Drop a whole category.
    pub fn clear_category(&mut self, category: &str) {
        self.categories.retain(|(name, _)| name != category);
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|(name, _)| name.as_str())
    }

    /// All constraints, in category order then insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.categories.iter().flat_map(|(_, list)| list.iter())
    }

    pub fn len(&self) -> usize {
        self.categories.iter().map(|(_, list)| list.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record lower bounds onto constraints in dimension order.
    pub fn set_lower_bounds(&mut self, bounds: &[f64]) {
        let all = self.categories.iter_mut().flat_map(|(_, list)| list.iter_mut());
        for (constraint, &value) in all.zip(bounds) {
            constraint.lower_bound = Some(value);
        }
    }

    /// Record upper bounds onto constraints in dimension order.
    pub fn set_upper_bounds(&mut self, bounds: &[f64]) {
        let all = self.categories.iter_mut().flat_map(|(_, list)| list.iter_mut());
        for (constraint, &value) in all.zip(bounds) {
            constraint.upper_bound = Some(value);
        }
    }

    pub fn number_of_holes(&self) -> usize {
        self.number_of_holes
    }

    pub fn set_number_of_holes(&mut self, number_of_holes: usize) {
        self.number_of_holes = number_of_holes;
    }

    pub fn objective_display_name(&self) -> &str {
        &self.objective_display_name
    }

    pub fn set_objective_display_name(&mut self, name: impl Into<String>) {
        self.objective_display_name = name.into();
    }

    pub fn objective_function_name(&self) -> &str {
        &self.objective_function_name
    }

    pub fn set_objective_function_name(&mut self, name: impl Into<String>) {
        self.objective_function_name = name.into();
    }

    pub fn constraints_name(&self) -> &str {
        &self.constraints_name
    }

    pub fn set_constraints_name(&mut self, name: impl Into<String>) {
        self.constraints_name = name.into();
    }
}
