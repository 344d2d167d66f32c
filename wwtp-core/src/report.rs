//! Named process variables reported by each unit process.
//!
//! Reports are observational: nothing downstream reads a value back out of a
//! report to drive a calculation. Typed stage variables implement
//! [`ProcessVariables`] (usually derived) to produce one.

use serde::{Deserialize, Serialize};

/// Typed stage variables that can be flattened into a [`ProcessReport`].
///
/// Usually derived: every field tagged `#[variable(name = "...", unit = "...",
/// description = "...")]` becomes one entry, in declaration order.
pub trait ProcessVariables {
    fn to_report(&self) -> ProcessReport;
}

/// One reported quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessVariable {
    pub name: String,
    pub value: f64,
    pub unit: String,
    pub description: String,
}

/// Ordered collection of [`ProcessVariable`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessReport {
    variables: Vec<ProcessVariable>,
}

impl ProcessReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a variable, replacing any earlier one with the same name in place.
    pub fn insert(&mut self, name: &str, value: f64, unit: &str, description: &str) {
        let variable = ProcessVariable {
            name: name.to_string(),
            value,
            unit: unit.to_string(),
            description: description.to_string(),
        };
        match self.variables.iter_mut().find(|v| v.name == name) {
            Some(existing) => *existing = variable,
            None => self.variables.push(variable),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ProcessVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Value of a named variable.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.get(name).map(|v| v.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessVariable> {
        self.variables.iter()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Append every variable of `other`.
    pub fn merge(&mut self, other: &ProcessReport) {
        for v in other.iter() {
            self.insert(&v.name, v.value, &v.unit, &v.description);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_preserved() {
        let mut report = ProcessReport::new();
        report.insert("Qe", 24.0, "ML/d", "Effluent flow");
        report.insert("Qw", 1.0, "ML/d", "Wastage flow");
        let names: Vec<_> = report.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["Qe", "Qw"]);
    }

    #[test]
    fn test_insert_replaces_existing() {
        let mut report = ProcessReport::new();
        report.insert("FOt", 1.0, "kgO/d", "");
        report.insert("Qw", 1.0, "ML/d", "");
        report.insert("FOt", 2.0, "kgO/d", "Total oxygen demand");
        assert_eq!(report.len(), 2);
        assert_eq!(report.value("FOt"), Some(2.0));
        assert_eq!(report.iter().next().map(|v| v.name.as_str()), Some("FOt"));
    }

    #[test]
    fn test_merge() {
        let mut a = ProcessReport::new();
        a.insert("x", 1.0, "", "");
        let mut b = ProcessReport::new();
        b.insert("y", 2.0, "", "");
        a.merge(&b);
        assert_eq!(a.value("y"), Some(2.0));
        assert!(a.value("z").is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let mut report = ProcessReport::new();
        report.insert("HRT", 8.13, "h", "Hydraulic retention time");
        let json = serde_json::to_string(&report).unwrap();
        let back: ProcessReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report, back);
    }
}
