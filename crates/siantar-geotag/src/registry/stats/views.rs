use super::super::domain::NetworkType;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NetworkBreakdown {
    pub single: usize,
    pub branch: usize,
}

impl NetworkBreakdown {
    pub fn count(&self, network_type: NetworkType) -> usize {
        match network_type {
            NetworkType::Single => self.single,
            NetworkType::Branch => self.branch,
        }
    }

    pub fn total(&self) -> usize {
        self.single + self.branch
    }

    /// Labelled entries in the fixed single-then-branch order.
    pub fn entries(&self) -> Vec<CategoryCount> {
        NetworkType::ordered()
            .into_iter()
            .map(|network_type| CategoryCount {
                name: network_type.label().to_string(),
                count: self.count(network_type),
            })
            .collect()
    }
}
