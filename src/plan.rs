use serde::{Deserialize, Serialize};

use crate::container::Container;
use crate::error::{Error, Result};
use crate::solver::PackingConfig;
use crate::types::{Dims, Item, OrientationPolicy, Position, check_unique_ids};

/// Everything needed for one run: container, catalog and engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoadPlan {
    pub container: Dims,
    pub items: Vec<Item>,
    #[serde(default)]
    pub config: PackingConfig,
}

impl LoadPlan {
    pub fn new(container: Dims, items: Vec<Item>) -> Self {
        Self {
            container,
            items,
            config: PackingConfig::default(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let plan: LoadPlan =
            serde_json::from_str(json).map_err(|e| Error::InvalidPlan(e.to_string()))?;
        plan.validated()
    }

    /// Checks the container and ids, and regenerates every item's
    /// orientations from `config.orientations`.
    pub fn validated(self) -> Result<Self> {
        let container = self.container.validated()?;
        check_unique_ids(&self.items)?;
        let policy = self.config.orientations;
        let items = self
            .items
            .into_iter()
            .map(|i| i.reoriented(policy))
            .collect();
        Ok(Self {
            container,
            items,
            config: self.config,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementRecord {
    pub id: String,
    pub position: Position,
    pub orientation: Dims,
    pub rotated: bool,
    pub value: f64,
    pub weight: f64,
}

/// Read-only export of a loaded container.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadReport {
    pub container: Dims,
    pub placements: Vec<PlacementRecord>,
    pub total_value: f64,
    pub used_volume: u64,
    pub utilization_percent: f64,
    pub not_placed: Vec<String>,
}

impl LoadReport {
    pub fn new(container: &Container<'_>, not_placed: &[&Item]) -> Self {
        let placements = container
            .placements()
            .iter()
            .map(|p| PlacementRecord {
                id: p.item.id().to_string(),
                position: p.position,
                orientation: p.orientation,
                rotated: p.orientation != p.item.dims(),
                value: p.item.value(),
                weight: p.item.weight(),
            })
            .collect();

        Self {
            container: container.dims(),
            placements,
            total_value: container.total_value(),
            used_volume: container.used_volume(),
            utilization_percent: container.utilization_percent(),
            not_placed: not_placed.iter().map(|i| i.id().to_string()).collect(),
        }
    }

    pub fn placed_count(&self) -> usize {
        self.placements.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{Solver, TieBreak};

    #[test]
    fn test_plan_from_json_defaults() {
        let plan = LoadPlan::from_json(
            r#"{
                "container": {"width": 8, "height": 8, "depth": 8},
                "items": [
                    {"id": "a", "width": 3, "height": 4, "depth": 2, "value": 100, "weight": 20}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(plan.container, Dims::new(8, 8, 8));
        assert_eq!(plan.config.orientations, OrientationPolicy::Upright);
        assert_eq!(plan.config, PackingConfig::default());
        assert_eq!(plan.items[0].orientations().len(), 2);
    }

    #[test]
    fn test_plan_applies_policy_and_config() {
        let plan = LoadPlan::from_json(
            r#"{
                "container": {"width": 4, "height": 4, "depth": 4},
                "items": [
                    {"id": "a", "width": 1, "height": 2, "depth": 3, "value": 1, "weight": 1}
                ],
                "config": {"orientations": "all", "tie_break": "first-found"}
            }"#,
        )
        .unwrap();
        assert_eq!(plan.items[0].orientations().len(), 6);
        assert_eq!(plan.items[0].policy(), OrientationPolicy::All);
        assert_eq!(plan.config.tie_break, TieBreak::FirstFound);
    }

    #[test]
    fn test_plan_rejects_misplaced_settings() {
        let misspelled = r#"{
            "container": {"width": 4, "height": 4, "depth": 4},
            "items": [],
            "config": {"orientation": "all"}
        }"#;
        assert!(matches!(
            LoadPlan::from_json(misspelled),
            Err(Error::InvalidPlan(_))
        ));

        let outside_config = r#"{
            "container": {"width": 4, "height": 4, "depth": 4},
            "items": [],
            "orientations": "all"
        }"#;
        assert!(matches!(
            LoadPlan::from_json(outside_config),
            Err(Error::InvalidPlan(_))
        ));
    }

    #[test]
    fn test_plan_rejects_oversized_container() {
        let huge = r#"{
            "container": {"width": 3000000, "height": 3000000, "depth": 3000000},
            "items": []
        }"#;
        assert_eq!(
            LoadPlan::from_json(huge).unwrap_err(),
            Error::VolumeOverflow(Dims::new(3_000_000, 3_000_000, 3_000_000))
        );
    }

    #[test]
    fn test_plan_rejects_bad_input() {
        let duplicate = r#"{
            "container": {"width": 4, "height": 4, "depth": 4},
            "items": [
                {"id": "a", "width": 1, "height": 1, "depth": 1, "value": 1, "weight": 1},
                {"id": "a", "width": 1, "height": 1, "depth": 1, "value": 1, "weight": 1}
            ]
        }"#;
        assert_eq!(
            LoadPlan::from_json(duplicate).unwrap_err(),
            Error::DuplicateId("a".to_string())
        );

        let empty_container = r#"{"container": {"width": 0, "height": 4, "depth": 4}, "items": []}"#;
        assert_eq!(
            LoadPlan::from_json(empty_container).unwrap_err(),
            Error::InvalidDimensions(Dims::new(0, 4, 4))
        );

        let bad_item = r#"{
            "container": {"width": 4, "height": 4, "depth": 4},
            "items": [{"id": "a", "width": 1, "height": 1, "depth": 1, "value": -3, "weight": 1}]
        }"#;
        assert!(matches!(
            LoadPlan::from_json(bad_item),
            Err(Error::InvalidPlan(_))
        ));
    }

    #[test]
    fn test_report() {
        let items = vec![
            Item::new("wide", Dims::new(2, 1, 1), 7.0, 2.0).unwrap(),
            Item::new("big", Dims::new(3, 3, 3), 1.0, 1.0).unwrap(),
        ];
        let mut c = Container::new(Dims::new(1, 2, 1)).unwrap();
        let outcome = Solver::default().optimize(&mut c, &items);
        let report = LoadReport::new(&c, &outcome.not_placed);

        assert_eq!(report.placed_count(), 1);
        let record = &report.placements[0];
        assert_eq!(record.id, "wide");
        assert_eq!(record.orientation, Dims::new(1, 2, 1));
        assert!(record.rotated);
        assert_eq!(report.not_placed, vec!["big".to_string()]);
        assert_eq!(report.used_volume, 2);
        assert!((report.utilization_percent - 100.0).abs() < 1e-9);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["placements"][0]["position"]["x"], 0);
        assert_eq!(json["total_value"], 7.0);
    }
}
