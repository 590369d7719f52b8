use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::{Level, debug, info};

use crate::container::Container;
use crate::search::PositionSearch;
use crate::types::{Dims, Item, OrientationPolicy, Position};

/// Priority used to order items before placement. Every key sorts
/// descending and ties keep input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemOrder {
    #[default]
    Weight,
    Value,
    ValueDensity,
    Volume,
}

impl ItemOrder {
    fn compare(&self, a: &Item, b: &Item) -> Ordering {
        match self {
            ItemOrder::Weight => b.weight().total_cmp(&a.weight()),
            ItemOrder::Value => b.value().total_cmp(&a.value()),
            ItemOrder::ValueDensity => b.value_density().total_cmp(&a.value_density()),
            ItemOrder::Volume => b.volume().cmp(&a.volume()),
        }
    }
}

impl std::str::FromStr for ItemOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weight" => Ok(ItemOrder::Weight),
            "value" => Ok(ItemOrder::Value),
            "value-density" => Ok(ItemOrder::ValueDensity),
            "volume" => Ok(ItemOrder::Volume),
            _ => Err(format!(
                "invalid order '{}', expected: weight, value, value-density, or volume",
                s
            )),
        }
    }
}

/// How the search settles candidates with equal wasted volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreak {
    /// Lower elevation wins among equal-waste candidates.
    #[default]
    GroundFirst,
    /// The first equal-waste candidate in enumeration order wins, whatever
    /// its elevation.
    FirstFound,
}

impl std::str::FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ground-first" => Ok(TieBreak::GroundFirst),
            "first-found" => Ok(TieBreak::FirstFound),
            _ => Err(format!(
                "invalid tie-break '{}', expected: ground-first or first-found",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackingConfig {
    /// Orientation set given to every item of a plan; applied to the
    /// catalog by `LoadPlan::validated`.
    pub orientations: OrientationPolicy,
    pub order: ItemOrder,
    pub tie_break: TieBreak,
    pub search: PositionSearch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub position: Position,
    pub orientation: Dims,
    pub wasted_volume: u64,
}

impl Candidate {
    fn beats(&self, best: &Candidate, tie_break: TieBreak) -> bool {
        match tie_break {
            TieBreak::GroundFirst => {
                (self.wasted_volume, self.position.z) < (best.wasted_volume, best.position.z)
            }
            TieBreak::FirstFound => self.wasted_volume < best.wasted_volume,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<'a> {
    pub total_value: f64,
    /// Items that found no feasible placement, in processing order.
    pub not_placed: Vec<&'a Item>,
}

pub struct Solver {
    config: PackingConfig,
}

impl Solver {
    pub fn new(config: PackingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PackingConfig {
        &self.config
    }

    /// Greedily loads `items` into `container`, discarding whatever it held.
    pub fn optimize<'a>(&self, container: &mut Container<'a>, items: &'a [Item]) -> Outcome<'a> {
        let mut ordered: Vec<&Item> = items.iter().collect();
        ordered.sort_by(|a, b| self.config.order.compare(a, b));

        container.clear();
        let mut not_placed = Vec::new();

        for item in ordered {
            match self.find_best(container, item) {
                Some(best) => {
                    debug!(
                        item = item.id(),
                        position = %best.position,
                        orientation = %best.orientation,
                        "placed"
                    );
                    container.place(item, best.position, best.orientation);
                }
                None => {
                    debug!(item = item.id(), "no feasible position");
                    not_placed.push(item);
                }
            }
        }

        let total_value = container.total_value();
        info!(
            placed = container.len(),
            not_placed = not_placed.len(),
            total_value,
            utilization = %format_args!("{:.1}%", container.utilization_percent()),
            "optimization finished"
        );

        Outcome {
            total_value,
            not_placed,
        }
    }

    /// Best placement for `item` in the current state of `container`, or
    /// `None` if no orientation fits anywhere.
    ///
    /// With debug logging on, the choice is compared against the legacy
    /// tie-break and the legacy lattice range, and any difference is logged.
    pub fn find_best(&self, container: &Container<'_>, item: &Item) -> Option<Candidate> {
        let best = best_candidate(
            container,
            item,
            self.config.search,
            self.config.tie_break,
        );

        if tracing::enabled!(Level::DEBUG) {
            if self.config.tie_break != TieBreak::FirstFound {
                let first = best_candidate(container, item, self.config.search, TieBreak::FirstFound);
                if best != first {
                    debug!(
                        item = item.id(),
                        chosen = ?best.map(|c| c.position),
                        first_found = ?first.map(|c| c.position),
                        "ground-level preference changed the placement"
                    );
                }
            }
            if self.config.search == PositionSearch::Lattice {
                let legacy = best_candidate(
                    container,
                    item,
                    PositionSearch::LegacyLattice,
                    self.config.tie_break,
                );
                if best != legacy {
                    debug!(
                        item = item.id(),
                        chosen = ?best.map(|c| c.position),
                        legacy_lattice = ?legacy.map(|c| c.position),
                        "per-axis lattice range changed the placement"
                    );
                }
            }
        }

        best
    }
}

/// Waste does not depend on position and every search yields candidates in
/// raster order, so the first fit of each orientation is the only candidate
/// of that orientation that can win.
fn best_candidate(
    container: &Container<'_>,
    item: &Item,
    search: PositionSearch,
    tie_break: TieBreak,
) -> Option<Candidate> {
    let container_volume = container.volume();
    let mut best: Option<Candidate> = None;

    for &orientation in item.orientations() {
        let Some(position) = search.first_fit(container, orientation) else {
            continue;
        };
        let candidate = Candidate {
            position,
            orientation,
            wasted_volume: container_volume - orientation.volume(),
        };
        if best.is_none_or(|b| candidate.beats(&b, tie_break)) {
            best = Some(candidate);
        }
    }

    best
}

impl Default for Solver {
    fn default() -> Self {
        Self::new(PackingConfig::default())
    }
}

/// Runs the greedy engine with the default configuration and returns the
/// total loaded value with the items left out.
pub fn optimize<'a>(container: &mut Container<'a>, items: &'a [Item]) -> (f64, Vec<&'a Item>) {
    let outcome = Solver::default().optimize(container, items);
    (outcome.total_value, outcome.not_placed)
}

/// Places each item with its paired orientation at the first free lattice
/// position. Stops at the first item that does not fit; items already
/// placed stay in the container.
pub fn place_all_in_order<'a>(
    container: &mut Container<'a>,
    items: &[&'a Item],
    orientations: &[Dims],
) -> bool {
    for (&item, &orientation) in items.iter().zip(orientations) {
        match PositionSearch::Lattice.first_fit(container, orientation) {
            Some(position) => container.place(item, position, orientation),
            None => {
                debug!(item = item.id(), %orientation, "does not fit");
                return false;
            }
        }
    }
    true
}
