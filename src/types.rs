use std::collections::HashSet;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dims {
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub width: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub height: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub depth: u32,
}

impl Dims {
    pub const fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// `None` when the product does not fit in a `u64`.
    pub fn checked_volume(&self) -> Option<u64> {
        (self.width as u64)
            .checked_mul(self.height as u64)?
            .checked_mul(self.depth as u64)
    }

    /// Saturates at `u64::MAX`; validated dimensions never reach it.
    pub fn volume(&self) -> u64 {
        self.checked_volume().unwrap_or(u64::MAX)
    }

    pub fn fits_in(&self, other: &Dims) -> bool {
        self.width <= other.width && self.height <= other.height && self.depth <= other.depth
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0 || self.depth == 0
    }

    /// Rejects dimensions with a zero side or a volume beyond `u64`.
    pub fn validated(self) -> Result<Self> {
        if self.is_degenerate() {
            return Err(Error::InvalidDimensions(self));
        }
        if self.checked_volume().is_none() {
            return Err(Error::VolumeOverflow(self));
        }
        Ok(self)
    }
}

impl std::fmt::Display for Dims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.depth)
    }
}

/// Minimum corner of a placed box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl Position {
    pub const ORIGIN: Position = Position::new(0, 0, 0);

    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Sort key for the raster order used by every search: z, then y, then x.
    pub fn raster_key(&self) -> (u32, u32, u32) {
        (self.z, self.y, self.x)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Axis-aligned box occupying `position .. position + dims`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cuboid {
    pub position: Position,
    pub dims: Dims,
}

impl Cuboid {
    pub fn new(position: Position, dims: Dims) -> Self {
        Self { position, dims }
    }

    pub fn max_corner(&self) -> (u64, u64, u64) {
        (
            self.position.x as u64 + self.dims.width as u64,
            self.position.y as u64 + self.dims.height as u64,
            self.position.z as u64 + self.dims.depth as u64,
        )
    }

    pub fn within(&self, bounds: &Dims) -> bool {
        let (x1, y1, z1) = self.max_corner();
        x1 <= bounds.width as u64 && y1 <= bounds.height as u64 && z1 <= bounds.depth as u64
    }

    /// Separating-axis test: two boxes are disjoint iff they are separated
    /// along at least one axis. Shared faces do not count as overlap.
    pub fn intersects(&self, other: &Cuboid) -> bool {
        let (ax, ay, az) = (
            self.position.x as u64,
            self.position.y as u64,
            self.position.z as u64,
        );
        let (bx, by, bz) = (
            other.position.x as u64,
            other.position.y as u64,
            other.position.z as u64,
        );
        let (ax1, ay1, az1) = self.max_corner();
        let (bx1, by1, bz1) = other.max_corner();

        !(ax >= bx1 || ax1 <= bx || ay >= by1 || ay1 <= by || az >= bz1 || az1 <= bz)
    }
}

/// Which permutations of an item's dimensions may be used for placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrientationPolicy {
    /// Natural orientation only.
    Fixed,
    /// Natural orientation plus width/height swapped; depth never moves.
    #[default]
    Upright,
    /// All six axis permutations.
    All,
}

impl OrientationPolicy {
    pub fn orientations(&self, d: Dims) -> Vec<Dims> {
        let (w, h, z) = (d.width, d.height, d.depth);
        match self {
            OrientationPolicy::Fixed => vec![d],
            OrientationPolicy::Upright => vec![d, Dims::new(h, w, z)],
            OrientationPolicy::All => vec![
                d,
                Dims::new(h, w, z),
                Dims::new(w, z, h),
                Dims::new(z, w, h),
                Dims::new(h, z, w),
                Dims::new(z, h, w),
            ],
        }
    }
}

impl std::str::FromStr for OrientationPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(OrientationPolicy::Fixed),
            "upright" => Ok(OrientationPolicy::Upright),
            "all" => Ok(OrientationPolicy::All),
            _ => Err(format!(
                "invalid orientation policy '{}', expected: fixed, upright, or all",
                s
            )),
        }
    }
}

/// A box to be loaded. Immutable once built; the derived metrics are
/// computed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ItemSpec", into = "ItemSpec")]
pub struct Item {
    id: String,
    dims: Dims,
    value: f64,
    weight: f64,
    volume: u64,
    value_density: f64,
    policy: OrientationPolicy,
    orientations: Vec<Dims>,
}

impl Item {
    pub fn new(id: impl Into<String>, dims: Dims, value: f64, weight: f64) -> Result<Self> {
        Self::with_policy(id, dims, value, weight, OrientationPolicy::default())
    }

    pub fn with_policy(
        id: impl Into<String>,
        dims: Dims,
        value: f64,
        weight: f64,
        policy: OrientationPolicy,
    ) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(Error::item(&id, "id must not be empty"));
        }
        if dims.is_degenerate() {
            return Err(Error::item(
                &id,
                format!("dimensions {} must be non-zero", dims),
            ));
        }
        if !value.is_finite() || value < 0.0 {
            return Err(Error::item(
                &id,
                format!("value {} must be a non-negative number", value),
            ));
        }
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::item(
                &id,
                format!("weight {} must be a non-negative number", weight),
            ));
        }

        let Some(volume) = dims.checked_volume() else {
            return Err(Error::item(
                &id,
                format!("dimensions {} are too large, volume overflows", dims),
            ));
        };
        Ok(Self {
            id,
            dims,
            value,
            weight,
            volume,
            value_density: value / volume as f64,
            policy,
            orientations: policy.orientations(dims),
        })
    }

    /// Same item with its orientation set regenerated from `policy`.
    pub fn reoriented(mut self, policy: OrientationPolicy) -> Self {
        self.policy = policy;
        self.orientations = policy.orientations(self.dims);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn volume(&self) -> u64 {
        self.volume
    }

    pub fn value_density(&self) -> f64 {
        self.value_density
    }

    pub fn policy(&self) -> OrientationPolicy {
        self.policy
    }

    pub fn orientations(&self) -> &[Dims] {
        &self.orientations
    }
}

impl std::fmt::Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.id, self.dims)
    }
}

/// Wire form of an [`Item`]; validated on conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSpec {
    pub id: String,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub width: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub height: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub depth: u32,
    pub value: f64,
    pub weight: f64,
}

impl TryFrom<ItemSpec> for Item {
    type Error = Error;

    fn try_from(spec: ItemSpec) -> Result<Self> {
        Item::new(
            spec.id,
            Dims::new(spec.width, spec.height, spec.depth),
            spec.value,
            spec.weight,
        )
    }
}

impl From<Item> for ItemSpec {
    fn from(item: Item) -> Self {
        ItemSpec {
            id: item.id,
            width: item.dims.width,
            height: item.dims.height,
            depth: item.dims.depth,
            value: item.value,
            weight: item.weight,
        }
    }
}

pub fn check_unique_ids(items: &[Item]) -> Result<()> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.id()) {
            return Err(Error::DuplicateId(item.id().to_string()));
        }
    }
    Ok(())
}

/// Accepts JSON numbers such as `3` or `3.0` for integer fields, rejecting
/// fractions, negatives and anything above `u32::MAX`.
pub fn deserialize_u32_from_number<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let n = serde_json::Number::deserialize(deserializer)?;
    if let Some(v) = n.as_u64() {
        return u32::try_from(v)
            .map_err(|_| D::Error::custom(format!("{} is out of range for u32", v)));
    }
    if let Some(f) = n.as_f64()
        && f.fract() == 0.0
        && (0.0..=u32::MAX as f64).contains(&f)
    {
        return Ok(f as u32);
    }
    Err(D::Error::custom(format!(
        "expected a non-negative whole number, got {}",
        n
    )))
}
