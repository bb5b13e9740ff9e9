use std::fmt;

use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

use crate::style::StyleOptions;

// ---------------------------------------------------------------------------
// MassUnit – how the mass column of a curve is rescaled
// ---------------------------------------------------------------------------

/// Grams per solar mass, as used by the `gram` unit tag.
pub const GRAMS_PER_SOLAR_MASS: f64 = 2e33;

/// GeV per TeV, as used by the `tev` unit tag.
pub const GEV_PER_TEV: f64 = 1e3;

/// Unit tag attached to a curve's mass column.
///
/// Unknown tags deserialize to [`MassUnit::Native`] so they leave the data
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MassUnit {
    /// No conversion.
    #[default]
    Native,
    /// Mass given in grams; normalised to solar masses.
    Gram,
    /// Mass given in TeV; converted to GeV.
    Tev,
}

impl MassUnit {
    /// Interpret a tag string. Only the exact tags `gram` and `tev` convert;
    /// anything else leaves masses as they are.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "gram" => MassUnit::Gram,
            "tev" => MassUnit::Tev,
            "" | "native" => MassUnit::Native,
            other => {
                warn!("unknown mass_unit '{other}' (tags are 'gram' or 'tev'), leaving masses unscaled");
                MassUnit::Native
            }
        }
    }

    /// Convert one mass value into the plotted unit.
    pub fn apply(self, mass: f64) -> f64 {
        match self {
            MassUnit::Native => mass,
            MassUnit::Gram => mass / GRAMS_PER_SOLAR_MASS,
            MassUnit::Tev => mass * GEV_PER_TEV,
        }
    }
}

impl<'de> Deserialize<'de> for MassUnit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = Option::<String>::deserialize(deserializer)?;
        Ok(tag.as_deref().map(MassUnit::from_tag).unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Coordinate – label positions arrive as numbers or numeric strings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Coordinate(pub f64);

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(v) => Ok(Coordinate(v)),
            Raw::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(Coordinate)
                .map_err(|_| serde::de::Error::custom(format!("'{s}' is not a number"))),
        }
    }
}

// ---------------------------------------------------------------------------
// MassLimit – the two parallel columns of a curve
// ---------------------------------------------------------------------------

/// Parsed curve data. `mass` and `limit` always have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MassLimit {
    pub mass: Vec<f64>,
    pub limit: Vec<f64>,
}

impl MassLimit {
    pub fn len(&self) -> usize {
        self.mass.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mass.is_empty()
    }

    /// Rescale the mass column in place.
    pub fn rescale(&mut self, unit: MassUnit) {
        if unit == MassUnit::Native {
            return;
        }
        for m in &mut self.mass {
            *m = unit.apply(*m);
        }
    }

    /// `(mass, limit)` pairs in row order.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.mass
            .iter()
            .copied()
            .zip(self.limit.iter().copied())
            .collect()
    }

    /// Whether the mass column is non-decreasing.
    pub fn is_sorted_by_mass(&self) -> bool {
        self.mass.windows(2).all(|w| w[0] <= w[1])
    }

    /// `(min, max)` of the mass column, ignoring NaN.
    pub fn mass_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.mass.iter().copied().filter(|m| !m.is_nan());
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), m| (lo.min(m), hi.max(m))))
    }
}

// ---------------------------------------------------------------------------
// Curve – one configured exclusion-limit dataset
// ---------------------------------------------------------------------------

/// One curve entry from a figure description.
///
/// The numeric payload is either the inline `xystring` blob or a `file`
/// inside the data directory, loaded into `points` before rendering.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Curve {
    /// Key of the curve in its figure description; used in error messages.
    #[serde(skip)]
    pub name: String,
    #[serde(default)]
    pub xystring: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub mass_unit: MassUnit,
    #[serde(default)]
    pub style: StyleOptions,
    #[serde(default)]
    pub label_x: Option<Coordinate>,
    #[serde(default)]
    pub label_y: Option<Coordinate>,
    #[serde(default)]
    pub fontsize: Option<f64>,
    #[serde(default)]
    pub rotation: Option<f64>,

    /// Raw (unscaled) points loaded from `file`.
    #[serde(skip)]
    pub points: Option<MassLimit>,
}

impl Curve {
    /// Build a curve from an inline blob; mostly useful in tests and tools.
    pub fn from_xystring(xystring: impl Into<String>) -> Self {
        Curve {
            xystring: Some(xystring.into()),
            ..Curve::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_unit(mut self, unit: MassUnit) -> Self {
        self.mass_unit = unit;
        self
    }

    pub fn with_style(mut self, style: StyleOptions) -> Self {
        self.style = style;
        self
    }

    pub fn with_label_at(mut self, x: f64, y: f64) -> Self {
        self.label_x = Some(Coordinate(x));
        self.label_y = Some(Coordinate(y));
        self
    }
}

impl fmt::Display for MassUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MassUnit::Native => write!(f, "native"),
            MassUnit::Gram => write!(f, "gram"),
            MassUnit::Tev => write!(f, "tev"),
        }
    }
}
