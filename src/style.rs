use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::{COLORS, ColorError, parse_color};

pub const ALPHA: f64 = 0.35;
pub const LINEWIDTH: f64 = 2.0;

#[derive(Debug, Error, PartialEq)]
pub enum StyleError {
    #[error("curve '{curve}': style is missing required key '{key}'")]
    Missing { curve: String, key: &'static str },
    #[error("curve '{curve}': {source}")]
    Color {
        curve: String,
        #[source]
        source: ColorError,
    },
}

// ---------------------------------------------------------------------------
// StyleOptions – per-curve drawing overrides
// ---------------------------------------------------------------------------

/// Drawing parameters attached to a curve. Every field is optional; render
/// paths either merge [`default_style`] underneath or require the fields they
/// use.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StyleOptions {
    pub color: Option<String>,
    pub alpha: Option<f64>,
    #[serde(alias = "lw")]
    pub linewidth: Option<f64>,
    #[serde(alias = "ec")]
    pub edgecolor: Option<String>,
    #[serde(alias = "ls")]
    pub linestyle: Option<String>,
    pub label: Option<String>,
}

/// Blue, [`ALPHA`], [`LINEWIDTH`].
pub fn default_style() -> StyleOptions {
    StyleOptions {
        color: Some(COLORS[0].1.to_string()),
        alpha: Some(ALPHA),
        linewidth: Some(LINEWIDTH),
        ..StyleOptions::default()
    }
}

/// Fill every unset field of `options` from `defaults`. Fields already set
/// are never touched.
pub fn apply_defaults(mut options: StyleOptions, defaults: &StyleOptions) -> StyleOptions {
    fn fill<T: Clone>(slot: &mut Option<T>, default: &Option<T>) {
        if slot.is_none() {
            slot.clone_from(default);
        }
    }

    fill(&mut options.color, &defaults.color);
    fill(&mut options.alpha, &defaults.alpha);
    fill(&mut options.linewidth, &defaults.linewidth);
    fill(&mut options.edgecolor, &defaults.edgecolor);
    fill(&mut options.linestyle, &defaults.linestyle);
    fill(&mut options.label, &defaults.label);
    options
}

impl StyleOptions {
    /// `self` layered over the figure-wide defaults.
    pub fn merged(&self) -> StyleOptions {
        apply_defaults(self.clone(), &default_style())
    }

    pub fn require_color(&self, curve: &str) -> Result<RGBColor, StyleError> {
        let spec = require(&self.color, curve, "color")?;
        resolve(spec, curve)
    }

    pub fn require_edgecolor(&self, curve: &str) -> Result<RGBColor, StyleError> {
        let spec = require(&self.edgecolor, curve, "edgecolor")?;
        resolve(spec, curve)
    }

    pub fn require_alpha(&self, curve: &str) -> Result<f64, StyleError> {
        require(&self.alpha, curve, "alpha").copied()
    }

    pub fn require_linestyle(&self, curve: &str) -> Result<&str, StyleError> {
        require(&self.linestyle, curve, "linestyle").map(String::as_str)
    }

    /// Colour if set; errors only on an unparseable value.
    pub fn color(&self, curve: &str) -> Result<Option<RGBColor>, StyleError> {
        self.color.as_deref().map(|c| resolve(c, curve)).transpose()
    }
}

fn require<'a, T>(slot: &'a Option<T>, curve: &str, key: &'static str) -> Result<&'a T, StyleError> {
    slot.as_ref().ok_or_else(|| StyleError::Missing {
        curve: curve.to_string(),
        key,
    })
}

fn resolve(spec: &str, curve: &str) -> Result<RGBColor, StyleError> {
    parse_color(spec).map_err(|source| StyleError::Color {
        curve: curve.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_gaps_only() {
        let options = StyleOptions {
            color: Some("red".into()),
            edgecolor: Some("k".into()),
            ..StyleOptions::default()
        };
        let merged = apply_defaults(options, &default_style());
        assert_eq!(merged.color.as_deref(), Some("red"));
        assert_eq!(merged.edgecolor.as_deref(), Some("k"));
        assert_eq!(merged.alpha, Some(ALPHA));
        assert_eq!(merged.linewidth, Some(LINEWIDTH));
        assert_eq!(merged.linestyle, None);
    }

    #[test]
    fn merge_never_overwrites_present_keys() {
        let full = StyleOptions {
            color: Some("gray".into()),
            alpha: Some(0.9),
            linewidth: Some(0.5),
            edgecolor: Some("red".into()),
            linestyle: Some("--".into()),
            label: Some("x".into()),
        };
        let other = StyleOptions {
            color: Some("blue".into()),
            alpha: Some(0.1),
            linewidth: Some(4.0),
            edgecolor: Some("k".into()),
            linestyle: Some(":".into()),
            label: Some("y".into()),
        };
        assert_eq!(apply_defaults(full.clone(), &other), full);
    }

    #[test]
    fn missing_required_key_names_curve_and_key() {
        let style = StyleOptions::default().merged();
        let err = style.require_edgecolor("dwarfs").unwrap_err();
        assert_eq!(
            err,
            StyleError::Missing {
                curve: "dwarfs".into(),
                key: "edgecolor"
            }
        );
        assert!(err.to_string().contains("'edgecolor'"));
    }

    #[test]
    fn parses_aliases() {
        let style: StyleOptions =
            serde_json::from_str(r#"{"lw": 3, "ls": "--", "ec": "k", "zorder": 5}"#).unwrap();
        assert_eq!(style.linewidth, Some(3.0));
        assert_eq!(style.linestyle.as_deref(), Some("--"));
        assert_eq!(style.edgecolor.as_deref(), Some("k"));
    }

    #[test]
    fn bad_colour_is_reported_per_curve() {
        let style = StyleOptions {
            color: Some("nope".into()),
            ..StyleOptions::default()
        };
        assert!(matches!(style.color("c"), Err(StyleError::Color { .. })));
    }
}
