// 📇 Binder Records - user data attached to one key
// Ownership, valuation, images and rarity for a canonical entry, extra or slot
//
// Absence of a record means: not owned, standard rarity, empty valuation.
// Records are created lazily on the first save/toggle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// RARITY
// ============================================================================

/// Rarity classification - one badge per card, independently filterable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Rarity {
    #[default]
    Standard,
    Ex,
    Gx,
    V,
    Vmax,
    Vstar,
    Mega,
}

impl Rarity {
    /// Every rarity, in rank order
    pub const ALL: [Rarity; 7] = [
        Rarity::Standard,
        Rarity::Ex,
        Rarity::Gx,
        Rarity::V,
        Rarity::Vmax,
        Rarity::Vstar,
        Rarity::Mega,
    ];

    /// Wire / storage label
    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Standard => "standard",
            Rarity::Ex => "EX",
            Rarity::Gx => "GX",
            Rarity::V => "V",
            Rarity::Vmax => "VMAX",
            Rarity::Vstar => "VSTAR",
            Rarity::Mega => "MEGA",
        }
    }

    /// Display weight used to order slots under a parent
    /// standard < EX < GX < V < VMAX < VSTAR < MEGA
    pub fn rank(&self) -> u8 {
        match self {
            Rarity::Standard => 0,
            Rarity::Ex => 1,
            Rarity::Gx => 2,
            Rarity::V => 3,
            Rarity::Vmax => 4,
            Rarity::Vstar => 5,
            Rarity::Mega => 6,
        }
    }

    pub fn is_standard(&self) -> bool {
        *self == Rarity::Standard
    }

    /// Lenient decode: unknown or empty labels degrade to standard
    pub fn from_label(label: &str) -> Rarity {
        match label.parse() {
            Ok(rarity) => rarity,
            Err(_) => {
                if !label.trim().is_empty() {
                    tracing::warn!(label, "unknown rarity label, using standard");
                }
                Rarity::Standard
            }
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rarity::ALL
            .iter()
            .copied()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown rarity: {}", s))
    }
}

impl From<String> for Rarity {
    fn from(label: String) -> Self {
        Rarity::from_label(&label)
    }
}

impl From<Rarity> for String {
    fn from(rarity: Rarity) -> Self {
        rarity.as_str().to_string()
    }
}

// ============================================================================
// VALUATION
// ============================================================================

/// Free-text valuation plus its parsed amount
///
/// Same split as a bank statement amount: the original text is kept for
/// display/edit, the numeric amount is what sorting and totals use.
/// `"£1,200.50"` → 1200.5, `"ask me"` → 0.0
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Valuation {
    text: String,
    amount: f64,
}

impl Valuation {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let amount = parse_amount(&text);
        Valuation { text, amount }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl PartialEq for Valuation {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl From<String> for Valuation {
    fn from(text: String) -> Self {
        Valuation::new(text)
    }
}

impl From<&str> for Valuation {
    fn from(text: &str) -> Self {
        Valuation::new(text)
    }
}

impl From<Valuation> for String {
    fn from(valuation: Valuation) -> Self {
        valuation.text
    }
}

/// Keep digits and '.', then parse. Anything unparseable is zero.
fn parse_amount(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

// ============================================================================
// BINDER RECORD
// ============================================================================

/// User-editable data for one key
///
/// Serialized with the field names the persisted store has always used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BinderRecord {
    /// Display-name override (empty = use roster name)
    pub name: String,
    pub owned: bool,
    pub value: Valuation,
    /// Primary image URL
    pub url: String,
    pub fan_art_url: String,
    pub dream_url: String,
    pub ideal_url: String,
    #[serde(rename = "cardType")]
    pub rarity: Rarity,
}

impl BinderRecord {
    /// Fresh record with only the ownership flag set
    pub fn owned(owned: bool) -> Self {
        BinderRecord {
            owned,
            ..Default::default()
        }
    }

    /// True when the record carries anything a backup must keep
    /// (the name override is tracked separately by the transport)
    pub fn has_data(&self) -> bool {
        self.owned
            || !self.value.is_empty()
            || !self.url.is_empty()
            || !self.fan_art_url.is_empty()
            || !self.dream_url.is_empty()
            || !self.ideal_url.is_empty()
            || !self.rarity.is_standard()
    }

    /// True when the record is indistinguishable from an absent one
    pub fn is_default(&self) -> bool {
        !self.has_data() && self.name.is_empty()
    }

    /// Name override, if one is set
    pub fn name_override(&self) -> Option<&str> {
        if self.name.is_empty() {
            None
        } else {
            Some(&self.name)
        }
    }

    /// Apply a partial update
    ///
    /// Per-field rules:
    /// - text fields: `Some` replaces (including with ""), `None` keeps
    /// - owned: `None` keeps the prior flag (false for a fresh record)
    /// - rarity: patch, else prior, else standard
    pub fn merge(prior: Option<&BinderRecord>, patch: &RecordPatch) -> BinderRecord {
        let base = prior.cloned().unwrap_or_default();

        BinderRecord {
            name: patch.name.clone().unwrap_or(base.name),
            owned: patch.owned.unwrap_or(base.owned),
            value: patch.value.clone().map(Valuation::new).unwrap_or(base.value),
            url: patch.url.clone().unwrap_or(base.url),
            fan_art_url: patch.fan_art_url.clone().unwrap_or(base.fan_art_url),
            dream_url: patch.dream_url.clone().unwrap_or(base.dream_url),
            ideal_url: patch.ideal_url.clone().unwrap_or(base.ideal_url),
            rarity: patch.rarity.or(prior.map(|p| p.rarity)).unwrap_or_default(),
        }
    }
}

// ============================================================================
// RECORD PATCH
// ============================================================================

/// Image fields a clipboard paste can target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageField {
    Primary,
    FanArt,
    Dream,
    Ideal,
}

/// Partial record for `save_record`; `None` = leave untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub name: Option<String>,
    pub owned: Option<bool>,
    pub value: Option<String>,
    pub url: Option<String>,
    pub fan_art_url: Option<String>,
    pub dream_url: Option<String>,
    pub ideal_url: Option<String>,
    pub rarity: Option<Rarity>,
}

impl RecordPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: set valuation text
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Builder pattern: set ownership
    pub fn with_owned(mut self, owned: bool) -> Self {
        self.owned = Some(owned);
        self
    }

    /// Builder pattern: set name override
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder pattern: set rarity
    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = Some(rarity);
        self
    }

    /// Builder pattern: set one of the image URLs
    pub fn with_image(mut self, field: ImageField, url: impl Into<String>) -> Self {
        self.set_image(field, url.into());
        self
    }

    pub fn set_image(&mut self, field: ImageField, url: String) {
        let slot = match field {
            ImageField::Primary => &mut self.url,
            ImageField::FanArt => &mut self.fan_art_url,
            ImageField::Dream => &mut self.dream_url,
            ImageField::Ideal => &mut self.ideal_url,
        };
        *slot = Some(url);
    }

    pub fn image(&self, field: ImageField) -> Option<&str> {
        match field {
            ImageField::Primary => self.url.as_deref(),
            ImageField::FanArt => self.fan_art_url.as_deref(),
            ImageField::Dream => self.dream_url.as_deref(),
            ImageField::Ideal => self.ideal_url.as_deref(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
