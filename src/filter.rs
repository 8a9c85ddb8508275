// 🔎 Filter & Sort Configuration
// Inputs to the view engine. Every flag defaults to "show everything".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::record::Rarity;

// ============================================================================
// SORT MODE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    /// Sort id / canonical id order
    #[default]
    Dex,
    ValueHigh,
    ValueLow,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Dex => "dex",
            SortMode::ValueHigh => "value-high",
            SortMode::ValueLow => "value-low",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dex" => Ok(SortMode::Dex),
            "value-high" => Ok(SortMode::ValueHigh),
            "value-low" => Ok(SortMode::ValueLow),
            other => Err(format!("Unknown sort mode: {}", other)),
        }
    }
}

// ============================================================================
// FILTER FLAGS
// ============================================================================

/// Individually toggleable boolean flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterFlag {
    ShowOwned,
    ShowMissing,
    Gen1Only,
    ShowSlots,
    ShowTrainers,
    ShowFanArt,
    ShowDream,
    ShowIdeal,
    BaseSetArt,
    RankSlotsByRarity,
    Rarity(Rarity),
}

/// Complete filter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    pub show_owned: bool,
    pub show_missing: bool,
    /// Restrict the roster to sort ids 1..=151
    pub gen1_only: bool,
    /// Explicit sort-id window, inclusive (overrides nothing; both apply)
    pub id_range: Option<(u32, u32)>,
    pub show_slots: bool,
    pub show_trainers: bool,
    /// Image preferences (display only, never hide entries)
    pub show_fan_art: bool,
    pub show_dream: bool,
    pub show_ideal: bool,
    pub base_set_art: bool,
    /// Order slots under a parent by rarity rank instead of registration order
    pub rank_slots_by_rarity: bool,
    pub show_standard: bool,
    pub show_ex: bool,
    pub show_gx: bool,
    pub show_v: bool,
    pub show_vmax: bool,
    pub show_vstar: bool,
    pub show_mega: bool,
    /// Free-text search over name / display id
    pub search: String,
}

impl Default for FilterSettings {
    fn default() -> Self {
        FilterSettings {
            show_owned: true,
            show_missing: true,
            gen1_only: false,
            id_range: None,
            show_slots: true,
            show_trainers: true,
            show_fan_art: false,
            show_dream: false,
            show_ideal: false,
            base_set_art: false,
            rank_slots_by_rarity: true,
            show_standard: true,
            show_ex: true,
            show_gx: true,
            show_v: true,
            show_vmax: true,
            show_vstar: true,
            show_mega: true,
            search: String::new(),
        }
    }
}

impl FilterSettings {
    /// Settings that hide nothing and expand every slot
    pub fn unfiltered() -> Self {
        Self::default()
    }

    pub fn flag(&self, flag: FilterFlag) -> bool {
        match flag {
            FilterFlag::ShowOwned => self.show_owned,
            FilterFlag::ShowMissing => self.show_missing,
            FilterFlag::Gen1Only => self.gen1_only,
            FilterFlag::ShowSlots => self.show_slots,
            FilterFlag::ShowTrainers => self.show_trainers,
            FilterFlag::ShowFanArt => self.show_fan_art,
            FilterFlag::ShowDream => self.show_dream,
            FilterFlag::ShowIdeal => self.show_ideal,
            FilterFlag::BaseSetArt => self.base_set_art,
            FilterFlag::RankSlotsByRarity => self.rank_slots_by_rarity,
            FilterFlag::Rarity(rarity) => self.shows_rarity(rarity),
        }
    }

    pub fn set_flag(&mut self, flag: FilterFlag, value: bool) {
        let target = match flag {
            FilterFlag::ShowOwned => &mut self.show_owned,
            FilterFlag::ShowMissing => &mut self.show_missing,
            FilterFlag::Gen1Only => &mut self.gen1_only,
            FilterFlag::ShowSlots => &mut self.show_slots,
            FilterFlag::ShowTrainers => &mut self.show_trainers,
            FilterFlag::ShowFanArt => &mut self.show_fan_art,
            FilterFlag::ShowDream => &mut self.show_dream,
            FilterFlag::ShowIdeal => &mut self.show_ideal,
            FilterFlag::BaseSetArt => &mut self.base_set_art,
            FilterFlag::RankSlotsByRarity => &mut self.rank_slots_by_rarity,
            FilterFlag::Rarity(rarity) => self.rarity_flag_mut(rarity),
        };
        *target = value;
    }

    pub fn toggle(&mut self, flag: FilterFlag) {
        let current = self.flag(flag);
        self.set_flag(flag, !current);
    }

    /// Rarity category checkbox for one rarity
    pub fn shows_rarity(&self, rarity: Rarity) -> bool {
        match rarity {
            Rarity::Standard => self.show_standard,
            Rarity::Ex => self.show_ex,
            Rarity::Gx => self.show_gx,
            Rarity::V => self.show_v,
            Rarity::Vmax => self.show_vmax,
            Rarity::Vstar => self.show_vstar,
            Rarity::Mega => self.show_mega,
        }
    }

    fn rarity_flag_mut(&mut self, rarity: Rarity) -> &mut bool {
        match rarity {
            Rarity::Standard => &mut self.show_standard,
            Rarity::Ex => &mut self.show_ex,
            Rarity::Gx => &mut self.show_gx,
            Rarity::V => &mut self.show_v,
            Rarity::Vmax => &mut self.show_vmax,
            Rarity::Vstar => &mut self.show_vstar,
            Rarity::Mega => &mut self.show_mega,
        }
    }

    /// Is a sort id inside the configured sub-range (if any)
    pub fn in_range(&self, sort_id: u32) -> bool {
        if self.gen1_only && !(1..=151).contains(&sort_id) {
            return false;
        }
        match self.id_range {
            Some((lo, hi)) => (lo..=hi).contains(&sort_id),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_hide_nothing() {
        let settings = FilterSettings::default();
        assert!(settings.show_owned && settings.show_missing);
        assert!(Rarity::ALL.iter().all(|r| settings.shows_rarity(*r)));
        assert!(settings.search.is_empty());
        assert!(settings.show_slots);
        assert!(settings.show_trainers);
    }

    #[test]
    fn test_toggle_rarity_flag() {
        let mut settings = FilterSettings::default();
        settings.toggle(FilterFlag::Rarity(Rarity::Vstar));
        assert!(!settings.shows_rarity(Rarity::Vstar));
        assert!(settings.shows_rarity(Rarity::Vmax));
        assert_ne!(settings, FilterSettings::default());

        settings.toggle(FilterFlag::Rarity(Rarity::Vstar));
        assert_eq!(settings, FilterSettings::default());
    }

    #[test]
    fn test_range() {
        let mut settings = FilterSettings::default();
        assert!(settings.in_range(300));

        settings.gen1_only = true;
        assert!(settings.in_range(151));
        assert!(!settings.in_range(152));

        settings.gen1_only = false;
        settings.id_range = Some((10, 20));
        assert!(settings.in_range(10));
        assert!(!settings.in_range(21));
    }

    #[test]
    fn test_sort_mode_parse() {
        assert_eq!("value-high".parse::<SortMode>().unwrap(), SortMode::ValueHigh);
        assert!("alpha".parse::<SortMode>().is_err());
        assert_eq!(SortMode::ValueLow.to_string(), "value-low");
    }

    #[test]
    fn test_toml_partial_table() {
        let settings: FilterSettings = toml::from_str("show_owned = false\ngen1_only = true").unwrap();
        assert!(!settings.show_owned);
        assert!(settings.gen1_only);
        assert!(settings.show_missing);
    }
}
