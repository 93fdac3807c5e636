use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GoldType: closed set of tracked product categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoldType {
    Jewelry,
    Physical,
    GoldBar,
}

/// Static per-category configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoldTypeConfig {
    pub name: &'static str,
    pub file_prefix: &'static str,
    /// Brand-class query parameter.
    pub pp: u32,
    /// Product-class query parameter.
    pub pz: u32,
    pub description: &'static str,
}

const JEWELRY: GoldTypeConfig = GoldTypeConfig {
    name: "首饰黄金",
    file_prefix: "jewelry_gold",
    pp: 0,
    pz: 15,
    description: "各大品牌首饰黄金价格数据",
};

const PHYSICAL: GoldTypeConfig = GoldTypeConfig {
    name: "实物黄金",
    file_prefix: "physical_gold",
    pp: 0,
    pz: 11,
    description: "实物黄金投资产品价格数据",
};

const GOLD_BAR: GoldTypeConfig = GoldTypeConfig {
    name: "金条",
    file_prefix: "gold_bar",
    pp: 0,
    pz: 15,
    description: "各种规格金条价格数据",
};

impl GoldType {
    pub const ALL: [GoldType; 3] = [GoldType::Jewelry, GoldType::Physical, GoldType::GoldBar];

    pub fn config(self) -> &'static GoldTypeConfig {
        match self {
            GoldType::Jewelry => &JEWELRY,
            GoldType::Physical => &PHYSICAL,
            GoldType::GoldBar => &GOLD_BAR,
        }
    }

    /// Stable code used in JSON output and on the command line.
    pub fn code(self) -> &'static str {
        match self {
            GoldType::Jewelry => "jewelry",
            GoldType::Physical => "physical",
            GoldType::GoldBar => "gold_bar",
        }
    }

    pub fn name(self) -> &'static str {
        self.config().name
    }

    pub fn file_prefix(self) -> &'static str {
        self.config().file_prefix
    }
}

impl fmt::Display for GoldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown gold type '{0}' (expected jewelry, physical or gold_bar)")]
pub struct UnknownGoldType(pub String);

impl FromStr for GoldType {
    type Err = UnknownGoldType;

    /// Accepts the code (`gold_bar`, `gold-bar`) or the Chinese label (`金条`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace('-', "_");
        GoldType::ALL
            .into_iter()
            .find(|t| t.code() == needle || t.name() == s.trim())
            .ok_or_else(|| UnknownGoldType(s.to_string()))
    }
}
