//! Whitelisted values: the cities pickup points may open in and the product
//! types a reception accepts.
//!
//! Canonical names are Russian, as exposed by the public API. English aliases
//! are accepted on input and never produced on output.

use serde::{Deserialize, Serialize};

/// City a pickup point may be registered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum City {
    #[serde(rename = "Москва", alias = "Moscow")]
    Moscow,
    #[serde(rename = "Санкт-Петербург", alias = "Saint Petersburg")]
    SaintPetersburg,
    #[serde(rename = "Казань", alias = "Kazan")]
    Kazan,
}

impl City {
    /// Canonical (wire and storage) name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Moscow => "Москва",
            Self::SaintPetersburg => "Санкт-Петербург",
            Self::Kazan => "Казань",
        }
    }
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for City {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Москва" | "Moscow" => Ok(Self::Moscow),
            "Санкт-Петербург" | "Saint Petersburg" => Ok(Self::SaintPetersburg),
            "Казань" | "Kazan" => Ok(Self::Kazan),
            other => Err(format!("invalid city: {other}")),
        }
    }
}

/// Kind of item accepted during a reception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductType {
    #[serde(rename = "электроника", alias = "electronics")]
    Electronics,
    #[serde(rename = "одежда", alias = "clothing")]
    Clothing,
    #[serde(rename = "обувь", alias = "footwear")]
    Footwear,
}

impl ProductType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Electronics => "электроника",
            Self::Clothing => "одежда",
            Self::Footwear => "обувь",
        }
    }
}

impl std::fmt::Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProductType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "электроника" | "electronics" => Ok(Self::Electronics),
            "одежда" | "clothing" => Ok(Self::Clothing),
            "обувь" | "footwear" => Ok(Self::Footwear),
            other => Err(format!("invalid product type: {other}")),
        }
    }
}
