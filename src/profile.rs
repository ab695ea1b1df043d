// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The user profile: display settings, categories, budgets and avatar.
//!
//! There is exactly one profile per installation. It is stored as a single
//! JSON document under [`PROFILE_KEY`] and always written whole.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};

use crate::budget::Budgets;
use crate::error::{Error, Result, ValidationError};
use crate::kv::KvStore;

pub const PROFILE_KEY: &str = "userDetails";

/// Color for categories missing from the profile.
pub const DEFAULT_CATEGORY_COLOR: &str = "#95A5A6";

/// Color given to newly added categories.
pub const NEW_CATEGORY_COLOR: &str = "#FF6B6B";

pub const DEFAULT_PROFILE_COLOR: &str = "#2a9d8f";
pub const DEFAULT_PROFILE_EMOJI: &str = "😊";

/// Built-in categories. These can be recolored but not deleted.
pub const DEFAULT_CATEGORIES: [(&str, &str); 10] = [
    ("Food & Dining", "#FF6B6B"),
    ("Transportation", "#4ECDC4"),
    ("Shopping", "#45B7D1"),
    ("Entertainment", "#96CEB4"),
    ("Bills & Utilities", "#FFEEAD"),
    ("Health & Fitness", "#D4A5A5"),
    ("Travel", "#9B59B6"),
    ("Education", "#3498DB"),
    ("Personal Care", "#E67E22"),
    ("Others", "#95A5A6"),
];

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    INR,
    JPY,
    AUD,
    CAD,
    CHF,
    GHS,
}

impl Currency {
    pub const ALL: [Currency; 9] = [
        Currency::USD,
        Currency::EUR,
        Currency::GBP,
        Currency::INR,
        Currency::JPY,
        Currency::AUD,
        Currency::CAD,
        Currency::CHF,
        Currency::GHS,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::INR => "INR",
            Currency::JPY => "JPY",
            Currency::AUD => "AUD",
            Currency::CAD => "CAD",
            Currency::CHF => "CHF",
            Currency::GHS => "GHS",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::INR => "₹",
            Currency::JPY => "¥",
            Currency::AUD => "A$",
            Currency::CAD => "CA$",
            Currency::CHF => "CHF ",
            Currency::GHS => "GH₵",
        }
    }

    pub fn minor_digits(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Renders `amount` like `$1,234.50`.
    pub fn format(&self, amount: Decimal) -> String {
        let digits = self.minor_digits();
        let rounded = amount.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let text = format!("{:.*}", digits as usize, rounded.abs());
        let (int_part, frac_part) = match text.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (text.as_str(), None),
        };
        let mut out = format!("{}{}{}", sign, self.symbol(), group_thousands(int_part));
        if let Some(f) = frac_part {
            out.push('.');
            out.push_str(f);
        }
        out
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        Currency::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or_else(|| ValidationError::InvalidCurrency(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryColor {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Notifications {
    pub budget_alerts: bool,
    pub weekly_report: bool,
    pub monthly_report: bool,
    pub category_limit: bool,
}

impl Default for Notifications {
    fn default() -> Self {
        Self {
            budget_alerts: true,
            weekly_report: true,
            monthly_report: true,
            category_limit: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarType {
    #[default]
    Image,
    Emoji,
    Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(deserialize_with = "lenient_currency")]
    pub currency: Currency,
    pub categories: Vec<CategoryColor>,
    #[serde(deserialize_with = "lenient_budget", skip_serializing_if = "Option::is_none")]
    pub daily_budget: Option<Decimal>,
    #[serde(deserialize_with = "lenient_budget", skip_serializing_if = "Option::is_none")]
    pub weekly_budget: Option<Decimal>,
    #[serde(deserialize_with = "lenient_budget", skip_serializing_if = "Option::is_none")]
    pub monthly_budget: Option<Decimal>,
    pub notifications: Notifications,
    pub avatar_type: AvatarType,
    pub profile_picture: Option<String>,
    pub profile_emoji: String,
    pub profile_color: String,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            currency: Currency::default(),
            categories: DEFAULT_CATEGORIES
                .iter()
                .map(|(name, color)| CategoryColor {
                    name: name.to_string(),
                    color: color.to_string(),
                })
                .collect(),
            daily_budget: None,
            weekly_budget: None,
            monthly_budget: None,
            notifications: Notifications::default(),
            avatar_type: AvatarType::default(),
            profile_picture: None,
            profile_emoji: DEFAULT_PROFILE_EMOJI.to_string(),
            profile_color: DEFAULT_PROFILE_COLOR.to_string(),
        }
    }
}

/// Reads a stored budget. Older profiles keep budgets as free-text strings,
/// so blanks, junk and non-positive values all mean "no budget".
fn lenient_budget<'de, D>(d: D) -> std::result::Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<serde_json::Value>::deserialize(d)?;
    let parsed = match v {
        Some(serde_json::Value::String(s)) => s.trim().parse::<Decimal>().ok(),
        Some(serde_json::Value::Number(n)) => n.to_string().parse::<Decimal>().ok(),
        _ => None,
    };
    Ok(parsed.filter(|b| *b > Decimal::ZERO))
}

fn lenient_currency<'de, D>(d: D) -> std::result::Result<Currency, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<String>::deserialize(d)?;
    Ok(v.and_then(|s| s.parse().ok()).unwrap_or_default())
}

/// Parses one budget field from user input. Blank or `none` clears it.
pub fn parse_budget(
    window: &'static str,
    s: &str,
) -> std::result::Result<Option<Decimal>, ValidationError> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    match s.parse::<Decimal>() {
        Ok(d) if d > Decimal::ZERO => Ok(Some(d)),
        _ => Err(ValidationError::InvalidBudget(window, s.to_string())),
    }
}

fn check_color(color: &str) -> std::result::Result<String, ValidationError> {
    let color = color.trim();
    if HEX_COLOR.is_match(color) {
        Ok(color.to_string())
    } else {
        Err(ValidationError::InvalidColor(color.to_string()))
    }
}

pub fn is_default_category(name: &str) -> bool {
    DEFAULT_CATEGORIES.iter().any(|(n, _)| *n == name)
}

impl UserProfile {
    /// Checks the fields a save from the profile screen requires.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        Ok(())
    }

    pub fn budgets(&self) -> Budgets {
        Budgets {
            daily: self.daily_budget,
            weekly: self.weekly_budget,
            monthly: self.monthly_budget,
        }
    }

    pub fn set_budgets(&mut self, budgets: Budgets) {
        self.daily_budget = budgets.daily;
        self.weekly_budget = budgets.weekly;
        self.monthly_budget = budgets.monthly;
    }

    /// Display color for `category`, falling back to the neutral default.
    pub fn category_color(&self, category: &str) -> &str {
        self.categories
            .iter()
            .find(|c| c.name == category)
            .map(|c| c.color.as_str())
            .unwrap_or(DEFAULT_CATEGORY_COLOR)
    }

    pub fn add_category(&mut self, name: &str) -> std::result::Result<(), ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyCategory);
        }
        if self.categories.iter().any(|c| c.name == name) {
            return Err(ValidationError::DuplicateCategory(name.to_string()));
        }
        self.categories.push(CategoryColor {
            name: name.to_string(),
            color: NEW_CATEGORY_COLOR.to_string(),
        });
        Ok(())
    }

    pub fn delete_category(&mut self, name: &str) -> std::result::Result<(), ValidationError> {
        if is_default_category(name) {
            return Err(ValidationError::ProtectedCategory(name.to_string()));
        }
        let before = self.categories.len();
        self.categories.retain(|c| c.name != name);
        if self.categories.len() == before {
            return Err(ValidationError::UnknownCategory(name.to_string()));
        }
        Ok(())
    }

    pub fn set_category_color(
        &mut self,
        name: &str,
        color: &str,
    ) -> std::result::Result<(), ValidationError> {
        let color = check_color(color)?;
        let cat = self
            .categories
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| ValidationError::UnknownCategory(name.to_string()))?;
        cat.color = color;
        Ok(())
    }

    pub fn set_avatar_emoji(&mut self, emoji: &str) {
        self.avatar_type = AvatarType::Emoji;
        self.profile_emoji = emoji.to_string();
    }

    pub fn set_avatar_color(&mut self, color: &str) -> std::result::Result<(), ValidationError> {
        self.profile_color = check_color(color)?;
        self.avatar_type = AvatarType::Color;
        Ok(())
    }

    pub fn set_avatar_image(&mut self, uri: &str) {
        self.avatar_type = AvatarType::Image;
        self.profile_picture = Some(uri.to_string());
    }

    /// One-character badge shown for color avatars.
    pub fn initial(&self) -> char {
        self.name
            .trim()
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
            .unwrap_or('U')
    }
}

pub struct ProfileStore<'a> {
    kv: &'a dyn KvStore,
}

impl<'a> ProfileStore<'a> {
    pub fn new(kv: &'a dyn KvStore) -> Self {
        Self { kv }
    }

    /// The stored profile, or the default one when nothing readable is stored.
    pub fn load(&self) -> Result<UserProfile> {
        let raw = self
            .kv
            .get(PROFILE_KEY)
            .inspect_err(|e| tracing::error!("error loading user details: {e}"))?;
        let Some(raw) = raw else {
            return Ok(UserProfile::default());
        };
        match serde_json::from_str(&raw) {
            Ok(p) => Ok(p),
            Err(e) => {
                tracing::warn!("stored profile is unreadable, using defaults: {e}");
                Ok(UserProfile::default())
            }
        }
    }

    /// Overwrites the stored profile.
    pub fn save(&self, profile: &UserProfile) -> Result<()> {
        let raw = serde_json::to_string(profile).map_err(|e| Error::Serialize("profile", e))?;
        self.kv
            .set(PROFILE_KEY, &raw)
            .inspect_err(|e| tracing::error!("error saving user details: {e}"))?;
        tracing::info!("profile saved");
        Ok(())
    }
}
