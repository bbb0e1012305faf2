use crate::error::{Result, TouchlineError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tactical role codes understood by the match engine.
///
/// Right-sided roles occupy negative y, left-sided roles positive y.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    GK,
    RD,
    CD,
    LD,
    RM,
    CM,
    LM,
    CF,
    LCF,
    RCF,
}

impl Role {
    pub const ALL: [Role; 10] = [
        Role::GK,
        Role::RD,
        Role::CD,
        Role::LD,
        Role::RM,
        Role::CM,
        Role::LM,
        Role::CF,
        Role::LCF,
        Role::RCF,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Role::GK => "GK",
            Role::RD => "RD",
            Role::CD => "CD",
            Role::LD => "LD",
            Role::RM => "RM",
            Role::CM => "CM",
            Role::LM => "LM",
            Role::CF => "CF",
            Role::LCF => "LCF",
            Role::RCF => "RCF",
        }
    }

    /// Comma separated, alphabetically sorted list used in error messages.
    pub fn known_codes() -> String {
        let mut codes: Vec<&str> = Role::ALL.iter().map(|r| r.code()).collect();
        codes.sort_unstable();
        codes.join(", ")
    }

    pub fn is_goalkeeper(&self) -> bool {
        matches!(self, Role::GK)
    }

    pub fn is_defender(&self) -> bool {
        matches!(self, Role::RD | Role::CD | Role::LD)
    }

    pub fn is_midfielder(&self) -> bool {
        matches!(self, Role::RM | Role::CM | Role::LM)
    }

    pub fn is_forward(&self) -> bool {
        matches!(self, Role::CF | Role::LCF | Role::RCF)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Role {
    type Err = TouchlineError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GK" => Ok(Role::GK),
            "RD" => Ok(Role::RD),
            "CD" => Ok(Role::CD),
            "LD" => Ok(Role::LD),
            "RM" => Ok(Role::RM),
            "CM" => Ok(Role::CM),
            "LM" => Ok(Role::LM),
            "CF" => Ok(Role::CF),
            "LCF" => Ok(Role::LCF),
            "RCF" => Ok(Role::RCF),
            _ => Err(TouchlineError::UnknownRole {
                role: s.to_string(),
                known: Role::known_codes(),
            }),
        }
    }
}

fn default_rating() -> u8 {
    50
}

/// Technical, physical and mental ratings on a 1-100 scale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerAttributes {
    #[serde(default = "default_rating")]
    pub passing: u8,
    #[serde(default = "default_rating")]
    pub shooting: u8,
    #[serde(default = "default_rating")]
    pub dribbling: u8,
    #[serde(default = "default_rating")]
    pub tackling: u8,
    #[serde(default = "default_rating")]
    pub heading: u8,
    #[serde(default = "default_rating")]
    pub speed: u8,
    #[serde(default = "default_rating")]
    pub stamina: u8,
    #[serde(default = "default_rating")]
    pub strength: u8,
    #[serde(default = "default_rating")]
    pub vision: u8,
    #[serde(default = "default_rating")]
    pub positioning: u8,
    #[serde(default = "default_rating")]
    pub decisions: u8,
}

impl Default for PlayerAttributes {
    fn default() -> Self {
        Self::uniform(50)
    }
}

impl PlayerAttributes {
    pub fn uniform(value: u8) -> Self {
        Self {
            passing: value,
            shooting: value,
            dribbling: value,
            tackling: value,
            heading: value,
            speed: value,
            stamina: value,
            strength: value,
            vision: value,
            positioning: value,
            decisions: value,
        }
    }

    fn named(&self) -> [(&'static str, u8); 11] {
        [
            ("passing", self.passing),
            ("shooting", self.shooting),
            ("dribbling", self.dribbling),
            ("tackling", self.tackling),
            ("heading", self.heading),
            ("speed", self.speed),
            ("stamina", self.stamina),
            ("strength", self.strength),
            ("vision", self.vision),
            ("positioning", self.positioning),
            ("decisions", self.decisions),
        ]
    }

    /// Reject any rating outside 1..=100.
    pub fn validate(&self) -> Result<()> {
        for (attribute, value) in self.named() {
            if !(1..=100).contains(&value) {
                return Err(TouchlineError::AttributeOutOfRange { attribute, value });
            }
        }
        Ok(())
    }
}

/// Normalise a 1-100 rating into 0..1.
#[inline]
pub fn ratio(value: u8) -> f32 {
    value as f32 / 100.0
}

/// Roster entry consumed by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: u32,
    pub name: String,
    pub age: u8,
    pub role: Role,
    pub attributes: PlayerAttributes,
}

impl Player {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        age: u8,
        role: Role,
        attributes: PlayerAttributes,
    ) -> Result<Self> {
        attributes.validate()?;
        Ok(Self { id, name: name.into(), age, role, attributes })
    }

    /// Suitability for a role in 0..1, weighted by the attributes that role leans on.
    pub fn role_rating(&self, role: Role) -> f32 {
        let a = &self.attributes;
        let f = |v: u8| v as f32;
        let raw = match role {
            Role::GK => {
                f(a.positioning) * 0.3
                    + f(a.decisions) * 0.2
                    + f(a.speed) * 0.2
                    + f(a.strength) * 0.3
            }
            Role::CD => {
                f(a.tackling) * 0.3
                    + f(a.heading) * 0.2
                    + f(a.strength) * 0.2
                    + f(a.positioning) * 0.3
            }
            Role::RD | Role::LD => {
                f(a.tackling) * 0.25
                    + f(a.speed) * 0.25
                    + f(a.stamina) * 0.2
                    + f(a.passing) * 0.15
                    + f(a.positioning) * 0.15
            }
            Role::CM => {
                f(a.passing) * 0.3
                    + f(a.vision) * 0.2
                    + f(a.stamina) * 0.2
                    + f(a.decisions) * 0.15
                    + f(a.tackling) * 0.15
            }
            Role::RM | Role::LM => {
                f(a.dribbling) * 0.3
                    + f(a.speed) * 0.25
                    + f(a.passing) * 0.2
                    + f(a.stamina) * 0.15
                    + f(a.vision) * 0.1
            }
            Role::CF => {
                f(a.shooting) * 0.3
                    + f(a.dribbling) * 0.2
                    + f(a.speed) * 0.2
                    + f(a.positioning) * 0.3
            }
            Role::RCF | Role::LCF => {
                f(a.shooting) * 0.25
                    + f(a.dribbling) * 0.25
                    + f(a.speed) * 0.2
                    + f(a.passing) * 0.15
                    + f(a.vision) * 0.15
            }
        };
        raw / 100.0
    }

    pub fn role_ratings(&self) -> Vec<(Role, f32)> {
        Role::ALL.iter().map(|&r| (r, self.role_rating(r))).collect()
    }
}
