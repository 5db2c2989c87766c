//! The shared skill vocabulary used by volunteers and events.

use serde::{Deserialize, Serialize};

/// A volunteer capability drawn from the fixed skill catalog.
///
/// Skills are identified by a stable integer code in the database and by
/// their display label on the wire. Matching compares skills by identity
/// only; there is no fuzzy or partial matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Skill {
    Cooking,
    Driving,
    Teaching,
    Cleaning,
    Fundraising,
    #[serde(rename = "Medical Aid")]
    MedicalAid,
    Counseling,
    #[serde(rename = "Event Planning")]
    EventPlanning,
    #[serde(rename = "Child Care")]
    ChildCare,
    #[serde(rename = "Elderly Care")]
    ElderlyCare,
    #[serde(rename = "Animal Care")]
    AnimalCare,
    Construction,
    Gardening,
    #[serde(rename = "IT Support")]
    ItSupport,
    Marketing,
    Photography,
    Writing,
    Translation,
    #[serde(rename = "Legal Aid")]
    LegalAid,
}

impl Skill {
    /// Stable integer code used for persistence. Codes are append-only;
    /// existing codes must never be renumbered.
    pub fn code(&self) -> i64 {
        match self {
            Skill::Cooking => 1,
            Skill::Driving => 2,
            Skill::Teaching => 3,
            Skill::Cleaning => 4,
            Skill::Fundraising => 5,
            Skill::MedicalAid => 6,
            Skill::Counseling => 7,
            Skill::EventPlanning => 8,
            Skill::ChildCare => 9,
            Skill::ElderlyCare => 10,
            Skill::AnimalCare => 11,
            Skill::Construction => 12,
            Skill::Gardening => 13,
            Skill::ItSupport => 14,
            Skill::Marketing => 15,
            Skill::Photography => 16,
            Skill::Writing => 17,
            Skill::Translation => 18,
            Skill::LegalAid => 19,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Skill::Cooking),
            2 => Some(Skill::Driving),
            3 => Some(Skill::Teaching),
            4 => Some(Skill::Cleaning),
            5 => Some(Skill::Fundraising),
            6 => Some(Skill::MedicalAid),
            7 => Some(Skill::Counseling),
            8 => Some(Skill::EventPlanning),
            9 => Some(Skill::ChildCare),
            10 => Some(Skill::ElderlyCare),
            11 => Some(Skill::AnimalCare),
            12 => Some(Skill::Construction),
            13 => Some(Skill::Gardening),
            14 => Some(Skill::ItSupport),
            15 => Some(Skill::Marketing),
            16 => Some(Skill::Photography),
            17 => Some(Skill::Writing),
            18 => Some(Skill::Translation),
            19 => Some(Skill::LegalAid),
            _ => None,
        }
    }
}
