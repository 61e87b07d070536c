//! Closed category vocabularies used to partition JSON operations
//!
//! Each category has a routing id sent upstream (`api_id`) and a display
//! label (`label`), so no string doubles as both.

use std::fmt;

/// Relationship categories between two catalog titles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionCategory {
    Follows,
    FollowedBy,
    EditedInto,
    EditedFrom,
    SpinOffFrom,
    SpinOff,
    RemakeOf,
    RemadeAs,
    References,
    ReferencedIn,
    Spoofs,
    SpoofedIn,
    Features,
    FeaturedIn,
}

impl ConnectionCategory {
    /// Routing id sent upstream in the `filter` variable
    pub fn api_id(&self) -> &'static str {
        match self {
            Self::Follows => "follows",
            Self::FollowedBy => "followed_by",
            Self::EditedInto => "edited_into",
            Self::EditedFrom => "edited_from",
            Self::SpinOffFrom => "spin_off_from",
            Self::SpinOff => "spin_off",
            Self::RemakeOf => "remake_of",
            Self::RemadeAs => "remade_as",
            Self::References => "references",
            Self::ReferencedIn => "referenced_in",
            Self::Spoofs => "spoofs",
            Self::SpoofedIn => "spoofed_in",
            Self::Features => "features",
            Self::FeaturedIn => "featured_in",
        }
    }

    /// Display label used for batches and progress records
    pub fn label(&self) -> &'static str {
        match self {
            Self::Follows => "Follows",
            Self::FollowedBy => "Followed by",
            Self::EditedInto => "Edited into",
            Self::EditedFrom => "Edited from",
            Self::SpinOffFrom => "Spin-off from",
            Self::SpinOff => "Spin-off",
            Self::RemakeOf => "Remake of",
            Self::RemadeAs => "Remade as",
            Self::References => "References",
            Self::ReferencedIn => "Referenced in",
            Self::Spoofs => "Spoofs",
            Self::SpoofedIn => "Spoofed in",
            Self::Features => "Features",
            Self::FeaturedIn => "Featured in",
        }
    }

    /// Returns all categories in upstream display order
    pub fn all() -> [Self; 14] {
        [
            Self::Follows,
            Self::FollowedBy,
            Self::EditedInto,
            Self::EditedFrom,
            Self::SpinOffFrom,
            Self::SpinOff,
            Self::RemakeOf,
            Self::RemadeAs,
            Self::References,
            Self::ReferencedIn,
            Self::Spoofs,
            Self::SpoofedIn,
            Self::Features,
            Self::FeaturedIn,
        ]
    }
}

impl fmt::Display for ConnectionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Company credit categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompanyCreditCategory {
    Distribution,
    Production,
    Sales,
    SpecialEffects,
    Miscellaneous,
}

impl CompanyCreditCategory {
    /// Routing id sent upstream in the `filter` variable
    pub fn api_id(&self) -> &'static str {
        match self {
            Self::Distribution => "distribution",
            Self::Production => "production",
            Self::Sales => "sales",
            Self::SpecialEffects => "specialEffects",
            Self::Miscellaneous => "miscellaneous",
        }
    }

    /// Display label used for batches and progress records
    pub fn label(&self) -> &'static str {
        match self {
            Self::Distribution => "Distributors",
            Self::Production => "Production companies",
            Self::Sales => "Sales",
            Self::SpecialEffects => "Special effects",
            Self::Miscellaneous => "Other companies",
        }
    }

    pub fn all() -> [Self; 5] {
        [
            Self::Distribution,
            Self::Production,
            Self::Sales,
            Self::SpecialEffects,
            Self::Miscellaneous,
        ]
    }
}

impl fmt::Display for CompanyCreditCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An award ceremony identifier such as `ev0000003`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AwardEvent(String);

impl AwardEvent {
    /// Creates an award event id, returning `None` unless it is `ev` followed by digits
    pub fn new(id: &str) -> Option<Self> {
        let digits = id.strip_prefix("ev")?;
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        Some(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AwardEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
