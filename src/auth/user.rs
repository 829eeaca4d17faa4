use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AgriSessionError;

/// Marketplace roles a user can log in with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Farmer,
    Buyer,
    Logistics,
    Admin,
    SuperAdmin,
    DataAdmin,
    AgriExpert,
    SupportAdmin,
}

impl UserRole {
    pub const ALL: [UserRole; 8] = [
        UserRole::Farmer,
        UserRole::Buyer,
        UserRole::Logistics,
        UserRole::Admin,
        UserRole::SuperAdmin,
        UserRole::DataAdmin,
        UserRole::AgriExpert,
        UserRole::SupportAdmin,
    ];

    /// Roles allowed into the admin portal
    pub const ADMIN_ROLES: [UserRole; 5] = [
        UserRole::Admin,
        UserRole::SuperAdmin,
        UserRole::DataAdmin,
        UserRole::AgriExpert,
        UserRole::SupportAdmin,
    ];

    /// Check if this role belongs to the admin family
    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            UserRole::Admin
                | UserRole::SuperAdmin
                | UserRole::DataAdmin
                | UserRole::AgriExpert
                | UserRole::SupportAdmin
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Farmer => "farmer",
            UserRole::Buyer => "buyer",
            UserRole::Logistics => "logistics",
            UserRole::Admin => "admin",
            UserRole::SuperAdmin => "super_admin",
            UserRole::DataAdmin => "data_admin",
            UserRole::AgriExpert => "agri_expert",
            UserRole::SupportAdmin => "support_admin",
        }
    }

    /// Short code embedded in synthesized digital ids
    pub(crate) fn digital_id_code(&self) -> &'static str {
        match self {
            UserRole::Farmer => "FM",
            _ => "BY",
        }
    }
}

/// Admin allow-list predicate used by the route guard
pub fn is_admin_role(role: UserRole) -> bool {
    role.is_admin()
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = AgriSessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserRole::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| AgriSessionError::ValidationError(format!("Unknown role: {}", s)))
    }
}

/// Paid plans a user can upgrade to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionTier {
    Free,
    ProFarmer,
    ProInvestor,
    ProBuyer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcurementStats {
    pub total_sourced: String,
    pub payment_rating: f64,
    pub active_bids: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmDetails {
    pub name: String,
    pub size: String,
    pub location: String,
    pub crops: Vec<String>,
}

/// Marketplace account record, persisted as camelCase JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Phone number, also the key in the users database
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_since: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub harvests: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digital_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_verified_buyer: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_suspended: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procurement_stats: Option<ProcurementStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buying_interests: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farm_details: Option<FarmDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_tier: Option<SubscriptionTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_type: Option<String>,
}

impl User {
    /// Creates a user with only the required fields set
    pub fn new(id: String, name: String, phone: String, role: UserRole) -> Self {
        Self {
            id,
            name,
            phone,
            email: None,
            role,
            location: None,
            profile_image: None,
            member_since: None,
            rating: None,
            harvests: None,
            digital_id: None,
            is_verified_buyer: None,
            is_suspended: None,
            procurement_stats: None,
            buying_interests: None,
            farm_details: None,
            subscription_tier: None,
            business_name: None,
            business_type: None,
        }
    }

    /// Merge a partial update into this record; unset patch fields are left alone
    pub fn apply(&mut self, patch: UserPatch) {
        let UserPatch {
            id,
            name,
            phone,
            email,
            role,
            location,
            profile_image,
            member_since,
            rating,
            harvests,
            digital_id,
            is_verified_buyer,
            is_suspended,
            procurement_stats,
            buying_interests,
            farm_details,
            subscription_tier,
            business_name,
            business_type,
        } = patch;

        if let Some(id) = id {
            self.id = id;
        }
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(phone) = phone {
            self.phone = phone;
        }
        if let Some(role) = role {
            self.role = role;
        }
        merge(&mut self.email, email);
        merge(&mut self.location, location);
        merge(&mut self.profile_image, profile_image);
        merge(&mut self.member_since, member_since);
        merge(&mut self.rating, rating);
        merge(&mut self.harvests, harvests);
        merge(&mut self.digital_id, digital_id);
        merge(&mut self.is_verified_buyer, is_verified_buyer);
        merge(&mut self.is_suspended, is_suspended);
        merge(&mut self.procurement_stats, procurement_stats);
        merge(&mut self.buying_interests, buying_interests);
        merge(&mut self.farm_details, farm_details);
        merge(&mut self.subscription_tier, subscription_tier);
        merge(&mut self.business_name, business_name);
        merge(&mut self.business_type, business_type);
    }

    /// Returns a copy with the patch applied
    pub fn merged(&self, patch: UserPatch) -> Self {
        let mut user = self.clone();
        user.apply(patch);
        user
    }
}

fn merge<T>(slot: &mut Option<T>, update: Option<T>) {
    if update.is_some() {
        *slot = update;
    }
}

/// Partial user record for profile updates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPatch {
    pub id: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub location: Option<String>,
    pub profile_image: Option<String>,
    pub member_since: Option<String>,
    pub rating: Option<f64>,
    pub harvests: Option<u32>,
    pub digital_id: Option<String>,
    pub is_verified_buyer: Option<bool>,
    pub is_suspended: Option<bool>,
    pub procurement_stats: Option<ProcurementStats>,
    pub buying_interests: Option<Vec<String>>,
    pub farm_details: Option<FarmDetails>,
    pub subscription_tier: Option<SubscriptionTier>,
    pub business_name: Option<String>,
    pub business_type: Option<String>,
}

impl UserPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn subscription_tier(tier: SubscriptionTier) -> Self {
        Self {
            subscription_tier: Some(tier),
            ..Self::default()
        }
    }
}
