//! Admin directory
//!
//! The admin portal's persisted view of marketplace accounts and dashboard
//! counters. Accounts are addressed by email, as the admin screens do.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::user::{FarmDetails, ProcurementStats, User, UserRole};
use crate::constants::ADMIN_STORAGE_KEY;
use crate::error::{AgriSessionError, Result};
use crate::storage::{read_json, write_json, KeyValueStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStat {
    pub label: String,
    pub value: String,
    pub change: String,
    pub trend: Trend,
    pub icon: String,
    pub color: String,
}

/// Everything the admin dashboard persists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSnapshot {
    pub users: Vec<User>,
    pub pending_listings: u32,
    pub total_orders: u32,
    pub total_revenue: String,
    pub stats: Vec<AdminStat>,
}

impl AdminSnapshot {
    /// Demo data shown on first launch
    pub fn seed() -> Self {
        let mut sahr = seed_user("seed_sahr", "Sahr Bangura", "+232 77 123 456", UserRole::Farmer);
        sahr.email = Some("sahr@farming.sl".to_string());
        sahr.location = Some("Bo District".to_string());
        sahr.digital_id = Some("AC-882190".to_string());
        sahr.rating = Some(4.8);
        sahr.harvests = Some(42);
        sahr.member_since = Some("2023".to_string());
        sahr.profile_image =
            Some("https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?q=80&w=200".to_string());
        sahr.farm_details = Some(FarmDetails {
            name: "Bo Highland Farms".to_string(),
            size: "12 Acres".to_string(),
            location: "Bo District".to_string(),
            crops: vec!["Rice".to_string(), "Ginger".to_string(), "Cocoa".to_string()],
        });

        let mut fresh = seed_user("seed_fresh", "Fresh Foods Ltd", "+232 88 555 999", UserRole::Buyer);
        fresh.email = Some("buyer@freshfoods.sl".to_string());
        fresh.location = Some("Freetown".to_string());
        fresh.is_verified_buyer = Some(true);
        fresh.member_since = Some("2022".to_string());
        fresh.profile_image =
            Some("https://images.unsplash.com/photo-1560250097-0b93528c311a?q=80&w=200".to_string());
        fresh.business_name = Some("Fresh Foods Ltd".to_string());
        fresh.business_type = Some("Retailer".to_string());
        fresh.procurement_stats = Some(ProcurementStats {
            total_sourced: "125 Tons".to_string(),
            payment_rating: 4.9,
            active_bids: 12,
        });

        let mut amara = seed_user("seed_amara", "Amara Kamara", "", UserRole::Farmer);
        amara.email = Some("amara@cocoa.sl".to_string());
        amara.location = Some("Kenema".to_string());
        amara.digital_id = Some("AC-112233".to_string());
        amara.rating = Some(4.2);
        amara.member_since = Some("2023".to_string());
        amara.farm_details = Some(FarmDetails {
            name: "Kenema Cocoa Estate".to_string(),
            size: "15 Acres".to_string(),
            location: "Kenema District".to_string(),
            crops: vec!["Cocoa".to_string(), "Coffee".to_string(), "Rice".to_string()],
        });

        let mut city = seed_user("seed_city", "City Market", "", UserRole::Buyer);
        city.email = Some("market@city.sl".to_string());
        city.location = Some("Makeni".to_string());
        city.is_verified_buyer = Some(false);
        city.is_suspended = Some(true);
        city.member_since = Some("2021".to_string());
        city.business_name = Some("City Market Hub".to_string());
        city.business_type = Some("Wholesaler".to_string());

        Self {
            users: vec![sahr, fresh, amara, city],
            pending_listings: 14,
            total_orders: 128,
            total_revenue: "Le 45.2M".to_string(),
            stats: vec![
                stat("Farmers Onboarded", "1,240", "+12%", "Users", "#22C55E"),
                stat("Buyers Onboarded", "305", "+5%", "ShoppingBag", "#3B82F6"),
                stat("Total Listings", "842", "+8%", "Package", "#F59E0B"),
                stat("Orders Completed", "128", "+15%", "CheckCircle2", "#10B981"),
                stat("Estimated Income", "Le 4.5M", "+22%", "TrendingUp", "#8B5CF6"),
            ],
        }
    }
}

fn seed_user(id: &str, name: &str, phone: &str, role: UserRole) -> User {
    let mut user = User::new(id.to_string(), name.to_string(), phone.to_string(), role);
    user.is_suspended = Some(false);
    user
}

fn stat(label: &str, value: &str, change: &str, icon: &str, color: &str) -> AdminStat {
    AdminStat {
        label: label.to_string(),
        value: value.to_string(),
        change: change.to_string(),
        trend: Trend::Up,
        icon: icon.to_string(),
        color: color.to_string(),
    }
}

pub struct AdminDirectory {
    store: Arc<dyn KeyValueStore>,
    snapshot: RwLock<AdminSnapshot>,
}

impl AdminDirectory {
    /// Load the persisted directory, seeding it on first use
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let snapshot = match read_json(store.as_ref(), ADMIN_STORAGE_KEY).await? {
            Some(snapshot) => snapshot,
            None => {
                let seeded = AdminSnapshot::seed();
                write_json(store.as_ref(), ADMIN_STORAGE_KEY, &seeded).await?;
                seeded
            }
        };

        Ok(Self {
            store,
            snapshot: RwLock::new(snapshot),
        })
    }

    pub async fn snapshot(&self) -> AdminSnapshot {
        self.snapshot.read().await.clone()
    }

    pub async fn users(&self) -> Vec<User> {
        self.snapshot.read().await.users.clone()
    }

    pub async fn pending_listings_count(&self) -> u32 {
        self.snapshot.read().await.pending_listings
    }

    /// Mark a buyer as verified or unverified
    pub async fn verify_user(&self, email: &str, is_verified: bool) -> Result<()> {
        self.update_user(email, |user| user.is_verified_buyer = Some(is_verified))
            .await
    }

    /// Suspend or reinstate an account
    pub async fn suspend_user(&self, email: &str, is_suspended: bool) -> Result<()> {
        self.update_user(email, |user| user.is_suspended = Some(is_suspended))
            .await
    }

    /// Pull fresh dashboard counters. The simulated backend only bumps the
    /// order count.
    pub async fn fetch_stats(&self) -> Result<u32> {
        let mut snapshot = self.snapshot.write().await;
        snapshot.total_orders += 1;
        write_json(self.store.as_ref(), ADMIN_STORAGE_KEY, &*snapshot).await?;
        Ok(snapshot.total_orders)
    }

    async fn update_user<F>(&self, email: &str, change: F) -> Result<()>
    where
        F: FnOnce(&mut User),
    {
        let mut snapshot = self.snapshot.write().await;
        let user = snapshot
            .users
            .iter_mut()
            .find(|u| u.email.as_deref() == Some(email))
            .ok_or_else(|| AgriSessionError::UserNotFound(email.to_string()))?;
        change(user);
        write_json(self.store.as_ref(), ADMIN_STORAGE_KEY, &*snapshot).await
    }
}
