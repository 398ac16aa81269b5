//! Request and response types shared with api clients.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::car::{
    self, Aspiration, Availability, Car, CategoryId, Drive, FuelType, Label, SellerType,
    Transmission,
};
use crate::gallery::{self, CarImage, CarImageId};
use crate::{Category, Config, Database, Image, Result, User, UserId};

/// Defines the length-of-life of resulting access token.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize)]
pub enum AuthDuration {
    /// 1 hour
    Short,
    /// 1 day
    #[default]
    Medium,
    /// 30 days
    Long,
}

// conversion method for making `AuthDuration` into an actual `Duration`
impl From<AuthDuration> for Duration {
    fn from(d: AuthDuration) -> Self {
        match d {
            AuthDuration::Short => Duration::from_secs(60 * 60),
            AuthDuration::Medium => Duration::from_secs(24 * 60 * 60),
            AuthDuration::Long => Duration::from_secs(30 * 24 * 60 * 60),
        }
    }
}

/// Auth request to be sent to the login endpoint.
///
/// If credentials match, a new access token is generated and sent back to
/// the caller, to be used with subsequent requests as a bearer token.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserEntry,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub password2: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserEntry>,
}

/// User details as exposed over the api.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserEntry {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub is_admin: bool,
    pub is_approved: bool,
    pub is_worker: bool,
    pub date_joined: DateTime<Utc>,
}

impl UserEntry {
    pub fn new(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            full_name: user.full_name(),
            is_admin: user.is_admin,
            is_approved: user.is_approved,
            is_worker: user.is_worker(),
            date_joined: user.date_joined,
        }
    }
}

fn default_approve() -> bool {
    true
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApproveRequest {
    pub user_id: UserId,
    #[serde(default = "default_approve")]
    pub approve: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PromoteRequest {
    pub user_id: UserId,
}

/// One `{value, label}` pair for dropdowns.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

/// Returns the choice list for an enum in wire shape.
pub fn choices<T>() -> Vec<Choice>
where
    T: strum::IntoEnumIterator + std::fmt::Display + Label,
{
    car::choices::<T>()
        .into_iter()
        .map(|(value, label)| Choice {
            value,
            label: label.to_string(),
        })
        .collect()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImageOrder {
    pub id: CarImageId,
    pub order: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub image_orders: Vec<ImageOrder>,
}

/// Gallery image as exposed over the api, with the blob rendered as an
/// absolute url.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CarImageEntry {
    pub id: CarImageId,
    pub image: String,
    pub is_primary: bool,
    pub order: u32,
    pub uploaded_at: DateTime<Utc>,
}

impl CarImageEntry {
    pub fn new(record: &CarImage, config: &Config) -> Self {
        Self {
            id: record.id,
            image: Image::url(record.image, config),
            is_primary: record.is_primary,
            order: record.order,
            uploaded_at: record.uploaded_at,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryPayload {
    pub name: String,
    pub description: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub car_count: usize,
}

impl CategoryEntry {
    pub fn new(category: &Category, db: &Database) -> Result<Self> {
        Ok(Self {
            id: category.id,
            name: category.name.clone(),
            description: category.description.clone(),
            created_at: category.created_at,
            car_count: car::cars_in_category(db, category.id)?,
        })
    }
}

/// Car fields accepted on create and update.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CarPayload {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub category: CategoryId,
    #[serde(default)]
    pub seller_type: SellerType,
    pub condition_score: Option<Decimal>,
    pub year: u32,
    pub location: String,
    #[serde(default)]
    pub availability: Availability,
    pub drive: Drive,
    pub mileage: u32,
    pub engine_size: u32,
    pub fuel_type: FuelType,
    pub horse_power: Option<u32>,
    pub transmission: Transmission,
    pub torque: Option<u32>,
    pub aspiration: Option<Aspiration>,
    pub acceleration: Option<Decimal>,
}

impl CarPayload {
    /// Writes the payload over a car entity, leaving identity and
    /// book-keeping fields alone.
    pub fn apply(&self, car: &mut Car) {
        car.title = self.title.clone();
        car.description = self.description.clone();
        car.price = self.price;
        car.category = self.category;
        car.seller_type = self.seller_type;
        car.condition_score = self.condition_score;
        car.year = self.year;
        car.location = self.location.clone();
        car.availability = self.availability;
        car.drive = self.drive;
        car.mileage = self.mileage;
        car.engine_size = self.engine_size;
        car.fuel_type = self.fuel_type;
        car.horse_power = self.horse_power;
        car.transmission = self.transmission;
        car.torque = self.torque;
        car.aspiration = self.aspiration;
        car.acceleration = self.acceleration;
    }
}

/// Condensed car shape used by the list endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CarSummary {
    pub id: Uuid,
    pub title: String,
    pub price: Decimal,
    pub formatted_price: String,
    pub category: CategoryId,
    pub category_name: String,
    pub seller_type: SellerType,
    pub seller_type_display: String,
    pub condition_score: Option<Decimal>,
    pub formatted_condition_score: Option<String>,
    pub year: u32,
    pub location: String,
    pub availability: Availability,
    pub availability_display: String,
    pub mileage: u32,
    pub formatted_mileage: String,
    pub fuel_type: FuelType,
    pub transmission: Transmission,
    pub primary_image: Option<CarImageEntry>,
    pub image_count: usize,
    pub created_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CarSummary {
    pub fn new(car: &Car, db: &Database, config: &Config) -> Result<Self> {
        let category_name = db
            .get::<Category>(car.category)
            .map(|c| c.name)
            .unwrap_or_default();
        let created_by_name = car
            .created_by
            .and_then(|id| db.get::<User>(id).ok())
            .map(|u| u.full_name());
        let primary_image = gallery::primary_image(db, car.id)?
            .map(|record| CarImageEntry::new(&record, config));

        Ok(Self {
            id: car.id,
            title: car.title.clone(),
            price: car.price,
            formatted_price: car.formatted_price(),
            category: car.category,
            category_name,
            seller_type: car.seller_type,
            seller_type_display: car.seller_type.label().to_string(),
            condition_score: car.condition_score,
            formatted_condition_score: car.formatted_condition_score(),
            year: car.year,
            location: car.location.clone(),
            availability: car.availability,
            availability_display: car.availability.label().to_string(),
            mileage: car.mileage,
            formatted_mileage: car.formatted_mileage(),
            fuel_type: car.fuel_type,
            transmission: car.transmission,
            primary_image,
            image_count: gallery::image_count(db, car.id)?,
            created_by_name,
            created_at: car.created_at,
            updated_at: car.updated_at,
        })
    }
}

/// Full car shape used by the detail endpoint, gallery included.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CarDetail {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub formatted_price: String,
    pub category: CategoryId,
    pub category_name: String,
    pub seller_type: SellerType,
    pub seller_type_display: String,
    pub condition_score: Option<Decimal>,
    pub formatted_condition_score: Option<String>,
    pub year: u32,
    pub location: String,
    pub availability: Availability,
    pub availability_display: String,
    pub drive: Drive,
    pub drive_display: String,
    pub mileage: u32,
    pub formatted_mileage: String,
    pub engine_size: u32,
    pub formatted_engine_size: String,
    pub fuel_type: FuelType,
    pub fuel_type_display: String,
    pub horse_power: Option<u32>,
    pub formatted_horse_power: Option<String>,
    pub transmission: Transmission,
    pub transmission_display: String,
    pub torque: Option<u32>,
    pub formatted_torque: Option<String>,
    pub aspiration: Option<Aspiration>,
    pub aspiration_display: Option<String>,
    pub acceleration: Option<Decimal>,
    pub formatted_acceleration: Option<String>,
    pub images: Vec<CarImageEntry>,
    pub created_by: Option<UserId>,
    pub created_by_name: Option<String>,
    pub created_by_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CarDetail {
    pub fn new(car: &Car, db: &Database, config: &Config) -> Result<Self> {
        let category_name = db
            .get::<Category>(car.category)
            .map(|c| c.name)
            .unwrap_or_default();
        let created_by = car.created_by.and_then(|id| db.get::<User>(id).ok());
        let images = gallery::collection(db, car.id)?
            .iter()
            .map(|record| CarImageEntry::new(record, config))
            .collect();

        Ok(Self {
            id: car.id,
            title: car.title.clone(),
            description: car.description.clone(),
            price: car.price,
            formatted_price: car.formatted_price(),
            category: car.category,
            category_name,
            seller_type: car.seller_type,
            seller_type_display: car.seller_type.label().to_string(),
            condition_score: car.condition_score,
            formatted_condition_score: car.formatted_condition_score(),
            year: car.year,
            location: car.location.clone(),
            availability: car.availability,
            availability_display: car.availability.label().to_string(),
            drive: car.drive,
            drive_display: car.drive.label().to_string(),
            mileage: car.mileage,
            formatted_mileage: car.formatted_mileage(),
            engine_size: car.engine_size,
            formatted_engine_size: car.formatted_engine_size(),
            fuel_type: car.fuel_type,
            fuel_type_display: car.fuel_type.label().to_string(),
            horse_power: car.horse_power,
            formatted_horse_power: car.formatted_horse_power(),
            transmission: car.transmission,
            transmission_display: car.transmission.label().to_string(),
            torque: car.torque,
            formatted_torque: car.formatted_torque(),
            aspiration: car.aspiration,
            aspiration_display: car.aspiration.map(|a| a.label().to_string()),
            acceleration: car.acceleration,
            formatted_acceleration: car.formatted_acceleration(),
            images,
            created_by: car.created_by,
            created_by_name: created_by.as_ref().map(|u| u.full_name()),
            created_by_email: created_by.map(|u| u.email),
            created_at: car.created_at,
            updated_at: car.updated_at,
        })
    }
}
