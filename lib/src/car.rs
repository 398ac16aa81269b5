//! Car listings and their declarative metadata: categories, choice
//! enumerations, field validation and list filtering.

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::db::{Collectable, Identifiable};
use crate::error::{ErrorKind, Result};
use crate::{util, Database, UserId};

pub type CarId = Uuid;
pub type CategoryId = Uuid;

/// Car categories like SUV, Sedan, Truck, etc.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Category {
    #[serde(default = "Uuid::new_v4")]
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Default for Category {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: "".to_string(),
            description: "".to_string(),
            created_at: Utc::now(),
        }
    }
}

impl Collectable for Category {
    fn get_collection_name() -> &'static str {
        "categories"
    }
}

impl Identifiable for Category {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

/// Counts cars currently assigned to the category.
pub fn cars_in_category(db: &Database, category: CategoryId) -> Result<usize> {
    Ok(db
        .get_collection::<Car>()?
        .iter()
        .filter(|c| c.category == category)
        .count())
}

/// Human label lookup for the choice enums, as presented in dropdowns.
pub trait Label {
    fn label(&self) -> &'static str;
}

/// Returns the full `(value, label)` choice list for an enum.
pub fn choices<T>() -> Vec<(String, &'static str)>
where
    T: strum::IntoEnumIterator + std::fmt::Display + Label,
{
    T::iter().map(|c| (c.to_string(), c.label())).collect()
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SellerType {
    #[default]
    Private,
    Dealer,
    VerifiedDealer,
}

impl Label for SellerType {
    fn label(&self) -> &'static str {
        match self {
            Self::Private => "Private Seller",
            Self::Dealer => "Dealer",
            Self::VerifiedDealer => "Verified Dealer",
        }
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Drive {
    #[default]
    #[serde(rename = "2wd")]
    #[strum(serialize = "2wd")]
    TwoWheel,
    #[serde(rename = "4wd")]
    #[strum(serialize = "4wd")]
    FourWheel,
    Awd,
    Fwd,
    Rwd,
}

impl Label for Drive {
    fn label(&self) -> &'static str {
        match self {
            Self::TwoWheel => "2WD",
            Self::FourWheel => "4WD",
            Self::Awd => "AWD",
            Self::Fwd => "FWD",
            Self::Rwd => "RWD",
        }
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FuelType {
    #[default]
    Petrol,
    Diesel,
    Hybrid,
    Electric,
    PlugInHybrid,
}

impl Label for FuelType {
    fn label(&self) -> &'static str {
        match self {
            Self::Petrol => "Petrol",
            Self::Diesel => "Diesel",
            Self::Hybrid => "Hybrid",
            Self::Electric => "Electric",
            Self::PlugInHybrid => "Plug-in Hybrid",
        }
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Transmission {
    #[default]
    Automatic,
    Manual,
    Cvt,
    SemiAutomatic,
}

impl Label for Transmission {
    fn label(&self) -> &'static str {
        match self {
            Self::Automatic => "Automatic",
            Self::Manual => "Manual",
            Self::Cvt => "CVT",
            Self::SemiAutomatic => "Semi-Automatic",
        }
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Aspiration {
    #[default]
    NaturallyAspirated,
    Turbo,
    TwinTurbo,
    Supercharged,
}

impl Label for Aspiration {
    fn label(&self) -> &'static str {
        match self {
            Self::NaturallyAspirated => "Naturally Aspirated",
            Self::Turbo => "Turbo",
            Self::TwinTurbo => "Twin Turbo",
            Self::Supercharged => "Supercharged",
        }
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Availability {
    #[default]
    Available,
    Sold,
    Pending,
    Reserved,
}

impl Label for Availability {
    fn label(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Sold => "Sold",
            Self::Pending => "Pending",
            Self::Reserved => "Reserved",
        }
    }
}

/// Car listing data structure.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Car {
    pub id: CarId,

    // Basic information
    /// e.g. "Toyota Land Cruiser V8"
    pub title: String,
    pub description: String,
    /// Price in KES
    pub price: Decimal,
    pub category: CategoryId,

    // Seller information
    pub seller_type: SellerType,
    /// Rating out of 5.0
    pub condition_score: Option<Decimal>,

    // Car details
    /// Manufacturing year
    pub year: u32,
    /// e.g. "Nairobi, Kenya"
    pub location: String,
    pub availability: Availability,

    // Technical specifications
    pub drive: Drive,
    /// Mileage in KM
    pub mileage: u32,
    /// Engine size in CC
    pub engine_size: u32,
    pub fuel_type: FuelType,
    /// Engine power in HP
    pub horse_power: Option<u32>,
    pub transmission: Transmission,
    /// Torque in Nm
    pub torque: Option<u32>,
    pub aspiration: Option<Aspiration>,
    /// 0-100 Kph in seconds
    pub acceleration: Option<Decimal>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
}

impl Default for Car {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            title: "".to_string(),
            description: "".to_string(),
            price: Decimal::ZERO,
            category: Uuid::nil(),
            seller_type: SellerType::default(),
            condition_score: None,
            year: 2000,
            location: "".to_string(),
            availability: Availability::default(),
            drive: Drive::default(),
            mileage: 0,
            engine_size: 0,
            fuel_type: FuelType::default(),
            horse_power: None,
            transmission: Transmission::default(),
            torque: None,
            aspiration: None,
            acceleration: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            created_by: None,
        }
    }
}

impl Collectable for Car {
    fn get_collection_name() -> &'static str {
        "cars"
    }
}

impl Identifiable for Car {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

impl Car {
    /// Validates field-level rules and the category reference. Called before
    /// any create or update is persisted.
    pub fn validate(&self, db: &Database) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(ErrorKind::BadInput("title cannot be empty".to_string()).into());
        }
        if self.price < Decimal::ZERO {
            return Err(ErrorKind::BadInput("price cannot be negative".to_string()).into());
        }
        let current_year = Utc::now().year() as u32;
        if self.year < 1900 || self.year > current_year + 1 {
            return Err(ErrorKind::BadInput(format!(
                "year must be between 1900 and {}",
                current_year + 1
            ))
            .into());
        }
        if let Some(score) = self.condition_score {
            if score < Decimal::ZERO || score > Decimal::from(5) {
                return Err(ErrorKind::BadInput(
                    "condition score must be between 0 and 5".to_string(),
                )
                .into());
            }
        }
        if let Some(acceleration) = self.acceleration {
            if acceleration < Decimal::ZERO {
                return Err(
                    ErrorKind::BadInput("acceleration cannot be negative".to_string()).into(),
                );
            }
        }
        db.get::<Category>(self.category)
            .map_err(|_| ErrorKind::CategoryNotFound(self.category))?;

        Ok(())
    }

    pub fn formatted_price(&self) -> String {
        format!("KSh {}", util::group_thousands(self.price.round()))
    }

    pub fn formatted_mileage(&self) -> String {
        format!("{} KM", util::group_thousands(self.mileage.into()))
    }

    pub fn formatted_engine_size(&self) -> String {
        format!("{} CC", self.engine_size)
    }

    pub fn formatted_horse_power(&self) -> Option<String> {
        self.horse_power.map(|hp| format!("{} Hp", hp))
    }

    pub fn formatted_torque(&self) -> Option<String> {
        self.torque.map(|t| format!("{} Nm", t))
    }

    pub fn formatted_acceleration(&self) -> Option<String> {
        self.acceleration.map(|a| format!("{} Secs (0-100 Kph)", a))
    }

    pub fn formatted_condition_score(&self) -> Option<String> {
        self.condition_score.map(|s| format!("{}/5", s))
    }
}

/// Query-string filter for the car list. All fields optional; absent fields
/// don't constrain the result.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CarFilter {
    pub category: Option<CategoryId>,
    /// Case-insensitive substring match on location.
    pub location: Option<String>,
    /// Case-insensitive substring match on title.
    pub search: Option<String>,

    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_year: Option<u32>,
    pub max_year: Option<u32>,
    pub min_mileage: Option<u32>,
    pub max_mileage: Option<u32>,

    pub seller_type: Option<SellerType>,
    pub fuel_type: Option<FuelType>,
    pub transmission: Option<Transmission>,
    pub drive: Option<Drive>,
    pub availability: Option<Availability>,

    pub ordering: Option<String>,
}

impl CarFilter {
    pub fn matches(&self, car: &Car) -> bool {
        if let Some(category) = self.category {
            if car.category != category {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if !car
                .location
                .to_lowercase()
                .contains(&location.to_lowercase())
            {
                return false;
            }
        }
        if let Some(search) = &self.search {
            if !car.title.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if car.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if car.price > max {
                return false;
            }
        }
        if let Some(min) = self.min_year {
            if car.year < min {
                return false;
            }
        }
        if let Some(max) = self.max_year {
            if car.year > max {
                return false;
            }
        }
        if let Some(min) = self.min_mileage {
            if car.mileage < min {
                return false;
            }
        }
        if let Some(max) = self.max_mileage {
            if car.mileage > max {
                return false;
            }
        }
        if let Some(seller_type) = self.seller_type {
            if car.seller_type != seller_type {
                return false;
            }
        }
        if let Some(fuel_type) = self.fuel_type {
            if car.fuel_type != fuel_type {
                return false;
            }
        }
        if let Some(transmission) = self.transmission {
            if car.transmission != transmission {
                return false;
            }
        }
        if let Some(drive) = self.drive {
            if car.drive != drive {
                return false;
            }
        }
        if let Some(availability) = self.availability {
            if car.availability != availability {
                return false;
            }
        }
        true
    }
}

/// Applies the filter and orders the result. Unknown ordering values fall
/// back to newest-first.
pub fn filter(cars: Vec<Car>, filter: &CarFilter) -> Vec<Car> {
    let mut out = cars
        .into_iter()
        .filter(|c| filter.matches(c))
        .collect::<Vec<_>>();
    sort(&mut out, filter.ordering.as_deref().unwrap_or("-created_at"));
    out
}

/// Sorts cars in place by one of the whitelisted orderings.
pub fn sort(cars: &mut Vec<Car>, ordering: &str) {
    match ordering {
        "price" => cars.sort_by(|a, b| a.price.cmp(&b.price)),
        "-price" => cars.sort_by(|a, b| b.price.cmp(&a.price)),
        "year" => cars.sort_by_key(|c| c.year),
        "-year" => cars.sort_by_key(|c| std::cmp::Reverse(c.year)),
        "mileage" => cars.sort_by_key(|c| c.mileage),
        "-mileage" => cars.sort_by_key(|c| std::cmp::Reverse(c.mileage)),
        "created_at" => cars.sort_by_key(|c| c.created_at),
        "title" => cars.sort_by(|a, b| a.title.cmp(&b.title)),
        "-title" => cars.sort_by(|a, b| b.title.cmp(&a.title)),
        // includes "-created_at"
        _ => cars.sort_by_key(|c| std::cmp::Reverse(c.created_at)),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::Database;

    fn car(title: &str, price: Decimal, year: u32, mileage: u32) -> Car {
        Car {
            title: title.to_string(),
            price,
            year,
            mileage,
            ..Default::default()
        }
    }

    #[test]
    fn filter_ranges_and_search() {
        let cars = vec![
            car("Toyota Land Cruiser V8", dec!(4_500_000), 2015, 90_000),
            car("Mazda Demio", dec!(650_000), 2012, 120_000),
            car("Subaru Outback", dec!(2_100_000), 2018, 60_000),
        ];

        let f = CarFilter {
            min_price: Some(dec!(1_000_000)),
            max_year: Some(2017),
            ..Default::default()
        };
        let out = filter(cars.clone(), &f);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Toyota Land Cruiser V8");

        let f = CarFilter {
            search: Some("outback".to_string()),
            ..Default::default()
        };
        let out = filter(cars, &f);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Subaru Outback");
    }

    #[test]
    fn ordering_whitelist() {
        let mut cars = vec![
            car("b", dec!(200), 2011, 2),
            car("a", dec!(100), 2010, 1),
            car("c", dec!(300), 2012, 3),
        ];
        sort(&mut cars, "price");
        assert_eq!(cars[0].title, "a");
        sort(&mut cars, "-mileage");
        assert_eq!(cars[0].title, "c");
        // unknown ordering falls back without panicking
        sort(&mut cars, "horsepower");
    }

    #[test]
    fn validation_rules() {
        let db = Database::temporary().unwrap();
        let category = Category {
            name: "SUV".to_string(),
            ..Default::default()
        };
        db.set(&category).unwrap();

        let mut car = Car {
            title: "Toyota Prado".to_string(),
            category: category.id,
            year: 2016,
            ..Default::default()
        };
        assert!(car.validate(&db).is_ok());

        car.year = 1850;
        assert!(car.validate(&db).is_err());
        car.year = 2016;

        car.condition_score = Some(dec!(5.5));
        assert!(car.validate(&db).is_err());
        car.condition_score = Some(dec!(4.5));

        car.price = dec!(-1);
        assert!(car.validate(&db).is_err());
        car.price = dec!(100);

        car.category = Uuid::new_v4();
        assert!(matches!(
            car.validate(&db).unwrap_err().kind,
            ErrorKind::CategoryNotFound(_)
        ));
    }

    #[test]
    fn choice_lists() {
        let seller_types = choices::<SellerType>();
        assert!(seller_types
            .iter()
            .any(|(v, l)| v == "verified_dealer" && *l == "Verified Dealer"));

        let drives = choices::<Drive>();
        assert!(drives.iter().any(|(v, l)| v == "2wd" && *l == "2WD"));
        assert_eq!(drives.len(), 5);
    }
}
