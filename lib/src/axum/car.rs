//! Catalog handlers: categories, car listings with filterable search, and
//! the public choice-list endpoints.

use axum::extract::{Path, Query};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json};
use chrono::Utc;
use http::StatusCode;

use crate::car::{
    self, Aspiration, Availability, CarFilter, Drive, FuelType, SellerType, Transmission,
};
use crate::error::{ErrorKind, Result};
use crate::{api, gallery, routes, Car, CarId, Category, CategoryId};

use super::{extract, ConfigExt, DbExt, Router};

pub fn router() -> Router {
    Router::new()
        .route(routes::CARS, get(list_cars).post(create_car))
        .route(
            "/cars/:car_id",
            get(car_detail).put(update_car).delete(delete_car),
        )
        .route("/cars/choices/seller-types", get(seller_type_choices))
        .route("/cars/choices/drives", get(drive_choices))
        .route("/cars/choices/fuel-types", get(fuel_type_choices))
        .route("/cars/choices/transmissions", get(transmission_choices))
        .route("/cars/choices/aspirations", get(aspiration_choices))
        .route("/cars/choices/availability", get(availability_choices))
        .route(routes::CATEGORIES, get(list_categories).post(create_category))
        .route(
            "/categories/:category_id",
            get(category_detail)
                .put(update_category)
                .delete(delete_category),
        )
}

// ============= Cars =============

/// Public car list with filtering and ordering.
pub async fn list_cars(
    Query(filter): Query<CarFilter>,
    Extension(db): DbExt,
    Extension(config): ConfigExt,
) -> Result<impl IntoResponse> {
    let cars = car::filter(db.get_collection::<Car>()?, &filter);

    let mut out = Vec::with_capacity(cars.len());
    for car in &cars {
        out.push(api::CarSummary::new(car, &db, &config)?);
    }
    Ok(Json(out))
}

pub async fn create_car(
    user: extract::User,
    Extension(db): DbExt,
    Extension(config): ConfigExt,
    Json(data): Json<api::CarPayload>,
) -> Result<impl IntoResponse> {
    if !user.can_manage_catalog() {
        return Err(ErrorKind::Forbidden.into());
    }

    let mut car = Car {
        created_by: Some(user.id),
        ..Default::default()
    };
    data.apply(&mut car);
    car.validate(&db)?;
    db.set(&car)?;

    Ok((
        StatusCode::CREATED,
        Json(api::CarDetail::new(&car, &db, &config)?),
    ))
}

/// Public car detail, gallery included.
pub async fn car_detail(
    Path(car_id): Path<CarId>,
    Extension(db): DbExt,
    Extension(config): ConfigExt,
) -> Result<impl IntoResponse> {
    let car = db
        .get::<Car>(car_id)
        .map_err(|_| ErrorKind::CarNotFound(car_id))?;
    Ok(Json(api::CarDetail::new(&car, &db, &config)?))
}

pub async fn update_car(
    Path(car_id): Path<CarId>,
    user: extract::User,
    Extension(db): DbExt,
    Extension(config): ConfigExt,
    Json(data): Json<api::CarPayload>,
) -> Result<impl IntoResponse> {
    if !user.can_manage_catalog() {
        return Err(ErrorKind::Forbidden.into());
    }

    let mut car = db
        .get::<Car>(car_id)
        .map_err(|_| ErrorKind::CarNotFound(car_id))?;
    data.apply(&mut car);
    car.updated_at = Utc::now();
    car.validate(&db)?;
    db.set(&car)?;

    Ok(Json(api::CarDetail::new(&car, &db, &config)?))
}

/// Deletes a car along with its whole gallery.
pub async fn delete_car(
    Path(car_id): Path<CarId>,
    user: extract::User,
    Extension(db): DbExt,
) -> Result<impl IntoResponse> {
    if !user.can_manage_catalog() {
        return Err(ErrorKind::Forbidden.into());
    }

    let car = db
        .get::<Car>(car_id)
        .map_err(|_| ErrorKind::CarNotFound(car_id))?;
    gallery::clear(&db, car.id)?;
    db.remove(&car)?;

    Ok(StatusCode::NO_CONTENT)
}

// ============= Categories =============

pub async fn list_categories(Extension(db): DbExt) -> Result<impl IntoResponse> {
    let mut categories = db.get_collection::<Category>()?;
    categories.sort_by(|a, b| a.name.cmp(&b.name));

    let mut out = Vec::with_capacity(categories.len());
    for category in &categories {
        out.push(api::CategoryEntry::new(category, &db)?);
    }
    Ok(Json(out))
}

pub async fn create_category(
    user: extract::User,
    Extension(db): DbExt,
    Json(data): Json<api::CategoryPayload>,
) -> Result<impl IntoResponse> {
    if !user.can_manage_catalog() {
        return Err(ErrorKind::Forbidden.into());
    }
    if data.name.trim().is_empty() {
        return Err(ErrorKind::BadInput("name cannot be empty".to_string()).into());
    }
    if db
        .get_collection::<Category>()?
        .iter()
        .any(|c| c.name == data.name)
    {
        return Err(
            ErrorKind::BadInput("category with this name already exists".to_string()).into(),
        );
    }

    let category = Category {
        name: data.name,
        description: data.description,
        ..Default::default()
    };
    db.set(&category)?;

    Ok((
        StatusCode::CREATED,
        Json(api::CategoryEntry::new(&category, &db)?),
    ))
}

pub async fn category_detail(
    Path(category_id): Path<CategoryId>,
    Extension(db): DbExt,
) -> Result<impl IntoResponse> {
    let category = db
        .get::<Category>(category_id)
        .map_err(|_| ErrorKind::CategoryNotFound(category_id))?;
    Ok(Json(api::CategoryEntry::new(&category, &db)?))
}

pub async fn update_category(
    Path(category_id): Path<CategoryId>,
    user: extract::User,
    Extension(db): DbExt,
    Json(data): Json<api::CategoryPayload>,
) -> Result<impl IntoResponse> {
    if !user.can_manage_catalog() {
        return Err(ErrorKind::Forbidden.into());
    }

    let mut category = db
        .get::<Category>(category_id)
        .map_err(|_| ErrorKind::CategoryNotFound(category_id))?;
    if data.name.trim().is_empty() {
        return Err(ErrorKind::BadInput("name cannot be empty".to_string()).into());
    }
    if db
        .get_collection::<Category>()?
        .iter()
        .any(|c| c.name == data.name && c.id != category_id)
    {
        return Err(
            ErrorKind::BadInput("category with this name already exists".to_string()).into(),
        );
    }

    category.name = data.name;
    category.description = data.description;
    db.set(&category)?;

    Ok(Json(api::CategoryEntry::new(&category, &db)?))
}

/// Deletes a category. Categories still referenced by cars are protected.
pub async fn delete_category(
    Path(category_id): Path<CategoryId>,
    user: extract::User,
    Extension(db): DbExt,
) -> Result<impl IntoResponse> {
    if !user.can_manage_catalog() {
        return Err(ErrorKind::Forbidden.into());
    }

    let category = db
        .get::<Category>(category_id)
        .map_err(|_| ErrorKind::CategoryNotFound(category_id))?;
    let in_use = car::cars_in_category(&db, category.id)?;
    if in_use > 0 {
        return Err(ErrorKind::CategoryInUse(in_use).into());
    }
    db.remove(&category)?;

    Ok(StatusCode::NO_CONTENT)
}

// ============= Choices =============

pub async fn seller_type_choices() -> impl IntoResponse {
    Json(api::choices::<SellerType>())
}

pub async fn drive_choices() -> impl IntoResponse {
    Json(api::choices::<Drive>())
}

pub async fn fuel_type_choices() -> impl IntoResponse {
    Json(api::choices::<FuelType>())
}

pub async fn transmission_choices() -> impl IntoResponse {
    Json(api::choices::<Transmission>())
}

pub async fn aspiration_choices() -> impl IntoResponse {
    Json(api::choices::<Aspiration>())
}

pub async fn availability_choices() -> impl IntoResponse {
    Json(api::choices::<Availability>())
}
