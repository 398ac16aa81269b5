//! Gallery handlers: uploads, replacement, deletion, primary selection and
//! reordering of a car's images, plus serving the stored blobs.
//!
//! Handlers stay thin: resolve the car, check the caller may mutate the
//! catalog, validate payload shape, then hand over to the [`gallery`]
//! engine which owns the invariants.

use axum::extract::{DefaultBodyLimit, Multipart, Path};
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Extension, Json};
use http::StatusCode;

use crate::error::{ErrorKind, Result};
use crate::gallery::{self, CarImageId, MAX_IMAGE_BYTES};
use crate::{api, Car, CarId, Image, ImageId};

use super::{extract, ConfigExt, DbExt, Router};

pub fn router() -> Router {
    Router::new()
        .route("/cars/:car_id/images", post(upload_image))
        .route("/cars/:car_id/images/bulk", post(bulk_upload_images))
        .route("/cars/:car_id/images/reorder", patch(reorder_images))
        .route(
            "/cars/:car_id/images/:image_id",
            patch(replace_image).delete(delete_image),
        )
        .route(
            "/cars/:car_id/images/:image_id/set-primary",
            patch(set_primary_image),
        )
        .route("/media/:image_id", get(media))
        // a full bulk upload is up to ten files of MAX_IMAGE_BYTES each,
        // which doesn't fit axum's default body limit
        .layer(DefaultBodyLimit::max(12 * MAX_IMAGE_BYTES))
}

fn load_car(db: &crate::Database, car_id: CarId) -> Result<Car> {
    db.get::<Car>(car_id)
        .map_err(|_| ErrorKind::CarNotFound(car_id).into())
}

/// One file pulled out of a multipart request.
struct UploadedFile {
    bytes: Vec<u8>,
    content_type: String,
}

/// Drains a multipart request, collecting files under `file_field` and an
/// optional `order` value. Size limits are enforced here, before anything
/// touches the store.
async fn read_multipart(
    mut multipart: Multipart,
    file_field: &str,
) -> Result<(Vec<UploadedFile>, Option<u32>)> {
    let mut files = Vec::new();
    let mut order = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ErrorKind::BadInput(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == file_field {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ErrorKind::BadInput(e.to_string()))?;
            if bytes.len() > MAX_IMAGE_BYTES {
                return Err(ErrorKind::BadInput(
                    "image file size cannot exceed 5MB".to_string(),
                )
                .into());
            }
            files.push(UploadedFile {
                bytes: bytes.to_vec(),
                content_type,
            });
        } else if name == "order" {
            let text = field
                .text()
                .await
                .map_err(|e| ErrorKind::BadInput(e.to_string()))?;
            order = Some(text.parse::<u32>().map_err(|_| {
                ErrorKind::BadInput("order must be a positive integer".to_string())
            })?);
        }
    }

    Ok((files, order))
}

/// Upload a single image to a car. Accepts an `image` file plus an optional
/// `order` value.
pub async fn upload_image(
    Path(car_id): Path<CarId>,
    user: extract::User,
    Extension(db): DbExt,
    Extension(config): ConfigExt,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let car = load_car(&db, car_id)?;
    if !user.can_manage_catalog() {
        return Err(ErrorKind::Forbidden.into());
    }

    let (mut files, order) = read_multipart(multipart, "image").await?;
    let file = match files.pop() {
        Some(file) if files.is_empty() => file,
        Some(_) => {
            return Err(ErrorKind::BadInput(
                "expected a single image file, use the bulk endpoint for more".to_string(),
            )
            .into())
        }
        None => return Err(ErrorKind::BadInput("no image file provided".to_string()).into()),
    };

    let created = gallery::create_image(
        &db,
        car.id,
        file.bytes,
        &file.content_type,
        order,
        None,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(api::CarImageEntry::new(&created, &config)),
    ))
}

/// Upload multiple images at once. The whole batch is accepted or rejected
/// as one unit.
pub async fn bulk_upload_images(
    Path(car_id): Path<CarId>,
    user: extract::User,
    Extension(db): DbExt,
    Extension(config): ConfigExt,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let car = load_car(&db, car_id)?;
    if !user.can_manage_catalog() {
        return Err(ErrorKind::Forbidden.into());
    }

    let (files, order) = read_multipart(multipart, "images").await?;
    if files.is_empty() {
        return Err(ErrorKind::BadInput("no image files provided".to_string()).into());
    }

    let blobs = files
        .into_iter()
        .map(|f| (f.bytes, f.content_type))
        .collect();
    let created = gallery::create_images(&db, car.id, blobs, order)?;

    Ok((
        StatusCode::CREATED,
        Json(
            created
                .iter()
                .map(|record| api::CarImageEntry::new(record, &config))
                .collect::<Vec<_>>(),
        ),
    ))
}

/// Replace an image's content in place, keeping its id, order and primary
/// flag.
pub async fn replace_image(
    Path((car_id, image_id)): Path<(CarId, CarImageId)>,
    user: extract::User,
    Extension(db): DbExt,
    Extension(config): ConfigExt,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let car = load_car(&db, car_id)?;
    if !user.can_manage_catalog() {
        return Err(ErrorKind::Forbidden.into());
    }

    let (mut files, _) = read_multipart(multipart, "image").await?;
    let file = files
        .pop()
        .ok_or_else(|| ErrorKind::BadInput("no image file provided".to_string()))?;

    let updated = gallery::replace_image(&db, car.id, image_id, file.bytes, &file.content_type)?;

    Ok(Json(api::CarImageEntry::new(&updated, &config)))
}

/// Delete an image. When the primary image goes, the gallery promotes a
/// survivor on its own.
pub async fn delete_image(
    Path((car_id, image_id)): Path<(CarId, CarImageId)>,
    user: extract::User,
    Extension(db): DbExt,
) -> Result<impl IntoResponse> {
    let car = load_car(&db, car_id)?;
    if !user.can_manage_catalog() {
        return Err(ErrorKind::Forbidden.into());
    }

    gallery::delete_image(&db, car.id, image_id)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Make an image the car's primary image.
pub async fn set_primary_image(
    Path((car_id, image_id)): Path<(CarId, CarImageId)>,
    user: extract::User,
    Extension(db): DbExt,
    Extension(config): ConfigExt,
) -> Result<impl IntoResponse> {
    let car = load_car(&db, car_id)?;
    if !user.can_manage_catalog() {
        return Err(ErrorKind::Forbidden.into());
    }

    let updated = gallery::set_primary(&db, car.id, image_id)?;

    Ok(Json(api::CarImageEntry::new(&updated, &config)))
}

/// Reorder a car's images with a batch of `{id, order}` pairs. Returns the
/// full gallery in display order.
pub async fn reorder_images(
    Path(car_id): Path<CarId>,
    user: extract::User,
    Extension(db): DbExt,
    Extension(config): ConfigExt,
    Json(data): Json<api::ReorderRequest>,
) -> Result<impl IntoResponse> {
    let car = load_car(&db, car_id)?;
    if !user.can_manage_catalog() {
        return Err(ErrorKind::Forbidden.into());
    }
    if data.image_orders.is_empty() {
        return Err(ErrorKind::BadInput("image_orders cannot be empty".to_string()).into());
    }

    let assignments = data
        .image_orders
        .iter()
        .map(|entry| (entry.id, entry.order))
        .collect::<Vec<_>>();
    let images = gallery::reorder(&db, car.id, &assignments)?;

    Ok(Json(
        images
            .iter()
            .map(|record| api::CarImageEntry::new(record, &config))
            .collect::<Vec<_>>(),
    ))
}

/// Serves stored image bytes with their recorded content type.
pub async fn media(
    Path(image_id): Path<ImageId>,
    Extension(db): DbExt,
) -> Result<impl IntoResponse> {
    let image = db
        .get::<Image>(image_id)
        .map_err(|_| ErrorKind::ImageNotFound(image_id))?;
    Ok((
        axum::response::AppendHeaders([(http::header::CONTENT_TYPE, image.content_type)]),
        image.bytes,
    ))
}
