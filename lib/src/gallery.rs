//! Car image gallery management.
//!
//! Each car owns an ordered gallery of up to [`MAX_IMAGES`] images, exactly
//! one of which is the *primary* (cover) image whenever the gallery is
//! non-empty. This module is the only writer of gallery state and maintains
//! those invariants across every operation:
//!
//! - the first image ever uploaded becomes primary with order 1,
//! - explicitly promoting an image clears the flag on all of its siblings,
//! - deleting the primary image promotes the first surviving sibling under
//!   the display ordering (primary first, then order, then upload time),
//! - capacity and batch checks reject whole operations up front, never
//!   leaving partial state behind.
//!
//! Every operation runs as a single sled transaction spanning the gallery
//! index, the image records and the stored blobs. The per-car [`Gallery`]
//! index record is read and rewritten by each of them, so concurrent
//! operations on the same car conflict and retry against fresh state; a
//! stale capacity check or a double primary cannot commit.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::transaction::{
    ConflictableTransactionError, ConflictableTransactionResult, TransactionalTree,
};
use sled::Transactional;
use uuid::Uuid;

use crate::car::CarId;
use crate::db::{decode, encode, Collectable, Database, Identifiable};
use crate::error::{ErrorKind, Result};
use crate::image::{Image, ImageId};

/// Hard cap on the number of images attached to a single car.
pub const MAX_IMAGES: usize = 10;
/// Largest accepted image upload, in bytes.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub type CarImageId = Uuid;

/// One photo attached to exactly one car.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CarImage {
    pub id: CarImageId,
    /// Owning car. Never changes after creation.
    pub car: CarId,
    /// Reference to the stored blob.
    pub image: ImageId,
    pub is_primary: bool,
    pub order: u32,
    pub uploaded_at: DateTime<Utc>,
}

impl Collectable for CarImage {
    fn get_collection_name() -> &'static str {
        "car_images"
    }
}

impl Identifiable for CarImage {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

/// Per-car gallery membership index, keyed by the car's own id.
///
/// Maintained exclusively by the operations in this module. Doubles as the
/// serialization point for concurrent gallery operations on the same car.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Gallery {
    pub id: CarId,
    pub images: Vec<CarImageId>,
}

impl Collectable for Gallery {
    fn get_collection_name() -> &'static str {
        "galleries"
    }
}

impl Identifiable for Gallery {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

/// Sorts images into display order: primary first, then by `order`, then by
/// upload time.
pub fn sort_display(images: &mut Vec<CarImage>) {
    images.sort_by(|a, b| {
        b.is_primary
            .cmp(&a.is_primary)
            .then(a.order.cmp(&b.order))
            .then(a.uploaded_at.cmp(&b.uploaded_at))
    });
}

/// Returns the car's gallery in display order. A car with no images yields
/// an empty list.
pub fn collection(db: &Database, car: CarId) -> Result<Vec<CarImage>> {
    let gallery = match db.get::<Gallery>(car) {
        Ok(g) => g,
        Err(_) => return Ok(vec![]),
    };
    let mut images = Vec::with_capacity(gallery.images.len());
    for id in gallery.images {
        images.push(db.get::<CarImage>(id)?);
    }
    sort_display(&mut images);
    Ok(images)
}

/// Number of images currently attached to the car.
pub fn image_count(db: &Database, car: CarId) -> Result<usize> {
    match db.get::<Gallery>(car) {
        Ok(g) => Ok(g.images.len()),
        Err(_) => Ok(0),
    }
}

/// The car's primary image, if it has any images at all.
pub fn primary_image(db: &Database, car: CarId) -> Result<Option<CarImage>> {
    Ok(collection(db, car)?.into_iter().find(|i| i.is_primary))
}

type TxResult<T> = ConflictableTransactionResult<T, Box<ErrorKind>>;

fn tx_abort<T>(kind: ErrorKind) -> TxResult<T> {
    Err(ConflictableTransactionError::Abort(Box::new(kind)))
}

fn tx_decode<T: DeserializeOwned>(bytes: &[u8]) -> TxResult<T> {
    match decode(bytes) {
        Ok(value) => Ok(value),
        Err(e) => tx_abort(e.kind),
    }
}

fn tx_put<T: Serialize + Identifiable>(tree: &TransactionalTree, value: &T) -> TxResult<()> {
    let encoded = match encode(value) {
        Ok(bytes) => bytes,
        Err(e) => return tx_abort(e.kind),
    };
    tree.insert(value.get_id().as_bytes().to_vec(), encoded)?;
    Ok(())
}

fn tx_gallery(tree: &TransactionalTree, car: CarId) -> TxResult<Gallery> {
    match tree.get(car.as_bytes())? {
        Some(bytes) => tx_decode(&bytes),
        None => Ok(Gallery {
            id: car,
            images: vec![],
        }),
    }
}

fn tx_record(tree: &TransactionalTree, id: CarImageId) -> TxResult<CarImage> {
    match tree.get(id.as_bytes())? {
        Some(bytes) => tx_decode(&bytes),
        None => tx_abort(ErrorKind::DbError(format!(
            "gallery index references missing image record {}",
            id
        ))),
    }
}

/// Clears `is_primary` on every image listed in the gallery. Unconditional
/// over all siblings, so a corrupted double-primary state heals here.
fn tx_clear_primary(records: &TransactionalTree, gallery: &Gallery) -> TxResult<()> {
    for id in &gallery.images {
        let mut sibling = tx_record(records, *id)?;
        if sibling.is_primary {
            sibling.is_primary = false;
            tx_put(records, &sibling)?;
        }
    }
    Ok(())
}

/// Order values currently taken by the gallery's images.
fn tx_orders(records: &TransactionalTree, gallery: &Gallery) -> TxResult<Vec<u32>> {
    let mut orders = Vec::with_capacity(gallery.images.len());
    for id in &gallery.images {
        orders.push(tx_record(records, *id)?.order);
    }
    Ok(orders)
}

/// Resolves the order for a new image. A caller-supplied value must be
/// free; the default next-slot value silently skips over taken values so
/// sibling orders stay unique.
fn tx_next_order(requested: Option<u32>, taken: &[u32], count: usize) -> TxResult<u32> {
    match requested {
        Some(order) if taken.contains(&order) => {
            tx_abort(ErrorKind::BadInput(format!("order {} is already taken", order)))
        }
        Some(order) => Ok(order),
        None => {
            let next = count as u32 + 1;
            if taken.contains(&next) {
                Ok(taken.iter().max().copied().unwrap_or(0) + 1)
            } else {
                Ok(next)
            }
        }
    }
}

fn trees(db: &Database) -> Result<(sled::Tree, sled::Tree, sled::Tree)> {
    Ok((
        db.tree(Gallery::get_collection_name())?,
        db.tree(CarImage::get_collection_name())?,
        db.tree(Image::get_collection_name())?,
    ))
}

/// Attaches a single new image to the car.
///
/// The first image a car ever gets is forced to be primary with order 1,
/// regardless of the requested values. Otherwise order defaults to the next
/// free slot and the image stays non-primary unless explicitly requested,
/// in which case all current siblings are demoted in the same transaction.
pub fn create_image(
    db: &Database,
    car: CarId,
    bytes: Vec<u8>,
    content_type: &str,
    order: Option<u32>,
    primary: Option<bool>,
) -> Result<CarImage> {
    let blob = Image::new(bytes, content_type);
    let record_id = CarImageId::new_v4();
    let uploaded_at = Utc::now();

    let (galleries, records, blobs) = trees(db)?;
    let created = (&galleries, &records, &blobs).transaction(|(galleries, records, blobs)| {
        let mut gallery = tx_gallery(galleries, car)?;
        let current = gallery.images.len();
        if current + 1 > MAX_IMAGES {
            return tx_abort(ErrorKind::GalleryFull {
                current,
                requested: 1,
            });
        }

        let first = current == 0;
        let record = CarImage {
            id: record_id,
            car,
            image: blob.id,
            is_primary: first || primary.unwrap_or(false),
            order: if first {
                1
            } else {
                let taken = tx_orders(records, &gallery)?;
                tx_next_order(order, &taken, current)?
            },
            uploaded_at,
        };

        if record.is_primary && !first {
            tx_clear_primary(records, &gallery)?;
        }

        tx_put(blobs, &blob)?;
        tx_put(records, &record)?;
        gallery.images.push(record.id);
        tx_put(galleries, &gallery)?;

        Ok(record)
    })?;

    Ok(created)
}

/// Attaches a batch of new images to the car, all-or-nothing.
///
/// The whole batch is checked against capacity up front; a batch that would
/// overflow is rejected without creating anything. Orders are assigned
/// sequentially in upload order starting right after the existing images
/// (or at `start_order` when given). The first blob of the batch becomes
/// primary only when the car had no images at all.
pub fn create_images(
    db: &Database,
    car: CarId,
    blobs_in: Vec<(Vec<u8>, String)>,
    start_order: Option<u32>,
) -> Result<Vec<CarImage>> {
    if blobs_in.is_empty() {
        return Err(ErrorKind::BadInput("no image files provided".to_string()).into());
    }

    let uploaded_at = Utc::now();
    let prepared = blobs_in
        .into_iter()
        .map(|(bytes, content_type)| (CarImageId::new_v4(), Image::new(bytes, content_type)))
        .collect::<Vec<_>>();

    let (galleries, records, blobs) = trees(db)?;
    let created = (&galleries, &records, &blobs).transaction(|(galleries, records, blobs)| {
        let mut gallery = tx_gallery(galleries, car)?;
        let current = gallery.images.len();
        if current + prepared.len() > MAX_IMAGES {
            return tx_abort(ErrorKind::GalleryFull {
                current,
                requested: prepared.len(),
            });
        }

        // the whole batch has to land on free order slots
        let taken = tx_orders(records, &gallery)?;
        let collides = |base: u32| (0..prepared.len() as u32).any(|o| taken.contains(&(base + o)));
        let base = match start_order {
            Some(base) => {
                if collides(base) {
                    return tx_abort(ErrorKind::BadInput(format!(
                        "orders starting at {} are already taken",
                        base
                    )));
                }
                base
            }
            None => {
                let next = current as u32 + 1;
                if collides(next) {
                    taken.iter().max().copied().unwrap_or(0) + 1
                } else {
                    next
                }
            }
        };

        let mut out = Vec::with_capacity(prepared.len());
        for (idx, (record_id, blob)) in prepared.iter().enumerate() {
            let record = CarImage {
                id: *record_id,
                car,
                image: blob.id,
                is_primary: current == 0 && idx == 0,
                order: base + idx as u32,
                uploaded_at,
            };
            tx_put(blobs, blob)?;
            tx_put(records, &record)?;
            gallery.images.push(record.id);
            out.push(record);
        }
        tx_put(galleries, &gallery)?;

        Ok(out)
    })?;

    Ok(created)
}

/// Replaces the stored content of an existing image in place.
///
/// Identity is untouched: id, order and the primary flag all stay the same,
/// only the blob reference changes. The old blob is released in the same
/// transaction that stores the new one, so no failure can lose the previous
/// content before the replacement is durable.
pub fn replace_image(
    db: &Database,
    car: CarId,
    image_id: CarImageId,
    bytes: Vec<u8>,
    content_type: &str,
) -> Result<CarImage> {
    let blob = Image::new(bytes, content_type);

    let (galleries, records, blobs) = trees(db)?;
    let updated = (&galleries, &records, &blobs).transaction(|(galleries, records, blobs)| {
        let gallery = tx_gallery(galleries, car)?;
        if !gallery.images.contains(&image_id) {
            return tx_abort(ErrorKind::ImageNotFound(image_id));
        }

        let mut record = tx_record(records, image_id)?;
        let old_blob = record.image;
        record.image = blob.id;

        tx_put(blobs, &blob)?;
        tx_put(records, &record)?;
        blobs.remove(old_blob.as_bytes().to_vec())?;
        // rewrite the index so concurrent gallery operations serialize
        tx_put(galleries, &gallery)?;

        Ok(record)
    })?;

    Ok(updated)
}

/// Makes the given image the car's primary image.
///
/// Demotes every currently-primary sibling first, in the same transaction.
/// Calling it on the image that is already primary is a no-op beyond
/// returning the current state.
pub fn set_primary(db: &Database, car: CarId, image_id: CarImageId) -> Result<CarImage> {
    let (galleries, records, blobs) = trees(db)?;
    let updated = (&galleries, &records, &blobs).transaction(|(galleries, records, _blobs)| {
        let gallery = tx_gallery(galleries, car)?;
        if !gallery.images.contains(&image_id) {
            return tx_abort(ErrorKind::ImageNotFound(image_id));
        }

        tx_clear_primary(records, &gallery)?;

        let mut record = tx_record(records, image_id)?;
        record.is_primary = true;
        tx_put(records, &record)?;
        tx_put(galleries, &gallery)?;

        Ok(record)
    })?;

    Ok(updated)
}

/// Deletes an image, releasing its blob.
///
/// When the deleted image was primary and siblings remain, the first
/// survivor under the display ordering is promoted so the gallery keeps
/// exactly one primary image.
pub fn delete_image(db: &Database, car: CarId, image_id: CarImageId) -> Result<()> {
    let (galleries, records, blobs) = trees(db)?;
    (&galleries, &records, &blobs).transaction(|(galleries, records, blobs)| {
        let mut gallery = tx_gallery(galleries, car)?;
        if !gallery.images.contains(&image_id) {
            return tx_abort(ErrorKind::ImageNotFound(image_id));
        }

        let target = tx_record(records, image_id)?;
        records.remove(image_id.as_bytes().to_vec())?;
        blobs.remove(target.image.as_bytes().to_vec())?;
        gallery.images.retain(|id| *id != image_id);

        if target.is_primary && !gallery.images.is_empty() {
            let mut survivors = Vec::with_capacity(gallery.images.len());
            for id in &gallery.images {
                survivors.push(tx_record(records, *id)?);
            }
            sort_display(&mut survivors);
            let mut promoted = survivors.remove(0);
            promoted.is_primary = true;
            tx_put(records, &promoted)?;
        }

        if gallery.images.is_empty() {
            galleries.remove(car.as_bytes().to_vec())?;
        } else {
            tx_put(galleries, &gallery)?;
        }

        Ok(())
    })?;

    Ok(())
}

/// Applies a batch of `(image id, new order)` assignments.
///
/// The whole batch is rejected when any id doesn't belong to the car, or
/// when applying it would leave two images sharing an order value. Returns
/// the full gallery in display order.
pub fn reorder(
    db: &Database,
    car: CarId,
    assignments: &[(CarImageId, u32)],
) -> Result<Vec<CarImage>> {
    if assignments.is_empty() {
        return Err(ErrorKind::BadInput("image_orders cannot be empty".to_string()).into());
    }

    let (galleries, records, blobs) = trees(db)?;
    let mut images = (&galleries, &records, &blobs).transaction(|(galleries, records, _blobs)| {
        let gallery = tx_gallery(galleries, car)?;
        for (id, _) in assignments {
            if !gallery.images.contains(id) {
                return tx_abort(ErrorKind::ImageNotFound(*id));
            }
        }

        let mut all = Vec::with_capacity(gallery.images.len());
        for id in &gallery.images {
            all.push(tx_record(records, *id)?);
        }
        for (id, order) in assignments {
            let record = all
                .iter_mut()
                .find(|r| r.id == *id)
                .expect("membership checked above");
            record.order = *order;
        }

        let mut seen = std::collections::HashSet::new();
        if !all.iter().all(|r| seen.insert(r.order)) {
            return tx_abort(ErrorKind::BadInput(
                "reorder would leave duplicate order values".to_string(),
            ));
        }

        for record in &all {
            tx_put(records, record)?;
        }
        tx_put(galleries, &gallery)?;

        Ok(all)
    })?;

    sort_display(&mut images);
    Ok(images)
}

/// Removes the car's whole gallery: records, blobs and index. Called when
/// the car itself is deleted.
pub fn clear(db: &Database, car: CarId) -> Result<()> {
    let (galleries, records, blobs) = trees(db)?;
    (&galleries, &records, &blobs).transaction(|(galleries, records, blobs)| {
        let gallery = tx_gallery(galleries, car)?;
        for id in &gallery.images {
            let record = tx_record(records, *id)?;
            records.remove(id.as_bytes().to_vec())?;
            blobs.remove(record.image.as_bytes().to_vec())?;
        }
        galleries.remove(car.as_bytes().to_vec())?;
        Ok(())
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::temporary().unwrap()
    }

    fn png(seed: u8) -> Vec<u8> {
        vec![seed; 64]
    }

    fn upload(db: &Database, car: CarId, seed: u8) -> CarImage {
        create_image(db, car, png(seed), "image/png", None, None).unwrap()
    }

    fn assert_single_primary(db: &Database, car: CarId) {
        let images = collection(db, car).unwrap();
        let primaries = images.iter().filter(|i| i.is_primary).count();
        if images.is_empty() {
            assert_eq!(primaries, 0);
        } else {
            assert_eq!(primaries, 1);
        }
    }

    #[test]
    fn first_image_is_forced_primary() {
        let db = db();
        let car = CarId::new_v4();

        // requested values are overridden for the very first image
        let image = create_image(&db, car, png(1), "image/png", Some(7), Some(false)).unwrap();
        assert!(image.is_primary);
        assert_eq!(image.order, 1);
        assert_single_primary(&db, car);
    }

    #[test]
    fn capacity_enforced_at_ten() {
        let db = db();
        let car = CarId::new_v4();
        for i in 0..10 {
            upload(&db, car, i);
        }
        assert_eq!(image_count(&db, car).unwrap(), 10);

        let err = create_image(&db, car, png(11), "image/png", None, None).unwrap_err();
        match err.kind {
            ErrorKind::GalleryFull { current, requested } => {
                assert_eq!(current, 10);
                assert_eq!(requested, 1);
            }
            k => panic!("expected GalleryFull, got {:?}", k),
        }
        // the existing ten are untouched
        assert_eq!(image_count(&db, car).unwrap(), 10);
        assert_single_primary(&db, car);
    }

    #[test]
    fn bulk_upload_is_all_or_nothing() {
        let db = db();
        let car = CarId::new_v4();
        for i in 0..5 {
            upload(&db, car, i);
        }

        let batch = (0..6).map(|i| (png(i), "image/png".to_string())).collect();
        let err = create_images(&db, car, batch, None).unwrap_err();
        match err.kind {
            ErrorKind::GalleryFull { current, requested } => {
                assert_eq!(current, 5);
                assert_eq!(requested, 6);
            }
            k => panic!("expected GalleryFull, got {:?}", k),
        }
        assert_eq!(image_count(&db, car).unwrap(), 5);

        let batch = (0..5).map(|i| (png(i), "image/png".to_string())).collect();
        let created = create_images(&db, car, batch, None).unwrap();
        assert_eq!(created.len(), 5);
        assert_eq!(image_count(&db, car).unwrap(), 10);
    }

    #[test]
    fn bulk_assigns_sequential_orders() {
        let db = db();
        let car = CarId::new_v4();

        let batch = (0..3).map(|i| (png(i), "image/png".to_string())).collect();
        let created = create_images(&db, car, batch, None).unwrap();

        assert_eq!(
            created.iter().map(|i| i.order).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        // only the first of the batch is primary, and only because the car
        // had no images yet
        assert!(created[0].is_primary);
        assert!(!created[1].is_primary);
        assert!(!created[2].is_primary);
        assert_single_primary(&db, car);

        let batch = vec![(png(9), "image/png".to_string())];
        let more = create_images(&db, car, batch, None).unwrap();
        assert_eq!(more[0].order, 4);
        assert!(!more[0].is_primary);
    }

    #[test]
    fn explicit_primary_clears_siblings() {
        let db = db();
        let car = CarId::new_v4();
        let a = upload(&db, car, 1);

        let b = create_image(&db, car, png(2), "image/png", None, Some(true)).unwrap();
        assert!(b.is_primary);
        assert!(!db.get::<CarImage>(a.id).unwrap().is_primary);
        assert_single_primary(&db, car);
    }

    #[test]
    fn set_primary_flips_and_is_idempotent() {
        let db = db();
        let car = CarId::new_v4();
        let a = upload(&db, car, 1);
        let b = upload(&db, car, 2);

        let updated = set_primary(&db, car, b.id).unwrap();
        assert!(updated.is_primary);
        assert!(!db.get::<CarImage>(a.id).unwrap().is_primary);
        assert_single_primary(&db, car);

        // calling again changes nothing
        let again = set_primary(&db, car, b.id).unwrap();
        assert!(again.is_primary);
        assert_single_primary(&db, car);
    }

    #[test]
    fn deleting_primary_promotes_first_by_display_order() {
        let db = db();
        let car = CarId::new_v4();
        let a = upload(&db, car, 1);
        let b = upload(&db, car, 2);
        let c = upload(&db, car, 3);
        assert!(a.is_primary);

        delete_image(&db, car, a.id).unwrap();

        assert_eq!(image_count(&db, car).unwrap(), 2);
        assert_single_primary(&db, car);
        // b has the lowest order among survivors
        let promoted = primary_image(&db, car).unwrap().unwrap();
        assert_eq!(promoted.id, b.id);
        assert!(!db.get::<CarImage>(c.id).unwrap().is_primary);
    }

    #[test]
    fn deleting_non_primary_keeps_primary() {
        let db = db();
        let car = CarId::new_v4();
        let a = upload(&db, car, 1);
        let b = upload(&db, car, 2);

        delete_image(&db, car, b.id).unwrap();
        let primary = primary_image(&db, car).unwrap().unwrap();
        assert_eq!(primary.id, a.id);
    }

    #[test]
    fn deleting_last_image_leaves_no_primary() {
        let db = db();
        let car = CarId::new_v4();
        let a = upload(&db, car, 1);

        delete_image(&db, car, a.id).unwrap();
        assert_eq!(image_count(&db, car).unwrap(), 0);
        assert!(primary_image(&db, car).unwrap().is_none());
    }

    #[test]
    fn delete_unknown_image_not_found() {
        let db = db();
        let car = CarId::new_v4();
        upload(&db, car, 1);

        let stray = CarImageId::new_v4();
        let err = delete_image(&db, car, stray).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::ImageNotFound(id) if id == stray));
        assert_eq!(image_count(&db, car).unwrap(), 1);
    }

    #[test]
    fn replace_keeps_identity() {
        let db = db();
        let car = CarId::new_v4();
        upload(&db, car, 1);
        let b = create_image(&db, car, png(2), "image/png", None, None).unwrap();

        let updated = replace_image(&db, car, b.id, png(9), "image/jpeg").unwrap();
        assert_eq!(updated.id, b.id);
        assert_eq!(updated.order, b.order);
        assert_eq!(updated.is_primary, b.is_primary);
        assert_ne!(updated.image, b.image);

        // new blob stored, old blob released
        let blob = db.get::<Image>(updated.image).unwrap();
        assert_eq!(blob.bytes, png(9));
        assert!(db.get::<Image>(b.image).is_err());
    }

    #[test]
    fn replace_checks_car_ownership() {
        let db = db();
        let car = CarId::new_v4();
        let a = upload(&db, car, 1);

        let other_car = CarId::new_v4();
        let err = replace_image(&db, other_car, a.id, png(9), "image/png").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::ImageNotFound(_)));

        // untouched
        let unchanged = db.get::<CarImage>(a.id).unwrap();
        assert_eq!(unchanged.image, a.image);
    }

    #[test]
    fn reorder_swaps_display_order() {
        let db = db();
        let car = CarId::new_v4();
        let a = upload(&db, car, 1);
        let b = upload(&db, car, 2);
        let c = upload(&db, car, 3);

        delete_image(&db, car, a.id).unwrap();

        // orders already match: no-op relative to prior state
        let images = reorder(&db, car, &[(b.id, 2), (c.id, 3)]).unwrap();
        assert_eq!(
            images.iter().map(|i| i.id).collect::<Vec<_>>(),
            vec![b.id, c.id]
        );

        // swap: display order flips, primary flag untouched
        let images = reorder(&db, car, &[(b.id, 3), (c.id, 2)]).unwrap();
        assert_eq!(images[0].id, b.id, "primary stays in front of the gallery");
        assert!(images[0].is_primary);
        assert_eq!(images[1].id, c.id);
        assert_single_primary(&db, car);
    }

    #[test]
    fn reorder_unknown_id_rejects_batch() {
        let db = db();
        let car = CarId::new_v4();
        let a = upload(&db, car, 1);
        let b = upload(&db, car, 2);

        let stray = CarImageId::new_v4();
        let err = reorder(&db, car, &[(a.id, 2), (stray, 1)]).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::ImageNotFound(id) if id == stray));

        // nothing applied
        assert_eq!(db.get::<CarImage>(a.id).unwrap().order, 1);
        assert_eq!(db.get::<CarImage>(b.id).unwrap().order, 2);
    }

    #[test]
    fn reorder_rejects_duplicate_orders() {
        let db = db();
        let car = CarId::new_v4();
        let a = upload(&db, car, 1);
        let b = upload(&db, car, 2);

        let err = reorder(&db, car, &[(b.id, 1)]).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::BadInput(_)));
        assert_eq!(db.get::<CarImage>(a.id).unwrap().order, 1);
        assert_eq!(db.get::<CarImage>(b.id).unwrap().order, 2);
    }

    #[test]
    fn create_rejects_taken_order() {
        let db = db();
        let car = CarId::new_v4();
        upload(&db, car, 1);
        upload(&db, car, 2);

        let err = create_image(&db, car, png(3), "image/png", Some(2), None).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::BadInput(_)));
        assert_eq!(image_count(&db, car).unwrap(), 2);
    }

    #[test]
    fn defaulted_order_skips_taken_slots() {
        let db = db();
        let car = CarId::new_v4();
        let a = upload(&db, car, 1);
        let b = upload(&db, car, 2);
        delete_image(&db, car, a.id).unwrap();
        // survivor keeps order 2, so the count-based default of 2 is taken
        assert_eq!(db.get::<CarImage>(b.id).unwrap().order, 2);

        let c = upload(&db, car, 3);
        assert_eq!(c.order, 3);
    }

    #[test]
    fn reorder_rejects_empty_batch() {
        let db = db();
        let car = CarId::new_v4();
        upload(&db, car, 1);

        let err = reorder(&db, car, &[]).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::BadInput(_)));
    }

    #[test]
    fn blobs_follow_record_lifecycle() {
        let db = db();
        let car = CarId::new_v4();
        let a = upload(&db, car, 1);

        let blob = db.get::<Image>(a.image).unwrap();
        assert_eq!(blob.bytes, png(1));
        assert_eq!(blob.content_type, "image/png");

        delete_image(&db, car, a.id).unwrap();
        assert!(db.get::<Image>(a.image).is_err());
    }

    #[test]
    fn clear_removes_records_and_blobs() {
        let db = db();
        let car = CarId::new_v4();
        let a = upload(&db, car, 1);
        let b = upload(&db, car, 2);

        clear(&db, car).unwrap();
        assert_eq!(image_count(&db, car).unwrap(), 0);
        assert!(db.get::<CarImage>(a.id).is_err());
        assert!(db.get::<Image>(b.image).is_err());
    }
}
