//! Module tasked with generating mock data to populate the application.

use std::io::{BufWriter, Cursor};

use rand::seq::SliceRandom;
use rust_decimal_macros::dec;

use crate::car::{Availability, Drive, FuelType, SellerType, Transmission};
use crate::error::ErrorKind;
use crate::{auth, gallery, Car, Category, Config, Database, Result, User};

/// Generates and saves various mocking data in the database.
pub fn generate(config: &Config, db: &Database) -> Result<()> {
    let admin = admin_user(config, db)?;
    worker_user(config, db)?;
    cars(config, db, &admin)?;

    Ok(())
}

pub fn admin_user(config: &Config, db: &Database) -> Result<User> {
    let email = "test@mail.com".to_string();

    // does the test user already exist
    if let Some(existing) = db
        .get_collection::<User>()?
        .into_iter()
        .find(|u| u.email == email)
    {
        if config.dev.mock_regen != true {
            return Ok(existing);
        }
    }

    let user = User {
        email,
        first_name: "Test".to_string(),
        last_name: "Admin".to_string(),
        password_hash: Some(auth::hash_password("test")?),
        is_admin: true,
        is_approved: true,
        is_disabled: false,
        ..Default::default()
    };
    db.set(&user)?;

    Ok(user)
}

/// A worker account stuck in the pending-approval state, for exercising the
/// approval flow.
pub fn worker_user(config: &Config, db: &Database) -> Result<User> {
    let email = "worker@mail.com".to_string();

    if let Some(existing) = db
        .get_collection::<User>()?
        .into_iter()
        .find(|u| u.email == email)
    {
        if config.dev.mock_regen != true {
            return Ok(existing);
        }
    }

    let user = User {
        email,
        first_name: "Pending".to_string(),
        last_name: "Worker".to_string(),
        password_hash: Some(auth::hash_password("test")?),
        ..Default::default()
    };
    db.set(&user)?;

    Ok(user)
}

pub fn cars(config: &Config, db: &Database, owner: &User) -> Result<()> {
    if !db.get_collection::<Car>()?.is_empty() && config.dev.mock_regen != true {
        return Ok(());
    }

    let category = match db
        .get_collection::<Category>()?
        .into_iter()
        .find(|c| c.name == "SUV")
    {
        Some(c) => c,
        None => {
            let c = Category {
                name: "SUV".to_string(),
                description: "Sport utility vehicles".to_string(),
                ..Default::default()
            };
            db.set(&c)?;
            c
        }
    };

    let cruiser = Car {
        title: "Toyota Land Cruiser V8".to_string(),
        description: "Well maintained, full service history.".to_string(),
        price: dec!(4_500_000),
        category: category.id,
        seller_type: SellerType::VerifiedDealer,
        condition_score: Some(dec!(4.5)),
        year: 2015,
        location: "Nairobi, Kenya".to_string(),
        availability: Availability::Available,
        drive: Drive::FourWheel,
        mileage: 90_000,
        engine_size: 4608,
        fuel_type: FuelType::Petrol,
        horse_power: Some(304),
        transmission: Transmission::Automatic,
        torque: Some(439),
        created_by: Some(owner.id),
        ..Default::default()
    };
    db.set(&cruiser)?;
    let blobs = (0..3)
        .map(|i| Ok((image_bytes(&format!("cruiser-{}", i))?, "image/png".to_string())))
        .collect::<Result<Vec<_>>>()?;
    gallery::create_images(db, cruiser.id, blobs, None)?;

    let demio = Car {
        title: "Mazda Demio".to_string(),
        description: "Clean city runabout.".to_string(),
        price: dec!(650_000),
        category: category.id,
        seller_type: SellerType::Private,
        year: 2012,
        location: "Mombasa, Kenya".to_string(),
        drive: Drive::Fwd,
        mileage: 120_000,
        engine_size: 1300,
        fuel_type: FuelType::Petrol,
        transmission: Transmission::Automatic,
        created_by: Some(owner.id),
        ..Default::default()
    };
    db.set(&demio)?;
    gallery::create_image(
        db,
        demio.id,
        image_bytes("demio")?,
        "image/png",
        None,
        None,
    )?;

    Ok(())
}

/// Renders a small identicon png to stand in for real car photos.
fn image_bytes(seed: &str) -> Result<Vec<u8>> {
    let colors = [
        (68u8, 153u8, 58u8),
        (40u8, 118u8, 191u8),
        (191u8, 58u8, 40u8),
        (171u8, 169u8, 48u8),
    ];
    let identicon = identicon_rs::new(seed)
        .set_color(colors.choose(&mut rand::thread_rng()).unwrap().to_owned())
        .set_border(15)
        .generate_image()
        .map_err(|e| ErrorKind::Other(e.to_string()))?;

    let mut buffer = BufWriter::new(Cursor::new(Vec::new()));
    identicon
        .write_to(&mut buffer, image::ImageFormat::Png)
        .map_err(|e| ErrorKind::Other(e.to_string()))?;
    let bytes = buffer
        .into_inner()
        .map_err(|e| ErrorKind::Other(e.to_string()))?
        .get_ref()
        .to_vec();

    Ok(bytes)
}
