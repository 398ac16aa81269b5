use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::{error::ErrorKind, Result};

use super::{decode, encode, Collectable, Identifiable};

pub static DEFAULT_DB_PATH: &str = "./db";

#[derive(Clone, Debug)]
pub struct SledDb {
    inner: sled::Db,
}

impl SledDb {
    pub fn new() -> Result<Self> {
        Self::open(DEFAULT_DB_PATH)
    }

    /// Opens (creating if missing) a database at the provided path.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let inner = sled::Config::default().path(path).open()?;
        Ok(Self { inner })
    }

    /// Opens a throwaway in-memory database. Used by tests and by dev mode
    /// runs that shouldn't leave state behind.
    pub fn temporary() -> Result<Self> {
        let inner = sled::Config::default().temporary(true).open()?;
        Ok(Self { inner })
    }

    /// Returns a raw handle to the tree backing a collection. Needed by
    /// multi-record operations that must run as a single sled transaction.
    pub fn tree(&self, name: impl AsRef<[u8]>) -> Result<sled::Tree> {
        Ok(self.inner.open_tree(name)?)
    }

    pub fn get_collection<T: DeserializeOwned + Collectable>(&self) -> Result<Vec<T>> {
        self.get_collection_at(T::get_collection_name())
    }

    /// Gets a collection of entries of the same type from the collection
    /// specified by name.
    pub fn get_collection_at<T: DeserializeOwned>(
        &self,
        name: impl AsRef<[u8]>,
    ) -> Result<Vec<T>> {
        let tree = self.inner.open_tree(name)?;
        let mut out = Vec::new();
        for entry in tree.iter() {
            let (_, value_bytes) = entry?;
            let value: T = decode(&value_bytes)?;
            out.push(value);
        }
        Ok(out)
    }

    /// Returns the length of the collection as defined for the specified type.
    pub fn len<T: Collectable>(&self) -> Result<usize> {
        Ok(self.inner.open_tree(T::get_collection_name())?.len())
    }

    /// Gets an item from the collection defined for the item type.
    pub fn get<T: DeserializeOwned + Collectable>(&self, id: Uuid) -> Result<T> {
        self.get_at(T::get_collection_name(), id)
    }

    /// Gets an item by id from the collection specified by name.
    pub fn get_at<T: DeserializeOwned>(&self, collection: &str, id: Uuid) -> Result<T> {
        let tree = self.inner.open_tree(collection)?;
        match tree.get(id.as_bytes())? {
            Some(value_bytes) => decode(&value_bytes),
            None => Err(ErrorKind::DbError(format!(
                "entity with id '{}' not found in collection {}",
                id, collection
            ))
            .into()),
        }
    }

    pub fn set<T: Serialize + Identifiable + Collectable>(&self, value: &T) -> Result<()> {
        self.set_at(T::get_collection_name(), value)?;
        Ok(())
    }

    pub fn set_at<T: Serialize + Identifiable>(
        &self,
        collection: impl AsRef<[u8]>,
        value: &T,
    ) -> Result<()> {
        self.set_raw_at(collection, value, value.get_id())?;
        Ok(())
    }

    pub fn set_raw_at<T: Serialize>(
        &self,
        collection: impl AsRef<[u8]>,
        value: &T,
        id: Uuid,
    ) -> Result<()> {
        let tree = self.inner.open_tree(collection)?;
        let encoded = encode(value)?;
        tree.insert(id, encoded)?;
        Ok(())
    }

    pub fn remove<T: Identifiable + Collectable>(&self, value: &T) -> Result<()> {
        self.remove_at(T::get_collection_name(), value.get_id())
    }

    /// Removes an item by id from the collection defined for the item type.
    pub fn remove_by_id<T: Collectable>(&self, id: Uuid) -> Result<()> {
        self.remove_at(T::get_collection_name(), id)
    }

    pub fn remove_at(&self, collection: impl AsRef<[u8]>, id: Uuid) -> Result<()> {
        let tree = self.inner.open_tree(collection)?;
        tree.remove(id)?;
        Ok(())
    }

    pub fn clear_at(&self, collection: &str) -> Result<()> {
        let tree = self.inner.open_tree(collection)?;
        tree.clear()?;
        Ok(())
    }

    pub fn clear<T: Collectable>(&self) -> Result<()> {
        let tree = self.inner.open_tree(T::get_collection_name())?;
        tree.clear()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::User;

    #[test]
    fn record_roundtrip() {
        let db = SledDb::temporary().unwrap();

        let user = User {
            email: "a@b.c".to_string(),
            ..Default::default()
        };
        db.set(&user).unwrap();

        let loaded = db.get::<User>(user.id).unwrap();
        assert_eq!(loaded.email, "a@b.c");
        assert_eq!(db.len::<User>().unwrap(), 1);

        db.remove(&user).unwrap();
        assert!(db.get::<User>(user.id).is_err());
        assert!(db.get_collection::<User>().unwrap().is_empty());
    }
}
