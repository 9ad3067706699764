//! Test utilities for the bookshelf crate.
//!
//! Provides in-memory implementations of the persistence and collaborator
//! ports so unit tests (in `src/`) and integration tests (in `tests/`) can
//! exercise full request flows without PostgreSQL or a filesystem. The
//! implementations honour the same contracts as the Diesel adapters,
//! including ownership scoping and listing order.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::catalog::{Attribute, AttributeKind, Book, BookFilter};
use crate::domain::ports::{
    AttributeRepository, AttributeRepositoryError, BookChanges, BookRepository,
    BookRepositoryError, ImageStore, ImageStoreError, NewBookRecord, NewUserRecord,
    PasswordHasher, PasswordHasherError, StoredCredentials, UserChanges, UserRepository,
    UserRepositoryError,
};
use crate::domain::user::{EmailAddress, User, UserId};

#[derive(Debug, Default)]
struct StoreState {
    users: Vec<(User, String)>,
    attributes: Vec<(AttributeKind, Attribute)>,
    books: Vec<Book>,
    next_user_id: i64,
    next_attribute_id: i64,
    next_book_id: i64,
}

/// Shared in-memory backing store implementing every repository port.
///
/// A single instance plays all three repositories so relational queries
/// (assigned-only listings, link replacement) see a consistent world.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().expect("in-memory store lock")
    }

    /// Seed a user directly, returning the assigned id.
    pub fn seed_user(&self, email: &str, name: &str, password_hash: &str) -> UserId {
        let mut state = self.lock();
        state.next_user_id += 1;
        let user = User {
            id: UserId::new(state.next_user_id),
            email: EmailAddress::new(email).expect("seed email"),
            name: name.to_owned(),
            is_active: true,
            is_staff: false,
        };
        let id = user.id;
        state.users.push((user, password_hash.to_owned()));
        id
    }

    /// Seed an attribute directly, returning it.
    pub fn seed_attribute(&self, owner: UserId, kind: AttributeKind, name: &str) -> Attribute {
        let mut state = self.lock();
        state.next_attribute_id += 1;
        let attribute = Attribute {
            id: state.next_attribute_id,
            name: name.to_owned(),
            owner,
        };
        state.attributes.push((kind, attribute.clone()));
        attribute
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, record: NewUserRecord) -> Result<User, UserRepositoryError> {
        let mut state = self.lock();
        if state
            .users
            .iter()
            .any(|(user, _)| user.email == record.email)
        {
            return Err(UserRepositoryError::email_taken(record.email.as_ref()));
        }
        state.next_user_id += 1;
        let user = User {
            id: UserId::new(state.next_user_id),
            email: record.email,
            name: record.name,
            is_active: true,
            is_staff: false,
        };
        state.users.push((user.clone(), record.password_hash));
        Ok(user)
    }

    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        let state = self.lock();
        Ok(state
            .users
            .iter()
            .find(|(user, _)| &user.email == email)
            .map(|(user, hash)| StoredCredentials {
                user: user.clone(),
                password_hash: hash.clone(),
            }))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        let state = self.lock();
        Ok(state
            .users
            .iter()
            .find(|(user, _)| user.id == id)
            .map(|(user, _)| user.clone()))
    }

    async fn update(
        &self,
        id: UserId,
        changes: UserChanges,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut state = self.lock();
        let Some((user, hash)) = state.users.iter_mut().find(|(user, _)| user.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(password_hash) = changes.password_hash {
            *hash = password_hash;
        }
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl AttributeRepository for InMemoryStore {
    async fn list(
        &self,
        owner: UserId,
        kind: AttributeKind,
        assigned_only: bool,
    ) -> Result<Vec<Attribute>, AttributeRepositoryError> {
        let state = self.lock();
        let assigned: BTreeSet<i64> = if assigned_only {
            state
                .books
                .iter()
                .filter(|book| book.owner == owner)
                .flat_map(|book| match kind {
                    AttributeKind::Tag => book.tag_ids.iter().copied(),
                    AttributeKind::Author => book.author_ids.iter().copied(),
                })
                .collect()
        } else {
            BTreeSet::new()
        };

        let mut attributes: Vec<Attribute> = state
            .attributes
            .iter()
            .filter(|(k, attribute)| *k == kind && attribute.owner == owner)
            .filter(|(_, attribute)| !assigned_only || assigned.contains(&attribute.id))
            .map(|(_, attribute)| attribute.clone())
            .collect();
        attributes.sort_by(|a, b| b.name.cmp(&a.name).then(a.id.cmp(&b.id)));
        Ok(attributes)
    }

    async fn insert(
        &self,
        owner: UserId,
        kind: AttributeKind,
        name: &str,
    ) -> Result<Attribute, AttributeRepositoryError> {
        let mut state = self.lock();
        state.next_attribute_id += 1;
        let attribute = Attribute {
            id: state.next_attribute_id,
            name: name.to_owned(),
            owner,
        };
        state.attributes.push((kind, attribute.clone()));
        Ok(attribute)
    }

    async fn find_owned(
        &self,
        owner: UserId,
        kind: AttributeKind,
        ids: &BTreeSet<i64>,
    ) -> Result<Vec<Attribute>, AttributeRepositoryError> {
        let state = self.lock();
        Ok(state
            .attributes
            .iter()
            .filter(|(k, attribute)| {
                *k == kind && attribute.owner == owner && ids.contains(&attribute.id)
            })
            .map(|(_, attribute)| attribute.clone())
            .collect())
    }
}

fn intersects(links: &BTreeSet<i64>, wanted: &BTreeSet<i64>) -> bool {
    links.intersection(wanted).next().is_some()
}

#[async_trait]
impl BookRepository for InMemoryStore {
    async fn list(
        &self,
        owner: UserId,
        filter: &BookFilter,
    ) -> Result<Vec<Book>, BookRepositoryError> {
        let state = self.lock();
        let mut books: Vec<Book> = state
            .books
            .iter()
            .filter(|book| book.owner == owner)
            .filter(|book| match &filter.tag_ids {
                Some(ids) => intersects(&book.tag_ids, ids),
                None => true,
            })
            .filter(|book| match &filter.author_ids {
                Some(ids) => intersects(&book.author_ids, ids),
                None => true,
            })
            .cloned()
            .collect();
        books.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(books)
    }

    async fn find(&self, owner: UserId, id: i64) -> Result<Option<Book>, BookRepositoryError> {
        let state = self.lock();
        Ok(state
            .books
            .iter()
            .find(|book| book.owner == owner && book.id == id)
            .cloned())
    }

    async fn insert(&self, record: NewBookRecord) -> Result<Book, BookRepositoryError> {
        let mut state = self.lock();
        state.next_book_id += 1;
        let book = Book {
            id: state.next_book_id,
            owner: record.owner,
            title: record.title,
            pages: record.pages,
            year: record.year,
            price: record.price,
            link: record.link,
            cover_image: None,
            tag_ids: record.tag_ids,
            author_ids: record.author_ids,
        };
        state.books.push(book.clone());
        Ok(book)
    }

    async fn update(
        &self,
        owner: UserId,
        id: i64,
        changes: BookChanges,
    ) -> Result<Option<Book>, BookRepositoryError> {
        let mut state = self.lock();
        let Some(book) = state
            .books
            .iter_mut()
            .find(|book| book.owner == owner && book.id == id)
        else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            book.title = title;
        }
        if let Some(pages) = changes.pages {
            book.pages = pages;
        }
        if let Some(year) = changes.year {
            book.year = year;
        }
        if let Some(price) = changes.price {
            book.price = price;
        }
        if let Some(link) = changes.link {
            book.link = Some(link);
        }
        if let Some(tag_ids) = changes.tag_ids {
            book.tag_ids = tag_ids;
        }
        if let Some(author_ids) = changes.author_ids {
            book.author_ids = author_ids;
        }
        Ok(Some(book.clone()))
    }

    async fn delete(&self, owner: UserId, id: i64) -> Result<bool, BookRepositoryError> {
        let mut state = self.lock();
        let before = state.books.len();
        state
            .books
            .retain(|book| !(book.owner == owner && book.id == id));
        Ok(state.books.len() != before)
    }

    async fn set_cover_image<'a>(
        &self,
        owner: UserId,
        id: i64,
        path: Option<&'a str>,
    ) -> Result<Option<Book>, BookRepositoryError> {
        let mut state = self.lock();
        let Some(book) = state
            .books
            .iter_mut()
            .find(|book| book.owner == owner && book.id == id)
        else {
            return Ok(None);
        };
        book.cover_image = path.map(str::to_owned);
        Ok(Some(book.clone()))
    }
}

/// Reversible stand-in for the Argon2 adapter.
///
/// Real hashing is deliberately slow; tests only need the round trip.
#[derive(Debug, Default)]
pub struct StubPasswordHasher;

impl PasswordHasher for StubPasswordHasher {
    fn hash(&self, raw: &str) -> Result<String, PasswordHasherError> {
        Ok(format!("hashed:{raw}"))
    }

    fn verify(&self, raw: &str, hash: &str) -> Result<bool, PasswordHasherError> {
        Ok(hash == format!("hashed:{raw}"))
    }
}

/// Image store keeping blobs in a map.
#[derive(Debug, Default)]
pub struct InMemoryImageStore {
    blobs: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs, for assertions.
    pub fn len(&self) -> usize {
        self.blobs.lock().expect("image store lock").len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch a stored blob by path, for assertions.
    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.blobs.lock().expect("image store lock").get(path).cloned()
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn store(&self, file_name: &str, bytes: &[u8]) -> Result<String, ImageStoreError> {
        let path = format!("covers/{file_name}");
        self.blobs
            .lock()
            .expect("image store lock")
            .insert(path.clone(), bytes.to_vec());
        Ok(path)
    }

    async fn remove(&self, path: &str) -> Result<(), ImageStoreError> {
        self.blobs.lock().expect("image store lock").remove(path);
        Ok(())
    }
}
