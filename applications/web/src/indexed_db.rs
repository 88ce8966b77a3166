//! IndexedDB track store
//!
//! One database with an auto-increment `songs` object store keyed by `id`.
//! Records are plain `{id, name, song}` objects. The quota is a share of the
//! disk rather than the few megabytes Web Storage allows, so the table holds
//! many encoded files.
//!
//! IndexedDB requests report through callbacks; [`request_future`] and
//! [`commit_future`] register those callbacks immediately and hand back a
//! future, so they must be created before the transaction can finish.

use crate::media::describe_js_error;
use async_trait::async_trait;
use cassette_core::{CassetteError, NewTrack, Result, Track, TrackId, TrackStore};
use js_sys::{Object, Promise, Reflect};
use std::cell::RefCell;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    IdbDatabase, IdbFactory, IdbObjectStoreParameters, IdbOpenDbRequest, IdbRequest,
    IdbTransaction, IdbTransactionMode,
};

/// Database the page keeps its tracks in
pub const DATABASE_NAME: &str = "audioDatabase";

const SONGS: &str = "songs";
const SCHEMA_VERSION: u32 = 1;

type JsResult<T> = std::result::Result<T, JsValue>;

/// Track table persisted in IndexedDB
///
/// The connection is opened on first use and dropped by [`TrackStore::reset`],
/// which deletes the whole database so ids restart from 1.
pub struct IndexedDbTrackStore {
    factory: IdbFactory,
    name: String,
    db: RefCell<Option<IdbDatabase>>,
}

impl IndexedDbTrackStore {
    /// Store in the window's IndexedDB
    ///
    /// `None` where IndexedDB is unavailable (no window, or disabled by the
    /// browser's privacy settings).
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let factory = web_sys::window()?.indexed_db().ok().flatten()?;
        Some(Self {
            factory,
            name: name.into(),
            db: RefCell::new(None),
        })
    }

    async fn database(&self) -> JsResult<IdbDatabase> {
        let cached = self.db.borrow().clone();
        if let Some(db) = cached {
            return Ok(db);
        }

        let db = self.open().await?;
        *self.db.borrow_mut() = Some(db.clone());
        Ok(db)
    }

    async fn open(&self) -> JsResult<IdbDatabase> {
        let request = self.factory.open_with_u32(&self.name, SCHEMA_VERSION)?;

        let upgrading = request.clone();
        let on_upgrade = Closure::wrap(Box::new(move || {
            if let Err(e) = create_schema(&upgrading) {
                web_sys::console::error_2(&JsValue::from_str("IndexedDB upgrade failed"), &e);
            }
        }) as Box<dyn FnMut()>);
        request.set_onupgradeneeded(Some(on_upgrade.as_ref().unchecked_ref()));

        let opened = request_future(&request).await;
        request.set_onupgradeneeded(None);
        opened?.dyn_into::<IdbDatabase>()
    }

    async fn add(&self, record: &JsValue) -> JsResult<TrackId> {
        let db = self.database().await?;
        let tx = db.transaction_with_str_and_mode(SONGS, IdbTransactionMode::Readwrite)?;
        let added = request_future(&tx.object_store(SONGS)?.add(record)?);
        let committed = commit_future(&tx);

        let key = added.await?;
        committed.await?;

        key.as_f64()
            .map(|id| id as TrackId)
            .ok_or_else(|| JsValue::from_str("songs key is not a number"))
    }

    async fn get_all(&self) -> JsResult<JsValue> {
        let db = self.database().await?;
        let tx = db.transaction_with_str(SONGS)?;
        let request = tx.object_store(SONGS)?.get_all()?;
        request_future(&request).await
    }

    async fn delete(&self) -> JsResult<()> {
        if let Some(db) = self.db.borrow_mut().take() {
            db.close();
        }
        let request = self.factory.delete_database(&self.name)?;
        request_future(&request).await.map(|_| ())
    }
}

#[async_trait(?Send)]
impl TrackStore for IndexedDbTrackStore {
    async fn insert(&self, track: &NewTrack) -> Result<TrackId> {
        let record = serde_wasm_bindgen::to_value(track)
            .map_err(|e| CassetteError::storage_write(e.to_string()))?;

        self.add(&record)
            .await
            .map_err(|e| CassetteError::storage_write(describe_js_error(e)))
    }

    async fn list_all(&self) -> Result<Vec<Track>> {
        let records = self
            .get_all()
            .await
            .map_err(|e| CassetteError::storage_read(describe_js_error(e)))?;

        serde_wasm_bindgen::from_value(records)
            .map_err(|e| CassetteError::storage_read(format!("corrupt songs record: {e}")))
    }

    async fn reset(&self) -> Result<()> {
        self.delete()
            .await
            .map_err(|e| CassetteError::storage_write(describe_js_error(e)))
    }
}

/// `songs` with an auto-increment `id` key path
fn create_schema(request: &IdbOpenDbRequest) -> JsResult<()> {
    let db: IdbDatabase = request.result()?.dyn_into()?;
    if db.object_store_names().contains(SONGS) {
        return Ok(());
    }

    let params = Object::new();
    Reflect::set(&params, &JsValue::from_str("keyPath"), &JsValue::from_str("id"))?;
    Reflect::set(&params, &JsValue::from_str("autoIncrement"), &JsValue::TRUE)?;
    db.create_object_store_with_optional_parameters(
        SONGS,
        params.unchecked_ref::<IdbObjectStoreParameters>(),
    )?;
    Ok(())
}

/// Resolves with the request's result, rejects with its `DOMException`
fn request_future(request: &IdbRequest) -> JsFuture {
    let promise = Promise::new(&mut |resolve, reject| {
        let succeeded = request.clone();
        let on_success = Closure::once_into_js(move || {
            let result = succeeded.result().unwrap_or(JsValue::UNDEFINED);
            let _ = resolve.call1(&JsValue::UNDEFINED, &result);
        });

        let failed = request.clone();
        let on_error = Closure::once_into_js(move || {
            let error = failed
                .error()
                .ok()
                .flatten()
                .map_or(JsValue::UNDEFINED, JsValue::from);
            let _ = reject.call1(&JsValue::UNDEFINED, &error);
        });

        request.set_onsuccess(Some(on_success.unchecked_ref()));
        request.set_onerror(Some(on_error.unchecked_ref()));
    });
    JsFuture::from(promise)
}

/// Resolves once the transaction committed, rejects if it aborted
fn commit_future(tx: &IdbTransaction) -> JsFuture {
    let promise = Promise::new(&mut |resolve, reject| {
        let on_complete = Closure::once_into_js(move || {
            let _ = resolve.call0(&JsValue::UNDEFINED);
        });

        let aborted = tx.clone();
        let on_abort = Closure::once_into_js(move || {
            let error = aborted
                .error()
                .map_or_else(|| JsValue::from_str("transaction aborted"), JsValue::from);
            let _ = reject.call1(&JsValue::UNDEFINED, &error);
        });

        tx.set_oncomplete(Some(on_complete.unchecked_ref()));
        tx.set_onabort(Some(on_abort.unchecked_ref()));
    });
    JsFuture::from(promise)
}
