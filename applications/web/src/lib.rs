//! Cassette Player - Browser Host
//!
//! Binds the platform-agnostic player to the browser:
//! - `HtmlAudioMedia`: the page's `<audio>` element
//! - `BrowserStorage`: `sessionStorage` (playback offsets) and
//!   `localStorage` (last loaded track id)
//! - `IndexedDbTrackStore`: uploaded tracks, kept in IndexedDB
//! - `LocalStorageTrackStore`: fallback track table in `localStorage`, for
//!   browsers that withhold IndexedDB
//! - `BrowserFile`: the file picked in `<input type="file">`
//! - `WasmPlayer`: the API the page script calls
//!
//! # Usage
//!
//! ```js
//! import init, { WasmPlayer } from "./pkg/cassette_web.js";
//!
//! await init();
//! const player = new WasmPlayer(document.querySelector("audio"));
//! player.onChange(() => render(player.tracks(), player.currentIndex()));
//!
//! picker.onchange = (e) => player.chooseFile(e.target.files[0]);
//! uploadButton.onclick = () => player.upload();
//! ```

mod file;
mod indexed_db;
mod media;
mod player;
mod storage;

pub use file::BrowserFile;
pub use indexed_db::{IndexedDbTrackStore, DATABASE_NAME};
pub use media::{describe_js_error, HtmlAudioMedia};
pub use player::WasmPlayer;
pub use storage::{local_track_store, BrowserStorage, LocalStorageTrackStore};
