//! `<audio>` element adapter

use cassette_core::{MediaElement, PlayFuture, ReadyState};
use futures::FutureExt;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlAudioElement;

/// The page's single audio element
#[derive(Debug, Clone)]
pub struct HtmlAudioMedia {
    audio: HtmlAudioElement,
}

impl HtmlAudioMedia {
    pub fn new(audio: HtmlAudioElement) -> Self {
        Self { audio }
    }

    pub fn element(&self) -> &HtmlAudioElement {
        &self.audio
    }
}

impl MediaElement for HtmlAudioMedia {
    fn pause(&self) {
        if let Err(e) = self.audio.pause() {
            web_sys::console::warn_2(&JsValue::from_str("pause failed"), &e);
        }
    }

    fn set_source(&self, src: &str) {
        self.audio.set_src(src);
    }

    fn clear_source(&self) {
        // Dropping the attribute and reloading releases the decoded buffer
        if self.audio.remove_attribute("src").is_ok() {
            self.audio.load();
        }
    }

    fn source(&self) -> Option<String> {
        self.audio.get_attribute("src").filter(|src| !src.is_empty())
    }

    fn ready_state(&self) -> ReadyState {
        ReadyState::from_code(self.audio.ready_state())
    }

    fn is_paused(&self) -> bool {
        self.audio.paused()
    }

    fn has_ended(&self) -> bool {
        self.audio.ended()
    }

    fn current_time(&self) -> f64 {
        self.audio.current_time()
    }

    fn seek(&self, seconds: f64) {
        self.audio.set_current_time(seconds);
    }

    fn play(&self) -> PlayFuture {
        match self.audio.play() {
            Ok(promise) => async move {
                JsFuture::from(promise)
                    .await
                    .map(|_| ())
                    .map_err(describe_js_error)
            }
            .boxed_local(),
            Err(e) => futures::future::ready(Err(describe_js_error(e))).boxed_local(),
        }
    }
}

/// Human-readable text for a rejected promise or thrown value
pub fn describe_js_error(value: JsValue) -> String {
    if let Some(exception) = value.dyn_ref::<web_sys::DomException>() {
        return format!("{}: {}", exception.name(), exception.message());
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
