//! Subresource state shared between documents: image requests and web fonts.
//!
//! Requests are reference counted so that a cloned element keeps pointing at the same
//! request as its original, the way a browser's list of available images is keyed by
//! URL. The loader that actually fetches bytes is external; it only flips the state
//! through [`ImageRequest::complete`] / [`ImageRequest::fail`] or the font equivalents.

use std::rc::Rc;
use tokio::sync::watch;

/// `document.readyState`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReadyState {
    #[default]
    Loading,
    Interactive,
    Complete,
}

/// Decode state of an image request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageState {
    Pending,
    Complete,
    /// Terminal error state. Counts as settled.
    Broken,
}

/// A single image fetch/decode, shared by every element pointing at the same URL.
#[derive(Debug)]
pub struct ImageRequest {
    src: String,
    state: watch::Sender<ImageState>,
}

impl ImageRequest {
    #[must_use]
    pub fn new(src: impl Into<String>) -> Self {
        let (state, _) = watch::channel(ImageState::Pending);
        Self {
            src: src.into(),
            state,
        }
    }

    #[inline]
    #[must_use]
    pub fn src(&self) -> &str {
        &self.src
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> ImageState {
        *self.state.borrow()
    }

    #[inline]
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.state() != ImageState::Pending
    }

    /// Mark the image as decoded.
    pub fn complete(&self) {
        self.state.send_replace(ImageState::Complete);
    }

    /// Mark the image as failed.
    pub fn fail(&self) {
        self.state.send_replace(ImageState::Broken);
    }

    /// Resolve once the request leaves [`ImageState::Pending`]. Errors resolve too.
    pub async fn settled(&self) -> ImageState {
        let mut receiver = self.state.subscribe();
        match receiver
            .wait_for(|state| *state != ImageState::Pending)
            .await
        {
            Ok(state) => *state,
            // The sender lives in `self`, so the channel cannot close while we wait.
            Err(_) => self.state(),
        }
    }
}

/// Load status of a web font face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontStatus {
    Loading,
    Loaded,
    Error,
}

/// An `@font-face` declared by a document.
#[derive(Debug)]
pub struct FontFace {
    family: String,
    status: watch::Sender<FontStatus>,
}

impl FontFace {
    #[must_use]
    pub fn new(family: impl Into<String>) -> Self {
        let (status, _) = watch::channel(FontStatus::Loading);
        Self {
            family: family.into(),
            status,
        }
    }

    #[inline]
    #[must_use]
    pub fn family(&self) -> &str {
        &self.family
    }

    #[inline]
    #[must_use]
    pub fn status(&self) -> FontStatus {
        *self.status.borrow()
    }

    pub fn set_loaded(&self) {
        self.status.send_replace(FontStatus::Loaded);
    }

    pub fn set_error(&self) {
        self.status.send_replace(FontStatus::Error);
    }

    /// Resolve once the face is no longer loading.
    pub async fn settled(&self) -> FontStatus {
        let mut receiver = self.status.subscribe();
        match receiver
            .wait_for(|status| *status != FontStatus::Loading)
            .await
        {
            Ok(status) => *status,
            Err(_) => self.status(),
        }
    }
}

/// `document.fonts`: the faces a document references.
///
/// Cloning the set shares the faces, so a sandbox document sees the same load state as
/// the document it was cloned from.
#[derive(Clone, Debug, Default)]
pub struct FontFaceSet {
    faces: Vec<Rc<FontFace>>,
}

impl FontFaceSet {
    pub fn add(&mut self, face: Rc<FontFace>) {
        self.faces.push(face);
    }

    #[inline]
    #[must_use]
    pub fn faces(&self) -> &[Rc<FontFace>] {
        &self.faces
    }

    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.faces
            .iter()
            .all(|face| face.status() != FontStatus::Loading)
    }

    /// `document.fonts.ready`: resolves once every face has loaded or failed.
    pub async fn ready(&self) {
        for face in &self.faces {
            face.settled().await;
        }
    }
}
