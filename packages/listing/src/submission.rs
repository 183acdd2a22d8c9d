use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use common::{Creator, Identity, PersistedProduct, ProductDraft};
use tracing::{error, info, instrument, warn};

use crate::error::SubmissionError;
use crate::navigation::{Navigator, Route};
use crate::session::AuthSession;
use crate::store::{ProductStore, StoredProduct};
use crate::upload::ResolvedImage;

/// The image attached to a submission.
///
/// Only a [`ResolvedImage`] can be attached; an upload whose URL is still
/// being looked up has no representation here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    None,
    Resolved(ResolvedImage),
}

impl ImageRef {
    pub fn url(&self) -> &str {
        match self {
            ImageRef::None => "",
            ImageRef::Resolved(image) => image.url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// No identity: sent to the login route, nothing persisted.
    LoginRequired,
    /// Persisted and sent to the home route.
    Created(StoredProduct),
}

impl SubmissionOutcome {
    pub fn route(&self) -> Route {
        match self {
            SubmissionOutcome::LoginRequired => Route::Login,
            SubmissionOutcome::Created(_) => Route::Home,
        }
    }
}

/// Build the record appended to the product collection.
pub fn compose_product(
    draft: &ProductDraft,
    image: &ImageRef,
    identity: &Identity,
) -> PersistedProduct {
    PersistedProduct {
        name: draft.name.trim().to_owned(),
        company: draft.company.trim().to_owned(),
        url: draft.url.trim().to_owned(),
        image_url: image.url().to_owned(),
        description: draft.description.trim().to_owned(),
        vote_count: 0,
        comments: Vec::new(),
        created_at: Utc::now(),
        creator: Creator::from(identity),
    }
}

/// Clears the submitting flag when the in-flight submission settles.
struct SubmittingGuard<'a>(&'a AtomicBool);

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Persists a validated draft on behalf of the signed-in user.
pub struct SubmissionAction {
    store: Arc<dyn ProductStore>,
    navigator: Arc<dyn Navigator>,
    submitting: AtomicBool,
}

impl SubmissionAction {
    pub fn new(store: Arc<dyn ProductStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            store,
            navigator,
            submitting: AtomicBool::new(false),
        }
    }

    /// Whether a submission is in flight; the submit button is disabled meanwhile.
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Persist `draft` for the session's user and navigate home.
    ///
    /// Without an identity this navigates to the login route and persists
    /// nothing. On a persistence failure nothing is navigated and the error
    /// carries a message for the user. A second call while one is in flight
    /// is rejected; sequential calls are not deduplicated.
    #[instrument(skip_all, fields(product = %draft.name))]
    pub async fn submit(
        &self,
        session: &AuthSession,
        draft: &ProductDraft,
        image: ImageRef,
    ) -> Result<SubmissionOutcome, SubmissionError> {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Submission rejected: another one is in flight");
            return Err(SubmissionError::AlreadySubmitting);
        }
        let _guard = SubmittingGuard(&self.submitting);

        let Some(identity) = session.identity() else {
            info!("No signed-in user, redirecting to login");
            self.navigator.push(Route::Login);
            return Ok(SubmissionOutcome::LoginRequired);
        };

        let product = compose_product(draft, &image, identity);
        let stored = self.store.append(product).await.map_err(|e| {
            error!(error = %e, "Failed to save product");
            SubmissionError::from(e)
        })?;

        info!(product_id = stored.id, creator = %identity.uid, "Product created");
        self.navigator.push(Route::Home);
        Ok(SubmissionOutcome::Created(stored))
    }
}
