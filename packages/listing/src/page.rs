use common::storage::{ObjectName, StorageError};
use common::{Field, ProductDraft, ValidationErrors, validate_create_product};

use crate::error::UploadError;
use crate::form::FormController;
use crate::navigation::Route;
use crate::session::AuthSession;
use crate::submission::SubmissionAction;
use crate::upload::{UploadCoordinator, UploadState, Uploaded, UrlResolver};

/// What a press of the submit button led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Validation failed; errors are shown inline.
    Invalid(ValidationErrors),
    /// The user was navigated away.
    Navigated(Route),
    /// Nothing was navigated; the message is shown above the submit button.
    Failed(&'static str),
}

/// The "new product" page: a form, one image upload slot and the
/// submission action, wired together.
pub struct NewProductPage {
    form: FormController,
    upload: UploadCoordinator,
    action: SubmissionAction,
    session: AuthSession,
    failure: Option<&'static str>,
}

impl NewProductPage {
    pub fn new(action: SubmissionAction, session: AuthSession) -> Self {
        Self {
            form: FormController::new(ProductDraft::default(), validate_create_product),
            upload: UploadCoordinator::new(),
            action,
            session,
            failure: None,
        }
    }

    pub fn form(&self) -> &FormController {
        &self.form
    }

    pub fn upload_state(&self) -> UploadState {
        self.upload.state()
    }

    /// Message from the last failed submission, if any.
    pub fn failure(&self) -> Option<&'static str> {
        self.failure
    }

    pub fn change(&mut self, field: Field, value: impl Into<String>) {
        self.form.update(field, value);
    }

    pub fn blur(&mut self, field: Field) -> &ValidationErrors {
        self.form.blur(field)
    }

    /// A new upload replaces whatever image the draft had.
    pub fn upload_started(&mut self) {
        self.upload.start();
        self.form.set_image_url(String::new());
    }

    pub fn upload_progress(&mut self, percent: u8) {
        self.upload.progress_to(percent);
    }

    pub fn upload_failed(&mut self, message: impl Into<String>) {
        self.upload.fail(message);
        self.form.set_image_url(String::new());
    }

    /// The uploader stored the file; its URL is looked up separately.
    pub fn upload_succeeded(&mut self, filename: ObjectName) -> Result<Uploaded, UploadError> {
        self.upload.succeed(filename)
    }

    /// Record the URL lookup for a finished upload and copy the URL into the draft.
    pub fn url_resolved(
        &mut self,
        uploaded: Uploaded,
        result: Result<String, StorageError>,
    ) -> Result<(), UploadError> {
        let url = self
            .upload
            .finish_resolution(uploaded, result)?
            .url()
            .to_owned();
        self.form.set_image_url(url);
        Ok(())
    }

    /// Convenience for [`upload_succeeded`](Self::upload_succeeded) followed
    /// by the lookup against `resolver`.
    pub async fn complete_upload<R: UrlResolver + ?Sized>(
        &mut self,
        filename: ObjectName,
        resolver: &R,
    ) -> Result<(), UploadError> {
        let uploaded = self.upload_succeeded(filename)?;
        let result = resolver.resolve_url(uploaded.filename()).await;
        self.url_resolved(uploaded, result)
    }

    pub async fn submit(&mut self) -> PageOutcome {
        let draft = match self.form.submit(ProductDraft::clone) {
            Ok(draft) => draft,
            Err(errors) => return PageOutcome::Invalid(errors),
        };

        let image = match self.upload.image_ref() {
            Ok(image) => image,
            Err(e) => return self.fail(e.user_message()),
        };

        match self.action.submit(&self.session, &draft, image).await {
            Ok(outcome) => {
                self.failure = None;
                PageOutcome::Navigated(outcome.route())
            }
            Err(e) => self.fail(e.user_message()),
        }
    }

    fn fail(&mut self, message: &'static str) -> PageOutcome {
        self.failure = Some(message);
        PageOutcome::Failed(message)
    }
}
