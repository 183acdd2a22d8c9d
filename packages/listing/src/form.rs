use common::{Field, ProductDraft, ValidationErrors};

/// Validation policy applied to the whole draft.
pub type Policy = fn(&ProductDraft) -> ValidationErrors;

/// Holds the current draft and its current validation errors.
///
/// Errors are only recomputed on [`blur`](Self::blur) and
/// [`submit`](Self::submit), and always wholesale, so a field that became
/// valid loses its error on the next recomputation.
#[derive(Debug, Clone)]
pub struct FormController {
    values: ProductDraft,
    errors: ValidationErrors,
    policy: Policy,
}

impl FormController {
    pub fn new(initial: ProductDraft, policy: Policy) -> Self {
        Self {
            values: initial,
            errors: ValidationErrors::new(),
            policy,
        }
    }

    pub fn values(&self) -> &ProductDraft {
        &self.values
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Store a new value for `field`. Does not validate.
    pub fn update(&mut self, field: Field, value: impl Into<String>) {
        self.values.set(field, value);
    }

    /// Set the derived image URL. Not a user-editable field.
    pub fn set_image_url(&mut self, url: impl Into<String>) {
        self.values.image_url = url.into();
    }

    /// Re-validate the whole draft when `field` loses focus.
    pub fn blur(&mut self, field: Field) -> &ValidationErrors {
        tracing::trace!(%field, "Field blurred");
        self.revalidate()
    }

    /// Re-validate and, if the draft is valid, run `complete` exactly once.
    ///
    /// Returns the callback's output, or the errors that blocked it. The
    /// controller owns the submit path, so nothing else reacts to a submit.
    pub fn submit<R>(
        &mut self,
        complete: impl FnOnce(&ProductDraft) -> R,
    ) -> Result<R, ValidationErrors> {
        if !self.revalidate().is_empty() {
            tracing::debug!(invalid = self.errors.len(), "Submit blocked by validation");
            return Err(self.errors.clone());
        }
        Ok(complete(&self.values))
    }

    fn revalidate(&mut self) -> &ValidationErrors {
        self.errors = (self.policy)(&self.values);
        &self.errors
    }
}
