use crate::backend::Backend;
use crate::content::ContentRef;
use crate::db::models::Bookmark;
use crate::error::BookmarksError;
use crate::middleware::RequestContext;
use crate::registry::Registry;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::sync::LazyLock;

pub const MAX_KEY_LEN: usize = 16;

static KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.+-]+$").expect("invalid key pattern"));

/// True when the string is usable as a bookmark key.
pub fn key_is_valid(key: &str) -> bool {
    key.len() <= MAX_KEY_LEN && KEY_PATTERN.is_match(key)
}

#[derive(Debug)]
pub struct FormError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct FormErrors(pub Vec<FormError>);

impl FormErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FormError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}

/// Raw bookmark form data, as posted. Everything is optional at this
/// stage; `validate` is the only way to obtain something usable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookmarkForm {
    /// Dotted type tag identifying the target's entity type.
    pub model: Option<String>,
    pub object_id: Option<String>,
    pub key: Option<String>,
    /// Optional post-save redirect target.
    pub next: Option<String>,
}

impl BookmarkForm {
    pub fn new(model: impl Into<String>, object_id: i64, key: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            object_id: Some(object_id.to_string()),
            key: Some(key.into()),
            next: None,
        }
    }

    /// Validate the form against the registry's content catalog.
    ///
    /// Checks, in order: the requesting user is authenticated, the type tag
    /// resolves to a known content source, the object id resolves to an
    /// existing entity of that type, and the key matches the allowed
    /// pattern. On success the resolved target is carried in the returned
    /// `ValidatedForm`; save and existence checks are only available there.
    pub async fn validate(
        &self,
        ctx: &RequestContext,
        registry: &Registry,
    ) -> Result<ValidatedForm, FormErrors> {
        let mut errors = FormErrors::default();

        let user_id = match ctx.user_id {
            Some(id) => Some(id),
            None => {
                errors.push("user", "Current user is not authenticated.");
                None
            }
        };

        let target = match self.model.as_deref() {
            None => {
                errors.push("model", "This field is required.");
                None
            }
            Some(model) => match registry.get_source(model) {
                None => {
                    errors.push("model", "Invalid content type.");
                    None
                }
                Some(source) => match self.object_id.as_deref().map(|raw| raw.parse::<i64>()) {
                    None | Some(Err(_)) => {
                        errors.push("object_id", "Invalid instance.");
                        None
                    }
                    Some(Ok(object_id)) => match source.exists(object_id).await {
                        Ok(true) => Some(ContentRef::new(model, object_id)),
                        Ok(false) => {
                            errors.push("object_id", "Invalid instance.");
                            None
                        }
                        Err(e) => {
                            errors.push("object_id", e.to_string());
                            None
                        }
                    },
                },
            },
        };

        let key = match self.key.as_deref() {
            Some(key) if key_is_valid(key) => Some(key.to_string()),
            _ => {
                errors.push("key", "Invalid key.");
                None
            }
        };

        match (user_id, target, key) {
            (Some(user_id), Some(target), Some(key)) if errors.is_empty() => Ok(ValidatedForm {
                user_id,
                target,
                key,
            }),
            _ => Err(errors),
        }
    }
}

/// A bookmark form that passed validation: the target is resolved and the
/// user is known to be authenticated.
#[derive(Debug, Clone)]
pub struct ValidatedForm {
    pub user_id: i64,
    pub target: ContentRef,
    pub key: String,
}

impl ValidatedForm {
    /// Whether the requesting user already has this bookmark.
    pub async fn exists(&self, backend: &dyn Backend) -> Result<bool, BookmarksError> {
        backend.exists(self.user_id, &self.target, &self.key).await
    }

    /// Idempotent toggle: remove and return the existing bookmark (now
    /// detached, `created = false`), or create one (`created = true`).
    pub async fn save(&self, backend: &dyn Backend) -> Result<(Bookmark, bool), BookmarksError> {
        if self.exists(backend).await? {
            let removed = backend.remove(self.user_id, &self.target, &self.key).await?;
            Ok((removed, false))
        } else {
            let added = backend.add(self.user_id, &self.target, &self.key).await?;
            Ok((added, true))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_pattern() {
        assert!(key_is_valid("main"));
        assert!(key_is_valid("read-later"));
        assert!(key_is_valid("k.e+y_1"));
        assert!(!key_is_valid(""));
        assert!(!key_is_valid("has space"));
        assert!(!key_is_valid("way_too_long_bookmark_key"));
        assert!(!key_is_valid("semi;colon"));
    }
}
