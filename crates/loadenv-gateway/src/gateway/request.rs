//! Option structures for gateway list and write operations.

use loadenv_core::{SecretMetadataEntry, SecretValue};

/// Filters for listing the secrets of a scope.
///
/// The defaults match what a plain "give me everything in this folder" call
/// expects: references expanded, values included, imports merged, no
/// recursion and no tag filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    /// Resolve `${OTHER_SECRET}` references in values.
    pub expand_secret_references: bool,
    /// Include secret values in the response.
    pub view_secret_value: bool,
    /// Also list secrets in nested folders.
    pub recursive: bool,
    /// Merge secrets imported from other scopes.
    pub include_imports: bool,
    /// Only return secrets carrying all of these tag slugs.
    pub tag_filters: Vec<String>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            expand_secret_references: true,
            view_secret_value: true,
            recursive: false,
            include_imports: true,
            tag_filters: Vec::new(),
        }
    }
}

impl ListOptions {
    /// Sets whether references are expanded.
    pub fn expand_secret_references(mut self, expand: bool) -> Self {
        self.expand_secret_references = expand;
        self
    }

    /// Sets whether values are included.
    pub fn view_secret_value(mut self, view: bool) -> Self {
        self.view_secret_value = view;
        self
    }

    /// Sets whether nested folders are listed.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Sets whether imported secrets are merged.
    pub fn include_imports(mut self, include: bool) -> Self {
        self.include_imports = include;
        self
    }

    /// Adds a tag slug filter.
    pub fn tag(mut self, slug: impl Into<String>) -> Self {
        self.tag_filters.push(slug.into());
        self
    }
}

/// A secret to be created.
///
/// # Example
///
/// ```
/// use loadenv_gateway::NewSecret;
///
/// let secret = NewSecret::new("API_KEY", "abc123")
///     .comment("third-party API")
///     .reminder(90, "rotate the key");
///
/// assert_eq!(secret.name(), "API_KEY");
/// assert_eq!(secret.reminder_repeat_days(), Some(90));
/// ```
#[derive(Debug, Clone)]
pub struct NewSecret {
    name: String,
    value: SecretValue,
    comment: Option<String>,
    skip_multiline_encoding: bool,
    reminder_repeat_days: Option<u32>,
    reminder_note: Option<String>,
}

impl NewSecret {
    /// Creates a new secret definition.
    pub fn new(name: impl Into<String>, value: impl Into<SecretValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            comment: None,
            skip_multiline_encoding: false,
            reminder_repeat_days: None,
            reminder_note: None,
        }
    }

    /// Sets the comment.
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Sets whether multiline values are stored without encoding.
    pub fn skip_multiline_encoding(mut self, skip: bool) -> Self {
        self.skip_multiline_encoding = skip;
        self
    }

    /// Sets a rotation reminder.
    pub fn reminder(mut self, repeat_days: u32, note: impl Into<String>) -> Self {
        self.reminder_repeat_days = Some(repeat_days);
        self.reminder_note = Some(note.into());
        self
    }

    /// Returns the secret name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the secret value.
    pub fn value(&self) -> &SecretValue {
        &self.value
    }

    /// Returns the comment, if any.
    pub fn comment_text(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Returns whether multiline encoding is skipped.
    pub fn skips_multiline_encoding(&self) -> bool {
        self.skip_multiline_encoding
    }

    /// Returns the reminder interval in days, if any.
    pub fn reminder_repeat_days(&self) -> Option<u32> {
        self.reminder_repeat_days
    }

    /// Returns the reminder note, if any.
    pub fn reminder_note(&self) -> Option<&str> {
        self.reminder_note.as_deref()
    }
}

/// Changes to apply to an existing secret.
///
/// Only the fields that are set are sent; an update with neither a value nor
/// a new name still refreshes metadata and tags.
///
/// # Example
///
/// ```
/// use loadenv_gateway::SecretUpdate;
///
/// let update = SecretUpdate::new("OLD_NAME").rename("NEW_NAME").value("v2");
/// assert_eq!(update.current_name(), "OLD_NAME");
/// assert_eq!(update.new_name(), Some("NEW_NAME"));
/// ```
#[derive(Debug, Clone)]
pub struct SecretUpdate {
    current_name: String,
    value: Option<SecretValue>,
    new_name: Option<String>,
    comment: Option<String>,
    skip_multiline_encoding: bool,
    reminder_repeat_days: Option<u32>,
    reminder_note: Option<String>,
    metadata: Vec<SecretMetadataEntry>,
    tag_ids: Vec<String>,
}

impl SecretUpdate {
    /// Starts an update of the secret currently named `current_name`.
    pub fn new(current_name: impl Into<String>) -> Self {
        Self {
            current_name: current_name.into(),
            value: None,
            new_name: None,
            comment: None,
            skip_multiline_encoding: false,
            reminder_repeat_days: None,
            reminder_note: None,
            metadata: Vec::new(),
            tag_ids: Vec::new(),
        }
    }

    /// Sets a new value.
    pub fn value(mut self, value: impl Into<SecretValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Renames the secret.
    pub fn rename(mut self, new_name: impl Into<String>) -> Self {
        self.new_name = Some(new_name.into());
        self
    }

    /// Sets the comment.
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Sets whether multiline values are stored without encoding.
    pub fn skip_multiline_encoding(mut self, skip: bool) -> Self {
        self.skip_multiline_encoding = skip;
        self
    }

    /// Sets a rotation reminder.
    pub fn reminder(mut self, repeat_days: u32, note: impl Into<String>) -> Self {
        self.reminder_repeat_days = Some(repeat_days);
        self.reminder_note = Some(note.into());
        self
    }

    /// Adds a metadata entry.
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push(SecretMetadataEntry::new(key, value));
        self
    }

    /// Attaches a tag by id.
    pub fn tag_id(mut self, id: impl Into<String>) -> Self {
        self.tag_ids.push(id.into());
        self
    }

    /// Returns the current secret name.
    pub fn current_name(&self) -> &str {
        &self.current_name
    }

    /// Returns the new value, if any.
    pub fn new_value(&self) -> Option<&SecretValue> {
        self.value.as_ref()
    }

    /// Returns the new name, if the secret is being renamed.
    pub fn new_name(&self) -> Option<&str> {
        self.new_name.as_deref()
    }

    /// Returns the comment, if any.
    pub fn comment_text(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Returns whether multiline encoding is skipped.
    pub fn skips_multiline_encoding(&self) -> bool {
        self.skip_multiline_encoding
    }

    /// Returns the reminder interval in days, if any.
    pub fn reminder_repeat_days(&self) -> Option<u32> {
        self.reminder_repeat_days
    }

    /// Returns the reminder note, if any.
    pub fn reminder_note(&self) -> Option<&str> {
        self.reminder_note.as_deref()
    }

    /// Returns the metadata entries.
    pub fn metadata_entries(&self) -> &[SecretMetadataEntry] {
        &self.metadata
    }

    /// Returns the tag ids.
    pub fn tag_ids(&self) -> &[String] {
        &self.tag_ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_options_defaults() {
        let options = ListOptions::default();
        assert!(options.expand_secret_references);
        assert!(options.view_secret_value);
        assert!(!options.recursive);
        assert!(options.include_imports);
        assert!(options.tag_filters.is_empty());
    }

    #[test]
    fn test_list_options_chaining() {
        let options = ListOptions::default()
            .recursive(true)
            .include_imports(false)
            .tag("infra")
            .tag("db");

        assert!(options.recursive);
        assert!(!options.include_imports);
        assert_eq!(options.tag_filters, vec!["infra", "db"]);
    }

    #[test]
    fn test_new_secret_defaults() {
        let secret = NewSecret::new("TOKEN", "t");
        assert_eq!(secret.value().expose(), "t");
        assert_eq!(secret.comment_text(), None);
        assert!(!secret.skips_multiline_encoding());
        assert_eq!(secret.reminder_note(), None);
    }

    #[test]
    fn test_secret_update_collects_metadata_and_tags() {
        let update = SecretUpdate::new("TOKEN")
            .metadata("owner", "platform")
            .tag_id("tag-1")
            .skip_multiline_encoding(true);

        assert!(update.new_value().is_none());
        assert!(update.new_name().is_none());
        assert_eq!(update.metadata_entries().len(), 1);
        assert_eq!(update.tag_ids(), &["tag-1"]);
        assert!(update.skips_multiline_encoding());
    }
}
