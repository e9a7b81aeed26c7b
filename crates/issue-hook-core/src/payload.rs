//! Typed view over a webhook body.
//!
//! Issue, pull request and issue comment deliveries carry overlapping but
//! differently shaped JSON. [`Context`] flattens whichever shape is present
//! into one set of named fields, and [`Payload`] pairs that context with the
//! raw body and the event name.
//!
//! Missing or mistyped fields are reported as absent (`None`), never as
//! errors or placeholder values.
//!
//! # Examples
//!
//! ```rust
//! use issue_hook_core::Payload;
//! use serde_json::json;
//!
//! let raw = json!({
//!     "action": "opened",
//!     "sender": { "login": "contributor" },
//!     "repository": { "full_name": "org/newrepo" },
//!     "pull_request": { "number": 11, "title": "New code", "user": { "login": "contributor" } }
//! });
//!
//! let payload = Payload::new(raw, "pull_request");
//!
//! assert!(payload.is_opened());
//! assert_eq!(payload.event_action(), Some("pull_request.opened"));
//! assert_eq!(payload.issue_title(), Some("New code"));
//! assert!(payload.issue_labels().is_none());
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// ============================================================================
// Path Lookup
// ============================================================================

/// Follow a dotted path through a JSON tree.
///
/// Object members are addressed by key and array elements by index. Returns
/// `None` as soon as a segment is missing; a member that is present with a
/// `null` value yields `Some(&Value::Null)`.
///
/// ```rust
/// use issue_hook_core::payload::lookup;
/// use serde_json::json;
///
/// let raw = json!({ "issue": { "user": { "login": "author" }, "labels": ["a", "b"], "body": null } });
///
/// assert_eq!(lookup(&raw, "issue.user.login"), Some(&json!("author")));
/// assert_eq!(lookup(&raw, "issue.labels.1"), Some(&json!("b")));
/// assert_eq!(lookup(&raw, "issue.body"), Some(&json!(null)));
/// assert_eq!(lookup(&raw, "issue.title"), None);
/// ```
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn lookup_str<'a>(value: &'a Value, path: &str) -> Option<&'a str> {
    lookup(value, path).and_then(Value::as_str)
}

fn lookup_string(value: &Value, path: &str) -> Option<String> {
    lookup_str(value, path).map(str::to_string)
}

fn object_at<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| v.is_object())
}

// ============================================================================
// Item Identifier
// ============================================================================

/// Identifier of an issue, pull request or comment.
///
/// Kept as the JSON scalar it was delivered as: some senders transmit
/// numbers as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(u64),
    Text(String),
}

impl ItemId {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64().map(Self::Number),
            Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    /// Numeric value, parsing textual ids when possible.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.parse().ok(),
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl PartialEq<u64> for ItemId {
    fn eq(&self, other: &u64) -> bool {
        matches!(self, Self::Number(n) if n == other)
    }
}

impl PartialEq<&str> for ItemId {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, Self::Text(s) if s == other)
    }
}

// ============================================================================
// Context
// ============================================================================

/// Flat set of fields extracted from a webhook body.
///
/// Issue fields are read from the `issue` object when present and from the
/// `pull_request` object otherwise. Labels are only ever read from `issue`.
/// Comment fields are only set when the body carries a `comment` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Context {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_id: Option<ItemId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<ItemId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_url: Option<String>,
}

impl Context {
    /// Derive the context of `raw` delivered as `event`.
    pub fn extract(raw: &Value, event: &str) -> Self {
        let action = lookup_string(raw, "action");
        let event_action = action.as_ref().map(|action| format!("{}.{}", event, action));

        let issue = object_at(raw, "issue");
        let item = issue.or_else(|| object_at(raw, "pull_request"));
        let comment = object_at(raw, "comment");

        Self {
            action,
            event: event.to_string(),
            event_action,
            repo: lookup_string(raw, "repository.full_name"),
            sender: lookup_string(raw, "sender.login"),
            issue_id: item
                .and_then(|i| i.get("number"))
                .and_then(ItemId::from_value),
            issue_title: item.and_then(|i| lookup_string(i, "title")),
            issue_body: item.and_then(|i| lookup_string(i, "body")),
            issue_author: item.and_then(|i| lookup_string(i, "user.login")),
            issue_labels: issue.and_then(|i| i.get("labels")).and_then(label_names),
            comment_id: comment
                .and_then(|c| c.get("id"))
                .and_then(ItemId::from_value),
            comment_body: comment.and_then(|c| lookup_string(c, "body")),
            comment_created_at: comment.and_then(|c| lookup_string(c, "created_at")),
            comment_url: comment.and_then(|c| lookup_string(c, "html_url")),
        }
    }

    fn action_in(&self, actions: &[&str]) -> bool {
        self.action
            .as_deref()
            .is_some_and(|action| actions.contains(&action))
    }

    /// `opened` or `reopened`.
    pub fn is_opened(&self) -> bool {
        self.action_in(&["opened", "reopened"])
    }

    pub fn is_closed(&self) -> bool {
        self.action_in(&["closed"])
    }

    /// `created`, the action sent for new comments.
    pub fn is_commented(&self) -> bool {
        self.action_in(&["created"])
    }

    pub fn is_edited(&self) -> bool {
        self.action_in(&["edited"])
    }

    pub fn is_locked(&self) -> bool {
        self.action_in(&["locked"])
    }

    pub fn is_unlocked(&self) -> bool {
        self.action_in(&["unlocked"])
    }

    /// `pinned` or `unpinned`.
    pub fn is_pinned(&self) -> bool {
        self.action_in(&["pinned", "unpinned"])
    }

    /// `assigned` or `unassigned`.
    pub fn is_assigned(&self) -> bool {
        self.action_in(&["assigned", "unassigned"])
    }

    /// `labeled` or `unlabeled`.
    pub fn is_labeled(&self) -> bool {
        self.action_in(&["labeled", "unlabeled"])
    }
}

/// Label names from either plain strings or label objects.
fn label_names(labels: &Value) -> Option<Vec<String>> {
    let labels = labels.as_array()?;
    Some(
        labels
            .iter()
            .filter_map(|label| match label {
                Value::String(name) => Some(name.clone()),
                Value::Object(_) => lookup_string(label, "name"),
                _ => None,
            })
            .collect(),
    )
}

// ============================================================================
// Payload
// ============================================================================

/// Parsed webhook body together with its event name.
///
/// Every [`Context`] field is available as an accessor on the payload
/// itself. The raw JSON tree stays available for anything the context does
/// not cover.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    raw: Value,
    context: Context,
}

impl Payload {
    pub fn new(raw: Value, event: impl Into<String>) -> Self {
        let event = event.into();
        let context = Context::extract(&raw, &event);
        Self { raw, context }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The body exactly as parsed.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Alias of [`raw`](Self::raw).
    pub fn raw_payload(&self) -> &Value {
        &self.raw
    }

    pub fn into_raw(self) -> Value {
        self.raw
    }

    /// Look up a dotted path in the raw body. See [`lookup`].
    pub fn get(&self, path: &str) -> Option<&Value> {
        lookup(&self.raw, path)
    }

    pub fn action(&self) -> Option<&str> {
        self.context.action.as_deref()
    }

    pub fn event(&self) -> &str {
        &self.context.event
    }

    pub fn event_action(&self) -> Option<&str> {
        self.context.event_action.as_deref()
    }

    /// Full name (`owner/name`) of the repository.
    pub fn repo(&self) -> Option<&str> {
        self.context.repo.as_deref()
    }

    /// Login of the user who triggered the event.
    pub fn sender(&self) -> Option<&str> {
        self.context.sender.as_deref()
    }

    pub fn issue_id(&self) -> Option<&ItemId> {
        self.context.issue_id.as_ref()
    }

    pub fn issue_title(&self) -> Option<&str> {
        self.context.issue_title.as_deref()
    }

    pub fn issue_body(&self) -> Option<&str> {
        self.context.issue_body.as_deref()
    }

    pub fn issue_author(&self) -> Option<&str> {
        self.context.issue_author.as_deref()
    }

    pub fn issue_labels(&self) -> Option<&[String]> {
        self.context.issue_labels.as_deref()
    }

    pub fn comment_id(&self) -> Option<&ItemId> {
        self.context.comment_id.as_ref()
    }

    pub fn comment_body(&self) -> Option<&str> {
        self.context.comment_body.as_deref()
    }

    pub fn comment_created_at(&self) -> Option<&str> {
        self.context.comment_created_at.as_deref()
    }

    pub fn comment_url(&self) -> Option<&str> {
        self.context.comment_url.as_deref()
    }

    pub fn is_opened(&self) -> bool {
        self.context.is_opened()
    }

    pub fn is_closed(&self) -> bool {
        self.context.is_closed()
    }

    pub fn is_commented(&self) -> bool {
        self.context.is_commented()
    }

    pub fn is_edited(&self) -> bool {
        self.context.is_edited()
    }

    pub fn is_locked(&self) -> bool {
        self.context.is_locked()
    }

    pub fn is_unlocked(&self) -> bool {
        self.context.is_unlocked()
    }

    pub fn is_pinned(&self) -> bool {
        self.context.is_pinned()
    }

    pub fn is_assigned(&self) -> bool {
        self.context.is_assigned()
    }

    pub fn is_labeled(&self) -> bool {
        self.context.is_labeled()
    }
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
