//! Contact types

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::Keyed;

/// Cached profile image state
///
/// `NotFetched` means nobody asked yet. `Absent` means the lookup ran and the
/// contact has no picture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProfileImage {
    #[default]
    NotFetched,
    Absent,
    Present(String),
}

impl ProfileImage {
    /// Check if no lookup has been made yet
    pub fn is_not_fetched(&self) -> bool {
        matches!(self, ProfileImage::NotFetched)
    }

    /// Resolved URL, if one is known to exist
    pub fn url(&self) -> Option<&str> {
        match self {
            ProfileImage::Present(url) => Some(url),
            _ => None,
        }
    }
}

impl From<Option<String>> for ProfileImage {
    fn from(value: Option<String>) -> Self {
        value.map_or(ProfileImage::Absent, ProfileImage::Present)
    }
}

// A missing field deserializes through `#[serde(default)]` to `NotFetched`,
// `null` to `Absent`.
impl Serialize for ProfileImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ProfileImage::Present(url) => serializer.serialize_some(url),
            _ => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for ProfileImage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<String>::deserialize(deserializer).map(ProfileImage::from)
    }
}

/// Contact record. Also used as its own partial update: absent fields are
/// left untouched by [`Contact::merge`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify: Option<String>,
    #[serde(rename = "verifiedName", default, skip_serializing_if = "Option::is_none")]
    pub verified_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "imgUrl", default, skip_serializing_if = "ProfileImage::is_not_fetched")]
    pub img_url: ProfileImage,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Contact {
    /// Create a contact with only an id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_notify(mut self, notify: impl Into<String>) -> Self {
        self.notify = Some(notify.into());
        self
    }

    /// Shallow merge: every field present in `other` overwrites
    pub fn merge(&mut self, other: &Contact) {
        if let Some(name) = &other.name {
            self.name = Some(name.clone());
        }
        if let Some(notify) = &other.notify {
            self.notify = Some(notify.clone());
        }
        if let Some(verified) = &other.verified_name {
            self.verified_name = Some(verified.clone());
        }
        if let Some(status) = &other.status {
            self.status = Some(status.clone());
        }
        if !other.img_url.is_not_fetched() {
            self.img_url = other.img_url.clone();
        }
        for (k, v) in &other.extra {
            self.extra.insert(k.clone(), v.clone());
        }
    }
}

impl Keyed for Contact {
    fn key(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_image_tri_state() {
        let missing: Contact = serde_json::from_value(json!({"id": "a"})).unwrap();
        let null: Contact = serde_json::from_value(json!({"id": "a", "imgUrl": null})).unwrap();
        let present: Contact =
            serde_json::from_value(json!({"id": "a", "imgUrl": "https://img/a"})).unwrap();

        assert_eq!(missing.img_url, ProfileImage::NotFetched);
        assert_eq!(null.img_url, ProfileImage::Absent);
        assert_eq!(present.img_url.url(), Some("https://img/a"));

        let json = serde_json::to_value(&null).unwrap();
        assert_eq!(json["imgUrl"], Value::Null);
        let json = serde_json::to_value(&missing).unwrap();
        assert!(json.get("imgUrl").is_none());
    }

    #[test]
    fn test_merge_keeps_known_image_state() {
        let mut contact = Contact::new("a").with_name("Alice");
        contact.img_url = ProfileImage::Absent;

        contact.merge(&Contact::new("a").with_notify("ali"));
        assert_eq!(contact.name.as_deref(), Some("Alice"));
        assert_eq!(contact.notify.as_deref(), Some("ali"));
        assert_eq!(contact.img_url, ProfileImage::Absent);
    }
}
