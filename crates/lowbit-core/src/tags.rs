use std::collections::BTreeMap;

/// Out-of-band key/value text stored next to the image data.
pub trait TagStore {
    fn tag(&self, key: &str) -> Option<&str>;

    fn set_tag(&mut self, key: &str, value: String);

    fn remove_tag(&mut self, key: &str) -> Option<String>;
}

/// Tags of an image container, kept apart from the carrier itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TagStore for Tags {
    fn tag(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    fn set_tag(&mut self, key: &str, value: String) {
        self.0.insert(key.to_string(), value);
    }

    fn remove_tag(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tags {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Tags(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
