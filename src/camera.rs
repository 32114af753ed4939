//! Camera record data model
//!
//! A [`CameraRecord`] mirrors one `camera` element. Every attribute is optional text;
//! an attribute missing from the source element is `None`.

/// Attribute names in the fixed order they are read and serialized
pub const ATTRIBUTE_NAMES: [&str; 9] = [
    "name",
    "type",
    "url",
    "camInstance",
    "username",
    "password",
    "enabled",
    "setNames",
    "bitOptions",
];

/// One camera configuration entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CameraRecord {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub url: Option<String>,
    pub cam_instance: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub enabled: Option<String>,
    pub set_names: Option<String>,
    pub bit_options: Option<String>,
}

/// Identity of a camera: the ordered (name, url) pair
///
/// Field order matters: the derived `Ord` compares name first, then url.
/// An absent value sorts before any present one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey {
    pub name: Option<String>,
    pub url: Option<String>,
}

impl IdentityKey {
    pub fn new(name: Option<String>, url: Option<String>) -> Self {
        Self { name, url }
    }
}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {})",
            self.name.as_deref().unwrap_or("<none>"),
            self.url.as_deref().unwrap_or("<none>")
        )
    }
}

impl CameraRecord {
    /// Build a record from an attribute lookup, one call per known attribute name
    pub fn from_lookup<F>(mut lookup: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        Self {
            name: lookup("name"),
            kind: lookup("type"),
            url: lookup("url"),
            cam_instance: lookup("camInstance"),
            username: lookup("username"),
            password: lookup("password"),
            enabled: lookup("enabled"),
            set_names: lookup("setNames"),
            bit_options: lookup("bitOptions"),
        }
    }

    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey::new(self.name.clone(), self.url.clone())
    }

    /// First whitespace-delimited token of the `type` attribute
    pub fn category(&self) -> Option<&str> {
        self.kind.as_deref()?.split_whitespace().next()
    }

    /// Attribute values paired with their names, in serialization order
    pub fn attributes(&self) -> [(&'static str, Option<&str>); 9] {
        [
            (ATTRIBUTE_NAMES[0], self.name.as_deref()),
            (ATTRIBUTE_NAMES[1], self.kind.as_deref()),
            (ATTRIBUTE_NAMES[2], self.url.as_deref()),
            (ATTRIBUTE_NAMES[3], self.cam_instance.as_deref()),
            (ATTRIBUTE_NAMES[4], self.username.as_deref()),
            (ATTRIBUTE_NAMES[5], self.password.as_deref()),
            (ATTRIBUTE_NAMES[6], self.enabled.as_deref()),
            (ATTRIBUTE_NAMES[7], self.set_names.as_deref()),
            (ATTRIBUTE_NAMES[8], self.bit_options.as_deref()),
        ]
    }
}
