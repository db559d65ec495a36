use std::collections::{BTreeMap, HashMap};
use std::ffi::{OsStr, OsString};

/// Variables removed by `--no-mirrors` so the build talks to upstream
/// repositories directly.
pub const PROXY_VARIABLES: &[&str] = &[
    "ALL_PROXY",
    "HTTPS_PROXY",
    "HTTP_PROXY",
    "all_proxy",
    "https_proxy",
    "http_proxy",
];

/// Changes to apply on top of a base environment. `None` removes the
/// variable, `Some` sets it. Values need not be UTF-8.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EnvPatch(BTreeMap<String, Option<OsString>>);

impl EnvPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<OsString>) -> &mut Self {
        self.0.insert(key.into(), Some(value.into()));
        self
    }

    pub fn remove(&mut self, key: impl Into<String>) -> &mut Self {
        self.0.insert(key.into(), None);
        self
    }

    /// Layers `other` over `self`; entries in `other` win.
    pub fn extend(&mut self, other: &EnvPatch) -> &mut Self {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&OsStr>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// Patch that disables proxy and mirror usage for the build.
    pub fn no_mirrors() -> Self {
        let mut patch = Self::new();

        for key in PROXY_VARIABLES {
            patch.remove(*key);
        }

        patch.set("NO_PROXY", "*");
        patch
    }
}

impl From<BTreeMap<String, Option<String>>> for EnvPatch {
    fn from(map: BTreeMap<String, Option<String>>) -> Self {
        Self(
            map.into_iter()
                .map(|(key, value)| (key, value.map(OsString::from)))
                .collect(),
        )
    }
}

/// Returns a fresh environment made of `base` with `patch` applied.
///
/// `base` is only read, so the ambient process environment is never touched
/// when it is passed in as `std::env::vars_os()`.
pub fn derive_environment<I, K, V>(base: I, patch: &EnvPatch) -> HashMap<OsString, OsString>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<OsString>,
    V: Into<OsString>,
{
    let mut environment: HashMap<OsString, OsString> = base
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();

    for (key, value) in patch.iter() {
        match value {
            Some(value) => {
                environment.insert(key.into(), value.to_os_string());
            }
            None => {
                environment.remove(OsStr::new(key));
            }
        }
    }

    environment
}
