use serde::Deserialize;

/// `{"data": [...]}` list envelope used by every collection endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub(crate) data: Vec<T>,
}
