//! Canonical request/response model and its persisted JSON form

mod collection;
mod environment;

pub use collection::{
    Auth, BearerAuth, Body, Collection, Header, Info, Item, Request, Response, Url,
    COLLECTION_SCHEMA, HEADER_TYPE_TEXT, MODE_RAW,
};
pub use environment::{Environment, EnvironmentMeta, Variable};

use serde::{Deserialize, Deserializer};

/// Tools that write `null` for empty lists are accepted
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
