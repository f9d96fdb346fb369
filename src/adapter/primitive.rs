use async_trait::async_trait;

use crate::store::Store;

use super::{Adapter, PrimitiveKind};

/// Pass-through adapter for boolean values.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolAdapter;

#[async_trait]
impl Adapter<bool> for BoolAdapter {
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::Bool
    }

    fn read(&self, store: &dyn Store, key: &str) -> Option<bool> {
        store.get_bool(key)
    }

    async fn write(&self, store: &dyn Store, key: &str, value: &bool) -> bool {
        store.set_bool(key, *value).await
    }
}

/// Pass-through adapter for integer values.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntAdapter;

#[async_trait]
impl Adapter<i64> for IntAdapter {
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::Int
    }

    fn read(&self, store: &dyn Store, key: &str) -> Option<i64> {
        store.get_int(key)
    }

    async fn write(&self, store: &dyn Store, key: &str, value: &i64) -> bool {
        store.set_int(key, *value).await
    }
}

/// Pass-through adapter for floating-point values.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatAdapter;

#[async_trait]
impl Adapter<f64> for FloatAdapter {
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::Float
    }

    fn read(&self, store: &dyn Store, key: &str) -> Option<f64> {
        store.get_float(key)
    }

    async fn write(&self, store: &dyn Store, key: &str, value: &f64) -> bool {
        store.set_float(key, *value).await
    }
}

/// Pass-through adapter for string values.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringAdapter;

#[async_trait]
impl Adapter<String> for StringAdapter {
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::Str
    }

    fn read(&self, store: &dyn Store, key: &str) -> Option<String> {
        store.get_string(key)
    }

    async fn write(&self, store: &dyn Store, key: &str, value: &String) -> bool {
        store.set_string(key, value).await
    }
}

/// Pass-through adapter for string-list values.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringListAdapter;

#[async_trait]
impl Adapter<Vec<String>> for StringListAdapter {
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::StrList
    }

    fn read(&self, store: &dyn Store, key: &str) -> Option<Vec<String>> {
        store.get_string_list(key)
    }

    async fn write(&self, store: &dyn Store, key: &str, value: &Vec<String>) -> bool {
        store.set_string_list(key, value).await
    }
}
