use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::store::Store;

use super::{Adapter, PrimitiveKind};

/// Adapter storing UTC timestamps as epoch milliseconds.
///
/// Sub-millisecond precision is truncated on write.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeAdapter;

#[async_trait]
impl Adapter<DateTime<Utc>> for DateTimeAdapter {
    fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::Int
    }

    fn read(&self, store: &dyn Store, key: &str) -> Option<DateTime<Utc>> {
        let millis = store.get_int(key)?;
        Utc.timestamp_millis_opt(millis).single()
    }

    async fn write(&self, store: &dyn Store, key: &str, value: &DateTime<Utc>) -> bool {
        store.set_int(key, value.timestamp_millis()).await
    }
}
