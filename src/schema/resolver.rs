use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::observability::{Event, Logger};
use crate::session::SqlSession;

use super::catalog;
use super::errors::{SchemaError, SchemaResult};

type CacheKey = (String, String);

/// Resolves table-type columns through the catalog, caching answers by
/// (procedure, parameter).
#[derive(Debug, Default)]
pub struct SchemaResolver {
    cache: RwLock<HashMap<CacheKey, Arc<[String]>>>,
}

impl SchemaResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordered column names of the table type declared for `parameter`.
    ///
    /// An empty catalog answer means the procedure or parameter does not
    /// exist (or is not table-valued) and is reported as `TypeNotFound`.
    pub async fn resolve_columns<S>(
        &self,
        session: &mut S,
        procedure: &str,
        parameter: &str,
    ) -> SchemaResult<Arc<[String]>>
    where
        S: SqlSession + ?Sized,
    {
        let key = Self::key(procedure, parameter);
        if let Some(columns) = self.cached(&key) {
            return Ok(columns);
        }

        let rows = session
            .query_column(
                catalog::TABLE_TYPE_COLUMNS,
                &[
                    (catalog::PROCEDURE_NAME_PARAM, procedure),
                    (catalog::PROPERTY_NAME_PARAM, parameter),
                ],
            )
            .await?;

        if rows.is_empty() {
            return Err(SchemaError::TypeNotFound {
                procedure: procedure.to_string(),
                parameter: parameter.to_string(),
            });
        }

        let count = rows.len().to_string();
        Logger::event(
            Event::TableTypeResolved,
            &[
                ("columns", count.as_str()),
                ("parameter", parameter),
                ("procedure", procedure),
            ],
        );

        let columns: Arc<[String]> = rows.into();
        let mut cache = self
            .cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(cache.entry(key).or_insert(columns).clone())
    }

    /// Number of cached (procedure, parameter) entries
    pub fn cached_len(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    fn cached(&self, key: &CacheKey) -> Option<Arc<[String]>> {
        self.cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }

    // Engine identifiers are case-insensitive
    fn key(procedure: &str, parameter: &str) -> CacheKey {
        (procedure.to_ascii_lowercase(), parameter.to_ascii_lowercase())
    }
}
