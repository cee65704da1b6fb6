//! Bulk import and export of whole collections as tables.
//!
//! An import is all or nothing. The headers are checked first, then every
//! row is parsed; only when the whole table is good does the collection get
//! replaced. No rows are merged or de-duplicated.

use chrono::NaiveDate;
use evac_core::{Assignment, Citizen, CollectionKind, Record, Shelter, Table};
use tracing::info;

use crate::error::{FieldList, RegistryError};
use crate::registry::{Registry, Result};

impl Registry {
    /// Replaces `kind`'s collection with the rows of `table`.
    ///
    /// Headers are matched by name after trimming, in any order; extra
    /// columns are ignored. Every value is trimmed. Rows that are blank in
    /// every required column are skipped. Returns the number of records
    /// imported.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::SchemaMismatch`] if a required header is absent
    /// - [`RegistryError::InvalidRow`] for the first row with a value that does
    ///   not parse
    ///
    /// Either way the collection is left as it was.
    ///
    /// # Examples
    ///
    /// ```
    /// use evac_core::{CollectionKind, Table, demo_snapshot, today};
    /// use evac_engine::{Registry, RecordStore};
    ///
    /// let mut registry = Registry::new(RecordStore::new(demo_snapshot(today())), Default::default());
    ///
    /// let mut table = Table::new(vec!["riskLevel".into(), "shelterId".into(), "capacity".into(), "name".into()]);
    /// table.push_row(vec!["Low".into(), "S100".into(), "12".into(), "Hall".into()]);
    ///
    /// assert_eq!(registry.import_collection(CollectionKind::Shelters, &table).unwrap(), 1);
    /// assert_eq!(registry.snapshot().shelters[0].capacity, 12);
    /// ```
    pub fn import_collection(&mut self, kind: CollectionKind, table: &Table) -> Result<usize> {
        let missing = kind.missing_fields(&table.headers);
        if !missing.is_empty() {
            return Err(RegistryError::SchemaMismatch {
                kind,
                missing: FieldList(missing),
                required: FieldList::from(kind.fields()),
            });
        }

        let today = self.today();
        match kind {
            CollectionKind::Citizens => self.replace::<Citizen>(table, today),
            CollectionKind::Shelters => self.replace::<Shelter>(table, today),
            CollectionKind::Assignments => self.replace::<Assignment>(table, today),
        }
    }

    /// Returns `kind`'s collection as a table headed by its field list.
    #[must_use]
    pub fn export_collection(&self, kind: CollectionKind) -> Table {
        self.snapshot().to_table(kind)
    }

    fn replace<R: Record>(&mut self, table: &Table, today: NaiveDate) -> Result<usize> {
        let records = parse_rows::<R>(table, today)?;
        let count = records.len();
        self.store_mut().apply("import", |s| {
            *R::collection_mut(s) = records;
        });
        info!(kind = %R::KIND, count, "Collection imported");
        Ok(count)
    }
}

/// Projects each row onto `R`'s field list and parses it.
fn parse_rows<R: Record>(table: &Table, today: NaiveDate) -> Result<Vec<R>> {
    let fields = R::KIND.fields();
    let columns: Vec<Option<usize>> = fields.iter().map(|f| table.column(f)).collect();

    let mut records = Vec::with_capacity(table.rows.len());
    for (index, row) in table.rows.iter().enumerate() {
        let values: Vec<String> = columns
            .iter()
            .map(|column| {
                column
                    .and_then(|c| row.get(c))
                    .map_or_else(String::new, |v| v.trim().to_owned())
            })
            .collect();
        if values.iter().all(String::is_empty) {
            continue;
        }

        let record = R::from_fields(&values, today).map_err(|source| RegistryError::InvalidRow {
            kind: R::KIND,
            row: index + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}
