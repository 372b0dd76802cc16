use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::filter::sort_by_field;
use crate::models::Record;

/// Entity CRUD against whatever backs the portal.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All records of a kind, optionally sorted by `field` or `-field`.
    async fn list<T: Record>(&self, sort_key: Option<&str>) -> Result<Vec<T>>;

    /// Stores `record`, assigning an id when it has none.
    async fn create<T: Record>(&self, record: T) -> Result<T>;

    async fn update<T: Record>(&self, id: Uuid, record: T) -> Result<T>;

    async fn delete<T: Record>(&self, id: Uuid) -> Result<()>;
}

/// One `<kind>.csv` file per entity kind under a data directory.
///
/// Rows without an `id` column read back with the nil id and can be listed
/// but not updated or deleted.
#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for<T: Record>(&self) -> PathBuf {
        self.dir.join(format!("{}.csv", T::KIND))
    }

    async fn read_all<T: Record>(&self) -> Result<Vec<T>> {
        let path = self.path_for::<T>();
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(kind = T::KIND, path = %path.display(), "no data file, empty collection");
                return Ok(Vec::new());
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(bytes.as_slice());
        let mut records = Vec::new();

        for (index, result) in reader.deserialize::<T>().enumerate() {
            match result {
                Ok(record) => records.push(record),
                Err(err) if err.is_io_error() => {
                    return Err(StoreError::Csv { path, source: err });
                }
                Err(err) => {
                    warn!(kind = T::KIND, row = index + 1, error = %err, "skipping malformed row");
                }
            }
        }

        debug!(kind = T::KIND, count = records.len(), "read records");
        Ok(records)
    }

    async fn write_all<T: Record>(&self, records: &[T]) -> Result<()> {
        let path = self.path_for::<T>();
        let mut writer = csv::Writer::from_writer(Vec::new());
        for record in records {
            writer.serialize(record).map_err(|source| StoreError::Csv {
                path: path.clone(),
                source,
            })?;
        }
        let bytes = writer.into_inner().map_err(|err| StoreError::Io {
            path: path.clone(),
            source: err.into_error(),
        })?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StoreError::Io {
                path: self.dir.clone(),
                source,
            })?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;

        debug!(kind = T::KIND, count = records.len(), "wrote records");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for CsvStore {
    async fn list<T: Record>(&self, sort_key: Option<&str>) -> Result<Vec<T>> {
        let mut records = self.read_all::<T>().await?;
        if let Some(key) = sort_key {
            sort_by_field(&mut records, key);
        }
        Ok(records)
    }

    async fn create<T: Record>(&self, mut record: T) -> Result<T> {
        if record.id().is_nil() {
            record.set_id(Uuid::new_v4());
        }
        let mut records = self.read_all::<T>().await?;
        records.push(record.clone());
        self.write_all(&records).await?;
        Ok(record)
    }

    async fn update<T: Record>(&self, id: Uuid, mut record: T) -> Result<T> {
        let mut records = self.read_all::<T>().await?;
        let slot = records
            .iter_mut()
            .find(|existing| !id.is_nil() && existing.id() == id)
            .ok_or(StoreError::NotFound { kind: T::KIND, id })?;
        record.set_id(id);
        *slot = record.clone();
        self.write_all(&records).await?;
        Ok(record)
    }

    async fn delete<T: Record>(&self, id: Uuid) -> Result<()> {
        let mut records = self.read_all::<T>().await?;
        let before = records.len();
        records.retain(|existing| id.is_nil() || existing.id() != id);
        if records.len() == before {
            return Err(StoreError::NotFound { kind: T::KIND, id });
        }
        self.write_all(&records).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{AttendanceStatus, Grade};
    use crate::models::{AcademicRecord, AttendanceRecord};
    use chrono::NaiveDate;

    fn academic(semester: &str, grade: &str) -> AcademicRecord {
        AcademicRecord {
            id: Uuid::nil(),
            subject_name: "Discrete Maths".to_string(),
            subject_code: "MA102".to_string(),
            semester: semester.to_string(),
            credits: Some(4.0),
            grade: Grade::from(grade),
            marks: None,
            max_marks: None,
        }
    }

    #[tokio::test]
    async fn missing_file_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());
        let records: Vec<AcademicRecord> = store.list(None).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn create_assigns_id_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());

        let created = store.create(academic("S1", "A")).await.unwrap();
        assert!(!created.id.is_nil());

        let listed: Vec<AcademicRecord> = store.list(None).await.unwrap();
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn list_sorts_descending_with_dash_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());
        for semester in ["S1", "S3", "S2"] {
            store.create(academic(semester, "B")).await.unwrap();
        }

        let listed: Vec<AcademicRecord> = store.list(Some("-semester")).await.unwrap();
        let order: Vec<&str> = listed.iter().map(|r| r.semester.as_str()).collect();
        assert_eq!(order, vec!["S3", "S2", "S1"]);
    }

    #[tokio::test]
    async fn update_and_delete_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());
        let created = store.create(academic("S1", "C")).await.unwrap();

        let mut changed = created.clone();
        changed.grade = Grade::BPlus;
        let updated = store.update(created.id, changed).await.unwrap();
        assert_eq!(updated.grade, Grade::BPlus);

        let listed: Vec<AcademicRecord> = store.list(None).await.unwrap();
        assert_eq!(listed[0].grade, Grade::BPlus);

        store.delete::<AcademicRecord>(created.id).await.unwrap();
        let listed: Vec<AcademicRecord> = store.list(None).await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());
        let err = store
            .update(Uuid::new_v4(), academic("S1", "A"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: "academic_records", .. }));

        let err = store.delete::<AcademicRecord>(Uuid::nil()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn malformed_rows_are_skipped_and_bad_numbers_read_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("academic_records.csv"),
            "subject_name,subject_code,semester,credits,grade\n\
             Algebra,MA101,S1,four,A\n\
             Calculus,MA102,S1,4,Q\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("attendance.csv"),
            "subject,date,status,time_slot,faculty_name\n\
             Physics,2026-02-30,Present,09:00,Dr. Roy\n\
             Physics,2026-02-03,Excused,09:00,Dr. Roy\n",
        )
        .unwrap();
        let store = CsvStore::new(dir.path());

        let grades: Vec<AcademicRecord> = store.list(None).await.unwrap();
        assert_eq!(grades.len(), 2);
        assert_eq!(grades[0].credits, None);
        assert_eq!(grades[1].grade, Grade::Other("Q".to_string()));

        let attendance: Vec<AttendanceRecord> = store.list(None).await.unwrap();
        assert_eq!(attendance.len(), 1);
        assert_eq!(
            attendance[0].date,
            NaiveDate::from_ymd_opt(2026, 2, 3).unwrap()
        );
        assert_eq!(
            attendance[0].status,
            AttendanceStatus::Other("Excused".to_string())
        );
    }
}
