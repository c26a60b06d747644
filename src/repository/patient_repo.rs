// ==========================================
// 病区资源管理系统 - 患者仓储
// ==========================================
// 职责: 管理 patients 表
// 说明: 除主键外无唯一性不变量, 即通用 CRUD
// ==========================================

use crate::domain::{NewPatient, Patient};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::generic::{CrudRepository, TableSpec};
use rusqlite::types::Value;
use rusqlite::{Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

impl TableSpec for Patient {
    const ENTITY: &'static str = "patients";
    const TABLE: &'static str = "patients";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "insurer",
        "member_number",
        "address",
        "phone",
    ];
    const COLUMN_TYPES: &'static [&'static str] = &[
        "TEXT NOT NULL",
        "TEXT NOT NULL",
        "TEXT NOT NULL",
        "TEXT NOT NULL",
        "TEXT NOT NULL",
    ];

    type Draft = NewPatient;

    fn from_row(row: &Row<'_>) -> SqliteResult<Self> {
        Ok(Patient {
            id: row.get(0)?,
            name: row.get(1)?,
            insurer: row.get(2)?,
            member_number: row.get(3)?,
            address: row.get(4)?,
            phone: row.get(5)?,
        })
    }

    fn validate(draft: &NewPatient) -> RepositoryResult<()> {
        if draft.name.trim().is_empty() {
            return Err(RepositoryError::ValidationError(
                "患者姓名不能为空".to_string(),
            ));
        }
        Ok(())
    }

    fn bind_values(draft: &NewPatient) -> Vec<Value> {
        vec![
            Value::Text(draft.name.clone()),
            Value::Text(draft.insurer.clone()),
            Value::Text(draft.member_number.clone()),
            Value::Text(draft.address.clone()),
            Value::Text(draft.phone.clone()),
        ]
    }
}

pub struct PatientRepository {
    inner: CrudRepository<Patient>,
}

impl PatientRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self {
            inner: CrudRepository::new(conn),
        };
        repo.inner.ensure_table()?;
        Ok(repo)
    }

    pub fn create(&self, draft: &NewPatient) -> RepositoryResult<Patient> {
        self.inner.create(draft)
    }

    pub fn get_one(&self, id: i64) -> RepositoryResult<Option<Patient>> {
        self.inner.get_one(id)
    }

    pub fn list(&self) -> RepositoryResult<Vec<Patient>> {
        self.inner.list()
    }

    pub fn filter(&self, conditions: &[(&str, Value)]) -> RepositoryResult<Vec<Patient>> {
        self.inner.filter(conditions)
    }

    pub fn update(&self, id: i64, draft: &NewPatient) -> RepositoryResult<Patient> {
        self.inner.update(id, draft)
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        self.inner.delete(id)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        self.inner.count()
    }
}
