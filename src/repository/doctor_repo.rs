// ==========================================
// 病区资源管理系统 - 医生仓储
// ==========================================
// 职责: 管理 doctors 表
// 不变量: 执业证号全局唯一
//         (写入前检查 + 存储级唯一索引双重防线)
// ==========================================

use crate::domain::{Doctor, NewDoctor};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::generic::{CrudRepository, TableSpec};
use crate::repository::query_builder;
use rusqlite::types::Value;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

impl TableSpec for Doctor {
    const ENTITY: &'static str = "doctors";
    const TABLE: &'static str = "doctors";
    const COLUMNS: &'static [&'static str] = &["id", "name", "license_number", "specialty"];
    const COLUMN_TYPES: &'static [&'static str] =
        &["TEXT NOT NULL", "INTEGER NOT NULL", "TEXT NOT NULL"];
    // 唯一索引是执业证号不变量的第二道防线
    const EXTRA_SCHEMA: &'static str =
        "CREATE UNIQUE INDEX IF NOT EXISTS uq_doctors_license ON doctors(license_number);";

    type Draft = NewDoctor;

    fn from_row(row: &Row<'_>) -> SqliteResult<Self> {
        Ok(Doctor {
            id: row.get(0)?,
            name: row.get(1)?,
            license_number: row.get(2)?,
            specialty: row.get(3)?,
        })
    }

    fn validate(draft: &NewDoctor) -> RepositoryResult<()> {
        if draft.name.trim().is_empty() {
            return Err(RepositoryError::ValidationError(
                "医生姓名不能为空".to_string(),
            ));
        }
        if draft.license_number <= 0 {
            return Err(RepositoryError::ValidationError(
                "执业证号必须为正整数".to_string(),
            ));
        }
        Ok(())
    }

    fn bind_values(draft: &NewDoctor) -> Vec<Value> {
        vec![
            Value::Text(draft.name.clone()),
            Value::Integer(draft.license_number),
            Value::Text(draft.specialty.clone()),
        ]
    }
}

pub struct DoctorRepository {
    inner: CrudRepository<Doctor>,
}

impl DoctorRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self {
            inner: CrudRepository::new(conn),
        };
        repo.inner.ensure_table()?;
        Ok(repo)
    }

    /// 创建; 执业证号已被占用时返回 DuplicateKey 且不写入
    pub fn create(&self, draft: &NewDoctor) -> RepositoryResult<Doctor> {
        let conn = self.inner.get_conn()?;
        Self::check_license_free(&conn, draft.license_number, None)?;
        CrudRepository::<Doctor>::insert_with(&conn, draft)
    }

    pub fn get_one(&self, id: i64) -> RepositoryResult<Option<Doctor>> {
        self.inner.get_one(id)
    }

    pub fn list(&self) -> RepositoryResult<Vec<Doctor>> {
        self.inner.list()
    }

    pub fn filter(&self, conditions: &[(&str, Value)]) -> RepositoryResult<Vec<Doctor>> {
        self.inner.filter(conditions)
    }

    /// 更新; 唯一性检查排除自身 id, 保持自身证号不变的更新合法
    pub fn update(&self, id: i64, draft: &NewDoctor) -> RepositoryResult<Doctor> {
        let conn = self.inner.get_conn()?;
        Self::check_license_free(&conn, draft.license_number, Some(id))?;
        CrudRepository::<Doctor>::update_with(&conn, id, draft)
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        self.inner.delete(id)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        self.inner.count()
    }

    /// 按指定键排序列出
    ///
    /// 仅接受 id / name / specialty；其余取值静默回退到 id。
    /// 回退是既有界面约定，不视为错误。
    pub fn list_ordered(&self, sort_key: &str) -> RepositoryResult<Vec<Doctor>> {
        let order_col = match sort_key {
            "name" => "name",
            "specialty" => "specialty",
            "id" => "id",
            other => {
                tracing::debug!("未知的医生排序键 '{}', 回退到 id", other);
                "id"
            }
        };

        let conn = self.inner.get_conn()?;
        let sql = format!(
            "{} ORDER BY {} ASC",
            query_builder::select(Doctor::TABLE, Doctor::COLUMNS, &[]),
            order_col
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| Doctor::from_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    fn check_license_free(
        conn: &Connection,
        license_number: i64,
        exclude_id: Option<i64>,
    ) -> RepositoryResult<()> {
        let taken: i64 = match exclude_id {
            Some(id) => conn.query_row(
                "SELECT COUNT(*) FROM doctors WHERE license_number = ?1 AND id <> ?2",
                params![license_number, id],
                |row| row.get(0),
            )?,
            None => conn.query_row(
                "SELECT COUNT(*) FROM doctors WHERE license_number = ?1",
                params![license_number],
                |row| row.get(0),
            )?,
        };

        if taken > 0 {
            return Err(RepositoryError::DuplicateKey {
                entity: "doctors",
                field: "license_number",
                message: format!("执业证号 {} 已被其他医生占用", license_number),
            });
        }
        Ok(())
    }
}
