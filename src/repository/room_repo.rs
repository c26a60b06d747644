// ==========================================
// 病区资源管理系统 - 病房仓储
// ==========================================
// 职责: 管理 rooms 表
// 说明: 病房本身是通用 CRUD; 容量必须为正整数,
//       床位数 ≤ 容量的不变量由床位仓储在写入侧保证
// ==========================================

use crate::domain::{NewRoom, Room};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::generic::{CrudRepository, TableSpec};
use rusqlite::types::Value;
use rusqlite::{Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

impl TableSpec for Room {
    const ENTITY: &'static str = "rooms";
    const TABLE: &'static str = "rooms";
    const COLUMNS: &'static [&'static str] = &["id", "number", "room_type", "capacity"];
    const COLUMN_TYPES: &'static [&'static str] =
        &["INTEGER NOT NULL", "TEXT NOT NULL", "INTEGER NOT NULL"];

    type Draft = NewRoom;

    fn from_row(row: &Row<'_>) -> SqliteResult<Self> {
        Ok(Room {
            id: row.get(0)?,
            number: row.get(1)?,
            room_type: row.get(2)?,
            capacity: row.get(3)?,
        })
    }

    fn validate(draft: &NewRoom) -> RepositoryResult<()> {
        if draft.number <= 0 {
            return Err(RepositoryError::ValidationError(
                "房间号必须为正整数".to_string(),
            ));
        }
        if draft.capacity <= 0 {
            return Err(RepositoryError::ValidationError(
                "容量必须为正整数".to_string(),
            ));
        }
        Ok(())
    }

    fn bind_values(draft: &NewRoom) -> Vec<Value> {
        vec![
            Value::Integer(draft.number),
            Value::Text(draft.room_type.clone()),
            Value::Integer(draft.capacity),
        ]
    }
}

pub struct RoomRepository {
    inner: CrudRepository<Room>,
}

impl RoomRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self {
            inner: CrudRepository::new(conn),
        };
        repo.inner.ensure_table()?;
        Ok(repo)
    }

    pub fn create(&self, draft: &NewRoom) -> RepositoryResult<Room> {
        self.inner.create(draft)
    }

    pub fn get_one(&self, id: i64) -> RepositoryResult<Option<Room>> {
        self.inner.get_one(id)
    }

    pub fn list(&self) -> RepositoryResult<Vec<Room>> {
        self.inner.list()
    }

    pub fn filter(&self, conditions: &[(&str, Value)]) -> RepositoryResult<Vec<Room>> {
        self.inner.filter(conditions)
    }

    pub fn update(&self, id: i64, draft: &NewRoom) -> RepositoryResult<Room> {
        self.inner.update(id, draft)
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        self.inner.delete(id)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        self.inner.count()
    }
}
