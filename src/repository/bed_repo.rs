// ==========================================
// 病区资源管理系统 - 床位仓储
// ==========================================
// 职责: 管理 beds 表
// 不变量: 引用同一病房的床位数 ≤ 该病房容量;
//         被占用(存在在院记录)的床位不可删除
// 说明: "检查 + 写入"序列在单次持锁内完成
// ==========================================

use crate::domain::{Admission, Bed, NewBed, Room};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::generic::{CrudRepository, TableSpec};
use crate::repository::query_builder;
use rusqlite::types::Value;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

impl TableSpec for Bed {
    const ENTITY: &'static str = "beds";
    const TABLE: &'static str = "beds";
    const COLUMNS: &'static [&'static str] = &["id", "room_id"];
    const COLUMN_TYPES: &'static [&'static str] = &["INTEGER NOT NULL REFERENCES rooms(id)"];
    const EXTRA_SCHEMA: &'static str =
        "CREATE INDEX IF NOT EXISTS idx_beds_room_id ON beds(room_id);";

    type Draft = NewBed;

    fn from_row(row: &Row<'_>) -> SqliteResult<Self> {
        Ok(Bed {
            id: row.get(0)?,
            room_id: row.get(1)?,
        })
    }

    fn validate(draft: &NewBed) -> RepositoryResult<()> {
        if draft.room_id <= 0 {
            return Err(RepositoryError::ValidationError(
                "床位必须引用有效病房".to_string(),
            ));
        }
        Ok(())
    }

    fn bind_values(draft: &NewBed) -> Vec<Value> {
        vec![Value::Integer(draft.room_id)]
    }
}

pub struct BedRepository {
    inner: CrudRepository<Bed>,
}

impl BedRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self {
            inner: CrudRepository::new(conn),
        };
        {
            // beds 引用 rooms; 占用查询读取 admissions
            let guard = repo.inner.get_conn()?;
            CrudRepository::<Room>::ensure_table_with(&guard)?;
            CrudRepository::<Bed>::ensure_table_with(&guard)?;
            CrudRepository::<Admission>::ensure_table_with(&guard)?;
        }
        Ok(repo)
    }

    /// 创建床位
    ///
    /// 1. 病房不存在 → NotFound
    /// 2. 房内现有床位数 ≥ 容量 → CapacityExceeded
    pub fn create(&self, draft: &NewBed) -> RepositoryResult<Bed> {
        Bed::validate(draft)?;
        let conn = self.inner.get_conn()?;

        let room = CrudRepository::<Room>::fetch_one_with(&conn, draft.room_id)?.ok_or(
            RepositoryError::NotFound {
                entity: "rooms",
                id: draft.room_id,
            },
        )?;

        let current = Self::count_in_room_with(&conn, room.id)?;
        if current >= room.capacity {
            tracing::debug!(
                "病房 {} 容量已满 ({}/{}), 拒绝新增床位",
                room.id,
                current,
                room.capacity
            );
            return Err(RepositoryError::CapacityExceeded {
                room_id: room.id,
                capacity: room.capacity,
            });
        }

        CrudRepository::<Bed>::insert_with(&conn, draft)
    }

    pub fn get_one(&self, id: i64) -> RepositoryResult<Option<Bed>> {
        self.inner.get_one(id)
    }

    pub fn list(&self) -> RepositoryResult<Vec<Bed>> {
        self.inner.list()
    }

    pub fn filter(&self, conditions: &[(&str, Value)]) -> RepositoryResult<Vec<Bed>> {
        self.inner.filter(conditions)
    }

    /// 更新床位
    ///
    /// 床位迁往其他病房时, 对目标病房重跑容量检查
    /// （计数排除正在迁移的这张床）
    pub fn update(&self, id: i64, draft: &NewBed) -> RepositoryResult<Bed> {
        Bed::validate(draft)?;
        let conn = self.inner.get_conn()?;

        let current = CrudRepository::<Bed>::fetch_one_with(&conn, id)?.ok_or(
            RepositoryError::NotFound {
                entity: "beds",
                id,
            },
        )?;

        if current.room_id != draft.room_id {
            let room = CrudRepository::<Room>::fetch_one_with(&conn, draft.room_id)?.ok_or(
                RepositoryError::NotFound {
                    entity: "rooms",
                    id: draft.room_id,
                },
            )?;

            let occupied: i64 = conn.query_row(
                "SELECT COUNT(*) FROM beds WHERE room_id = ?1 AND id <> ?2",
                params![room.id, id],
                |row| row.get(0),
            )?;
            if occupied >= room.capacity {
                return Err(RepositoryError::CapacityExceeded {
                    room_id: room.id,
                    capacity: room.capacity,
                });
            }
        }

        CrudRepository::<Bed>::update_with(&conn, id, draft)
    }

    /// 删除床位; 床位仍被在院记录占用时返回 Conflict
    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.inner.get_conn()?;
        if Self::is_occupied_with(&conn, id)? {
            return Err(RepositoryError::Conflict(format!(
                "床位 {} 仍被在院记录占用, 无法删除",
                id
            )));
        }
        CrudRepository::<Bed>::delete_with(&conn, id)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        self.inner.count()
    }

    /// 床位是否被占用（存在引用它且未出院的住院记录）
    pub fn is_occupied(&self, bed_id: i64) -> RepositoryResult<bool> {
        let conn = self.inner.get_conn()?;
        Self::is_occupied_with(&conn, bed_id)
    }

    pub(crate) fn is_occupied_with(conn: &Connection, bed_id: i64) -> RepositoryResult<bool> {
        let open: i64 = conn.query_row(
            "SELECT COUNT(*) FROM admissions WHERE bed_id = ?1 AND discharged_at IS NULL",
            params![bed_id],
            |row| row.get(0),
        )?;
        Ok(open > 0)
    }

    /// 空闲床位（无在院记录占用）, 按 id 升序
    pub fn free_beds(&self) -> RepositoryResult<Vec<Bed>> {
        let conn = self.inner.get_conn()?;
        let sql = format!(
            "{} WHERE id NOT IN \
             (SELECT bed_id FROM admissions WHERE discharged_at IS NULL) \
             ORDER BY id ASC",
            query_builder::select(Bed::TABLE, Bed::COLUMNS, &[])
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| Bed::from_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 某病房内的床位数（容量检查与病房编辑前校验共用）
    pub fn count_in_room(&self, room_id: i64) -> RepositoryResult<i64> {
        let conn = self.inner.get_conn()?;
        Self::count_in_room_with(&conn, room_id)
    }

    pub(crate) fn count_in_room_with(conn: &Connection, room_id: i64) -> RepositoryResult<i64> {
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM beds WHERE room_id = ?1",
            params![room_id],
            |row| row.get(0),
        )?;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_shared_in_memory;
    use crate::domain::{Doctor, NewRoom, Patient};
    use crate::repository::room_repo::RoomRepository;
    use rusqlite::Connection;

    fn setup() -> (Arc<Mutex<Connection>>, RoomRepository, BedRepository) {
        let conn = open_shared_in_memory().expect("Failed to open in-memory db");
        let rooms = RoomRepository::new(conn.clone()).expect("Failed to create room repo");
        let beds = BedRepository::new(conn.clone()).expect("Failed to create bed repo");
        (conn, rooms, beds)
    }

    // admissions 外键引用 patients/doctors; 直写在院记录前先补齐 id=1 的主数据
    fn seed_patient_and_doctor(conn: &Arc<Mutex<Connection>>) {
        let guard = conn.lock().expect("Failed to lock");
        CrudRepository::<Patient>::ensure_table_with(&guard).expect("Failed to ensure patients");
        CrudRepository::<Doctor>::ensure_table_with(&guard).expect("Failed to ensure doctors");
        guard
            .execute_batch(
                "INSERT INTO patients (name, insurer, member_number, address, phone) \
                 VALUES ('García, Ana', 'OSDE', '61-1', '-', '-'); \
                 INSERT INTO doctors (name, license_number, specialty) \
                 VALUES ('House', 10221, 'Diagnóstico');",
            )
            .expect("Failed to seed patient and doctor");
    }

    fn room_with_capacity(rooms: &RoomRepository, number: i64, capacity: i64) -> i64 {
        rooms
            .create(&NewRoom {
                number,
                room_type: "Común".to_string(),
                capacity,
            })
            .expect("Failed to create room")
            .id
    }

    #[test]
    fn test_capacity_two_allows_two_beds_rejects_third() {
        let (_conn, rooms, beds) = setup();
        let room_id = room_with_capacity(&rooms, 101, 2);

        beds.create(&NewBed { room_id }).expect("bed1 should fit");
        beds.create(&NewBed { room_id }).expect("bed2 should fit");

        let err = beds.create(&NewBed { room_id }).unwrap_err();
        assert!(matches!(err, RepositoryError::CapacityExceeded { .. }));
        assert_eq!(beds.count_in_room(room_id).expect("Failed to count"), 2);
    }

    #[test]
    fn test_create_for_absent_room_fails_not_found() {
        let (_conn, _rooms, beds) = setup();
        let err = beds.create(&NewBed { room_id: 99 }).unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { entity: "rooms", .. }));
    }

    #[test]
    fn test_move_bed_to_full_room_fails() {
        let (_conn, rooms, beds) = setup();
        let small = room_with_capacity(&rooms, 101, 1);
        let other = room_with_capacity(&rooms, 102, 1);

        beds.create(&NewBed { room_id: small }).expect("Failed to create");
        let moving = beds.create(&NewBed { room_id: other }).expect("Failed to create");

        let err = beds.update(moving.id, &NewBed { room_id: small }).unwrap_err();
        assert!(matches!(err, RepositoryError::CapacityExceeded { .. }));
    }

    #[test]
    fn test_update_within_same_room_skips_capacity_check() {
        let (_conn, rooms, beds) = setup();
        let room_id = room_with_capacity(&rooms, 101, 1);
        let bed = beds.create(&NewBed { room_id }).expect("Failed to create");

        // 房间已满, 但原地更新不应触发容量检查
        let updated = beds.update(bed.id, &NewBed { room_id }).expect("Failed to update");
        assert_eq!(updated.room_id, room_id);
    }

    #[test]
    fn test_update_absent_bed_fails_not_found() {
        let (_conn, rooms, beds) = setup();
        let room_id = room_with_capacity(&rooms, 101, 2);
        let err = beds.update(55, &NewBed { room_id }).unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { entity: "beds", .. }));
    }

    #[test]
    fn test_free_beds_ordered_by_id() {
        let (conn, rooms, beds) = setup();
        seed_patient_and_doctor(&conn);
        let room_id = room_with_capacity(&rooms, 101, 3);
        let b1 = beds.create(&NewBed { room_id }).expect("Failed to create");
        let b2 = beds.create(&NewBed { room_id }).expect("Failed to create");
        let b3 = beds.create(&NewBed { room_id }).expect("Failed to create");

        // 直接写入一条在院记录占用 b2
        let guard = conn.lock().expect("Failed to lock");
        guard
            .execute(
                "INSERT INTO admissions (bed_id, patient_id, doctor_id, admitted_at, discharged_at) \
                 VALUES (?1, 1, 1, '2026-08-01 10:00:00', NULL)",
                params![b2.id],
            )
            .expect("Failed to insert admission");
        drop(guard);

        assert!(beds.is_occupied(b2.id).expect("Failed to query"));
        assert!(!beds.is_occupied(b1.id).expect("Failed to query"));

        let free: Vec<i64> = beds
            .free_beds()
            .expect("Failed to list free beds")
            .iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(free, vec![b1.id, b3.id]);
    }

    #[test]
    fn test_delete_occupied_bed_fails_conflict() {
        let (conn, rooms, beds) = setup();
        seed_patient_and_doctor(&conn);
        let room_id = room_with_capacity(&rooms, 101, 1);
        let bed = beds.create(&NewBed { room_id }).expect("Failed to create");

        let guard = conn.lock().expect("Failed to lock");
        guard
            .execute(
                "INSERT INTO admissions (bed_id, patient_id, doctor_id, admitted_at, discharged_at) \
                 VALUES (?1, 1, 1, '2026-08-01 10:00:00', NULL)",
                params![bed.id],
            )
            .expect("Failed to insert admission");
        drop(guard);

        let err = beds.delete(bed.id).unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        // 出院后删除成功
        let guard = conn.lock().expect("Failed to lock");
        guard
            .execute(
                "UPDATE admissions SET discharged_at = '2026-08-02 09:00:00' WHERE bed_id = ?1",
                params![bed.id],
            )
            .expect("Failed to discharge");
        drop(guard);

        beds.delete(bed.id).expect("Failed to delete after discharge");
    }
}
