// ==========================================
// 病区资源管理系统 - 仓储层
// ==========================================
// 分层: QueryBuilder(纯 SQL 生成) → 通用 CRUD → 具体仓储(不变量)
// 所有仓储共享同一个注入的连接句柄
// ==========================================

pub mod admission_repo;
pub mod bed_repo;
pub mod doctor_repo;
pub mod error;
// 通用 CRUD 层仅限 crate 内部使用:
// 对外只暴露带不变量检查的具体仓储, 不留绕过删改的入口
pub(crate) mod generic;
pub mod patient_repo;
pub mod query_builder;
pub mod room_repo;

pub use admission_repo::{AdmissionRepository, OccupiedBedDetail, RepeatPatientRow};
pub use bed_repo::BedRepository;
pub use doctor_repo::DoctorRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use patient_repo::PatientRepository;
pub use room_repo::RoomRepository;

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// 仓储聚合
///
/// 应用启动时构造一次, 各仓储共享同一连接句柄;
/// 构造过程按依赖序确保全部表存在
pub struct WardRepositories {
    pub patients: PatientRepository,
    pub doctors: DoctorRepository,
    pub rooms: RoomRepository,
    pub beds: BedRepository,
    pub admissions: AdmissionRepository,
}

impl WardRepositories {
    pub fn new(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::ensure_schema(&guard)?;
        }
        Ok(Self {
            patients: PatientRepository::new(conn.clone())?,
            doctors: DoctorRepository::new(conn.clone())?,
            rooms: RoomRepository::new(conn.clone())?,
            beds: BedRepository::new(conn.clone())?,
            admissions: AdmissionRepository::new(conn)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_shared_in_memory;

    #[test]
    fn test_aggregate_shares_one_connection() {
        let conn = open_shared_in_memory().expect("Failed to open in-memory db");
        let repos = WardRepositories::new(conn).expect("Failed to build repositories");

        // 同一句柄上的两个仓储看到同一份数据
        let room = repos
            .rooms
            .create(&crate::domain::NewRoom {
                number: 101,
                room_type: "Común".to_string(),
                capacity: 1,
            })
            .expect("Failed to create room");
        repos
            .beds
            .create(&crate::domain::NewBed { room_id: room.id })
            .expect("Failed to create bed");

        assert_eq!(repos.beds.count_in_room(room.id).expect("count"), 1);
    }

    #[test]
    fn test_construction_is_idempotent() {
        let conn = open_shared_in_memory().expect("Failed to open in-memory db");
        WardRepositories::new(conn.clone()).expect("first construction");
        WardRepositories::new(conn).expect("second construction on same db");
    }
}
