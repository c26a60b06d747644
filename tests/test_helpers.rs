// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供集成测试所需的临时数据库与基础数据
// ==========================================

use hospital_ward::db;
use hospital_ward::domain::{NewDoctor, NewPatient, NewRoom};
use hospital_ward::repository::WardRepositories;
use rusqlite::Connection;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - Arc<Mutex<Connection>>: 已配置好 PRAGMA 的共享连接
pub fn create_test_db() -> Result<(NamedTempFile, Arc<Mutex<Connection>>), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("temp path is not valid utf-8")?
        .to_string();

    let conn = db::open_shared_connection(&db_path)?;
    {
        let guard = conn.lock().map_err(|e| e.to_string())?;
        db::ensure_schema(&guard)?;
    }
    Ok((temp_file, conn))
}

/// 插入基础主数据: 一间双人病房、两名患者、一名医生
///
/// # 返回
/// - (room_id, patient_ids, doctor_id)
pub fn insert_base_data(
    repos: &WardRepositories,
) -> Result<(i64, Vec<i64>, i64), Box<dyn Error>> {
    let room = repos.rooms.create(&NewRoom {
        number: 101,
        room_type: "Común".to_string(),
        capacity: 2,
    })?;

    let mut patient_ids = Vec::new();
    for (name, insurer, member) in [
        ("García, Ana", "OSDE", "61-339401-2"),
        ("Pérez, Juan", "PAMI", "20-114532-8"),
    ] {
        let patient = repos.patients.create(&NewPatient {
            name: name.to_string(),
            insurer: insurer.to_string(),
            member_number: member.to_string(),
            address: "Av. Rivadavia 2100".to_string(),
            phone: "011-4952-0000".to_string(),
        })?;
        patient_ids.push(patient.id);
    }

    let doctor = repos.doctors.create(&NewDoctor {
        name: "House".to_string(),
        license_number: 10221,
        specialty: "Diagnóstico".to_string(),
    })?;

    Ok((room.id, patient_ids, doctor.id))
}
