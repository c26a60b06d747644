// ==========================================
// 病区资源管理系统 - 住院记录仓储
// ==========================================
// 职责: 管理 admissions 表与入院/出院状态机
// 状态机: Open --出院--> Closed(终态), 无其他迁移
// 约束: 记录只能经 admit 创建, 不暴露删除操作;
//       出院时间一经写入不可修改
// ==========================================

use crate::domain::{Admission, AdmissionState, DATETIME_FORMAT};
use crate::repository::bed_repo::BedRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::generic::{CrudRepository, TableSpec};
use crate::repository::query_builder;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Value;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// 住院记录草稿
///
/// 字段对 crate 外不可见: 新记录只能经 `admit` 创建,
/// 不存在绕过占用检查的通用 create 入口
pub struct NewAdmission {
    pub(crate) bed_id: i64,
    pub(crate) patient_id: i64,
    pub(crate) doctor_id: i64,
    pub(crate) admitted_at: NaiveDateTime,
}

fn parse_datetime(idx: usize, text: &str) -> SqliteResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, DATETIME_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

impl TableSpec for Admission {
    const ENTITY: &'static str = "admissions";
    const TABLE: &'static str = "admissions";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "bed_id",
        "patient_id",
        "doctor_id",
        "admitted_at",
        "discharged_at",
    ];
    const COLUMN_TYPES: &'static [&'static str] = &[
        "INTEGER NOT NULL REFERENCES beds(id)",
        "INTEGER NOT NULL REFERENCES patients(id)",
        "INTEGER NOT NULL REFERENCES doctors(id)",
        "TEXT NOT NULL",
        "TEXT",
    ];
    // 部分唯一索引: "同一床位/同一患者最多一条在院记录"的第二道防线
    const EXTRA_SCHEMA: &'static str = "\
        CREATE UNIQUE INDEX IF NOT EXISTS uq_admissions_open_bed \
          ON admissions(bed_id) WHERE discharged_at IS NULL;\n\
        CREATE UNIQUE INDEX IF NOT EXISTS uq_admissions_open_patient \
          ON admissions(patient_id) WHERE discharged_at IS NULL;\n\
        CREATE INDEX IF NOT EXISTS idx_admissions_admitted_at \
          ON admissions(admitted_at);";

    type Draft = NewAdmission;

    fn from_row(row: &Row<'_>) -> SqliteResult<Self> {
        let admitted_text: String = row.get(4)?;
        let discharged_text: Option<String> = row.get(5)?;
        let state = match discharged_text {
            None => AdmissionState::Open,
            Some(text) => AdmissionState::Closed {
                discharged_at: parse_datetime(5, &text)?,
            },
        };
        Ok(Admission {
            id: row.get(0)?,
            bed_id: row.get(1)?,
            patient_id: row.get(2)?,
            doctor_id: row.get(3)?,
            admitted_at: parse_datetime(4, &admitted_text)?,
            state,
        })
    }

    fn validate(draft: &NewAdmission) -> RepositoryResult<()> {
        if draft.bed_id <= 0 || draft.patient_id <= 0 || draft.doctor_id <= 0 {
            return Err(RepositoryError::ValidationError(
                "入院登记必须引用有效的床位/患者/医生".to_string(),
            ));
        }
        Ok(())
    }

    fn bind_values(draft: &NewAdmission) -> Vec<Value> {
        vec![
            Value::Integer(draft.bed_id),
            Value::Integer(draft.patient_id),
            Value::Integer(draft.doctor_id),
            Value::Text(draft.admitted_at.format(DATETIME_FORMAT).to_string()),
            Value::Null,
        ]
    }
}

/// 重复住院报表行: 住院次数 > 1 的患者
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepeatPatientRow {
    pub patient_id: i64,
    pub patient_name: String,
    pub admission_count: i64,
}

/// 在院明细报表行: 每条在院记录联出患者/医生/床位/病房
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccupiedBedDetail {
    pub admission_id: i64,
    pub patient_name: String,
    pub doctor_name: String,
    pub room_number: i64,
    pub bed_id: i64,
    pub admitted_at: NaiveDateTime,
}

/// 住院记录仓储
///
/// 对外不暴露删除入口; 通用 CRUD 层不对 crate 外导出,
/// 无法绕过状态机直接删改住院记录:
///
/// ```compile_fail
/// use hospital_ward::repository::generic::CrudRepository;
/// ```
pub struct AdmissionRepository {
    inner: CrudRepository<Admission>,
}

impl AdmissionRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self {
            inner: CrudRepository::new(conn),
        };
        {
            // admissions 引用 beds/patients/doctors, 按依赖序建表
            use crate::domain::{Bed, Doctor, Patient, Room};
            let guard = repo.inner.get_conn()?;
            CrudRepository::<Patient>::ensure_table_with(&guard)?;
            CrudRepository::<Doctor>::ensure_table_with(&guard)?;
            CrudRepository::<Room>::ensure_table_with(&guard)?;
            CrudRepository::<Bed>::ensure_table_with(&guard)?;
            CrudRepository::<Admission>::ensure_table_with(&guard)?;
        }
        Ok(repo)
    }

    /// 入院登记
    ///
    /// 1. 床位已被占用 → Conflict
    /// 2. 患者已有在院记录 → Conflict
    /// 3. 通过后插入 discharged_at 为 NULL 的新记录并返回
    pub fn admit(
        &self,
        bed_id: i64,
        patient_id: i64,
        doctor_id: i64,
        admitted_at: NaiveDateTime,
    ) -> RepositoryResult<Admission> {
        let conn = self.inner.get_conn()?;

        if BedRepository::is_occupied_with(&conn, bed_id)? {
            return Err(RepositoryError::Conflict(format!(
                "床位 {} 已被占用",
                bed_id
            )));
        }

        let open_for_patient: i64 = conn.query_row(
            "SELECT COUNT(*) FROM admissions WHERE patient_id = ?1 AND discharged_at IS NULL",
            params![patient_id],
            |row| row.get(0),
        )?;
        if open_for_patient > 0 {
            return Err(RepositoryError::Conflict(format!(
                "患者 {} 已有未出院的住院记录",
                patient_id
            )));
        }

        let draft = NewAdmission {
            bed_id,
            patient_id,
            doctor_id,
            admitted_at,
        };
        let admission = CrudRepository::<Admission>::insert_with(&conn, &draft)?;
        tracing::debug!(
            "入院登记完成: admission={}, bed={}, patient={}",
            admission.id,
            bed_id,
            patient_id
        );
        Ok(admission)
    }

    /// 出院
    ///
    /// 1. 记录不存在 → NotFound
    /// 2. 已出院 → Conflict (终态, 不可重复出院)
    /// 3. 出院时间早于入院时间 → InvalidTemporalOrder
    pub fn discharge(
        &self,
        admission_id: i64,
        discharged_at: NaiveDateTime,
    ) -> RepositoryResult<Admission> {
        let conn = self.inner.get_conn()?;

        let admission = CrudRepository::<Admission>::fetch_one_with(&conn, admission_id)?.ok_or(
            RepositoryError::NotFound {
                entity: "admissions",
                id: admission_id,
            },
        )?;

        if !admission.is_open() {
            return Err(RepositoryError::Conflict(format!(
                "住院记录 {} 已出院, 不可重复出院",
                admission_id
            )));
        }

        if discharged_at < admission.admitted_at {
            return Err(RepositoryError::InvalidTemporalOrder {
                admitted_at: admission.admitted_at,
                discharged_at,
            });
        }

        conn.execute(
            "UPDATE admissions SET discharged_at = ?1 WHERE id = ?2",
            params![discharged_at.format(DATETIME_FORMAT).to_string(), admission_id],
        )?;

        CrudRepository::<Admission>::fetch_one_with(&conn, admission_id)?.ok_or(
            RepositoryError::NotFound {
                entity: "admissions",
                id: admission_id,
            },
        )
    }

    /// 按主键查找
    pub fn get_one(&self, id: i64) -> RepositoryResult<Option<Admission>> {
        self.inner.get_one(id)
    }

    // ==========================================
    // 只读报表 (无不变量检查)
    // ==========================================

    /// 全部在院记录, 按入院时间升序
    pub fn open_admissions(&self) -> RepositoryResult<Vec<Admission>> {
        self.query_admissions(
            "WHERE discharged_at IS NULL ORDER BY admitted_at ASC",
            params![],
        )
    }

    /// 某医生名下的住院记录, 按入院时间升序
    pub fn admissions_by_doctor(&self, doctor_id: i64) -> RepositoryResult<Vec<Admission>> {
        self.query_admissions(
            "WHERE doctor_id = ?1 ORDER BY admitted_at ASC",
            params![doctor_id],
        )
    }

    /// 入院日期落在 [start, end] 的记录（两端均含）
    pub fn admissions_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<Admission>> {
        self.query_admissions(
            "WHERE date(admitted_at) BETWEEN ?1 AND ?2 ORDER BY admitted_at ASC",
            params![start, end],
        )
    }

    /// 出院日期落在 [start, end] 的记录（两端均含, 在院记录不计）
    pub fn discharges_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<Admission>> {
        self.query_admissions(
            "WHERE discharged_at IS NOT NULL \
             AND date(discharged_at) BETWEEN ?1 AND ?2 \
             ORDER BY discharged_at ASC",
            params![start, end],
        )
    }

    /// 住院次数 > 1 的患者, 按次数降序（同次数按患者 id 升序, 保证报表稳定）
    pub fn patients_with_multiple_admissions(&self) -> RepositoryResult<Vec<RepeatPatientRow>> {
        let conn = self.inner.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT a.patient_id, p.name, COUNT(*) AS admission_count
            FROM admissions a
            JOIN patients p ON p.id = a.patient_id
            GROUP BY a.patient_id
            HAVING admission_count > 1
            ORDER BY admission_count DESC, a.patient_id ASC
            "#,
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(RepeatPatientRow {
                    patient_id: row.get(0)?,
                    patient_name: row.get(1)?,
                    admission_count: row.get(2)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 当前在院人数 (= 在院记录数)
    pub fn current_occupancy_count(&self) -> RepositoryResult<i64> {
        let conn = self.inner.get_conn()?;
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM admissions WHERE discharged_at IS NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    /// 在院明细: 每条在院记录联出患者/医生/床位/病房,
    /// 按房间号、床位 id、入院时间排序
    pub fn occupied_bed_detail(&self) -> RepositoryResult<Vec<OccupiedBedDetail>> {
        let conn = self.inner.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT a.id, p.name, d.name, r.number, b.id, a.admitted_at
            FROM admissions a
            JOIN beds b ON b.id = a.bed_id
            JOIN rooms r ON r.id = b.room_id
            JOIN patients p ON p.id = a.patient_id
            JOIN doctors d ON d.id = a.doctor_id
            WHERE a.discharged_at IS NULL
            ORDER BY r.number ASC, b.id ASC, a.admitted_at ASC
            "#,
        )?;
        let rows = stmt
            .query_map([], |row| {
                let admitted_text: String = row.get(5)?;
                Ok(OccupiedBedDetail {
                    admission_id: row.get(0)?,
                    patient_name: row.get(1)?,
                    doctor_name: row.get(2)?,
                    room_number: row.get(3)?,
                    bed_id: row.get(4)?,
                    admitted_at: parse_datetime(5, &admitted_text)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    fn query_admissions<P: rusqlite::Params>(
        &self,
        clause: &str,
        params: P,
    ) -> RepositoryResult<Vec<Admission>> {
        let conn = self.inner.get_conn()?;
        let sql = format!(
            "{} {}",
            query_builder::select(Admission::TABLE, Admission::COLUMNS, &[]),
            clause
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params, |row| Admission::from_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }
}
