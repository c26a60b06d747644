// ==========================================
// 病区资源管理系统 - 仓储层错误类型
// ==========================================
// 约定: 每条被违反的不变量立即以唯一一个类型化错误失败,
//       且不产生任何部分写入 (先检查后写入)
// 工具: thiserror 派生宏
// ==========================================

use chrono::NaiveDateTime;
use thiserror::Error;

/// 仓储层错误类型
///
/// 错误的 Display 文本会被协作的界面层直接展示给用户
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 业务不变量错误 =====
    #[error("记录未找到: {entity} id={id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("唯一键冲突 ({entity}.{field}): {message}")]
    DuplicateKey {
        entity: &'static str,
        field: &'static str,
        message: String,
    },

    #[error("病房容量已满: room_id={room_id}, capacity={capacity}")]
    CapacityExceeded { room_id: i64, capacity: i64 },

    #[error("状态冲突: {0}")]
    Conflict(String),

    #[error("时间顺序无效: 出院时间 {discharged_at} 早于入院时间 {admitted_at}")]
    InvalidTemporalOrder {
        admitted_at: NaiveDateTime,
        discharged_at: NaiveDateTime,
    },

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ===== 数据库错误 =====
    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    #[error("外键约束违反: {0}")]
    ForeignKeyViolation(String),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<rusqlite::Error>
//
// 存储级约束是不变量的第二道防线:
// - uq_doctors_license     → DuplicateKey (执业证号唯一)
// - uq_admissions_open_*   → Conflict (床位/患者已有在院记录)
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("uq_doctors_license") {
                    RepositoryError::DuplicateKey {
                        entity: "doctors",
                        field: "license_number",
                        message: msg,
                    }
                } else if msg.contains("uq_admissions_open") {
                    RepositoryError::Conflict(msg)
                } else if msg.contains("UNIQUE") {
                    RepositoryError::DuplicateKey {
                        entity: "unknown",
                        field: "unknown",
                        message: msg,
                    }
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
