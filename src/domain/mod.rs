// ==========================================
// 病区资源管理系统 - 领域模型层
// ==========================================
// 职责: 定义病区领域实体(患者/医生/病房/床位/住院)
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod admission;
pub mod bed;
pub mod doctor;
pub mod patient;
pub mod room;

// 重导出核心实体
pub use admission::{Admission, AdmissionState};
pub use bed::{Bed, NewBed};
pub use doctor::{Doctor, NewDoctor};
pub use patient::{NewPatient, Patient};
pub use room::{NewRoom, Room};

/// 时间戳的存储格式（SQLite TEXT 列）
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
