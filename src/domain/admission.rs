// ==========================================
// 病区资源管理系统 - 住院记录实体
// ==========================================
// 说明: 一条住院记录对应一次完整的住院过程
//       (入院占用某张床位, 直到出院)
// ==========================================

use chrono::NaiveDateTime;
use serde::Serialize;

/// 住院状态
///
/// 唯一的状态迁移是 Open → Closed（出院）。
/// 出院时间作为 Closed 变体的数据携带，
/// 已出院的记录在类型上不存在"重新开放"的表示。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdmissionState {
    /// 在院（未出院）
    Open,
    /// 已出院（终态）
    Closed { discharged_at: NaiveDateTime },
}

impl AdmissionState {
    pub fn is_open(&self) -> bool {
        matches!(self, AdmissionState::Open)
    }

    pub fn discharged_at(&self) -> Option<NaiveDateTime> {
        match self {
            AdmissionState::Open => None,
            AdmissionState::Closed { discharged_at } => Some(*discharged_at),
        }
    }
}

/// 住院记录实体
///
/// 不变量:
/// - 同一床位最多一条 Open 记录
/// - 同一患者最多一条 Open 记录
/// - 出院时间 ≥ 入院时间，且一经写入不可修改
/// - 记录只增不删（出院后保留为历史）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Admission {
    pub id: i64,                    // 主键
    pub bed_id: i64,                // 占用床位
    pub patient_id: i64,            // 患者
    pub doctor_id: i64,             // 主治医生
    pub admitted_at: NaiveDateTime, // 入院时间
    pub state: AdmissionState,      // 在院/已出院
}

impl Admission {
    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }
}
