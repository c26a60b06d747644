// ==========================================
// 病区资源管理系统 - 床位实体
// ==========================================

use serde::Serialize;

/// 床位实体
///
/// 床位引用病房（而非病房持有床位）
/// 不变量: 引用同一病房的床位数 ≤ 该病房容量
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bed {
    pub id: i64,      // 主键
    pub room_id: i64, // 所属病房
}

/// 床位草稿（不含主键，用于创建/更新）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewBed {
    pub room_id: i64,
}
