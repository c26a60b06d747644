// ==========================================
// 病区资源管理系统 - 病房实体
// ==========================================

use serde::Serialize;

/// 病房实体
///
/// capacity 为正整数，表示该病房可容纳的最大床位数
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Room {
    pub id: i64,           // 主键
    pub number: i64,       // 房间号
    pub room_type: String, // 房型
    pub capacity: i64,     // 容量（最大床位数）
}

/// 病房草稿（不含主键，用于创建/更新）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRoom {
    pub number: i64,
    pub room_type: String,
    pub capacity: i64,
}
