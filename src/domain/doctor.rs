// ==========================================
// 病区资源管理系统 - 医生实体
// ==========================================

use serde::Serialize;

/// 医生实体
///
/// 不变量: 执业证号在全体医生中唯一
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Doctor {
    pub id: i64,             // 主键
    pub name: String,        // 姓名
    pub license_number: i64, // 执业证号
    pub specialty: String,   // 专科
}

/// 医生草稿（不含主键，用于创建/更新）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewDoctor {
    pub name: String,
    pub license_number: i64,
    pub specialty: String,
}
