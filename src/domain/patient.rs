// ==========================================
// 病区资源管理系统 - 患者实体
// ==========================================

use serde::Serialize;

/// 患者实体
///
/// 除主键外无唯一性不变量
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Patient {
    pub id: i64,               // 主键
    pub name: String,          // 姓名
    pub insurer: String,       // 医保机构
    pub member_number: String, // 医保会员号
    pub address: String,       // 住址
    pub phone: String,         // 联系电话
}

/// 患者草稿（不含主键，用于创建/更新）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPatient {
    pub name: String,
    pub insurer: String,
    pub member_number: String,
    pub address: String,
    pub phone: String,
}
