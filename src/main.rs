// ==========================================
// 病区资源管理系统 - 可执行入口
// ==========================================
// 职责: 初始化日志, 打开数据库, 确保 schema,
//       输出一份在院概况后退出 (交互界面由协作层提供)
// ==========================================

use anyhow::Context;
use hospital_ward::db;
use hospital_ward::logging;
use hospital_ward::repository::WardRepositories;

fn main() -> anyhow::Result<()> {
    logging::init();
    tracing::info!("病区资源管理系统启动");

    let db_path = db::default_db_path();
    tracing::info!("数据库路径: {}", db_path);

    let conn = db::open_shared_connection(&db_path)
        .with_context(|| format!("打开数据库失败: {}", db_path))?;
    let repos = WardRepositories::new(conn).context("初始化仓储失败")?;

    let occupancy = repos.admissions.current_occupancy_count()?;
    let free_beds = repos.beds.free_beds()?;
    tracing::info!(
        "在院人数: {}, 空闲床位: {}",
        occupancy,
        free_beds.len()
    );

    let detail = repos.admissions.occupied_bed_detail()?;
    if !detail.is_empty() {
        let summary = serde_json::to_string_pretty(&detail).context("序列化在院明细失败")?;
        tracing::info!("在院明细:\n{}", summary);
    }

    Ok(())
}
