// ==========================================
// 病区资源管理系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免"部分模块外键开启/部分不开启"
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 连接打开一次，由全部仓储通过 Arc<Mutex<Connection>> 共享
// ==========================================

use crate::domain::{Admission, Bed, Doctor, Patient, Room};
use crate::repository::error::RepositoryResult;
use crate::repository::generic::CrudRepository;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 默认数据库文件名（沿用既有系统的库名）
pub const DEFAULT_DB_FILE: &str = "nosocomio.db";

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明:
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 打开共享连接句柄（仓储层的注入入口）
pub fn open_shared_connection(db_path: &str) -> rusqlite::Result<Arc<Mutex<Connection>>> {
    Ok(Arc::new(Mutex::new(open_sqlite_connection(db_path)?)))
}

/// 打开内存库的共享连接句柄（测试用）
pub fn open_shared_in_memory() -> rusqlite::Result<Arc<Mutex<Connection>>> {
    let conn = Connection::open_in_memory()?;
    configure_sqlite_connection(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// 按依赖序创建全部表（幂等; 范围内唯一的 schema 设施）
pub fn ensure_schema(conn: &Connection) -> RepositoryResult<()> {
    CrudRepository::<Patient>::ensure_table_with(conn)?;
    CrudRepository::<Doctor>::ensure_table_with(conn)?;
    CrudRepository::<Room>::ensure_table_with(conn)?;
    CrudRepository::<Bed>::ensure_table_with(conn)?;
    CrudRepository::<Admission>::ensure_table_with(conn)?;
    Ok(())
}

/// 默认数据库路径: <用户数据目录>/hospital-ward/nosocomio.db
///
/// 数据目录不可用时回退到当前目录
pub fn default_db_path() -> String {
    let mut dir: PathBuf = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.push("hospital-ward");
    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::warn!("创建数据目录失败, 回退到当前目录: {}", e);
        dir = PathBuf::from(".");
    }
    dir.push(DEFAULT_DB_FILE);
    dir.to_string_lossy().into_owned()
}
