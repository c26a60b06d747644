// ==========================================
// 病区资源管理系统 - 通用 CRUD 仓储
// ==========================================
// 职责: 按实体的表描述符提供统一的增删改查
// 说明: 具体仓储在此之上叠加各自的不变量校验
//       (容量/占用/唯一键), 本层不含业务规则
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::query_builder;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Result as SqliteResult, Row};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard};

/// 表描述符
///
/// 每个实体显式声明表名、有序列清单与行映射，
/// 取代运行期反射; 行映射按声明的列顺序做位置解码，
/// 绑定参数顺序与列顺序一致（与 QueryBuilder 生成的语句对应）。
pub trait TableSpec: Sized {
    /// 实体名（用于错误信息）
    const ENTITY: &'static str;

    /// 表名
    const TABLE: &'static str;

    /// 全部列，首列必须为 id
    const COLUMNS: &'static [&'static str];

    /// 非 id 列的 SQL 类型（与 COLUMNS[1..] 一一对应）
    const COLUMN_TYPES: &'static [&'static str];

    /// 附加 schema（索引/唯一约束），无则为空串
    const EXTRA_SCHEMA: &'static str = "";

    /// 草稿类型: 不含 id 的全部列值
    type Draft;

    /// 按列顺序做位置映射
    fn from_row(row: &Row<'_>) -> SqliteResult<Self>;

    /// 草稿校验（非法输入返回 ValidationError）
    fn validate(draft: &Self::Draft) -> RepositoryResult<()>;

    /// 草稿编码为绑定参数（顺序与 COLUMNS[1..] 一致）
    fn bind_values(draft: &Self::Draft) -> Vec<Value>;
}

/// 通用仓储
///
/// 持有注入的共享连接句柄（无全局状态）。
/// 带 `_with` 后缀的关联函数接受已持有的连接，
/// 供具体仓储在单次加锁内完成"检查 + 写入"序列。
pub struct CrudRepository<T: TableSpec> {
    conn: Arc<Mutex<Connection>>,
    _entity: PhantomData<T>,
}

impl<T: TableSpec> CrudRepository<T> {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            conn,
            _entity: PhantomData,
        }
    }

    pub(crate) fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 确保表存在（幂等）
    pub fn ensure_table(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::ensure_table_with(&conn)
    }

    pub(crate) fn ensure_table_with(conn: &Connection) -> RepositoryResult<()> {
        let mut batch = query_builder::create_table(T::TABLE, &T::COLUMNS[1..], T::COLUMN_TYPES);
        batch.push(';');
        if !T::EXTRA_SCHEMA.is_empty() {
            batch.push('\n');
            batch.push_str(T::EXTRA_SCHEMA);
        }
        conn.execute_batch(&batch)?;
        Ok(())
    }

    /// 创建: 插入后按自增主键重查并返回完整实体
    /// （带回数据库侧的默认值与规范化结果）
    pub fn create(&self, draft: &T::Draft) -> RepositoryResult<T> {
        let conn = self.get_conn()?;
        Self::insert_with(&conn, draft)
    }

    pub(crate) fn insert_with(conn: &Connection, draft: &T::Draft) -> RepositoryResult<T> {
        T::validate(draft)?;
        let sql = query_builder::insert(T::TABLE, &T::COLUMNS[1..]);
        conn.execute(&sql, params_from_iter(T::bind_values(draft)))?;
        let id = conn.last_insert_rowid();
        Self::fetch_one_with(conn, id)?.ok_or(RepositoryError::NotFound {
            entity: T::ENTITY,
            id,
        })
    }

    /// 按主键查找; 记录不存在返回 None（不是错误）
    pub fn get_one(&self, id: i64) -> RepositoryResult<Option<T>> {
        let conn = self.get_conn()?;
        Self::fetch_one_with(&conn, id)
    }

    pub(crate) fn fetch_one_with(conn: &Connection, id: i64) -> RepositoryResult<Option<T>> {
        let sql = query_builder::select(T::TABLE, T::COLUMNS, &["id"]);
        let mut stmt = conn.prepare(&sql)?;
        match stmt.query_row([id], |row| T::from_row(row)) {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 全表列出（存储插入顺序，无隐含排序保证）
    pub fn list(&self) -> RepositoryResult<Vec<T>> {
        let conn = self.get_conn()?;
        let sql = query_builder::select(T::TABLE, T::COLUMNS, &[]);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| T::from_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 等值过滤（多条件以 AND 连接）
    pub fn filter(&self, conditions: &[(&str, Value)]) -> RepositoryResult<Vec<T>> {
        let conn = self.get_conn()?;
        let cols: Vec<&str> = conditions.iter().map(|(col, _)| *col).collect();
        let values: Vec<Value> = conditions.iter().map(|(_, v)| v.clone()).collect();
        let sql = query_builder::select(T::TABLE, T::COLUMNS, &cols);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values), |row| T::from_row(row))?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 更新: 重写全部非 id 列后重查返回
    pub fn update(&self, id: i64, draft: &T::Draft) -> RepositoryResult<T> {
        let conn = self.get_conn()?;
        Self::update_with(&conn, id, draft)
    }

    pub(crate) fn update_with(conn: &Connection, id: i64, draft: &T::Draft) -> RepositoryResult<T> {
        T::validate(draft)?;
        let sql = query_builder::update(T::TABLE, &T::COLUMNS[1..], "id");
        let mut values = T::bind_values(draft);
        values.push(Value::Integer(id));
        let affected = conn.execute(&sql, params_from_iter(values))?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: T::ENTITY,
                id,
            });
        }
        Self::fetch_one_with(conn, id)?.ok_or(RepositoryError::NotFound {
            entity: T::ENTITY,
            id,
        })
    }

    /// 删除; 记录不存在返回 NotFound
    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::delete_with(&conn, id)
    }

    pub(crate) fn delete_with(conn: &Connection, id: i64) -> RepositoryResult<()> {
        let sql = query_builder::delete(T::TABLE, "id");
        let affected = conn.execute(&sql, [id])?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: T::ENTITY,
                id,
            });
        }
        Ok(())
    }

    /// 行计数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let sql = query_builder::count(T::TABLE);
        let n: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(n)
    }
}
