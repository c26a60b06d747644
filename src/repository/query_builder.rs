// ==========================================
// 病区资源管理系统 - SQL 构建工具模块
// ==========================================
// 职责: 根据表名与有序列清单生成参数化 SQL 语句
// 约束: 无状态纯函数; 绑定参数顺序与列顺序一致
// 红线: 所有语句参数化, 防止 SQL 注入
// ==========================================

/// 生成 INSERT 语句
///
/// # 示例
/// ```
/// use hospital_ward::repository::query_builder;
///
/// let sql = query_builder::insert("beds", &["room_id"]);
/// assert_eq!(sql, "INSERT INTO beds (room_id) VALUES (?1)");
/// ```
pub fn insert(table: &str, cols: &[&str]) -> String {
    let placeholders: Vec<String> = (1..=cols.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        cols.join(", "),
        placeholders.join(", ")
    )
}

/// 生成 SELECT 语句，可附带等值过滤条件
///
/// 过滤条件只支持等值比较并以 AND 连接。
/// 不支持范围/OR —— 这是既有约定的限制，不要静默扩展。
///
/// # 示例
/// ```
/// use hospital_ward::repository::query_builder;
///
/// let sql = query_builder::select("beds", &["id", "room_id"], &[]);
/// assert_eq!(sql, "SELECT id, room_id FROM beds");
///
/// let sql = query_builder::select("beds", &["id", "room_id"], &["room_id"]);
/// assert_eq!(sql, "SELECT id, room_id FROM beds WHERE room_id = ?1");
/// ```
pub fn select(table: &str, cols: &[&str], filters: &[&str]) -> String {
    let mut sql = format!("SELECT {} FROM {}", cols.join(", "), table);
    if !filters.is_empty() {
        let conditions: Vec<String> = filters
            .iter()
            .enumerate()
            .map(|(i, col)| format!("{} = ?{}", col, i + 1))
            .collect();
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql
}

/// 生成 UPDATE 语句（重写全部给定列，按主键定位）
///
/// 主键绑定在最后一个参数位
pub fn update(table: &str, cols: &[&str], id_col: &str) -> String {
    let sets: Vec<String> = cols
        .iter()
        .enumerate()
        .map(|(i, col)| format!("{} = ?{}", col, i + 1))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE {} = ?{}",
        table,
        sets.join(", "),
        id_col,
        cols.len() + 1
    )
}

/// 生成 DELETE 语句（按主键定位）
pub fn delete(table: &str, id_col: &str) -> String {
    format!("DELETE FROM {} WHERE {} = ?1", table, id_col)
}

/// 生成行计数语句
pub fn count(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", table)
}

/// 生成幂等建表语句
///
/// `cols` 为 id 之外的列名，`types` 为对应的 SQL 类型（含约束），
/// 两者一一对应；id 列固定为自增主键。
pub fn create_table(table: &str, cols: &[&str], types: &[&str]) -> String {
    debug_assert_eq!(cols.len(), types.len());
    let defs: Vec<String> = cols
        .iter()
        .zip(types.iter())
        .map(|(col, ty)| format!("{} {}", col, ty))
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} (id INTEGER PRIMARY KEY AUTOINCREMENT, {})",
        table,
        defs.join(", ")
    )
}

// ==========================================
// 单元测试
// ==========================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_single_column() {
        assert_eq!(
            insert("beds", &["room_id"]),
            "INSERT INTO beds (room_id) VALUES (?1)"
        );
    }

    #[test]
    fn test_insert_multiple_columns() {
        assert_eq!(
            insert("doctors", &["name", "license_number", "specialty"]),
            "INSERT INTO doctors (name, license_number, specialty) VALUES (?1, ?2, ?3)"
        );
    }

    #[test]
    fn test_select_without_filters() {
        assert_eq!(
            select("rooms", &["id", "number", "room_type", "capacity"], &[]),
            "SELECT id, number, room_type, capacity FROM rooms"
        );
    }

    #[test]
    fn test_select_with_single_filter() {
        assert_eq!(
            select("beds", &["id", "room_id"], &["room_id"]),
            "SELECT id, room_id FROM beds WHERE room_id = ?1"
        );
    }

    #[test]
    fn test_select_with_multiple_filters_and_combined() {
        // 多个过滤条件只做 AND 等值连接
        assert_eq!(
            select("admissions", &["id", "bed_id"], &["bed_id", "patient_id"]),
            "SELECT id, bed_id FROM admissions WHERE bed_id = ?1 AND patient_id = ?2"
        );
    }

    #[test]
    fn test_update_parameter_order_matches_columns() {
        // 主键绑定在最后一个参数位
        assert_eq!(
            update("rooms", &["number", "room_type", "capacity"], "id"),
            "UPDATE rooms SET number = ?1, room_type = ?2, capacity = ?3 WHERE id = ?4"
        );
    }

    #[test]
    fn test_delete() {
        assert_eq!(delete("beds", "id"), "DELETE FROM beds WHERE id = ?1");
    }

    #[test]
    fn test_count() {
        assert_eq!(count("patients"), "SELECT COUNT(*) FROM patients");
    }

    #[test]
    fn test_create_table() {
        assert_eq!(
            create_table(
                "beds",
                &["room_id"],
                &["INTEGER NOT NULL REFERENCES rooms(id)"]
            ),
            "CREATE TABLE IF NOT EXISTS beds (id INTEGER PRIMARY KEY AUTOINCREMENT, \
             room_id INTEGER NOT NULL REFERENCES rooms(id))"
        );
    }
}
