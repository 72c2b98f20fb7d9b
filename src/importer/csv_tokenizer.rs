// ==========================================
// PlantX 运维智能中台 - CSV 行切分
// ==========================================
// 职责: 原始文本 → 行 → 字段
// 规则:
// - 按 '\n' 切行，去掉行尾 '\r'，空白行忽略
// - 双引号切换“引号内”状态且不保留；逗号仅在引号外分隔
// - 字段首尾同时带引号时各去掉一个
// 已知限制: 引号内的 "" 转义不做处理
// ==========================================

/// 切分为非空行
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .collect()
}

/// 切分单行为字段
pub fn tokenize_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);

    fields.into_iter().map(strip_outer_quotes).collect()
}

fn strip_outer_quotes(field: String) -> String {
    if field.len() >= 2 && field.starts_with('"') && field.ends_with('"') {
        field[1..field.len() - 1].to_string()
    } else {
        field
    }
}
