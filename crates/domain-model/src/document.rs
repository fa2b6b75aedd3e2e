//! 完整树文档可能有上百层目录，超出 serde_json 默认的 128 层嵌套上限。
//! 这里关闭上限，并借助 serde_stacker 在栈不足时切换到堆上分配的新栈。

use disk_report_common::DiskReportError;
use serde::de::DeserializeOwned;

/// 解析任意深度的 JSON 文档；末尾多余的内容视为格式错误
pub fn parse_unbounded<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DiskReportError> {
    let mut json = serde_json::Deserializer::from_slice(bytes);
    json.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut json))?;
    json.end()?;
    Ok(value)
}
