use std::collections::BTreeMap;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============================================================================
// 工作簿模型（由 parsers 构建，核心只读）
// ============================================================================

/// 单元格的语义值
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// 空单元格或仅含空白的文本
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 显示用字符串（文本去除首尾空白，整数不带小数点，日期为 YYYY-MM-DD）
    pub fn display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

/// 数值格式化：整数不输出小数部分
pub fn format_number(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

/// 矩形单元格区域（行列均为 0 起始的绝对坐标，含两端）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellRange {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl CellRange {
    pub fn new(start: (u32, u32), end: (u32, u32)) -> Self {
        Self {
            start_row: start.0,
            start_col: start.1,
            end_row: end.0,
            end_col: end.1,
        }
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.start_row && row <= self.end_row && col >= self.start_col && col <= self.end_col
    }
}

/// 合并单元格区域，值保存在左上角
pub type MergedRange = CellRange;

/// 单个工作表
#[derive(Debug, Clone, Default)]
pub struct SheetData {
    pub name: String,
    /// 声明的数据范围；为 None 时视为无效工作表
    pub range: Option<CellRange>,
    pub merged: Vec<MergedRange>,
    rows: Vec<Vec<CellValue>>,
}

impl SheetData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// 从 0 行 0 列开始的二维数据构建工作表，范围覆盖全部数据
    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let has_content = rows.iter().flatten().any(|cell| !cell.is_blank());
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);

        let range = if has_content && width > 0 {
            Some(CellRange::new(
                (0, 0),
                (rows.len() as u32 - 1, width as u32 - 1),
            ))
        } else {
            None
        };

        Self {
            name: name.into(),
            range,
            merged: Vec::new(),
            rows,
        }
    }

    pub fn with_merged(mut self, merged: Vec<MergedRange>) -> Self {
        self.merged = merged;
        self
    }

    /// 读取绝对坐标的单元格，越界时返回空值
    pub fn cell(&self, row: u32, col: u32) -> &CellValue {
        self.rows
            .get(row as usize)
            .and_then(|cells| cells.get(col as usize))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn set(&mut self, row: u32, col: u32, value: CellValue) {
        let (row, col) = (row as usize, col as usize);
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize_with(col + 1, CellValue::default);
        }
        cells[col] = value;
    }

    pub fn last_row(&self) -> Option<u32> {
        self.range.map(|range| range.end_row)
    }
}

/// 解析后的工作簿
#[derive(Debug, Clone, Default)]
pub struct WorkbookModel {
    pub sheets: Vec<SheetData>,
}

impl WorkbookModel {
    pub fn new(sheets: Vec<SheetData>) -> Self {
        Self { sheets }
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|sheet| sheet.name.clone()).collect()
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetData> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    pub fn sheet_at(&self, index: usize) -> Option<&SheetData> {
        self.sheets.get(index)
    }
}

/// 表头解析得到的列
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub index: u32,
    /// 非空的各级标题（自上而下）
    pub path: Vec<String>,
    pub full_path: String,
    /// 合并传播后每个表头行的原始标题（保留空串）
    pub levels: Vec<String>,
}

// ============================================================================
// 指标与汇总
// ============================================================================

/// 汇总指标
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "未炼钢")]
    Unsmelted,
    #[serde(rename = "已炼钢")]
    Smelted,
    #[serde(rename = "未轧制")]
    Unrolled,
    #[serde(rename = "已轧制")]
    Rolled,
    #[serde(rename = "未船检")]
    Uninspected,
    #[serde(rename = "已船检")]
    Inspected,
    #[serde(rename = "未集港")]
    Unstaged,
    #[serde(rename = "已集港")]
    Staged,
    #[serde(rename = "未发运")]
    Unshipped,
    #[serde(rename = "已发运")]
    Shipped,
    #[serde(rename = "成品在库")]
    InStock,
    #[serde(rename = "出库结束")]
    Outbound,
    #[serde(rename = "总订单量")]
    OrderQuantity,
}

impl Metric {
    pub const ALL: [Metric; 13] = [
        Metric::Unsmelted,
        Metric::Smelted,
        Metric::Unrolled,
        Metric::Rolled,
        Metric::Uninspected,
        Metric::Inspected,
        Metric::Unstaged,
        Metric::Staged,
        Metric::Unshipped,
        Metric::Shipped,
        Metric::InStock,
        Metric::Outbound,
        Metric::OrderQuantity,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Unsmelted => "未炼钢",
            Metric::Smelted => "已炼钢",
            Metric::Unrolled => "未轧制",
            Metric::Rolled => "已轧制",
            Metric::Uninspected => "未船检",
            Metric::Inspected => "已船检",
            Metric::Unstaged => "未集港",
            Metric::Staged => "已集港",
            Metric::Unshipped => "未发运",
            Metric::Shipped => "已发运",
            Metric::InStock => "成品在库",
            Metric::Outbound => "出库结束",
            Metric::OrderQuantity => "总订单量",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub const CONTRACT_COUNT_LABEL: &str = "合同数";

/// 保留三位小数的定点数量（以千分之一为单位）
///
/// 汇总与合并只做整数加法，因此任意顺序累加结果完全一致。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(i64);

impl Quantity {
    pub const ZERO: Quantity = Quantity(0);

    /// 四舍五入到三位小数；非有限值视为 0
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() {
            return Quantity::ZERO;
        }
        Quantity((value * 1000.0).round() as i64)
    }

    pub fn from_thousandths(value: i64) -> Self {
        Quantity(value)
    }

    pub fn thousandths(&self) -> i64 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Quantity {
        Quantity(self.0 + rhs.0)
    }
}

impl AddAssign for Quantity {
    fn add_assign(&mut self, rhs: Quantity) {
        self.0 += rhs.0;
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Quantity {
        iter.fold(Quantity::ZERO, Add::add)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_number(self.as_f64()))
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Quantity::from_f64)
    }
}

/// 某个（月份，码头）下的指标累加器
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricVector {
    #[serde(flatten)]
    pub values: BTreeMap<Metric, Quantity>,
    #[serde(rename = "合同数")]
    pub contract_count: u64,
}

impl MetricVector {
    /// 按给定指标初始化为 0
    pub fn zeroed(metrics: &[Metric]) -> Self {
        Self {
            values: metrics.iter().map(|metric| (*metric, Quantity::ZERO)).collect(),
            contract_count: 0,
        }
    }

    pub fn get(&self, metric: Metric) -> Quantity {
        self.values.get(&metric).copied().unwrap_or_default()
    }

    /// 累加一条明细记录（合同数 +1）
    pub fn add_record(&mut self, record: &FactRecord) {
        for (metric, value) in &record.metrics {
            *self.values.entry(*metric).or_default() += *value;
        }
        self.contract_count += 1;
    }

    /// 逐项累加另一个向量
    pub fn absorb(&mut self, other: &MetricVector) {
        for (metric, value) in &other.values {
            *self.values.entry(*metric).or_default() += *value;
        }
        self.contract_count += other.contract_count;
    }
}

/// 一条通过校验的数据行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactRecord {
    pub month: u8,
    pub dock: String,
    /// 来源工作表标签
    pub source: String,
    /// Excel 行号（1 起始）
    pub row: u32,
    pub metrics: BTreeMap<Metric, Quantity>,
    pub attributes: BTreeMap<String, String>,
}

impl FactRecord {
    pub fn metric(&self, metric: Metric) -> Quantity {
        self.metrics.get(&metric).copied().unwrap_or_default()
    }
}

/// 月份 → 码头 → 指标
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Summary(pub BTreeMap<u8, BTreeMap<String, MetricVector>>);

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, month: u8, dock: &str) -> Option<&MetricVector> {
        self.0.get(&month).and_then(|docks| docks.get(dock))
    }

    pub fn entry(&mut self, month: u8, dock: &str) -> &mut MetricVector {
        self.0
            .entry(month)
            .or_default()
            .entry(dock.to_string())
            .or_default()
    }

    pub fn add_record(&mut self, record: &FactRecord) {
        self.entry(record.month, &record.dock).add_record(record);
    }

    /// 把另一个汇总逐键累加进来
    pub fn absorb(&mut self, other: &Summary) {
        for (month, docks) in &other.0 {
            for (dock, vector) in docks {
                self.entry(*month, dock).absorb(vector);
            }
        }
    }

    /// 全部（月份，码头）之和
    pub fn totals(&self) -> MetricVector {
        let mut total = MetricVector::default();
        for vector in self.0.values().flat_map(BTreeMap::values) {
            total.absorb(vector);
        }
        total
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &str, &MetricVector)> {
        self.0.iter().flat_map(|(month, docks)| {
            docks
                .iter()
                .map(move |(dock, vector)| (*month, dock.as_str(), vector))
        })
    }
}

// ============================================================================
// 诊断与结果
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// 结构化诊断信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub sheet: Option<String>,
    pub row: Option<u32>,
    pub column: Option<u32>,
}

impl Diagnostic {
    pub fn warning(sheet: &str, row: Option<u32>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            sheet: Some(sheet.to_string()),
            row,
            column: None,
        }
    }

    pub fn info(sheet: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
            sheet: Some(sheet.to_string()),
            row: None,
            column: None,
        }
    }
}

/// 单个工作表的处理报告
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetReport {
    /// 方案中的工作表标签（如"营口"）
    pub label: String,
    /// 实际匹配到的工作表名
    pub sheet_name: Option<String>,
    pub rows_scanned: usize,
    pub rows_accepted: usize,
    pub rows_skipped: usize,
    /// 因月份等字段无效而跳过的行数
    pub invalid_rows: usize,
    pub diagnostics: Vec<Diagnostic>,
    pub error: Option<AppError>,
}

impl SheetReport {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    UnreadableFile,
    MalformedSheet,
    SchemaMismatch,
    NoDataProcessed,
    InvalidRowField,
    MissingSheet,
    UnknownVendor,
    Config,
    Export,
}

/// 返回给界面的结构化错误
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    /// 缺失的列或工作表
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            sheet: None,
            missing: Vec::new(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

/// 一次导入的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResult {
    pub success: bool,
    pub vendor: String,
    pub summary: Summary,
    pub details: Vec<FactRecord>,
    /// 界面展示的指标列（按声明顺序）
    pub metrics: Vec<Metric>,
    pub sheets: Vec<SheetReport>,
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<AppError>,
}

impl IngestResult {
    pub fn failure(vendor: &str, error: AppError) -> Self {
        Self {
            success: false,
            vendor: vendor.to_string(),
            summary: Summary::default(),
            details: Vec::new(),
            metrics: Vec::new(),
            sheets: Vec::new(),
            warnings: Vec::new(),
            message: Some(format!("处理失败: {}", error.message)),
            error: Some(error),
        }
    }
}
