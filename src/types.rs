//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// レコードのフィールド名（スプレッドシートのヘッダー名と一致）
pub const RECORD_FIELDS: [&str; 10] = [
    "policyNumber",
    "policyHolderName",
    "address",
    "phone",
    "email",
    "policyCost1",
    "price1",
    "policyCost2",
    "price2",
    "dueDate",
];

/// 生成時に算出される派生フィールド名
pub const TOTAL_COST_FIELD: &str = "totalCost";

/// フィールドの値を表す列挙型
///
/// スプレッドシートのセル値をそのままの型で保持します。
/// JSONでは文字列・数値・真偽値として表現されます。
/// 小数部のない数値は整数として出力されます（`100.0` → `100`）。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// 数値
    Number(f64),

    /// 文字列
    Text(String),

    /// 論理値
    Bool(bool),
}

impl FieldValue {
    /// 数値への変換
    ///
    /// - 数値はそのまま、論理値は1/0
    /// - 文字列は前後の空白を除いて解析し、空文字列は0
    /// - 解析できない、または有限でない場合は`None`
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n).filter(|n| n.is_finite()),
            FieldValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            FieldValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Some(0.0);
                }
                trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
            }
        }
    }

    /// テンプレートへ埋め込む文字列表現
    pub fn render(&self) -> String {
        match self {
            FieldValue::Number(n) => crate::formatter::format_number(*n),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Bool(b) => b.to_string(),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Number(n) => match crate::formatter::whole_number(*n) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

/// スプレッドシートの1行から抽出された保険契約レコード
///
/// 各フィールドは省略可能で、空セルや列の欠落は`None`になります。
/// 値の型や内容は変換しません。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_number: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_holder_name: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_cost1: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price1: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_cost2: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price2: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<FieldValue>,
}

impl PolicyRecord {
    /// フィールド名（ヘッダー名）で値を取得
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.slot(name).and_then(|slot| slot.as_ref())
    }

    /// フィールド名（ヘッダー名）で値を設定
    ///
    /// レコードに存在しない名前の場合は`false`を返し、何も変更しません。
    pub fn set(&mut self, name: &str, value: Option<FieldValue>) -> bool {
        match self.slot_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// 合計金額（price1 + price2）
    ///
    /// どちらかが数値に変換できない場合は`None`。
    pub fn total_cost(&self) -> Option<f64> {
        let price1 = self.price1.as_ref()?.as_number()?;
        let price2 = self.price2.as_ref()?.as_number()?;
        Some(price1 + price2)
    }

    /// テンプレートに渡す置換データ（10フィールド + totalCost）を構築
    pub fn template_data(&self) -> TemplateData {
        let mut values = BTreeMap::new();
        for name in RECORD_FIELDS {
            let rendered = self.get(name).map(FieldValue::render).unwrap_or_default();
            values.insert(name.to_string(), rendered);
        }
        let total = self
            .total_cost()
            .map(crate::formatter::format_number)
            .unwrap_or_default();
        values.insert(TOTAL_COST_FIELD.to_string(), total);
        TemplateData { values }
    }

    /// 整形済みJSON（アップロード済みデータの表示用）
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    fn slot(&self, name: &str) -> Option<&Option<FieldValue>> {
        Some(match name {
            "policyNumber" => &self.policy_number,
            "policyHolderName" => &self.policy_holder_name,
            "address" => &self.address,
            "phone" => &self.phone,
            "email" => &self.email,
            "policyCost1" => &self.policy_cost1,
            "price1" => &self.price1,
            "policyCost2" => &self.policy_cost2,
            "price2" => &self.price2,
            "dueDate" => &self.due_date,
            _ => return None,
        })
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Option<FieldValue>> {
        Some(match name {
            "policyNumber" => &mut self.policy_number,
            "policyHolderName" => &mut self.policy_holder_name,
            "address" => &mut self.address,
            "phone" => &mut self.phone,
            "email" => &mut self.email,
            "policyCost1" => &mut self.policy_cost1,
            "price1" => &mut self.price1,
            "policyCost2" => &mut self.policy_cost2,
            "price2" => &mut self.price2,
            "dueDate" => &mut self.due_date,
            _ => return None,
        })
    }
}

/// プレースホルダー名 -> 置換文字列 のマッピング
///
/// 値が存在しないタグは空文字列として展開されます。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateData {
    values: BTreeMap<String, String>,
}

impl TemplateData {
    /// 空の置換データを生成
    pub fn new() -> Self {
        Self::default()
    }

    /// 値を設定
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// タグ名に対応する値を取得
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// 登録済みのタグ名一覧
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}
