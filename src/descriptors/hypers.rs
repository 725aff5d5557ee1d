//! # 描述符超参数
//!
//! 每种描述符一个显式配置结构体：带类型的命名字段、构造时一次性
//! 校验。选项以 JSON 对象传入，经各自的允许键集合过滤，未识别的
//! 键静默丢弃（刻意的前向兼容策略，不是错误）。
//!
//! ## 依赖关系
//! - 被 `descriptors/soap.rs`、`descriptors/coulomb.rs` 使用
//! - 使用 `serde`/`serde_json` 做规范化字符串序列化

use crate::error::{AtomrepError, Result};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// SOAP 输出类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoapType {
    RadialSpectrum,
    PowerSpectrum,
}

/// 高斯展宽方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GaussianSigmaType {
    Constant,
    PerSpecies,
    Radial,
}

/// Coulomb 矩阵行排序算法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortingAlgorithm {
    RowNorm,
    Distance,
}

/// SOAP 超参数（RadialSpectrum 与 PowerSpectrum 共用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoapHypers {
    /// 展开考虑的最大成对距离
    pub interaction_cutoff: f64,
    /// 截断处平滑到零的宽度
    pub cutoff_smooth_width: f64,
    /// 径向基函数数量
    pub max_radial: usize,
    /// 展开的最高角动量 l
    pub max_angular: usize,
    /// 分开处理的物种数量
    pub n_species: usize,
    /// 高斯展宽方式
    pub gaussian_sigma_type: GaussianSigmaType,
    /// 固定展宽时的高斯宽度
    pub gaussian_sigma_constant: f64,
    /// 输出类型
    pub soap_type: SoapType,
}

/// SOAP 的允许键集合
const SOAP_ALLOWED_KEYS: [&str; 8] = [
    "interaction_cutoff",
    "cutoff_smooth_width",
    "max_radial",
    "max_angular",
    "n_species",
    "gaussian_sigma_type",
    "gaussian_sigma_constant",
    "soap_type",
];

impl SoapHypers {
    /// 从 JSON 选项对象构造
    ///
    /// 未识别的键静默丢弃；缺失的可选键取默认值
    /// (gaussian_sigma_constant = 0.5, n_species = 1,
    /// soap_type = PowerSpectrum)。
    pub fn from_options(options: &Value) -> Result<Self> {
        let map = filter_allowed(options, &SOAP_ALLOWED_KEYS)?;

        let hypers = SoapHypers {
            interaction_cutoff: require_f64(&map, "interaction_cutoff")?,
            cutoff_smooth_width: require_f64(&map, "cutoff_smooth_width")?,
            max_radial: require_usize(&map, "max_radial")?,
            max_angular: require_usize(&map, "max_angular")?,
            n_species: optional_usize(&map, "n_species")?.unwrap_or(1),
            gaussian_sigma_type: match optional_str(&map, "gaussian_sigma_type")? {
                Some(tag) => parse_sigma_type(tag)?,
                None => GaussianSigmaType::Constant,
            },
            gaussian_sigma_constant: optional_f64(&map, "gaussian_sigma_constant")?.unwrap_or(0.5),
            soap_type: match optional_str(&map, "soap_type")? {
                Some(tag) => parse_soap_type(tag)?,
                None => SoapType::PowerSpectrum,
            },
        };

        hypers.validated()
    }

    /// 校验并归一化
    ///
    /// RadialSpectrum 强制 max_angular = 0，这是显式的超参数归一化
    /// 策略，不视为用户错误。
    pub fn validated(mut self) -> Result<Self> {
        if !(self.interaction_cutoff > 0.0) {
            return Err(invalid(
                "interaction_cutoff",
                format!("must be positive, got {}", self.interaction_cutoff),
            ));
        }
        if self.cutoff_smooth_width < 0.0 {
            return Err(invalid(
                "cutoff_smooth_width",
                format!("must be non-negative, got {}", self.cutoff_smooth_width),
            ));
        }
        if self.max_radial < 1 {
            return Err(invalid("max_radial", "must be at least 1".to_string()));
        }
        if self.n_species < 1 {
            return Err(invalid("n_species", "must be at least 1".to_string()));
        }
        match self.gaussian_sigma_type {
            GaussianSigmaType::Constant => {
                if !(self.gaussian_sigma_constant > 0.0) {
                    return Err(invalid(
                        "gaussian_sigma_constant",
                        format!("must be positive, got {}", self.gaussian_sigma_constant),
                    ));
                }
            }
            GaussianSigmaType::PerSpecies | GaussianSigmaType::Radial => {
                return Err(invalid(
                    "gaussian_sigma_type",
                    "only Constant is implemented".to_string(),
                ));
            }
        }

        if self.soap_type == SoapType::RadialSpectrum {
            self.max_angular = 0;
        }

        Ok(self)
    }

    /// 每个中心的特征宽度
    pub fn n_features(&self) -> usize {
        match self.soap_type {
            SoapType::RadialSpectrum => self.n_species * self.max_radial,
            SoapType::PowerSpectrum => {
                self.n_species * self.n_species
                    * self.max_radial * self.max_radial
                    * (self.max_angular + 1)
            }
        }
    }

    /// 规范化 JSON 字符串（键名有序），用作特征集合的身份标识
    pub fn canonical_json(&self) -> Result<String> {
        canonical_json(self)
    }
}

/// Sorted Coulomb 矩阵超参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoulombHypers {
    /// 行排序算法
    pub sorting_algorithm: SortingAlgorithm,
    /// 邻居截断半径
    pub cutoff: f64,
    /// 中心原子相互作用的衰减宽度，-1 表示不衰减
    pub central_decay: f64,
    /// 非中心原子对的相互作用截断
    pub interaction_cutoff: f64,
    /// 非中心原子对的衰减宽度，-1 表示不衰减
    pub interaction_decay: f64,
    /// 填充后的矩阵尺寸；transform 时由批量尺寸预扫描重新计算
    pub size: usize,
}

/// Sorted Coulomb 的允许键集合
const COULOMB_ALLOWED_KEYS: [&str; 6] = [
    "sorting_algorithm",
    "cutoff",
    "central_decay",
    "interaction_cutoff",
    "interaction_decay",
    "size",
];

impl CoulombHypers {
    /// 从 JSON 选项对象构造
    ///
    /// 未识别的键静默丢弃；缺失的可选键取默认值
    /// (sorting_algorithm = row_norm, size = 10, central_decay = -1,
    /// interaction_cutoff = 10, interaction_decay = -1)。
    pub fn from_options(options: &Value) -> Result<Self> {
        let map = filter_allowed(options, &COULOMB_ALLOWED_KEYS)?;

        let hypers = CoulombHypers {
            sorting_algorithm: match optional_str(&map, "sorting_algorithm")? {
                Some(tag) => parse_sorting_algorithm(tag)?,
                None => SortingAlgorithm::RowNorm,
            },
            cutoff: require_f64(&map, "cutoff")?,
            central_decay: optional_f64(&map, "central_decay")?.unwrap_or(-1.0),
            interaction_cutoff: optional_f64(&map, "interaction_cutoff")?.unwrap_or(10.0),
            interaction_decay: optional_f64(&map, "interaction_decay")?.unwrap_or(-1.0),
            size: optional_usize(&map, "size")?.unwrap_or(10),
        };

        hypers.validated()
    }

    /// 校验
    pub fn validated(self) -> Result<Self> {
        if !(self.cutoff > 0.0) {
            return Err(invalid(
                "cutoff",
                format!("must be positive, got {}", self.cutoff),
            ));
        }
        if !(self.interaction_cutoff > 0.0) {
            return Err(invalid(
                "interaction_cutoff",
                format!("must be positive, got {}", self.interaction_cutoff),
            ));
        }
        if self.size < 1 {
            return Err(invalid("size", "must be at least 1".to_string()));
        }
        Ok(self)
    }

    /// 折入批量尺寸预扫描的结果，返回冻结副本
    pub fn with_size(&self, size: usize) -> Self {
        CoulombHypers {
            size,
            ..self.clone()
        }
    }

    /// 每个中心的特征宽度：填充矩阵的上三角（含对角）元素数
    pub fn n_features(&self) -> usize {
        self.size * (self.size + 1) / 2
    }

    /// 规范化 JSON 字符串（键名有序）
    pub fn canonical_json(&self) -> Result<String> {
        canonical_json(self)
    }
}

/// 按允许键集合过滤选项对象，未识别的键静默丢弃
fn filter_allowed(options: &Value, allowed: &[&str]) -> Result<Map<String, Value>> {
    let object = options
        .as_object()
        .ok_or_else(|| invalid("options", "expected a JSON object".to_string()))?;

    Ok(object
        .iter()
        .filter(|(key, _)| allowed.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect())
}

fn invalid(name: &str, reason: String) -> AtomrepError {
    AtomrepError::InvalidHyperparameter {
        name: name.to_string(),
        reason,
    }
}

fn require_f64(map: &Map<String, Value>, key: &str) -> Result<f64> {
    optional_f64(map, key)?.ok_or_else(|| invalid(key, "missing required value".to_string()))
}

fn require_usize(map: &Map<String, Value>, key: &str) -> Result<usize> {
    optional_usize(map, key)?.ok_or_else(|| invalid(key, "missing required value".to_string()))
}

fn optional_f64(map: &Map<String, Value>, key: &str) -> Result<Option<f64>> {
    match map.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| invalid(key, format!("expected a number, got {}", value))),
    }
}

fn optional_usize(map: &Map<String, Value>, key: &str) -> Result<Option<usize>> {
    match map.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .map(|v| Some(v as usize))
            .ok_or_else(|| invalid(key, format!("expected a non-negative integer, got {}", value))),
    }
}

fn optional_str<'a>(map: &'a Map<String, Value>, key: &str) -> Result<Option<&'a str>> {
    match map.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(Some)
            .ok_or_else(|| invalid(key, format!("expected a string, got {}", value))),
    }
}

fn parse_soap_type(tag: &str) -> Result<SoapType> {
    match tag {
        "RadialSpectrum" => Ok(SoapType::RadialSpectrum),
        "PowerSpectrum" => Ok(SoapType::PowerSpectrum),
        other => Err(invalid(
            "soap_type",
            format!("unsupported value '{}'", other),
        )),
    }
}

fn parse_sigma_type(tag: &str) -> Result<GaussianSigmaType> {
    match tag {
        "Constant" => Ok(GaussianSigmaType::Constant),
        "PerSpecies" => Ok(GaussianSigmaType::PerSpecies),
        "Radial" => Ok(GaussianSigmaType::Radial),
        other => Err(invalid(
            "gaussian_sigma_type",
            format!("unsupported value '{}'", other),
        )),
    }
}

fn parse_sorting_algorithm(tag: &str) -> Result<SortingAlgorithm> {
    match tag {
        "row_norm" => Ok(SortingAlgorithm::RowNorm),
        "distance" => Ok(SortingAlgorithm::Distance),
        other => Err(invalid(
            "sorting_algorithm",
            format!("unsupported value '{}'", other),
        )),
    }
}

/// 经 `serde_json::Value` 序列化，得到键名有序的规范化字符串
fn canonical_json<T: Serialize>(hypers: &T) -> Result<String> {
    let value = serde_json::to_value(hypers)?;
    Ok(serde_json::to_string(&value)?)
}
