use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::air::duct_sizing::DuctType;
use crate::air::vav_box::VavAirflowSchedule;
use crate::material_db::{FittingKind, PipeMaterial};
use crate::water::pump_head::FittingEntry;

/// 기본 설정 파일 경로 (실행 디렉터리 기준).
pub const CONFIG_FILE: &str = "config.toml";

/// 덕트 계산기 초기 입력값.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuctDefaults {
    pub flow_rate_m3_per_h: f64,
    pub velocity_m_per_s: f64,
    pub duct_type: DuctType,
    pub aspect_ratio: f64,
}

impl Default for DuctDefaults {
    fn default() -> Self {
        Self {
            flow_rate_m3_per_h: 1000.0,
            velocity_m_per_s: 5.0,
            duct_type: DuctType::Round,
            aspect_ratio: 1.5,
        }
    }
}

/// 배관 계산기 초기 입력값.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipeDefaults {
    pub flow_rate_l_per_s: f64,
    pub velocity_m_per_s: f64,
    pub material: PipeMaterial,
}

impl Default for PipeDefaults {
    fn default() -> Self {
        Self {
            flow_rate_l_per_s: 2.5,
            velocity_m_per_s: 1.5,
            material: PipeMaterial::Pvc,
        }
    }
}

/// VAV 계산기 초기 입력값.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VavDefaults {
    pub schedule: VavAirflowSchedule,
    pub static_pressure_in_wg: f64,
}

impl Default for VavDefaults {
    fn default() -> Self {
        Self {
            schedule: VavAirflowSchedule::default(),
            static_pressure_in_wg: 1.0,
        }
    }
}

/// 펌프 양정 계산기 초기 입력값.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PumpDefaults {
    pub flow_rate_l_per_s: f64,
    pub pipe_length_m: f64,
    pub pipe_size_mm: f64,
    pub material: PipeMaterial,
    pub fittings: Vec<FittingEntry>,
}

impl Default for PumpDefaults {
    fn default() -> Self {
        Self {
            flow_rate_l_per_s: 2.5,
            pipe_length_m: 50.0,
            pipe_size_mm: 25.0,
            material: PipeMaterial::Copper,
            fittings: vec![
                FittingEntry {
                    id: 1,
                    kind: FittingKind::Elbow90,
                    count: 4,
                },
                FittingEntry {
                    id: 2,
                    kind: FittingKind::CheckValve,
                    count: 1,
                },
            ],
        }
    }
}

/// 애플리케이션 설정을 표현한다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 언어 코드 (auto/ko/en-us ...)
    pub language: String,
    /// 사용자 언어팩 디렉터리. 없으면 locales/ 와 내장 팩을 쓴다.
    pub language_pack_dir: Option<String>,
    /// true면 0 이하 유속 등 비물리적 입력을 계산 전에 거부한다.
    pub strict_input: bool,
    pub window_alpha: f32,
    pub duct: DuctDefaults,
    pub pipe: PipeDefaults,
    pub vav: VavDefaults,
    pub pump: PumpDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "auto".to_string(),
            language_pack_dir: None,
            strict_input: false,
            window_alpha: 1.0,
            duct: DuctDefaults::default(),
            pipe: PipeDefaults::default(),
            vav: VavDefaults::default(),
            pump: PumpDefaults::default(),
        }
    }
}

/// 설정 로드/저장 시 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("파일 입출력 오류: {0}")]
    Io(#[from] std::io::Error),
    #[error("설정 파싱 오류: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("설정 직렬화 오류: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// config.toml을 로드하거나 없으면 기본 설정을 생성한다.
pub fn load_or_default() -> Result<Config, ConfigError> {
    load_or_create(Path::new(CONFIG_FILE))
}

/// 지정 경로의 설정을 읽는다. 파일이 없으면 기본값을 저장하고 돌려준다.
pub fn load_or_create(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        let content = fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), "config loaded");
        Ok(cfg)
    } else {
        let cfg = Config::default();
        save_to(&cfg, path)?;
        tracing::info!(path = %path.display(), "default config created");
        Ok(cfg)
    }
}

fn save_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(cfg)?;
    fs::write(path, content)?;
    Ok(())
}

impl Config {
    /// 설정을 config.toml에 저장한다.
    pub fn save(&self) -> Result<(), ConfigError> {
        save_to(self, Path::new(CONFIG_FILE))
    }

    pub fn save_as(&self, path: &Path) -> Result<(), ConfigError> {
        save_to(self, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mirror_calculator_forms() {
        let cfg = Config::default();
        assert_eq!(cfg.duct.flow_rate_m3_per_h, 1000.0);
        assert_eq!(cfg.pipe.material, PipeMaterial::Pvc);
        assert_eq!(cfg.vav.schedule.turndown_pct, 25.0);
        assert_eq!(cfg.pump.fittings.len(), 2);
        assert!(!cfg.strict_input);
    }

    #[test]
    fn toml_round_trip() {
        let mut cfg = Config::default();
        cfg.language = "ko".into();
        cfg.strict_input = true;
        cfg.pump.material = PipeMaterial::GalvanizedSteel;
        let text = toml::to_string_pretty(&cfg).unwrap();
        assert!(text.contains("galvanized_steel"));
        assert!(text.contains("elbow_90"));
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn partial_file_fills_missing_sections() {
        let cfg: Config = toml::from_str("language = \"en-us\"\n[pipe]\nmaterial = \"steel\"\n").unwrap();
        assert_eq!(cfg.language, "en-us");
        assert_eq!(cfg.pipe.material, PipeMaterial::Steel);
        assert_eq!(cfg.pipe.flow_rate_l_per_s, 2.5);
        assert_eq!(cfg.duct, DuctDefaults::default());
    }

    #[test]
    fn load_or_create_writes_defaults() {
        let dir = std::env::temp_dir().join(format!("hvac_cfg_test_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let _ = fs::remove_file(&path);

        let first = load_or_create(&path).unwrap();
        assert!(path.exists());
        let second = load_or_create(&path).unwrap();
        assert_eq!(first, second);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn broken_file_reports_parse_error() {
        let err = toml::from_str::<Config>("strict_input = \"yes\"").unwrap_err();
        let err = ConfigError::from(err);
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
