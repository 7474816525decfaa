//! 엄격 입력 모드.
//!
//! 계산 함수 자체는 입력을 검증하지 않고 inf/NaN을 그대로 흘려보낸다.
//! 여기의 `*_checked` 함수는 물리적으로 말이 안 되는 입력을 먼저 거른 뒤 같은 계산을 호출한다.

use thiserror::Error;

use crate::air::duct_sizing::{size_duct, DuctInput, DuctResult, DuctType};
use crate::air::vav_box::{size_vav_box, VavInput, VavResult, MAX_TABLE_AIRFLOW_CFM};
use crate::material_db::{FittingKind, PipeMaterial};
use crate::water::pipe_sizing::{size_pipe, PipeInput, PipeResult};
use crate::water::pump_head::{pump_head, PumpHeadInput, PumpHeadResult};

/// 입력 검증 오류.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("{field} must be greater than zero (got {value})")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be a finite number (got {value})")]
    NonFinite { field: &'static str, value: f64 },

    #[error("design airflow {airflow_cfm} cfm exceeds the largest VAV box capacity ({max_cfm} cfm)")]
    AirflowAboveRange { airflow_cfm: f64, max_cfm: f64 },

    #[error("unknown pipe material: {0}")]
    UnknownMaterial(String),

    #[error("unknown fitting type: {0}")]
    UnknownFitting(String),

    #[error("invalid fitting count: {0}")]
    InvalidCount(String),
}

pub type InputResult<T> = Result<T, InputError>;

fn positive(field: &'static str, value: f64) -> InputResult<f64> {
    if !value.is_finite() {
        return Err(InputError::NonFinite { field, value });
    }
    if value <= 0.0 {
        return Err(InputError::NonPositive { field, value });
    }
    Ok(value)
}

fn non_negative(field: &'static str, value: f64) -> InputResult<f64> {
    if !value.is_finite() {
        return Err(InputError::NonFinite { field, value });
    }
    if value < 0.0 {
        return Err(InputError::NonPositive { field, value });
    }
    Ok(value)
}

/// 문자열 재질 코드를 엄격하게 해석한다 (폴백 없음).
pub fn parse_material(code: &str) -> InputResult<PipeMaterial> {
    PipeMaterial::parse(code).ok_or_else(|| InputError::UnknownMaterial(code.trim().to_string()))
}

pub fn parse_fitting(code: &str) -> InputResult<FittingKind> {
    FittingKind::parse(code).ok_or_else(|| InputError::UnknownFitting(code.trim().to_string()))
}

pub fn size_duct_checked(input: DuctInput) -> InputResult<DuctResult> {
    positive("flow rate", input.flow_rate_m3_per_h)?;
    positive("velocity", input.velocity_m_per_s)?;
    if input.duct_type == DuctType::Rectangular {
        positive("aspect ratio", input.aspect_ratio)?;
    }
    Ok(size_duct(input))
}

pub fn size_pipe_checked(input: PipeInput) -> InputResult<PipeResult> {
    positive("flow rate", input.flow_rate_l_per_s)?;
    positive("velocity", input.velocity_m_per_s)?;
    Ok(size_pipe(input))
}

/// 표 범위(24" 박스, 14400 cfm)를 넘는 풍량은 6"로 떨어지지 않고 오류로 거부한다.
pub fn size_vav_box_checked(input: VavInput) -> InputResult<VavResult> {
    let airflow = positive("design airflow", input.design_airflow_cfm)?;
    non_negative("minimum airflow", input.min_airflow_cfm)?;
    non_negative("static pressure", input.static_pressure_in_wg)?;
    if airflow > MAX_TABLE_AIRFLOW_CFM {
        return Err(InputError::AirflowAboveRange {
            airflow_cfm: airflow,
            max_cfm: MAX_TABLE_AIRFLOW_CFM,
        });
    }
    Ok(size_vav_box(input))
}

pub fn pump_head_checked(input: &PumpHeadInput) -> InputResult<PumpHeadResult> {
    positive("flow rate", input.flow_rate_l_per_s)?;
    positive("pipe length", input.pipe_length_m)?;
    positive("pipe size", input.pipe_size_mm)?;
    Ok(pump_head(input))
}
