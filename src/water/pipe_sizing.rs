use serde::Serialize;
use std::f64::consts::PI;

use crate::material_db::{find_standard_pipe_size, PipeMaterial};

/// 물 동점도(20°C) [m2/s]
pub const WATER_KINEMATIC_VISCOSITY_M2_S: f64 = 1.0e-6;
/// 물 밀도 [kg/m3]
pub const WATER_DENSITY_KG_M3: f64 = 1000.0;

/// 권장 유속 범위 [m/s]
pub const RECOMMENDED_VELOCITY_MIN_M_S: f64 = 0.75;
pub const RECOMMENDED_VELOCITY_MAX_M_S: f64 = 2.5;

/// 목표 유속 기준 물 배관 사이징 입력.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipeInput {
    /// 유량 [L/s]
    pub flow_rate_l_per_s: f64,
    /// 목표 유속 [m/s]
    pub velocity_m_per_s: f64,
    pub material: PipeMaterial,
}

/// 배관 사이징 결과.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PipeResult {
    /// 계산 내경 [mm]
    pub diameter_mm: f64,
    /// 단위 길이당 압력손실 [Pa/m]
    pub pressure_loss_pa_per_m: f64,
    pub reynolds_number: f64,
    pub friction_factor: f64,
    /// 가장 가까운 표준 호칭경 [mm]
    pub recommended_size_mm: u32,
}

/// 레이놀즈수에 따른 유동 영역.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlowRegime {
    Laminar,
    Transitional,
    Turbulent,
}

impl FlowRegime {
    pub fn from_reynolds(reynolds: f64) -> Self {
        if reynolds < 2300.0 {
            FlowRegime::Laminar
        } else if reynolds < 4000.0 {
            FlowRegime::Transitional
        } else {
            FlowRegime::Turbulent
        }
    }
}

impl std::fmt::Display for FlowRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FlowRegime::Laminar => "Laminar",
            FlowRegime::Transitional => "Transitional",
            FlowRegime::Turbulent => "Turbulent",
        };
        f.write_str(s)
    }
}

/// 설계 유속이 권장 범위(0.75~2.5 m/s) 안인지.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VelocityCheck {
    /// 공기 정체/침전 위험
    BelowRecommended,
    WithinRange,
    /// 소음/침식 위험
    AboveRecommended,
}

impl VelocityCheck {
    pub fn classify(velocity_m_per_s: f64) -> Self {
        if velocity_m_per_s < RECOMMENDED_VELOCITY_MIN_M_S {
            VelocityCheck::BelowRecommended
        } else if velocity_m_per_s > RECOMMENDED_VELOCITY_MAX_M_S {
            VelocityCheck::AboveRecommended
        } else {
            VelocityCheck::WithinRange
        }
    }
}

impl std::fmt::Display for VelocityCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VelocityCheck::BelowRecommended => "Below Recommended (Risk of Air/Sediment)",
            VelocityCheck::WithinRange => "Within Recommended Range",
            VelocityCheck::AboveRecommended => "Above Recommended (Risk of Noise/Erosion)",
        };
        f.write_str(s)
    }
}

impl PipeResult {
    pub fn flow_regime(&self) -> FlowRegime {
        FlowRegime::from_reynolds(self.reynolds_number)
    }

    /// 100 m당 압력손실 [kPa]
    pub fn pressure_loss_kpa_per_100m(&self) -> f64 {
        self.pressure_loss_pa_per_m * 100.0 / 1000.0
    }
}

/// Colebrook-White 양해 근사(Swamee-Jain 형태) 마찰계수.
///
/// `relative_term`은 ε/(3.7·D) 항으로, 호출자가 단위를 맞춰 넘긴다.
pub(crate) fn explicit_friction_factor(relative_term: f64, reynolds: f64) -> f64 {
    0.25 / (relative_term + 5.74 / reynolds.powf(0.9)).log10().powi(2)
}

/// 유량과 목표 유속으로 물 배관 내경, 압력손실, 추천 호칭경을 구한다.
///
/// ΔP/L = f · ρ v² / (2D), ν = 1e-6 m2/s.
pub fn size_pipe(input: PipeInput) -> PipeResult {
    let flow_m3_s = input.flow_rate_l_per_s / 1000.0;
    let v = input.velocity_m_per_s;
    let area = flow_m3_s / v;
    let diameter = 2.0 * (area / PI).sqrt();

    let roughness_mm = input.material.roughness_mm();
    let reynolds = v * diameter / WATER_KINEMATIC_VISCOSITY_M2_S;
    let friction_factor =
        explicit_friction_factor((roughness_mm / 1000.0) / (3.7 * diameter), reynolds);
    let pressure_loss = friction_factor * (WATER_DENSITY_KG_M3 * v * v) / (2.0 * diameter);

    let diameter_mm = diameter * 1000.0;
    let recommended = find_standard_pipe_size(diameter_mm);
    tracing::debug!(?input, diameter_mm, reynolds, recommended, "pipe sized");

    PipeResult {
        diameter_mm,
        pressure_loss_pa_per_m: pressure_loss,
        reynolds_number: reynolds,
        friction_factor,
        recommended_size_mm: recommended,
    }
}
