use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// 덕트 단면 형상.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuctType {
    #[default]
    Round,
    Rectangular,
}

/// 목표 풍속 기준 덕트 사이징 입력.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuctInput {
    /// 풍량 [m3/h]
    pub flow_rate_m3_per_h: f64,
    /// 목표 풍속 [m/s]
    pub velocity_m_per_s: f64,
    pub duct_type: DuctType,
    /// 가로/세로 비 (각형 덕트에만 사용, 보통 1~4)
    pub aspect_ratio: f64,
}

impl DuctInput {
    /// 원형 덕트 입력을 만든다.
    pub fn round(flow_rate_m3_per_h: f64, velocity_m_per_s: f64) -> Self {
        Self {
            flow_rate_m3_per_h,
            velocity_m_per_s,
            duct_type: DuctType::Round,
            aspect_ratio: 1.0,
        }
    }

    pub fn rectangular(flow_rate_m3_per_h: f64, velocity_m_per_s: f64, aspect_ratio: f64) -> Self {
        Self {
            flow_rate_m3_per_h,
            velocity_m_per_s,
            duct_type: DuctType::Rectangular,
            aspect_ratio,
        }
    }
}

/// 형상별 치수. 원형/각형 중 하나만 존재한다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum DuctShape {
    Round {
        /// 내경 [m]
        diameter_m: f64,
    },
    Rectangular {
        width_m: f64,
        height_m: f64,
        /// 동일 마찰 상당직경 [m]
        equivalent_diameter_m: f64,
    },
}

/// 덕트 사이징 결과.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DuctResult {
    /// 단면적 [m2]
    pub area_m2: f64,
    /// 마찰손실 근사 [Pa/m]
    pub friction_loss_pa_per_m: f64,
    pub shape: DuctShape,
}

/// 마찰손실 등급 (결과 화면 색상 구분용).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FrictionRateLevel {
    Low,
    Medium,
    High,
}

impl FrictionRateLevel {
    /// < 1.0 Pa/m Low, < 2.0 Pa/m Medium, 그 외 High.
    pub fn classify(friction_loss_pa_per_m: f64) -> Self {
        if friction_loss_pa_per_m < 1.0 {
            FrictionRateLevel::Low
        } else if friction_loss_pa_per_m < 2.0 {
            FrictionRateLevel::Medium
        } else {
            FrictionRateLevel::High
        }
    }
}

impl std::fmt::Display for FrictionRateLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FrictionRateLevel::Low => "Low",
            FrictionRateLevel::Medium => "Medium",
            FrictionRateLevel::High => "High",
        };
        f.write_str(s)
    }
}

impl DuctResult {
    pub fn friction_rate_level(&self) -> FrictionRateLevel {
        FrictionRateLevel::classify(self.friction_loss_pa_per_m)
    }

    /// 원형 덕트 둘레 [m]. 각형이면 None.
    pub fn circumference_m(&self) -> Option<f64> {
        match self.shape {
            DuctShape::Round { diameter_m } => Some(PI * diameter_m),
            DuctShape::Rectangular { .. } => None,
        }
    }
}

/// 풍량과 목표 풍속으로 덕트 치수를 구한다.
///
/// 마찰손실은 λ=0.025, ρ=1.2 kg/m3 고정의 단순 근사식이다.
/// 풍속 0 같은 입력은 검증하지 않고 inf/NaN이 그대로 결과에 실린다.
pub fn size_duct(input: DuctInput) -> DuctResult {
    let flow_m3_s = input.flow_rate_m3_per_h / 3600.0;
    let area = flow_m3_s / input.velocity_m_per_s;
    let v = input.velocity_m_per_s;
    let friction_loss = (0.025 * v * v * 1.2) / (2.0 * (area / PI).sqrt() * 2.0);

    let shape = match input.duct_type {
        DuctType::Round => DuctShape::Round {
            diameter_m: 2.0 * (area / PI).sqrt(),
        },
        DuctType::Rectangular => {
            let width = (area * input.aspect_ratio).sqrt();
            let height = width / input.aspect_ratio;
            let equivalent_diameter = 1.3 * (width * height).powf(0.625) / (width + height).powf(0.25);
            DuctShape::Rectangular {
                width_m: width,
                height_m: height,
                equivalent_diameter_m: equivalent_diameter,
            }
        }
    };
    tracing::debug!(?input, area, friction_loss, "duct sized");

    DuctResult {
        area_m2: area,
        friction_loss_pa_per_m: friction_loss,
        shape,
    }
}
