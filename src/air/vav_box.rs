use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// VAV 박스 표준 호칭경 [in], 오름차순.
pub const STANDARD_VAV_SIZES_IN: [u32; 8] = [6, 8, 10, 12, 14, 16, 18, 24];

/// 호칭경 1 in²당 허용 풍량 근사 [cfm].
const CFM_PER_SQUARE_INCH: f64 = 25.0;

/// 표 범위 안에서 처리 가능한 최대 풍량 [cfm] (24"×24"×25).
pub const MAX_TABLE_AIRFLOW_CFM: f64 = 24.0 * 24.0 * CFM_PER_SQUARE_INCH;

/// 호칭경별 선정 참고 풍량 범위 [cfm] (호칭경, 최소, 최대). 화면 참고표용.
pub const VAV_SIZE_GUIDE_CFM: [(u32, f64, f64); 6] = [
    (6, 100.0, 450.0),
    (8, 175.0, 800.0),
    (10, 280.0, 1250.0),
    (12, 405.0, 1800.0),
    (14, 550.0, 2450.0),
    (16, 720.0, 3200.0),
];

/// VAV 박스 사이징 입력 (영국 단위).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VavInput {
    /// 설계(최대) 풍량 [cfm]
    pub design_airflow_cfm: f64,
    /// 최소 풍량 [cfm]. 계산식에는 쓰이지 않는다.
    pub min_airflow_cfm: f64,
    /// 입구 정압 [in.wg]
    pub static_pressure_in_wg: f64,
}

/// 소음 수준 근사.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundLevel {
    Low,
    Medium,
    High,
}

impl SoundLevel {
    /// 넥 풍속 > 1800 fpm High, > 1200 fpm Medium.
    pub fn from_neck_velocity(neck_velocity_fpm: f64) -> Self {
        if neck_velocity_fpm > 1800.0 {
            SoundLevel::High
        } else if neck_velocity_fpm > 1200.0 {
            SoundLevel::Medium
        } else {
            SoundLevel::Low
        }
    }
}

impl std::fmt::Display for SoundLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SoundLevel::Low => "Low",
            SoundLevel::Medium => "Medium",
            SoundLevel::High => "High",
        };
        f.write_str(s)
    }
}

/// 제어 권한(댐퍼 차압이 충분한지).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ControlAuthority {
    Good,
    Poor,
}

impl std::fmt::Display for ControlAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlAuthority::Good => f.write_str("Good"),
            ControlAuthority::Poor => f.write_str("Poor"),
        }
    }
}

/// VAV 박스 사이징 결과.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VavResult {
    /// 추천 호칭경 라벨 (예: `8"`)
    pub recommended_size: String,
    pub box_size_in: u32,
    /// 압력강하 [in.wg]
    pub pressure_drop_in_wg: f64,
    /// 넥 풍속 [fpm]
    pub neck_velocity_fpm: f64,
    pub sound_level: SoundLevel,
}

impl VavResult {
    pub fn control_authority(&self) -> ControlAuthority {
        if self.pressure_drop_in_wg > 0.1 {
            ControlAuthority::Good
        } else {
            ControlAuthority::Poor
        }
    }
}

/// 설계 풍량으로 VAV 박스 호칭경과 넥 풍속, 압력강하를 구한다.
///
/// 호칭경은 오름차순으로 훑어 `풍량 <= size² × 25`를 처음 만족하는 값을 쓴다.
/// 14400 cfm을 넘으면 어느 것도 맞지 않아 초기값 6"가 그대로 남는다
/// (`validation::size_vav_box_checked`는 이 경우를 거부한다).
pub fn size_vav_box(input: VavInput) -> VavResult {
    let airflow = input.design_airflow_cfm;
    let mut box_size = STANDARD_VAV_SIZES_IN[0];
    for size in STANDARD_VAV_SIZES_IN {
        let max_airflow = f64::from(size * size) * CFM_PER_SQUARE_INCH;
        if airflow <= max_airflow {
            box_size = size;
            break;
        }
    }
    if airflow > MAX_TABLE_AIRFLOW_CFM {
        tracing::warn!(airflow, "design airflow exceeds VAV size table; keeping 6\" box");
    }

    // 호칭경(in)을 반지름(ft)으로
    let neck_area_ft2 = PI * (f64::from(box_size) / 24.0).powi(2);
    let neck_velocity = airflow / neck_area_ft2;
    let pressure_drop = 0.07 * (neck_velocity / 1000.0).powi(2);
    let sound_level = SoundLevel::from_neck_velocity(neck_velocity);
    tracing::debug!(?input, box_size, neck_velocity, "vav box sized");

    VavResult {
        recommended_size: format!("{box_size}\""),
        box_size_in: box_size,
        pressure_drop_in_wg: pressure_drop * input.static_pressure_in_wg,
        neck_velocity_fpm: neck_velocity,
        sound_level,
    }
}

/// 설계 풍량·최소 풍량·턴다운비를 함께 유지한다.
///
/// 셋 중 하나를 바꾸면 나머지가 다시 맞춰진다. 턴다운비는 최소 풍량을 설계 풍량의 % 로 나타낸 값이다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VavAirflowSchedule {
    pub design_airflow_cfm: f64,
    pub min_airflow_cfm: f64,
    pub turndown_pct: f64,
}

impl Default for VavAirflowSchedule {
    fn default() -> Self {
        Self {
            design_airflow_cfm: 500.0,
            min_airflow_cfm: 125.0,
            turndown_pct: 25.0,
        }
    }
}

impl VavAirflowSchedule {
    pub fn new(design_airflow_cfm: f64, turndown_pct: f64) -> Self {
        Self {
            design_airflow_cfm,
            min_airflow_cfm: design_airflow_cfm * (turndown_pct / 100.0),
            turndown_pct,
        }
    }

    /// 설계 풍량 변경: 턴다운비는 유지하고 최소 풍량을 다시 계산한다.
    pub fn set_design_airflow(&mut self, design_airflow_cfm: f64) {
        self.design_airflow_cfm = design_airflow_cfm;
        self.min_airflow_cfm = design_airflow_cfm * (self.turndown_pct / 100.0);
    }

    /// 최소 풍량 변경: 턴다운비를 다시 계산한다. 설계 풍량이 0이면 inf/NaN.
    pub fn set_min_airflow(&mut self, min_airflow_cfm: f64) {
        self.min_airflow_cfm = min_airflow_cfm;
        self.turndown_pct = (min_airflow_cfm / self.design_airflow_cfm) * 100.0;
    }

    pub fn set_turndown(&mut self, turndown_pct: f64) {
        self.turndown_pct = turndown_pct;
        self.min_airflow_cfm = self.design_airflow_cfm * (turndown_pct / 100.0);
    }

    pub fn to_input(&self, static_pressure_in_wg: f64) -> VavInput {
        VavInput {
            design_airflow_cfm: self.design_airflow_cfm,
            min_airflow_cfm: self.min_airflow_cfm,
            static_pressure_in_wg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(design: f64) -> VavInput {
        VavInput {
            design_airflow_cfm: design,
            min_airflow_cfm: design * 0.25,
            static_pressure_in_wg: 1.0,
        }
    }

    #[test]
    fn guide_rows_use_standard_sizes() {
        for (size, min, max) in VAV_SIZE_GUIDE_CFM {
            assert!(STANDARD_VAV_SIZES_IN.contains(&size));
            assert!(min < max);
        }
    }

    #[test]
    fn first_matching_size_wins() {
        // 6² × 25 = 900 ≥ 500
        let res = size_vav_box(input(500.0));
        assert_eq!(res.recommended_size, "6\"");
        assert_eq!(res.box_size_in, 6);
    }

    #[test]
    fn boundaries_are_inclusive() {
        assert_eq!(size_vav_box(input(900.0)).box_size_in, 6);
        assert_eq!(size_vav_box(input(900.1)).box_size_in, 8);
        assert_eq!(size_vav_box(input(14400.0)).box_size_in, 24);
    }

    #[test]
    fn above_table_range_keeps_initial_size() {
        let res = size_vav_box(input(20000.0));
        assert_eq!(res.recommended_size, "6\"");
        assert_eq!(res.sound_level, SoundLevel::High);
    }

    #[test]
    fn neck_velocity_and_pressure_drop() {
        let res = size_vav_box(VavInput {
            design_airflow_cfm: 500.0,
            min_airflow_cfm: 125.0,
            static_pressure_in_wg: 2.0,
        });
        let area = PI * 0.25_f64.powi(2);
        let v = 500.0 / area;
        assert!((res.neck_velocity_fpm - v).abs() < 1e-9);
        let dp = 0.07 * (v / 1000.0).powi(2) * 2.0;
        assert!((res.pressure_drop_in_wg - dp).abs() < 1e-12);
        // ≈ 2546 fpm
        assert_eq!(res.sound_level, SoundLevel::High);
        assert_eq!(res.control_authority(), ControlAuthority::Good);
    }

    #[test]
    fn min_airflow_does_not_change_result() {
        let a = size_vav_box(VavInput {
            design_airflow_cfm: 800.0,
            min_airflow_cfm: 0.0,
            static_pressure_in_wg: 1.0,
        });
        let b = size_vav_box(VavInput {
            design_airflow_cfm: 800.0,
            min_airflow_cfm: 600.0,
            static_pressure_in_wg: 1.0,
        });
        assert_eq!(a, b);
    }

    #[test]
    fn sound_thresholds_are_exclusive() {
        assert_eq!(SoundLevel::from_neck_velocity(1200.0), SoundLevel::Low);
        assert_eq!(SoundLevel::from_neck_velocity(1200.1), SoundLevel::Medium);
        assert_eq!(SoundLevel::from_neck_velocity(1800.0), SoundLevel::Medium);
        assert_eq!(SoundLevel::from_neck_velocity(1800.1), SoundLevel::High);
    }

    #[test]
    fn schedule_keeps_turndown_when_design_changes() {
        let mut s = VavAirflowSchedule::default();
        s.set_design_airflow(800.0);
        assert_eq!(s.turndown_pct, 25.0);
        assert_eq!(s.min_airflow_cfm, 200.0);

        s.set_min_airflow(240.0);
        assert!((s.turndown_pct - 30.0).abs() < 1e-12);

        s.set_turndown(20.0);
        assert!((s.min_airflow_cfm - 160.0).abs() < 1e-12);
        assert_eq!(s.to_input(1.5).static_pressure_in_wg, 1.5);
    }

    #[test]
    fn schedule_with_zero_design_gives_non_finite_ratio() {
        let mut s = VavAirflowSchedule::new(0.0, 25.0);
        s.set_min_airflow(100.0);
        assert!(s.turndown_pct.is_infinite());
    }
}
