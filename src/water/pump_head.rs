use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::PI;

use super::pipe_sizing::{explicit_friction_factor, WATER_KINEMATIC_VISCOSITY_M2_S};
use crate::material_db::{FittingKind, PipeMaterial};

const G: f64 = 9.81;
/// 펌프 효율 (고정)
pub const PUMP_EFFICIENCY: f64 = 0.7;

/// 사용자가 편집하는 피팅 목록의 한 행.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FittingEntry {
    pub id: u64,
    pub kind: FittingKind,
    pub count: u32,
}

/// 피팅 종류별 개수 집계. 같은 종류는 합산된다.
///
/// 정렬된 맵이라 순회 순서가 입력 순서와 무관하다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FittingTally(BTreeMap<FittingKind, u32>);

impl FittingTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// 편집 목록을 종류별로 접는다.
    pub fn from_entries(entries: &[FittingEntry]) -> Self {
        let mut tally = Self::new();
        for e in entries {
            tally.add(e.kind, e.count);
        }
        tally
    }

    pub fn add(&mut self, kind: FittingKind, count: u32) {
        let slot = self.0.entry(kind).or_insert(0);
        *slot = slot.saturating_add(count);
    }

    pub fn count(&self, kind: FittingKind) -> u32 {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FittingKind, u32)> + '_ {
        self.0.iter().map(|(k, c)| (*k, *c))
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|c| *c == 0)
    }

    /// ΣK (개수 가중)
    pub fn total_k(&self) -> f64 {
        self.iter().map(|(k, c)| f64::from(c) * k.k_value()).sum()
    }
}

impl FromIterator<(FittingKind, u32)> for FittingTally {
    fn from_iter<I: IntoIterator<Item = (FittingKind, u32)>>(iter: I) -> Self {
        let mut tally = Self::new();
        for (kind, count) in iter {
            tally.add(kind, count);
        }
        tally
    }
}

/// 펌프 양정 계산 입력.
#[derive(Debug, Clone, PartialEq)]
pub struct PumpHeadInput {
    /// 유량 [L/s]
    pub flow_rate_l_per_s: f64,
    /// 배관 길이 [m]
    pub pipe_length_m: f64,
    /// 호칭경 [mm]
    pub pipe_size_mm: f64,
    pub fittings: FittingTally,
    pub material: PipeMaterial,
}

/// 펌프 양정 계산 결과.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PumpHeadResult {
    /// 직관 마찰손실 [m]
    pub friction_loss_m: f64,
    /// 피팅 국부손실 [m]
    pub fittings_loss_m: f64,
    /// 총 양정 [m]
    pub total_head_m: f64,
    /// 축동력 [kW]
    pub pump_power_kw: f64,
    pub velocity_m_per_s: f64,
    pub reynolds_number: f64,
    pub friction_factor: f64,
}

impl PumpHeadResult {
    /// 단위 길이당 마찰손실 [m/m]
    pub fn friction_loss_rate_m_per_m(&self, pipe_length_m: f64) -> f64 {
        self.friction_loss_m / pipe_length_m
    }
}

/// Darcy-Weisbach 직관 손실과 K 값 국부손실을 더해 펌프 양정과 동력을 구한다.
///
/// - h_f = f (L/D) v²/2g
/// - h_k = Σ n·K·v²/2g
/// - P = ρ g Q H / (η·1000), η = 0.7
///
/// 관경 0, 유량 0 등은 검증하지 않고 inf/NaN을 그대로 돌려준다.
pub fn pump_head(input: &PumpHeadInput) -> PumpHeadResult {
    let diameter = input.pipe_size_mm / 1000.0;
    let flow_m3_s = input.flow_rate_l_per_s / 1000.0;
    let velocity = flow_m3_s / (PI * (diameter / 2.0).powi(2));

    let roughness_m = input.material.roughness_mm() / 1000.0;
    let reynolds = velocity * diameter / WATER_KINEMATIC_VISCOSITY_M2_S;
    let friction_factor = explicit_friction_factor(roughness_m / (3.7 * diameter), reynolds);

    let velocity_head = velocity * velocity / (2.0 * G);
    let friction_loss = friction_factor * (input.pipe_length_m / diameter) * velocity_head;

    let mut fittings_loss = 0.0;
    for (kind, count) in input.fittings.iter() {
        fittings_loss += f64::from(count) * kind.k_value() * velocity_head;
    }

    let total_head = friction_loss + fittings_loss;
    let pump_power = (1000.0 * G * flow_m3_s * total_head) / (PUMP_EFFICIENCY * 1000.0);
    tracing::debug!(
        flow = input.flow_rate_l_per_s,
        size_mm = input.pipe_size_mm,
        friction_loss,
        fittings_loss,
        pump_power,
        "pump head computed"
    );

    PumpHeadResult {
        friction_loss_m: friction_loss,
        fittings_loss_m: fittings_loss,
        total_head_m: total_head,
        pump_power_kw: pump_power,
        velocity_m_per_s: velocity,
        reynolds_number: reynolds,
        friction_factor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_input() -> PumpHeadInput {
        let entries = [
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
        ];
        PumpHeadInput {
            flow_rate_l_per_s: 2.5,
            pipe_length_m: 50.0,
            pipe_size_mm: 25.0,
            fittings: FittingTally::from_entries(&entries),
            material: PipeMaterial::Copper,
        }
    }

    #[test]
    fn total_head_is_sum_and_power_matches() {
        let res = pump_head(&reference_input());
        assert_eq!(res.total_head_m, res.friction_loss_m + res.fittings_loss_m);
        let expected_power = 1000.0 * 9.81 * 0.0025 * res.total_head_m / 700.0;
        assert!((res.pump_power_kw - expected_power).abs() < 1e-12);
        // v = 0.0025 / (π·0.0125²) ≈ 5.09 m/s
        assert!((res.velocity_m_per_s - 5.0930).abs() < 1e-3);
    }

    #[test]
    fn fittings_loss_uses_k_values() {
        let res = pump_head(&reference_input());
        let vh = res.velocity_m_per_s.powi(2) / (2.0 * 9.81);
        let expected = (4.0 * 0.75 + 2.5) * vh;
        assert!((res.fittings_loss_m - expected).abs() < 1e-9);
    }

    #[test]
    fn duplicate_entries_are_summed() {
        let entries = [
            FittingEntry {
                id: 1,
                kind: FittingKind::Tee,
                count: 2,
            },
            FittingEntry {
                id: 7,
                kind: FittingKind::Tee,
                count: 3,
            },
        ];
        let tally = FittingTally::from_entries(&entries);
        assert_eq!(tally.count(FittingKind::Tee), 5);
        assert_eq!(tally.count(FittingKind::Exit), 0);
        assert_eq!(tally.total_k(), 5.0);
    }

    #[test]
    fn no_fittings_means_no_fittings_loss() {
        let mut input = reference_input();
        input.fittings = FittingTally::new();
        let res = pump_head(&input);
        assert_eq!(res.fittings_loss_m, 0.0);
        assert_eq!(res.total_head_m, res.friction_loss_m);
        assert!(input.fittings.is_empty());
    }

    #[test]
    fn zero_pipe_size_propagates_non_finite() {
        let mut input = reference_input();
        input.pipe_size_mm = 0.0;
        let res = pump_head(&input);
        assert!(res.velocity_m_per_s.is_infinite());
        assert!(!res.total_head_m.is_finite());
        assert!(!res.pump_power_kw.is_finite());
    }

    #[test]
    fn friction_rate_per_metre() {
        let res = pump_head(&reference_input());
        assert!((res.friction_loss_rate_m_per_m(50.0) * 50.0 - res.friction_loss_m).abs() < 1e-12);
    }
}
