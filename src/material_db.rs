/// 배관 재질 거칠기, 피팅 손실계수(K), 표준 호칭경 테이블을 제공한다.
/// 값은 설계 참고용 대표치이며 제조사 자료로 검증해야 한다.
use serde::{Deserialize, Serialize};

/// 등록되지 않은 재질 코드에 적용하는 거칠기 [mm] (동관/PVC 값).
pub const DEFAULT_ROUGHNESS_MM: f64 = 0.0015;

/// 표준 배관 호칭경 [mm], 오름차순.
pub const STANDARD_PIPE_SIZES_MM: [u32; 14] =
    [15, 20, 25, 32, 40, 50, 65, 80, 100, 125, 150, 200, 250, 300];

/// 배관 재질.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipeMaterial {
    Copper,
    Pvc,
    Steel,
    CastIron,
    Concrete,
    GalvanizedSteel,
}

#[derive(Debug)]
pub struct MaterialData {
    pub material: PipeMaterial,
    pub code: &'static str,
    pub name: &'static str,
    /// 절대 거칠기 ε [mm]
    pub roughness_mm: f64,
}

const MATERIALS: &[MaterialData] = &[
    MaterialData {
        material: PipeMaterial::Copper,
        code: "copper",
        name: "Copper",
        roughness_mm: 0.0015,
    },
    MaterialData {
        material: PipeMaterial::Pvc,
        code: "pvc",
        name: "PVC",
        roughness_mm: 0.0015,
    },
    MaterialData {
        material: PipeMaterial::Steel,
        code: "steel",
        name: "Steel",
        roughness_mm: 0.045,
    },
    MaterialData {
        material: PipeMaterial::CastIron,
        code: "cast_iron",
        name: "Cast Iron",
        roughness_mm: 0.26,
    },
    MaterialData {
        material: PipeMaterial::Concrete,
        code: "concrete",
        name: "Concrete",
        roughness_mm: 1.0,
    },
    MaterialData {
        material: PipeMaterial::GalvanizedSteel,
        code: "galvanized_steel",
        name: "Galvanized Steel",
        roughness_mm: 0.15,
    },
];

pub fn materials() -> &'static [MaterialData] {
    MATERIALS
}

impl PipeMaterial {
    pub const ALL: [PipeMaterial; 6] = [
        PipeMaterial::Copper,
        PipeMaterial::Pvc,
        PipeMaterial::Steel,
        PipeMaterial::CastIron,
        PipeMaterial::Concrete,
        PipeMaterial::GalvanizedSteel,
    ];

    fn data(self) -> &'static MaterialData {
        match self {
            PipeMaterial::Copper => &MATERIALS[0],
            PipeMaterial::Pvc => &MATERIALS[1],
            PipeMaterial::Steel => &MATERIALS[2],
            PipeMaterial::CastIron => &MATERIALS[3],
            PipeMaterial::Concrete => &MATERIALS[4],
            PipeMaterial::GalvanizedSteel => &MATERIALS[5],
        }
    }

    /// 절대 거칠기 [mm].
    pub fn roughness_mm(self) -> f64 {
        self.data().roughness_mm
    }

    pub fn code(self) -> &'static str {
        self.data().code
    }

    /// 화면 표시용 이름.
    pub fn display_name(self) -> &'static str {
        self.data().name
    }

    /// 재질 코드(`cast_iron` 등)와 정확히 일치할 때만 찾는다.
    pub fn from_code(code: &str) -> Option<Self> {
        find_material(code).map(|m| m.material)
    }

    /// 사용자 입력 해석용. 앞뒤 공백을 무시하고 대소문자 구분 없이 코드나 표시 이름을 받는다.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        MATERIALS
            .iter()
            .find(|m| m.code.eq_ignore_ascii_case(text) || m.name.eq_ignore_ascii_case(text))
            .map(|m| m.material)
    }

    /// 해석할 수 없는 입력은 기본 거칠기(0.0015 mm)를 갖는 동관으로 취급한다.
    pub fn parse_or_default(text: &str) -> Self {
        Self::parse(text).unwrap_or(PipeMaterial::Copper)
    }
}

impl std::fmt::Display for PipeMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

pub fn find_material(code: &str) -> Option<&'static MaterialData> {
    MATERIALS.iter().find(|m| m.code == code)
}

/// 재질 코드로 거칠기 [mm]를 조회한다. 표에 없는 문자열은 대소문자만 달라도 기본값(0.0015)이다.
pub fn material_roughness(code: &str) -> f64 {
    find_material(code)
        .map(|m| m.roughness_mm)
        .unwrap_or(DEFAULT_ROUGHNESS_MM)
}

/// 피팅/밸브 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FittingKind {
    #[serde(rename = "elbow_90")]
    Elbow90,
    #[serde(rename = "elbow_45")]
    Elbow45,
    Tee,
    GateValve,
    GlobeValve,
    CheckValve,
    Entrance,
    Exit,
}

impl FittingKind {
    pub const ALL: [FittingKind; 8] = [
        FittingKind::Elbow90,
        FittingKind::Elbow45,
        FittingKind::Tee,
        FittingKind::GateValve,
        FittingKind::GlobeValve,
        FittingKind::CheckValve,
        FittingKind::Entrance,
        FittingKind::Exit,
    ];

    /// 손실계수 K (속도수두 배수).
    pub fn k_value(self) -> f64 {
        match self {
            FittingKind::Elbow90 => 0.75,
            FittingKind::Elbow45 => 0.4,
            FittingKind::Tee => 1.0,
            FittingKind::GateValve => 0.2,
            FittingKind::GlobeValve => 10.0,
            FittingKind::CheckValve => 2.5,
            FittingKind::Entrance => 0.5,
            FittingKind::Exit => 1.0,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            FittingKind::Elbow90 => "elbow_90",
            FittingKind::Elbow45 => "elbow_45",
            FittingKind::Tee => "tee",
            FittingKind::GateValve => "gate_valve",
            FittingKind::GlobeValve => "globe_valve",
            FittingKind::CheckValve => "check_valve",
            FittingKind::Entrance => "entrance",
            FittingKind::Exit => "exit",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            FittingKind::Elbow90 => "90° Elbow",
            FittingKind::Elbow45 => "45° Elbow",
            FittingKind::Tee => "Tee (Branch Flow)",
            FittingKind::GateValve => "Gate Valve",
            FittingKind::GlobeValve => "Globe Valve",
            FittingKind::CheckValve => "Check Valve",
            FittingKind::Entrance => "Entrance",
            FittingKind::Exit => "Exit",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.code() == code)
    }

    /// `PipeMaterial::parse`와 같은 규칙의 사용자 입력 해석.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.code().eq_ignore_ascii_case(text) || k.display_name().eq_ignore_ascii_case(text))
    }
}

impl std::fmt::Display for FittingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// 피팅 코드로 K 값을 조회한다. 코드와 정확히 같지 않으면 0.
pub fn fitting_k_value(code: &str) -> f64 {
    FittingKind::from_code(code).map(FittingKind::k_value).unwrap_or(0.0)
}

/// 주어진 내경 [mm]에 가장 가까운 표준 호칭경을 찾는다.
///
/// 오름차순으로 훑으며 차이가 엄격히 더 작을 때만 갱신하므로 동률이면 작은 쪽이 남는다.
/// NaN 입력은 첫 호칭경(15 mm)을 돌려준다.
pub fn find_standard_pipe_size(diameter_mm: f64) -> u32 {
    let mut closest = STANDARD_PIPE_SIZES_MM[0];
    let mut min_diff = (diameter_mm - f64::from(closest)).abs();
    for size in STANDARD_PIPE_SIZES_MM {
        let diff = (diameter_mm - f64::from(size)).abs();
        if diff < min_diff {
            min_diff = diff;
            closest = size;
        }
    }
    closest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_material_falls_back_to_copper_roughness() {
        assert_eq!(material_roughness("unobtainium"), DEFAULT_ROUGHNESS_MM);
        assert_eq!(material_roughness(""), 0.0015);
        assert_eq!(material_roughness("steel"), 0.045);
        assert_eq!(material_roughness("cast_iron"), 0.26);
    }

    #[test]
    fn roughness_lookup_only_accepts_exact_codes() {
        assert_eq!(material_roughness("Steel"), DEFAULT_ROUGHNESS_MM);
        assert_eq!(material_roughness("STEEL"), DEFAULT_ROUGHNESS_MM);
        assert_eq!(material_roughness("Cast Iron"), DEFAULT_ROUGHNESS_MM);
        assert_eq!(material_roughness(" pvc "), DEFAULT_ROUGHNESS_MM);
        assert_eq!(PipeMaterial::from_code("Steel"), None);
    }

    #[test]
    fn fitting_lookup_only_accepts_exact_codes() {
        assert_eq!(fitting_k_value("Globe Valve"), 0.0);
        assert_eq!(fitting_k_value("TEE"), 0.0);
        assert_eq!(fitting_k_value("tee"), 1.0);
        assert_eq!(FittingKind::from_code("Tee"), None);
    }

    #[test]
    fn front_end_parse_is_forgiving() {
        assert_eq!(PipeMaterial::parse(" STEEL "), Some(PipeMaterial::Steel));
        assert_eq!(PipeMaterial::parse("Cast Iron"), Some(PipeMaterial::CastIron));
        assert_eq!(FittingKind::parse("Globe Valve"), Some(FittingKind::GlobeValve));
        assert_eq!(FittingKind::parse("TEE"), Some(FittingKind::Tee));
        assert_eq!(FittingKind::parse("reducer"), None);
    }

    #[test]
    fn material_table_covers_every_variant() {
        for m in PipeMaterial::ALL {
            assert_eq!(m.data().material, m);
            assert_eq!(PipeMaterial::from_code(m.code()), Some(m));
        }
        assert_eq!(materials().len(), PipeMaterial::ALL.len());
    }

    #[test]
    fn unknown_code_maps_to_default_roughness_material() {
        let m = PipeMaterial::parse_or_default("bamboo");
        assert_eq!(m.roughness_mm(), DEFAULT_ROUGHNESS_MM);
        assert_eq!(PipeMaterial::parse_or_default(" STEEL "), PipeMaterial::Steel);
    }

    #[test]
    fn fitting_codes_round_trip_and_unknown_is_zero() {
        for k in FittingKind::ALL {
            assert_eq!(FittingKind::from_code(k.code()), Some(k));
        }
        assert_eq!(fitting_k_value("globe_valve"), 10.0);
        assert_eq!(fitting_k_value("butterfly_valve"), 0.0);
    }

    #[test]
    fn standard_size_is_identity_on_table_entries() {
        for size in STANDARD_PIPE_SIZES_MM {
            assert_eq!(find_standard_pipe_size(f64::from(size)), size);
        }
    }

    #[test]
    fn standard_size_tie_resolves_to_smaller() {
        // 15과 20의 정중앙
        assert_eq!(find_standard_pipe_size(17.5), 15);
        assert_eq!(find_standard_pipe_size(112.5), 100);
        assert_eq!(find_standard_pipe_size(46.07), 50);
        assert_eq!(find_standard_pipe_size(1000.0), 300);
        assert_eq!(find_standard_pipe_size(0.0), 15);
    }

    #[test]
    fn standard_size_nan_keeps_first_entry() {
        assert_eq!(find_standard_pipe_size(f64::NAN), 15);
        assert_eq!(find_standard_pipe_size(f64::INFINITY), 15);
    }
}
