use hvac_engineering_toolbox::config::{self, Config};
use hvac_engineering_toolbox::i18n::{keys, Translator};
use hvac_engineering_toolbox::material_db::{
    find_standard_pipe_size, fitting_k_value, material_roughness, FittingKind, PipeMaterial, DEFAULT_ROUGHNESS_MM,
    STANDARD_PIPE_SIZES_MM,
};
use hvac_engineering_toolbox::validation::{self, InputError};
use hvac_engineering_toolbox::air::VavInput;
use hvac_engineering_toolbox::water::{pump_head, size_pipe, FittingTally, PipeInput, PumpHeadInput};
use proptest::prelude::*;

fn reference_pump_input() -> PumpHeadInput {
    PumpHeadInput {
        flow_rate_l_per_s: 2.5,
        pipe_length_m: 50.0,
        pipe_size_mm: 25.0,
        fittings: [(FittingKind::Elbow90, 4), (FittingKind::CheckValve, 1)]
            .into_iter()
            .collect::<FittingTally>(),
        material: PipeMaterial::Copper,
    }
}

#[test]
fn pvc_pipe_2_5_lps_at_1_5_mps() {
    let res = size_pipe(PipeInput {
        flow_rate_l_per_s: 2.5,
        velocity_m_per_s: 1.5,
        material: PipeMaterial::Pvc,
    });
    assert!((res.diameter_mm - 46.07).abs() < 0.01, "d={}", res.diameter_mm);
    assert_eq!(res.recommended_size_mm, 50);
    assert!(res.reynolds_number > 60_000.0);
    assert!(res.pressure_loss_pa_per_m > 0.0);
}

#[test]
fn zero_velocity_pipe_is_non_finite_but_sized() {
    let res = size_pipe(PipeInput {
        flow_rate_l_per_s: 2.5,
        velocity_m_per_s: 0.0,
        material: PipeMaterial::Copper,
    });
    assert!(!res.diameter_mm.is_finite());
    assert!(STANDARD_PIPE_SIZES_MM.contains(&res.recommended_size_mm));
}

#[test]
fn standard_sizes_map_to_themselves_and_ties_go_down() {
    for size in STANDARD_PIPE_SIZES_MM {
        assert_eq!(find_standard_pipe_size(f64::from(size)), size);
    }
    // 15/20 중간
    assert_eq!(find_standard_pipe_size(17.5), 15);
    assert_eq!(find_standard_pipe_size(1000.0), 300);
}

#[test]
fn unknown_material_code_uses_default_roughness() {
    assert_eq!(material_roughness("bamboo"), DEFAULT_ROUGHNESS_MM);
    assert_eq!(PipeMaterial::parse_or_default("bamboo"), PipeMaterial::Copper);
    assert_eq!(
        validation::parse_material("bamboo"),
        Err(InputError::UnknownMaterial("bamboo".into()))
    );
}

#[test]
fn table_lookups_use_exact_codes_only() {
    assert_eq!(material_roughness("Steel"), 0.0015);
    assert_eq!(material_roughness("STEEL"), 0.0015);
    assert_eq!(material_roughness("Cast Iron"), 0.0015);
    assert_eq!(material_roughness(" pvc "), 0.0015);
    assert_eq!(material_roughness("steel"), 0.045);
    assert_eq!(fitting_k_value("Globe Valve"), 0.0);
    assert_eq!(fitting_k_value("TEE"), 0.0);
    assert_eq!(fitting_k_value("globe_valve"), 10.0);
    // 사용자 입력 해석은 따로 관대하게 받는다
    assert_eq!(validation::parse_material("Cast Iron"), Ok(PipeMaterial::CastIron));
    assert_eq!(validation::parse_fitting("TEE"), Ok(FittingKind::Tee));
}

#[test]
fn pump_totals_add_up() {
    let input = reference_pump_input();
    let res = pump_head(&input);
    assert!((res.total_head_m - (res.friction_loss_m + res.fittings_loss_m)).abs() < 1e-12);

    let velocity_head = res.velocity_m_per_s.powi(2) / (2.0 * 9.81);
    let expected_fittings = (4.0 * 0.75 + 1.0 * 2.5) * velocity_head;
    assert!((res.fittings_loss_m - expected_fittings).abs() < 1e-9);

    let expected_power = 1000.0 * 9.81 * 0.0025 * res.total_head_m / 700.0;
    assert!((res.pump_power_kw - expected_power).abs() < 1e-9);
}

#[test]
fn pump_without_fittings_has_only_friction() {
    let mut input = reference_pump_input();
    input.fittings = FittingTally::new();
    let res = pump_head(&input);
    assert_eq!(res.fittings_loss_m, 0.0);
    assert_eq!(res.total_head_m, res.friction_loss_m);
}

#[test]
fn strict_layer_rejects_what_core_lets_through() {
    let mut input = reference_pump_input();
    input.pipe_size_mm = 0.0;
    assert!(!pump_head(&input).total_head_m.is_finite());
    assert!(matches!(
        validation::pump_head_checked(&input),
        Err(InputError::NonPositive { field: "pipe size", .. })
    ));

    let oversized = VavInput {
        design_airflow_cfm: 15_000.0,
        min_airflow_cfm: 3_000.0,
        static_pressure_in_wg: 1.0,
    };
    assert!(matches!(
        validation::size_vav_box_checked(oversized),
        Err(InputError::AirflowAboveRange { .. })
    ));
}

#[test]
fn config_round_trips_through_disk() {
    let path = std::env::temp_dir().join(format!("hvac_toolbox_it_{}.toml", std::process::id()));
    let mut cfg = Config::default();
    cfg.language = "en-us".into();
    cfg.strict_input = true;
    cfg.pipe.material = PipeMaterial::Steel;
    cfg.save_as(&path).unwrap();

    let loaded = config::load_or_create(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(loaded, cfg);
}

#[test]
fn translator_falls_back_between_languages() {
    let en = Translator::new("en-us");
    let ko = Translator::new("ko-kr");
    assert_ne!(en.t(keys::ERROR_PREFIX), ko.t(keys::ERROR_PREFIX));
    assert_eq!(ko.t(keys::ERROR_PREFIX), "오류");
    // 모르는 언어 코드는 한국어
    assert_eq!(Translator::new("xx").t(keys::ERROR_PREFIX), "오류");
}

proptest! {
    #[test]
    fn nearest_standard_size_is_never_beaten(d in 0.0f64..400.0) {
        let chosen = find_standard_pipe_size(d);
        let best = (d - f64::from(chosen)).abs();
        for size in STANDARD_PIPE_SIZES_MM {
            prop_assert!(best <= (d - f64::from(size)).abs());
        }
    }

    #[test]
    fn pump_power_tracks_head(flow in 0.1f64..20.0, length in 1.0f64..500.0, elbows in 0u32..20) {
        let input = PumpHeadInput {
            flow_rate_l_per_s: flow,
            pipe_length_m: length,
            pipe_size_mm: 65.0,
            fittings: [(FittingKind::Elbow90, elbows)].into_iter().collect(),
            material: PipeMaterial::Steel,
        };
        let res = pump_head(&input);
        prop_assert!(res.friction_loss_m > 0.0);
        prop_assert!(res.fittings_loss_m >= 0.0);
        let expected = 1000.0 * 9.81 * (flow / 1000.0) * res.total_head_m / 700.0;
        prop_assert!((res.pump_power_kw - expected).abs() <= 1e-9 * expected.max(1.0));
    }
}
