use hvac_engineering_toolbox::air::{
    size_duct, size_vav_box, DuctInput, DuctShape, FrictionRateLevel, SoundLevel,
    VavAirflowSchedule, VavInput, STANDARD_VAV_SIZES_IN,
};
use proptest::prelude::*;

#[test]
fn round_duct_1000_cmh_at_5_mps() {
    let res = size_duct(DuctInput::round(1000.0, 5.0));
    assert!((res.area_m2 - 0.0556).abs() < 1e-4, "area={}", res.area_m2);
    match res.shape {
        DuctShape::Round { diameter_m } => {
            assert!((diameter_m - 0.2661).abs() < 1e-3, "d={diameter_m}");
        }
        other => panic!("expected round duct, got {other:?}"),
    }
    assert_eq!(res.friction_rate_level(), FrictionRateLevel::Low);
}

#[test]
fn rectangular_duct_respects_aspect_ratio() {
    let res = size_duct(DuctInput::rectangular(3600.0, 4.0, 2.0));
    let DuctShape::Rectangular {
        width_m,
        height_m,
        equivalent_diameter_m,
    } = res.shape
    else {
        panic!("expected rectangular duct");
    };
    assert!((width_m / height_m - 2.0).abs() < 1e-12);
    assert!(equivalent_diameter_m > height_m && equivalent_diameter_m < width_m);
    assert!(res.circumference_m().is_none());
}

#[test]
fn zero_velocity_never_panics() {
    let res = size_duct(DuctInput::rectangular(1000.0, 0.0, 1.5));
    assert!(!res.area_m2.is_finite());
    let DuctShape::Rectangular { width_m, .. } = res.shape else {
        panic!("expected rectangular duct");
    };
    assert!(!width_m.is_finite());
}

#[test]
fn vav_500_cfm_selects_six_inch_box() {
    let res = size_vav_box(VavInput {
        design_airflow_cfm: 500.0,
        min_airflow_cfm: 125.0,
        static_pressure_in_wg: 1.0,
    });
    assert_eq!(res.recommended_size, "6\"");
    // 500 / (π·0.25²) ≈ 2546 fpm
    assert!((res.neck_velocity_fpm - 2546.5).abs() < 1.0);
    assert_eq!(res.sound_level, SoundLevel::High);
    let expected_drop = 0.07 * (res.neck_velocity_fpm / 1000.0).powi(2);
    assert!((res.pressure_drop_in_wg - expected_drop).abs() < 1e-12);
}

#[test]
fn vav_static_pressure_scales_drop_linearly() {
    let base = VavInput {
        design_airflow_cfm: 1500.0,
        min_airflow_cfm: 300.0,
        static_pressure_in_wg: 1.0,
    };
    let one = size_vav_box(base);
    let two = size_vav_box(VavInput {
        static_pressure_in_wg: 2.0,
        ..base
    });
    assert_eq!(one.box_size_in, 8);
    assert!((two.pressure_drop_in_wg - 2.0 * one.pressure_drop_in_wg).abs() < 1e-12);
}

#[test]
fn vav_above_table_keeps_smallest_box() {
    let res = size_vav_box(VavInput {
        design_airflow_cfm: 20000.0,
        min_airflow_cfm: 0.0,
        static_pressure_in_wg: 1.0,
    });
    assert_eq!(res.box_size_in, 6);
    assert_eq!(res.recommended_size, "6\"");
}

#[test]
fn turndown_bookkeeping_round_trip() {
    let mut s = VavAirflowSchedule::default();
    s.set_min_airflow(150.0);
    assert!((s.turndown_pct - 30.0).abs() < 1e-12);
    s.set_design_airflow(1000.0);
    assert!((s.min_airflow_cfm - 300.0).abs() < 1e-9);
    s.set_turndown(20.0);
    assert!((s.min_airflow_cfm - 200.0).abs() < 1e-9);
}

proptest! {
    #[test]
    fn rectangular_sides_multiply_back_to_area(
        flow in 1.0f64..50_000.0,
        velocity in 0.5f64..20.0,
        aspect in 0.1f64..10.0,
    ) {
        let res = size_duct(DuctInput::rectangular(flow, velocity, aspect));
        if let DuctShape::Rectangular { width_m, height_m, .. } = res.shape {
            prop_assert!((width_m * height_m - res.area_m2).abs() <= 1e-9 * res.area_m2);
        } else {
            prop_assert!(false, "rectangular input produced a round duct");
        }
    }

    #[test]
    fn round_diameter_reproduces_area(flow in 1.0f64..50_000.0, velocity in 0.5f64..20.0) {
        let res = size_duct(DuctInput::round(flow, velocity));
        if let DuctShape::Round { diameter_m } = res.shape {
            let area = std::f64::consts::PI * (diameter_m / 2.0).powi(2);
            prop_assert!((area - res.area_m2).abs() <= 1e-9 * res.area_m2);
        } else {
            prop_assert!(false, "round input produced a rectangular duct");
        }
    }

    #[test]
    fn vav_box_size_grows_with_airflow(a in 1.0f64..14_400.0, b in 1.0f64..14_400.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let input = |cfm| VavInput { design_airflow_cfm: cfm, min_airflow_cfm: 0.0, static_pressure_in_wg: 1.0 };
        let small = size_vav_box(input(lo)).box_size_in;
        let large = size_vav_box(input(hi)).box_size_in;
        prop_assert!(small <= large);
        prop_assert!(STANDARD_VAV_SIZES_IN.contains(&large));
        prop_assert!(hi <= f64::from(large * large) * 25.0);
    }
}
