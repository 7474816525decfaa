use std::io::{self, BufRead, Write};

use crate::air::duct_sizing::{DuctInput, DuctResult, DuctShape, DuctType};
use crate::air::vav_box::{VavAirflowSchedule, VavResult};
use crate::app::{self, AppError};
use crate::config::Config;
use crate::i18n::{keys, Translator};
use crate::material_db::{FittingKind, PipeMaterial};
use crate::validation::{self, InputError};
use crate::water::pipe_sizing::{PipeInput, PipeResult, VelocityCheck};
use crate::water::pump_head::{FittingEntry, FittingTally, PumpHeadInput, PumpHeadResult};

/// 메인 메뉴 선택지를 표현한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Duct,
    Pipe,
    Vav,
    Pump,
    Settings,
    Exit,
}

/// 메인 메뉴를 표시하고 선택값을 반환한다.
pub fn main_menu(tr: &Translator) -> Result<MenuChoice, AppError> {
    println!("{}", tr.t(keys::MAIN_MENU_TITLE));
    for key in [
        keys::MAIN_MENU_DUCT,
        keys::MAIN_MENU_PIPE,
        keys::MAIN_MENU_VAV,
        keys::MAIN_MENU_PUMP,
        keys::MAIN_MENU_SETTINGS,
        keys::MAIN_MENU_EXIT,
    ] {
        println!("{}", tr.t(key));
    }
    select_menu(tr, &mut io::stdin().lock())
}

/// 올바른 번호가 들어올 때까지 다시 묻는다. 입력이 끝나면 `UnexpectedEof`로 빠져나간다.
fn select_menu<R: BufRead>(tr: &Translator, input: &mut R) -> Result<MenuChoice, AppError> {
    loop {
        print!("{}", tr.t(keys::PROMPT_MENU_SELECT));
        io::stdout().flush()?;
        let sel = read_line_from(input)?;
        match sel.trim() {
            "1" => return Ok(MenuChoice::Duct),
            "2" => return Ok(MenuChoice::Pipe),
            "3" => return Ok(MenuChoice::Vav),
            "4" => return Ok(MenuChoice::Pump),
            "5" => return Ok(MenuChoice::Settings),
            "0" => return Ok(MenuChoice::Exit),
            _ => println!("{}", tr.t(keys::INVALID_SELECTION_RETRY)),
        }
    }
}

/// 덕트 사이징 메뉴를 처리한다.
pub fn handle_duct(tr: &Translator, cfg: &mut Config, strict: bool) -> Result<(), AppError> {
    println!("{}", tr.t(keys::DUCT_HEADING));
    println!("{}", tr.t(keys::DUCT_TYPE_OPTIONS));
    let duct_type = match read_line(&tr.t(keys::PROMPT_SELECT))?.trim() {
        "2" => DuctType::Rectangular,
        _ => DuctType::Round,
    };
    let flow = read_f64(tr, &tr.t(keys::PROMPT_DUCT_FLOW))?;
    let velocity = read_f64(tr, &tr.t(keys::PROMPT_DUCT_VELOCITY))?;
    let input = match duct_type {
        DuctType::Round => DuctInput::round(flow, velocity),
        DuctType::Rectangular => {
            let ratio = read_f64(tr, &tr.t(keys::PROMPT_ASPECT_RATIO))?;
            DuctInput::rectangular(flow, velocity, ratio)
        }
    };

    let res = app::compute_duct(strict, input)?;
    print_duct(tr, &res);

    cfg.duct.flow_rate_m3_per_h = flow;
    cfg.duct.velocity_m_per_s = velocity;
    cfg.duct.duct_type = duct_type;
    cfg.duct.aspect_ratio = input.aspect_ratio;
    Ok(())
}

/// 배관 사이징 메뉴를 처리한다.
pub fn handle_pipe(tr: &Translator, cfg: &mut Config, strict: bool) -> Result<(), AppError> {
    println!("{}", tr.t(keys::PIPE_HEADING));
    let flow = read_f64(tr, &tr.t(keys::PROMPT_PIPE_FLOW))?;
    let velocity = read_f64(tr, &tr.t(keys::PROMPT_PIPE_VELOCITY))?;
    let material = read_material(tr, cfg.pipe.material)?;

    let input = PipeInput {
        flow_rate_l_per_s: flow,
        velocity_m_per_s: velocity,
        material,
    };
    let res = app::compute_pipe(strict, input)?;
    print_pipe(tr, velocity, &res);

    cfg.pipe.flow_rate_l_per_s = flow;
    cfg.pipe.velocity_m_per_s = velocity;
    cfg.pipe.material = material;
    Ok(())
}

/// 최소 풍량을 정하는 방법. 어느 쪽이든 나머지 값은 스케줄이 다시 계산한다.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VavLimit {
    /// 턴다운비 [%]
    Turndown(f64),
    /// 최소 풍량 [cfm]
    MinAirflow(f64),
}

impl VavLimit {
    pub fn schedule(self, design_airflow_cfm: f64) -> VavAirflowSchedule {
        match self {
            VavLimit::Turndown(pct) => VavAirflowSchedule::new(design_airflow_cfm, pct),
            VavLimit::MinAirflow(cfm) => {
                let mut schedule = VavAirflowSchedule::new(design_airflow_cfm, 0.0);
                schedule.set_min_airflow(cfm);
                schedule
            }
        }
    }
}

/// VAV 박스 메뉴를 처리한다. 턴다운비를 비워 두면 최소 풍량을 직접 받는다.
pub fn handle_vav(tr: &Translator, cfg: &mut Config, strict: bool) -> Result<(), AppError> {
    println!("{}", tr.t(keys::VAV_HEADING));
    let design = read_f64(tr, &tr.t(keys::PROMPT_VAV_DESIGN))?;
    let turndown = read_line(&tr.t(keys::PROMPT_VAV_TURNDOWN))?;
    let limit = if turndown.trim().is_empty() {
        VavLimit::MinAirflow(read_f64(tr, &tr.t(keys::PROMPT_VAV_MIN))?)
    } else {
        VavLimit::Turndown(coerce_noted(tr, &turndown))
    };
    let static_pressure = read_f64(tr, &tr.t(keys::PROMPT_VAV_STATIC))?;

    let schedule = limit.schedule(design);
    let res = app::compute_vav(strict, schedule.to_input(static_pressure))?;
    print_vav(tr, &schedule, &res);

    cfg.vav.schedule = schedule;
    cfg.vav.static_pressure_in_wg = static_pressure;
    Ok(())
}

/// 펌프 양정 메뉴를 처리한다. 피팅은 빈 줄이 들어올 때까지 반복해서 받는다.
pub fn handle_pump(tr: &Translator, cfg: &mut Config, strict: bool) -> Result<(), AppError> {
    println!("{}", tr.t(keys::PUMP_HEADING));
    let flow = read_f64(tr, &tr.t(keys::PROMPT_PUMP_FLOW))?;
    let length = read_f64(tr, &tr.t(keys::PROMPT_PUMP_LENGTH))?;
    let size = read_f64(tr, &tr.t(keys::PROMPT_PUMP_SIZE))?;
    let material = read_material(tr, cfg.pump.material)?;

    println!("{}", tr.t(keys::FITTING_OPTIONS));
    let mut entries: Vec<FittingEntry> = Vec::new();
    loop {
        let sel = read_line(&tr.t(keys::PROMPT_FITTING_KIND))?;
        let sel = sel.trim();
        if sel.is_empty() {
            break;
        }
        let Some(kind) = map_fitting(sel) else {
            println!("{}", tr.t(keys::INVALID_SELECTION_RETRY));
            continue;
        };
        let count = coerce_count(&read_line(&tr.t(keys::PROMPT_FITTING_COUNT))?);
        entries.push(FittingEntry {
            id: entries.len() as u64 + 1,
            kind,
            count,
        });
    }

    let input = PumpHeadInput {
        flow_rate_l_per_s: flow,
        pipe_length_m: length,
        pipe_size_mm: size,
        fittings: FittingTally::from_entries(&entries),
        material,
    };
    let res = app::compute_pump(strict, &input)?;
    print_pump(tr, &input, &res);

    cfg.pump.flow_rate_l_per_s = flow;
    cfg.pump.pipe_length_m = length;
    cfg.pump.pipe_size_mm = size;
    cfg.pump.material = material;
    cfg.pump.fittings = entries;
    Ok(())
}

/// 설정 메뉴: 언어와 엄격 입력 모드를 바꾼다.
pub fn handle_settings(tr: &Translator, cfg: &mut Config) -> Result<(), AppError> {
    println!("{}", tr.t(keys::SETTINGS_HEADING));
    println!(
        "{}",
        tr.fmt(keys::SETTINGS_CURRENT_LANGUAGE, &[("lang", cfg.language.clone())])
    );
    println!(
        "{}",
        tr.fmt(keys::SETTINGS_STRICT_STATE, &[("state", on_off(cfg.strict_input).into())])
    );
    println!("{}", tr.t(keys::SETTINGS_OPTIONS));
    let sel = read_line(&tr.t(keys::SETTINGS_PROMPT_CHANGE))?;
    match sel.trim() {
        "" => return Ok(()),
        "1" => cfg.language = "auto".into(),
        "2" => cfg.language = "ko-kr".into(),
        "3" => cfg.language = "en-us".into(),
        "s" | "S" => cfg.strict_input = !cfg.strict_input,
        _ => {
            println!("{}", tr.t(keys::SETTINGS_INVALID));
            return Ok(());
        }
    }
    println!("{}", tr.t(keys::SETTINGS_SAVED));
    Ok(())
}

pub fn print_duct(tr: &Translator, res: &DuctResult) {
    println!("{}", tr.fmt(keys::RESULT_DUCT_AREA, &[("area", num(res.area_m2, 4))]));
    match res.shape {
        DuctShape::Round { diameter_m } => {
            let circumference = res.circumference_m().unwrap_or(f64::NAN);
            println!(
                "{}",
                tr.fmt(
                    keys::RESULT_DUCT_ROUND,
                    &[
                        ("diameter", num(diameter_m * 1000.0, 0)),
                        ("circumference", num(circumference * 1000.0, 0)),
                    ],
                )
            );
        }
        DuctShape::Rectangular {
            width_m,
            height_m,
            equivalent_diameter_m,
        } => {
            println!(
                "{}",
                tr.fmt(
                    keys::RESULT_DUCT_RECT,
                    &[
                        ("width", num(width_m * 1000.0, 0)),
                        ("height", num(height_m * 1000.0, 0)),
                        ("equivalent", num(equivalent_diameter_m * 1000.0, 0)),
                    ],
                )
            );
        }
    }
    println!(
        "{}",
        tr.fmt(
            keys::RESULT_DUCT_FRICTION,
            &[
                ("loss", num(res.friction_loss_pa_per_m, 2)),
                ("level", res.friction_rate_level().to_string()),
            ],
        )
    );
    warn_if_non_finite(tr, &[res.area_m2, res.friction_loss_pa_per_m]);
}

pub fn print_pipe(tr: &Translator, velocity_m_per_s: f64, res: &PipeResult) {
    println!(
        "{}",
        tr.fmt(
            keys::RESULT_PIPE_SIZE,
            &[
                ("diameter", num(res.diameter_mm, 1)),
                ("recommended", res.recommended_size_mm.to_string()),
            ],
        )
    );
    println!(
        "{}",
        tr.fmt(
            keys::RESULT_PIPE_LOSS,
            &[
                ("loss", num(res.pressure_loss_pa_per_m, 1)),
                ("loss100", num(res.pressure_loss_kpa_per_100m(), 2)),
            ],
        )
    );
    println!(
        "{}",
        tr.fmt(
            keys::RESULT_PIPE_REYNOLDS,
            &[
                ("reynolds", num(res.reynolds_number, 0)),
                ("friction", num(res.friction_factor, 4)),
                ("regime", res.flow_regime().to_string()),
            ],
        )
    );
    println!(
        "{}",
        tr.fmt(
            keys::RESULT_PIPE_VELOCITY_CHECK,
            &[("check", VelocityCheck::classify(velocity_m_per_s).to_string())],
        )
    );
    warn_if_non_finite(tr, &[res.diameter_mm, res.pressure_loss_pa_per_m]);
}

pub fn print_vav(tr: &Translator, schedule: &VavAirflowSchedule, res: &VavResult) {
    println!(
        "{}",
        tr.fmt(
            keys::RESULT_VAV_MIN,
            &[
                ("min", num(schedule.min_airflow_cfm, 0)),
                ("turndown", num(schedule.turndown_pct, 0)),
            ],
        )
    );
    println!(
        "{}",
        tr.fmt(keys::RESULT_VAV_SIZE, &[("size", res.recommended_size.clone())])
    );
    println!(
        "{}",
        tr.fmt(
            keys::RESULT_VAV_PERF,
            &[
                ("velocity", num(res.neck_velocity_fpm, 0)),
                ("drop", num(res.pressure_drop_in_wg, 3)),
            ],
        )
    );
    println!(
        "{}",
        tr.fmt(
            keys::RESULT_VAV_SOUND,
            &[
                ("sound", res.sound_level.to_string()),
                ("authority", res.control_authority().to_string()),
            ],
        )
    );
    warn_if_non_finite(tr, &[res.neck_velocity_fpm, res.pressure_drop_in_wg]);
}

pub fn print_pump(tr: &Translator, input: &PumpHeadInput, res: &PumpHeadResult) {
    println!(
        "{}",
        tr.fmt(
            keys::RESULT_PUMP_LOSSES,
            &[
                ("friction", num(res.friction_loss_m, 2)),
                ("fittings", num(res.fittings_loss_m, 2)),
                ("total", num(res.total_head_m, 2)),
            ],
        )
    );
    println!(
        "{}",
        tr.fmt(keys::RESULT_PUMP_POWER, &[("power", num(res.pump_power_kw, 2))])
    );
    println!(
        "{}",
        tr.fmt(
            keys::RESULT_PUMP_RATE,
            &[
                ("velocity", num(res.velocity_m_per_s, 2)),
                ("rate", num(res.friction_loss_rate_m_per_m(input.pipe_length_m), 4)),
            ],
        )
    );
    warn_if_non_finite(tr, &[res.total_head_m, res.pump_power_kw]);
}

fn warn_if_non_finite(tr: &Translator, values: &[f64]) {
    if values.iter().any(|v| !v.is_finite()) {
        println!("{}", tr.t(keys::WARN_NON_FINITE));
    }
}

fn num(v: f64, digits: usize) -> String {
    format!("{v:.digits$}")
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "ON"
    } else {
        "OFF"
    }
}

fn read_line(prompt: &str) -> Result<String, AppError> {
    print!("{prompt}");
    io::stdout().flush()?;
    read_line_from(&mut io::stdin().lock())
}

/// 한 줄을 읽는다. 0바이트(EOF)면 `UnexpectedEof` 입출력 오류.
fn read_line_from<R: BufRead>(input: &mut R) -> Result<String, AppError> {
    let mut buf = String::new();
    if input.read_line(&mut buf)? == 0 {
        return Err(AppError::Io(io::ErrorKind::UnexpectedEof.into()));
    }
    Ok(buf)
}

/// 숫자가 아니면 0으로 처리하고 안내만 출력한다.
fn read_f64(tr: &Translator, prompt: &str) -> Result<f64, AppError> {
    let s = read_line(prompt)?;
    Ok(coerce_noted(tr, &s))
}

fn coerce_noted(tr: &Translator, s: &str) -> f64 {
    let v = coerce_f64(s);
    if v == 0.0 && s.trim().parse::<f64>().is_err() {
        println!("{}", tr.t(keys::NOTE_COERCED_ZERO));
    }
    v
}

fn read_material(tr: &Translator, current: PipeMaterial) -> Result<PipeMaterial, AppError> {
    println!("{}", tr.t(keys::MATERIAL_OPTIONS));
    let sel = read_line(&tr.t(keys::PROMPT_SELECT))?;
    let material = match sel.trim() {
        "1" => PipeMaterial::Copper,
        "2" => PipeMaterial::Pvc,
        "3" => PipeMaterial::Steel,
        "4" => PipeMaterial::CastIron,
        "5" => PipeMaterial::Concrete,
        "6" => PipeMaterial::GalvanizedSteel,
        "" => current,
        other => PipeMaterial::parse_or_default(other),
    };
    Ok(material)
}

fn map_fitting(sel: &str) -> Option<FittingKind> {
    match sel.parse::<usize>() {
        Ok(n) if (1..=FittingKind::ALL.len()).contains(&n) => Some(FittingKind::ALL[n - 1]),
        Ok(_) => None,
        Err(_) => FittingKind::parse(sel),
    }
}

/// 입력 문자열을 숫자로 해석한다.
///
/// 앞부분에서 읽을 수 있는 가장 긴 숫자를 쓰고(`"12abc"` → 12), 없거나 NaN이면 0.
pub fn coerce_f64(s: &str) -> f64 {
    let s = s.trim();
    for end in (1..=s.len()).rev() {
        if !s.is_char_boundary(end) {
            continue;
        }
        if let Ok(v) = s[..end].parse::<f64>() {
            return if v.is_nan() { 0.0 } else { v };
        }
    }
    0.0
}

/// 개수 입력: 소수점 이하는 버리고 음수/숫자가 아닌 값은 0.
pub fn coerce_count(s: &str) -> u32 {
    let v = coerce_f64(s).trunc();
    if v <= 0.0 {
        0
    } else if v >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        v as u32
    }
}

/// `kind=count` 형식의 피팅 인자를 해석한다 (예: `elbow_90=4`). 개수를 생략하면 1.
pub fn parse_fitting_arg(arg: &str) -> Result<(FittingKind, u32), InputError> {
    let (kind, count) = match arg.split_once('=') {
        Some((k, c)) => (k, Some(c)),
        None => (arg, None),
    };
    let kind = validation::parse_fitting(kind)?;
    let count = match count {
        None => 1,
        Some(c) => c
            .trim()
            .parse::<u32>()
            .map_err(|_| InputError::InvalidCount(c.trim().to_string()))?,
    };
    Ok((kind, count))
}
