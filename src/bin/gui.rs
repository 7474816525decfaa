#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! eframe/egui 기반 데스크톱 GUI 진입점.

use eframe::{egui, App, Frame};
use hvac_engineering_toolbox::{
    air::{
        DuctInput, DuctResult, DuctShape, DuctType, FrictionRateLevel, SoundLevel,
        VavAirflowSchedule, VavResult, VAV_SIZE_GUIDE_CFM,
    },
    app, config, i18n,
    material_db::{self, FittingKind, PipeMaterial},
    validation::InputError,
    water::{
        FittingEntry, FittingTally, PipeInput, PipeResult, PumpHeadInput, PumpHeadResult,
        VelocityCheck,
    },
};
use image::GenericImageView;
use std::{env, fs, path::Path};

fn main() -> Result<(), eframe::Error> {
    tracing_subscriber::fmt::init();

    // CLI 언어 옵션 처리: --lang xx 또는 --lang=xx (xx: auto/en-us/ko-kr/ko)
    let mut cli_lang: Option<String> = None;
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        let a = &args[i];
        if let Some(val) = a.strip_prefix("--lang=") {
            cli_lang = Some(val.to_string());
        } else if (a == "--lang" || a == "-L") && i + 1 < args.len() {
            cli_lang = Some(args[i + 1].clone());
            i += 1;
        }
        i += 1;
    }

    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size([1100.0, 760.0])
        .with_transparent(true);
    if let Some(icon) = load_app_icon() {
        viewport = viewport.with_icon(icon);
    }
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    let mut app_cfg = config::load_or_default().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "config load failed; using defaults");
        config::Config::default()
    });
    if let Some(lang_cli) = cli_lang {
        app_cfg.language = i18n::resolve_language(&lang_cli, Some(app_cfg.language.as_str()));
    }
    eframe::run_native(
        "HVAC Engineering Toolbox",
        options,
        Box::new(move |cc| {
            if let Err(e) = setup_fonts(&cc.egui_ctx) {
                tracing::warn!("font setup: {e}");
            }
            Box::new(GuiApp::new(app_cfg.clone()))
        }),
    )
}

fn load_app_icon() -> Option<egui::IconData> {
    let search = ["hvac_icon.png", "icon.png", "assets/icon.png", "../assets/icon.png"];
    let path = search.iter().find(|p| Path::new(*p).exists())?;
    let bytes = fs::read(path).ok()?;
    let img = image::load_from_memory(&bytes).ok()?;
    let (w, h) = img.dimensions();
    Some(egui::IconData {
        rgba: img.to_rgba8().into_raw(),
        width: w,
        height: h,
    })
}

/// 바이너리 폰트 바이트를 egui 기본 글꼴 앞에 등록한다.
fn apply_font_bytes(ctx: &egui::Context, bytes: Vec<u8>, name: &str) {
    let mut fonts = egui::FontDefinitions::default();
    let font_name = name.to_string();
    fonts
        .font_data
        .insert(font_name.clone(), egui::FontData::from_owned(bytes));
    fonts
        .families
        .entry(egui::FontFamily::Proportional)
        .or_default()
        .insert(0, font_name.clone());
    fonts
        .families
        .entry(egui::FontFamily::Monospace)
        .or_default()
        .insert(0, font_name);
    ctx.set_fonts(fonts);
}

/// 한글 표시용 글꼴을 찾는다.
/// 1) assets/fonts/ 아래 사용자 글꼴
/// 2) Windows 시스템 글꼴(맑은 고딕/굴림)
/// 3) 리눅스/맥 CJK 글꼴
fn setup_fonts(ctx: &egui::Context) -> Result<(), String> {
    let mut candidates: Vec<std::path::PathBuf> = vec![
        "assets/fonts/korean.ttf".into(),
        "assets/fonts/malgun.ttf".into(),
    ];
    if let Some(windir) = env::var_os("WINDIR") {
        let fonts = Path::new(&windir).join("Fonts");
        for f in ["malgun.ttf", "gulim.ttc"] {
            candidates.push(fonts.join(f));
        }
    }
    for p in [
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/truetype/nanum/NanumGothic.ttf",
        "/System/Library/Fonts/AppleSDGothicNeo.ttc",
    ] {
        candidates.push(p.into());
    }

    for p in candidates {
        if p.exists() {
            let bytes = fs::read(&p).map_err(|e| format!("Failed to read font ({}): {e}", p.display()))?;
            apply_font_bytes(ctx, bytes, "korean_font");
            tracing::info!(path = %p.display(), "font loaded");
            return Ok(());
        }
    }
    Err("Korean font not found; Hangul labels may not render.".into())
}

fn label_with_tip(ui: &mut egui::Ui, text: &str, tip: &str) -> egui::Response {
    ui.label(text).on_hover_text(tip)
}

fn heading_with_tip(ui: &mut egui::Ui, text: &str, tip: &str) -> egui::Response {
    ui.heading(text).on_hover_text(tip)
}

const GOOD: egui::Color32 = egui::Color32::from_rgb(22, 163, 74);
const CAUTION: egui::Color32 = egui::Color32::from_rgb(202, 138, 4);
const BAD: egui::Color32 = egui::Color32::from_rgb(220, 38, 38);

fn friction_color(level: FrictionRateLevel) -> egui::Color32 {
    match level {
        FrictionRateLevel::Low => GOOD,
        FrictionRateLevel::Medium => CAUTION,
        FrictionRateLevel::High => BAD,
    }
}

fn sound_color(level: SoundLevel) -> egui::Color32 {
    match level {
        SoundLevel::Low => GOOD,
        SoundLevel::Medium => CAUTION,
        SoundLevel::High => BAD,
    }
}

fn velocity_color(check: VelocityCheck) -> egui::Color32 {
    match check {
        VelocityCheck::WithinRange => GOOD,
        _ => CAUTION,
    }
}

/// 유한하지 않은 값도 그대로 찍는다 (inf/NaN).
fn num(v: f64, digits: usize) -> String {
    format!("{v:.digits$}")
}

fn result_row(ui: &mut egui::Ui, label: &str, value: String) {
    ui.label(label);
    ui.strong(value);
    ui.end_row();
}

fn material_combo(ui: &mut egui::Ui, id: &str, value: &mut PipeMaterial) {
    egui::ComboBox::from_id_source(id)
        .selected_text(value.display_name())
        .show_ui(ui, |ui| {
            for m in PipeMaterial::ALL {
                ui.selectable_value(value, m, m.display_name());
            }
        });
}

/// 계산 시점의 펌프 입력과 결과 (요약표 표시용).
#[derive(Debug, Clone, PartialEq)]
struct PumpSnapshot {
    input: PumpHeadInput,
    result: PumpHeadResult,
}

/// 계산 시점의 풍량 스케줄과 결과. 폼을 고쳐도 결과 표는 바뀌지 않는다.
#[derive(Debug, Clone, PartialEq)]
struct VavSnapshot {
    schedule: VavAirflowSchedule,
    result: VavResult,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Tab {
    Dashboard,
    Duct,
    Pipe,
    Vav,
    Pump,
}

struct GuiApp {
    config: config::Config,
    tr: i18n::Translator,
    lang_input: String,
    lang_pack_dir_input: String,
    settings_status: Option<String>,
    tab: Tab,
    window_alpha: f32,
    strict_input: bool,
    show_settings_modal: bool,
    show_formula_modal: bool,
    // 덕트
    duct_flow: f64,
    duct_velocity: f64,
    duct_type: DuctType,
    duct_aspect: f64,
    duct_result: Option<Result<DuctResult, InputError>>,
    // 배관
    pipe_flow: f64,
    pipe_velocity: f64,
    pipe_material: PipeMaterial,
    pipe_result: Option<Result<(f64, PipeResult), InputError>>,
    // VAV
    vav_schedule: VavAirflowSchedule,
    vav_static: f64,
    vav_result: Option<Result<VavSnapshot, InputError>>,
    // 펌프
    pump_flow: f64,
    pump_length: f64,
    pump_size: f64,
    pump_material: PipeMaterial,
    pump_fittings: Vec<FittingEntry>,
    next_fitting_id: u64,
    pump_result: Option<Result<PumpSnapshot, InputError>>,
}

impl GuiApp {
    fn new(config: config::Config) -> Self {
        let lang_code = i18n::resolve_language("auto", Some(config.language.as_str()));
        let tr = i18n::Translator::new_with_pack(&lang_code, config.language_pack_dir.as_deref());
        tracing::info!(
            lang = %lang_code,
            overrides_loaded = tr.lookup("gui.nav.app_title").is_some(),
            "GUI language resolved"
        );
        let next_fitting_id = config.pump.fittings.iter().map(|f| f.id).max().unwrap_or(0) + 1;
        Self {
            tr,
            lang_input: config.language.clone(),
            lang_pack_dir_input: config.language_pack_dir.clone().unwrap_or_default(),
            settings_status: None,
            tab: Tab::Dashboard,
            window_alpha: config.window_alpha.clamp(0.3, 1.0),
            strict_input: config.strict_input,
            show_settings_modal: false,
            show_formula_modal: false,
            duct_flow: config.duct.flow_rate_m3_per_h,
            duct_velocity: config.duct.velocity_m_per_s,
            duct_type: config.duct.duct_type,
            duct_aspect: config.duct.aspect_ratio,
            duct_result: None,
            pipe_flow: config.pipe.flow_rate_l_per_s,
            pipe_velocity: config.pipe.velocity_m_per_s,
            pipe_material: config.pipe.material,
            pipe_result: None,
            vav_schedule: config.vav.schedule,
            vav_static: config.vav.static_pressure_in_wg,
            vav_result: None,
            pump_flow: config.pump.flow_rate_l_per_s,
            pump_length: config.pump.pipe_length_m,
            pump_size: config.pump.pipe_size_mm,
            pump_material: config.pump.material,
            pump_fittings: config.pump.fittings.clone(),
            next_fitting_id,
            pump_result: None,
            config,
        }
    }

    fn duct_input(&self) -> DuctInput {
        match self.duct_type {
            DuctType::Round => DuctInput::round(self.duct_flow, self.duct_velocity),
            DuctType::Rectangular => {
                DuctInput::rectangular(self.duct_flow, self.duct_velocity, self.duct_aspect)
            }
        }
    }

    fn calc_duct(&mut self) {
        let res = app::compute_duct(self.strict_input, self.duct_input());
        if let Err(e) = &res {
            tracing::warn!(error = %e, "duct input rejected");
        }
        self.duct_result = Some(res);
        self.config.duct.flow_rate_m3_per_h = self.duct_flow;
        self.config.duct.velocity_m_per_s = self.duct_velocity;
        self.config.duct.duct_type = self.duct_type;
        self.config.duct.aspect_ratio = self.duct_aspect;
    }

    fn calc_pipe(&mut self) {
        let input = PipeInput {
            flow_rate_l_per_s: self.pipe_flow,
            velocity_m_per_s: self.pipe_velocity,
            material: self.pipe_material,
        };
        let res = app::compute_pipe(self.strict_input, input).map(|r| (self.pipe_velocity, r));
        if let Err(e) = &res {
            tracing::warn!(error = %e, "pipe input rejected");
        }
        self.pipe_result = Some(res);
        self.config.pipe.flow_rate_l_per_s = self.pipe_flow;
        self.config.pipe.velocity_m_per_s = self.pipe_velocity;
        self.config.pipe.material = self.pipe_material;
    }

    fn calc_vav(&mut self) {
        let schedule = self.vav_schedule;
        let res = app::compute_vav(self.strict_input, schedule.to_input(self.vav_static))
            .map(|result| VavSnapshot { schedule, result });
        if let Err(e) = &res {
            tracing::warn!(error = %e, "vav input rejected");
        }
        self.vav_result = Some(res);
        self.config.vav.schedule = self.vav_schedule;
        self.config.vav.static_pressure_in_wg = self.vav_static;
    }

    fn pump_input(&self) -> PumpHeadInput {
        PumpHeadInput {
            flow_rate_l_per_s: self.pump_flow,
            pipe_length_m: self.pump_length,
            pipe_size_mm: self.pump_size,
            fittings: FittingTally::from_entries(&self.pump_fittings),
            material: self.pump_material,
        }
    }

    fn calc_pump(&mut self) {
        let input = self.pump_input();
        let res = app::compute_pump(self.strict_input, &input).map(|result| PumpSnapshot { input, result });
        if let Err(e) = &res {
            tracing::warn!(error = %e, "pump input rejected");
        }
        self.pump_result = Some(res);
        self.config.pump.flow_rate_l_per_s = self.pump_flow;
        self.config.pump.pipe_length_m = self.pump_length;
        self.config.pump.pipe_size_mm = self.pump_size;
        self.config.pump.material = self.pump_material;
        self.config.pump.fittings = self.pump_fittings.clone();
    }

    /// 새 행은 90° 엘보 1개로 시작한다.
    fn add_fitting(&mut self) {
        self.pump_fittings.push(FittingEntry {
            id: self.next_fitting_id,
            kind: FittingKind::Elbow90,
            count: 1,
        });
        self.next_fitting_id += 1;
    }

    fn remove_fitting(&mut self, id: u64) {
        self.pump_fittings.retain(|f| f.id != id);
    }

    fn save_settings(&mut self) {
        self.config.language = self.lang_input.clone();
        self.config.language_pack_dir = if self.lang_pack_dir_input.trim().is_empty() {
            None
        } else {
            Some(self.lang_pack_dir_input.trim().to_string())
        };
        self.config.window_alpha = self.window_alpha;
        self.config.strict_input = self.strict_input;
        // 즉시 번역기 반영
        let resolved = i18n::resolve_language(&self.config.language, None);
        self.tr = i18n::Translator::new_with_pack(&resolved, self.config.language_pack_dir.as_deref());
        self.settings_status = Some(match self.config.save() {
            Ok(()) => self
                .tr
                .lookup("gui.settings.saved")
                .unwrap_or_else(|| "Saved.".into()),
            Err(e) => format!("{}: {e}", self.tr.t(i18n::keys::ERROR_PREFIX)),
        });
    }

    fn ui_nav(&mut self, ui: &mut egui::Ui) {
        let tr = self.tr.clone();
        let txt = |key: &str, default: &str| tr.lookup(key).unwrap_or_else(|| default.to_string());
        ui.style_mut().wrap = Some(false);
        ui.vertical_centered(|ui| {
            ui.heading(txt("gui.nav.heading", "Menu"));
            ui.add_space(8.0);
        });
        for (tab, label) in [
            (Tab::Dashboard, txt("gui.tab.dashboard", "Dashboard")),
            (Tab::Duct, txt("gui.tab.duct", "Duct Sizing")),
            (Tab::Pipe, txt("gui.tab.pipe", "Pipe Sizing")),
            (Tab::Vav, txt("gui.tab.vav", "VAV Box Sizing")),
            (Tab::Pump, txt("gui.tab.pump", "Pump Head Loss")),
        ] {
            let selected = self.tab == tab;
            let button = egui::Button::new(label)
                .fill(if selected {
                    ui.visuals().selection.bg_fill
                } else {
                    ui.visuals().extreme_bg_color
                })
                .min_size(egui::vec2(ui.available_width(), 32.0));
            let resp = ui
                .add(button)
                .on_hover_text(txt("gui.nav.switch_tip", "Switch calculator"));
            if resp.clicked() {
                self.tab = tab;
            }
            ui.add_space(4.0);
        }
    }

    fn ui_dashboard(&mut self, ui: &mut egui::Ui) {
        let tr = self.tr.clone();
        let txt = move |key: &str, default: &str| tr.lookup(key).unwrap_or_else(|| default.to_string());
        ui.heading(txt("gui.dashboard.heading", "Dashboard"));
        ui.label(txt(
            "gui.dashboard.welcome",
            "Essential HVAC calculations in one place",
        ));
        ui.add_space(8.0);

        let cards = [
            (
                Tab::Duct,
                txt("gui.tab.duct", "Duct Sizing"),
                txt("gui.dashboard.duct", "Calculate duct dimensions, velocity, and pressure loss"),
            ),
            (
                Tab::Pipe,
                txt("gui.tab.pipe", "Pipe Sizing"),
                txt("gui.dashboard.pipe", "Size pipes based on flow rate, velocity, and material"),
            ),
            (
                Tab::Vav,
                txt("gui.tab.vav", "VAV Box Sizing"),
                txt("gui.dashboard.vav", "Determine optimal VAV box sizing for your zones"),
            ),
            (
                Tab::Pump,
                txt("gui.tab.pump", "Pump Head Loss"),
                txt("gui.dashboard.pump", "Calculate pump head requirements and power"),
            ),
        ];
        egui::Grid::new("dashboard_cards")
            .num_columns(2)
            .spacing([12.0, 12.0])
            .show(ui, |ui| {
                for (i, (tab, title, desc)) in cards.into_iter().enumerate() {
                    egui::Frame::group(ui.style()).show(ui, |ui| {
                        ui.set_min_width(280.0);
                        ui.strong(title);
                        ui.label(desc);
                        if ui.button(txt("gui.dashboard.open", "Open Calculator")).clicked() {
                            self.tab = tab;
                        }
                    });
                    if i % 2 == 1 {
                        ui.end_row();
                    }
                }
            });

        ui.add_space(12.0);
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.strong(txt("gui.dashboard.quick_settings", "Quick Settings"));
            ui.horizontal(|ui| {
                ui.label(format!(
                    "{}: {}",
                    txt("gui.settings.lang", "Language"),
                    self.tr.language_code()
                ));
                if ui
                    .checkbox(&mut self.strict_input, txt("gui.settings.strict", "Strict input"))
                    .on_hover_text(txt(
                        "gui.settings.strict_tip",
                        "Reject zero/negative or non-finite inputs before calculating",
                    ))
                    .changed()
                {
                    self.config.strict_input = self.strict_input;
                }
                if ui.button(txt("gui.settings.title", "Settings")).clicked() {
                    self.show_settings_modal = true;
                }
            });
        });
    }

    fn ui_duct(&mut self, ui: &mut egui::Ui) {
        let tr = self.tr.clone();
        let txt = move |key: &str, default: &str| tr.lookup(key).unwrap_or_else(|| default.to_string());
        heading_with_tip(
            ui,
            &txt("gui.duct.heading", "Duct Sizing"),
            &txt("gui.duct.tip", "Size round or rectangular ducts from airflow and target velocity"),
        );
        ui.add_space(8.0);

        egui::Frame::group(ui.style()).show(ui, |ui| {
            egui::Grid::new("duct_inputs")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    label_with_tip(
                        ui,
                        &txt("gui.duct.flow", "Airflow [m3/h]"),
                        &txt("gui.duct.flow_tip", "Volume of air moving through the duct"),
                    );
                    ui.add(egui::DragValue::new(&mut self.duct_flow).speed(10.0));
                    ui.end_row();

                    label_with_tip(
                        ui,
                        &txt("gui.duct.velocity", "Velocity [m/s]"),
                        &txt("gui.duct.velocity_tip", "Recommended: 3-8 m/s mains, 2-5 m/s branches"),
                    );
                    ui.add(egui::DragValue::new(&mut self.duct_velocity).speed(0.1));
                    ui.end_row();

                    ui.label(txt("gui.duct.type", "Duct type"));
                    ui.horizontal(|ui| {
                        ui.selectable_value(&mut self.duct_type, DuctType::Round, txt("gui.duct.round", "Round"));
                        ui.selectable_value(
                            &mut self.duct_type,
                            DuctType::Rectangular,
                            txt("gui.duct.rect", "Rectangular"),
                        );
                    });
                    ui.end_row();

                    if self.duct_type == DuctType::Rectangular {
                        label_with_tip(
                            ui,
                            &txt("gui.duct.aspect", "Aspect ratio (W/H)"),
                            &txt("gui.duct.aspect_tip", "Recommended 1:1 to 4:1"),
                        );
                        ui.add(
                            egui::DragValue::new(&mut self.duct_aspect)
                                .speed(0.1)
                                .clamp_range(0.1..=10.0),
                        );
                        ui.end_row();
                    }
                });
            ui.horizontal(|ui| {
                if ui.button(txt("gui.common.reset", "Reset")).clicked() {
                    self.duct_result = None;
                }
                if ui.button(txt("gui.common.calculate", "Calculate")).clicked() {
                    self.calc_duct();
                }
            });
        });

        ui.add_space(8.0);
        match &self.duct_result {
            None => {
                ui.label(txt("gui.common.no_result", "Enter values and press Calculate."));
            }
            Some(Err(e)) => {
                ui.colored_label(BAD, format!("{}: {e}", txt("gui.common.error", "Input error")));
            }
            Some(Ok(res)) => {
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.strong(txt("gui.common.results", "Calculation Results"));
                    egui::Grid::new("duct_results")
                        .num_columns(2)
                        .striped(true)
                        .show(ui, |ui| {
                            result_row(ui, &txt("gui.duct.area", "Area"), format!("{} m²", num(res.area_m2, 4)));
                            match res.shape {
                                DuctShape::Round { diameter_m } => {
                                    result_row(
                                        ui,
                                        &txt("gui.duct.diameter", "Diameter"),
                                        format!("{} mm", num(diameter_m * 1000.0, 0)),
                                    );
                                    let c = res.circumference_m().unwrap_or(f64::NAN);
                                    result_row(
                                        ui,
                                        &txt("gui.duct.circumference", "Circumference"),
                                        format!("{} mm", num(c * 1000.0, 0)),
                                    );
                                }
                                DuctShape::Rectangular {
                                    width_m,
                                    height_m,
                                    equivalent_diameter_m,
                                } => {
                                    result_row(
                                        ui,
                                        &txt("gui.duct.width", "Width"),
                                        format!("{} mm", num(width_m * 1000.0, 0)),
                                    );
                                    result_row(
                                        ui,
                                        &txt("gui.duct.height", "Height"),
                                        format!("{} mm", num(height_m * 1000.0, 0)),
                                    );
                                    result_row(
                                        ui,
                                        &txt("gui.duct.equivalent", "Equivalent diameter"),
                                        format!("{} mm", num(equivalent_diameter_m * 1000.0, 0)),
                                    );
                                }
                            }
                            ui.label(txt("gui.duct.friction", "Friction loss"));
                            let level = res.friction_rate_level();
                            ui.colored_label(
                                friction_color(level),
                                format!("{} Pa/m ({level})", num(res.friction_loss_pa_per_m, 2)),
                            );
                            ui.end_row();
                        });
                    if !res.area_m2.is_finite() || !res.friction_loss_pa_per_m.is_finite() {
                        ui.colored_label(CAUTION, self.tr.t(i18n::keys::WARN_NON_FINITE).into_owned());
                    }
                });
            }
        }
    }

    fn ui_pipe(&mut self, ui: &mut egui::Ui) {
        let tr = self.tr.clone();
        let txt = move |key: &str, default: &str| tr.lookup(key).unwrap_or_else(|| default.to_string());
        heading_with_tip(
            ui,
            &txt("gui.pipe.heading", "Pipe Sizing"),
            &txt("gui.pipe.tip", "Chilled/hot water pipe diameter and pressure loss"),
        );
        ui.add_space(8.0);

        egui::Frame::group(ui.style()).show(ui, |ui| {
            egui::Grid::new("pipe_inputs")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    label_with_tip(
                        ui,
                        &txt("gui.pipe.flow", "Flow rate [L/s]"),
                        &txt("gui.pipe.flow_tip", "Water flow through the pipe"),
                    );
                    ui.add(egui::DragValue::new(&mut self.pipe_flow).speed(0.1));
                    ui.end_row();

                    label_with_tip(
                        ui,
                        &txt("gui.pipe.velocity", "Velocity [m/s]"),
                        &txt("gui.pipe.velocity_tip", "Recommended 0.75-2.5 m/s"),
                    );
                    ui.add(egui::DragValue::new(&mut self.pipe_velocity).speed(0.05));
                    ui.end_row();

                    ui.label(txt("gui.pipe.material", "Pipe material"));
                    material_combo(ui, "pipe_material", &mut self.pipe_material);
                    ui.end_row();
                });
            ui.horizontal(|ui| {
                if ui.button(txt("gui.common.reset", "Reset")).clicked() {
                    self.pipe_result = None;
                }
                if ui.button(txt("gui.common.calculate", "Calculate")).clicked() {
                    self.calc_pipe();
                }
            });
        });

        ui.add_space(8.0);
        match &self.pipe_result {
            None => {
                ui.label(txt("gui.common.no_result", "Enter values and press Calculate."));
            }
            Some(Err(e)) => {
                ui.colored_label(BAD, format!("{}: {e}", txt("gui.common.error", "Input error")));
            }
            Some(Ok((velocity, res))) => {
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.strong(txt("gui.common.results", "Calculation Results"));
                    egui::Grid::new("pipe_results")
                        .num_columns(2)
                        .striped(true)
                        .show(ui, |ui| {
                            result_row(
                                ui,
                                &txt("gui.pipe.diameter", "Calculated inner diameter"),
                                format!("{} mm", num(res.diameter_mm, 1)),
                            );
                            result_row(
                                ui,
                                &txt("gui.pipe.recommended", "Recommended nominal size"),
                                format!("{} mm", res.recommended_size_mm),
                            );
                            result_row(
                                ui,
                                &txt("gui.pipe.loss", "Pressure loss"),
                                format!(
                                    "{} Pa/m ({} kPa/100 m)",
                                    num(res.pressure_loss_pa_per_m, 1),
                                    num(res.pressure_loss_kpa_per_100m(), 2)
                                ),
                            );
                            result_row(
                                ui,
                                &txt("gui.pipe.reynolds", "Reynolds number"),
                                format!("{} ({})", num(res.reynolds_number, 0), res.flow_regime()),
                            );
                            result_row(
                                ui,
                                &txt("gui.pipe.friction_factor", "Friction factor"),
                                num(res.friction_factor, 4),
                            );
                            ui.label(txt("gui.pipe.velocity_check", "Velocity check"));
                            let check = VelocityCheck::classify(*velocity);
                            ui.colored_label(velocity_color(check), check.to_string());
                            ui.end_row();
                        });
                    if !res.diameter_mm.is_finite() || !res.pressure_loss_pa_per_m.is_finite() {
                        ui.colored_label(CAUTION, self.tr.t(i18n::keys::WARN_NON_FINITE).into_owned());
                    }
                });
            }
        }

        ui.add_space(8.0);
        egui::CollapsingHeader::new(txt("gui.pipe.roughness_table", "Material roughness"))
            .default_open(false)
            .show(ui, |ui| {
                egui::Grid::new("roughness_table").striped(true).show(ui, |ui| {
                    for m in material_db::materials() {
                        ui.label(m.name);
                        ui.label(format!("{} mm", m.roughness_mm));
                        ui.end_row();
                    }
                });
            });
    }

    fn ui_vav(&mut self, ui: &mut egui::Ui) {
        let tr = self.tr.clone();
        let txt = move |key: &str, default: &str| tr.lookup(key).unwrap_or_else(|| default.to_string());
        heading_with_tip(
            ui,
            &txt("gui.vav.heading", "VAV Box Sizing"),
            &txt("gui.vav.tip", "Inlet size, neck velocity and pressure drop from design airflow"),
        );
        ui.add_space(8.0);

        egui::Frame::group(ui.style()).show(ui, |ui| {
            egui::Grid::new("vav_inputs")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    label_with_tip(
                        ui,
                        &txt("gui.vav.design", "Design airflow [CFM]"),
                        &txt("gui.vav.design_tip", "Maximum airflow required for the zone"),
                    );
                    let mut design = self.vav_schedule.design_airflow_cfm;
                    if ui.add(egui::DragValue::new(&mut design).speed(10.0)).changed() {
                        self.vav_schedule.set_design_airflow(design);
                    }
                    ui.end_row();

                    label_with_tip(
                        ui,
                        &txt("gui.vav.static", "Static pressure [in.wg]"),
                        &txt("gui.vav.static_tip", "Available static pressure at the box inlet"),
                    );
                    ui.add(egui::DragValue::new(&mut self.vav_static).speed(0.1));
                    ui.end_row();

                    label_with_tip(
                        ui,
                        &txt("gui.vav.turndown", "Turndown ratio [%]"),
                        &txt("gui.vav.turndown_tip", "Minimum airflow as a percentage of design airflow"),
                    );
                    let mut turndown = self.vav_schedule.turndown_pct;
                    if ui
                        .add(egui::Slider::new(&mut turndown, 10.0..=50.0).step_by(5.0).suffix(" %"))
                        .changed()
                    {
                        self.vav_schedule.set_turndown(turndown);
                    }
                    ui.end_row();

                    label_with_tip(
                        ui,
                        &txt("gui.vav.min", "Minimum airflow [CFM]"),
                        &txt("gui.vav.min_tip", "Calculated from the turndown ratio"),
                    );
                    let mut min = self.vav_schedule.min_airflow_cfm;
                    if ui.add(egui::DragValue::new(&mut min).speed(5.0)).changed() {
                        self.vav_schedule.set_min_airflow(min);
                    }
                    ui.end_row();
                });
            ui.label(
                egui::RichText::new(txt(
                    "gui.vav.turndown_note",
                    "Typical VAV turndown ratios range from 20-30% for zones with constant occupancy.",
                ))
                .small(),
            );
            ui.horizontal(|ui| {
                if ui.button(txt("gui.common.reset", "Reset")).clicked() {
                    self.vav_result = None;
                }
                if ui.button(txt("gui.common.calculate", "Calculate")).clicked() {
                    self.calc_vav();
                }
            });
        });

        ui.add_space(8.0);
        match &self.vav_result {
            None => {
                ui.label(txt("gui.common.no_result", "Enter values and press Calculate."));
            }
            Some(Err(e)) => {
                ui.colored_label(BAD, format!("{}: {e}", txt("gui.common.error", "Input error")));
            }
            Some(Ok(VavSnapshot { schedule, result: res })) => {
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.strong(txt("gui.common.results", "Calculation Results"));
                    ui.heading(res.recommended_size.as_str());
                    ui.label(txt("gui.vav.recommended", "Recommended VAV box size"));
                    egui::Grid::new("vav_results")
                        .num_columns(2)
                        .striped(true)
                        .show(ui, |ui| {
                            result_row(
                                ui,
                                &txt("gui.vav.min", "Minimum airflow [CFM]"),
                                num(schedule.min_airflow_cfm, 0),
                            );
                            ui.label(txt("gui.vav.neck_velocity", "Neck velocity"));
                            ui.colored_label(
                                sound_color(res.sound_level),
                                format!("{} fpm", num(res.neck_velocity_fpm, 0)),
                            );
                            ui.end_row();
                            result_row(
                                ui,
                                &txt("gui.vav.pressure_drop", "Pressure drop"),
                                format!("{} in.wg", num(res.pressure_drop_in_wg, 3)),
                            );
                            ui.label(txt("gui.vav.sound", "Acoustic level"));
                            ui.colored_label(sound_color(res.sound_level), res.sound_level.to_string());
                            ui.end_row();
                            result_row(
                                ui,
                                &txt("gui.vav.authority", "Control authority"),
                                res.control_authority().to_string(),
                            );
                        });
                });
            }
        }

        ui.add_space(8.0);
        egui::CollapsingHeader::new(txt("gui.vav.guide_title", "Standard VAV box sizes"))
            .default_open(false)
            .show(ui, |ui| {
                egui::Grid::new("vav_guide").striped(true).show(ui, |ui| {
                    ui.strong(txt("gui.vav.guide.size", "Size"));
                    ui.strong(txt("gui.vav.guide.min", "Min CFM"));
                    ui.strong(txt("gui.vav.guide.max", "Max CFM"));
                    ui.end_row();
                    for (size, min, max) in VAV_SIZE_GUIDE_CFM {
                        ui.label(format!("{size}\""));
                        ui.label(num(min, 0));
                        ui.label(num(max, 0));
                        ui.end_row();
                    }
                });
            });
    }

    fn ui_pump(&mut self, ui: &mut egui::Ui) {
        let tr = self.tr.clone();
        let txt = move |key: &str, default: &str| tr.lookup(key).unwrap_or_else(|| default.to_string());
        heading_with_tip(
            ui,
            &txt("gui.pump.heading", "Pump Head Loss"),
            &txt("gui.pump.tip", "Friction and fitting losses, total head and pump power"),
        );
        ui.add_space(8.0);

        egui::Frame::group(ui.style()).show(ui, |ui| {
            egui::Grid::new("pump_inputs")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    label_with_tip(
                        ui,
                        &txt("gui.pump.flow", "Flow rate [L/s]"),
                        &txt("gui.pump.flow_tip", "Water flow through the system"),
                    );
                    ui.add(egui::DragValue::new(&mut self.pump_flow).speed(0.1));
                    ui.end_row();

                    label_with_tip(
                        ui,
                        &txt("gui.pump.length", "Pipe length [m]"),
                        &txt("gui.pump.length_tip", "Total length of all pipes in the system"),
                    );
                    ui.add(egui::DragValue::new(&mut self.pump_length).speed(1.0));
                    ui.end_row();

                    ui.label(txt("gui.pump.size", "Pipe size [mm]"));
                    egui::ComboBox::from_id_source("pump_size")
                        .selected_text(format!("{} mm", self.pump_size))
                        .show_ui(ui, |ui| {
                            for size in material_db::STANDARD_PIPE_SIZES_MM.into_iter().take_while(|s| *s <= 100) {
                                ui.selectable_value(&mut self.pump_size, f64::from(size), format!("{size} mm"));
                            }
                        });
                    ui.end_row();

                    ui.label(txt("gui.pump.material", "Pipe material"));
                    material_combo(ui, "pump_material", &mut self.pump_material);
                    ui.end_row();
                });

            ui.separator();
            ui.horizontal(|ui| {
                ui.strong(txt("gui.pump.fittings", "Fittings and valves"));
                if ui.button(txt("gui.pump.add_fitting", "Add fitting")).clicked() {
                    self.add_fitting();
                }
            });
            let mut remove_id = None;
            for entry in self.pump_fittings.iter_mut() {
                ui.horizontal(|ui| {
                    egui::ComboBox::from_id_source(("fitting_kind", entry.id))
                        .selected_text(entry.kind.display_name())
                        .show_ui(ui, |ui| {
                            for kind in FittingKind::ALL {
                                ui.selectable_value(&mut entry.kind, kind, kind.display_name());
                            }
                        });
                    ui.add(egui::DragValue::new(&mut entry.count).speed(1.0));
                    if ui
                        .button("✖")
                        .on_hover_text(txt("gui.pump.remove_fitting", "Remove"))
                        .clicked()
                    {
                        remove_id = Some(entry.id);
                    }
                });
            }
            if let Some(id) = remove_id {
                self.remove_fitting(id);
            }

            ui.horizontal(|ui| {
                if ui.button(txt("gui.common.reset", "Reset")).clicked() {
                    self.pump_result = None;
                }
                if ui.button(txt("gui.common.calculate", "Calculate")).clicked() {
                    self.calc_pump();
                }
            });
        });

        ui.add_space(8.0);
        match &self.pump_result {
            None => {
                ui.label(txt("gui.common.no_result", "Enter values and press Calculate."));
            }
            Some(Err(e)) => {
                ui.colored_label(BAD, format!("{}: {e}", txt("gui.common.error", "Input error")));
            }
            Some(Ok(snap)) => {
                let res = &snap.result;
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.strong(txt("gui.common.results", "Calculation Results"));
                    egui::Grid::new("pump_results")
                        .num_columns(2)
                        .striped(true)
                        .show(ui, |ui| {
                            result_row(
                                ui,
                                &txt("gui.pump.friction_loss", "Pipe friction loss"),
                                format!("{} m", num(res.friction_loss_m, 2)),
                            );
                            result_row(
                                ui,
                                &txt("gui.pump.fittings_loss", "Fittings loss"),
                                format!("{} m", num(res.fittings_loss_m, 2)),
                            );
                            result_row(
                                ui,
                                &txt("gui.pump.total_head", "Total head"),
                                format!("{} m", num(res.total_head_m, 2)),
                            );
                            result_row(
                                ui,
                                &txt("gui.pump.power", "Pump power (70% eff.)"),
                                format!("{} kW", num(res.pump_power_kw, 2)),
                            );
                            result_row(
                                ui,
                                &txt("gui.pump.velocity", "Velocity"),
                                format!("{} m/s", num(res.velocity_m_per_s, 2)),
                            );
                            result_row(
                                ui,
                                &txt("gui.pump.rate", "Friction loss rate"),
                                format!(
                                    "{} m/m",
                                    num(res.friction_loss_rate_m_per_m(snap.input.pipe_length_m), 4)
                                ),
                            );
                        });
                    if !snap.input.fittings.is_empty() {
                        ui.separator();
                        ui.strong(txt("gui.pump.summary", "Fittings summary"));
                        egui::Grid::new("pump_fitting_summary").striped(true).show(ui, |ui| {
                            for (kind, count) in snap.input.fittings.iter().filter(|(_, c)| *c > 0) {
                                ui.label(kind.display_name());
                                ui.label(count.to_string());
                                ui.end_row();
                            }
                        });
                    }
                    if !res.total_head_m.is_finite() || !res.pump_power_kw.is_finite() {
                        ui.colored_label(CAUTION, self.tr.t(i18n::keys::WARN_NON_FINITE).into_owned());
                    }
                });
            }
        }

        ui.add_space(8.0);
        egui::CollapsingHeader::new(txt("gui.pump.k_table", "K-values for fittings"))
            .default_open(false)
            .show(ui, |ui| {
                egui::Grid::new("k_table").striped(true).show(ui, |ui| {
                    for kind in FittingKind::ALL {
                        ui.label(kind.display_name());
                        ui.label(format!("K = {}", kind.k_value()));
                        ui.end_row();
                    }
                });
            });
    }
}

impl App for GuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        // 투명도 적용 + 라벨 복사 방지 스타일
        let mut style = (*ctx.style()).clone();
        style.interaction.selectable_labels = false;
        style.visuals.window_fill = style.visuals.window_fill.linear_multiply(self.window_alpha);
        style.visuals.panel_fill = style.visuals.panel_fill.linear_multiply(self.window_alpha);
        ctx.set_style(style);

        let tr = self.tr.clone();
        let txt = move |key: &str, default: &str| tr.lookup(key).unwrap_or_else(|| default.to_string());

        // 상단 바
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(txt("gui.nav.app_title", "HVAC Engineering Toolbox"));
                ui.label(" | Desktop GUI");
                ui.separator();
                if ui.button(txt("gui.formula.button", "Formula reference")).clicked() {
                    self.show_formula_modal = true;
                }
                if ui.button(txt("gui.settings.title", "Settings")).clicked() {
                    self.show_settings_modal = true;
                }
                if self.strict_input {
                    ui.colored_label(CAUTION, txt("gui.settings.strict_badge", "STRICT"));
                }
            });
        });

        // 설정 모달
        if self.show_settings_modal {
            let mut open = true;
            let mut save_clicked = false;
            egui::Window::new(txt("gui.settings.title", "Settings"))
                .collapsible(false)
                .resizable(true)
                .open(&mut open)
                .show(ctx, |ui| {
                    ui.heading(txt("gui.settings.general", "General"));
                    ui.separator();
                    ui.label(txt("gui.settings.alpha", "Window transparency"));
                    ui.add(egui::Slider::new(&mut self.window_alpha, 0.3..=1.0).text("alpha"));
                    ui.separator();
                    ui.checkbox(&mut self.strict_input, txt("gui.settings.strict", "Strict input"))
                        .on_hover_text(txt(
                            "gui.settings.strict_tip",
                            "Reject zero/negative or non-finite inputs before calculating",
                        ));
                    ui.separator();
                    ui.label(txt("gui.settings.lang", "Language"));
                    egui::ComboBox::from_id_source("lang_choice")
                        .selected_text(self.lang_input.clone())
                        .show_ui(ui, |ui| {
                            ui.selectable_value(
                                &mut self.lang_input,
                                "auto".into(),
                                txt("gui.settings.lang_auto", "System"),
                            );
                            ui.selectable_value(&mut self.lang_input, "en-us".into(), "English (US)");
                            ui.selectable_value(&mut self.lang_input, "ko-kr".into(), "한국어");
                        });
                    ui.label(txt("gui.settings.pack_dir", "Language pack folder (optional)"));
                    ui.text_edit_singleline(&mut self.lang_pack_dir_input);
                    if ui.button(txt("gui.settings.save", "Save settings")).clicked() {
                        save_clicked = true;
                    }
                    if let Some(msg) = &self.settings_status {
                        ui.label(msg);
                    }
                });
            if save_clicked {
                self.save_settings();
            }
            self.show_settings_modal = open;
        }

        if self.show_formula_modal {
            egui::Window::new(txt("gui.formula.title", "Formula reference"))
                .collapsible(true)
                .resizable(true)
                .open(&mut self.show_formula_modal)
                .show(ctx, |ui| {
                    ui.style_mut().wrap = Some(true);
                    ui.heading(txt("gui.formula.duct", "Duct: A = Q/v, D = 2√(A/π); rectangular W = √(A·AR), H = W/AR."));
                    ui.label(txt(
                        "gui.formula.duct_eq",
                        "Equivalent diameter De = 1.3 (WH)^0.625 / (W+H)^0.25; friction ≈ 0.025 v² 1.2 / (4√(A/π)).",
                    ));
                    ui.separator();
                    ui.heading(txt("gui.formula.pipe", "Pipe: D = √(4Q/(πv)), Re = vD/ν (ν = 1e-6 m²/s)."));
                    ui.label(txt(
                        "gui.formula.pipe_f",
                        "f = 0.25 / [log10(ε/3.7D + 5.74/Re^0.9)]², ΔP/L = f ρ v² / 2D.",
                    ));
                    ui.separator();
                    ui.heading(txt("gui.formula.vav", "VAV: first size with Q ≤ size² × 25 cfm."));
                    ui.label(txt(
                        "gui.formula.vav_perf",
                        "Neck velocity = Q / (π (size/24)²) fpm; ΔP = 0.07 (V/1000)² × static pressure.",
                    ));
                    ui.separator();
                    ui.heading(txt("gui.formula.pump", "Pump: h_f = f (L/D) v²/2g, h_k = Σ n K v²/2g."));
                    ui.label(txt("gui.formula.pump_power", "Power P = ρ g Q H / (0.7 × 1000) kW."));
                });
        }

        // 좌측 네비 + 본문
        egui::SidePanel::left("nav")
            .resizable(true)
            .min_width(140.0)
            .default_width(200.0)
            .max_width(400.0)
            .show(ctx, |ui| {
                self.ui_nav(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| match self.tab {
                    Tab::Dashboard => self.ui_dashboard(ui),
                    Tab::Duct => self.ui_duct(ui),
                    Tab::Pipe => self.ui_pipe(ui),
                    Tab::Vav => self.ui_vav(ui),
                    Tab::Pump => self.ui_pump(ui),
                });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_app_takes_form_values_from_config() {
        let app = GuiApp::new(config::Config::default());
        assert_eq!(app.tab, Tab::Dashboard);
        assert_eq!(app.duct_flow, 1000.0);
        assert_eq!(app.pipe_material, PipeMaterial::Pvc);
        assert_eq!(app.pump_fittings.len(), 2);
        assert_eq!(app.next_fitting_id, 3);
    }

    #[test]
    fn pump_calculation_uses_current_fitting_rows() {
        let mut app = GuiApp::new(config::Config::default());
        app.calc_pump();
        let snap = app.pump_result.clone().unwrap().unwrap();
        assert_eq!(snap.input.fittings.count(FittingKind::Elbow90), 4);
        assert_eq!(
            snap.result.total_head_m,
            snap.result.friction_loss_m + snap.result.fittings_loss_m
        );
    }

    #[test]
    fn fitting_rows_add_and_remove_by_id() {
        let mut app = GuiApp::new(config::Config::default());
        app.add_fitting();
        app.add_fitting();
        assert_eq!(app.pump_fittings.len(), 4);
        let ids: Vec<u64> = app.pump_fittings.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        app.remove_fitting(3);
        assert!(app.pump_fittings.iter().all(|f| f.id != 3));
        app.add_fitting();
        // 삭제된 id는 다시 쓰지 않는다
        assert_eq!(app.pump_fittings.last().map(|f| f.id), Some(5));
    }

    #[test]
    fn strict_mode_turns_zero_velocity_into_error() {
        let mut app = GuiApp::new(config::Config::default());
        app.duct_velocity = 0.0;
        app.strict_input = false;
        app.calc_duct();
        assert!(matches!(&app.duct_result, Some(Ok(r)) if r.area_m2.is_infinite()));
        app.strict_input = true;
        app.calc_duct();
        assert!(matches!(app.duct_result, Some(Err(InputError::NonPositive { .. }))));
    }

    #[test]
    fn vav_schedule_stays_in_sync() {
        let mut app = GuiApp::new(config::Config::default());
        app.vav_schedule.set_design_airflow(800.0);
        assert_eq!(app.vav_schedule.min_airflow_cfm, 200.0);
        app.calc_vav();
        let snap = app.vav_result.clone().unwrap().unwrap();
        assert_eq!(snap.result.recommended_size, "6\"");
        assert_eq!(app.config.vav.schedule.design_airflow_cfm, 800.0);
    }

    #[test]
    fn vav_result_keeps_schedule_used_for_calculation() {
        let mut app = GuiApp::new(config::Config::default());
        app.vav_schedule.set_design_airflow(800.0);
        app.calc_vav();
        app.vav_schedule.set_min_airflow(400.0);
        app.vav_schedule.set_design_airflow(2000.0);

        let snap = app.vav_result.clone().unwrap().unwrap();
        assert_eq!(snap.schedule.design_airflow_cfm, 800.0);
        assert_eq!(snap.schedule.min_airflow_cfm, 200.0);
        assert_eq!(snap.result.box_size_in, 6);
    }

    #[test]
    fn pipe_result_keeps_design_velocity_for_check() {
        let mut app = GuiApp::new(config::Config::default());
        app.calc_pipe();
        let (velocity, res) = app.pipe_result.clone().unwrap().unwrap();
        assert_eq!(velocity, 1.5);
        assert_eq!(res.recommended_size_mm, 50);
    }
}
