use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use sys_locale::get_locale;

/// 문자열 키를 모아두는 네임스페이스.
pub mod keys {
    pub const ERROR_PREFIX: &str = "general.error_prefix";
    pub const APP_EXIT: &str = "general.app_exit";
    pub const NOTE_COERCED_ZERO: &str = "general.coerced_zero";
    pub const WARN_NON_FINITE: &str = "general.non_finite";

    pub const MAIN_MENU_TITLE: &str = "main_menu.title";
    pub const MAIN_MENU_DUCT: &str = "main_menu.duct";
    pub const MAIN_MENU_PIPE: &str = "main_menu.pipe";
    pub const MAIN_MENU_VAV: &str = "main_menu.vav";
    pub const MAIN_MENU_PUMP: &str = "main_menu.pump";
    pub const MAIN_MENU_SETTINGS: &str = "main_menu.settings";
    pub const MAIN_MENU_EXIT: &str = "main_menu.exit";
    pub const PROMPT_MENU_SELECT: &str = "prompt.menu_select";
    pub const PROMPT_SELECT: &str = "prompt.select";
    pub const INVALID_SELECTION_RETRY: &str = "error.invalid_selection_retry";

    pub const DUCT_HEADING: &str = "duct.heading";
    pub const DUCT_TYPE_OPTIONS: &str = "duct.type_options";
    pub const PROMPT_DUCT_FLOW: &str = "prompt.duct_flow";
    pub const PROMPT_DUCT_VELOCITY: &str = "prompt.duct_velocity";
    pub const PROMPT_ASPECT_RATIO: &str = "prompt.aspect_ratio";
    pub const RESULT_DUCT_AREA: &str = "result.duct_area";
    pub const RESULT_DUCT_ROUND: &str = "result.duct_round";
    pub const RESULT_DUCT_RECT: &str = "result.duct_rect";
    pub const RESULT_DUCT_FRICTION: &str = "result.duct_friction";

    pub const PIPE_HEADING: &str = "pipe.heading";
    pub const MATERIAL_OPTIONS: &str = "pipe.material_options";
    pub const PROMPT_PIPE_FLOW: &str = "prompt.pipe_flow";
    pub const PROMPT_PIPE_VELOCITY: &str = "prompt.pipe_velocity";
    pub const RESULT_PIPE_SIZE: &str = "result.pipe_size";
    pub const RESULT_PIPE_LOSS: &str = "result.pipe_loss";
    pub const RESULT_PIPE_REYNOLDS: &str = "result.pipe_reynolds";
    pub const RESULT_PIPE_VELOCITY_CHECK: &str = "result.pipe_velocity_check";

    pub const VAV_HEADING: &str = "vav.heading";
    pub const PROMPT_VAV_DESIGN: &str = "prompt.vav_design";
    pub const PROMPT_VAV_TURNDOWN: &str = "prompt.vav_turndown";
    pub const PROMPT_VAV_MIN: &str = "prompt.vav_min";
    pub const PROMPT_VAV_STATIC: &str = "prompt.vav_static";
    pub const RESULT_VAV_MIN: &str = "result.vav_min";
    pub const RESULT_VAV_SIZE: &str = "result.vav_size";
    pub const RESULT_VAV_PERF: &str = "result.vav_perf";
    pub const RESULT_VAV_SOUND: &str = "result.vav_sound";

    pub const PUMP_HEADING: &str = "pump.heading";
    pub const PROMPT_PUMP_FLOW: &str = "prompt.pump_flow";
    pub const PROMPT_PUMP_LENGTH: &str = "prompt.pump_length";
    pub const PROMPT_PUMP_SIZE: &str = "prompt.pump_size";
    pub const FITTING_OPTIONS: &str = "pump.fitting_options";
    pub const PROMPT_FITTING_KIND: &str = "prompt.fitting_kind";
    pub const PROMPT_FITTING_COUNT: &str = "prompt.fitting_count";
    pub const RESULT_PUMP_LOSSES: &str = "result.pump_losses";
    pub const RESULT_PUMP_POWER: &str = "result.pump_power";
    pub const RESULT_PUMP_RATE: &str = "result.pump_rate";

    pub const SETTINGS_HEADING: &str = "settings.heading";
    pub const SETTINGS_CURRENT_LANGUAGE: &str = "settings.current_language";
    pub const SETTINGS_STRICT_STATE: &str = "settings.strict_state";
    pub const SETTINGS_OPTIONS: &str = "settings.options";
    pub const SETTINGS_PROMPT_CHANGE: &str = "settings.prompt_change";
    pub const SETTINGS_INVALID: &str = "settings.invalid";
    pub const SETTINGS_SAVED: &str = "settings.saved";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Ko,
    En,
}

impl Language {
    fn from_code(code: &str) -> Self {
        let c = code.to_lowercase();
        if c.starts_with("en") {
            Language::En
        } else {
            Language::Ko
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            Language::Ko => "ko",
            Language::En => "en",
        }
    }
}

/// 런타임 언어 번들을 제공한다.
#[derive(Debug, Clone)]
pub struct Translator {
    lang: Language,
    overrides: Option<HashMap<String, String>>,
}

impl Translator {
    /// 언어 코드(ko/en)에 따라 번역기를 생성한다. 알 수 없는 코드는 ko로 폴백한다.
    pub fn new(lang_code: &str) -> Self {
        Self {
            lang: Language::from_code(lang_code),
            overrides: None,
        }
    }

    /// 언어 코드 + 언어팩 디렉터리(locales/ 등)를 받아서 번역기를 생성한다.
    /// 디렉터리가 없거나 파일이 없으면 내장 문자열만 사용한다.
    pub fn new_with_pack(lang_code: &str, pack_dir: Option<&str>) -> Self {
        let overrides = pack_dir
            .and_then(|dir| load_overrides(dir, lang_code))
            .or_else(|| load_overrides("locales", lang_code))
            .or_else(|| built_in_pack(lang_code));
        Self {
            lang: Language::from_code(lang_code),
            overrides,
        }
    }

    pub fn language(&self) -> Language {
        self.lang
    }

    pub fn language_code(&self) -> &'static str {
        self.lang.as_code()
    }

    /// 키를 조회해 문자열을 반환한다. 언어팩에 없으면 None.
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.overrides.as_ref().and_then(|m| m.get(key).cloned())
    }

    /// 번역을 가져온다. 영어 번역이 없으면 한국어 문자열을 폴백한다.
    pub fn t(&self, key: &str) -> Cow<'_, str> {
        if let Some(v) = self.overrides.as_ref().and_then(|m| m.get(key)) {
            return Cow::Borrowed(v.as_str());
        }
        match self.lang {
            Language::En => Cow::Borrowed(en(key).unwrap_or_else(|| ko(key))),
            Language::Ko => Cow::Borrowed(ko(key)),
        }
    }

    /// 번역 템플릿의 `{name}` 자리를 채운다.
    pub fn fmt(&self, key: &str, vars: &[(&str, String)]) -> String {
        fill_template(&self.t(key), vars)
    }
}

/// `{key}` 형태의 자리표시자를 값으로 치환한다.
pub fn fill_template(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (k, v) in vars {
        out = out.replace(&format!("{{{k}}}"), v);
    }
    out
}

/// CLI 플래그/설정/시스템 순으로 언어 코드를 결정한다.
pub fn resolve_language(cli_arg: &str, config_lang: Option<&str>) -> String {
    normalize_lang(cli_arg)
        .or_else(|| config_lang.and_then(normalize_lang))
        .or_else(detect_system_language)
        .unwrap_or_else(|| "en-us".to_string())
}

fn normalize_lang(code: &str) -> Option<String> {
    let c = code.trim().to_lowercase();
    match c.as_str() {
        "ko" | "ko-kr" => Some("ko-kr".into()),
        "en" | "en-us" | "en-uk" => Some("en-us".into()),
        "auto" | "" => None,
        other if other.starts_with("ko") => Some("ko-kr".into()),
        other if other.starts_with("en") => Some("en-us".into()),
        _ => None,
    }
}

fn normalize_locale_string(loc: &str) -> Option<String> {
    let lang = loc
        .split(['.', '_', '-'])
        .next()
        .unwrap_or_default()
        .to_lowercase();
    match lang.as_str() {
        "ko" => Some("ko-kr".into()),
        "en" => Some("en-us".into()),
        _ => None,
    }
}

/// 시스템 로케일에서 언어를 추정한다.
pub fn detect_system_language() -> Option<String> {
    if let Some(loc) = get_locale() {
        if let Some(lang) = normalize_locale_string(&loc) {
            return Some(lang);
        }
    }
    for var in ["LANG", "LC_ALL"] {
        if let Ok(lang) = std::env::var(var) {
            if let Some(code) = normalize_locale_string(&lang) {
                return Some(code);
            }
        }
    }
    None
}

/// TOML 기반 언어팩을 로드한다. 형식: key = "value" 로 구성된 플랫 맵 또는 중첩 테이블.
fn load_overrides(dir: &str, lang: &str) -> Option<HashMap<String, String>> {
    let try_load = |code: &str| -> Option<HashMap<String, String>> {
        let path = Path::new(dir).join(format!("{code}.toml"));
        let content = fs::read_to_string(path).ok()?;
        parse_toml_to_map(&content)
    };

    // 1) full code (e.g., en-us)
    if let Some(map) = try_load(lang) {
        tracing::debug!(dir, lang, "language pack loaded");
        return Some(map);
    }
    // 2) base code (e.g., en)
    if let Some((base, _)) = lang.split_once(['-', '_']) {
        if let Some(map) = try_load(base) {
            return Some(map);
        }
    }
    None
}

fn parse_toml_to_map(src: &str) -> Option<HashMap<String, String>> {
    let value: toml::Value = toml::from_str(src).ok()?;
    let table = value.as_table()?;
    let mut map = HashMap::new();

    fn walk(prefix: &str, val: &toml::Value, out: &mut HashMap<String, String>) {
        match val {
            toml::Value::String(s) => {
                out.insert(prefix.to_string(), s.to_string());
            }
            toml::Value::Table(t) => {
                for (k, v) in t {
                    let key = if prefix.is_empty() {
                        k.clone()
                    } else {
                        format!("{prefix}.{k}")
                    };
                    walk(&key, v, out);
                }
            }
            _ => {}
        }
    }

    for (k, v) in table {
        walk(k, v, &mut map);
    }

    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

/// 내장 언어팩(파일이 없어도 동작하도록 빌드 시 포함).
fn built_in_pack(lang: &str) -> Option<HashMap<String, String>> {
    match lang.to_lowercase().as_str() {
        "en-us" | "en" | "en-uk" => parse_toml_to_map(include_str!("../locales/en-us.toml")),
        "ko-kr" | "ko" => parse_toml_to_map(include_str!("../locales/ko-kr.toml")),
        _ => None,
    }
}

fn ko(key: &str) -> &'static str {
    use keys::*;
    match key {
        ERROR_PREFIX => "오류",
        APP_EXIT => "프로그램을 종료합니다.",
        NOTE_COERCED_ZERO => "숫자가 아니어서 0으로 처리합니다.",
        WARN_NON_FINITE => "주의: 결과가 유한하지 않습니다. 입력값(0 유속/관경 등)을 확인하세요.",
        MAIN_MENU_TITLE => "\n=== HVAC Engineering Toolbox ===",
        MAIN_MENU_DUCT => "1) 덕트 사이징",
        MAIN_MENU_PIPE => "2) 배관 사이징",
        MAIN_MENU_VAV => "3) VAV 박스 사이징",
        MAIN_MENU_PUMP => "4) 펌프 양정 손실",
        MAIN_MENU_SETTINGS => "5) 설정",
        MAIN_MENU_EXIT => "0) 종료",
        PROMPT_MENU_SELECT => "메뉴 선택: ",
        PROMPT_SELECT => "선택: ",
        INVALID_SELECTION_RETRY => "잘못된 입력입니다. 다시 선택하세요.",
        DUCT_HEADING => "\n-- 덕트 사이징 --",
        DUCT_TYPE_OPTIONS => "1) 원형 덕트  2) 각형 덕트",
        PROMPT_DUCT_FLOW => "풍량 [m3/h]: ",
        PROMPT_DUCT_VELOCITY => "풍속 [m/s] (주덕트 3~8, 분기 2~5): ",
        PROMPT_ASPECT_RATIO => "가로/세로 비 (권장 1~4): ",
        RESULT_DUCT_AREA => "단면적: {area} m²",
        RESULT_DUCT_ROUND => "직경: {diameter} mm, 둘레: {circumference} mm",
        RESULT_DUCT_RECT => "폭: {width} mm, 높이: {height} mm, 상당직경: {equivalent} mm",
        RESULT_DUCT_FRICTION => "마찰손실: {loss} Pa/m (등급 {level})",
        PIPE_HEADING => "\n-- 배관 사이징 --",
        MATERIAL_OPTIONS => {
            "재질: 1=Copper 2=PVC 3=Steel 4=Cast Iron 5=Concrete 6=Galvanized Steel"
        }
        PROMPT_PIPE_FLOW => "유량 [L/s]: ",
        PROMPT_PIPE_VELOCITY => "유속 [m/s] (권장 0.75~2.5): ",
        RESULT_PIPE_SIZE => "계산 내경: {diameter} mm, 추천 호칭경: {recommended} mm",
        RESULT_PIPE_LOSS => "압력손실: {loss} Pa/m (100 m당 {loss100} kPa)",
        RESULT_PIPE_REYNOLDS => "Re={reynolds}, f={friction}, 유동: {regime}",
        RESULT_PIPE_VELOCITY_CHECK => "유속 판정: {check}",
        VAV_HEADING => "\n-- VAV 박스 사이징 --",
        PROMPT_VAV_DESIGN => "설계 풍량 [cfm]: ",
        PROMPT_VAV_TURNDOWN => "턴다운비 [%] (일반 20~30, 비우면 최소 풍량 입력): ",
        PROMPT_VAV_MIN => "최소 풍량 [cfm]: ",
        PROMPT_VAV_STATIC => "입구 정압 [in.wg]: ",
        RESULT_VAV_MIN => "최소 풍량: {min} cfm (턴다운 {turndown}%)",
        RESULT_VAV_SIZE => "추천 박스: {size}",
        RESULT_VAV_PERF => "넥 풍속: {velocity} fpm, 압력강하: {drop} in.wg",
        RESULT_VAV_SOUND => "소음: {sound}, 제어 권한: {authority}",
        PUMP_HEADING => "\n-- 펌프 양정 손실 --",
        PROMPT_PUMP_FLOW => "유량 [L/s]: ",
        PROMPT_PUMP_LENGTH => "배관 길이 [m]: ",
        PROMPT_PUMP_SIZE => "호칭경 [mm] (15~100): ",
        FITTING_OPTIONS => {
            "피팅: 1=90° Elbow 2=45° Elbow 3=Tee 4=Gate 5=Globe 6=Check 7=Entrance 8=Exit"
        }
        PROMPT_FITTING_KIND => "피팅 번호 (엔터=입력 완료): ",
        PROMPT_FITTING_COUNT => "개수: ",
        RESULT_PUMP_LOSSES => "마찰손실: {friction} m, 피팅손실: {fittings} m, 총 양정: {total} m",
        RESULT_PUMP_POWER => "펌프 동력: {power} kW (효율 70%)",
        RESULT_PUMP_RATE => "유속: {velocity} m/s, 마찰손실률: {rate} m/m",
        SETTINGS_HEADING => "\n-- 설정 --",
        SETTINGS_CURRENT_LANGUAGE => "현재 언어: {lang}",
        SETTINGS_STRICT_STATE => "엄격 입력 모드: {state}",
        SETTINGS_OPTIONS => "1) 자동  2) 한국어  3) English  s) 엄격 입력 모드 전환",
        SETTINGS_PROMPT_CHANGE => "변경할 번호(취소하려면 엔터): ",
        SETTINGS_INVALID => "잘못된 입력이므로 변경하지 않습니다.",
        SETTINGS_SAVED => "설정을 저장했습니다.",
        _ => "???",
    }
}

fn en(key: &str) -> Option<&'static str> {
    use keys::*;
    Some(match key {
        ERROR_PREFIX => "Error",
        APP_EXIT => "Exiting application.",
        NOTE_COERCED_ZERO => "Not a number; using 0.",
        WARN_NON_FINITE => "Warning: result is not finite. Check inputs (zero velocity/size, ...).",
        MAIN_MENU_TITLE => "\n=== HVAC Engineering Toolbox ===",
        MAIN_MENU_DUCT => "1) Duct Sizing",
        MAIN_MENU_PIPE => "2) Pipe Sizing",
        MAIN_MENU_VAV => "3) VAV Box Sizing",
        MAIN_MENU_PUMP => "4) Pump Head Loss",
        MAIN_MENU_SETTINGS => "5) Settings",
        MAIN_MENU_EXIT => "0) Exit",
        PROMPT_MENU_SELECT => "Select menu: ",
        PROMPT_SELECT => "Select: ",
        INVALID_SELECTION_RETRY => "Invalid input. Please try again.",
        DUCT_HEADING => "\n-- Duct Sizing --",
        DUCT_TYPE_OPTIONS => "1) Round duct  2) Rectangular duct",
        PROMPT_DUCT_FLOW => "Airflow [m3/h]: ",
        PROMPT_DUCT_VELOCITY => "Velocity [m/s] (mains 3-8, branches 2-5): ",
        PROMPT_ASPECT_RATIO => "Aspect ratio (recommended 1-4): ",
        RESULT_DUCT_AREA => "Area: {area} m²",
        RESULT_DUCT_ROUND => "Diameter: {diameter} mm, circumference: {circumference} mm",
        RESULT_DUCT_RECT => "Width: {width} mm, height: {height} mm, equivalent diameter: {equivalent} mm",
        RESULT_DUCT_FRICTION => "Friction loss: {loss} Pa/m (level {level})",
        PIPE_HEADING => "\n-- Pipe Sizing --",
        MATERIAL_OPTIONS => {
            "Material: 1=Copper 2=PVC 3=Steel 4=Cast Iron 5=Concrete 6=Galvanized Steel"
        }
        PROMPT_PIPE_FLOW => "Flow rate [L/s]: ",
        PROMPT_PIPE_VELOCITY => "Velocity [m/s] (recommended 0.75-2.5): ",
        RESULT_PIPE_SIZE => "Calculated ID: {diameter} mm, recommended size: {recommended} mm",
        RESULT_PIPE_LOSS => "Pressure loss: {loss} Pa/m ({loss100} kPa per 100 m)",
        RESULT_PIPE_REYNOLDS => "Re={reynolds}, f={friction}, flow: {regime}",
        RESULT_PIPE_VELOCITY_CHECK => "Velocity check: {check}",
        VAV_HEADING => "\n-- VAV Box Sizing --",
        PROMPT_VAV_DESIGN => "Design airflow [cfm]: ",
        PROMPT_VAV_TURNDOWN => "Turndown ratio [%] (typical 20-30, blank to enter minimum airflow): ",
        PROMPT_VAV_MIN => "Minimum airflow [cfm]: ",
        PROMPT_VAV_STATIC => "Inlet static pressure [in.wg]: ",
        RESULT_VAV_MIN => "Minimum airflow: {min} cfm (turndown {turndown}%)",
        RESULT_VAV_SIZE => "Recommended box: {size}",
        RESULT_VAV_PERF => "Neck velocity: {velocity} fpm, pressure drop: {drop} in.wg",
        RESULT_VAV_SOUND => "Acoustic level: {sound}, control authority: {authority}",
        PUMP_HEADING => "\n-- Pump Head Loss --",
        PROMPT_PUMP_FLOW => "Flow rate [L/s]: ",
        PROMPT_PUMP_LENGTH => "Pipe length [m]: ",
        PROMPT_PUMP_SIZE => "Pipe size [mm] (15-100): ",
        FITTING_OPTIONS => {
            "Fittings: 1=90° Elbow 2=45° Elbow 3=Tee 4=Gate 5=Globe 6=Check 7=Entrance 8=Exit"
        }
        PROMPT_FITTING_KIND => "Fitting number (Enter=done): ",
        PROMPT_FITTING_COUNT => "Count: ",
        RESULT_PUMP_LOSSES => "Friction: {friction} m, fittings: {fittings} m, total head: {total} m",
        RESULT_PUMP_POWER => "Pump power: {power} kW (70% efficiency)",
        RESULT_PUMP_RATE => "Velocity: {velocity} m/s, friction loss rate: {rate} m/m",
        SETTINGS_HEADING => "\n-- Settings --",
        SETTINGS_CURRENT_LANGUAGE => "Current language: {lang}",
        SETTINGS_STRICT_STATE => "Strict input mode: {state}",
        SETTINGS_OPTIONS => "1) Auto  2) 한국어  3) English  s) Toggle strict input",
        SETTINGS_PROMPT_CHANGE => "Number to change (Enter to cancel): ",
        SETTINGS_INVALID => "Invalid input; nothing changed.",
        SETTINGS_SAVED => "Settings saved.",
        _ => return None,
    })
}
