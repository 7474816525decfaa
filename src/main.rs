use clap::{Args, Parser, Subcommand};
use hvac_engineering_toolbox::{
    air::DuctInput,
    app::{self, AppError},
    config,
    i18n::{self, Translator},
    material_db::{FittingKind, PipeMaterial},
    ui_cli::{self, VavLimit},
    validation,
    water::{FittingTally, PipeInput, PumpHeadInput},
};

/// 공조 계산기 CLI. 하위 명령 없이 실행하면 대화형 메뉴를 띄운다.
#[derive(Debug, Parser)]
#[command(name = "hvac_engineering_toolbox_cli", version, about = "HVAC engineering calculators")]
struct Cli {
    /// 표시 언어 (auto, ko-kr, en-us)
    #[arg(short = 'L', long, default_value = "auto", global = true)]
    lang: String,

    /// 0 이하 유속 등 비물리적 입력을 오류로 거부한다
    #[arg(long, global = true)]
    strict: bool,

    /// 디버그 로그 출력
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 덕트 사이징
    Duct(DuctArgs),
    /// 냉온수 배관 사이징
    Pipe(PipeArgs),
    /// VAV 박스 사이징
    Vav(VavArgs),
    /// 펌프 양정 손실
    Pump(PumpArgs),
}

#[derive(Debug, Args)]
struct DuctArgs {
    /// 풍량 [m3/h]
    #[arg(long)]
    flow: f64,
    /// 풍속 [m/s]
    #[arg(long)]
    velocity: f64,
    #[arg(long)]
    rectangular: bool,
    #[arg(long, default_value_t = 1.0)]
    aspect_ratio: f64,
}

#[derive(Debug, Args)]
struct PipeArgs {
    /// 유량 [L/s]
    #[arg(long)]
    flow: f64,
    /// 유속 [m/s]
    #[arg(long)]
    velocity: f64,
    /// 재질 코드 (copper, pvc, steel, cast_iron, concrete, galvanized_steel)
    #[arg(long, default_value = "pvc")]
    material: String,
}

#[derive(Debug, Args)]
struct VavArgs {
    /// 설계 풍량 [cfm]
    #[arg(long)]
    design: f64,
    /// 최소 풍량 [cfm]
    #[arg(long, conflicts_with = "turndown")]
    min: Option<f64>,
    /// 턴다운비 [%]
    #[arg(long)]
    turndown: Option<f64>,
    /// 입구 정압 [in.wg]
    #[arg(long, default_value_t = 1.0)]
    static_pressure: f64,
}

#[derive(Debug, Args)]
struct PumpArgs {
    /// 유량 [L/s]
    #[arg(long)]
    flow: f64,
    /// 배관 길이 [m]
    #[arg(long)]
    length: f64,
    /// 호칭경 [mm]
    #[arg(long)]
    size: f64,
    #[arg(long, default_value = "copper")]
    material: String,
    /// 피팅 `kind=count` (여러 번 지정 가능, 예: --fitting elbow_90=4)
    #[arg(long = "fitting", value_parser = ui_cli::parse_fitting_arg)]
    fittings: Vec<(FittingKind, u32)>,
}

/// 프로그램의 엔트리 포인트. 설정을 로드한 뒤 CLI 애플리케이션을 실행한다.
fn main() {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    let mut cfg = match config::load_or_default() {
        Ok(cfg) => cfg,
        Err(err) => fail(&translator_for(&cli.lang, None), AppError::Config(err)),
    };
    let tr = translator_for(&cli.lang, Some(&cfg));
    if let Err(err) = try_run(&mut cfg, &tr, cli) {
        fail(&tr, err);
    }
}

/// `--lang` → 설정 → 시스템 순으로 고른 언어의 번역기. 오류 출력도 이 번역기를 쓴다.
fn translator_for(cli_lang: &str, cfg: Option<&config::Config>) -> Translator {
    let lang = i18n::resolve_language(cli_lang, cfg.map(|c| c.language.as_str()));
    Translator::new_with_pack(&lang, cfg.and_then(|c| c.language_pack_dir.as_deref()))
}

fn fail(tr: &Translator, err: AppError) -> ! {
    eprintln!("{}: {err}", tr.t(i18n::keys::ERROR_PREFIX));
    std::process::exit(1);
}

fn try_run(cfg: &mut config::Config, tr: &Translator, cli: Cli) -> Result<(), AppError> {
    let strict = cli.strict || cfg.strict_input;
    match cli.command {
        None => app::run(cfg, tr, cli.strict),
        Some(cmd) => run_once(tr, cmd, strict),
    }
}

fn material_arg(code: &str, strict: bool) -> Result<PipeMaterial, AppError> {
    if strict {
        Ok(validation::parse_material(code)?)
    } else {
        Ok(PipeMaterial::parse_or_default(code))
    }
}

fn run_once(tr: &Translator, cmd: Command, strict: bool) -> Result<(), AppError> {
    match cmd {
        Command::Duct(a) => {
            let input = if a.rectangular {
                DuctInput::rectangular(a.flow, a.velocity, a.aspect_ratio)
            } else {
                DuctInput::round(a.flow, a.velocity)
            };
            let res = app::compute_duct(strict, input)?;
            ui_cli::print_duct(tr, &res);
        }
        Command::Pipe(a) => {
            let input = PipeInput {
                flow_rate_l_per_s: a.flow,
                velocity_m_per_s: a.velocity,
                material: material_arg(&a.material, strict)?,
            };
            let res = app::compute_pipe(strict, input)?;
            ui_cli::print_pipe(tr, a.velocity, &res);
        }
        Command::Vav(a) => {
            let limit = match a.min {
                Some(min) => VavLimit::MinAirflow(min),
                None => VavLimit::Turndown(a.turndown.unwrap_or(25.0)),
            };
            let schedule = limit.schedule(a.design);
            let res = app::compute_vav(strict, schedule.to_input(a.static_pressure))?;
            ui_cli::print_vav(tr, &schedule, &res);
        }
        Command::Pump(a) => {
            let input = PumpHeadInput {
                flow_rate_l_per_s: a.flow,
                pipe_length_m: a.length,
                pipe_size_mm: a.size,
                fittings: a.fittings.into_iter().collect::<FittingTally>(),
                material: material_arg(&a.material, strict)?,
            };
            let res = app::compute_pump(strict, &input)?;
            ui_cli::print_pump(tr, &input, &res);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn pump_subcommand_collects_fittings() {
        let cli = Cli::try_parse_from([
            "hvac",
            "pump",
            "--flow",
            "2.5",
            "--length",
            "50",
            "--size",
            "25",
            "--fitting",
            "elbow_90=4",
            "--fitting",
            "check_valve=1",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Pump(a)) => {
                assert_eq!(a.fittings, vec![(FittingKind::Elbow90, 4), (FittingKind::CheckValve, 1)]);
                assert_eq!(a.material, "copper");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn vav_min_and_turndown_conflict() {
        let res = Cli::try_parse_from(["hvac", "vav", "--design", "500", "--min", "100", "--turndown", "20"]);
        assert!(res.is_err());
    }

    #[test]
    fn strict_material_rejects_unknown_code() {
        assert!(material_arg("wood", true).is_err());
        assert_eq!(material_arg("wood", false).unwrap(), PipeMaterial::Copper);
    }

    #[test]
    fn error_language_follows_flag_then_config() {
        let en = translator_for("en", None);
        assert_eq!(en.t(i18n::keys::ERROR_PREFIX), "Error");

        let mut cfg = config::Config::default();
        cfg.language = "ko-kr".into();
        assert_eq!(translator_for("auto", Some(&cfg)).t(i18n::keys::ERROR_PREFIX), "오류");
        assert_eq!(translator_for("en-us", Some(&cfg)).t(i18n::keys::ERROR_PREFIX), "Error");
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["hvac", "duct", "--flow", "1000", "--velocity", "5", "--strict", "-L", "ko"])
            .unwrap();
        assert!(cli.strict);
        assert_eq!(cli.lang, "ko");
    }
}
