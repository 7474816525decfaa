use thiserror::Error;

use crate::air::duct_sizing::{size_duct, DuctInput, DuctResult};
use crate::air::vav_box::{size_vav_box, VavInput, VavResult};
use crate::config::{Config, ConfigError};
use crate::i18n::{self, Translator};
use crate::ui_cli;
use crate::ui_cli::MenuChoice;
use crate::validation::{self, InputError};
use crate::water::pipe_sizing::{size_pipe, PipeInput, PipeResult};
use crate::water::pump_head::{pump_head, PumpHeadInput, PumpHeadResult};

/// 애플리케이션 실행 중 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 표준 입출력 오류
    #[error("입출력 오류: {0}")]
    Io(#[from] std::io::Error),
    /// 설정 저장/로드 오류
    #[error("설정 오류: {0}")]
    Config(#[from] ConfigError),
    /// 엄격 모드 입력 오류
    #[error("입력 오류: {0}")]
    Input(#[from] InputError),
}

/// 엄격 모드면 검증 후 계산하고, 아니면 입력을 그대로 계산에 넘긴다.
pub fn compute_duct(strict: bool, input: DuctInput) -> Result<DuctResult, InputError> {
    if strict {
        validation::size_duct_checked(input)
    } else {
        Ok(size_duct(input))
    }
}

pub fn compute_pipe(strict: bool, input: PipeInput) -> Result<PipeResult, InputError> {
    if strict {
        validation::size_pipe_checked(input)
    } else {
        Ok(size_pipe(input))
    }
}

pub fn compute_vav(strict: bool, input: VavInput) -> Result<VavResult, InputError> {
    if strict {
        validation::size_vav_box_checked(input)
    } else {
        Ok(size_vav_box(input))
    }
}

pub fn compute_pump(strict: bool, input: &PumpHeadInput) -> Result<PumpHeadResult, InputError> {
    if strict {
        validation::pump_head_checked(input)
    } else {
        Ok(pump_head(input))
    }
}

impl AppError {
    /// 표준 입력이 닫혔는지 여부.
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, AppError::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
    }
}

/// CLI 애플리케이션의 메인 루프를 실행한다.
///
/// `force_strict`는 `--strict` 플래그로, 설정 파일의 값과 OR 된다.
/// 표준 입력이 닫히면 종료 메뉴를 고른 것과 같이 설정을 저장하고 끝낸다.
pub fn run(config: &mut Config, tr: &Translator, force_strict: bool) -> Result<(), AppError> {
    loop {
        let strict = force_strict || config.strict_input;
        let choice = match ui_cli::main_menu(tr) {
            Err(e) if e.is_end_of_input() => MenuChoice::Exit,
            other => other?,
        };
        let outcome = match choice {
            MenuChoice::Duct => ui_cli::handle_duct(tr, config, strict),
            MenuChoice::Pipe => ui_cli::handle_pipe(tr, config, strict),
            MenuChoice::Vav => ui_cli::handle_vav(tr, config, strict),
            MenuChoice::Pump => ui_cli::handle_pump(tr, config, strict),
            MenuChoice::Settings => {
                ui_cli::handle_settings(tr, config)?;
                config.save()?;
                Ok(())
            }
            MenuChoice::Exit => {
                config.save()?;
                println!("{}", tr.t(i18n::keys::APP_EXIT));
                break;
            }
        };
        // 입력 오류는 메뉴로 돌아가고, 입출력 오류만 루프를 끝낸다.
        match outcome {
            Err(AppError::Input(e)) => {
                tracing::warn!(error = %e, "input rejected");
                println!("{}: {e}", tr.t(i18n::keys::ERROR_PREFIX));
            }
            Err(e) if e.is_end_of_input() => {
                tracing::info!("stdin closed");
                config.save()?;
                break;
            }
            other => other?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_flag_switches_between_permissive_and_checked() {
        let input = DuctInput::round(1000.0, 0.0);
        let loose = compute_duct(false, input).unwrap();
        assert!(loose.area_m2.is_infinite());
        assert!(compute_duct(true, input).is_err());
    }

    #[test]
    fn oversized_vav_only_fails_in_strict_mode() {
        let input = VavInput {
            design_airflow_cfm: 20000.0,
            min_airflow_cfm: 5000.0,
            static_pressure_in_wg: 1.0,
        };
        assert_eq!(compute_vav(false, input).unwrap().box_size_in, 6);
        assert!(matches!(
            compute_vav(true, input),
            Err(InputError::AirflowAboveRange { .. })
        ));
    }

    #[test]
    fn only_unexpected_eof_counts_as_end_of_input() {
        let eof = AppError::Io(std::io::ErrorKind::UnexpectedEof.into());
        assert!(eof.is_end_of_input());
        let broken = AppError::Io(std::io::ErrorKind::BrokenPipe.into());
        assert!(!broken.is_end_of_input());
        assert!(!AppError::from(InputError::UnknownFitting("x".into())).is_end_of_input());
    }

    #[test]
    fn input_error_converts_into_app_error() {
        let err: AppError = InputError::UnknownMaterial("wood".into()).into();
        assert!(err.to_string().contains("wood"));
    }
}
