//! 설정 파일 관리.
//!
//! 플랫폼별 설정 디렉토리에 JSON 파일로 설정을 저장/로드한다.

use crate::config::ClientConfig;
use crate::error::CoreError;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 설정 파일 이름
const CONFIG_FILE_NAME: &str = "servermetric.json";

/// 설정 관리자
///
/// 설정 파일의 로드/저장을 담당한다. 파일이 없으면 기본 설정으로 새로 만든다.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: ClientConfig,
    config_path: PathBuf,
}

impl ConfigManager {
    /// 플랫폼 기본 경로로 설정 관리자 생성
    pub fn new() -> Result<Self, CoreError> {
        let config_path = Self::default_config_path()?;
        Self::with_path(config_path)
    }

    /// 지정된 경로로 설정 관리자 생성
    pub fn with_path(config_path: PathBuf) -> Result<Self, CoreError> {
        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    CoreError::Config(format!(
                        "설정 디렉토리 생성 실패: {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
                info!("설정 디렉토리 생성: {}", parent.display());
            }
        }

        let config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            let default_config = ClientConfig::default_config();
            Self::save_to_file(&config_path, &default_config)?;
            info!("기본 설정 파일 생성: {}", config_path.display());
            default_config
        };

        Ok(Self {
            config,
            config_path,
        })
    }

    /// 현재 설정
    pub fn get(&self) -> &ClientConfig {
        &self.config
    }

    /// 설정 파일 경로
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// 특정 필드만 업데이트하고 파일에 저장
    pub fn update_with<F>(&mut self, updater: F) -> Result<&ClientConfig, CoreError>
    where
        F: FnOnce(&mut ClientConfig),
    {
        let mut config = self.config.clone();
        updater(&mut config);
        Self::save_to_file(&self.config_path, &config)?;
        self.config = config;
        debug!("설정 저장 완료: {}", self.config_path.display());
        Ok(&self.config)
    }

    /// 설정 다시 로드
    pub fn reload(&mut self) -> Result<(), CoreError> {
        self.config = Self::load_from_file(&self.config_path)?;
        info!("설정 다시 로드 완료");
        Ok(())
    }

    /// 플랫폼별 기본 설정 파일 경로
    ///
    /// - macOS: `~/Library/Application Support/io.servermetric.agent/`
    /// - Windows: `%APPDATA%\servermetric\agent\config\`
    /// - Linux: `~/.config/agent/`
    pub fn default_config_path() -> Result<PathBuf, CoreError> {
        ProjectDirs::from("io", "servermetric", "agent")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            .ok_or_else(|| CoreError::Config("홈 디렉토리를 찾을 수 없습니다".to_string()))
    }

    fn load_from_file(path: &Path) -> Result<ClientConfig, CoreError> {
        let content = fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("설정 파일 읽기 실패: {}: {}", path.display(), e))
        })?;

        let config: ClientConfig = serde_json::from_str(&content).map_err(|e| {
            CoreError::Config(format!("설정 파일 파싱 실패: {}: {}", path.display(), e))
        })?;

        debug!("설정 파일 로드 완료: {}", path.display());
        Ok(config)
    }

    fn save_to_file(path: &Path, config: &ClientConfig) -> Result<(), CoreError> {
        let content = serde_json::to_string_pretty(config)?;

        fs::write(path, content).map_err(|e| {
            CoreError::Config(format!("설정 파일 저장 실패: {}: {}", path.display(), e))
        })?;

        Ok(())
    }
}
